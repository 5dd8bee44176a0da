//! Command-line shell over the ArchSketch editing API.
//!
//! # Responsibility
//! - Map subcommands onto `Editor` operations against the SQLite-backed store.
//! - Print notices the way a UI would show toasts; exit non-zero on failure.

use archsketch_api::{init_logging, ActionResponse, Editor, NoticeLevel};
use archsketch_core::catalog;
use archsketch_core::export::ExportOutput;
use archsketch_core::service::properties::NodeDataPatch;
use archsketch_core::service::template::{TemplateCategory, TemplateFilter};
use archsketch_core::AppConfig;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sketch system architecture diagrams", long_about = None)]
struct Cli {
    /// Path to the SQLite database (overrides ARCHSKETCH_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Storage slot key (overrides ARCHSKETCH_STORAGE_KEY)
    #[arg(long, global = true)]
    storage_key: Option<String>,

    /// Absolute directory for rolling log files (overrides ARCHSKETCH_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides ARCHSKETCH_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Edit components of the current project
    #[command(subcommand)]
    Node(NodeCommand),
    /// Connect two components
    Connect { source: String, target: String },
    /// Lay components out on a grid
    Arrange,
    /// Align components: left, center or right
    Align { alignment: String },
    /// Remove every component and connection
    Clear {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// List component types
    Catalog,
    /// Browse and use templates
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Export the current project
    Export(ExportArgs),
    /// Import a project file as a new project
    Import { file: PathBuf },
    /// Print share links for the current project
    Share,
    /// Ask the design assistant
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    List,
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Open { id: String },
    Close,
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum NodeCommand {
    Add {
        type_key: String,
        #[arg(long, default_value_t = 100.0)]
        x: f64,
        #[arg(long, default_value_t = 100.0)]
        y: f64,
    },
    Move { id: String, x: f64, y: f64 },
    Update(UpdateArgs),
    Delete { id: String },
    Duplicate { id: String },
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    color: Option<String>,
    /// Empty string clears the field
    #[arg(long)]
    technology: Option<String>,
    /// Empty string clears the field
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        search: String,
    },
    Use { id: String },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// json, svg, md, mermaid, png, jpg, pdf or drawio
    format: String,
    /// Output file; defaults to the suggested file name
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// SVG without background
    #[arg(long)]
    transparent: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        let error = init_logging(config.log_level, &log_dir.to_string_lossy());
        if !error.is_empty() {
            eprintln!("warning: logging disabled: {error}");
        }
    }

    let mut editor = match Editor::open(&config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("event=cli_command module=cli status=start");

    if run(&mut editor, cli.command) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    apply_overrides(AppConfig::from_env()?, cli)
}

/// Layers command-line flags over the environment-derived config.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> Result<AppConfig, String> {
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(key) = &cli.storage_key {
        let key = key.trim();
        if key.is_empty() {
            return Err("--storage-key must not be blank".to_string());
        }
        config.storage_key = key.to_string();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level =
            archsketch_core::logging::parse_level(level).map_err(|err| err.to_string())?;
    }
    Ok(config)
}

type CliEditor = Editor<archsketch_core::SqliteKeyValueStore, archsketch_core::GeminiClient>;

fn run(editor: &mut CliEditor, command: Command) -> bool {
    match command {
        Command::Project(command) => run_project(editor, command),
        Command::Node(command) => run_node(editor, command),
        Command::Connect { source, target } => {
            report(editor.connect(&source, &target), |edge| println!("{}", edge.id))
        }
        Command::Arrange => report(editor.auto_arrange(), |_| {}),
        Command::Align { alignment } => report(editor.align(&alignment), |_| {}),
        Command::Clear { yes } => report(editor.clear_canvas(yes), |outcome| {
            println!("{outcome:?}")
        }),
        Command::Catalog => {
            for (category, entries) in catalog::by_category() {
                println!("{}:", category.label());
                for entry in entries {
                    println!("  {:<14} {}", entry.type_key, entry.description);
                }
            }
            true
        }
        Command::Template(command) => run_template(editor, command),
        Command::Export(args) => run_export(editor, args),
        Command::Import { file } => match std::fs::read_to_string(&file) {
            Ok(text) => report(editor.import_json(&text), |project| println!("{}", project.id)),
            Err(err) => {
                eprintln!("error: cannot read `{}`: {err}", file.display());
                false
            }
        },
        Command::Share => report(editor.share_links(), |links| {
            println!("link:     {}", links.share);
            println!("email:    {}", links.email);
            println!("twitter:  {}", links.twitter);
            println!("linkedin: {}", links.linkedin);
        }),
        Command::Ask { prompt } => {
            let response = editor.ask(&prompt.join(" "));
            if let Some(message) = &response.data {
                println!("{}", message.content);
                editor.finish_reveal(message.id);
            }
            report(response, |_| {})
        }
    }
}

fn run_project(editor: &mut CliEditor, command: ProjectCommand) -> bool {
    match command {
        ProjectCommand::List => {
            let current = editor.current_project().map(|project| project.id);
            for project in editor.projects() {
                let marker = if Some(project.id) == current { "*" } else { " " };
                println!(
                    "{marker} {}  {}  ({} components, updated {})",
                    project.id,
                    project.name,
                    project.nodes.len(),
                    project.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            true
        }
        ProjectCommand::Create { name, description } => {
            report(editor.create_project(&name, &description), |project| {
                println!("{}", project.id)
            })
        }
        ProjectCommand::Open { id } => report(editor.open_project(&id), |project| {
            println!("{}", project.name)
        }),
        ProjectCommand::Close => report(editor.close_project(), |_| {}),
        ProjectCommand::Delete { id } => report(editor.delete_project(&id), |_| {}),
    }
}

fn run_node(editor: &mut CliEditor, command: NodeCommand) -> bool {
    match command {
        NodeCommand::Add { type_key, x, y } => {
            report(editor.add_component(&type_key, x, y), |node| println!("{}", node.id))
        }
        NodeCommand::Move { id, x, y } => report(editor.move_component(&id, x, y), |_| {}),
        NodeCommand::Update(args) => {
            let patch = NodeDataPatch {
                label: args.label,
                description: args.description,
                color: args.color,
                technology: args.technology,
                notes: args.notes,
            };
            report(editor.update_component(&args.id, patch), |_| {})
        }
        NodeCommand::Delete { id } => report(editor.delete_component(&id), |_| {}),
        NodeCommand::Duplicate { id } => {
            if !report(editor.select_component(&id), |_| {}) {
                return false;
            }
            report(editor.duplicate_selected(), |node| println!("{}", node.id))
        }
    }
}

fn run_template(editor: &mut CliEditor, command: TemplateCommand) -> bool {
    match command {
        TemplateCommand::List { category, search } => {
            let category = match category.as_deref().map(str::trim) {
                None | Some("all") => None,
                Some(raw) => match TemplateCategory::parse(raw) {
                    Some(category) => Some(category),
                    None => {
                        eprintln!("error: unknown template category `{raw}`");
                        return false;
                    }
                },
            };
            for template in editor.templates(&TemplateFilter { category, search }) {
                println!(
                    "{:<28} {:<12} {:>2} components  {}",
                    template.id,
                    template.category.label(),
                    template.component_count(),
                    template.name
                );
            }
            true
        }
        TemplateCommand::Use { id } => report(editor.use_template(&id), |project| {
            println!("{}", project.id)
        }),
    }
}

fn run_export(editor: &mut CliEditor, args: ExportArgs) -> bool {
    let response = editor.export(&args.format, !args.transparent);
    let written = match &response.data {
        Some(ExportOutput::Document {
            file_name,
            contents,
            ..
        }) => {
            let path = args.out.unwrap_or_else(|| PathBuf::from(file_name));
            match std::fs::write(&path, contents) {
                Ok(()) => {
                    println!("{}", path.display());
                    true
                }
                Err(err) => {
                    eprintln!("error: cannot write `{}`: {err}", path.display());
                    false
                }
            }
        }
        _ => true,
    };
    report(response, |_| {}) && written
}

/// Prints the notice and hands successful data to `on_data`.
fn report<T>(response: ActionResponse<T>, on_data: impl FnOnce(T)) -> bool {
    if let Some(notice) = &response.notice {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => eprintln!("{}", notice.message),
        }
    }
    let ok = response.ok;
    if let Some(data) = response.data.filter(|_| ok) {
        on_data(data);
    }
    ok
}
