//! Use-case API for shell-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level operations over one editing session.
//! - Convert every domain outcome into an `ActionResponse` with a transient
//!   notice the shell can show as-is.
//!
//! # Invariants
//! - Exported operations must not panic across the shell boundary.
//! - Notice texts are user-facing; diagnostic detail goes to the log.
//! - Every mutation goes through the project store. The canvas controller
//!   picks up store mutations it did not make on its next gesture; resyncs
//!   here only refresh the view eagerly.

use archsketch_core::assistant::completion::{CompletionError, TextCompletion};
use archsketch_core::assistant::session::{ChatMessage, MessageId, Resolution};
use archsketch_core::assistant::typewriter::Typewriter;
use archsketch_core::assistant::{quick_action, QuickAction};
use archsketch_core::export::share::{
    decode_share_link, email_link, linkedin_intent, share_link, twitter_intent,
};
use archsketch_core::export::{export_current, ExportError, ExportFormat, ExportOptions, ExportOutput};
use archsketch_core::service::canvas::{
    CanvasError, CanvasKey, CanvasView, ClearOutcome, FocusTarget, KeyOutcome,
};
use archsketch_core::model::project::ProjectPatch;
use archsketch_core::service::project_store::ImportError;
use archsketch_core::service::properties::{self, NodeDataPatch, PropertyError};
use archsketch_core::service::template::{use_template, Template, TemplateCatalog, TemplateFilter};
use archsketch_core::service::toolbar::{self, Alignment, Clipboard, ToolbarError};
use archsketch_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, AppConfig,
    AssistantError, AssistantSession, CanvasController, Clock, Edge, GeminiClient, KeyValueStore,
    Node, Position, Project, ProjectId, ProjectStore, SqliteKeyValueStore, SystemClock,
};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Origin used for share links when the shell does not set one.
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:3000";

/// Expose core crate version.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # Contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Transient, user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse<T> {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Operation result on success.
    pub data: Option<T>,
    /// Notice to show, if any. Silent operations (moves, selection) carry none.
    pub notice: Option<Notice>,
}

impl<T> ActionResponse<T> {
    fn success(data: T, notice: Option<Notice>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            notice,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            notice: Some(Notice::error(message)),
        }
    }

    /// Message of the attached notice, or `""`.
    pub fn message(&self) -> &str {
        self.notice
            .as_ref()
            .map_or("", |notice| notice.message.as_str())
    }
}

/// Links produced by the share panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub share: String,
    pub email: String,
    pub twitter: String,
    pub linkedin: String,
}

/// One editing session: project store, canvas, clipboard, templates and
/// assistant wired together.
pub struct Editor<K: KeyValueStore, C: TextCompletion> {
    store: ProjectStore<K>,
    canvas: CanvasController,
    clipboard: Clipboard,
    templates: TemplateCatalog,
    assistant: AssistantSession,
    completion: C,
    clock: Arc<dyn Clock>,
    share_origin: String,
}

impl Editor<SqliteKeyValueStore, GeminiClient> {
    /// Opens the SQLite-backed editor described by `config`.
    ///
    /// # Errors
    /// - Returns a readable message when the database or HTTP client cannot
    ///   be set up.
    pub fn open(config: &AppConfig) -> Result<Self, String> {
        let kv = SqliteKeyValueStore::open(&config.db_path).map_err(|err| {
            error!("event=editor_open module=api status=error stage=db error={err}");
            format!("database open failed: {err}")
        })?;
        let completion = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
            .map_err(|err| format!("AI client init failed: {err}"))?;
        Self::new(kv, completion, config.storage_key.clone(), Arc::new(SystemClock))
    }
}

impl<K: KeyValueStore, C: TextCompletion> Editor<K, C> {
    /// Builds an editor over injected persistence, completion service and
    /// clock.
    pub fn new(
        kv: K,
        completion: C,
        storage_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, String> {
        let templates = TemplateCatalog::builtin().map_err(|err| err.to_string())?;
        let store = ProjectStore::load_with_clock(kv, storage_key, Box::new(Arc::clone(&clock)));
        let mut canvas = CanvasController::new();
        canvas.observe(&store);
        info!(
            "event=editor_open module=api status=ok projects={} ai_available={}",
            store.projects().len(),
            completion.is_available()
        );
        Ok(Self {
            store,
            canvas,
            clipboard: Clipboard::new(),
            templates,
            assistant: AssistantSession::new(),
            completion,
            clock,
            share_origin: DEFAULT_SHARE_ORIGIN.to_string(),
        })
    }

    pub fn with_share_origin(mut self, origin: impl Into<String>) -> Self {
        self.share_origin = origin.into();
        self
    }

    pub fn store(&self) -> &ProjectStore<K> {
        &self.store
    }

    pub fn projects(&self) -> &[Project] {
        self.store.projects()
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.store.current_project()
    }

    /// What the canvas should render right now.
    pub fn canvas_view(&mut self) -> CanvasView<'_> {
        self.canvas.observe(&self.store);
        self.canvas.view()
    }

    pub fn selected_component(&self) -> Option<&str> {
        self.canvas.selected()
    }

    // ---- projects ----

    pub fn create_project(&mut self, name: &str, description: &str) -> ActionResponse<Project> {
        match self.store.create_project(name, description) {
            Ok(project) => {
                self.canvas.resync(&self.store);
                ActionResponse::success(project, Some(Notice::success("Project created successfully!")))
            }
            Err(_) => ActionResponse::failure("Project name is required"),
        }
    }

    pub fn delete_project(&mut self, id: &str) -> ActionResponse<()> {
        let Some(id) = parse_project_id(id) else {
            return ActionResponse::failure("Invalid project id");
        };
        self.store.delete_project(id);
        self.canvas.resync(&self.store);
        ActionResponse::success((), Some(Notice::success("Project deleted")))
    }

    pub fn open_project(&mut self, id: &str) -> ActionResponse<Project> {
        let Some(id) = parse_project_id(id) else {
            return ActionResponse::failure("Invalid project id");
        };
        match self.store.select_project(id) {
            Ok(project) => {
                self.canvas.resync(&self.store);
                ActionResponse::success(project, None)
            }
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    }

    /// Stamps the current project as saved; content is already persisted.
    pub fn save_project(&mut self) -> ActionResponse<Project> {
        match self.store.update_current_project(ProjectPatch::default()).cloned() {
            Some(project) => ActionResponse::success(project, Some(Notice::success("Project saved!"))),
            None => ActionResponse::failure("No project to save"),
        }
    }

    /// Leaves the current project; the canvas shows its placeholder.
    pub fn close_project(&mut self) -> ActionResponse<()> {
        self.store.set_current_project(None);
        self.canvas.resync(&self.store);
        ActionResponse::success((), None)
    }

    // ---- canvas ----

    pub fn add_component(&mut self, type_key: &str, x: f64, y: f64) -> ActionResponse<Node> {
        match self
            .canvas
            .drop_catalog_entry(&mut self.store, type_key, Position::new(x, y))
        {
            Ok(node) => ActionResponse::success(node, Some(Notice::success("Component added to canvas"))),
            Err(CanvasError::Catalog(err)) => {
                warn!("event=canvas_drop module=api status=error type_key={type_key}");
                ActionResponse::failure(format!("Failed to add component: {err}"))
            }
            Err(err) => canvas_failure(err),
        }
    }

    pub fn connect(&mut self, source: &str, target: &str) -> ActionResponse<Edge> {
        match self.canvas.connect(&mut self.store, source, target) {
            Ok(edge) => ActionResponse::success(edge, None),
            Err(err) => canvas_failure(err),
        }
    }

    pub fn move_component(&mut self, node_id: &str, x: f64, y: f64) -> ActionResponse<()> {
        match self
            .canvas
            .move_node(&mut self.store, node_id, Position::new(x, y))
        {
            Ok(()) => ActionResponse::success((), None),
            Err(err) => canvas_failure(err),
        }
    }

    pub fn select_component(&mut self, node_id: &str) -> ActionResponse<()> {
        match self.canvas.select(&self.store, node_id) {
            Ok(()) => ActionResponse::success((), None),
            Err(err) => canvas_failure(err),
        }
    }

    pub fn clear_selection(&mut self) {
        self.canvas.clear_selection();
    }

    pub fn delete_selected(&mut self) -> ActionResponse<Node> {
        match self.canvas.delete_selected(&mut self.store) {
            Ok(node) => ActionResponse::success(node, Some(Notice::success("Component deleted"))),
            Err(err) => canvas_failure(err),
        }
    }

    /// Forwards a host key press (`"Delete"`, `"Backspace"`, ...).
    ///
    /// `data` is the deleted node, if the key deleted one.
    pub fn key_pressed(&mut self, key: &str, focus: FocusTarget) -> ActionResponse<Option<Node>> {
        match self
            .canvas
            .handle_key(&mut self.store, CanvasKey::from_name(key), focus)
        {
            Ok(KeyOutcome::Deleted(node)) => {
                ActionResponse::success(Some(node), Some(Notice::success("Component deleted")))
            }
            Ok(KeyOutcome::Ignored | KeyOutcome::Suppressed) => ActionResponse::success(None, None),
            Err(err) => canvas_failure(err),
        }
    }

    /// Empties the canvas once the user `confirmed`.
    pub fn clear_canvas(&mut self, confirmed: bool) -> ActionResponse<ClearOutcome> {
        match self.canvas.clear(&mut self.store, confirmed) {
            Ok(ClearOutcome::Cleared) => {
                ActionResponse::success(ClearOutcome::Cleared, Some(Notice::success("Canvas cleared")))
            }
            Ok(outcome) => ActionResponse::success(outcome, None),
            Err(err) => canvas_failure(err),
        }
    }

    // ---- properties ----

    pub fn update_component(&mut self, node_id: &str, patch: NodeDataPatch) -> ActionResponse<Node> {
        let result = properties::update_node_data(&mut self.store, node_id, patch);
        self.canvas.resync(&self.store);
        match result {
            Ok(node) => ActionResponse::success(node, None),
            Err(err) => property_failure(err),
        }
    }

    /// Property-panel delete of `node_id` with its edges.
    pub fn delete_component(&mut self, node_id: &str) -> ActionResponse<Node> {
        let result = properties::delete_node(&mut self.store, node_id);
        self.canvas.resync(&self.store);
        match result {
            Ok(node) => ActionResponse::success(node, Some(Notice::success("Component deleted"))),
            Err(err) => property_failure(err),
        }
    }

    // ---- toolbar ----

    pub fn auto_arrange(&mut self) -> ActionResponse<usize> {
        let result = toolbar::auto_arrange(&mut self.store);
        self.canvas.resync(&self.store);
        match result {
            Ok(count) => ActionResponse::success(count, Some(Notice::success("Components auto-arranged"))),
            Err(ToolbarError::NoComponents) => ActionResponse::failure("No components to arrange"),
            Err(err) => toolbar_failure(err),
        }
    }

    /// Aligns every component; `alignment` is `left`, `center` or `right`.
    pub fn align(&mut self, alignment: &str) -> ActionResponse<f64> {
        let Some(alignment) = Alignment::parse(alignment) else {
            return ActionResponse::failure(format!("Unknown alignment: {alignment}"));
        };
        let result = toolbar::align_nodes(&mut self.store, alignment);
        self.canvas.resync(&self.store);
        match result {
            Ok(x) => ActionResponse::success(
                x,
                Some(Notice::success(format!("Components aligned {}", alignment.as_str()))),
            ),
            Err(ToolbarError::NotEnoughComponents { .. }) => {
                ActionResponse::failure("Select multiple components to align")
            }
            Err(err) => toolbar_failure(err),
        }
    }

    pub fn duplicate_selected(&mut self) -> ActionResponse<Node> {
        self.canvas.observe(&self.store);
        let Some(selected) = self.canvas.selected().map(str::to_string) else {
            return ActionResponse::failure("Select a component to duplicate");
        };
        let result = toolbar::duplicate_node(&mut self.store, &selected);
        self.canvas.resync(&self.store);
        match result {
            Ok(node) => ActionResponse::success(node, Some(Notice::success("Component duplicated"))),
            Err(err) => toolbar_failure(err),
        }
    }

    pub fn copy_selected(&mut self) -> ActionResponse<()> {
        self.canvas.observe(&self.store);
        match self.clipboard.copy(&self.store, self.canvas.selected()) {
            Ok(()) => ActionResponse::success((), Some(Notice::success("Component copied"))),
            Err(ToolbarError::NothingSelected) => ActionResponse::failure("Select a component to copy"),
            Err(err) => toolbar_failure(err),
        }
    }

    pub fn paste(&mut self) -> ActionResponse<Node> {
        let result = self.clipboard.paste(&mut self.store);
        self.canvas.resync(&self.store);
        match result {
            Ok(node) => ActionResponse::success(node, Some(Notice::success("Component pasted"))),
            Err(ToolbarError::ClipboardEmpty) => ActionResponse::failure("Nothing to paste"),
            Err(err) => toolbar_failure(err),
        }
    }

    // ---- templates ----

    pub fn templates(&self, filter: &TemplateFilter) -> Vec<Template> {
        self.templates.filter(filter).into_iter().cloned().collect()
    }

    pub fn use_template(&mut self, id: &str) -> ActionResponse<Project> {
        let today = self.today();
        let result = use_template(&mut self.store, &self.templates, id, today);
        self.canvas.resync(&self.store);
        match result {
            Ok(project) => {
                let name = self
                    .templates
                    .get(id)
                    .map_or(project.name.as_str(), |template| template.name.as_str());
                let notice = Notice::success(format!("Template \"{name}\" loaded successfully!"));
                ActionResponse::success(project, Some(notice))
            }
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    }

    // ---- import / export ----

    /// Exports the current project; `format` is an id such as `svg` or `md`.
    pub fn export(&self, format: &str, include_background: bool) -> ActionResponse<ExportOutput> {
        let Some(format) = ExportFormat::parse(format) else {
            return ActionResponse::failure(format!("Unknown export format: {format}"));
        };
        let options = ExportOptions {
            include_background,
            generated_on: self.today(),
        };
        match export_current(&self.store, format, &options) {
            Ok(ExportOutput::Placeholder { format, notice }) => {
                let toast = Notice::info(notice.clone());
                ActionResponse::success(ExportOutput::Placeholder { format, notice }, Some(toast))
            }
            Ok(output) => {
                let notice = Notice::success(format!("Project exported as {}", format.id().to_uppercase()));
                ActionResponse::success(output, Some(notice))
            }
            Err(ExportError::NoProject) => ActionResponse::failure("No project to export"),
            Err(err) => {
                warn!(
                    "event=project_export module=api status=error format={}",
                    format.id()
                );
                ActionResponse::failure(format!("Export failed: {err}"))
            }
        }
    }

    /// Imports a project file's text as a new, current project.
    pub fn import_json(&mut self, text: &str) -> ActionResponse<Project> {
        match self.store.import_project_json(text) {
            Ok(project) => {
                self.canvas.resync(&self.store);
                ActionResponse::success(project, Some(Notice::success("Project imported successfully!")))
            }
            Err(ImportError::Malformed(_)) => {
                ActionResponse::failure("Failed to import project. Please check the file format.")
            }
        }
    }

    /// Imports the project embedded in a share link.
    pub fn open_share_link(&mut self, link: &str) -> ActionResponse<Project> {
        match decode_share_link(link) {
            Ok(document) => {
                let project = self.store.import_project(document);
                self.canvas.resync(&self.store);
                ActionResponse::success(project, Some(Notice::success("Project imported successfully!")))
            }
            Err(err) => {
                warn!("event=share_open module=api status=error error={err}");
                ActionResponse::failure("Failed to import project. Please check the file format.")
            }
        }
    }

    pub fn share_links(&self) -> ActionResponse<ShareLinks> {
        let Some(project) = self.store.current_project() else {
            return ActionResponse::failure("No project to export");
        };
        let links = share_link(project, &self.share_origin).and_then(|share| {
            Ok(ShareLinks {
                email: email_link(project),
                twitter: twitter_intent(project)?,
                linkedin: linkedin_intent(project, &self.share_origin)?,
                share,
            })
        });
        match links {
            Ok(links) => {
                ActionResponse::success(links, Some(Notice::success("Shareable link copied to clipboard!")))
            }
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    }

    // ---- assistant ----

    pub fn is_ai_available(&self) -> bool {
        self.completion.is_available()
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        self.assistant.messages()
    }

    pub fn quick_action(&self, id: &str) -> Option<&'static QuickAction> {
        quick_action(id)
    }

    /// Sends `input` to the assistant and waits for the answer.
    ///
    /// `data` is the appended assistant message: the answer (still to be
    /// revealed) or the fallback apology.
    pub fn ask(&mut self, input: &str) -> ActionResponse<ChatMessage> {
        let resolution = self
            .assistant
            .ask(input, self.store.current_project(), &self.completion);
        match resolution {
            Ok(Resolution::Answered(id)) => match self.assistant.message(id) {
                Some(message) => ActionResponse::success(message.clone(), None),
                None => ActionResponse::failure("Failed to get AI response"),
            },
            Ok(Resolution::Failed { message_id, cause }) => {
                warn!("event=assistant_ask module=api status=error cause={}", cause_tag(&cause));
                ActionResponse {
                    ok: false,
                    data: self.assistant.message(message_id).cloned(),
                    notice: Some(Notice::error("Failed to get AI response")),
                }
            }
            Err(AssistantError::Unavailable) => {
                ActionResponse::failure("AI service is not available. Please check your API key.")
            }
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    }

    /// Typewriter over the answer being revealed, if any.
    pub fn reveal(&self) -> Option<Typewriter> {
        self.assistant.typewriter()
    }

    /// Marks the reveal of `id` done; input is re-enabled.
    pub fn finish_reveal(&mut self, id: MessageId) -> bool {
        self.assistant.finish_reveal(id)
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}

fn parse_project_id(raw: &str) -> Option<ProjectId> {
    Uuid::parse_str(raw.trim()).ok()
}

fn canvas_failure<T>(err: CanvasError) -> ActionResponse<T> {
    match err {
        CanvasError::NoProject => ActionResponse::failure("Create or open a project first"),
        other => ActionResponse::failure(other.to_string()),
    }
}

fn property_failure<T>(err: PropertyError) -> ActionResponse<T> {
    match err {
        PropertyError::NoProject => ActionResponse::failure("Create or open a project first"),
        other => ActionResponse::failure(other.to_string()),
    }
}

fn toolbar_failure<T>(err: ToolbarError) -> ActionResponse<T> {
    match err {
        ToolbarError::NoProject => ActionResponse::failure("Create or open a project first"),
        other => ActionResponse::failure(other.to_string()),
    }
}

fn cause_tag(cause: &CompletionError) -> &'static str {
    match cause {
        CompletionError::Unavailable => "unavailable",
        CompletionError::EmptyResponse => "empty_response",
        CompletionError::InvalidApiKey => "invalid_api_key",
        CompletionError::QuotaExceeded => "quota_exceeded",
        CompletionError::ModelNotFound => "model_not_found",
        CompletionError::Http { .. } => "http",
        CompletionError::Network(_) => "network",
        CompletionError::Decode(_) => "decode",
    }
}
