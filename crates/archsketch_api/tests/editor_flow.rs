use archsketch_api::api::DEFAULT_SHARE_ORIGIN;
use archsketch_api::{Editor, NoticeLevel};
use archsketch_core::assistant::completion::{CompletionError, TextCompletion};
use archsketch_core::assistant::session::{Role, FALLBACK_APOLOGY};
use archsketch_core::export::ExportOutput;
use archsketch_core::service::canvas::{CanvasView, ClearOutcome, FocusTarget};
use archsketch_core::service::properties::NodeDataPatch;
use archsketch_core::service::template::TemplateFilter;
use archsketch_core::{ManualClock, MemoryKeyValueStore, SqliteKeyValueStore, UnavailableCompletion};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

struct Canned(Result<String, CompletionError>);

impl TextCompletion for Canned {
    fn is_available(&self) -> bool {
        true
    }

    fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.0.clone()
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
    ))
}

fn editor() -> Editor<MemoryKeyValueStore, UnavailableCompletion> {
    Editor::new(
        MemoryKeyValueStore::new(),
        UnavailableCompletion,
        "editor-test",
        clock(),
    )
    .unwrap()
}

#[test]
fn create_project_validates_name() {
    let mut editor = editor();
    let rejected = editor.create_project("   ", "");
    assert!(!rejected.ok);
    assert_eq!(rejected.message(), "Project name is required");
    assert!(editor.projects().is_empty());

    let created = editor.create_project("Checkout", "Payments flow");
    assert!(created.ok);
    assert_eq!(created.message(), "Project created successfully!");
    assert_eq!(created.notice.unwrap().level, NoticeLevel::Success);
    assert_eq!(editor.current_project().unwrap().name, "Checkout");
}

#[test]
fn canvas_requires_a_project() {
    let mut editor = editor();
    assert_eq!(editor.canvas_view(), CanvasView::Placeholder);
    let response = editor.add_component("server", 10.0, 10.0);
    assert!(!response.ok);
    assert_eq!(response.message(), "Create or open a project first");
}

#[test]
fn switching_projects_replaces_the_canvas_graph() {
    let mut editor = editor();
    let first = editor.create_project("First", "").data.unwrap();
    let gateway = editor.add_component("gateway", 0.0, 0.0).data.unwrap();
    let database = editor.add_component("database", 200.0, 0.0).data.unwrap();
    assert!(editor.connect(&gateway.id, &database.id).ok);
    assert!(editor.select_component(&gateway.id).ok);

    let second = editor.create_project("Second", "").data.unwrap();
    let cdn = editor.add_component("cdn", 50.0, 50.0).data.unwrap();

    assert!(editor.open_project(&first.id.to_string()).ok);
    assert!(editor.select_component(&gateway.id).ok);
    assert!(editor.open_project(&second.id.to_string()).ok);

    assert_eq!(editor.selected_component(), None);
    match editor.canvas_view() {
        CanvasView::Graph {
            project_id,
            nodes,
            edges,
            selected,
        } => {
            assert_eq!(project_id, second.id);
            let ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
            assert_eq!(ids, vec![cdn.id.as_str()]);
            assert!(edges.is_empty());
            assert!(selected.is_none());
        }
        CanvasView::Placeholder => panic!("expected the second project's graph"),
    }
}

#[test]
fn save_stamps_the_current_project() {
    let mut editor = editor();
    let missing = editor.save_project();
    assert!(!missing.ok);
    assert_eq!(missing.message(), "No project to save");

    editor.create_project("Saved", "");
    let saved = editor.save_project();
    assert!(saved.ok);
    assert_eq!(saved.message(), "Project saved!");
    assert_eq!(saved.data.unwrap().name, "Saved");
}

#[test]
fn delete_key_cascades_but_not_inside_text_fields() {
    let mut editor = editor();
    editor.create_project("Cascade", "");
    let a = editor.add_component("gateway", 0.0, 0.0).data.unwrap();
    let b = editor.add_component("database", 200.0, 0.0).data.unwrap();
    let c = editor.add_component("cache", 400.0, 0.0).data.unwrap();
    assert!(editor.connect(&a.id, &b.id).ok);
    assert!(editor.connect(&b.id, &c.id).ok);
    assert!(editor.connect(&a.id, &c.id).ok);

    assert!(editor.select_component(&b.id).ok);
    let suppressed = editor.key_pressed("Delete", FocusTarget::TextInput);
    assert_eq!(suppressed.data, Some(None));
    assert_eq!(editor.current_project().unwrap().nodes.len(), 3);

    let deleted = editor.key_pressed("Backspace", FocusTarget::Canvas);
    assert_eq!(deleted.data.as_ref().unwrap().as_ref().unwrap().id, b.id);
    assert_eq!(deleted.message(), "Component deleted");

    let project = editor.current_project().unwrap();
    assert_eq!(project.nodes.len(), 2);
    assert_eq!(project.edges.len(), 1);
    assert_eq!(project.edges[0].source, a.id);
    assert_eq!(project.edges[0].target, c.id);
}

#[test]
fn toolbar_edits_are_visible_to_the_canvas() {
    let mut editor = editor();
    editor.create_project("Layout", "");
    assert_eq!(editor.auto_arrange().message(), "No components to arrange");

    let first = editor.add_component("server", 7.0, 3.0).data.unwrap();
    assert_eq!(
        editor.align("left").message(),
        "Select multiple components to align"
    );
    editor.add_component("cache", 900.0, 40.0);

    let arranged = editor.auto_arrange();
    assert_eq!(arranged.data, Some(2));
    // Same clock tick as the drop; the next canvas push must not undo the arrange.
    editor.move_component(&first.id, 100.0, 500.0);
    let xs: Vec<f64> = editor
        .current_project()
        .unwrap()
        .nodes
        .iter()
        .map(|node| node.position.x)
        .collect();
    assert_eq!(xs, vec![100.0, 300.0]);

    let aligned = editor.align("right");
    assert_eq!(aligned.data, Some(300.0));
    assert_eq!(aligned.message(), "Components aligned right");
}

#[test]
fn duplicate_copy_and_paste_use_the_selection() {
    let mut editor = editor();
    editor.create_project("Clipboard", "");
    assert_eq!(editor.paste().message(), "Nothing to paste");
    assert_eq!(editor.copy_selected().message(), "Select a component to copy");
    assert_eq!(
        editor.duplicate_selected().message(),
        "Select a component to duplicate"
    );

    let node = editor.add_component("auth", 10.0, 20.0).data.unwrap();
    editor.select_component(&node.id);
    let duplicate = editor.duplicate_selected().data.unwrap();
    assert_eq!(duplicate.data.label, "Authentication Copy");
    assert_eq!((duplicate.position.x, duplicate.position.y), (60.0, 70.0));

    assert!(editor.copy_selected().ok);
    editor.delete_component(&node.id);
    let pasted = editor.paste();
    assert_eq!(pasted.message(), "Component pasted");
    assert_ne!(pasted.data.unwrap().id, node.id);
    assert_eq!(editor.current_project().unwrap().nodes.len(), 2);
}

#[test]
fn property_update_clears_technology_with_empty_string() {
    let mut editor = editor();
    editor.create_project("Props", "");
    let node = editor.add_component("database", 0.0, 0.0).data.unwrap();
    let updated = editor
        .update_component(
            &node.id,
            NodeDataPatch {
                label: Some("Orders DB".to_string()),
                technology: Some("PostgreSQL".to_string()),
                ..NodeDataPatch::default()
            },
        )
        .data
        .unwrap();
    assert_eq!(updated.data.technology.as_deref(), Some("PostgreSQL"));

    let cleared = editor
        .update_component(
            &node.id,
            NodeDataPatch {
                technology: Some(String::new()),
                ..NodeDataPatch::default()
            },
        )
        .data
        .unwrap();
    assert_eq!(cleared.data.label, "Orders DB");
    assert_eq!(cleared.data.technology, None);
}

#[test]
fn template_loads_into_a_dated_project() {
    let mut editor = editor();
    let social = editor.templates(&TemplateFilter {
        category: None,
        search: "social".to_string(),
    });
    assert_eq!(social.len(), 1);

    let loaded = editor.use_template(&social[0].id);
    assert_eq!(
        loaded.message(),
        format!("Template \"{}\" loaded successfully!", social[0].name)
    );
    let project = loaded.data.unwrap();
    assert_eq!(project.name, format!("{} - 2026-05-04", social[0].name));
    assert_eq!(project.nodes.len(), social[0].nodes.len());
    match editor.canvas_view() {
        CanvasView::Graph { nodes, .. } => assert_eq!(nodes.len(), social[0].nodes.len()),
        CanvasView::Placeholder => panic!("template project should be current"),
    }

    assert!(!editor.use_template("nope").ok);
}

#[test]
fn export_formats_and_placeholders() {
    let mut editor = editor();
    assert_eq!(editor.export("svg", true).message(), "No project to export");

    editor.create_project("Empty", "");
    assert!(!editor.export("svg", true).ok);

    editor.add_component("server", 0.0, 0.0);
    let markdown = editor.export("md", true);
    assert_eq!(markdown.message(), "Project exported as MARKDOWN");
    match markdown.data.unwrap() {
        ExportOutput::Document {
            file_name,
            contents,
            ..
        } => {
            assert_eq!(file_name, "Empty.md");
            assert!(contents.ends_with("*Generated by ArchSketch on 2026-05-04*\n"));
        }
        other => panic!("expected a document, got {other:?}"),
    }

    let pdf = editor.export("pdf", true);
    assert!(pdf.ok);
    assert_eq!(pdf.notice.unwrap().level, NoticeLevel::Info);
    assert!(matches!(pdf.data, Some(ExportOutput::Placeholder { .. })));

    assert!(!editor.export("bmp", true).ok);
}

#[test]
fn import_failure_leaves_projects_untouched() {
    let mut editor = editor();
    editor.create_project("Keep", "");
    let failed = editor.import_json("{ not json");
    assert_eq!(
        failed.message(),
        "Failed to import project. Please check the file format."
    );
    assert_eq!(editor.projects().len(), 1);

    let imported = editor.import_json(r#"{"name":"Imported","nodes":[],"edges":[]}"#);
    assert_eq!(imported.message(), "Project imported successfully!");
    assert_eq!(editor.projects().len(), 2);
    assert_eq!(editor.current_project().unwrap().name, "Imported");
}

#[test]
fn share_link_reopens_as_a_copy() {
    let mut editor = editor();
    editor.create_project("Shared", "demo");
    editor.add_component("cdn", 1.0, 2.0);

    let links = editor.share_links();
    assert_eq!(links.message(), "Shareable link copied to clipboard!");
    let links = links.data.unwrap();
    assert!(links.share.starts_with(&format!("{DEFAULT_SHARE_ORIGIN}/shared?data=")));
    assert!(links.email.starts_with("mailto:"));

    let original_id = editor.current_project().unwrap().id;
    let reopened = editor.open_share_link(&links.share).data.unwrap();
    assert_ne!(reopened.id, original_id);
    assert_eq!(reopened.nodes.len(), 1);
}

#[test]
fn assistant_unavailable_and_failure_notices() {
    let mut editor = editor();
    let response = editor.ask("design a url shortener");
    assert_eq!(
        response.message(),
        "AI service is not available. Please check your API key."
    );
    assert!(editor.chat_messages().is_empty());

    let mut failing = Editor::new(
        MemoryKeyValueStore::new(),
        Canned(Err(CompletionError::QuotaExceeded)),
        "editor-test",
        clock(),
    )
    .unwrap();
    let response = failing.ask("design a url shortener");
    assert!(!response.ok);
    assert_eq!(response.message(), "Failed to get AI response");
    assert_eq!(response.data.unwrap().content, FALLBACK_APOLOGY);
}

#[test]
fn assistant_answer_is_revealed_then_input_reopens() {
    let mut editor = Editor::new(
        MemoryKeyValueStore::new(),
        Canned(Ok("Use a queue.".to_string())),
        "editor-test",
        clock(),
    )
    .unwrap();

    let answer = editor.ask("How do I scale writes?").data.unwrap();
    assert_eq!(answer.role, Role::Assistant);
    assert!(answer.revealing);
    assert_eq!(editor.ask("again").message(), "the assistant is still answering");

    let revealed: String = editor.reveal().unwrap().map(|(ch, _)| ch).collect();
    assert_eq!(revealed, "Use a queue.");
    assert!(editor.finish_reveal(answer.id));
    assert_eq!(editor.chat_messages().len(), 2);
    assert!(editor.ask("and reads?").ok);
}

#[test]
fn clear_canvas_needs_confirmation() {
    let mut editor = editor();
    editor.create_project("Clear", "");
    assert_eq!(editor.clear_canvas(true).data, Some(ClearOutcome::AlreadyEmpty));
    editor.add_component("users", 0.0, 0.0);
    assert_eq!(editor.clear_canvas(false).data, Some(ClearOutcome::Cancelled));
    let cleared = editor.clear_canvas(true);
    assert_eq!(cleared.message(), "Canvas cleared");
    assert!(editor.current_project().unwrap().nodes.is_empty());
}

#[test]
fn sqlite_backed_editor_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.sqlite3");
    {
        let kv = SqliteKeyValueStore::open(&path).unwrap();
        let mut editor = Editor::new(kv, UnavailableCompletion, "persisted", clock()).unwrap();
        editor.create_project("Durable", "");
        editor.add_component("storage", 5.0, 5.0);
    }

    let kv = SqliteKeyValueStore::open(&path).unwrap();
    let mut editor = Editor::new(kv, UnavailableCompletion, "persisted", clock()).unwrap();
    assert_eq!(editor.projects().len(), 1);
    match editor.canvas_view() {
        CanvasView::Graph { nodes, .. } => assert_eq!(nodes.len(), 1),
        CanvasView::Placeholder => panic!("current project should be restored"),
    }
}
