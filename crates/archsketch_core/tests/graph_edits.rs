use archsketch_core::export::markdown::to_markdown;
use archsketch_core::export::mermaid::to_mermaid;
use archsketch_core::export::svg::to_svg;
use archsketch_core::model::project::ProjectPatch;
use archsketch_core::service::canvas::{CanvasKey, FocusTarget, KeyOutcome};
use archsketch_core::service::properties::delete_node;
use archsketch_core::{
    CanvasController, Edge, MemoryKeyValueStore, Node, NodeData, Position, ProjectStore,
};
use chrono::NaiveDate;

fn node(id: &str, type_key: &str, label: &str, x: f64, y: f64) -> Node {
    let mut node = Node::new(
        type_key,
        Position::new(x, y),
        NodeData {
            label: label.to_string(),
            ..NodeData::default()
        },
    );
    node.id = id.to_string();
    node
}

fn edge(id: &str, source: &str, target: &str) -> Edge {
    let mut edge = Edge::connect(source, target);
    edge.id = id.to_string();
    edge
}

fn store_with(nodes: Vec<Node>, edges: Vec<Edge>) -> ProjectStore<MemoryKeyValueStore> {
    let mut store = ProjectStore::load(MemoryKeyValueStore::new(), "graph-edits");
    store.create_project("Graph", "").unwrap();
    store.update_current_project(ProjectPatch::graph(nodes, edges));
    store
}

#[test]
fn deleting_a_node_removes_only_incident_edges() {
    let mut store = store_with(
        vec![
            node("a1", "server", "A", 0.0, 0.0),
            node("b1", "database", "B", 200.0, 0.0),
        ],
        vec![edge("e1", "a1", "b1")],
    );

    let removed = delete_node(&mut store, "a1").unwrap();
    assert_eq!(removed.id, "a1");

    let project = store.current_project().unwrap();
    assert_eq!(project.nodes.len(), 1);
    assert_eq!(project.nodes[0].id, "b1");
    assert!(project.edges.is_empty());
}

#[test]
fn canvas_delete_key_keeps_unrelated_edges() {
    let mut store = store_with(
        vec![
            node("a1", "server", "A", 0.0, 0.0),
            node("b1", "database", "B", 200.0, 0.0),
            node("c1", "cache", "C", 400.0, 0.0),
        ],
        vec![edge("e1", "a1", "b1"), edge("e2", "b1", "c1"), edge("e3", "a1", "c1")],
    );
    let mut canvas = CanvasController::new();
    canvas.select(&store, "b1").unwrap();

    let outcome = canvas
        .handle_key(&mut store, CanvasKey::Delete, FocusTarget::Canvas)
        .unwrap();
    assert!(matches!(outcome, KeyOutcome::Deleted(ref n) if n.id == "b1"));

    let project = store.current_project().unwrap();
    let edge_ids: Vec<&str> = project.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(edge_ids, vec!["e3"]);
    assert_eq!(canvas.edges().len(), 1);
    assert!(canvas.selected().is_none());
}

#[test]
fn mermaid_declares_nodes_then_arrows() {
    let store = store_with(
        vec![
            node("gateway-1", "gateway", "API Gateway", 0.0, 0.0),
            node("user.service", "microservice", "User Service", 0.0, 200.0),
        ],
        vec![edge("e1", "gateway-1", "user.service")],
    );

    let text = to_mermaid(store.current_project().unwrap()).unwrap();
    assert_eq!(
        text,
        "graph TD\n    gateway_1[\"API Gateway\"]\n    user_service[\"User Service\"]\n    gateway_1 --> user_service\n"
    );
}

#[test]
fn markdown_numbers_connections_and_marks_dangling_endpoints() {
    let store = store_with(
        vec![
            node("a1", "server", "Web", 0.0, 0.0),
            node("b1", "database", "Orders", 200.0, 0.0),
        ],
        vec![edge("e1", "a1", "b1"), edge("e2", "a1", "gone")],
    );
    let project = store.current_project().unwrap();
    let md = to_markdown(project, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()).unwrap();
    assert!(md.starts_with("# Graph\n"));
    assert!(md.contains("System Design Documentation"));
    assert!(md.contains("1. Web → Orders\n2. Web → Unknown\n"));
    assert!(md.contains("Not specified"));
    assert!(md.ends_with("*Generated by ArchSketch on 2026-07-01*\n"));
}

#[test]
fn svg_bounds_cover_every_node() {
    let store = store_with(
        vec![
            node("a1", "server", "A & B", 0.0, 0.0),
            node("b1", "database", "<db>", 300.0, 100.0),
        ],
        vec![edge("e1", "a1", "b1")],
    );
    let svg = to_svg(store.current_project().unwrap(), true).unwrap();
    // 0..450 x 0..180 plus 50px padding on each side.
    assert!(svg.contains("width=\"550\""));
    assert!(svg.contains("height=\"280\""));
    assert!(svg.contains("A &amp; B"));
    assert!(svg.contains("&lt;db&gt;"));
    assert!(svg.contains("<line"));
}
