/// Graph audit and export — structural reads over a scene document.
///
/// Metrics mirror the batch-evaluation collaborator that scores generated
/// scenes; the Mermaid export feeds report/debugging views.

use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::VecDeque;

use crate::schema::scene::Scene;

/// Structural metrics for one scene document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetrics {
    pub scene_id: String,
    pub variant_id: String,
    pub node_count: usize,
    pub ending_count: usize,
    pub choices_per_node_min: usize,
    pub choices_per_node_max: usize,
    pub reachable_nodes_count: usize,
    pub reachable_endings_count: usize,
    pub dangling_target_count: usize,
}

/// A choice whose target matches no node or ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingRef {
    pub node_id: String,
    pub choice_id: String,
    pub to: String,
}

/// Every dangling choice target in document order.
pub fn dangling_targets(scene: &Scene) -> Vec<DanglingRef> {
    let mut out = Vec::new();
    for node in &scene.nodes {
        for choice in &node.choices {
            let to = choice.to.trim();
            if to.is_empty() || !scene.has_target(to) {
                out.push(DanglingRef {
                    node_id: node.node_id.clone(),
                    choice_id: choice.choice_id.clone(),
                    to: choice.to.clone(),
                });
            }
        }
    }
    out
}

/// Node and ending ids reachable by BFS from the first node, ignoring
/// guards. Guards can only narrow reachability, so anything unreachable
/// here is unreachable at runtime too.
pub fn reachable_sets(scene: &Scene) -> (FxHashSet<String>, FxHashSet<String>) {
    let mut seen_nodes: FxHashSet<String> = FxHashSet::default();
    let mut seen_endings: FxHashSet<String> = FxHashSet::default();

    let Some(start) = scene.first_node_id() else {
        return (seen_nodes, seen_endings);
    };

    let mut queue: VecDeque<&str> = VecDeque::from([start]);
    while let Some(node_id) = queue.pop_front() {
        if !seen_nodes.insert(node_id.to_string()) {
            continue;
        }
        let Some(node) = scene.node(node_id) else {
            continue;
        };
        for choice in &node.choices {
            if scene.node(&choice.to).is_some() {
                if !seen_nodes.contains(&choice.to) {
                    queue.push_back(&choice.to);
                }
            } else if scene.ending(&choice.to).is_some() {
                seen_endings.insert(choice.to.clone());
            }
        }
    }

    (seen_nodes, seen_endings)
}

/// `(reachable nodes, reachable endings)` counts.
pub fn reachable_counts(scene: &Scene) -> (usize, usize) {
    let (nodes, endings) = reachable_sets(scene);
    (nodes.len(), endings.len())
}

/// Full structural census of a scene.
pub fn compute_metrics(scene: &Scene) -> SceneMetrics {
    let (reachable_nodes, reachable_endings) = reachable_counts(scene);

    let mut min_choices = None;
    let mut max_choices = None;
    for node in &scene.nodes {
        let count = node.choices.len();
        min_choices = Some(min_choices.map_or(count, |m: usize| m.min(count)));
        max_choices = Some(max_choices.map_or(count, |m: usize| m.max(count)));
    }

    SceneMetrics {
        scene_id: scene.scene_id.clone(),
        variant_id: scene.variant_id.clone(),
        node_count: scene.nodes.len(),
        ending_count: scene.endings.len(),
        choices_per_node_min: min_choices.unwrap_or(0),
        choices_per_node_max: max_choices.unwrap_or(0),
        reachable_nodes_count: reachable_nodes,
        reachable_endings_count: reachable_endings,
        dangling_target_count: dangling_targets(scene).len(),
    }
}

/// Render the scene graph as a Mermaid `flowchart TD` document.
///
/// Nodes render as boxes, endings as stadium shapes, with edges labeled
/// by the choice's move type or its display text. Dangling edges are
/// kept so the broken reference shows up in the diagram.
pub fn to_mermaid(scene: &Scene) -> String {
    let mut lines = vec!["flowchart TD".to_string()];

    if let Some(first) = scene.first_node_id() {
        lines.push(format!("  START([START]) --> {first}"));
    }

    for node in &scene.nodes {
        let node_id = &node.node_id;
        lines.push(format!("  {node_id}[\"{node_id}\"]"));
        for choice in &node.choices {
            let to = &choice.to;
            let label = edge_label(choice.move_type.as_deref(), &choice.text);
            if scene.ending(to).is_some() && scene.node(to).is_none() {
                lines.push(format!("  {to}([\"END: {to}\"])"));
            }
            lines.push(format!("  {node_id} -->|\"{label}\"| {to}"));
        }
    }

    lines.join("\n")
}

fn edge_label(move_type: Option<&str>, text: &str) -> String {
    move_type
        .filter(|m| !m.is_empty())
        .unwrap_or(text)
        .replace('"', "'")
}
