//! WASM bindings for scene-engine — powers the web previewer.
//!
//! The previewer talks JSON strings across the boundary: a scene
//! document in, choice lists / transition results / state snapshots out.

use wasm_bindgen::prelude::*;

use scene_engine::core::engine::{self, GuardMode, Position, TransitionEvent};
use scene_engine::core::graph;
use scene_engine::schema::scene::Scene;
use scene_engine::schema::state::WorldState;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ChoiceInfo<'a> {
    choice_id: &'a str,
    text: &'a str,
    move_type: Option<&'a str>,
    to: &'a str,
    guard_passed: bool,
}

#[derive(serde::Serialize)]
struct PositionInfo<'a> {
    kind: &'static str,
    id: &'a str,
    narration: Option<&'a str>,
    terminal: bool,
}

#[derive(serde::Serialize)]
struct SelectResult<'a> {
    event: &'static str,
    position: PositionInfo<'a>,
}

fn event_label(event: TransitionEvent) -> &'static str {
    match event {
        TransitionEvent::Ok => "ok",
        TransitionEvent::GuardRejected => "guardRejected",
        TransitionEvent::DanglingTarget => "danglingTarget",
        TransitionEvent::UnknownChoice => "unknownChoice",
    }
}

fn position_info<'a>(scene: &'a Scene, position: &'a Position) -> PositionInfo<'a> {
    let (kind, narration) = match position {
        Position::Node(id) => ("node", scene.node(id).map(|n| n.narration.as_str())),
        Position::Ending(id) => ("ending", scene.ending(id).map(|e| e.narration.as_str())),
        Position::Unresolved(_) => ("unresolved", None),
    };
    PositionInfo {
        kind,
        id: position.id(),
        narration,
        terminal: position.is_terminal(),
    }
}

// ---------------------------------------------------------------------------
// ScenePlaythrough — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ScenePlaythrough {
    scene: Scene,
    position: Position,
    state: WorldState,
    mode: GuardMode,
    entry: Option<String>,
}

#[wasm_bindgen]
impl ScenePlaythrough {
    /// Load a scene document (JSON string) and start at its first node,
    /// or at `entry` when given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        scene_json: &str,
        entry: Option<String>,
        permissive: bool,
    ) -> Result<ScenePlaythrough, JsError> {
        let scene = Scene::from_json_str(scene_json)
            .map_err(|e| JsError::new(&format!("Scene parse error: {e}")))?;
        let position = engine::start(&scene, entry.as_deref())
            .map_err(|e| JsError::new(&format!("Start error: {e}")))?;
        let state = WorldState::seed(scene.initial_state.as_ref());
        let mode = if permissive {
            GuardMode::Permissive
        } else {
            GuardMode::Strict
        };
        Ok(ScenePlaythrough {
            scene,
            position,
            state,
            mode,
            entry,
        })
    }

    /// Scene identifier.
    pub fn scene_id(&self) -> String {
        self.scene.scene_id.clone()
    }

    /// Intro narration shown before the first node.
    pub fn intro(&self) -> String {
        self.scene.intro.narration.clone()
    }

    /// JSON array of the current node's choices, each annotated with
    /// its guard result. Empty at terminal/unresolved positions.
    pub fn available_choices(&self) -> Result<String, JsError> {
        let choices: Vec<ChoiceInfo<'_>> =
            engine::available_choices(&self.scene, &self.position, &self.state)
                .into_iter()
                .map(|status| ChoiceInfo {
                    choice_id: &status.choice.choice_id,
                    text: &status.choice.text,
                    move_type: status.choice.move_type.as_deref(),
                    to: &status.choice.to,
                    guard_passed: status.guard_passed,
                })
                .collect();
        serde_json::to_string(&choices)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Take a choice by id. Returns `{ event, position }` as JSON; the
    /// position is unchanged for rejected/unknown selections.
    pub fn select(&mut self, choice_id: &str) -> Result<String, JsError> {
        let transition = engine::select(
            &self.scene,
            &self.position,
            &self.state,
            choice_id,
            self.mode,
        );
        self.position = transition.position;
        self.state = transition.state;

        let result = SelectResult {
            event: event_label(transition.event),
            position: position_info(&self.scene, &self.position),
        };
        serde_json::to_string(&result)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Current position (kind, id, narration, terminal flag) as JSON.
    pub fn position_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&position_info(&self.scene, &self.position))
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Current world-state snapshot as JSON.
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.state)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Narration for the current node or ending, empty when unresolved.
    pub fn narration(&self) -> String {
        match &self.position {
            Position::Node(id) => self
                .scene
                .node(id)
                .map(|n| n.narration.clone())
                .unwrap_or_default(),
            Position::Ending(id) => self
                .scene
                .ending(id)
                .map(|e| e.narration.clone())
                .unwrap_or_default(),
            Position::Unresolved(_) => String::new(),
        }
    }

    /// True once an ending is reached.
    pub fn is_finished(&self) -> bool {
        self.position.is_terminal()
    }

    /// Toggle permissive guard handling for subsequent selects.
    pub fn set_permissive(&mut self, permissive: bool) {
        self.mode = if permissive {
            GuardMode::Permissive
        } else {
            GuardMode::Strict
        };
    }

    /// Back to the initial position (the constructor's entry, or the
    /// first node) with the state reseeded.
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.position = engine::start(&self.scene, self.entry.as_deref())
            .map_err(|e| JsError::new(&format!("Reset error: {e}")))?;
        self.state = WorldState::seed(self.scene.initial_state.as_ref());
        Ok(())
    }

    /// Structural metrics for the loaded scene, as JSON (for the debug
    /// panel of the previewer).
    pub fn metrics_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&graph::compute_metrics(&self.scene))
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Mermaid flowchart of the loaded scene.
    pub fn mermaid(&self) -> String {
        graph::to_mermaid(&self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "sceneId": "bindings",
        "variantId": "v",
        "nodes": [
            {
                "nodeId": "N1",
                "narration": "front door",
                "choices": [
                    { "choiceId": "onward", "text": "Onward", "to": "N2" }
                ]
            },
            {
                "nodeId": "N2",
                "narration": "back room",
                "choices": [
                    { "choiceId": "back", "text": "Back", "to": "N1" },
                    { "choiceId": "out", "text": "Out", "to": "END1" }
                ]
            }
        ],
        "endings": [
            { "endingId": "END1", "title": "Out", "type": "mixed", "narration": "done" }
        ]
    }"#;

    fn playthrough(entry: Option<&str>) -> ScenePlaythrough {
        ScenePlaythrough::new(SCENE, entry.map(str::to_string), false)
            .map_err(|_| "scene parses")
            .unwrap()
    }

    #[test]
    fn reset_returns_to_the_first_node_by_default() {
        let mut play = playthrough(None);
        play.select("onward").map_err(|_| "select").unwrap();
        play.reset().map_err(|_| "reset").unwrap();
        let position = play.position_json().map_err(|_| "json").unwrap();
        assert!(position.contains("\"id\":\"N1\""));
    }

    #[test]
    fn reset_returns_to_the_constructor_entry() {
        let mut play = playthrough(Some("N2"));
        let position = play.position_json().map_err(|_| "json").unwrap();
        assert!(position.contains("\"id\":\"N2\""));

        play.select("back").map_err(|_| "select").unwrap();
        play.reset().map_err(|_| "reset").unwrap();
        let position = play.position_json().map_err(|_| "json").unwrap();
        assert!(position.contains("\"id\":\"N2\""));
        assert_eq!(play.narration(), "back room");
    }
}
