/// Scene document model — the JSON shape produced by the content generator.
///
/// Intake is deserialization only. Structural validation belongs to the
/// upstream validator collaborator; the engine tolerates whatever survives
/// deserialization (including dangling choice targets).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed ending taxonomy. Lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingType {
    Success,
    Mixed,
    Failure,
    Twist,
}

impl EndingType {
    /// Returns the wire label for this ending type (e.g., "success").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Mixed => "mixed",
            Self::Failure => "failure",
            Self::Twist => "twist",
        }
    }
}

/// A selectable option leaving a node.
///
/// `guards` and `effects` hold raw expression strings; they are parsed
/// lazily at evaluation time so that malformed generated content degrades
/// per-expression instead of failing document intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub choice_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    pub to: String,
}

/// A narration beat with outgoing choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: String,
    pub narration: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Node {
    /// Look up a choice on this node by id.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.choice_id == choice_id)
    }
}

/// A terminal outcome. `weight` is informational authoring metadata;
/// the engine carries it but never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ending {
    pub ending_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub ending_type: EndingType,
    pub narration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Opening narration shown before the first node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intro {
    #[serde(default)]
    pub narration: String,
}

/// Optional seed values for the first world-state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialState {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: HashMap<String, f64>,
    #[serde(default)]
    pub facts: HashMap<String, String>,
    #[serde(default)]
    pub goals: HashMap<String, f64>,
}

/// An immutable scene document, owned by the caller for the lifetime of
/// a playthrough. The engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub scene_id: String,
    pub variant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Intro,
    pub nodes: Vec<Node>,
    pub endings: Vec<Ending>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<InitialState>,
}

impl Scene {
    /// Parse a scene document from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Scene, SceneError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a scene document from an already-deserialized JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Scene, SceneError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load a scene document from a JSON file.
    pub fn load_from_json(path: &Path) -> Result<Scene, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Look up a node by id.
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Look up an ending by id.
    pub fn ending(&self, ending_id: &str) -> Option<&Ending> {
        self.endings.iter().find(|e| e.ending_id == ending_id)
    }

    /// The id of the first node in document order, if any.
    pub fn first_node_id(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.node_id.as_str())
    }

    /// Returns true if `id` names a node or an ending in this scene.
    pub fn has_target(&self, id: &str) -> bool {
        self.node(id).is_some() || self.ending(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "sceneId": "s1",
        "variantId": "default",
        "intro": { "narration": "It begins." },
        "nodes": [
            {
                "nodeId": "N1",
                "narration": "A door.",
                "choices": [
                    { "choiceId": "c1", "text": "Open it", "to": "END1" }
                ]
            }
        ],
        "endings": [
            {
                "endingId": "END1",
                "title": "Through",
                "type": "success",
                "narration": "You step through."
            }
        ]
    }"#;

    #[test]
    fn parse_minimal_document() {
        let scene = Scene::from_json_str(MINIMAL).unwrap();
        assert_eq!(scene.scene_id, "s1");
        assert_eq!(scene.variant_id, "default");
        assert_eq!(scene.intro.narration, "It begins.");
        assert_eq!(scene.nodes.len(), 1);
        assert_eq!(scene.endings.len(), 1);
        assert!(scene.initial_state.is_none());
    }

    #[test]
    fn choice_defaults_empty_guards_and_effects() {
        let scene = Scene::from_json_str(MINIMAL).unwrap();
        let choice = &scene.nodes[0].choices[0];
        assert!(choice.guards.is_empty());
        assert!(choice.effects.is_empty());
        assert!(choice.move_type.is_none());
    }

    #[test]
    fn ending_type_wire_labels() {
        let json = r#"{"endingId":"e","title":"T","type":"twist","narration":"n"}"#;
        let ending: Ending = serde_json::from_str(json).unwrap();
        assert_eq!(ending.ending_type, EndingType::Twist);
        assert_eq!(ending.ending_type.label(), "twist");
        assert!(ending.weight.is_none());
    }

    #[test]
    fn unknown_fields_tolerated() {
        let json = r#"{
            "sceneId": "s1",
            "variantId": "v",
            "genre": "noir",
            "intro": { "narration": "x", "mood": "tense" },
            "nodes": [],
            "endings": []
        }"#;
        let scene = Scene::from_json_str(json).unwrap();
        assert!(scene.nodes.is_empty());
        assert!(scene.first_node_id().is_none());
    }

    #[test]
    fn initial_state_fields_default() {
        let json = r#"{
            "sceneId": "s",
            "variantId": "v",
            "nodes": [],
            "endings": [],
            "initialState": { "tags": ["armed"] }
        }"#;
        let scene = Scene::from_json_str(json).unwrap();
        let init = scene.initial_state.unwrap();
        assert_eq!(init.tags, vec!["armed".to_string()]);
        assert!(init.stats.is_empty());
        assert!(init.facts.is_empty());
        assert!(init.goals.is_empty());
    }

    #[test]
    fn lookups_by_id() {
        let scene = Scene::from_json_str(MINIMAL).unwrap();
        assert!(scene.node("N1").is_some());
        assert!(scene.node("END1").is_none());
        assert!(scene.ending("END1").is_some());
        assert!(scene.has_target("N1"));
        assert!(scene.has_target("END1"));
        assert!(!scene.has_target("N404"));
        assert_eq!(scene.first_node_id(), Some("N1"));
        let node = scene.node("N1").unwrap();
        assert!(node.choice("c1").is_some());
        assert!(node.choice("c9").is_none());
    }

    #[test]
    fn round_trip_preserves_shape() {
        let scene = Scene::from_json_str(MINIMAL).unwrap();
        let serialized = serde_json::to_value(&scene).unwrap();
        assert_eq!(serialized["sceneId"], "s1");
        assert_eq!(serialized["nodes"][0]["nodeId"], "N1");
        assert_eq!(serialized["endings"][0]["type"], "success");
        let back = Scene::from_json_value(serialized).unwrap();
        assert_eq!(back.scene_id, scene.scene_id);
    }
}
