/// Traversal engine — the state machine walking a scene graph.
///
/// The functional core (`start`, `available_choices`, `select`) operates
/// on borrowed scene/position/state values and never fails: every
/// tolerated document condition becomes a tagged event. `Playthrough`
/// wraps it with owned position + state, a snapshot history, and undo.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{effect, guard};
use crate::schema::scene::{Choice, Ending, Scene};
use crate::schema::state::WorldState;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene '{0}' has no nodes and no explicit entry point")]
    EmptyScene(String),
}

/// Where the playthrough currently is. `Unresolved` marks a dangling
/// choice target: non-terminal, non-fatal, recoverable by reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Position {
    Node(String),
    Ending(String),
    Unresolved(String),
}

impl Position {
    /// The identifier this position points at.
    pub fn id(&self) -> &str {
        match self {
            Self::Node(id) | Self::Ending(id) | Self::Unresolved(id) => id,
        }
    }

    /// True for endings, the only sanctioned terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ending(_))
    }
}

/// How guard failures gate selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Failing guards reject the selection.
    #[default]
    Strict,
    /// Guards annotate only; effects commit unconditionally.
    Permissive,
}

/// What happened on a `select` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionEvent {
    Ok,
    GuardRejected,
    DanglingTarget,
    UnknownChoice,
}

/// A choice paired with whether its guards currently pass, so renderers
/// can show locked affordances without re-deriving state.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceStatus<'a> {
    pub choice: &'a Choice,
    pub guard_passed: bool,
}

/// The outcome of a transition: next position, next state, tagged event.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub position: Position,
    pub state: WorldState,
    pub event: TransitionEvent,
}

/// Resolve an identifier against the scene: node, ending, or dangling.
fn resolve_target(scene: &Scene, id: &str) -> Position {
    if scene.node(id).is_some() {
        Position::Node(id.to_string())
    } else if scene.ending(id).is_some() {
        Position::Ending(id.to_string())
    } else {
        warn!(scene = %scene.scene_id, target = id, "dangling target");
        Position::Unresolved(id.to_string())
    }
}

/// Initial position: the explicit entry id (resolved like a choice
/// target) or the scene's first node.
pub fn start(scene: &Scene, entry: Option<&str>) -> Result<Position, EngineError> {
    match entry {
        Some(id) => Ok(resolve_target(scene, id)),
        None => scene
            .first_node_id()
            .map(|id| Position::Node(id.to_string()))
            .ok_or_else(|| EngineError::EmptyScene(scene.scene_id.clone())),
    }
}

/// Choices leaving the current position, each annotated with its guard
/// result. Terminal, unresolved, and unknown positions yield an empty
/// list rather than failing.
pub fn available_choices<'a>(
    scene: &'a Scene,
    position: &Position,
    state: &WorldState,
) -> Vec<ChoiceStatus<'a>> {
    let Position::Node(node_id) = position else {
        return Vec::new();
    };
    let Some(node) = scene.node(node_id) else {
        debug!(scene = %scene.scene_id, node = %node_id, "unknown position queried");
        return Vec::new();
    };
    node.choices
        .iter()
        .map(|choice| ChoiceStatus {
            choice,
            guard_passed: guard::passes_all(state, &choice.guards),
        })
        .collect()
}

/// Take a choice at the current position.
///
/// Strict mode rejects guard failures with position and state unchanged.
/// Permissive mode commits effects unconditionally. A choice id that is
/// not on the current node (including any select at a terminal or
/// unresolved position) reports `UnknownChoice` as a no-op.
pub fn select(
    scene: &Scene,
    position: &Position,
    state: &WorldState,
    choice_id: &str,
    mode: GuardMode,
) -> Transition {
    let unchanged = |event: TransitionEvent| Transition {
        position: position.clone(),
        state: state.clone(),
        event,
    };

    let Position::Node(node_id) = position else {
        debug!(choice = choice_id, "select at non-node position");
        return unchanged(TransitionEvent::UnknownChoice);
    };
    let Some(node) = scene.node(node_id) else {
        debug!(node = %node_id, "select at unknown node");
        return unchanged(TransitionEvent::UnknownChoice);
    };
    let Some(choice) = node.choice(choice_id) else {
        debug!(node = %node_id, choice = choice_id, "unknown choice");
        return unchanged(TransitionEvent::UnknownChoice);
    };

    if mode == GuardMode::Strict && !guard::passes_all(state, &choice.guards) {
        return unchanged(TransitionEvent::GuardRejected);
    }

    let next_state = effect::apply_all(state, &choice.effects);
    let next_position = resolve_target(scene, &choice.to);
    let event = if matches!(next_position, Position::Unresolved(_)) {
        TransitionEvent::DanglingTarget
    } else {
        TransitionEvent::Ok
    };

    Transition {
        position: next_position,
        state: next_state,
        event,
    }
}

/// One recorded step of a playthrough.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub position: Position,
    pub state: WorldState,
}

/// A stateful playthrough over a borrowed scene.
///
/// Every accepted transition appends a snapshot; `undo`/`redo` move a
/// cursor over that history, and a new transition truncates any redo
/// tail. Built via [`Playthrough::builder`].
pub struct Playthrough<'a> {
    scene: &'a Scene,
    mode: GuardMode,
    entry: Option<String>,
    history: Vec<Snapshot>,
    cursor: usize,
}

/// Builder for configuring a [`Playthrough`].
pub struct PlaythroughBuilder<'a> {
    scene: &'a Scene,
    mode: GuardMode,
    entry: Option<String>,
}

impl<'a> PlaythroughBuilder<'a> {
    /// Start at an explicit node or ending id instead of the first node.
    pub fn entry(mut self, id: &str) -> Self {
        self.entry = Some(id.to_string());
        self
    }

    pub fn guard_mode(mut self, mode: GuardMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Result<Playthrough<'a>, EngineError> {
        let position = start(self.scene, self.entry.as_deref())?;
        let state = WorldState::seed(self.scene.initial_state.as_ref());
        Ok(Playthrough {
            scene: self.scene,
            mode: self.mode,
            entry: self.entry,
            history: vec![Snapshot { position, state }],
            cursor: 0,
        })
    }
}

impl<'a> Playthrough<'a> {
    pub fn builder(scene: &'a Scene) -> PlaythroughBuilder<'a> {
        PlaythroughBuilder {
            scene,
            mode: GuardMode::default(),
            entry: None,
        }
    }

    /// A playthrough with default configuration: first node, strict guards.
    pub fn new(scene: &'a Scene) -> Result<Playthrough<'a>, EngineError> {
        Self::builder(scene).build()
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn guard_mode(&self) -> GuardMode {
        self.mode
    }

    pub fn position(&self) -> &Position {
        &self.history[self.cursor].position
    }

    pub fn state(&self) -> &WorldState {
        &self.history[self.cursor].state
    }

    /// All snapshots up to and including the current one.
    pub fn history(&self) -> &[Snapshot] {
        &self.history[..=self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.position().is_terminal()
    }

    /// The ending reached, if the playthrough is terminal.
    pub fn ending(&self) -> Option<&'a Ending> {
        match self.position() {
            Position::Ending(id) => self.scene.ending(id),
            _ => None,
        }
    }

    /// Narration for the current position. `None` when unresolved.
    pub fn narration(&self) -> Option<&'a str> {
        match self.position() {
            Position::Node(id) => self.scene.node(id).map(|n| n.narration.as_str()),
            Position::Ending(id) => self.scene.ending(id).map(|e| e.narration.as_str()),
            Position::Unresolved(_) => None,
        }
    }

    pub fn available_choices(&self) -> Vec<ChoiceStatus<'a>> {
        available_choices(self.scene, self.position(), self.state())
    }

    /// Select a choice under the configured guard mode.
    pub fn select(&mut self, choice_id: &str) -> TransitionEvent {
        self.select_with(choice_id, self.mode)
    }

    /// Select a choice under an explicit guard mode.
    pub fn select_with(&mut self, choice_id: &str, mode: GuardMode) -> TransitionEvent {
        let transition = select(self.scene, self.position(), self.state(), choice_id, mode);
        match transition.event {
            TransitionEvent::GuardRejected | TransitionEvent::UnknownChoice => {}
            TransitionEvent::Ok | TransitionEvent::DanglingTarget => {
                self.history.truncate(self.cursor + 1);
                self.history.push(Snapshot {
                    position: transition.position,
                    state: transition.state,
                });
                self.cursor += 1;
            }
        }
        transition.event
    }

    /// Step back one snapshot. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward one snapshot. Returns false with nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.history.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Back to the initial position with the state reseeded.
    pub fn reset(&mut self) {
        // Entry resolved at build time, so this cannot fail here.
        let position = start(self.scene, self.entry.as_deref())
            .unwrap_or_else(|_| Position::Unresolved(String::new()));
        let state = WorldState::seed(self.scene.initial_state.as_ref());
        self.history = vec![Snapshot { position, state }];
        self.cursor = 0;
    }
}
