/// Seeded random-walk simulation over a scene graph.
///
/// Used by authoring lint to estimate ending coverage and catch soft
/// locks before a scene ships. Walks are deterministic for a given seed;
/// each run derives its own rng with a prime offset so runs differ while
/// the batch stays reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::core::engine::{self, GuardMode, Position, TransitionEvent};
use crate::schema::scene::Scene;
use crate::schema::state::WorldState;

/// Configuration for a batch of random walks.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub runs: usize,
    pub seed: u64,
    /// Per-walk step cap; a walk that hits it counts as step-limited,
    /// which usually means a guard cycle the walker cannot leave.
    pub max_steps: usize,
    pub mode: GuardMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            seed: 0,
            max_steps: 64,
            mode: GuardMode::Strict,
        }
    }
}

/// Outcome tallies over a batch of walks.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkReport {
    pub runs: usize,
    /// Ending id → times reached.
    pub endings: FxHashMap<String, usize>,
    /// Node id → walks stranded there with no takeable choice.
    pub dead_ends: FxHashMap<String, usize>,
    /// Dangling target id → walks that fell off the graph there.
    pub dangling: FxHashMap<String, usize>,
    pub step_limited: usize,
}

impl WalkReport {
    /// Walks that reached any ending.
    pub fn completed(&self) -> usize {
        self.endings.values().sum()
    }

    /// Endings defined by the scene that no walk reached.
    pub fn unreached_endings<'a>(&self, scene: &'a Scene) -> Vec<&'a str> {
        scene
            .endings
            .iter()
            .map(|e| e.ending_id.as_str())
            .filter(|id| !self.endings.contains_key(*id))
            .collect()
    }
}

/// Run `config.runs` random walks from the scene's start.
pub fn run_walks(scene: &Scene, config: &SimulationConfig) -> WalkReport {
    let mut report = WalkReport {
        runs: config.runs,
        ..WalkReport::default()
    };

    // A scene with no nodes has nothing to walk; every tally stays zero.
    if scene.first_node_id().is_none() {
        return report;
    }

    for run in 0..config.runs {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(run as u64 * 7919));
        walk_once(scene, config, &mut rng, &mut report);
    }

    report
}

fn walk_once(scene: &Scene, config: &SimulationConfig, rng: &mut StdRng, report: &mut WalkReport) {
    let Ok(mut position) = engine::start(scene, None) else {
        // run_walks already skipped node-less scenes.
        return;
    };
    let mut state = WorldState::seed(scene.initial_state.as_ref());

    for _ in 0..config.max_steps {
        match &position {
            Position::Ending(id) => {
                *report.endings.entry(id.clone()).or_insert(0) += 1;
                return;
            }
            Position::Unresolved(id) => {
                *report.dangling.entry(id.clone()).or_insert(0) += 1;
                return;
            }
            Position::Node(node_id) => {
                let annotated = engine::available_choices(scene, &position, &state);
                // Strict walks only consider takeable choices; permissive
                // walks may pick anything, like a viewer in debug mode.
                let candidates: Vec<&str> = annotated
                    .iter()
                    .filter(|cs| config.mode == GuardMode::Permissive || cs.guard_passed)
                    .map(|cs| cs.choice.choice_id.as_str())
                    .collect();

                if candidates.is_empty() {
                    *report.dead_ends.entry(node_id.clone()).or_insert(0) += 1;
                    return;
                }

                let choice_id = candidates[rng.gen_range(0..candidates.len())];
                let transition = engine::select(scene, &position, &state, choice_id, config.mode);
                if transition.event == TransitionEvent::UnknownChoice {
                    // Candidates came from available_choices on this node,
                    // so the select cannot miss; bail rather than spin.
                    return;
                }
                position = transition.position;
                state = transition.state;
            }
        }
    }

    report.step_limited += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branching_scene() -> Scene {
        Scene::from_json_str(
            r#"{
                "sceneId": "sim",
                "variantId": "v",
                "nodes": [
                    {
                        "nodeId": "N1",
                        "narration": "fork",
                        "choices": [
                            { "choiceId": "a", "text": "left", "to": "END_A" },
                            { "choiceId": "b", "text": "right", "to": "END_B" },
                            {
                                "choiceId": "c",
                                "text": "locked door",
                                "guards": ["stat:key>=1"],
                                "to": "END_SECRET"
                            }
                        ]
                    }
                ],
                "endings": [
                    { "endingId": "END_A", "title": "A", "type": "mixed", "narration": "x" },
                    { "endingId": "END_B", "title": "B", "type": "failure", "narration": "y" },
                    { "endingId": "END_SECRET", "title": "S", "type": "twist", "narration": "z" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let scene = branching_scene();
        let config = SimulationConfig {
            runs: 50,
            seed: 7,
            ..SimulationConfig::default()
        };
        let first = run_walks(&scene, &config);
        let second = run_walks(&scene, &config);
        assert_eq!(first.endings, second.endings);
        assert_eq!(first.completed(), second.completed());
    }

    #[test]
    fn strict_walks_never_take_locked_choices() {
        let scene = branching_scene();
        let report = run_walks(
            &scene,
            &SimulationConfig {
                runs: 200,
                seed: 1,
                ..SimulationConfig::default()
            },
        );
        assert_eq!(report.completed(), 200);
        assert!(!report.endings.contains_key("END_SECRET"));
        assert_eq!(report.unreached_endings(&scene), vec!["END_SECRET"]);
        // Both open branches get traffic with this many runs.
        assert!(report.endings.contains_key("END_A"));
        assert!(report.endings.contains_key("END_B"));
    }

    #[test]
    fn permissive_walks_can_take_locked_choices() {
        let scene = branching_scene();
        let report = run_walks(
            &scene,
            &SimulationConfig {
                runs: 200,
                seed: 1,
                mode: GuardMode::Permissive,
                ..SimulationConfig::default()
            },
        );
        assert!(report.endings.contains_key("END_SECRET"));
    }

    #[test]
    fn dead_end_detected() {
        let scene = Scene::from_json_str(
            r#"{
                "sceneId": "stuck",
                "variantId": "v",
                "nodes": [
                    {
                        "nodeId": "N1",
                        "narration": "no way out",
                        "choices": [
                            { "choiceId": "c", "text": "locked", "guards": ["never_set"], "to": "END1" }
                        ]
                    }
                ],
                "endings": [
                    { "endingId": "END1", "title": "t", "type": "mixed", "narration": "n" }
                ]
            }"#,
        )
        .unwrap();
        let report = run_walks(&scene, &SimulationConfig { runs: 5, ..Default::default() });
        assert_eq!(report.dead_ends.get("N1"), Some(&5));
        assert_eq!(report.completed(), 0);
    }

    #[test]
    fn node_less_scene_tallies_nothing() {
        let scene = Scene::from_json_str(
            r#"{"sceneId":"e","variantId":"v","nodes":[],"endings":[]}"#,
        )
        .unwrap();
        let report = run_walks(&scene, &SimulationConfig { runs: 10, ..Default::default() });
        assert_eq!(report.runs, 10);
        assert_eq!(report.completed(), 0);
        assert_eq!(report.step_limited, 0);
        assert!(report.dead_ends.is_empty());
        assert!(report.dangling.is_empty());
    }

    #[test]
    fn dangling_walks_recorded() {
        let scene = Scene::from_json_str(
            r#"{
                "sceneId": "gone",
                "variantId": "v",
                "nodes": [
                    {
                        "nodeId": "N1",
                        "narration": "x",
                        "choices": [ { "choiceId": "c", "text": "jump", "to": "NOWHERE" } ]
                    }
                ],
                "endings": []
            }"#,
        )
        .unwrap();
        let report = run_walks(&scene, &SimulationConfig { runs: 3, ..Default::default() });
        assert_eq!(report.dangling.get("NOWHERE"), Some(&3));
    }
}
