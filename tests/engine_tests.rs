/// Traversal integration tests — full playthroughs over a fixture scene.

use scene_engine::core::engine::{GuardMode, Playthrough, Position, TransitionEvent};
use scene_engine::schema::scene::Scene;

fn load_interrogation() -> Scene {
    let path = std::path::PathBuf::from("tests/fixtures/interrogation.json");
    Scene::load_from_json(&path).unwrap()
}

fn load_broken() -> Scene {
    let path = std::path::PathBuf::from("tests/fixtures/broken_targets.json");
    Scene::load_from_json(&path).unwrap()
}

#[test]
fn pressure_route_reaches_the_confession() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();

    assert_eq!(play.position(), &Position::Node("N_INTAKE".to_string()));
    assert_eq!(play.state().stat("patience"), 3.0);
    assert_eq!(play.state().fact("weapon"), "missing");

    // Slam the file: leverage 1, trust -1, rattled.
    assert_eq!(play.select("c_slam"), TransitionEvent::Ok);
    assert!(play.state().has_tag("rattled"));
    assert_eq!(play.state().stat("trust"), -1.0);

    // The photograph needs leverage >= 1 and grants another point.
    assert_eq!(play.select("c_reveal"), TransitionEvent::Ok);
    assert_eq!(play.state().stat("leverage"), 2.0);
    assert_eq!(play.state().fact("motive"), "verified");

    // Both halves of the conjunction now hold.
    assert_eq!(play.select("c_push"), TransitionEvent::Ok);
    assert_eq!(
        play.position(),
        &Position::Ending("END_CONFESSION".to_string())
    );
    assert!(play.is_finished());
    assert_eq!(play.state().goal("caseClosed"), 1.0);

    let ending = play.ending().unwrap();
    assert_eq!(ending.title, "Signed and Dated");
    assert_eq!(ending.weight, Some(2.0));
}

#[test]
fn rapport_route_locks_the_pressure_options() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();

    assert_eq!(play.select("c_smalltalk"), TransitionEvent::Ok);

    // No leverage built, so the photograph stays locked; backing off is
    // open because the suspect was never rattled.
    let annotated = play.available_choices();
    let by_id = |id: &str| annotated.iter().find(|c| c.choice.choice_id == id).unwrap();
    assert!(by_id("c_probe").guard_passed);
    assert!(!by_id("c_reveal").guard_passed);
    assert!(by_id("c_backoff").guard_passed);

    assert_eq!(play.select("c_reveal"), TransitionEvent::GuardRejected);
    assert_eq!(play.position(), &Position::Node("N_ALIBI".to_string()));

    // The back-off loop returns to intake with trust banked.
    assert_eq!(play.select("c_backoff"), TransitionEvent::Ok);
    assert_eq!(play.position(), &Position::Node("N_INTAKE".to_string()));
    assert_eq!(play.state().stat("trust"), 2.0);
}

#[test]
fn rattled_suspect_closes_the_backoff_loop() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();

    play.select("c_slam");
    let annotated = play.available_choices();
    let backoff = annotated
        .iter()
        .find(|c| c.choice.choice_id == "c_backoff")
        .unwrap();
    assert!(!backoff.guard_passed);
    assert_eq!(play.select("c_backoff"), TransitionEvent::GuardRejected);
}

#[test]
fn strict_rejection_leaves_everything_unchanged() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();
    play.select("c_smalltalk");
    play.select("c_probe");

    let position_before = play.position().clone();
    let state_before = play.state().clone();
    let history_before = play.history().len();

    // trust is +1, so pressing past the line (trust < 0) must reject.
    assert_eq!(play.select("c_line"), TransitionEvent::GuardRejected);
    assert_eq!(play.position(), &position_before);
    assert_eq!(play.state(), &state_before);
    assert_eq!(play.history().len(), history_before);
}

#[test]
fn permissive_mode_annotates_but_never_gates() {
    let scene = load_interrogation();
    let mut play = Playthrough::builder(&scene)
        .guard_mode(GuardMode::Permissive)
        .build()
        .unwrap();

    play.select("c_smalltalk");

    // Still annotated as locked for the renderer.
    let annotated = play.available_choices();
    let reveal = annotated
        .iter()
        .find(|c| c.choice.choice_id == "c_reveal")
        .unwrap();
    assert!(!reveal.guard_passed);

    // But selectable, and its effects commit.
    assert_eq!(play.select("c_reveal"), TransitionEvent::Ok);
    assert_eq!(play.state().fact("motive"), "verified");
    assert_eq!(play.state().stat("leverage"), 1.0);
}

#[test]
fn explicit_entry_skips_ahead() {
    let scene = load_interrogation();
    let mut play = Playthrough::builder(&scene).entry("N_CRACK").build().unwrap();

    assert_eq!(play.position(), &Position::Node("N_CRACK".to_string()));
    // The unguarded option still works from a cold start.
    assert_eq!(play.select("c_wait"), TransitionEvent::Ok);
    assert_eq!(play.position(), &Position::Ending("END_PARTIAL".to_string()));
}

#[test]
fn undo_walks_back_through_real_snapshots() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();

    play.select("c_slam");
    play.select("c_reveal");
    assert_eq!(play.state().stat("leverage"), 2.0);
    assert_eq!(play.history().len(), 3);

    assert!(play.undo());
    assert_eq!(play.state().stat("leverage"), 1.0);
    assert!(play.undo());
    assert_eq!(play.state().stat("leverage"), 0.0);
    assert_eq!(play.position(), &Position::Node("N_INTAKE".to_string()));
    assert!(!play.undo());

    assert!(play.redo());
    assert!(play.redo());
    assert_eq!(play.state().stat("leverage"), 2.0);
}

#[test]
fn reset_reseeds_from_initial_state() {
    let scene = load_interrogation();
    let mut play = Playthrough::new(&scene).unwrap();

    play.select("c_slam");
    play.select("c_probe");
    assert_ne!(play.state().stat("trust"), 0.0);

    play.reset();
    assert_eq!(play.position(), &Position::Node("N_INTAKE".to_string()));
    assert_eq!(play.state().stat("trust"), 0.0);
    assert_eq!(play.state().stat("patience"), 3.0);
    assert_eq!(play.state().fact("weapon"), "missing");
    assert_eq!(play.history().len(), 1);
}

#[test]
fn dangling_target_surfaces_without_crashing() {
    let scene = load_broken();
    let mut play = Playthrough::new(&scene).unwrap();

    assert_eq!(play.select("c_ghost"), TransitionEvent::DanglingTarget);
    assert_eq!(play.position(), &Position::Unresolved("N_MISSING".to_string()));
    assert!(!play.is_finished());
    assert!(play.available_choices().is_empty());

    play.reset();
    assert_eq!(play.select("c_real"), TransitionEvent::Ok);
    assert_eq!(play.position(), &Position::Ending("END_OUT".to_string()));
}

#[test]
fn selecting_after_the_ending_is_a_noop() {
    let scene = load_broken();
    let mut play = Playthrough::new(&scene).unwrap();
    play.select("c_real");
    assert!(play.is_finished());

    assert_eq!(play.select("c_real"), TransitionEvent::UnknownChoice);
    assert_eq!(play.position(), &Position::Ending("END_OUT".to_string()));
    assert!(play.available_choices().is_empty());
}
