/// Interrogation demo — a scripted playthrough of a small noir scene.
///
/// Builds the scene graph in code, then drives it to the confession
/// ending: pressure first, then the photograph, then the push.
///
/// Run with: cargo run --example interrogation

use scene_engine::core::engine::Playthrough;
use scene_engine::schema::scene::{Choice, Ending, EndingType, Intro, Node, Scene};

fn build_scene() -> Scene {
    Scene {
        scene_id: "demo-interrogation".to_string(),
        variant_id: "noir".to_string(),
        title: Some("Room B".to_string()),
        intro: Intro {
            narration: "Burnt coffee, one flickering tube light, and a man \
                        who thinks he has already won."
                .to_string(),
        },
        nodes: vec![
            Node {
                node_id: "N_INTAKE".to_string(),
                narration: "Vance folds his hands and waits for you to begin.".to_string(),
                choices: vec![
                    Choice {
                        choice_id: "c_smalltalk".to_string(),
                        text: "Ease in with small talk".to_string(),
                        move_type: Some("rapport".to_string()),
                        guards: vec![],
                        effects: vec!["stat:trust+1".to_string()],
                        to: "N_ALIBI".to_string(),
                    },
                    Choice {
                        choice_id: "c_slam".to_string(),
                        text: "Slam the case file on the table".to_string(),
                        move_type: Some("pressure".to_string()),
                        guards: vec![],
                        effects: vec![
                            "stat:trust-1".to_string(),
                            "stat:leverage+1".to_string(),
                            "rattled".to_string(),
                        ],
                        to: "N_ALIBI".to_string(),
                    },
                ],
            },
            Node {
                node_id: "N_ALIBI".to_string(),
                narration: "He repeats the alibi word for word, like a rehearsed script."
                    .to_string(),
                choices: vec![
                    Choice {
                        choice_id: "c_probe".to_string(),
                        text: "Probe the timeline for gaps".to_string(),
                        move_type: Some("investigate".to_string()),
                        guards: vec![],
                        effects: vec!["fact:alibi=shaky".to_string()],
                        to: "N_CRACK".to_string(),
                    },
                    Choice {
                        choice_id: "c_reveal".to_string(),
                        text: "Reveal the marina photograph".to_string(),
                        move_type: Some("pressure".to_string()),
                        guards: vec!["stat:leverage>=1".to_string()],
                        effects: vec![
                            "fact:motive=verified".to_string(),
                            "stat:leverage+1".to_string(),
                        ],
                        to: "N_CRACK".to_string(),
                    },
                ],
            },
            Node {
                node_id: "N_CRACK".to_string(),
                narration: "For the first time his eyes go to the door.".to_string(),
                choices: vec![
                    Choice {
                        choice_id: "c_push".to_string(),
                        text: "Lay it out and push for the confession".to_string(),
                        move_type: Some("pressure".to_string()),
                        guards: vec![
                            "stat:leverage>=2".to_string(),
                            "fact:motive==verified".to_string(),
                        ],
                        effects: vec!["goal:caseClosed+1".to_string()],
                        to: "END_CONFESSION".to_string(),
                    },
                    Choice {
                        choice_id: "c_wait".to_string(),
                        text: "Let the silence do the work".to_string(),
                        move_type: None,
                        guards: vec![],
                        effects: vec![],
                        to: "END_PARTIAL".to_string(),
                    },
                ],
            },
        ],
        endings: vec![
            Ending {
                ending_id: "END_CONFESSION".to_string(),
                title: "Signed and Dated".to_string(),
                ending_type: EndingType::Success,
                narration: "He signs the statement without reading it.".to_string(),
                weight: Some(2.0),
            },
            Ending {
                ending_id: "END_PARTIAL".to_string(),
                title: "Something to Work With".to_string(),
                ending_type: EndingType::Mixed,
                narration: "No confession, but the gaps are on tape now.".to_string(),
                weight: None,
            },
        ],
        initial_state: None,
    }
}

fn print_beat(play: &Playthrough<'_>) {
    if let Some(narration) = play.narration() {
        println!("{narration}\n");
    }
    for (i, status) in play.available_choices().iter().enumerate() {
        let lock = if status.guard_passed { "" } else { " [locked]" };
        println!("  {}. {}{}", i + 1, status.choice.text, lock);
    }
    println!();
}

fn take(play: &mut Playthrough<'_>, choice_id: &str, line: &str) {
    println!(">> {line}\n");
    let event = play.select(choice_id);
    println!("   [{:?}] leverage={} trust={}\n",
        event,
        play.state().stat("leverage"),
        play.state().stat("trust"),
    );
}

fn main() {
    let scene = build_scene();
    let mut play = Playthrough::new(&scene).expect("scene has nodes");

    println!("=== {} ===\n", scene.title.as_deref().unwrap_or(&scene.scene_id));
    println!("{}\n", scene.intro.narration);
    print_beat(&play);

    take(&mut play, "c_slam", "Slam the case file on the table");
    print_beat(&play);

    take(&mut play, "c_reveal", "Reveal the marina photograph");
    print_beat(&play);

    take(&mut play, "c_push", "Lay it out and push for the confession");

    if let Some(ending) = play.ending() {
        println!("=== {} [{}] ===", ending.title, ending.ending_type.label());
        println!("{}\n", ending.narration);
    }
    println!(
        "Case closed: {} ({} snapshots recorded)",
        play.state().goal("caseClosed"),
        play.history().len()
    );
}
