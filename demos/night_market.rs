/// Night Market demo — guard-locked branches, undo, and a twist ending.
///
/// A fence in a night market will only talk business once you carry the
/// right token and your nerve holds. The script takes a wrong turn on
/// purpose, undoes it, and then buys its way to the twist.
///
/// Run with: cargo run --example night_market

use scene_engine::core::engine::{Playthrough, Position};
use scene_engine::schema::scene::Scene;

const SCENE_JSON: &str = r#"{
    "sceneId": "demo-night-market",
    "variantId": "default",
    "title": "The Lantern Stalls",
    "intro": {
        "narration": "Paper lanterns, wet cobbles, and a hundred small negotiations happening at once."
    },
    "nodes": [
        {
            "nodeId": "N_GATE",
            "narration": "A bored tout guards the inner stalls. Nothing moves past him for free.",
            "choices": [
                {
                    "choiceId": "c_pay",
                    "text": "Pay the entry coin",
                    "moveType": "trade",
                    "effects": ["stat:coin-2", "tag:inside"],
                    "to": "N_STALLS"
                },
                {
                    "choiceId": "c_sneak",
                    "text": "Slip past while he argues with a porter",
                    "moveType": "risk",
                    "effects": ["stat:nerve-1", "tag:inside"],
                    "to": "N_STALLS"
                }
            ]
        },
        {
            "nodeId": "N_STALLS",
            "narration": "The fence's stall smells of lamp oil. She sizes you up before you speak.",
            "choices": [
                {
                    "choiceId": "c_browse",
                    "text": "Browse and listen for gossip",
                    "effects": ["fact:rumor=heard"],
                    "to": "N_GATE"
                },
                {
                    "choiceId": "c_token",
                    "text": "Show the brass token",
                    "moveType": "gambit",
                    "guards": ["tag:inside", "stat:nerve>=1"],
                    "effects": ["fact:fence=trusting"],
                    "to": "N_BACKROOM"
                }
            ]
        },
        {
            "nodeId": "N_BACKROOM",
            "narration": "Behind the curtain, the real inventory. She asks what you are actually here for.",
            "choices": [
                {
                    "choiceId": "c_ledger",
                    "text": "Ask about the harbor ledger",
                    "guards": ["fact:fence==trusting", "fact:rumor==heard"],
                    "effects": ["goal:ledger.found+1"],
                    "to": "END_LEDGER"
                },
                {
                    "choiceId": "c_leave",
                    "text": "Buy a trinket and leave",
                    "effects": ["stat:coin-1"],
                    "to": "END_QUIET"
                }
            ]
        }
    ],
    "endings": [
        {
            "endingId": "END_LEDGER",
            "title": "The Ledger Surfaces",
            "type": "twist",
            "narration": "She slides it across the counter. Your name is already in it."
        },
        {
            "endingId": "END_QUIET",
            "title": "A Quiet Night",
            "type": "mixed",
            "narration": "You leave with a carved fox and none of the answers."
        }
    ],
    "initialState": {
        "stats": { "coin": 5, "nerve": 2 }
    }
}"#;

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

fn main() {
    let scene = Scene::from_json_str(SCENE_JSON).expect("demo scene parses");
    let mut play = Playthrough::new(&scene).expect("scene has nodes");

    println!("=== {} ===\n", scene.title.as_deref().unwrap_or(&scene.scene_id));
    println!("{}\n", scene.intro.narration);
    print_beat(&play);

    // Sneaking in costs nerve — which the token gambit needs later.
    println!(">> Slip past while he argues with a porter\n");
    play.select("c_sneak");
    print_beat(&play);

    println!(">> That left nerve at {}. Undo and pay instead.\n", play.state().stat("nerve"));
    play.undo();
    println!(">> Pay the entry coin\n");
    play.select("c_pay");
    print_beat(&play);

    // Pick up the rumor first; the backroom question needs it.
    println!(">> Browse and listen for gossip\n");
    play.select("c_browse");
    println!(">> Pay the entry coin (again — the tout has a short memory)\n");
    play.select("c_pay");

    println!(">> Show the brass token\n");
    play.select("c_token");
    print_beat(&play);

    println!(">> Ask about the harbor ledger\n");
    play.select("c_ledger");

    match play.position() {
        Position::Ending(_) => {
            let ending = play.ending().expect("ending exists");
            println!("=== {} [{}] ===", ending.title, ending.ending_type.label());
            println!("{}\n", ending.narration);
        }
        other => println!("(unexpected stop at {other:?})"),
    }

    println!(
        "coin={} nerve={} ledger.found={} ({} snapshots)",
        play.state().stat("coin"),
        play.state().stat("nerve"),
        play.state().goal("ledger.found"),
        play.history().len()
    );
}
