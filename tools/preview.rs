/// Preview — interactive terminal walkthrough of a scene document.
///
/// Usage: preview <scene.json> [--entry <id>] [--permissive]
///
/// Commands:
///   <n>        — take choice number n
///   look       — reprint current narration and choices
///   state      — dump the current world state
///   undo/redo  — move over the snapshot history
///   reset      — back to the start, state reseeded
///   help       — list commands
///   quit       — exit

use scene_engine::core::engine::{GuardMode, Playthrough, Position, TransitionEvent};
use scene_engine::schema::scene::Scene;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let scene_path = args[1].clone();
    let mut entry = None;
    let mut mode = GuardMode::Strict;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--entry" if i + 1 < args.len() => {
                i += 1;
                entry = Some(args[i].clone());
            }
            "--permissive" => {
                mode = GuardMode::Permissive;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let scene = match Scene::load_from_json(Path::new(&scene_path)) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("ERROR loading scene {}: {}", scene_path, e);
            std::process::exit(1);
        }
    };

    let mut builder = Playthrough::builder(&scene).guard_mode(mode);
    if let Some(ref id) = entry {
        builder = builder.entry(id);
    }
    let mut play = match builder.build() {
        Ok(play) => play,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Scene '{}' (variant '{}'), {} nodes, {} endings",
        scene.scene_id,
        scene.variant_id,
        scene.nodes.len(),
        scene.endings.len()
    );
    if mode == GuardMode::Permissive {
        println!("Permissive mode: locked choices can be taken.");
    }
    println!("Type 'help' for commands.\n");

    if !scene.intro.narration.is_empty() {
        println!("{}\n", scene.intro.narration);
    }
    print_position(&play);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("scene> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "look" | "l" => print_position(&play),
            "state" => print_state(&play),
            "undo" => {
                if play.undo() {
                    println!("(undone)\n");
                    print_position(&play);
                } else {
                    println!("Nothing to undo.");
                }
            }
            "redo" => {
                if play.redo() {
                    println!("(redone)\n");
                    print_position(&play);
                } else {
                    println!("Nothing to redo.");
                }
            }
            "reset" => {
                play.reset();
                println!("(reset)\n");
                if !scene.intro.narration.is_empty() {
                    println!("{}\n", scene.intro.narration);
                }
                print_position(&play);
            }
            other => match other.parse::<usize>() {
                Ok(n) => take_choice(&mut play, n),
                Err(_) => {
                    println!("Unknown command: '{}'. Type 'help' for available commands.", other);
                }
            },
        }
    }
}

fn take_choice(play: &mut Playthrough<'_>, number: usize) {
    let choices = play.available_choices();
    if number == 0 || number > choices.len() {
        println!("No choice number {}.", number);
        return;
    }
    let status = &choices[number - 1];
    let choice_id = status.choice.choice_id.clone();

    match play.select(&choice_id) {
        TransitionEvent::Ok => {
            println!();
            print_position(play);
        }
        TransitionEvent::GuardRejected => {
            println!("That choice is locked. ('state' shows why; --permissive overrides.)");
        }
        TransitionEvent::DanglingTarget => {
            println!(
                "The story breaks off here: target '{}' does not exist in this scene.",
                play.position().id()
            );
            println!("Use 'undo' or 'reset' to continue.");
        }
        TransitionEvent::UnknownChoice => {
            println!("That choice is not available here.");
        }
    }
}

fn print_position(play: &Playthrough<'_>) {
    match play.position() {
        Position::Node(_) => {
            if let Some(narration) = play.narration() {
                println!("{}\n", narration);
            }
            let choices = play.available_choices();
            if choices.is_empty() {
                println!("(no choices here)");
            }
            for (i, status) in choices.iter().enumerate() {
                let lock = if status.guard_passed { "" } else { " [locked]" };
                let move_type = status
                    .choice
                    .move_type
                    .as_deref()
                    .map(|m| format!(" ({})", m))
                    .unwrap_or_default();
                println!("  {}. {}{}{}", i + 1, status.choice.text, move_type, lock);
            }
            println!();
        }
        Position::Ending(id) => {
            if let Some(ending) = play.ending() {
                println!("=== {} [{}] ===", ending.title, ending.ending_type.label());
                println!("{}\n", ending.narration);
            } else {
                println!("=== Ending {} ===\n", id);
            }
            println!("The scene is over. 'reset' to play again.\n");
        }
        Position::Unresolved(id) => {
            println!("(unresolved position '{}' — 'undo' or 'reset')\n", id);
        }
    }
}

fn print_state(play: &Playthrough<'_>) {
    let state = play.state();
    let mut tags: Vec<&String> = state.tags.iter().collect();
    tags.sort();
    println!("tags:  {:?}", tags);

    let mut stats: Vec<(&String, &f64)> = state.stats.iter().collect();
    stats.sort_by_key(|(k, _)| k.as_str());
    println!("stats: {:?}", stats);

    let mut goals: Vec<(&String, &f64)> = state.goals.iter().collect();
    goals.sort_by_key(|(k, _)| k.as_str());
    println!("goals: {:?}", goals);

    let mut facts: Vec<(&String, &String)> = state.facts.iter().collect();
    facts.sort_by_key(|(k, _)| k.as_str());
    println!("facts: {:?}", facts);

    println!("steps: {}", play.history().len() - 1);
}

fn print_usage() {
    println!("Preview — interactive terminal walkthrough of a scene document.");
    println!();
    println!("Usage: preview <scene.json> [--entry <id>] [--permissive]");
    println!();
    println!("  <scene.json>    Path to a scene document");
    println!("  --entry <id>    Start at this node/ending instead of the first node");
    println!("  --permissive    Evaluate guards for display only; never gate selection");
}

fn print_help() {
    println!("Commands:");
    println!("  <n>        Take choice number n");
    println!("  look       Reprint current narration and choices");
    println!("  state      Dump the current world state");
    println!("  undo       Step back one snapshot");
    println!("  redo       Step forward one snapshot");
    println!("  reset      Back to the start, state reseeded");
    println!("  help       Show this help");
    println!("  quit       Exit");
}
