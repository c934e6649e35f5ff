/// Scene Linter — audits a scene document for structural and expression
/// problems the permissive runtime would otherwise paper over.
///
/// Usage: scene_linter <scene.json> [--runs <n>] [--seed <n>]
///
/// Errors (exit 1): dangling choice targets, malformed guard/effect
/// expressions. Warnings: unreachable nodes/endings, simulated ending
/// coverage gaps, dead ends, no-op numeric effects.

use scene_engine::core::expr::{parse_effect, parse_guard, EffectExpr};
use scene_engine::core::graph;
use scene_engine::core::simulate::{run_walks, SimulationConfig};
use scene_engine::schema::scene::Scene;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scene_linter <scene.json> [--runs <n>] [--seed <n>]");
        process::exit(0);
    }

    let scene_path = &args[1];
    let mut runs: usize = 200;
    let mut seed: u64 = 0;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" if i + 1 < args.len() => {
                i += 1;
                runs = args[i].parse().unwrap_or(200);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let scene = match Scene::load_from_json(Path::new(scene_path)) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("ERROR: Failed to load scene: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded scene '{}' (variant '{}'): {} nodes, {} endings",
        scene.scene_id,
        scene.variant_id,
        scene.nodes.len(),
        scene.endings.len()
    );

    let (errors, warnings) = lint_scene(&scene, runs, seed);

    println!("\n=== Scene Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_scene(scene: &Scene, runs: usize, seed: u64) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Reference integrity.
    for dangling in graph::dangling_targets(scene) {
        errors.push(format!(
            "Choice '{}' on node '{}' targets '{}', which is neither a node nor an ending",
            dangling.choice_id, dangling.node_id, dangling.to
        ));
    }

    // Expression checks — the runtime tolerates these, the author
    // should not.
    for node in &scene.nodes {
        for choice in &node.choices {
            for raw in &choice.guards {
                if let Err(e) = parse_guard(raw) {
                    errors.push(format!(
                        "Node '{}' choice '{}': {}",
                        node.node_id, choice.choice_id, e
                    ));
                }
            }
            for raw in &choice.effects {
                match parse_effect(raw) {
                    Err(e) => errors.push(format!(
                        "Node '{}' choice '{}': {}",
                        node.node_id, choice.choice_id, e
                    )),
                    Ok(EffectExpr::NoOp) if !raw.trim().is_empty() => {
                        warnings.push(format!(
                            "Node '{}' choice '{}': effect '{}' matches no form and will be a no-op",
                            node.node_id, choice.choice_id, raw
                        ));
                    }
                    Ok(_) => {}
                }
            }
        }
    }

    // Reachability from the entry node.
    let (reachable_nodes, reachable_endings) = graph::reachable_sets(scene);
    for node in &scene.nodes {
        if !reachable_nodes.contains(&node.node_id) {
            warnings.push(format!(
                "Node '{}' is unreachable from the first node",
                node.node_id
            ));
        }
    }
    for ending in &scene.endings {
        if !reachable_endings.contains(&ending.ending_id) {
            warnings.push(format!(
                "Ending '{}' has no inbound edge from any reachable node",
                ending.ending_id
            ));
        }
    }

    // Simulated coverage: guards may close off endings the BFS says
    // are connected.
    if !scene.nodes.is_empty() && runs > 0 {
        let report = run_walks(
            scene,
            &SimulationConfig {
                runs,
                seed,
                ..SimulationConfig::default()
            },
        );
        println!(
            "Simulated {} walks: {} completed, {} dead-ended, {} dangling, {} step-limited",
            report.runs,
            report.completed(),
            report.dead_ends.values().sum::<usize>(),
            report.dangling.values().sum::<usize>(),
            report.step_limited
        );
        for ending_id in report.unreached_endings(scene) {
            if reachable_endings.contains(ending_id) {
                warnings.push(format!(
                    "Ending '{}' was never reached in {} simulated walks (guards may soft-lock it)",
                    ending_id, runs
                ));
            }
        }
        for (node_id, count) in &report.dead_ends {
            warnings.push(format!(
                "Node '{}' stranded {} of {} walks with no takeable choice",
                node_id, count, runs
            ));
        }
    }

    (errors, warnings)
}
