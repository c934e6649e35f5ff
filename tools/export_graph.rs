/// Export Graph — writes a scene document as a Mermaid flowchart for
/// report/debugging views.
///
/// Usage: export_graph <scene.json> [--out <path>]

use scene_engine::core::graph;
use scene_engine::schema::scene::Scene;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: export_graph <scene.json> [--out <path>]");
        process::exit(0);
    }

    let scene_path = &args[1];
    let mut out_path = "output/scene.mmd".to_string();

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--out" && i + 1 < args.len() {
            i += 1;
            out_path = args[i].clone();
        } else {
            eprintln!("Unknown argument: {}", args[i]);
            process::exit(1);
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

    let mermaid = graph::to_mermaid(&scene);

    if let Some(parent) = Path::new(&out_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("ERROR: Failed to create {}: {}", parent.display(), e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = std::fs::write(&out_path, mermaid) {
        eprintln!("ERROR: Failed to write {}: {}", out_path, e);
        process::exit(1);
    }

    println!("Wrote {}", out_path);
}
