/// Example: Load and render an OBJ or STL file in the terminal
///
/// Usage: cargo run --example load_mesh -- path/to/model.obj

use anyhow::Context;
use sr3d_core::{load_mesh, Mesh, RendererConfig};
use sr3d_terminal::TerminalApp;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mesh = match args.get(1) {
        Some(path) => {
            println!("Loading mesh file: {}", path);
            load_mesh(path).with_context(|| format!("failed to load {}", path))?
        }
        None => {
            eprintln!("Usage: {} <mesh-file>", args[0]);
            eprintln!("\nNo mesh file provided, using default cube...");
            Mesh::cube(2.0)
        }
    };

    let bbox = mesh.bounding_box();
    println!(
        "Loaded {} vertices, {} triangles, bounds {:?} .. {:?}",
        mesh.vertex_count(),
        mesh.face_count(),
        bbox.min().as_slice(),
        bbox.max().as_slice()
    );
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, RendererConfig::default())?;
    app.run()?;

    Ok(())
}
