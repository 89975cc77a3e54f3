/// SR3D Terminal Renderer
///
/// Renders an OBJ or STL mesh (or a cube when none is given) as ASCII art.
/// Controls:
///   - WASD: Move the camera
///   - Arrow Keys: Look around
///   - E/R: Roll the model
///   - N: Toggle face normals
///   - Q/ESC: Quit

use anyhow::Context;
use log::info;
use sr3d_core::{load_mesh, Mesh, RendererConfig};
use sr3d_terminal::{CliArgs, TerminalApp};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse(std::env::args().skip(1))
        .context("usage: sr3d-terminal [mesh.obj|mesh.stl] [--config path.toml]")?;

    let config = match &args.config {
        Some(path) => RendererConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RendererConfig::default(),
    };

    let mesh = match &args.mesh {
        Some(path) => load_mesh(path)
            .with_context(|| format!("failed to load mesh {}", path.display()))?,
        None => {
            info!("no mesh given, rendering a cube");
            Mesh::cube(2.0)
        }
    };

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, config)?;
    app.run()?;

    println!("Thank you for using SR3D Terminal Renderer!");
    Ok(())
}
