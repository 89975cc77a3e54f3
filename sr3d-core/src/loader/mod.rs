/// Mesh file loading
pub mod obj;
pub mod stl;

use std::path::Path;

use log::info;

use crate::error::MeshError;
use crate::geometry::Mesh;

pub use obj::parse_obj;
pub use stl::parse_stl;

/// Load a mesh, picking the parser from the file extension (`obj` or `stl`)
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let mesh = match extension.as_deref() {
        Some("obj") => parse_obj(&std::fs::read_to_string(path)?)?,
        Some("stl") => parse_stl(&std::fs::read(path)?)?,
        _ => return Err(MeshError::UnsupportedFormat(path.display().to_string())),
    };

    info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}
