/// SR3D Core Library - Software 3D geometry pipeline
///
/// This library turns a mesh, a model transform and a camera into a batch of
/// screen-space triangles: frustum culling, homogeneous clipping, perspective
/// projection, fan triangulation and back-face culling. Rasterization is left
/// to the caller.

pub mod camera;
pub mod clip;
pub mod config;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod math;
pub mod pipeline;
pub mod projection;
pub mod transform;
pub mod visibility;

// Re-export commonly used types
pub use camera::{Camera, CameraPose, CameraSettings, Frustum, FrustumPlane};
pub use clip::{clip_triangle, ClipPolygon, ClipVertex};
pub use config::RendererConfig;
pub use error::{ConfigError, GeometryError, MeshError};
pub use geometry::{BoundingBox, Face, Mesh, ModelObject};
pub use loader::load_mesh;
pub use math::{HomogeneousExt, Mat4, Plane, Vec3, Vec4};
pub use pipeline::{
    render_frame, update_camera, update_model_transform, DebugLine, FrameContext, FrameStats,
    ScreenTriangle, TriangleBatch,
};
pub use projection::{ScreenPoint, Viewport};
pub use transform::Transform;
pub use visibility::{classify, Containment};
