/// Per-frame geometry pipeline: cull, clip, project and assemble a model into
/// screen-space triangles
use log::trace;

use crate::camera::{Camera, CameraPose};
use crate::clip::{clip_triangle, ClipVertex, MAX_CLIP_VERTICES};
use crate::error::GeometryError;
use crate::geometry::{Face, ModelObject};
use crate::math::{Mat4, Vec4};
use crate::projection::{
    clip_to_screen, fan_triangulate, is_front_facing, map_to_viewport, ScreenPoint, Viewport,
};
use crate::transform::Transform;
use crate::visibility::{classify, Containment};

/// Three integer screen positions, wound clockwise on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTriangle(pub [ScreenPoint; 3]);

impl ScreenTriangle {
    pub fn points(&self) -> &[ScreenPoint; 3] {
        &self.0
    }
}

/// Screen-space segment used to visualize face normals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugLine {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
}

/// Counters collected while assembling one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub containment: Option<Containment>,
    pub faces_tested: usize,
    pub faces_clipped: usize,
    pub faces_behind_eye: usize,
    pub faces_back_facing: usize,
    pub triangles_emitted: usize,
}

/// Output of a frame, handed whole to the rasterizer
#[derive(Debug, Clone, Default)]
pub struct TriangleBatch {
    triangles: Vec<ScreenTriangle>,
    debug_lines: Vec<DebugLine>,
    stats: FrameStats,
}

impl TriangleBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&self) -> &[ScreenTriangle] {
        &self.triangles
    }

    pub fn debug_lines(&self) -> &[DebugLine] {
        &self.debug_lines
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Empty the batch, keeping its allocations for the next frame
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.debug_lines.clear();
        self.stats = FrameStats::default();
    }
}

/// Caller-owned frame state: target surface, debug switches and the reusable
/// output batch
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub viewport: Viewport,
    pub debug_normals: bool,
    pub normal_length: f32,
    batch: TriangleBatch,
}

impl FrameContext {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            debug_normals: false,
            normal_length: 0.5,
            batch: TriangleBatch::new(),
        }
    }

    pub fn with_debug_normals(mut self, enabled: bool, length: f32) -> Self {
        self.debug_normals = enabled;
        self.normal_length = length;
        self
    }

    /// The batch produced by the last `render_frame`
    pub fn batch(&self) -> &TriangleBatch {
        &self.batch
    }
}

/// Point the camera along `pose`, refreshing view matrix and frustum together.
///
/// On a degenerate pose the camera keeps its previous state.
pub fn update_camera(camera: &mut Camera, pose: &CameraPose) -> Result<(), GeometryError> {
    camera.look_at_front(pose)
}

pub fn update_model_transform(model: &mut ModelObject, transform: Transform) {
    model.set_transform(transform);
}

/// Project an unclipped model-space point, `None` when it lands behind the eye
fn project_point(point: &Vec4, mvp: &Mat4, viewport: Viewport) -> Option<ScreenPoint> {
    map_to_viewport(&ClipVertex::new(mvp.transform(point)), viewport)
}

fn normal_line(
    face: &Face,
    vertices: &[Vec4],
    mvp: &Mat4,
    viewport: Viewport,
    length: f32,
) -> Option<DebugLine> {
    let centroid = face.centroid(vertices);
    let tip = centroid + face.normal * length;
    Some(DebugLine {
        start: project_point(&centroid, mvp, viewport)?,
        end: project_point(&tip, mvp, viewport)?,
    })
}

/// Assemble one frame of `model` as seen by `camera` into `context`'s batch.
///
/// The model is skipped whole when its world-space bounding box is outside
/// the frustum. Otherwise every face goes model to clip space, is clipped
/// against the canonical volume, mapped to the screen and, if it faces the
/// camera, appended as a triangle fan.
pub fn render_frame<'a>(
    model: &ModelObject,
    camera: &Camera,
    context: &'a mut FrameContext,
) -> &'a TriangleBatch {
    let FrameContext {
        viewport,
        debug_normals,
        normal_length,
        batch,
    } = context;
    let viewport = *viewport;
    batch.clear();

    let corners = model
        .mesh()
        .bounding_box()
        .transformed(model.model_matrix());
    let containment = classify(&corners, camera.frustum());
    batch.stats.containment = Some(containment);
    if containment == Containment::Outside {
        trace!("model outside frustum, nothing to draw");
        return batch;
    }

    let mvp = Transform::mvp_matrix(model.model_matrix(), camera.view(), camera.projection());
    let mesh = model.mesh();
    let vertices = mesh.vertices();

    for face in mesh.faces() {
        batch.stats.faces_tested += 1;

        let triangle = face
            .positions(vertices)
            .map(|position| ClipVertex::new(mvp.transform(&position)));
        let Some(polygon) = clip_triangle(&triangle) else {
            batch.stats.faces_clipped += 1;
            continue;
        };

        let mut screen = [ScreenPoint::default(); MAX_CLIP_VERTICES];
        let mut count = 0;
        for point in polygon.iter().filter_map(|v| clip_to_screen(v, viewport)) {
            screen[count] = point;
            count += 1;
        }
        if count < 3 {
            batch.stats.faces_behind_eye += 1;
            continue;
        }
        let screen = &screen[..count];

        // Every fan triangle of a convex polygon shares the first one's winding
        if !is_front_facing(&[screen[0], screen[1], screen[2]]) {
            batch.stats.faces_back_facing += 1;
            continue;
        }
        batch
            .triangles
            .extend(fan_triangulate(screen).map(ScreenTriangle));

        if *debug_normals {
            if let Some(line) = normal_line(face, vertices, &mvp, viewport, *normal_length) {
                batch.debug_lines.push(line);
            }
        }
    }

    batch.stats.triangles_emitted = batch.triangles.len();
    trace!("frame stats: {:?}", batch.stats);
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSettings;
    use crate::geometry::Mesh;
    use crate::math::HomogeneousExt;
    use std::sync::Arc;

    fn origin_camera() -> Camera {
        let mut camera = Camera::new(CameraSettings::for_viewport(800, 600));
        let pose = CameraPose::new(
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::direction(0.0, 0.0, -1.0),
            Vec4::direction(0.0, 1.0, 0.0),
        );
        update_camera(&mut camera, &pose).unwrap();
        camera
    }

    fn triangle_model(points: [[f32; 3]; 3]) -> ModelObject {
        let vertices = points.iter().map(|p| Vec4::point(p[0], p[1], p[2])).collect();
        let mesh = Mesh::new(vertices, vec![[0, 1, 2]]).unwrap();
        ModelObject::new(Arc::new(mesh))
    }

    fn context() -> FrameContext {
        FrameContext::new(Viewport::new(800, 600))
    }

    #[test]
    fn test_front_facing_triangle_is_emitted() {
        let camera = origin_camera();
        let model = triangle_model([[-0.5, -0.5, -2.0], [0.5, -0.5, -2.0], [0.0, 0.5, -2.0]]);
        let mut context = context();

        let batch = render_frame(&model, &camera, &mut context);
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.triangles()[0].points(),
            &[
                ScreenPoint::new(270, 429),
                ScreenPoint::new(529, 429),
                ScreenPoint::new(400, 170)
            ]
        );
        assert_eq!(batch.stats().containment, Some(Containment::Inside));
    }

    #[test]
    fn test_back_facing_triangle_is_culled() {
        let camera = origin_camera();
        let model = triangle_model([[-0.5, -0.5, -2.0], [0.0, 0.5, -2.0], [0.5, -0.5, -2.0]]);
        let mut context = context();

        let batch = render_frame(&model, &camera, &mut context);
        assert!(batch.is_empty());
        assert_eq!(batch.stats().faces_back_facing, 1);
    }

    #[test]
    fn test_model_behind_camera_is_rejected_by_bounding_box() {
        let camera = origin_camera();
        let model = triangle_model([[-0.5, -0.5, 2.0], [0.5, -0.5, 2.0], [0.0, 0.5, 2.0]]);
        let mut context = context();

        let batch = render_frame(&model, &camera, &mut context);
        assert!(batch.is_empty());
        assert_eq!(batch.stats().containment, Some(Containment::Outside));
        assert_eq!(batch.stats().faces_tested, 0);
    }

    #[test]
    fn test_triangle_crossing_near_plane_becomes_two() {
        let camera = origin_camera();
        let model = triangle_model([[-0.5, -0.5, -2.0], [0.5, -0.5, -2.0], [0.0, 0.0, -0.05]]);
        let mut context = context();

        let batch = render_frame(&model, &camera, &mut context);
        assert_eq!(batch.stats().containment, Some(Containment::Intersect));
        assert_eq!(batch.len(), 2);
        for triangle in batch.triangles() {
            assert!(is_front_facing(triangle.points()));
        }
    }

    #[test]
    fn test_cube_shows_only_its_front_face() {
        let camera = origin_camera();
        let mut model = ModelObject::new(Arc::new(Mesh::cube(1.0)));
        update_model_transform(&mut model, Transform::from_position(0.0, 0.0, -5.0));
        let mut context = context().with_debug_normals(true, 0.5);

        let batch = render_frame(&model, &camera, &mut context);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.stats().faces_tested, 12);
        assert_eq!(batch.stats().faces_back_facing, 10);
        assert_eq!(batch.stats().triangles_emitted, 2);
        assert_eq!(batch.debug_lines().len(), 2);
    }

    #[test]
    fn test_batch_is_cleared_between_frames() {
        let camera = origin_camera();
        let mut model = ModelObject::new(Arc::new(Mesh::cube(1.0)));
        update_model_transform(&mut model, Transform::from_position(0.0, 0.0, -5.0));
        let mut context = context();

        assert_eq!(render_frame(&model, &camera, &mut context).len(), 2);

        update_model_transform(&mut model, Transform::from_position(0.0, 0.0, 5.0));
        assert!(render_frame(&model, &camera, &mut context).is_empty());
        assert!(context.batch().is_empty());
    }

    #[test]
    fn test_degenerate_camera_update_keeps_previous_state() {
        let mut camera = origin_camera();
        let view = *camera.view();
        let bad = CameraPose::new(
            Vec4::point(1.0, 2.0, 3.0),
            Vec4::direction(0.0, 1.0, 0.0),
            Vec4::direction(0.0, 1.0, 0.0),
        );

        assert_eq!(update_camera(&mut camera, &bad), Err(GeometryError::DegenerateBasis));
        assert_eq!(*camera.view(), view);
        assert_eq!(camera.pose().position, Vec4::point(0.0, 0.0, 0.0));
    }
}
