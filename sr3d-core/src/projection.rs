/// Perspective divide, viewport mapping, fan triangulation and winding tests
use crate::clip::ClipVertex;

/// Target surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Integer pixel position, origin top-left, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Nearest pixel inside the viewport grid
    pub fn clamp_to(self, viewport: Viewport) -> Self {
        let last = |extent: u32| i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
        Self::new(
            self.x.clamp(0, last(viewport.width)),
            self.y.clamp(0, last(viewport.height)),
        )
    }
}

/// Perspective divide and viewport mapping without bounds.
///
/// Vertices with `w <= 0` are behind the eye (or degenerate) and yield `None`.
/// Points outside the clip volume map outside the viewport.
pub fn map_to_viewport(vertex: &ClipVertex, viewport: Viewport) -> Option<ScreenPoint> {
    let clip = &vertex.position;
    if clip.w <= 0.0 {
        return None;
    }

    // Normalized device coordinates
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;

    let screen_x = (ndc_x + 1.0) * 0.5 * viewport.width as f32;
    let screen_y = (1.0 - (ndc_y + 1.0) * 0.5) * viewport.height as f32;

    Some(ScreenPoint::new(screen_x as i32, screen_y as i32))
}

/// Project a clipped vertex to a pixel inside `[0, width) x [0, height)`.
///
/// Vertices on the right or bottom clip plane map to `width` or `height`
/// and are pulled onto the last column or row.
pub fn clip_to_screen(vertex: &ClipVertex, viewport: Viewport) -> Option<ScreenPoint> {
    map_to_viewport(vertex, viewport).map(|point| point.clamp_to(viewport))
}

/// Fixed-origin fan over a convex polygon: `(v0, v[i-1], v[i])` for
/// `i in 2..n`. Yields nothing for fewer than 3 vertices.
pub fn fan_triangulate<T: Copy>(polygon: &[T]) -> impl Iterator<Item = [T; 3]> + '_ {
    (2..polygon.len()).map(move |i| [polygon[0], polygon[i - 1], polygon[i]])
}

/// Twice the signed area of the triangle in screen space.
///
/// Negative means clockwise on a y-down screen. Computed in 64 bits so large
/// off-screen coordinates cannot overflow.
pub fn winding_order(points: &[ScreenPoint; 3]) -> i64 {
    (0..3)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % 3];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum()
}

/// Front-facing triangles wind clockwise on screen
pub fn is_front_facing(points: &[ScreenPoint; 3]) -> bool {
    winding_order(points) < 0
}
