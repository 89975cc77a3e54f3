/// Homogeneous clip-space polygon clipping (Sutherland-Hodgman)
use log::warn;
use std::fmt;

use crate::error::GeometryError;
use crate::math::Vec4;

/// The six canonical clip planes as `{a, b, c, d}` over `(x, y, z, w)`:
/// near, far, left, right, bottom, top. A vertex is accepted by a plane
/// when `a*x + b*y + c*z + d*w >= 0`.
pub const CLIP_PLANES: [[f32; 4]; 6] = [
    [0.0, 0.0, 1.0, 1.0],
    [0.0, 0.0, -1.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [-1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, -1.0, 0.0, 1.0],
];

/// Each plane pass can add at most one vertex to a convex polygon, so a
/// triangle never grows past `3 + CLIP_PLANES.len()`.
pub const MAX_CLIP_VERTICES: usize = 9;

const _: () = assert!(MAX_CLIP_VERTICES >= 3 + CLIP_PLANES.len());

/// A vertex in homogeneous clip space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipVertex {
    pub position: Vec4,
}

impl ClipVertex {
    pub fn new(position: Vec4) -> Self {
        Self { position }
    }

    /// Componentwise lerp on x, y, z and w
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex::new(self.position + (other.position - self.position) * t)
    }
}

/// Fixed-capacity, ordered, closed polygon of clip-space vertices.
///
/// Slots past `len()` may hold stale vertices from earlier use; equality and
/// `Debug` only look at the live prefix.
#[derive(Clone, Copy)]
pub struct ClipPolygon {
    vertices: [ClipVertex; MAX_CLIP_VERTICES],
    count: usize,
}

impl ClipPolygon {
    pub fn new() -> Self {
        Self {
            vertices: [ClipVertex::default(); MAX_CLIP_VERTICES],
            count: 0,
        }
    }

    pub fn from_triangle(triangle: &[ClipVertex; 3]) -> Self {
        let mut polygon = Self::new();
        polygon.vertices[..3].copy_from_slice(triangle);
        polygon.count = 3;
        polygon
    }

    /// Append a vertex, refusing to grow past `MAX_CLIP_VERTICES`
    pub fn push(&mut self, vertex: ClipVertex) -> Result<(), GeometryError> {
        if self.count == MAX_CLIP_VERTICES {
            return Err(GeometryError::ClipOverflow);
        }
        self.vertices[self.count] = vertex;
        self.count += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[ClipVertex] {
        &self.vertices[..self.count]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClipVertex> {
        self.as_slice().iter()
    }
}

impl PartialEq for ClipPolygon {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for ClipPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self::new()
    }
}

fn plane_distance(plane: &[f32; 4], v: &Vec4) -> f32 {
    plane[0] * v.x + plane[1] * v.y + plane[2] * v.z + plane[3] * v.w
}

/// One Sutherland-Hodgman pass: clip `input` against a single plane into
/// `output`. The input is treated as closed (last vertex joins the first).
pub fn clip_against_plane(
    input: &ClipPolygon,
    output: &mut ClipPolygon,
    plane: &[f32; 4],
) -> Result<(), GeometryError> {
    output.clear();

    let Some(last) = input.as_slice().last() else {
        return Ok(());
    };

    let mut prev = last;
    let mut prev_distance = plane_distance(plane, &prev.position);

    for curr in input.iter() {
        let curr_distance = plane_distance(plane, &curr.position);

        match (prev_distance >= 0.0, curr_distance >= 0.0) {
            (true, true) => output.push(*curr)?,
            (false, true) => {
                let t = prev_distance / (prev_distance - curr_distance);
                output.push(prev.lerp(curr, t))?;
                output.push(*curr)?;
            }
            (true, false) => {
                let t = prev_distance / (prev_distance - curr_distance);
                output.push(prev.lerp(curr, t))?;
            }
            (false, false) => {}
        }

        prev = curr;
        prev_distance = curr_distance;
    }

    Ok(())
}

/// Clip a clip-space triangle against all six canonical planes.
///
/// Returns `None` when the triangle is fully clipped away (any pass empties
/// the polygon) or fewer than 3 vertices remain.
pub fn clip_triangle(triangle: &[ClipVertex; 3]) -> Option<ClipPolygon> {
    let mut input = ClipPolygon::from_triangle(triangle);
    let mut output = ClipPolygon::new();

    for plane in &CLIP_PLANES {
        if let Err(err) = clip_against_plane(&input, &mut output, plane) {
            warn!("dropping triangle {:?}: {}", triangle, err);
            return None;
        }
        if output.is_empty() {
            return None;
        }
        std::mem::swap(&mut input, &mut output);
    }

    if input.len() < 3 {
        return None;
    }
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn vertex(x: f32, y: f32, z: f32, w: f32) -> ClipVertex {
        ClipVertex::new(Vec4::new(x, y, z, w))
    }

    fn inside_triangle() -> [ClipVertex; 3] {
        [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(0.5, -0.5, 0.2, 1.0),
            vertex(0.0, 0.5, -0.2, 1.0),
        ]
    }

    fn is_inside_all(v: &ClipVertex, tolerance: f32) -> bool {
        CLIP_PLANES
            .iter()
            .all(|plane| plane_distance(plane, &v.position) >= -tolerance)
    }

    #[test]
    fn test_lerp_is_componentwise() {
        let a = vertex(0.0, 0.0, 0.0, 1.0);
        let b = vertex(2.0, 4.0, -2.0, 3.0);
        assert_eq!(a.lerp(&b, 0.5), vertex(1.0, 2.0, -1.0, 2.0));
    }

    #[test]
    fn test_polygon_push_is_bounded() {
        let mut polygon = ClipPolygon::new();
        for _ in 0..MAX_CLIP_VERTICES {
            polygon.push(ClipVertex::default()).unwrap();
        }
        assert_eq!(polygon.push(ClipVertex::default()), Err(GeometryError::ClipOverflow));
        assert_eq!(polygon.len(), MAX_CLIP_VERTICES);
    }

    #[test]
    fn test_reused_polygon_compares_by_live_vertices() {
        let [a, b, c] = inside_triangle();
        let stale = vertex(9.0, 9.0, 9.0, 9.0);

        let mut reused = ClipPolygon::new();
        for v in [a, b, c, stale, stale] {
            reused.push(v).unwrap();
        }
        reused.clear();
        for v in [a, b, c] {
            reused.push(v).unwrap();
        }

        assert_eq!(reused, ClipPolygon::from_triangle(&[a, b, c]));
        assert_ne!(reused, ClipPolygon::new());
        assert!(!format!("{:?}", reused).contains("9.0"));
    }

    #[test]
    fn test_triangle_inside_is_unchanged() {
        let triangle = inside_triangle();
        let clipped = clip_triangle(&triangle).unwrap();
        assert_eq!(clipped.as_slice(), &triangle[..]);
    }

    #[test]
    fn test_triangle_outside_single_plane_is_rejected() {
        // Entirely to the right of x = w
        let right = [
            vertex(2.0, 0.0, 0.0, 1.0),
            vertex(3.0, 0.5, 0.0, 1.0),
            vertex(2.5, -0.5, 0.0, 1.0),
        ];
        assert!(clip_triangle(&right).is_none());

        // Entirely behind the eye (w < 0 fails the near plane)
        let behind = [
            vertex(0.0, 0.0, -2.2, -2.0),
            vertex(0.5, 0.0, -2.2, -2.0),
            vertex(0.0, 0.5, -2.2, -2.0),
        ];
        assert!(clip_triangle(&behind).is_none());

        let mut output = ClipPolygon::new();
        clip_against_plane(&ClipPolygon::from_triangle(&right), &mut output, &CLIP_PLANES[3]).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_triangle_straddling_one_plane_becomes_quad() {
        // Third vertex crosses the right plane (x > w)
        let triangle = [
            vertex(0.0, -0.5, 0.0, 1.0),
            vertex(0.5, 0.5, 0.0, 1.0),
            vertex(1.5, -0.5, 0.0, 1.0),
        ];
        let right_plane = CLIP_PLANES[3];

        let clipped = clip_triangle(&triangle).unwrap();
        assert_eq!(clipped.len(), 4);

        let on_plane: Vec<_> = clipped
            .iter()
            .filter(|v| !triangle.contains(v))
            .collect();
        assert_eq!(on_plane.len(), 2);
        for v in on_plane {
            assert_abs_diff_eq!(plane_distance(&right_plane, &v.position), 0.0, epsilon = 1e-6);
        }

        // Convex: every consecutive turn has the same sign
        let points: Vec<_> = clipped.iter().map(|v| v.position).collect();
        let turns: Vec<f32> = (0..points.len())
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                let c = points[(i + 2) % points.len()];
                (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
            })
            .collect();
        assert!(turns.iter().all(|t| *t > 0.0) || turns.iter().all(|t| *t < 0.0));
    }

    #[test]
    fn test_near_plane_interpolates_w() {
        // One vertex behind the near plane
        let triangle = [
            vertex(0.0, 0.0, 1.0, 2.0),
            vertex(0.2, 0.0, 1.0, 2.0),
            vertex(0.0, 0.0, -3.0, 1.0),
        ];
        let clipped = clip_triangle(&triangle).unwrap();
        assert_eq!(clipped.len(), 4);
        for v in clipped.iter() {
            assert!(v.position.z + v.position.w >= -1e-6);
        }
    }

    #[test]
    fn test_large_triangle_stays_within_capacity() {
        // Covers far more than the clip volume on every side
        let triangle = [
            vertex(-10.0, -10.0, 0.0, 1.0),
            vertex(10.0, -10.0, 0.5, 1.0),
            vertex(0.0, 12.0, -0.5, 1.0),
        ];
        let clipped = clip_triangle(&triangle).unwrap();
        assert!(clipped.len() >= 3);
        assert!(clipped.len() <= MAX_CLIP_VERTICES);
        for v in clipped.iter() {
            assert!(is_inside_all(v, 1e-5));
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let mut output = ClipPolygon::from_triangle(&inside_triangle());
        clip_against_plane(&ClipPolygon::new(), &mut output, &CLIP_PLANES[0]).unwrap();
        assert!(output.is_empty());
    }
}
