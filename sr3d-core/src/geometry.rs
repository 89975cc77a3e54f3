/// Mesh and model primitives for the geometry pipeline
use std::sync::Arc;

use log::debug;

use crate::error::MeshError;
use crate::math::{to_point, HomogeneousExt, Mat4, Vec3, Vec4};
use crate::transform::Transform;

/// A triangle of the mesh: three offsets into the vertex buffer plus its
/// precomputed unit face normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    pub normal: Vec4,
}

impl Face {
    pub fn positions(&self, vertices: &[Vec4]) -> [Vec4; 3] {
        self.indices.map(|index| vertices[index])
    }

    pub fn centroid(&self, vertices: &[Vec4]) -> Vec4 {
        let [a, b, c] = self.positions(vertices);
        let mut centroid = a + b;
        centroid += c;
        centroid *= 1.0 / 3.0;
        centroid.w = 1.0;
        centroid
    }
}

/// `normalize((a - b) x (a - c))`; zero for a zero-area triangle
fn face_normal(a: &Vec4, b: &Vec4, c: &Vec4) -> Vec4 {
    let ab = a - b;
    let ac = a - c;
    ab.cross3(&ac)
        .try_normalize3()
        .unwrap_or_else(|_| Vec4::direction(0.0, 0.0, 0.0))
}

/// Axis-aligned box stored as its 8 corners.
///
/// Corner `i` takes max x when bit 2 is set, max y for bit 1 and max z for
/// bit 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    corners: [Vec4; 8],
}

impl BoundingBox {
    pub fn from_min_max(min: &Vec3, max: &Vec3) -> Self {
        let corners = std::array::from_fn(|i| {
            Vec4::point(
                if i & 4 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 1 == 0 { min.z } else { max.z },
            )
        });
        Self { corners }
    }

    /// Tight box around the points, `None` when there are none
    pub fn from_points(points: &[Vec4]) -> Option<Self> {
        let first = points.first()?;
        let mut min = first.xyz();
        let mut max = first.xyz();
        for point in &points[1..] {
            min = min.inf(&point.xyz());
            max = max.sup(&point.xyz());
        }
        Some(Self::from_min_max(&min, &max))
    }

    pub fn corners(&self) -> &[Vec4; 8] {
        &self.corners
    }

    pub fn min(&self) -> Vec3 {
        self.corners[0].xyz()
    }

    pub fn max(&self) -> Vec3 {
        self.corners[7].xyz()
    }

    /// Corners carried through a transform (not re-fitted to an AABB)
    pub fn transformed(&self, matrix: &Mat4) -> [Vec4; 8] {
        self.corners.map(|corner| matrix.transform(&corner))
    }
}

/// Indexed triangle mesh in model space.
///
/// Immutable once built: every face index is a valid vertex offset and the
/// bounding box encloses the whole vertex buffer.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec4>,
    bounding_box: BoundingBox,
    faces: Vec<Face>,
}

impl Mesh {
    /// Build a mesh from homogeneous points and triangle index triples
    pub fn new(vertices: Vec<Vec4>, triangles: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let bounding_box = BoundingBox::from_points(&vertices).ok_or(MeshError::Empty)?;

        let count = vertices.len();
        for (face, triangle) in triangles.iter().enumerate() {
            if let Some(&index) = triangle.iter().find(|&&index| index >= count) {
                return Err(MeshError::IndexOutOfRange { face, index, count });
            }
        }

        Ok(Self::assemble(vertices, bounding_box, &triangles))
    }

    /// Build a mesh from polygon faces, fan-triangulating each one
    pub fn from_polygons(vertices: Vec<Vec4>, polygons: &[Vec<usize>]) -> Result<Self, MeshError> {
        let mut triangles = Vec::with_capacity(polygons.len());
        for (face, polygon) in polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(MeshError::DegeneratePolygon {
                    face,
                    len: polygon.len(),
                });
            }
            triangles.extend(crate::projection::fan_triangulate(polygon.as_slice()));
        }
        Self::new(vertices, triangles)
    }

    fn assemble(vertices: Vec<Vec4>, bounding_box: BoundingBox, triangles: &[[usize; 3]]) -> Self {
        let faces = triangles
            .iter()
            .enumerate()
            .map(|(i, &indices)| {
                let [a, b, c] = indices.map(|index| vertices[index]);
                let normal = face_normal(&a, &b, &c);
                if normal.length3() == 0.0 {
                    debug!("face {} ({:?}) has zero area, keeping a zero normal", i, indices);
                }
                Face { indices, normal }
            })
            .collect();

        Self {
            vertices,
            bounding_box,
            faces,
        }
    }

    /// Axis-aligned cube centred on the origin, counter-clockwise when seen
    /// from outside
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let min = Vec3::new(-half, -half, -half);
        let max = Vec3::new(half, half, half);
        let bounding_box = BoundingBox::from_min_max(&min, &max);
        let vertices = bounding_box.corners().to_vec();

        let triangles = [
            // Front face
            [1, 5, 7],
            [1, 7, 3],
            // Back face
            [0, 2, 6],
            [0, 6, 4],
            // Top face
            [2, 3, 7],
            [2, 7, 6],
            // Bottom face
            [0, 4, 5],
            [0, 5, 1],
            // Right face
            [4, 6, 7],
            [4, 7, 5],
            // Left face
            [0, 1, 3],
            [0, 3, 2],
        ];

        Self::assemble(vertices, bounding_box, &triangles)
    }

    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// A shared mesh placed in the world by a transform
#[derive(Debug, Clone)]
pub struct ModelObject {
    mesh: Arc<Mesh>,
    transform: Transform,
    model_matrix: Mat4,
}

impl ModelObject {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self::with_transform(mesh, Transform::default())
    }

    pub fn with_transform(mesh: Arc<Mesh>, transform: Transform) -> Self {
        Self {
            mesh,
            model_matrix: transform.model_matrix(),
            transform,
        }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_model_matrix();
    }

    pub fn update_model_matrix(&mut self) {
        self.model_matrix = self.transform.model_matrix();
    }

    /// World-space position of a model-space point
    pub fn to_world(&self, point: &Vec3) -> Vec4 {
        self.model_matrix.transform(&to_point(point))
    }
}
