/// Model transforms: translation, rotation and scale matrices
use crate::math::{Mat4, Vec3};

/// Position / rotation (radians) / scale triple of a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn with_rotation_degrees(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x.to_radians(), y.to_radians(), z.to_radians());
        self
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::new(s, s, s);
        self
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation.x += dx;
        self.rotation.y += dy;
        self.rotation.z += dz;
    }

    /// Translation matrix; the offset sits in row 3
    pub fn translation_matrix(position: &Vec3) -> Mat4 {
        let mut mat = Mat4::identity();
        mat[(3, 0)] = position.x;
        mat[(3, 1)] = position.y;
        mat[(3, 2)] = position.z;
        mat
    }

    /// Rotation matrix `Rz * Ry * Rx` from per-axis angles in radians
    pub fn rotation_matrix(rotation: &Vec3) -> Mat4 {
        let (sinx, cosx) = rotation.x.sin_cos();
        let (siny, cosy) = rotation.y.sin_cos();
        let (sinz, cosz) = rotation.z.sin_cos();

        let mut rx = Mat4::identity();
        rx[(1, 1)] = cosx;
        rx[(1, 2)] = -sinx;
        rx[(2, 1)] = sinx;
        rx[(2, 2)] = cosx;

        let mut ry = Mat4::identity();
        ry[(0, 0)] = cosy;
        ry[(0, 2)] = siny;
        ry[(2, 0)] = -siny;
        ry[(2, 2)] = cosy;

        let mut rz = Mat4::identity();
        rz[(0, 0)] = cosz;
        rz[(0, 1)] = sinz;
        rz[(1, 0)] = -sinz;
        rz[(1, 1)] = cosz;

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    pub fn scale_matrix(scale: &Vec3) -> Mat4 {
        let mut mat = Mat4::identity();
        mat[(0, 0)] = scale.x;
        mat[(1, 1)] = scale.y;
        mat[(2, 2)] = scale.z;
        mat
    }

    /// Scale and rotate about the origin, then translate.
    ///
    /// With row vectors the leftmost factor applies first, so this is
    /// `S * R * T` (the column-vector `T * R * S`).
    pub fn model_matrix(&self) -> Mat4 {
        let scale_rotation = Self::scale_matrix(&self.scale) * Self::rotation_matrix(&self.rotation);
        scale_rotation * Self::translation_matrix(&self.position)
    }

    /// Model-view-projection in row-vector order
    pub fn mvp_matrix(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
        &(model * view) * projection
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}
