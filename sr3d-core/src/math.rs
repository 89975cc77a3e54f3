/// Linear algebra core: homogeneous vectors, row-vector 4x4 matrices and planes
///
/// Every matrix in this crate is row-major and uses the row-vector convention:
/// a point is transformed as `v * M`, translation lives in row 3 and matrices
/// compose left to right (`model * view * projection`). This is the transpose
/// of the OpenGL/nalgebra column-vector convention, so `Mat4` wraps the
/// nalgebra storage instead of exposing it directly.
use nalgebra::{Matrix4, Vector3, Vector4};
use std::ops::{Add, Index, IndexMut, Mul, Sub};

use crate::error::GeometryError;

/// Float triple (positions, Euler angles, scale factors)
pub type Vec3 = Vector3<f32>;

/// Homogeneous point (w = 1) or direction (w = 0)
pub type Vec4 = Vector4<f32>;

/// Homogeneous helpers for `Vec4`.
///
/// The 3-component operations ignore `w`, which is what the camera basis and
/// face normal code needs when it works on directions.
pub trait HomogeneousExt: Sized {
    /// A point, `w = 1`
    fn point(x: f32, y: f32, z: f32) -> Self;

    /// A direction, `w = 0`
    fn direction(x: f32, y: f32, z: f32) -> Self;

    fn dot3(&self, other: &Self) -> f32;

    /// Cross product of the xyz parts; the result is a direction.
    fn cross3(&self, other: &Self) -> Self;

    fn length3(&self) -> f32;

    /// Normalized copy of the xyz part, `w` is preserved.
    fn try_normalize3(&self) -> Result<Self, GeometryError>;

    /// Normalizes the xyz part in place. On `ZeroLength` the vector is left untouched.
    fn normalize3_in_place(&mut self) -> Result<(), GeometryError>;
}

impl HomogeneousExt for Vec4 {
    fn point(x: f32, y: f32, z: f32) -> Self {
        Vec4::new(x, y, z, 1.0)
    }

    fn direction(x: f32, y: f32, z: f32) -> Self {
        Vec4::new(x, y, z, 0.0)
    }

    fn dot3(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn cross3(&self, other: &Self) -> Self {
        Vec4::direction(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    fn length3(&self) -> f32 {
        self.dot3(self).sqrt()
    }

    fn try_normalize3(&self) -> Result<Self, GeometryError> {
        let mut normalized = *self;
        normalized.normalize3_in_place()?;
        Ok(normalized)
    }

    fn normalize3_in_place(&mut self) -> Result<(), GeometryError> {
        let length_sq = self.dot3(self);
        // Also rejects NaN
        if !(length_sq > 0.0) {
            return Err(GeometryError::ZeroLength);
        }

        let inv_length = 1.0 / length_sq.sqrt();
        self.x *= inv_length;
        self.y *= inv_length;
        self.z *= inv_length;
        Ok(())
    }
}

/// Extend a triple to a homogeneous point
pub fn to_point(v: &Vec3) -> Vec4 {
    Vec4::new(v.x, v.y, v.z, 1.0)
}

/// 4x4 matrix, row-major, row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(Matrix4<f32>);

impl Mat4 {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn zeros() -> Self {
        Self(Matrix4::zeros())
    }

    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self(Matrix4::from_fn(|row, col| rows[row][col]))
    }

    pub fn to_rows(&self) -> [[f32; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.0[(r, c)];
            }
        }
        rows
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.0[(row, col)] = value;
    }

    pub fn row(&self, row: usize) -> Vec4 {
        Vec4::new(
            self.0[(row, 0)],
            self.0[(row, 1)],
            self.0[(row, 2)],
            self.0[(row, 3)],
        )
    }

    pub fn column(&self, col: usize) -> Vec4 {
        Vec4::new(
            self.0[(0, col)],
            self.0[(1, col)],
            self.0[(2, col)],
            self.0[(3, col)],
        )
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Underlying storage, indexed `(row, col)` like `Mat4` itself
    pub fn as_matrix(&self) -> &Matrix4<f32> {
        &self.0
    }

    /// Transform a row vector: `v * M`
    pub fn transform(&self, v: &Vec4) -> Vec4 {
        self.0.tr_mul(v)
    }

    /// `v * M` written into a caller-owned destination
    pub fn transform_into(&self, v: &Vec4, out: &mut Vec4) {
        for col in 0..4 {
            out[col] = v.x * self.0[(0, col)]
                + v.y * self.0[(1, col)]
                + v.z * self.0[(2, col)]
                + v.w * self.0[(3, col)];
        }
    }

    /// Gauss-Jordan elimination with partial pivoting.
    ///
    /// Fails with `SingularMatrix` when the largest remaining pivot in a
    /// column is exactly zero.
    pub fn try_inverse(&self) -> Result<Mat4, GeometryError> {
        let mut m = self.to_rows();
        let mut inv = Mat4::identity().to_rows();

        for col in 0..4 {
            let mut pivot = col;
            let mut pivot_size = m[col][col].abs();
            for (row, values) in m.iter().enumerate().skip(col + 1) {
                let size = values[col].abs();
                if size > pivot_size {
                    pivot = row;
                    pivot_size = size;
                }
            }

            if pivot_size == 0.0 {
                return Err(GeometryError::SingularMatrix);
            }

            if pivot != col {
                m.swap(pivot, col);
                inv.swap(pivot, col);
            }

            for row in col + 1..4 {
                let factor = m[row][col] / m[col][col];
                for k in 0..4 {
                    m[row][k] -= factor * m[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
                m[row][col] = 0.0;
            }
        }

        for row in 0..4 {
            let divisor = m[row][row];
            for k in 0..4 {
                m[row][k] /= divisor;
                inv[row][k] /= divisor;
            }
            m[row][row] = 1.0;
        }

        for row in 0..3 {
            for col in row + 1..4 {
                let factor = m[row][col];
                for k in 0..4 {
                    m[row][k] -= m[col][k] * factor;
                    inv[row][k] -= inv[col][k] * factor;
                }
                m[row][col] = 0.0;
            }
        }

        Ok(Mat4::from_rows(inv))
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    fn index(&self, index: (usize, usize)) -> &f32 {
        &self.0[index]
    }
}

impl IndexMut<(usize, usize)> for Mat4 {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f32 {
        &mut self.0[index]
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4(self.0 * rhs.0)
    }
}

impl Mul<&Mat4> for &Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: &Mat4) -> Mat4 {
        Mat4(self.0 * rhs.0)
    }
}

impl Add for Mat4 {
    type Output = Mat4;

    fn add(self, rhs: Mat4) -> Mat4 {
        Mat4(self.0 + rhs.0)
    }
}

impl Sub for Mat4 {
    type Output = Mat4;

    fn sub(self, rhs: Mat4) -> Mat4 {
        Mat4(self.0 - rhs.0)
    }
}

/// Which side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Negative,
    On,
    Positive,
}

/// Plane `a*x + b*y + c*z + d*w = 0`.
///
/// `(a, b, c)` is not necessarily unit length; use `normalized` before
/// treating `signed_distance` as a metric distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    pub fn signed_distance(&self, v: &Vec4) -> f32 {
        self.a * v.x + self.b * v.y + self.c * v.z + self.d * v.w
    }

    pub fn side(&self, v: &Vec4) -> PlaneSide {
        let distance = self.signed_distance(v);
        if distance < 0.0 {
            PlaneSide::Negative
        } else if distance > 0.0 {
            PlaneSide::Positive
        } else {
            PlaneSide::On
        }
    }

    /// Scale the plane so `(a, b, c)` has unit length
    pub fn normalized(&self) -> Result<Plane, GeometryError> {
        let length_sq = self.a * self.a + self.b * self.b + self.c * self.c;
        if !(length_sq > 0.0) {
            return Err(GeometryError::ZeroLength);
        }

        let inv_length = 1.0 / length_sq.sqrt();
        Ok(Plane::new(
            self.a * inv_length,
            self.b * inv_length,
            self.c * inv_length,
            self.d * inv_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_matrix() -> Mat4 {
        Mat4::from_rows([
            [2.0, 0.0, 1.0, 0.0],
            [1.0, 3.0, 0.0, 0.0],
            [0.0, 1.0, 4.0, 0.0],
            [5.0, -2.0, 3.0, 1.0],
        ])
    }

    #[test]
    fn test_vector_arithmetic_and_in_place_variants() {
        let a = Vec4::point(1.0, 2.0, 3.0);
        let b = Vec4::direction(0.5, -1.0, 2.0);

        let sum = a + b;
        assert_eq!(sum, Vec4::new(1.5, 1.0, 5.0, 1.0));

        let mut acc = a;
        acc += b;
        acc *= 2.0;
        assert_eq!(acc, Vec4::new(3.0, 2.0, 10.0, 2.0));
        assert_eq!(a - b, Vec4::new(0.5, 3.0, 1.0, 1.0));
    }

    #[test]
    fn test_cross3_is_right_handed_direction() {
        let x = Vec4::direction(1.0, 0.0, 0.0);
        let y = Vec4::direction(0.0, 1.0, 0.0);
        assert_eq!(x.cross3(&y), Vec4::direction(0.0, 0.0, 1.0));
        assert_eq!(y.cross3(&x), Vec4::direction(0.0, 0.0, -1.0));
        assert_eq!(x.dot3(&y), 0.0);
    }

    #[test]
    fn test_normalize_zero_length_is_reported_and_untouched() {
        let mut zero = Vec4::direction(0.0, 0.0, 0.0);
        assert_eq!(zero.normalize3_in_place(), Err(GeometryError::ZeroLength));
        assert_eq!(zero, Vec4::direction(0.0, 0.0, 0.0));

        let v = Vec4::direction(3.0, 0.0, 4.0).try_normalize3().unwrap();
        assert_relative_eq!(v.length3(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.x, 0.6, epsilon = 1e-6);
        assert_eq!(v.w, 0.0);
    }

    #[test]
    fn test_row_vector_translation() {
        let mut translation = Mat4::identity();
        translation[(3, 0)] = 1.0;
        translation[(3, 1)] = 2.0;
        translation[(3, 2)] = 3.0;

        let moved = translation.transform(&Vec4::point(1.0, 1.0, 1.0));
        assert_eq!(moved, Vec4::new(2.0, 3.0, 4.0, 1.0));

        // Directions ignore translation
        let dir = translation.transform(&Vec4::direction(1.0, 0.0, 0.0));
        assert_eq!(dir, Vec4::direction(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_transform_into_matches_transform() {
        let m = sample_matrix();
        let v = Vec4::new(0.5, -1.5, 2.0, 1.0);
        let mut out = Vec4::zeros();
        m.transform_into(&v, &mut out);
        assert_relative_eq!(out, m.transform(&v), epsilon = 1e-6);
    }

    #[test]
    fn test_multiplication_composes_left_to_right() {
        let a = sample_matrix();
        let mut b = Mat4::identity();
        b[(0, 1)] = 2.0;
        let v = Vec4::new(1.0, 2.0, 3.0, 1.0);

        // v * (A * B) == (v * A) * B
        let combined = (a * b).transform(&v);
        let stepwise = b.transform(&a.transform(&v));
        assert_relative_eq!(combined, stepwise, epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_add_sub() {
        let a = sample_matrix();
        let sum = a + Mat4::identity();
        assert_eq!(sum.get(0, 0), 3.0);
        assert_eq!((sum - Mat4::identity()), a);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = sample_matrix();
        let inv = m.try_inverse().unwrap();
        assert_relative_eq!(
            (m * inv).as_matrix(),
            Mat4::identity().as_matrix(),
            epsilon = 1e-5
        );
        // The source matrix is not consumed by elimination
        assert_eq!(m, sample_matrix());
    }

    #[test]
    fn test_inverse_needs_pivoting() {
        // Zero on the leading diagonal entry
        let m = Mat4::from_rows([
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let inv = m.try_inverse().unwrap();
        assert_relative_eq!(
            (inv * m).as_matrix(),
            Mat4::identity().as_matrix(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert_eq!(Mat4::zeros().try_inverse(), Err(GeometryError::SingularMatrix));

        let mut last_column_zero = Mat4::identity();
        last_column_zero[(3, 3)] = 0.0;
        assert_eq!(
            last_column_zero.try_inverse(),
            Err(GeometryError::SingularMatrix)
        );
    }

    #[test]
    fn test_plane_side_and_normalization() {
        let plane = Plane::new(0.0, 0.0, 2.0, 4.0);
        assert_eq!(plane.side(&Vec4::point(0.0, 0.0, -3.0)), PlaneSide::Negative);
        assert_eq!(plane.side(&Vec4::point(0.0, 0.0, -2.0)), PlaneSide::On);
        assert_eq!(plane.side(&Vec4::point(0.0, 0.0, 0.0)), PlaneSide::Positive);

        let unit = plane.normalized().unwrap();
        assert_relative_eq!(unit.c, 1.0);
        assert_relative_eq!(unit.signed_distance(&Vec4::point(0.0, 0.0, 1.0)), 3.0);
        assert_eq!(
            Plane::new(0.0, 0.0, 0.0, 1.0).normalized(),
            Err(GeometryError::ZeroLength)
        );
    }
}
