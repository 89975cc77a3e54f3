/// Camera and projection utilities
use crate::error::GeometryError;
use crate::math::{HomogeneousExt, Mat4, Plane, Vec4};

/// Lens settings. The near-plane extents are derived on demand so they
/// always follow `fov`, `aspect_ratio` and `near`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraSettings {
    pub fn new(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// `(left, right, bottom, top)` on the near plane
    pub fn extents(&self) -> (f32, f32, f32, f32) {
        perspective_extents(self.fov, self.aspect_ratio, self.near)
    }

    pub fn for_viewport(width: u32, height: u32) -> Self {
        let defaults = Self::default();
        Self::new(
            defaults.fov,
            width as f32 / height.max(1) as f32,
            defaults.near,
            defaults.far,
        )
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new(60.0, 4.0 / 3.0, 0.1, 100.0)
    }
}

/// Symmetric frustum extents on the near plane: `(left, right, bottom, top)`
pub fn perspective_extents(fov: f32, aspect_ratio: f32, near: f32) -> (f32, f32, f32, f32) {
    let scale = (fov * 0.5).to_radians().tan() * near;
    let right = aspect_ratio * scale;
    let top = scale;
    (-right, right, -top, top)
}

/// Off-center perspective projection.
///
/// The transformed point has `w = -z` (view-space depth), and view-space
/// `z = -near` / `z = -far` land on clip `z = -w` / `z = w`.
pub fn build_projection(settings: &CameraSettings) -> Mat4 {
    let CameraSettings { near, far, .. } = *settings;
    let (left, right, bottom, top) = settings.extents();

    let mut mat = Mat4::zeros();
    mat[(0, 0)] = 2.0 * near / (right - left);
    mat[(1, 1)] = 2.0 * near / (top - bottom);
    mat[(2, 0)] = (right + left) / (right - left);
    mat[(2, 1)] = (top + bottom) / (top - bottom);
    mat[(2, 2)] = -(far + near) / (far - near);
    mat[(2, 3)] = -1.0;
    mat[(3, 2)] = -2.0 * far * near / (far - near);
    mat
}

/// Right-handed view matrix; the camera looks down its local -z.
///
/// Fails with `DegenerateBasis` when `eye == target` or `up` is parallel to
/// the view direction.
pub fn look_at(eye: &Vec4, target: &Vec4, up: &Vec4) -> Result<Mat4, GeometryError> {
    let to_eye = Vec4::direction(eye.x - target.x, eye.y - target.y, eye.z - target.z);
    let forward = to_eye
        .try_normalize3()
        .map_err(|_| GeometryError::DegenerateBasis)?;
    let right = up
        .cross3(&forward)
        .try_normalize3()
        .map_err(|_| GeometryError::DegenerateBasis)?;
    let true_up = forward
        .cross3(&right)
        .try_normalize3()
        .map_err(|_| GeometryError::DegenerateBasis)?;

    let mut translation = Mat4::identity();
    translation[(3, 0)] = -eye.x;
    translation[(3, 1)] = -eye.y;
    translation[(3, 2)] = -eye.z;

    let mut rotation = Mat4::identity();
    for (col, axis) in [right, true_up, forward].iter().enumerate() {
        rotation[(0, col)] = axis.x;
        rotation[(1, col)] = axis.y;
        rotation[(2, col)] = axis.z;
    }

    Ok(translation * rotation)
}

/// `look_at` with the target one `front` step ahead of the eye
pub fn look_at_front(eye: &Vec4, front: &Vec4, up: &Vec4) -> Result<Mat4, GeometryError> {
    let target = Vec4::point(eye.x + front.x, eye.y + front.y, eye.z + front.z);
    look_at(eye, &target, up)
}

/// Frustum plane slots, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

impl FrustumPlane {
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Bottom,
        FrustumPlane::Top,
        FrustumPlane::Near,
        FrustumPlane::Far,
    ];
}

/// The six planes bounding the visible volume.
///
/// Planes are not normalized; only the sign of `signed_distance` is
/// meaningful unless a plane is explicitly `normalized()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Gribb-Hartmann extraction from a row-major, row-vector view-projection.
    ///
    /// Clip coordinates are columns of the matrix here, so each plane adds or
    /// subtracts one of the first three columns to/from the last one.
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let w = view_projection.column(3);
        let combine = |col: usize, sign: f32| {
            let axis = view_projection.column(col);
            Plane::new(
                w.x + sign * axis.x,
                w.y + sign * axis.y,
                w.z + sign * axis.z,
                w.w + sign * axis.w,
            )
        };

        Self {
            planes: [
                combine(0, 1.0),
                combine(0, -1.0),
                combine(1, 1.0),
                combine(1, -1.0),
                combine(2, 1.0),
                combine(2, -1.0),
            ],
        }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// True when the point is on the inner side of (or on) every plane
    pub fn contains_point(&self, point: &Vec4) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }
}

/// Camera position and orientation, as driven by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec4,
    pub front: Vec4,
    pub up: Vec4,
}

impl CameraPose {
    pub fn new(position: Vec4, front: Vec4, up: Vec4) -> Self {
        Self {
            position,
            front,
            up,
        }
    }

    /// Unit front direction from yaw/pitch in degrees, pitch clamped to +/-89
    pub fn front_from_angles(yaw: f32, pitch: f32) -> Vec4 {
        let pitch = pitch.clamp(-89.0, 89.0).to_radians();
        let yaw = yaw.to_radians();
        Vec4::direction(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
    }

    /// Strafe direction, `normalize(front x up)`
    pub fn right(&self) -> Result<Vec4, GeometryError> {
        self.front.cross3(&self.up).try_normalize3()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec4::point(0.0, 0.0, 3.0),
            front: Vec4::direction(0.0, 0.0, -1.0),
            up: Vec4::direction(0.0, 1.0, 0.0),
        }
    }
}

/// Camera owning its view/projection matrices and the derived frustum.
///
/// Matrices are only ever replaced whole; a failed update leaves the previous
/// state observable.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: CameraPose,
    view: Mat4,
    projection: Mat4,
    frustum: Frustum,
    settings: CameraSettings,
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        let pose = CameraPose::default();
        let view = look_at_front(&pose.position, &pose.front, &pose.up).unwrap_or_default();
        let projection = build_projection(&settings);
        let frustum = Frustum::from_view_projection(&(view * projection));

        Self {
            pose,
            view,
            projection,
            frustum,
            settings,
        }
    }

    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(CameraSettings::for_viewport(width, height))
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        &self.view * &self.projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn look_at(&mut self, eye: &Vec4, target: &Vec4, up: &Vec4) -> Result<(), GeometryError> {
        let view = look_at(eye, target, up)?;
        let front = Vec4::direction(target.x - eye.x, target.y - eye.y, target.z - eye.z);

        self.pose = CameraPose::new(*eye, front, *up);
        self.view = view;
        self.update_frustum_planes();
        Ok(())
    }

    pub fn look_at_front(&mut self, pose: &CameraPose) -> Result<(), GeometryError> {
        let view = look_at_front(&pose.position, &pose.front, &pose.up)?;

        self.pose = *pose;
        self.view = view;
        self.update_frustum_planes();
        Ok(())
    }

    /// Replace the lens settings, rebuilding the projection and frustum
    pub fn set_settings(&mut self, settings: CameraSettings) {
        self.projection = build_projection(&settings);
        self.settings = settings;
        self.update_frustum_planes();
    }

    pub fn update_frustum_planes(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection());
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}
