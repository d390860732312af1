//! Camera and view state read by the effect passes.
//!
//! A [`ViewContext`] is the explicit replacement for an ambient render
//! instance: every pass receives the camera basis, matrices, frustum, clock
//! and visibility bytes through it.

use glam::{Mat4, Vec3};

use crate::cull::Frustum;

/// Caller-supplied view configuration.
///
/// Angles follow the Z-up convention: `x` pitch (positive looks down),
/// `y` yaw (about +Z, 0 faces +X), `z` roll, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    /// Eye position.
    pub origin: Vec3,
    /// Pitch, yaw, roll in degrees.
    pub angles: Vec3,
    /// Horizontal field of view in degrees.
    pub fov_x: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clip distance.
    pub z_near: f32,
    /// Far clip distance.
    pub z_far: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            angles: Vec3::ZERO,
            fov_x: 90.0,
            fov_y: 73.74,
            z_near: 4.0,
            z_far: 4096.0,
        }
    }
}

impl ViewParams {
    /// Forward, right and up vectors for these angles.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        angle_vectors(self.angles)
    }

    /// Perspective projection for the two fields of view.
    pub fn projection(&self) -> Mat4 {
        let half_x = (self.fov_x.to_radians() * 0.5).tan();
        let half_y = (self.fov_y.to_radians() * 0.5).tan();
        let aspect = if half_y > 0.0 { half_x / half_y } else { 1.0 };
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.z_near, self.z_far)
    }
}

/// Forward, right and up vectors for pitch / yaw / roll in degrees.
pub fn angle_vectors(angles: Vec3) -> (Vec3, Vec3, Vec3) {
    let (sp, cp) = angles.x.to_radians().sin_cos();
    let (sy, cy) = angles.y.to_radians().sin_cos();
    let (sr, cr) = angles.z.to_radians().sin_cos();

    let forward = Vec3::new(cp * cy, cp * sy, -sp);
    let right = Vec3::new(
        -sr * sp * cy + cr * sy,
        -sr * sp * sy - cr * cy,
        -sr * cp,
    );
    let up = Vec3::new(cr * sp * cy + sr * sy, cr * sp * sy - sr * cy, cr * cp);
    (forward, right, up)
}

/// Camera, clock and visibility state for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    /// Eye position.
    pub origin: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Unit screen-right direction.
    pub right: Vec3,
    /// Unit screen-up direction.
    pub up: Vec3,
    /// Projection times view.
    pub view_proj: Mat4,
    /// Viewport width over height implied by the projection.
    pub aspect: f32,
    /// Clip planes of `view_proj`.
    pub frustum: Frustum,
    /// Current absolute time in seconds.
    pub time: f32,
    /// Duration of the current frame in seconds.
    pub frametime: f32,
    /// Potentially visible set, one bit per leaf.
    pub visbytes: Vec<u8>,
}

impl ViewContext {
    /// Build a view looking along `forward` from `origin`.
    ///
    /// `up_hint` only needs to be non-parallel to `forward`; the stored basis
    /// is orthonormal.
    pub fn new(origin: Vec3, forward: Vec3, up_hint: Vec3, projection: Mat4) -> Self {
        let forward = forward.normalize_or_zero();
        let right = forward.cross(up_hint).normalize_or_zero();
        let up = right.cross(forward);
        Self::from_basis(origin, forward, right, up, projection)
    }

    /// Build a view from caller view parameters.
    pub fn from_params(params: &ViewParams) -> Self {
        let (forward, right, up) = params.basis();
        Self::from_basis(params.origin, forward, right, up, params.projection())
    }

    fn from_basis(origin: Vec3, forward: Vec3, right: Vec3, up: Vec3, projection: Mat4) -> Self {
        let view = Mat4::look_to_rh(origin, forward, up);
        let view_proj = projection * view;
        Self {
            origin,
            forward,
            right,
            up,
            view_proj,
            aspect: projection_aspect(&projection),
            frustum: Frustum::from_view_projection(view_proj),
            time: 0.0,
            frametime: 0.0,
            visbytes: Vec::new(),
        }
    }

    /// Set the clock.
    pub fn with_time(mut self, time: f32, frametime: f32) -> Self {
        self.time = time;
        self.frametime = frametime;
        self
    }

    /// Set the visibility bytes.
    pub fn with_visbytes(mut self, visbytes: &[u8]) -> Self {
        self.visbytes.clear();
        self.visbytes.extend_from_slice(visbytes);
        self
    }

    /// Signed distance of `point` in front of the eye along `forward`.
    #[inline]
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.forward)
    }

    /// Whether leaf `leaf` is marked visible.
    pub fn is_leaf_visible(&self, leaf: usize) -> bool {
        self.visbytes
            .get(leaf >> 3)
            .is_some_and(|byte| byte & (1 << (leaf & 7)) != 0)
    }
}

/// Width over height of a perspective projection, 1.0 when degenerate.
fn projection_aspect(projection: &Mat4) -> f32 {
    let aspect = projection.y_axis.y / projection.x_axis.x;
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

impl Default for ViewContext {
    fn default() -> Self {
        Self::from_params(&ViewParams::default())
    }
}
