//! World to screen projection.

use glam::{Mat4, Vec3};

/// Clip `w` below which a point counts as behind the viewer.
const BEHIND_EPSILON: f32 = 0.001;

/// Scale applied instead of the perspective divide for points behind the
/// viewer, pushing them far off screen in their projected direction.
const BEHIND_SCALE: f32 = 100_000.0;

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Normalized screen coordinates. `x` grows to the right, `y` grows
    /// *downward*, both in `-1..1` when on screen. `z` is clip depth.
    pub position: Vec3,
    /// The point was behind the viewer.
    pub behind: bool,
}

/// Project a world point through a view-projection matrix.
pub fn world_to_screen(view_proj: &Mat4, point: Vec3) -> ScreenPoint {
    let clip = *view_proj * point.extend(1.0);

    if clip.w < BEHIND_EPSILON {
        return ScreenPoint {
            position: Vec3::new(clip.x * BEHIND_SCALE, -clip.y * BEHIND_SCALE, clip.z),
            behind: true,
        };
    }

    let inv_w = 1.0 / clip.w;
    ScreenPoint {
        position: Vec3::new(clip.x * inv_w, -clip.y * inv_w, clip.z * inv_w),
        behind: false,
    }
}
