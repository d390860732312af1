//! View frustum culling for axis-aligned boxes.

use glam::{Mat4, Vec3, Vec4};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning two corners in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box around a tracer segment.
    ///
    /// An axis along which `start` and `end` coincide would give the box zero
    /// thickness, so its maximum is pushed out by twice the ribbon width.
    pub fn tracer_bounds(start: Vec3, end: Vec3, width: f32) -> Self {
        let mut bounds = Self::from_corners(start, end);
        for axis in 0..3 {
            if bounds.min[axis] == bounds.max[axis] {
                bounds.max[axis] += width * 2.0;
            }
        }
        bounds
    }

    /// Edge lengths.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Six clip planes of a view, stored as `(normal, distance)` with the inside
/// where `normal.dot(p) + distance >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes from a view-projection matrix with `0..1` clip
    /// depth, the convention of glam's `perspective_rh`.
    pub fn from_view_projection(view_proj: Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Whether `bounds` lies completely outside the view.
    ///
    /// Conservative: a box straddling a plane corner may be kept even when
    /// it is invisible, but a visible box is never culled.
    pub fn cull_box(&self, bounds: &Aabb) -> bool {
        self.planes.iter().any(|plane| {
            let normal = plane.truncate();
            // Corner furthest along the plane normal.
            let corner = Vec3::select(normal.cmpge(Vec3::ZERO), bounds.max, bounds.min);
            normal.dot(corner) + plane.w < 0.0
        })
    }

    /// Whether a point lies inside every plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Camera at (100, 0, 0) looking down -X with Z up.
    fn test_frustum() -> Frustum {
        let view = Mat4::look_to_rh(Vec3::new(100.0, 0.0, 0.0), Vec3::NEG_X, Vec3::Z);
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 4.0, 4096.0);
        Frustum::from_view_projection(proj * view)
    }

    #[test]
    fn test_box_in_front_is_visible() {
        let frustum = test_frustum();
        let bounds = Aabb::from_corners(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(!frustum.cull_box(&bounds));
        assert!(frustum.contains_point(Vec3::ZERO));
    }

    #[test]
    fn test_box_behind_is_culled() {
        let frustum = test_frustum();
        let bounds = Aabb::from_corners(Vec3::new(150.0, -1.0, -1.0), Vec3::new(152.0, 1.0, 1.0));
        assert!(frustum.cull_box(&bounds));
    }

    #[test]
    fn test_box_off_to_side_is_culled() {
        let frustum = test_frustum();
        // 90 degree FOV: at distance 100 the half-width is 100.
        let bounds = Aabb::from_corners(Vec3::new(-1.0, 300.0, -1.0), Vec3::new(1.0, 302.0, 1.0));
        assert!(frustum.cull_box(&bounds));
    }

    #[test]
    fn test_box_beyond_far_plane_is_culled() {
        let frustum = test_frustum();
        let bounds = Aabb::from_corners(Vec3::new(-5000.0, -1.0, -1.0), Vec3::new(-4999.0, 1.0, 1.0));
        assert!(frustum.cull_box(&bounds));
    }

    #[test]
    fn test_box_straddling_plane_is_visible() {
        let frustum = test_frustum();
        let bounds = Aabb::from_corners(Vec3::new(-1.0, 50.0, -1.0), Vec3::new(1.0, 500.0, 1.0));
        assert!(!frustum.cull_box(&bounds));
    }

    #[test]
    fn test_tracer_bounds_pads_degenerate_axes() {
        let p = Vec3::new(3.0, 4.0, 5.0);
        let bounds = Aabb::tracer_bounds(p, p, 1.5);
        assert_eq!(bounds.min, p);
        assert_eq!(bounds.size(), Vec3::splat(3.0));
        assert!(bounds.size().cmpgt(Vec3::ZERO).all());
    }

    #[test]
    fn test_tracer_bounds_pads_only_flat_axes() {
        let bounds = Aabb::tracer_bounds(Vec3::new(0.0, 0.0, 0.0), Vec3::new(-4.0, 0.0, 2.0), 0.5);
        assert_eq!(bounds.min, Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(0.0, 1.0, 2.0));
    }
}
