//! A [`Projector`] built from a camera's view-projection matrix, for hosts
//! that can hand over the matrix but not a world-to-screen call.

use glam::{Mat4, Vec2, Vec3};

use crate::layout::Viewport;
use crate::render::Projector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    /// Column-major world to clip space transform, depth in `0..=1` or `-1..=1`.
    pub matrix: Mat4,
    pub viewport: Viewport,
}

impl ViewProjection {
    pub fn new(matrix: Mat4, viewport: Viewport) -> Self {
        Self { matrix, viewport }
    }

    /// Right-handed perspective camera at `eye` looking at `target`, y up.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, viewport: Viewport) -> Self {
        let aspect = if viewport.size.y > 0.0 {
            viewport.size.x / viewport.size.y
        } else {
            1.0
        };
        let projection = Mat4::perspective_rh(fov_y_radians, aspect, 0.1, 1000.0);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        Self::new(projection * view, viewport)
    }
}

impl Projector for ViewProjection {
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.matrix * world.extend(1.0);
        // Behind the camera or on its plane.
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
            return None;
        }

        let size = self.viewport.size;
        Some(Vec2::new(
            self.viewport.origin.x + (ndc.x + 1.0) * 0.5 * size.x,
            self.viewport.origin.y + (1.0 - ndc.y) * 0.5 * size.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ViewProjection {
        ViewProjection::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            60f32.to_radians(),
            Viewport::from_size(800.0, 600.0),
        )
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let screen = camera().world_to_screen(Vec3::ZERO).unwrap();
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 0.01);
    }

    #[test]
    fn up_is_towards_top_of_screen() {
        let screen = camera().world_to_screen(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(screen.y < 300.0);
        let screen = camera().world_to_screen(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(screen.x > 400.0);
    }

    #[test]
    fn points_behind_or_outside_are_dropped() {
        assert_eq!(camera().world_to_screen(Vec3::new(0.0, 0.0, 20.0)), None);
        assert_eq!(camera().world_to_screen(Vec3::new(100.0, 0.0, 0.0)), None);
    }
}
