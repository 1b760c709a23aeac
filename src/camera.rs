use glam::{Mat4, Vec3};

/// Perspective camera looking down -Z from `position`.
///
/// There is no look-at target: moving the camera along x pans the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraState {
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Width over height, falling back to 1 for a collapsed surface.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_keeps_camera_at_origin_looking_down_neg_z() {
        let camera = CameraState::default();
        let view = camera.view_matrix();
        assert!(view
            .transform_point3(camera.position)
            .abs_diff_eq(Vec3::ZERO, 1e-6));
        let ahead = view.transform_point3(Vec3::ZERO);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    }

    #[test]
    fn panning_shifts_points_the_other_way() {
        let mut camera = CameraState::default();
        camera.translate(Vec3::new(-1.5, 0.0, 0.0));
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p.x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn centre_of_view_projects_to_clip_centre() {
        let camera = CameraState::default();
        let clip = camera.view_proj(16.0 / 9.0).project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-6 && clip.y.abs() < 1e-6);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_eq!(aspect_ratio(1280, 0), 1.0);
        assert_eq!(aspect_ratio(1280, 640), 2.0);
    }
}
