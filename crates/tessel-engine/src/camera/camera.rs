use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Vec3};

const DEG_TO_RAD: f32 = PI / 180.0;

/// Free-fly camera: a position and Euler rotation in degrees.
///
/// The view transform is rebuilt from scratch by [`compute_view`](Self::compute_view);
/// [`view_matrix`](Self::view_matrix) returns whatever the last call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    rotation: Vec3,
    view: Mat4,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            view: Mat4::IDENTITY,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Rotation in degrees around X (pitch), Y (yaw) and Z (roll). Unbounded.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Rebuilds the left-handed view transform from position and rotation.
    ///
    /// Roll is applied first, then pitch, then yaw, to the canonical up (+Y)
    /// and forward (+Z) vectors.
    pub fn compute_view(&mut self) {
        let pitch = self.rotation.x * DEG_TO_RAD;
        let yaw = self.rotation.y * DEG_TO_RAD;
        let roll = self.rotation.z * DEG_TO_RAD;

        let rotation = Mat4::from_euler(EulerRot::YXZ, yaw, pitch, roll);
        let up = rotation.transform_vector3(Vec3::Y);
        let forward = rotation.transform_vector3(Vec3::Z);

        let target = self.position + forward;
        self.view = Mat4::look_at_lh(self.position, target, up);
    }

    /// Last transform built by [`compute_view`](Self::compute_view).
    ///
    /// Identity until the first compute; call compute once per frame before this.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-5), "\n{a:?}\n!=\n{b:?}");
    }

    #[test]
    fn view_is_identity_before_first_compute() {
        let mut camera = Camera::new();
        camera.set_position(1.0, 2.0, 3.0);
        assert_eq!(camera.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn origin_camera_looks_down_positive_z() {
        let mut camera = Camera::new();
        camera.compute_view();

        let reference = Mat4::look_at_lh(Vec3::ZERO, Vec3::Z, Vec3::Y);
        assert_close(camera.view_matrix(), reference);
        // Looking down +Z from the origin with +Y up is no change of basis.
        assert_close(camera.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_moves_the_world_opposite_way() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, -5.0);
        camera.compute_view();

        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
    }

    #[test]
    fn yaw_turns_forward_towards_positive_x() {
        let mut camera = Camera::new();
        camera.set_rotation(0.0, 90.0, 0.0);
        camera.compute_view();

        // A point on +X is straight ahead after a quarter turn.
        let p = camera.view_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5), "{p:?}");
    }

    #[test]
    fn pitch_tilts_forward_downwards() {
        let mut camera = Camera::new();
        camera.set_rotation(90.0, 0.0, 0.0);
        camera.compute_view();

        let p = camera.view_matrix().transform_point3(Vec3::NEG_Y);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5), "{p:?}");
    }

    #[test]
    fn compute_view_is_pure() {
        let mut camera = Camera::new();
        camera.set_position(1.5, -2.0, 7.25);
        camera.set_rotation(12.0, -470.0, 33.0);

        camera.compute_view();
        let first = camera.view_matrix();
        camera.compute_view();
        camera.compute_view();
        assert_eq!(camera.view_matrix().to_cols_array(), first.to_cols_array());

        let mut twin = Camera::new();
        twin.set_position(1.5, -2.0, 7.25);
        twin.set_rotation(12.0, -470.0, 33.0);
        twin.compute_view();
        assert_eq!(twin.view_matrix().to_cols_array(), first.to_cols_array());
    }

    #[test]
    fn setters_do_not_touch_the_view_until_recomputed() {
        let mut camera = Camera::new();
        camera.compute_view();
        let before = camera.view_matrix();

        camera.set_position(10.0, 0.0, 0.0);
        camera.set_rotation(0.0, 45.0, 0.0);
        assert_eq!(camera.view_matrix(), before);

        camera.compute_view();
        assert_ne!(camera.view_matrix(), before);
    }
}
