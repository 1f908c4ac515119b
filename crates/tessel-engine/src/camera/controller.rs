use glam::Vec3;

use crate::input::{Key, KeyInput};

use super::Camera;

/// Keyboard fly controls for a [`Camera`].
///
/// W/S and the up/down arrows move along the view direction, A/D strafe,
/// left/right arrows turn, Page Up/Down pitch, Q/E move vertically.
#[derive(Debug, Clone)]
pub struct FlyController {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per second.
    pub turn_speed: f32,
}

impl FlyController {
    pub fn new(move_speed: f32, turn_speed: f32) -> Self {
        Self {
            move_speed,
            turn_speed,
        }
    }

    /// Applies one frame of movement. Returns `true` if the camera changed.
    pub fn update(&self, camera: &mut Camera, input: &impl KeyInput, dt: f32) -> bool {
        let axis = |pos: &[Key], neg: &[Key]| -> f32 {
            let down = |keys: &[Key]| keys.iter().any(|k| input.is_key_down(*k));
            (down(pos) as i8 - down(neg) as i8) as f32
        };

        let turn = axis(&[Key::ArrowRight], &[Key::ArrowLeft]);
        let look = axis(&[Key::PageDown], &[Key::PageUp]);
        let advance = axis(&[Key::W, Key::ArrowUp], &[Key::S, Key::ArrowDown]);
        let strafe = axis(&[Key::D], &[Key::A]);
        let rise = axis(&[Key::E], &[Key::Q]);

        if turn == 0.0 && look == 0.0 && advance == 0.0 && strafe == 0.0 && rise == 0.0 {
            return false;
        }

        let mut rotation = camera.rotation();
        rotation.y += turn * self.turn_speed * dt;
        rotation.x += look * self.turn_speed * dt;
        camera.set_rotation(rotation.x, rotation.y, rotation.z);

        // Movement stays in the horizontal plane; only yaw steers it.
        let yaw = rotation.y.to_radians();
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(yaw.cos(), 0.0, -yaw.sin());

        let step = (forward * advance + right * strafe + Vec3::Y * rise) * self.move_speed * dt;
        let position = camera.position() + step;
        camera.set_position(position.x, position.y, position.z);

        true
    }
}

impl Default for FlyController {
    fn default() -> Self {
        Self::new(3.0, 90.0)
    }
}
