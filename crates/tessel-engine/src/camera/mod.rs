//! Free-fly camera and its keyboard controller.

mod camera;
mod controller;

pub use camera::Camera;
pub use controller::FlyController;
