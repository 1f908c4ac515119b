use std::f32::consts::FRAC_PI_4;

/// Initialization parameters for [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Back buffer width in physical pixels.
    pub width: u32,

    /// Back buffer height in physical pixels.
    pub height: u32,

    /// Present blocks on the display refresh when enabled.
    pub vsync: bool,

    /// Switches the window to borderless fullscreen for the lifetime of the
    /// device. Ignored by headless devices.
    pub fullscreen: bool,

    /// Far clip plane distance.
    pub screen_depth: f32,

    /// Near clip plane distance.
    pub screen_near: f32,

    /// Vertical field of view in radians.
    pub field_of_view: f32,

    /// Prefer an sRGB back buffer when available.
    ///
    /// Off by default: texel values reach the screen unconverted.
    pub prefer_srgb: bool,

    /// Limits requested from the adapter.
    pub required_limits: wgpu::Limits,

    /// Hint for how many frames may be queued ahead of presentation.
    pub desired_maximum_frame_latency: u32,
}

impl DeviceInit {
    /// Aspect ratio of the back buffer.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            vsync: true,
            fullscreen: false,
            screen_depth: 1000.0,
            screen_near: 0.1,
            field_of_view: FRAC_PI_4,
            prefer_srgb: false,
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_selects_a_blocking_present_mode() {
        let init = DeviceInit::default();
        assert_eq!(init.present_mode(), wgpu::PresentMode::AutoVsync);

        let init = DeviceInit {
            vsync: false,
            ..DeviceInit::default()
        };
        assert_eq!(init.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn aspect_ratio_tolerates_zero_height() {
        let init = DeviceInit {
            width: 640,
            height: 0,
            ..DeviceInit::default()
        };
        assert_eq!(init.aspect_ratio(), 640.0);
        assert_eq!(DeviceInit::default().aspect_ratio(), 800.0 / 600.0);
    }
}
