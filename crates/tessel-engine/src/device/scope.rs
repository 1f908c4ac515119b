/// Captures validation and out-of-memory errors raised between `push` and
/// `pop` on the current thread, instead of letting them reach the device's
/// uncaptured-error handler.
pub(crate) struct GpuErrorScope {
    // Dropped first: scopes unwind in reverse push order.
    validation: wgpu::ErrorScopeGuard,
    out_of_memory: wgpu::ErrorScopeGuard,
}

impl GpuErrorScope {
    pub(crate) fn push(device: &wgpu::Device) -> Self {
        let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self {
            validation,
            out_of_memory,
        }
    }

    /// Pops both scopes and returns the first captured error, if any.
    pub(crate) fn pop(self) -> Option<wgpu::Error> {
        let validation = pollster::block_on(self.validation.pop());
        let out_of_memory = pollster::block_on(self.out_of_memory.pop());
        validation.or(out_of_memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInit, GraphicsDevice};
    use crate::error::RenderError;

    fn headless() -> Option<GraphicsDevice<'static>> {
        match GraphicsDevice::headless(DeviceInit {
            width: 16,
            height: 16,
            ..DeviceInit::default()
        }) {
            Ok(gpu) => Some(gpu),
            Err(RenderError::DeviceInit(reason)) => {
                eprintln!("skipping: no headless adapter ({reason})");
                None
            }
            Err(err) => panic!("unexpected device error: {err}"),
        }
    }

    #[test]
    fn clean_work_captures_nothing() {
        let Some(gpu) = headless() else {
            return;
        };
        let device = gpu.device().unwrap();

        let scope = GpuErrorScope::push(device);
        let _buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scope test buffer"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        assert!(scope.pop().is_none());
    }

    #[test]
    fn invalid_usage_is_captured_not_raised() {
        let Some(gpu) = headless() else {
            return;
        };
        let device = gpu.device().unwrap();

        let scope = GpuErrorScope::push(device);
        // Mappable for reading and usable as a uniform is not a legal combination.
        let _buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scope test buffer"),
            size: 64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let err = scope.pop();
        assert!(matches!(err, Some(wgpu::Error::Validation { .. })), "{err:?}");
    }
}
