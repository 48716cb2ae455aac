use std::fmt;

use crate::options::PowerPreference;

/// Errors that can occur while acquiring a compute device.
#[derive(Debug)]
pub enum ContextError {
    /// No compatible GPU adapter found.
    AdapterRequest(wgpu::RequestAdapterError),
    /// GPU device request failed (limits or features not met).
    DeviceRequest(wgpu::RequestDeviceError),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterRequest(e) => {
                write!(f, "no compatible GPU adapter found: {e}")
            }
            Self::DeviceRequest(e) => write!(f, "device request failed: {e}"),
        }
    }
}

impl std::error::Error for ContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AdapterRequest(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
        }
    }
}

/// Owns the wgpu device and queue that compute work runs on.
///
/// The packing and pipeline code only borrows these; buffers, layouts, and
/// bind groups created from the device stay owned by the caller.
pub struct ComputeContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
    /// The wgpu command queue.
    pub queue: wgpu::Queue,
}

impl ComputeContext {
    /// Acquire a headless device (no surface) with default limits.
    ///
    /// # Errors
    ///
    /// Returns `ContextError` if no adapter matches or the device request
    /// fails.
    pub async fn headless(
        power_preference: PowerPreference,
    ) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: power_preference.into(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(ContextError::AdapterRequest)?;

        let info = adapter.get_info();
        log::debug!("compute adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Compute Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            })
            .await
            .map_err(ContextError::DeviceRequest)?;

        Ok(Self { device, queue })
    }

    /// Wrap an externally-owned device and queue.
    #[must_use]
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    /// Create a new command encoder for recording compute passes.
    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compute Encoder"),
            })
    }

    /// Finish the encoder and submit its command buffer to the GPU queue.
    ///
    /// Buffer writes queued before this call are applied before the
    /// submitted commands run.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Headless context for GPU-backed tests; `None` when no adapter exists.
#[cfg(test)]
pub(crate) fn test_context() -> Option<ComputeContext> {
    pollster::block_on(ComputeContext::headless(PowerPreference::default()))
        .ok()
}

/// Copy `buffer` into a mappable staging buffer and read its bytes back.
#[cfg(test)]
pub(crate) fn read_back(ctx: &ComputeContext, buffer: &wgpu::Buffer) -> Vec<u8> {
    let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging"),
        size: buffer.size(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = ctx.create_encoder();
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer.size());
    ctx.submit(encoder);

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = ctx.device.poll(wgpu::PollType::Wait).unwrap();
    rx.recv().unwrap().unwrap();

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    bytes
}
