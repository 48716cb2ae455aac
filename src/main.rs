//! Headless ping-pong compute session.
//!
//! Usage: `shadebox [options.toml]`. Each frame packs fresh simulation
//! parameters, flips to the next bind group, and dispatches the step shader.

use std::path::Path;

use shadebox::gpu::compute_program;
use shadebox::gpu::context::ComputeContext;
use shadebox::gpu::packing::{self, QueueTarget};
use shadebox::gpu::pipeline_helpers::{storage_buffer, uniform_buffer};
use shadebox::gpu::program_state::ComputeProgramState;
use shadebox::options::Options;
use shadebox::ShadeboxError;
use wgpu::util::DeviceExt;

const STEP_SHADER: &str = include_str!("../assets/shaders/ping_pong.wgsl");

/// Invocations per workgroup declared by `STEP_SHADER`.
const STEP_WORKGROUP_SIZE: u32 = 64;

/// `gravity: vec3` (16) + `wind: vec2` (8) + `dt`, `damping` (8).
const PARAMS_BYTES: u64 = 32;

fn particle_buffer(
    device: &wgpu::Device,
    label: &str,
    particles: &[[f32; 4]],
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(particles),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    })
}

async fn run(options: &Options) -> Result<(), ShadeboxError> {
    options.validate(STEP_WORKGROUP_SIZE)?;
    let ctx = ComputeContext::headless(options.device.power_preference).await?;

    let layout =
        ctx.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle Bind Group Layout"),
                entries: &[
                    uniform_buffer(0),
                    storage_buffer(1, true),
                    storage_buffer(2, false),
                ],
            });

    let program = compute_program::build_checked(
        &ctx.device,
        &options.program.label,
        &[&layout],
        STEP_SHADER,
    )
    .await?;

    let params = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Particle Params"),
        size: PARAMS_BYTES,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let count = options.session.element_count.max(1) as usize;
    let particles: Vec<[f32; 4]> =
        (0..count).map(|i| [i as f32, 0.0, 0.0, 1.0]).collect();
    let front = particle_buffer(&ctx.device, "Particles A", &particles);
    let back = particle_buffer(&ctx.device, "Particles B", &particles);

    // Even-indexed groups step A -> B, odd-indexed groups step B -> A.
    let bind_groups =
        options.session.bind_groups.iter().enumerate().map(|(i, name)| {
            let (src, dst) = if i % 2 == 0 {
                (&front, &back)
            } else {
                (&back, &front)
            };
            let bind_group =
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(name.as_str()),
                    layout: &layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: params.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: src.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: dst.as_entire_binding(),
                        },
                    ],
                });
            (name.clone(), bind_group)
        });
    let mut state = ComputeProgramState::new(program.into_pipeline(), bind_groups);

    let workgroups = options.session.workgroup_count(STEP_WORKGROUP_SIZE);
    let gravity = [0.0f32, -9.8, 0.0];

    for frame in 0..options.session.frames {
        let wind = [(frame as f32 * 0.1).sin(), 0.0];
        let vectors: [&[f32]; 2] = [&gravity, &wind];
        let _ = packing::pack(
            &vectors,
            &[1.0 / 60.0, 0.99],
            &mut QueueTarget::new(&ctx.queue, &params),
        )?;

        let name =
            options.session.bind_group_for_frame(frame).ok_or_else(|| {
                ShadeboxError::InvalidOptions(format!(
                    "no bind group for frame {frame}"
                ))
            })?;
        state.select_bind_group(name)?;

        let mut encoder = ctx.create_encoder();
        state.dispatch(&mut encoder, 0, [workgroups, 1, 1])?;
        ctx.submit(encoder);
        log::info!("frame {frame}: dispatched '{name}' x{workgroups}");
    }

    if let Err(e) = ctx.device.poll(wgpu::PollType::Wait) {
        log::warn!("device poll failed: {e}");
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to load options '{path}': {e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    if let Err(e) = pollster::block_on(run(&options)) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_shader_declares_workgroup_size() {
        let decl = format!("@workgroup_size({STEP_WORKGROUP_SIZE})");
        assert!(STEP_SHADER.contains(&decl));
    }

    #[test]
    fn oversized_workgroup_is_refused_before_device_setup() {
        let mut options = Options::default();
        options.program.workgroup_size = 128;
        options.session.element_count = 256;

        let err = pollster::block_on(run(&options)).unwrap_err();
        assert!(matches!(err, ShadeboxError::InvalidOptions(_)));
    }
}
