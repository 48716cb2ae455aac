//! Compute pipeline construction with derived diagnostic labels.
//!
//! Every program compiles its shader against the fixed entry point
//! [`COMPUTE_ENTRY_POINT`]. Bind group layouts are attached in the order
//! given, so slot `i` of the pipeline layout is `@group(i)` in the shader.

use std::fmt;

/// Entry point every compute shader must export.
pub const COMPUTE_ENTRY_POINT: &str = "computeMain";

/// Diagnostic labels derived from a program's base label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramLabels {
    /// `{label}.pipeline`
    pub pipeline: String,
    /// `{label}.layout`
    pub layout: String,
    /// `{label}.shaderModule`
    pub shader_module: String,
}

impl ProgramLabels {
    /// Derive the pipeline, layout, and shader module labels for `label`.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            pipeline: format!("{label}.pipeline"),
            layout: format!("{label}.layout"),
            shader_module: format!("{label}.shaderModule"),
        }
    }
}

/// Errors reported by the backend while building a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// The backend rejected the shader module or the pipeline built from it.
    ShaderCompile {
        /// Pipeline label of the failed build.
        label: String,
        /// Backend diagnostic.
        message: String,
    },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderCompile { label, message } => {
                write!(f, "failed to build '{label}': {message}")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// A compiled compute pipeline together with its labels.
#[derive(Debug, Clone)]
pub struct ComputeProgram {
    pipeline: wgpu::ComputePipeline,
    labels: ProgramLabels,
    bind_group_count: usize,
}

impl ComputeProgram {
    /// The compiled pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    /// Labels attached to the pipeline, its layout, and its shader module.
    #[must_use]
    pub fn labels(&self) -> &ProgramLabels {
        &self.labels
    }

    /// Number of bind group slots in the pipeline layout.
    #[must_use]
    pub fn bind_group_count(&self) -> usize {
        self.bind_group_count
    }

    /// Give up the labels and keep only the pipeline.
    #[must_use]
    pub fn into_pipeline(self) -> wgpu::ComputePipeline {
        self.pipeline
    }
}

/// Build a compute pipeline from WGSL source and ordered bind group layouts.
///
/// Shader errors are not detected here; the backend reports them through
/// the device's error channel under the derived labels. Use
/// [`build_checked`] to capture them.
pub fn build(
    device: &wgpu::Device,
    label: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    shader_source: &str,
) -> ComputeProgram {
    let labels = ProgramLabels::new(label);

    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&labels.layout),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&labels.shader_module),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline =
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&labels.pipeline),
            layout: Some(&layout),
            module: &module,
            entry_point: Some(COMPUTE_ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

    log::debug!(
        "built compute program '{}' with {} bind group layouts",
        labels.pipeline,
        bind_group_layouts.len()
    );

    ComputeProgram {
        pipeline,
        labels,
        bind_group_count: bind_group_layouts.len(),
    }
}

/// Like [`build`], but waits for the backend's verdict.
///
/// The build runs inside a validation error scope; a shader that fails to
/// compile, or a pipeline whose layout does not match the shader, resolves
/// to [`ProgramError::ShaderCompile`] tagged with the pipeline label.
///
/// # Errors
///
/// Returns [`ProgramError::ShaderCompile`] if the backend rejects the build.
pub async fn build_checked(
    device: &wgpu::Device,
    label: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    shader_source: &str,
) -> Result<ComputeProgram, ProgramError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let program = build(device, label, bind_group_layouts, shader_source);

    match device.pop_error_scope().await {
        Some(e) => {
            log::error!("compute program '{}' failed: {e}", program.labels.pipeline);
            Err(ProgramError::ShaderCompile {
                label: program.labels.pipeline,
                message: e.to_string(),
            })
        }
        None => Ok(program),
    }
}
