//! GPU compute plumbing.
//!
//! Provides headless wgpu device acquisition, aligned buffer packing,
//! compute pipeline construction, and bind group selection.

/// Compute pipeline construction with derived labels.
pub mod compute_program;
/// wgpu device and queue acquisition.
pub mod context;
/// Aligned vector/scalar packing into GPU buffers.
pub mod packing;
/// Compute-visible bind group layout entry helpers.
pub mod pipeline_helpers;
/// Named bind groups and the current selection.
pub mod program_state;
