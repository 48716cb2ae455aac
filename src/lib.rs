// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests unwrap freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! GPU compute core for a browser shader showcase, built on wgpu.
//!
//! Shadebox packs CPU-side vectors and scalars into GPU buffers using WGSL
//! alignment rules, builds labeled compute pipelines, and tracks which named
//! bind group a frame loop dispatches with.
//!
//! # Key entry points
//!
//! - [`gpu::packing::pack`] - aligned vector/scalar packing with capacity
//!   checks
//! - [`gpu::compute_program::build`] - compute pipeline construction
//! - [`gpu::program_state::ComputeProgramState`] - bind group selection
//! - [`options::Options`] - TOML session configuration
//!
//! # Frame flow
//!
//! Each frame the caller packs fresh parameters into its uniform buffer,
//! selects the bind group for that frame, and records a dispatch. Queue
//! writes land before any command buffer submitted after them, so the
//! dispatch always sees the frame's data.

pub mod error;
pub mod gpu;
pub mod options;

pub use error::ShadeboxError;
