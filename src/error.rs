//! Crate-level error types.

use std::fmt;

use crate::gpu::compute_program::ProgramError;
use crate::gpu::context::ContextError;
use crate::gpu::packing::PackError;
use crate::gpu::program_state::SelectionError;

/// Errors produced by the shadebox crate.
#[derive(Debug)]
pub enum ShadeboxError {
    /// GPU device acquisition failure.
    Context(ContextError),
    /// Packed data does not fit its destination buffer.
    Pack(PackError),
    /// Bind group selection or dispatch failure.
    Selection(SelectionError),
    /// The backend rejected a compute program.
    Program(ProgramError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Options parsed but cannot drive a session.
    InvalidOptions(String),
}

impl fmt::Display for ShadeboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(e) => write!(f, "GPU error: {e}"),
            Self::Pack(e) => write!(f, "packing error: {e}"),
            Self::Selection(e) => write!(f, "selection error: {e}"),
            Self::Program(e) => write!(f, "program error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
        }
    }
}

impl std::error::Error for ShadeboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context(e) => Some(e),
            Self::Pack(e) => Some(e),
            Self::Selection(e) => Some(e),
            Self::Program(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::OptionsParse(_) | Self::InvalidOptions(_) => None,
        }
    }
}

impl From<ContextError> for ShadeboxError {
    fn from(e: ContextError) -> Self {
        Self::Context(e)
    }
}

impl From<PackError> for ShadeboxError {
    fn from(e: PackError) -> Self {
        Self::Pack(e)
    }
}

impl From<SelectionError> for ShadeboxError {
    fn from(e: SelectionError) -> Self {
        Self::Selection(e)
    }
}

impl From<ProgramError> for ShadeboxError {
    fn from(e: ProgramError) -> Self {
        Self::Program(e)
    }
}

impl From<std::io::Error> for ShadeboxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
