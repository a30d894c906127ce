//! Error types.

use thiserror::Error;

/// Errors raised by the cutting optimizer.
///
/// An unplaceable piece is not an error: packing results report how many of
/// the requested pieces were placed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A cut in the cut list is malformed.
    #[error("invalid cut: {0}")]
    InvalidCut(String),

    /// A sheet or inventory sheet is malformed.
    #[error("invalid sheet: {0}")]
    InvalidSheet(String),

    /// Any other malformed argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal invariant violated inside a packer.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
