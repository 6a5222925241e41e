//! Error type for box tree operations.
//!
//! Every variant is a programming error on the caller's side. Conditions
//! that still allow rendering go to [`linnet_common::Diagnostics`] instead.

use thiserror::Error;

use crate::content::DumpMode;
use crate::tree::BoxId;

/// Errors returned by [`BoxTree`](crate::BoxTree) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InlineError {
    /// A handle of the wrong kind, or a child that cannot be attached.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A child index past the end of an inline box's children.
    #[error("child index {index} out of bounds for {len} children")]
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of children the box has.
        len: usize,
    },

    /// A dump mode other than [`DumpMode::Render`] was requested.
    #[error("invalid argument: dump mode '{0}' is not supported by inline boxes")]
    UnsupportedDumpMode(DumpMode),

    /// A handle that does not belong to this tree.
    #[error("unknown box {0}")]
    UnknownBox(BoxId),
}

impl InlineError {
    /// Whether this error is an invalid-argument condition.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UnsupportedDumpMode(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InlineError>;
