//! Errors raised by the volume icon pipeline.

use super::IconTag;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for icon operations
pub type Result<T> = std::result::Result<T, IconError>;

/// Hard and per-tag failures of the icon pipeline.
///
/// `MalformedContainer` and `Io` abort [`produce_icon`](super::VolumeIconComposer::produce_icon).
/// `InvalidImage` only ever concerns one tag and is downgraded to a warning
/// by the reconciler.
#[derive(Error, Debug)]
pub enum IconError {
    /// The bytes of a container file do not follow the icns framing.
    #[error("malformed icon container {}: {reason}", path.display())]
    MalformedContainer {
        /// File that failed to parse
        path: PathBuf,
        /// Framing problem reported by the parser
        reason: String,
    },

    /// A source or template raster could not be decoded or re-encoded.
    #[error("invalid image for tag {tag}: {reason}")]
    InvalidImage {
        /// Resolution tag being composited
        tag: IconTag,
        /// Codec error
        reason: String,
    },

    /// The composed container could not be serialized.
    #[error("failed to encode icon container: {0}")]
    Encode(String),

    /// Reading or writing a container file failed.
    #[error("{context} {}: {error}", path.display())]
    Io {
        /// Operation that failed
        context: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: std::io::Error,
    },
}

/// Framing error from [`decode`](super::container::decode), before a file
/// path is attached to it.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct DecodeError(pub String);
