//! Error type for disk image bundling.
//!
//! Besides [`Error`] this module provides two extension traits used across the
//! bundler: [`ErrorExt::fs_context`] attaches an operation and a path to I/O
//! failures, and [`Context`] turns any displayable error (or a `None`) into a
//! [`Error::GenericError`] with a message prefix.

use crate::bundler::resources::icons::IconError;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building a disk image.
#[derive(Error, Debug)]
pub enum Error {
    /// Free-form failure
    #[error("{0}")]
    GenericError(String),

    /// Filesystem operation failed on a known path
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// Operation that failed
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: io::Error,
    },

    /// Info.plist could not be read or parsed
    #[error("failed to read bundle manifest {}: {error}", path.display())]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// Parser error
        #[source]
        error: plist::Error,
    },

    /// Volume icon pipeline failed
    #[error("volume icon: {0}")]
    Icon(#[from] IconError),

    /// An external tool exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// The target disk image already exists and overwriting was not requested
    #[error("Target already exists: {}. Use --overwrite to replace it", .0.display())]
    TargetExists(PathBuf),

    /// Code signing failed after the image was created
    #[error("Code signing failed. The DMG is fine, just not code signed.\n{0}")]
    Signing(String),
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Adds a message prefix to errors and missing values.
pub trait Context<T> {
    /// Prefixes the error with `context`.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Prefixes the error with a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
