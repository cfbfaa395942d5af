//! Create a good-looking DMG for your macOS app.
//!
//! This library packages a `.app` bundle into a drag-to-install disk image
//! with a volume icon composed from the app icon, a Finder layout, an
//! optional license agreement and a code signature.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
