//! Platform-specific image builders.

pub mod macos;
