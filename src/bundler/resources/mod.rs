//! Bundle resources generated during the build.

pub mod icons;
