//! Build orchestration and coordination.
//!
//! The [`DmgBuilder`] orchestrator:
//! 1. Reads configuration from [`Settings`](crate::bundler::Settings)
//! 2. Loads the bundle manifest and produces the volume icon
//! 3. Delegates image creation to the platform module
//! 4. Signs and checksums the result
//! 5. Returns a [`DmgArtifact`]
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`DmgBuilder`] struct
//! - [`signing`] - Identity discovery and `codesign`
//! - [`tool_detection`] - External tool availability checking

pub mod checksum;
mod orchestrator;
pub mod signing;
pub mod tool_detection;

pub use orchestrator::{DmgArtifact, DmgBuilder};
