//! Disk image bundling.
//!
//! Turns a macOS `.app` bundle into a drag-to-install `.dmg`: a volume with
//! the app, a link to `/Applications`, a custom volume icon composed from the
//! app icon, and a Finder window layout.
//!
//! # Module Organization
//!
//! - [`builder`] - [`DmgBuilder`] orchestration, signing, checksums
//! - [`settings`] - [`Settings`] and [`SettingsBuilder`]
//! - [`resources`] - generated resources (the volume icon)
//! - [`platform`] - `hdiutil` / Finder workflow
//! - [`utils`] - filesystem and process helpers

pub mod builder;
pub mod error;
pub mod platform;
pub mod resources;
pub mod settings;
pub mod utils;

pub use builder::{DmgArtifact, DmgBuilder};
pub use error::{Error, Result};
pub use settings::{
    DmgFormat, DmgSettings, Settings, SettingsBuilder, SigningSettings, VolumeIconSettings,
};
