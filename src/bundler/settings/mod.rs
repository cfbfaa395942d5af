//! Configuration structures for disk image creation.
//!
//! [`Settings`] holds everything one run needs and is built with
//! [`SettingsBuilder`]; the macOS-specific parts live in [`DmgSettings`],
//! [`SigningSettings`] and [`VolumeIconSettings`].

mod builder;
mod core;
mod macos;

pub use builder::SettingsBuilder;
pub use core::Settings;
pub use macos::{DmgFormat, DmgSettings, SigningSettings, VolumeIconSettings};
