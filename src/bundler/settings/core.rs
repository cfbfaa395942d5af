//! Core Settings struct and implementations.

use super::{DmgSettings, SigningSettings, VolumeIconSettings};
use std::path::{Path, PathBuf};

/// Main settings for one `create-dmg` run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use create_dmg::bundler::SettingsBuilder;
///
/// # fn example() -> create_dmg::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_path("build/Lungo.app")
///     .out_directory("dist")
///     .overwrite(true)
///     .build()?;
/// assert!(settings.signing().enabled);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Application bundle to package.
    app_path: PathBuf,

    /// Directory the image is written to.
    out_directory: PathBuf,

    /// Replace an existing image with the same name.
    overwrite: bool,

    /// Volume name and file name stem; defaults to the bundle name.
    dmg_title: Option<String>,

    /// Append the bundle version to the file name.
    version_in_filename: bool,

    dmg: DmgSettings,
    signing: SigningSettings,
    volume_icon: VolumeIconSettings,
}

impl Settings {
    /// Returns the application bundle path.
    pub fn app_path(&self) -> &Path {
        &self.app_path
    }

    /// Returns the output directory.
    pub fn out_directory(&self) -> &Path {
        &self.out_directory
    }

    /// Returns whether an existing image may be replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Returns the explicit image title, if any.
    pub fn dmg_title(&self) -> Option<&str> {
        self.dmg_title.as_deref()
    }

    /// Returns whether the version goes into the file name.
    pub fn version_in_filename(&self) -> bool {
        self.version_in_filename
    }

    /// Returns the disk image settings.
    pub fn dmg(&self) -> &DmgSettings {
        &self.dmg
    }

    /// Returns the signing settings.
    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    /// Returns the volume icon settings.
    pub fn volume_icon(&self) -> &VolumeIconSettings {
        &self.volume_icon
    }

    /// File name of the image for a bundle called `title` at `version`.
    ///
    /// `"{title} {version}.dmg"`, or `"{title}.dmg"` when the version is
    /// disabled or unknown.
    pub fn dmg_file_name(&self, title: &str, version: Option<&str>) -> String {
        match version {
            Some(version) if self.version_in_filename => format!("{title} {version}.dmg"),
            _ => format!("{title}.dmg"),
        }
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        app_path: PathBuf,
        out_directory: PathBuf,
        overwrite: bool,
        dmg_title: Option<String>,
        version_in_filename: bool,
        dmg: DmgSettings,
        signing: SigningSettings,
        volume_icon: VolumeIconSettings,
    ) -> Self {
        Self {
            app_path,
            out_directory,
            overwrite,
            dmg_title,
            version_in_filename,
            dmg,
            signing,
            volume_icon,
        }
    }
}
