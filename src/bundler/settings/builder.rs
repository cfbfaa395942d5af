//! Builder for constructing Settings.

use super::{DmgSettings, Settings, SigningSettings, VolumeIconSettings};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use create_dmg::bundler::{DmgFormat, DmgSettings, SettingsBuilder};
///
/// # fn example() -> create_dmg::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_path("build/Lungo.app")
///     .out_directory("dist")
///     .dmg_settings(DmgSettings {
///         format: DmgFormat::Udzo,
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    app_path: Option<PathBuf>,
    out_directory: Option<PathBuf>,
    overwrite: bool,
    dmg_title: Option<String>,
    no_version_in_filename: bool,
    dmg: DmgSettings,
    signing: SigningSettings,
    volume_icon: VolumeIconSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application bundle to package.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn app_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.app_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory the image is written to.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn out_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Allows replacing an existing image.
    ///
    /// Default: false
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the volume and file name title.
    ///
    /// Default: None (bundle name)
    pub fn dmg_title(mut self, title: Option<String>) -> Self {
        self.dmg_title = title;
        self
    }

    /// Leaves the version out of the file name.
    ///
    /// Default: false
    pub fn no_version_in_filename(mut self, flag: bool) -> Self {
        self.no_version_in_filename = flag;
        self
    }

    /// Sets disk image configuration.
    ///
    /// Default: [`DmgSettings::default`]
    pub fn dmg_settings(mut self, settings: DmgSettings) -> Self {
        self.dmg = settings;
        self
    }

    /// Sets code signing configuration.
    ///
    /// Default: signing enabled, identity discovered
    pub fn signing_settings(mut self, settings: SigningSettings) -> Self {
        self.signing = settings;
        self
    }

    /// Sets volume icon configuration.
    ///
    /// Default: compose onto the system removable-drive icon
    pub fn volume_icon_settings(mut self, settings: VolumeIconSettings) -> Self {
        self.volume_icon = settings;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing:
    /// - `app_path`
    /// - `out_directory`
    ///
    /// or if the title is empty or contains a `/`, or the window is
    /// too small for the configured icon size.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let app_path = self.app_path.context("app_path is required")?;
        let out_directory = self.out_directory.context("out_directory is required")?;

        if let Some(title) = &self.dmg_title {
            if title.trim().is_empty() {
                crate::bail!("DMG title must not be empty");
            }
            if title.contains('/') {
                crate::bail!("DMG title must not contain '/': {}", title);
            }
        }

        let (width, height) = self.dmg.window_size;
        if self.dmg.icon_size == 0 || width < self.dmg.icon_size || height < self.dmg.icon_size {
            crate::bail!(
                "Icon size {} does not fit a {}x{} window",
                self.dmg.icon_size,
                width,
                height
            );
        }

        Ok(Settings::new(
            app_path,
            out_directory,
            self.overwrite,
            self.dmg_title,
            !self.no_version_in_filename,
            self.dmg,
            self.signing,
            self.volume_icon,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_app_and_output() {
        let err = SettingsBuilder::new().out_directory("dist").build().unwrap_err();
        assert_eq!(err.to_string(), "app_path is required");

        let err = SettingsBuilder::new().app_path("A.app").build().unwrap_err();
        assert_eq!(err.to_string(), "out_directory is required");
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let settings = SettingsBuilder::new()
            .app_path("A.app")
            .out_directory(".")
            .build()
            .unwrap();

        assert!(!settings.overwrite());
        assert!(settings.version_in_filename());
        assert!(settings.signing().enabled);
        assert!(settings.volume_icon().compose);
        assert_eq!(settings.dmg().window_size, (660, 400));
        assert_eq!(settings.dmg().icon_size, 160);
        assert_eq!(settings.dmg_file_name("Fixture", Some("0.0.1")), "Fixture 0.0.1.dmg");
    }

    #[test]
    fn file_name_without_version() {
        let settings = SettingsBuilder::new()
            .app_path("A.app")
            .out_directory(".")
            .no_version_in_filename(true)
            .build()
            .unwrap();
        assert_eq!(settings.dmg_file_name("Fixture", Some("0.0.1")), "Fixture.dmg");
    }

    #[test]
    fn rejects_bad_titles_and_layouts() {
        let base = || SettingsBuilder::new().app_path("A.app").out_directory(".");

        assert!(base().dmg_title(Some("  ".into())).build().is_err());
        assert!(base().dmg_title(Some("a/b".into())).build().is_err());
        assert!(
            base()
                .dmg_settings(DmgSettings {
                    icon_size: 500,
                    ..Default::default()
                })
                .build()
                .is_err()
        );
    }
}
