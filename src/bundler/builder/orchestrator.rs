//! Disk image build orchestration.
//!
//! [`DmgBuilder`] runs the whole pipeline for one application bundle and
//! reports the finished image as a [`DmgArtifact`].

use crate::{
    bundler::{
        Error, Result, Settings,
        error::ErrorExt,
        platform::macos::dmg::{self, DmgLayout},
        resources::icons::{ProbedCapability, VolumeIcon, VolumeIconComposer},
        utils::fs,
    },
    metadata::AppInfo,
};
use std::path::{Path, PathBuf};

use super::{checksum::calculate_sha256, signing::sign_dmg};

/// A finished disk image.
#[derive(Debug, Clone)]
pub struct DmgArtifact {
    /// Path of the image
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256
    pub checksum: String,
    /// Signing authority, when the image was signed
    pub signed_by: Option<String>,
    /// Whether the volume icon was composed from the app icon
    pub composed_icon: bool,
}

/// Builds a disk image for one application bundle.
///
/// # Examples
///
/// ```no_run
/// use create_dmg::bundler::{DmgBuilder, SettingsBuilder};
///
/// # async fn example() -> create_dmg::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_path("build/Lungo.app")
///     .out_directory(".")
///     .build()?;
///
/// let artifact = DmgBuilder::new(settings).build().await?;
/// println!("Created: {} ({} bytes)", artifact.path.display(), artifact.size);
/// println!("SHA256: {}", artifact.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DmgBuilder {
    settings: Settings,
}

impl DmgBuilder {
    /// Creates a builder for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Volume title: the explicit title, else the bundle name.
    pub fn title(&self, info: &AppInfo) -> String {
        self.settings
            .dmg_title()
            .map(str::to_string)
            .unwrap_or_else(|| info.name.clone())
    }

    /// Path the image will be written to.
    ///
    /// # Errors
    ///
    /// [`Error::TargetExists`] when the file exists and overwriting is off.
    pub fn resolve_target(&self, info: &AppInfo) -> Result<PathBuf> {
        let file_name = self
            .settings
            .dmg_file_name(&self.title(info), info.version.as_deref());
        let target = self.settings.out_directory().join(file_name);

        if target.exists() && !self.settings.overwrite() {
            return Err(Error::TargetExists(target));
        }
        Ok(target)
    }

    /// Produces the volume icon for `info`.
    ///
    /// Composition is skipped when disabled, when the bundle has no icon, or
    /// when the probe finds it cannot run; the template is used instead.
    pub async fn volume_icon(&self, info: &AppInfo, work_dir: &Path) -> Result<VolumeIcon> {
        let icon_settings = self.settings.volume_icon();
        let template = &icon_settings.template;

        let Some(app_icon) = info.icon.as_deref() else {
            log::info!("{} has no icon, using the default volume icon", info.name);
            return Ok(VolumeIcon::Default(template.clone()));
        };

        let capability = if icon_settings.compose {
            ProbedCapability::probe(template)
        } else {
            ProbedCapability::disabled()
        };

        let composer = VolumeIconComposer::new(capability, template).with_temp_dir(work_dir);
        Ok(composer.produce_icon(app_icon).await?)
    }

    /// Runs the full pipeline.
    ///
    /// # Process
    /// 1. Load the bundle manifest and resolve the target path
    /// 2. Produce the volume icon
    /// 3. Stage, create, customize and convert the image
    /// 4. Embed the license agreement, if configured
    /// 5. Sign, if enabled
    /// 6. Measure and checksum the result
    ///
    /// # Errors
    ///
    /// [`Error::Signing`] is returned after the image has been written;
    /// every other error leaves the output directory as it was, including
    /// an image being replaced with `--overwrite`.
    pub async fn build(&self) -> Result<DmgArtifact> {
        let info = AppInfo::load(self.settings.app_path())?;
        let title = self.title(&info);
        log::info!("Creating DMG for {}", title);

        let target = self.resolve_target(&info)?;
        fs::create_dir_all(self.settings.out_directory(), false).await?;

        let work_dir = tempfile::Builder::new()
            .prefix("create-dmg-")
            .tempdir()
            .fs_context("creating temporary directory", std::env::temp_dir())?;

        let volume_icon = self.volume_icon(&info, work_dir.path()).await?;
        let icon_path = Some(volume_icon.path()).filter(|path| path.is_file());
        if icon_path.is_none() {
            log::warn!(
                "Volume icon {} not found, the volume will use the system icon",
                volume_icon.path().display()
            );
        }

        let dmg_settings = self.settings.dmg();
        let layout = DmgLayout::drag_to_install(
            title,
            &info.path,
            icon_path.map(Path::to_path_buf),
            dmg_settings,
        );
        log::debug!(
            "Disk image layout: {}",
            layout.to_json().unwrap_or_default()
        );

        // An existing image is only replaced once the new one is complete.
        let partial = partial_path(&target);
        if let Err(e) = dmg::build_image(
            &layout,
            icon_path,
            dmg_settings.sla.as_deref(),
            &partial,
            work_dir.path(),
        )
        .await
        {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&partial, &target)
            .await
            .fs_context("moving disk image into place", &target)
        {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        log::info!("✓ Created {}", target.display());

        let signed_by = if self.settings.signing().enabled {
            Some(sign_dmg(&target, self.settings.signing()).await?)
        } else {
            log::info!("Skipping code signing");
            None
        };

        let size = tokio::fs::metadata(&target)
            .await
            .fs_context("reading artifact metadata", &target)?
            .len();
        let checksum = calculate_sha256(&target).await?;

        Ok(DmgArtifact {
            path: target,
            size,
            checksum,
            signed_by,
            composed_icon: volume_icon.is_composed(),
        })
    }
}

/// Hidden sibling of `target` the image is built at.
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;
    use crate::bundler::VolumeIconSettings;

    fn info(version: Option<&str>) -> AppInfo {
        AppInfo {
            path: PathBuf::from("/build/Fixture.app"),
            name: "Fixture".into(),
            version: version.map(str::to_string),
            icon: None,
        }
    }

    fn builder(out: &Path, configure: impl FnOnce(SettingsBuilder) -> SettingsBuilder) -> DmgBuilder {
        let settings = configure(SettingsBuilder::new().app_path("/build/Fixture.app").out_directory(out))
            .build()
            .unwrap();
        DmgBuilder::new(settings)
    }

    #[test]
    fn target_includes_version_by_default() {
        let out = tempfile::tempdir().unwrap();
        let target = builder(out.path(), |b| b).resolve_target(&info(Some("0.0.1"))).unwrap();
        assert_eq!(target, out.path().join("Fixture 0.0.1.dmg"));
    }

    #[test]
    fn target_honours_title_and_version_flag() {
        let out = tempfile::tempdir().unwrap();
        let dmg = builder(out.path(), |b| {
            b.dmg_title(Some("Fixture Installer".into()))
                .no_version_in_filename(true)
        });
        assert_eq!(
            dmg.resolve_target(&info(Some("0.0.1"))).unwrap(),
            out.path().join("Fixture Installer.dmg")
        );
    }

    #[test]
    fn unknown_version_is_left_out() {
        let out = tempfile::tempdir().unwrap();
        let target = builder(out.path(), |b| b).resolve_target(&info(None)).unwrap();
        assert_eq!(target, out.path().join("Fixture.dmg"));
    }

    #[test]
    fn existing_target_requires_overwrite() {
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("Fixture 0.0.1.dmg"), b"old").unwrap();

        let err = builder(out.path(), |b| b)
            .resolve_target(&info(Some("0.0.1")))
            .unwrap_err();
        assert!(matches!(err, Error::TargetExists(_)));
        assert!(err.to_string().contains("--overwrite"));

        assert!(
            builder(out.path(), |b| b.overwrite(true))
                .resolve_target(&info(Some("0.0.1")))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn app_without_icon_uses_template() {
        let out = tempfile::tempdir().unwrap();
        let template = out.path().join("disk.icns");
        let dmg = builder(out.path(), |b| {
            b.volume_icon_settings(VolumeIconSettings {
                template: template.clone(),
                compose: true,
            })
        });

        let icon = dmg.volume_icon(&info(Some("1.0")), out.path()).await.unwrap();
        assert!(!icon.is_composed());
        assert_eq!(icon.path(), template);
    }

    #[tokio::test]
    async fn disabled_composition_uses_template() {
        let out = tempfile::tempdir().unwrap();
        let template = out.path().join("disk.icns");
        let app_icon = out.path().join("app.icns");
        std::fs::write(&template, b"not read").unwrap();
        std::fs::write(&app_icon, b"not read").unwrap();

        let dmg = builder(out.path(), |b| {
            b.volume_icon_settings(VolumeIconSettings {
                template: template.clone(),
                compose: false,
            })
        });
        let mut app = info(Some("1.0"));
        app.icon = Some(app_icon);

        let icon = dmg.volume_icon(&app, out.path()).await.unwrap();
        assert!(!icon.is_composed());
        assert_eq!(icon.path(), template);
    }

    #[test]
    fn partial_image_is_a_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("/out/Fixture 1.0.dmg")),
            PathBuf::from("/out/.Fixture 1.0.dmg")
        );
    }

    #[tokio::test]
    async fn failed_build_keeps_the_image_being_replaced() {
        let scratch = tempfile::tempdir().unwrap();
        let app = scratch.path().join("Fixture.app");
        std::fs::create_dir_all(app.join("Contents")).unwrap();
        std::fs::write(
            app.join("Contents/Info.plist"),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict>
<key>CFBundleName</key><string>Fixture</string>
<key>CFBundleShortVersionString</key><string>1.0</string>
</dict></plist>"#,
        )
        .unwrap();
        let out = scratch.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let existing = out.join("Fixture 1.0.dmg");
        std::fs::write(&existing, b"old image").unwrap();

        // Staging fails on the missing background, before any tool runs.
        let settings = SettingsBuilder::new()
            .app_path(&app)
            .out_directory(&out)
            .overwrite(true)
            .dmg_settings(crate::bundler::DmgSettings {
                background: Some(scratch.path().join("missing.png")),
                ..Default::default()
            })
            .signing_settings(crate::bundler::SigningSettings {
                enabled: false,
                identity: None,
            })
            .build()
            .unwrap();

        assert!(DmgBuilder::new(settings).build().await.is_err());
        assert_eq!(std::fs::read(&existing).unwrap(), b"old image");
        assert!(!partial_path(&existing).exists());
    }
}
