//! Command line argument parsing and validation.

use crate::bundler::{
    DmgFormat, DmgSettings, Settings, SettingsBuilder, SigningSettings, VolumeIconSettings,
    resources::icons::SYSTEM_DRIVE_ICON,
};
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Resource script picked up from the working directory when `--sla` is absent.
pub const DEFAULT_SLA_FILE: &str = "sla.r";

/// Create a good-looking DMG for your macOS app in seconds
#[derive(Parser, Debug)]
#[command(
    name = "create-dmg",
    version,
    about = "Create a good-looking DMG for your macOS app in seconds",
    long_about = "Creates a drag-to-install disk image for a macOS .app bundle.

The volume gets a custom icon made from the app icon, the app is placed next to
a link to /Applications, and the image is code signed with a Developer ID.

Examples:
  create-dmg 'Lungo.app'
  create-dmg 'Lungo.app' Build/Releases/

Exit code 0 = image created and signed, 2 = image created but not signed."
)]
pub struct Args {
    /// Application bundle to package
    #[arg(value_name = "APP")]
    pub app: PathBuf,

    /// Directory to write the image to
    #[arg(value_name = "DESTINATION", default_value = ".")]
    pub destination: PathBuf,

    /// Replace an existing image with the same name
    #[arg(long)]
    pub overwrite: bool,

    /// Volume title and file name stem (defaults to the app name)
    #[arg(long, value_name = "TITLE")]
    pub dmg_title: Option<String>,

    /// Leave the app version out of the file name
    #[arg(long)]
    pub no_version_in_filename: bool,

    /// Code signing identity (defaults to the first Developer ID Application identity)
    #[arg(long, value_name = "IDENTITY", env = "CREATE_DMG_IDENTITY")]
    pub identity: Option<String>,

    /// Do not code sign the image (overrides --identity)
    #[arg(long)]
    pub no_code_sign: bool,

    /// Image format: UDZO, UDBZ, ULFO, ULMO, UDRO, UDCO
    #[arg(long, value_name = "FORMAT", default_value_t = DmgFormat::Ulfo)]
    pub format: DmgFormat,

    /// Background picture for the Finder window (PNG, 660x400)
    #[arg(long, value_name = "PNG")]
    pub background: Option<PathBuf>,

    /// License agreement resource script (defaults to ./sla.r when present)
    #[arg(long, value_name = "FILE")]
    pub sla: Option<PathBuf>,

    /// Drive icon the app icon is composed onto
    #[arg(
        long,
        value_name = "ICNS",
        env = "CREATE_DMG_VOLUME_ICON_TEMPLATE",
        default_value = SYSTEM_DRIVE_ICON
    )]
    pub volume_icon_template: PathBuf,

    /// Use the template volume icon without composing the app icon onto it
    #[arg(long)]
    pub no_icon_composition: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.app.as_os_str().is_empty() {
            return Err("Specify an app".to_string());
        }

        if self.destination.exists() && !self.destination.is_dir() {
            return Err(format!(
                "Destination is not a directory: {}",
                self.destination.display()
            ));
        }

        if let Some(title) = &self.dmg_title {
            if title.trim().is_empty() {
                return Err("DMG title cannot be empty".to_string());
            }
        }

        if let Some(identity) = &self.identity {
            if identity.trim().is_empty() {
                return Err("Signing identity cannot be empty".to_string());
            }
        }

        if let Some(background) = &self.background {
            if !background.is_file() {
                return Err(format!("Background image not found: {}", background.display()));
            }
        }

        if let Some(sla) = &self.sla {
            if !sla.is_file() {
                return Err(format!("License file not found: {}", sla.display()));
            }
        }

        Ok(())
    }

    /// License script to embed: `--sla`, else `sla.r` in `cwd` when present.
    pub fn sla_file(&self, cwd: &Path) -> Option<PathBuf> {
        self.sla.clone().or_else(|| {
            let default = cwd.join(DEFAULT_SLA_FILE);
            default.is_file().then_some(default)
        })
    }

    /// Folds the arguments into bundler [`Settings`], resolving relative paths
    /// against the working directory.
    pub fn to_settings(&self) -> crate::error::Result<Settings> {
        let cwd = std::env::current_dir()?;

        let dmg = DmgSettings {
            format: self.format,
            background: self.background.as_deref().map(absolute).transpose()?,
            sla: self.sla_file(&cwd).as_deref().map(absolute).transpose()?,
            ..Default::default()
        };

        let signing = SigningSettings {
            enabled: !self.no_code_sign,
            identity: self.identity.clone(),
        };

        let volume_icon = VolumeIconSettings {
            template: absolute(&self.volume_icon_template)?,
            compose: !self.no_icon_composition,
        };

        Ok(SettingsBuilder::new()
            .app_path(absolute(&self.app)?)
            .out_directory(absolute(&self.destination)?)
            .overwrite(self.overwrite)
            .dmg_title(self.dmg_title.clone())
            .no_version_in_filename(self.no_version_in_filename)
            .dmg_settings(dmg)
            .signing_settings(signing)
            .volume_icon_settings(volume_icon)
            .build()?)
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    Ok(path.absolutize()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("create-dmg").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&["Lungo.app"]);
        assert_eq!(args.app, PathBuf::from("Lungo.app"));
        assert_eq!(args.destination, PathBuf::from("."));
        assert_eq!(args.format, DmgFormat::Ulfo);
        assert!(!args.overwrite);
        assert!(!args.no_code_sign);
        assert!(!args.no_icon_composition);
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "Lungo.app",
            "Build/Releases",
            "--overwrite",
            "--dmg-title",
            "Lungo Installer",
            "--no-version-in-filename",
            "--format",
            "udzo",
            "--no-code-sign",
            "--no-icon-composition",
        ]);
        assert_eq!(args.destination, PathBuf::from("Build/Releases"));
        assert!(args.overwrite);
        assert_eq!(args.dmg_title.as_deref(), Some("Lungo Installer"));
        assert!(args.no_version_in_filename);
        assert_eq!(args.format, DmgFormat::Udzo);
        assert!(args.no_code_sign);
        assert!(args.no_icon_composition);
    }

    #[test]
    fn no_code_sign_overrides_identity() {
        let args = parse(&[
            "Lungo.app",
            "--identity",
            "Developer ID Application: Jane",
            "--no-code-sign",
        ]);
        let settings = args.to_settings().unwrap();
        assert!(!settings.signing().enabled);
        assert_eq!(
            settings.signing().identity.as_deref(),
            Some("Developer ID Application: Jane")
        );
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["create-dmg", "Lungo.app", "--format", "zip"]).is_err());
    }

    #[test]
    fn validate_checks_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = parse(&["Lungo.app"]);
        args.background = Some(dir.path().join("missing.png"));
        assert!(args.validate().unwrap_err().contains("Background image not found"));

        args.background = None;
        args.destination = dir.path().join("file");
        std::fs::write(&args.destination, b"x").unwrap();
        assert!(args.validate().unwrap_err().contains("not a directory"));
    }

    #[test]
    fn sla_defaults_to_working_directory_script() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&["Lungo.app"]);
        assert!(args.sla_file(dir.path()).is_none());

        std::fs::write(dir.path().join(DEFAULT_SLA_FILE), b"data 'LPic'").unwrap();
        assert_eq!(args.sla_file(dir.path()), Some(dir.path().join(DEFAULT_SLA_FILE)));
    }

    #[test]
    fn settings_use_absolute_paths() {
        let args = parse(&["Lungo.app", "out", "--no-code-sign"]);
        let settings = args.to_settings().unwrap();
        assert!(settings.app_path().is_absolute());
        assert!(settings.out_directory().ends_with("out"));
        assert!(!settings.signing().enabled);
        assert!(settings.volume_icon().compose);
    }
}
