//! Application bundle metadata from `Contents/Info.plist`.

use crate::bundler::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Keys of `Info.plist` the disk image needs.
#[derive(Debug, Default, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleDisplayName")]
    display_name: Option<String>,
    #[serde(rename = "CFBundleName")]
    name: Option<String>,
    #[serde(rename = "CFBundleShortVersionString")]
    short_version: Option<String>,
    #[serde(rename = "CFBundleVersion")]
    version: Option<String>,
    #[serde(rename = "CFBundleIconFile")]
    icon_file: Option<String>,
}

/// What the disk image needs to know about an application bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppInfo {
    /// Path of the `.app` bundle
    pub path: PathBuf,

    /// Display name, used as the default volume title
    pub name: String,

    /// Marketing version, if the bundle declares one
    pub version: Option<String>,

    /// Icon container under `Contents/Resources`, if present on disk
    pub icon: Option<PathBuf>,
}

impl AppInfo {
    /// Reads the manifest of the bundle at `app`.
    ///
    /// Both XML and binary property lists are accepted.
    ///
    /// # Errors
    ///
    /// `Could not find "<app>"` when the bundle or its manifest is missing,
    /// [`Error::Manifest`] when the manifest is not a valid property list.
    pub fn load(app: &Path) -> Result<Self> {
        let manifest = app.join("Contents/Info.plist");
        if !manifest.is_file() {
            return Err(Error::GenericError(format!(
                "Could not find \"{}\"",
                display_relative(app).display()
            )));
        }

        let info: InfoPlist = plist::from_file(&manifest).map_err(|error| Error::Manifest {
            path: manifest.clone(),
            error,
        })?;

        let name = non_empty(info.display_name)
            .or_else(|| non_empty(info.name))
            .or_else(|| {
                app.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .ok_or_else(|| {
                Error::GenericError(format!("Cannot determine a name for {}", app.display()))
            })?;

        let version = non_empty(info.short_version).or_else(|| non_empty(info.version));
        let icon = non_empty(info.icon_file).and_then(|file| resolve_icon(app, &file));

        log::debug!(
            "Loaded {} version {} (icon: {})",
            name,
            version.as_deref().unwrap_or("unknown"),
            icon.as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".into())
        );

        Ok(Self {
            path: app.to_path_buf(),
            name,
            version,
            icon,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `CFBundleIconFile` may omit the `.icns` extension.
fn resolve_icon(app: &Path, file: &str) -> Option<PathBuf> {
    let mut path = app.join("Contents/Resources").join(file);
    if path.extension().is_none() {
        path.set_extension("icns");
    }

    if path.is_file() {
        Some(path)
    } else {
        log::warn!("App icon {} not found, using the default volume icon", path.display());
        None
    }
}

fn display_relative(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}
