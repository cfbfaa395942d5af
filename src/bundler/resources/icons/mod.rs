//! Volume icon composition.
//!
//! Builds the custom icon of the disk image volume by drawing the
//! application's icon into the slot of a removable-drive icon, at every
//! resolution both containers share.
//!
//! # Pipeline
//!
//! ```text
//! capability gate ──unavailable──▶ default template path
//!        │
//!    available
//!        ▼
//! decode(app.icns), decode(template.icns)      container
//!        ▼
//! per-tag composite, fan-out / join            reconcile + compositor
//!        ▼
//! encode ──▶ temporary .icns file
//! ```
//!
//! # Module Organization
//!
//! - [`tag`] - resolution tags and record classification
//! - [`container`] - `.icns` decode / encode
//! - [`compositor`] - perspective warp, resize, overlay
//! - [`reconcile`] - per-tag join and biggest-variant synthesis
//! - [`capability`] - runtime availability probe

pub mod capability;
pub mod compositor;
pub mod container;
mod error;
pub mod reconcile;
pub mod tag;

pub use capability::{Capability, ProbedCapability};
pub use container::{IconMap, decode, encode, read_container};
pub use error::{DecodeError, IconError, Result};
pub use reconcile::{ReconcileWarning, Reconciliation, reconcile};
pub use tag::{IconTag, RecordKind};

use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Removable-drive icon shipped with macOS, used as the default template.
pub const SYSTEM_DRIVE_ICON: &str =
    "/System/Library/Extensions/IOStorageFamily.kext/Contents/Resources/Removable.icns";

/// Icon handed to the disk image step.
///
/// A composed icon lives in a temporary file that is removed when this value
/// is dropped, so it must be kept alive until the image has been created.
#[derive(Debug)]
pub enum VolumeIcon {
    /// The template, unmodified.
    Default(PathBuf),
    /// A freshly composed container.
    Composed(NamedTempFile),
}

impl VolumeIcon {
    /// Path of the `.icns` file to use.
    pub fn path(&self) -> &Path {
        match self {
            Self::Default(path) => path,
            Self::Composed(file) => file.path(),
        }
    }

    /// Returns `true` when the icon was composed for this run.
    pub fn is_composed(&self) -> bool {
        matches!(self, Self::Composed(_))
    }
}

/// Produces volume icons from a fixed drive icon template.
#[derive(Debug)]
pub struct VolumeIconComposer<C = ProbedCapability> {
    capability: C,
    template: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl<C: Capability> VolumeIconComposer<C> {
    /// Creates a composer for `template`, gated by `capability`.
    pub fn new(capability: C, template: impl Into<PathBuf>) -> Self {
        Self {
            capability,
            template: template.into(),
            temp_dir: None,
        }
    }

    /// Writes composed containers into `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Path of the drive icon template.
    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Builds the volume icon for the app icon at `app_icon`.
    ///
    /// When the capability is unavailable, returns the template path without
    /// touching either file. Otherwise decodes both containers, reconciles
    /// them and writes the result to a new temporary `.icns` file.
    ///
    /// # Fallback
    ///
    /// An empty container is never written. If no tag could be composed at
    /// all (every app tag unmatched or undecodable), [`VolumeIcon::Default`]
    /// with the template path is returned, exactly as in the unavailable case,
    /// and a warning is logged.
    ///
    /// # Errors
    ///
    /// [`IconError::MalformedContainer`] or [`IconError::Io`] when either
    /// container cannot be read; per-tag problems are only logged.
    pub async fn produce_icon(&self, app_icon: &Path) -> Result<VolumeIcon> {
        if !self.capability.is_available() {
            log::info!("Icon composition unavailable, using the default volume icon");
            return Ok(VolumeIcon::Default(self.template.clone()));
        }

        let (template_icons, app_icons) =
            tokio::try_join!(read_container(&self.template), read_container(app_icon))?;
        log::debug!(
            "Decoded {} app icon and {} template images",
            app_icons.len(),
            template_icons.len()
        );

        let result = reconcile(&app_icons, &template_icons).await;
        if result.icons.is_empty() {
            log::warn!(
                "No icon resolution could be composed from {}, using the default volume icon",
                app_icon.display()
            );
            return Ok(VolumeIcon::Default(self.template.clone()));
        }

        let bytes = encode(&result.icons)?;
        let file = self.create_temp_file()?;
        tokio::fs::write(file.path(), &bytes)
            .await
            .map_err(|error| IconError::Io {
                context: "writing composed icon",
                path: file.path().to_path_buf(),
                error,
            })?;

        log::info!(
            "✓ Composed volume icon ({} resolutions, {} warnings)",
            result.icons.len(),
            result.warnings.len()
        );
        Ok(VolumeIcon::Composed(file))
    }

    fn create_temp_file(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("create-dmg-icon-").suffix(".icns");
        let created = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        created.map_err(|error| IconError::Io {
            context: "creating temporary icon file",
            path: self.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            error,
        })
    }
}
