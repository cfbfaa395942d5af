//! Staging of the volume contents and read-write image creation.
//!
//! The staging directory mirrors the root of the final volume:
//! - `<App>.app` copy of the application bundle
//! - `Applications` symlink for drag-to-install
//! - `.VolumeIcon.icns` custom volume icon
//! - `.background/<file>` Finder background picture, if any

use super::layout::{BACKGROUND_DIR, ContentKind, DmgLayout};
use crate::bundler::{
    error::{Context, Result},
    utils::{command, fs},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Name of the custom volume icon file at the root of a volume.
pub const VOLUME_ICON_NAME: &str = ".VolumeIcon.icns";

/// Populates `staging` with everything `layout` and `volume_icon` need.
pub async fn stage_contents(
    layout: &DmgLayout,
    volume_icon: Option<&Path>,
    staging: &Path,
) -> Result<()> {
    fs::create_dir_all(staging, false).await?;

    for item in &layout.contents {
        let dest = staging.join(item.name());
        match item.kind {
            ContentKind::File if item.path.is_dir() => {
                log::debug!("Copying {} to staging", item.path.display());
                fs::copy_dir(&item.path, &dest).await.with_context(|| {
                    format!("copying {} to staging directory", item.path.display())
                })?;
            }
            ContentKind::File => fs::copy_file(&item.path, &dest).await?,
            ContentKind::Link => fs::symlink(&item.path, &dest).await?,
        }
    }

    if let Some(icon) = volume_icon {
        fs::copy_file(icon, &staging.join(VOLUME_ICON_NAME)).await?;
    }

    if let (Some(background), Some(name)) = (&layout.background, layout.background_name()) {
        fs::copy_file(background, &staging.join(BACKGROUND_DIR).join(name)).await?;
    }

    log::debug!("Staged volume contents in {}", staging.display());
    Ok(())
}

/// Creates a read-write (UDRW) image of `staging` at `image`.
///
/// Finder layout changes only persist on a writable image, so the final
/// format is produced later by conversion.
pub async fn create_rw_image(volume_name: &str, staging: &Path, image: &Path) -> Result<PathBuf> {
    log::info!("Creating read-write disk image...");

    let args: [&OsStr; 11] = [
        OsStr::new("create"),
        OsStr::new("-volname"),
        OsStr::new(volume_name),
        OsStr::new("-srcfolder"),
        staging.as_os_str(),
        OsStr::new("-fs"),
        OsStr::new("HFS+"),
        OsStr::new("-format"),
        OsStr::new("UDRW"),
        OsStr::new("-ov"),
        image.as_os_str(),
    ];
    command::run("hdiutil", args).await?;

    log::info!("✓ Created UDRW image: {}", image.display());
    Ok(image.to_path_buf())
}
