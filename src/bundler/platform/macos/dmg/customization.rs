//! Volume customization on the mounted read-write image.
//!
//! Handles:
//! - Attaching the image and locating its mount point
//! - Flagging the volume as having a custom icon
//! - Running the Finder layout script
//! - Detaching the image so it can be converted

use super::layout::DmgLayout;
use crate::bundler::{
    builder::tool_detection::SETFILE,
    error::{Error, Result},
    utils::command,
};
use std::ffi::OsStr;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

const DETACH_ATTEMPTS: u32 = 3;

/// A mounted image, detached explicitly with [`detach`].
#[derive(Debug)]
pub struct MountedImage {
    pub mount_point: PathBuf,
}

impl MountedImage {
    /// Volume name as Finder addresses it.
    pub fn volume_name(&self) -> String {
        self.mount_point
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Applies the custom icon flag and the Finder layout to `image`.
pub async fn customize(image: &Path, layout: &DmgLayout) -> Result<()> {
    log::info!("Applying volume customizations...");

    let mounted = attach(image).await?;
    let result = apply(&mounted, layout).await;
    let detached = detach(&mounted).await;

    result?;
    detached?;

    log::info!("✓ Volume customizations applied");
    Ok(())
}

async fn apply(mounted: &MountedImage, layout: &DmgLayout) -> Result<()> {
    set_custom_icon_flag(&mounted.mount_point).await?;
    run_layout_script(layout, &mounted.volume_name()).await
}

/// Mounts `image` read-write and returns its mount point.
pub async fn attach(image: &Path) -> Result<MountedImage> {
    log::debug!("Mounting {}", image.display());

    let args: [&OsStr; 6] = [
        OsStr::new("attach"),
        OsStr::new("-readwrite"),
        OsStr::new("-noverify"),
        OsStr::new("-noautoopen"),
        OsStr::new("-plist"),
        image.as_os_str(),
    ];
    let output = command::run("hdiutil", args).await?;

    let mount_point = parse_mount_point(&output.stdout).ok_or_else(|| {
        Error::GenericError(format!("No mount point reported for {}", image.display()))
    })?;
    log::debug!("Mounted at {}", mount_point.display());

    Ok(MountedImage { mount_point })
}

/// Extracts the first `mount-point` from `hdiutil attach -plist` output.
pub fn parse_mount_point(stdout: &[u8]) -> Option<PathBuf> {
    let value = plist::Value::from_reader(Cursor::new(stdout)).ok()?;
    value
        .as_dictionary()?
        .get("system-entities")?
        .as_array()?
        .iter()
        .filter_map(|entity| entity.as_dictionary()?.get("mount-point")?.as_string())
        .map(PathBuf::from)
        .next()
}

/// Sets the "has custom icon" attribute so Finder shows `.VolumeIcon.icns`.
async fn set_custom_icon_flag(mount_point: &Path) -> Result<()> {
    let Some(setfile) = SETFILE.as_ref() else {
        log::warn!("SetFile not found; the volume will show the default icon. Install the Xcode command line tools to fix this");
        return Ok(());
    };

    let program = setfile.to_string_lossy();
    command::run(&program, [OsStr::new("-a"), OsStr::new("C"), mount_point.as_os_str()]).await?;
    log::debug!("Flagged {} as having a custom icon", mount_point.display());
    Ok(())
}

async fn run_layout_script(layout: &DmgLayout, volume_name: &str) -> Result<()> {
    log::debug!("Running Finder layout script for {}", volume_name);

    let script = layout.applescript(volume_name);
    let output = command::output("osascript", ["-e", script.as_str()]).await?;

    if !output.status.success() {
        // Layout is cosmetic; the image is still usable.
        log::warn!(
            "Finder layout script failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Unmounts the image, forcing it on the last attempt.
pub async fn detach(mounted: &MountedImage) -> Result<()> {
    log::debug!("Detaching {}", mounted.mount_point.display());

    let mut last_error = None;
    for attempt in 1..=DETACH_ATTEMPTS {
        let mut args = vec![OsStr::new("detach"), mounted.mount_point.as_os_str()];
        if attempt == DETACH_ATTEMPTS {
            args.push(OsStr::new("-force"));
        }

        match command::run("hdiutil", args).await {
            Ok(_) => return Ok(()),
            Err(e) => {
                log::debug!("Detach attempt {} failed: {}", attempt, e);
                last_error = Some(e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::GenericError(format!("Could not detach {}", mounted.mount_point.display()))
    }))
}
