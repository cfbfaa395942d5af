//! macOS DMG disk image creator.
//!
//! Creates drag-to-install DMG files using the native hdiutil tool.
//!
//! # Architecture
//!
//! - `layout` - Declarative window description and its Finder script
//! - `creation` - Staging and read-write image creation
//! - `customization` - Mount, custom icon flag, Finder layout, detach
//! - `conversion` - Format conversion (UDRW → final format)
//! - `sla` - License agreement embedding

mod conversion;
mod creation;
mod customization;
pub mod layout;
mod sla;

use crate::bundler::error::Result;
use std::path::Path;

pub use conversion::convert;
pub use creation::{VOLUME_ICON_NAME, create_rw_image, stage_contents};
pub use customization::{MountedImage, attach, customize, detach, parse_mount_point};
pub use layout::DmgLayout;
pub use sla::embed_license;

/// Builds the disk image described by `layout` at `target`.
///
/// # Process
/// 1. Stage the app, the `Applications` link, the volume icon and the background
/// 2. Create a UDRW image from the staging directory
/// 3. Mount it, flag the custom icon, apply the Finder layout, detach
/// 4. Convert to the layout's format at `target`
/// 5. Embed the license agreement when `sla` is set
///
/// All intermediate files are created under `work_dir`.
pub async fn build_image(
    layout: &DmgLayout,
    volume_icon: Option<&Path>,
    sla: Option<&Path>,
    target: &Path,
    work_dir: &Path,
) -> Result<()> {
    let staging = work_dir.join("staging");
    stage_contents(layout, volume_icon, &staging).await?;

    let rw_image = create_rw_image(&layout.title, &staging, &work_dir.join("rw.dmg")).await?;
    customize(&rw_image, layout).await?;
    convert(&rw_image, layout.format, target).await?;

    if let Some(script) = sla {
        embed_license(target, layout.format, script, work_dir).await?;
    }

    Ok(())
}
