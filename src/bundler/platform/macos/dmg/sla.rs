//! Software license agreement embedding.
//!
//! The license lives in the resource fork of the image, which can only be
//! edited on an unflattened UDCO image. The finished image is round-tripped
//! through that format and converted back.

use super::conversion;
use crate::bundler::{
    builder::tool_detection::REZ,
    error::{Context, Result},
    settings::DmgFormat,
    utils::command,
};
use std::ffi::OsStr;
use std::path::Path;

/// Embeds the resource script `script` into `dmg`, keeping `format`.
///
/// `work_dir` holds the intermediate image and must outlive the call.
pub async fn embed_license(dmg: &Path, format: DmgFormat, script: &Path, work_dir: &Path) -> Result<()> {
    log::info!("Adding license agreement from {}...", script.display());

    let rez = REZ
        .as_ref()
        .context("Rez not found; install the Xcode command line tools to embed a license")?;
    let intermediate = work_dir.join("sla.dmg");

    conversion::convert(dmg, DmgFormat::Udco, &intermediate).await?;
    command::run("hdiutil", [OsStr::new("unflatten"), intermediate.as_os_str()]).await?;
    command::run(
        &rez.to_string_lossy(),
        [
            OsStr::new("-a"),
            script.as_os_str(),
            OsStr::new("-o"),
            intermediate.as_os_str(),
        ],
    )
    .await?;
    command::run("hdiutil", [OsStr::new("flatten"), intermediate.as_os_str()]).await?;
    conversion::convert(&intermediate, format, dmg).await?;

    log::info!("✓ License agreement embedded");
    Ok(())
}
