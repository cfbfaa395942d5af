//! DMG format conversion.
//!
//! Customization needs a read-write image, but distribution wants a
//! compressed read-only one. The workflow is UDRW, customize, detach, then
//! convert to the requested format at the final path.

use crate::bundler::{error::Result, settings::DmgFormat, utils::command};
use std::ffi::OsStr;
use std::path::Path;

/// Converts `source` into `format` at `target`, replacing `target` if present.
pub async fn convert(source: &Path, format: DmgFormat, target: &Path) -> Result<()> {
    log::info!("Converting disk image to {}...", format);

    command::run("hdiutil", convert_args(source, format, target)).await?;

    log::info!("✓ Disk image converted to {}", format);
    Ok(())
}

/// Arguments for `hdiutil convert`; zlib images get maximum compression.
pub(super) fn convert_args<'a>(source: &'a Path, format: DmgFormat, target: &'a Path) -> Vec<&'a OsStr> {
    let mut args = vec![
        OsStr::new("convert"),
        source.as_os_str(),
        OsStr::new("-format"),
        OsStr::new(format.as_str()),
    ];
    if format == DmgFormat::Udzo {
        args.extend([OsStr::new("-imagekey"), OsStr::new("zlib-level=9")]);
    }
    args.extend([OsStr::new("-ov"), OsStr::new("-o"), target.as_os_str()]);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<&OsStr>) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn lzfse_has_no_image_key() {
        let args = convert_args(Path::new("rw.dmg"), DmgFormat::Ulfo, Path::new("Lungo 1.0.dmg"));
        assert_eq!(
            strings(args),
            ["convert", "rw.dmg", "-format", "ULFO", "-ov", "-o", "Lungo 1.0.dmg"]
        );
    }

    #[test]
    fn zlib_uses_maximum_level() {
        let args = convert_args(Path::new("rw.dmg"), DmgFormat::Udzo, Path::new("out.dmg"));
        let args = strings(args);
        assert!(args.windows(2).any(|w| w == ["-imagekey", "zlib-level=9"]));
    }
}
