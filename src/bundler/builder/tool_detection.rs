//! External tool detection.
//!
//! `hdiutil`, `osascript`, `codesign` and `security` ship with every macOS
//! install. `SetFile` and `Rez` come with the Xcode command line tools and may
//! be missing, so their presence is probed once and cached.

use std::path::PathBuf;
use std::sync::LazyLock;

/// Location of `SetFile`, used to flag the volume as having a custom icon.
pub static SETFILE: LazyLock<Option<PathBuf>> = LazyLock::new(|| locate("SetFile"));

/// Location of `Rez`, used to embed a license agreement.
pub static REZ: LazyLock<Option<PathBuf>> = LazyLock::new(|| locate("Rez"));

fn locate(tool: &str) -> Option<PathBuf> {
    let found = which::which(tool).ok().or_else(|| {
        // Older Xcode installs keep the developer tools outside PATH.
        let fallback = PathBuf::from("/Applications/Xcode.app/Contents/Developer/usr/bin").join(tool);
        fallback.is_file().then_some(fallback)
    });

    match &found {
        Some(path) => log::debug!("Found {} at: {}", tool, path.display()),
        None => log::debug!("{} not found in PATH", tool),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_none() {
        assert!(locate("create-dmg-no-such-tool").is_none());
    }

    #[test]
    fn shell_is_found() {
        assert!(locate("sh").is_some());
    }
}
