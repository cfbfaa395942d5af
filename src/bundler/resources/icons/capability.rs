//! Compositing capability detection.
//!
//! The probe runs once, when the capability object is built, and the result
//! is passed into [`VolumeIconComposer`](super::VolumeIconComposer). Tests
//! swap in their own [`Capability`] to drive both branches.

use image::ImageFormat;
use std::path::Path;

/// Whether icon compositing can run in this environment.
pub trait Capability: Send + Sync {
    /// Returns `true` when the compositing pipeline may run.
    fn is_available(&self) -> bool;
}

/// Capability probed from the running process.
///
/// Compositing needs a PNG codec that can both read and write (the `image`
/// crate's codecs are feature-gated) and a readable drive icon template.
#[derive(Debug, Clone, Copy)]
pub struct ProbedCapability {
    available: bool,
}

impl ProbedCapability {
    /// Probes the codec and the template file. Never fails; a failed probe
    /// just reports "unavailable".
    pub fn probe(template: &Path) -> Self {
        let codec = ImageFormat::Png.reading_enabled() && ImageFormat::Png.writing_enabled();
        if !codec {
            log::debug!("PNG codec not compiled in, icon composition disabled");
        }

        let template_readable = match std::fs::metadata(template) {
            Ok(metadata) if metadata.is_file() => true,
            Ok(_) => {
                log::debug!("Volume icon template is not a file: {}", template.display());
                false
            }
            Err(e) => {
                log::debug!(
                    "Volume icon template not readable at {}: {}",
                    template.display(),
                    e
                );
                false
            }
        };

        Self {
            available: codec && template_readable,
        }
    }

    /// Capability that is always off, for `--no-icon-composition`.
    pub fn disabled() -> Self {
        Self { available: false }
    }
}

impl Capability for ProbedCapability {
    fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ProbedCapability::probe(&dir.path().join("missing.icns")).is_available());
        assert!(!ProbedCapability::probe(dir.path()).is_available());
    }

    #[test]
    fn readable_template_is_available() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("disk.icns");
        std::fs::write(&template, b"icns\0\0\0\x08").unwrap();
        assert!(ProbedCapability::probe(&template).is_available());
    }

    #[test]
    fn disabled_is_unavailable() {
        assert!(!ProbedCapability::disabled().is_available());
    }
}
