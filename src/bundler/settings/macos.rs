//! macOS disk image, signing and volume icon settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Disk image formats `hdiutil convert` can produce for distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum DmgFormat {
    /// zlib-compressed
    #[serde(rename = "UDZO")]
    Udzo,
    /// bzip2-compressed (macOS 10.4+)
    #[serde(rename = "UDBZ")]
    Udbz,
    /// lzfse-compressed (macOS 10.11+)
    #[default]
    #[serde(rename = "ULFO")]
    Ulfo,
    /// lzma-compressed (macOS 10.15+)
    #[serde(rename = "ULMO")]
    Ulmo,
    /// Read-only, uncompressed
    #[serde(rename = "UDRO")]
    Udro,
    /// ADC-compressed, required before `hdiutil unflatten`
    #[serde(rename = "UDCO")]
    Udco,
}

impl DmgFormat {
    /// All formats accepted on the command line.
    pub const ALL: [DmgFormat; 6] = [
        DmgFormat::Udzo,
        DmgFormat::Udbz,
        DmgFormat::Ulfo,
        DmgFormat::Ulmo,
        DmgFormat::Udro,
        DmgFormat::Udco,
    ];

    /// The `-format` argument understood by `hdiutil`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DmgFormat::Udzo => "UDZO",
            DmgFormat::Udbz => "UDBZ",
            DmgFormat::Ulfo => "ULFO",
            DmgFormat::Ulmo => "ULMO",
            DmgFormat::Udro => "UDRO",
            DmgFormat::Udco => "UDCO",
        }
    }
}

impl fmt::Display for DmgFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DmgFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DmgFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<&str> = DmgFormat::ALL.iter().map(DmgFormat::as_str).collect();
                format!("Invalid format: {s}. Valid formats: {}", valid.join(", "))
            })
    }
}

/// Disk image appearance and content configuration.
///
/// # See Also
///
/// - [`SigningSettings`] - code signing of the finished image
/// - [`VolumeIconSettings`] - custom volume icon
#[derive(Clone, Debug)]
pub struct DmgSettings {
    /// Final image format.
    ///
    /// Default: ULFO
    pub format: DmgFormat,

    /// Path to a background image for the Finder window.
    ///
    /// Should be PNG format, sized like [`window_size`](Self::window_size).
    ///
    /// Default: None (plain background)
    pub background: Option<PathBuf>,

    /// Resource script (`.r`) holding a software license agreement.
    ///
    /// Default: None (no license shown on mount)
    pub sla: Option<PathBuf>,

    /// Finder window size (width, height) in points.
    ///
    /// Default: (660, 400)
    pub window_size: (u32, u32),

    /// Icon size in the Finder window.
    ///
    /// Default: 160
    pub icon_size: u32,
}

impl Default for DmgSettings {
    fn default() -> Self {
        Self {
            format: DmgFormat::default(),
            background: None,
            sla: None,
            window_size: (660, 400),
            icon_size: 160,
        }
    }
}

/// Code signing configuration.
#[derive(Clone, Debug)]
pub struct SigningSettings {
    /// Sign the finished image.
    ///
    /// Default: true
    pub enabled: bool,

    /// Signing identity name or hash.
    ///
    /// Example: "Developer ID Application: Your Name (TEAMID)"
    ///
    /// Default: None (discovered with `security find-identity`)
    pub identity: Option<String>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            identity: None,
        }
    }
}

/// Custom volume icon configuration.
#[derive(Clone, Debug)]
pub struct VolumeIconSettings {
    /// Drive icon the app icon is composited onto, and the fallback icon.
    ///
    /// Default: the system removable-drive icon
    pub template: PathBuf,

    /// Composite the app icon onto the template.
    ///
    /// Default: true
    pub compose: bool,
}

impl Default for VolumeIconSettings {
    fn default() -> Self {
        Self {
            template: PathBuf::from(crate::bundler::resources::icons::SYSTEM_DRIVE_ICON),
            compose: true,
        }
    }
}
