//! Resolution tags identifying the entries of an icon container.
//!
//! Every entry in an `.icns` file starts with a four-byte type code. Most
//! codes name one bitmap resolution class (`ic07` is 128x128, `ic10` is
//! 512x512@2x, ...), a few name metadata records such as the table of
//! contents (`TOC `) or the version record (`icnV`).

use std::fmt;
use std::str::FromStr;

/// Classification of a container record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Bitmap data (colour, mask or a complete encoded raster).
    Image,
    /// Table of contents, version and other non-bitmap records.
    Other,
}

/// Four-byte type code of an icon container entry.
///
/// Ordering is byte-wise, which gives containers a deterministic entry order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconTag([u8; 4]);

/// Image tags with their nominal pixel width.
const IMAGE_TAGS: &[([u8; 4], u32)] = &[
    (*b"ICON", 32),
    (*b"ICN#", 32),
    (*b"icm#", 16),
    (*b"icm4", 16),
    (*b"icm8", 16),
    (*b"ics#", 16),
    (*b"ics4", 16),
    (*b"ics8", 16),
    (*b"is32", 16),
    (*b"s8mk", 16),
    (*b"icl4", 32),
    (*b"icl8", 32),
    (*b"il32", 32),
    (*b"l8mk", 32),
    (*b"ich#", 48),
    (*b"ich4", 48),
    (*b"ich8", 48),
    (*b"ih32", 48),
    (*b"h8mk", 48),
    (*b"it32", 128),
    (*b"t8mk", 128),
    (*b"icp4", 16),
    (*b"icp5", 32),
    (*b"icp6", 64),
    (*b"ic07", 128),
    (*b"ic08", 256),
    (*b"ic09", 512),
    (*b"ic10", 1024),
    (*b"ic11", 32),
    (*b"ic12", 64),
    (*b"ic13", 256),
    (*b"ic14", 512),
    (*b"ic04", 16),
    (*b"ic05", 32),
    (*b"icsb", 18),
    (*b"icsB", 36),
    (*b"sb24", 24),
    (*b"SB24", 48),
];

impl IconTag {
    /// 512x512@2x, the largest resolution class a container can hold.
    pub const BIGGEST: IconTag = IconTag(*b"ic10");

    /// Creates a tag from its raw type code.
    pub const fn new(code: [u8; 4]) -> Self {
        Self(code)
    }

    /// Returns the raw type code.
    pub const fn code(&self) -> [u8; 4] {
        self.0
    }

    /// Classifies the record this tag introduces.
    pub fn kind(&self) -> RecordKind {
        if self.nominal_size().is_some() {
            RecordKind::Image
        } else {
            RecordKind::Other
        }
    }

    /// Returns `true` for bitmap records.
    pub fn is_image(&self) -> bool {
        self.kind() == RecordKind::Image
    }

    /// Nominal pixel width of the resolution class, `None` for non-image tags.
    pub fn nominal_size(&self) -> Option<u32> {
        IMAGE_TAGS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, size)| *size)
    }
}

impl From<icns::OSType> for IconTag {
    fn from(ostype: icns::OSType) -> Self {
        Self(ostype.0)
    }
}

impl From<IconTag> for icns::OSType {
    fn from(tag: IconTag) -> Self {
        icns::OSType(tag.0)
    }
}

impl fmt::Display for IconTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for IconTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IconTag({self})")
    }
}

impl FromStr for IconTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| format!("icon tag must be exactly 4 bytes: {s:?}"))?;
        Ok(Self(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_image_and_metadata_records() {
        assert_eq!(IconTag::new(*b"ic08").kind(), RecordKind::Image);
        assert_eq!(IconTag::new(*b"s8mk").kind(), RecordKind::Image);
        assert_eq!(IconTag::new(*b"TOC ").kind(), RecordKind::Other);
        assert_eq!(IconTag::new(*b"icnV").kind(), RecordKind::Other);
        assert!(IconTag::new(*b"it32").is_image());
        assert!(!IconTag::new(*b"name").is_image());
    }

    #[test]
    fn biggest_tag_is_1024_pixels() {
        assert_eq!(IconTag::BIGGEST.nominal_size(), Some(1024));
        assert_eq!(IconTag::BIGGEST.to_string(), "ic10");
    }

    #[test]
    fn parses_and_displays() {
        let tag: IconTag = "TOC ".parse().unwrap();
        assert_eq!(tag.code(), *b"TOC ");
        assert_eq!(tag.to_string(), "TOC ");
        assert!("ic1".parse::<IconTag>().is_err());
        assert_eq!(IconTag::new([b'a', 0, b'b', b'c']).to_string(), "a\\x00bc");
    }

    #[test]
    fn orders_bytewise() {
        let mut tags: Vec<IconTag> = ["ic10", "ic07", "TOC ", "icp4"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        tags.sort();
        let names: Vec<String> = tags.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["TOC ", "ic07", "ic10", "icp4"]);
    }
}
