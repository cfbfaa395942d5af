//! Icon container codec.
//!
//! Decodes an `.icns` byte stream into a tag -> bytes mapping holding only
//! the image records, and serializes such a mapping back into a valid
//! container. Framing (the `icns` magic, the total length and the per-entry
//! `type + length` headers) is handled by the `icns` crate; the payloads are
//! carried through untouched.

use super::error::{DecodeError, IconError, Result};
use super::tag::IconTag;
use icns::{IconElement, IconFamily};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// Image entries of one container, keyed by resolution tag.
///
/// A `BTreeMap` so that serialization order is the tag order.
pub type IconMap = BTreeMap<IconTag, Vec<u8>>;

/// Parses a container, keeping only image records.
///
/// Metadata records (`TOC `, `icnV`, ...) are dropped. If a tag occurs more
/// than once the first occurrence wins.
pub fn decode(bytes: &[u8]) -> std::result::Result<IconMap, DecodeError> {
    let family = IconFamily::read(Cursor::new(bytes)).map_err(|e| DecodeError(e.to_string()))?;

    let mut icons = IconMap::new();
    for element in family.elements {
        let tag = IconTag::from(element.ostype);
        if !tag.is_image() {
            log::debug!("Skipping non-image record {tag}");
            continue;
        }
        if icons.contains_key(&tag) {
            log::warn!("Duplicate icon entry {tag}, keeping the first one");
            continue;
        }
        icons.insert(tag, element.data);
    }

    Ok(icons)
}

/// Serializes entries into a container, in tag order.
pub fn encode(icons: &IconMap) -> Result<Vec<u8>> {
    let mut family = IconFamily::new();
    family.elements = icons
        .iter()
        .map(|(tag, data)| IconElement::new((*tag).into(), data.clone()))
        .collect();

    let mut bytes = Vec::new();
    family
        .write(&mut bytes)
        .map_err(|e| IconError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Reads and decodes a container file, naming the file on failure.
pub async fn read_container(path: &Path) -> Result<IconMap> {
    let bytes = tokio::fs::read(path).await.map_err(|error| IconError::Io {
        context: "reading icon container",
        path: path.to_path_buf(),
        error,
    })?;

    decode(&bytes).map_err(|e| IconError::MalformedContainer {
        path: path.to_path_buf(),
        reason: e.0,
    })
}
