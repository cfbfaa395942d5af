//! Declarative description of the disk image window.
//!
//! A [`DmgLayout`] states what the mounted volume shows: title, volume icon,
//! background, icon size, window size and the positioned items. It is
//! serialisable (for debug logging and tests) and renders itself into the
//! Finder AppleScript that applies it.

use crate::bundler::settings::{DmgFormat, DmgSettings};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Position of the application bundle in the window.
pub const APP_POSITION: (u32, u32) = (180, 170);

/// Position of the `Applications` link in the window.
pub const APPLICATIONS_POSITION: (u32, u32) = (480, 170);

/// Target of the drag-to-install link.
pub const APPLICATIONS_DIR: &str = "/Applications";

/// Directory on the volume holding the background picture.
pub const BACKGROUND_DIR: &str = ".background";

/// Offset of the window's top-left corner on screen.
const WINDOW_ORIGIN: (u32, u32) = (100, 100);

#[derive(Clone, Debug, Serialize)]
pub struct DmgLayout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<PathBuf>,
    #[serde(rename = "icon-size")]
    pub icon_size: u32,
    pub format: DmgFormat,
    pub window: Window,
    pub contents: Vec<ContentItem>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Window {
    pub size: WindowSize,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Copied onto the volume.
    File,
    /// Symbolic link on the volume.
    Link,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContentItem {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub path: PathBuf,
}

impl ContentItem {
    /// Name of the item at the root of the volume.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl DmgLayout {
    /// Standard drag-to-install layout: the app on the left, a link to
    /// `/Applications` on the right.
    pub fn drag_to_install(
        title: impl Into<String>,
        app: &Path,
        icon: Option<PathBuf>,
        settings: &DmgSettings,
    ) -> Self {
        let (width, height) = settings.window_size;
        Self {
            title: title.into(),
            icon,
            background: settings.background.clone(),
            icon_size: settings.icon_size,
            format: settings.format,
            window: Window {
                size: WindowSize { width, height },
            },
            contents: vec![
                ContentItem {
                    x: APP_POSITION.0,
                    y: APP_POSITION.1,
                    kind: ContentKind::File,
                    path: app.to_path_buf(),
                },
                ContentItem {
                    x: APPLICATIONS_POSITION.0,
                    y: APPLICATIONS_POSITION.1,
                    kind: ContentKind::Link,
                    path: PathBuf::from(APPLICATIONS_DIR),
                },
            ],
        }
    }

    /// File name of the background picture on the volume.
    pub fn background_name(&self) -> Option<String> {
        self.background
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Pretty-printed JSON form of the layout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Finder script applying this layout to the mounted volume `volume_name`.
    pub fn applescript(&self, volume_name: &str) -> String {
        let (left, top) = WINDOW_ORIGIN;
        let right = left + self.window.size.width;
        let bottom = top + self.window.size.height;

        let background_clause = match self.background_name() {
            Some(name) => format!(
                "set background picture of viewOptions to file \"{}:{}\"\n",
                BACKGROUND_DIR,
                escape_applescript_string(&name)
            ),
            None => String::new(),
        };

        let positions: String = self
            .contents
            .iter()
            .map(|item| {
                format!(
                    "set position of item \"{}\" to {{{}, {}}}\n",
                    escape_applescript_string(&item.name()),
                    item.x,
                    item.y
                )
            })
            .collect();

        format!(
            r#"tell application "Finder"
tell disk "{volume}"
open
set current view of container window to icon view
set toolbar visible of container window to false
set statusbar visible of container window to false
set bounds of container window to {{{left}, {top}, {right}, {bottom}}}
set viewOptions to icon view options of container window
set arrangement of viewOptions to not arranged
set icon size of viewOptions to {icon_size}
{background_clause}{positions}close
open
update without registering applications
delay 2
end tell
end tell
"#,
            volume = escape_applescript_string(volume_name),
            icon_size = self.icon_size,
        )
    }
}

/// Escapes backslashes and double quotes for an AppleScript string literal.
pub fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}
