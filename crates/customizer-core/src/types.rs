// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the file-access bridge.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::error::{CustomizerError, Result};

/// Request code the picker bridge uses for its chooser intent.
pub const PICK_IMAGE_REQUEST: i32 = 1;

/// `Activity.RESULT_OK`.
pub const RESULT_OK: i32 = -1;

/// `Activity.RESULT_CANCELED`.
pub const RESULT_CANCELED: i32 = 0;

/// Column the provider uses for record names (insert and query).
pub const NAME_COLUMN: &str = "name";

/// Column carrying the target name of a rename (update).
pub const NEW_NAME_COLUMN: &str = "new_name";

/// `MediaStore.MediaColumns.DISPLAY_NAME`.
pub const DISPLAY_NAME_COLUMN: &str = "_display_name";

/// Native libraries the host activity loads, in load order.
pub const NATIVE_LIBRARIES: &[&str] = &[
    "SDL2",
    "SDL2_image",
    "SDL2_ttf",
    "imgui",
    "imgui-sdl2",
    "imgui-sdlrenderer2",
    "SENSE_THE_GAME_CUSTOMIZER",
];

// ---------------------------------------------------------------------------
// Paths and URIs
// ---------------------------------------------------------------------------

/// Relative path of an asset inside the provider namespace (e.g.
/// `decor/lamp.png` or `decor.cfg`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// `<dir>/<name>`
    pub fn join(dir: &str, name: &str) -> Self {
        Self(format!("{dir}/{name}"))
    }

    /// Derive `<dir>/<base name>` from a local path such as
    /// `/data/user/0/<pkg>/files/decor/lamp.png`.
    pub fn from_local_file_name(dir: &str, local: &str) -> Result<Self> {
        if local.is_empty() {
            return Err(CustomizerError::InvalidPath("path is empty".into()));
        }
        let name = base_name(local)
            .ok_or_else(|| CustomizerError::InvalidPath(format!("no file name in {local:?}")))?;
        Ok(Self::join(dir, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component.
    pub fn file_name(&self) -> Option<&str> {
        base_name(&self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Final component of a slash-separated path, `None` for `/`, `..` and the
/// empty string.
pub fn base_name(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(|name| name.to_str())
}

/// A URI handed to the content resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentUri(String);

impl ContentUri {
    /// Compose `content://<authority>/<asset path>`.
    pub fn for_asset(config: &BridgeConfig, asset: &AssetPath) -> Self {
        Self(format!("{}{}", config.provider_prefix(), asset.as_str()))
    }

    /// Wrap a URI string received from the platform (picker results).
    pub fn parse(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme before `://`, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Authority between `://` and the next `/`.
    pub fn authority(&self) -> Option<&str> {
        let (_, rest) = self.0.split_once("://")?;
        Some(rest.split_once('/').map_or(rest, |(authority, _)| authority))
    }

    /// Path after the authority, without the leading slash.
    pub fn path(&self) -> &str {
        match self.0.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
            None => &self.0,
        }
    }

    /// Local path for `file://` URIs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        let rest = self.0.strip_prefix("file://")?;
        Some(PathBuf::from(rest))
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Resolver payloads
// ---------------------------------------------------------------------------

/// Column → value pairs for insert and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentValues(BTreeMap<String, String>);

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.put(column, value);
        self
    }

    pub fn put(&mut self, column: &str, value: impl Into<String>) {
        self.0.insert(column.to_owned(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Materialised query cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryRows {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells are stored as `None`.
    pub fn push_row(&mut self, cells: Vec<Option<String>>) {
        let mut cells = cells;
        cells.resize(self.columns.len(), None);
        self.rows.push(cells);
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of `column` in the first row.
    pub fn first_value(&self, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.first()?.get(index)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Stream open modes understood by `ContentResolver.openOutputStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// `"w"`: write, provider decides about truncation.
    Write,
    /// `"rwt"`: read-write, truncate.
    Truncate,
}

impl OpenMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Truncate => "rwt",
        }
    }
}

// ---------------------------------------------------------------------------
// Picker payloads
// ---------------------------------------------------------------------------

/// Arguments of `Activity.onActivityResult`, with the intent reduced to its
/// data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    pub data_uri: Option<String>,
}

impl ActivityResult {
    pub fn ok(request_code: i32, uri: impl Into<String>) -> Self {
        Self {
            request_code,
            result_code: RESULT_OK,
            data_uri: Some(uri.into()),
        }
    }
}

/// Chooser intent description, rendered into an `Intent` by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserIntent {
    pub action: &'static str,
    pub category: &'static str,
    pub mime_type: String,
    pub local_only: bool,
    pub grant_read: bool,
    pub request_code: i32,
}

impl ChooserIntent {
    /// `ACTION_OPEN_DOCUMENT` filtered to the configured image type.
    pub fn open_image(config: &BridgeConfig) -> Self {
        Self {
            action: "android.intent.action.OPEN_DOCUMENT",
            category: "android.intent.category.OPENABLE",
            mime_type: config.picker_mime_type.clone(),
            local_only: config.picker_local_only,
            grant_read: true,
            request_code: PICK_IMAGE_REQUEST,
        }
    }
}

/// A picked file after it has been copied into the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    /// Absolute path of the cache file.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}
