// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by the picker and provider bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Authority of the external decor content provider.
    pub provider_authority: String,
    /// Logical directory holding decor assets, both in the provider namespace
    /// and in the local cache.
    pub decor_dir: String,
    /// File name used when the picker cannot resolve a display name.
    pub fallback_image_name: String,
    /// MIME filter passed to the document chooser.
    pub picker_mime_type: String,
    /// Restrict the chooser to on-device documents (no cloud providers).
    pub picker_local_only: bool,
    /// Chunk size for byte copies.
    pub copy_chunk_size: usize,
    /// Progress is logged each time the copied total crosses a multiple of this.
    pub progress_interval: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            provider_authority: "com.ipoleksenko.sense.provider".into(),
            decor_dir: "decor".into(),
            fallback_image_name: "unknown.png".into(),
            picker_mime_type: "image/png".into(),
            picker_local_only: true,
            copy_chunk_size: 8192,
            progress_interval: 65536,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded bridge config");
        Self::from_json(&json)
    }

    /// `content://<authority>/`
    pub fn provider_prefix(&self) -> String {
        format!("content://{}/", self.provider_authority)
    }

    /// Replace zero chunk and progress sizes with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.copy_chunk_size == 0 {
            self.copy_chunk_size = Self::default().copy_chunk_size;
        }
        if self.progress_interval == 0 {
            self.progress_interval = Self::default().progress_interval;
        }
        self
    }
}
