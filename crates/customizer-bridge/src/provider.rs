// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Provider bridge: file operations against the decor content provider.
//
// Each operation composes its relative path onto the provider prefix and
// issues exactly one resolver call (plus the stream traffic for reads,
// writes and copies). The native layer sees booleans and strings only;
// the `try_*` forms keep the error so it can be classified and logged.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Instant;

use customizer_core::config::BridgeConfig;
use customizer_core::error::{CustomizerError, Result};
use customizer_core::outcome::{Outcome, classify};
use customizer_core::types::{
    AssetPath, ContentUri, ContentValues, NAME_COLUMN, NEW_NAME_COLUMN, OpenMode,
};
use tracing::{debug, error, info, instrument, warn};

use crate::traits::ContentResolver;

/// File operations on the provider-backed virtual filesystem.
pub struct ProviderBridge<R> {
    resolver: R,
    config: BridgeConfig,
}

impl<R: ContentResolver> ProviderBridge<R> {
    pub fn new(resolver: R, config: BridgeConfig) -> Self {
        Self {
            resolver,
            config: config.normalized(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// `content://<authority>/<path>`
    pub fn uri_for(&self, path: &AssetPath) -> ContentUri {
        ContentUri::for_asset(&self.config, path)
    }

    // -----------------------------------------------------------------------
    // Boolean / string surface
    // -----------------------------------------------------------------------

    /// Insert a record named `path`. `true` iff the provider returned a row URI.
    pub fn create_file(&self, path: &str) -> bool {
        settle("create_file", path, self.try_create_file(&AssetPath::new(path))).is_some()
    }

    /// Whether the provider lists a record named exactly `path`.
    ///
    /// Known approximation: when the provider returns rows but no `name`
    /// column, this reports `true` without matching anything.
    pub fn exists(&self, path: &str) -> bool {
        let exists = settle("exists", path, self.try_exists(&AssetPath::new(path))).unwrap_or(false);
        info!(path, exists, "file check");
        exists
    }

    /// Whole text of `path`, every line terminated by `\n`. Invalid UTF-8 is
    /// replaced with U+FFFD. Empty on failure.
    pub fn read_full_text(&self, path: &str) -> String {
        settle("read_full_text", path, self.try_read_full_text(&AssetPath::new(path)))
            .unwrap_or_default()
    }

    /// Replace the contents of `path` with `lines`, each followed by `\n`.
    pub fn write_text_file<S: AsRef<str>>(&self, path: &str, lines: &[S]) -> bool {
        settle(
            "write_text_file",
            path,
            self.try_write_text_file(&AssetPath::new(path), lines),
        )
        .is_some()
    }

    /// Copy a local file into the provider as `<decor dir>/<target_name>`.
    pub fn copy_file(&self, source: &Path, target_name: &str) -> bool {
        settle(
            "copy_file",
            &source.to_string_lossy(),
            self.try_copy_file(source, target_name),
        )
        .is_some()
    }

    /// Delete the decor record named after the base name of `file_path`.
    pub fn delete_decor_file(&self, file_path: &str) -> bool {
        settle("delete_decor_file", file_path, self.try_delete_decor_file(file_path)).is_some()
    }

    /// Rename the decor record named after the base name of `file_path`.
    pub fn rename_decor_file(&self, file_path: &str, new_name: &str) -> bool {
        settle(
            "rename_decor_file",
            file_path,
            self.try_rename_decor_file(file_path, new_name),
        )
        .is_some()
    }

    // -----------------------------------------------------------------------
    // Result surface
    // -----------------------------------------------------------------------

    pub fn try_create_file(&self, path: &AssetPath) -> Result<ContentUri> {
        let uri = self.uri_for(path);
        let values = ContentValues::new().with(NAME_COLUMN, path.as_str());
        let row = self
            .resolver
            .insert(&uri, &values)?
            .ok_or_else(|| CustomizerError::Provider {
                operation: "insert",
                uri: uri.to_string(),
            })?;
        info!(row = %row, "file created through content provider");
        Ok(row)
    }

    pub fn try_exists(&self, path: &AssetPath) -> Result<bool> {
        let uri = self.uri_for(path);
        let Some(rows) = self.resolver.query(&uri)? else {
            return Ok(false);
        };
        if rows.is_empty() {
            return Ok(false);
        }
        let Some(index) = rows.column_index(NAME_COLUMN) else {
            debug!(uri = %uri, rows = rows.len(), "no name column, assuming present");
            return Ok(true);
        };
        Ok(rows
            .rows
            .iter()
            .any(|row| row.get(index).and_then(Option::as_deref) == Some(path.as_str())))
    }

    pub fn try_read_full_text(&self, path: &AssetPath) -> Result<String> {
        let uri = self.uri_for(path);
        debug!(uri = %uri, "reading text");
        let stream = self
            .resolver
            .open_input(&uri)?
            .ok_or_else(|| CustomizerError::StreamUnavailable {
                uri: uri.to_string(),
                mode: OpenMode::Read.as_str(),
            })?;

        let mut reader = BufReader::new(stream);
        let mut text = String::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.ends_with(b"\n") {
                line.pop();
                if line.ends_with(b"\r") {
                    line.pop();
                }
            }
            text.push_str(&String::from_utf8_lossy(&line));
            text.push('\n');
        }
        Ok(text)
    }

    pub fn try_write_text_file<S: AsRef<str>>(&self, path: &AssetPath, lines: &[S]) -> Result<()> {
        let uri = self.uri_for(path);
        let stream = self
            .resolver
            .open_output(&uri, OpenMode::Truncate)?
            .ok_or_else(|| CustomizerError::StreamUnavailable {
                uri: uri.to_string(),
                mode: OpenMode::Truncate.as_str(),
            })?;

        let mut writer = BufWriter::new(stream);
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        info!(uri = %uri, lines = lines.len(), "file successfully written");
        Ok(())
    }

    /// Returns the number of bytes copied.
    #[instrument(skip(self, source), fields(source = %source.display()))]
    pub fn try_copy_file(&self, source: &Path, target_name: &str) -> Result<u64> {
        if target_name.is_empty() {
            return Err(CustomizerError::InvalidPath("target name is empty".into()));
        }
        let metadata = match source.metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CustomizerError::NotFound(format!(
                    "source file {}",
                    source.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(CustomizerError::InvalidPath(format!(
                "{} is not a regular file",
                source.display()
            )));
        }

        let mut input = File::open(source)?;
        debug!(len = metadata.len(), "source opened");

        let target = AssetPath::join(&self.config.decor_dir, target_name);
        self.try_create_file(&target)?;

        let uri = self.uri_for(&target);
        let mut output = self
            .resolver
            .open_output(&uri, OpenMode::Write)?
            .ok_or_else(|| CustomizerError::StreamUnavailable {
                uri: uri.to_string(),
                mode: OpenMode::Write.as_str(),
            })?;

        let chunk = self.config.copy_chunk_size;
        let interval = self.config.progress_interval;
        let mut buffer = vec![0u8; chunk];
        let mut total: u64 = 0;
        let started = Instant::now();

        loop {
            let read = input.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            output.write_all(&buffer[..read])?;
            total += read as u64;
            if total % (interval as u64) < chunk as u64 {
                debug!(total, "copy progress");
            }
        }
        output.flush()?;

        info!(
            uri = %uri,
            bytes = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "copy complete"
        );
        Ok(total)
    }

    /// Returns the number of rows deleted (at least one).
    pub fn try_delete_decor_file(&self, file_path: &str) -> Result<usize> {
        let target = AssetPath::from_local_file_name(&self.config.decor_dir, file_path)?;
        let uri = self.uri_for(&target);
        debug!(uri = %uri, "deleting decor file");

        match self.resolver.delete(&uri)? {
            0 => Err(CustomizerError::NotFound(target.to_string())),
            rows => {
                info!(target = %target, rows, "decor file deleted");
                Ok(rows)
            }
        }
    }

    /// Returns the number of rows updated (at least one).
    pub fn try_rename_decor_file(&self, file_path: &str, new_name: &str) -> Result<usize> {
        if new_name.is_empty() {
            return Err(CustomizerError::InvalidPath("new name is empty".into()));
        }
        let target = AssetPath::from_local_file_name(&self.config.decor_dir, file_path)?;
        let uri = self.uri_for(&target);
        let values = ContentValues::new().with(NEW_NAME_COLUMN, new_name);

        match self.resolver.update(&uri, &values)? {
            0 => Err(CustomizerError::NotFound(target.to_string())),
            rows => {
                info!(target = %target, new_name, rows, "decor file renamed");
                Ok(rows)
            }
        }
    }
}

/// Log the outcome of an operation and collapse it to `Option`.
fn settle<T>(operation: &'static str, subject: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let outcome = classify(&err);
            match outcome {
                Outcome::NotFound | Outcome::ProviderError => {
                    warn!(operation, subject, outcome = outcome.label(), error = %err, "operation failed")
                }
                _ => {
                    error!(operation, subject, outcome = outcome.label(), error = %err, "operation failed")
                }
            }
            None
        }
    }
}
