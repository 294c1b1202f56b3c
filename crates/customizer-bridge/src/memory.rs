// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory content resolver.
//
// Behaves like the decor provider: records are keyed by the path after the
// authority, queries return every record in a single `name` column, updates
// rename via `new_name`. Picker documents live in a separate table keyed by
// their full URI. Clones share state, so a test can keep a handle while the
// bridge owns another.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use customizer_core::error::Result;
use customizer_core::types::{
    ContentUri, ContentValues, DISPLAY_NAME_COLUMN, NAME_COLUMN, NEW_NAME_COLUMN, OpenMode,
    QueryRows,
};

use crate::traits::{ContentResolver, InputStream, OutputStream};

#[derive(Debug, Default)]
struct Document {
    display_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, Vec<u8>>,
    documents: BTreeMap<String, Document>,
    inserts: usize,
    fail_inserts: bool,
    omit_name_column: bool,
    refuse_output: bool,
    fail_reads: bool,
}

/// Shared-state fake of the decor content provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    state: Arc<Mutex<State>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pickable document.
    pub fn add_document(&self, uri: &str, display_name: Option<&str>, bytes: &[u8]) {
        self.lock().documents.insert(
            uri.to_owned(),
            Document {
                display_name: display_name.map(str::to_owned),
                bytes: bytes.to_vec(),
            },
        );
    }

    /// Inserts report a `null` row URI from now on.
    pub fn fail_inserts(&self) {
        self.lock().fail_inserts = true;
    }

    /// Queries report rows without a `name` column from now on.
    pub fn omit_name_column(&self) {
        self.lock().omit_name_column = true;
    }

    /// `open_output` returns `None` from now on.
    pub fn refuse_output(&self) {
        self.lock().refuse_output = true;
    }

    /// `open_input` fails with an I/O error from now on.
    pub fn fail_reads(&self) {
        self.lock().fail_reads = true;
    }

    /// Store `bytes` as the record at `path`, bypassing insert.
    pub fn put_record(&self, path: &str, bytes: &[u8]) {
        self.lock().records.insert(path.to_owned(), bytes.to_vec());
    }

    /// Contents of a record, keyed by its provider path.
    pub fn record(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().records.get(path).cloned()
    }

    pub fn record_names(&self) -> Vec<String> {
        self.lock().records.keys().cloned().collect()
    }

    /// Number of insert calls seen, successful or not.
    pub fn insert_count(&self) -> usize {
        self.lock().inserts
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentResolver for MemoryResolver {
    fn insert(&self, uri: &ContentUri, _values: &ContentValues) -> Result<Option<ContentUri>> {
        let mut state = self.lock();
        state.inserts += 1;
        if state.fail_inserts {
            return Ok(None);
        }
        state.records.entry(uri.path().to_owned()).or_default();
        Ok(Some(uri.clone()))
    }

    fn query(&self, uri: &ContentUri) -> Result<Option<QueryRows>> {
        let state = self.lock();

        if let Some(document) = state.documents.get(uri.as_str()) {
            let rows = match &document.display_name {
                Some(name) => {
                    let mut rows = QueryRows::new(&[DISPLAY_NAME_COLUMN]);
                    rows.push_row(vec![Some(name.clone())]);
                    rows
                }
                None => {
                    let mut rows = QueryRows::new(&["_id"]);
                    rows.push_row(vec![Some("1".into())]);
                    rows
                }
            };
            return Ok(Some(rows));
        }

        let column = if state.omit_name_column { "_id" } else { NAME_COLUMN };
        let mut rows = QueryRows::new(&[column]);
        for (index, name) in state.records.keys().enumerate() {
            let cell = if state.omit_name_column {
                index.to_string()
            } else {
                name.clone()
            };
            rows.push_row(vec![Some(cell)]);
        }
        Ok(Some(rows))
    }

    fn update(&self, uri: &ContentUri, values: &ContentValues) -> Result<usize> {
        let Some(new_name) = values.get(NEW_NAME_COLUMN) else {
            return Ok(0);
        };
        let mut state = self.lock();
        let Some(bytes) = state.records.remove(uri.path()) else {
            return Ok(0);
        };
        let target = match uri.path().rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{new_name}"),
            None => new_name.to_owned(),
        };
        state.records.insert(target, bytes);
        Ok(1)
    }

    fn delete(&self, uri: &ContentUri) -> Result<usize> {
        Ok(usize::from(self.lock().records.remove(uri.path()).is_some()))
    }

    fn open_input(&self, uri: &ContentUri) -> Result<Option<InputStream>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(std::io::Error::other("read refused").into());
        }
        let bytes = state
            .documents
            .get(uri.as_str())
            .map(|doc| doc.bytes.clone())
            .or_else(|| state.records.get(uri.path()).cloned());
        Ok(bytes.map(|b| Box::new(Cursor::new(b)) as InputStream))
    }

    fn open_output(&self, uri: &ContentUri, _mode: OpenMode) -> Result<Option<OutputStream>> {
        let mut state = self.lock();
        if state.refuse_output {
            return Ok(None);
        }
        let key = uri.path().to_owned();
        state.records.insert(key.clone(), Vec::new());
        Ok(Some(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            key,
            buffer: Vec::new(),
        })))
    }
}

/// Buffers writes and publishes them to the record on flush and drop.
struct MemoryWriter {
    state: Arc<Mutex<State>>,
    key: String,
    buffer: Vec<u8>,
}

impl MemoryWriter {
    fn publish(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.records.insert(self.key.clone(), self.buffer.clone());
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.publish();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.publish();
    }
}
