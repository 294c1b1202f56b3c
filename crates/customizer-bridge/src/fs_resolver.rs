// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed content resolver for desktop builds.
//
// Provider URIs map onto files under a game directory; `file://` URIs map
// onto local files so picked documents can be imported without a chooser.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use customizer_core::error::{CustomizerError, Result};
use customizer_core::types::{
    ContentUri, ContentValues, DISPLAY_NAME_COLUMN, NAME_COLUMN, NEW_NAME_COLUMN, OpenMode,
    QueryRows, base_name,
};
use tracing::{debug, warn};

use crate::traits::{ContentResolver, InputStream, OutputStream};

/// Serves `content://<authority>/<path>` from `<root>/<path>`.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
    authority: String,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>, authority: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            authority: authority.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local file behind `uri`.
    fn resolve(&self, uri: &ContentUri) -> Result<PathBuf> {
        if let Some(path) = uri.to_file_path() {
            return Ok(path);
        }
        if uri.authority() != Some(self.authority.as_str()) {
            return Err(CustomizerError::Provider {
                operation: "resolve",
                uri: uri.to_string(),
            });
        }

        let relative = Path::new(uri.path());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(CustomizerError::InvalidPath(uri.path().to_owned()));
        }
        Ok(self.root.join(relative))
    }

    /// `path` relative to the root, with `/` separators.
    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        Some(parts.join("/"))
    }
}

impl ContentResolver for DirectoryResolver {
    fn insert(&self, uri: &ContentUri, _values: &ContentValues) -> Result<Option<ContentUri>> {
        let path = self.resolve(uri)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            File::create(&path)?;
            debug!(path = %path.display(), "created empty file");
        }
        Ok(Some(uri.clone()))
    }

    fn query(&self, uri: &ContentUri) -> Result<Option<QueryRows>> {
        let path = self.resolve(uri)?;

        if uri.to_file_path().is_some() {
            if !path.is_file() {
                return Ok(None);
            }
            let mut rows = QueryRows::new(&[DISPLAY_NAME_COLUMN]);
            rows.push_row(vec![
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_owned),
            ]);
            return Ok(Some(rows));
        }

        let dir = if path.is_dir() {
            path.as_path()
        } else {
            path.parent().unwrap_or(&self.root)
        };

        let mut rows = QueryRows::new(&[NAME_COLUMN]);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Some(rows)),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| self.relative_name(&entry.path()))
            .collect();
        names.sort();
        for name in names {
            rows.push_row(vec![Some(name)]);
        }
        Ok(Some(rows))
    }

    fn update(&self, uri: &ContentUri, values: &ContentValues) -> Result<usize> {
        let Some(new_name) = values.get(NEW_NAME_COLUMN) else {
            return Ok(0);
        };
        if base_name(new_name) != Some(new_name) {
            return Err(CustomizerError::InvalidPath(new_name.to_owned()));
        }

        let path = self.resolve(uri)?;
        if !path.is_file() {
            return Ok(0);
        }
        let target = path.with_file_name(new_name);
        fs::rename(&path, &target)?;
        debug!(from = %path.display(), to = %target.display(), "renamed");
        Ok(1)
    }

    fn delete(&self, uri: &ContentUri) -> Result<usize> {
        let path = self.resolve(uri)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(1),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "delete failed");
                Err(e.into())
            }
        }
    }

    fn open_input(&self, uri: &ContentUri) -> Result<Option<InputStream>> {
        let path = self.resolve(uri)?;
        let file = File::open(&path)?;
        Ok(Some(Box::new(file)))
    }

    fn open_output(&self, uri: &ContentUri, mode: OpenMode) -> Result<Option<OutputStream>> {
        let path = self.resolve(uri)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = match mode {
            OpenMode::Read => {
                return Err(CustomizerError::StreamUnavailable {
                    uri: uri.to_string(),
                    mode: mode.as_str(),
                });
            }
            OpenMode::Write | OpenMode::Truncate => File::create(&path)?,
        };
        Ok(Some(Box::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use customizer_core::config::BridgeConfig;
    use customizer_core::outcome::{Outcome, classify};

    use super::*;
    use crate::provider::ProviderBridge;

    const AUTHORITY: &str = "com.ipoleksenko.sense.provider";

    fn uri(path: &str) -> ContentUri {
        ContentUri::parse(format!("content://{AUTHORITY}/{path}"))
    }

    #[test]
    fn insert_creates_file_and_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        let row = resolver
            .insert(&uri("decor/a.png"), &ContentValues::new())
            .expect("insert");
        assert_eq!(row, Some(uri("decor/a.png")));
        assert!(dir.path().join("decor/a.png").is_file());
    }

    #[test]
    fn insert_keeps_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("decor.cfg"), "grass=true\n").expect("seed");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        resolver
            .insert(&uri("decor.cfg"), &ContentValues::new())
            .expect("insert");
        assert_eq!(
            fs::read_to_string(dir.path().join("decor.cfg")).expect("read"),
            "grass=true\n"
        );
    }

    #[test]
    fn query_lists_sibling_files_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("decor")).expect("mkdir");
        fs::write(dir.path().join("decor/b.png"), b"").expect("seed");
        fs::write(dir.path().join("decor/a.png"), b"").expect("seed");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);

        let rows = resolver.query(&uri("decor/c.png")).expect("query").expect("cursor");
        let names: Vec<_> = rows.rows.iter().filter_map(|r| r[0].clone()).collect();
        assert_eq!(names, vec!["decor/a.png", "decor/b.png"]);
    }

    #[test]
    fn query_missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        let rows = resolver.query(&uri("nope/x.txt")).expect("query").expect("cursor");
        assert!(rows.is_empty());
    }

    #[test]
    fn file_uri_reports_display_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let local = dir.path().join("Holiday.png");
        fs::write(&local, b"img").expect("seed");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);

        let file_uri = ContentUri::parse(format!("file://{}", local.display()));
        let rows = resolver.query(&file_uri).expect("query").expect("cursor");
        assert_eq!(rows.first_value(DISPLAY_NAME_COLUMN), Some("Holiday.png"));

        let mut bytes = Vec::new();
        resolver
            .open_input(&file_uri)
            .expect("open")
            .expect("stream")
            .read_to_end(&mut bytes)
            .expect("read");
        assert_eq!(bytes, b"img");
    }

    #[test]
    fn parent_components_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path().join("game"), AUTHORITY);
        let err = resolver
            .insert(&uri("../outside.txt"), &ContentValues::new())
            .expect_err("escape");
        assert!(matches!(err, CustomizerError::InvalidPath(_)));
    }

    #[test]
    fn foreign_authority_is_a_provider_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        let err = resolver
            .delete(&ContentUri::parse("content://other/decor/a.png"))
            .expect_err("authority");
        assert_eq!(classify(&err), Outcome::ProviderError);
    }

    #[test]
    fn missing_file_reads_as_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        let err = resolver.open_input(&uri("missing.txt")).err().expect("error");
        assert_eq!(classify(&err), Outcome::NotFound);
    }

    #[test]
    fn update_and_delete_report_row_counts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = DirectoryResolver::new(dir.path(), AUTHORITY);
        {
            let mut out = resolver
                .open_output(&uri("decor/old.png"), OpenMode::Write)
                .expect("open")
                .expect("stream");
            out.write_all(b"x").expect("write");
        }

        let values = ContentValues::new().with(NEW_NAME_COLUMN, "new.png");
        assert_eq!(resolver.update(&uri("decor/old.png"), &values).expect("update"), 1);
        assert_eq!(resolver.update(&uri("decor/old.png"), &values).expect("update"), 0);
        assert!(dir.path().join("decor/new.png").is_file());

        assert_eq!(resolver.delete(&uri("decor/new.png")).expect("delete"), 1);
        assert_eq!(resolver.delete(&uri("decor/new.png")).expect("delete"), 0);
    }

    #[test]
    fn provider_bridge_round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = ProviderBridge::new(
            DirectoryResolver::new(dir.path(), AUTHORITY),
            BridgeConfig::default(),
        );

        assert!(!bridge.exists("decor.cfg"));
        assert!(bridge.create_file("decor.cfg"));
        assert!(bridge.exists("decor.cfg"));
        assert!(bridge.write_text_file("decor.cfg", &["grass=false", "rug=true"]));
        assert_eq!(bridge.read_full_text("decor.cfg"), "grass=false\nrug=true\n");
        assert_eq!(bridge.read_full_text("missing.cfg"), "");
    }
}
