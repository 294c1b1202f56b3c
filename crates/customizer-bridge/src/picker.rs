// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Picker bridge: launches the image chooser and turns its result into a
// cache file plus a native callback.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::PathBuf;

use customizer_core::config::BridgeConfig;
use customizer_core::error::{CustomizerError, Result};
use customizer_core::types::{
    ActivityResult, ChooserIntent, ContentUri, DISPLAY_NAME_COLUMN, OpenMode, PICK_IMAGE_REQUEST,
    PickedImage, RESULT_OK, base_name,
};
use tracing::{debug, error, info, instrument, warn};

use crate::traits::{ContentResolver, ImageSink, PickerHost};

/// Bridges the platform chooser to the native layer.
///
/// Picked files are staged in `<files_dir>/<decor dir>/` under their display
/// name. Staged files are never removed here.
pub struct PickerBridge<R> {
    resolver: R,
    config: BridgeConfig,
    files_dir: PathBuf,
}

impl<R: ContentResolver> PickerBridge<R> {
    /// `files_dir` is the app-private storage root (`Context.getFilesDir()`).
    pub fn new(resolver: R, config: BridgeConfig, files_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            config: config.normalized(),
            files_dir: files_dir.into(),
        }
    }

    /// Directory picked files are copied into.
    pub fn cache_dir(&self) -> PathBuf {
        self.files_dir.join(&self.config.decor_dir)
    }

    /// Ask the host to open the image chooser. Failures are logged only; the
    /// result arrives later through [`Self::on_pick_result`].
    pub fn pick_image(&self, host: &dyn PickerHost) {
        let intent = ChooserIntent::open_image(&self.config);
        match host.launch_chooser(&intent) {
            Ok(()) => info!(
                mime = %intent.mime_type,
                local_only = intent.local_only,
                "file picker started"
            ),
            Err(e) => error!(error = %e, "failed to start file picker"),
        }
    }

    /// Handle `onActivityResult`. Returns `true` iff `sink` was invoked.
    ///
    /// Results for other request codes, cancelled picks and results without
    /// a URI are ignored. Any failure while staging the file aborts before
    /// the sink is called.
    pub fn on_pick_result(&self, result: &ActivityResult, sink: &dyn ImageSink) -> bool {
        if result.request_code != PICK_IMAGE_REQUEST || result.result_code != RESULT_OK {
            debug!(
                request_code = result.request_code,
                result_code = result.result_code,
                "ignoring activity result"
            );
            return false;
        }
        let Some(raw) = result.data_uri.as_deref() else {
            debug!("picker returned no URI");
            return false;
        };

        let uri = ContentUri::parse(raw);
        match self.materialize(&uri) {
            Ok(picked) => {
                sink.on_image_picked(&picked.path, &picked.bytes);
                true
            }
            Err(e) => {
                error!(uri = %uri, error = %e, "error processing picked image");
                false
            }
        }
    }

    /// Copy the document behind `uri` into the cache directory and read it
    /// back.
    #[instrument(skip(self, uri), fields(uri = %uri))]
    pub fn materialize(&self, uri: &ContentUri) -> Result<PickedImage> {
        let input = self
            .resolver
            .open_input(uri)?
            .ok_or_else(|| CustomizerError::StreamUnavailable {
                uri: uri.to_string(),
                mode: OpenMode::Read.as_str(),
            })?;

        let name = self.display_name(uri);
        let cache_dir = self.cache_dir();
        fs::create_dir_all(&cache_dir)?;
        let target = cache_dir.join(&name);
        info!(target = %target.display(), "copying picked document to local file");

        {
            let mut reader = BufReader::with_capacity(self.config.copy_chunk_size, input);
            let mut out = File::create(&target)?;
            std::io::copy(&mut reader, &mut out)?;
            out.flush()?;
        }

        let bytes = fs::read(&target)?;
        let path = std::path::absolute(&target)?;

        match image::guess_format(&bytes) {
            Ok(format) => debug!(?format, "picked file format"),
            Err(_) => warn!(name = %name, "picked file is not a recognised image"),
        }
        info!(path = %path.display(), bytes = bytes.len(), "local file ready");

        Ok(PickedImage { path, bytes })
    }

    /// Display name reported by the resolver, reduced to its final path
    /// component, or the configured fallback.
    fn display_name(&self, uri: &ContentUri) -> String {
        let resolved = match self.resolver.query(uri) {
            Ok(Some(rows)) => rows
                .first_value(DISPLAY_NAME_COLUMN)
                .and_then(base_name)
                .map(str::to_owned),
            Ok(None) => None,
            Err(e) => {
                warn!(uri = %uri, error = %e, "cannot resolve file name");
                None
            }
        };
        resolved.unwrap_or_else(|| self.config.fallback_image_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use customizer_core::types::RESULT_CANCELED;

    use super::*;
    use crate::memory::MemoryResolver;

    const PNG_HEAD: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    struct RecordingHost {
        launched: RefCell<Vec<ChooserIntent>>,
        available: bool,
    }

    impl PickerHost for RecordingHost {
        fn launch_chooser(&self, intent: &ChooserIntent) -> Result<()> {
            if !self.available {
                return Err(CustomizerError::UiContextUnavailable("no activity".into()));
            }
            self.launched.borrow_mut().push(intent.clone());
            Ok(())
        }
    }

    fn picker(files_dir: &Path) -> (PickerBridge<MemoryResolver>, MemoryResolver) {
        let resolver = MemoryResolver::new();
        (
            PickerBridge::new(resolver.clone(), BridgeConfig::default(), files_dir),
            resolver,
        )
    }

    #[test]
    fn pick_launches_png_chooser() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, _) = picker(dir.path());
        let host = RecordingHost {
            launched: RefCell::new(Vec::new()),
            available: true,
        };
        picker.pick_image(&host);
        let launched = host.launched.borrow();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].action, "android.intent.action.OPEN_DOCUMENT");
        assert_eq!(launched[0].mime_type, "image/png");
    }

    #[test]
    fn pick_without_ui_context_does_not_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, _) = picker(dir.path());
        let host = RecordingHost {
            launched: RefCell::new(Vec::new()),
            available: false,
        };
        picker.pick_image(&host);
        assert!(host.launched.borrow().is_empty());
    }

    #[test]
    fn picked_photo_lands_in_cache_and_reaches_sink() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, resolver) = picker(dir.path());
        let uri = "content://media/external/images/42";
        let mut payload = PNG_HEAD.to_vec();
        payload.extend_from_slice(b"rest of the image");
        resolver.add_document(uri, Some("photo.png"), &payload);

        let received = RefCell::new(Vec::new());
        let sink = |path: &Path, bytes: &[u8]| {
            received.borrow_mut().push((path.to_path_buf(), bytes.to_vec()));
        };

        assert!(picker.on_pick_result(&ActivityResult::ok(PICK_IMAGE_REQUEST, uri), &sink));

        let received = received.into_inner();
        assert_eq!(received.len(), 1);
        let (path, bytes) = &received[0];
        assert!(path.is_absolute());
        assert!(path.ends_with("decor/photo.png"));
        assert_eq!(bytes, &payload);
        assert_eq!(
            fs::read(dir.path().join("decor/photo.png")).expect("cache file"),
            payload
        );
    }

    #[test]
    fn unnamed_document_uses_fallback_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, resolver) = picker(dir.path());
        let uri = "content://media/external/images/7";
        resolver.add_document(uri, None, &PNG_HEAD);

        let picked = picker.materialize(&ContentUri::parse(uri)).expect("materialize");
        assert!(picked.path.ends_with("decor/unknown.png"));
    }

    #[test]
    fn display_name_cannot_escape_cache_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, resolver) = picker(dir.path());
        let uri = "content://media/external/images/8";
        resolver.add_document(uri, Some("../../evil.png"), &PNG_HEAD);

        let picked = picker.materialize(&ContentUri::parse(uri)).expect("materialize");
        assert!(picked.path.ends_with("decor/evil.png"));
    }

    #[test]
    fn foreign_or_cancelled_results_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, resolver) = picker(dir.path());
        let uri = "content://media/external/images/1";
        resolver.add_document(uri, Some("a.png"), &PNG_HEAD);
        let calls = RefCell::new(0);
        let sink = |_: &Path, _: &[u8]| *calls.borrow_mut() += 1;

        assert!(!picker.on_pick_result(&ActivityResult::ok(99, uri), &sink));
        let cancelled = ActivityResult {
            request_code: PICK_IMAGE_REQUEST,
            result_code: RESULT_CANCELED,
            data_uri: Some(uri.into()),
        };
        assert!(!picker.on_pick_result(&cancelled, &sink));
        let empty = ActivityResult {
            request_code: PICK_IMAGE_REQUEST,
            result_code: RESULT_OK,
            data_uri: None,
        };
        assert!(!picker.on_pick_result(&empty, &sink));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn unreadable_document_never_reaches_sink() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (picker, _) = picker(dir.path());
        let calls = RefCell::new(0);
        let sink = |_: &Path, _: &[u8]| *calls.borrow_mut() += 1;

        let result = ActivityResult::ok(PICK_IMAGE_REQUEST, "content://media/missing/1");
        assert!(!picker.on_pick_result(&result, &sink));
        assert_eq!(*calls.borrow(), 0);
        assert!(!dir.path().join("decor").exists());
    }

    #[test]
    fn zero_chunk_size_is_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = MemoryResolver::new();
        let config = BridgeConfig {
            copy_chunk_size: 0,
            ..BridgeConfig::default()
        };
        let picker = PickerBridge::new(resolver.clone(), config, dir.path());
        let uri = "content://media/external/images/7";
        resolver.add_document(uri, Some("tiny.png"), &PNG_HEAD);

        let picked = picker
            .materialize(&ContentUri::parse(uri))
            .expect("materialize");
        assert_eq!(picked.bytes, PNG_HEAD);
    }
}
