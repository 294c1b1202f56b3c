// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic capability traits.
//
// The bridges never talk to Android directly. Storage goes through a
// `ContentResolver`, the chooser through a `PickerHost`, the permission
// prompt through a `PermissionHost`, and picked images leave through an
// `ImageSink`. Android, desktop and test implementations plug in here.

use std::io::{Read, Write};
use std::path::Path;

use customizer_core::error::Result;
use customizer_core::types::{ChooserIntent, ContentUri, ContentValues, OpenMode, QueryRows};

use crate::permissions::MediaPermission;

/// Byte stream opened on a content URI. Closed on drop.
pub type InputStream = Box<dyn Read + Send>;

/// Byte sink opened on a content URI. Flushed and closed on drop.
pub type OutputStream = Box<dyn Write + Send>;

/// The subset of `android.content.ContentResolver` the bridges rely on.
///
/// Every method maps onto exactly one resolver call. `Ok(None)` mirrors a
/// `null` return on the Java side (no row URI, no cursor, no stream).
pub trait ContentResolver: Send + Sync {
    /// Insert a record. Returns the URI of the new row.
    fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<Option<ContentUri>>;

    /// Query with no projection or selection.
    fn query(&self, uri: &ContentUri) -> Result<Option<QueryRows>>;

    /// Update records, returning the number of rows affected.
    fn update(&self, uri: &ContentUri, values: &ContentValues) -> Result<usize>;

    /// Delete records, returning the number of rows affected.
    fn delete(&self, uri: &ContentUri) -> Result<usize>;

    fn open_input(&self, uri: &ContentUri) -> Result<Option<InputStream>>;

    fn open_output(&self, uri: &ContentUri, mode: OpenMode) -> Result<Option<OutputStream>>;
}

/// Starts interactive choosers.
pub trait PickerHost {
    /// Launch the chooser described by `intent`.
    ///
    /// Implementations marshal the launch onto the UI thread. Returns
    /// `UiContextUnavailable` when there is no activity to launch from.
    /// The result arrives later through `PickerBridge::on_pick_result`.
    fn launch_chooser(&self, intent: &ChooserIntent) -> Result<()>;
}

/// Receives successfully picked images on the native side.
pub trait ImageSink {
    /// Called exactly once per successful pick, never on failure.
    fn on_image_picked(&self, path: &Path, bytes: &[u8]);
}

impl<F> ImageSink for F
where
    F: Fn(&Path, &[u8]),
{
    fn on_image_picked(&self, path: &Path, bytes: &[u8]) {
        self(path, bytes)
    }
}

/// Runtime-permission and prompt capabilities of the host activity.
pub trait PermissionHost {
    /// `Build.VERSION.SDK_INT`.
    fn sdk_int(&self) -> u32;

    fn has_permission(&self, permission: MediaPermission) -> bool;

    fn request_permission(&self, permission: MediaPermission, request_code: i32) -> Result<()>;

    /// `shouldShowRequestPermissionRationale`. `false` after the user chose
    /// "don't ask again".
    fn should_show_rationale(&self, permission: MediaPermission) -> bool;

    /// Show the modal that offers "Settings" or "Exit".
    fn show_settings_prompt(&self) -> Result<()>;

    fn dismiss_settings_prompt(&self);

    /// Open the application details page in system settings.
    fn open_app_settings(&self) -> Result<()>;

    /// `finishAffinity()`.
    fn finish_app(&self);
}
