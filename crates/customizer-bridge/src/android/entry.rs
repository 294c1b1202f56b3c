// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI exports called by `com.ipoleksenko.sense.customizer.MainActivity`, and
// the Rust-side hooks the native layer uses to reach the bridges.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use jni::JNIEnv;
use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jint};
use tracing::{debug, error, warn};

use customizer_core::config::BridgeConfig;
use customizer_core::types::ActivityResult;

use super::{AndroidContentResolver, files_dir, install, uninstall};
use crate::permissions::{PermissionController, PromptChoice};
use crate::picker::PickerBridge;
use crate::provider::ProviderBridge;
use crate::traits::ImageSink;
use crate::{platform_permission_host, platform_picker_host};

/// Bridges bound to the current activity.
struct Session {
    picker: PickerBridge<AndroidContentResolver>,
    provider: ProviderBridge<AndroidContentResolver>,
}

type SharedSink = Arc<dyn ImageSink + Send + Sync>;

static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();
static SESSION: Mutex<Option<Arc<Session>>> = Mutex::new(None);
static SINK: Mutex<Option<SharedSink>> = Mutex::new(None);
static PERMISSIONS: Mutex<PermissionController> = Mutex::new(PermissionController::new());

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn session() -> Option<Arc<Session>> {
    lock(&SESSION).clone()
}

/// Set the bridge configuration. Only the first call before the activity is
/// created has an effect.
pub fn configure(config: BridgeConfig) -> bool {
    CONFIG.set(config.normalized()).is_ok()
}

/// Register the receiver of picked images.
pub fn set_image_sink(sink: impl ImageSink + Send + Sync + 'static) {
    let sink: SharedSink = Arc::new(sink);
    *lock(&SINK) = Some(sink);
}

/// Run `f` against the provider bridge of the current activity.
pub fn with_provider<T>(f: impl FnOnce(&ProviderBridge<AndroidContentResolver>) -> T) -> Option<T> {
    match session() {
        Some(session) => Some(f(&session.provider)),
        None => {
            warn!("provider bridge used before activity creation");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnCreate(
    mut env: JNIEnv,
    activity: JObject,
) {
    if let Err(e) = install(&mut env, &activity) {
        error!(error = %e, "cannot bind activity");
        return;
    }

    let config = CONFIG.get().cloned().unwrap_or_default();
    let files = match files_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!(error = %e, "cannot resolve files dir");
            return;
        }
    };
    debug!(files_dir = %files.display(), authority = %config.provider_authority, "activity created");

    *lock(&SESSION) = Some(Arc::new(Session {
        picker: PickerBridge::new(AndroidContentResolver, config.clone(), files),
        provider: ProviderBridge::new(AndroidContentResolver, config),
    }));

    if let Err(e) = lock(&PERMISSIONS).on_create(platform_permission_host().as_ref()) {
        error!(error = %e, "permission request failed");
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnDestroy(
    _env: JNIEnv,
    _activity: JObject,
) {
    lock(&SESSION).take();
    uninstall();
    debug!("activity destroyed");
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnResume(
    _env: JNIEnv,
    _activity: JObject,
) {
    let step = lock(&PERMISSIONS).on_resume(platform_permission_host().as_ref());
    debug!(?step, "activity resumed");
}

// ---------------------------------------------------------------------------
// Picker
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativePickImage(
    _env: JNIEnv,
    _activity: JObject,
) {
    match session() {
        Some(session) => session.picker.pick_image(platform_picker_host().as_ref()),
        None => warn!("pick requested before activity creation"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnActivityResult(
    mut env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    result_code: jint,
    data_uri: JString,
) {
    let data_uri = if data_uri.is_null() {
        None
    } else {
        match env.get_string(&data_uri) {
            Ok(uri) => Some(String::from(uri)),
            Err(e) => {
                error!(error = %e, "cannot read result URI");
                return;
            }
        }
    };
    let result = ActivityResult {
        request_code,
        result_code,
        data_uri,
    };

    let Some(session) = session() else {
        warn!("activity result before activity creation");
        return;
    };
    let sink = lock(&SINK).clone();
    match sink {
        Some(sink) => {
            session.picker.on_pick_result(&result, sink.as_ref());
        }
        None => {
            let unclaimed = |path: &Path, _: &[u8]| {
                warn!(path = %path.display(), "no image sink registered");
            };
            session.picker.on_pick_result(&result, &unclaimed);
        }
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// `has_results` is `grantResults.length > 0`; `granted` is the first result.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnRequestPermissionsResult(
    _env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    has_results: jboolean,
    granted: jboolean,
) {
    let granted = has_results != 0 && granted != 0;
    match lock(&PERMISSIONS).on_permissions_result(platform_permission_host().as_ref(), request_code, granted) {
        Ok(step) => debug!(?step, "permission result handled"),
        Err(e) => error!(error = %e, "permission flow failed"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ipoleksenko_sense_customizer_MainActivity_nativeOnPermissionPromptChoice(
    _env: JNIEnv,
    _activity: JObject,
    open_settings: jboolean,
) {
    let choice = if open_settings != 0 {
        PromptChoice::OpenSettings
    } else {
        PromptChoice::Exit
    };
    if let Err(e) = lock(&PERMISSIONS).on_prompt_choice(platform_permission_host().as_ref(), choice) {
        error!(error = %e, "cannot open app settings");
    }
}
