// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android implementations of the bridge traits via JNI.
//
// The activity hands itself over in `nativeOnCreate` (see `entry`); from then
// on every call attaches the current thread to the cached `JavaVM` and runs
// inside a local reference frame, so nothing but Rust values and global
// references escape a call.
//
// The methods the host activity has to provide are listed in the crate docs.

#![cfg(target_os = "android")]

mod entry;
mod streams;

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use customizer_core::error::{CustomizerError, Result};
use customizer_core::types::{ChooserIntent, ContentUri, ContentValues, OpenMode, QueryRows};

use crate::permissions::MediaPermission;
use crate::traits::{ContentResolver, InputStream, OutputStream, PermissionHost, PickerHost};

pub use entry::{configure, set_image_sink, with_provider};
pub use streams::{JavaInputStream, JavaOutputStream};

/// `Intent.FLAG_GRANT_READ_URI_PERMISSION`
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;

/// `Intent.EXTRA_LOCAL_ONLY`
const EXTRA_LOCAL_ONLY: &str = "android.intent.extra.LOCAL_ONLY";

/// `PackageManager.PERMISSION_GRANTED`
const PERMISSION_GRANTED: i32 = 0;

/// `Cursor.FIELD_TYPE_BLOB`
const FIELD_TYPE_BLOB: i32 = 4;

/// Signature shared by `launchChooser` and `startActivityForResult`.
const LAUNCH_SIG: &str = "(Landroid/content/Intent;I)V";

/// Local references a single bridge call may create.
const FRAME_CAPACITY: i32 = 32;

static VM: OnceLock<JavaVM> = OnceLock::new();
static APP_CONTEXT: OnceLock<GlobalRef> = OnceLock::new();
static ACTIVITY: Mutex<Option<GlobalRef>> = Mutex::new(None);

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

fn current_activity() -> MutexGuard<'static, Option<GlobalRef>> {
    ACTIVITY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Remember the VM and the hosting activity.
///
/// The first call also publishes the VM and the application context through
/// `ndk_context` for other crates in the process.
fn install(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<()> {
    let vm = env.get_java_vm().map_err(|e| jni_err(env, "get_java_vm", e))?;
    let vm_ptr = vm.get_java_vm_pointer();
    let _ = VM.set(vm);

    if APP_CONTEXT.get().is_none() {
        let app = call_object(
            env,
            activity,
            "getApplicationContext",
            "()Landroid/content/Context;",
            &[],
        )?;
        let app = env
            .new_global_ref(&app)
            .map_err(|e| jni_err(env, "new_global_ref(app)", e))?;
        let app_ptr = app.as_obj().as_raw();
        if APP_CONTEXT.set(app).is_ok() {
            // SAFETY: the VM pointer is valid for the life of the process and
            // the context is a global reference kept alive by `APP_CONTEXT`.
            unsafe { ndk_context::initialize_android_context(vm_ptr.cast(), app_ptr.cast()) };
        }
    }

    let global = env
        .new_global_ref(activity)
        .map_err(|e| jni_err(env, "new_global_ref(activity)", e))?;
    *current_activity() = Some(global);
    Ok(())
}

/// Forget the activity once it is destroyed.
fn uninstall() {
    current_activity().take();
}

/// Attach the current thread and return its environment.
fn jni_env() -> Result<JNIEnv<'static>> {
    let vm = VM
        .get()
        .ok_or_else(|| CustomizerError::UiContextUnavailable("JavaVM not initialised".into()))?;
    vm.attach_current_thread_permanently()
        .map_err(|e| CustomizerError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// The activity currently hosting the native layer.
fn activity() -> Result<GlobalRef> {
    current_activity()
        .clone()
        .ok_or_else(|| CustomizerError::UiContextUnavailable("no hosting activity".into()))
}

/// Map a JNI failure into `CustomizerError`, clearing and classifying any
/// pending Java exception.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> CustomizerError {
    if !env.exception_check().unwrap_or(false) {
        return CustomizerError::Bridge(format!("{context}: {e}"));
    }

    let throwable = env.exception_occurred();
    let _ = env.exception_clear();
    let Ok(throwable) = throwable else {
        return CustomizerError::Bridge(format!("{context}: {e}"));
    };

    let message = exception_message(env, &throwable).unwrap_or_default();
    let is = |env: &mut JNIEnv<'_>, class: &str| env.is_instance_of(&throwable, class).unwrap_or(false);

    if is(env, "java/io/FileNotFoundException") {
        CustomizerError::NotFound(format!("{context}: {message}"))
    } else if is(env, "java/lang/SecurityException") {
        CustomizerError::PermissionDenied(format!("{context}: {message}"))
    } else {
        CustomizerError::Bridge(format!("{context}: {message}"))
    }
}

fn exception_message(env: &mut JNIEnv<'_>, throwable: &JObject<'_>) -> Option<String> {
    let text = env
        .call_method(throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let _ = env.exception_clear();
    read_string(env, text).ok()
}

/// Error type for `with_local_frame`, which needs `From<jni::errors::Error>`.
struct FrameError(CustomizerError);

impl From<jni::errors::Error> for FrameError {
    fn from(e: jni::errors::Error) -> Self {
        Self(CustomizerError::Bridge(format!("local frame: {e}")))
    }
}

/// Run `f` with a fresh attached environment inside a local frame.
fn with_env<T>(f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
    let mut env = jni_env()?;
    env.with_local_frame(FRAME_CAPACITY, |env| f(env).map_err(FrameError))
        .map_err(|FrameError(e)| e)
}

// ---------------------------------------------------------------------------
// Call helpers
// ---------------------------------------------------------------------------

fn call_object<'l>(
    env: &mut JNIEnv<'l>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<JObject<'l>> {
    let value = env
        .call_method(obj, name, sig, args)
        .map_err(|e| jni_err(env, name, e))?;
    value.l().map_err(|e| jni_err(env, name, e))
}

fn call_int(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<i32> {
    let value = env
        .call_method(obj, name, sig, args)
        .map_err(|e| jni_err(env, name, e))?;
    value.i().map_err(|e| jni_err(env, name, e))
}

fn call_bool(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<bool> {
    let value = env
        .call_method(obj, name, sig, args)
        .map_err(|e| jni_err(env, name, e))?;
    value.z().map_err(|e| jni_err(env, name, e))
}

fn call_void(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<()> {
    env.call_method(obj, name, sig, args)
        .map_err(|e| jni_err(env, name, e))?;
    Ok(())
}

fn new_string<'l>(env: &mut JNIEnv<'l>, value: &str) -> Result<JString<'l>> {
    env.new_string(value)
        .map_err(|e| jni_err(env, "new_string", e))
}

fn read_string(env: &mut JNIEnv<'_>, value: JObject<'_>) -> Result<String> {
    let value = JString::from(value);
    let text: String = env
        .get_string(&value)
        .map_err(|e| jni_err(env, "get_string", e))?
        .into();
    let _ = env.delete_local_ref(value);
    Ok(text)
}

/// `Uri.parse(uri)`
fn parse_uri<'l>(env: &mut JNIEnv<'l>, uri: &ContentUri) -> Result<JObject<'l>> {
    let j_uri = new_string(env, uri.as_str())?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .and_then(|value| value.l())
    .map_err(|e| jni_err(env, "Uri.parse", e))
}

/// `activity.getContentResolver()`
fn content_resolver<'l>(env: &mut JNIEnv<'l>) -> Result<JObject<'l>> {
    let activity = activity()?;
    call_object(
        env,
        activity.as_obj(),
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )
}

fn content_values<'l>(env: &mut JNIEnv<'l>, values: &ContentValues) -> Result<JObject<'l>> {
    let object = env
        .new_object("android/content/ContentValues", "()V", &[])
        .map_err(|e| jni_err(env, "new ContentValues", e))?;
    for (column, value) in values.iter() {
        let j_column = new_string(env, column)?;
        let j_value = new_string(env, value)?;
        call_void(
            env,
            &object,
            "put",
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[JValue::Object(&j_column), JValue::Object(&j_value)],
        )?;
    }
    Ok(object)
}

/// `activity.getFilesDir().getAbsolutePath()`
pub fn files_dir() -> Result<PathBuf> {
    with_env(|env| {
        let activity = activity()?;
        let dir = call_object(env, activity.as_obj(), "getFilesDir", "()Ljava/io/File;", &[])?;
        let path = call_object(env, &dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?;
        Ok(PathBuf::from(read_string(env, path)?))
    })
}

// ---------------------------------------------------------------------------
// ContentResolver: android.content.ContentResolver
// ---------------------------------------------------------------------------

/// Forwards every call to the activity's `ContentResolver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidContentResolver;

impl ContentResolver for AndroidContentResolver {
    fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<Option<ContentUri>> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let j_values = content_values(env, values)?;
            let row = call_object(
                env,
                &resolver,
                "insert",
                "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
                &[JValue::Object(&j_uri), JValue::Object(&j_values)],
            )?;
            if row.is_null() {
                return Ok(None);
            }
            let text = call_object(env, &row, "toString", "()Ljava/lang/String;", &[])?;
            Ok(Some(ContentUri::parse(read_string(env, text)?)))
        })
    }

    fn query(&self, uri: &ContentUri) -> Result<Option<QueryRows>> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let null = JObject::null();
            let cursor = call_object(
                env,
                &resolver,
                "query",
                "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                &[
                    JValue::Object(&j_uri),
                    JValue::Object(&null),
                    JValue::Object(&null),
                    JValue::Object(&null),
                    JValue::Object(&null),
                ],
            )?;
            if cursor.is_null() {
                return Ok(None);
            }

            let rows = read_cursor(env, &cursor);
            call_void(env, &cursor, "close", "()V", &[])?;
            rows.map(Some)
        })
    }

    fn update(&self, uri: &ContentUri, values: &ContentValues) -> Result<usize> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let j_values = content_values(env, values)?;
            let null = JObject::null();
            let rows = call_int(
                env,
                &resolver,
                "update",
                "(Landroid/net/Uri;Landroid/content/ContentValues;Ljava/lang/String;[Ljava/lang/String;)I",
                &[
                    JValue::Object(&j_uri),
                    JValue::Object(&j_values),
                    JValue::Object(&null),
                    JValue::Object(&null),
                ],
            )?;
            Ok(usize::try_from(rows).unwrap_or(0))
        })
    }

    fn delete(&self, uri: &ContentUri) -> Result<usize> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let null = JObject::null();
            let rows = call_int(
                env,
                &resolver,
                "delete",
                "(Landroid/net/Uri;Ljava/lang/String;[Ljava/lang/String;)I",
                &[
                    JValue::Object(&j_uri),
                    JValue::Object(&null),
                    JValue::Object(&null),
                ],
            )?;
            Ok(usize::try_from(rows).unwrap_or(0))
        })
    }

    fn open_input(&self, uri: &ContentUri) -> Result<Option<InputStream>> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let stream = call_object(
                env,
                &resolver,
                "openInputStream",
                "(Landroid/net/Uri;)Ljava/io/InputStream;",
                &[JValue::Object(&j_uri)],
            )?;
            if stream.is_null() {
                return Ok(None);
            }
            let global = env
                .new_global_ref(&stream)
                .map_err(|e| jni_err(env, "new_global_ref(input)", e))?;
            Ok(Some(Box::new(JavaInputStream::new(global)) as InputStream))
        })
    }

    fn open_output(&self, uri: &ContentUri, mode: OpenMode) -> Result<Option<OutputStream>> {
        with_env(|env| {
            let resolver = content_resolver(env)?;
            let j_uri = parse_uri(env, uri)?;
            let j_mode = new_string(env, mode.as_str())?;
            let stream = call_object(
                env,
                &resolver,
                "openOutputStream",
                "(Landroid/net/Uri;Ljava/lang/String;)Ljava/io/OutputStream;",
                &[JValue::Object(&j_uri), JValue::Object(&j_mode)],
            )?;
            if stream.is_null() {
                return Ok(None);
            }
            let global = env
                .new_global_ref(&stream)
                .map_err(|e| jni_err(env, "new_global_ref(output)", e))?;
            Ok(Some(Box::new(JavaOutputStream::new(global)) as OutputStream))
        })
    }
}

/// Copy every row of `cursor` into `QueryRows`. Blob cells read as `None`.
fn read_cursor(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> Result<QueryRows> {
    let names = call_object(env, cursor, "getColumnNames", "()[Ljava/lang/String;", &[])?;
    let names = jni::objects::JObjectArray::from(names);
    let count = env
        .get_array_length(&names)
        .map_err(|e| jni_err(env, "get_array_length", e))?;

    let mut columns = Vec::with_capacity(count as usize);
    for index in 0..count {
        let name = env
            .get_object_array_element(&names, index)
            .map_err(|e| jni_err(env, "get_object_array_element", e))?;
        columns.push(read_string(env, name)?);
    }
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut rows = QueryRows::new(&column_refs);

    while call_bool(env, cursor, "moveToNext", "()Z", &[])? {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..count {
            let kind = call_int(env, cursor, "getType", "(I)I", &[JValue::Int(index)])?;
            if kind == FIELD_TYPE_BLOB {
                cells.push(None);
                continue;
            }
            let value = call_object(
                env,
                cursor,
                "getString",
                "(I)Ljava/lang/String;",
                &[JValue::Int(index)],
            )?;
            let cell = if value.is_null() {
                None
            } else {
                Some(read_string(env, value)?)
            };
            cells.push(cell);
        }
        rows.push_row(cells);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// PickerHost: Intent ACTION_OPEN_DOCUMENT
// ---------------------------------------------------------------------------

/// Starts the chooser from the hosting activity.
pub struct AndroidPickerHost;

impl PickerHost for AndroidPickerHost {
    fn launch_chooser(&self, intent: &ChooserIntent) -> Result<()> {
        with_env(|env| {
            let activity = activity()?;

            let j_action = new_string(env, intent.action)?;
            let j_intent = env
                .new_object(
                    "android/content/Intent",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_action)],
                )
                .map_err(|e| jni_err(env, "new Intent", e))?;

            let j_category = new_string(env, intent.category)?;
            call_object(
                env,
                &j_intent,
                "addCategory",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_category)],
            )?;

            let j_mime = new_string(env, &intent.mime_type)?;
            call_object(
                env,
                &j_intent,
                "setType",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_mime)],
            )?;

            let j_extra = new_string(env, EXTRA_LOCAL_ONLY)?;
            call_object(
                env,
                &j_intent,
                "putExtra",
                "(Ljava/lang/String;Z)Landroid/content/Intent;",
                &[JValue::Object(&j_extra), JValue::Bool(u8::from(intent.local_only))],
            )?;

            if intent.grant_read {
                call_object(
                    env,
                    &j_intent,
                    "addFlags",
                    "(I)Landroid/content/Intent;",
                    &[JValue::Int(FLAG_GRANT_READ_URI_PERMISSION)],
                )?;
            }

            // Prefer the activity's UI-thread launcher when it has one.
            let class = env
                .get_object_class(activity.as_obj())
                .map_err(|e| jni_err(env, "get_object_class", e))?;
            let method = if env.get_method_id(&class, "launchChooser", LAUNCH_SIG).is_ok() {
                "launchChooser"
            } else {
                let _ = env.exception_clear();
                tracing::debug!("activity has no launchChooser, starting directly");
                "startActivityForResult"
            };
            call_void(
                env,
                activity.as_obj(),
                method,
                LAUNCH_SIG,
                &[JValue::Object(&j_intent), JValue::Int(intent.request_code)],
            )
        })
    }
}

// ---------------------------------------------------------------------------
// PermissionHost: runtime permissions and the settings prompt
// ---------------------------------------------------------------------------

/// Runtime permission calls on the hosting activity.
pub struct AndroidPermissionHost;

impl AndroidPermissionHost {
    fn with_activity<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>,
    ) -> Result<T> {
        with_env(|env| {
            let activity = activity()?;
            f(env, activity.as_obj())
        })
    }
}

impl PermissionHost for AndroidPermissionHost {
    fn sdk_int(&self) -> u32 {
        let sdk = with_env(|env| {
            env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
                .and_then(|value| value.i())
                .map_err(|e| jni_err(env, "Build.VERSION.SDK_INT", e))
        });
        match sdk {
            Ok(sdk) => u32::try_from(sdk).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read SDK level");
                0
            }
        }
    }

    fn has_permission(&self, permission: MediaPermission) -> bool {
        let status = self.with_activity(|env, activity| {
            let j_permission = new_string(env, permission.as_android_name())?;
            call_int(
                env,
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&j_permission)],
            )
        });
        match status {
            Ok(status) => status == PERMISSION_GRANTED,
            Err(e) => {
                tracing::warn!(error = %e, "permission check failed");
                false
            }
        }
    }

    fn request_permission(&self, permission: MediaPermission, request_code: i32) -> Result<()> {
        self.with_activity(|env, activity| {
            let j_permission = new_string(env, permission.as_android_name())?;
            let array = env
                .new_object_array(1, "java/lang/String", &j_permission)
                .map_err(|e| jni_err(env, "new_object_array", e))?;
            call_void(
                env,
                activity,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&array), JValue::Int(request_code)],
            )
        })
    }

    fn should_show_rationale(&self, permission: MediaPermission) -> bool {
        let show = self.with_activity(|env, activity| {
            let j_permission = new_string(env, permission.as_android_name())?;
            call_bool(
                env,
                activity,
                "shouldShowRequestPermissionRationale",
                "(Ljava/lang/String;)Z",
                &[JValue::Object(&j_permission)],
            )
        });
        match show {
            Ok(show) => show,
            Err(e) => {
                tracing::warn!(error = %e, "rationale check failed");
                false
            }
        }
    }

    fn show_settings_prompt(&self) -> Result<()> {
        self.with_activity(|env, activity| {
            call_void(env, activity, "showPermissionPrompt", "()V", &[])
        })
    }

    fn dismiss_settings_prompt(&self) {
        let result = self.with_activity(|env, activity| {
            call_void(env, activity, "dismissPermissionPrompt", "()V", &[])
        });
        if let Err(e) = result {
            tracing::warn!(error = %e, "cannot dismiss permission prompt");
        }
    }

    fn open_app_settings(&self) -> Result<()> {
        self.with_activity(|env, activity| {
            let j_action = new_string(env, "android.settings.APPLICATION_DETAILS_SETTINGS")?;
            let j_intent = env
                .new_object(
                    "android/content/Intent",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_action)],
                )
                .map_err(|e| jni_err(env, "new Intent(settings)", e))?;

            let package = call_object(env, activity, "getPackageName", "()Ljava/lang/String;", &[])?;
            let j_scheme = new_string(env, "package")?;
            let null = JObject::null();
            let uri = env
                .call_static_method(
                    "android/net/Uri",
                    "fromParts",
                    "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)Landroid/net/Uri;",
                    &[
                        JValue::Object(&j_scheme),
                        JValue::Object(&package),
                        JValue::Object(&null),
                    ],
                )
                .and_then(|value| value.l())
                .map_err(|e| jni_err(env, "Uri.fromParts", e))?;

            call_object(
                env,
                &j_intent,
                "setData",
                "(Landroid/net/Uri;)Landroid/content/Intent;",
                &[JValue::Object(&uri)],
            )?;
            call_void(
                env,
                activity,
                "startActivity",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&j_intent)],
            )
        })
    }

    fn finish_app(&self) {
        let result = self.with_activity(|env, activity| {
            call_void(env, activity, "finishAffinity", "()V", &[])
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "finishAffinity failed");
        }
    }
}
