// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Sense Customizer: Android storage bridges.
//!
//! The picker bridge launches the system image chooser and stages the picked
//! file for the native layer; the provider bridge exposes the decor content
//! provider as a small virtual filesystem. Both talk to the platform only
//! through the traits in [`traits`], so desktop and test builds swap in the
//! directory-backed or in-memory resolver.
//!
//! # Host activity
//!
//! On Android the library is loaded by `com.ipoleksenko.sense.customizer.MainActivity`,
//! which declares these natives and forwards its lifecycle to them:
//!
//! ```java
//! native void nativeOnCreate();
//! native void nativeOnDestroy();
//! native void nativeOnResume();
//! native void nativePickImage();
//! native void nativeOnActivityResult(int requestCode, int resultCode, String dataUri);
//! native void nativeOnRequestPermissionsResult(int requestCode, boolean hasResults, boolean granted);
//! native void nativeOnPermissionPromptChoice(boolean openSettings);
//! ```
//!
//! and provides these instance methods, which the bridge calls back:
//!
//! - `void launchChooser(Intent intent, int requestCode)` posts
//!   `startActivityForResult` to the UI thread. Optional: without it the
//!   chooser is started on the calling thread, so `nativePickImage` must then
//!   be called from the UI thread.
//! - `void showPermissionPrompt()` shows the modal offering to open the app
//!   settings or exit; its buttons report through
//!   `nativeOnPermissionPromptChoice`.
//! - `void dismissPermissionPrompt()` hides it again.

pub mod cfg_file;
pub mod decor;
pub mod font;
pub mod fs_resolver;
pub mod localization;
pub mod memory;
pub mod permissions;
pub mod picker;
pub mod provider;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use picker::PickerBridge;
pub use provider::ProviderBridge;

/// Chooser host for the target operating system.
pub fn platform_picker_host() -> Box<dyn traits::PickerHost> {
    #[cfg(target_os = "android")]
    {
        Box::new(android::AndroidPickerHost)
    }
    #[cfg(not(target_os = "android"))]
    {
        Box::new(stub::StubHost)
    }
}

/// Permission host for the target operating system.
pub fn platform_permission_host() -> Box<dyn traits::PermissionHost> {
    #[cfg(target_os = "android")]
    {
        Box::new(android::AndroidPermissionHost)
    }
    #[cfg(not(target_os = "android"))]
    {
        Box::new(stub::StubHost)
    }
}
