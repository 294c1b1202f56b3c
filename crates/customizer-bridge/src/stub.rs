// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub hosts for desktop/CI builds where there is no activity.
//
// Launching a chooser or a permission request returns `PlatformUnavailable`;
// queries report that nothing is needed.

use customizer_core::error::{CustomizerError, Result};
use customizer_core::types::ChooserIntent;

use crate::permissions::MediaPermission;
use crate::traits::{PermissionHost, PickerHost};

/// Host returned on non-Android platforms.
pub struct StubHost;

impl PickerHost for StubHost {
    fn launch_chooser(&self, _intent: &ChooserIntent) -> Result<()> {
        tracing::warn!("PickerHost::launch_chooser called on stub host");
        Err(CustomizerError::PlatformUnavailable)
    }
}

impl PermissionHost for StubHost {
    /// Reported as 0 so that no runtime permission is ever required.
    fn sdk_int(&self) -> u32 {
        0
    }

    fn has_permission(&self, _permission: MediaPermission) -> bool {
        true
    }

    fn request_permission(&self, _permission: MediaPermission, _request_code: i32) -> Result<()> {
        tracing::warn!("PermissionHost::request_permission called on stub host");
        Err(CustomizerError::PlatformUnavailable)
    }

    fn should_show_rationale(&self, _permission: MediaPermission) -> bool {
        false
    }

    fn show_settings_prompt(&self) -> Result<()> {
        Err(CustomizerError::PlatformUnavailable)
    }

    fn dismiss_settings_prompt(&self) {}

    fn open_app_settings(&self) -> Result<()> {
        Err(CustomizerError::PlatformUnavailable)
    }

    fn finish_app(&self) {
        tracing::warn!("PermissionHost::finish_app called on stub host");
    }
}
