// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Media read permission flow.
//
// The controller owns the prompt state instead of a shared dialog handle:
// request at startup, ask again after a plain denial, and after a definitive
// refusal show a modal that leads to system settings or exits the app.

use customizer_core::error::Result;
use tracing::{debug, info, warn};

use crate::traits::PermissionHost;

/// Request code used for the media permission request.
pub const REQUEST_CODE_PERMISSIONS: i32 = 100;

/// The media read permission required on a given Android release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPermission {
    /// Android 14+ partial photo access.
    ReadMediaVisualUserSelected,
    /// Android 13.
    ReadMediaImages,
    /// Android 6 to 12.
    ReadExternalStorage,
}

impl MediaPermission {
    /// Permission to request on `sdk`, `None` below API 23 (install-time
    /// permissions).
    pub fn for_sdk(sdk: u32) -> Option<Self> {
        match sdk {
            34.. => Some(Self::ReadMediaVisualUserSelected),
            33 => Some(Self::ReadMediaImages),
            23..=32 => Some(Self::ReadExternalStorage),
            _ => None,
        }
    }

    /// Manifest permission string.
    pub fn as_android_name(self) -> &'static str {
        match self {
            Self::ReadMediaVisualUserSelected => {
                "android.permission.READ_MEDIA_VISUAL_USER_SELECTED"
            }
            Self::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
            Self::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }
}

/// Visibility of the "go to settings" modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptState {
    #[default]
    Hidden,
    Showing,
}

/// What the controller did in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStep {
    /// The permission was already held (or is not needed on this release).
    Granted,
    /// A permission request was issued.
    Requested,
    /// The settings modal is now (or still) visible.
    SettingsPrompt,
    /// The event did not concern this controller.
    Ignored,
}

/// Button pressed on the settings modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    OpenSettings,
    Exit,
}

/// Drives the permission flow for one activity instance.
#[derive(Debug, Default)]
pub struct PermissionController {
    prompt: PromptState,
}

impl PermissionController {
    pub const fn new() -> Self {
        Self {
            prompt: PromptState::Hidden,
        }
    }

    pub fn prompt(&self) -> PromptState {
        self.prompt
    }

    /// Whether the host holds the permission its release requires.
    pub fn has_required(&self, host: &dyn PermissionHost) -> bool {
        match MediaPermission::for_sdk(host.sdk_int()) {
            Some(permission) => host.has_permission(permission),
            None => true,
        }
    }

    /// Activity created: request the permission when it is missing.
    pub fn on_create(&mut self, host: &dyn PermissionHost) -> Result<PermissionStep> {
        if self.has_required(host) {
            debug!("permissions already granted");
            return Ok(PermissionStep::Granted);
        }
        debug!("no permissions, requesting");
        self.request(host)
    }

    /// `onRequestPermissionsResult` for the first requested permission.
    pub fn on_permissions_result(
        &mut self,
        host: &dyn PermissionHost,
        request_code: i32,
        granted: bool,
    ) -> Result<PermissionStep> {
        if request_code != REQUEST_CODE_PERMISSIONS {
            return Ok(PermissionStep::Ignored);
        }

        if granted {
            info!("permission granted");
            self.dismiss(host);
            return Ok(PermissionStep::Granted);
        }

        let Some(permission) = MediaPermission::for_sdk(host.sdk_int()) else {
            return Ok(PermissionStep::Granted);
        };

        if host.should_show_rationale(permission) {
            warn!("user denied, requesting again");
            self.request(host)
        } else {
            warn!("user selected don't ask again");
            self.show_prompt(host)?;
            Ok(PermissionStep::SettingsPrompt)
        }
    }

    /// Activity resumed: close the modal once the permission has been
    /// granted from system settings.
    pub fn on_resume(&mut self, host: &dyn PermissionHost) -> PermissionStep {
        if self.has_required(host) {
            self.dismiss(host);
            info!("permissions confirmed after returning");
            PermissionStep::Granted
        } else if self.prompt == PromptState::Showing {
            PermissionStep::SettingsPrompt
        } else {
            PermissionStep::Ignored
        }
    }

    /// Handle a button press on the settings modal.
    pub fn on_prompt_choice(&mut self, host: &dyn PermissionHost, choice: PromptChoice) -> Result<()> {
        match choice {
            // The modal is not cancelable and stays up until the permission
            // is confirmed in `on_resume`.
            PromptChoice::OpenSettings => host.open_app_settings(),
            PromptChoice::Exit => {
                self.prompt = PromptState::Hidden;
                host.finish_app();
                Ok(())
            }
        }
    }

    fn request(&mut self, host: &dyn PermissionHost) -> Result<PermissionStep> {
        match MediaPermission::for_sdk(host.sdk_int()) {
            Some(permission) => {
                host.request_permission(permission, REQUEST_CODE_PERMISSIONS)?;
                Ok(PermissionStep::Requested)
            }
            None => Ok(PermissionStep::Granted),
        }
    }

    fn show_prompt(&mut self, host: &dyn PermissionHost) -> Result<()> {
        if self.prompt == PromptState::Showing {
            return Ok(());
        }
        host.show_settings_prompt()?;
        self.prompt = PromptState::Showing;
        Ok(())
    }

    fn dismiss(&mut self, host: &dyn PermissionHost) {
        if self.prompt == PromptState::Showing {
            host.dismiss_settings_prompt();
            self.prompt = PromptState::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    struct FakeHost {
        sdk: u32,
        granted: Cell<bool>,
        rationale: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeHost {
        fn on(sdk: u32) -> Self {
            Self {
                sdk,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }
    }

    impl PermissionHost for FakeHost {
        fn sdk_int(&self) -> u32 {
            self.sdk
        }

        fn has_permission(&self, _permission: MediaPermission) -> bool {
            self.granted.get()
        }

        fn request_permission(&self, permission: MediaPermission, request_code: i32) -> Result<()> {
            self.log(format!("request {} {request_code}", permission.as_android_name()));
            Ok(())
        }

        fn should_show_rationale(&self, _permission: MediaPermission) -> bool {
            self.rationale
        }

        fn show_settings_prompt(&self) -> Result<()> {
            self.log("show");
            Ok(())
        }

        fn dismiss_settings_prompt(&self) {
            self.log("dismiss");
        }

        fn open_app_settings(&self) -> Result<()> {
            self.log("settings");
            Ok(())
        }

        fn finish_app(&self) {
            self.log("finish");
        }
    }

    #[test]
    fn permission_by_release() {
        assert_eq!(
            MediaPermission::for_sdk(35),
            Some(MediaPermission::ReadMediaVisualUserSelected)
        );
        assert_eq!(MediaPermission::for_sdk(33), Some(MediaPermission::ReadMediaImages));
        assert_eq!(MediaPermission::for_sdk(23), Some(MediaPermission::ReadExternalStorage));
        assert_eq!(MediaPermission::for_sdk(21), None);
    }

    #[test]
    fn startup_requests_missing_permission() {
        let host = FakeHost::on(33);
        let mut controller = PermissionController::new();
        assert_eq!(controller.on_create(&host).expect("create"), PermissionStep::Requested);
        assert_eq!(
            host.calls(),
            vec!["request android.permission.READ_MEDIA_IMAGES 100".to_owned()]
        );
    }

    #[test]
    fn old_releases_need_nothing() {
        let host = FakeHost::on(22);
        let mut controller = PermissionController::new();
        assert_eq!(controller.on_create(&host).expect("create"), PermissionStep::Granted);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn plain_denial_requests_again() {
        let host = FakeHost {
            rationale: true,
            ..FakeHost::on(30)
        };
        let mut controller = PermissionController::new();
        let step = controller
            .on_permissions_result(&host, REQUEST_CODE_PERMISSIONS, false)
            .expect("result");
        assert_eq!(step, PermissionStep::Requested);
        assert_eq!(controller.prompt(), PromptState::Hidden);
    }

    #[test]
    fn definitive_refusal_shows_prompt_once() {
        let host = FakeHost::on(34);
        let mut controller = PermissionController::new();
        for _ in 0..2 {
            let step = controller
                .on_permissions_result(&host, REQUEST_CODE_PERMISSIONS, false)
                .expect("result");
            assert_eq!(step, PermissionStep::SettingsPrompt);
        }
        assert_eq!(host.calls(), vec!["show".to_owned()]);
        assert_eq!(controller.prompt(), PromptState::Showing);
    }

    #[test]
    fn resume_after_settings_dismisses_prompt() {
        let host = FakeHost::on(34);
        let mut controller = PermissionController::new();
        controller
            .on_permissions_result(&host, REQUEST_CODE_PERMISSIONS, false)
            .expect("result");
        controller
            .on_prompt_choice(&host, PromptChoice::OpenSettings)
            .expect("choice");
        assert_eq!(controller.on_resume(&host), PermissionStep::SettingsPrompt);

        host.granted.set(true);
        assert_eq!(controller.on_resume(&host), PermissionStep::Granted);
        assert_eq!(controller.prompt(), PromptState::Hidden);
        assert_eq!(host.calls(), vec!["show", "settings", "dismiss"]);
    }

    #[test]
    fn exit_finishes_app() {
        let host = FakeHost::on(34);
        let mut controller = PermissionController::new();
        controller
            .on_permissions_result(&host, REQUEST_CODE_PERMISSIONS, false)
            .expect("result");
        controller.on_prompt_choice(&host, PromptChoice::Exit).expect("choice");
        assert_eq!(host.calls(), vec!["show", "finish"]);
    }

    #[test]
    fn foreign_request_code_is_ignored() {
        let host = FakeHost::on(34);
        let mut controller = PermissionController::new();
        let step = controller.on_permissions_result(&host, 7, false).expect("result");
        assert_eq!(step, PermissionStep::Ignored);
        assert!(host.calls().is_empty());
    }
}
