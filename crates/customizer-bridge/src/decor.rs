// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decor maintenance on top of the provider bridge: the `decor.cfg` toggle
// file and the queue of user-supplied decor images.

use std::path::{Path, PathBuf};

use customizer_core::cfg::{parse_toggles, update_or_add_line};
use tracing::{debug, info, instrument, warn};

use crate::cfg_file::{load_lines, rewrite_lines};
use crate::provider::ProviderBridge;
use crate::traits::ContentResolver;

/// Toggle file for the built-in decorations.
pub const DECOR_CFG: &str = "decor.cfg";

/// Built-in decorations and whether they are shown by default.
pub const STANDARD_DECOR: [(&str, bool); 8] = [
    ("grass", true),
    ("flower1", true),
    ("flower2", true),
    ("flower3", true),
    ("flower4", true),
    ("smallrock1", true),
    ("smallrock2", true),
    ("smallrock3", true),
];

/// One built-in decoration and its visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorToggle {
    pub name: String,
    pub enabled: bool,
}

impl DecorToggle {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }

    /// [`STANDARD_DECOR`] as toggles.
    pub fn standard() -> Vec<Self> {
        STANDARD_DECOR
            .iter()
            .map(|&(name, enabled)| Self::new(name, enabled))
            .collect()
    }
}

/// Overlay the values stored in `decor.cfg` on `defaults`.
///
/// The file is created when missing. Names in the file that are not in
/// `defaults` are ignored.
pub fn load_decor_toggles<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    defaults: &[DecorToggle],
) -> Vec<DecorToggle> {
    let stored = parse_toggles(&load_lines(bridge, DECOR_CFG));

    defaults
        .iter()
        .map(|toggle| DecorToggle {
            name: toggle.name.clone(),
            enabled: stored.get(&toggle.name).copied().unwrap_or(toggle.enabled),
        })
        .collect()
}

/// Write `toggles` into `decor.cfg`, keeping unrelated lines. An unreadable
/// file is left as it is.
pub fn save_decor_toggles<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    toggles: &[DecorToggle],
) -> bool {
    let written = rewrite_lines(bridge, DECOR_CFG, |lines| {
        for toggle in toggles {
            let value = if toggle.enabled { "true" } else { "false" };
            update_or_add_line(lines, &toggle.name, value, false);
        }
    });
    if written {
        info!(entries = toggles.len(), "updated decor file");
    }
    written
}

/// Pending change for a custom decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorOperation {
    #[default]
    None,
    /// Copy `path` into the decor directory as `<name>.png`.
    Add,
    /// Delete the decor file at `path` and drop the entry.
    Remove,
    /// Rename the decor file at `path` to `<name>.png`.
    Rename,
}

/// A user-supplied decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDecor {
    pub name: String,
    pub path: PathBuf,
    pub operation: DecorOperation,
}

impl CustomDecor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, operation: DecorOperation) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            operation,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }
}

/// Tally of one [`apply_custom_decor`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecorReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Entries dropped from the list.
    pub removed: usize,
}

/// Run every pending operation in `list`.
///
/// `decor_dir` is the local directory the decor files end up in; it is used
/// to update `path` after adds and renames. Add and Rename entries are reset
/// to `None` whatever the result; Remove entries leave the list.
#[instrument(skip_all, fields(entries = list.len()))]
pub fn apply_custom_decor<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    decor_dir: &Path,
    list: &mut Vec<CustomDecor>,
) -> DecorReport {
    let mut report = DecorReport::default();

    for decor in list.iter_mut() {
        debug!(
            name = %decor.name,
            path = %decor.path.display(),
            operation = ?decor.operation,
            "custom decor"
        );

        let ok = match decor.operation {
            DecorOperation::None => continue,
            DecorOperation::Add => {
                let target = decor.file_name();
                let ok = bridge.copy_file(&decor.path, &target);
                if ok {
                    decor.path = decor_dir.join(&target);
                    info!(name = %decor.name, "added custom decor");
                }
                decor.operation = DecorOperation::None;
                ok
            }
            DecorOperation::Remove => {
                let ok = bridge.delete_decor_file(&decor.path.to_string_lossy());
                if ok {
                    info!(path = %decor.path.display(), "removed custom decor");
                } else {
                    warn!(path = %decor.path.display(), "failed to delete custom decor");
                }
                ok
            }
            DecorOperation::Rename => {
                let target = decor.file_name();
                let ok = bridge.rename_decor_file(&decor.path.to_string_lossy(), &target);
                if ok {
                    decor.path = decor_dir.join(&target);
                    info!(name = %decor.name, "renamed custom decor");
                } else {
                    warn!(name = %decor.name, "failed to rename custom decor");
                }
                decor.operation = DecorOperation::None;
                ok
            }
        };

        if ok {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
    }

    let before = list.len();
    list.retain(|decor| decor.operation != DecorOperation::Remove);
    report.removed = before - list.len();
    if report.removed > 0 {
        info!(removed = report.removed, left = list.len(), "dropped removed decorations");
    }

    report
}

#[cfg(test)]
mod tests {
    use std::fs;

    use customizer_core::config::BridgeConfig;

    use super::*;
    use crate::memory::MemoryResolver;

    fn bridge() -> (ProviderBridge<MemoryResolver>, MemoryResolver) {
        let resolver = MemoryResolver::new();
        (
            ProviderBridge::new(resolver.clone(), BridgeConfig::default()),
            resolver,
        )
    }

    #[test]
    fn load_creates_missing_file_and_keeps_defaults() {
        let (bridge, resolver) = bridge();
        let toggles = load_decor_toggles(&bridge, &DecorToggle::standard());
        assert_eq!(toggles.len(), STANDARD_DECOR.len());
        assert!(toggles.iter().all(|t| t.enabled));
        assert_eq!(resolver.record(DECOR_CFG), Some(Vec::new()));
    }

    #[test]
    fn load_overlays_stored_values() {
        let (bridge, _) = bridge();
        bridge.create_file(DECOR_CFG);
        assert!(bridge.write_text_file(DECOR_CFG, &["grass=false", "unknown=true"]));

        let toggles = load_decor_toggles(&bridge, &DecorToggle::standard());
        assert_eq!(toggles[0], DecorToggle::new("grass", false));
        assert!(toggles[1].enabled);
        assert!(toggles.iter().all(|t| t.name != "unknown"));
    }

    #[test]
    fn save_rewrites_in_place_and_keeps_other_lines() {
        let (bridge, _) = bridge();
        bridge.create_file(DECOR_CFG);
        assert!(bridge.write_text_file(DECOR_CFG, &["# decor", "grass=true", "mine=true"]));

        let toggles = vec![DecorToggle::new("grass", false), DecorToggle::new("flower1", true)];
        assert!(save_decor_toggles(&bridge, &toggles));

        assert_eq!(
            bridge.read_full_text(DECOR_CFG),
            "# decor\ngrass=false\nmine=true\nflower1=true\n"
        );
    }

    #[test]
    fn save_keeps_lines_around_invalid_utf8() {
        let (bridge, resolver) = bridge();
        resolver.put_record(DECOR_CFG, b"mine=true\n# caf\xe9\ngrass=true\n");

        assert!(save_decor_toggles(&bridge, &[DecorToggle::new("grass", false)]));
        assert_eq!(
            bridge.read_full_text(DECOR_CFG),
            "mine=true\n# caf\u{fffd}\ngrass=false\n"
        );
    }

    #[test]
    fn save_leaves_unreadable_file_alone() {
        let (bridge, resolver) = bridge();
        resolver.put_record(DECOR_CFG, b"mine=true\ngrass=true\n");
        resolver.fail_reads();

        assert!(!save_decor_toggles(&bridge, &[DecorToggle::new("grass", false)]));
        assert_eq!(resolver.record(DECOR_CFG), Some(b"mine=true\ngrass=true\n".to_vec()));
    }

    #[test]
    fn add_copies_and_resets_operation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("upload.png");
        fs::write(&source, b"png").expect("write source");
        let (bridge, resolver) = bridge();

        let mut list = vec![CustomDecor::new("tree", &source, DecorOperation::Add)];
        let report = apply_custom_decor(&bridge, Path::new("/game/decor"), &mut list);

        assert_eq!(report, DecorReport { succeeded: 1, failed: 0, removed: 0 });
        assert_eq!(resolver.record("decor/tree.png"), Some(b"png".to_vec()));
        assert_eq!(list[0].operation, DecorOperation::None);
        assert_eq!(list[0].path, Path::new("/game/decor/tree.png"));
    }

    #[test]
    fn failed_add_still_resets_operation() {
        let (bridge, _) = bridge();
        let mut list = vec![CustomDecor::new("ghost", "/nope/ghost.png", DecorOperation::Add)];
        let report = apply_custom_decor(&bridge, Path::new("/game/decor"), &mut list);

        assert_eq!(report.failed, 1);
        assert_eq!(list[0].operation, DecorOperation::None);
        assert_eq!(list[0].path, Path::new("/nope/ghost.png"));
    }

    #[test]
    fn remove_drops_entry_even_when_delete_fails() {
        let (bridge, resolver) = bridge();
        bridge.create_file("decor/rock.png");

        let mut list = vec![
            CustomDecor::new("rock", "/game/decor/rock.png", DecorOperation::Remove),
            CustomDecor::new("gone", "/game/decor/gone.png", DecorOperation::Remove),
            CustomDecor::new("keep", "/game/decor/keep.png", DecorOperation::None),
        ];
        let report = apply_custom_decor(&bridge, Path::new("/game/decor"), &mut list);

        assert_eq!(report, DecorReport { succeeded: 1, failed: 1, removed: 2 });
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "keep");
        assert!(resolver.record("decor/rock.png").is_none());
    }

    #[test]
    fn rename_updates_path() {
        let (bridge, resolver) = bridge();
        bridge.create_file("decor/old.png");

        let mut list = vec![CustomDecor::new("new", "/game/decor/old.png", DecorOperation::Rename)];
        let report = apply_custom_decor(&bridge, Path::new("/game/decor"), &mut list);

        assert_eq!(report.succeeded, 1);
        assert_eq!(list[0].path, Path::new("/game/decor/new.png"));
        assert_eq!(list[0].operation, DecorOperation::None);
        assert_eq!(resolver.record_names(), vec!["decor/new.png".to_owned()]);
    }
}
