// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load and rewrite steps shared by the game's `key=value` files.

use customizer_core::outcome::Outcome;
use customizer_core::types::AssetPath;
use tracing::{info, warn};

use crate::decor::{DecorToggle, save_decor_toggles};
use crate::font::{FontSettings, save_font_settings};
use crate::localization::{LocalizedText, save_localization};
use crate::provider::ProviderBridge;
use crate::traits::ContentResolver;

/// Lines of `file`, creating the record first when the provider does not
/// list it. Empty when the file cannot be read.
pub fn load_lines<R: ContentResolver>(bridge: &ProviderBridge<R>, file: &str) -> Vec<String> {
    if !bridge.exists(file) {
        bridge.create_file(file);
    }
    bridge
        .read_full_text(file)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Read `file`, let `update` edit its lines and write them back.
///
/// A missing file starts out empty. Any other read failure leaves the file
/// untouched and returns `false`.
pub fn rewrite_lines<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    file: &str,
    update: impl FnOnce(&mut Vec<String>),
) -> bool {
    let read = bridge.try_read_full_text(&AssetPath::new(file));
    let text = match (Outcome::of(&read), read) {
        (_, Ok(text)) => text,
        (Outcome::NotFound, Err(_)) => String::new(),
        (outcome, Err(err)) => {
            warn!(file, outcome = outcome.label(), error = %err, "config not rewritten");
            return false;
        }
    };

    let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
    update(&mut lines);
    bridge.write_text_file(file, &lines)
}

/// Write every config file the game keeps. Each file is attempted even
/// when an earlier one fails.
pub fn update_all_config_files<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    texts: &[LocalizedText],
    font: &FontSettings,
    decor: &[DecorToggle],
) -> bool {
    let localization = save_localization(bridge, texts);
    let font = save_font_settings(bridge, font);
    let decor = save_decor_toggles(bridge, decor);

    let all = localization && font && decor;
    if all {
        info!("all config files updated");
    } else {
        warn!(localization, font, decor, "some config files were not updated");
    }
    all
}
