// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `font.cfg`: custom font path and text sizes.

use std::path::{Path, PathBuf};

use customizer_core::cfg::{extract_quoted_value, extract_value, unescape, update_or_add_line};
use tracing::{info, warn};

use crate::cfg_file::{load_lines, rewrite_lines};
use crate::provider::ProviderBridge;
use crate::traits::ContentResolver;

pub const FONT_CFG: &str = "font.cfg";

const FONT_KEY: &str = "FONT";
const FONT_SIZE_KEY: &str = "FONT_SIZE";
const OTHER_TEXT_FONT_SIZE_KEY: &str = "OTHER_TEXT_FONT_SIZE";

/// Font settings. An empty `font` means the bundled font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSettings {
    pub font: String,
    pub font_size: u32,
    pub other_text_font_size: u32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            font: String::new(),
            font_size: 24,
            other_text_font_size: 48,
        }
    }
}

/// Overlay the values in `font.cfg` on `defaults`, creating the file when
/// missing. Empty paths and sizes that are not positive integers keep the
/// default.
pub fn load_font_settings<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    defaults: &FontSettings,
) -> FontSettings {
    let mut settings = defaults.clone();

    for line in load_lines(bridge, FONT_CFG) {
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        match extract_value(key) {
            FONT_KEY => {
                let font = unescape(&extract_quoted_value(raw));
                if !font.is_empty() {
                    info!(font = %font, "using custom font");
                    settings.font = font;
                }
            }
            FONT_SIZE_KEY => {
                if let Some(size) = parse_size(raw) {
                    settings.font_size = size;
                }
            }
            OTHER_TEXT_FONT_SIZE_KEY => {
                if let Some(size) = parse_size(raw) {
                    settings.other_text_font_size = size;
                }
            }
            _ => {}
        }
    }

    settings
}

/// Write `settings` into `font.cfg`, keeping unrelated lines.
pub fn save_font_settings<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    settings: &FontSettings,
) -> bool {
    let written = rewrite_lines(bridge, FONT_CFG, |lines| {
        update_or_add_line(lines, FONT_KEY, &settings.font, true);
        update_or_add_line(lines, FONT_SIZE_KEY, &settings.font_size.to_string(), false);
        update_or_add_line(
            lines,
            OTHER_TEXT_FONT_SIZE_KEY,
            &settings.other_text_font_size.to_string(),
            false,
        );
    });
    if written {
        info!("updated font file");
    }
    written
}

/// Local path of the custom font, relative paths taken from `game_dir`.
/// `None` when no font is set or the file does not exist.
pub fn resolve_font_path(font: &str, game_dir: &Path) -> Option<PathBuf> {
    if font.is_empty() {
        return None;
    }
    let path = Path::new(font);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        game_dir.join(path)
    };

    if path.is_file() {
        Some(path)
    } else {
        warn!(path = %path.display(), "custom font file not found");
        None
    }
}

fn parse_size(raw: &str) -> Option<u32> {
    let value = extract_value(raw);
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().filter(|&size| size > 0)
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
    fn missing_file_is_created_with_defaults_kept() {
        let (bridge, resolver) = bridge();
        assert_eq!(
            load_font_settings(&bridge, &FontSettings::default()),
            FontSettings::default()
        );
        assert_eq!(resolver.record(FONT_CFG), Some(Vec::new()));
    }

    #[test]
    fn stored_values_override_defaults() {
        let (bridge, resolver) = bridge();
        resolver.put_record(
            FONT_CFG,
            b"FONT=\"fonts/serif.ttf\"\nFONT_SIZE= 30 \nOTHER_TEXT_FONT_SIZE=\t12\n",
        );
        let settings = load_font_settings(&bridge, &FontSettings::default());
        assert_eq!(settings.font, "fonts/serif.ttf");
        assert_eq!(settings.font_size, 30);
        assert_eq!(settings.other_text_font_size, 12);
    }

    #[test]
    fn bad_sizes_keep_defaults() {
        let (bridge, resolver) = bridge();
        resolver.put_record(FONT_CFG, b"FONT=\nFONT_SIZE=0\nOTHER_TEXT_FONT_SIZE=-3\n");
        assert_eq!(
            load_font_settings(&bridge, &FontSettings::default()),
            FontSettings::default()
        );
    }

    #[test]
    fn save_then_load_keeps_values_and_other_lines() {
        let (bridge, resolver) = bridge();
        resolver.put_record(FONT_CFG, b"# fonts\nFONT_SIZE = 18\n");
        let settings = FontSettings {
            font: r"C:\fonts\mono.ttf".into(),
            font_size: 20,
            other_text_font_size: 40,
        };

        assert!(save_font_settings(&bridge, &settings));
        assert_eq!(
            bridge.read_full_text(FONT_CFG),
            "# fonts\nFONT_SIZE = 20\nFONT=\"C:\\\\fonts\\\\mono.ttf\"\nOTHER_TEXT_FONT_SIZE=40\n"
        );
        assert_eq!(load_font_settings(&bridge, &FontSettings::default()), settings);
    }

    #[test]
    fn relative_font_path_resolves_against_game_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("fonts")).expect("mkdir");
        fs::write(dir.path().join("fonts/serif.ttf"), b"ttf").expect("seed");

        assert_eq!(
            resolve_font_path("fonts/serif.ttf", dir.path()),
            Some(dir.path().join("fonts/serif.ttf"))
        );
        assert_eq!(resolve_font_path("fonts/missing.ttf", dir.path()), None);
        assert_eq!(resolve_font_path("", dir.path()), None);
    }
}
