// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `localization.cfg`: replacement texts for the game's captions, stored as
// `KEY="text"` with `\n`, `\"` and `\\` escapes.

use customizer_core::cfg::{extract_quoted_value, extract_value, unescape, update_or_add_line};
use tracing::{debug, info};

use crate::cfg_file::{load_lines, rewrite_lines};
use crate::provider::ProviderBridge;
use crate::traits::ContentResolver;

pub const LOCALIZATION_CFG: &str = "localization.cfg";

const IDLE_TEXT: &str = concat!(
    "Instructions:\n",
    "\n",
    "Keyboard:\n",
    "    • Press A (or the Left Arrow key) and D (or the Right Arrow key) alternately to move.\n",
    "    • Press the Spacebar to enable or disable Endless Mode (only before you start moving).\n",
    "    • Press the Escape key to exit the game.\n",
    "\n",
    "Gamepad:\n",
    "    • Press Left or Right on the Directional Pad (or the X / B buttons) alternately to move.\n",
    "    • Press the A button to enable or disable Endless Mode (only before you start moving).\n",
    "    • Press the Start button to exit the game.\n",
    "\n",
    "Touchscreen:\n",
    "    • Tap the left and right sides of the screen alternately to move.\n",
    "    • Hold two fingers on the screen for two seconds to enable or disable Endless Mode (only before you start moving).\n",
    "\n",
    "• Cross the center mark to begin moving.\n",
    "• After crossing the center, maintain your balance: do not allow the pointer to touch the red zone, or you will lose.\n",
);

/// Caption keys and their built-in texts, in file order.
pub const STANDARD_TEXTS: [(&str, &str); 24] = [
    ("LOADING_TEXT", "Loading..."),
    ("ENDLESS_MODE", "ENDLESS MODE"),
    ("IDLE", IDLE_TEXT),
    ("A_START", "You opened your eyes, but did you see anything new?"),
    ("B_START", "Every day is like the one before, yet you search for differences"),
    ("C_START", "People chase dreams, but who said dreams hold value?"),
    ("D_START", "How many questions have you asked, and how many answers have you received?"),
    ("E_START", "The world moves in circles, but where is its beginning and where is its end?"),
    ("F_START", "You strive to find a purpose, but what is it even for?"),
    ("G_START", "Stones lie on the ground for millennia, yet you live for only a moment."),
    ("H_START", "What matters more: your thoughts or the sound of the wind?"),
    ("I_START", "The history of the world is full of heroes, but no one remembers them."),
    ("J_START", "If something disappears tomorrow, what changes today?"),
    ("K_START", "The sun rises every day, but not for you."),
    ("L_START", "Your heart beats, but who cares?"),
    ("M_START", "Everything you build will one day turn to dust."),
    ("N_START", "You search for truth, but in this world, there is no law of truth."),
    ("O_START", "You search for gods, but there are none."),
    ("P_START", "Joy and pain alternate, but both eventually fade."),
    ("Q_START", "You want to be needed, but by whom?"),
    ("R_START", "The stars shine, but not to show you the way."),
    ("S_START", "Eternity is a word that both frightens and frees."),
    ("T_START", "In this chaos, you seek meaning, but chaos demands no explanation."),
    ("FINAL_START", "THE UNIVERSE DOESN'T MAKE SENSE."),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub key: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }

    /// [`STANDARD_TEXTS`] as entries.
    pub fn standard() -> Vec<Self> {
        STANDARD_TEXTS
            .iter()
            .map(|&(key, text)| Self::new(key, text))
            .collect()
    }
}

/// Overlay the texts in `localization.cfg` on `defaults`, creating the file
/// when missing. Empty values keep the default; unknown keys are ignored.
pub fn load_localization<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    defaults: &[LocalizedText],
) -> Vec<LocalizedText> {
    let mut texts = defaults.to_vec();

    for line in load_lines(bridge, LOCALIZATION_CFG) {
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let value = extract_quoted_value(raw);
        if value.is_empty() {
            continue;
        }
        let key = extract_value(key);
        match texts.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.text = unescape(&value),
            None => debug!(key, "unknown localization key"),
        }
    }

    texts
}

/// Write `texts` into `localization.cfg`, keeping unrelated lines.
pub fn save_localization<R: ContentResolver>(
    bridge: &ProviderBridge<R>,
    texts: &[LocalizedText],
) -> bool {
    let written = rewrite_lines(bridge, LOCALIZATION_CFG, |lines| {
        for entry in texts {
            update_or_add_line(lines, &entry.key, &entry.text, true);
        }
    });
    if written {
        info!(entries = texts.len(), "updated localization file");
    }
    written
}

#[cfg(test)]
mod tests {
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
    fn missing_file_is_created_and_defaults_kept() {
        let (bridge, resolver) = bridge();
        assert_eq!(
            load_localization(&bridge, &LocalizedText::standard()),
            LocalizedText::standard()
        );
        assert_eq!(resolver.record(LOCALIZATION_CFG), Some(Vec::new()));
    }

    #[test]
    fn stored_texts_are_unescaped() {
        let (bridge, resolver) = bridge();
        resolver.put_record(
            LOCALIZATION_CFG,
            b"LOADING_TEXT=\"Chargement\\n...\"\nENDLESS_MODE=\"\"\nNOPE=\"x\"\n",
        );

        let texts = load_localization(&bridge, &LocalizedText::standard());
        assert_eq!(texts[0], LocalizedText::new("LOADING_TEXT", "Chargement\n..."));
        assert_eq!(texts[1].text, "ENDLESS MODE");
        assert_eq!(texts.len(), STANDARD_TEXTS.len());
    }

    #[test]
    fn multi_line_text_round_trips() {
        let (bridge, _) = bridge();
        assert!(save_localization(&bridge, &LocalizedText::standard()));
        assert_eq!(bridge.read_full_text(LOCALIZATION_CFG).lines().count(), STANDARD_TEXTS.len());

        let loaded = load_localization(&bridge, &LocalizedText::standard());
        assert_eq!(loaded, LocalizedText::standard());

        assert!(save_localization(&bridge, &loaded));
        assert_eq!(load_localization(&bridge, &loaded), loaded);
    }

    #[test]
    fn save_keeps_comments_and_rewrites_in_place() {
        let (bridge, resolver) = bridge();
        resolver.put_record(LOCALIZATION_CFG, b"# captions\nENDLESS_MODE = \"old\"\n");

        let texts = vec![LocalizedText::new("ENDLESS_MODE", "FOREVER")];
        assert!(save_localization(&bridge, &texts));
        assert_eq!(
            bridge.read_full_text(LOCALIZATION_CFG),
            "# captions\nENDLESS_MODE = \"FOREVER\"\n"
        );
    }
}
