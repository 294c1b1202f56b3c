// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default game directory resolution.

use std::env;
use std::path::PathBuf;

const GAME_DIR_NAME: &str = "sense-customizer";

/// Game directory used when neither `--game-dir` nor `CUSTOMIZER_GAME_DIR`
/// is given: `$XDG_DATA_HOME/sense-customizer`, else
/// `$HOME/.local/share/sense-customizer`, else `./sense-customizer`.
pub fn default_game_dir() -> PathBuf {
    let data_home = env::var_os("XDG_DATA_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    data_home.join(GAME_DIR_NAME)
}
