// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sense Customizer: desktop command line.
//
// Entry point. Initialises logging, loads the bridge configuration and runs
// one storage command against a game directory.

mod commands;
mod data_dir;

use std::path::PathBuf;
use std::process::ExitCode;

use customizer_core::config::BridgeConfig;

use commands::{Context, USAGE};

/// Path of an optional JSON bridge configuration.
const CONFIG_ENV: &str = "CUSTOMIZER_CONFIG";

/// Game directory override.
const GAME_DIR_ENV: &str = "CUSTOMIZER_GAME_DIR";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let invocation = match commands::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(usage) => {
            eprintln!("{usage}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => match BridgeConfig::load(&PathBuf::from(path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "invalid configuration");
                return ExitCode::from(2);
            }
        },
        None => BridgeConfig::default(),
    };

    let game_dir = invocation
        .game_dir
        .or_else(|| std::env::var_os(GAME_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(data_dir::default_game_dir);

    let ctx = Context::new(&game_dir, config);
    tracing::debug!(game_dir = %ctx.game_dir().display(), "customizer starting");

    let stdout = std::io::stdout();
    match ctx.run(&invocation.command, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "cannot write output");
            ExitCode::FAILURE
        }
    }
}
