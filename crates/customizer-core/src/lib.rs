// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sense Customizer: core types, configuration and error definitions shared
// by the bridge crate and the desktop CLI.

pub mod cfg;
pub mod config;
pub mod error;
pub mod outcome;
pub mod types;

pub use config::BridgeConfig;
pub use error::CustomizerError;
pub use outcome::Outcome;
pub use types::*;
