// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the customizer bridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
///
/// The public bridge API never surfaces these directly: every operation
/// collapses its error into a boolean or empty-string signal after logging.
/// The `try_*` forms return them so callers can tell causes apart.
#[derive(Debug, Error)]
pub enum CustomizerError {
    // -- Host / UI --
    #[error("no UI context available: {0}")]
    UiContextUnavailable(String),

    // -- Provider --
    #[error("could not open {mode} stream for {uri}")]
    StreamUnavailable { uri: String, mode: &'static str },

    #[error("content provider rejected {operation} on {uri}")]
    Provider { operation: &'static str, uri: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CustomizerError>;
