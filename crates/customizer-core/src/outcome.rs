// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tagged results for bridge operations.
//
// Callers on the native side only ever see `true`/`false` or an empty string.
// Internally every failure is classified so the log line says *why* an
// operation degraded to the failure signal.

use std::io::ErrorKind;

use crate::error::CustomizerError;

/// Classified result of a single bridge operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation did what it was asked to do.
    Success,
    /// The source file, stream target or provider record does not exist,
    /// or the provider reported zero affected rows.
    NotFound,
    /// Reading or writing bytes failed part way.
    IoError,
    /// The platform refused access.
    PermissionError,
    /// No UI context, no platform support, or a JNI failure.
    Unavailable,
    /// The provider answered but refused the request (null insert etc.).
    ProviderError,
}

impl Outcome {
    /// Build an outcome from an operation result.
    pub fn of<T>(result: &Result<T, CustomizerError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(err) => classify(err),
        }
    }

    /// Short label used in structured log fields.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::NotFound => "not-found",
            Outcome::IoError => "io-error",
            Outcome::PermissionError => "permission-error",
            Outcome::Unavailable => "unavailable",
            Outcome::ProviderError => "provider-error",
        }
    }
}

/// Map an error onto the outcome taxonomy.
pub fn classify(err: &CustomizerError) -> Outcome {
    match err {
        CustomizerError::NotFound(_) | CustomizerError::StreamUnavailable { .. } => {
            Outcome::NotFound
        }

        CustomizerError::PermissionDenied(_) => Outcome::PermissionError,

        CustomizerError::Io(io) => match io.kind() {
            ErrorKind::NotFound => Outcome::NotFound,
            ErrorKind::PermissionDenied => Outcome::PermissionError,
            _ => Outcome::IoError,
        },

        CustomizerError::Serialization(_) | CustomizerError::InvalidPath(_) => Outcome::IoError,

        CustomizerError::Provider { .. } => Outcome::ProviderError,

        CustomizerError::UiContextUnavailable(_)
        | CustomizerError::Bridge(_)
        | CustomizerError::PlatformUnavailable => Outcome::Unavailable,
    }
}
