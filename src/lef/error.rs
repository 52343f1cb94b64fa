// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure of one parse session. No partial [`super::Lef`] accompanies it.
#[derive(Debug)]
pub enum LefError {
    /// The source could not be opened for reading.
    SourceUnavailable { path: PathBuf, source: io::Error },
    /// The grammar engine could not be configured or started.
    EngineInitFailed(String),
    /// The grammar engine ran and reported a syntax or structure error.
    Grammar(String),
}

/// Which phase of the session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LefErrorKind {
    SourceUnavailable,
    EngineInitFailed,
    Grammar,
}

impl LefError {
    pub fn kind(&self) -> LefErrorKind {
        match self {
            LefError::SourceUnavailable { .. } => LefErrorKind::SourceUnavailable,
            LefError::EngineInitFailed(_) => LefErrorKind::EngineInitFailed,
            LefError::Grammar(_) => LefErrorKind::Grammar,
        }
    }
}

impl fmt::Display for LefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LefError::SourceUnavailable { path, source } => {
                write!(f, "Couldn't open LEF file '{}': {source}", path.display())
            }
            LefError::EngineInitFailed(msg) => {
                write!(f, "LEF grammar engine failed to start: {msg}")
            }
            LefError::Grammar(msg) => write!(f, "LEF parser returned an error: {msg}"),
        }
    }
}

impl std::error::Error for LefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LefError::SourceUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}
