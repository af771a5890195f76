// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Failed to encode task list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid TASK env structure: {0}")]
    InvalidSelector(String),
    #[error("Fatal: {0}")]
    Fatal(String),
}

impl CheckerError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |e| CheckerError::Io(path, e)
    }
}

/// A value in a parsed document had a different shape than expected.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{what} is not {expected}")]
pub struct ShapeError {
    pub what: String,
    pub expected: &'static str,
}
