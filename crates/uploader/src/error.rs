// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Failed to parse {}: {}", .0.display(), .1)]
    Yaml(PathBuf, serde_yaml::Error),
    #[error("Couldn't connect to {0}: {1}")]
    Connect(String, reqwest::Error),
    #[error("Bad ping response - {0}")]
    BadPing(reqwest::StatusCode),
    #[error("{0} answered {1}")]
    Status(String, reqwest::StatusCode),
    #[error("API key is not a valid header value")]
    InvalidApiKey,
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PublishError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |e| PublishError::Io(path, e)
    }

    pub fn yaml(path: impl Into<PathBuf>) -> impl FnOnce(serde_yaml::Error) -> Self {
        let path = path.into();
        move |e| PublishError::Yaml(path, e)
    }
}
