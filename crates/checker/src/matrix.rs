// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Task lists for CI fan-out.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discovery::discover_tasks;
use crate::error::CheckerError;
use crate::report::RunContext;
use crate::task::Task;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MatrixEntry {
    /// JSON-encoded [`crate::task::TaskSelector`], fed back through `TASK`
    pub task: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Matrix {
    pub include: Vec<MatrixEntry>,
}

impl Matrix {
    pub fn from_tasks(tasks: &[Task]) -> Result<Self, CheckerError> {
        let include = tasks
            .iter()
            .map(|task| {
                serde_json::to_string(&task.selector()).map(|task| MatrixEntry { task })
            })
            .collect::<Result<_, _>>()?;
        Ok(Matrix { include })
    }

    /// The `matrix=<json>` output line.
    pub fn output_line(&self) -> Result<String, CheckerError> {
        Ok(format!("matrix={}", serde_json::to_string(self)?))
    }
}

/// Appends `line` to a GitHub Actions output file.
pub fn append_output(path: &Path, line: &str) -> Result<(), CheckerError> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(CheckerError::io(path))?;
    writeln!(file, "{line}").map_err(CheckerError::io(path))
}

/// Discovers tasks and returns the matrix line, also appending it to `github_output`.
pub fn list_tasks(
    ctx: &RunContext,
    tasks_dir: &Path,
    raw_selector: Option<&str>,
    remote_only: bool,
    github_output: Option<&Path>,
) -> Result<String, CheckerError> {
    let tasks = discover_tasks(ctx, tasks_dir, raw_selector, remote_only)?;
    let line = Matrix::from_tasks(&tasks)?.output_line()?;
    if let Some(path) = github_output {
        append_output(path, &line)?;
    }
    Ok(line)
}
