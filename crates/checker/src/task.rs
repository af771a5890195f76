// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::manifest::{MANIFEST_FILE, TaskManifest, parse_manifest};
use crate::report::RunContext;

/// Identifies one task in the corpus, as passed around by automation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskSelector {
    pub name: String,
    pub category: String,
    pub topic: String,
}

#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    category: String,
    topic: String,
    path: PathBuf,
    manifest: Option<TaskManifest>,
    manifest_failed: bool,
}

impl Task {
    /// Loads `<tasks_dir>/<category>/<topic>/<name>` and checks its manifest.
    ///
    /// A missing `task.yml` is not reported here; the structure validator owns
    /// the required-files check.
    pub fn load(ctx: &RunContext, tasks_dir: &Path, selector: TaskSelector) -> Self {
        let path = tasks_dir
            .join(&selector.category)
            .join(&selector.topic)
            .join(&selector.name);
        let mut task = Task {
            name: selector.name,
            category: selector.category,
            topic: selector.topic,
            path,
            manifest: None,
            manifest_failed: false,
        };
        let manifest_path = task.path.join(MANIFEST_FILE);
        match std::fs::read_to_string(&manifest_path) {
            Ok(text) => {
                let mut scope = ctx.scope(task.to_string());
                task.manifest = parse_manifest(&mut scope, &task.path, &text);
                task.manifest_failed = scope.was_error();
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No manifest at {}", manifest_path.display());
            }
            Err(e) => {
                let mut scope = ctx.scope(task.to_string());
                scope.error(false, format!("failed to read {MANIFEST_FILE}: {e}"));
                task.manifest_failed = true;
            }
        }
        task
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> Option<&TaskManifest> {
        self.manifest.as_ref()
    }

    /// True when the manifest existed but was rejected.
    pub fn manifest_failed(&self) -> bool {
        self.manifest_failed
    }

    pub fn selector(&self) -> TaskSelector {
        TaskSelector {
            name: self.name.clone(),
            category: self.category.clone(),
            topic: self.topic.clone(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}", self.name)
    }
}
