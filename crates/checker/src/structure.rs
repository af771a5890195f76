// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use ignore::WalkBuilder;

use crate::compose::ComposeValidator;
use crate::compose::schema::COMPOSE_FILE;
use crate::report::{RunContext, Scope};
use crate::task::Task;

/// Files every task must have at its top level.
pub const REQUIRED_PATHS: &[&str] = &["DESCRIPTION.md", "task.yml"];
/// Placeholder name that has to be `.keep` instead.
pub const LEGACY_KEEP_FILE: &str = ".gitkeep";

/// Checks the on-disk layout of one task.
pub struct StructureValidator<'t, 'a> {
    tasks_dir: &'t Path,
    task: &'t Task,
    scope: Scope<'a>,
}

impl<'t, 'a> StructureValidator<'t, 'a> {
    pub fn new(ctx: &'a RunContext, tasks_dir: &'t Path, task: &'t Task) -> Self {
        Self {
            tasks_dir,
            task,
            scope: ctx.scope(format!("Structure validator for {}", task.name())),
        }
    }

    /// Returns `true` if the task passed every check.
    pub fn validate(mut self) -> bool {
        let task_dir = self.relative(self.task.path()).display().to_string();
        for file in REQUIRED_PATHS {
            let found = self.task.path().join(file).exists();
            if self
                .scope
                .error(found, format!("{file} not found in {task_dir}"))
            {
                return false;
            }
        }

        self.validate_dir();
        !self.scope.was_error() && !self.task.manifest_failed()
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.tasks_dir).unwrap_or(path)
    }

    /// Visits every file of the task. Hidden directories are skipped, hidden files are not.
    fn validate_dir(&mut self) {
        let walker = WalkBuilder::new(self.task.path())
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_some_and(|t| t.is_dir())
                    || !entry.file_name().to_string_lossy().starts_with('.')
            })
            .build();

        for entry in walker {
            match entry {
                Ok(entry) if entry.path().is_file() => self.validate_file(entry.path()),
                Ok(_) => {}
                Err(e) => {
                    self.scope.error(false, format!("failed to walk task directory: {e}"));
                }
            }
        }
    }

    fn validate_file(&mut self, file: &Path) {
        let path = self.relative(file).to_path_buf();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.scope.error(
            name != LEGACY_KEEP_FILE,
            format!("{} found, should be named .keep", path.display()),
        );

        if name == COMPOSE_FILE {
            let is_local = self.task.manifest().is_some_and(|m| m.is_local());
            if !self.scope.warn(
                !is_local,
                format!("You have {COMPOSE_FILE} but your task is local"),
            ) {
                ComposeValidator::new(&mut self.scope, file, &path).validate_file(file);
            }
        }
    }
}
