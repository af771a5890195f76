// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;
use std::process::ExitCode;

use crate::discovery::discover_tasks;
use crate::error::CheckerError;
use crate::report::RunContext;
use crate::structure::StructureValidator;
use crate::task::Task;

/// How a run ended, as seen by the invoking automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    /// At least one structural check failed
    Failed,
    /// No subcommand was given
    Usage,
    /// Configuration problem, nothing was validated
    Fatal,
    /// Anything else that went wrong
    Internal,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Passed => 0,
            RunStatus::Failed => 1,
            RunStatus::Usage => 2,
            RunStatus::Fatal => 3,
            RunStatus::Internal => 4,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

fn validate_all(ctx: &RunContext, tasks_dir: &Path, tasks: &[&Task]) -> bool {
    // no short-circuit: later tasks still get validated
    tasks.iter().fold(true, |passed, task| {
        StructureValidator::new(ctx, tasks_dir, task).validate() && passed
    })
}

/// Runs the structure validator over `tasks` on up to `jobs` threads.
pub fn validate_structure(ctx: &RunContext, tasks_dir: &Path, tasks: &[Task], jobs: usize) -> RunStatus {
    let jobs = jobs.clamp(1, tasks.len().max(1));
    let passed = if jobs == 1 {
        validate_all(ctx, tasks_dir, &tasks.iter().collect::<Vec<_>>())
    } else {
        std::thread::scope(|s| {
            let mut handles = Vec::with_capacity(jobs);
            for worker in 0..jobs {
                let share: Vec<&Task> = tasks.iter().skip(worker).step_by(jobs).collect();
                let handle = std::thread::Builder::new()
                    .name(format!("worker-{worker}"))
                    .spawn_scoped(s, move || validate_all(ctx, tasks_dir, &share));
                handles.push(handle);
            }
            handles.into_iter().fold(true, |passed, handle| {
                let ok = match handle {
                    Ok(handle) => handle.join().unwrap_or(false),
                    Err(e) => {
                        tracing::error!("Failed to spawn validation worker: {e}");
                        false
                    }
                };
                ok && passed
            })
        })
    };

    let mut scope = ctx.scope("Structure validator");
    if scope.error(passed, "failed") {
        RunStatus::Failed
    } else {
        scope.info("passed");
        RunStatus::Passed
    }
}

/// Discovers the selected tasks and validates their structure.
pub fn run_validation(
    ctx: &RunContext,
    tasks_dir: &Path,
    raw_selector: Option<&str>,
    jobs: usize,
) -> Result<RunStatus, CheckerError> {
    let tasks = discover_tasks(ctx, tasks_dir, raw_selector, false)?;
    Ok(validate_structure(ctx, tasks_dir, &tasks, jobs))
}
