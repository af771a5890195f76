// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Component, Path, PathBuf};

use crate::error::CheckerError;
use crate::report::{RunContext, Scope};
use crate::task::{Task, TaskSelector};

/// Selector value that means "every task".
pub const ALL_TASKS: &str = "all";

/// Which tasks a run is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    One(TaskSelector),
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !segment.contains(['/', '\\'])
}

impl Selection {
    /// Interprets the raw `TASK` value.
    pub fn parse(raw: Option<&str>) -> Result<Self, CheckerError> {
        let raw = match raw.map(str::trim) {
            None | Some(ALL_TASKS) => return Ok(Selection::All),
            Some(raw) => raw,
        };
        let selector: TaskSelector = serde_json::from_str(raw)
            .map_err(|e| CheckerError::InvalidSelector(e.to_string()))?;
        for (field, value) in [
            ("name", &selector.name),
            ("category", &selector.category),
            ("topic", &selector.topic),
        ] {
            if !is_plain_segment(value) {
                return Err(CheckerError::InvalidSelector(format!(
                    "{field} {value:?} is not a plain directory name"
                )));
            }
        }
        Ok(Selection::One(selector))
    }
}

fn is_visible_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'))
        && path.is_dir()
}

/// Non-hidden subdirectories of `dir`, sorted by name.
fn visible_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, CheckerError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(CheckerError::io(dir))? {
        let path = entry.map_err(CheckerError::io(dir))?.path();
        if is_visible_dir(&path) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            dirs.push((name, path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn walk_corpus(tasks_dir: &Path) -> Result<Vec<TaskSelector>, CheckerError> {
    let mut selectors = Vec::new();
    for (category, category_dir) in visible_dirs(tasks_dir)? {
        for (topic, topic_dir) in visible_dirs(&category_dir)? {
            for (name, _) in visible_dirs(&topic_dir)? {
                selectors.push(TaskSelector {
                    name,
                    category: category.clone(),
                    topic: topic.clone(),
                });
            }
        }
    }
    Ok(selectors)
}

fn fatal_on<T>(scope: &mut Scope<'_>, result: Result<T, CheckerError>) -> Result<T, CheckerError> {
    result.map_err(|e| scope.fatal(false, e.to_string()).err().unwrap_or(e))
}

/// Finds the tasks to work on under `tasks_dir`.
///
/// `raw_selector` is the unparsed `TASK` value. With `remote_only`, a full
/// walk keeps only tasks deployed from `deploy/`. Any configuration problem
/// trips the fatal latch of `ctx` and is returned as an error.
pub fn discover_tasks(
    ctx: &RunContext,
    tasks_dir: &Path,
    raw_selector: Option<&str>,
    remote_only: bool,
) -> Result<Vec<Task>, CheckerError> {
    let mut scope = ctx.scope("");
    let selection = fatal_on(&mut scope, Selection::parse(raw_selector))?;

    let tasks: Vec<Task> = match selection {
        Selection::All => {
            let selectors = fatal_on(&mut scope, walk_corpus(tasks_dir))?;
            tracing::debug!(
                "Found {} task directories under {}",
                selectors.len(),
                tasks_dir.display()
            );
            selectors
                .into_iter()
                .map(|selector| Task::load(ctx, tasks_dir, selector))
                .filter(|task| !remote_only || task.manifest().is_some_and(|m| m.is_remote()))
                .collect()
        }
        Selection::One(selector) => {
            let dir = tasks_dir
                .join(&selector.category)
                .join(&selector.topic)
                .join(&selector.name);
            scope.fatal(
                dir.is_dir(),
                format!(
                    "task {}/{}/{} not found in {}",
                    selector.category,
                    selector.topic,
                    selector.name,
                    tasks_dir.display()
                ),
            )?;
            vec![Task::load(ctx, tasks_dir, selector)]
        }
    };

    scope.info(format!(
        "Got tasks: {}",
        tasks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    ));
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemorySink, Severity};

    fn write_task(root: &Path, rel: &str, kind: &str) {
        let dir = root.join(rel);
        std::fs::create_dir_all(dir.join("deploy")).unwrap();
        std::fs::write(
            dir.join("task.yml"),
            format!("description:\n  name: {rel}\nhost-data:\n  type: {kind}\n  flag: f\n"),
        )
        .unwrap();
    }

    fn corpus() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        write_task(root.path(), "web/basics/idor", "remote");
        write_task(root.path(), "web/basics/ssrf", "remote");
        write_task(root.path(), "crypto/fields/basic_ops", "local");
        write_task(root.path(), ".github/hidden/task", "remote");
        write_task(root.path(), "web/.drafts/wip", "remote");
        std::fs::write(root.path().join("web/basics/README.md"), "not a task").unwrap();
        root
    }

    fn names(tasks: &[Task]) -> Vec<String> {
        tasks
            .iter()
            .map(|t| format!("{}/{}/{}", t.category(), t.topic(), t.name()))
            .collect()
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse(None).unwrap(), Selection::All);
        assert_eq!(Selection::parse(Some("all")).unwrap(), Selection::All);
        assert_eq!(
            Selection::parse(Some(r#"{"name":"idor","category":"web","topic":"basics"}"#))
                .unwrap(),
            Selection::One(TaskSelector {
                name: "idor".to_string(),
                category: "web".to_string(),
                topic: "basics".to_string(),
            })
        );
        assert!(Selection::parse(Some("idor")).is_err());
        assert!(Selection::parse(Some(r#"{"name":"idor"}"#)).is_err());
        assert!(
            Selection::parse(Some(r#"{"name":"../../etc","category":"web","topic":"basics"}"#))
                .is_err()
        );
        assert!(Selection::parse(Some(r#"{"name":"..","category":"web","topic":"basics"}"#)).is_err());
        assert!(Selection::parse(Some(r#"{"name":"","category":"web","topic":"basics"}"#)).is_err());
    }

    #[test]
    fn test_discover_all_skips_hidden_and_files() {
        let root = corpus();
        let sink = MemorySink::new();
        let ctx = RunContext::new(sink.clone());
        let tasks = discover_tasks(&ctx, root.path(), None, false).unwrap();
        assert_eq!(
            names(&tasks),
            vec!["crypto/fields/basic_ops", "web/basics/idor", "web/basics/ssrf"]
        );
        assert_eq!(
            sink.messages(Severity::Info),
            vec!["Got tasks: task basic_ops, task idor, task ssrf"]
        );
    }

    #[test]
    fn test_discover_remote_only() {
        let root = corpus();
        let ctx = RunContext::new(MemorySink::new());
        let tasks = discover_tasks(&ctx, root.path(), Some("all"), true).unwrap();
        assert_eq!(names(&tasks), vec!["web/basics/idor", "web/basics/ssrf"]);
    }

    #[test]
    fn test_discover_single_task() {
        let root = corpus();
        let ctx = RunContext::new(MemorySink::new());
        let tasks = discover_tasks(
            &ctx,
            root.path(),
            Some(r#"{"name":"basic_ops","category":"crypto","topic":"fields"}"#),
            false,
        )
        .unwrap();
        assert_eq!(names(&tasks), vec!["crypto/fields/basic_ops"]);
    }

    #[test]
    fn test_malformed_selector_is_fatal() {
        let root = corpus();
        let sink = MemorySink::new();
        let ctx = RunContext::new(sink.clone());
        let result = discover_tasks(&ctx, root.path(), Some("{not json"), false);
        assert!(matches!(result, Err(CheckerError::Fatal(_))));
        assert!(ctx.is_halted());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Fail);
        assert!(records[0].message.starts_with("Invalid TASK env structure"));
    }

    #[test]
    fn test_unknown_task_is_fatal() {
        let root = corpus();
        let ctx = RunContext::new(MemorySink::new());
        let result = discover_tasks(
            &ctx,
            root.path(),
            Some(r#"{"name":"nope","category":"web","topic":"basics"}"#),
            false,
        );
        assert!(result.is_err());
        assert!(ctx.is_halted());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(MemorySink::new());
        let result = discover_tasks(&ctx, &root.path().join("tasks"), None, false);
        assert!(matches!(result, Err(CheckerError::Fatal(_))));
        assert!(ctx.is_halted());
    }
}
