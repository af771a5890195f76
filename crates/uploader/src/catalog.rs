// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

use mctf_checker::manifest::{MANIFEST_FILE, TaskManifest};
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

pub const TOPIC_FILE: &str = "topic.yml";
pub const INFO_FILE: &str = "DESCRIPTION.md";
pub const WRITEUP_FILE: &str = "solve/WRITEUP.md";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_POINTS: u32 = 10;

#[derive(Serialize, Deserialize, Debug, Clone)]
struct TopicDescription {
    name: String,
    #[serde(default)]
    difficulty: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct TopicManifest {
    description: TopicDescription,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub estimated_completion_time: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub course_name: String,
    pub name: String,
    /// The flag
    pub answer: String,
    pub difficulty: String,
    pub points: u32,
    pub description: String,
    pub info_path: PathBuf,
    pub writeup_path: PathBuf,
}

/// One course and the tasks published under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePlan {
    pub course: CourseRecord,
    pub tasks: Vec<TaskRecord>,
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PublishError> {
    let file = std::fs::File::open(path).map_err(PublishError::io(path))?;
    serde_yaml::from_reader(file).map_err(PublishError::yaml(path))
}

fn visible_dirs(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(PublishError::io(dir))? {
        let path = entry.map_err(PublishError::io(dir))?.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if !hidden && path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn load_task(course_name: &str, task_dir: &Path) -> Result<TaskRecord, PublishError> {
    let manifest: TaskManifest = read_yaml(&task_dir.join(MANIFEST_FILE))?;
    Ok(TaskRecord {
        course_name: course_name.to_string(),
        name: manifest.description.name,
        answer: manifest.host_data.flag,
        difficulty: manifest.description.difficulty.unwrap_or_default(),
        points: DEFAULT_POINTS,
        description: DEFAULT_DESCRIPTION.to_string(),
        info_path: task_dir.join(INFO_FILE),
        writeup_path: task_dir.join(WRITEUP_FILE),
    })
}

/// Every `<category>/<topic>/topic.yml` under `tasks_dir`, with the tasks next to it.
pub fn collect_courses(tasks_dir: &Path) -> Result<Vec<CoursePlan>, PublishError> {
    let mut plans = Vec::new();
    for category in visible_dirs(tasks_dir)? {
        for topic in visible_dirs(&category)? {
            let topic_file = topic.join(TOPIC_FILE);
            if !topic_file.is_file() {
                tracing::debug!("Skipping {}, no {TOPIC_FILE}", topic.display());
                continue;
            }
            let manifest: TopicManifest = read_yaml(&topic_file)?;
            let course = CourseRecord {
                name: manifest.description.name,
                description: DEFAULT_DESCRIPTION.to_string(),
                difficulty: manifest.description.difficulty,
                estimated_completion_time: 0,
            };
            let mut tasks = Vec::new();
            for task_dir in visible_dirs(&topic)? {
                if task_dir.join(MANIFEST_FILE).is_file() {
                    tasks.push(load_task(&course.name, &task_dir)?);
                }
            }
            plans.push(CoursePlan { course, tasks });
        }
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_courses() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "crypto/fields/topic.yml", "description:\n  name: Finite fields\n  difficulty: medium\n");
        write(
            r,
            "crypto/fields/basic_ops/task.yml",
            "description:\n  name: Basic ops\n  difficulty: easy\nhost-data:\n  type: local\n  flag: mctf{ops}\n",
        );
        write(r, "crypto/fields/notes/README.md", "not a task\n");
        write(r, "web/drafts/wip/task.yml", "description:\n  name: wip\n");

        let plans = collect_courses(r).unwrap();
        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        assert_eq!(
            plan.course,
            CourseRecord {
                name: "Finite fields".to_string(),
                description: DEFAULT_DESCRIPTION.to_string(),
                difficulty: "medium".to_string(),
                estimated_completion_time: 0,
            }
        );
        assert_eq!(plan.tasks.len(), 1);
        let task = &plan.tasks[0];
        assert_eq!(task.course_name, "Finite fields");
        assert_eq!(task.name, "Basic ops");
        assert_eq!(task.answer, "mctf{ops}");
        assert_eq!(task.points, 10);
        assert_eq!(task.writeup_path, r.join("crypto/fields/basic_ops/solve/WRITEUP.md"));
    }

    #[test]
    fn test_numeric_flag_and_name() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "misc/games/topic.yml", "description:\n  name: Games\n  difficulty: easy\n");
        write(
            r,
            "misc/games/puzzle/task.yml",
            "description:\n  name: 2048\nhost-data:\n  type: local\n  flag: 31337\n",
        );
        let plans = collect_courses(r).unwrap();
        let task = &plans[0].tasks[0];
        assert_eq!(task.name, "2048");
        assert_eq!(task.answer, "31337");
        assert_eq!(task.difficulty, "");
    }

    #[test]
    fn test_broken_task_manifest_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        write(r, "web/basics/topic.yml", "description:\n  name: Web\n");
        write(r, "web/basics/idor/task.yml", "description: [\n");
        assert!(matches!(collect_courses(r), Err(PublishError::Yaml(_, _))));
    }
}
