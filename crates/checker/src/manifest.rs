// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::report::Scope;
use crate::value::scalar_text;

pub const MANIFEST_FILE: &str = "task.yml";
pub const DEPLOY_DIR: &str = "deploy";

pub const REQUIRED_TASK_KEYS: &[&str] = &["description", "host-data"];
pub const REQUIRED_DESC_KEYS: &[&str] = &["name"];
pub const REQUIRED_HOST_DATA_KEYS: &[&str] = &["type", "flag"];
pub const DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(into = "String")]
pub enum TaskKind {
    /// Players only get files
    Local,
    /// Deployed from `deploy/`
    Remote,
    Other(String),
}

impl From<String> for TaskKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "local" => TaskKind::Local,
            "remote" => TaskKind::Remote,
            _ => TaskKind::Other(value),
        }
    }
}

impl<'de> Deserialize<'de> for TaskKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        scalar(deserializer).map(TaskKind::from)
    }
}

impl From<TaskKind> for String {
    fn from(value: TaskKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Local => f.write_str("local"),
            TaskKind::Remote => f.write_str("remote"),
            TaskKind::Other(other) => f.write_str(other),
        }
    }
}

/// Any YAML scalar, as written. `name: 2048` is as good a name as `name: "2048"`.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a scalar, got {value:?}")))
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a scalar, got {value:?}"))),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Description {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HostData {
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(deserialize_with = "scalar")]
    pub flag: String,
}

/// Typed view of `task.yml`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskManifest {
    pub description: Description,
    #[serde(rename = "host-data")]
    pub host_data: HostData,
}

impl TaskManifest {
    pub fn is_local(&self) -> bool {
        self.host_data.kind == TaskKind::Local
    }

    pub fn is_remote(&self) -> bool {
        self.host_data.kind == TaskKind::Remote
    }
}

fn check_keys(scope: &mut Scope<'_>, section: &serde_yaml::Mapping, keys: &[&str]) -> bool {
    for key in keys {
        if scope.error(
            section.contains_key(*key),
            format!("required key {key} not in {MANIFEST_FILE}"),
        ) {
            return false;
        }
    }
    true
}

/// Checks the manifest text of the task in `task_dir`.
///
/// Problems are reported through `scope`; `None` means the manifest is not
/// usable.
pub fn parse_manifest(scope: &mut Scope<'_>, task_dir: &Path, text: &str) -> Option<TaskManifest> {
    let root: Value = match serde_yaml::from_str(text) {
        Ok(root) => root,
        Err(e) => {
            scope.error(false, format!("{MANIFEST_FILE} is not valid YAML: {e}"));
            return None;
        }
    };
    let Some(root_map) = root.as_mapping() else {
        scope.error(false, format!("{MANIFEST_FILE} is not dict"));
        return None;
    };
    if !check_keys(scope, root_map, REQUIRED_TASK_KEYS) {
        return None;
    }

    let (Some(description), Some(host_data)) = (
        root_map.get("description").and_then(Value::as_mapping),
        root_map.get("host-data").and_then(Value::as_mapping),
    ) else {
        let desc_ok = root_map.get("description").is_some_and(Value::is_mapping);
        if !scope.error(desc_ok, "description should be dictionary") {
            scope.error(false, "host-data should be dictionary");
        }
        return None;
    };
    if !check_keys(scope, description, REQUIRED_DESC_KEYS)
        || !check_keys(scope, host_data, REQUIRED_HOST_DATA_KEYS)
    {
        return None;
    }

    let manifest: TaskManifest = match serde_yaml::from_value(root.clone()) {
        Ok(manifest) => manifest,
        Err(e) => {
            scope.error(false, format!("{MANIFEST_FILE} has an invalid value: {e}"));
            return None;
        }
    };

    if manifest.is_remote()
        && scope.error(
            task_dir.join(DEPLOY_DIR).is_dir(),
            "No deploy directory for remote task",
        )
    {
        return None;
    }

    if let Some(difficulty) = &manifest.description.difficulty {
        scope.warn(
            DIFFICULTIES.contains(&difficulty.as_str()),
            format!(
                "unknown difficulty {difficulty}, expected one of {}",
                DIFFICULTIES.join(", ")
            ),
        );
    }

    Some(manifest)
}
