// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_yaml::Mapping;

use crate::report::Scope;
use crate::value::key_name;

pub const COMPOSE_FILE: &str = "docker-compose.yml";

pub const DC_REQUIRED_OPTIONS: &[&str] = &["services"];
pub const DC_ALLOWED_OPTIONS: &[&str] = &["services", "volumes", "version"];

/// Accepted `version` values are `MIN_VERSION <= v < MAX_VERSION`.
pub const MIN_VERSION: f64 = 2.4;
pub const MAX_VERSION: f64 = 3.0;

pub const RESTART_POLICY: &str = "unless-stopped";

pub const CONTAINER_REQUIRED_OPTIONS: &[&str] = &["restart", "container_name"];
pub const CONTAINER_ALLOWED_OPTIONS: &[&str] = &[
    "restart",
    "container_name",
    "pids_limit",
    "mem_limit",
    "cpus",
    "build",
    "image",
    "ports",
    "volumes",
    "environment",
    "env_file",
    "healthcheck",
    "depends_on",
    "sysctls",
    "security_opt",
    "read_only",
    "tmpfs",
    "cap_drop",
    "user",
];

pub const SERVICE_REQUIRED_OPTIONS: &[&str] = &["pids_limit", "mem_limit", "cpus"];

pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Reports every key of `required` missing from `map`. Returns `true` if any was missing.
pub fn ensure_required(
    scope: &mut Scope<'_>,
    map: &Mapping,
    required: &[&str],
    message: impl Fn(&str) -> String,
) -> bool {
    let mut missing = false;
    for opt in required {
        missing |= scope.error(map.contains_key(*opt), message(opt));
    }
    missing
}

/// Reports every key of `map` rejected by `allowed`, once per key.
pub fn ensure_allowed(
    scope: &mut Scope<'_>,
    map: &Mapping,
    allowed: impl Fn(&str) -> bool,
    message: impl Fn(&str) -> String,
) -> bool {
    let mut rejected = false;
    for key in map.keys() {
        let opt = key_name(key);
        rejected |= scope.error(allowed(&opt), message(&opt));
    }
    rejected
}
