// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Validation of a task's `docker-compose.yml` against the platform rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::report::Scope;
use crate::value::{ValueExt, key_name};

pub mod dockerfile;
pub mod role;
pub mod schema;

pub use role::{Role, classify};
use schema::*;

/// What was learned about the containers of one compose file.
#[derive(Debug, Default, Clone)]
pub struct ComposeSummary {
    /// Containers whose image could be resolved, in document order
    pub containers: Vec<(String, Role)>,
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl ComposeSummary {
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &str> + '_ {
        self.containers
            .iter()
            .filter(move |(_, r)| *r == role)
            .map(|(name, _)| name.as_str())
    }

    pub fn role_of(&self, container: &str) -> Option<Role> {
        self.containers
            .iter()
            .find(|(name, _)| name == container)
            .map(|(_, role)| *role)
    }

    fn depends_on(&self, from: &str, to: &str) -> bool {
        self.dependencies
            .get(from)
            .is_some_and(|deps| deps.iter().any(|d| d == to))
    }
}

pub struct ComposeValidator<'s, 'a> {
    scope: &'s mut Scope<'a>,
    /// Path used in messages
    display: String,
    /// Directory build contexts are relative to
    base_dir: PathBuf,
}

impl<'s, 'a> ComposeValidator<'s, 'a> {
    pub fn new(scope: &'s mut Scope<'a>, file: &Path, display: &Path) -> Self {
        Self {
            scope,
            display: display.display().to_string(),
            base_dir: file.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    /// Reads and validates the compose file this validator was created for.
    pub fn validate_file(&mut self, file: &Path) -> Option<ComposeSummary> {
        tracing::debug!("Validating compose file {}", file.display());
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                let path = &self.display;
                self.scope.error(false, format!("failed to read {path}: {e}"));
                return None;
            }
        };
        let doc: Value = match serde_yaml::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                let path = &self.display;
                self.scope.error(false, format!("failed to parse {path}: {e}"));
                return None;
            }
        };
        self.validate(&doc)
    }

    /// Validates a parsed compose document.
    ///
    /// Returns `None` when the document is too broken to look at its containers.
    pub fn validate(&mut self, doc: &Value) -> Option<ComposeSummary> {
        let path = self.display.clone();

        let dc = match doc.as_dict(&path) {
            Ok(dc) => dc,
            Err(e) => {
                self.scope.error(false, e.to_string());
                return None;
            }
        };
        if ensure_required(self.scope, dc, DC_REQUIRED_OPTIONS, |opt| {
            format!("required option {opt} not in {path}")
        }) {
            return None;
        }
        let services = match dc
            .get("services")
            .map(|s| s.as_dict(&format!("services option in {path}")))
        {
            Some(Ok(services)) => services,
            Some(Err(e)) => {
                self.scope.error(false, e.to_string());
                return None;
            }
            None => return None,
        };

        ensure_allowed(
            self.scope,
            dc,
            |opt| DC_ALLOWED_OPTIONS.contains(&opt),
            |opt| format!("option {opt} in {path} is not allowed"),
        );

        if let Some(version) = dc.get("version") {
            self.check_version(version);
        }

        let mut summary = ComposeSummary::default();
        for (container, conf) in services {
            let container = key_name(container);
            if let Some(role) = self.validate_container(&container, conf, &mut summary) {
                summary.containers.push((container, role));
            }
        }

        self.check_dependencies(&summary);
        Some(summary)
    }

    fn check_version(&mut self, version: &Value) {
        let path = &self.display;
        let Ok(version) = version.as_string("version") else {
            self.scope
                .error(false, format!("version option in {path} is not string"));
            return;
        };
        let Ok(parsed) = version.trim().parse::<f64>() else {
            self.scope
                .error(false, format!("version option in {path} is not float"));
            return;
        };
        self.scope.error(
            (MIN_VERSION..MAX_VERSION).contains(&parsed),
            format!(
                "invalid version in {path}, need >={MIN_VERSION} and <{MAX_VERSION} (or no version at all), got {version}"
            ),
        );
    }

    fn validate_container(
        &mut self,
        container: &str,
        conf: &Value,
        summary: &mut ComposeSummary,
    ) -> Option<Role> {
        let path = self.display.clone();
        let Some(conf) = conf.as_mapping() else {
            self.scope.error(
                false,
                format!("config in {path} for container {container} is not dict"),
            );
            return None;
        };

        ensure_required(self.scope, conf, CONTAINER_REQUIRED_OPTIONS, |opt| {
            format!("required option {opt} not in {path} for container {container}")
        });
        self.scope.error(
            conf.get("restart").and_then(Value::as_str) == Some(RESTART_POLICY),
            format!(
                "restart option in {path} for container {container} must be equal to \"{RESTART_POLICY}\""
            ),
        );
        ensure_allowed(
            self.scope,
            conf,
            |opt| CONTAINER_ALLOWED_OPTIONS.contains(&opt),
            |opt| format!("option {opt} in {path} is not allowed for container {container}"),
        );

        let has_image = conf.contains_key("image");
        let has_build = conf.contains_key("build");
        if self.scope.error(
            !(has_image && has_build),
            format!("both image and build options in {path} for container {container}"),
        ) || self.scope.error(
            has_image || has_build,
            format!("neither image nor build option in {path} for container {container}"),
        ) {
            return None;
        }

        let image = self.resolve_image(container, conf)?;

        if let Some(depends_on) = conf.get("depends_on") {
            match depends_on.as_names("depends_on") {
                Ok(names) => summary
                    .dependencies
                    .entry(container.to_string())
                    .or_default()
                    .extend(names),
                Err(_) => {
                    self.scope.error(
                        false,
                        format!("depends_on option in {path} for container {container} is not list"),
                    );
                }
            }
        }

        let role = classify(&image);
        tracing::debug!("Container {container} ({image}) classified as {role}");
        if role == Role::Service {
            ensure_required(self.scope, conf, SERVICE_REQUIRED_OPTIONS, |opt| {
                format!("required option {opt} not in {path} for service {container}")
            });
        }
        Some(role)
    }

    /// The image a container runs, either given directly or taken from its Dockerfile.
    fn resolve_image(&mut self, container: &str, conf: &Mapping) -> Option<String> {
        let path = self.display.clone();
        if let Some(image) = conf.get("image") {
            return match image.as_str() {
                Some(image) => Some(image.to_string()),
                None => {
                    self.scope.error(
                        false,
                        format!("image option in {path} for container {container} is not string"),
                    );
                    None
                }
            };
        }

        let dockerfile = match conf.get("build")? {
            Value::String(context) => self.base_dir.join(context).join(DEFAULT_DOCKERFILE),
            Value::Mapping(build) => {
                let Some(context) = build.get("context").and_then(Value::as_str) else {
                    self.scope.error(
                        false,
                        format!("build option in {path} for container {container} has no context"),
                    );
                    return None;
                };
                let name = match build.get("dockerfile") {
                    None => DEFAULT_DOCKERFILE,
                    Some(Value::String(name)) => name.as_str(),
                    Some(_) => {
                        self.scope.error(
                            false,
                            format!("build.dockerfile option in {path} for container {container} is not string"),
                        );
                        return None;
                    }
                };
                self.base_dir.join(context).join(name)
            }
            _ => {
                self.scope.error(
                    false,
                    format!("build option in {path} for container {container} is not string or dict"),
                );
                return None;
            }
        };

        if self.scope.error(
            dockerfile.is_file(),
            format!("no dockerfile found in {}", dockerfile.display()),
        ) {
            return None;
        }
        let text = match std::fs::read_to_string(&dockerfile) {
            Ok(text) => text,
            Err(e) => {
                self.scope.error(
                    false,
                    format!("failed to read {}: {e}", dockerfile.display()),
                );
                return None;
            }
        };
        let image = dockerfile::base_image(&text);
        if self.scope.error(
            image.is_some(),
            format!("no image option in {}", dockerfile.display()),
        ) {
            return None;
        }
        image
    }

    fn check_dependencies(&mut self, summary: &ComposeSummary) {
        for service in summary.with_role(Role::Service) {
            for database in summary.with_role(Role::Database) {
                self.scope.warn(
                    summary.depends_on(service, database),
                    format!("service {service} may need to depends_on database {database}"),
                );
            }
        }
        for proxy in summary.with_role(Role::Proxy) {
            for service in summary.with_role(Role::Service) {
                self.scope.warn(
                    summary.depends_on(proxy, service),
                    format!("proxy {proxy} may need to depends_on service {service}"),
                );
            }
        }
    }
}
