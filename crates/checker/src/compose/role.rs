// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

/// What a container does inside a task, derived from its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Database,
    Proxy,
    /// Cleanup sidecar, exempt from service rules
    Cleaner,
    /// The application under test
    Service,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Database => "database",
            Role::Proxy => "proxy",
            Role::Cleaner => "cleaner",
            Role::Service => "service",
        })
    }
}

pub const DATABASES: &[&str] = &[
    "redis",
    "postgres",
    "mysql",
    "mariadb",
    "mongo",
    "mssql",
    "clickhouse",
    "tarantool",
];
pub const PROXIES: &[&str] = &["nginx", "envoy"];
pub const CLEANERS: &[&str] = &["dedcleaner"];

/// Checked top to bottom, first hit wins.
pub const ROLE_TABLE: &[(Role, &[&str])] = &[
    (Role::Database, DATABASES),
    (Role::Proxy, PROXIES),
    (Role::Cleaner, CLEANERS),
];

/// Classifies a resolved image reference by substring match against [`ROLE_TABLE`].
pub fn classify(image: &str) -> Role {
    ROLE_TABLE
        .iter()
        .find(|(_, markers)| markers.iter().any(|marker| image.contains(marker)))
        .map(|(role, _)| *role)
        .unwrap_or(Role::Service)
}
