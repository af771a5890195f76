// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structural validation of a CTF task catalog.
//!
//! Tasks live in `tasks/<category>/<topic>/<task>/`. Each one is checked for
//! its required files, its `task.yml` manifest and, for deployed tasks, its
//! `docker-compose.yml` against the platform's container rules.

pub mod compose;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod matrix;
pub mod orchestrator;
pub mod report;
pub mod structure;
pub mod task;
pub mod value;

pub use error::CheckerError;
pub use orchestrator::RunStatus;
pub use report::RunContext;
pub use task::{Task, TaskSelector};
