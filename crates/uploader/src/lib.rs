// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Publishes the task catalog to the course platform.

pub mod catalog;
pub mod client;
pub mod error;

pub use catalog::{CoursePlan, CourseRecord, TaskRecord, collect_courses};
pub use client::{PlatformClient, Publisher, publish_all};
pub use error::PublishError;
