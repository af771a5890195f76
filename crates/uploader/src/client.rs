// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};

use crate::catalog::{CoursePlan, CourseRecord, TaskRecord};
use crate::error::PublishError;

/// Upserts courses and tasks on the platform.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn update_course(&self, course: &CourseRecord) -> Result<(), PublishError>;
    async fn update_task(&self, task: &TaskRecord) -> Result<(), PublishError>;
}

pub struct PlatformClient {
    url: String,
    http: reqwest::Client,
}

impl PlatformClient {
    /// Builds the client and checks that the API answers.
    pub async fn connect(url: &str, api_key: &str) -> Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("api_key={api_key}"))
                .map_err(|_| PublishError::InvalidApiKey)?,
        );
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        let client = Self {
            url: url.trim_end_matches('/').to_string(),
            http,
        };

        let status = client
            .http
            .get(client.endpoint(""))
            .send()
            .await
            .map_err(|e| PublishError::Connect(client.url.clone(), e))?
            .status();
        if status != reqwest::StatusCode::OK {
            return Err(PublishError::BadPing(status));
        }
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.url, path)
    }

    async fn post(&self, path: &str, form: Form) -> Result<(), PublishError> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Connect(self.url.clone(), e))?;
        if !response.status().is_success() {
            return Err(PublishError::Status(endpoint, response.status()));
        }
        Ok(())
    }
}

async fn markdown_part(path: &std::path::Path, file_name: &'static str) -> Result<Part, PublishError> {
    let bytes = tokio::fs::read(path).await.map_err(PublishError::io(path))?;
    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("text/markdown")?)
}

#[async_trait]
impl Publisher for PlatformClient {
    async fn update_course(&self, course: &CourseRecord) -> Result<(), PublishError> {
        let form = Form::new()
            .text("name", course.name.clone())
            .text("description", course.description.clone())
            .text("difficulty", course.difficulty.clone())
            .text(
                "estimated_completion_time",
                course.estimated_completion_time.to_string(),
            );
        self.post("courses/update", form).await
    }

    async fn update_task(&self, task: &TaskRecord) -> Result<(), PublishError> {
        let form = Form::new()
            .text("course_name", task.course_name.clone())
            .text("name", task.name.clone())
            .text("description", task.description.clone())
            .text("answer", task.answer.clone())
            .text("difficulty", task.difficulty.clone())
            .text("points", task.points.to_string())
            .part("info", markdown_part(&task.info_path, "info.md").await?)
            .part("writeup", markdown_part(&task.writeup_path, "writeup.md").await?);
        self.post("tasks/update", form).await
    }
}

/// Pushes every course, then its tasks, stopping at the first failure.
pub async fn publish_all(publisher: &dyn Publisher, plans: &[CoursePlan]) -> Result<(), PublishError> {
    for plan in plans {
        tracing::info!("Updating course {}", plan.course.name);
        publisher.update_course(&plan.course).await?;
        for task in &plan.tasks {
            tracing::info!("Updating task {}", task.name);
            publisher.update_task(task).await?;
        }
    }
    Ok(())
}
