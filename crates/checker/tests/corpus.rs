// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use mctf_checker::discovery::discover_tasks;
use mctf_checker::matrix::list_tasks;
use mctf_checker::orchestrator::{run_validation, validate_structure};
use mctf_checker::report::{MemorySink, Severity};
use mctf_checker::{CheckerError, RunContext, RunStatus};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn manifest(name: &str, kind: &str) -> String {
    format!(
        "description:\n  name: {name}\n  difficulty: medium\nhost-data:\n  type: {kind}\n  flag: mctf{{{name}}}\n"
    )
}

/// A small catalog shaped like the real one: local crypto tasks, deployed web tasks.
fn catalog() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let r = root.path();

    write(r, "crypto/fields/basic_ops/task.yml", &manifest("basic_ops", "local"));
    write(r, "crypto/fields/basic_ops/DESCRIPTION.md", "Solve it.\n");
    write(r, "crypto/fields/basic_ops/public/task.py", "print('hi')\n");
    write(r, "crypto/fields/basic_ops/solve/WRITEUP.md", "Done.\n");

    write(r, "web/basics/sqli-error/task.yml", &manifest("sqli-error", "remote"));
    write(r, "web/basics/sqli-error/DESCRIPTION.md", "Break it.\n");
    write(r, "web/basics/sqli-error/deploy/app.py", "app = None\n");
    write(
        r,
        "web/basics/sqli-error/deploy/Dockerfile",
        "FROM python:3.12-slim\nCOPY . /app\nCMD [\"python\", \"/app/app.py\"]\n",
    );
    write(
        r,
        "web/basics/sqli-error/docker-compose.yml",
        r#"version: "2.4"
services:
  app:
    build: deploy
    container_name: sqli-error-app
    restart: unless-stopped
    pids_limit: 256
    mem_limit: 256m
    cpus: 0.5
    ports:
      - "8080:8080"
    depends_on:
      - db
  db:
    image: postgres:16-alpine
    container_name: sqli-error-db
    restart: unless-stopped
    environment:
      POSTGRES_PASSWORD: postgres
"#,
    );
    write(r, ".github/scripts/upload.py", "ignored\n");
    root
}

#[test]
fn test_valid_catalog_passes() {
    let root = catalog();
    let sink = MemorySink::new();
    let ctx = RunContext::new(sink.clone());
    let status = run_validation(&ctx, root.path(), Some("all"), 2).unwrap();
    assert_eq!(status, RunStatus::Passed, "{:?}", sink.records());
    assert!(sink.messages(Severity::Fail).is_empty());
    assert!(sink.messages(Severity::Warning).is_empty());
}

#[test]
fn test_broken_compose_fails_only_that_task() {
    let root = catalog();
    write(
        root.path(),
        "web/basics/sqli-error/docker-compose.yml",
        r#"services:
  app:
    build: deploy
    image: also-an-image
    container_name: sqli-error-app
    restart: unless-stopped
  db:
    image: redis:7
    container_name: db
    restart: unless-stopped
  web:
    image: myapp:latest
    container_name: web
    restart: unless-stopped
    privileged: true
"#,
    );

    let sink = MemorySink::new();
    let ctx = RunContext::new(sink.clone());
    let tasks = discover_tasks(&ctx, root.path(), None, false).unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(validate_structure(&ctx, root.path(), &tasks, 1), RunStatus::Failed);

    let path = "web/basics/sqli-error/docker-compose.yml";
    assert_eq!(
        sink.messages(Severity::Fail),
        vec![
            format!("both image and build options in {path} for container app"),
            format!("option privileged in {path} is not allowed for container web"),
            format!("required option pids_limit not in {path} for service web"),
            format!("required option mem_limit not in {path} for service web"),
            format!("required option cpus not in {path} for service web"),
            "failed".to_string(),
        ]
    );
    assert_eq!(
        sink.messages(Severity::Warning),
        vec!["service web may need to depends_on database db"]
    );
    assert!(sink
        .records()
        .iter()
        .filter(|r| r.severity == Severity::Fail && r.message != "failed")
        .all(|r| r.subject == "Structure validator for sqli-error"));
}

#[test]
fn test_single_task_listing() {
    let root = catalog();
    let ctx = RunContext::new(MemorySink::new());
    let line = list_tasks(
        &ctx,
        root.path(),
        Some(r#"{"name": "sqli-error", "category": "web", "topic": "basics"}"#),
        false,
        None,
    )
    .unwrap();
    assert!(line.starts_with("matrix="));
    assert!(line.contains(r#"\"name\":\"sqli-error\""#));
}

#[test]
fn test_malformed_selector_aborts_before_validation() {
    let root = catalog();
    let sink = MemorySink::new();
    let ctx = RunContext::new(sink.clone());
    let result = run_validation(&ctx, root.path(), Some(r#"{"name": 1}"#), 1);
    assert!(matches!(result, Err(CheckerError::Fatal(_))));
    assert_eq!(sink.records().len(), 1);
    assert!(ctx.is_halted());
}
