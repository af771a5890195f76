// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Just enough Dockerfile parsing to find the image a build starts from.

use std::collections::HashMap;

struct Stage {
    image: String,
    alias: Option<String>,
}

/// Joins `\` continuations and drops comments and blank lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(head) = line.strip_suffix('\\') {
            current.push_str(head);
            current.push(' ');
            continue;
        }
        current.push_str(line);
        lines.push(std::mem::take(&mut current));
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Expands `$VAR`, `${VAR}` and `${VAR:-default}`. Unknown variables expand to nothing.
fn substitute(input: &str, vars: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut body = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                body.push(c);
            }
            let (name, default) = match body.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (body.as_str(), None),
            };
            match vars.get(name).filter(|v| !v.is_empty()) {
                Some(value) => output.push_str(value),
                None => output.push_str(default.unwrap_or_default()),
            }
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                output.push('$');
            } else if let Some(value) = vars.get(&name) {
                output.push_str(value);
            }
        }
    }
    output
}

fn parse_from(args: &str) -> Option<Stage> {
    let mut words = args.split_whitespace().skip_while(|w| w.starts_with("--"));
    let image = words.next()?.to_string();
    let alias = match words.next() {
        Some(kw) if kw.eq_ignore_ascii_case("as") => words.next().map(str::to_string),
        _ => None,
    };
    Some(Stage { image, alias })
}

/// Returns the image the final stage of `text` is built on.
///
/// References to earlier stages are followed back to their image; `ARG`
/// defaults declared before the first `FROM` are substituted.
pub fn base_image(text: &str) -> Option<String> {
    let mut global_args = HashMap::new();
    let mut stages: Vec<Stage> = Vec::new();

    for line in logical_lines(text) {
        let (instruction, args) = match line.split_once(char::is_whitespace) {
            Some((instruction, args)) => (instruction, args.trim()),
            None => (line.as_str(), ""),
        };
        if instruction.eq_ignore_ascii_case("ARG") && stages.is_empty() {
            let (name, default) = match args.split_once('=') {
                Some((name, default)) => (name.trim(), unquote(default.trim())),
                None => (args, ""),
            };
            global_args.insert(name.to_string(), default.to_string());
        } else if instruction.eq_ignore_ascii_case("FROM") {
            let mut stage = parse_from(args)?;
            stage.image = substitute(&stage.image, &global_args);
            stages.push(stage);
        }
    }

    let mut image = stages.last()?.image.clone();
    // aliases can only name earlier stages
    for stage in stages.iter().rev().skip(1) {
        if stage
            .alias
            .as_deref()
            .is_some_and(|alias| alias.eq_ignore_ascii_case(&image))
        {
            image = stage.image.clone();
        }
    }
    (!image.is_empty()).then_some(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stage() {
        assert_eq!(
            base_image("FROM python:3.12-slim\nWORKDIR /app\nCOPY . .\n").as_deref(),
            Some("python:3.12-slim")
        );
    }

    #[test]
    fn test_no_from() {
        assert_eq!(base_image("# nothing here\nRUN echo hi\n"), None);
        assert_eq!(base_image(""), None);
    }

    #[test]
    fn test_last_stage_wins() {
        let text = "FROM golang:1.22 AS build\nRUN go build\n\nFROM alpine:3.19\nCOPY --from=build /app /app\n";
        assert_eq!(base_image(text).as_deref(), Some("alpine:3.19"));
    }

    #[test]
    fn test_stage_alias_is_followed() {
        let text = "FROM node:20 as deps\nRUN npm ci\nFROM deps AS test\nFROM test\n";
        assert_eq!(base_image(text).as_deref(), Some("node:20"));
    }

    #[test]
    fn test_platform_flag_and_args() {
        let text = "ARG PY_VERSION=\"3.11\"\nFROM --platform=linux/amd64 python:${PY_VERSION}-slim\n";
        assert_eq!(base_image(text).as_deref(), Some("python:3.11-slim"));

        let text = "ARG TAG\nFROM redis:${TAG:-7}\n";
        assert_eq!(base_image(text).as_deref(), Some("redis:7"));

        let text = "ARG BASE=postgres\nFROM $BASE:16\n";
        assert_eq!(base_image(text).as_deref(), Some("postgres:16"));
    }

    #[test]
    fn test_continuation_lines() {
        let text = "FROM \\\n  mongo:7 \\\n  AS db\n";
        assert_eq!(base_image(text).as_deref(), Some("mongo:7"));
    }

    #[test]
    fn test_lowercase_instruction() {
        assert_eq!(base_image("from nginx:1.25\n").as_deref(), Some("nginx:1.25"));
    }
}
