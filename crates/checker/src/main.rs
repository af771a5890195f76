// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mctf_checker::matrix::list_tasks;
use mctf_checker::orchestrator::run_validation;
use mctf_checker::report::{ConsoleSink, ConsoleStream};
use mctf_checker::{CheckerError, RunContext, RunStatus};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "checker")]
#[command(about = "Validate tasks for platform.", long_about = None)]
struct Cli {
    /// Root of the task catalog
    #[arg(long, env = "TASKS_DIR", default_value = "tasks", global = true)]
    tasks_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks to test
    List {
        /// Only tasks deployed from deploy/
        #[arg(long)]
        remote: bool,

        /// "all", or {"name": .., "category": .., "topic": ..}
        #[arg(long, env = "TASK")]
        task: Option<String>,

        /// File the matrix line is appended to
        #[arg(long, env = "GITHUB_OUTPUT")]
        github_output: Option<PathBuf>,
    },

    /// Run structure validation
    Validate {
        /// "all", or {"name": .., "category": .., "topic": ..}
        #[arg(long, env = "TASK")]
        task: Option<String>,

        /// Number of tasks validated in parallel
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },
}

fn run(ctx: &RunContext, tasks_dir: &std::path::Path, command: Commands) -> Result<RunStatus, CheckerError> {
    match command {
        Commands::List {
            remote,
            task,
            github_output,
        } => {
            let line = list_tasks(
                ctx,
                tasks_dir,
                task.as_deref(),
                remote,
                github_output.as_deref(),
            )?;
            println!("{line}");
            Ok(RunStatus::Passed)
        }
        Commands::Validate { task, jobs } => run_validation(ctx, tasks_dir, task.as_deref(), jobs),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Type -h");
        return RunStatus::Usage.into();
    };

    // stdout of `list` carries only the matrix line
    let ctx = match command {
        Commands::List { .. } => RunContext::new(ConsoleSink::new(ConsoleStream::Stderr)),
        Commands::Validate { .. } => RunContext::console(),
    };
    let status = match run(&ctx, &cli.tasks_dir, command) {
        Ok(status) => status,
        Err(CheckerError::Fatal(_)) => RunStatus::Fatal,
        Err(e) => {
            let report = anyhow::Error::new(e).context("checker run failed");
            println!("Got exception, report it: {report} {report:?}");
            RunStatus::Internal
        }
    };
    tracing::debug!("Exiting with {:?} ({} errors)", status, ctx.error_count());
    status.into()
}
