// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use clap::Parser;
use mctf_uploader::{PlatformClient, collect_courses, publish_all};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "uploader")]
#[command(about = "Publish tasks to the course platform", long_about = None)]
struct Cli {
    /// Base URL of the platform
    #[arg(long)]
    url: String,

    #[arg(long, env = "API_KEY")]
    api_key: String,

    /// Root of the task catalog
    #[arg(long, default_value = "tasks")]
    path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if !cli.path.is_dir() {
        println!("Tasks directory not found");
        return Ok(());
    }

    let plans = collect_courses(&cli.path)?;
    tracing::info!("Found {} courses", plans.len());
    let client = PlatformClient::connect(&cli.url, &cli.api_key).await?;
    publish_all(&client, &plans).await?;
    Ok(())
}
