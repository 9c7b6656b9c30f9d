// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context};
use std::env;
use std::time::Instant;
use the_conclave::config::{load_and_validate_config, RuntimeBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config.yaml> [config.yaml ...]", args[0]);
        eprintln!("Example: {} configs/hub-spoke-demo.yaml", args[0]);
        std::process::exit(1);
    }

    let mut failed = false;
    for config_file in &args[1..] {
        if let Err(e) = run_single_config(config_file).await {
            eprintln!("Failed to execute {}: {:#}", config_file, e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

/// Load, build and run one configuration, printing the status reports as JSON.
async fn run_single_config(config_file: &str) -> anyhow::Result<()> {
    let config = load_and_validate_config(config_file)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("loading {}", config_file))?;

    let runtime = RuntimeBuilder::from_config(&config)
        .await
        .map_err(|e| anyhow!(e))
        .context("building runtime")?;

    let start = Instant::now();
    let results = runtime
        .orchestrator
        .execute_sequential(runtime.tasks.clone(), true)
        .await
        .context("running configured tasks")?;
    tracing::info!(
        config = config_file,
        tasks = results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Finished configured workload"
    );

    let report = serde_json::json!({
        "config": config_file,
        "results": results,
        "orchestrator": runtime.orchestrator.status().await,
        "environment": runtime.environment.status().await,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
