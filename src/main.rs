// realty-scout - asks an answering service about residential projects
//
// Parses CLI args, wires up the pipeline, and dispatches to handlers.

use anyhow::{Context, Result};
use clap::Parser;
use realty_scout_lib::{
    cli::{BatchArgs, Cli, Commands},
    core::{AcquisitionClient, BatchOrchestrator, ItemReport, Outcome, Summary, TokioSleeper, Validator, Verdict},
    input,
    service::HttpAnswerService,
    store::{ErrorLog, ResultTable, Table},
    Config,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match &cli.command {
        Commands::Fetch { name } => handle_fetch(&config, name, cli.json).await,
        Commands::Batch(args) => handle_batch(&config, args, cli.json).await,
        Commands::Import {
            file,
            keep_duplicates,
        } => {
            let names = input::read_names_from_csv(file)
                .with_context(|| format!("Could not read names from {}", file.display()))?;
            run_names(&config, names, *keep_duplicates, cli.json).await
        }
        Commands::Show => handle_show(&config, cli.json),
        Commands::Errors => handle_errors(&config, cli.json),
        Commands::Validate { factor, value } => handle_validate(&config, factor, value, cli.json).await,
    }
}

fn build_orchestrator(config: &Config) -> Result<BatchOrchestrator> {
    let service = Arc::new(HttpAnswerService::new(config)?);
    let sleeper = Arc::new(TokioSleeper);
    let client = AcquisitionClient::new(
        service,
        sleeper.clone(),
        config.retry_policy(),
        config.region.clone(),
    );

    Ok(BatchOrchestrator::new(
        client,
        ResultTable::new(config.results_path()),
        ErrorLog::new(config.error_log_path()),
        sleeper,
        config.project_delay,
    ))
}

async fn handle_fetch(config: &Config, name: &str, json: bool) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        eprintln!("Error: please enter a project name");
        return Ok(());
    }

    let orchestrator = build_orchestrator(config)?;
    let report = orchestrator.process_one(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.record)?);
        return Ok(());
    }

    match report.outcome {
        Outcome::Success => println!("✓ Data for '{}' collected successfully", name),
        Outcome::Partial => println!("~ Partial data collected with some errors: {}", report.message),
        Outcome::Failure => println!("✗ Failed to collect data: {}", report.message),
    }
    println!("{}", serde_json::to_string_pretty(&report.record)?);
    println!("\nSaved to {}", orchestrator.table().path().display());

    Ok(())
}

async fn handle_batch(config: &Config, args: &BatchArgs, json: bool) -> Result<()> {
    let mut names: Vec<String> = args
        .names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if let Some(file) = &args.file {
        let from_file = input::read_name_lines(file)
            .with_context(|| format!("Could not read names from {}", file.display()))?;
        names.extend(from_file);
    }

    run_names(config, names, args.keep_duplicates, json).await
}

async fn run_names(config: &Config, names: Vec<String>, keep_duplicates: bool, json: bool) -> Result<()> {
    let names = if keep_duplicates {
        names
    } else {
        input::dedup_preserving_order(names)
    };

    if names.is_empty() {
        eprintln!("Error: no project names given");
        return Ok(());
    }

    let orchestrator = build_orchestrator(config)?;

    // Ctrl-C stops before the next project starts
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current project");
            on_signal.cancel();
        }
    });

    eprintln!("Processing {} unique projects...", names.len());
    let summary = orchestrator.run_until_cancelled(names.as_slice(), &cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
        println!("\nResults:   {}", orchestrator.table().path().display());
        if orchestrator.error_log().path().exists() {
            println!("Error log: {}", orchestrator.error_log().path().display());
        }
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("\nProcessing Results");
    println!("{}", "=".repeat(60));
    for (i, ItemReport { project_name, outcome, message, .. }) in summary.details.iter().enumerate() {
        println!("{:3}. {:<30} {:<8} {}", i + 1, project_name, outcome.to_string(), message);
    }
    println!("{}", "=".repeat(60));
    if summary.cancelled {
        println!("Stopped early.");
    }
    println!(
        "Completed! Success: {}, Partial: {}, Failed: {}",
        summary.success, summary.partial, summary.failure
    );
}

fn handle_show(config: &Config, json: bool) -> Result<()> {
    let table = ResultTable::new(config.results_path()).read()?;
    if table.headers.is_empty() {
        println!("No data collected yet in {}", config.results_path().display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print_table(&table);
    }
    Ok(())
}

fn handle_errors(config: &Config, json: bool) -> Result<()> {
    let entries = ErrorLog::new(config.error_log_path()).read()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No errors logged.");
    } else {
        for entry in &entries {
            println!("{}  {:<30} {}", entry.timestamp, entry.project_name, entry.message);
        }
    }
    Ok(())
}

fn print_table(table: &Table) {
    for (i, row) in table.rows.iter().enumerate() {
        println!("{}", "=".repeat(60));
        println!("Row {}", i + 1);
        for (header, cell) in table.headers.iter().zip(row) {
            println!("  {:<40} {}", header, cell);
        }
    }
    println!("{}", "=".repeat(60));
    println!("{} row(s)", table.len());
}

async fn handle_validate(config: &Config, factor: &str, value: &str, json: bool) -> Result<()> {
    let service = Arc::new(HttpAnswerService::new(config)?);
    let validation = Validator::new(service).validate(factor, value).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
        return Ok(());
    }

    let label = match &validation.verdict {
        Verdict::Valid => "Valid",
        Verdict::Invalid => "Invalid",
        Verdict::Unclear => "Unclear",
        Verdict::Error(_) => "Error",
    };
    println!("{}: {}", label, validation.reason);
    Ok(())
}
