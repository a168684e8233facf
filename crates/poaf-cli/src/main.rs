//! POAF interactive binary.

use std::io;

use anyhow::Context;
use clap::Parser;
use poaf_cli::{fetch_missing, Cli, DataDirectory, Downloader, Menu, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so menu output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    println!("=== Protein Ontology and Annotation Framework (POAF) ===");

    let data = DataDirectory::new(&cli.data_dir);
    tracing::info!("Setting up data files in: {}", data.root().display());

    let downloader = Downloader::from_env()?;
    let fetched = fetch_missing(&data, &downloader, &cli.sources(), cli.refresh)
        .await
        .context("Failed to download data files")?;
    for kind in &fetched {
        tracing::info!("Downloaded {} file", kind);
    }

    let summary = data
        .update(cli.obo.as_deref(), cli.paf.as_deref(), chrono::Utc::now())
        .context("Failed to update data files")?;
    if summary.is_up_to_date() {
        tracing::info!("Data files are up to date");
    } else {
        for kind in &summary.updated {
            tracing::info!("Recorded new {} file version", kind);
        }
    }

    if cli.update_only {
        println!("Data update complete.");
        return Ok(());
    }

    let mut session = Session::open(data, cli.load_config())?;
    let report = session.report();
    tracing::info!(
        "Loaded {} terms and {} annotations ({} stanzas skipped, {} rows skipped, {} rows degraded)",
        report.ontology.terms_loaded,
        report.annotations.rows_accepted,
        report.ontology.stanzas_skipped,
        report.annotations.rows_skipped,
        report.annotations.rows_degraded
    );
    println!("Setup complete!");

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(stdin.lock(), stdout.lock()).run(&mut session)?;

    Ok(())
}
