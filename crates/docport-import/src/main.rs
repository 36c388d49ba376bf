//! docport-import - relational CSV export to document store

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use docport_common::logging::{init_logging, LogConfig, LogLevel};
use docport_import::config::{load_env_files, ImportConfig};
use docport_import::importer::{ImportOptions, Importer};
use docport_import::report::ImportReport;
use docport_import::store::{DocumentStore, MemoryStore, RemoteStore};
use docport_import::Cli;
use std::path::Path;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Env files may carry DOCPORT_LOG_* as well as the deployment settings
    load_env_files(&cli.dir);

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .log_file_prefix("docport-import")
        .filter_directives("hyper=warn,reqwest=warn")
        .build();

    // Environment variables take precedence over the flag-derived defaults
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The importer still works without a logger
    let _ = init_logging(&log_config);

    match run(&cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!(error = %e, "Import aborted");
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        },
    }
}

async fn run(cli: &Cli) -> anyhow::Result<i32> {
    cli.validate()?;

    let options = ImportOptions {
        show_progress: true,
        print_tables: true,
        only: cli.only.clone(),
    };

    let report = if cli.dry_run {
        println!("{}", "Dry run: documents are transformed but not written.".yellow());
        import(MemoryStore::new(), options, &cli.dir).await?
    } else {
        let config = ImportConfig::from_env(&cli.dir)?;
        let store = RemoteStore::new(&config).context("Failed to build HTTP client")?;
        info!(endpoint = store.endpoint(), "Using remote store");
        println!("Importing into {}", config.deployment_url.bold());
        import(store, options, &config.data_dir).await?
    };

    report.print_summary(&cli.dir);
    Ok(report.exit_code())
}

async fn import<S: DocumentStore>(
    store: S,
    options: ImportOptions,
    dir: &Path,
) -> anyhow::Result<ImportReport> {
    let mut importer = Importer::new(store, options);
    let report = importer.run(dir).await?;
    Ok(report)
}
