//! Manualbot CLI
//!
//! Command-line interface for ingesting application manuals and answering
//! scoped questions against them. Every command prints a single JSON value
//! on stdout so the binary is easy to drive from scripts and services.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use manualbot_lib::{
    from_settings, DataPaths, ProviderSettings, QueryScope, RagService, TenantRegistry,
};

#[derive(Parser)]
#[command(name = "manualbot")]
#[command(about = "Manualbot CLI - Retrieval-augmented answers over application manuals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a manual (PDF, DOCX, or plain text) for one application
    Ingest {
        /// Path to the manual file
        file: PathBuf,
        /// Application the manual belongs to
        #[arg(short, long)]
        app: String,
    },
    /// Ask a question against the indexed manuals
    Query {
        /// The question to answer
        question: String,
        /// Application scope, or "comparison" to compare across applications
        #[arg(short, long)]
        app: String,
    },
    /// Application registry commands
    Apps {
        #[command(subcommand)]
        action: AppsAction,
    },
}

#[derive(Subcommand)]
enum AppsAction {
    /// List registered applications
    List,
    /// Register an application name
    Add {
        /// Application name
        name: String,
    },
    /// Remove an application from the registry (indexed passages remain)
    Delete {
        /// Application name
        name: String,
    },
}

// ============ Output Types ============

#[derive(Serialize)]
struct IngestOutput {
    app: String,
    file: String,
    passages_indexed: usize,
}

#[derive(Serialize)]
struct QueryOutput {
    app: String,
    answer: String,
}

#[derive(Serialize)]
struct AppListItem {
    name: String,
    manual_filename: Option<String>,
    added_at: String,
}

#[derive(Serialize)]
struct StatusOutput {
    status: String,
    app: String,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

// ============ Main ============

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest { file, app } => handle_ingest(&file, &app).await,
        Commands::Query { question, app } => handle_query(&question, &app).await,
        Commands::Apps { action } => handle_apps(action),
    };

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let error = ErrorOutput { error: format!("{:#}", e) };
            println!("{}", serde_json::to_string(&error).unwrap());
            std::process::exit(1);
        }
    }
}

fn build_service(paths: &DataPaths) -> anyhow::Result<RagService> {
    let settings = ProviderSettings::from_env().context("Provider configuration")?;
    let (embedder, generator) = from_settings(&settings)?;
    Ok(RagService::new(embedder, generator, paths.index_dir.clone()))
}

// ============ Handlers ============

async fn handle_ingest(file: &Path, app: &str) -> anyhow::Result<String> {
    let paths = DataPaths::resolve()?;
    let service = build_service(&paths)?;

    let count = service.ingest(file, app).await?;

    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let mut registry = TenantRegistry::load(&paths.registry_path)?;
    registry.record_ingestion(app, &filename)?;

    let output = IngestOutput {
        app: app.to_string(),
        file: filename,
        passages_indexed: count,
    };
    Ok(serde_json::to_string(&output)?)
}

async fn handle_query(question: &str, app: &str) -> anyhow::Result<String> {
    let paths = DataPaths::resolve()?;
    let service = build_service(&paths)?;

    let scope = QueryScope::parse(app);
    let answer = service.query(question, &scope).await?;

    let output = QueryOutput {
        app: app.to_string(),
        answer,
    };
    Ok(serde_json::to_string(&output)?)
}

fn handle_apps(action: AppsAction) -> anyhow::Result<String> {
    let paths = DataPaths::resolve()?;
    let mut registry = TenantRegistry::load(&paths.registry_path)?;

    match action {
        AppsAction::List => {
            let items: Vec<AppListItem> = registry
                .list()
                .iter()
                .map(|t| AppListItem {
                    name: t.name.clone(),
                    manual_filename: t.manual_filename.clone(),
                    added_at: t.added_at.to_rfc3339(),
                })
                .collect();
            Ok(serde_json::to_string(&items)?)
        }

        AppsAction::Add { name } => {
            registry.add(&name)?;
            let output = StatusOutput {
                status: "added".to_string(),
                app: name,
            };
            Ok(serde_json::to_string(&output)?)
        }

        AppsAction::Delete { name } => {
            registry.delete(&name)?;
            let output = StatusOutput {
                status: "deleted".to_string(),
                app: name,
            };
            Ok(serde_json::to_string(&output)?)
        }
    }
}
