use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod archive;
mod config;
mod directory;
mod error;
mod http;
mod models;
mod store;
mod tabular;

use crate::config::AppConfig;
use crate::directory::EmployeeDirectory;
use crate::models::FeedbackSubmission;
use crate::store::FeedbackStore;

#[derive(Parser)]
#[command(name = "team-feedback-desk")]
#[command(about = "Collects employee feedback forms and keeps them as JSON and CSV files", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
        /// Static files served for non-API paths
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },
    /// Store a submission read from a JSON file
    Submit {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print every stored record as JSON
    List {
        #[arg(long)]
        pretty: bool,
    },
    /// Write a zip of all stored files
    Export {
        #[arg(long, default_value = archive::ARCHIVE_FILENAME)]
        out: PathBuf,
    },
    /// Show the employee table
    Employees,
}

impl Commands {
    /// `list` and `export` only read stored files, so they run without the
    /// employee table.
    fn needs_employee_table(&self) -> bool {
        !matches!(self, Commands::List { .. } | Commands::Export { .. })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("team_feedback_desk=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let directory = if cli.command.needs_employee_table() {
        let directory = cli.config.load_directory()?;
        if directory.is_empty() {
            warn!("employee table is empty; every rating will be exported as Unknown");
        }
        directory
    } else {
        EmployeeDirectory::default()
    };

    match cli.command {
        Commands::Employees => {
            for employee in directory.employees() {
                println!("{}\t{}\t{}", employee.id, employee.number, employee.name);
            }
        }
        Commands::Serve { bind, public_dir } => {
            let store = open_store(&cli.config, directory)?;
            let data_dir = store.data_dir().to_path_buf();
            let state = Arc::new(http::AppState::new(store));
            let router = http::create_router(state, public_dir);
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;

            info!("server running on http://{bind}");
            info!("data will be saved to {}", data_dir.display());
            info!("POST /api/feedback (submit feedback)");
            info!("GET /api/feedback (view all feedback)");
            info!("GET /api/download-all (download all as ZIP)");

            axum::serve(listener, router)
                .await
                .context("HTTP server stopped")?;
        }
        Commands::Submit { file } => {
            let store = open_store(&cli.config, directory)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let submission: FeedbackSubmission = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a feedback submission", file.display()))?;
            let handle = store.store(&submission)?;
            println!(
                "Saved {}: {} and {}.",
                handle.base_name,
                handle.json_path.display(),
                handle.csv_path.display()
            );
        }
        Commands::List { pretty } => {
            let store = open_store(&cli.config, directory)?;
            let records = store.list_all().context("error reading feedback")?;
            let output = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{output}");
        }
        Commands::Export { out } => {
            let store = open_store(&cli.config, directory)?;
            let mut spool = store.export_all().context("error creating ZIP")?;
            let mut target = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            std::io::copy(&mut spool, &mut target)?;
            println!("Archive written to {}.", out.display());
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig, directory: EmployeeDirectory) -> anyhow::Result<FeedbackStore> {
    FeedbackStore::open(config, directory).with_context(|| {
        format!(
            "failed to prepare data directory {}",
            config.data_dir.display()
        )
    })
}
