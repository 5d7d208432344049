use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use newsharvest::api::{AppState, create_router};
use newsharvest::config::Config;
use newsharvest::scrapper::DetikScrapper;
use newsharvest::xml_tools;

#[derive(Parser)]
#[command(name = "newsharvest", about = "Detik news search API and archive tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search API (default)
    Serve {
        /// Address to listen on, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Split an XML export into one file per <data> record
    SplitXml {
        #[arg(default_value = "berita.xml")]
        input: PathBuf,
        #[arg(default_value = "split_data")]
        output_dir: PathBuf,
    },
    /// Repair and convert a directory of XML files to JSON
    XmlToJson {
        #[arg(default_value = "split_data")]
        input_dir: PathBuf,
        #[arg(default_value = "json_output")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber, log crate records are bridged below
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(bind).await,
        Command::SplitXml { input, output_dir } => {
            let written = xml_tools::split_by_data(&input, &output_dir)
                .with_context(|| format!("failed to split {}", input.display()))?;
            println!("{} files written to {}", written.len(), output_dir.display());
            Ok(())
        }
        Command::XmlToJson {
            input_dir,
            output_dir,
        } => {
            let summary = xml_tools::convert_dir(&input_dir, &output_dir)?;
            println!("converted: {}", summary.converted);
            println!("failed: {}", summary.failed.len());
            for (path, error) in &summary.failed {
                println!("  {}: {}", path.display(), error);
            }
            println!("output: {}", output_dir.display());
            Ok(())
        }
    }
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());

    let scrapper = DetikScrapper::new(&config).context("failed to build scraper")?;
    let state = AppState::new(Arc::new(scrapper), config.search_deadline);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
