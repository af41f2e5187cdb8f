use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use komposer::config::load_config;
use komposer::infra::{compose::ComposeLoader, observer::LogObserver, web::router};
use komposer::{convert, ConversionService};
use log::info;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(version, about = "Convert compose v3 files to an intermediate application model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a compose file and print the resulting model as JSON
    Convert {
        /// Compose files, only the first one is read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Serve the conversion endpoint over HTTP
    Serve {
        /// Listen address, overrides KOMPOSER_LISTEN_ADDRESS
        #[arg(long)]
        listen_address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let cli = Cli::parse();

    let service = ConversionService {
        document_loader: Box::new(ComposeLoader),
        observer: Box::new(LogObserver),
    };

    match cli.command {
        Commands::Convert { files } => {
            let app = convert(&files, &service).context("Can't convert compose file")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&app).context("Can't serialize converted model")?
            );
        }
        Commands::Serve { listen_address } => {
            let address = listen_address.unwrap_or(config.listen_address);
            info!("Start komposer conversion endpoint on {}", address);
            let listener = TcpListener::bind(&address)
                .await
                .with_context(|| format!("Can't bind {address}"))?;
            axum::serve(listener, router(service)).await?;
        }
    }
    Ok(())
}
