use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use molstar_mvsx::archive::MvsxContents;
use molstar_mvsx::{api, config::ServerConfig};

#[derive(Parser)]
#[command(name = "mvsx")]
#[command(about = "Package molecular trajectories as MolViewSpec archives for Mol*")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the trajectory viewer server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Directory containing trajectory pairs
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List trajectory pairs found in the data directory
    List {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Write the MVSX archive for one trajectory pair
    Pack {
        /// Trajectory id (file-name prefix)
        id: String,

        /// Output file, defaults to `<id>.mvsx`
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Show the entries and manifest of an MVSX archive
    Inspect { file: PathBuf },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "molstar_mvsx=debug,tower_http=debug".into()),
    );

    // stdout stays clean for command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_with(data_dir: Option<PathBuf>) -> ServerConfig {
    let mut config = ServerConfig::load();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Serving trajectories from {} on {}",
        config.data_dir.display(),
        config.bind_addr()
    );

    let app = api::create_router(config.catalog());
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!("Listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            data_dir,
        }) => {
            let mut config = config_with(data_dir);
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            serve(config).await?;
        }
        Some(Commands::List { data_dir }) => {
            let catalog = config_with(data_dir).catalog();
            for entry in catalog.list()? {
                println!("{}\t{}", entry.id, entry.label);
            }
        }
        Some(Commands::Pack {
            id,
            output,
            data_dir,
        }) => {
            let catalog = config_with(data_dir).catalog();
            let bytes = catalog.fetch_archive(&id)?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{id}.mvsx")));
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} ({} bytes)", output.display(), bytes.len());
        }
        Some(Commands::Inspect { file }) => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let contents = MvsxContents::read(&bytes)?;
            for entry in contents.entries() {
                println!("{:>10}  {}", entry.data.len(), entry.name);
            }
            println!();
            println!("{}", contents.manifest()?);
        }
        None => serve(ServerConfig::load()).await?,
    }

    Ok(())
}
