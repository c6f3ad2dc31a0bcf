use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use luxrig_bridge::config::DEFAULT_PORT;
use luxrig_bridge::{fs_bridge, logging, server, BridgeConfig};

#[derive(Parser)]
#[command(name = "luxrig-bridge")]
#[command(about = "Aggregates local and cloud AI providers behind one API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the AI bridge (default)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides BRIDGE_HOST)
        #[arg(long)]
        host: Option<String>,
    },

    /// Run the local filesystem bridge
    FsBridge {
        /// Port to listen on
        #[arg(short, long, env = "FS_BRIDGE_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing("info");

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Serve { port, host } => {
            let mut config =
                BridgeConfig::from_env().context("Failed to load bridge configuration")?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            server::serve(config).await
        }
        Commands::FsBridge { port, host } => fs_bridge::serve(&format!("{host}:{port}")).await,
    }
}
