use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cli::auth::AuthCommands;
use clio_connect_cli::config::Config;

#[derive(Parser)]
#[command(name = "clio-connect")]
#[command(about = "Clio Connect - CLIO OAuth token lifecycle service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the token and OAuth state tables if they are missing
    Migrate,
    /// Inspect and manage the stored CLIO connection
    #[command(subcommand)]
    Auth(AuthCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    clio_connect_cli::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port } => {
            if let Some(port) = port.filter(|p| *p != 0) {
                config.port = port;
            }
            println!("{}", "🚀 Starting Clio Connect server...".bold().cyan());
            println!("📡 Server will run on http://localhost:{}", config.port);
            clio_connect_cli::run_server(config).await
        }
        Commands::Migrate => {
            clio_connect_cli::build_manager(&config).await?;
            println!("{} Database schema is up to date", "✓".green().bold());
            Ok(())
        }
        Commands::Auth(auth_cmd) => auth_cmd.execute(&config).await,
    }
}
