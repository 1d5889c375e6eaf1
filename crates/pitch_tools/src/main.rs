//! Pitch - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pitch-tools")]
#[command(about = "Development tools for the pitch match simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a match config file, or every .ron file in a directory
    Validate {
        /// Path to a config file or directory
        #[arg(default_value = "assets/config")]
        path: PathBuf,
    },
    /// Print the default match config as RON
    DefaultConfig {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating match configs in: {}", path.display());
            match pitch_tools::validate::validate_path(&path) {
                Ok(count) => tracing::info!("Validation passed ({count} file(s))"),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::DefaultConfig { output } => {
            let text = match pitch_tools::validate::default_config_ron() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to render default config: {e}");
                    std::process::exit(1);
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, text) {
                        tracing::error!("Failed to write {}: {e}", path.display());
                        std::process::exit(1);
                    }
                    tracing::info!("Wrote default config to {}", path.display());
                }
                None => println!("{text}"),
            }
        }
    }
}
