mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calrss")]
#[command(about = "Generate RSS feeds from calendar files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSS feed from a calendar JSON file
    Generate {
        /// Calendar JSON file
        #[arg(short, long)]
        input: String,

        /// Start date (YYYY-MM-DD); defaults to today
        #[arg(short = 's', long)]
        start_date: Option<String>,

        /// Number of days ahead to include
        #[arg(short, long, default_value = "30")]
        days: i64,

        /// Maximum number of feed items
        #[arg(short, long, default_value = "10")]
        max: usize,

        /// Repeat handling: 0 = none, 1 = all, 2 = daily shown once
        #[arg(short, long, default_value = "0")]
        repeats: i64,

        /// Category id to filter on
        #[arg(long)]
        cat_id: Option<i64>,

        /// Put the date (and time) in item titles
        #[arg(long)]
        showdate: bool,

        /// Base URL for item links
        #[arg(long, default_value = "http://localhost/")]
        base_url: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the contents of a calendar JSON file
    Inspect {
        /// Calendar JSON file
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("calrss_cli={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            input,
            start_date,
            days,
            max,
            repeats,
            cat_id,
            showdate,
            base_url,
            output,
        } => {
            commands::generate_command(commands::GenerateParams {
                input,
                start_date,
                days,
                max,
                repeats,
                cat_id,
                showdate,
                base_url,
                output,
            })
            .await
        }

        Commands::Inspect { input } => commands::inspect_command(input).await,
    }
}
