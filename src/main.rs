use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod api;
mod db;
mod models;
mod report;
mod stats;

#[derive(Parser)]
#[command(name = "maintenance-insights")]
#[command(about = "Analytics over a maintenance-request log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import maintenance requests from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print overview stats for one month
    Overview {
        #[arg(long, default_value_t = 2024)]
        year: i32,
        #[arg(long, default_value_t = 8)]
        month: u32,
    },
    /// Generate a markdown report for one month
    Report {
        #[arg(long, default_value_t = 2024)]
        year: i32,
        #[arg(long, default_value_t = 8)]
        month: u32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Serve the analytics endpoints over HTTP
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} requests from {}.", csv.display());
        }
        Commands::Overview { year, month } => {
            let records = db::fetch_month(&pool, year, month).await?;
            let overview = stats::overview(&records);

            if overview.total_requests == 0 {
                println!("No categorized requests found for {year:04}-{month:02}.");
                return Ok(());
            }

            println!(
                "Requests in {year:04}-{month:02}: {}",
                overview.total_requests
            );
            if let Some(request_type) = &overview.most_common_request {
                println!(
                    "Most common: {} ({} requests)",
                    request_type, overview.most_common_request_count
                );
            }
        }
        Commands::Report { year, month, out } => {
            let records = db::fetch_month(&pool, year, month).await?;
            let report = report::build_report(
                models::MonthKey { year, month },
                &records,
                &stats::FriendlySuggestions::builtin(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Serve { port } => {
            let debug_default = std::env::var("DEBUG_MODE")
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false);
            let state =
                api::AppState::new(pool, stats::FriendlySuggestions::builtin(), debug_default);

            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("serving analytics on http://{}", addr);
            axum::serve(listener, api::router(state)).await?;
        }
    }

    Ok(())
}
