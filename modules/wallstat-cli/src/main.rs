use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vk_client::VkClient;
use wallstat_analytics::{all_strategies, GroupAnalyticsReport};
use wallstat_common::Config;
use wallstat_ingest::IngestionCoordinator;
use wallstat_store::{GroupStore, PgStore};

const MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Parser)]
#[command(name = "wallstat", about = "Track VK communities and report on their walls")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply database migrations
    Migrate,
    /// Start tracking a group by link or screen name, then fetch its wall
    Add { link: String },
    /// Per-group statistics table
    Report,
    /// Subscriber and engagement series for charting
    Chart,
    /// Report rows and chart series together
    Dashboard,
    /// All statistics strategies for one tracked group
    Stats { domain: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_env()?;
    let store = Arc::new(
        PgStore::connect(&config.database_url, MAX_DB_CONNECTIONS)
            .await
            .context("Failed to connect to Postgres")?,
    );

    match cli.command {
        Command::Migrate => {
            store.migrate().await?;
            info!("Migrations applied");
        }
        Command::Add { link } => {
            let vk = Arc::new(
                VkClient::new(&config.vk_access_token, &config.vk_api_version)
                    .with_base_url(&config.vk_api_base_url),
            );
            let coordinator = IngestionCoordinator::new(vk.clone(), vk, store);

            let group_id = coordinator.add_group(&link).await?;
            print_json(&serde_json::json!({ "id": group_id }))?;

            // Abandoned work is picked up again the next time the group is added.
            coordinator.drain(config.reconcile_drain_timeout).await;
        }
        Command::Report => {
            let rows = GroupAnalyticsReport::new(store).build_report().await?;
            print_json(&rows)?;
        }
        Command::Chart => {
            let chart = GroupAnalyticsReport::new(store).build_chart_series().await?;
            print_json(&chart)?;
        }
        Command::Dashboard => {
            let dashboard = GroupAnalyticsReport::new(store).build_dashboard().await?;
            print_json(&dashboard)?;
        }
        Command::Stats { domain } => {
            let group = store
                .find_group_by_domain(&domain)
                .await?
                .with_context(|| format!("Group '{domain}' is not tracked"))?;
            let posts = store.find_posts_by_group(group.id).await?;

            let mut metrics = serde_json::Map::new();
            for strategy in all_strategies() {
                let value = serde_json::to_value(strategy.compute(&posts))?;
                metrics.insert(strategy.name().to_string(), value);
            }
            print_json(&serde_json::json!({
                "id": group.id,
                "domain": group.domain,
                "posts": posts.len(),
                "metrics": metrics,
            }))?;
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
