use anyhow::{Context, Result};
use catalog::{Asset, AssetType, SearchQuery, SourceType};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{AppConfig, RecommendationPage, RecommendationService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// reco - multi-source asset recommendations
#[derive(Parser)]
#[command(name = "reco")]
#[command(about = "Rank catalog assets by popularity across scoring services", long_about = None)]
struct Cli {
    /// Path to the TOML config file (defaults to $RECO_CONFIG, then config/reco.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend assets for a query
    Recommend {
        /// Free-text query
        #[arg(long, default_value = "")]
        q: String,

        /// Asset type: dataset, model, paper, application or other
        #[arg(long = "type")]
        asset_type: AssetType,

        /// Restrict to one source: user or external
        #[arg(long)]
        source: Option<SourceType>,

        /// Comma-separated category ids
        #[arg(long)]
        categories: Option<String>,

        /// Number of ranked assets to skip
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Page size (defaults to recommend.default_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Show the metrics behind each score
        #[arg(long)]
        explain: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            q,
            asset_type,
            source,
            categories,
            offset,
            limit,
            explain,
        } => {
            let query = SearchQuery::build(q, Some(asset_type), source, categories.as_deref());
            handle_recommend(config, query, offset, limit, explain).await?
        }
        Commands::Config => handle_config(&config)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    config: AppConfig,
    query: SearchQuery,
    offset: usize,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(config.recommend.default_limit);
    let service = RecommendationService::new(Arc::new(config))
        .context("Failed to create HTTP transport")?;
    debug!("Running query {:?}", query);

    let start = Instant::now();
    let page = service
        .recommend(&query, offset, limit)
        .await
        .with_context(|| format!("Recommendation failed for '{}'", query.text))?;

    println!(
        "{} Ranked {} assets in {:.2?}",
        "✓".green(),
        page.total,
        start.elapsed()
    );
    print_recommendations(&page, offset, explain);
    Ok(())
}

/// Handle the 'config' command
fn handle_config(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", "Effective configuration:".bold().blue());
    println!("{}", rendered);
    Ok(())
}

/// Format and print one page of recommendations
fn print_recommendations(page: &RecommendationPage, offset: usize, explain: bool) {
    if page.assets.is_empty() {
        println!("{}", "No assets to recommend.".yellow());
        return;
    }

    println!("{}", "Recommended assets:".bold().blue());
    for (i, asset) in page.assets.iter().enumerate() {
        let rank = offset + i + 1;
        println!(
            "{}. {} [{}] - Score: {:.3}",
            rank.to_string().green(),
            asset.name,
            asset.document_type,
            asset.relevance_score
        );
        if explain {
            print_explanation(asset);
        }
    }
}

fn print_explanation(asset: &Asset) {
    let downloads = if asset.downloads_count < 0 {
        "unknown".to_string()
    } else {
        asset.downloads_count.to_string()
    };
    println!("   {}id: {}", "• ".cyan(), asset.id);
    println!(
        "   {}likes: {}, downloads: {}",
        "• ".cyan(),
        asset.likes_count,
        downloads
    );
    println!(
        "   {}category: {}, source: {}, published {}",
        "• ".cyan(),
        asset.category_id,
        asset.source,
        asset.date.format("%Y-%m-%d")
    );
}
