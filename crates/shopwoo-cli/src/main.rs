mod import;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::import::Plan;

#[derive(Debug, Parser)]
#[command(name = "shopwoo")]
#[command(about = "Migrate a Shopify storefront catalog into WooCommerce")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the full storefront catalog into batch files, then import them
    Crawl {
        /// Storefront URL (defaults to `SHOPIFY_BASE_URL`)
        #[arg(long)]
        shop_url: Option<String>,

        /// Directory for batch files (defaults to `SHOPWOO_EXPORT_DIR`)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Products per page, at most 250 (defaults to `SHOPWOO_PAGE_SIZE`)
        #[arg(long)]
        page_size: Option<u32>,

        /// Save batch files without importing them
        #[arg(long)]
        no_import: bool,
    },
    /// Import batch files saved by an earlier crawl
    Replay {
        /// Directory holding the batch files (defaults to `SHOPWOO_EXPORT_DIR`)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Import specific products by URL or handle
    Products {
        /// Storefront URL (defaults to `SHOPIFY_BASE_URL`)
        #[arg(long)]
        shop_url: Option<String>,

        /// Product URLs or handles; comma-separated lists are accepted
        #[arg(required = true)]
        selectors: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = shopwoo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let plan = match cli.command {
        Some(command) => Plan::from_command(command, &config)?,
        None => match Plan::from_config(&config)? {
            Some(plan) => plan,
            None => {
                let stdin = std::io::stdin();
                let mut stdout = std::io::stdout();
                prompt::ask_plan(&mut stdin.lock(), &mut stdout, &config)?
            }
        },
    };

    tokio::select! {
        result = import::run(plan, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, abandoning remaining products");
            println!("interrupted; products already saved remain in the store");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
