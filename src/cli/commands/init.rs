//! `init` command: provision the star schema

use super::shared::display_database;
use crate::cli::args::InitArgs;
use crate::db::{connect, schema};
use anyhow::Context;
use colored::*;
use tracing::info;

/// Create the five tables, dropping existing ones first with `--drop`
pub async fn run_init(args: &InitArgs, database_url: &str) -> anyhow::Result<()> {
    let pool = connect(database_url, true)
        .await
        .with_context(|| format!("Failed to open {}", display_database(database_url)))?;

    let result = if args.drop {
        info!("Dropping and recreating the star schema");
        schema::reset(&pool).await
    } else {
        schema::create_tables(&pool).await
    };
    pool.close().await;
    result.context("Failed to provision the star schema")?;

    println!(
        "{} Star schema ready in {}",
        "✓".green().bold(),
        display_database(database_url)
    );
    Ok(())
}
