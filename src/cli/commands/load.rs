//! `load` command: run the pipeline and report

use super::shared::display_database;
use crate::cli::args::{LoadArgs, OutputFormat};
use crate::db::connect;
use crate::models::{BatchStats, RunStats};
use crate::processor::Pipeline;
use anyhow::Context;
use colored::*;
use indicatif::HumanDuration;
use std::time::Duration;
use tracing::{debug, info};

/// Load every song file, then every log file, into an existing schema.
///
/// The database must already hold the star schema (see `init`); loading
/// never creates tables.
pub async fn run_load(
    args: &LoadArgs,
    database_url: &str,
    show_progress: bool,
) -> anyhow::Result<RunStats> {
    let config = args.to_config(database_url, show_progress);
    debug!("Loaded configuration: {:?}", config);
    config.validate()?;

    info!(
        "Loading {} and {} into {}",
        config.song_data_path.display(),
        config.log_data_path.display(),
        display_database(&config.database_url)
    );

    let pool = connect(&config.database_url, false)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} (run `init` first)",
                display_database(&config.database_url)
            )
        })?;

    let result = Pipeline::new(&pool, &config).run().await;
    pool.close().await;
    let stats = result?;

    generate_final_report(args.output_format, &stats)?;
    Ok(stats)
}

fn generate_final_report(format: OutputFormat, stats: &RunStats) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => generate_human_report(stats),
        OutputFormat::Json => generate_json_report(stats),
    }
}

fn generate_human_report(stats: &RunStats) -> anyhow::Result<()> {
    let duration = HumanDuration(Duration::from_millis(stats.processing_time_ms as u64));
    let rows = stats.total_rows();

    println!("\n{}", "Sparkify load complete".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_batch("Song files", &stats.songs);
    print_batch("Log files", &stats.logs);
    println!("{}", "Rows written:".bold());
    println!("   • songs: {}", rows.songs);
    println!("   • artists: {}", rows.artists);
    println!("   • users: {}", rows.users);
    println!("   • time: {}", rows.time);
    println!("   • songplays: {}", rows.songplays);
    println!("   • Processing time: {}", duration);

    let failed: Vec<_> = stats
        .songs
        .failed_files
        .iter()
        .chain(&stats.logs.failed_files)
        .collect();
    if !failed.is_empty() {
        println!("\n{} {}", "Skipped files:".yellow().bold(), failed.len());
        for file in failed {
            println!("   • {}: {}", file.path.display(), file.reason);
        }
    }

    println!();
    Ok(())
}

fn print_batch(label: &str, batch: &BatchStats) {
    println!(
        "{} {} ({} found, {} loaded, {} skipped)",
        format!("{}:", label).bold(),
        batch.root.display(),
        batch.files_found,
        batch.files_processed,
        batch.files_failed()
    );
    if batch.records_skipped > 0 {
        println!(
            "   {} unmappable song plays skipped",
            batch.records_skipped.to_string().yellow()
        );
    }
}

fn generate_json_report(stats: &RunStats) -> anyhow::Result<()> {
    let batch_json = |batch: &BatchStats| {
        serde_json::json!({
            "root": batch.root.display().to_string(),
            "files_found": batch.files_found,
            "files_processed": batch.files_processed,
            "records_skipped": batch.records_skipped,
            "records_discarded": batch.records_discarded,
            "rows": batch.rows,
            "failed_files": batch.failed_files.iter().map(|f| {
                serde_json::json!({
                    "path": f.path.display().to_string(),
                    "reason": f.reason
                })
            }).collect::<Vec<_>>()
        })
    };

    let json_stats = serde_json::json!({
        "song_data": batch_json(&stats.songs),
        "log_data": batch_json(&stats.logs),
        "rows": stats.total_rows(),
        "processing_time_ms": stats.processing_time_ms
    });

    println!("{}", serde_json::to_string_pretty(&json_stats)?);
    Ok(())
}
