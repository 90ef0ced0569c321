//! Failure policies: skipped files, rollback and aborts

use super::*;
use crate::config::ConflictPolicy;
use crate::error::EtlError;
use crate::models::DataKind;
use crate::processor::BatchProcessor;

#[tokio::test]
async fn test_reloading_log_file_aborts_and_rolls_back() {
    let warehouse = TestWarehouse::new().await;
    write_json_lines(
        &warehouse.log_root,
        "a.json",
        &[pump_it_play(PUMP_IT_TS, "free")],
    );
    let processor = BatchProcessor::new(&warehouse.pool, &warehouse.config);
    processor
        .process_batch(&warehouse.log_root, DataKind::Log)
        .await
        .unwrap();

    // Same play again, plus a new one that would upgrade the user
    let conflicting = write_json_lines(
        &warehouse.log_root,
        "a.json",
        &[
            pump_it_play(PUMP_IT_TS, "free"),
            pump_it_play(PUMP_IT_TS + 60_000, "paid"),
        ],
    );

    let error = processor
        .process_batch(&warehouse.log_root, DataKind::Log)
        .await
        .unwrap_err();

    match error {
        EtlError::FileAborted { path, source } => {
            assert_eq!(path, conflicting);
            assert!(matches!(
                *source,
                EtlError::ConstraintViolation { ref table, .. } if table == "songplays"
            ));
        }
        other => panic!("Expected FileAborted, got {other:?}"),
    }

    assert_eq!(warehouse.count("songplays").await, 1);
    assert_eq!(warehouse.count("time").await, 1);
    assert_eq!(warehouse.user_level("39").await.as_deref(), Some("free"));
}

#[tokio::test]
async fn test_skip_policy_continues_after_conflict() {
    let warehouse = TestWarehouse::new().await;
    write_json_lines(
        &warehouse.log_root,
        "a.json",
        &[pump_it_play(PUMP_IT_TS, "free")],
    );

    let config = warehouse
        .config
        .clone()
        .with_conflict_policy(ConflictPolicy::Skip);
    let processor = BatchProcessor::new(&warehouse.pool, &config);
    processor
        .process_batch(&warehouse.log_root, DataKind::Log)
        .await
        .unwrap();

    write_json_lines(
        &warehouse.log_root,
        "b.json",
        &[pump_it_play(PUMP_IT_TS + 60_000, "paid")],
    );

    let stats = processor
        .process_batch(&warehouse.log_root, DataKind::Log)
        .await
        .unwrap();

    assert_eq!(stats.files_found, 2);
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed(), 1);
    assert!(stats.failed_files[0].path.ends_with("a.json"));
    assert_eq!(warehouse.count("songplays").await, 2);
    assert_eq!(warehouse.user_level("39").await.as_deref(), Some("paid"));
}

#[tokio::test]
async fn test_undecodable_file_is_skipped() {
    let warehouse = TestWarehouse::new().await;
    write_json_lines(
        &warehouse.log_root,
        "a.json",
        &[pump_it_play(PUMP_IT_TS, "free")],
    );
    fs::write(warehouse.log_root.join("b.json"), "{\"page\": \"NextSong\"\nnot json").unwrap();
    write_json_lines(
        &warehouse.log_root,
        "c.json",
        &[pump_it_play(PUMP_IT_TS + 60_000, "free")],
    );

    let stats = BatchProcessor::new(&warehouse.pool, &warehouse.config)
        .process_batch(&warehouse.log_root, DataKind::Log)
        .await
        .unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.files_failed(), 1);
    assert!(stats.failed_files[0].path.ends_with("b.json"));
    assert_eq!(warehouse.count("songplays").await, 2);
}

#[tokio::test]
async fn test_song_file_missing_field_is_skipped() {
    let warehouse = TestWarehouse::new().await;
    let mut incomplete = pump_it_song();
    incomplete.as_object_mut().unwrap().remove("duration");

    write_json_lines(&warehouse.song_root, "a.json", &[incomplete]);
    write_json_lines(
        &warehouse.song_root,
        "b.json",
        &[song_record("SOOTHER", "Other", "AROTHER", "Other Artist", 99.0)],
    );
    fs::write(warehouse.song_root.join("c.json"), "").unwrap();

    let stats = BatchProcessor::new(&warehouse.pool, &warehouse.config)
        .process_batch(&warehouse.song_root, DataKind::Song)
        .await
        .unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed(), 2);
    assert!(stats.failed_files[0].reason.contains("duration"));
    assert_eq!(warehouse.count("songs").await, 1);
    assert_eq!(warehouse.count("artists").await, 1);
}

#[tokio::test]
async fn test_missing_root_is_directory_not_found() {
    let warehouse = TestWarehouse::new().await;
    let missing = warehouse.log_root.join("nowhere");

    let error = BatchProcessor::new(&warehouse.pool, &warehouse.config)
        .process_batch(&missing, DataKind::Log)
        .await
        .unwrap_err();

    assert!(matches!(error, EtlError::DirectoryNotFound { .. }));
}

#[tokio::test]
async fn test_closed_pool_aborts_batch() {
    let warehouse = TestWarehouse::new().await;
    write_json_lines(&warehouse.song_root, "a.json", &[pump_it_song()]);
    warehouse.pool.close().await;

    let error = BatchProcessor::new(&warehouse.pool, &warehouse.config)
        .process_batch(&warehouse.song_root, DataKind::Song)
        .await
        .unwrap_err();

    match error {
        EtlError::FileAborted { source, .. } => {
            assert!(matches!(*source, EtlError::Connection(_)));
        }
        other => panic!("Expected FileAborted, got {other:?}"),
    }
}
