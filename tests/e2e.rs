use std::fs;
use std::path::{Path, PathBuf};

use tsload::ingest::ParseMode;
use tsload::model;
use tsload::program;
use tsload::storage::{Db, Options};

// Segment rows are stored as [ref, timestamp, value] arrays.
type Row = (u64, i64, f64);

fn tempdb() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");
    (dir, path)
}

fn segment(path: &Path, seq: u64) -> Vec<Row> {
    let name = format!("segment-{:08}.json", seq);
    serde_json::from_str(&fs::read_to_string(path.join(name)).unwrap()).unwrap()
}

#[test]
fn init_creates_an_empty_database() {
    let (_guard, path) = tempdb();

    program::init(&path, 7).unwrap();

    let db = Db::open(&path, Options::default()).unwrap();
    assert_eq!(db.series_count(), 0);
    assert_eq!(db.options().retention, 7 * 24 * 60 * 60 * 1000);
    assert_eq!(db.options().block_ranges.len(), 5);
    assert_eq!(db.options().block_ranges[0], 2 * 60 * 60 * 1000);
    db.close().unwrap();
}

#[test]
fn init_wipes_preexisting_content() {
    let (_guard, path) = tempdb();

    program::init(&path, 15).unwrap();
    program::load(&path, "up 1 1000\n", ParseMode::Lenient).unwrap();
    fs::write(path.join("junk.txt"), "leftover").unwrap();

    program::init(&path, 15).unwrap();

    assert!(!path.join("junk.txt").exists());
    assert!(!path.join("segment-00000000.json").exists());
    let db = Db::open(&path, Options::default()).unwrap();
    assert_eq!(db.series_count(), 0);
}

#[test]
fn load_commits_all_samples_in_one_transaction() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    let stats = program::load(
        &path,
        "m{a=\"1\"} 5.0 1000\nm{a=\"1\"} 7.0 2000\nm{b=\"2\"} 3.0 1500\n",
        ParseMode::Lenient,
    )
    .unwrap();

    assert_eq!(stats.appended, 3);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.series, 2);

    let rows = segment(&path, 0);
    assert_eq!(rows.len(), 3);

    // Both m{a="1"} samples share one reference; m{b="2"} gets another.
    assert_eq!(rows[0].0, rows[1].0);
    assert_ne!(rows[0].0, rows[2].0);
    assert_eq!((rows[0].1, rows[0].2), (1000, 5.0));
    assert_eq!((rows[1].1, rows[1].2), (2000, 7.0));
    assert_eq!((rows[2].1, rows[2].2), (1500, 3.0));

    let db = Db::open(&path, Options::default()).unwrap();
    assert_eq!(db.series_count(), 2);
}

#[test]
fn samples_without_timestamps_share_one_ingestion_time() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    let before = model::now();
    program::load(&path, "foo 1\nbar 2\nbaz 3\n", ParseMode::Lenient).unwrap();
    let after = model::now();

    let rows = segment(&path, 0);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].1, rows[1].1);
    assert_eq!(rows[1].1, rows[2].1);
    assert!(rows[0].1 >= before && rows[0].1 <= after);
}

#[test]
fn lenient_load_keeps_samples_before_a_malformed_line() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    let stats = program::load(
        &path,
        "up 1 1000\n}{ definitely not a metric\nup 2 2000\n",
        ParseMode::Lenient,
    )
    .unwrap();

    assert_eq!(stats.appended, 1);
    assert_eq!(segment(&path, 0).len(), 1);
}

#[test]
fn strict_load_fails_on_a_malformed_line() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    let result = program::load(
        &path,
        "up 1 1000\n}{ definitely not a metric\n",
        ParseMode::Strict,
    );

    assert!(result.is_err());
    assert!(!path.join("segment-00000000.json").exists());
}

#[test]
fn repeated_loads_reuse_committed_references() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    program::load(&path, "up{job=\"a\"} 1 1000\n", ParseMode::Lenient).unwrap();
    program::load(&path, "up{job=\"a\"} 0 2000\n", ParseMode::Lenient).unwrap();

    let first = segment(&path, 0);
    let second = segment(&path, 1);
    assert_eq!(first[0].0, second[0].0);

    let db = Db::open(&path, Options::default()).unwrap();
    assert_eq!(db.series_count(), 1);
}

#[test]
fn load_on_an_uninitialized_path_creates_a_default_instance() {
    let (_guard, path) = tempdb();

    let stats = program::load(&path, "up 1 1000\n", ParseMode::Lenient).unwrap();
    assert_eq!(stats.appended, 1);

    let db = Db::open(&path, Options::default()).unwrap();
    assert_eq!(db.options().retention, 15 * 24 * 60 * 60 * 1000);
}

#[test]
fn comments_and_metadata_are_skipped() {
    let (_guard, path) = tempdb();
    program::init(&path, 15).unwrap();

    let stats = program::load(
        &path,
        "# HELP up Whether the target is reachable.\n# TYPE up gauge\nup 1 1000\n\n",
        ParseMode::Lenient,
    )
    .unwrap();

    assert_eq!(stats.appended, 1);
    assert_eq!(stats.series, 1);
}
