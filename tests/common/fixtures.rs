//! Test fixture creation for catalog files
//!
//! Catalogs are written with direct SQL inserts through the same table definition the loader
//! validates against.

use super::constants::*;
use anyhow::Result;
use promptify::catalog::TRACKS_TABLE;
use promptify::features::FEATURE_COUNT;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One row as it is written to disk.
pub struct FixtureRow {
    pub row_index: i64,
    pub track_id: String,
    pub name: String,
    pub features: [f32; FEATURE_COUNT],
}

impl FixtureRow {
    pub fn new(row_index: i64, track_id: &str, name: &str, features: [f32; FEATURE_COUNT]) -> Self {
        Self {
            row_index,
            track_id: track_id.to_string(),
            name: name.to_string(),
            features,
        }
    }
}

/// The three track catalog every server test runs against.
pub fn fixture_rows() -> Vec<FixtureRow> {
    vec![
        FixtureRow::new(0, TRACK_1_ID, TRACK_1_NAME, CATALOG_FEATURES[0]),
        FixtureRow::new(1, TRACK_2_ID, TRACK_2_NAME, CATALOG_FEATURES[1]),
        FixtureRow::new(2, TRACK_3_ID, TRACK_3_NAME, CATALOG_FEATURES[2]),
    ]
}

/// Writes `rows` into a fresh `tracks` table at `path`.
pub fn write_catalog(path: &Path, rows: &[FixtureRow]) -> Result<()> {
    let conn = Connection::open(path)?;
    TRACKS_TABLE.create(&conn)?;

    let insert = TRACKS_TABLE.insert_sql();
    for row in rows {
        let f = row.features.map(f64::from);
        conn.execute(
            &insert,
            params![
                row.row_index,
                row.track_id,
                row.name,
                "Test Artist",
                "Test Album",
                "test-genre",
                f[0],
                f[1],
                f[2],
                f[3],
                f[4],
                f[5],
            ],
        )?;
    }
    Ok(())
}

/// Creates a temporary catalog holding `rows`.
/// Returns (temp_dir, catalog_path)
pub fn create_catalog_with(rows: &[FixtureRow]) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_path = dir.path().join("catalog.db");
    write_catalog(&catalog_path, rows)?;
    Ok((dir, catalog_path))
}

/// Creates a temporary catalog with the three fixture tracks.
/// Returns (temp_dir, catalog_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    create_catalog_with(&fixture_rows())
}

/// Creates a temporary file whose `tracks` table lacks the feature columns.
pub fn create_catalog_with_wrong_schema() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_path = dir.path().join("catalog.db");
    let conn = Connection::open(&catalog_path)?;
    conn.execute(
        "CREATE TABLE tracks (row_index INTEGER PRIMARY KEY, track_id TEXT NOT NULL, track_name TEXT NOT NULL)",
        [],
    )?;
    conn.execute(
        "INSERT INTO tracks (row_index, track_id, track_name) VALUES (0, ?1, ?2)",
        [TRACK_1_ID, TRACK_1_NAME],
    )?;
    Ok((dir, catalog_path))
}
