use super::integrity::{CatalogError, IntegrityProblem};
use super::models::TrackMetadata;
use super::schema::{METADATA_COLUMN_COUNT, TRACKS_TABLE};
use super::store::CatalogStore;
use crate::features::FEATURE_COUNT;
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Reads the catalog file into memory.
///
/// Called once at startup; the returned store is shared for the rest of the process lifetime.
/// Any schema or alignment problem comes back as a [`CatalogError`] wrapped in the error.
pub fn load_catalog<P: AsRef<Path>>(path: P, check_values: bool) -> Result<Arc<CatalogStore>> {
    let path = path.as_ref();
    let start = Instant::now();

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open catalog file {:?}", path))?;

    TRACKS_TABLE.validate(&conn)?;

    let mut stmt = conn.prepare(&TRACKS_TABLE.select_all_sql())?;
    let mut query = stmt.query([])?;

    let mut rows = Vec::new();
    let mut matrix = Vec::new();
    while let Some(row) = query.next()? {
        let row_index: i64 = row.get(0)?;
        if row_index != rows.len() as i64 {
            return Err(CatalogError::from(IntegrityProblem::RowIndexGap {
                expected: rows.len(),
                found: row_index,
            })
            .into());
        }
        rows.push(TrackMetadata {
            id: row.get(1)?,
            name: row.get(2)?,
            artists: row.get(3)?,
            album: row.get(4)?,
            genre: row.get(5)?,
        });
        for column in METADATA_COLUMN_COUNT..METADATA_COLUMN_COUNT + FEATURE_COUNT {
            let value: f64 = row.get(column)?;
            matrix.push(value as f32);
        }
    }

    let store = if check_values {
        CatalogStore::from_parts(rows, matrix)?
    } else {
        CatalogStore::from_parts_unchecked_values(rows, matrix)?
    };

    info!(
        "Loaded catalog {:?}: {} tracks in {:?}",
        path,
        store.row_count(),
        start.elapsed()
    );
    Ok(Arc::new(store))
}
