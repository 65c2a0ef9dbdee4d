//! SQLite layout of the catalog file.
//!
//! One `tracks` table: a contiguous `row_index`, the descriptive columns, then one REAL
//! column per audio dimension in the feature schema's order. Values are stored normalized.

use super::integrity::{CatalogError, IntegrityProblem};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
}

const fn column(name: &'static str, sql_type: SqlType) -> Column {
    Column {
        name,
        sql_type,
        is_primary_key: false,
    }
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

/// Number of leading non-feature columns.
pub const METADATA_COLUMN_COUNT: usize = 6;

pub const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        Column {
            name: "row_index",
            sql_type: SqlType::Integer,
            is_primary_key: true,
        },
        column("track_id", SqlType::Text),
        column("track_name", SqlType::Text),
        column("artists", SqlType::Text),
        column("album_name", SqlType::Text),
        column("track_genre", SqlType::Text),
        column("acousticness", SqlType::Real),
        column("danceability", SqlType::Real),
        column("energy", SqlType::Real),
        column("tempo", SqlType::Real),
        column("valence", SqlType::Real),
        column("popularity", SqlType::Real),
    ],
};

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", c.name, c.sql_type.as_sql());
                if c.is_primary_key {
                    def.push_str(" PRIMARY KEY");
                } else {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, columns.join(", ")),
            params![],
        )?;
        Ok(())
    }

    /// Compares the on-disk columns with this definition, by position and name.
    ///
    /// A mismatch is reported as a [`CatalogError`] inside the returned error.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({});", self.name))
            .context("Failed to read catalog table info")?;
        let actual: Vec<String> = stmt
            .query_map(params![], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<_>>()?;

        if actual.len() != self.columns.len() {
            return Err(CatalogError::from(IntegrityProblem::ColumnCount {
                expected: self.columns.len(),
                found: actual.len(),
            })
            .into());
        }
        for (position, (found, expected)) in actual.into_iter().zip(self.columns).enumerate() {
            if found != expected.name {
                return Err(CatalogError::from(IntegrityProblem::ColumnMismatch {
                    position,
                    expected: expected.name,
                    found,
                })
                .into());
            }
        }
        Ok(())
    }

    pub fn select_all_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            names.join(", "),
            self.name,
            self.columns[0].name
        )
    }

    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders.join(", ")
        )
    }
}
