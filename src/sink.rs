//! Persistence of count snapshots.

use std::path::Path;

use rusqlite::{params, Connection};
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::occupancy::Counts;

/// Receives `(entered, exited)` totals whenever they grow.
pub trait CountSink {
    fn insert(&mut self, entered: u64, exited: u64) -> Result<(), Error>;
}

impl<S: CountSink + ?Sized> CountSink for &mut S {
    #[inline]
    fn insert(&mut self, entered: u64, exited: u64) -> Result<(), Error> {
        (**self).insert(entered, exited)
    }
}

impl<S: CountSink + ?Sized> CountSink for Box<S> {
    #[inline]
    fn insert(&mut self, entered: u64, exited: u64) -> Result<(), Error> {
        (**self).insert(entered, exited)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub snapshots: Vec<Counts>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn last(&self) -> Option<&Counts> {
        self.snapshots.last()
    }
}

impl CountSink for MemorySink {
    fn insert(&mut self, entered: u64, exited: u64) -> Result<(), Error> {
        self.snapshots.push(Counts::new(entered, exited));
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CountRecord {
    pub id: i64,
    pub timestamp: String,
    pub in_count: i64,
    pub out_count: i64,
}

impl CountRecord {
    #[inline]
    pub fn inside(&self) -> i64 {
        self.in_count - self.out_count
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CountSummary {
    pub records: i64,
    pub max_in: i64,
    pub max_out: i64,
    pub avg_occupancy: f64,
}

/// SQLite-backed sink, one row per snapshot in `people_count`.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database, creating missing parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(path)?;
        let sink = Self { conn };
        sink.init_schema()?;

        Ok(sink)
    }

    pub fn in_memory() -> Result<Self, Error> {
        let sink = Self {
            conn: Connection::open_in_memory()?,
        };
        sink.init_schema()?;

        Ok(sink)
    }

    fn init_schema(&self) -> Result<(), Error> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS people_count (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                in_count INTEGER NOT NULL,
                out_count INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Newest rows first.
    pub fn recent(&self, limit: usize) -> Result<Vec<CountRecord>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, in_count, out_count
             FROM people_count
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(CountRecord {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                in_count: row.get(2)?,
                out_count: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// `None` when nothing has been written yet.
    pub fn summary(&self) -> Result<Option<CountSummary>, Error> {
        let summary = self.conn.query_row(
            "SELECT COUNT(*), MAX(in_count), MAX(out_count), AVG(in_count - out_count)
             FROM people_count",
            [],
            |row| {
                let records: i64 = row.get(0)?;
                if records == 0 {
                    return Ok(None);
                }

                Ok(Some(CountSummary {
                    records,
                    max_in: row.get(1)?,
                    max_out: row.get(2)?,
                    avg_occupancy: row.get(3)?,
                }))
            },
        )?;

        Ok(summary)
    }
}

impl CountSink for SqliteSink {
    fn insert(&mut self, entered: u64, exited: u64) -> Result<(), Error> {
        self.conn.execute(
            "INSERT INTO people_count (in_count, out_count) VALUES (?1, ?2)",
            params![entered as i64, exited as i64],
        )?;

        Ok(())
    }
}
