//! SQLite dataset backend (feature `sqlite`).
//!
//! One database file per recorder with a single `observations` table.
//! The schema is data-dependent — one column per assigned term column —
//! so the table is created at flush time, not at open.

use std::path::Path;

use rusqlite::Connection;

use crate::layout::ObservationLayout;
use crate::row::ObservationRow;
use crate::sink::ObservationSink;
use crate::EstimationResult;

/// Writes the estimation dataset to an SQLite database.
pub struct SqliteSink {
    conn:     Connection,
    finished: bool,
}

impl SqliteSink {
    /// Open (or create) the database at `path`.
    pub fn new(path: &Path) -> EstimationResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Ok(Self { conn, finished: false })
    }
}

impl ObservationSink for SqliteSink {
    fn write_all(
        &mut self,
        layout: &ObservationLayout,
        rows: &[ObservationRow],
    ) -> EstimationResult<()> {
        let mut ddl = String::from(
            "CREATE TABLE IF NOT EXISTS observations (\n\
             unit     INTEGER NOT NULL,\n\
             observed INTEGER NOT NULL",
        );
        for alternative in 0..layout.total_alternatives() {
            ddl.push_str(&format!(",\navail{alternative} INTEGER NOT NULL"));
        }
        for &(alternative, coefficient) in layout.term_columns() {
            ddl.push_str(&format!(",\nu{alternative}_c{coefficient} REAL NOT NULL"));
        }
        ddl.push_str("\n);");
        self.conn.execute_batch(&ddl)?;

        if rows.is_empty() {
            return Ok(());
        }

        let placeholders: Vec<String> = (1..=layout.width()).map(|i| format!("?{i}")).collect();
        let insert =
            format!("INSERT INTO observations VALUES ({})", placeholders.join(", "));

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&insert)?;
            let mut params: Vec<rusqlite::types::Value> = Vec::with_capacity(layout.width());
            for row in rows {
                params.clear();
                params.push((row.unit.0 as i64).into());
                params.push((row.observed as i64).into());
                params.extend(row.availability.iter().map(|&a| (a as i64).into()));
                params.extend(row.values.iter().map(|&v| v.into()));
                stmt.execute(rusqlite::params_from_iter(params.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> EstimationResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
