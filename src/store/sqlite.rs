use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OpenFlags, Row};

use super::{quote, to_sql_int, validate_identifier, ColumnMapping, ContextTable, StoreError};
use crate::types::example::Example;
use crate::types::identifiers::ExampleId;

struct Queries {
    by_id: String,
    by_word: String,
    count: String,
}

/// A [`ContextTable`] over one SQLite table.
///
/// The connection sits behind a mutex so the table (and a bank over it) can
/// be shared across threads.
pub struct SqliteTable {
    conn: Mutex<Connection>,
    table: String,
    queries: Queries,
}

impl SqliteTable {
    /// Open a database file read-only.
    pub fn open(path: &Path, table: &str, mapping: &ColumnMapping) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::from_connection(conn, table, mapping)
    }

    /// Wrap an existing connection. The table and every mapped column must
    /// exist.
    pub fn from_connection(
        conn: Connection,
        table: &str,
        mapping: &ColumnMapping,
    ) -> Result<Self, StoreError> {
        validate_identifier(table)?;
        mapping.validate()?;
        check_schema(&conn, table, mapping)?;

        let freq = mapping
            .freq
            .as_deref()
            .map(quote)
            .unwrap_or_else(|| "NULL".to_string());
        let select = format!(
            "SELECT {}, {}, {}, {}, {} FROM {}",
            quote(&mapping.id),
            quote(&mapping.left),
            quote(&mapping.word),
            quote(&mapping.right),
            freq,
            quote(table),
        );
        let queries = Queries {
            by_id: format!("{select} WHERE {} = ?1", quote(&mapping.id)),
            by_word: format!("{select} WHERE {} = ?1", quote(&mapping.word)),
            count: format!("SELECT COUNT({}) FROM {}", quote(&mapping.id), quote(table)),
        };

        tracing::debug!(table, "opened sqlite context table");
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
            queries,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn query_rows<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Example>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare_cached(sql)?;
        let raw = stmt
            .query_map(params, read_raw_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawRow::into_example).collect()
    }
}

fn check_schema(conn: &Connection, table: &str, mapping: &ColumnMapping) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(StoreError::MissingTable(table.to_string()));
    }
    for wanted in mapping.columns() {
        if !columns.iter().any(|c| c == wanted) {
            return Err(StoreError::MissingColumn {
                table: table.to_string(),
                column: wanted.to_string(),
            });
        }
    }
    Ok(())
}

struct RawRow {
    id: i64,
    left: String,
    word: String,
    right: String,
    frequency: Option<i64>,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        left: row.get(1)?,
        word: row.get(2)?,
        right: row.get(3)?,
        frequency: row.get(4)?,
    })
}

impl RawRow {
    fn into_example(self) -> Result<Example, StoreError> {
        let id = u64::try_from(self.id)
            .ok()
            .and_then(|raw| ExampleId::new(raw).ok())
            .ok_or(StoreError::InvalidStoredId(self.id))?;
        let frequency = self
            .frequency
            .map(|f| u64::try_from(f).map_err(|_| StoreError::InvalidStoredFrequency(f)))
            .transpose()?;
        Ok(Example {
            id,
            left: self.left,
            word: self.word,
            right: self.right,
            frequency,
        })
    }
}

impl ContextTable for SqliteTable {
    fn rows_with_id(&self, id: ExampleId) -> Result<Vec<Example>, StoreError> {
        self.query_rows(&self.queries.by_id, params![to_sql_int(id.get())?])
    }

    fn rows_with_word(&self, word: &str) -> Result<Vec<Example>, StoreError> {
        self.query_rows(&self.queries.by_word, params![word])
    }

    fn row_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = conn.query_row(&self.queries.count, [], |row| row.get(0))?;
        // COUNT is never negative
        Ok(count.max(0) as u64)
    }
}
