//! SQLite-backed record store

use crate::StoreError;
use quarry_domain::traits::{RecordQuery, RecordStats, RecordStore};
use quarry_domain::{RecordId, ScoredRecord, SourceUsage};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const RECORD_COLUMNS: &str =
    "seq, id, timestamp, query_text, relevance_score, confidence_score, session_id";

/// SQLite-based implementation of `RecordStore`
///
/// Each append runs in its own transaction covering the record row and
/// its source rows, so a failed or interrupted append leaves nothing
/// behind.
///
/// # Thread Safety
///
/// SQLite connections are not `Sync`; the connection sits behind a mutex
/// and every operation holds it for its whole duration.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quarry_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("quarry.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn record_id_to_bytes(id: RecordId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_record_id(bytes: &[u8]) -> Result<RecordId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for RecordId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(RecordId::from_value(u128::from_be_bytes(arr)))
    }

    /// Map a `records` row selected with `RECORD_COLUMNS`
    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, ScoredRecord)> {
        let id_bytes: Vec<u8> = row.get(1)?;
        let id = Self::bytes_to_record_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        Ok((
            row.get(0)?,
            ScoredRecord {
                id,
                timestamp: row.get::<_, i64>(2)? as u64,
                query_text: row.get(3)?,
                relevance_score: row.get(4)?,
                confidence_score: row.get(5)?,
                sources_used: Vec::new(),
                session_id: row.get(6)?,
            },
        ))
    }

    /// Fill in `sources_used` for rows loaded by `row_to_record`
    fn attach_sources(
        conn: &Connection,
        rows: Vec<(i64, ScoredRecord)>,
    ) -> Result<Vec<ScoredRecord>, StoreError> {
        let mut stmt = conn.prepare_cached(
            "SELECT source_id, latency_ms, contributed FROM record_sources
             WHERE record_seq = ?1 ORDER BY position",
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for (seq, mut record) in rows {
            record.sources_used = stmt
                .query_map(params![seq], |row| {
                    Ok(SourceUsage {
                        source_id: row.get(0)?,
                        latency_ms: row.get::<_, i64>(1)? as u64,
                        contributed_to_high_relevance: row.get::<_, i64>(2)? != 0,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            records.push(record);
        }
        Ok(records)
    }

    fn select(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ScoredRecord>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Self::attach_sources(conn, rows)
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn append(&self, record: ScoredRecord) -> Result<RecordId, Self::Error> {
        record.validate()?;

        let mut conn = self.lock()?;
        let id_bytes = Self::record_id_to_bytes(record.id);

        let exists = conn
            .query_row("SELECT 1 FROM records WHERE id = ?1", params![&id_bytes], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if exists {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO records (id, timestamp, query_text, relevance_score, confidence_score, session_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &id_bytes,
                record.timestamp as i64,
                &record.query_text,
                record.relevance_score,
                record.confidence_score,
                &record.session_id,
            ],
        )?;
        let seq = tx.last_insert_rowid();

        for (position, usage) in record.sources_used.iter().enumerate() {
            tx.execute(
                "INSERT INTO record_sources (record_seq, position, source_id, latency_ms, contributed)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    seq,
                    position as i64,
                    &usage.source_id,
                    usage.latency_ms as i64,
                    usage.contributed_to_high_relevance as i64,
                ],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Appended record {} at seq {}", record.id, seq);
        Ok(record.id)
    }

    fn read_recent(&self, n: usize) -> Result<Vec<ScoredRecord>, Self::Error> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM records ORDER BY seq DESC LIMIT ?1", RECORD_COLUMNS);
        Self::select(&conn, &sql, &[&clamp_limit(n)])
    }

    fn read_range(&self, start_ms: u64, end_ms: u64) -> Result<Vec<ScoredRecord>, Self::Error> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM records WHERE timestamp BETWEEN ?1 AND ?2 ORDER BY timestamp, seq",
            RECORD_COLUMNS
        );
        Self::select(&conn, &sql, &[&clamp_millis(start_ms), &clamp_millis(end_ms)])
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn stats(&self) -> Result<RecordStats, Self::Error> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            "SELECT COUNT(*), COALESCE(AVG(relevance_score), 0.0), COALESCE(AVG(confidence_score), 0.0)
             FROM records",
            [],
            |row| {
                Ok(RecordStats {
                    count: row.get::<_, i64>(0)? as usize,
                    mean_relevance: row.get(1)?,
                    mean_confidence: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<ScoredRecord>, Self::Error> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM records WHERE (?1 IS NULL OR relevance_score >= ?1)
             ORDER BY seq DESC LIMIT ?2 OFFSET ?3",
            RECORD_COLUMNS
        );
        // LIMIT -1 means no limit in SQLite
        let limit = query.limit.map(clamp_limit).unwrap_or(-1);
        Self::select(
            &conn,
            &sql,
            &[&query.min_relevance, &limit, &clamp_limit(query.offset)],
        )
    }

    fn count_between(&self, start_ms: u64, end_ms: u64) -> Result<usize, Self::Error> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE timestamp BETWEEN ?1 AND ?2",
            params![clamp_millis(start_ms), clamp_millis(end_ms)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn clamp_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// Range bounds past i64::MAX would wrap negative in SQLite
fn clamp_millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}
