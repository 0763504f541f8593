use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{LeadError, Result};
use crate::model::{ContactSubmission, NewSubmission, SubmissionPage, SubmissionStats, SubmissionStatus};

/// Persistence for contact submissions
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert one submission and return its id
    async fn create(&self, submission: NewSubmission) -> Result<i64>;

    /// Counts per status for submissions created at or after `since`
    async fn stats_since(&self, since: DateTime<Utc>) -> Result<SubmissionStats>;

    /// All submissions created at or after `since`, newest first
    async fn submissions_since(&self, since: DateTime<Utc>) -> Result<Vec<ContactSubmission>>;

    /// One page of submissions created at or after `since`, newest first
    async fn page_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
        offset: u32,
    ) -> Result<SubmissionPage>;

    /// Returns false when no submission has that id
    async fn update_status(&self, id: i64, status: SubmissionStatus) -> Result<bool>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS contact_submissions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    phone       TEXT,
    message     TEXT NOT NULL,
    source      TEXT,
    user_agent  TEXT,
    ip_address  TEXT,
    status      TEXT NOT NULL DEFAULT 'new'
                CHECK (status IN ('new', 'read', 'responded', 'archived')),
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contact_submissions_created_at
    ON contact_submissions (created_at);
";

const SELECT_COLUMNS: &str = "id, name, email, phone, message, source, user_agent, ip_address, status, created_at, updated_at";

/// SQLite-backed store. Timestamps are stored as Unix milliseconds.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| LeadError::Store(e.to_string()))?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection off the async runtime
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| LeadError::Store("connection mutex poisoned".to_string()))?;
            f(&guard).map_err(LeadError::from)
        })
        .await
        .map_err(|e| LeadError::Store(e.to_string()))?
    }
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<ContactSubmission> {
    let status: String = row.get(8)?;
    let status = status.parse::<SubmissionStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        source: row.get(5)?,
        user_agent: row.get(6)?,
        ip_address: row.get(7)?,
        status,
        created_at: from_millis(row.get(9)?),
        updated_at: from_millis(row.get(10)?),
    })
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn create(&self, submission: NewSubmission) -> Result<i64> {
        self.with_conn(move |conn| {
            let created = to_millis(submission.created_at);
            conn.execute(
                "INSERT INTO contact_submissions
                    (name, email, phone, message, source, user_agent, ip_address, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    submission.name,
                    submission.email,
                    submission.phone,
                    submission.message,
                    submission.source,
                    submission.user_agent,
                    submission.ip_address,
                    submission.status.as_str(),
                    created,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> Result<SubmissionStats> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM contact_submissions
                 WHERE created_at >= ?1 GROUP BY status",
            )?;
            let rows = stmt.query_map(params![to_millis(since)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;

            let mut stats = SubmissionStats::default();
            for row in rows {
                let (status, count) = row?;
                let count = u64::try_from(count).unwrap_or(0);
                stats.total += count;
                stats.by_status.insert(status, count);
            }
            Ok(stats)
        })
        .await
    }

    async fn submissions_since(&self, since: DateTime<Utc>) -> Result<Vec<ContactSubmission>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM contact_submissions
                 WHERE created_at >= ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![to_millis(since)], row_to_submission)?;
            rows.collect()
        })
        .await
    }

    async fn page_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
        offset: u32,
    ) -> Result<SubmissionPage> {
        self.with_conn(move |conn| {
            let since = to_millis(since);
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM contact_submissions WHERE created_at >= ?1",
                params![since],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM contact_submissions
                 WHERE created_at >= ?1 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let submissions = stmt
                .query_map(params![since, limit, offset], row_to_submission)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(SubmissionPage {
                submissions,
                total: u64::try_from(total).unwrap_or(0),
            })
        })
        .await
    }

    async fn update_status(&self, id: i64, status: SubmissionStatus) -> Result<bool> {
        self.with_conn(move |conn| {
            let exists = conn
                .query_row(
                    "SELECT id FROM contact_submissions WHERE id = ?1",
                    params![id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            if exists.is_none() {
                return Ok(false);
            }
            conn.execute(
                "UPDATE contact_submissions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), to_millis(Utc::now()), id],
            )?;
            Ok(true)
        })
        .await
    }
}
