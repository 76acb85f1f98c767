use crate::error::Result;
use crate::report::CompositeReport;
use crate::request::AnalysisRequest;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::debug;

/// Write side of analysis persistence. The engine never reads back.
pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let store = ReportStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let store = ReportStore {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                target TEXT NOT NULL,
                profile TEXT NOT NULL CHECK(profile IN ('full', 'seo', 'performance', 'competitors', 'business')),
                business_name TEXT,
                request TEXT NOT NULL,      -- JSON AnalysisRequest
                overall_score INTEGER NOT NULL CHECK(overall_score BETWEEN 0 AND 100),
                report TEXT NOT NULL        -- JSON CompositeReport
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_target ON analyses(target);
            CREATE INDEX IF NOT EXISTS idx_analyses_created ON analyses(created_at);
            ",
        )?;
        Ok(())
    }

    /// Store a report with its request metadata and return the record id
    pub fn save(&self, request: &AnalysisRequest, report: &CompositeReport) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO analyses (id, created_at, target, profile, business_name, request, overall_score, report)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &id,
                created_at,
                request.target().to_string(),
                request.profile().as_str(),
                request.business_name(),
                serde_json::to_string(request)?,
                report.overall_score,
                serde_json::to_string(report)?,
            ],
        )?;

        debug!("Stored analysis {} for {}", id, request.target());
        Ok(id)
    }

    pub fn fetch(&self, id: &str) -> Result<Option<CompositeReport>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT report FROM analyses WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM analyses", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
