//! Database schema definitions for the SQLite sink

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    category TEXT NOT NULL,
    start_date TEXT NOT NULL,
    config_hash TEXT,
    status TEXT NOT NULL,
    total_rows INTEGER NOT NULL DEFAULT 0
);

-- Harvested rows; ids are not unique because overlapping pages are kept
CREATE TABLE IF NOT EXISTS articles (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    id TEXT NOT NULL,
    publication_date TEXT NOT NULL,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    content TEXT NOT NULL,
    url TEXT NOT NULL,
    section TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_run ON articles(run_id);
CREATE INDEX IF NOT EXISTS idx_articles_id ON articles(id);
"#;

/// Creates all tables and indexes if they do not exist
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
