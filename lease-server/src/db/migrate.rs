use crate::db::connection::DbPool;
use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stores (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  store_code TEXT UNIQUE NOT NULL,
  name TEXT NOT NULL,
  banner TEXT,
  city TEXT,
  region TEXT,
  address TEXT,
  surface_m2 REAL,
  monthly_rent REAL,
  status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','closed')),
  created_by INTEGER,
  updated_by INTEGER,
  closed_at TEXT,
  created_at TEXT NOT NULL DEFAULT (datetime('now')),
  updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_stores_status ON stores(status);
"#;

const ADDED_COLUMNS: &[(&str, &str)] = &[
    ("banner", "TEXT"),
    ("city", "TEXT"),
    ("region", "TEXT"),
    ("address", "TEXT"),
    ("surface_m2", "REAL"),
    ("monthly_rent", "REAL"),
    ("created_by", "INTEGER"),
    ("updated_by", "INTEGER"),
    ("closed_at", "TEXT"),
];

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns.iter().any(|c| c == column))
}

pub fn migrate(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("[DB] Starting database migration...");

    let conn = pool.get()?;
    conn.execute_batch(SCHEMA)?;

    // Columns missing from databases created by earlier releases
    for (column, definition) in ADDED_COLUMNS {
        if !has_column(&conn, "stores", column)? {
            conn.execute_batch(&format!("ALTER TABLE stores ADD COLUMN {column} {definition}"))?;
            tracing::info!(column, "[DB] Added stores column");
        }
    }

    tracing::info!("[DB] Migration completed successfully");
    Ok(())
}
