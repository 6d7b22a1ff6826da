//! Database schema migrations for streakwise.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: habits, their completions, and the progress key-value table.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            frequency      TEXT NOT NULL,
            mode           TEXT NOT NULL DEFAULT 'build',
            created_at     TEXT NOT NULL,
            weekly_target  INTEGER NOT NULL DEFAULT 1,
            archived       INTEGER NOT NULL DEFAULT 0,
            streak         INTEGER NOT NULL DEFAULT 0,
            points         INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS completions (
            habit_id     TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            PRIMARY KEY (habit_id, completed_at)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_completions_habit ON completions(habit_id);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: monthly targets and the trophy ledger.
///
/// Adds:
/// - habits.monthly_target (defaults to 1 for existing rows)
/// - trophies(id, unlocked_on)
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    if !has_column(&tx, "habits", "monthly_target") {
        tx.execute_batch(
            "ALTER TABLE habits ADD COLUMN monthly_target INTEGER NOT NULL DEFAULT 1;",
        )?;
    }

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS trophies (
            id          TEXT PRIMARY KEY,
            unlocked_on TEXT NOT NULL
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get::<_, i32>(0),
    )
    .unwrap_or(0)
        > 0
}

/// Migration v3: per-habit credited points.
///
/// Existing rows start with `credited_points = points`, so upgrading never
/// pays out a habit's current points a second time.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    if !has_column(&tx, "habits", "credited_points") {
        tx.execute_batch(
            "ALTER TABLE habits ADD COLUMN credited_points INTEGER NOT NULL DEFAULT 0;
             UPDATE habits SET credited_points = points;",
        )?;
    }
    set_schema_version(&tx, 3)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        conn.execute(
            "INSERT INTO habits (id, name, frequency, created_at)
             VALUES ('h1', 'Read', 'daily', '2024-01-01')",
            [],
        )
        .unwrap();
        let monthly: i32 = conn
            .query_row("SELECT monthly_target FROM habits WHERE id = 'h1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(monthly, 1);
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO habits (id, name, frequency, created_at)
             VALUES ('old', 'Stretch', 'weekly', '2023-06-01')",
            [],
        )
        .unwrap();
        assert_eq!(get_schema_version(&conn), 1);

        conn.execute("UPDATE habits SET points = 40 WHERE id = 'old'", [])
            .unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        let credited: i64 = conn
            .query_row("SELECT credited_points FROM habits WHERE id = 'old'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(credited, 40);
        let monthly: i32 = conn
            .query_row("SELECT monthly_target FROM habits WHERE id = 'old'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(monthly, 1);
        let trophies: i32 = conn
            .query_row("SELECT COUNT(*) FROM trophies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(trophies, 0);
    }
}
