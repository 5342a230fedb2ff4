use spectacle_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn file_backed_store_initializes_log_table() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("spectacle.db");
    let path = path.to_str().expect("temp path should be utf-8");

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("should query journal_mode");
    assert_eq!(mode, "wal");

    run_migrations(&conn).expect("failed to run migrations");

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["_spectacle_migrations", "tag_logs"]);
}

#[test]
fn migrations_survive_reopen() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("spectacle.db");
    let path = path.to_str().expect("temp path should be utf-8");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
        let conn = pool.get().expect("failed to get connection");
        assert_eq!(run_migrations(&conn).expect("first run"), 2);
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to reopen pool");
    let conn = pool.get().expect("failed to get connection");
    assert_eq!(run_migrations(&conn).expect("second run"), 0);
}
