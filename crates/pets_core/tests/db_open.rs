use pets_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_pets_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(
        column_names(&conn, "pets"),
        vec!["id", "name", "breed", "gender", "weight"]
    );
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pets.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO pets (name, gender) VALUES ('Toto', 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM pets;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn existing_pets_table_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE pets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            breed TEXT,
            gender INTEGER NOT NULL,
            weight INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO pets (name, gender, weight) VALUES ('Binx', 2, 4);
        PRAGMA user_version = 7;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let name: String = conn
        .query_row("SELECT name FROM pets WHERE weight = 4;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(name, "Binx");
}

#[test]
fn weight_defaults_to_zero_and_name_is_required() {
    let conn = open_db_in_memory().unwrap();

    conn.execute("INSERT INTO pets (name, gender) VALUES ('Rex', 0);", [])
        .unwrap();
    let weight: i64 = conn
        .query_row("SELECT weight FROM pets WHERE name = 'Rex';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(weight, 0);

    let err = conn.execute("INSERT INTO pets (gender) VALUES (1);", []);
    assert!(err.is_err());
}

#[test]
fn unreachable_path_reports_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("pets.db");

    match open_db(&path).unwrap_err() {
        DbError::Open { target, .. } => assert!(target.ends_with("pets.db")),
        other => panic!("unexpected error: {other}"),
    }
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .map(Result::unwrap)
        .collect()
}
