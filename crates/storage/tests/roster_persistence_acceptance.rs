use shared::domain::Student;
use storage::{read_json, write_json, KeyValueStore, SqliteKeyValueStore};

#[tokio::test]
async fn roster_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("roster.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let roster = vec![
        Student::new("1", "John", 21.0, "CS"),
        Student::new("2", "Jim", 22.0, "IT"),
    ];

    {
        let store = SqliteKeyValueStore::new(&database_url).await.expect("db");
        write_json(&store, "lab3_students", &roster)
            .await
            .expect("persist roster");
    }

    let store = SqliteKeyValueStore::new(&database_url)
        .await
        .expect("reopen");
    let restored: Vec<Student> = read_json(&store, "lab3_students")
        .await
        .expect("read")
        .expect("roster present");
    assert_eq!(restored, roster);

    let raw = store
        .get("lab3_students")
        .await
        .expect("raw")
        .expect("raw present");
    assert!(raw.contains(r#""age":21"#), "whole ages stay integral: {raw}");
}

#[tokio::test]
async fn malformed_roster_text_is_reported_as_parse_error() {
    let store = SqliteKeyValueStore::new("sqlite::memory:").await.expect("db");
    store
        .set("lab3_students", "[{\"id\":")
        .await
        .expect("write garbage");

    let err = read_json::<Vec<Student>, _>(&store, "lab3_students")
        .await
        .expect_err("parse error");
    assert!(err.is_parse());
}
