use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn saves_overwrites_and_deletes_values() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.load_value("token").await.expect("load"), None);

    storage.save_value("token", "first").await.expect("save");
    storage.save_value("token", "second").await.expect("overwrite");
    assert_eq!(
        storage.load_value("token").await.expect("load"),
        Some("second".to_string())
    );

    assert!(storage.delete_value("token").await.expect("delete"));
    assert!(!storage.delete_value("token").await.expect("delete again"));
    assert_eq!(storage.load_value("token").await.expect("load"), None);
}

#[tokio::test]
async fn values_survive_reopening_the_database_file() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("workout_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("client.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.save_value("token", "persisted").await.expect("save");
    storage.pool().close().await;
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.load_value("token").await.expect("load"),
        Some("persisted".to_string())
    );
    reopened.pool().close().await;

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn sqlite_path_skips_memory_and_strips_query() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/client.db?mode=rwc"),
        Some(PathBuf::from("./data/client.db"))
    );
}
