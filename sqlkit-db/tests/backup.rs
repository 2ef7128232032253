mod common;

use sqlkit_db::{Backup, BackupStep, Connection, OpenOptions};

#[test]
fn test_backup_copies_everything_in_one_step() {
    let src = Connection::open_in_memory().expect("open source");
    common::seed_rows(&src, 200);
    let dest = Connection::open_in_memory().expect("open destination");

    let mut backup = Backup::new(&dest, "main", &src, "main").expect("init backup");
    assert_eq!(backup.step(-1).expect("step"), BackupStep::Done);
    assert_eq!(backup.remaining(), 0);
    backup.finish().expect("finish");

    assert_eq!(common::query_i64(&dest, "SELECT count(*) FROM t"), 200);
}

#[test]
fn test_backup_in_increments() {
    let src = Connection::open_in_memory().expect("open source");
    common::seed_rows(&src, 200);
    let dest = Connection::open_in_memory().expect("open destination");

    let mut backup = Backup::new(&dest, "main", &src, "main").expect("init backup");
    assert_eq!(backup.step(1).expect("first page"), BackupStep::More);
    let total = backup.page_count();
    assert!(total > 10, "expected a multi-page source, got {total}");
    assert_eq!(backup.remaining(), total - 1);

    let mut steps = 1;
    while backup.step(5).expect("step") == BackupStep::More {
        steps += 1;
    }
    assert!(steps > 1);
    assert_eq!(backup.remaining(), 0);
    backup.finish().expect("finish");

    assert_eq!(common::query_i64(&dest, "SELECT count(*) FROM t"), 200);
}

#[test]
fn test_backup_into_itself_is_refused() {
    let conn = Connection::open_in_memory().expect("open");
    let err = Backup::new(&conn, "main", &conn, "main").expect_err("same connection");
    assert_eq!(err.code.0, 1);
    assert!(
        err.message.contains("source and destination must be distinct"),
        "{err}"
    );
}

#[test]
fn test_backup_unknown_database_name() {
    let src = Connection::open_in_memory().expect("open source");
    let dest = Connection::open_in_memory().expect("open destination");
    let err = Backup::new(&dest, "main", &src, "nope").expect_err("unknown schema");
    assert!(err.message.contains("unknown database nope"), "{err}");
}

#[test]
fn test_dropped_backup_releases_handle() {
    let src = Connection::open_in_memory().expect("open source");
    common::seed_rows(&src, 50);
    let dest = Connection::open_in_memory().expect("open destination");
    {
        let mut backup = Backup::new(&dest, "main", &src, "main").expect("init backup");
        assert_eq!(backup.step(1).expect("step"), BackupStep::More);
    }
    // Both connections are usable again and can close cleanly.
    dest.exec("CREATE TABLE other (x)").expect("destination usable");
    src.close().expect("close source");
    dest.close().expect("close destination");
}

#[test]
fn test_backup_to_disk_survives_reopen() {
    let (_dir, path) = common::temp_db_path("backup.db");
    let src = Connection::open_in_memory().expect("open source");
    common::seed_rows(&src, 20);

    {
        let dest = Connection::open_with(&path, &OpenOptions::default()).expect("open file");
        let mut backup = Backup::new(&dest, "main", &src, "main").expect("init backup");
        assert_eq!(backup.step(-1).expect("step"), BackupStep::Done);
        backup.finish().expect("finish");
    }

    let reopened = Connection::open_with(&path, &OpenOptions::default()).expect("reopen");
    assert_eq!(common::query_i64(&reopened, "SELECT count(*) FROM t"), 20);
}

#[test]
fn test_backup_into_read_only_destination_fails() {
    let (_dir, path) = common::temp_db_path("readonly.db");
    Connection::open_with(&path, &OpenOptions::default())
        .expect("create file")
        .exec("CREATE TABLE existing (x)")
        .expect("create table");

    let src = Connection::open_in_memory().expect("open source");
    common::seed_rows(&src, 20);
    let read_only = OpenOptions {
        read_only: true,
        ..OpenOptions::default()
    };
    let dest = Connection::open_with(&path, &read_only).expect("open read-only");

    let mut backup = Backup::new(&dest, "main", &src, "main").expect("init backup");
    let err = backup.step(-1).expect_err("read-only destination");
    assert_eq!(err.code.0, 8);

    let err = backup.finish().expect_err("finish reports the failure");
    assert_eq!(err.code.0, 8);
    assert!(err.message.contains("readonly"), "{err}");

    assert_eq!(common::query_i64(&dest, "SELECT 1"), 1);
    assert_eq!(common::query_i64(&dest, "SELECT count(*) FROM existing"), 0);
}
