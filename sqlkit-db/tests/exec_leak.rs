//! `exec` must release the engine-allocated error string on failure.
//!
//! Kept in its own test binary so nothing else allocates through the engine
//! while the counter is sampled.

use sqlkit_db::{memory_used, Connection};

const FAILING_SQL: &str = "INSERT INTO missing VALUES (1)";

#[test]
fn test_failed_exec_does_not_leak_error_text() {
    let conn = Connection::open_in_memory().expect("open");
    for _ in 0..5 {
        let _ = conn.exec(FAILING_SQL);
    }

    let before = memory_used();
    for _ in 0..50 {
        let err = conn.exec(FAILING_SQL).expect_err("missing table");
        assert_eq!(err.message, "no such table: missing");
    }
    let after = memory_used();

    assert!(
        after - before < 512,
        "engine memory grew by {} bytes over 50 failed execs",
        after - before
    );
}
