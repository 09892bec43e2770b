use std::fs;

use tempfile::tempdir;

#[path = "support/sqlrun_command.rs"]
mod sqlrun_command;

use sqlrun_command::{run_sqlrun, stderr_of};

#[test]
fn missing_connection_settings_are_listed_together() {
    let workdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    fs::write(workdir.path().join("script.sql"), "SELECT 1;")
        .unwrap_or_else(|error| panic!("failed to write script.sql: {error}"));

    let output = run_sqlrun(
        workdir.path(),
        &[("SQLRUN_BACKEND", "postgres")],
        &["run", "--file", "script.sql"],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[config]"), "{stderr}");
    assert!(
        stderr.contains("SQLRUN_DATABASE, SQLRUN_USER, SQLRUN_PASSWORD"),
        "all missing variables must be reported at once: {stderr}"
    );
}

#[test]
fn unreadable_script_reports_the_path() {
    let workdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));

    let output = run_sqlrun(
        workdir.path(),
        &[("SQLRUN_DATABASE", "warehouse.db")],
        &["run", "--file", "missing.sql"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[io]"), "{stderr}");
    assert!(
        stderr.contains("while reading SQL file `missing.sql`"),
        "{stderr}"
    );
}

#[cfg(feature = "sqlite")]
#[test]
fn failing_statement_keeps_execute_category_and_position() {
    let workdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    fs::write(
        workdir.path().join("script.sql"),
        "SELECT 1;\nSELECT * FROM missing_table;\nSELECT 3;\n",
    )
    .unwrap_or_else(|error| panic!("failed to write script.sql: {error}"));

    let output = run_sqlrun(
        workdir.path(),
        &[("SQLRUN_DATABASE", "warehouse.db")],
        &["run", "--file", "script.sql"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("[execute]"), "{stderr}");
    assert!(stderr.contains("while running `sqlrun run`"), "{stderr}");
    assert!(
        stderr.contains("statement[2] failed after 1 executed statements"),
        "{stderr}"
    );
}
