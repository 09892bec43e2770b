use sqlrun_core::{
    Error, ExecutionError, Executor, RunOptions, SessionOverride, StatementWindow, Value,
};

#[path = "support/fake_warehouse.rs"]
mod fake_warehouse;

use fake_warehouse::FakeWarehouse;

const SCRIPT: &str = "SET months_back = '6';\n\
                      CREATE TABLE t AS SELECT 1 AS id;\n\
                      SELECT id FROM t;\n\
                      SELECT 'a;b' AS label; -- trailing ; comment\n\
                      SELECT 4;";

fn run(
    warehouse: &mut FakeWarehouse,
    options: &RunOptions,
) -> (sqlrun_core::Result<sqlrun_core::RunSummary>, String) {
    let mut out = Vec::new();
    let result = Executor::new(warehouse).run_script(SCRIPT, options, &mut out);
    (result, String::from_utf8(out).expect("output is utf-8"))
}

#[test]
fn runs_every_statement_and_prints_outcomes() {
    let mut warehouse = FakeWarehouse::default();
    warehouse.set_rows("SELECT id FROM t", &["ID"], vec![vec![Value::Integer(1)]]);

    let options = RunOptions {
        label: "queries/audit.sql".to_string(),
        ..RunOptions::default()
    };
    let (result, output) = run(&mut warehouse, &options);
    let summary = result.expect("script should run");

    assert_eq!(summary.total_statements, 5);
    assert_eq!(summary.executed_statements, 5);
    assert_eq!(summary.result_sets, 1);
    assert_eq!(
        warehouse.executed_sql(),
        [
            "SET months_back = '6'",
            "CREATE TABLE t AS SELECT 1 AS id",
            "SELECT id FROM t",
            "SELECT 'a;b' AS label",
            "-- trailing ; comment\nSELECT 4",
        ]
    );
    assert!(output.contains("[statement 1/5] queries/audit.sql"));
    assert!(output.contains("[statement 5/5] queries/audit.sql"));
    assert!(output.contains(&"=".repeat(90)));
    assert!(output.contains("OK (no result set)"));
    assert!(output.contains("ID\n 1\n"));
}

#[test]
fn overrides_run_first_and_window_limits_statements() {
    let mut warehouse = FakeWarehouse::default();
    let options = RunOptions {
        window: StatementWindow::new(2, Some(2)),
        overrides: vec![
            "months_back=12"
                .parse::<SessionOverride>()
                .expect("valid override"),
        ],
        print_sql: true,
        ..RunOptions::default()
    };

    let (result, output) = run(&mut warehouse, &options);
    let summary = result.expect("script should run");

    assert_eq!(summary.executed_statements, 2);
    assert_eq!(
        warehouse.executed_sql(),
        [
            "SET months_back = '12'",
            "CREATE TABLE t AS SELECT 1 AS id",
            "SELECT id FROM t",
        ]
    );
    assert!(output.contains("[statement 2/5]"));
    assert!(output.contains("[statement 3/5]"));
    assert!(!output.contains("[statement 4/5]"));
    assert!(output.contains("CREATE TABLE t AS SELECT 1 AS id\n"));
}

#[test]
fn empty_result_sets_and_truncation_are_reported() {
    let mut warehouse = FakeWarehouse::default();
    warehouse.set_rows("SELECT id FROM t", &["ID"], Vec::new());
    warehouse.set_rows(
        "-- trailing ; comment\nSELECT 4",
        &["N"],
        (0..5).map(|n| vec![Value::Integer(n)]).collect(),
    );

    let options = RunOptions {
        max_rows: 2,
        ..RunOptions::default()
    };
    let (result, output) = run(&mut warehouse, &options);
    result.expect("script should run");

    assert!(output.contains("(empty result set)"));
    assert!(output.contains("... (5 rows total; showing 2)"));
}

#[test]
fn failure_stops_the_run_with_statement_position() {
    let mut warehouse = FakeWarehouse::default();
    warehouse.set_fail_on_sql("SELECT id FROM t", "table t does not exist");

    let (result, output) = run(&mut warehouse, &RunOptions::default());
    let error = result.expect_err("third statement fails");

    let Error::Execute(ExecutionError::StatementFailed {
        statement_index,
        sql,
        executed_statements,
        ..
    }) = &error
    else {
        panic!("expected execution error, got {error:?}");
    };
    assert_eq!(*statement_index, 3);
    assert_eq!(sql, "SELECT id FROM t");
    assert_eq!(*executed_statements, 2);
    assert!(error.to_string().contains("table t does not exist"));
    assert!(!output.contains("[statement 4/5]"));
}

#[test]
fn failing_override_aborts_before_the_script() {
    let mut warehouse = FakeWarehouse::default();
    warehouse.set_fail_on_sql("SET bad = 'x'", "unknown variable");
    let options = RunOptions {
        overrides: vec!["bad=x".parse().expect("valid override")],
        ..RunOptions::default()
    };

    let (result, output) = run(&mut warehouse, &options);
    assert!(matches!(
        result,
        Err(Error::Execute(ExecutionError::StatementFailed {
            statement_index: 0,
            ..
        }))
    ));
    assert!(warehouse.executed_sql().is_empty());
    assert!(output.is_empty());
}
