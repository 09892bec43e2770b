use sqlrun_testkit::{TestResult, builtin_split_cases, run_execution_case};
use sqlrun_warehouse_sqlite::SqliteWarehouse;

#[test]
fn executable_split_cases_run_on_sqlite() {
    let cases = builtin_split_cases().unwrap_or_else(|error| panic!("invalid cases: {error}"));
    let mut failures = Vec::new();
    let mut passed = 0;

    for (name, case) in &cases {
        let mut warehouse = SqliteWarehouse::open(":memory:").expect("open in-memory sqlite");
        match run_execution_case(&mut warehouse, case) {
            TestResult::Passed => passed += 1,
            TestResult::Skipped(_) => {}
            TestResult::Failed(message) => failures.push(format!("{name}: {message}")),
        }
    }

    assert!(
        failures.is_empty(),
        "sqlite execution failures:\n{}",
        failures.join("\n")
    );
    assert!(passed > 0, "at least one case should execute");
}
