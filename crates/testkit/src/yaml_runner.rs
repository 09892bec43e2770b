use std::{collections::BTreeMap, io};

use serde::Deserialize;
use sqlrun_core::{
    ConfigError, Executor, Result, RunOptions, Statement, WarehouseClient, split_statements,
};

const TESTCASE_SOURCE_LABEL: &str = "yaml testcase";
const BUILTIN_SPLIT_CASES: &str = include_str!("../cases/split_cases.yml");

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitCase {
    pub input: String,
    /// Expected statement texts in order, already trimmed.
    pub statements: Vec<String>,
    /// Whether every expected statement is valid SQL on all backends.
    pub execute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Skipped(String),
    Failed(String),
}

pub fn load_split_cases_from_str(yaml: &str) -> Result<BTreeMap<String, SplitCase>> {
    serde_yaml::from_str(yaml).map_err(|source| parse_yaml_error(yaml, &source))
}

pub fn builtin_split_cases() -> Result<BTreeMap<String, SplitCase>> {
    load_split_cases_from_str(BUILTIN_SPLIT_CASES)
}

pub fn run_split_case(case: &SplitCase) -> TestResult {
    let actual = split_statements(&case.input);
    match compare_statements(&case.statements, &actual) {
        Ok(()) => TestResult::Passed,
        Err(message) => TestResult::Failed(message),
    }
}

/// Runs the case through the executor against a live client and checks that
/// every expected statement reached it.
pub fn run_execution_case(client: &mut dyn WarehouseClient, case: &SplitCase) -> TestResult {
    if !case.execute {
        return TestResult::Skipped(format!(
            "case is not executable on {}",
            client.backend_name()
        ));
    }

    let mut sink = io::sink();
    let summary = match Executor::new(client).run_script(
        &case.input,
        &RunOptions::default(),
        &mut sink,
    ) {
        Ok(summary) => summary,
        Err(error) => return TestResult::Failed(error.to_string()),
    };

    if summary.executed_statements != case.statements.len() {
        return TestResult::Failed(format!(
            "executed {} statements, expected {}",
            summary.executed_statements,
            case.statements.len()
        ));
    }
    TestResult::Passed
}

fn compare_statements(
    expected: &[String],
    actual: &[Statement],
) -> std::result::Result<(), String> {
    if expected.len() != actual.len() {
        return Err(format!(
            "expected {} statements, got {}: {:?}",
            expected.len(),
            actual.len(),
            actual.iter().map(Statement::sql).collect::<Vec<_>>()
        ));
    }

    for (position, (want, got)) in expected.iter().zip(actual).enumerate() {
        if got.index() != position + 1 {
            return Err(format!(
                "statement at position {position} is numbered {}",
                got.index()
            ));
        }
        if want.trim() != got.sql() {
            return Err(format!(
                "statement[{}] mismatch\nexpected: {want:?}\n  actual: {:?}",
                got.index(),
                got.sql()
            ));
        }
    }
    Ok(())
}

fn parse_yaml_error(yaml: &str, source: &serde_yaml::Error) -> sqlrun_core::Error {
    let location = source
        .location()
        .map(|location| format!(" at line {} column {}", location.line(), location.column()))
        .unwrap_or_default();

    ConfigError::InvalidValue {
        name: TESTCASE_SOURCE_LABEL.to_string(),
        value: source_excerpt(yaml),
        reason: format!("{source}{location}"),
    }
    .into()
}

fn source_excerpt(yaml: &str) -> String {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return TESTCASE_SOURCE_LABEL.to_string();
    }

    const MAX_CHARS: usize = 256;
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }

    let mut excerpt: String = trimmed.chars().take(MAX_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
