mod fixtures;
mod recording;
mod yaml_runner;

pub use fixtures::{BORROWERS_FIXTURE, BORROWERS_SEGMENTS, ENRICHED_QUERY};
pub use recording::RecordingWarehouse;
pub use yaml_runner::{
    SplitCase, TestResult, builtin_split_cases, load_split_cases_from_str, run_execution_case,
    run_split_case,
};
