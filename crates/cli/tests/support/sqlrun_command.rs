#![allow(dead_code)]

use std::{
    path::Path,
    process::{Command, Output},
};

const SQLRUN_VARIABLES: &[&str] = &[
    "SQLRUN_BACKEND",
    "SQLRUN_DATABASE",
    "SQLRUN_HOST",
    "SQLRUN_PORT",
    "SQLRUN_USER",
    "SQLRUN_PASSWORD",
    "SQLRUN_SCHEMA",
];

/// Runs the binary inside `workdir` with only the given `SQLRUN_*` settings,
/// so no ambient `.env` or environment leaks into the test.
pub fn run_sqlrun(workdir: &Path, env: &[(&str, &str)], args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sqlrun"));
    command.current_dir(workdir).env_remove("RUST_LOG");
    for name in SQLRUN_VARIABLES {
        command.env_remove(name);
    }
    command.envs(env.iter().copied());

    command
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run sqlrun: {error}"))
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
