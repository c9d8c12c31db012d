mod case;
mod runner;
mod source;

pub use case::{ExpectedEvent, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport};
pub use source::{read_data_files_from_dir, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .json files under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("Project error: {0}")]
    Project(#[from] ev_core::EventError),
    #[error("Guard exceeded: max_ticks={max_ticks}.")]
    GuardExceeded { max_ticks: usize },
    #[error("Expected event count {expected}, actual {actual}. observed={observed}")]
    EventCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Event mismatch at index {index}. expected={expected} actual={actual}")]
    EventMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Switch {id} expected {expected}, actual {actual}.")]
    SwitchMismatch { id: u32, expected: bool, actual: bool },
    #[error("Variable {id} expected {expected}, actual {actual}.")]
    VariableMismatch { id: u32, expected: i64, actual: i64 },
    #[error("Failed to serialize event for diff: {0}")]
    EventSerialize(serde_json::Error),
}
