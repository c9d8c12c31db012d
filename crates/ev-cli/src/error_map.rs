use ev_core::EventError;
use serde::Serialize;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> EventError {
    EventError::new(code, error.to_string())
}

/// JSON text for one protocol record.
pub(crate) fn json_line<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

pub(crate) fn emit_error(error: EventError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_line(&error.message));
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> EventError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: std::path::StripPrefixError) -> EventError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> EventError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> EventError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_encode(error: serde_json::Error) -> EventError {
    map_error("CLI_STATE_ENCODE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> EventError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> EventError {
    map_error("CLI_STATE_INVALID", error)
}
