use std::fs;
use std::path::Path;

use ev_core::EventError;
use ev_runtime::MemoryGameState;
use serde::{Deserialize, Serialize};

use crate::{map_cli_state_encode, map_cli_state_invalid, map_cli_state_read, map_cli_state_write};

pub(crate) const GAME_STATE_SCHEMA: &str = "ev-state.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameStateFile {
    pub(crate) schema_version: String,
    pub(crate) state: MemoryGameState,
}

pub(crate) fn save_game_state(path: &Path, state: &MemoryGameState) -> Result<(), EventError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_state_write)?;

    let file = GameStateFile {
        schema_version: GAME_STATE_SCHEMA.to_string(),
        state: state.clone(),
    };
    let payload = serde_json::to_string_pretty(&file).map_err(map_cli_state_encode)?;
    fs::write(path, payload).map_err(map_cli_state_write)
}

pub(crate) fn load_game_state(path: &Path) -> Result<MemoryGameState, EventError> {
    if !path.exists() {
        return Err(EventError::new(
            "CLI_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_cli_state_read)?;

    let file: GameStateFile = serde_json::from_str(&raw).map_err(map_cli_state_invalid)?;

    if file.schema_version != GAME_STATE_SCHEMA {
        return Err(EventError::new(
            "CLI_STATE_SCHEMA",
            format!("Unsupported game state schema: {}", file.schema_version),
        ));
    }

    Ok(file.state)
}
