use serde::{Deserialize, Serialize};

use crate::state::CharacterId;

/// Input a message window was opened with; applied when the wait ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PendingInput {
    Choice { indent: usize },
    Number { variable_id: u32 },
    Item { variable_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneKind {
    Shop,
    NameInput,
    Save,
}

/// Why an interpreter is suspended. `Ticks` counts down inside the interpreter; every
/// other mode is polled through `Host::is_busy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WaitMode {
    Ticks { remaining: u32 },
    Message { input: Option<PendingInput> },
    Transfer,
    Scroll,
    Route { character: CharacterId },
    Animation { character: CharacterId },
    Balloon { character: CharacterId },
    Gather,
    Action,
    Video,
    Scene { scene: SceneKind },
    Battle { indent: usize },
}

impl WaitMode {
    pub const MESSAGE: WaitMode = WaitMode::Message { input: None };

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ticks { .. } => "ticks",
            Self::Message { .. } => "message",
            Self::Transfer => "transfer",
            Self::Scroll => "scroll",
            Self::Route { .. } => "route",
            Self::Animation { .. } => "animation",
            Self::Balloon { .. } => "balloon",
            Self::Gather => "gather",
            Self::Action => "action",
            Self::Video => "video",
            Self::Scene { .. } => "scene",
            Self::Battle { .. } => "battle",
        }
    }
}
