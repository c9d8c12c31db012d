use ev_core::{AudioChannel, AudioCue, BattleResult, BattlerRef, MoveRoute, ShopGood};
use serde::{Deserialize, Serialize};

use crate::state::CharacterId;
use crate::wait::WaitMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoicePrompt {
    pub choices: Vec<String>,
    /// `-1` disallows cancel, `-2` branches to the cancel block, otherwise the choice picked on cancel.
    pub cancel_type: i32,
    pub default_type: i32,
    pub position: u32,
    pub background: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MessageInput {
    Choice(ChoicePrompt),
    Number { digits: u32 },
    Item { item_type: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSetup {
    pub speed: u32,
    pub no_fast: bool,
}

/// Everything one message window shows. Escape codes are already expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub face_name: String,
    pub face_index: u32,
    pub background: u32,
    pub position: u32,
    pub lines: Vec<String>,
    pub scroll: Option<ScrollSetup>,
    pub input: Option<MessageInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MessageResult {
    Choice(i32),
    Number(i64),
    Item(u32),
}

/// Fire-and-forget presentation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    Transfer {
        map_id: u32,
        x: i64,
        y: i64,
        direction: u32,
        fade: u32,
    },
    MoveRoute {
        character: CharacterId,
        route: MoveRoute,
    },
    Animation {
        character: CharacterId,
        animation_id: u32,
    },
    Balloon {
        character: CharacterId,
        balloon_id: u32,
    },
    EraseEvent {
        event_id: u32,
    },
    GatherFollowers,
    FadeOut {
        duration: u32,
    },
    FadeIn {
        duration: u32,
    },
    Tint {
        tone: [i32; 4],
        duration: u32,
    },
    Flash {
        color: [i32; 4],
        duration: u32,
    },
    Shake {
        power: u32,
        speed: u32,
        duration: u32,
    },
    ShowPicture {
        picture_id: u32,
        name: String,
        origin: u32,
        x: i64,
        y: i64,
        scale_x: i64,
        scale_y: i64,
        opacity: i64,
        blend_mode: u32,
    },
    MovePicture {
        picture_id: u32,
        origin: u32,
        x: i64,
        y: i64,
        scale_x: i64,
        scale_y: i64,
        opacity: i64,
        blend_mode: u32,
        duration: u32,
    },
    ErasePicture {
        picture_id: u32,
    },
    Weather {
        weather: String,
        power: i32,
        duration: u32,
    },
    PlayAudio {
        channel: AudioChannel,
        cue: AudioCue,
    },
    FadeOutAudio {
        channel: AudioChannel,
        seconds: u32,
    },
    SaveBgm,
    ResumeBgm,
    StopSe,
    PlayMovie {
        name: String,
    },
    ForceAction {
        subject: BattlerRef,
        skill_id: u32,
        target_index: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneRequest {
    Battle {
        troop_id: u32,
        can_escape: bool,
        can_lose: bool,
    },
    Shop {
        goods: Vec<ShopGood>,
        purchase_only: bool,
    },
    NameInput {
        actor_id: u32,
        max_chars: u32,
    },
    Save,
    Menu,
    GameOver,
    Title,
    AbortBattle,
}

/// Conditions surfaced to the owning collaborator instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Report {
    DepthOverflow { common_event_id: u32, depth: usize },
    MissingCommonEvent { common_event_id: u32 },
    MissingLabel { name: String, index: usize },
    StrayElse { index: usize },
    BreakOutsideLoop { index: usize },
    RepeatWithoutLoop { index: usize },
    ScriptFailed { index: usize, message: String },
    FreezeGuard { index: usize, commands: usize },
}

impl Report {
    /// Whether `self` repeats `previous`. Freeze guard trips count as repeats wherever the
    /// cursor stopped, since a runaway loop trips at a different index each tick.
    pub fn repeats(&self, previous: &Report) -> bool {
        match (self, previous) {
            (Report::FreezeGuard { .. }, Report::FreezeGuard { .. }) => true,
            _ => self == previous,
        }
    }
}

/// Presentation collaborators seen from the interpreter: requests go out, busy state
/// and player answers come back.
pub trait Host {
    fn is_busy(&self, wait: &WaitMode) -> bool;
    fn show_message(&mut self, message: Message);
    fn take_message_result(&mut self) -> Option<MessageResult>;
    fn request(&mut self, request: Request);
    fn push_scene(&mut self, scene: SceneRequest);
    fn take_battle_result(&mut self) -> Option<BattleResult>;

    fn is_message_busy(&self) -> bool {
        self.is_busy(&WaitMode::MESSAGE)
    }

    fn is_button_pressed(&self, _button: &str) -> bool {
        false
    }

    fn plugin_command(&mut self, _command: &str, _args: &[String]) {}

    fn report(&mut self, _report: Report) {}
}
