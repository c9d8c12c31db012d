use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Most ids a single control switches / control variables command may touch.
pub const MAX_CONTROL_RANGE: u32 = 5000;

/// Ids covered by a control range, cut off after `MAX_CONTROL_RANGE` entries.
/// A reversed range is empty.
pub fn control_range(first: u32, last: u32) -> RangeInclusive<u32> {
    first..=last.min(first.saturating_add(MAX_CONTROL_RANGE - 1))
}

/// Whether `control_range` would drop part of `first..=last`.
pub fn control_range_is_clamped(first: u32, last: u32) -> bool {
    last >= first && last - first >= MAX_CONTROL_RANGE
}

/// One entry of a command table exactly as it is stored in the engine's data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCommand {
    pub code: i64,
    #[serde(default)]
    pub indent: i64,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub indent: usize,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(indent: usize, kind: CommandKind) -> Self {
        Self { indent, kind }
    }

    pub fn code(&self) -> i64 {
        self.kind.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandKind {
    End,
    ShowText(TextSetup),
    TextLine {
        text: String,
    },
    ShowChoices(ChoiceSetup),
    WhenChoice {
        index: i32,
        label: String,
    },
    WhenCancel,
    ChoicesEnd,
    InputNumber {
        variable_id: u32,
        digits: u32,
    },
    SelectItem {
        variable_id: u32,
        item_type: u32,
    },
    ScrollText {
        speed: u32,
        no_fast: bool,
    },
    ScrollLine {
        text: String,
    },
    Comment {
        text: String,
    },
    CommentLine {
        text: String,
    },
    ConditionalBranch(Condition),
    Else,
    BranchEnd,
    Loop,
    RepeatAbove,
    BreakLoop,
    ExitEventProcessing,
    CallCommonEvent {
        common_event_id: u32,
    },
    Label {
        name: String,
    },
    JumpToLabel {
        name: String,
    },
    ControlSwitches {
        first: u32,
        last: u32,
        value: bool,
    },
    ControlVariables {
        first: u32,
        last: u32,
        operation: VariableOperation,
        operand: VariableOperand,
    },
    ControlSelfSwitch {
        letter: String,
        value: bool,
    },
    ControlTimer(TimerControl),
    ChangeGold(ValueDelta),
    ChangeItems {
        item: ItemKind,
        item_id: u32,
        delta: ValueDelta,
        include_equip: bool,
    },
    ChangePartyMember {
        actor_id: u32,
        add: bool,
        initialize: bool,
    },
    ChangeAccess {
        access: AccessKind,
        enabled: bool,
    },
    TransferPlayer(TransferTarget),
    SetMovementRoute {
        character: CharacterRef,
        route: MoveRoute,
    },
    ShowAnimation {
        character: CharacterRef,
        animation_id: u32,
        wait: bool,
    },
    ShowBalloon {
        character: CharacterRef,
        balloon_id: u32,
        wait: bool,
    },
    EraseEvent,
    GatherFollowers,
    FadeoutScreen,
    FadeinScreen,
    TintScreen {
        tone: [i32; 4],
        duration: u32,
        wait: bool,
    },
    FlashScreen {
        color: [i32; 4],
        duration: u32,
        wait: bool,
    },
    ShakeScreen {
        power: u32,
        speed: u32,
        duration: u32,
        wait: bool,
    },
    Wait {
        duration: u32,
    },
    ShowPicture {
        picture_id: u32,
        name: String,
        placement: PicturePlacement,
    },
    MovePicture {
        picture_id: u32,
        placement: PicturePlacement,
        duration: u32,
        wait: bool,
    },
    ErasePicture {
        picture_id: u32,
    },
    SetWeather {
        weather: String,
        power: i32,
        duration: u32,
        wait: bool,
    },
    PlayAudio {
        channel: AudioChannel,
        cue: AudioCue,
    },
    FadeoutAudio {
        channel: AudioChannel,
        seconds: u32,
    },
    SaveBgm,
    ResumeBgm,
    StopSe,
    PlayMovie {
        name: String,
    },
    BattleProcessing {
        troop: TroopSource,
        can_escape: bool,
        can_lose: bool,
    },
    IfWin,
    IfEscape,
    IfLose,
    BattleEnd,
    ShopProcessing {
        good: ShopGood,
        purchase_only: bool,
    },
    ShopGoods(ShopGood),
    NameInput {
        actor_id: u32,
        max_chars: u32,
    },
    ChangeHp {
        target: ActorTarget,
        delta: ValueDelta,
        allow_death: bool,
    },
    ChangeMp {
        target: ActorTarget,
        delta: ValueDelta,
    },
    ChangeTp {
        target: ActorTarget,
        delta: ValueDelta,
    },
    ChangeState {
        target: ActorTarget,
        add: bool,
        state_id: u32,
    },
    RecoverAll {
        target: ActorTarget,
    },
    ChangeExp {
        target: ActorTarget,
        delta: ValueDelta,
        show_level_up: bool,
    },
    ChangeLevel {
        target: ActorTarget,
        delta: ValueDelta,
        show_level_up: bool,
    },
    ChangeName {
        actor_id: u32,
        name: String,
    },
    ChangeEnemyHp {
        enemy: EnemyTarget,
        delta: ValueDelta,
        allow_death: bool,
    },
    EnemyRecoverAll {
        enemy: EnemyTarget,
    },
    EnemyAppear {
        enemy_index: u32,
    },
    ForceAction {
        subject: BattlerRef,
        skill_id: u32,
        target_index: i32,
    },
    AbortBattle,
    OpenMenu,
    OpenSave,
    GameOver,
    ReturnToTitle,
    Script {
        line: String,
    },
    ScriptLine {
        line: String,
    },
    PluginCommand {
        command: String,
        args: Vec<String>,
    },
    Unknown {
        code: i64,
        parameters: Vec<Value>,
    },
}

impl CommandKind {
    pub fn code(&self) -> i64 {
        match self {
            Self::End => 0,
            Self::ShowText(_) => 101,
            Self::TextLine { .. } => 401,
            Self::ShowChoices(_) => 102,
            Self::WhenChoice { .. } => 402,
            Self::WhenCancel => 403,
            Self::ChoicesEnd => 404,
            Self::InputNumber { .. } => 103,
            Self::SelectItem { .. } => 104,
            Self::ScrollText { .. } => 105,
            Self::ScrollLine { .. } => 405,
            Self::Comment { .. } => 108,
            Self::CommentLine { .. } => 408,
            Self::ConditionalBranch(_) => 111,
            Self::Else => 411,
            Self::BranchEnd => 412,
            Self::Loop => 112,
            Self::RepeatAbove => 413,
            Self::BreakLoop => 113,
            Self::ExitEventProcessing => 115,
            Self::CallCommonEvent { .. } => 117,
            Self::Label { .. } => 118,
            Self::JumpToLabel { .. } => 119,
            Self::ControlSwitches { .. } => 121,
            Self::ControlVariables { .. } => 122,
            Self::ControlSelfSwitch { .. } => 123,
            Self::ControlTimer(_) => 124,
            Self::ChangeGold(_) => 125,
            Self::ChangeItems { item, .. } => match item {
                ItemKind::Item => 126,
                ItemKind::Weapon => 127,
                ItemKind::Armor => 128,
            },
            Self::ChangePartyMember { .. } => 129,
            Self::ChangeAccess { access, .. } => match access {
                AccessKind::Save => 134,
                AccessKind::Menu => 135,
                AccessKind::Encounter => 136,
                AccessKind::Formation => 137,
            },
            Self::TransferPlayer(_) => 201,
            Self::SetMovementRoute { .. } => 205,
            Self::ShowAnimation { .. } => 212,
            Self::ShowBalloon { .. } => 213,
            Self::EraseEvent => 214,
            Self::GatherFollowers => 217,
            Self::FadeoutScreen => 221,
            Self::FadeinScreen => 222,
            Self::TintScreen { .. } => 223,
            Self::FlashScreen { .. } => 224,
            Self::ShakeScreen { .. } => 225,
            Self::Wait { .. } => 230,
            Self::ShowPicture { .. } => 231,
            Self::MovePicture { .. } => 232,
            Self::ErasePicture { .. } => 235,
            Self::SetWeather { .. } => 236,
            Self::PlayAudio { channel, .. } => match channel {
                AudioChannel::Bgm => 241,
                AudioChannel::Bgs => 245,
                AudioChannel::Me => 249,
                AudioChannel::Se => 250,
            },
            Self::FadeoutAudio { channel, .. } => match channel {
                AudioChannel::Bgs => 246,
                _ => 242,
            },
            Self::SaveBgm => 243,
            Self::ResumeBgm => 244,
            Self::StopSe => 251,
            Self::PlayMovie { .. } => 261,
            Self::BattleProcessing { .. } => 301,
            Self::IfWin => 601,
            Self::IfEscape => 602,
            Self::IfLose => 603,
            Self::BattleEnd => 604,
            Self::ShopProcessing { .. } => 302,
            Self::ShopGoods(_) => 605,
            Self::NameInput { .. } => 303,
            Self::ChangeHp { .. } => 311,
            Self::ChangeMp { .. } => 312,
            Self::ChangeTp { .. } => 326,
            Self::ChangeState { .. } => 313,
            Self::RecoverAll { .. } => 314,
            Self::ChangeExp { .. } => 315,
            Self::ChangeLevel { .. } => 316,
            Self::ChangeName { .. } => 320,
            Self::ChangeEnemyHp { .. } => 331,
            Self::EnemyRecoverAll { .. } => 334,
            Self::EnemyAppear { .. } => 335,
            Self::ForceAction { .. } => 339,
            Self::AbortBattle => 340,
            Self::OpenMenu => 351,
            Self::OpenSave => 352,
            Self::GameOver => 353,
            Self::ReturnToTitle => 354,
            Self::Script { .. } => 355,
            Self::ScriptLine { .. } => 655,
            Self::PluginCommand { .. } => 356,
            Self::Unknown { code, .. } => *code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSetup {
    pub face_name: String,
    pub face_index: u32,
    pub background: u32,
    pub position: u32,
}

impl Default for TextSetup {
    fn default() -> Self {
        Self {
            face_name: String::new(),
            face_index: 0,
            background: 0,
            position: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSetup {
    pub choices: Vec<String>,
    pub cancel_type: i32,
    pub default_type: i32,
    pub position: u32,
    pub background: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    NotEqual,
}

impl Comparison {
    pub fn compare(self, left: i64, right: i64) -> bool {
        match self {
            Self::Equal => left == right,
            Self::GreaterOrEqual => left >= right,
            Self::LessOrEqual => left <= right,
            Self::Greater => left > right,
            Self::Less => left < right,
            Self::NotEqual => left != right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValueSource {
    Constant(i64),
    Variable(u32),
}

/// Amount added to (or, when `negate` is set, removed from) a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDelta {
    pub negate: bool,
    pub source: ValueSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Item,
    Weapon,
    Armor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessKind {
    Save,
    Menu,
    Encounter,
    Formation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableOperation {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum VariableOperand {
    Constant { value: i64 },
    Variable { variable_id: u32 },
    Random { min: i64, max: i64 },
    GameData(GameDataOperand),
    Script { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameDataOperand {
    ItemCount { item: ItemKind, item_id: u32 },
    Actor { actor_id: u32, stat: ActorStat },
    Enemy { enemy_index: u32, stat: EnemyStat },
    Character { character: CharacterRef, data: CharacterData },
    PartyMember { index: u32 },
    Other { data: OtherData },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActorStat {
    Level,
    Exp,
    Hp,
    Mp,
    Tp,
    Param(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EnemyStat {
    Hp,
    Mp,
    Tp,
    Param(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharacterData {
    MapX,
    MapY,
    Direction,
    ScreenX,
    ScreenY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OtherData {
    MapId,
    PartySize,
    Gold,
    Steps,
    PlayTime,
    Timer,
    SaveCount,
    BattleCount,
    WinCount,
    EscapeCount,
}

/// Character addressed by a command: the player, the event running the script, or a map event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CharacterRef {
    Player,
    ThisEvent,
    Event(u32),
}

impl CharacterRef {
    pub fn from_param(value: i64) -> Self {
        match value {
            v if v < 0 => Self::Player,
            0 => Self::ThisEvent,
            v => Self::Event(v as u32),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Condition {
    Switch {
        switch_id: u32,
        value: bool,
    },
    Variable {
        variable_id: u32,
        operand: ValueSource,
        comparison: Comparison,
    },
    SelfSwitch {
        letter: String,
        value: bool,
    },
    Timer {
        seconds: u32,
        at_least: bool,
    },
    Actor {
        actor_id: u32,
        check: ActorCheck,
    },
    Enemy {
        enemy_index: u32,
        check: EnemyCheck,
    },
    Character {
        character: CharacterRef,
        direction: u32,
    },
    Gold {
        amount: i64,
        comparison: Comparison,
    },
    Item {
        item: ItemKind,
        item_id: u32,
        include_equip: bool,
    },
    Button {
        button: String,
    },
    Script {
        source: String,
    },
    Vehicle {
        vehicle_id: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActorCheck {
    InParty,
    Name { name: String },
    Class { class_id: u32 },
    Skill { skill_id: u32 },
    Weapon { weapon_id: u32 },
    Armor { armor_id: u32 },
    State { state_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EnemyCheck {
    Appeared,
    State { state_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimerControl {
    Start { seconds: u32 },
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTarget {
    pub by_variables: bool,
    pub map_id: u32,
    pub x: i64,
    pub y: i64,
    pub direction: u32,
    pub fade: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRoute {
    pub repeat: bool,
    pub skippable: bool,
    pub wait: bool,
    pub list: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicturePlacement {
    pub origin: u32,
    pub by_variables: bool,
    pub x: i64,
    pub y: i64,
    pub scale_x: i64,
    pub scale_y: i64,
    pub opacity: i64,
    pub blend_mode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioChannel {
    Bgm,
    Bgs,
    Me,
    Se,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioCue {
    pub name: String,
    pub volume: u32,
    pub pitch: u32,
    pub pan: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TroopSource {
    Direct(u32),
    Variable(u32),
    Encounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopGood {
    pub item: ItemKind,
    pub item_id: u32,
    pub price: Option<i64>,
}

/// Actor selection used by the actor commands; id 0 addresses the whole party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActorTarget {
    Fixed(u32),
    Variable(u32),
}

/// Troop member selection; `None` addresses every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyTarget {
    pub enemy_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BattlerRef {
    Enemy(u32),
    Actor(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleResult {
    Win,
    Escape,
    Lose,
}

impl BattleResult {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Win),
            1 => Some(Self::Escape),
            2 => Some(Self::Lose),
            _ => None,
        }
    }
}

#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn code_matches_engine_opcodes_for_grouped_variants() {
        let weapons = CommandKind::ChangeItems {
            item: ItemKind::Weapon,
            item_id: 1,
            delta: ValueDelta {
                negate: false,
                source: ValueSource::Constant(1),
            },
            include_equip: false,
        };
        assert_eq!(weapons.code(), 127);

        let bgs = CommandKind::FadeoutAudio {
            channel: AudioChannel::Bgs,
            seconds: 2,
        };
        assert_eq!(bgs.code(), 246);

        let unknown = CommandKind::Unknown {
            code: 999,
            parameters: Vec::new(),
        };
        assert_eq!(Command::new(0, unknown).code(), 999);
    }

    #[test]
    fn comparison_covers_every_operator() {
        assert!(Comparison::Equal.compare(2, 2));
        assert!(Comparison::GreaterOrEqual.compare(3, 2));
        assert!(Comparison::LessOrEqual.compare(2, 2));
        assert!(!Comparison::Greater.compare(2, 2));
        assert!(Comparison::Less.compare(1, 2));
        assert!(Comparison::NotEqual.compare(1, 2));
    }

    #[test]
    fn character_ref_from_param_follows_sign_convention() {
        assert_eq!(CharacterRef::from_param(-1), CharacterRef::Player);
        assert_eq!(CharacterRef::from_param(0), CharacterRef::ThisEvent);
        assert_eq!(CharacterRef::from_param(7), CharacterRef::Event(7));
    }

    #[test]
    fn raw_command_defaults_missing_fields() {
        let raw: RawCommand = serde_json::from_str(r#"{"code":0}"#).expect("raw should parse");
        assert_eq!(raw.indent, 0);
        assert!(raw.parameters.is_empty());
    }

    #[test]
    fn control_range_caps_oversized_spans() {
        assert_eq!(control_range(3, 5), 3..=5);
        assert!(control_range(5, 3).is_empty());
        assert_eq!(control_range(1, u32::MAX).count(), MAX_CONTROL_RANGE as usize);
        assert_eq!(control_range(u32::MAX, u32::MAX).count(), 1);
        assert!(!control_range_is_clamped(1, MAX_CONTROL_RANGE));
        assert!(control_range_is_clamped(1, MAX_CONTROL_RANGE + 1));
        assert!(!control_range_is_clamped(9, 2));
    }
}
