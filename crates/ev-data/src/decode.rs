use ev_core::{
    AccessKind, ActorCheck, ActorStat, ActorTarget, AudioChannel, AudioCue, BattlerRef,
    CharacterData, CharacterRef, ChoiceSetup, Command, CommandKind, CommandTable, Comparison,
    Condition, EnemyCheck, EnemyStat, EnemyTarget, EventError, GameDataOperand, ItemKind,
    MoveRoute, OtherData, PicturePlacement, RawCommand, ShopGood, TextSetup, TimerControl,
    TransferTarget, TroopSource, ValueDelta, ValueSource, VariableOperand, VariableOperation,
};
use serde_json::Value;

use crate::params::Params;

pub fn decode_table(raw: &[RawCommand]) -> Result<CommandTable, EventError> {
    raw.iter()
        .enumerate()
        .map(|(index, command)| decode_command(command).map_err(|error| error.with_index(index)))
        .collect::<Result<Vec<_>, _>>()
        .map(CommandTable::new)
}

/// Decodes a JSON command list (`[{code, indent, parameters}, ...]`).
pub fn decode_table_json(value: &Value) -> Result<CommandTable, EventError> {
    let raw: Vec<RawCommand> = serde_json::from_value(value.clone()).map_err(|error| {
        EventError::new(
            "DATA_COMMAND_LIST",
            format!("Command list is not a list of commands: {}", error),
        )
    })?;
    decode_table(&raw)
}

pub fn decode_command(raw: &RawCommand) -> Result<Command, EventError> {
    let indent = usize::try_from(raw.indent).map_err(|_| {
        EventError::new(
            "DATA_INDENT",
            format!("Command {} has negative indent {}.", raw.code, raw.indent),
        )
    })?;
    let params = Params::new(raw.code, &raw.parameters);
    let kind = decode_kind(raw.code, &params)?;
    Ok(Command::new(indent, kind))
}

fn decode_kind(code: i64, p: &Params<'_>) -> Result<CommandKind, EventError> {
    let kind = match code {
        0 => CommandKind::End,
        101 => CommandKind::ShowText(TextSetup {
            face_name: p.string_or_empty(0)?,
            face_index: p.uint_or(1, 0)?,
            background: p.uint_or(2, 0)?,
            position: p.uint_or(3, 2)?,
        }),
        401 => CommandKind::TextLine { text: p.string(0)? },
        102 => CommandKind::ShowChoices(ChoiceSetup {
            choices: p
                .array(0)?
                .iter()
                .map(|choice| choice.as_str().unwrap_or_default().to_string())
                .collect(),
            cancel_type: p.int32_or(1, -1)?,
            default_type: p.int32_or(2, 0)?,
            position: p.uint_or(3, 2)?,
            background: p.uint_or(4, 0)?,
        }),
        402 => CommandKind::WhenChoice {
            index: p.int32(0)?,
            label: p.string_or_empty(1)?,
        },
        403 => CommandKind::WhenCancel,
        404 => CommandKind::ChoicesEnd,
        103 => CommandKind::InputNumber {
            variable_id: p.uint(0)?,
            digits: p.uint_or(1, 1)?,
        },
        104 => CommandKind::SelectItem {
            variable_id: p.uint(0)?,
            item_type: p.uint_or(1, 2)?,
        },
        105 => CommandKind::ScrollText {
            speed: p.uint_or(0, 2)?,
            no_fast: p.flag_or(1, false)?,
        },
        405 => CommandKind::ScrollLine { text: p.string(0)? },
        108 => CommandKind::Comment {
            text: p.string_or_empty(0)?,
        },
        408 => CommandKind::CommentLine {
            text: p.string_or_empty(0)?,
        },
        111 => CommandKind::ConditionalBranch(decode_condition(p)?),
        411 => CommandKind::Else,
        412 => CommandKind::BranchEnd,
        112 => CommandKind::Loop,
        413 => CommandKind::RepeatAbove,
        113 => CommandKind::BreakLoop,
        115 => CommandKind::ExitEventProcessing,
        117 => CommandKind::CallCommonEvent {
            common_event_id: p.uint(0)?,
        },
        118 => CommandKind::Label { name: p.string(0)? },
        119 => CommandKind::JumpToLabel { name: p.string(0)? },
        121 => CommandKind::ControlSwitches {
            first: p.uint(0)?,
            last: p.uint(1)?,
            value: p.on_off(2)?,
        },
        122 => CommandKind::ControlVariables {
            first: p.uint(0)?,
            last: p.uint(1)?,
            operation: decode_variable_operation(p, 2)?,
            operand: decode_variable_operand(p)?,
        },
        123 => CommandKind::ControlSelfSwitch {
            letter: p.string(0)?,
            value: p.on_off(1)?,
        },
        124 => CommandKind::ControlTimer(if p.int(0)? == 0 {
            TimerControl::Start {
                seconds: p.uint_or(1, 0)?,
            }
        } else {
            TimerControl::Stop
        }),
        125 => CommandKind::ChangeGold(decode_delta(p, 0)?),
        126..=128 => {
            let item = match code {
                126 => ItemKind::Item,
                127 => ItemKind::Weapon,
                _ => ItemKind::Armor,
            };
            CommandKind::ChangeItems {
                item,
                item_id: p.uint(0)?,
                delta: decode_delta(p, 1)?,
                include_equip: item != ItemKind::Item && p.flag_or(4, false)?,
            }
        }
        129 => CommandKind::ChangePartyMember {
            actor_id: p.uint(0)?,
            add: p.int(1)? == 0,
            initialize: p.flag_or(2, false)?,
        },
        134..=137 => CommandKind::ChangeAccess {
            access: match code {
                134 => AccessKind::Save,
                135 => AccessKind::Menu,
                136 => AccessKind::Encounter,
                _ => AccessKind::Formation,
            },
            enabled: p.int(0)? != 0,
        },
        201 => CommandKind::TransferPlayer(TransferTarget {
            by_variables: p.int(0)? != 0,
            map_id: p.uint(1)?,
            x: p.int(2)?,
            y: p.int(3)?,
            direction: p.uint_or(4, 0)?,
            fade: p.uint_or(5, 0)?,
        }),
        205 => CommandKind::SetMovementRoute {
            character: CharacterRef::from_param(p.int(0)?),
            route: decode_move_route(p)?,
        },
        212 => CommandKind::ShowAnimation {
            character: CharacterRef::from_param(p.int(0)?),
            animation_id: p.uint(1)?,
            wait: p.flag_or(2, false)?,
        },
        213 => CommandKind::ShowBalloon {
            character: CharacterRef::from_param(p.int(0)?),
            balloon_id: p.uint(1)?,
            wait: p.flag_or(2, false)?,
        },
        214 => CommandKind::EraseEvent,
        217 => CommandKind::GatherFollowers,
        221 => CommandKind::FadeoutScreen,
        222 => CommandKind::FadeinScreen,
        223 => CommandKind::TintScreen {
            tone: p.int_quad(0)?,
            duration: p.uint(1)?,
            wait: p.flag_or(2, false)?,
        },
        224 => CommandKind::FlashScreen {
            color: p.int_quad(0)?,
            duration: p.uint(1)?,
            wait: p.flag_or(2, false)?,
        },
        225 => CommandKind::ShakeScreen {
            power: p.uint(0)?,
            speed: p.uint(1)?,
            duration: p.uint(2)?,
            wait: p.flag_or(3, false)?,
        },
        230 => CommandKind::Wait {
            duration: p.uint(0)?,
        },
        231 => CommandKind::ShowPicture {
            picture_id: p.uint(0)?,
            name: p.string_or_empty(1)?,
            placement: decode_placement(p)?,
        },
        232 => CommandKind::MovePicture {
            picture_id: p.uint(0)?,
            placement: decode_placement(p)?,
            duration: p.uint_or(10, 1)?,
            wait: p.flag_or(11, false)?,
        },
        235 => CommandKind::ErasePicture {
            picture_id: p.uint(0)?,
        },
        236 => CommandKind::SetWeather {
            weather: p.string(0)?,
            power: p.int32(1)?,
            duration: p.uint(2)?,
            wait: p.flag_or(3, false)?,
        },
        241 | 245 | 249 | 250 => CommandKind::PlayAudio {
            channel: match code {
                241 => AudioChannel::Bgm,
                245 => AudioChannel::Bgs,
                249 => AudioChannel::Me,
                _ => AudioChannel::Se,
            },
            cue: decode_audio(p)?,
        },
        242 | 246 => CommandKind::FadeoutAudio {
            channel: if code == 242 {
                AudioChannel::Bgm
            } else {
                AudioChannel::Bgs
            },
            seconds: p.uint(0)?,
        },
        243 => CommandKind::SaveBgm,
        244 => CommandKind::ResumeBgm,
        251 => CommandKind::StopSe,
        261 => CommandKind::PlayMovie {
            name: p.string_or_empty(0)?,
        },
        301 => CommandKind::BattleProcessing {
            troop: match p.int(0)? {
                0 => TroopSource::Direct(p.uint(1)?),
                1 => TroopSource::Variable(p.uint(1)?),
                _ => TroopSource::Encounter,
            },
            can_escape: p.flag_or(2, false)?,
            can_lose: p.flag_or(3, false)?,
        },
        601 => CommandKind::IfWin,
        602 => CommandKind::IfEscape,
        603 => CommandKind::IfLose,
        604 => CommandKind::BattleEnd,
        302 => CommandKind::ShopProcessing {
            good: decode_shop_good(p)?,
            purchase_only: p.flag_or(4, false)?,
        },
        605 => CommandKind::ShopGoods(decode_shop_good(p)?),
        303 => CommandKind::NameInput {
            actor_id: p.uint(0)?,
            max_chars: p.uint_or(1, 8)?,
        },
        311 => CommandKind::ChangeHp {
            target: decode_actor_target(p)?,
            delta: decode_delta(p, 2)?,
            allow_death: p.flag_or(5, false)?,
        },
        312 => CommandKind::ChangeMp {
            target: decode_actor_target(p)?,
            delta: decode_delta(p, 2)?,
        },
        326 => CommandKind::ChangeTp {
            target: decode_actor_target(p)?,
            delta: decode_delta(p, 2)?,
        },
        313 => CommandKind::ChangeState {
            target: decode_actor_target(p)?,
            add: p.int(2)? == 0,
            state_id: p.uint(3)?,
        },
        314 => CommandKind::RecoverAll {
            target: decode_actor_target(p)?,
        },
        315 => CommandKind::ChangeExp {
            target: decode_actor_target(p)?,
            delta: decode_delta(p, 2)?,
            show_level_up: p.flag_or(5, false)?,
        },
        316 => CommandKind::ChangeLevel {
            target: decode_actor_target(p)?,
            delta: decode_delta(p, 2)?,
            show_level_up: p.flag_or(5, false)?,
        },
        320 => CommandKind::ChangeName {
            actor_id: p.uint(0)?,
            name: p.string(1)?,
        },
        331 => CommandKind::ChangeEnemyHp {
            enemy: decode_enemy_target(p)?,
            delta: decode_delta(p, 1)?,
            allow_death: p.flag_or(4, false)?,
        },
        334 => CommandKind::EnemyRecoverAll {
            enemy: decode_enemy_target(p)?,
        },
        335 => CommandKind::EnemyAppear {
            enemy_index: p.uint(0)?,
        },
        339 => CommandKind::ForceAction {
            subject: if p.int(0)? == 0 {
                BattlerRef::Enemy(p.uint(1)?)
            } else {
                BattlerRef::Actor(p.uint(1)?)
            },
            skill_id: p.uint(2)?,
            target_index: p.int32_or(3, -1)?,
        },
        340 => CommandKind::AbortBattle,
        351 => CommandKind::OpenMenu,
        352 => CommandKind::OpenSave,
        353 => CommandKind::GameOver,
        354 => CommandKind::ReturnToTitle,
        355 => CommandKind::Script { line: p.string(0)? },
        655 => CommandKind::ScriptLine { line: p.string(0)? },
        356 => {
            let text = p.string(0)?;
            let mut words = text.split_whitespace().map(str::to_string);
            CommandKind::PluginCommand {
                command: words.next().unwrap_or_default(),
                args: words.collect(),
            }
        }
        other => CommandKind::Unknown {
            code: other,
            parameters: p.raw().to_vec(),
        },
    };
    Ok(kind)
}

fn decode_condition(p: &Params<'_>) -> Result<Condition, EventError> {
    let condition = match p.int(0)? {
        0 => Condition::Switch {
            switch_id: p.uint(1)?,
            value: p.on_off(2)?,
        },
        1 => Condition::Variable {
            variable_id: p.uint(1)?,
            operand: if p.int(2)? == 0 {
                ValueSource::Constant(p.int(3)?)
            } else {
                ValueSource::Variable(p.uint(3)?)
            },
            comparison: match p.int(4)? {
                0 => Comparison::Equal,
                1 => Comparison::GreaterOrEqual,
                2 => Comparison::LessOrEqual,
                3 => Comparison::Greater,
                4 => Comparison::Less,
                _ => Comparison::NotEqual,
            },
        },
        2 => Condition::SelfSwitch {
            letter: p.string(1)?,
            value: p.on_off(2)?,
        },
        3 => Condition::Timer {
            seconds: p.uint(1)?,
            at_least: p.int(2)? == 0,
        },
        4 => Condition::Actor {
            actor_id: p.uint(1)?,
            check: match p.int(2)? {
                0 => ActorCheck::InParty,
                1 => ActorCheck::Name {
                    name: p.string(3)?,
                },
                2 => ActorCheck::Class {
                    class_id: p.uint(3)?,
                },
                3 => ActorCheck::Skill {
                    skill_id: p.uint(3)?,
                },
                4 => ActorCheck::Weapon {
                    weapon_id: p.uint(3)?,
                },
                5 => ActorCheck::Armor {
                    armor_id: p.uint(3)?,
                },
                _ => ActorCheck::State {
                    state_id: p.uint(3)?,
                },
            },
        },
        5 => Condition::Enemy {
            enemy_index: p.uint(1)?,
            check: if p.int(2)? == 0 {
                EnemyCheck::Appeared
            } else {
                EnemyCheck::State {
                    state_id: p.uint(3)?,
                }
            },
        },
        6 => Condition::Character {
            character: CharacterRef::from_param(p.int(1)?),
            direction: p.uint(2)?,
        },
        7 => Condition::Gold {
            amount: p.int(1)?,
            comparison: match p.int(2)? {
                0 => Comparison::GreaterOrEqual,
                1 => Comparison::LessOrEqual,
                _ => Comparison::Less,
            },
        },
        8 => Condition::Item {
            item: ItemKind::Item,
            item_id: p.uint(1)?,
            include_equip: false,
        },
        9 | 10 => Condition::Item {
            item: if p.int(0)? == 9 {
                ItemKind::Weapon
            } else {
                ItemKind::Armor
            },
            item_id: p.uint(1)?,
            include_equip: p.flag_or(2, false)?,
        },
        11 => Condition::Button {
            button: p.string(1)?,
        },
        12 => Condition::Script {
            source: p.string(1)?,
        },
        13 => Condition::Vehicle {
            vehicle_id: p.uint(1)?,
        },
        other => {
            return Err(EventError::new(
                "DATA_CONDITION",
                format!("Unknown conditional branch kind {}.", other),
            ))
        }
    };
    Ok(condition)
}

fn decode_variable_operation(p: &Params<'_>, index: usize) -> Result<VariableOperation, EventError> {
    Ok(match p.int(index)? {
        0 => VariableOperation::Set,
        1 => VariableOperation::Add,
        2 => VariableOperation::Sub,
        3 => VariableOperation::Mul,
        4 => VariableOperation::Div,
        5 => VariableOperation::Mod,
        other => {
            return Err(EventError::new(
                "DATA_PARAM",
                format!("Unknown variable operation {}.", other),
            ))
        }
    })
}

fn decode_variable_operand(p: &Params<'_>) -> Result<VariableOperand, EventError> {
    Ok(match p.int(3)? {
        0 => VariableOperand::Constant { value: p.int(4)? },
        1 => VariableOperand::Variable {
            variable_id: p.uint(4)?,
        },
        2 => VariableOperand::Random {
            min: p.int(4)?,
            max: p.int(5)?,
        },
        3 => VariableOperand::GameData(decode_game_data(p)?),
        4 => VariableOperand::Script {
            source: p.string(4)?,
        },
        other => {
            return Err(EventError::new(
                "DATA_PARAM",
                format!("Unknown variable operand type {}.", other),
            ))
        }
    })
}

fn decode_game_data(p: &Params<'_>) -> Result<GameDataOperand, EventError> {
    let param1 = p.int_or(5, 0)?;
    let param2 = p.int_or(6, 0)?;
    let id = u32::try_from(param1).unwrap_or(0);
    Ok(match p.int(4)? {
        0 => GameDataOperand::ItemCount {
            item: ItemKind::Item,
            item_id: id,
        },
        1 => GameDataOperand::ItemCount {
            item: ItemKind::Weapon,
            item_id: id,
        },
        2 => GameDataOperand::ItemCount {
            item: ItemKind::Armor,
            item_id: id,
        },
        3 => GameDataOperand::Actor {
            actor_id: id,
            stat: match param2 {
                0 => ActorStat::Level,
                1 => ActorStat::Exp,
                2 => ActorStat::Hp,
                3 => ActorStat::Mp,
                4..=11 => ActorStat::Param((param2 - 4) as u8),
                _ => ActorStat::Tp,
            },
        },
        4 => GameDataOperand::Enemy {
            enemy_index: id,
            stat: match param2 {
                0 => EnemyStat::Hp,
                1 => EnemyStat::Mp,
                2..=9 => EnemyStat::Param((param2 - 2) as u8),
                _ => EnemyStat::Tp,
            },
        },
        5 => GameDataOperand::Character {
            character: CharacterRef::from_param(param1),
            data: match param2 {
                0 => CharacterData::MapX,
                1 => CharacterData::MapY,
                2 => CharacterData::Direction,
                3 => CharacterData::ScreenX,
                _ => CharacterData::ScreenY,
            },
        },
        6 => GameDataOperand::PartyMember { index: id },
        _ => GameDataOperand::Other {
            data: match param1 {
                0 => OtherData::MapId,
                1 => OtherData::PartySize,
                2 => OtherData::Gold,
                3 => OtherData::Steps,
                4 => OtherData::PlayTime,
                5 => OtherData::Timer,
                6 => OtherData::SaveCount,
                7 => OtherData::BattleCount,
                8 => OtherData::WinCount,
                _ => OtherData::EscapeCount,
            },
        },
    })
}

/// Reads `[operation, operand type, operand]` starting at `start`.
fn decode_delta(p: &Params<'_>, start: usize) -> Result<ValueDelta, EventError> {
    let negate = p.int(start)? != 0;
    let source = if p.int(start + 1)? == 0 {
        ValueSource::Constant(p.int(start + 2)?)
    } else {
        ValueSource::Variable(p.uint(start + 2)?)
    };
    Ok(ValueDelta { negate, source })
}

fn decode_actor_target(p: &Params<'_>) -> Result<ActorTarget, EventError> {
    Ok(if p.int(0)? == 0 {
        ActorTarget::Fixed(p.uint(1)?)
    } else {
        ActorTarget::Variable(p.uint(1)?)
    })
}

fn decode_enemy_target(p: &Params<'_>) -> Result<EnemyTarget, EventError> {
    let index = p.int(0)?;
    Ok(EnemyTarget {
        enemy_index: u32::try_from(index).ok(),
    })
}

fn decode_move_route(p: &Params<'_>) -> Result<MoveRoute, EventError> {
    let route = p.object(1)?;
    let flag = |key: &str| route.get(key).and_then(Value::as_bool).unwrap_or(false);
    Ok(MoveRoute {
        repeat: flag("repeat"),
        skippable: flag("skippable"),
        wait: flag("wait"),
        list: route
            .get("list")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    })
}

fn decode_placement(p: &Params<'_>) -> Result<PicturePlacement, EventError> {
    Ok(PicturePlacement {
        origin: p.uint_or(2, 0)?,
        by_variables: p.int_or(3, 0)? != 0,
        x: p.int_or(4, 0)?,
        y: p.int_or(5, 0)?,
        scale_x: p.int_or(6, 100)?,
        scale_y: p.int_or(7, 100)?,
        opacity: p.int_or(8, 255)?,
        blend_mode: p.uint_or(9, 0)?,
    })
}

fn decode_audio(p: &Params<'_>) -> Result<AudioCue, EventError> {
    let audio = p.object(0)?;
    let number = |key: &str, fallback: i64| {
        audio
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(fallback)
    };
    Ok(AudioCue {
        name: audio
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        volume: u32::try_from(number("volume", 90)).unwrap_or(90),
        pitch: u32::try_from(number("pitch", 100)).unwrap_or(100),
        pan: i32::try_from(number("pan", 0)).unwrap_or(0),
    })
}

fn decode_shop_good(p: &Params<'_>) -> Result<ShopGood, EventError> {
    let item = match p.int(0)? {
        0 => ItemKind::Item,
        1 => ItemKind::Weapon,
        _ => ItemKind::Armor,
    };
    let price = if p.int_or(2, 0)? == 0 {
        None
    } else {
        Some(p.int(3)?)
    };
    Ok(ShopGood {
        item,
        item_id: p.uint(1)?,
        price,
    })
}
