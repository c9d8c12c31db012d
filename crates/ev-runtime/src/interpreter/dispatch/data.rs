use ev_core::{
    control_range, control_range_is_clamped, CharacterData, CommandKind, CommandTable,
    GameDataOperand, ItemKind, OtherData, TimerControl, ValueDelta, VariableOperand,
    VariableOperation, MAX_CONTROL_RANGE,
};
use tracing::warn;

use super::Flow;
use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::rng::next_random_in_range;
use crate::script::integer;
use crate::state::SelfSwitchKey;

const FRAMES_PER_SECOND: i64 = 60;
const TILE_SIZE: i64 = 48;
const CHARACTER_SHIFT_Y: i64 = 6;

impl Interpreter {
    pub(super) fn control_switches(
        &mut self,
        first: u32,
        last: u32,
        value: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        self.warn_if_clamped(first, last);
        for switch_id in control_range(first, last) {
            ctx.state.set_switch(switch_id, value);
        }
        Flow::Continue
    }

    /// The operand is evaluated once; every variable of the range gets the same value.
    pub(super) fn control_variables(
        &mut self,
        first: u32,
        last: u32,
        operation: VariableOperation,
        operand: &VariableOperand,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let value = match operand {
            VariableOperand::Constant { value } => *value,
            VariableOperand::Variable { variable_id } => ctx.state.variable(*variable_id),
            VariableOperand::Random { min, max } => {
                next_random_in_range(&mut self.rng_state, *min, *max)
            }
            VariableOperand::GameData(data) => self.game_data(*data, ctx),
            VariableOperand::Script { source } => self
                .run_script(source, ctx)
                .map(|result| integer(&result))
                .unwrap_or(0),
        };
        self.warn_if_clamped(first, last);
        for variable_id in control_range(first, last) {
            let current = ctx.state.variable(variable_id);
            ctx.state
                .set_variable(variable_id, operate_variable(current, operation, value));
        }
        Flow::Continue
    }

    fn warn_if_clamped(&self, first: u32, last: u32) {
        if control_range_is_clamped(first, last) {
            warn!(
                index = self.cursor(),
                first,
                last,
                limit = MAX_CONTROL_RANGE,
                "control range cut off"
            );
        }
    }

    pub(super) fn control_self_switch(
        &mut self,
        letter: &str,
        value: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let event_id = self.event_id();
        if event_id > 0 {
            let key = SelfSwitchKey::new(self.origin().map_id, event_id, letter);
            ctx.state.set_self_switch(key, value);
        }
        Flow::Continue
    }

    pub(super) fn control_timer(&mut self, timer: TimerControl, ctx: &mut Context<'_>) -> Flow {
        match timer {
            TimerControl::Start { seconds } => ctx
                .state
                .start_timer(i64::from(seconds) * FRAMES_PER_SECOND),
            TimerControl::Stop => ctx.state.stop_timer(),
        }
        Flow::Continue
    }

    pub(super) fn change_gold(&mut self, delta: ValueDelta, ctx: &mut Context<'_>) -> Flow {
        let amount = self.operate_value(delta, ctx);
        ctx.state.gain_gold(amount);
        Flow::Continue
    }

    pub(super) fn change_items(
        &mut self,
        item: ItemKind,
        item_id: u32,
        delta: ValueDelta,
        include_equip: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let amount = self.operate_value(delta, ctx);
        ctx.state.gain_item(item, item_id, amount, include_equip);
        Flow::Continue
    }

    pub(super) fn change_party_member(
        &mut self,
        actor_id: u32,
        add: bool,
        initialize: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if !ctx.state.actor_exists(actor_id) {
            return Flow::Continue;
        }
        if add {
            if initialize {
                ctx.state.setup_actor(actor_id);
            }
            ctx.state.add_actor(actor_id);
        } else {
            ctx.state.remove_actor(actor_id);
        }
        Flow::Continue
    }

    /// Joins the script head with its continuation lines and runs the result.
    pub(super) fn script_command(
        &mut self,
        table: &CommandTable,
        line: &str,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let mut source = line.to_string();
        while let Some(CommandKind::ScriptLine { line }) =
            table.get(self.cursor + 1).map(|command| &command.kind)
        {
            self.cursor += 1;
            source.push('\n');
            source.push_str(line);
        }
        self.run_script(&source, ctx);
        Flow::Continue
    }

    fn game_data(&self, data: GameDataOperand, ctx: &Context<'_>) -> i64 {
        match data {
            GameDataOperand::ItemCount { item, item_id } => ctx.state.item_count(item, item_id),
            GameDataOperand::Actor { actor_id, stat } => {
                if ctx.state.actor_exists(actor_id) {
                    ctx.state.actor_stat(actor_id, stat)
                } else {
                    0
                }
            }
            GameDataOperand::Enemy { enemy_index, stat } => {
                if enemy_index < ctx.state.troop_size() {
                    ctx.state.enemy_stat(enemy_index, stat)
                } else {
                    0
                }
            }
            GameDataOperand::Character { character, data } => {
                let Some(id) = self.resolve_character(character, ctx) else {
                    return 0;
                };
                let position = ctx.state.character_position(id);
                match data {
                    CharacterData::MapX => position.map(|(x, _)| x).unwrap_or(0),
                    CharacterData::MapY => position.map(|(_, y)| y).unwrap_or(0),
                    CharacterData::Direction => {
                        ctx.state.character_direction(id).map(i64::from).unwrap_or(0)
                    }
                    CharacterData::ScreenX => position
                        .map(|(x, _)| x * TILE_SIZE + TILE_SIZE / 2)
                        .unwrap_or(0),
                    CharacterData::ScreenY => position
                        .map(|(_, y)| y * TILE_SIZE + TILE_SIZE - CHARACTER_SHIFT_Y)
                        .unwrap_or(0),
                }
            }
            GameDataOperand::PartyMember { index } => ctx
                .state
                .party_members()
                .get(index as usize)
                .map(|actor_id| i64::from(*actor_id))
                .unwrap_or(0),
            GameDataOperand::Other { data } => match data {
                OtherData::MapId => i64::from(ctx.state.map_id()),
                OtherData::PartySize => ctx.state.party_members().len() as i64,
                OtherData::Gold => ctx.state.gold(),
                OtherData::Timer => ctx.state.timer_seconds().unwrap_or(0),
                other => ctx.state.counter(other),
            },
        }
    }
}

/// Integer arithmetic of the variable command. Division floors; division or remainder by
/// zero and any overflow store 0.
pub(crate) fn operate_variable(current: i64, operation: VariableOperation, value: i64) -> i64 {
    let result = match operation {
        VariableOperation::Set => Some(value),
        VariableOperation::Add => current.checked_add(value),
        VariableOperation::Sub => current.checked_sub(value),
        VariableOperation::Mul => current.checked_mul(value),
        VariableOperation::Div => floor_div(current, value),
        VariableOperation::Mod => current.checked_rem(value),
    };
    result.unwrap_or(0)
}

fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    if (left % right != 0) && ((left < 0) != (right < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

#[cfg(test)]
mod data_tests {
    use super::*;

    #[test]
    fn division_floors_and_remainder_truncates() {
        assert_eq!(operate_variable(7, VariableOperation::Div, 2), 3);
        assert_eq!(operate_variable(-7, VariableOperation::Div, 2), -4);
        assert_eq!(operate_variable(-7, VariableOperation::Mod, 2), -1);
        assert_eq!(operate_variable(7, VariableOperation::Mod, -2), 1);
    }

    #[test]
    fn zero_divisor_and_overflow_store_zero() {
        assert_eq!(operate_variable(9, VariableOperation::Div, 0), 0);
        assert_eq!(operate_variable(9, VariableOperation::Mod, 0), 0);
        assert_eq!(operate_variable(i64::MAX, VariableOperation::Add, 1), 0);
        assert_eq!(operate_variable(i64::MIN, VariableOperation::Div, -1), 0);
        assert_eq!(operate_variable(3, VariableOperation::Set, -5), -5);
    }
}
