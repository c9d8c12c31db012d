use ev_core::{ActorCheck, Condition, EnemyCheck, ItemKind};

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::script::truthy;
use crate::state::SelfSwitchKey;

impl Interpreter {
    pub(super) fn evaluate_condition(&mut self, condition: &Condition, ctx: &mut Context<'_>) -> bool {
        match condition {
            Condition::Switch { switch_id, value } => ctx.state.switch(*switch_id) == *value,
            Condition::Variable {
                variable_id,
                operand,
                comparison,
            } => {
                let left = ctx.state.variable(*variable_id);
                let right = self.value_of(*operand, ctx);
                comparison.compare(left, right)
            }
            Condition::SelfSwitch { letter, value } => {
                let event_id = self.event_id();
                if event_id == 0 {
                    return false;
                }
                let key = SelfSwitchKey::new(self.origin().map_id, event_id, letter.as_str());
                ctx.state.self_switch(&key) == *value
            }
            Condition::Timer { seconds, at_least } => match ctx.state.timer_seconds() {
                Some(left) if *at_least => left >= i64::from(*seconds),
                Some(left) => left <= i64::from(*seconds),
                None => false,
            },
            Condition::Actor { actor_id, check } => {
                if !ctx.state.actor_exists(*actor_id) {
                    return false;
                }
                let actor_id = *actor_id;
                match check {
                    ActorCheck::InParty => ctx.state.party_members().contains(&actor_id),
                    ActorCheck::Name { name } => {
                        ctx.state.actor_name(actor_id).as_deref() == Some(name.as_str())
                    }
                    ActorCheck::Class { class_id } => ctx.state.actor_class(actor_id) == *class_id,
                    ActorCheck::Skill { skill_id } => ctx.state.actor_has_skill(actor_id, *skill_id),
                    ActorCheck::Weapon { weapon_id } => {
                        ctx.state
                            .actor_has_equip(actor_id, ItemKind::Weapon, *weapon_id)
                    }
                    ActorCheck::Armor { armor_id } => {
                        ctx.state.actor_has_equip(actor_id, ItemKind::Armor, *armor_id)
                    }
                    ActorCheck::State { state_id } => ctx.state.actor_has_state(actor_id, *state_id),
                }
            }
            Condition::Enemy { enemy_index, check } => match check {
                EnemyCheck::Appeared => ctx.state.enemy_alive(*enemy_index),
                EnemyCheck::State { state_id } => {
                    ctx.state.enemy_has_state(*enemy_index, *state_id)
                }
            },
            Condition::Character {
                character,
                direction,
            } => self
                .resolve_character(*character, ctx)
                .and_then(|id| ctx.state.character_direction(id))
                .is_some_and(|current| current == *direction),
            Condition::Gold { amount, comparison } => comparison.compare(ctx.state.gold(), *amount),
            Condition::Item {
                item,
                item_id,
                include_equip,
            } => {
                if ctx.state.item_count(*item, *item_id) > 0 {
                    return true;
                }
                *include_equip
                    && *item != ItemKind::Item
                    && ctx
                        .state
                        .party_members()
                        .into_iter()
                        .any(|actor_id| ctx.state.actor_has_equip(actor_id, *item, *item_id))
            }
            Condition::Button { button } => ctx.host.is_button_pressed(button),
            Condition::Script { source } => self
                .run_script(source, ctx)
                .is_some_and(|value| truthy(&value)),
            Condition::Vehicle { vehicle_id } => ctx.state.vehicle_driving(*vehicle_id),
        }
    }
}
