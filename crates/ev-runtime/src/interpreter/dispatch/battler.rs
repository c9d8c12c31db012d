use ev_core::{ActorStat, ActorTarget, BattlerRef, EnemyStat, EnemyTarget, ValueDelta};

use super::Flow;
use crate::context::Context;
use crate::host::Request;
use crate::interpreter::Interpreter;
use crate::wait::WaitMode;

/// HP change that never kills unless death is allowed, applied to living battlers only.
fn hp_change(hp: i64, value: i64, allow_death: bool) -> Option<i64> {
    if hp <= 0 {
        return None;
    }
    let value = if !allow_death && hp <= value.saturating_neg() {
        1 - hp
    } else {
        value
    };
    Some(hp.saturating_add(value))
}

impl Interpreter {
    /// Actors addressed by a target; id 0 (fixed or read from a variable) means the party.
    fn actor_targets(&self, target: ActorTarget, ctx: &Context<'_>) -> Vec<u32> {
        let actor_id = match target {
            ActorTarget::Fixed(actor_id) => actor_id,
            ActorTarget::Variable(variable_id) => {
                u32::try_from(ctx.state.variable(variable_id)).unwrap_or(0)
            }
        };
        if actor_id == 0 {
            ctx.state.party_members()
        } else if ctx.state.actor_exists(actor_id) {
            vec![actor_id]
        } else {
            Vec::new()
        }
    }

    fn enemy_targets(&self, enemy: EnemyTarget, ctx: &Context<'_>) -> Vec<u32> {
        let size = ctx.state.troop_size();
        match enemy.enemy_index {
            Some(index) if index < size => vec![index],
            Some(_) => Vec::new(),
            None => (0..size).collect(),
        }
    }

    pub(super) fn change_hp(
        &mut self,
        target: ActorTarget,
        delta: ValueDelta,
        allow_death: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let value = self.operate_value(delta, ctx);
        for actor_id in self.actor_targets(target, ctx) {
            let hp = ctx.state.actor_stat(actor_id, ActorStat::Hp);
            if let Some(next) = hp_change(hp, value, allow_death) {
                ctx.state.set_actor_stat(actor_id, ActorStat::Hp, next);
            }
        }
        Flow::Continue
    }

    /// MP and TP changes: plain additions clamped by the store.
    pub(super) fn change_resource(
        &mut self,
        target: ActorTarget,
        delta: ValueDelta,
        stat: ActorStat,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let value = self.operate_value(delta, ctx);
        for actor_id in self.actor_targets(target, ctx) {
            let current = ctx.state.actor_stat(actor_id, stat);
            ctx.state
                .set_actor_stat(actor_id, stat, current.saturating_add(value));
        }
        Flow::Continue
    }

    pub(super) fn change_state(
        &mut self,
        target: ActorTarget,
        add: bool,
        state_id: u32,
        ctx: &mut Context<'_>,
    ) -> Flow {
        for actor_id in self.actor_targets(target, ctx) {
            ctx.state.change_actor_state(actor_id, state_id, add);
        }
        Flow::Continue
    }

    pub(super) fn recover_all(&mut self, target: ActorTarget, ctx: &mut Context<'_>) -> Flow {
        for actor_id in self.actor_targets(target, ctx) {
            ctx.state.recover_actor(actor_id);
        }
        Flow::Continue
    }

    /// EXP and level changes.
    pub(super) fn change_growth(
        &mut self,
        target: ActorTarget,
        delta: ValueDelta,
        stat: ActorStat,
        ctx: &mut Context<'_>,
    ) -> Flow {
        self.change_resource(target, delta, stat, ctx)
    }

    pub(super) fn change_enemy_hp(
        &mut self,
        enemy: EnemyTarget,
        delta: ValueDelta,
        allow_death: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        let value = self.operate_value(delta, ctx);
        for index in self.enemy_targets(enemy, ctx) {
            let hp = ctx.state.enemy_stat(index, EnemyStat::Hp);
            if let Some(next) = hp_change(hp, value, allow_death) {
                ctx.state.set_enemy_hp(index, next);
            }
        }
        Flow::Continue
    }

    pub(super) fn enemy_recover_all(&mut self, enemy: EnemyTarget, ctx: &mut Context<'_>) -> Flow {
        for index in self.enemy_targets(enemy, ctx) {
            ctx.state.recover_enemy(index);
        }
        Flow::Continue
    }

    /// Queues a forced action for a living battler and waits until the battle has run it.
    pub(super) fn force_action(
        &mut self,
        subject: BattlerRef,
        skill_id: u32,
        target_index: i32,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if !ctx.state.in_battle() {
            return Flow::Continue;
        }
        let alive = match subject {
            BattlerRef::Enemy(index) => ctx.state.enemy_alive(index),
            BattlerRef::Actor(actor_id) => {
                ctx.state.actor_exists(actor_id)
                    && ctx.state.actor_stat(actor_id, ActorStat::Hp) > 0
            }
        };
        if !alive {
            return Flow::Continue;
        }
        ctx.host.request(Request::ForceAction {
            subject,
            skill_id,
            target_index,
        });
        Flow::Suspend(WaitMode::Action)
    }
}

#[cfg(test)]
mod battler_tests {
    use super::*;

    #[test]
    fn damage_stops_at_one_hp_unless_death_is_allowed() {
        assert_eq!(hp_change(30, -50, false), Some(1));
        assert_eq!(hp_change(30, -50, true), Some(-20));
        assert_eq!(hp_change(30, 15, false), Some(45));
        assert_eq!(hp_change(0, 15, false), None);
    }
}
