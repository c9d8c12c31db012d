mod battler;
mod condition;
mod data;
mod message;
mod presentation;
mod scene;

use ev_core::{Command, CommandKind, CommandTable, ValueDelta, ValueSource};
use rhai::Dynamic;
use tracing::{trace, warn};

use crate::context::Context;
use crate::host::Report;
use crate::interpreter::{Interpreter, Termination};
use crate::script::{evaluate, ScriptEnv};
use crate::state::CharacterId;
use crate::wait::WaitMode;

/// What a handler asks the step loop to do next.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Advance past the current command.
    Continue,
    /// Skip the block governed by the current command.
    SkipBranch,
    /// Continue at this index.
    Jump(usize),
    /// Keep the cursor and suspend until the wait ends.
    Suspend(WaitMode),
    /// Keep the cursor and retry the command next tick.
    Yield,
    SpawnChild {
        table: CommandTable,
        common_event_id: u32,
        event_id: u32,
    },
    Terminate(Termination),
}

impl Interpreter {
    pub(crate) fn dispatch(
        &mut self,
        table: &CommandTable,
        command: &Command,
        ctx: &mut Context<'_>,
    ) -> Flow {
        trace!(
            depth = self.depth(),
            index = self.cursor(),
            code = command.code(),
            indent = command.indent,
            "dispatch"
        );
        match &command.kind {
            CommandKind::End
            | CommandKind::TextLine { .. }
            | CommandKind::ScrollLine { .. }
            | CommandKind::CommentLine { .. }
            | CommandKind::ChoicesEnd
            | CommandKind::BranchEnd
            | CommandKind::BattleEnd
            | CommandKind::ShopGoods(_)
            | CommandKind::ScriptLine { .. } => Flow::Continue,

            CommandKind::ShowText(setup) => self.show_text(table, setup, ctx),
            CommandKind::ShowChoices(setup) => self.show_choices(setup, ctx),
            CommandKind::WhenChoice { index, .. } => self.when_choice(*index),
            CommandKind::WhenCancel => self.when_cancel(),
            CommandKind::InputNumber {
                variable_id,
                digits,
            } => self.input_number(*variable_id, *digits, ctx),
            CommandKind::SelectItem {
                variable_id,
                item_type,
            } => self.select_item(*variable_id, *item_type, ctx),
            CommandKind::ScrollText { speed, no_fast } => {
                self.scroll_text(table, *speed, *no_fast, ctx)
            }
            CommandKind::Comment { text } => self.comment(table, text),

            CommandKind::ConditionalBranch(condition) => {
                let result = self.evaluate_condition(condition, ctx);
                self.conditional_branch(result)
            }
            CommandKind::Else => self.else_branch(ctx),
            CommandKind::Loop => self.loop_start(),
            CommandKind::RepeatAbove => self.repeat_above(table, ctx),
            CommandKind::BreakLoop => self.break_loop(table, ctx),
            CommandKind::ExitEventProcessing => Flow::Terminate(Termination::Exited),
            CommandKind::CallCommonEvent { common_event_id } => {
                self.call_common_event(*common_event_id, ctx)
            }
            CommandKind::Label { .. } => Flow::Continue,
            CommandKind::JumpToLabel { name } => self.jump_to_label(table, name, ctx),

            CommandKind::ControlSwitches { first, last, value } => {
                self.control_switches(*first, *last, *value, ctx)
            }
            CommandKind::ControlVariables {
                first,
                last,
                operation,
                operand,
            } => self.control_variables(*first, *last, *operation, operand, ctx),
            CommandKind::ControlSelfSwitch { letter, value } => {
                self.control_self_switch(letter, *value, ctx)
            }
            CommandKind::ControlTimer(timer) => self.control_timer(*timer, ctx),
            CommandKind::ChangeGold(delta) => self.change_gold(*delta, ctx),
            CommandKind::ChangeItems {
                item,
                item_id,
                delta,
                include_equip,
            } => self.change_items(*item, *item_id, *delta, *include_equip, ctx),
            CommandKind::ChangePartyMember {
                actor_id,
                add,
                initialize,
            } => self.change_party_member(*actor_id, *add, *initialize, ctx),
            CommandKind::ChangeAccess { access, enabled } => {
                ctx.state.set_access(*access, *enabled);
                Flow::Continue
            }

            CommandKind::TransferPlayer(target) => self.transfer_player(target, ctx),
            CommandKind::SetMovementRoute { character, route } => {
                self.set_movement_route(*character, route, ctx)
            }
            CommandKind::ShowAnimation {
                character,
                animation_id,
                wait,
            } => self.show_animation(*character, *animation_id, *wait, ctx),
            CommandKind::ShowBalloon {
                character,
                balloon_id,
                wait,
            } => self.show_balloon(*character, *balloon_id, *wait, ctx),
            CommandKind::EraseEvent => self.erase_event(ctx),
            CommandKind::GatherFollowers => self.gather_followers(ctx),
            CommandKind::FadeoutScreen => self.fade_screen(true, ctx),
            CommandKind::FadeinScreen => self.fade_screen(false, ctx),
            CommandKind::TintScreen {
                tone,
                duration,
                wait,
            } => self.tint_screen(*tone, *duration, *wait, ctx),
            CommandKind::FlashScreen {
                color,
                duration,
                wait,
            } => self.flash_screen(*color, *duration, *wait, ctx),
            CommandKind::ShakeScreen {
                power,
                speed,
                duration,
                wait,
            } => self.shake_screen(*power, *speed, *duration, *wait, ctx),
            CommandKind::Wait { duration } => Flow::Suspend(WaitMode::Ticks {
                remaining: *duration,
            }),
            CommandKind::ShowPicture {
                picture_id,
                name,
                placement,
            } => self.show_picture(*picture_id, name, placement, ctx),
            CommandKind::MovePicture {
                picture_id,
                placement,
                duration,
                wait,
            } => self.move_picture(*picture_id, placement, *duration, *wait, ctx),
            CommandKind::ErasePicture { picture_id } => self.erase_picture(*picture_id, ctx),
            CommandKind::SetWeather {
                weather,
                power,
                duration,
                wait,
            } => self.set_weather(weather, *power, *duration, *wait, ctx),
            CommandKind::PlayAudio { channel, cue } => self.play_audio(*channel, cue, ctx),
            CommandKind::FadeoutAudio { channel, seconds } => {
                self.fadeout_audio(*channel, *seconds, ctx)
            }
            CommandKind::SaveBgm => self.audio_control(AudioControl::SaveBgm, ctx),
            CommandKind::ResumeBgm => self.audio_control(AudioControl::ResumeBgm, ctx),
            CommandKind::StopSe => self.audio_control(AudioControl::StopSe, ctx),
            CommandKind::PlayMovie { name } => self.play_movie(name, ctx),

            CommandKind::BattleProcessing {
                troop,
                can_escape,
                can_lose,
            } => self.battle_processing(*troop, *can_escape, *can_lose, ctx),
            CommandKind::IfWin => self.battle_result_branch(ev_core::BattleResult::Win),
            CommandKind::IfEscape => self.battle_result_branch(ev_core::BattleResult::Escape),
            CommandKind::IfLose => self.battle_result_branch(ev_core::BattleResult::Lose),
            CommandKind::ShopProcessing {
                good,
                purchase_only,
            } => self.shop_processing(table, *good, *purchase_only, ctx),
            CommandKind::NameInput {
                actor_id,
                max_chars,
            } => self.name_input(*actor_id, *max_chars, ctx),
            CommandKind::OpenSave => self.open_save(ctx),
            CommandKind::OpenMenu => self.open_menu(ctx),
            CommandKind::GameOver => self.control_transfer(crate::host::SceneRequest::GameOver, ctx),
            CommandKind::ReturnToTitle => {
                self.control_transfer(crate::host::SceneRequest::Title, ctx)
            }
            CommandKind::AbortBattle => self.abort_battle(ctx),

            CommandKind::ChangeHp {
                target,
                delta,
                allow_death,
            } => self.change_hp(*target, *delta, *allow_death, ctx),
            CommandKind::ChangeMp { target, delta } => {
                self.change_resource(*target, *delta, ev_core::ActorStat::Mp, ctx)
            }
            CommandKind::ChangeTp { target, delta } => {
                self.change_resource(*target, *delta, ev_core::ActorStat::Tp, ctx)
            }
            CommandKind::ChangeState {
                target,
                add,
                state_id,
            } => self.change_state(*target, *add, *state_id, ctx),
            CommandKind::RecoverAll { target } => self.recover_all(*target, ctx),
            CommandKind::ChangeExp { target, delta, .. } => {
                self.change_growth(*target, *delta, ev_core::ActorStat::Exp, ctx)
            }
            CommandKind::ChangeLevel { target, delta, .. } => {
                self.change_growth(*target, *delta, ev_core::ActorStat::Level, ctx)
            }
            CommandKind::ChangeName { actor_id, name } => {
                if ctx.state.actor_exists(*actor_id) {
                    ctx.state.set_actor_name(*actor_id, name);
                }
                Flow::Continue
            }
            CommandKind::ChangeEnemyHp {
                enemy,
                delta,
                allow_death,
            } => self.change_enemy_hp(*enemy, *delta, *allow_death, ctx),
            CommandKind::EnemyRecoverAll { enemy } => self.enemy_recover_all(*enemy, ctx),
            CommandKind::EnemyAppear { enemy_index } => {
                ctx.state.appear_enemy(*enemy_index);
                Flow::Continue
            }
            CommandKind::ForceAction {
                subject,
                skill_id,
                target_index,
            } => self.force_action(*subject, *skill_id, *target_index, ctx),

            CommandKind::Script { line } => self.script_command(table, line, ctx),
            CommandKind::PluginCommand { command, args } => {
                ctx.host.plugin_command(command, args);
                Flow::Continue
            }
            CommandKind::Unknown { code, .. } => {
                trace!(code, "unknown command skipped");
                Flow::Continue
            }
        }
    }

    pub(crate) fn value_of(&self, source: ValueSource, ctx: &Context<'_>) -> i64 {
        match source {
            ValueSource::Constant(value) => value,
            ValueSource::Variable(variable_id) => ctx.state.variable(variable_id),
        }
    }

    pub(crate) fn operate_value(&self, delta: ValueDelta, ctx: &Context<'_>) -> i64 {
        let value = self.value_of(delta.source, ctx);
        if delta.negate {
            value.saturating_neg()
        } else {
            value
        }
    }

    pub(crate) fn is_on_current_map(&self, ctx: &Context<'_>) -> bool {
        self.origin().map_id == ctx.state.map_id()
    }

    /// Resolves a command's character reference; `None` when nothing can be addressed.
    pub(crate) fn resolve_character(
        &self,
        character: ev_core::CharacterRef,
        ctx: &Context<'_>,
    ) -> Option<CharacterId> {
        if ctx.state.in_battle() {
            return None;
        }
        match character {
            ev_core::CharacterRef::Player => Some(CharacterId::Player),
            ev_core::CharacterRef::ThisEvent => {
                (self.event_id() > 0 && self.is_on_current_map(ctx))
                    .then_some(CharacterId::Event(self.event_id()))
            }
            ev_core::CharacterRef::Event(event_id) => Some(CharacterId::Event(event_id)),
        }
    }

    /// Runs a script through the bridge. Failures are reported and yield `None`.
    pub(crate) fn run_script(&mut self, source: &str, ctx: &mut Context<'_>) -> Option<Dynamic> {
        let origin = self.origin();
        let index = self.cursor();
        let result = evaluate(
            source,
            ScriptEnv {
                state: &mut *ctx.state,
                map_id: origin.map_id,
                event_id: origin.event_id,
                rng_state: &mut self.rng_state,
            },
        );
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(index, error = %error, "script failed");
                ctx.host.report(Report::ScriptFailed {
                    index,
                    message: error.message,
                });
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AudioControl {
    SaveBgm,
    ResumeBgm,
    StopSe,
}
