use tracing::trace;

use super::Interpreter;
use crate::branch::BranchOutcome;
use crate::context::Context;
use crate::host::MessageResult;
use crate::wait::{PendingInput, WaitMode};

impl Interpreter {
    /// True while the current wait still blocks. A finished wait moves the cursor past
    /// the suspending command and applies whatever answer the host produced.
    pub(super) fn update_wait(&mut self, ctx: &mut Context<'_>) -> bool {
        let Some(wait) = self.wait else {
            return false;
        };
        let blocked = match wait {
            WaitMode::Ticks { remaining } if remaining > 0 => {
                self.wait = Some(WaitMode::Ticks {
                    remaining: remaining - 1,
                });
                true
            }
            WaitMode::Ticks { .. } => false,
            other => ctx.host.is_busy(&other),
        };
        if blocked {
            return true;
        }

        trace!(depth = self.depth, mode = wait.name(), "wait finished");
        self.wait = None;
        self.cursor += 1;
        match wait {
            WaitMode::Message { input: Some(input) } => self.apply_input(input, ctx),
            WaitMode::Battle { indent } => {
                if let Some(result) = ctx.host.take_battle_result() {
                    self.branch.set_outcome(indent, BranchOutcome::Battle(result));
                }
            }
            _ => {}
        }
        false
    }

    fn apply_input(&mut self, input: PendingInput, ctx: &mut Context<'_>) {
        let answer = ctx.host.take_message_result();
        match (input, answer) {
            (PendingInput::Choice { indent }, Some(MessageResult::Choice(picked))) => {
                self.branch.set_outcome(indent, BranchOutcome::Choice(picked));
            }
            (PendingInput::Choice { indent }, _) => {
                // no answer: nothing selected, every choice block is skipped
                self.branch.set_outcome(indent, BranchOutcome::Choice(i32::MAX));
            }
            (PendingInput::Number { variable_id }, Some(MessageResult::Number(value))) => {
                ctx.state.set_variable(variable_id, value);
            }
            (PendingInput::Item { variable_id }, Some(MessageResult::Item(item_id))) => {
                ctx.state.set_variable(variable_id, i64::from(item_id));
            }
            (PendingInput::Item { variable_id }, None) => {
                ctx.state.set_variable(variable_id, 0);
            }
            _ => {}
        }
    }
}
