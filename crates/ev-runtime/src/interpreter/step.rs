use tracing::warn;

use super::dispatch::Flow;
use super::{Interpreter, Termination};
use crate::context::Context;
use crate::host::Report;

impl Interpreter {
    /// Advances the interpreter by one tick.
    pub fn update(&mut self, ctx: &mut Context<'_>) {
        if !self.is_running() {
            return;
        }
        self.commands_this_tick = 0;
        loop {
            if self.update_child(ctx) {
                break;
            }
            if self.update_wait(ctx) {
                break;
            }
            if !self.execute_command(ctx) {
                break;
            }
            if self.check_freeze(ctx) {
                break;
            }
        }
    }

    /// Dispatches the command under the cursor. Returns false when the tick should end.
    fn execute_command(&mut self, ctx: &mut Context<'_>) -> bool {
        let Some(table) = self.table.clone() else {
            return false;
        };
        let Some(command) = table.get(self.cursor) else {
            self.finish(Termination::Completed);
            return false;
        };

        if command.indent < self.indent {
            self.branch.ascend(command.indent);
        }
        self.indent = command.indent;

        let flow = self.dispatch(&table, command, ctx);
        self.commands_this_tick += 1;
        self.apply_flow(flow, &table)
    }

    fn apply_flow(&mut self, flow: Flow, table: &ev_core::CommandTable) -> bool {
        match flow {
            Flow::Continue => {
                self.cursor += 1;
                true
            }
            Flow::SkipBranch => {
                self.cursor = self.skip_branch(table) + 1;
                true
            }
            Flow::Jump(index) => {
                self.cursor = index;
                true
            }
            Flow::Suspend(wait) => {
                self.wait = Some(wait);
                true
            }
            Flow::Yield => false,
            Flow::SpawnChild {
                table,
                common_event_id,
                event_id,
            } => {
                self.spawn_child(table, common_event_id, event_id);
                true
            }
            Flow::Terminate(termination) => {
                self.finish(termination);
                false
            }
        }
    }

    /// True once this tick's command budget is spent; the rest carries over to the next tick.
    fn check_freeze(&mut self, ctx: &mut Context<'_>) -> bool {
        if self.commands_this_tick < self.options.freeze_limit {
            return false;
        }
        warn!(
            depth = self.depth,
            index = self.cursor,
            commands = self.commands_this_tick,
            "freeze guard reached, yielding"
        );
        ctx.host.report(Report::FreezeGuard {
            index: self.cursor,
            commands: self.commands_this_tick,
        });
        true
    }
}
