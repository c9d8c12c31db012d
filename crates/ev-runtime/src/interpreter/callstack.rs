use ev_core::CommandTable;
use tracing::{debug, warn};

use super::dispatch::Flow;
use super::{EventOrigin, Interpreter, Termination};
use crate::context::Context;
use crate::host::Report;

impl Interpreter {
    pub(super) fn call_common_event(&mut self, common_event_id: u32, ctx: &mut Context<'_>) -> Flow {
        let Some(common_event) = ctx.database.common_event(common_event_id) else {
            warn!(common_event_id, "call to missing common event");
            ctx.host
                .report(Report::MissingCommonEvent { common_event_id });
            return Flow::Continue;
        };
        if self.depth + 1 >= self.options.max_depth {
            warn!(
                common_event_id,
                depth = self.depth,
                "common event call refused, nesting too deep"
            );
            ctx.host.report(Report::DepthOverflow {
                common_event_id,
                depth: self.depth + 1,
            });
            return Flow::Continue;
        }
        let event_id = if self.is_on_current_map(ctx) {
            self.origin.event_id
        } else {
            0
        };
        Flow::SpawnChild {
            table: common_event.list.clone(),
            common_event_id,
            event_id,
        }
    }

    pub(super) fn spawn_child(&mut self, table: CommandTable, common_event_id: u32, event_id: u32) {
        let seed = self.next_seed();
        let mut child = Interpreter::with_depth(self.options, self.depth + 1, seed);
        child.setup_common_event(
            table,
            EventOrigin::new(self.origin.map_id, event_id),
            common_event_id,
        );
        debug!(depth = child.depth, common_event_id, "child spawned");
        self.child = Some(Box::new(child));
    }

    /// Runs the child for this tick. True while the child still holds the parent.
    pub(super) fn update_child(&mut self, ctx: &mut Context<'_>) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        child.update(ctx);
        if child.is_running() {
            return true;
        }
        let ended = child.termination();
        self.child = None;
        if ended == Some(Termination::ControlTransfer) {
            self.finish(Termination::ControlTransfer);
        } else {
            self.cursor += 1;
        }
        true
    }
}
