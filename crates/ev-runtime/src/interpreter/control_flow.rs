use ev_core::{BattleResult, CommandKind, CommandTable};
use tracing::warn;

use super::dispatch::Flow;
use super::Interpreter;
use crate::branch::BranchOutcome;
use crate::context::Context;
use crate::host::Report;

impl Interpreter {
    /// Last index of the block opened by the current command.
    pub(super) fn skip_branch(&self, table: &CommandTable) -> usize {
        let mut index = self.cursor;
        while table
            .indent_at(index + 1)
            .is_some_and(|next| next > self.indent)
        {
            index += 1;
        }
        index
    }

    pub(super) fn conditional_branch(&mut self, result: bool) -> Flow {
        self.branch
            .set_outcome(self.indent, BranchOutcome::Condition(result));
        if result {
            Flow::Continue
        } else {
            Flow::SkipBranch
        }
    }

    pub(super) fn else_branch(&mut self, ctx: &mut Context<'_>) -> Flow {
        match self.branch.outcome(self.indent) {
            Some(BranchOutcome::Condition(false)) => Flow::Continue,
            Some(_) => Flow::SkipBranch,
            None => {
                warn!(index = self.cursor, "else without an open branch");
                ctx.host.report(Report::StrayElse { index: self.cursor });
                Flow::SkipBranch
            }
        }
    }

    pub(super) fn when_choice(&self, index: i32) -> Flow {
        match self.branch.outcome(self.indent) {
            Some(BranchOutcome::Choice(picked)) if picked == index => Flow::Continue,
            _ => Flow::SkipBranch,
        }
    }

    pub(super) fn when_cancel(&self) -> Flow {
        match self.branch.outcome(self.indent) {
            Some(BranchOutcome::Choice(picked)) if picked < 0 => Flow::Continue,
            _ => Flow::SkipBranch,
        }
    }

    pub(super) fn battle_result_branch(&self, expected: BattleResult) -> Flow {
        match self.branch.outcome(self.indent) {
            Some(BranchOutcome::Battle(result)) if result == expected => Flow::Continue,
            _ => Flow::SkipBranch,
        }
    }

    pub(super) fn loop_start(&mut self) -> Flow {
        self.branch.set_loop_start(self.indent, self.cursor + 1);
        Flow::Continue
    }

    pub(super) fn repeat_above(&mut self, table: &CommandTable, ctx: &mut Context<'_>) -> Flow {
        let remembered = self.branch.loop_start(self.indent).filter(|&start| {
            start > 0
                && start <= self.cursor
                && table.get(start - 1).is_some_and(|command| {
                    command.indent == self.indent && matches!(command.kind, CommandKind::Loop)
                })
        });
        if let Some(start) = remembered {
            return Flow::Jump(start);
        }

        let opener = (0..self.cursor)
            .rev()
            .find(|&index| table.indent_at(index).is_some_and(|indent| indent <= self.indent));
        match opener {
            Some(index)
                if table.get(index).is_some_and(|command| {
                    command.indent == self.indent && matches!(command.kind, CommandKind::Loop)
                }) =>
            {
                self.branch.set_loop_start(self.indent, index + 1);
                Flow::Jump(index + 1)
            }
            _ => {
                warn!(index = self.cursor, "repeat above without a loop");
                ctx.host
                    .report(Report::RepeatWithoutLoop { index: self.cursor });
                Flow::Continue
            }
        }
    }

    /// Leaves the nearest enclosing loop: continues after its `RepeatAbove`, or at the first
    /// command back at the loop's indent when the block has none.
    pub(super) fn break_loop(&mut self, table: &CommandTable, ctx: &mut Context<'_>) -> Flow {
        let Some(loop_index) = table.enclosing_loop(self.cursor) else {
            warn!(index = self.cursor, "break loop outside a loop");
            ctx.host
                .report(Report::BreakOutsideLoop { index: self.cursor });
            return Flow::Continue;
        };
        let loop_indent = table.indent_at(loop_index).unwrap_or_default();
        match table.next_at_or_above(self.cursor, loop_indent) {
            Some(index)
                if table.get(index).is_some_and(|command| {
                    command.indent == loop_indent
                        && matches!(command.kind, CommandKind::RepeatAbove)
                }) =>
            {
                Flow::Jump(index + 1)
            }
            Some(index) => Flow::Jump(index),
            None => Flow::Jump(table.len()),
        }
    }

    pub(super) fn jump_to_label(
        &mut self,
        table: &CommandTable,
        name: &str,
        ctx: &mut Context<'_>,
    ) -> Flow {
        match table.find_label(name) {
            Some(index) => Flow::Jump(index),
            None => {
                warn!(index = self.cursor, label = name, "jump to missing label");
                ctx.host.report(Report::MissingLabel {
                    name: name.to_string(),
                    index: self.cursor,
                });
                Flow::Continue
            }
        }
    }
}
