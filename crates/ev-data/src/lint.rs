use std::collections::BTreeMap;

use ev_core::{control_range_is_clamped, CommandKind, CommandTable, MAX_CONTROL_RANGE};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LintKind {
    MissingLabel,
    DuplicateLabel,
    StrayElse,
    BreakOutsideLoop,
    RepeatWithoutLoop,
    IndentJump,
    OversizedRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintDiagnostic {
    pub kind: LintKind,
    pub index: usize,
    pub message: String,
}

/// Structural checks over one table. Diagnostics are advisory; the interpreter tolerates all of them.
pub fn lint_table(table: &CommandTable) -> Vec<LintDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut first_label = BTreeMap::<&str, usize>::new();
    let mut previous_indent = 0usize;

    for (index, command) in table.iter().enumerate() {
        if command.indent > previous_indent + 1 {
            diagnostics.push(LintDiagnostic {
                kind: LintKind::IndentJump,
                index,
                message: format!(
                    "indent jumps from {} to {}",
                    previous_indent, command.indent
                ),
            });
        }
        previous_indent = command.indent;

        match &command.kind {
            CommandKind::Label { name } => {
                if let Some(first) = first_label.get(name.as_str()) {
                    diagnostics.push(LintDiagnostic {
                        kind: LintKind::DuplicateLabel,
                        index,
                        message: format!("label \"{}\" already defined at {}", name, first),
                    });
                } else {
                    first_label.insert(name.as_str(), index);
                }
            }
            CommandKind::JumpToLabel { name } if table.find_label(name).is_none() => {
                diagnostics.push(LintDiagnostic {
                    kind: LintKind::MissingLabel,
                    index,
                    message: format!("jump target \"{}\" does not exist", name),
                });
            }
            CommandKind::Else
                if !opens_with(table, index, |kind| {
                    matches!(kind, CommandKind::ConditionalBranch(_))
                }) =>
            {
                diagnostics.push(LintDiagnostic {
                    kind: LintKind::StrayElse,
                    index,
                    message: "else has no conditional branch at its indent".to_string(),
                });
            }
            CommandKind::RepeatAbove
                if !opens_with(table, index, |kind| matches!(kind, CommandKind::Loop)) =>
            {
                diagnostics.push(LintDiagnostic {
                    kind: LintKind::RepeatWithoutLoop,
                    index,
                    message: "repeat above has no loop at its indent".to_string(),
                });
            }
            CommandKind::BreakLoop if table.enclosing_loop(index).is_none() => {
                diagnostics.push(LintDiagnostic {
                    kind: LintKind::BreakOutsideLoop,
                    index,
                    message: "break loop is not inside a loop".to_string(),
                });
            }
            CommandKind::ControlSwitches { first, last, .. }
            | CommandKind::ControlVariables { first, last, .. }
                if control_range_is_clamped(*first, *last) =>
            {
                diagnostics.push(LintDiagnostic {
                    kind: LintKind::OversizedRange,
                    index,
                    message: format!(
                        "range {}..{} covers more than {} ids and will be cut off",
                        first, last, MAX_CONTROL_RANGE
                    ),
                });
            }
            _ => {}
        }
    }
    diagnostics
}

/// Whether the nearest earlier command at or above `index`'s indent satisfies `opener`.
fn opens_with(table: &CommandTable, index: usize, opener: impl Fn(&CommandKind) -> bool) -> bool {
    let Some(indent) = table.indent_at(index) else {
        return false;
    };
    (0..index)
        .rev()
        .map(|candidate| &table.commands()[candidate])
        .find(|command| command.indent <= indent)
        .is_some_and(|command| command.indent == indent && opener(&command.kind))
}
