use ev_core::{ChoiceSetup, CommandKind, CommandTable, TextSetup};

use super::Flow;
use crate::context::Context;
use crate::host::{ChoicePrompt, Message, MessageInput, ScrollSetup};
use crate::interpreter::Interpreter;
use crate::text::expand_escapes;
use crate::wait::{PendingInput, WaitMode};

const CANCEL_BRANCH: i32 = -2;

impl Interpreter {
    pub(super) fn show_text(
        &mut self,
        table: &CommandTable,
        setup: &TextSetup,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        let mut message = Message {
            face_name: setup.face_name.clone(),
            face_index: setup.face_index,
            background: setup.background,
            position: setup.position,
            ..Message::default()
        };
        while let Some(CommandKind::TextLine { text }) =
            table.get(self.cursor + 1).map(|command| &command.kind)
        {
            self.cursor += 1;
            message.lines.push(expand_escapes(text, &*ctx.state));
        }

        // an input command right after the text shares its window
        let mut pending = None;
        if let Some(next) = table.get(self.cursor + 1) {
            match &next.kind {
                CommandKind::ShowChoices(choices) => {
                    message.input = Some(MessageInput::Choice(choice_prompt(choices, ctx)));
                    pending = Some(PendingInput::Choice {
                        indent: next.indent,
                    });
                }
                CommandKind::InputNumber {
                    variable_id,
                    digits,
                } => {
                    message.input = Some(MessageInput::Number { digits: *digits });
                    pending = Some(PendingInput::Number {
                        variable_id: *variable_id,
                    });
                }
                CommandKind::SelectItem {
                    variable_id,
                    item_type,
                } => {
                    message.input = Some(MessageInput::Item {
                        item_type: *item_type,
                    });
                    pending = Some(PendingInput::Item {
                        variable_id: *variable_id,
                    });
                }
                _ => {}
            }
            if pending.is_some() {
                self.cursor += 1;
            }
        }

        ctx.host.show_message(message);
        Flow::Suspend(WaitMode::Message { input: pending })
    }

    pub(super) fn show_choices(&mut self, setup: &ChoiceSetup, ctx: &mut Context<'_>) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        let prompt = choice_prompt(setup, ctx);
        ctx.host.show_message(Message {
            position: setup.position,
            background: setup.background,
            input: Some(MessageInput::Choice(prompt)),
            ..Message::default()
        });
        Flow::Suspend(WaitMode::Message {
            input: Some(PendingInput::Choice {
                indent: self.indent,
            }),
        })
    }

    pub(super) fn input_number(
        &mut self,
        variable_id: u32,
        digits: u32,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        ctx.host.show_message(Message {
            input: Some(MessageInput::Number { digits }),
            ..Message::default()
        });
        Flow::Suspend(WaitMode::Message {
            input: Some(PendingInput::Number { variable_id }),
        })
    }

    pub(super) fn select_item(
        &mut self,
        variable_id: u32,
        item_type: u32,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        ctx.host.show_message(Message {
            input: Some(MessageInput::Item { item_type }),
            ..Message::default()
        });
        Flow::Suspend(WaitMode::Message {
            input: Some(PendingInput::Item { variable_id }),
        })
    }

    pub(super) fn scroll_text(
        &mut self,
        table: &CommandTable,
        speed: u32,
        no_fast: bool,
        ctx: &mut Context<'_>,
    ) -> Flow {
        if ctx.host.is_message_busy() {
            return Flow::Yield;
        }
        let mut message = Message {
            scroll: Some(ScrollSetup { speed, no_fast }),
            ..Message::default()
        };
        while let Some(CommandKind::ScrollLine { text }) =
            table.get(self.cursor + 1).map(|command| &command.kind)
        {
            self.cursor += 1;
            message.lines.push(expand_escapes(text, &*ctx.state));
        }
        ctx.host.show_message(message);
        Flow::Suspend(WaitMode::Scroll)
    }

    /// Comments have no effect; the text is kept for inspection.
    pub(super) fn comment(&mut self, table: &CommandTable, text: &str) -> Flow {
        let mut lines = vec![text.to_string()];
        while let Some(CommandKind::CommentLine { text }) =
            table.get(self.cursor + 1).map(|command| &command.kind)
        {
            self.cursor += 1;
            lines.push(text.clone());
        }
        self.comments.push(lines.join("\n"));
        Flow::Continue
    }
}

fn choice_prompt(setup: &ChoiceSetup, ctx: &Context<'_>) -> ChoicePrompt {
    let count = setup.choices.len() as i32;
    let cancel_type = if setup.cancel_type >= count {
        CANCEL_BRANCH
    } else {
        setup.cancel_type
    };
    ChoicePrompt {
        choices: setup
            .choices
            .iter()
            .map(|choice| expand_escapes(choice, &*ctx.state))
            .collect(),
        cancel_type,
        default_type: setup.default_type,
        position: setup.position,
        background: setup.background,
    }
}
