use std::collections::VecDeque;

use ev_core::BattleResult;
use serde::{Deserialize, Serialize};

use crate::host::{Host, Message, MessageInput, MessageResult, Report, Request, SceneRequest};
use crate::wait::WaitMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadlessOptions {
    /// Ticks a message window stays busy after it opens.
    pub message_ticks: u32,
    /// Ticks movement, animation, balloon, transfer, action and video waits stay busy.
    pub wait_ticks: u32,
    pub scene_ticks: u32,
    pub choices: Vec<i32>,
    pub numbers: Vec<i64>,
    pub items: Vec<u32>,
    pub battle_results: Vec<BattleResult>,
    pub pressed_buttons: Vec<String>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            message_ticks: 1,
            wait_ticks: 1,
            scene_ticks: 1,
            choices: Vec::new(),
            numbers: Vec::new(),
            items: Vec::new(),
            battle_results: Vec::new(),
            pressed_buttons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostEvent {
    Message { message: Message, answer: Option<MessageResult> },
    Request { request: Request },
    Scene { scene: SceneRequest },
    Plugin { command: String, args: Vec<String> },
    /// `repeats` counts further identical reports that arrived straight after this one.
    Report { report: Report, repeats: u32 },
}

/// Deterministic host without presentation. Answers come from scripted queues and every
/// outgoing call lands in an event log.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    options: HeadlessOptions,
    choices: VecDeque<i32>,
    numbers: VecDeque<i64>,
    items: VecDeque<u32>,
    battle_results: VecDeque<BattleResult>,
    message_left: u32,
    effect_left: u32,
    scene_left: u32,
    message_result: Option<MessageResult>,
    battle_result: Option<BattleResult>,
    events: Vec<HostEvent>,
}

impl HeadlessHost {
    pub fn new(options: HeadlessOptions) -> Self {
        Self {
            choices: options.choices.iter().copied().collect(),
            numbers: options.numbers.iter().copied().collect(),
            items: options.items.iter().copied().collect(),
            battle_results: options.battle_results.iter().copied().collect(),
            options,
            message_left: 0,
            effect_left: 0,
            scene_left: 0,
            message_result: None,
            battle_result: None,
            events: Vec::new(),
        }
    }

    /// One tick of simulated presentation time.
    pub fn advance(&mut self) {
        self.message_left = self.message_left.saturating_sub(1);
        self.effect_left = self.effect_left.saturating_sub(1);
        self.scene_left = self.scene_left.saturating_sub(1);
    }

    /// The log is never trimmed by the host; long-running drivers drain it with `take_events`.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn reports(&self) -> impl Iterator<Item = &Report> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Report { report, .. } => Some(report),
            _ => None,
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Message { message, .. } => Some(message),
            _ => None,
        })
    }

    fn answer(&mut self, input: &MessageInput) -> MessageResult {
        match input {
            MessageInput::Choice(prompt) => {
                let picked = self.choices.pop_front().unwrap_or(prompt.default_type.max(0));
                let count = prompt.choices.len() as i32;
                if picked < 0 || picked >= count {
                    match prompt.cancel_type {
                        -1 => MessageResult::Choice(prompt.default_type.max(0)),
                        cancel => MessageResult::Choice(cancel),
                    }
                } else {
                    MessageResult::Choice(picked)
                }
            }
            MessageInput::Number { digits } => {
                let limit = 10_i64.saturating_pow((*digits).min(18)) - 1;
                let value = self.numbers.pop_front().unwrap_or(0);
                MessageResult::Number(value.clamp(0, limit))
            }
            MessageInput::Item { .. } => MessageResult::Item(self.items.pop_front().unwrap_or(0)),
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(HeadlessOptions::default())
    }
}

impl Host for HeadlessHost {
    fn is_busy(&self, wait: &WaitMode) -> bool {
        match wait {
            WaitMode::Ticks { .. } => false,
            WaitMode::Message { .. } | WaitMode::Scroll => self.message_left > 0,
            WaitMode::Scene { .. } | WaitMode::Battle { .. } => self.scene_left > 0,
            _ => self.effect_left > 0,
        }
    }

    fn show_message(&mut self, message: Message) {
        let answer = message.input.as_ref().map(|input| self.answer(input));
        self.message_result = answer;
        self.message_left = self.options.message_ticks;
        self.events.push(HostEvent::Message { message, answer });
    }

    fn take_message_result(&mut self) -> Option<MessageResult> {
        self.message_result.take()
    }

    fn request(&mut self, request: Request) {
        if matches!(
            request,
            Request::Transfer { .. }
                | Request::MoveRoute { .. }
                | Request::Animation { .. }
                | Request::Balloon { .. }
                | Request::GatherFollowers
                | Request::PlayMovie { .. }
                | Request::ForceAction { .. }
        ) {
            self.effect_left = self.options.wait_ticks;
        }
        self.events.push(HostEvent::Request { request });
    }

    fn push_scene(&mut self, scene: SceneRequest) {
        if matches!(scene, SceneRequest::Battle { .. }) {
            self.battle_result = Some(
                self.battle_results
                    .pop_front()
                    .unwrap_or(BattleResult::Win),
            );
        }
        self.scene_left = self.options.scene_ticks;
        self.events.push(HostEvent::Scene { scene });
    }

    fn take_battle_result(&mut self) -> Option<BattleResult> {
        self.battle_result.take()
    }

    fn is_button_pressed(&self, button: &str) -> bool {
        self.options
            .pressed_buttons
            .iter()
            .any(|pressed| pressed == button)
    }

    fn plugin_command(&mut self, command: &str, args: &[String]) {
        self.events.push(HostEvent::Plugin {
            command: command.to_string(),
            args: args.to_vec(),
        });
    }

    fn report(&mut self, report: Report) {
        if let Some(HostEvent::Report {
            report: previous,
            repeats,
        }) = self.events.last_mut()
        {
            if report.repeats(previous) {
                *repeats += 1;
                return;
            }
        }
        self.events.push(HostEvent::Report { report, repeats: 0 });
    }
}
