mod callstack;
mod control_flow;
mod dispatch;
mod step;
mod wait;

#[cfg(test)]
mod tests;

use ev_core::CommandTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::branch::BranchState;
use crate::rng::{next_random_u32, DEFAULT_SEED};
use crate::wait::WaitMode;

pub const DEFAULT_MAX_DEPTH: usize = 100;
pub const DEFAULT_FREEZE_LIMIT: usize = 100_000;
pub const DEFAULT_FADE_SPEED: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterpreterOptions {
    /// Depth a child may never reach; the root sits at 0.
    pub max_depth: usize,
    /// Commands one interpreter may dispatch in a single tick.
    pub freeze_limit: usize,
    pub fade_speed: u32,
    pub random_seed: Option<u32>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            freeze_limit: DEFAULT_FREEZE_LIMIT,
            fade_speed: DEFAULT_FADE_SPEED,
            random_seed: None,
        }
    }
}

/// Map and event the running table belongs to; `event_id` 0 means no map event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrigin {
    pub map_id: u32,
    pub event_id: u32,
}

impl EventOrigin {
    pub fn new(map_id: u32, event_id: u32) -> Self {
        Self { map_id, event_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpreterState {
    Idle,
    Running,
    Waiting,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    Completed,
    Exited,
    ControlTransfer,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct Interpreter {
    options: InterpreterOptions,
    table: Option<CommandTable>,
    origin: EventOrigin,
    common_event_id: Option<u32>,
    cursor: usize,
    indent: usize,
    branch: BranchState,
    wait: Option<WaitMode>,
    depth: usize,
    child: Option<Box<Interpreter>>,
    commands_this_tick: usize,
    termination: Option<Termination>,
    comments: Vec<String>,
    rng_state: u32,
}

impl Interpreter {
    pub fn new(options: InterpreterOptions) -> Self {
        Self::with_depth(options, 0, options.random_seed.unwrap_or(DEFAULT_SEED))
    }

    fn with_depth(options: InterpreterOptions, depth: usize, rng_state: u32) -> Self {
        Self {
            options,
            table: None,
            origin: EventOrigin::default(),
            common_event_id: None,
            cursor: 0,
            indent: 0,
            branch: BranchState::default(),
            wait: None,
            depth,
            child: None,
            commands_this_tick: 0,
            termination: None,
            comments: Vec::new(),
            rng_state,
        }
    }

    pub fn setup(&mut self, table: CommandTable, origin: EventOrigin) {
        self.clear();
        debug!(
            depth = self.depth,
            map_id = origin.map_id,
            event_id = origin.event_id,
            commands = table.len(),
            "interpreter setup"
        );
        self.table = Some(table);
        self.origin = origin;
    }

    /// Same as `setup`, remembering which common event the table came from.
    pub fn setup_common_event(&mut self, table: CommandTable, origin: EventOrigin, common_event_id: u32) {
        self.setup(table, origin);
        self.common_event_id = Some(common_event_id);
    }

    /// Back to Idle, dropping the table, the child and all bookkeeping.
    pub fn clear(&mut self) {
        self.table = None;
        self.origin = EventOrigin::default();
        self.common_event_id = None;
        self.cursor = 0;
        self.indent = 0;
        self.branch.clear();
        self.wait = None;
        self.child = None;
        self.commands_this_tick = 0;
        self.termination = None;
        self.comments.clear();
    }

    /// Cancellation: straight to Terminated without running any further handler.
    pub fn abort(&mut self) {
        if self.table.is_some() && self.termination.is_none() {
            self.finish(Termination::Aborted);
        }
    }

    pub fn state(&self) -> InterpreterState {
        if self.termination.is_some() {
            InterpreterState::Terminated
        } else if self.table.is_none() {
            InterpreterState::Idle
        } else if self.wait.is_some() {
            InterpreterState::Waiting
        } else {
            InterpreterState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state(),
            InterpreterState::Running | InterpreterState::Waiting
        )
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn origin(&self) -> EventOrigin {
        self.origin
    }

    pub fn event_id(&self) -> u32 {
        self.origin.event_id
    }

    pub fn common_event_id(&self) -> Option<u32> {
        self.common_event_id
    }

    pub fn wait_mode(&self) -> Option<&WaitMode> {
        self.wait.as_ref()
    }

    pub fn child(&self) -> Option<&Interpreter> {
        self.child.as_deref()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub fn branch_state(&self) -> &BranchState {
        &self.branch
    }

    pub fn table(&self) -> Option<&CommandTable> {
        self.table.as_ref()
    }

    /// Deepest interpreter of the child chain, `self` when no child runs.
    pub fn innermost(&self) -> &Interpreter {
        let mut current = self;
        while let Some(child) = current.child.as_deref() {
            current = child;
        }
        current
    }

    fn finish(&mut self, termination: Termination) {
        debug!(
            depth = self.depth,
            event_id = self.origin.event_id,
            ?termination,
            "interpreter terminated"
        );
        self.termination = Some(termination);
        self.wait = None;
        self.child = None;
    }

    fn next_seed(&mut self) -> u32 {
        next_random_u32(&mut self.rng_state)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterOptions::default())
    }
}
