use ev_core::{CommandTable, CommonEvent, CommonEventTrigger, Database};
use serde_json::Value;

use crate::context::Context;
use crate::headless::{HeadlessHost, HeadlessOptions};
use crate::interpreter::{EventOrigin, Interpreter, InterpreterOptions};
use crate::memory::MemoryGameState;
use crate::scheduler::Scheduler;

pub(crate) fn table_from_json(source: &str) -> CommandTable {
    let value: Value = serde_json::from_str(source).expect("command list json should parse");
    ev_data::decode_table_json(&value).expect("command list should decode")
}

pub(crate) fn common_event(id: u32, trigger: CommonEventTrigger, switch_id: u32, source: &str) -> CommonEvent {
    CommonEvent {
        id,
        name: format!("common {id}"),
        trigger,
        switch_id,
        list: table_from_json(source),
    }
}

pub(crate) fn test_options() -> InterpreterOptions {
    InterpreterOptions {
        random_seed: Some(1),
        ..InterpreterOptions::default()
    }
}

/// Root interpreter running `source` for event 0 on map 1.
pub(crate) fn start(source: &str) -> Interpreter {
    start_with(source, test_options())
}

pub(crate) fn start_with(source: &str, options: InterpreterOptions) -> Interpreter {
    let mut interpreter = Interpreter::new(options);
    interpreter.setup(table_from_json(source), EventOrigin::new(1, 0));
    interpreter
}

pub(crate) struct Fixture {
    pub(crate) state: MemoryGameState,
    pub(crate) host: HeadlessHost,
    pub(crate) database: Database,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_host(HeadlessOptions::default())
    }

    pub(crate) fn with_host(options: HeadlessOptions) -> Self {
        Self {
            state: MemoryGameState::new(1),
            host: HeadlessHost::new(options),
            database: Database::default(),
        }
    }

    pub(crate) fn add_common_event(&mut self, event: CommonEvent) {
        self.database.common_events.insert(event.id, event);
    }

    /// One tick: update, then let simulated presentation time pass.
    pub(crate) fn tick(&mut self, interpreter: &mut Interpreter) {
        let mut ctx = Context::new(&mut self.state, &mut self.host, &self.database);
        interpreter.update(&mut ctx);
        self.host.advance();
    }

    pub(crate) fn tick_scheduler(&mut self, scheduler: &mut Scheduler) {
        let mut ctx = Context::new(&mut self.state, &mut self.host, &self.database);
        scheduler.tick(&mut ctx);
        self.host.advance();
    }

    /// Ticks until the interpreter stops running and returns how many ticks that took.
    pub(crate) fn run_to_end(&mut self, interpreter: &mut Interpreter, max_ticks: usize) -> usize {
        for tick in 1..=max_ticks {
            self.tick(interpreter);
            if !interpreter.is_running() {
                return tick;
            }
        }
        panic!("interpreter should finish within {max_ticks} ticks");
    }
}
