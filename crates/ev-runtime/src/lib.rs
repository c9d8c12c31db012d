mod branch;
mod context;
mod headless;
mod host;
mod interpreter;
mod memory;
mod rng;
mod scheduler;
mod script;
mod state;
mod text;
mod wait;

#[cfg(test)]
mod test_support;

pub use branch::{BranchOutcome, BranchState};
pub use context::Context;
pub use headless::{HeadlessHost, HeadlessOptions, HostEvent};
pub use host::{
    ChoicePrompt, Host, Message, MessageInput, MessageResult, Report, Request, SceneRequest,
    ScrollSetup,
};
pub use interpreter::{
    EventOrigin, Interpreter, InterpreterOptions, InterpreterState, Termination,
    DEFAULT_FADE_SPEED, DEFAULT_FREEZE_LIMIT, DEFAULT_MAX_DEPTH,
};
pub use memory::{AccessFlags, ActorRecord, CharacterRecord, Counters, EnemyRecord, MemoryGameState};
pub use scheduler::{active_page, troop_conditions_met, ParallelSource, Scheduler};
pub use state::{CharacterId, GameState, SelfSwitchKey};
pub use text::expand_escapes;
pub use wait::{PendingInput, SceneKind, WaitMode};
