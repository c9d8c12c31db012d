use ev_core::Database;

use crate::host::Host;
use crate::state::GameState;

/// Collaborators passed into every tick. Nothing here is retained between ticks.
pub struct Context<'a> {
    pub state: &'a mut dyn GameState,
    pub host: &'a mut dyn Host,
    pub database: &'a Database,
}

impl<'a> Context<'a> {
    pub fn new(state: &'a mut dyn GameState, host: &'a mut dyn Host, database: &'a Database) -> Self {
        Self {
            state,
            host,
            database,
        }
    }
}
