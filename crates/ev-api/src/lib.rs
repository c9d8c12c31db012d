use std::collections::BTreeMap;

use ev_core::{CommandTable, Database, EventError};
use ev_data::{lint_table, load_database_from_json_map, LintDiagnostic};
use ev_runtime::{
    active_page, Context, EventOrigin, GameState, HeadlessHost, Interpreter, InterpreterOptions,
    MemoryGameState, Scheduler,
};
use serde::{Deserialize, Serialize};

/// Script a run starts from: `{"commonEvent": id}` or `{"mapEvent": [map, event]}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventEntry {
    CommonEvent(u32),
    MapEvent(u32, u32),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateInterpreterOptions {
    /// Map the interpreter runs on.
    pub map_id: u32,
    pub interpreter: InterpreterOptions,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateSchedulerOptions {
    pub entry: EventEntry,
    pub interpreter: InterpreterOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub ticks: usize,
    /// False when `max_ticks` ran out with work still pending.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDiagnostic {
    /// Table the diagnostic belongs to, e.g. `commonEvent:3` or `map:1:event:2:page:1`.
    pub source: String,
    #[serde(flatten)]
    pub diagnostic: LintDiagnostic,
}

pub fn load_project_from_json_map(
    files: &BTreeMap<String, String>,
) -> Result<Database, EventError> {
    let database = load_database_from_json_map(files)?;
    if database.common_events.is_empty() && database.troops.is_empty() && database.maps.is_empty()
    {
        return Err(EventError::new(
            "API_PROJECT_EMPTY",
            "Expected CommonEvents.json, Troops.json or MapNNN.json in the project.",
        ));
    }
    Ok(database)
}

pub fn create_common_event_interpreter(
    database: &Database,
    common_event_id: u32,
    options: CreateInterpreterOptions,
) -> Result<Interpreter, EventError> {
    let event = database
        .common_event(common_event_id)
        .ok_or_else(|| common_event_not_found(common_event_id))?;
    let mut interpreter = Interpreter::new(options.interpreter);
    interpreter.setup_common_event(
        event.list.clone(),
        EventOrigin::new(options.map_id, 0),
        common_event_id,
    );
    Ok(interpreter)
}

/// Interpreter for the page of a map event that is active under `state`.
pub fn create_map_event_interpreter(
    database: &Database,
    state: &dyn GameState,
    event_id: u32,
    options: CreateInterpreterOptions,
) -> Result<Interpreter, EventError> {
    let map_id = options.map_id;
    let event = find_map_event(database, map_id, event_id)?;
    let (_, page) = active_page(event, map_id, state).ok_or_else(|| {
        EventError::new(
            "API_NO_ACTIVE_PAGE",
            format!("Map {} event {} has no page whose conditions hold.", map_id, event_id),
        )
    })?;
    let mut interpreter = Interpreter::new(options.interpreter);
    interpreter.setup(page.list.clone(), EventOrigin::new(map_id, event_id));
    Ok(interpreter)
}

/// Scheduler with the entry already queued. A map entry runs on the state's current map, so
/// callers move the state there before the first tick.
pub fn create_scheduler(
    database: &Database,
    options: CreateSchedulerOptions,
) -> Result<Scheduler, EventError> {
    let mut scheduler = Scheduler::new(options.interpreter);
    match options.entry {
        EventEntry::CommonEvent(common_event_id) => {
            if database.common_event(common_event_id).is_none() {
                return Err(common_event_not_found(common_event_id));
            }
            scheduler.reserve_common_event(common_event_id);
        }
        EventEntry::MapEvent(map_id, event_id) => {
            find_map_event(database, map_id, event_id)?;
            scheduler.start_event(event_id);
        }
    }
    Ok(scheduler)
}

/// Ticks the scheduler against a headless host until the map side goes idle.
pub fn run_headless(
    scheduler: &mut Scheduler,
    state: &mut MemoryGameState,
    host: &mut HeadlessHost,
    database: &Database,
    max_ticks: usize,
) -> RunSummary {
    let mut ticks = 0;
    while ticks < max_ticks {
        {
            let mut ctx = Context::new(state, host, database);
            scheduler.tick(&mut ctx);
        }
        host.advance();
        ticks += 1;
        if is_idle(scheduler) {
            return RunSummary {
                ticks,
                finished: true,
            };
        }
    }
    RunSummary {
        ticks,
        finished: is_idle(scheduler),
    }
}

/// Lint diagnostics for every table in the project.
pub fn lint_project(database: &Database) -> Vec<ProjectDiagnostic> {
    let mut diagnostics = Vec::new();
    for event in database.common_events.values() {
        push_lint(&mut diagnostics, format!("commonEvent:{}", event.id), &event.list);
    }
    for troop in database.troops.values() {
        for (index, page) in troop.pages.iter().enumerate() {
            push_lint(
                &mut diagnostics,
                format!("troop:{}:page:{}", troop.id, index + 1),
                &page.list,
            );
        }
    }
    for map in database.maps.values() {
        for event in map.events.values() {
            for (index, page) in event.pages.iter().enumerate() {
                push_lint(
                    &mut diagnostics,
                    format!("map:{}:event:{}:page:{}", map.id, event.id, index + 1),
                    &page.list,
                );
            }
        }
    }
    diagnostics
}

fn push_lint(diagnostics: &mut Vec<ProjectDiagnostic>, source: String, table: &CommandTable) {
    diagnostics.extend(lint_table(table).into_iter().map(|diagnostic| ProjectDiagnostic {
        source: source.clone(),
        diagnostic,
    }));
}

fn is_idle(scheduler: &Scheduler) -> bool {
    !scheduler.is_map_busy()
        && scheduler
            .battle_interpreter()
            .map_or(true, |interpreter| !interpreter.is_running())
}

fn find_map_event(
    database: &Database,
    map_id: u32,
    event_id: u32,
) -> Result<&ev_core::MapEvent, EventError> {
    let map = database.map(map_id).ok_or_else(|| {
        EventError::new("API_MAP_NOT_FOUND", format!("Map {} is not loaded.", map_id))
    })?;
    map.events.get(&event_id).ok_or_else(|| {
        EventError::new(
            "API_MAP_EVENT_NOT_FOUND",
            format!("Map {} has no event {}.", map_id, event_id),
        )
    })
}

fn common_event_not_found(common_event_id: u32) -> EventError {
    EventError::new(
        "API_COMMON_EVENT_NOT_FOUND",
        format!("Common event {} is not registered.", common_event_id),
    )
}
