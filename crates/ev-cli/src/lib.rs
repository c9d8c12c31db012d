use std::ffi::OsString;
use std::path::Path;

use clap::Parser;
use ev_api::{
    create_scheduler, lint_project, load_project_from_json_map, run_headless,
    CreateSchedulerOptions, EventEntry,
};
use ev_core::EventError;
use ev_runtime::{HeadlessHost, HeadlessOptions, InterpreterOptions, MemoryGameState};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod error_map;
mod run_report;
mod source_loader;
mod state_store;

#[cfg(test)]
mod cli_test_support;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, RunArgs};
pub(crate) use error_map::{
    emit_error, json_line, map_cli_source_path, map_cli_source_read, map_cli_source_scan,
    map_cli_state_encode, map_cli_state_invalid, map_cli_state_read, map_cli_state_write,
};
pub(crate) use run_report::{emit_run_report, RunReport};
pub(crate) use source_loader::load_data_dir;
pub(crate) use state_store::{load_game_state, save_game_state};

/// Logs go to stderr so stdout carries only protocol lines. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, EventError> {
    match cli.command {
        Mode::Run(args) => run_event(args),
        Mode::Check(args) => run_check(args),
    }
}

fn run_entry(args: &RunArgs) -> Result<EventEntry, EventError> {
    match (args.common_event, args.map_event) {
        (Some(common_event_id), None) => Ok(EventEntry::CommonEvent(common_event_id)),
        (None, Some((map_id, event_id))) => Ok(EventEntry::MapEvent(map_id, event_id)),
        _ => Err(EventError::new(
            "CLI_ENTRY_INVALID",
            "Expected exactly one of --common-event or --map-event.",
        )),
    }
}

fn run_event(args: RunArgs) -> Result<i32, EventError> {
    let entry = run_entry(&args)?;
    let files = load_data_dir(&args.data_dir)?;
    let database = load_project_from_json_map(&files)?;

    let mut state = match &args.state_in {
        Some(path) => load_game_state(Path::new(path))?,
        None => MemoryGameState::new(1),
    };
    if let EventEntry::MapEvent(map_id, _) = entry {
        state.map_id = map_id;
    }

    let mut scheduler = create_scheduler(
        &database,
        CreateSchedulerOptions {
            entry,
            interpreter: InterpreterOptions {
                max_depth: args.max_depth,
                freeze_limit: args.freeze_limit,
                fade_speed: args.fade_speed,
                random_seed: args.seed,
            },
        },
    )?;
    let mut host = HeadlessHost::new(HeadlessOptions {
        message_ticks: args.message_ticks,
        choices: args.choices.clone(),
        numbers: args.numbers.clone(),
        battle_results: args.battle_results.clone(),
        ..HeadlessOptions::default()
    });

    info!(?entry, max_ticks = args.max_ticks, "run started");
    let summary = run_headless(&mut scheduler, &mut state, &mut host, &database, args.max_ticks);
    info!(ticks = summary.ticks, finished = summary.finished, "run stopped");

    if let Some(path) = &args.state_out {
        save_game_state(Path::new(path), &state)?;
    }

    emit_run_report(
        &RunReport {
            summary,
            events: host.take_events(),
        },
        args.state_out.as_deref(),
    );
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32, EventError> {
    let files = load_data_dir(&args.data_dir)?;
    let database = load_project_from_json_map(&files)?;

    println!("RESULT:OK");
    println!("COMMON_EVENTS:{}", database.common_events.len());
    println!("TROOPS:{}", database.troops.len());
    println!("MAPS:{}", database.maps.len());
    for diagnostic in lint_project(&database) {
        println!("LINT:{}", json_line(&diagnostic));
    }
    Ok(0)
}

#[cfg(test)]
mod tests;
