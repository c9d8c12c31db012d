use clap::{ArgGroup, Args, Parser, Subcommand};
use ev_core::BattleResult;
use ev_runtime::{DEFAULT_FADE_SPEED, DEFAULT_FREEZE_LIMIT, DEFAULT_MAX_DEPTH};

pub(crate) const DEFAULT_MAX_TICKS: usize = 10_000;

#[derive(Debug, Parser)]
#[command(name = "ev-cli")]
#[command(about = "Headless runner for RPG event scripts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Run one event to completion and print what it did.
    Run(RunArgs),
    /// Load a project and print lint diagnostics.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("entry").required(true).args(["common_event", "map_event"])))]
pub(crate) struct RunArgs {
    #[arg(long = "data-dir")]
    pub(crate) data_dir: String,
    #[arg(long = "common-event")]
    pub(crate) common_event: Option<u32>,
    /// `MAP:EVENT`
    #[arg(long = "map-event", value_parser = parse_map_event)]
    pub(crate) map_event: Option<(u32, u32)>,
    #[arg(long = "state-in")]
    pub(crate) state_in: Option<String>,
    #[arg(long = "state-out")]
    pub(crate) state_out: Option<String>,
    #[arg(long = "choice", allow_negative_numbers = true)]
    pub(crate) choices: Vec<i32>,
    #[arg(long = "number")]
    pub(crate) numbers: Vec<i64>,
    #[arg(long = "battle-result", value_parser = parse_battle_result)]
    pub(crate) battle_results: Vec<BattleResult>,
    #[arg(long = "max-ticks", default_value_t = DEFAULT_MAX_TICKS)]
    pub(crate) max_ticks: usize,
    #[arg(long = "seed")]
    pub(crate) seed: Option<u32>,
    #[arg(long = "freeze-limit", default_value_t = DEFAULT_FREEZE_LIMIT)]
    pub(crate) freeze_limit: usize,
    #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_DEPTH)]
    pub(crate) max_depth: usize,
    #[arg(long = "fade-speed", default_value_t = DEFAULT_FADE_SPEED)]
    pub(crate) fade_speed: u32,
    #[arg(long = "message-ticks", default_value_t = 1)]
    pub(crate) message_ticks: u32,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "data-dir")]
    pub(crate) data_dir: String,
}

pub(crate) fn parse_map_event(raw: &str) -> Result<(u32, u32), String> {
    let (map_id, event_id) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected MAP:EVENT, got \"{}\"", raw))?;
    let map_id = map_id
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid map id: {}", error))?;
    let event_id = event_id
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid event id: {}", error))?;
    Ok((map_id, event_id))
}

pub(crate) fn parse_battle_result(raw: &str) -> Result<BattleResult, String> {
    match raw.to_ascii_lowercase().as_str() {
        "win" => Ok(BattleResult::Win),
        "escape" => Ok(BattleResult::Escape),
        "lose" => Ok(BattleResult::Lose),
        _ => Err(format!("expected win, escape or lose, got \"{}\"", raw)),
    }
}

#[cfg(test)]
mod cli_args_tests {
    use super::*;

    #[test]
    fn map_event_takes_map_and_event_ids() {
        assert_eq!(parse_map_event("1:4"), Ok((1, 4)));
        assert!(parse_map_event("14").is_err());
        assert!(parse_map_event("a:4").is_err());
    }

    #[test]
    fn battle_result_names_are_case_insensitive() {
        assert_eq!(parse_battle_result("Escape"), Ok(BattleResult::Escape));
        assert!(parse_battle_result("draw").is_err());
    }

    #[test]
    fn run_requires_exactly_one_entry() {
        assert!(Cli::try_parse_from(["ev-cli", "run", "--data-dir", "d"]).is_err());
        assert!(Cli::try_parse_from([
            "ev-cli",
            "run",
            "--data-dir",
            "d",
            "--common-event",
            "1",
            "--map-event",
            "1:1",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "ev-cli",
            "run",
            "--data-dir",
            "d",
            "--map-event",
            "2:3",
            "--choice",
            "1",
            "--choice",
            "0",
        ])
        .expect("run args should parse");
        let Mode::Run(args) = cli.command else {
            panic!("expected run mode");
        };
        assert_eq!(args.map_event, Some((2, 3)));
        assert_eq!(args.choices, vec![1, 0]);
        assert_eq!(args.max_ticks, DEFAULT_MAX_TICKS);
    }
}
