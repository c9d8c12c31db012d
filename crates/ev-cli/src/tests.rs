use super::*;
use crate::cli_test_support::*;
use ev_runtime::GameState;

#[test]
fn run_cli_returns_zero_for_a_demo_and_writes_state() {
    let state_out = temp_path("greeting-state").join("state.json");
    let code = run_cli_from_args([
        "ev-cli".to_string(),
        "run".to_string(),
        "--data-dir".to_string(),
        demo_data_dir("01-greeting"),
        "--common-event".to_string(),
        "1".to_string(),
        "--choice".to_string(),
        "1".to_string(),
        "--state-out".to_string(),
        state_out.to_string_lossy().to_string(),
    ]);
    assert_eq!(code, 0);

    let state = load_game_state(&state_out).expect("state should be written");
    assert!(state.switch(2));
    assert_eq!(state.variable(1), 7);
}

#[test]
fn run_cli_reads_state_in_before_running() {
    let state_in = temp_path("door-state").join("in.json");
    let mut state = MemoryGameState::new(1);
    state.set_self_switch(ev_runtime::SelfSwitchKey::new(1, 1, "A"), true);
    save_game_state(&state_in, &state).expect("state should save");
    let state_out = temp_path("door-state").join("out.json");

    let code = run_cli_from_args([
        "ev-cli".to_string(),
        "run".to_string(),
        "--data-dir".to_string(),
        demo_data_dir("02-map-door"),
        "--map-event".to_string(),
        "1:1".to_string(),
        "--state-in".to_string(),
        state_in.to_string_lossy().to_string(),
        "--state-out".to_string(),
        state_out.to_string_lossy().to_string(),
    ]);
    assert_eq!(code, 0);

    // the open-door page runs, so the locksmith never triggers
    let state = load_game_state(&state_out).expect("state should be written");
    assert!(!state.switch(5));
}

#[test]
fn run_cli_maps_failures_to_exit_code_one() {
    let missing = temp_path("missing-data");
    let code = run_cli_from_args([
        "ev-cli".to_string(),
        "check".to_string(),
        "--data-dir".to_string(),
        missing.to_string_lossy().to_string(),
    ]);
    assert_eq!(code, 1);

    let code = run_cli_from_args([
        "ev-cli".to_string(),
        "run".to_string(),
        "--data-dir".to_string(),
        demo_data_dir("01-greeting"),
        "--common-event".to_string(),
        "42".to_string(),
    ]);
    assert_eq!(code, 1);
}

#[test]
fn run_cli_rejects_bad_arguments_through_clap() {
    let code = run_cli_from_args(["ev-cli", "run", "--data-dir", "x", "--map-event", "nope"]);
    assert_eq!(code, 2);
}

#[test]
fn check_accepts_every_demo() {
    for name in ev_test_example::demo_names() {
        let code = run_cli_from_args([
            "ev-cli".to_string(),
            "check".to_string(),
            "--data-dir".to_string(),
            demo_data_dir(&name),
        ]);
        assert_eq!(code, 0, "check failed for {}", name);
    }
}
