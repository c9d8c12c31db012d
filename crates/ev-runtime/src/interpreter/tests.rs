use ev_core::{CommonEventTrigger, Troop};

use super::*;
use crate::headless::{HeadlessOptions, HostEvent};
use crate::host::{Report, SceneRequest};
use crate::state::GameState;
use crate::test_support::*;

#[test]
fn straight_line_script_finishes_in_one_tick() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":121,"indent":0,"parameters":[1,2,0]},
          {"code":122,"indent":0,"parameters":[3,3,0,0,5]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    assert_eq!(interpreter.state(), InterpreterState::Running);

    fixture.tick(&mut interpreter);
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
    assert!(fixture.state.switch(1) && fixture.state.switch(2));
    assert_eq!(fixture.state.variable(3), 5);

    interpreter.clear();
    assert_eq!(interpreter.state(), InterpreterState::Idle);
}

#[test]
fn false_condition_runs_else_block_only() {
    let mut fixture = Fixture::new();
    fixture.state.variables.insert(1, 1);
    let mut interpreter = start(
        r#"[
          {"code":111,"indent":0,"parameters":[1,1,0,2,0]},
          {"code":122,"indent":1,"parameters":[2,2,0,0,10]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":411,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[2,2,0,0,20]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":412,"indent":0,"parameters":[]},
          {"code":122,"indent":0,"parameters":[3,3,0,1,2]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(2), 20);
    assert_eq!(fixture.state.variable(3), 20);
}

#[test]
fn nested_branch_outcomes_do_not_leak_outward() {
    let mut fixture = Fixture::new();
    fixture.state.switches.insert(1, true);
    let mut interpreter = start(
        r#"[
          {"code":111,"indent":0,"parameters":[0,1,0]},
          {"code":111,"indent":1,"parameters":[0,2,0]},
          {"code":122,"indent":2,"parameters":[1,1,0,0,1]},
          {"code":0,"indent":2,"parameters":[]},
          {"code":411,"indent":1,"parameters":[]},
          {"code":122,"indent":2,"parameters":[1,1,1,0,2]},
          {"code":0,"indent":2,"parameters":[]},
          {"code":412,"indent":1,"parameters":[]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":411,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[1,1,1,0,100]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":412,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(1), 2);
}

#[test]
fn loop_repeats_until_break() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":112,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[1,1,1,0,1]},
          {"code":111,"indent":1,"parameters":[1,1,0,3,1]},
          {"code":113,"indent":2,"parameters":[]},
          {"code":0,"indent":2,"parameters":[]},
          {"code":412,"indent":1,"parameters":[]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":413,"indent":0,"parameters":[]},
          {"code":122,"indent":0,"parameters":[2,2,0,1,1]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(1), 3);
    assert_eq!(fixture.state.variable(2), 3);
}

#[test]
fn backward_label_jump_reruns_block() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":122,"indent":0,"parameters":[1,1,0,0,1]},
          {"code":108,"indent":0,"parameters":["count up"]},
          {"code":118,"indent":0,"parameters":["top"]},
          {"code":122,"indent":0,"parameters":[2,2,1,0,1]},
          {"code":111,"indent":0,"parameters":[1,2,0,2,4]},
          {"code":119,"indent":1,"parameters":["top"]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":412,"indent":0,"parameters":[]},
          {"code":122,"indent":0,"parameters":[3,3,0,1,2]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(3), 2);
    assert_eq!(interpreter.comments(), ["count up".to_string()]);
}

#[test]
fn missing_label_is_reported_and_skipped() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":119,"indent":0,"parameters":["nowhere"]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert!(fixture.state.switch(1));
    assert!(fixture.host.reports().any(|report| matches!(
        report,
        Report::MissingLabel { name, index: 0 } if name == "nowhere"
    )));
}

#[test]
fn stray_else_skips_its_block_and_reports() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":411,"indent":0,"parameters":[]},
          {"code":121,"indent":1,"parameters":[1,1,0]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":412,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert!(!fixture.state.switch(1));
    assert!(fixture
        .host
        .reports()
        .any(|report| *report == Report::StrayElse { index: 0 }));
}

#[test]
fn exit_event_processing_ends_the_script() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":115,"indent":0,"parameters":[]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.tick(&mut interpreter);
    assert_eq!(interpreter.termination(), Some(Termination::Exited));
    assert!(!fixture.state.switch(1));
}

#[test]
fn common_event_call_resumes_parent_on_next_update() {
    let mut fixture = Fixture::new();
    fixture.add_common_event(common_event(
        2,
        CommonEventTrigger::None,
        0,
        r#"[
          {"code":122,"indent":0,"parameters":[1,1,0,0,7]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    ));
    let mut interpreter = start(
        r#"[
          {"code":117,"indent":0,"parameters":[2]},
          {"code":122,"indent":0,"parameters":[2,2,0,1,1]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );

    fixture.tick(&mut interpreter);
    assert_eq!(fixture.state.variable(1), 7);
    assert_eq!(fixture.state.variable(2), 0);
    assert!(interpreter.is_running());
    assert!(interpreter.child().is_none());
    assert_eq!(interpreter.cursor(), 1);

    fixture.tick(&mut interpreter);
    assert_eq!(fixture.state.variable(2), 7);
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
}

#[test]
fn waiting_child_holds_the_parent() {
    let mut fixture = Fixture::new();
    fixture.add_common_event(common_event(
        4,
        CommonEventTrigger::None,
        0,
        r#"[
          {"code":230,"indent":0,"parameters":[2]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    ));
    let mut interpreter = start(
        r#"[
          {"code":117,"indent":0,"parameters":[4]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );

    fixture.tick(&mut interpreter);
    let child = interpreter.child().expect("child should be running");
    assert_eq!(child.depth(), 1);
    assert_eq!(child.common_event_id(), Some(4));
    assert!(matches!(child.wait_mode(), Some(WaitMode::Ticks { .. })));
    assert_eq!(interpreter.innermost().depth(), 1);

    fixture.tick(&mut interpreter);
    assert!(interpreter.child().is_some());
    assert!(!fixture.state.switch(1));

    let ticks = fixture.run_to_end(&mut interpreter, 10);
    assert!(ticks >= 2);
    assert!(fixture.state.switch(1));
}

#[test]
fn missing_common_event_is_reported() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":117,"indent":0,"parameters":[99]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert!(fixture.state.switch(1));
    assert!(fixture
        .host
        .reports()
        .any(|report| *report == Report::MissingCommonEvent { common_event_id: 99 }));
}

#[test]
fn recursive_common_event_stops_at_depth_ceiling() {
    let mut fixture = Fixture::new();
    fixture.add_common_event(common_event(
        1,
        CommonEventTrigger::None,
        0,
        r#"[
          {"code":117,"indent":0,"parameters":[1]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    ));
    let mut interpreter = start(
        r#"[
          {"code":117,"indent":0,"parameters":[1]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );

    fixture.tick(&mut interpreter);
    assert!(interpreter.is_running());
    let overflow = fixture
        .host
        .reports()
        .find_map(|report| match report {
            Report::DepthOverflow { depth, .. } => Some(*depth),
            _ => None,
        })
        .expect("depth overflow should be reported");
    assert_eq!(overflow, DEFAULT_MAX_DEPTH);

    fixture.run_to_end(&mut interpreter, 200);
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
}

#[test]
fn wait_blocks_for_its_tick_count() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":230,"indent":0,"parameters":[3]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    for _ in 0..3 {
        fixture.tick(&mut interpreter);
        assert_eq!(interpreter.state(), InterpreterState::Waiting);
        assert_eq!(interpreter.cursor(), 0);
    }
    fixture.tick(&mut interpreter);
    assert!(fixture.state.switch(1));
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
}

#[test]
fn control_ranges_stop_at_the_range_cap() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":121,"indent":0,"parameters":[1,4294967295,0]},
          {"code":122,"indent":0,"parameters":[10,4294967295,0,0,2]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.tick(&mut interpreter);
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
    assert_eq!(fixture.state.switches.len(), ev_core::MAX_CONTROL_RANGE as usize);
    assert!(fixture.state.switch(ev_core::MAX_CONTROL_RANGE));
    assert!(!fixture.state.switch(ev_core::MAX_CONTROL_RANGE + 1));
    assert_eq!(fixture.state.variables.len(), ev_core::MAX_CONTROL_RANGE as usize);
    assert_eq!(fixture.state.variable(10), 2);
}

#[test]
fn message_wait_holds_the_cursor_until_the_window_closes() {
    let mut fixture = Fixture::with_host(HeadlessOptions {
        message_ticks: 3,
        ..HeadlessOptions::default()
    });
    let mut interpreter = start(
        r#"[
          {"code":101,"indent":0,"parameters":["",0,0,2]},
          {"code":401,"indent":0,"parameters":["Wait for me."]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    for _ in 0..3 {
        fixture.tick(&mut interpreter);
        assert_eq!(interpreter.state(), InterpreterState::Waiting);
        assert_eq!(interpreter.cursor(), 1);
        assert!(!fixture.state.switch(1));
    }
    fixture.tick(&mut interpreter);
    assert!(fixture.state.switch(1));
    assert_eq!(interpreter.state(), InterpreterState::Terminated);
    assert_eq!(interpreter.termination(), Some(Termination::Completed));
}

#[test]
fn freeze_guard_yields_and_carries_over() {
    let mut fixture = Fixture::new();
    let options = InterpreterOptions {
        freeze_limit: 50,
        ..test_options()
    };
    let mut interpreter = start_with(
        r#"[
          {"code":112,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[1,1,1,0,1]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":413,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
        options,
    );

    fixture.tick(&mut interpreter);
    let first = fixture.state.variable(1);
    assert!(first > 0);
    assert!(interpreter.is_running());
    assert!(fixture
        .host
        .reports()
        .any(|report| matches!(report, Report::FreezeGuard { commands: 50, .. })));

    fixture.tick(&mut interpreter);
    assert!(fixture.state.variable(1) > first);
}

#[test]
fn text_with_choices_routes_to_the_picked_branch() {
    let mut fixture = Fixture::with_host(HeadlessOptions {
        choices: vec![1],
        ..HeadlessOptions::default()
    });
    fixture.state.variables.insert(1, 5);
    let mut interpreter = start(
        r#"[
          {"code":101,"indent":0,"parameters":["",0,0,2]},
          {"code":401,"indent":0,"parameters":["Hello \\V[1]"]},
          {"code":102,"indent":0,"parameters":[["Yes","No"],1,0,2,0]},
          {"code":402,"indent":0,"parameters":[0,"Yes"]},
          {"code":122,"indent":1,"parameters":[2,2,0,0,1]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":402,"indent":0,"parameters":[1,"No"]},
          {"code":122,"indent":1,"parameters":[2,2,0,0,2]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":404,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );

    fixture.tick(&mut interpreter);
    assert_eq!(interpreter.cursor(), 2);
    assert!(matches!(
        interpreter.wait_mode(),
        Some(WaitMode::Message { input: Some(_) })
    ));

    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(2), 2);
    let message = fixture.host.messages().next().expect("message should be shown");
    assert_eq!(message.lines, vec!["Hello 5".to_string()]);
}

#[test]
fn cancel_branch_runs_when_the_choice_is_cancelled() {
    let mut fixture = Fixture::with_host(HeadlessOptions {
        choices: vec![-1],
        ..HeadlessOptions::default()
    });
    let mut interpreter = start(
        r#"[
          {"code":102,"indent":0,"parameters":[["A","B"],2,0,2,0]},
          {"code":402,"indent":0,"parameters":[0,"A"]},
          {"code":121,"indent":1,"parameters":[1,1,0]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":403,"indent":0,"parameters":[6,null]},
          {"code":121,"indent":1,"parameters":[2,2,0]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":404,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert!(!fixture.state.switch(1));
    assert!(fixture.state.switch(2));
}

#[test]
fn number_input_is_stored_on_resume() {
    let mut fixture = Fixture::with_host(HeadlessOptions {
        numbers: vec![1234],
        ..HeadlessOptions::default()
    });
    let mut interpreter = start(
        r#"[
          {"code":103,"indent":0,"parameters":[8,2]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.tick(&mut interpreter);
    assert_eq!(fixture.state.variable(8), 0);
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(8), 99);
}

#[test]
fn battle_result_selects_the_matching_branch() {
    let mut fixture = Fixture::with_host(HeadlessOptions {
        battle_results: vec![ev_core::BattleResult::Escape],
        ..HeadlessOptions::default()
    });
    fixture.database.troops.insert(
        1,
        Troop {
            id: 1,
            name: "Slimes".to_string(),
            pages: Vec::new(),
        },
    );
    let mut interpreter = start(
        r#"[
          {"code":301,"indent":0,"parameters":[0,1,true,false]},
          {"code":601,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[1,1,0,0,1]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":602,"indent":0,"parameters":[]},
          {"code":122,"indent":1,"parameters":[1,1,0,0,2]},
          {"code":0,"indent":1,"parameters":[]},
          {"code":604,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(1), 2);
    assert!(fixture.host.events().iter().any(|event| matches!(
        event,
        HostEvent::Scene {
            scene: SceneRequest::Battle { troop_id: 1, .. }
        }
    )));
}

#[test]
fn control_transfer_in_child_ends_the_parent() {
    let mut fixture = Fixture::new();
    fixture.add_common_event(common_event(
        3,
        CommonEventTrigger::None,
        0,
        r#"[
          {"code":354,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    ));
    let mut interpreter = start(
        r#"[
          {"code":117,"indent":0,"parameters":[3]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(interpreter.termination(), Some(Termination::ControlTransfer));
    assert!(!fixture.state.switch(1));
}

#[test]
fn abort_terminates_without_running_more_commands() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":230,"indent":0,"parameters":[5]},
          {"code":121,"indent":0,"parameters":[1,1,0]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.tick(&mut interpreter);
    interpreter.abort();
    assert_eq!(interpreter.termination(), Some(Termination::Aborted));
    assert!(interpreter.wait_mode().is_none());
    fixture.tick(&mut interpreter);
    assert!(!fixture.state.switch(1));
}

#[test]
fn self_switch_uses_the_running_event() {
    let mut fixture = Fixture::new();
    let mut interpreter = Interpreter::new(test_options());
    interpreter.setup(
        table_from_json(
            r#"[
              {"code":123,"indent":0,"parameters":["A",0]},
              {"code":111,"indent":0,"parameters":[2,"A",0]},
              {"code":121,"indent":1,"parameters":[1,1,0]},
              {"code":0,"indent":1,"parameters":[]},
              {"code":412,"indent":0,"parameters":[]},
              {"code":0,"indent":0,"parameters":[]}
            ]"#,
        ),
        EventOrigin::new(1, 7),
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert!(fixture
        .state
        .self_switch(&crate::state::SelfSwitchKey::new(1, 7, "A")));
    assert!(fixture.state.switch(1));
}

#[test]
fn fade_waits_for_the_fade_speed() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":221,"indent":0,"parameters":[]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    let ticks = fixture.run_to_end(&mut interpreter, 100);
    assert_eq!(ticks, DEFAULT_FADE_SPEED as usize + 1);
}

#[test]
fn script_command_joins_lines_and_writes_back() {
    let mut fixture = Fixture::new();
    let mut interpreter = start(
        r#"[
          {"code":355,"indent":0,"parameters":["variables[4] = 6;"]},
          {"code":655,"indent":0,"parameters":["variables[4] = variables[4] * 7;"]},
          {"code":355,"indent":0,"parameters":["this is not a script"]},
          {"code":0,"indent":0,"parameters":[]}
        ]"#,
    );
    fixture.run_to_end(&mut interpreter, 5);
    assert_eq!(fixture.state.variable(4), 42);
    assert!(fixture
        .host
        .reports()
        .any(|report| matches!(report, Report::ScriptFailed { index: 2, .. })));
}

#[test]
fn random_operand_is_seeded() {
    let source = r#"[
      {"code":122,"indent":0,"parameters":[1,3,0,2,1,6]},
      {"code":0,"indent":0,"parameters":[]}
    ]"#;
    let mut first = Fixture::new();
    let mut second = Fixture::new();
    first.run_to_end(&mut start(source), 5);
    second.run_to_end(&mut start(source), 5);
    let value = first.state.variable(1);
    assert!((1..=6).contains(&value));
    assert_eq!(first.state.variable(3), value);
    assert_eq!(second.state.variable(1), value);
}
