use std::path::Path;

use ev_api::{
    create_scheduler, load_project_from_json_map, run_headless, CreateSchedulerOptions,
    EventEntry,
};
use ev_runtime::{
    GameState, HeadlessHost, HeadlessOptions, HostEvent, InterpreterOptions, MemoryGameState,
    MessageInput,
};

use crate::source::{read_data_files_from_dir, read_test_case};
use crate::{EvToolError, ExpectedEvent, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub ticks: usize,
    pub state: MemoryGameState,
}

pub fn run_case(demo_dir: &Path, case: &TestCase) -> Result<RunReport, EvToolError> {
    let files = read_data_files_from_dir(demo_dir)?;
    let database = load_project_from_json_map(&files)?;
    let mut scheduler = create_scheduler(
        &database,
        CreateSchedulerOptions {
            entry: case.entry,
            interpreter: InterpreterOptions {
                random_seed: Some(1),
                ..InterpreterOptions::default()
            },
        },
    )?;

    let map_id = match case.entry {
        EventEntry::MapEvent(map_id, _) => map_id,
        EventEntry::CommonEvent(_) => 1,
    };
    let mut state = MemoryGameState::new(map_id);
    let mut host = HeadlessHost::new(HeadlessOptions {
        choices: case.choices.clone(),
        numbers: case.numbers.clone(),
        battle_results: case.battle_results.clone(),
        ..HeadlessOptions::default()
    });

    let summary = run_headless(&mut scheduler, &mut state, &mut host, &database, case.max_ticks);
    if !summary.finished {
        return Err(EvToolError::GuardExceeded {
            max_ticks: case.max_ticks,
        });
    }

    let mut observed_events = observe(host.events());
    observed_events.push(ExpectedEvent::End);
    Ok(RunReport {
        observed_events,
        ticks: summary.ticks,
        state,
    })
}

/// Text, choice and scene events in the order the host saw them.
fn observe(events: &[HostEvent]) -> Vec<ExpectedEvent> {
    let mut observed = Vec::new();
    for event in events {
        match event {
            HostEvent::Message { message, .. } => {
                if !message.lines.is_empty() {
                    observed.push(ExpectedEvent::Text {
                        text: message.lines.join("\n"),
                    });
                }
                if let Some(MessageInput::Choice(prompt)) = &message.input {
                    observed.push(ExpectedEvent::Choices {
                        choices: prompt.choices.clone(),
                    });
                }
            }
            HostEvent::Scene { scene } => observed.push(ExpectedEvent::Scene {
                scene: scene.clone(),
            }),
            HostEvent::Request { .. } | HostEvent::Plugin { .. } | HostEvent::Report { .. } => {}
        }
    }
    observed
}

pub fn assert_case(demo_dir: &Path, case_path: &Path) -> Result<(), EvToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(demo_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(EvToolError::EventSerialize)?;
        return Err(EvToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(EvToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(EvToolError::EventSerialize)?;
            return Err(EvToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    for (&id, &expected) in &case.expected_switches {
        let actual = report.state.switch(id);
        if actual != expected {
            return Err(EvToolError::SwitchMismatch {
                id,
                expected,
                actual,
            });
        }
    }

    for (&id, &expected) in &case.expected_variables {
        let actual = report.state.variable(id);
        if actual != expected {
            return Err(EvToolError::VariableMismatch {
                id,
                expected,
                actual,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("ev-tool-runner-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    fn write_common_events(root: &Path, list: &str) {
        write_file(
            &root.join("CommonEvents.json"),
            &format!(
                r#"[null,{{"id":1,"name":"main","trigger":0,"switchId":1,"list":{}}}]"#,
                list
            ),
        );
    }

    fn simple_case(expected_events: Vec<ExpectedEvent>) -> TestCase {
        TestCase {
            schema_version: crate::TESTCASE_SCHEMA_V1.to_string(),
            entry: EventEntry::CommonEvent(1),
            choices: Vec::new(),
            numbers: Vec::new(),
            battle_results: Vec::new(),
            max_ticks: 100,
            expected_events,
            expected_switches: BTreeMap::new(),
            expected_variables: BTreeMap::new(),
        }
    }

    const HELLO: &str = r#"[
        {"code":101,"indent":0,"parameters":["",0,0,2]},
        {"code":401,"indent":0,"parameters":["Hello"]},
        {"code":121,"indent":0,"parameters":[5,5,0]},
        {"code":0,"indent":0,"parameters":[]}
    ]"#;

    #[test]
    fn run_case_observes_text_and_end() {
        let root = temp_dir("text-only");
        write_common_events(&root, HELLO);

        let case = simple_case(vec![
            ExpectedEvent::Text {
                text: "Hello".to_string(),
            },
            ExpectedEvent::End,
        ]);
        let report = run_case(&root, &case).expect("run should pass");

        assert_eq!(report.observed_events, case.expected_events);
        assert!(report.state.switch(5));
    }

    #[test]
    fn run_case_feeds_scripted_choices() {
        let root = temp_dir("choices");
        write_common_events(
            &root,
            r#"[
                {"code":102,"indent":0,"parameters":[["A","B"],1,0,2,0]},
                {"code":402,"indent":0,"parameters":[0,"A"]},
                {"code":122,"indent":1,"parameters":[1,1,0,0,10]},
                {"code":0,"indent":1,"parameters":[]},
                {"code":402,"indent":0,"parameters":[1,"B"]},
                {"code":122,"indent":1,"parameters":[1,1,0,0,20]},
                {"code":0,"indent":1,"parameters":[]},
                {"code":404,"indent":0,"parameters":[]},
                {"code":0,"indent":0,"parameters":[]}
            ]"#,
        );

        let mut case = simple_case(vec![
            ExpectedEvent::Choices {
                choices: vec!["A".to_string(), "B".to_string()],
            },
            ExpectedEvent::End,
        ]);
        case.choices = vec![1];
        let report = run_case(&root, &case).expect("run should pass");
        assert_eq!(report.observed_events, case.expected_events);
        assert_eq!(report.state.variable(1), 20);
    }

    #[test]
    fn run_case_reports_guard_exceeded_and_project_errors() {
        let root = temp_dir("guard");
        write_common_events(
            &root,
            r#"[
                {"code":112,"indent":0,"parameters":[]},
                {"code":230,"indent":1,"parameters":[1]},
                {"code":0,"indent":1,"parameters":[]},
                {"code":413,"indent":0,"parameters":[]},
                {"code":0,"indent":0,"parameters":[]}
            ]"#,
        );
        let error = run_case(&root, &simple_case(vec![])).expect_err("guard should fail");
        assert!(matches!(error, EvToolError::GuardExceeded { max_ticks: 100 }));

        let mut missing = simple_case(vec![]);
        missing.entry = EventEntry::CommonEvent(9);
        let error = run_case(&root, &missing).expect_err("missing entry should fail");
        assert!(matches!(error, EvToolError::Project(_)));
    }

    #[test]
    fn assert_case_reports_count_value_and_state_mismatches() {
        let root = temp_dir("assert");
        write_common_events(&root, HELLO);

        let count_case = root.join("count.json");
        write_file(
            &count_case,
            r#"{
  "schemaVersion":"ev-tool-case.v1",
  "entry":{"commonEvent":1},
  "expectedEvents":[{"kind":"end"}]
}"#,
        );
        let count_error = assert_case(&root, &count_case).expect_err("count mismatch should fail");
        assert!(matches!(count_error, EvToolError::EventCountMismatch { .. }));

        let value_case = root.join("value.json");
        write_file(
            &value_case,
            r#"{
  "schemaVersion":"ev-tool-case.v1",
  "entry":{"commonEvent":1},
  "expectedEvents":[{"kind":"text","text":"Wrong"},{"kind":"end"}]
}"#,
        );
        let value_error = assert_case(&root, &value_case).expect_err("value mismatch should fail");
        assert!(matches!(value_error, EvToolError::EventMismatch { .. }));

        let switch_case = root.join("switch.json");
        write_file(
            &switch_case,
            r#"{
  "schemaVersion":"ev-tool-case.v1",
  "entry":{"commonEvent":1},
  "expectedEvents":[{"kind":"text","text":"Hello"},{"kind":"end"}],
  "expectedSwitches":{"5":false}
}"#,
        );
        let switch_error = assert_case(&root, &switch_case).expect_err("switch mismatch should fail");
        assert!(matches!(
            switch_error,
            EvToolError::SwitchMismatch { id: 5, expected: false, actual: true }
        ));
    }

    #[test]
    fn assert_case_passes_with_matching_expectations() {
        let root = temp_dir("assert-pass");
        write_common_events(&root, HELLO);

        let case_path = root.join("testcase.json");
        write_file(
            &case_path,
            r#"{
  "schemaVersion":"ev-tool-case.v1",
  "entry":{"commonEvent":1},
  "expectedEvents":[{"kind":"text","text":"Hello"},{"kind":"end"}],
  "expectedSwitches":{"5":true},
  "expectedVariables":{"1":0}
}"#,
        );

        assert_case(&root, &case_path).expect("assert should pass");
    }
}
