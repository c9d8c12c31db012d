use ev_api::RunSummary;
use ev_runtime::{HostEvent, MessageInput};

use crate::json_line;

#[derive(Debug, Clone)]
pub(crate) struct RunReport {
    pub(crate) summary: RunSummary,
    pub(crate) events: Vec<HostEvent>,
}

/// Protocol lines for a finished run, in host event order.
pub(crate) fn run_report_lines(report: &RunReport, state_out: Option<&str>) -> Vec<String> {
    let mut lines = vec!["RESULT:OK".to_string()];
    lines.push(if report.summary.finished {
        "EVENT:END".to_string()
    } else {
        "EVENT:TIMEOUT".to_string()
    });
    lines.push(format!("TICKS:{}", report.summary.ticks));

    for event in &report.events {
        match event {
            HostEvent::Message { message, answer } => {
                if !message.lines.is_empty() {
                    lines.push(format!("TEXT_JSON:{}", json_line(&message.lines.join("\n"))));
                }
                if let Some(MessageInput::Choice(prompt)) = &message.input {
                    for (index, text) in prompt.choices.iter().enumerate() {
                        lines.push(format!("CHOICE:{}|{}", index, json_line(text)));
                    }
                }
                if let Some(answer) = answer {
                    lines.push(format!("ANSWER_JSON:{}", json_line(answer)));
                }
            }
            HostEvent::Request { request } => {
                lines.push(format!("REQUEST_JSON:{}", json_line(request)));
            }
            HostEvent::Scene { scene } => {
                lines.push(format!("SCENE_JSON:{}", json_line(scene)));
            }
            HostEvent::Plugin { command, args } => {
                lines.push(format!(
                    "PLUGIN_JSON:{}",
                    json_line(&serde_json::json!({ "command": command, "args": args }))
                ));
            }
            HostEvent::Report { report, repeats } => {
                lines.push(format!("REPORT_JSON:{}", json_line(report)));
                if *repeats > 0 {
                    lines.push(format!("REPORT_REPEATS:{}", repeats));
                }
            }
        }
    }

    lines.push(format!("STATE_OUT:{}", state_out.unwrap_or("NONE")));
    lines
}

pub(crate) fn emit_run_report(report: &RunReport, state_out: Option<&str>) {
    for line in run_report_lines(report, state_out) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod run_report_tests {
    use super::*;
    use ev_runtime::{ChoicePrompt, Message, MessageResult, Report, SceneRequest};

    #[test]
    fn lines_follow_host_event_order() {
        let report = RunReport {
            summary: RunSummary {
                ticks: 4,
                finished: true,
            },
            events: vec![
                HostEvent::Message {
                    message: Message {
                        lines: vec!["Hello".to_string(), "there".to_string()],
                        input: Some(MessageInput::Choice(ChoicePrompt {
                            choices: vec!["Yes".to_string(), "No".to_string()],
                            cancel_type: 1,
                            default_type: 0,
                            position: 2,
                            background: 0,
                        })),
                        ..Message::default()
                    },
                    answer: Some(MessageResult::Choice(1)),
                },
                HostEvent::Scene {
                    scene: SceneRequest::Save,
                },
                HostEvent::Report {
                    report: Report::StrayElse { index: 3 },
                    repeats: 2,
                },
            ],
        };

        let lines = run_report_lines(&report, None);
        assert_eq!(
            lines,
            vec![
                "RESULT:OK",
                "EVENT:END",
                "TICKS:4",
                "TEXT_JSON:\"Hello\\nthere\"",
                "CHOICE:0|\"Yes\"",
                "CHOICE:1|\"No\"",
                "ANSWER_JSON:{\"kind\":\"choice\",\"value\":1}",
                "SCENE_JSON:{\"kind\":\"save\"}",
                "REPORT_JSON:{\"kind\":\"strayElse\",\"index\":3}",
                "REPORT_REPEATS:2",
                "STATE_OUT:NONE",
            ]
        );
    }

    #[test]
    fn unfinished_runs_report_a_timeout() {
        let report = RunReport {
            summary: RunSummary {
                ticks: 10,
                finished: false,
            },
            events: Vec::new(),
        };
        let lines = run_report_lines(&report, Some("out.json"));
        assert_eq!(lines[1], "EVENT:TIMEOUT");
        assert_eq!(lines.last().map(String::as_str), Some("STATE_OUT:out.json"));
    }
}
