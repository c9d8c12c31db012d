use std::collections::BTreeMap;

use ev_api::EventEntry;
use ev_core::BattleResult;
use ev_runtime::SceneRequest;
use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "ev-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    pub entry: EventEntry,
    /// Answers for choice windows, consumed in order.
    #[serde(default)]
    pub choices: Vec<i32>,
    #[serde(default)]
    pub numbers: Vec<i64>,
    #[serde(default)]
    pub battle_results: Vec<BattleResult>,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
    #[serde(default)]
    pub expected_switches: BTreeMap<u32, bool>,
    #[serde(default)]
    pub expected_variables: BTreeMap<u32, i64>,
}

fn default_max_ticks() -> usize {
    5_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    Text { text: String },
    Choices { choices: Vec<String> },
    Scene { scene: SceneRequest },
    End,
}
