use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::OnceLock;

use ev_core::EventError;
use regex::{Captures, Regex};
use rhai::{Dynamic, Engine, EvalAltResult, Map, Position, Scope, INT};

use crate::rng::next_random_bounded;
use crate::state::{GameState, SelfSwitchKey};

const MAX_OPERATIONS: u64 = 100_000;
const SELF_SWITCH_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// What a script may touch: the store, the running event's identity and its generator.
pub(crate) struct ScriptEnv<'a> {
    pub(crate) state: &'a mut dyn GameState,
    pub(crate) map_id: u32,
    pub(crate) event_id: u32,
    pub(crate) rng_state: &'a mut u32,
}

fn indexed_access_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(switches|variables)\s*\[\s*(\d+)\s*\]")
            .expect("indexed access regex should compile")
    })
}

/// Rewrites literal `switches[n]` / `variables[n]` into string-keyed map access and
/// returns the ids referenced.
pub(crate) fn rewrite_indexed_access(source: &str) -> (String, BTreeSet<u32>, BTreeSet<u32>) {
    let mut switch_ids = BTreeSet::new();
    let mut variable_ids = BTreeSet::new();
    let rewritten = indexed_access_pattern()
        .replace_all(source, |captures: &Captures<'_>| {
            let name = &captures[1];
            let id = &captures[2];
            if let Ok(parsed) = id.parse::<u32>() {
                if name == "switches" {
                    switch_ids.insert(parsed);
                } else {
                    variable_ids.insert(parsed);
                }
            }
            format!("{}[\"{}\"]", name, id)
        })
        .into_owned();
    (rewritten, switch_ids, variable_ids)
}

pub(crate) fn evaluate(source: &str, env: ScriptEnv<'_>) -> Result<Dynamic, EventError> {
    let (rewritten, switch_ids, variable_ids) = rewrite_indexed_access(source);

    let mut switches = Map::new();
    for id in &switch_ids {
        switches.insert(id.to_string().into(), Dynamic::from(env.state.switch(*id)));
    }
    let mut variables = Map::new();
    for id in &variable_ids {
        variables.insert(
            id.to_string().into(),
            Dynamic::from(env.state.variable(*id) as INT),
        );
    }
    let mut self_switches = Map::new();
    if env.event_id > 0 {
        for letter in SELF_SWITCH_LETTERS {
            let key = SelfSwitchKey::new(env.map_id, env.event_id, letter);
            self_switches.insert(letter.into(), Dynamic::from(env.state.self_switch(&key)));
        }
    }

    let mut scope = Scope::new();
    scope.push("switches", switches);
    scope.push("variables", variables);
    scope.push("self_switches", self_switches);
    scope.push_constant("gold", env.state.gold() as INT);
    scope.push_constant("map_id", INT::from(env.map_id));
    scope.push_constant("event_id", INT::from(env.event_id));

    let mut engine = Engine::new();
    engine.set_strict_variables(true);
    engine.set_max_operations(MAX_OPERATIONS);

    let rng_state = Rc::new(RefCell::new(*env.rng_state));
    let rng_state_clone = Rc::clone(&rng_state);
    engine.register_fn(
        "random",
        move |bound: INT| -> Result<INT, Box<EvalAltResult>> {
            if bound <= 0 {
                return Err(Box::new(EvalAltResult::ErrorRuntime(
                    Dynamic::from("random(n) expects positive integer n."),
                    Position::NONE,
                )));
            }
            let bound = u32::try_from(bound).unwrap_or(u32::MAX);
            let mut state = rng_state_clone.borrow_mut();
            Ok(INT::from(next_random_bounded(&mut state, bound)))
        },
    );

    let result = engine
        .eval_with_scope::<Dynamic>(&mut scope, &rewritten)
        .map_err(|error| EventError::new("SCRIPT_EVAL", format!("Script failed: {}", error)));

    *env.rng_state = *rng_state.borrow();
    let value = result?;

    if let Some(after) = scope.get_value::<Map>("switches") {
        for (key, value) in after {
            if let (Ok(id), Ok(flag)) = (key.as_str().parse::<u32>(), value.as_bool()) {
                if env.state.switch(id) != flag {
                    env.state.set_switch(id, flag);
                }
            }
        }
    }
    if let Some(after) = scope.get_value::<Map>("variables") {
        for (key, value) in after {
            if let (Ok(id), Some(number)) = (key.as_str().parse::<u32>(), integer_of(&value)) {
                if env.state.variable(id) != number {
                    env.state.set_variable(id, number);
                }
            }
        }
    }
    if env.event_id > 0 {
        if let Some(after) = scope.get_value::<Map>("self_switches") {
            for (letter, value) in after {
                let Ok(flag) = value.as_bool() else {
                    continue;
                };
                let key = SelfSwitchKey::new(env.map_id, env.event_id, letter.as_str());
                if env.state.self_switch(&key) != flag {
                    env.state.set_self_switch(key, flag);
                }
            }
        }
    }

    Ok(value)
}

fn integer_of(value: &Dynamic) -> Option<i64> {
    if let Ok(number) = value.as_int() {
        return Some(number);
    }
    if let Ok(float) = value.as_float() {
        return Some(float.floor() as i64);
    }
    value.as_bool().ok().map(i64::from)
}

/// Truthiness used when a script decides a conditional branch.
pub(crate) fn truthy(value: &Dynamic) -> bool {
    if value.is_unit() {
        return false;
    }
    if let Ok(flag) = value.as_bool() {
        return flag;
    }
    if let Ok(number) = value.as_int() {
        return number != 0;
    }
    if let Ok(float) = value.as_float() {
        return float != 0.0;
    }
    if let Ok(text) = value.clone().into_immutable_string() {
        return !text.is_empty();
    }
    true
}

/// Number a script contributes to a variable operation; non-numbers count as zero.
pub(crate) fn integer(value: &Dynamic) -> i64 {
    integer_of(value).unwrap_or(0)
}

#[cfg(test)]
mod script_tests {
    use super::*;
    use crate::memory::MemoryGameState;

    fn run(source: &str, state: &mut MemoryGameState, event_id: u32) -> Result<Dynamic, EventError> {
        let mut rng = 7u32;
        evaluate(
            source,
            ScriptEnv {
                state,
                map_id: 1,
                event_id,
                rng_state: &mut rng,
            },
        )
    }

    #[test]
    fn rewrite_collects_literal_ids() {
        let (rewritten, switches, variables) =
            rewrite_indexed_access("switches[1] && variables[ 20 ] > switches[3]");
        assert_eq!(
            rewritten,
            r#"switches["1"] && variables["20"] > switches["3"]"#
        );
        assert_eq!(switches.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(variables.into_iter().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn expressions_read_store_values() {
        let mut state = MemoryGameState::new(1);
        state.switches.insert(2, true);
        state.variables.insert(5, 41);
        state.gold = 300;
        let value = run("switches[2] && variables[5] + 1 == 42 && gold >= 300", &mut state, 0)
            .expect("expression should evaluate");
        assert!(truthy(&value));
    }

    #[test]
    fn statements_write_back_switches_variables_and_self_switches() {
        let mut state = MemoryGameState::new(1);
        state.variables.insert(1, 10);
        let result = run(
            "variables[1] = variables[1] * 3; switches[4] = true; self_switches[\"B\"] = true;",
            &mut state,
            6,
        )
        .expect("statements should run");
        assert!(result.is_unit());
        assert_eq!(state.variable(1), 30);
        assert!(state.switch(4));
        assert!(state.self_switch(&SelfSwitchKey::new(1, 6, "B")));
    }

    #[test]
    fn random_is_bounded_and_failures_are_errors() {
        let mut state = MemoryGameState::new(1);
        let value = run("random(3)", &mut state, 0).expect("random should evaluate");
        assert!((0..3).contains(&integer(&value)));

        let error = run("random(0)", &mut state, 0).expect_err("zero bound should fail");
        assert_eq!(error.code, "SCRIPT_EVAL");
        let error = run("undefined_name + 1", &mut state, 0).expect_err("unknown name");
        assert_eq!(error.code, "SCRIPT_EVAL");
        let error = run("loop { }", &mut state, 0).expect_err("runaway loop");
        assert_eq!(error.code, "SCRIPT_EVAL");
    }

    #[test]
    fn truthiness_and_integer_conversion() {
        assert!(!truthy(&Dynamic::UNIT));
        assert!(truthy(&Dynamic::from(2 as INT)));
        assert!(!truthy(&Dynamic::from(String::new())));
        assert_eq!(integer(&Dynamic::from(2.7_f64)), 2);
        assert_eq!(integer(&Dynamic::from("x")), 0);
    }
}
