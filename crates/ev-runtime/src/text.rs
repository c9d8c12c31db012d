use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::state::GameState;

const LITERAL_BACKSLASH: char = '\u{1b}';
const MAX_VARIABLE_PASSES: usize = 8;

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\\V\[(\d+)\]").expect("variable escape regex should compile"))
}

fn actor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\\N\[(\d+)\]").expect("actor escape regex should compile"))
}

fn party_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\\P\[(\d+)\]").expect("party escape regex should compile"))
}

fn id_of(captures: &Captures<'_>) -> u32 {
    captures[1].parse().unwrap_or(0)
}

/// Expands `\V[n]` (nested), `\N[n]`, `\P[n]` and `\\`. Other escapes pass through for the window.
pub fn expand_escapes(text: &str, state: &dyn GameState) -> String {
    let mut expanded = text.replace("\\\\", &LITERAL_BACKSLASH.to_string());

    for _ in 0..MAX_VARIABLE_PASSES {
        if !variable_pattern().is_match(&expanded) {
            break;
        }
        expanded = variable_pattern()
            .replace_all(&expanded, |captures: &Captures<'_>| {
                state.variable(id_of(captures)).to_string()
            })
            .into_owned();
    }

    expanded = actor_pattern()
        .replace_all(&expanded, |captures: &Captures<'_>| {
            state.actor_name(id_of(captures)).unwrap_or_default()
        })
        .into_owned();

    expanded = party_pattern()
        .replace_all(&expanded, |captures: &Captures<'_>| {
            let position = id_of(captures) as usize;
            position
                .checked_sub(1)
                .and_then(|index| state.party_members().get(index).copied())
                .and_then(|actor_id| state.actor_name(actor_id))
                .unwrap_or_default()
        })
        .into_owned();

    expanded.replace(LITERAL_BACKSLASH, "\\")
}

#[cfg(test)]
mod text_tests {
    use super::*;
    use crate::memory::{ActorRecord, MemoryGameState};

    fn named(name: &str) -> ActorRecord {
        ActorRecord {
            name: name.to_string(),
            ..ActorRecord::default()
        }
    }

    #[test]
    fn expands_variables_actors_and_party_members() {
        let mut state = MemoryGameState::new(1)
            .with_actor(1, named("Harold"), false)
            .with_actor(2, named("Therese"), true);
        state.variables.insert(1, 2);
        state.variables.insert(2, 40);
        let text = expand_escapes(r"\N[1] and \P[1] have \V[\V[1]] gold.", &state);
        assert_eq!(text, "Harold and Therese have 40 gold.");
    }

    #[test]
    fn keeps_escaped_backslashes_and_unknown_codes() {
        let state = MemoryGameState::new(1);
        let text = expand_escapes(r"\\V[1] \C[2]\v[3] \P[9]", &state);
        assert_eq!(text, r"\V[1] \C[2]0 ");
    }
}
