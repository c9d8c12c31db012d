use std::fmt;

use ev_core::{AccessKind, ActorStat, EnemyStat, ItemKind, OtherData};
use serde::{Deserialize, Serialize};

/// A character on the current map. The interpreter resolves command references to this
/// and re-resolves them on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CharacterId {
    Player,
    Event(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelfSwitchKey {
    pub map_id: u32,
    pub event_id: u32,
    pub letter: String,
}

impl SelfSwitchKey {
    pub fn new(map_id: u32, event_id: u32, letter: impl Into<String>) -> Self {
        Self {
            map_id,
            event_id,
            letter: letter.into(),
        }
    }

    /// Parses the `"map,event,letter"` form used by save data.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, ',');
        let map_id = parts.next()?.trim().parse().ok()?;
        let event_id = parts.next()?.trim().parse().ok()?;
        let letter = parts.next()?.trim();
        if letter.is_empty() {
            return None;
        }
        Some(Self::new(map_id, event_id, letter))
    }
}

impl fmt::Display for SelfSwitchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.map_id, self.event_id, self.letter)
    }
}

/// Mutable game data the interpreters read and write. Every access is id based, so
/// other interpreters may change anything between two calls.
pub trait GameState {
    fn switch(&self, id: u32) -> bool;
    fn set_switch(&mut self, id: u32, value: bool);
    fn variable(&self, id: u32) -> i64;
    fn set_variable(&mut self, id: u32, value: i64);
    fn self_switch(&self, key: &SelfSwitchKey) -> bool;
    fn set_self_switch(&mut self, key: SelfSwitchKey, value: bool);
    fn map_id(&self) -> u32;

    /// Remaining seconds while the timer runs.
    fn timer_seconds(&self) -> Option<i64> {
        None
    }
    fn start_timer(&mut self, _frames: i64) {}
    fn stop_timer(&mut self) {}

    fn gold(&self) -> i64 {
        0
    }
    fn gain_gold(&mut self, _amount: i64) {}
    fn item_count(&self, _kind: ItemKind, _item_id: u32) -> i64 {
        0
    }
    fn gain_item(&mut self, _kind: ItemKind, _item_id: u32, _amount: i64, _include_equip: bool) {}

    fn party_members(&self) -> Vec<u32> {
        Vec::new()
    }
    fn add_actor(&mut self, _actor_id: u32) {}
    fn remove_actor(&mut self, _actor_id: u32) {}

    fn actor_exists(&self, _actor_id: u32) -> bool {
        false
    }
    fn setup_actor(&mut self, _actor_id: u32) {}
    fn actor_name(&self, _actor_id: u32) -> Option<String> {
        None
    }
    fn set_actor_name(&mut self, _actor_id: u32, _name: &str) {}
    fn actor_class(&self, _actor_id: u32) -> u32 {
        0
    }
    fn actor_has_skill(&self, _actor_id: u32, _skill_id: u32) -> bool {
        false
    }
    fn actor_has_equip(&self, _actor_id: u32, _kind: ItemKind, _item_id: u32) -> bool {
        false
    }
    fn actor_has_state(&self, _actor_id: u32, _state_id: u32) -> bool {
        false
    }
    fn actor_stat(&self, _actor_id: u32, _stat: ActorStat) -> i64 {
        0
    }
    /// Writes HP, MP, TP, EXP or level; implementations clamp to their own limits.
    fn set_actor_stat(&mut self, _actor_id: u32, _stat: ActorStat, _value: i64) {}
    fn change_actor_state(&mut self, _actor_id: u32, _state_id: u32, _add: bool) {}
    fn recover_actor(&mut self, _actor_id: u32) {}

    fn troop_size(&self) -> u32 {
        0
    }
    fn enemy_alive(&self, _index: u32) -> bool {
        false
    }
    fn enemy_has_state(&self, _index: u32, _state_id: u32) -> bool {
        false
    }
    fn enemy_stat(&self, _index: u32, _stat: EnemyStat) -> i64 {
        0
    }
    fn set_enemy_hp(&mut self, _index: u32, _hp: i64) {}
    fn recover_enemy(&mut self, _index: u32) {}
    fn appear_enemy(&mut self, _index: u32) {}

    fn character_position(&self, _character: CharacterId) -> Option<(i64, i64)> {
        None
    }
    fn character_direction(&self, _character: CharacterId) -> Option<u32> {
        None
    }
    fn vehicle_driving(&self, _vehicle_id: u32) -> bool {
        false
    }

    fn access_enabled(&self, _access: AccessKind) -> bool {
        true
    }
    fn set_access(&mut self, _access: AccessKind, _enabled: bool) {}

    /// Counters of the "other" game data group that have no dedicated accessor.
    fn counter(&self, _data: OtherData) -> i64 {
        0
    }

    fn encounter_troop_id(&self) -> u32 {
        0
    }
    fn in_battle(&self) -> bool {
        false
    }
    fn battle_turn(&self) -> i64 {
        0
    }
    fn is_turn_end(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn self_switch_key_round_trips_through_text() {
        let key = SelfSwitchKey::new(3, 12, "B");
        assert_eq!(key.to_string(), "3,12,B");
        assert_eq!(SelfSwitchKey::parse("3,12,B"), Some(key));
        assert_eq!(SelfSwitchKey::parse("3,x,B"), None);
        assert_eq!(SelfSwitchKey::parse("3,1,"), None);
    }
}
