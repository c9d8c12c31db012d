use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::CommandTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommonEventTrigger {
    #[default]
    None,
    Autorun,
    Parallel,
}

impl CommonEventTrigger {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Autorun,
            2 => Self::Parallel,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonEvent {
    pub id: u32,
    pub name: String,
    pub trigger: CommonEventTrigger,
    pub switch_id: u32,
    pub list: CommandTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSpan {
    #[default]
    Battle,
    Turn,
    Moment,
}

impl PageSpan {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Turn,
            2 => Self::Moment,
            _ => Self::Battle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TroopConditions {
    pub turn_ending: bool,
    /// `(a, b)`: fires on turn `a + b * n`.
    pub turn: Option<(i64, i64)>,
    /// `(member index, hp percent)`.
    pub enemy_hp: Option<(u32, i64)>,
    /// `(actor id, hp percent)`.
    pub actor_hp: Option<(u32, i64)>,
    pub switch_id: Option<u32>,
}

impl TroopConditions {
    pub fn is_empty(&self) -> bool {
        !self.turn_ending
            && self.turn.is_none()
            && self.enemy_hp.is_none()
            && self.actor_hp.is_none()
            && self.switch_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TroopPage {
    pub conditions: TroopConditions,
    pub span: PageSpan,
    pub list: CommandTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Troop {
    pub id: u32,
    pub name: String,
    pub pages: Vec<TroopPage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTrigger {
    #[default]
    ActionButton,
    PlayerTouch,
    EventTouch,
    Autorun,
    Parallel,
}

impl EventTrigger {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::PlayerTouch,
            2 => Self::EventTouch,
            3 => Self::Autorun,
            4 => Self::Parallel,
            _ => Self::ActionButton,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConditions {
    pub switch1: Option<u32>,
    pub switch2: Option<u32>,
    /// `(variable id, minimum value)`.
    pub variable: Option<(u32, i64)>,
    pub self_switch: Option<String>,
    pub item: Option<u32>,
    pub actor: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub conditions: PageConditions,
    pub trigger: EventTrigger,
    pub list: CommandTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEvent {
    pub id: u32,
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub pages: Vec<EventPage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub id: u32,
    pub events: BTreeMap<u32, MapEvent>,
}

/// Read-only content the interpreters query: common events, troops and maps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub common_events: BTreeMap<u32, CommonEvent>,
    pub troops: BTreeMap<u32, Troop>,
    pub maps: BTreeMap<u32, MapData>,
}

impl Database {
    pub fn common_event(&self, id: u32) -> Option<&CommonEvent> {
        self.common_events.get(&id)
    }

    pub fn troop(&self, id: u32) -> Option<&Troop> {
        self.troops.get(&id)
    }

    pub fn map(&self, id: u32) -> Option<&MapData> {
        self.maps.get(&id)
    }

    pub fn map_event(&self, map_id: u32, event_id: u32) -> Option<&MapEvent> {
        self.maps.get(&map_id)?.events.get(&event_id)
    }

    pub fn common_events_with_trigger(
        &self,
        trigger: CommonEventTrigger,
    ) -> impl Iterator<Item = &CommonEvent> {
        self.common_events
            .values()
            .filter(move |event| event.trigger == trigger)
    }
}

#[cfg(test)]
mod database_tests {
    use super::*;

    fn common_event(id: u32, trigger: CommonEventTrigger) -> CommonEvent {
        CommonEvent {
            id,
            name: format!("ce{id}"),
            trigger,
            switch_id: 1,
            list: CommandTable::default(),
        }
    }

    #[test]
    fn trigger_codes_map_to_variants() {
        assert_eq!(CommonEventTrigger::from_code(1), CommonEventTrigger::Autorun);
        assert_eq!(CommonEventTrigger::from_code(9), CommonEventTrigger::None);
        assert_eq!(EventTrigger::from_code(4), EventTrigger::Parallel);
        assert_eq!(PageSpan::from_code(1), PageSpan::Turn);
    }

    #[test]
    fn lookups_and_trigger_filter() {
        let mut database = Database::default();
        database
            .common_events
            .insert(1, common_event(1, CommonEventTrigger::None));
        database
            .common_events
            .insert(2, common_event(2, CommonEventTrigger::Parallel));
        database
            .common_events
            .insert(3, common_event(3, CommonEventTrigger::Parallel));
        let parallel = database
            .common_events_with_trigger(CommonEventTrigger::Parallel)
            .map(|event| event.id)
            .collect::<Vec<_>>();
        assert_eq!(parallel, vec![2, 3]);
        assert!(database.common_event(1).is_some());
        assert!(database.map_event(1, 1).is_none());
        assert!(TroopConditions::default().is_empty());
    }
}
