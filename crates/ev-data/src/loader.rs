use std::collections::BTreeMap;
use std::path::Path;

use ev_core::{
    CommonEvent, CommonEventTrigger, Database, EventError, EventPage, EventTrigger, MapData,
    MapEvent, PageConditions, PageSpan, RawCommand, Troop, TroopConditions, TroopPage,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::decode::decode_table;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommonEventFile {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    trigger: i64,
    #[serde(default)]
    switch_id: u32,
    #[serde(default)]
    list: Vec<RawCommand>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TroopConditionsFile {
    turn_ending: bool,
    turn_valid: bool,
    turn_a: i64,
    turn_b: i64,
    enemy_valid: bool,
    enemy_index: u32,
    enemy_hp: i64,
    actor_valid: bool,
    actor_id: u32,
    actor_hp: i64,
    switch_valid: bool,
    switch_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TroopPageFile {
    #[serde(default)]
    conditions: TroopConditionsFile,
    #[serde(default)]
    span: i64,
    #[serde(default)]
    list: Vec<RawCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TroopFile {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    pages: Vec<TroopPageFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PageConditionsFile {
    switch1_valid: bool,
    switch1_id: u32,
    switch2_valid: bool,
    switch2_id: u32,
    variable_valid: bool,
    variable_id: u32,
    variable_value: i64,
    self_switch_valid: bool,
    self_switch_ch: String,
    item_valid: bool,
    item_id: u32,
    actor_valid: bool,
    actor_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPageFile {
    #[serde(default)]
    conditions: PageConditionsFile,
    #[serde(default)]
    trigger: i64,
    #[serde(default)]
    list: Vec<RawCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapEventFile {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: i64,
    #[serde(default)]
    y: i64,
    #[serde(default)]
    pages: Vec<EventPageFile>,
}

#[derive(Debug, Deserialize)]
struct MapFile {
    #[serde(default)]
    events: Vec<Option<MapEventFile>>,
}

/// Returns the map id encoded in a `MapNNN.json` file name.
pub fn map_id_from_file_name(file_name: &str) -> Option<u32> {
    let digits = file_name.strip_prefix("Map")?.strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Builds a database from `path -> JSON text`. Files other than `CommonEvents.json`,
/// `Troops.json` and `MapNNN.json` are ignored.
pub fn load_database_from_json_map(
    files: &BTreeMap<String, String>,
) -> Result<Database, EventError> {
    let mut database = Database::default();
    for (path, text) in files {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path.as_str());
        if file_name == "CommonEvents.json" {
            load_common_events(&mut database, path, text)?;
        } else if file_name == "Troops.json" {
            load_troops(&mut database, path, text)?;
        } else if let Some(map_id) = map_id_from_file_name(file_name) {
            let map = load_map(map_id, path, text)?;
            database.maps.insert(map_id, map);
        }
    }
    Ok(database)
}

fn parse_file<T: DeserializeOwned>(path: &str, text: &str) -> Result<T, EventError> {
    serde_json::from_str(text).map_err(|error| {
        EventError::new(
            "DATA_JSON_PARSE",
            format!("Failed to parse \"{}\": {}", path, error),
        )
    })
}

fn in_file(path: &str, context: String, error: EventError) -> EventError {
    EventError {
        code: error.code,
        message: format!("{} in {} ({}): {}", context, path, index_label(error.index), error.message),
        index: error.index,
    }
}

fn index_label(index: Option<usize>) -> String {
    index
        .map(|index| format!("command {}", index))
        .unwrap_or_else(|| "header".to_string())
}

fn load_common_events(
    database: &mut Database,
    path: &str,
    text: &str,
) -> Result<(), EventError> {
    let entries: Vec<Option<CommonEventFile>> = parse_file(path, text)?;
    for entry in entries.into_iter().flatten() {
        let list = decode_table(&entry.list)
            .map_err(|error| in_file(path, format!("common event {}", entry.id), error))?;
        database.common_events.insert(
            entry.id,
            CommonEvent {
                id: entry.id,
                name: entry.name,
                trigger: CommonEventTrigger::from_code(entry.trigger),
                switch_id: entry.switch_id,
                list,
            },
        );
    }
    Ok(())
}

fn load_troops(database: &mut Database, path: &str, text: &str) -> Result<(), EventError> {
    let entries: Vec<Option<TroopFile>> = parse_file(path, text)?;
    for entry in entries.into_iter().flatten() {
        let mut pages = Vec::with_capacity(entry.pages.len());
        for (page_index, page) in entry.pages.into_iter().enumerate() {
            let list = decode_table(&page.list).map_err(|error| {
                in_file(path, format!("troop {} page {}", entry.id, page_index + 1), error)
            })?;
            pages.push(TroopPage {
                conditions: troop_conditions(&page.conditions),
                span: PageSpan::from_code(page.span),
                list,
            });
        }
        database.troops.insert(
            entry.id,
            Troop {
                id: entry.id,
                name: entry.name,
                pages,
            },
        );
    }
    Ok(())
}

fn troop_conditions(file: &TroopConditionsFile) -> TroopConditions {
    TroopConditions {
        turn_ending: file.turn_ending,
        turn: file.turn_valid.then_some((file.turn_a, file.turn_b)),
        enemy_hp: file.enemy_valid.then_some((file.enemy_index, file.enemy_hp)),
        actor_hp: file.actor_valid.then_some((file.actor_id, file.actor_hp)),
        switch_id: file.switch_valid.then_some(file.switch_id),
    }
}

fn load_map(map_id: u32, path: &str, text: &str) -> Result<MapData, EventError> {
    let file: MapFile = parse_file(path, text)?;
    let mut events = BTreeMap::new();
    for entry in file.events.into_iter().flatten() {
        let mut pages = Vec::with_capacity(entry.pages.len());
        for (page_index, page) in entry.pages.into_iter().enumerate() {
            let list = decode_table(&page.list).map_err(|error| {
                in_file(path, format!("event {} page {}", entry.id, page_index + 1), error)
            })?;
            pages.push(EventPage {
                conditions: page_conditions(page.conditions),
                trigger: EventTrigger::from_code(page.trigger),
                list,
            });
        }
        events.insert(
            entry.id,
            MapEvent {
                id: entry.id,
                name: entry.name,
                x: entry.x,
                y: entry.y,
                pages,
            },
        );
    }
    Ok(MapData { id: map_id, events })
}

fn page_conditions(file: PageConditionsFile) -> PageConditions {
    PageConditions {
        switch1: file.switch1_valid.then_some(file.switch1_id),
        switch2: file.switch2_valid.then_some(file.switch2_id),
        variable: file
            .variable_valid
            .then_some((file.variable_id, file.variable_value)),
        self_switch: file.self_switch_valid.then_some(file.self_switch_ch),
        item: file.item_valid.then_some(file.item_id),
        actor: file.actor_valid.then_some(file.actor_id),
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use ev_core::CommandKind;

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(path, text)| ((*path).to_string(), (*text).to_string()))
            .collect()
    }

    #[test]
    fn map_id_from_file_name_requires_digits() {
        assert_eq!(map_id_from_file_name("Map001.json"), Some(1));
        assert_eq!(map_id_from_file_name("Map120.json"), Some(120));
        assert_eq!(map_id_from_file_name("MapInfos.json"), None);
        assert_eq!(map_id_from_file_name("Map.json"), None);
        assert_eq!(map_id_from_file_name("Troops.json"), None);
    }

    #[test]
    fn loads_common_events_troops_and_maps() {
        let database = load_database_from_json_map(&files(&[
            (
                "data/CommonEvents.json",
                r#"[null,{"id":1,"name":"Hello","trigger":2,"switchId":4,"list":[{"code":230,"indent":0,"parameters":[5]},{"code":0,"indent":0,"parameters":[]}]}]"#,
            ),
            (
                "data/Troops.json",
                r#"[null,{"id":1,"name":"Slimes","pages":[{"conditions":{"turnValid":true,"turnA":1,"turnB":0},"span":1,"list":[{"code":0,"indent":0,"parameters":[]}]}]}]"#,
            ),
            (
                "data/Map002.json",
                r#"{"events":[null,{"id":1,"name":"NPC","x":3,"y":4,"pages":[{"conditions":{"switch1Valid":true,"switch1Id":2,"selfSwitchValid":true,"selfSwitchCh":"A"},"trigger":3,"list":[{"code":0,"indent":0,"parameters":[]}]}]},null]}"#,
            ),
            ("data/System.json", r#"{"gameTitle":"ignored"}"#),
        ]))
        .expect("database should load");

        let common = database.common_event(1).expect("common event 1 should exist");
        assert_eq!(common.trigger, CommonEventTrigger::Parallel);
        assert_eq!(common.switch_id, 4);
        assert!(matches!(
            common.list.commands()[0].kind,
            CommandKind::Wait { duration: 5 }
        ));

        let troop = database.troop(1).expect("troop 1 should exist");
        assert_eq!(troop.pages[0].span, PageSpan::Turn);
        assert_eq!(troop.pages[0].conditions.turn, Some((1, 0)));
        assert_eq!(troop.pages[0].conditions.switch_id, None);

        let event = database.map_event(2, 1).expect("map event should exist");
        assert_eq!(event.pages[0].trigger, EventTrigger::Autorun);
        assert_eq!(event.pages[0].conditions.switch1, Some(2));
        assert_eq!(event.pages[0].conditions.self_switch.as_deref(), Some("A"));
        assert_eq!(database.map(2).map(|map| map.id), Some(2));
    }

    #[test]
    fn reports_parse_and_decode_failures_with_file_context() {
        let parse = load_database_from_json_map(&files(&[("CommonEvents.json", "[")]))
            .expect_err("broken json should fail");
        assert_eq!(parse.code, "DATA_JSON_PARSE");

        let decode = load_database_from_json_map(&files(&[(
            "CommonEvents.json",
            r#"[null,{"id":3,"list":[{"code":0,"indent":0},{"code":121,"indent":0,"parameters":[1]}]}]"#,
        )]))
        .expect_err("bad parameters should fail");
        assert_eq!(decode.code, "DATA_PARAM");
        assert_eq!(decode.index, Some(1));
        assert!(decode.message.contains("common event 3"));
    }
}
