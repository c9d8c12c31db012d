use std::collections::{BTreeMap, BTreeSet};

use ev_core::{AccessKind, ActorStat, EnemyStat, ItemKind, OtherData};
use serde::{Deserialize, Serialize};

use crate::state::{CharacterId, GameState, SelfSwitchKey};

const MAX_GOLD: i64 = 99_999_999;
const MAX_ITEMS: i64 = 99;
const MAX_LEVEL: i64 = 99;
const MAX_TP: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorRecord {
    pub name: String,
    pub class_id: u32,
    pub level: i64,
    pub exp: i64,
    pub hp: i64,
    pub mp: i64,
    pub tp: i64,
    /// Max HP, max MP, attack, defense, magic attack, magic defense, agility, luck.
    pub params: [i64; 8],
    pub skills: BTreeSet<u32>,
    pub weapons: Vec<u32>,
    pub armors: Vec<u32>,
    pub states: BTreeSet<u32>,
}

impl Default for ActorRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            class_id: 1,
            level: 1,
            exp: 0,
            hp: 100,
            mp: 20,
            tp: 0,
            params: [100, 20, 10, 10, 10, 10, 10, 10],
            skills: BTreeSet::new(),
            weapons: Vec::new(),
            armors: Vec::new(),
            states: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnemyRecord {
    pub hp: i64,
    pub mp: i64,
    pub tp: i64,
    pub params: [i64; 8],
    pub hidden: bool,
    pub states: BTreeSet<u32>,
}

impl Default for EnemyRecord {
    fn default() -> Self {
        Self {
            hp: 100,
            mp: 0,
            tp: 0,
            params: [100, 0, 10, 10, 10, 10, 10, 10],
            hidden: false,
            states: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRecord {
    pub x: i64,
    pub y: i64,
    pub direction: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessFlags {
    pub save: bool,
    pub menu: bool,
    pub encounter: bool,
    pub formation: bool,
}

impl Default for AccessFlags {
    fn default() -> Self {
        Self {
            save: true,
            menu: true,
            encounter: true,
            formation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Counters {
    pub steps: i64,
    pub play_time: i64,
    pub save_count: i64,
    pub battle_count: i64,
    pub win_count: i64,
    pub escape_count: i64,
}

/// Plain in-memory store. Serializes to the JSON shape the CLI reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryGameState {
    pub map_id: u32,
    pub switches: BTreeMap<u32, bool>,
    pub variables: BTreeMap<u32, i64>,
    /// Keyed by `"map,event,letter"`.
    pub self_switches: BTreeMap<String, bool>,
    pub gold: i64,
    pub items: BTreeMap<u32, i64>,
    pub weapons: BTreeMap<u32, i64>,
    pub armors: BTreeMap<u32, i64>,
    pub party: Vec<u32>,
    pub actors: BTreeMap<u32, ActorRecord>,
    pub troop: Vec<EnemyRecord>,
    pub player: CharacterRecord,
    pub events: BTreeMap<u32, CharacterRecord>,
    pub vehicle: Option<u32>,
    /// Remaining frames while the timer runs.
    pub timer: Option<i64>,
    pub access: AccessFlags,
    pub counters: Counters,
    pub encounter_troop: u32,
    pub in_battle: bool,
    pub battle_turn: i64,
    pub turn_ending: bool,
}

impl MemoryGameState {
    pub fn new(map_id: u32) -> Self {
        Self {
            map_id,
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, actor_id: u32, record: ActorRecord, in_party: bool) -> Self {
        self.actors.insert(actor_id, record);
        if in_party && !self.party.contains(&actor_id) {
            self.party.push(actor_id);
        }
        self
    }

    fn items_of(&self, kind: ItemKind) -> &BTreeMap<u32, i64> {
        match kind {
            ItemKind::Item => &self.items,
            ItemKind::Weapon => &self.weapons,
            ItemKind::Armor => &self.armors,
        }
    }

    fn items_of_mut(&mut self, kind: ItemKind) -> &mut BTreeMap<u32, i64> {
        match kind {
            ItemKind::Item => &mut self.items,
            ItemKind::Weapon => &mut self.weapons,
            ItemKind::Armor => &mut self.armors,
        }
    }

    fn character(&self, character: CharacterId) -> Option<&CharacterRecord> {
        match character {
            CharacterId::Player => Some(&self.player),
            CharacterId::Event(id) => self.events.get(&id),
        }
    }

    fn enemy(&self, index: u32) -> Option<&EnemyRecord> {
        self.troop.get(index as usize)
    }

    fn enemy_mut(&mut self, index: u32) -> Option<&mut EnemyRecord> {
        self.troop.get_mut(index as usize)
    }

    /// Removes one equipped copy of the item from any party member.
    fn discard_equipped(&mut self, kind: ItemKind, item_id: u32) -> bool {
        for actor_id in self.party.clone() {
            let Some(actor) = self.actors.get_mut(&actor_id) else {
                continue;
            };
            let slots = match kind {
                ItemKind::Weapon => &mut actor.weapons,
                ItemKind::Armor => &mut actor.armors,
                ItemKind::Item => continue,
            };
            if let Some(position) = slots.iter().position(|&id| id == item_id) {
                slots.remove(position);
                return true;
            }
        }
        false
    }
}

fn stat_of(actor: &ActorRecord, stat: ActorStat) -> i64 {
    match stat {
        ActorStat::Level => actor.level,
        ActorStat::Exp => actor.exp,
        ActorStat::Hp => actor.hp,
        ActorStat::Mp => actor.mp,
        ActorStat::Tp => actor.tp,
        ActorStat::Param(index) => actor.params.get(index as usize).copied().unwrap_or(0),
    }
}

impl GameState for MemoryGameState {
    fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    fn set_switch(&mut self, id: u32, value: bool) {
        if id > 0 {
            self.switches.insert(id, value);
        }
    }

    fn variable(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    fn set_variable(&mut self, id: u32, value: i64) {
        if id > 0 {
            self.variables.insert(id, value);
        }
    }

    fn self_switch(&self, key: &SelfSwitchKey) -> bool {
        self.self_switches
            .get(&key.to_string())
            .copied()
            .unwrap_or(false)
    }

    fn set_self_switch(&mut self, key: SelfSwitchKey, value: bool) {
        let key = key.to_string();
        if value {
            self.self_switches.insert(key, true);
        } else {
            self.self_switches.remove(&key);
        }
    }

    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn timer_seconds(&self) -> Option<i64> {
        self.timer.map(|frames| frames / 60)
    }

    fn start_timer(&mut self, frames: i64) {
        self.timer = Some(frames.max(0));
    }

    fn stop_timer(&mut self) {
        self.timer = None;
    }

    fn gold(&self) -> i64 {
        self.gold
    }

    fn gain_gold(&mut self, amount: i64) {
        self.gold = self.gold.saturating_add(amount).clamp(0, MAX_GOLD);
    }

    fn item_count(&self, kind: ItemKind, item_id: u32) -> i64 {
        self.items_of(kind).get(&item_id).copied().unwrap_or(0)
    }

    fn gain_item(&mut self, kind: ItemKind, item_id: u32, amount: i64, include_equip: bool) {
        let held = self.item_count(kind, item_id);
        let next = held.saturating_add(amount);
        let stored = next.clamp(0, MAX_ITEMS);
        if stored == 0 {
            self.items_of_mut(kind).remove(&item_id);
        } else {
            self.items_of_mut(kind).insert(item_id, stored);
        }
        if include_equip && next < 0 {
            for _ in 0..next.unsigned_abs() {
                if !self.discard_equipped(kind, item_id) {
                    break;
                }
            }
        }
    }

    fn party_members(&self) -> Vec<u32> {
        self.party.clone()
    }

    fn add_actor(&mut self, actor_id: u32) {
        if !self.party.contains(&actor_id) {
            self.party.push(actor_id);
        }
    }

    fn remove_actor(&mut self, actor_id: u32) {
        self.party.retain(|&id| id != actor_id);
    }

    fn actor_exists(&self, actor_id: u32) -> bool {
        self.actors.contains_key(&actor_id)
    }

    fn setup_actor(&mut self, actor_id: u32) {
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            let name = std::mem::take(&mut actor.name);
            *actor = ActorRecord {
                name,
                ..ActorRecord::default()
            };
        }
    }

    fn actor_name(&self, actor_id: u32) -> Option<String> {
        self.actors.get(&actor_id).map(|actor| actor.name.clone())
    }

    fn set_actor_name(&mut self, actor_id: u32, name: &str) {
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            actor.name = name.to_string();
        }
    }

    fn actor_class(&self, actor_id: u32) -> u32 {
        self.actors
            .get(&actor_id)
            .map(|actor| actor.class_id)
            .unwrap_or(0)
    }

    fn actor_has_skill(&self, actor_id: u32, skill_id: u32) -> bool {
        self.actors
            .get(&actor_id)
            .is_some_and(|actor| actor.skills.contains(&skill_id))
    }

    fn actor_has_equip(&self, actor_id: u32, kind: ItemKind, item_id: u32) -> bool {
        self.actors.get(&actor_id).is_some_and(|actor| match kind {
            ItemKind::Weapon => actor.weapons.contains(&item_id),
            ItemKind::Armor => actor.armors.contains(&item_id),
            ItemKind::Item => false,
        })
    }

    fn actor_has_state(&self, actor_id: u32, state_id: u32) -> bool {
        self.actors
            .get(&actor_id)
            .is_some_and(|actor| actor.states.contains(&state_id))
    }

    fn actor_stat(&self, actor_id: u32, stat: ActorStat) -> i64 {
        self.actors
            .get(&actor_id)
            .map(|actor| stat_of(actor, stat))
            .unwrap_or(0)
    }

    fn set_actor_stat(&mut self, actor_id: u32, stat: ActorStat, value: i64) {
        let Some(actor) = self.actors.get_mut(&actor_id) else {
            return;
        };
        match stat {
            ActorStat::Level => actor.level = value.clamp(1, MAX_LEVEL),
            ActorStat::Exp => actor.exp = value.max(0),
            ActorStat::Hp => actor.hp = value.clamp(0, actor.params[0]),
            ActorStat::Mp => actor.mp = value.clamp(0, actor.params[1]),
            ActorStat::Tp => actor.tp = value.clamp(0, MAX_TP),
            ActorStat::Param(index) => {
                if let Some(slot) = actor.params.get_mut(index as usize) {
                    *slot = value;
                }
            }
        }
    }

    fn change_actor_state(&mut self, actor_id: u32, state_id: u32, add: bool) {
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            if add {
                actor.states.insert(state_id);
            } else {
                actor.states.remove(&state_id);
            }
        }
    }

    fn recover_actor(&mut self, actor_id: u32) {
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            actor.hp = actor.params[0];
            actor.mp = actor.params[1];
            actor.states.clear();
        }
    }

    fn troop_size(&self) -> u32 {
        self.troop.len() as u32
    }

    fn enemy_alive(&self, index: u32) -> bool {
        self.enemy(index)
            .is_some_and(|enemy| !enemy.hidden && enemy.hp > 0)
    }

    fn enemy_has_state(&self, index: u32, state_id: u32) -> bool {
        self.enemy(index)
            .is_some_and(|enemy| enemy.states.contains(&state_id))
    }

    fn enemy_stat(&self, index: u32, stat: EnemyStat) -> i64 {
        let Some(enemy) = self.enemy(index) else {
            return 0;
        };
        match stat {
            EnemyStat::Hp => enemy.hp,
            EnemyStat::Mp => enemy.mp,
            EnemyStat::Tp => enemy.tp,
            EnemyStat::Param(slot) => enemy.params.get(slot as usize).copied().unwrap_or(0),
        }
    }

    fn set_enemy_hp(&mut self, index: u32, hp: i64) {
        if let Some(enemy) = self.enemy_mut(index) {
            enemy.hp = hp.clamp(0, enemy.params[0]);
        }
    }

    fn recover_enemy(&mut self, index: u32) {
        if let Some(enemy) = self.enemy_mut(index) {
            enemy.hp = enemy.params[0];
            enemy.mp = enemy.params[1];
            enemy.states.clear();
        }
    }

    fn appear_enemy(&mut self, index: u32) {
        if let Some(enemy) = self.enemy_mut(index) {
            enemy.hidden = false;
        }
    }

    fn character_position(&self, character: CharacterId) -> Option<(i64, i64)> {
        self.character(character).map(|record| (record.x, record.y))
    }

    fn character_direction(&self, character: CharacterId) -> Option<u32> {
        self.character(character).map(|record| record.direction)
    }

    fn vehicle_driving(&self, vehicle_id: u32) -> bool {
        self.vehicle == Some(vehicle_id)
    }

    fn access_enabled(&self, access: AccessKind) -> bool {
        match access {
            AccessKind::Save => self.access.save,
            AccessKind::Menu => self.access.menu,
            AccessKind::Encounter => self.access.encounter,
            AccessKind::Formation => self.access.formation,
        }
    }

    fn set_access(&mut self, access: AccessKind, enabled: bool) {
        match access {
            AccessKind::Save => self.access.save = enabled,
            AccessKind::Menu => self.access.menu = enabled,
            AccessKind::Encounter => self.access.encounter = enabled,
            AccessKind::Formation => self.access.formation = enabled,
        }
    }

    fn counter(&self, data: OtherData) -> i64 {
        match data {
            OtherData::Steps => self.counters.steps,
            OtherData::PlayTime => self.counters.play_time,
            OtherData::SaveCount => self.counters.save_count,
            OtherData::BattleCount => self.counters.battle_count,
            OtherData::WinCount => self.counters.win_count,
            OtherData::EscapeCount => self.counters.escape_count,
            OtherData::MapId => i64::from(self.map_id),
            OtherData::PartySize => self.party.len() as i64,
            OtherData::Gold => self.gold,
            OtherData::Timer => self.timer_seconds().unwrap_or(0),
        }
    }

    fn encounter_troop_id(&self) -> u32 {
        self.encounter_troop
    }

    fn in_battle(&self) -> bool {
        self.in_battle
    }

    fn battle_turn(&self) -> i64 {
        self.battle_turn
    }

    fn is_turn_end(&self) -> bool {
        self.turn_ending
    }
}
