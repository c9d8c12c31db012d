use std::collections::{BTreeSet, VecDeque};

use ev_core::{
    ActorStat, CommonEventTrigger, EnemyStat, EventPage, EventTrigger, ItemKind, MapEvent,
    PageSpan, Troop, TroopConditions,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Context;
use crate::host::Report;
use crate::interpreter::{EventOrigin, Interpreter, InterpreterOptions};
use crate::state::{GameState, SelfSwitchKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ParallelSource {
    MapEvent { map_id: u32, event_id: u32 },
    CommonEvent { common_event_id: u32 },
}

#[derive(Debug, Clone)]
struct ParallelSlot {
    source: ParallelSource,
    page: usize,
    interpreter: Interpreter,
}

#[derive(Debug, Clone)]
struct BattleSlot {
    troop_id: u32,
    interpreter: Interpreter,
    page_flags: Vec<bool>,
}

/// Owns every interpreter of a running game and decides which script runs when.
#[derive(Debug, Clone)]
pub struct Scheduler {
    options: InterpreterOptions,
    map: Interpreter,
    reserved: VecDeque<u32>,
    starting: VecDeque<u32>,
    parallels: Vec<ParallelSlot>,
    battle: Option<BattleSlot>,
}

impl Scheduler {
    pub fn new(options: InterpreterOptions) -> Self {
        Self {
            options,
            map: Interpreter::new(options),
            reserved: VecDeque::new(),
            starting: VecDeque::new(),
            parallels: Vec::new(),
            battle: None,
        }
    }

    pub fn reserve_common_event(&mut self, common_event_id: u32) {
        self.reserved.push_back(common_event_id);
    }

    /// Queues a map event of the current map to run on the map interpreter.
    pub fn start_event(&mut self, event_id: u32) {
        if !self.starting.contains(&event_id) {
            self.starting.push_back(event_id);
        }
    }

    pub fn start_battle(&mut self, troop: &Troop) {
        debug!(troop_id = troop.id, "battle started");
        self.battle = Some(BattleSlot {
            troop_id: troop.id,
            interpreter: Interpreter::new(self.options),
            page_flags: vec![false; troop.pages.len()],
        });
    }

    /// Clears the flags of turn-span pages so they may fire again.
    pub fn end_turn(&mut self, ctx: &Context<'_>) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        let Some(troop) = ctx.database.troop(battle.troop_id) else {
            return;
        };
        for (flag, page) in battle.page_flags.iter_mut().zip(&troop.pages) {
            if page.span == PageSpan::Turn {
                *flag = false;
            }
        }
    }

    pub fn end_battle(&mut self) {
        if let Some(mut battle) = self.battle.take() {
            battle.interpreter.abort();
            debug!(troop_id = battle.troop_id, "battle ended");
        }
    }

    /// Cancels every live interpreter, as a map transfer or a scene change does.
    pub fn abort_all(&mut self) {
        self.map.abort();
        for slot in &mut self.parallels {
            slot.interpreter.abort();
        }
        self.parallels.clear();
        self.starting.clear();
        self.end_battle();
    }

    pub fn map_interpreter(&self) -> &Interpreter {
        &self.map
    }

    pub fn parallel_interpreters(&self) -> impl Iterator<Item = (ParallelSource, &Interpreter)> {
        self.parallels
            .iter()
            .map(|slot| (slot.source, &slot.interpreter))
    }

    pub fn battle_interpreter(&self) -> Option<&Interpreter> {
        self.battle.as_ref().map(|battle| &battle.interpreter)
    }

    /// True while the map interpreter runs or has queued work.
    pub fn is_map_busy(&self) -> bool {
        self.map.is_running() || !self.reserved.is_empty() || !self.starting.is_empty()
    }

    /// One tick: map interpreter, then parallels, or the battle interpreter while in battle.
    pub fn tick(&mut self, ctx: &mut Context<'_>) {
        if ctx.state.in_battle() {
            self.update_battle(ctx);
            return;
        }
        self.update_map(ctx);
        self.update_parallels(ctx);
    }

    fn update_map(&mut self, ctx: &mut Context<'_>) {
        let mut autorun_events = BTreeSet::new();
        let mut autorun_commons = BTreeSet::new();
        loop {
            self.map.update(ctx);
            if self.map.is_running() {
                return;
            }
            if !self.setup_starting(ctx, &mut autorun_events, &mut autorun_commons) {
                return;
            }
        }
    }

    fn setup_starting(
        &mut self,
        ctx: &mut Context<'_>,
        autorun_events: &mut BTreeSet<u32>,
        autorun_commons: &mut BTreeSet<u32>,
    ) -> bool {
        let map_id = ctx.state.map_id();
        if setup_reserved(&mut self.reserved, &mut self.map, map_id, ctx) {
            return true;
        }

        while let Some(event_id) = self.starting.pop_front() {
            let page = ctx
                .database
                .map_event(map_id, event_id)
                .and_then(|event| active_page(event, map_id, &*ctx.state));
            if let Some((_, page)) = page {
                debug!(map_id, event_id, "map event started");
                self.map
                    .setup(page.list.clone(), EventOrigin::new(map_id, event_id));
                return true;
            }
        }

        if let Some(map) = ctx.database.map(map_id) {
            for event in map.events.values() {
                if autorun_events.contains(&event.id) {
                    continue;
                }
                let Some((_, page)) = active_page(event, map_id, &*ctx.state) else {
                    continue;
                };
                if page.trigger == EventTrigger::Autorun && !page.list.is_empty() {
                    autorun_events.insert(event.id);
                    debug!(map_id, event_id = event.id, "autorun map event started");
                    self.map
                        .setup(page.list.clone(), EventOrigin::new(map_id, event.id));
                    return true;
                }
            }
        }

        let autorun = ctx
            .database
            .common_events_with_trigger(CommonEventTrigger::Autorun)
            .find(|event| !autorun_commons.contains(&event.id) && ctx.state.switch(event.switch_id));
        if let Some(event) = autorun {
            autorun_commons.insert(event.id);
            debug!(common_event_id = event.id, "autorun common event started");
            self.map.setup_common_event(
                event.list.clone(),
                EventOrigin::new(map_id, 0),
                event.id,
            );
            return true;
        }
        false
    }

    fn update_parallels(&mut self, ctx: &mut Context<'_>) {
        let map_id = ctx.state.map_id();
        let mut wanted = Vec::new();
        if let Some(map) = ctx.database.map(map_id) {
            for event in map.events.values() {
                if let Some((page_index, page)) = active_page(event, map_id, &*ctx.state) {
                    if page.trigger == EventTrigger::Parallel {
                        let source = ParallelSource::MapEvent {
                            map_id,
                            event_id: event.id,
                        };
                        wanted.push((source, page_index));
                    }
                }
            }
        }
        for event in ctx
            .database
            .common_events_with_trigger(CommonEventTrigger::Parallel)
        {
            if ctx.state.switch(event.switch_id) {
                let source = ParallelSource::CommonEvent {
                    common_event_id: event.id,
                };
                wanted.push((source, 0));
            }
        }

        let mut previous = std::mem::take(&mut self.parallels);
        for (source, page) in wanted {
            let kept = previous
                .iter()
                .position(|slot| slot.source == source && slot.page == page)
                .map(|index| previous.swap_remove(index));
            self.parallels.push(kept.unwrap_or_else(|| ParallelSlot {
                source,
                page,
                interpreter: Interpreter::new(self.options),
            }));
        }
        for mut dropped in previous {
            dropped.interpreter.abort();
        }

        for slot in &mut self.parallels {
            if !slot.interpreter.is_running() {
                restart_parallel(slot, ctx);
            }
            slot.interpreter.update(ctx);
        }
    }

    fn update_battle(&mut self, ctx: &mut Context<'_>) {
        let Some(mut battle) = self.battle.take() else {
            return;
        };
        if !battle.interpreter.is_running() {
            let map_id = ctx.state.map_id();
            if !setup_reserved(&mut self.reserved, &mut battle.interpreter, map_id, ctx) {
                if let Some(troop) = ctx.database.troop(battle.troop_id) {
                    let page = troop.pages.iter().enumerate().find(|(index, page)| {
                        !battle.page_flags.get(*index).copied().unwrap_or(true)
                            && troop_conditions_met(&page.conditions, &*ctx.state)
                    });
                    if let Some((index, page)) = page {
                        if page.span != PageSpan::Moment {
                            if let Some(flag) = battle.page_flags.get_mut(index) {
                                *flag = true;
                            }
                        }
                        debug!(troop_id = troop.id, page = index, "troop page started");
                        battle
                            .interpreter
                            .setup(page.list.clone(), EventOrigin::new(map_id, 0));
                    }
                }
            }
        }
        battle.interpreter.update(ctx);
        self.battle = Some(battle);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(InterpreterOptions::default())
    }
}

/// Sets up the next reserved common event on `interpreter`; unknown ids are reported and dropped.
fn setup_reserved(
    reserved: &mut VecDeque<u32>,
    interpreter: &mut Interpreter,
    map_id: u32,
    ctx: &mut Context<'_>,
) -> bool {
    while let Some(common_event_id) = reserved.pop_front() {
        match ctx.database.common_event(common_event_id) {
            Some(event) => {
                debug!(common_event_id, "reserved common event started");
                interpreter.setup_common_event(
                    event.list.clone(),
                    EventOrigin::new(map_id, 0),
                    common_event_id,
                );
                return true;
            }
            None => ctx
                .host
                .report(Report::MissingCommonEvent { common_event_id }),
        }
    }
    false
}

fn restart_parallel(slot: &mut ParallelSlot, ctx: &Context<'_>) {
    match slot.source {
        ParallelSource::MapEvent { map_id, event_id } => {
            let page = ctx
                .database
                .map_event(map_id, event_id)
                .and_then(|event| event.pages.get(slot.page));
            if let Some(page) = page {
                slot.interpreter
                    .setup(page.list.clone(), EventOrigin::new(map_id, event_id));
            }
        }
        ParallelSource::CommonEvent { common_event_id } => {
            if let Some(event) = ctx.database.common_event(common_event_id) {
                slot.interpreter.setup_common_event(
                    event.list.clone(),
                    EventOrigin::new(ctx.state.map_id(), 0),
                    common_event_id,
                );
            }
        }
    }
}

/// The last page whose conditions all hold.
pub fn active_page<'a>(
    event: &'a MapEvent,
    map_id: u32,
    state: &dyn GameState,
) -> Option<(usize, &'a EventPage)> {
    event
        .pages
        .iter()
        .enumerate()
        .rev()
        .find(|(_, page)| page_conditions_met(page, map_id, event.id, state))
}

fn page_conditions_met(page: &EventPage, map_id: u32, event_id: u32, state: &dyn GameState) -> bool {
    let conditions = &page.conditions;
    if conditions.switch1.is_some_and(|id| !state.switch(id)) {
        return false;
    }
    if conditions.switch2.is_some_and(|id| !state.switch(id)) {
        return false;
    }
    if conditions
        .variable
        .is_some_and(|(id, value)| state.variable(id) < value)
    {
        return false;
    }
    if let Some(letter) = &conditions.self_switch {
        let key = SelfSwitchKey::new(map_id, event_id, letter.as_str());
        if !state.self_switch(&key) {
            return false;
        }
    }
    if conditions
        .item
        .is_some_and(|id| state.item_count(ItemKind::Item, id) <= 0)
    {
        return false;
    }
    if conditions
        .actor
        .is_some_and(|id| !state.party_members().contains(&id))
    {
        return false;
    }
    true
}

/// Troop page conditions. A page without any condition never fires.
pub fn troop_conditions_met(conditions: &TroopConditions, state: &dyn GameState) -> bool {
    if conditions.is_empty() {
        return false;
    }
    if conditions.turn_ending && !state.is_turn_end() {
        return false;
    }
    if let Some((a, b)) = conditions.turn {
        let turn = state.battle_turn();
        if b == 0 && turn != a {
            return false;
        }
        if b > 0 && (turn < 1 || turn < a || turn % b != a % b) {
            return false;
        }
    }
    if let Some((index, percent)) = conditions.enemy_hp {
        if index >= state.troop_size() {
            return false;
        }
        let hp = state.enemy_stat(index, EnemyStat::Hp);
        let max = state.enemy_stat(index, EnemyStat::Param(0));
        if above_percent(hp, max, percent) {
            return false;
        }
    }
    if let Some((actor_id, percent)) = conditions.actor_hp {
        if !state.actor_exists(actor_id) {
            return false;
        }
        let hp = state.actor_stat(actor_id, ActorStat::Hp);
        let max = state.actor_stat(actor_id, ActorStat::Param(0));
        if above_percent(hp, max, percent) {
            return false;
        }
    }
    if conditions.switch_id.is_some_and(|id| !state.switch(id)) {
        return false;
    }
    true
}

fn above_percent(hp: i64, max: i64, percent: i64) -> bool {
    if max <= 0 {
        return false;
    }
    hp.saturating_mul(100) > percent.saturating_mul(max)
}
