use ev_core::BattleResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    Condition(bool),
    Choice(i32),
    Battle(BattleResult),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct IndentEntry {
    outcome: Option<BranchOutcome>,
    loop_start: Option<usize>,
}

/// Per-indent bookkeeping of the block openers that govern deeper commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchState {
    entries: Vec<IndentEntry>,
}

impl BranchState {
    pub fn outcome(&self, indent: usize) -> Option<BranchOutcome> {
        self.entries.get(indent).and_then(|entry| entry.outcome)
    }

    pub fn set_outcome(&mut self, indent: usize, outcome: BranchOutcome) {
        self.entry_mut(indent).outcome = Some(outcome);
    }

    pub fn loop_start(&self, indent: usize) -> Option<usize> {
        self.entries.get(indent).and_then(|entry| entry.loop_start)
    }

    pub fn set_loop_start(&mut self, indent: usize, start: usize) {
        self.entry_mut(indent).loop_start = Some(start);
    }

    /// Drops every entry deeper than `indent`. The only way entries are discarded.
    pub fn ascend(&mut self, indent: usize) {
        self.entries.truncate(indent + 1);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    fn entry_mut(&mut self, indent: usize) -> &mut IndentEntry {
        if self.entries.len() <= indent {
            self.entries.resize(indent + 1, IndentEntry::default());
        }
        &mut self.entries[indent]
    }
}
