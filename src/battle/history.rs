//! Battle history log

use std::collections::VecDeque;

use serde::Serialize;

use crate::battle::constants::MAX_HISTORY_ENTRIES;
use crate::core::types::CycleId;

/// One finished attack cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub cycle: CycleId,
    pub attack: String,
    pub defend: String,
    pub explanation: String,
    /// Player-facing result line
    pub result: String,
    pub damage: u32,
}

/// Last `MAX_HISTORY_ENTRIES` cycles, oldest first
#[derive(Debug, Clone)]
pub struct BattleHistory {
    entries: VecDeque<HistoryEntry>,
}

impl BattleHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_HISTORY_ENTRIES),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl Default for BattleHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cycle: CycleId) -> HistoryEntry {
        HistoryEntry {
            cycle,
            attack: "Fire".into(),
            defend: "Water".into(),
            explanation: "Water douses fire.".into(),
            result: "✨ Blocked!".into(),
            damage: 30,
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = BattleHistory::new();
        for cycle in 0..(MAX_HISTORY_ENTRIES as u64 + 7) {
            history.push(entry(cycle));
        }
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.iter().next().map(|e| e.cycle), Some(7));
        assert_eq!(history.latest().map(|e| e.cycle), Some(MAX_HISTORY_ENTRIES as u64 + 6));
    }

    #[test]
    fn test_empty_history() {
        let history = BattleHistory::default();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
