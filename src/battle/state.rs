//! Match state owned by the orchestrator
//!
//! Only `BattleOrchestrator` mutates this; everything else reads through the
//! accessors.

use std::time::Duration;

use serde::Serialize;

use crate::core::types::{CycleId, Team, VisualHandle};

/// Where the current cycle stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattlePhase {
    Idle,
    AiAttacking,
    Resolving,
    Applying,
    Cooldown,
    GameOver,
}

/// The attack currently being defended against
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAttack {
    pub concept: String,
    pub team: Team,
    pub visual: VisualHandle,
}

/// Tower health for both sides, never below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TowerHealth {
    pub blue: u32,
    pub red: u32,
}

impl TowerHealth {
    pub fn new(starting: u32) -> Self {
        Self {
            blue: starting,
            red: starting,
        }
    }

    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue,
            Team::Red => self.red,
        }
    }

    /// Subtract `amount` from `team`'s tower, returning the damage actually applied
    pub fn damage(&mut self, team: Team, amount: u32) -> u32 {
        let health = match team {
            Team::Blue => &mut self.blue,
            Team::Red => &mut self.red,
        };
        let applied = amount.min(*health);
        *health -= applied;
        applied
    }

    /// Team whose tower still stands once the other has fallen
    pub fn survivor(&self) -> Option<Team> {
        match (self.blue, self.red) {
            (0, 0) => None,
            (0, _) => Some(Team::Red),
            (_, 0) => Some(Team::Blue),
            _ => None,
        }
    }

    pub fn any_destroyed(&self) -> bool {
        self.blue == 0 || self.red == 0
    }
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) phase: BattlePhase,
    pub(crate) cycle: CycleId,
    pub(crate) is_processing: bool,
    pub(crate) ai_attacking: bool,
    pub(crate) current_active_attack: Option<ActiveAttack>,
    pub(crate) current_defense: Option<String>,
    pub(crate) response_time_remaining: Duration,
    pub(crate) response_window: Duration,
    pub(crate) health: TowerHealth,
    pub(crate) active_visuals: Vec<VisualHandle>,
}

impl MatchState {
    pub fn new(starting_health: u32) -> Self {
        Self {
            phase: BattlePhase::Idle,
            cycle: 0,
            is_processing: false,
            ai_attacking: false,
            current_active_attack: None,
            current_defense: None,
            response_time_remaining: Duration::ZERO,
            response_window: Duration::ZERO,
            health: TowerHealth::new(starting_health),
            active_visuals: Vec::new(),
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn ai_attacking(&self) -> bool {
        self.ai_attacking
    }

    pub fn current_active_attack(&self) -> Option<&ActiveAttack> {
        self.current_active_attack.as_ref()
    }

    pub fn current_defense(&self) -> Option<&str> {
        self.current_defense.as_deref()
    }

    pub fn response_time_remaining(&self) -> Duration {
        self.response_time_remaining
    }

    pub fn response_window(&self) -> Duration {
        self.response_window
    }

    pub fn health(&self) -> TowerHealth {
        self.health
    }

    pub fn active_visuals(&self) -> &[VisualHandle] {
        &self.active_visuals
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == BattlePhase::GameOver
    }

    /// Start a new cycle around `attack`. Returns the new cycle id.
    pub(crate) fn begin_attack(&mut self, attack: ActiveAttack) -> CycleId {
        self.cycle += 1;
        self.phase = BattlePhase::AiAttacking;
        self.ai_attacking = true;
        self.active_visuals.push(attack.visual);
        self.current_active_attack = Some(attack);
        self.current_defense = None;
        self.response_time_remaining = Duration::ZERO;
        self.cycle
    }

    /// Clear every per-cycle field, handing back the visuals still in flight
    pub(crate) fn reset_cycle(&mut self) -> Vec<VisualHandle> {
        self.is_processing = false;
        self.ai_attacking = false;
        self.current_active_attack = None;
        self.current_defense = None;
        self.response_time_remaining = Duration::ZERO;
        std::mem::take(&mut self.active_visuals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack() -> ActiveAttack {
        ActiveAttack {
            concept: "Fire".into(),
            team: Team::Red,
            visual: VisualHandle::new(),
        }
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut health = TowerHealth::new(15);
        assert_eq!(health.damage(Team::Blue, 20), 15);
        assert_eq!(health.get(Team::Blue), 0);
        assert_eq!(health.get(Team::Red), 15);
        assert_eq!(health.damage(Team::Blue, 5), 0);
        assert_eq!(health.survivor(), Some(Team::Red));
    }

    #[test]
    fn test_survivor_requires_a_fallen_tower() {
        let mut health = TowerHealth::new(30);
        assert_eq!(health.survivor(), None);
        assert!(!health.any_destroyed());
        health.damage(Team::Red, 30);
        health.damage(Team::Blue, 30);
        assert_eq!(health.survivor(), None);
        assert!(health.any_destroyed());
    }

    #[test]
    fn test_begin_and_reset_cycle() {
        let mut state = MatchState::new(100);
        let attack = attack();
        let visual = attack.visual;

        assert_eq!(state.begin_attack(attack), 1);
        assert!(state.ai_attacking());
        assert_eq!(state.phase(), BattlePhase::AiAttacking);
        assert!(state.current_active_attack().is_some());

        state.is_processing = true;
        state.current_defense = Some("Water".into());
        let drained = state.reset_cycle();

        assert_eq!(drained, vec![visual]);
        assert!(!state.is_processing());
        assert!(!state.ai_attacking());
        assert!(state.current_active_attack().is_none());
        assert!(state.current_defense().is_none());
        assert!(state.active_visuals().is_empty());
    }
}
