//! Visual and UI collaborator interface
//!
//! The orchestrator calls these at each step of a cycle. Every method has a
//! no-op default so a front end implements only what it can show.

use std::time::Duration;

use crate::battle::history::HistoryEntry;
use crate::battle::motion::MotionRecord;
use crate::battle::outcome::{CollisionKind, OutcomeKind};
use crate::battle::tutorial::TutorialBanner;
use crate::core::types::{Team, VisualHandle};

/// How a concept label should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptStatus {
    Attacking,
    Defending,
}

#[allow(unused_variables)]
pub trait BattleHooks: Send + Sync {
    /// AI is choosing its concept
    fn show_ai_thinking(&self, team: Team) {}

    /// Start a walker toward the middle of the arena
    fn spawn_approaching(&self, concept: &str, team: Team, walk: Duration) -> VisualHandle {
        VisualHandle::new()
    }

    fn show_concept_label(&self, concept: &str, team: Team, status: ConceptStatus) {}

    fn show_message(&self, text: &str, team: Team) {}

    /// Judge's explanation for the last clash
    fn show_reasoning(&self, text: &str) {}

    fn update_timer(&self, remaining: Duration, total: Duration) {}

    fn hide_timer(&self) {}

    /// Walkers to intercept; complete (or drop) each record on arrival
    fn begin_interception(&self, motions: Vec<MotionRecord>) {}

    fn play_collision(
        &self,
        attacker: VisualHandle,
        defender: VisualHandle,
        outcome: OutcomeKind,
        kind: CollisionKind,
    ) {
    }

    /// Undefended attack reached `team`'s tower
    fn play_direct_hit(&self, team: Team) {}

    fn release_visual(&self, visual: VisualHandle) {}

    /// `delta` is negative for damage
    fn update_health(&self, team: Team, delta: i32, health: u32) {}

    fn clear_inputs(&self) {}

    fn disable_input(&self, team: Team, disabled: bool) {}

    fn show_tutorial_banner(&self, banner: &TutorialBanner) {}

    fn set_paused(&self, paused: bool) {}

    fn history_appended(&self, entry: &HistoryEntry) {}

    fn game_over(&self, winner: Option<Team>) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl BattleHooks for NoopHooks {}
