//! Battle flow - AI attacks, player defends, a judge decides
//!
//! One attack cycle at a time:
//! - The AI sends a concept walking toward the player's tower
//! - The player has a fixed window to type a defending concept
//! - The clash is judged by the reasoning service and damage applied
//! - After a cooldown (or a tutorial lesson) the next attack starts

pub mod catalog;
pub mod constants;
pub mod history;
pub mod hooks;
pub mod motion;
pub mod orchestrator;
pub mod outcome;
pub mod resolver;
pub mod state;
pub mod timer;
pub mod tutorial;

// Re-exports for convenient access
pub use catalog::{CatalogEntry, ConceptCatalog, FALLBACK_CONCEPTS};
pub use constants::*;
pub use history::{BattleHistory, HistoryEntry};
pub use hooks::{BattleHooks, ConceptStatus, NoopHooks};
pub use motion::{JoinOutcome, MotionJoin, MotionRecord, MotionSet};
pub use orchestrator::{result_message, BattleCommand, BattleEvent, BattleOrchestrator, BattleSender};
pub use outcome::{CollisionKind, OutcomeKind, OutcomeResult, TutorialOverride, Winner};
pub use resolver::OutcomeResolver;
pub use state::{ActiveAttack, BattlePhase, MatchState, TowerHealth};
pub use timer::{ResponseTimer, TimerHandle};
pub use tutorial::{
    BannerKind, TutorialAdvance, TutorialBanner, TutorialController, TutorialPhase, TutorialStep,
    TUTORIAL_STEPS,
};
