//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tower side. Blue is the human player, Red is the AI opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Player-facing name of this team's tower
    pub fn tower_label(self) -> &'static str {
        match self {
            Team::Blue => "your tower",
            Team::Red => "AI's tower",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Blue => write!(f, "blue"),
            Team::Red => write!(f, "red"),
        }
    }
}

/// The team that always attacks in the reference flow
pub const AI_TEAM: Team = Team::Red;

/// The team the human player controls
pub const PLAYER_TEAM: Team = Team::Blue;

/// Opaque identifier for an animated representation owned by the visual layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub Uuid);

impl VisualHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VisualHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic attack cycle counter; stale timer and task events carry an old id
pub type CycleId = u64;
