pub mod config;
pub mod error;
pub mod types;

pub use config::ArenaConfig;
pub use error::{ArenaError, Result};
pub use types::{CycleId, Team, VisualHandle, AI_TEAM, PLAYER_TEAM};
