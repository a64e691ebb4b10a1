//! Match configuration with documented defaults
//!
//! Every timing and damage number the battle flow uses is collected here.
//! Values are loaded from a TOML file; any field left out keeps its default.

use crate::battle::constants::*;
use crate::core::error::{ArenaError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for a match
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub timing: TimingConfig,
    pub damage: DamageConfig,
    pub llm: LlmConfig,
    #[serde(rename = "match")]
    pub match_settings: MatchSettings,
}

/// Response windows, cooldowns and animation budgets
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time the player has to answer an AI attack outside the tutorial
    pub response_window_ms: u64,

    /// Extended answer window while the tutorial is teaching
    pub tutorial_response_window_ms: u64,

    /// Cadence of countdown updates pushed to the UI
    ///
    /// Only affects display smoothness; expiry is computed from an absolute
    /// deadline and does not drift with this value.
    pub tick_interval_ms: u64,

    /// Delay between an undefended hit and the next AI attack
    pub timeout_cooldown_ms: u64,

    /// Delay between a resolved battle and the next AI attack
    ///
    /// Sized so the collision and impact wave finish before a new attacker
    /// walks out of the tower.
    pub battle_cooldown_ms: u64,

    /// Delay before the next scripted attack once a lesson is acknowledged
    pub tutorial_advance_delay_ms: u64,

    /// Delay before the first free-play attack once the tutorial ends
    pub tutorial_complete_delay_ms: u64,

    /// How long the attacker takes to walk from its tower to the center
    pub walk_duration_ms: u64,

    /// Hard cap on waiting for both walkers to reach the center
    pub motion_join_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            response_window_ms: RESPONSE_WINDOW_MS,
            tutorial_response_window_ms: TUTORIAL_RESPONSE_WINDOW_MS,
            tick_interval_ms: TIMER_TICK_MS,
            timeout_cooldown_ms: TIMEOUT_COOLDOWN_MS,
            battle_cooldown_ms: BATTLE_COOLDOWN_MS,
            tutorial_advance_delay_ms: TUTORIAL_ADVANCE_DELAY_MS,
            tutorial_complete_delay_ms: TUTORIAL_COMPLETE_DELAY_MS,
            walk_duration_ms: WALK_DURATION_MS,
            motion_join_timeout_ms: MOTION_JOIN_TIMEOUT_MS,
        }
    }
}

impl TimingConfig {
    pub fn response_window(&self, tutorial: bool) -> Duration {
        if tutorial {
            Duration::from_millis(self.tutorial_response_window_ms)
        } else {
            Duration::from_millis(self.response_window_ms)
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn timeout_cooldown(&self) -> Duration {
        Duration::from_millis(self.timeout_cooldown_ms)
    }

    pub fn battle_cooldown(&self) -> Duration {
        Duration::from_millis(self.battle_cooldown_ms)
    }

    pub fn tutorial_advance_delay(&self) -> Duration {
        Duration::from_millis(self.tutorial_advance_delay_ms)
    }

    pub fn tutorial_complete_delay(&self) -> Duration {
        Duration::from_millis(self.tutorial_complete_delay_ms)
    }

    pub fn walk_duration(&self) -> Duration {
        Duration::from_millis(self.walk_duration_ms)
    }

    pub fn motion_join_timeout(&self) -> Duration {
        Duration::from_millis(self.motion_join_timeout_ms)
    }
}

/// Tower health and damage numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Health both towers start with
    pub starting_health: u32,

    /// Guaranteed damage when an attack goes undefended
    pub timeout_penalty: u32,

    /// Upper clamp for damage reported by the reasoning service
    pub max_damage: u32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            starting_health: MAX_HEALTH,
            timeout_penalty: TIMEOUT_PENALTY,
            max_damage: MAX_OUTCOME_DAMAGE,
        }
    }
}

/// How the reasoning endpoint expects its credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>` (OpenAI-compatible endpoints)
    Bearer,
    /// `api-key: <key>` (Azure-hosted deployments)
    ApiKey,
}

/// Reasoning service connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    /// Omitted from the request body when empty (deployment-scoped endpoints)
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub auth: AuthStyle,
    /// Environment variable holding the credential
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 200,
            temperature: 0.7,
            auth: AuthStyle::Bearer,
            api_key_env: "LLM_API_KEY".into(),
        }
    }
}

/// Match-level switches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Seed for the AI's concept picks; entropy when absent
    pub seed: Option<u64>,
    /// Run the scripted onboarding before free play
    pub tutorial: bool,
    /// Optional TOML concept catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            seed: None,
            tutorial: true,
            catalog_path: None,
        }
    }
}

impl ArenaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if t.response_window_ms == 0 || t.tutorial_response_window_ms == 0 {
            return Err(ArenaError::Config("response windows must be positive".into()));
        }

        if t.tick_interval_ms == 0 || t.tick_interval_ms >= t.response_window_ms {
            return Err(ArenaError::Config(format!(
                "tick_interval_ms ({}) must be positive and < response_window_ms ({})",
                t.tick_interval_ms, t.response_window_ms
            )));
        }

        let d = &self.damage;
        if d.starting_health == 0 || d.starting_health > MAX_HEALTH {
            return Err(ArenaError::Config(format!(
                "starting_health ({}) must be within 1..={}",
                d.starting_health, MAX_HEALTH
            )));
        }

        if d.max_damage > MAX_HEALTH {
            return Err(ArenaError::Config(format!(
                "max_damage ({}) cannot exceed {}",
                d.max_damage, MAX_HEALTH
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ArenaError::Config(format!(
                "temperature ({}) must be within [0, 2]",
                self.llm.temperature
            )));
        }

        Ok(())
    }
}
