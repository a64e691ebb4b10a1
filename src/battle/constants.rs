//! Battle flow constants - all tunable defaults in one place
//!
//! Durations are milliseconds. Every value here is the default of a field in
//! `ArenaConfig` and can be overridden from the config file.

// Response window
pub const RESPONSE_WINDOW_MS: u64 = 10_000;
pub const TUTORIAL_RESPONSE_WINDOW_MS: u64 = 20_000;
pub const TIMER_TICK_MS: u64 = 100;

// Cooldowns between cycles
pub const TIMEOUT_COOLDOWN_MS: u64 = 1_500;
// collision (1.5s) + impact wave (~0.8s) still animating when the buffer starts
pub const BATTLE_COOLDOWN_MS: u64 = 5_000;
pub const TUTORIAL_ADVANCE_DELAY_MS: u64 = 500;
pub const TUTORIAL_COMPLETE_DELAY_MS: u64 = 1_000;

// Walk animations
pub const WALK_DURATION_MS: u64 = 10_000;
pub const MOTION_JOIN_TIMEOUT_MS: u64 = 5_000;

// Health and damage
pub const MAX_HEALTH: u32 = 100;
pub const TIMEOUT_PENALTY: u32 = 20;
pub const MAX_OUTCOME_DAMAGE: u32 = 40;
// used when the judge names an outcome but no amount
pub const DEFAULT_OUTCOME_DAMAGE: u32 = 20;

// History
pub const MAX_HISTORY_ENTRIES: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tutorial_window_longer_than_normal() {
        assert!(TUTORIAL_RESPONSE_WINDOW_MS > RESPONSE_WINDOW_MS);
    }

    #[test]
    fn test_tick_fits_in_window() {
        assert!(TIMER_TICK_MS < RESPONSE_WINDOW_MS);
    }

    #[test]
    fn test_damage_bounds() {
        assert!(MAX_OUTCOME_DAMAGE <= MAX_HEALTH);
        assert!(TIMEOUT_PENALTY <= MAX_OUTCOME_DAMAGE);
    }
}
