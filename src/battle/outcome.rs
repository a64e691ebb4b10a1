//! Outcome taxonomy for a single concept clash
//!
//! The five outcome kinds each fix who wins and which tower takes damage.
//! Whatever the reasoning service reports, `OutcomeResult` always carries the
//! flags its kind dictates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::constants::MAX_OUTCOME_DAMAGE;

/// Kind of interaction between an attacking and a defending concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Defender cleanly beats the attack
    DirectWin,
    /// Attack cleanly beats the defender
    DirectLoss,
    /// Defender's concept turns against itself
    BackfireWin,
    /// Concepts pass through each other
    NeutralNoDamage,
    /// Both sides are destroyed
    MutualDestruction,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        OutcomeKind::DirectWin,
        OutcomeKind::DirectLoss,
        OutcomeKind::BackfireWin,
        OutcomeKind::NeutralNoDamage,
        OutcomeKind::MutualDestruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::DirectWin => "direct_win",
            OutcomeKind::DirectLoss => "direct_loss",
            OutcomeKind::BackfireWin => "backfire_win",
            OutcomeKind::NeutralNoDamage => "neutral_no_damage",
            OutcomeKind::MutualDestruction => "mutual_destruction",
        }
    }

    /// Parse a wire name, tolerating case, spaces and dashes
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        Self::ALL.into_iter().find(|kind| kind.as_str() == normalized)
    }

    pub fn winner(&self) -> Winner {
        match self {
            OutcomeKind::DirectWin => Winner::Defender,
            OutcomeKind::DirectLoss | OutcomeKind::BackfireWin => Winner::Attacker,
            OutcomeKind::NeutralNoDamage | OutcomeKind::MutualDestruction => Winner::None,
        }
    }

    /// `(attacker_damage, defender_damage)` flags dictated by this kind
    pub fn damage_flags(&self) -> (u8, u8) {
        match self {
            OutcomeKind::DirectWin => (1, 0),
            OutcomeKind::DirectLoss | OutcomeKind::BackfireWin => (0, 1),
            OutcomeKind::NeutralNoDamage => (0, 0),
            OutcomeKind::MutualDestruction => (1, 1),
        }
    }

    pub fn collision(&self) -> CollisionKind {
        match self {
            OutcomeKind::DirectWin | OutcomeKind::DirectLoss => CollisionKind::CleanHit,
            OutcomeKind::BackfireWin => CollisionKind::BackfireAtDefender,
            OutcomeKind::NeutralNoDamage => CollisionKind::PassThrough,
            OutcomeKind::MutualDestruction => CollisionKind::SymmetricExplosion,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which role came out ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Attacker,
    Defender,
    None,
}

/// Visual treatment requested from the scene when the walkers meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    CleanHit,
    BackfireAtDefender,
    PassThrough,
    SymmetricExplosion,
}

/// Validated verdict for one attack cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResult {
    pub outcome_type: OutcomeKind,
    pub winner: Winner,
    pub attacker_damage: u8,
    pub defender_damage: u8,
    pub damage_amount: u32,
    pub explanation: String,
}

impl OutcomeResult {
    /// Build a result whose winner and flags follow from `kind`
    pub fn new(kind: OutcomeKind, damage_amount: u32, explanation: impl Into<String>) -> Self {
        let mut result = Self {
            outcome_type: kind,
            winner: kind.winner(),
            attacker_damage: 0,
            defender_damage: 0,
            damage_amount: damage_amount.min(MAX_OUTCOME_DAMAGE),
            explanation: explanation.into(),
        };
        result.enforce_mapping();
        result
    }

    /// Result used whenever resolution fails at any stage
    pub fn fallback(reason: &str) -> Self {
        Self::new(
            OutcomeKind::NeutralNoDamage,
            0,
            format!("The battle judge failed ({reason}); nobody takes damage."),
        )
    }

    /// Overwrite winner and flags with the ones fixed for `outcome_type`.
    /// Returns true if anything had to change.
    pub fn enforce_mapping(&mut self) -> bool {
        let (attacker, defender) = self.outcome_type.damage_flags();
        let winner = self.outcome_type.winner();
        let consistent = self.winner == winner
            && self.attacker_damage == attacker
            && self.defender_damage == defender;

        self.winner = winner;
        self.attacker_damage = attacker;
        self.defender_damage = defender;
        !consistent
    }

    /// Damage the attacker's tower takes
    pub fn attacker_loss(&self) -> u32 {
        u32::from(self.attacker_damage) * self.damage_amount
    }

    /// Damage the defender's tower takes
    pub fn defender_loss(&self) -> u32 {
        u32::from(self.defender_damage) * self.damage_amount
    }
}

/// Pre-baked verdict the tutorial supplies for its scripted counter
#[derive(Debug, Clone)]
pub struct TutorialOverride {
    /// Concept the hint told the player to type
    pub suggested_concept: String,
    /// Result returned without consulting the reasoning service
    pub outcome: OutcomeResult,
    /// Teaching context forwarded to the reasoning service when the player goes off-script
    pub hint_context: String,
}

impl TutorialOverride {
    /// Case-insensitive, whitespace-trimmed match against the suggested concept
    pub fn matches(&self, defender_concept: &str) -> bool {
        defender_concept.trim().to_lowercase() == self.suggested_concept.trim().to_lowercase()
    }
}
