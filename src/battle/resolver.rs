//! Outcome resolution for a single clash
//!
//! `OutcomeResolver::resolve` never fails: scripted tutorial matches short-circuit,
//! everything else goes to the reasoning service, and any transport or parse
//! failure collapses into `OutcomeResult::fallback`.

use std::sync::Arc;

use serde_json::Value;

use crate::battle::constants::{DEFAULT_OUTCOME_DAMAGE, MAX_OUTCOME_DAMAGE};
use crate::battle::outcome::{OutcomeKind, OutcomeResult, TutorialOverride};
use crate::core::error::Result;
use crate::llm::client::ReasoningService;
use crate::llm::parser::{parse_verdict, RawVerdict};
use crate::llm::prompt::{BattlePrompt, JUDGE_SYSTEM_PROMPT};

pub struct OutcomeResolver {
    service: Arc<dyn ReasoningService>,
    max_damage: u32,
}

impl OutcomeResolver {
    /// `max_damage` can only tighten the built-in 40 point cap
    pub fn new(service: Arc<dyn ReasoningService>, max_damage: u32) -> Self {
        Self {
            service,
            max_damage: max_damage.min(MAX_OUTCOME_DAMAGE),
        }
    }

    /// Judge `attacker` against `defender`
    pub async fn resolve(
        &self,
        attacker: &str,
        defender: &str,
        tutorial: Option<&TutorialOverride>,
    ) -> OutcomeResult {
        if let Some(script) = tutorial {
            if script.matches(defender) {
                tracing::debug!("Tutorial counter '{}' matched, using scripted outcome", defender);
                let mut outcome = script.outcome.clone();
                outcome.damage_amount = outcome.damage_amount.min(self.max_damage);
                outcome.enforce_mapping();
                return outcome;
            }
        }

        match self.judge(attacker, defender, tutorial).await {
            Ok(outcome) => {
                tracing::info!(
                    "{} vs {} -> {} ({} dmg)",
                    attacker,
                    defender,
                    outcome.outcome_type,
                    outcome.damage_amount
                );
                outcome
            }
            Err(e) => {
                tracing::warn!("Outcome resolution failed, using fallback: {}", e);
                OutcomeResult::fallback(&e.to_string())
            }
        }
    }

    async fn judge(
        &self,
        attacker: &str,
        defender: &str,
        tutorial: Option<&TutorialOverride>,
    ) -> Result<OutcomeResult> {
        let mut prompt = BattlePrompt::new(attacker, defender);
        if let Some(script) = tutorial {
            prompt = prompt.with_tutorial_hint(&script.hint_context);
        }

        let response = self
            .service
            .complete(JUDGE_SYSTEM_PROMPT, &prompt.render())
            .await?;
        let raw = parse_verdict(&response)?;
        Ok(validate(raw, self.max_damage))
    }
}

/// Coerce a raw verdict into a well-formed result.
///
/// Unknown outcome names become `neutral_no_damage`; flags are coerced to 0/1
/// and then overridden by the fixed mapping; damage is clamped to `max_damage`.
pub fn validate(raw: RawVerdict, max_damage: u32) -> OutcomeResult {
    let kind = raw
        .outcome_type
        .as_deref()
        .and_then(OutcomeKind::parse)
        .unwrap_or_else(|| {
            tracing::debug!("Unknown outcome type {:?}, treating as neutral", raw.outcome_type);
            OutcomeKind::NeutralNoDamage
        });

    let damage_amount = raw
        .damage_amount
        .as_ref()
        .and_then(coerce_number)
        .map(|n| clamp_damage(n, max_damage))
        .unwrap_or(DEFAULT_OUTCOME_DAMAGE.min(max_damage));

    let explanation = raw
        .explanation
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "Analysis complete.".to_string());

    let mut outcome = OutcomeResult {
        outcome_type: kind,
        winner: kind.winner(),
        attacker_damage: raw.attacker_damage.as_ref().map_or(0, coerce_flag),
        defender_damage: raw.defender_damage.as_ref().map_or(0, coerce_flag),
        damage_amount,
        explanation,
    };

    if outcome.enforce_mapping() {
        tracing::debug!("Verdict flags inconsistent with {}, corrected", kind);
    }
    outcome
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn coerce_flag(value: &Value) -> u8 {
    match value {
        Value::Bool(b) => u8::from(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => 1,
        other => coerce_number(other).map_or(0, |n| u8::from(n > 0.0)),
    }
}

fn clamp_damage(n: f64, max_damage: u32) -> u32 {
    n.round().clamp(0.0, f64::from(max_damage)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::outcome::Winner;
    use crate::core::error::ArenaError;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(reason.to_string()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReasoningService for Canned {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(ArenaError::Llm)
        }
    }

    fn water_script() -> TutorialOverride {
        TutorialOverride {
            suggested_concept: "Water".into(),
            outcome: OutcomeResult::new(OutcomeKind::DirectWin, 30, "Water douses fire."),
            hint_context: "Fire is hot. Try WATER.".into(),
        }
    }

    #[tokio::test]
    async fn test_tutorial_match_skips_service() {
        let service = Canned::ok("OUTCOME: DEFEAT");
        let resolver = OutcomeResolver::new(service.clone(), 40);

        let outcome = resolver.resolve("Fire", "  wAtEr ", Some(&water_script())).await;

        assert_eq!(outcome.outcome_type, OutcomeKind::DirectWin);
        assert_eq!(outcome.damage_amount, 30);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_off_script_tutorial_consults_service() {
        let service = Canned::ok(r#"{"outcomeType": "direct_loss", "damageAmount": 15}"#);
        let resolver = OutcomeResolver::new(service.clone(), 40);

        let outcome = resolver.resolve("Fire", "Paper", Some(&water_script())).await;

        assert_eq!(outcome.outcome_type, OutcomeKind::DirectLoss);
        assert_eq!(outcome.defender_loss(), 15);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_returns_fallback() {
        let resolver = OutcomeResolver::new(Canned::failing("connection refused"), 40);
        let outcome = resolver.resolve("Fire", "Water", None).await;

        assert_eq!(outcome.outcome_type, OutcomeKind::NeutralNoDamage);
        assert_eq!(outcome.damage_amount, 0);
        assert!(outcome.explanation.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_garbage_reply_returns_fallback() {
        let resolver = OutcomeResolver::new(Canned::ok("lorem ipsum"), 40);
        let outcome = resolver.resolve("Fire", "Water", None).await;
        assert_eq!(outcome.outcome_type, OutcomeKind::NeutralNoDamage);
        assert_eq!(outcome.damage_amount, 0);
    }

    #[test]
    fn test_validate_unknown_kind_is_neutral() {
        let raw = RawVerdict {
            outcome_type: Some("total_victory".into()),
            damage_amount: Some(Value::from(30)),
            ..RawVerdict::default()
        };
        let outcome = validate(raw, 40);
        assert_eq!(outcome.outcome_type, OutcomeKind::NeutralNoDamage);
        assert_eq!(outcome.winner, Winner::None);
    }

    #[test]
    fn test_validate_overrides_contradicting_flags() {
        let raw = RawVerdict {
            outcome_type: Some("direct_win".into()),
            winner: Some("attacker".into()),
            attacker_damage: Some(Value::from(0)),
            defender_damage: Some(Value::from(true)),
            damage_amount: Some(Value::from("18")),
            explanation: Some("  clean block ".into()),
        };
        let outcome = validate(raw, 40);
        assert_eq!(outcome.winner, Winner::Defender);
        assert_eq!((outcome.attacker_damage, outcome.defender_damage), (1, 0));
        assert_eq!(outcome.damage_amount, 18);
        assert_eq!(outcome.explanation, "clean block");
    }

    #[test]
    fn test_validate_clamps_and_defaults_damage() {
        let high = RawVerdict {
            outcome_type: Some("direct_loss".into()),
            damage_amount: Some(Value::from(250)),
            ..RawVerdict::default()
        };
        assert_eq!(validate(high, 40).damage_amount, 40);

        let negative = RawVerdict {
            outcome_type: Some("direct_loss".into()),
            damage_amount: Some(Value::from(-12.5)),
            ..RawVerdict::default()
        };
        assert_eq!(validate(negative, 40).damage_amount, 0);

        let missing = RawVerdict {
            outcome_type: Some("mutual_destruction".into()),
            ..RawVerdict::default()
        };
        assert_eq!(validate(missing, 40).damage_amount, DEFAULT_OUTCOME_DAMAGE);
    }

    #[test]
    fn test_oversized_labelled_damage_clamps_to_cap() {
        let verdict = parse_verdict("OUTCOME: DEFEAT\nDAMAGE: 99999999999999999999").unwrap();
        let outcome = validate(verdict, 40);
        assert_eq!(outcome.outcome_type, OutcomeKind::DirectLoss);
        assert_eq!(outcome.damage_amount, 40);
    }

    #[tokio::test]
    async fn test_tutorial_outcome_respects_configured_cap() {
        let resolver = OutcomeResolver::new(Canned::ok(""), 10);
        let outcome = resolver.resolve("Fire", "Water", Some(&water_script())).await;
        assert_eq!(outcome.damage_amount, 10);
    }

    #[test]
    fn test_configured_cap_cannot_exceed_forty() {
        let resolver = OutcomeResolver::new(Canned::ok(""), 90);
        assert_eq!(resolver.max_damage, MAX_OUTCOME_DAMAGE);
    }

    proptest! {
        #[test]
        fn prop_validate_always_consistent(
            kind in "[a-z_ ]{0,20}",
            damage in proptest::num::f64::ANY,
            a in -3i64..3,
            d in -3i64..3,
        ) {
            let raw = RawVerdict {
                outcome_type: Some(kind),
                winner: None,
                attacker_damage: Some(Value::from(a)),
                defender_damage: Some(Value::from(d)),
                damage_amount: serde_json::Number::from_f64(damage).map(Value::Number),
                explanation: None,
            };
            let outcome = validate(raw, 40);
            prop_assert!(outcome.damage_amount <= 40);
            prop_assert_eq!(outcome.winner, outcome.outcome_type.winner());
            prop_assert_eq!(
                (outcome.attacker_damage, outcome.defender_damage),
                outcome.outcome_type.damage_flags()
            );
        }

        #[test]
        fn prop_resolve_never_breaks_mapping(reply in ".{0,200}") {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let resolver = OutcomeResolver::new(Canned::ok(&reply), 40);
            let outcome = rt.block_on(resolver.resolve("Fire", "Water", None));
            prop_assert!(outcome.damage_amount <= 40);
            prop_assert_eq!(outcome.winner, outcome.outcome_type.winner());
            prop_assert_eq!(
                (outcome.attacker_damage, outcome.defender_damage),
                outcome.outcome_type.damage_flags()
            );
        }
    }
}
