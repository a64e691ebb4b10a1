//! Prompt text sent to the reasoning service

/// System prompt for judging a clash
pub const JUDGE_SYSTEM_PROMPT: &str = r#"You are the battle judge for a tower defense game.
Two concepts meet in the middle of the arena. Decide how they interact based on real-world properties.

OUTCOME TYPES:
- direct_win: the defending concept cleanly beats the attack. The attacker's tower is damaged.
- direct_loss: the attack overwhelms the defense. The defender's tower is damaged.
- backfire_win: the defending concept turns against itself. The defender's tower is damaged.
- neutral_no_damage: the concepts pass through each other. Nobody is damaged.
- mutual_destruction: both concepts destroy each other. Both towers are damaged.

OUTPUT FORMAT (JSON only, no explanation outside the object):
{
  "outcomeType": "direct_win|direct_loss|backfire_win|neutral_no_damage|mutual_destruction",
  "winner": "attacker|defender|none",
  "attackerDamage": 0 or 1,
  "defenderDamage": 0 or 1,
  "damageAmount": 0-40,
  "explanation": "one short sentence, max 15 words"
}
"#;

/// User prompt for one clash
pub struct BattlePrompt<'a> {
    pub attacker: &'a str,
    pub defender: &'a str,
    /// Teaching context while the tutorial is running
    pub tutorial_hint: Option<&'a str>,
}

impl<'a> BattlePrompt<'a> {
    pub fn new(attacker: &'a str, defender: &'a str) -> Self {
        Self {
            attacker,
            defender,
            tutorial_hint: None,
        }
    }

    pub fn with_tutorial_hint(mut self, hint: &'a str) -> Self {
        self.tutorial_hint = Some(hint);
        self
    }

    pub fn render(&self) -> String {
        let mut s = format!(
            "ATTACKING CONCEPT: \"{}\"\nDEFENDING CONCEPT: \"{}\"\n",
            self.attacker, self.defender
        );

        if let Some(hint) = self.tutorial_hint {
            s.push_str("\nTUTORIAL CONTEXT (the player is learning the outcome types):\n");
            s.push_str(hint);
            s.push('\n');
            s.push_str(
                "The player chose a different counter than suggested. Judge it honestly and \
                 keep the explanation simple enough for a beginner.\n",
            );
        }

        s.push_str("\nJudge this clash and answer with the JSON object:");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_both_concepts() {
        let prompt = BattlePrompt::new("Fire", "Water").render();
        assert!(prompt.contains("\"Fire\""));
        assert!(prompt.contains("\"Water\""));
        assert!(!prompt.contains("TUTORIAL"));
    }

    #[test]
    fn test_render_includes_tutorial_hint() {
        let prompt = BattlePrompt::new("Fire", "Sand")
            .with_tutorial_hint("Fire is hot. Try something that cools.")
            .render();
        assert!(prompt.contains("TUTORIAL CONTEXT"));
        assert!(prompt.contains("Try something that cools."));
    }

    #[test]
    fn test_system_prompt_lists_every_outcome() {
        for kind in crate::battle::outcome::OutcomeKind::ALL {
            assert!(JUDGE_SYSTEM_PROMPT.contains(kind.as_str()), "{kind}");
        }
    }
}
