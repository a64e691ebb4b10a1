//! Onboarding tutorial
//!
//! Five scripted attack cycles that teach the outcome kinds before free play.
//! Each step walks `Hint -> Battle -> Lesson`; acknowledging the last lesson
//! switches the tutorial off for the rest of the match.
//!
//! The controller only knows about the resolver through the `TutorialOverride`
//! it hands out.

use serde::Serialize;

use crate::battle::outcome::{OutcomeKind, OutcomeResult, TutorialOverride};
use crate::core::types::{Team, AI_TEAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TutorialPhase {
    /// Guidance shown, match clock paused
    Hint,
    /// Clock running with the extended window
    Battle,
    /// Outcome explained, clock paused
    Lesson,
}

/// One scripted attack cycle
#[derive(Debug, Clone, Copy)]
pub struct TutorialStep {
    pub concept: &'static str,
    pub emoji: &'static str,
    pub hint_title: &'static str,
    pub hint_text: &'static str,
    pub teaser: &'static str,
    pub lesson: &'static str,
    pub counter: &'static str,
    pub outcome: OutcomeKind,
    pub damage: u32,
    pub explanation: &'static str,
}

pub static TUTORIAL_STEPS: [TutorialStep; 5] = [
    TutorialStep {
        concept: "Fire",
        emoji: "🔥",
        hint_title: "AI ATTACKED WITH: FIRE",
        hint_text: "Fire is hot and destructive. You need something that cools and smothers flames.\n\n💡 Try typing: WATER",
        teaser: "Some elements have natural dominance based on physical rules.",
        lesson: "✅ YOU LEARNED:\n\nBasic interactions follow real-world intuition.\nWater naturally extinguishes fire through cooling and smothering.",
        counter: "Water",
        outcome: OutcomeKind::DirectWin,
        damage: 30,
        explanation: "Water smothers and cools the flames, extinguishing the fire.",
    },
    TutorialStep {
        concept: "Sodium",
        emoji: "⚗️",
        hint_title: "AI ATTACKED WITH: SODIUM",
        hint_text: "Sodium is a highly reactive metal. What happens when reactive metals meet liquids?\n\n💡 Try typing: WATER\n\n(This might surprise you...)",
        teaser: "Some reactions create unexpected consequences...",
        lesson: "💥 YOU LEARNED:\n\nNot all wins are clean! Chemistry creates violent chain reactions.\nSodium + Water = Explosive hydrogen gas. Both sides can take damage.",
        counter: "Water",
        outcome: OutcomeKind::MutualDestruction,
        damage: 20,
        explanation: "Sodium reacts violently with water and the explosion hits both sides.",
    },
    TutorialStep {
        concept: "Nuclear Weapon",
        emoji: "☢️",
        hint_title: "AI ATTACKED WITH: NUCLEAR WEAPON",
        hint_text: "Physical weapons need physical targets to destroy. What exists everywhere with no single point of failure?\n\n💡 Try typing: YOUTUBE",
        teaser: "Decentralized systems live across thousands of servers.",
        lesson: "🌐 YOU LEARNED:\n\nDigital and distributed systems follow different rules than physical objects.\nYouTube exists on servers worldwide - you can't nuke the cloud!",
        counter: "YouTube",
        outcome: OutcomeKind::NeutralNoDamage,
        damage: 0,
        explanation: "YouTube lives on servers worldwide; the blast has nothing to hit.",
    },
    TutorialStep {
        concept: "Echo Chamber",
        emoji: "🔊",
        hint_title: "AI ATTACKED WITH: ECHO CHAMBER",
        hint_text: "Echo chambers amplify any sound infinitely in a feedback loop. What creature makes a loud, repetitive noise?\n\n💡 Try typing: DUCK",
        teaser: "Environments create powerful multipliers.",
        lesson: "🦆 YOU LEARNED:\n\nSynergy matters! Weak items become powerful in the right context.\nA duck's quack amplified infinitely collapses the chamber.",
        counter: "Duck",
        outcome: OutcomeKind::DirectWin,
        damage: 20,
        explanation: "The duck's quack echoes without end until the chamber collapses.",
    },
    TutorialStep {
        concept: "Laser Pointer",
        emoji: "🔴",
        hint_title: "AI ATTACKED WITH: LASER POINTER",
        hint_text: "Just a harmless dot of red light. What creature has an instinctive, uncontrollable obsession with chasing it?\n\n💡 Try typing: CAT",
        teaser: "Instincts and behavior can override raw power.",
        lesson: "🐈 YOU LEARNED:\n\nPersonality and instinct beat brute force!\nA cat's hunting instinct makes it the ultimate laser pointer counter.\n\n🎓 TUTORIAL COMPLETE! You've mastered the mechanics!",
        counter: "Cat",
        outcome: OutcomeKind::DirectWin,
        damage: 20,
        explanation: "The cat pounces on the dot until the laser pointer is useless.",
    },
];

impl TutorialStep {
    pub fn override_outcome(&self) -> TutorialOverride {
        TutorialOverride {
            suggested_concept: self.counter.to_string(),
            outcome: OutcomeResult::new(self.outcome, self.damage, self.explanation),
            hint_context: format!("{}\n{}", self.hint_text, self.teaser),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Hint,
    Lesson,
}

/// Overlay shown while the tutorial has the clock paused
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorialBanner {
    pub kind: BannerKind,
    pub title: String,
    pub body: String,
    pub button: &'static str,
}

/// Result of acknowledging a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialAdvance {
    /// Moved on to this step's hint
    NextStep(usize),
    /// Last lesson acknowledged, tutorial is now off
    Completed,
    /// Not in a lesson, nothing changed
    NotInLesson,
}

#[derive(Debug, Clone)]
pub struct TutorialController {
    active: bool,
    step: usize,
    phase: Option<TutorialPhase>,
}

impl TutorialController {
    pub fn new(enabled: bool) -> Self {
        Self {
            active: enabled,
            step: 0,
            phase: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn phase(&self) -> Option<TutorialPhase> {
        self.phase
    }

    /// Scripted attacker concept for `step`
    pub fn concept_for_step(step: usize) -> Option<&'static str> {
        TUTORIAL_STEPS.get(step).map(|s| s.concept)
    }

    pub fn current_script(&self) -> Option<&'static TutorialStep> {
        if !self.active {
            return None;
        }
        TUTORIAL_STEPS.get(self.step)
    }

    pub fn override_for_current(&self) -> Option<TutorialOverride> {
        self.current_script().map(TutorialStep::override_outcome)
    }

    /// Show the current step's guidance. Returns `None` once the tutorial is off.
    pub fn enter_hint(&mut self) -> Option<TutorialBanner> {
        let script = self.current_script()?;
        self.phase = Some(TutorialPhase::Hint);
        tracing::debug!("Tutorial step {} hint", self.step + 1);

        Some(TutorialBanner {
            kind: BannerKind::Hint,
            title: format!(
                "{} {}\n\nStep {} of {}",
                script.emoji,
                script.hint_title,
                self.step + 1,
                TUTORIAL_STEPS.len()
            ),
            body: format!("{}\n\n{}", script.hint_text, script.teaser),
            button: "Ready to Defend →",
        })
    }

    /// Hint acknowledged; returns false if no hint was showing
    pub fn enter_battle(&mut self) -> bool {
        if !self.active || self.phase != Some(TutorialPhase::Hint) {
            return false;
        }
        self.phase = Some(TutorialPhase::Battle);
        true
    }

    /// Explain `outcome` for the current step
    pub fn enter_lesson(&mut self, outcome: &OutcomeResult) -> Option<TutorialBanner> {
        let script = self.current_script()?;
        self.phase = Some(TutorialPhase::Lesson);

        let is_last = self.step + 1 == TUTORIAL_STEPS.len();
        Some(TutorialBanner {
            kind: BannerKind::Lesson,
            title: format!(
                "{}\n\nCompleted: {} of {}",
                script.lesson,
                self.step + 1,
                TUTORIAL_STEPS.len()
            ),
            body: Self::lesson_text(outcome, AI_TEAM),
            button: if is_last {
                "Start Real Game →"
            } else {
                "Next Battle →"
            },
        })
    }

    /// Leave the lesson for the next hint, or finish the tutorial
    pub fn advance(&mut self) -> TutorialAdvance {
        if !self.active || self.phase != Some(TutorialPhase::Lesson) {
            return TutorialAdvance::NotInLesson;
        }

        if self.step + 1 >= TUTORIAL_STEPS.len() {
            self.active = false;
            self.phase = None;
            tracing::info!("Tutorial complete, starting normal play");
            TutorialAdvance::Completed
        } else {
            self.step += 1;
            self.phase = Some(TutorialPhase::Hint);
            tracing::info!("Tutorial advanced to step {}", self.step + 1);
            TutorialAdvance::NextStep(self.step)
        }
    }

    /// Player-facing account of what happened to the towers
    pub fn lesson_text(outcome: &OutcomeResult, attacker: Team) -> String {
        let defender = attacker.opponent();
        let summary = match (outcome.attacker_loss(), outcome.defender_loss()) {
            (0, 0) => "Neither tower took damage.".to_string(),
            (a, d) if a > 0 && d > 0 => {
                let (player, ai) = if defender == Team::Blue { (d, a) } else { (a, d) };
                if player == ai {
                    format!("Both your tower and AI's tower took {player} damage.")
                } else {
                    format!("Your tower took {player} damage and AI's tower took {ai} damage.")
                }
            }
            (a, 0) => format!("{} took {a} damage.", capitalize(attacker.tower_label())),
            (_, d) => format!("{} took {d} damage.", capitalize(defender.tower_label())),
        };

        if outcome.explanation.is_empty() {
            summary
        } else {
            format!("{}\n\n{}", outcome.explanation, summary)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
