//! Shared fixtures for orchestrator integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use concept_arena::battle::*;
use concept_arena::core::config::ArenaConfig;
use concept_arena::core::error::{ArenaError, Result};
use concept_arena::core::types::{Team, VisualHandle};
use concept_arena::llm::ReasoningService;

/// Reasoning service that always gives the same reply
pub struct ScriptedReasoner {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReasoner {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoner {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        self.reply.clone().map_err(ArenaError::Llm)
    }
}

/// Hooks that remember what the orchestrator asked for
#[derive(Default)]
pub struct RecordingHooks {
    pub messages: Mutex<Vec<(Team, String)>>,
    pub banners: Mutex<Vec<TutorialBanner>>,
    pub collisions: Mutex<Vec<CollisionKind>>,
    pub direct_hits: Mutex<Vec<Team>>,
    pub released: Mutex<Vec<VisualHandle>>,
    pub game_over: Mutex<Option<Option<Team>>>,
    pub reasoning: Mutex<Vec<String>>,
    pub timer_hidden: AtomicUsize,
    /// Keep motion records instead of letting them complete
    pub hold_motions: bool,
    pub held: Mutex<Vec<MotionRecord>>,
}

impl RecordingHooks {
    pub fn holding_motions() -> Self {
        Self {
            hold_motions: true,
            ..Self::default()
        }
    }

    pub fn saw_message(&self, team: Team, text: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(t, m)| *t == team && m == text)
    }

    pub fn banner_count(&self) -> usize {
        self.banners.lock().unwrap().len()
    }

    pub fn last_banner(&self) -> Option<TutorialBanner> {
        self.banners.lock().unwrap().last().cloned()
    }
}

impl BattleHooks for RecordingHooks {
    fn show_message(&self, text: &str, team: Team) {
        self.messages.lock().unwrap().push((team, text.to_string()));
    }

    fn show_reasoning(&self, text: &str) {
        self.reasoning.lock().unwrap().push(text.to_string());
    }

    fn hide_timer(&self) {
        self.timer_hidden.fetch_add(1, Ordering::SeqCst);
    }

    fn begin_interception(&self, motions: Vec<MotionRecord>) {
        if self.hold_motions {
            self.held.lock().unwrap().extend(motions);
        }
    }

    fn play_collision(
        &self,
        _attacker: VisualHandle,
        _defender: VisualHandle,
        _outcome: OutcomeKind,
        kind: CollisionKind,
    ) {
        self.collisions.lock().unwrap().push(kind);
    }

    fn play_direct_hit(&self, team: Team) {
        self.direct_hits.lock().unwrap().push(team);
    }

    fn release_visual(&self, visual: VisualHandle) {
        self.released.lock().unwrap().push(visual);
    }

    fn show_tutorial_banner(&self, banner: &TutorialBanner) {
        self.banners.lock().unwrap().push(banner.clone());
    }

    fn game_over(&self, winner: Option<Team>) {
        *self.game_over.lock().unwrap() = Some(winner);
    }
}

pub fn config(tutorial: bool) -> ArenaConfig {
    let mut config = ArenaConfig::new();
    config.match_settings.tutorial = tutorial;
    config.match_settings.seed = Some(7);
    config
}

pub fn build(
    config: ArenaConfig,
    reasoner: Arc<ScriptedReasoner>,
    hooks: Arc<RecordingHooks>,
) -> BattleOrchestrator {
    let resolver = OutcomeResolver::new(reasoner, config.damage.max_damage);
    BattleOrchestrator::new(config, resolver, ConceptCatalog::default(), hooks).unwrap()
}

/// Process events until `done` holds, failing after two virtual minutes
pub async fn drive_until<F>(orch: &mut BattleOrchestrator, done: F)
where
    F: Fn(&BattleOrchestrator) -> bool,
{
    let reached = tokio::time::timeout(Duration::from_secs(120), async {
        while !done(orch) {
            if !orch.step().await {
                break;
            }
        }
        done(orch)
    })
    .await;
    assert!(matches!(reached, Ok(true)), "condition never reached");
}

/// True if no event arrives within `window`
pub async fn stays_quiet(orch: &mut BattleOrchestrator, window: Duration) -> bool {
    tokio::time::timeout(window, orch.step()).await.is_err()
}
