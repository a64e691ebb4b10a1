//! Battle orchestrator - the attack cycle state machine
//!
//! Flow per cycle:
//! 1. AI picks a concept and starts walking (`AiAttacking`), response timer armed
//! 2. Either the timer expires (guaranteed penalty) or the player defends
//! 3. Defending spawns the resolution task (`Resolving`): walk-in join and
//!    outcome resolver run concurrently
//! 4. Result applied (`Applying`), state reset, then `GameOver`, a tutorial
//!    lesson, or a cooldown before the next attack
//!
//! All state is mutated in `handle`, one event at a time. Timers, delays and
//! resolution run as spawned tasks that post events back into the channel,
//! each tagged with the cycle that spawned it so late arrivals are dropped.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;

use crate::battle::catalog::ConceptCatalog;
use crate::battle::constants::MAX_OUTCOME_DAMAGE;
use crate::battle::history::{BattleHistory, HistoryEntry};
use crate::battle::hooks::{BattleHooks, ConceptStatus};
use crate::battle::motion::MotionSet;
use crate::battle::outcome::{OutcomeKind, OutcomeResult};
use crate::battle::resolver::OutcomeResolver;
use crate::battle::state::{ActiveAttack, BattlePhase, MatchState};
use crate::battle::timer::ResponseTimer;
use crate::battle::tutorial::{TutorialAdvance, TutorialController, TutorialPhase};
use crate::core::config::ArenaConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{CycleId, Team, VisualHandle, AI_TEAM};

/// Input from the outside world
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    /// Start the first AI attack (splash screen dismissed)
    Begin,
    /// A concept typed by one side
    Submit { team: Team, concept: String },
    /// Tutorial banner button pressed
    AdvanceTutorial,
    Shutdown,
}

/// Everything the orchestrator reacts to
#[derive(Debug)]
pub enum BattleEvent {
    Command(BattleCommand),
    TimerTick { cycle: CycleId, remaining: Duration },
    TimerExpired { cycle: CycleId },
    /// `Err` carries the reason the resolution task died
    Resolved {
        cycle: CycleId,
        result: std::result::Result<OutcomeResult, String>,
    },
    /// Delayed start of the attack following cycle `after`
    ScheduledAttack { after: CycleId },
}

/// Cloneable handle for feeding commands to a running orchestrator
#[derive(Debug, Clone)]
pub struct BattleSender {
    tx: mpsc::UnboundedSender<BattleEvent>,
}

impl BattleSender {
    pub fn send(&self, command: BattleCommand) -> Result<()> {
        self.tx
            .send(BattleEvent::Command(command))
            .map_err(|_| ArenaError::ChannelClosed)
    }

    pub fn submit(&self, team: Team, concept: impl Into<String>) -> Result<()> {
        self.send(BattleCommand::Submit {
            team,
            concept: concept.into(),
        })
    }
}

/// The clash currently being resolved
#[derive(Debug, Clone)]
struct Clash {
    attacker: String,
    defender: String,
    attacker_team: Team,
    defender_team: Team,
    attacker_visual: VisualHandle,
    defender_visual: VisualHandle,
}

pub struct BattleOrchestrator {
    config: ArenaConfig,
    state: MatchState,
    tutorial: TutorialController,
    history: BattleHistory,
    catalog: ConceptCatalog,
    resolver: Arc<OutcomeResolver>,
    hooks: Arc<dyn BattleHooks>,
    timer: ResponseTimer,
    rng: ChaCha8Rng,
    clash: Option<Clash>,
    paused: bool,
    shutdown: bool,
    tx: mpsc::UnboundedSender<BattleEvent>,
    rx: mpsc::UnboundedReceiver<BattleEvent>,
}

impl BattleOrchestrator {
    pub fn new(
        config: ArenaConfig,
        resolver: OutcomeResolver,
        catalog: ConceptCatalog,
        hooks: Arc<dyn BattleHooks>,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.match_settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: MatchState::new(config.damage.starting_health),
            tutorial: TutorialController::new(config.match_settings.tutorial),
            history: BattleHistory::new(),
            catalog,
            resolver: Arc::new(resolver),
            hooks,
            timer: ResponseTimer::new(config.timing.tick_interval()),
            rng,
            clash: None,
            paused: false,
            shutdown: false,
            tx,
            rx,
            config,
        })
    }

    pub fn sender(&self) -> BattleSender {
        BattleSender {
            tx: self.tx.clone(),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tutorial(&self) -> &TutorialController {
        &self.tutorial
    }

    pub fn history(&self) -> &BattleHistory {
        &self.history
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_active()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Process the next event. Returns false once shut down.
    pub async fn step(&mut self) -> bool {
        if self.shutdown {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.handle(event);
                !self.shutdown
            }
            None => false,
        }
    }

    pub async fn run(&mut self) {
        while self.step().await {}
        tracing::info!("Battle loop stopped after {} cycles", self.state.cycle);
    }

    /// Apply one event. Must be called inside a tokio runtime since it may
    /// spawn timer and resolution tasks.
    pub fn handle(&mut self, event: BattleEvent) {
        match event {
            BattleEvent::Command(BattleCommand::Begin) => {
                if self.state.phase == BattlePhase::Idle {
                    self.start_ai_attack();
                } else {
                    tracing::debug!("Begin ignored in {:?}", self.state.phase);
                }
            }
            BattleEvent::Command(BattleCommand::Submit { team, concept }) => {
                if let Err(e) = self.submit(team, &concept) {
                    tracing::debug!("Submission from {} rejected: {}", team, e);
                }
            }
            BattleEvent::Command(BattleCommand::AdvanceTutorial) => self.advance_tutorial(),
            BattleEvent::Command(BattleCommand::Shutdown) => {
                self.timer.cancel();
                self.shutdown = true;
                tracing::info!("Shutdown requested");
            }
            BattleEvent::TimerTick { cycle, remaining } => {
                if self.is_live_response(cycle) {
                    self.state.response_time_remaining = remaining;
                    self.hooks.update_timer(remaining, self.state.response_window);
                }
            }
            BattleEvent::TimerExpired { cycle } => {
                if self.is_live_response(cycle) {
                    self.on_timeout();
                } else {
                    tracing::debug!("Ignoring stale expiry for cycle {}", cycle);
                }
            }
            BattleEvent::Resolved { cycle, result } => {
                if cycle == self.state.cycle && self.state.is_processing {
                    self.on_resolved(result);
                } else {
                    tracing::debug!("Ignoring stale resolution for cycle {}", cycle);
                }
            }
            BattleEvent::ScheduledAttack { after } => {
                if after != self.state.cycle {
                    tracing::debug!("Dropping attack scheduled after cycle {}", after);
                } else {
                    self.start_ai_attack();
                }
            }
        }
    }

    fn is_live_response(&self, cycle: CycleId) -> bool {
        cycle == self.state.cycle && self.state.ai_attacking && !self.state.is_processing
    }

    /// Begin a new cycle. A no-op while a cycle is still active, while paused
    /// or after game over.
    fn start_ai_attack(&mut self) -> bool {
        if self.state.is_game_over() {
            tracing::debug!("AI attack skipped - game is over");
            return false;
        }
        if self.paused {
            tracing::debug!("AI attack skipped - paused");
            return false;
        }
        if self.state.is_processing || self.state.ai_attacking {
            tracing::debug!("AI attack skipped - already processing");
            return false;
        }

        let concept = match self.tutorial.current_script() {
            Some(script) => script.concept.to_string(),
            None => self.catalog.pick_random_name(&mut self.rng),
        };

        self.hooks.show_ai_thinking(AI_TEAM);
        let visual = self
            .hooks
            .spawn_approaching(&concept, AI_TEAM, self.config.timing.walk_duration());
        let cycle = self.state.begin_attack(ActiveAttack {
            concept: concept.clone(),
            team: AI_TEAM,
            visual,
        });
        tracing::info!("Cycle {}: AI attacks with {}", cycle, concept);

        self.hooks
            .show_concept_label(&concept, AI_TEAM, ConceptStatus::Attacking);
        self.hooks
            .show_message(&format!("⚔️ {concept} approaching!"), AI_TEAM);

        match self.tutorial.enter_hint() {
            Some(banner) => {
                self.set_paused(true);
                self.hooks.show_tutorial_banner(&banner);
            }
            None => self.arm_timer(false),
        }
        true
    }

    fn arm_timer(&mut self, tutorial: bool) {
        let window = self.config.timing.response_window(tutorial);
        let cycle = self.state.cycle;
        self.state.response_window = window;
        self.state.response_time_remaining = window;
        self.hooks.update_timer(window, window);

        let tick_tx = self.tx.clone();
        let expire_tx = self.tx.clone();
        self.timer.start(
            window,
            move |remaining| {
                let _ = tick_tx.send(BattleEvent::TimerTick { cycle, remaining });
            },
            move || {
                let _ = expire_tx.send(BattleEvent::TimerExpired { cycle });
            },
        );
        tracing::debug!("Response timer armed for {:?}", window);
    }

    fn submit(&mut self, team: Team, concept: &str) -> Result<()> {
        if team == AI_TEAM {
            self.hooks.show_message("Red team is AI controlled", team);
            return Err(ArenaError::InvalidInput(format!("{team} is AI controlled")));
        }

        let concept = concept.trim();
        if concept.is_empty() {
            self.hooks.show_message("Please enter a concept!", team);
            return Err(ArenaError::InvalidInput("empty concept".into()));
        }

        if self.state.is_processing {
            self.hooks.show_message("Battle in progress...", team);
            return Err(ArenaError::InvalidState("battle in progress".into()));
        }

        let attack = match self.state.current_active_attack.clone() {
            Some(attack) if self.state.ai_attacking && attack.team != team => attack,
            _ => {
                self.hooks.show_message("⏳ Wait for AI attack!", team);
                return Err(ArenaError::InvalidState("no attack to defend".into()));
            }
        };

        if self.tutorial.phase() == Some(TutorialPhase::Hint) {
            self.hooks
                .show_message("📖 Read the hint, then press Ready to Defend!", team);
            return Err(ArenaError::InvalidState("tutorial hint still showing".into()));
        }

        self.accept_defense(attack, team, concept.to_string());
        Ok(())
    }

    fn accept_defense(&mut self, attack: ActiveAttack, team: Team, concept: String) {
        self.timer.cancel();
        self.hooks.hide_timer();

        self.hooks
            .show_concept_label(&concept, team, ConceptStatus::Defending);
        self.hooks
            .show_message(&format!("🛡️ {concept} defending!"), team);
        self.hooks.disable_input(team, true);

        self.state.is_processing = true;
        self.state.phase = BattlePhase::Resolving;
        self.state.current_defense = Some(concept.clone());
        tracing::info!(
            "Cycle {}: {} defends against {}",
            self.state.cycle,
            concept,
            attack.concept
        );

        for side in [team, attack.team] {
            self.hooks.show_message("🤔 Analyzing interaction...", side);
        }

        let defender_visual =
            self.hooks
                .spawn_approaching(&concept, team, self.config.timing.walk_duration());
        self.state.active_visuals.push(defender_visual);

        let (motions, join) = MotionSet::new(2);
        self.hooks.begin_interception(motions);

        let script = if self.tutorial.is_active() {
            self.tutorial.override_for_current()
        } else {
            None
        };
        let resolver = self.resolver.clone();
        let limit = self.config.timing.motion_join_timeout();
        let (attacker, defender) = (attack.concept.clone(), concept.clone());

        let work = tokio::spawn(async move {
            let (_, outcome) = tokio::join!(
                join.wait(limit),
                resolver.resolve(&attacker, &defender, script.as_ref())
            );
            outcome
        });

        let tx = self.tx.clone();
        let cycle = self.state.cycle;
        tokio::spawn(async move {
            let result = work.await.map_err(|e| e.to_string());
            let _ = tx.send(BattleEvent::Resolved { cycle, result });
        });

        self.clash = Some(Clash {
            attacker: attack.concept,
            defender: concept,
            attacker_team: attack.team,
            defender_team: team,
            attacker_visual: attack.visual,
            defender_visual,
        });
    }

    fn on_timeout(&mut self) {
        let Some(attack) = self.state.current_active_attack.clone() else {
            return;
        };
        let defender = attack.team.opponent();
        tracing::info!("Cycle {}: {} undefended", self.state.cycle, attack.concept);

        self.timer.cancel();
        self.hooks.hide_timer();
        self.hooks.show_message("⚠️ UNDEFENDED!", defender);
        self.hooks.show_message("💥 Direct hit!", attack.team);

        let penalty = self.config.damage.timeout_penalty;
        self.apply_damage(defender, penalty);
        self.hooks.play_direct_hit(defender);

        self.record(HistoryEntry {
            cycle: self.state.cycle,
            attack: attack.concept,
            defend: "No Defense".into(),
            explanation: "The attack reached the tower unopposed.".into(),
            result: "💥 Direct Tower Hit!".into(),
            damage: penalty,
        });

        self.finish_cycle(self.config.timing.timeout_cooldown(), None);
    }

    fn on_resolved(&mut self, result: std::result::Result<OutcomeResult, String>) {
        self.state.phase = BattlePhase::Applying;

        let applied = match (result, self.clash.take()) {
            (Ok(outcome), Some(clash)) => self.apply_outcome(&clash, &outcome).map(|()| outcome),
            (Err(reason), _) => Err(ArenaError::InvalidState(format!(
                "resolution task failed: {reason}"
            ))),
            (Ok(_), None) => Err(ArenaError::InvalidState("no clash in flight".into())),
        };

        let lesson = match applied {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("Battle error: {}", e);
                for side in [AI_TEAM.opponent(), AI_TEAM] {
                    self.hooks.show_message("Battle error occurred!", side);
                }
                None
            }
        };

        self.finish_cycle(self.config.timing.battle_cooldown(), lesson.as_ref());
    }

    fn apply_outcome(&mut self, clash: &Clash, outcome: &OutcomeResult) -> Result<()> {
        let mut checked = outcome.clone();
        if checked.enforce_mapping() {
            return Err(ArenaError::InvalidState(format!(
                "{} outcome carries inconsistent flags",
                outcome.outcome_type
            )));
        }
        if outcome.damage_amount > self.config.damage.max_damage.min(MAX_OUTCOME_DAMAGE) {
            return Err(ArenaError::InvalidState(format!(
                "damage {} above cap",
                outcome.damage_amount
            )));
        }

        self.hooks.show_reasoning(&outcome.explanation);
        self.hooks.play_collision(
            clash.attacker_visual,
            clash.defender_visual,
            outcome.outcome_type,
            outcome.outcome_type.collision(),
        );

        if outcome.attacker_damage == 1 {
            self.apply_damage(clash.attacker_team, outcome.attacker_loss());
        }
        if outcome.defender_damage == 1 {
            self.apply_damage(clash.defender_team, outcome.defender_loss());
        }

        let message = result_message(outcome.outcome_type, &clash.attacker, &clash.defender);
        for side in [clash.defender_team, clash.attacker_team] {
            self.hooks.show_message(&message, side);
        }

        tracing::info!(
            "Cycle {}: {} (blue {}, red {})",
            self.state.cycle,
            outcome.outcome_type,
            self.state.health.blue,
            self.state.health.red
        );

        self.record(HistoryEntry {
            cycle: self.state.cycle,
            attack: clash.attacker.clone(),
            defend: clash.defender.clone(),
            explanation: outcome.explanation.clone(),
            result: message,
            damage: outcome.damage_amount,
        });
        Ok(())
    }

    fn apply_damage(&mut self, team: Team, amount: u32) -> u32 {
        let applied = self.state.health.damage(team, amount);
        let delta = -i32::try_from(applied).unwrap_or(i32::MAX);
        self.hooks
            .update_health(team, delta, self.state.health.get(team));
        applied
    }

    fn record(&mut self, entry: HistoryEntry) {
        self.hooks.history_appended(&entry);
        self.history.push(entry);
    }

    /// Reset the cycle and decide what comes next
    fn finish_cycle(&mut self, cooldown: Duration, lesson: Option<&OutcomeResult>) {
        for visual in self.state.reset_cycle() {
            self.hooks.release_visual(visual);
        }
        self.clash = None;
        self.hooks.clear_inputs();
        self.hooks.disable_input(AI_TEAM.opponent(), false);

        if self.state.health.any_destroyed() {
            self.state.phase = BattlePhase::GameOver;
            let winner = self.state.health.survivor();
            tracing::info!("Game over, winner: {:?}", winner);
            self.hooks.game_over(winner);
            return;
        }

        self.state.phase = BattlePhase::Cooldown;

        if let Some(banner) = lesson.and_then(|outcome| self.tutorial.enter_lesson(outcome)) {
            self.set_paused(true);
            self.hooks.show_tutorial_banner(&banner);
            return;
        }

        self.schedule_attack(cooldown);
    }

    fn schedule_attack(&self, delay: Duration) {
        let after = self.state.cycle;
        let tx = self.tx.clone();
        tracing::debug!("Next attack in {:?}", delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(BattleEvent::ScheduledAttack { after });
        });
    }

    fn advance_tutorial(&mut self) {
        match self.tutorial.phase() {
            Some(TutorialPhase::Hint) if self.state.ai_attacking => {
                if self.tutorial.enter_battle() {
                    self.set_paused(false);
                    self.arm_timer(true);
                }
            }
            Some(TutorialPhase::Lesson) => match self.tutorial.advance() {
                TutorialAdvance::NextStep(_) => {
                    self.set_paused(false);
                    self.schedule_attack(self.config.timing.tutorial_advance_delay());
                }
                TutorialAdvance::Completed => {
                    self.set_paused(false);
                    self.schedule_attack(self.config.timing.tutorial_complete_delay());
                }
                TutorialAdvance::NotInLesson => {}
            },
            _ => tracing::debug!("Nothing to advance in the tutorial"),
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.hooks.hide_timer();
        }
        self.hooks.set_paused(paused);
    }
}

/// Line shown to both sides once a clash is decided
pub fn result_message(kind: OutcomeKind, attacker: &str, defender: &str) -> String {
    match kind {
        OutcomeKind::DirectWin => format!("🛡️ {defender} blocks {attacker}!"),
        OutcomeKind::DirectLoss => format!("✨ {attacker} defeats {defender}!"),
        OutcomeKind::BackfireWin => format!("💥 {defender} backfires against {attacker}!"),
        OutcomeKind::NeutralNoDamage => format!("⚔️ {attacker} and {defender} pass each other by!"),
        OutcomeKind::MutualDestruction => {
            format!("💥 {attacker} and {defender} destroy each other!")
        }
    }
}
