//! Concept Arena - console driver
//!
//! Plays a full match in the terminal. Each line typed is a defending concept;
//! `next` presses the tutorial banner button and `quit` exits. Without an API
//! key every clash falls back to a neutral outcome.

use concept_arena::battle::{
    BattleCommand, BattleHooks, BattleOrchestrator, BattleSender, ConceptCatalog, ConceptStatus,
    HistoryEntry, OutcomeResolver, TutorialBanner,
};
use concept_arena::core::config::ArenaConfig;
use concept_arena::core::error::Result;
use concept_arena::core::types::{Team, PLAYER_TEAM};
use concept_arena::llm::{LlmClient, ReasoningService, Unconfigured};

use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

const DEFAULT_CATALOG: &str = "data/concepts.toml";

/// Concept Arena - defend your tower with ideas
#[derive(Parser, Debug)]
#[command(name = "concept-arena")]
#[command(about = "Tower battle where a reasoning service judges concept clashes")]
struct Args {
    /// TOML config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Random seed for the AI's concept picks
    #[arg(long)]
    seed: Option<u64>,

    /// Start straight in free play
    #[arg(long)]
    skip_tutorial: bool,

    /// Concept catalog TOML (defaults to data/concepts.toml)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concept_arena=info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::new(),
    };
    if args.seed.is_some() {
        config.match_settings.seed = args.seed;
    }
    if args.skip_tutorial {
        config.match_settings.tutorial = false;
    }
    if args.catalog.is_some() {
        config.match_settings.catalog_path = args.catalog.clone();
    }

    let rt = Runtime::new()?;

    let service: Arc<dyn ReasoningService> = match LlmClient::from_env(&config.llm) {
        Ok(client) => {
            tracing::info!("Judging clashes with {}", client.endpoint());
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("{} - every clash will end neutral", e);
            Arc::new(Unconfigured::new(e.to_string()))
        }
    };

    let catalog_path = config
        .match_settings
        .catalog_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));
    let catalog = ConceptCatalog::load(&catalog_path).unwrap_or_else(|e| {
        tracing::warn!("Concept catalog unavailable ({}), using built-in concepts", e);
        ConceptCatalog::default()
    });

    let resolver = OutcomeResolver::new(service, config.damage.max_damage);
    let mut orchestrator =
        BattleOrchestrator::new(config, resolver, catalog, Arc::new(ConsoleHooks::default()))?;

    println!("\n=== CONCEPT ARENA ===");
    println!("The AI attacks your tower with concepts. Type a concept to defend.");
    println!();
    println!("Commands:");
    println!("  <any text>  - Defend with that concept");
    println!("  next / n    - Continue past a tutorial banner");
    println!("  quit / q    - Exit the game");
    println!();

    let sender = orchestrator.sender();
    sender.send(BattleCommand::Begin)?;
    std::thread::spawn(move || {
        if let Err(e) = read_commands(&sender) {
            tracing::warn!("Input loop ended: {}", e);
        }
        // stdin closed or quit typed; either way stop the match
        let _ = sender.send(BattleCommand::Shutdown);
    });

    rt.block_on(orchestrator.run());

    let health = orchestrator.state().health();
    println!(
        "\nGoodbye! Final towers: yours {}, AI {}. {} battles recorded.",
        health.blue,
        health.red,
        orchestrator.history().len()
    );
    Ok(())
}

fn read_commands(sender: &BattleSender) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();

        match input {
            "quit" | "q" => break,
            "next" | "n" => sender.send(BattleCommand::AdvanceTutorial)?,
            _ => sender.submit(PLAYER_TEAM, input)?,
        }
    }
    Ok(())
}

fn side(team: Team) -> &'static str {
    match team {
        Team::Blue => "YOU",
        Team::Red => "AI ",
    }
}

/// Prints every battle event to stdout
#[derive(Default)]
struct ConsoleHooks {
    last_second: AtomicU64,
}

impl BattleHooks for ConsoleHooks {
    fn show_ai_thinking(&self, team: Team) {
        println!("[{}] 🤖 thinking...", side(team));
    }

    fn show_concept_label(&self, concept: &str, team: Team, status: ConceptStatus) {
        let verb = match status {
            ConceptStatus::Attacking => "attacking with",
            ConceptStatus::Defending => "defending with",
        };
        println!("[{}] {} {}", side(team), verb, concept.to_uppercase());
    }

    fn show_message(&self, text: &str, team: Team) {
        println!("[{}] {}", side(team), text);
    }

    fn show_reasoning(&self, text: &str) {
        println!("       ⚖️  {}", text);
    }

    fn update_timer(&self, remaining: Duration, _total: Duration) {
        let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        if self.last_second.swap(seconds, Ordering::Relaxed) != seconds {
            println!("       ⏱️  {}s", seconds);
        }
    }

    fn update_health(&self, team: Team, delta: i32, health: u32) {
        println!("       {} {} ({})", team.tower_label(), delta, health);
    }

    fn show_tutorial_banner(&self, banner: &TutorialBanner) {
        println!("\n----------------------------------------");
        println!("{}", banner.title);
        if !banner.body.is_empty() {
            println!("\n{}", banner.body);
        }
        println!("\n[ {} ]  (type `next`)", banner.button);
        println!("----------------------------------------\n");
    }

    fn history_appended(&self, entry: &HistoryEntry) {
        tracing::debug!(
            "#{} {} vs {}: {} ({} dmg)",
            entry.cycle,
            entry.attack,
            entry.defend,
            entry.result,
            entry.damage
        );
    }

    fn game_over(&self, winner: Option<Team>) {
        match winner {
            Some(team) if team == PLAYER_TEAM => println!("\n🏆 VICTORY! The AI's tower has fallen."),
            Some(_) => println!("\n💀 DEFEAT! Your tower has fallen."),
            None => println!("\n⚖️ Both towers fell at once."),
        }
        println!("Type `quit` to exit.");
    }
}
