//! Reasoning service access - HTTP client, prompts, reply parsing

pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{LlmClient, ReasoningService, Unconfigured};
pub use parser::{parse_verdict, RawVerdict};
pub use prompt::{BattlePrompt, JUDGE_SYSTEM_PROMPT};
