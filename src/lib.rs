//! Concept Arena - tower battles judged by a reasoning service

pub mod battle;
pub mod core;
pub mod llm;
