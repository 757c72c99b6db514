//! Condenses themed employee feedback into per-sentiment insights.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod llm;
pub mod logging;
pub mod nlp;
pub mod pipeline;
