//! study-helper - document search and LLM quiz generation
//!
//! This crate provides:
//! - Ingestion of text, PDF and DOCX files into a SQLite-backed term index
//! - Ranked, filtered, paginated full-text search
//! - Quiz generation through an OpenAI-compatible chat service, with strict
//!   validation of the generated questions
//! - Grading of submitted answers and per-quiz / per-user analytics

pub mod analytics;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod generate;
pub mod grading;
pub mod index;
pub mod progress;
pub mod quiz;
pub mod search;

pub use config::Config;
pub use error::{Error, Result};
