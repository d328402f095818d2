#![forbid(unsafe_code)]

//! Construction-site task assistant.
//!
//! Turns free-text SMS, chat and REST messages into remote tasks: a
//! deterministic extractor with a language-model fallback, a project alias
//! synchronizer and a thin submission gateway.

pub mod audit;
pub mod clients;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod lexicon;
pub mod models;
pub mod parser;
pub mod persistence;
pub mod reports;
pub mod state;
pub mod sync;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
