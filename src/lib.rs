//! # wepress
//!
//! A CLI application for curating WeChat official-account articles with
//! AI-assisted review and manuscript export.
//!
//! ## Features
//!
//! - **Total review pipeline**: freeform model replies normalize into typed
//!   [`analysis::Analysis`] records, field by field with per-field fallbacks,
//!   never an error
//! - **Provider agnostic**: OpenAI-compatible endpoints behind one
//!   [`provider::TextGenerator`] seam, with a mock provider for offline use
//! - **Manuscript export**: articles grouped into chapters by category,
//!   written as Word-compatible HTML, plain HTML, or a CSV article index

pub mod agent;
pub mod analysis;
pub mod article;
pub mod config;
pub mod export;
pub mod provider;
pub mod seed;
pub mod session;
pub mod spellcheck;
pub mod store;
pub mod ui;

pub use analysis::{normalize, Analysis, AnalysisRequest, RawModelOutput, Sentiment};
pub use article::{Article, Category};
pub use config::Config;
pub use store::{ArticleStore, MemoryStore};
