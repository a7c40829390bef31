//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate identity resolution and store reads into the scoped fetch
//!   API consumed by presentation layers.
//! - Keep callers decoupled from identity and storage details.

pub mod record_fetcher;
