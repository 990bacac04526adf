// src/models/mod.rs

//! Domain models for the tender watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod tender;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, ExtractionConfig, PortalConfig, SelectorOverrides,
};
pub use tender::{Analysis, RawTender, TenderDraft, TenderRecord, TenderStatus};
