//! Core types and configuration for the trade-insights pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Cells and row-keyed tables
//! - Schema-tagged raw and cleaned records
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod schema;
pub mod table;
pub mod types;

pub use config::{Config, KeywordVocabulary, LabelingConfig, MarkerColumn, NormalizerConfig};
pub use error::{Error, Result};
pub use schema::*;
pub use table::Table;
pub use types::*;
