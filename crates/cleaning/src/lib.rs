//! Record normalization for the trade-insights pipeline.
//!
//! This crate handles:
//! - Placeholder/comment row removal
//! - Permissive timestamp parsing
//! - Error-tolerant numeric coercion
//! - Text trimming and label standardization
//! - Delimited symbol list parsing

pub mod coerce;
pub mod normalizer;

pub use coerce::TimestampParser;
pub use normalizer::{Cleaned, NormalizationStats, RecordNormalizer};
