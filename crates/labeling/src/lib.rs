//! Sentiment labeling for the trade-insights pipeline.
//!
//! This crate handles:
//! - Keyword-based sentiment classification over injected vocabularies
//! - Appending label and confidence columns to cleaned tables
//! - The insight-extractor boundary and its offline mock

pub mod classifier;
pub mod insights;

pub use classifier::{label_sentiment_keywords, KeywordSentimentClassifier, LabelDistribution};
pub use insights::{InsightContext, InsightExtractor, MockInsightExtractor};
