//! Configuration structures for the trade-insights pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{NewsTextField, Schema};

/// Main configuration for the cleaning and labeling pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record normalizer configuration.
    pub normalizer: NormalizerConfig,
    /// Keyword labeling configuration.
    pub labeling: LabelingConfig,
}

impl Config {
    /// Load from JSON. Missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        self.labeling.validate()
    }
}

/// Which column decides whether a row is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColumn {
    /// A column chosen by name. Immune to column reordering.
    Named(String),
    /// Whatever column happens to come first in the input.
    FirstColumn,
}

impl MarkerColumn {
    pub fn named(column: impl Into<String>) -> Self {
        MarkerColumn::Named(column.into())
    }
}

/// Record normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Prefix marking a placeholder/comment row.
    pub placeholder_marker: String,
    /// Marker column for trade tables.
    pub trades_marker_column: MarkerColumn,
    /// Marker column for news tables.
    pub news_marker_column: MarkerColumn,
    /// Marker column for sentiment-label tables.
    pub sentiment_marker_column: MarkerColumn,
    /// Delimiter for `related_symbols`.
    pub symbol_delimiter: String,
    /// Extra `chrono` formats tried after the built-in ones. Naive formats
    /// are read as UTC.
    pub extra_timestamp_formats: Vec<String>,
}

impl NormalizerConfig {
    /// Marker column configured for a schema.
    pub fn marker_column(&self, schema: Schema) -> &MarkerColumn {
        match schema {
            Schema::Trades => &self.trades_marker_column,
            Schema::News => &self.news_marker_column,
            Schema::SentimentLabels => &self.sentiment_marker_column,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.placeholder_marker.is_empty() {
            return Err(Error::config("placeholder_marker must not be empty"));
        }
        if self.symbol_delimiter.is_empty() {
            return Err(Error::config("symbol_delimiter must not be empty"));
        }
        for schema in Schema::ALL {
            if let MarkerColumn::Named(name) = self.marker_column(schema) {
                if name.trim().is_empty() {
                    return Err(Error::config(format!(
                        "marker column for {} must not be blank",
                        schema
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            placeholder_marker: "...".to_string(),
            trades_marker_column: MarkerColumn::named("timestamp"),
            news_marker_column: MarkerColumn::named("id"),
            sentiment_marker_column: MarkerColumn::named("timestamp"),
            symbol_delimiter: ";".to_string(),
            extra_timestamp_formats: Vec::new(),
        }
    }
}

/// Positive and negative marker words.
///
/// Matching ignores case, and a word listed twice (in any casing) is one
/// marker: it adds at most 1 to its side's count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordVocabulary {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl KeywordVocabulary {
    pub fn new<P, N, S>(positive: P, negative: N) -> Self
    where
        P: IntoIterator<Item = S>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
            negative: negative.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        let blank = self
            .positive
            .iter()
            .chain(self.negative.iter())
            .any(|word| word.trim().is_empty());
        if blank {
            return Err(Error::config("marker words must not be blank"));
        }
        if let Some(word) = self
            .positive
            .iter()
            .find(|p| self.negative.iter().any(|n| n.eq_ignore_ascii_case(p)))
        {
            return Err(Error::config(format!(
                "'{}' is both a positive and a negative marker",
                word
            )));
        }
        Ok(())
    }
}

impl Default for KeywordVocabulary {
    fn default() -> Self {
        Self::new(
            [
                "surge",
                "optimism",
                "grants",
                "expand",
                "lists",
                "reaches",
                "stabilization",
                "breakout",
                "gain",
                "grow",
                "positive",
                "support",
            ],
            [
                "dip",
                "uncertainty",
                "weighs",
                "delays",
                "volatile",
                "concerns",
                "negative",
                "correction",
                "fear",
                "drop",
                "risk",
            ],
        )
    }
}

/// Keyword labeling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// News field classified by default.
    pub text_field: NewsTextField,
    /// Marker vocabularies.
    pub vocabulary: KeywordVocabulary,
}

impl LabelingConfig {
    fn validate(&self) -> Result<()> {
        self.vocabulary.validate()
    }
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            text_field: NewsTextField::Headline,
            vocabulary: KeywordVocabulary::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.normalizer.placeholder_marker, "...");
        assert_eq!(config.normalizer.symbol_delimiter, ";");
        assert_eq!(
            config.normalizer.marker_column(Schema::News),
            &MarkerColumn::named("id")
        );
        assert_eq!(config.labeling.vocabulary.positive.len(), 12);
        assert_eq!(config.labeling.vocabulary.negative.len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_marker_columns_are_required() {
        let config = NormalizerConfig::default();
        for schema in Schema::ALL {
            match config.marker_column(schema) {
                MarkerColumn::Named(column) => {
                    assert!(schema.required_columns().contains(&column.as_str()), "{schema}")
                }
                MarkerColumn::FirstColumn => panic!("{schema} defaults to a positional marker"),
            }
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(
            r#"{"normalizer": {"trades_marker_column": "first_column", "symbol_delimiter": ","}}"#,
        )
        .unwrap();
        assert_eq!(config.normalizer.trades_marker_column, MarkerColumn::FirstColumn);
        assert_eq!(config.normalizer.symbol_delimiter, ",");
        assert_eq!(config.normalizer.placeholder_marker, "...");
        assert_eq!(config.labeling.text_field, NewsTextField::Headline);
    }

    #[test]
    fn test_named_marker_from_json() {
        let config =
            Config::from_json_str(r#"{"normalizer": {"news_marker_column": {"named": "headline"}}}"#)
                .unwrap();
        assert_eq!(
            config.normalizer.news_marker_column,
            MarkerColumn::named("headline")
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_json_str(r#"{"normalizer": {"placeholder_marker": ""}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = Config::default();
        config.labeling.vocabulary = KeywordVocabulary::new(["gain"], ["Gain"]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
