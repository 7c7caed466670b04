//! Keyword sentiment classification.
//!
//! Counts distinct positive and negative marker words found as substrings of
//! the lower-cased text. The larger count wins and becomes the confidence;
//! a tie (including none at all) is Neutral with confidence zero.

use insight_core::{
    CellValue, CleanedNewsItem, Error, KeywordVocabulary, LabeledNewsItem, NewsTextField, Result,
    RowKey, SentimentLabel, SentimentScore, Table, AUTO_SENTIMENT_LABEL, AUTO_SENTIMENT_SCORE,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Per-label row counts from one labeling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl LabelDistribution {
    /// Count one label.
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    /// Total rows counted.
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    fn log(&self, column: &str) {
        info!(
            column,
            positive = self.positive,
            negative = self.negative,
            neutral = self.neutral,
            "Sentiment labeling complete"
        );
    }
}

/// Rule-based classifier over an injected vocabulary.
#[derive(Debug, Clone)]
pub struct KeywordSentimentClassifier {
    /// Lower-cased positive markers.
    positive: Vec<String>,
    /// Lower-cased negative markers.
    negative: Vec<String>,
}

impl KeywordSentimentClassifier {
    /// Create a classifier. Markers are lower-cased and de-duplicated so each
    /// counts at most once.
    pub fn new(vocabulary: &KeywordVocabulary) -> Self {
        Self {
            positive: prepare_markers(&vocabulary.positive),
            negative: prepare_markers(&vocabulary.negative),
        }
    }

    /// Classify a piece of text.
    pub fn classify_text(&self, text: &str) -> SentimentScore {
        let lowered = text.to_lowercase();
        let pos_count = count_markers(&self.positive, &lowered);
        let neg_count = count_markers(&self.negative, &lowered);

        if pos_count > neg_count {
            SentimentScore {
                label: SentimentLabel::Positive,
                score: pos_count as f64,
            }
        } else if neg_count > pos_count {
            SentimentScore {
                label: SentimentLabel::Negative,
                score: neg_count as f64,
            }
        } else {
            SentimentScore::neutral()
        }
    }

    /// Classify a cell. Anything but text is Neutral.
    pub fn classify_cell(&self, cell: &CellValue) -> SentimentScore {
        match cell {
            CellValue::Text(text) => self.classify_text(text),
            _ => SentimentScore::neutral(),
        }
    }

    /// Classify a text column and append the label and score columns.
    ///
    /// The input is borrowed and never modified. If `column` does not exist,
    /// nothing is labeled and `Error::UnknownColumn` is returned; the caller
    /// still holds its table unchanged. Missing cells are read as empty text,
    /// other non-text cells through their string form.
    pub fn label_table(&self, table: &Table, column: &str) -> Result<Table> {
        info!(column, rows = table.len(), "Applying keyword-based sentiment labeling");
        if !table.has_column(column) {
            warn!(column, "Column not found; table left unlabeled");
            return Err(Error::unknown_column(column));
        }

        let mut labels = BTreeMap::new();
        let mut scores = BTreeMap::new();
        let mut distribution = LabelDistribution::default();

        for (key, row) in table.rows() {
            let sentiment = match row.get(column) {
                None | Some(CellValue::Null) => self.classify_text(""),
                Some(CellValue::Text(text)) => self.classify_text(text),
                Some(other) => self.classify_text(&other.to_display_string()),
            };
            distribution.record(sentiment.label);
            labels.insert(key, CellValue::text(sentiment.label.as_str()));
            scores.insert(key, CellValue::float(sentiment.score));
        }

        let mut labeled = table.clone();
        labeled.set_column(AUTO_SENTIMENT_LABEL, labels);
        labeled.set_column(AUTO_SENTIMENT_SCORE, scores);
        distribution.log(column);
        Ok(labeled)
    }

    /// Label cleaned news items on one of their text fields.
    ///
    /// Items whose field is missing are classified as empty text.
    pub fn label_news(
        &self,
        items: &BTreeMap<RowKey, CleanedNewsItem>,
        field: NewsTextField,
    ) -> BTreeMap<RowKey, LabeledNewsItem> {
        let mut distribution = LabelDistribution::default();
        let labeled: BTreeMap<RowKey, LabeledNewsItem> = items
            .iter()
            .map(|(key, item)| {
                let sentiment = self.classify_text(field.get(item).unwrap_or(""));
                distribution.record(sentiment.label);
                (*key, LabeledNewsItem::new(item.clone(), sentiment))
            })
            .collect();
        distribution.log(field.column());
        labeled
    }
}

impl Default for KeywordSentimentClassifier {
    fn default() -> Self {
        Self::new(&KeywordVocabulary::default())
    }
}

/// Classify with the default vocabulary. `None` stands for non-text input.
pub fn label_sentiment_keywords(text: Option<&str>) -> SentimentScore {
    match text {
        Some(text) => KeywordSentimentClassifier::default().classify_text(text),
        None => SentimentScore::neutral(),
    }
}

fn prepare_markers(words: &[String]) -> Vec<String> {
    let mut markers: Vec<String> = words.iter().map(|w| w.trim().to_lowercase()).collect();
    markers.retain(|m| !m.is_empty());
    markers.sort();
    markers.dedup();
    markers
}

fn count_markers(markers: &[String], lowered: &str) -> usize {
    markers.iter().filter(|m| lowered.contains(m.as_str())).count()
}
