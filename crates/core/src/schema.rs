//! Schema-tagged records for the three input sources.
//!
//! Raw records hold cells exactly as they arrived. Cleaned records hold the
//! coerced values, where `None` is the missing-value marker for a cell that
//! failed to parse. Columns outside a schema's known set ride along in
//! `extras` untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::table::Table;
use crate::types::{CellValue, Row, SentimentLabel, SentimentScore};

/// Column holding the parsed instant in every schema.
pub const TIMESTAMP: &str = "timestamp";

pub const SYMBOL: &str = "symbol";
pub const PRICE: &str = "price";
pub const VOLUME: &str = "volume";
pub const EXCHANGE: &str = "exchange";
pub const TRADE_TYPE: &str = "trade_type";
pub const ORDER_ID: &str = "order_id";
pub const ACCOUNT_ID: &str = "account_id";

pub const ID: &str = "id";
pub const HEADLINE: &str = "headline";
pub const SOURCE: &str = "source";
pub const URL: &str = "url";
pub const RELATED_SYMBOLS: &str = "related_symbols";
pub const CATEGORY: &str = "category";
pub const SUMMARY: &str = "summary";

pub const SENTIMENT_LABEL: &str = "sentiment_label";
pub const CONFIDENCE_SCORE: &str = "confidence_score";

/// Derived column holding the classifier's label.
pub const AUTO_SENTIMENT_LABEL: &str = "auto_sentiment_label";
/// Derived column holding the classifier's raw confidence.
pub const AUTO_SENTIMENT_SCORE: &str = "auto_sentiment_score";

/// The three input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    Trades,
    News,
    SentimentLabels,
}

impl Schema {
    /// All schemas.
    pub const ALL: [Schema; 3] = [Schema::Trades, Schema::News, Schema::SentimentLabels];

    /// Columns without which the schema cannot be cleaned.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Schema::Trades => &[TIMESTAMP, PRICE, VOLUME],
            Schema::News => &[ID, TIMESTAMP],
            Schema::SentimentLabels => &[TIMESTAMP, CONFIDENCE_SCORE],
        }
    }

    /// Every column the schema gives meaning to, in canonical order.
    pub fn known_columns(self) -> &'static [&'static str] {
        match self {
            Schema::Trades => &[
                TIMESTAMP, SYMBOL, PRICE, VOLUME, EXCHANGE, TRADE_TYPE, ORDER_ID, ACCOUNT_ID,
            ],
            Schema::News => &[
                ID,
                TIMESTAMP,
                HEADLINE,
                SOURCE,
                URL,
                RELATED_SYMBOLS,
                CATEGORY,
                SUMMARY,
            ],
            Schema::SentimentLabels => &[ID, TIMESTAMP, SENTIMENT_LABEL, CONFIDENCE_SCORE],
        }
    }

    /// Columns of `table` the schema does not know. They travel in `extras`.
    pub fn extra_columns(self, table: &Table) -> Vec<&str> {
        let known = self.known_columns();
        table
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|column| !known.contains(column))
            .collect()
    }

    /// Fail on the first required column the table lacks.
    pub fn validate_columns(self, table: &Table) -> Result<()> {
        match self
            .required_columns()
            .iter()
            .find(|column| !table.has_column(column))
        {
            Some(column) => Err(Error::missing_column(self, *column)),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Schema::Trades => "trades",
            Schema::News => "news",
            Schema::SentimentLabels => "sentiment-labels",
        })
    }
}

/// Conversion back into a table row.
pub trait ToRow {
    fn to_row(&self) -> Row;
}

fn take(row: &mut Row, column: &str) -> CellValue {
    row.remove(column).unwrap_or_default()
}

/// A trade execution as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrade {
    pub timestamp: CellValue,
    pub symbol: CellValue,
    pub price: CellValue,
    pub volume: CellValue,
    pub exchange: CellValue,
    pub trade_type: CellValue,
    pub order_id: CellValue,
    pub account_id: CellValue,
    pub extras: Row,
}

impl RawTrade {
    /// Split a row into known fields and extras.
    pub fn from_row(mut row: Row) -> Self {
        Self {
            timestamp: take(&mut row, TIMESTAMP),
            symbol: take(&mut row, SYMBOL),
            price: take(&mut row, PRICE),
            volume: take(&mut row, VOLUME),
            exchange: take(&mut row, EXCHANGE),
            trade_type: take(&mut row, TRADE_TYPE),
            order_id: take(&mut row, ORDER_ID),
            account_id: take(&mut row, ACCOUNT_ID),
            extras: row,
        }
    }
}

/// A news item as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNewsItem {
    pub id: CellValue,
    pub timestamp: CellValue,
    pub headline: CellValue,
    pub source: CellValue,
    pub url: CellValue,
    pub related_symbols: CellValue,
    pub category: CellValue,
    pub summary: CellValue,
    pub extras: Row,
}

impl RawNewsItem {
    /// Split a row into known fields and extras.
    pub fn from_row(mut row: Row) -> Self {
        Self {
            id: take(&mut row, ID),
            timestamp: take(&mut row, TIMESTAMP),
            headline: take(&mut row, HEADLINE),
            source: take(&mut row, SOURCE),
            url: take(&mut row, URL),
            related_symbols: take(&mut row, RELATED_SYMBOLS),
            category: take(&mut row, CATEGORY),
            summary: take(&mut row, SUMMARY),
            extras: row,
        }
    }
}

/// A sentiment-label record as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentimentLabel {
    /// Identifying key of the labeled item.
    pub id: CellValue,
    pub timestamp: CellValue,
    pub sentiment_label: CellValue,
    pub confidence_score: CellValue,
    pub extras: Row,
}

impl RawSentimentLabel {
    /// Split a row into known fields and extras.
    pub fn from_row(mut row: Row) -> Self {
        Self {
            id: take(&mut row, ID),
            timestamp: take(&mut row, TIMESTAMP),
            sentiment_label: take(&mut row, SENTIMENT_LABEL),
            confidence_score: take(&mut row, CONFIDENCE_SCORE),
            extras: row,
        }
    }
}

/// A raw row tagged with its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Trade(RawTrade),
    News(RawNewsItem),
    SentimentLabel(RawSentimentLabel),
}

impl RawRecord {
    /// Decode a row under the given schema.
    pub fn from_row(schema: Schema, row: Row) -> Self {
        match schema {
            Schema::Trades => RawRecord::Trade(RawTrade::from_row(row)),
            Schema::News => RawRecord::News(RawNewsItem::from_row(row)),
            Schema::SentimentLabels => RawRecord::SentimentLabel(RawSentimentLabel::from_row(row)),
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            RawRecord::Trade(_) => Schema::Trades,
            RawRecord::News(_) => Schema::News,
            RawRecord::SentimentLabel(_) => Schema::SentimentLabels,
        }
    }
}

/// A trade after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTrade {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: CellValue,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub exchange: CellValue,
    pub trade_type: CellValue,
    pub order_id: CellValue,
    pub account_id: CellValue,
    pub extras: Row,
}

impl ToRow for CleanedTrade {
    fn to_row(&self) -> Row {
        let mut row = self.extras.clone();
        row.insert(TIMESTAMP.into(), self.timestamp.into());
        row.insert(SYMBOL.into(), self.symbol.clone());
        row.insert(PRICE.into(), self.price.into());
        row.insert(VOLUME.into(), self.volume.into());
        row.insert(EXCHANGE.into(), self.exchange.clone());
        row.insert(TRADE_TYPE.into(), self.trade_type.clone());
        row.insert(ORDER_ID.into(), self.order_id.clone());
        row.insert(ACCOUNT_ID.into(), self.account_id.clone());
        row
    }
}

/// Outcome of splitting the `related_symbols` field.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedSymbols {
    /// Text split on the delimiter, each element trimmed, order kept.
    Parsed(Vec<String>),
    /// Anything that was not text, passed through as it came.
    Untouched(CellValue),
}

impl RelatedSymbols {
    /// Parsed symbols, if the source was text.
    pub fn symbols(&self) -> Option<&[String]> {
        match self {
            RelatedSymbols::Parsed(symbols) => Some(symbols),
            RelatedSymbols::Untouched(_) => None,
        }
    }
}

impl From<&RelatedSymbols> for CellValue {
    fn from(symbols: &RelatedSymbols) -> Self {
        match symbols {
            RelatedSymbols::Parsed(list) => CellValue::List(list.clone()),
            RelatedSymbols::Untouched(cell) => cell.clone(),
        }
    }
}

/// A news item after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedNewsItem {
    pub id: CellValue,
    pub timestamp: Option<DateTime<Utc>>,
    pub headline: Option<String>,
    pub source: Option<String>,
    pub url: CellValue,
    pub related_symbols: RelatedSymbols,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub extras: Row,
}

impl ToRow for CleanedNewsItem {
    fn to_row(&self) -> Row {
        let mut row = self.extras.clone();
        row.insert(ID.into(), self.id.clone());
        row.insert(TIMESTAMP.into(), self.timestamp.into());
        row.insert(HEADLINE.into(), self.headline.clone().into());
        row.insert(SOURCE.into(), self.source.clone().into());
        row.insert(URL.into(), self.url.clone());
        row.insert(RELATED_SYMBOLS.into(), (&self.related_symbols).into());
        row.insert(CATEGORY.into(), self.category.clone().into());
        row.insert(SUMMARY.into(), self.summary.clone().into());
        row
    }
}

/// Free-text fields of a news item a classifier can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsTextField {
    Headline,
    Summary,
    Source,
    Category,
}

impl NewsTextField {
    /// Column name of the field.
    pub fn column(self) -> &'static str {
        match self {
            NewsTextField::Headline => HEADLINE,
            NewsTextField::Summary => SUMMARY,
            NewsTextField::Source => SOURCE,
            NewsTextField::Category => CATEGORY,
        }
    }

    /// Read the field from a cleaned item.
    pub fn get(self, item: &CleanedNewsItem) -> Option<&str> {
        match self {
            NewsTextField::Headline => item.headline.as_deref(),
            NewsTextField::Summary => item.summary.as_deref(),
            NewsTextField::Source => item.source.as_deref(),
            NewsTextField::Category => item.category.as_deref(),
        }
    }
}

/// A sentiment-label record after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSentimentLabel {
    pub id: CellValue,
    pub timestamp: Option<DateTime<Utc>>,
    /// Trimmed and lower-cased.
    pub sentiment_label: Option<String>,
    pub confidence_score: Option<f64>,
    pub extras: Row,
}

impl ToRow for CleanedSentimentLabel {
    fn to_row(&self) -> Row {
        let mut row = self.extras.clone();
        row.insert(ID.into(), self.id.clone());
        row.insert(TIMESTAMP.into(), self.timestamp.into());
        row.insert(SENTIMENT_LABEL.into(), self.sentiment_label.clone().into());
        row.insert(CONFIDENCE_SCORE.into(), self.confidence_score.into());
        row
    }
}

/// A cleaned row tagged with its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanedRecord {
    Trade(CleanedTrade),
    News(CleanedNewsItem),
    SentimentLabel(CleanedSentimentLabel),
}

impl ToRow for CleanedRecord {
    fn to_row(&self) -> Row {
        match self {
            CleanedRecord::Trade(r) => r.to_row(),
            CleanedRecord::News(r) => r.to_row(),
            CleanedRecord::SentimentLabel(r) => r.to_row(),
        }
    }
}

/// A cleaned news item with its derived sentiment.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledNewsItem {
    pub item: CleanedNewsItem,
    pub auto_sentiment_label: SentimentLabel,
    pub auto_sentiment_score: f64,
}

impl LabeledNewsItem {
    pub fn new(item: CleanedNewsItem, sentiment: SentimentScore) -> Self {
        Self {
            item,
            auto_sentiment_label: sentiment.label,
            auto_sentiment_score: sentiment.score,
        }
    }
}

impl ToRow for LabeledNewsItem {
    fn to_row(&self) -> Row {
        let mut row = self.item.to_row();
        row.insert(
            AUTO_SENTIMENT_LABEL.into(),
            CellValue::text(self.auto_sentiment_label.as_str()),
        );
        row.insert(
            AUTO_SENTIMENT_SCORE.into(),
            CellValue::float(self.auto_sentiment_score),
        );
        row
    }
}
