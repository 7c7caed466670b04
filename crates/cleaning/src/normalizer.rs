//! Record normalization for the three input schemas.
//!
//! Each operation runs the same stages: drop placeholder rows using the
//! untouched marker cell, then coerce timestamps, numbers, text and symbol
//! lists. Per-cell failures become missing values and are only counted.

use chrono::{DateTime, Utc};
use insight_core::{
    CellValue, CleanedNewsItem, CleanedRecord, CleanedSentimentLabel, CleanedTrade, Error,
    MarkerColumn, NormalizerConfig, RawNewsItem, RawRecord, RawSentimentLabel, RawTrade, Result,
    Row, RowKey, Schema, Table, ToRow,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::coerce::{normalize_label, normalize_text, parse_numeric, split_symbols, TimestampParser};

/// Diagnostic counters for one cleaning pass. Observational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Rows in the input table.
    pub input_rows: usize,
    /// Rows dropped as placeholders.
    pub placeholder_rows: usize,
    /// Rows in the output.
    pub output_rows: usize,
    /// Missing timestamps after coercion.
    pub null_timestamps: usize,
    /// Missing prices after coercion (trades).
    pub null_prices: usize,
    /// Missing volumes after coercion (trades).
    pub null_volumes: usize,
    /// Missing confidence scores after coercion (sentiment labels).
    pub null_confidence_scores: usize,
    /// `related_symbols` values left untouched because they were not text (news).
    pub unparsed_symbol_lists: usize,
}

impl NormalizationStats {
    /// Rows removed by the pass.
    pub fn removed_rows(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Output of a cleaning pass: records keyed by original row key.
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned<T> {
    /// Input columns, in input order.
    columns: Vec<String>,
    /// Cleaned records by original row key.
    pub records: BTreeMap<RowKey, T>,
    /// Counters collected while cleaning.
    pub stats: NormalizationStats,
}

impl<T> Cleaned<T> {
    /// Columns of the input table.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of surviving rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Did every row get dropped?
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for an original row key.
    pub fn get(&self, key: RowKey) -> Option<&T> {
        self.records.get(&key)
    }
}

impl<T: ToRow> Cleaned<T> {
    /// Render as a table with the input's column set and order.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.columns.iter().cloned());
        for (key, record) in &self.records {
            let mut row = record.to_row();
            row.retain(|column, _| self.columns.contains(column));
            table.insert_row(*key, row);
        }
        table
    }
}

/// Cleans raw trade, news and sentiment-label tables.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    config: NormalizerConfig,
    timestamps: TimestampParser,
}

impl RecordNormalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: NormalizerConfig) -> Self {
        let timestamps = TimestampParser::new(&config.extra_timestamp_formats);
        Self { config, timestamps }
    }

    /// Configuration in use.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Clean a trades table: timestamp, price and volume are coerced.
    pub fn clean_trades(&self, table: &Table) -> Result<Cleaned<CleanedTrade>> {
        self.run(Schema::Trades, table, |row, stats| {
            self.clean_trade(RawTrade::from_row(row), stats)
        })
    }

    /// Clean a news table: timestamp coerced, text trimmed, symbols split.
    pub fn clean_news(&self, table: &Table) -> Result<Cleaned<CleanedNewsItem>> {
        self.run(Schema::News, table, |row, stats| {
            self.clean_news_item(RawNewsItem::from_row(row), stats)
        })
    }

    /// Clean a sentiment-labels table: timestamp and confidence coerced,
    /// label trimmed and lower-cased.
    pub fn clean_sentiment_labels(&self, table: &Table) -> Result<Cleaned<CleanedSentimentLabel>> {
        self.run(Schema::SentimentLabels, table, |row, stats| {
            self.clean_sentiment_label(RawSentimentLabel::from_row(row), stats)
        })
    }

    /// Clean a table under a schema chosen at runtime.
    pub fn clean(&self, schema: Schema, table: &Table) -> Result<Cleaned<CleanedRecord>> {
        self.run(schema, table, |row, stats| {
            self.clean_record(RawRecord::from_row(schema, row), stats)
        })
    }

    /// Clean one schema-tagged record.
    pub fn clean_record(&self, raw: RawRecord, stats: &mut NormalizationStats) -> CleanedRecord {
        match raw {
            RawRecord::Trade(r) => CleanedRecord::Trade(self.clean_trade(r, stats)),
            RawRecord::News(r) => CleanedRecord::News(self.clean_news_item(r, stats)),
            RawRecord::SentimentLabel(r) => {
                CleanedRecord::SentimentLabel(self.clean_sentiment_label(r, stats))
            }
        }
    }

    /// Is this marker cell a placeholder?
    pub fn is_placeholder(&self, marker: &CellValue) -> bool {
        marker
            .to_display_string()
            .starts_with(&self.config.placeholder_marker)
    }

    /// Rows that survive placeholder filtering, with the number dropped.
    ///
    /// Looks only at the original marker cell; nothing has been coerced yet.
    pub fn filter_placeholders<'a>(
        &self,
        schema: Schema,
        table: &'a Table,
    ) -> Result<(Vec<(RowKey, &'a Row)>, usize)> {
        let Some(marker_column) = self.resolve_marker_column(schema, table)? else {
            return Ok((table.rows().collect(), 0));
        };

        let mut dropped = 0;
        let survivors = table
            .rows()
            .filter(|(key, _)| {
                let placeholder = self.is_placeholder(table.cell(*key, marker_column));
                if placeholder {
                    dropped += 1;
                }
                !placeholder
            })
            .collect();
        Ok((survivors, dropped))
    }

    fn resolve_marker_column<'a>(&'a self, schema: Schema, table: &'a Table) -> Result<Option<&'a str>> {
        match self.config.marker_column(schema) {
            MarkerColumn::Named(name) => {
                if table.has_column(name) {
                    Ok(Some(name.as_str()))
                } else {
                    Err(Error::missing_column(schema, name.clone()))
                }
            }
            MarkerColumn::FirstColumn => Ok(table.first_column()),
        }
    }

    fn run<T, F>(&self, schema: Schema, table: &Table, mut clean_row: F) -> Result<Cleaned<T>>
    where
        F: FnMut(Row, &mut NormalizationStats) -> T,
    {
        info!(%schema, rows = table.len(), "Cleaning table");
        schema.validate_columns(table)?;
        let extras = schema.extra_columns(table);
        if !extras.is_empty() {
            debug!(%schema, ?extras, "Carrying unknown columns through");
        }

        let (survivors, dropped) = self.filter_placeholders(schema, table)?;

        let mut stats = NormalizationStats {
            input_rows: table.len(),
            placeholder_rows: dropped,
            ..Default::default()
        };

        let records: BTreeMap<RowKey, T> = survivors
            .into_iter()
            .map(|(key, row)| (key, clean_row(row.clone(), &mut stats)))
            .collect();
        stats.output_rows = records.len();

        info!(%schema, removed = stats.removed_rows(), "Removed invalid/comment rows");
        debug!(
            %schema,
            null_timestamps = stats.null_timestamps,
            null_prices = stats.null_prices,
            null_volumes = stats.null_volumes,
            null_confidence_scores = stats.null_confidence_scores,
            unparsed_symbol_lists = stats.unparsed_symbol_lists,
            "Missing values after conversion"
        );
        info!(
            %schema,
            rows = stats.output_rows,
            columns = table.columns().len(),
            "Cleaned table shape"
        );

        Ok(Cleaned {
            columns: table.columns().to_vec(),
            records,
            stats,
        })
    }

    fn clean_timestamp(&self, cell: &CellValue, stats: &mut NormalizationStats) -> Option<DateTime<Utc>> {
        let ts = self.timestamps.parse(cell);
        if ts.is_none() {
            stats.null_timestamps += 1;
        }
        ts
    }

    fn clean_trade(&self, raw: RawTrade, stats: &mut NormalizationStats) -> CleanedTrade {
        let price = parse_numeric(&raw.price);
        if price.is_none() {
            stats.null_prices += 1;
        }
        let volume = parse_numeric(&raw.volume);
        if volume.is_none() {
            stats.null_volumes += 1;
        }

        CleanedTrade {
            timestamp: self.clean_timestamp(&raw.timestamp, stats),
            symbol: raw.symbol,
            price,
            volume,
            exchange: raw.exchange,
            trade_type: raw.trade_type,
            order_id: raw.order_id,
            account_id: raw.account_id,
            extras: raw.extras,
        }
    }

    fn clean_news_item(&self, raw: RawNewsItem, stats: &mut NormalizationStats) -> CleanedNewsItem {
        let related_symbols = split_symbols(&raw.related_symbols, &self.config.symbol_delimiter);
        if related_symbols.symbols().is_none() {
            stats.unparsed_symbol_lists += 1;
        }

        CleanedNewsItem {
            id: raw.id,
            timestamp: self.clean_timestamp(&raw.timestamp, stats),
            headline: normalize_text(&raw.headline),
            source: normalize_text(&raw.source),
            url: raw.url,
            related_symbols,
            category: normalize_text(&raw.category),
            summary: normalize_text(&raw.summary),
            extras: raw.extras,
        }
    }

    fn clean_sentiment_label(
        &self,
        raw: RawSentimentLabel,
        stats: &mut NormalizationStats,
    ) -> CleanedSentimentLabel {
        let confidence_score = parse_numeric(&raw.confidence_score);
        if confidence_score.is_none() {
            stats.null_confidence_scores += 1;
        }

        CleanedSentimentLabel {
            id: raw.id,
            timestamp: self.clean_timestamp(&raw.timestamp, stats),
            sentiment_label: normalize_label(&raw.sentiment_label),
            confidence_score,
            extras: raw.extras,
        }
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}
