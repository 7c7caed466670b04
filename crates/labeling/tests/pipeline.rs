//! End-to-end: raw JSON tables through cleaning and labeling.

use insight_cleaning::RecordNormalizer;
use insight_core::{
    CellValue, Config, Error, NewsTextField, RelatedSymbols, SentimentLabel, Table,
    AUTO_SENTIMENT_LABEL, AUTO_SENTIMENT_SCORE,
};
use insight_labeling::KeywordSentimentClassifier;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const RAW_NEWS: &str = r#"{
    "0": {"id": "NEWS-001", "timestamp": "2023-10-26T09:00:00Z",
          "headline": " Bitcoin Surges Past $34,000 Amid Spot ETF Optimism ",
          "source": "Source A", "url": "url1", "related_symbols": "BTC-USD;ETH-USD",
          "category": "Market Trend", "summary": "Summary 1"},
    "1": {"id": "NEWS-002", "timestamp": "2023-10-26T09:30:00Z",
          "headline": "Ethereum Staking Rewards See Slight Dip",
          "source": "Source B", "url": "url2", "related_symbols": "ETH-USD",
          "category": "Update", "summary": " Summary 2 "},
    "2": {"id": "...", "timestamp": "placeholder", "headline": "comment",
          "source": "ignore", "url": "this", "related_symbols": "row",
          "category": "", "summary": ""},
    "3": {"id": "NEWS-004", "timestamp": "not a date",
          "headline": "Regulatory Uncertainty Weighs on Cardano Development",
          "source": "Source C", "url": "url4", "related_symbols": null,
          "category": "Regulation", "summary": null}
}"#;

#[test]
fn clean_then_label_news_table() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::default();
    let raw = Table::from_json_str(RAW_NEWS)?;

    let cleaned = RecordNormalizer::new(config.normalizer.clone()).clean_news(&raw)?;
    assert_eq!(cleaned.len(), raw.len() - 1);
    assert_eq!(cleaned.stats.placeholder_rows, 1);
    assert_eq!(cleaned.stats.null_timestamps, 1);

    let classifier = KeywordSentimentClassifier::new(&config.labeling.vocabulary);
    let labeled = classifier.label_table(&cleaned.to_table(), config.labeling.text_field.column())?;

    assert_eq!(labeled.row_keys().collect::<Vec<_>>(), vec![0, 1, 3]);
    assert_eq!(labeled.cell(0, AUTO_SENTIMENT_LABEL), &CellValue::text("Positive"));
    assert_eq!(labeled.cell(0, AUTO_SENTIMENT_SCORE), &CellValue::float(2.0));
    assert_eq!(labeled.cell(1, AUTO_SENTIMENT_LABEL), &CellValue::text("Negative"));
    assert_eq!(labeled.cell(3, AUTO_SENTIMENT_LABEL), &CellValue::text("Negative"));
    assert_eq!(labeled.cell(3, AUTO_SENTIMENT_SCORE), &CellValue::float(2.0));

    assert_eq!(
        labeled.cell(0, "related_symbols"),
        &CellValue::List(vec!["BTC-USD".into(), "ETH-USD".into()])
    );
    assert_eq!(labeled.cell(3, "related_symbols"), &CellValue::Null);
    assert_eq!(labeled.cell(3, "timestamp"), &CellValue::Null);
    Ok(())
}

#[test]
fn typed_labeling_matches_table_labeling() -> anyhow::Result<()> {
    init_tracing();
    let raw = Table::from_json_str(RAW_NEWS)?;
    let cleaned = RecordNormalizer::default().clean_news(&raw)?;
    let classifier = KeywordSentimentClassifier::default();

    let typed = classifier.label_news(&cleaned.records, NewsTextField::Headline);
    let table = classifier.label_table(&cleaned.to_table(), "headline")?;

    for (key, item) in &typed {
        assert_eq!(
            table.cell(*key, AUTO_SENTIMENT_LABEL),
            &CellValue::text(item.auto_sentiment_label.as_str())
        );
    }
    assert_eq!(typed[&0].auto_sentiment_label, SentimentLabel::Positive);
    assert_eq!(
        typed[&0].item.related_symbols,
        RelatedSymbols::Parsed(vec!["BTC-USD".into(), "ETH-USD".into()])
    );
    Ok(())
}

#[test]
fn unknown_column_leaves_table_unlabeled() -> anyhow::Result<()> {
    init_tracing();
    let cleaned = RecordNormalizer::default()
        .clean_news(&Table::from_json_str(RAW_NEWS)?)?
        .to_table();
    let before = cleaned.clone();

    let result = KeywordSentimentClassifier::default().label_table(&cleaned, "body");

    assert!(matches!(result, Err(Error::UnknownColumn(_))));
    assert_eq!(cleaned.columns(), before.columns());
    assert_eq!(cleaned, before);
    Ok(())
}

#[test]
fn malformed_input_is_a_structural_error() {
    init_tracing();
    let err = Table::from_json_str(r#"["not", "rows"]"#).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn config_drives_both_stages() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_json_str(
        r#"{
            "normalizer": {"news_marker_column": "first_column"},
            "labeling": {
                "text_field": "summary",
                "vocabulary": {"positive": ["summary 1"], "negative": []}
            }
        }"#,
    )?;

    let cleaned = RecordNormalizer::new(config.normalizer).clean_news(&Table::from_json_str(RAW_NEWS)?)?;
    let classifier = KeywordSentimentClassifier::new(&config.labeling.vocabulary);
    let labeled = classifier.label_news(&cleaned.records, config.labeling.text_field);

    assert_eq!(labeled[&0].auto_sentiment_label, SentimentLabel::Positive);
    assert_eq!(labeled[&1].auto_sentiment_label, SentimentLabel::Neutral);
    Ok(())
}

#[test]
fn cleaned_table_round_trips_through_json() -> anyhow::Result<()> {
    init_tracing();
    let normalizer = RecordNormalizer::default();
    let once = normalizer.clean_news(&Table::from_json_str(RAW_NEWS)?)?.to_table();

    let reloaded = Table::from_json_str(&once.to_json_string()?)?;
    let again = normalizer.clean_news(&reloaded)?.to_table();

    assert_eq!(again.len(), once.len());
    assert_eq!(again.cell(0, "timestamp"), once.cell(0, "timestamp"));
    assert_eq!(again.cell(0, "related_symbols"), once.cell(0, "related_symbols"));
    Ok(())
}
