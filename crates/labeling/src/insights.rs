//! Insight extraction boundary.
//!
//! The cleaning and labeling stages never call an extractor. It sits beside
//! them for callers that want a text insight over cleaned data.

use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Contextual data handed to an extractor alongside the prompt.
pub type InsightContext = BTreeMap<String, Value>;

/// Anything that turns a prompt (and optional context) into a text insight.
///
/// Implementations validate nothing and have no failure mode; callers must
/// not depend on them for correctness.
pub trait InsightExtractor {
    /// Model identifier.
    fn model_name(&self) -> &str;

    /// Produce an insight for the prompt.
    fn extract(&self, prompt: &str, context: Option<&InsightContext>) -> String;
}

/// Canned-response extractor keyed on prompt keywords.
#[derive(Debug, Clone)]
pub struct MockInsightExtractor {
    model_name: String,
    simulated_latency: Duration,
}

impl MockInsightExtractor {
    /// Create a mock with no simulated latency.
    pub fn new(model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        info!(model = %model_name, "Running insight extractor in offline/mock mode");
        Self {
            model_name,
            simulated_latency: Duration::ZERO,
        }
    }

    /// Sleep this long on every call.
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }
}

impl Default for MockInsightExtractor {
    fn default() -> Self {
        Self::new("mock-llm-v1")
    }
}

impl InsightExtractor for MockInsightExtractor {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn extract(&self, prompt: &str, context: Option<&InsightContext>) -> String {
        debug!(model = %self.model_name, prompt, "Received prompt");
        if let Some(context) = context {
            debug!(keys = ?context.keys().collect::<Vec<_>>(), "Context data provided");
        }

        if !self.simulated_latency.is_zero() {
            std::thread::sleep(self.simulated_latency);
        }

        let lowered = prompt.to_lowercase();
        let response = if lowered.contains("summarize") {
            "[Simulated Summary] Based on the provided context, the key developments involve \
             market volatility and potential regulatory shifts. Overall sentiment appears mixed."
                .to_string()
        } else if lowered.contains("sentiment") {
            "[Simulated Sentiment Analysis] The sentiment analysis suggests a predominantly \
             neutral outlook, with pockets of optimism related to specific project updates."
                .to_string()
        } else if lowered.contains("explain") {
            "[Simulated Explanation] This technical indicator suggests [explanation based on \
             simulated understanding of the indicator mentioned in prompt]."
                .to_string()
        } else if lowered.contains("signals") {
            "[Simulated Trading Signal] Based on recent patterns, potential signals include \
             [example signal, e.g., monitoring resistance level at X]. Remember this is not \
             financial advice."
                .to_string()
        } else {
            let head: String = prompt.chars().take(50).collect();
            format!(
                "[Simulated Generic Response] The model processed the prompt regarding '{}...' \
                 and generated this generic insight. More specific capabilities would require \
                 analyzing the context data.",
                head
            )
        };

        debug!(model = %self.model_name, response = %response, "Generated response");
        response
    }
}
