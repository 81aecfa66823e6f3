//! Best-effort reading of the sentiment intent's structured reply.
//!
//! The model is asked for `{'sentiment': ..., 'confidence': ..., 'reason': ...}`
//! but nothing guarantees it complies. The raw text is always returned to the
//! caller; this only adds a validated view when one can be recovered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    fn parse(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "POSITIVE" | "POSITIF" => Some(Self::Positive),
            "NEGATIVE" | "NÉGATIF" | "NEGATIF" => Some(Self::Negative),
            "NEUTRAL" | "NEUTRE" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// Validated sentiment verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub sentiment: SentimentLabel,
    /// In `[0, 1]`
    pub confidence: f64,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    sentiment: String,
    confidence: serde_json::Value,
    #[serde(default)]
    reason: String,
}

/// Try to recover a verdict from the model's raw reply.
pub fn parse_sentiment(reply: &str) -> Option<SentimentAnalysis> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    let object = &reply[start..=end];

    let raw: RawVerdict = serde_json::from_str(object)
        .or_else(|_| serde_json::from_str(&object.replace('\'', "\"")))
        .ok()?;

    let confidence = match &raw.confidence {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }

    Some(SentimentAnalysis {
        sentiment: SentimentLabel::parse(&raw.sentiment)?,
        confidence,
        reason: raw.reason,
    })
}
