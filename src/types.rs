//! Core data types for the legal-query responder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A legal topic the local responder can answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: String,
    /// Phrases whose presence is the strongest signal
    pub keywords: Vec<String>,
    /// Weaker related terms
    pub synonyms: Vec<String>,
    pub template_index: usize,
}

impl Intent {
    pub fn new(id: &str, keywords: &[&str], synonyms: &[&str], template_index: usize) -> Self {
        Self {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            template_index,
        }
    }
}

/// An intent paired with its score for one query. Never outlives the call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIntent<'a> {
    pub intent: &'a Intent,
    pub score: f64,
}

/// Outcome of selection over a catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// Best intent reached the confidence threshold
    Intent(ScoredIntent<'a>),
    /// Nothing scored high enough; `best` is the top candidate, if any
    Fallback { best: Option<ScoredIntent<'a>> },
}

impl<'a> Selection<'a> {
    pub fn intent(&self) -> Option<&'a Intent> {
        match self {
            Selection::Intent(scored) => Some(scored.intent),
            Selection::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback { .. })
    }
}

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// External completion service
    Ai,
    /// Local templates with the AI toggle off
    Manual,
    /// Local templates after the completion service failed
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Ai => "ai",
            ResponseSource::Manual => "manual",
            ResponseSource::Fallback => "fallback",
        }
    }
}

/// A rendered answer to one user message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ResponseSource,
    /// Matched intent id when the local responder picked a specific topic
    pub intent_id: Option<String>,
}

/// One user/assistant exchange as written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub user_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub is_ai_enabled: bool,
    pub response_source: ResponseSource,
    pub created_at: DateTime<Utc>,
}

impl ExchangeRecord {
    pub fn new(user_id: &str, user_message: &str, reply: &Reply, is_ai_enabled: bool) -> Self {
        Self {
            user_id: user_id.to_string(),
            user_message: user_message.to_string(),
            ai_response: reply.text.clone(),
            is_ai_enabled,
            response_source: reply.source,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_source_serializes_lowercase() {
        let json = serde_json::to_string(&ResponseSource::Manual).unwrap();
        assert_eq!(json, "\"manual\"");
        assert_eq!(ResponseSource::Fallback.as_str(), "fallback");
    }

    #[test]
    fn test_exchange_record_shape() {
        let reply = Reply {
            text: "نص".to_string(),
            source: ResponseSource::Manual,
            intent_id: None,
        };
        let record = ExchangeRecord::new("u1", "سؤال", &reply, false);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["user_id"], "u1");
        assert_eq!(value["ai_response"], "نص");
        assert_eq!(value["is_ai_enabled"], false);
        assert_eq!(value["response_source"], "manual");
        assert!(value["created_at"].is_string());
    }
}
