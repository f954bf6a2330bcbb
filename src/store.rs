//! Persistence of chat exchanges

use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::config::StoreConfig;
use crate::types::ExchangeRecord;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("no tables configured")]
    NoTables,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("table '{table}' rejected insert: status {status}")]
    Rejected { table: String, status: u16 },

    #[error("table '{0}' does not exist")]
    UnknownTable(String),
}

/// Insert-capable exchange store
pub trait ExchangeStore: Send + Sync {
    fn insert(&self, table: &str, record: &ExchangeRecord) -> Result<(), StoreError>;
}

/// Try each table in order; the first successful insert wins.
///
/// Returns the table written to, or the last error when every table fails.
pub fn persist_exchange(
    store: &dyn ExchangeStore,
    tables: &[String],
    record: &ExchangeRecord,
) -> Result<String, StoreError> {
    let mut last_error = StoreError::NoTables;

    for table in tables {
        match store.insert(table, record) {
            Ok(()) => return Ok(table.clone()),
            Err(e) => {
                debug!(table = %table, "insert failed, trying next table: {}", e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Store backed by a PostgREST-style HTTP API (`POST {base}/rest/v1/{table}`)
pub struct RestStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StoreError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Build from config; `None` when no base URL is set
    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>, StoreError> {
        match &config.base_url {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(url, config.api_key.clone())?)),
            _ => Ok(None),
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

impl ExchangeStore for RestStore {
    fn insert(&self, table: &str, record: &ExchangeRecord) -> Result<(), StoreError> {
        let mut request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(record);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| StoreError::Http(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Rejected {
                table: table.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// In-process store; tables listed as missing reject every insert
#[derive(Default)]
pub struct MemoryStore {
    missing_tables: Vec<String>,
    rows: Mutex<Vec<(String, ExchangeRecord)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_tables(missing: &[&str]) -> Self {
        Self {
            missing_tables: missing.iter().map(|t| t.to_string()).collect(),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of `(table, record)` rows in insertion order
    pub fn rows(&self) -> Vec<(String, ExchangeRecord)> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ExchangeStore for MemoryStore {
    fn insert(&self, table: &str, record: &ExchangeRecord) -> Result<(), StoreError> {
        if self.missing_tables.iter().any(|t| t == table) {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Http("memory store poisoned".to_string()))?;
        rows.push((table.to_string(), record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Reply, ResponseSource};

    fn record() -> ExchangeRecord {
        let reply = Reply {
            text: "رد".to_string(),
            source: ResponseSource::Manual,
            intent_id: None,
        };
        ExchangeRecord::new("user-1", "سؤال", &reply, false)
    }

    fn tables() -> Vec<String> {
        StoreConfig::default().tables
    }

    #[test]
    fn test_first_table_used() {
        let store = MemoryStore::new();
        let table = persist_exchange(&store, &tables(), &record()).unwrap();
        assert_eq!(table, "chat_history");
        assert_eq!(store.rows().len(), 1);
    }

    #[test]
    fn test_falls_back_to_second_table() {
        let store = MemoryStore::without_tables(&["chat_history"]);
        let table = persist_exchange(&store, &tables(), &record()).unwrap();
        assert_eq!(table, "ai_chat_history");
        assert_eq!(store.rows()[0].0, "ai_chat_history");
    }

    #[test]
    fn test_all_tables_fail_returns_last_error() {
        let store = MemoryStore::without_tables(&["chat_history", "ai_chat_history"]);
        let err = persist_exchange(&store, &tables(), &record()).unwrap_err();
        assert_eq!(err, StoreError::UnknownTable("ai_chat_history".into()));
        assert!(store.rows().is_empty());
    }

    #[test]
    fn test_no_tables() {
        let store = MemoryStore::new();
        assert_eq!(
            persist_exchange(&store, &[], &record()).unwrap_err(),
            StoreError::NoTables
        );
    }

    #[test]
    fn test_rest_store_urls() {
        let store = RestStore::new("https://db.example.com/", Some("k".into())).unwrap();
        assert_eq!(store.table_url("chat_history"), "https://db.example.com/rest/v1/chat_history");
        assert!(RestStore::from_config(&StoreConfig::default()).unwrap().is_none());
    }
}
