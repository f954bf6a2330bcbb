//! Chat responder: external completion service with a local template fallback
//!
//! With the AI toggle on, one completion attempt is made; any failure,
//! unrecognized reply or too-short cleaned text drops to the local
//! selector. With the toggle off the local selector always answers and the
//! exchange is persisted, best effort.

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::cleanup::ResponseCleaner;
use crate::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::{CompletionConfig, StoreConfig};
use crate::selector::respond_locally;
use crate::store::{persist_exchange, ExchangeStore};
use crate::types::{ExchangeRecord, Reply, ResponseSource};

pub struct Responder<'c> {
    catalog: &'c Catalog,
    completion: Option<Box<dyn CompletionClient>>,
    completion_config: CompletionConfig,
    store: Option<Box<dyn ExchangeStore>>,
    tables: Vec<String>,
    cleaner: ResponseCleaner,
}

impl<'c> Responder<'c> {
    /// Local-only responder over a catalog
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            completion: None,
            completion_config: CompletionConfig::default(),
            store: None,
            tables: StoreConfig::default().tables,
            cleaner: ResponseCleaner::new(),
        }
    }

    pub fn with_completion(mut self, client: Box<dyn CompletionClient>, config: CompletionConfig) -> Self {
        self.completion = Some(client);
        self.completion_config = config;
        self
    }

    pub fn with_store(mut self, store: Box<dyn ExchangeStore>, tables: Vec<String>) -> Self {
        self.store = Some(store);
        self.tables = tables;
        self
    }

    /// Answer one message. Never fails.
    pub fn respond(&self, user_id: &str, message: &str, ai_enabled: bool) -> Reply {
        if ai_enabled {
            match self.ask_completion(message) {
                Ok(text) => {
                    return Reply {
                        text,
                        source: ResponseSource::Ai,
                        intent_id: None,
                    }
                }
                Err(e) => debug!("completion unavailable, answering locally: {}", e),
            }
            return self.local_reply(message, ResponseSource::Fallback);
        }

        let reply = self.local_reply(message, ResponseSource::Manual);
        self.persist(user_id, message, &reply);
        reply
    }

    /// Local selector only, no persistence
    pub fn local_reply(&self, message: &str, source: ResponseSource) -> Reply {
        let (selection, text) = respond_locally(self.catalog, message);
        Reply {
            text,
            source,
            intent_id: selection.intent().map(|i| i.id.clone()),
        }
    }

    fn ask_completion(&self, message: &str) -> Result<String, CompletionError> {
        let client = self.completion.as_ref().ok_or(CompletionError::NotConfigured)?;
        let request = CompletionRequest::for_question(&self.completion_config, message);
        let raw = client.complete(&request)?.into_text()?;

        let cleaned = self.cleaner.clean(&raw);
        let length = cleaned.chars().count();
        if length < self.completion_config.min_reply_chars {
            return Err(CompletionError::TooShort(length));
        }
        Ok(cleaned)
    }

    fn persist(&self, user_id: &str, message: &str, reply: &Reply) {
        let Some(store) = &self.store else {
            return;
        };
        let record = ExchangeRecord::new(user_id, message, reply, false);
        match persist_exchange(&**store, &self.tables, &record) {
            Ok(table) => debug!(table = %table, "exchange saved"),
            Err(e) => warn!(user_id, "failed to save exchange: {}", e),
        }
    }
}
