// Handler Registry - command tags mapped to pure handler functions

use crate::port::{CommandHandler, HandlerError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Registry of command handlers keyed by tag
///
/// Built once before pool initialization and shared read-only with every
/// worker. Adding a new command tag means registering a handler here; the
/// pool and the caller surface stay untouched.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under a tag
    ///
    /// Registering the same tag twice replaces the previous handler.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        let tag = tag.into();
        if self.handlers.insert(tag.clone(), Arc::new(handler)).is_some() {
            warn!(tag = %tag, "Handler re-registered, previous handler replaced");
        }
        self
    }

    /// Register a plain function or closure under a tag
    pub fn register_fn<F>(&mut self, tag: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&serde_json::Value) -> std::result::Result<serde_json::Value, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.register(tag, f)
    }

    /// Look up the handler for a tag
    pub fn get(&self, tag: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(tag).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered tags, sorted (for logs and diagnostics)
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.handlers.keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
