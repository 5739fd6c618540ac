//! Marker label resolution with find-or-create semantics
use std::collections::HashMap;
use tracing::{debug, info};

use crate::client::MailClient;
use crate::error::{ResponderError, Result};

/// Cached name -> id view of the account's labels
///
/// `ensure_label` looks the name up before ever creating, so at most one
/// label with a given name exists per account and repeated calls reuse the
/// first-created id. The lookup is case-insensitive because Gmail treats
/// label names that way.
pub struct LabelStore {
    cache: HashMap<String, String>, // lowercase name -> id
    loaded: bool,
}

impl LabelStore {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            loaded: false,
        }
    }

    /// Refresh the cache from the live label list
    pub async fn load(&mut self, client: &dyn MailClient) -> Result<usize> {
        let labels = client.list_labels().await?;
        let count = labels.len();

        self.cache.clear();
        for label in labels {
            self.cache.insert(label.name.to_lowercase(), label.id);
        }
        self.loaded = true;

        debug!("Loaded {} existing labels into cache", count);
        Ok(count)
    }

    /// Look up a label id by name without touching the network
    pub fn get(&self, name: &str) -> Option<&String> {
        self.cache.get(&name.to_lowercase())
    }

    /// Resolve a label id by name, creating the label if absent
    ///
    /// The live list is (re)fetched before the first create so a label made
    /// by an earlier run or by hand is always reused. The remaining
    /// check-then-create window is accepted as best-effort; the Gmail API
    /// has no conditional create.
    pub async fn ensure_label(&mut self, client: &dyn MailClient, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(ResponderError::LabelError(
                "Label name must not be empty".to_string(),
            ));
        }

        if let Some(id) = self.get(name) {
            return Ok(id.clone());
        }

        if !self.loaded {
            self.load(client).await?;
            if let Some(id) = self.get(name) {
                debug!("Label '{}' already exists", name);
                return Ok(id.clone());
            }
        }

        info!("Creating label: {}", name);
        let created = client.create_label(name).await.map_err(|e| {
            ResponderError::LabelError(format!("Failed to create label '{}': {}", name, e))
        })?;

        self.cache
            .insert(created.name.to_lowercase(), created.id.clone());

        info!("Created label '{}' with ID: {}", created.name, created.id);
        Ok(created.id)
    }
}

impl Default for LabelStore {
    fn default() -> Self {
        Self::new()
    }
}
