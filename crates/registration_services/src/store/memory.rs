use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkin_core::Identifier;
use tokio::sync::RwLock;

use super::CheckinStore;
use crate::types::{CheckinRecord, RejectionRecord, StoreError};

/// Process-local store, used for tests and throwaway demo servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    checkins: RwLock<BTreeMap<Identifier, DateTime<Utc>>>,
    rejections: RwLock<HashMap<Identifier, RejectionRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckinStore for MemoryStore {
    async fn insert_checkin(&self, record: &CheckinRecord) -> Result<bool, StoreError> {
        let mut checkins = self.checkins.write().await;
        if checkins.contains_key(&record.identifier) {
            return Ok(false);
        }
        checkins.insert(record.identifier.clone(), record.registered_at);
        Ok(true)
    }

    async fn insert_rejection(&self, record: &RejectionRecord) -> Result<bool, StoreError> {
        let mut rejections = self.rejections.write().await;
        if rejections.contains_key(&record.identifier) {
            return Ok(false);
        }
        rejections.insert(record.identifier.clone(), record.clone());
        Ok(true)
    }

    async fn find_rejection(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<RejectionRecord>, StoreError> {
        Ok(self.rejections.read().await.get(identifier).cloned())
    }

    async fn list_checkins(&self) -> Result<Vec<CheckinRecord>, StoreError> {
        Ok(self
            .checkins
            .read()
            .await
            .iter()
            .map(|(identifier, registered_at)| CheckinRecord {
                identifier: identifier.clone(),
                registered_at: *registered_at,
            })
            .collect())
    }

    async fn clear_checkins(&self) -> Result<u64, StoreError> {
        let mut checkins = self.checkins.write().await;
        let removed = checkins.len() as u64;
        checkins.clear();
        Ok(removed)
    }
}
