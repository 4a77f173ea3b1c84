// Local history of template usage
//
// The whole log lives in one key-value slot and is rewritten on every append.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::record::UsageRecord;
use crate::domain::errors::TemplateResult;
use crate::domain::repositories::KeyValueStore;

/// Slot holding the serialized log
pub const USAGE_LOG_KEY: &str = "templateUsageSessions";

/// Number of records kept; older ones are dropped first
pub const MAX_USAGE_RECORDS: usize = 10;

/// Capped, newest-first log of usage records
///
/// # Invariants
/// - At most `MAX_USAGE_RECORDS` records are persisted
/// - Records are ordered most recent first
/// - Appends are serialized so concurrent writers never lose updates
pub struct UsageLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl UsageLog {
    /// Creates a log persisted under the default slot
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, USAGE_LOG_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Reads the persisted log
    ///
    /// A missing or unreadable slot yields an empty log, and an oversized one
    /// is cut to the newest `MAX_USAGE_RECORDS`. Only failures of the store
    /// itself are returned as errors.
    pub async fn load_all(&self) -> TemplateResult<Vec<UsageRecord>> {
        let Some(bytes) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Vec<UsageRecord>>(&bytes) {
            Ok(mut records) => {
                records.truncate(MAX_USAGE_RECORDS);
                Ok(records)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding corrupt usage log");
                Ok(Vec::new())
            }
        }
    }

    /// Prepends a record, trims to the cap and rewrites the slot
    pub async fn append(&self, record: UsageRecord) -> TemplateResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load_all().await?;
        records.insert(0, record);
        records.truncate(MAX_USAGE_RECORDS);

        self.persist(&records).await?;
        debug!(key = %self.key, len = records.len(), "Usage log updated");
        Ok(())
    }

    /// Replaces the log with an empty one
    pub async fn clear(&self) -> TemplateResult<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&[]).await
    }

    async fn persist(&self, records: &[UsageRecord]) -> TemplateResult<()> {
        let bytes = serde_json::to_vec(records)?;
        self.store.set(&self.key, bytes).await
    }
}
