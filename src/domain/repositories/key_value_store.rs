use async_trait::async_trait;

use crate::domain::errors::TemplateResult;

/// Durable byte slots keyed by name
///
/// Each `set` replaces the slot's previous value entirely.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> TemplateResult<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>) -> TemplateResult<()>;
}
