use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::TemplateResult;
use crate::domain::repositories::KeyValueStore;

/// Volatile KeyValueStore backed by a map
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> TemplateResult<Option<Vec<u8>>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> TemplateResult<()> {
        self.slots.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_replaces_previous_value() {
        let store = MemoryKeyValueStore::new();

        store.set("k", b"one".to_vec()).await.unwrap();
        store.set("k", b"two".to_vec()).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.get("other").await.unwrap(), None);
    }
}
