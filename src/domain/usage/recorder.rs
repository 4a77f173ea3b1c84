use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::repositories::TemplateRepository;
use crate::domain::template::VariableValues;

/// Best-effort reporter of template usage to the template service
///
/// Each report runs as a detached task. Failures are logged and never reach
/// the caller, so the local history stays authoritative.
#[derive(Clone)]
pub struct UsageRecorder {
    repository: Arc<dyn TemplateRepository>,
}

impl UsageRecorder {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self { repository }
    }

    /// Spawns the report and returns immediately
    ///
    /// The handle may be dropped; it is returned for callers that want to wait.
    pub fn record(&self, template_id: String, variables: VariableValues) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        tokio::spawn(async move {
            match repository.record_use(&template_id, &variables).await {
                Ok(()) => debug!(template_id = %template_id, "Template usage recorded"),
                Err(e) => warn!(template_id = %template_id, error = %e, "Failed to record template usage"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryTemplateRepository;

    #[tokio::test]
    async fn records_use_in_background() {
        let repository = Arc::new(InMemoryTemplateRepository::new());
        let recorder = UsageRecorder::new(repository.clone());

        let mut variables = VariableValues::new();
        variables.insert("topic".to_string(), "rust".to_string());
        recorder.record("t-1".to_string(), variables).await.unwrap();

        let uses = repository.recorded_uses().await;
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].0, "t-1");
        assert_eq!(uses[0].1.get("topic").map(String::as_str), Some("rust"));
    }

    #[tokio::test]
    async fn failed_report_does_not_panic() {
        let repository = Arc::new(InMemoryTemplateRepository::new());
        repository.set_failing(true);
        let recorder = UsageRecorder::new(repository.clone());

        let result = recorder.record("t-1".to_string(), VariableValues::new()).await;

        assert!(result.is_ok());
        assert!(repository.recorded_uses().await.is_empty());
    }
}
