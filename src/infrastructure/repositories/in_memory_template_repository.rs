use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::repositories::TemplateRepository;
use crate::domain::template::{NewTemplate, Template, VariableValues};

/// In-process TemplateRepository
///
/// Keeps templates in insertion order and remembers every usage report.
/// Can be switched into a failing mode to exercise degraded paths.
#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<Vec<Template>>,
    uses: RwLock<Vec<(String, VariableValues)>>,
    failing: AtomicBool,
    list_failing: AtomicBool,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<Template>) -> Self {
        Self {
            templates: RwLock::new(templates),
            ..Self::default()
        }
    }

    /// Makes every call fail as if the service were unreachable
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes only `list` fail; mutations and lookups keep working
    pub fn set_list_failing(&self, failing: bool) {
        self.list_failing.store(failing, Ordering::SeqCst);
    }

    /// Usage reports received so far, oldest first
    pub async fn recorded_uses(&self) -> Vec<(String, VariableValues)> {
        self.uses.read().await.clone()
    }

    fn check_available(&self) -> TemplateResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TemplateError::Remote("template service unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn list(&self) -> TemplateResult<Vec<Template>> {
        self.check_available()?;
        if self.list_failing.load(Ordering::SeqCst) {
            return Err(TemplateError::Remote("template listing unavailable".to_string()));
        }
        Ok(self.templates.read().await.clone())
    }

    async fn get(&self, id: &str) -> TemplateResult<Option<Template>> {
        self.check_available()?;
        Ok(self.templates.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn record_use(&self, id: &str, variables: &VariableValues) -> TemplateResult<()> {
        self.check_available()?;

        let mut templates = self.templates.write().await;
        if let Some(template) = templates.iter_mut().find(|t| t.id == id) {
            template.usage.count += 1;
        }
        self.uses.write().await.push((id.to_string(), variables.clone()));
        Ok(())
    }

    async fn create(&self, template: &NewTemplate) -> TemplateResult<Template> {
        self.check_available()?;
        template.validate().map_err(|message| TemplateError::RemoteStatus {
            status: 400,
            message,
        })?;

        let created = template.clone().into_template(Uuid::new_v4().to_string());
        self.templates.write().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, template: &NewTemplate) -> TemplateResult<Template> {
        self.check_available()?;
        template.validate().map_err(|message| TemplateError::RemoteStatus {
            status: 400,
            message,
        })?;

        let mut templates = self.templates.write().await;
        let existing = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?;

        let mut updated = template.clone().into_template(id);
        updated.usage = existing.usage.clone();
        updated.created_at = existing.created_at;
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> TemplateResult<()> {
        self.check_available()?;

        let mut templates = self.templates.write().await;
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return Err(TemplateError::TemplateNotFound(id.to_string()));
        }
        Ok(())
    }
}
