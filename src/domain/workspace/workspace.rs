use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::notice::Notice;
use super::phase::SessionPhase;
use crate::domain::catalog::TemplateCatalog;
use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::repositories::TemplateRepository;
use crate::domain::template::{
    missing_required, render, Estimate, Estimator, NewTemplate, Template, VariableValues,
};
use crate::domain::usage::{UsageLog, UsageRecord, UsageRecorder};

/// Notices kept until the UI drains them; older ones are dropped first
const MAX_PENDING_NOTICES: usize = 20;

/// Snapshot of the editing session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub phase: SessionPhase,
    pub template_id: Option<String>,
    pub values: VariableValues,
    pub rendered: Option<String>,
    pub estimate: Option<Estimate>,
    pub missing_required: Vec<String>,
}

/// Template currently being filled in, with its latest render
#[derive(Debug, Clone)]
struct Selection {
    template: Template,
    values: VariableValues,
    rendered: String,
    estimate: Estimate,
}

impl Selection {
    fn new(template: Template, estimator: &Estimator) -> Self {
        let mut values = VariableValues::with_capacity(template.variables.len());
        for var in &template.variables {
            values
                .entry(var.name.clone())
                .or_insert_with(|| var.default_value.clone().unwrap_or_default());
        }

        let mut selection = Self {
            template,
            values,
            rendered: String::new(),
            estimate: estimator.estimate(""),
        };
        selection.refresh(estimator);
        selection
    }

    fn refresh(&mut self, estimator: &Estimator) {
        self.rendered = render(&self.template.content, &self.template.variables, &self.values);
        self.estimate = estimator.estimate(&self.rendered);
    }
}

/// State container for the template usage flow
///
/// Owns the catalog, the current selection and its values, and the local
/// usage history. Rendering and estimation rerun synchronously on every edit,
/// so the preview always reflects the latest value.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use costkatana_templates::domain::template::{Estimator, Template, TemplateCategory, VariableDefinition};
/// use costkatana_templates::domain::usage::UsageLog;
/// use costkatana_templates::domain::workspace::Workspace;
/// use costkatana_templates::infrastructure::repositories::InMemoryTemplateRepository;
/// use costkatana_templates::infrastructure::storage::MemoryKeyValueStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let template = Template::new("t-1", "Greeting", "Hello {{name}}", TemplateCategory::General)
///     .with_variable(VariableDefinition::new("name").with_default("Guest"));
/// let repository = Arc::new(InMemoryTemplateRepository::with_templates(vec![template]));
/// let usage_log = Arc::new(UsageLog::new(Arc::new(MemoryKeyValueStore::new())));
///
/// let mut workspace = Workspace::new(repository, usage_log, Estimator::default());
/// workspace.fetch_templates().await;
/// workspace.select_template("t-1").unwrap();
/// let preview = workspace.set_variable("name", "Alice").unwrap();
///
/// assert_eq!(preview.rendered.as_deref(), Some("Hello Alice"));
/// # }
/// ```
pub struct Workspace {
    catalog: TemplateCatalog,
    usage_log: Arc<UsageLog>,
    recorder: UsageRecorder,
    estimator: Estimator,
    phase: SessionPhase,
    selection: Option<Selection>,
    notices: Vec<Notice>,
}

impl Workspace {
    pub fn new(
        repository: Arc<dyn TemplateRepository>,
        usage_log: Arc<UsageLog>,
        estimator: Estimator,
    ) -> Self {
        Self {
            catalog: TemplateCatalog::new(Arc::clone(&repository)),
            usage_log,
            recorder: UsageRecorder::new(repository),
            estimator,
            phase: SessionPhase::Idle,
            selection: None,
            notices: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn usage_log(&self) -> Arc<UsageLog> {
        Arc::clone(&self.usage_log)
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.selection.as_ref().map(|s| &s.template)
    }

    /// Reloads the catalog, returning how many templates it now holds
    ///
    /// A failure leaves an empty catalog and queues a notice instead of
    /// returning an error.
    pub async fn fetch_templates(&mut self) -> usize {
        let error = self.catalog.fetch_all().await.err();
        self.after_reload(error);
        self.catalog.templates().len()
    }

    /// Creates a template on the service and reloads the catalog
    pub async fn create_template(&mut self, template: &NewTemplate) -> TemplateResult<Template> {
        let created = self.catalog.create(template).await?;
        self.after_reload(created.reload_error);
        Ok(created.value)
    }

    /// Updates a template on the service and reloads the catalog
    ///
    /// If the updated template is selected, it is reselected with fresh defaults.
    pub async fn update_template(
        &mut self,
        id: &str,
        template: &NewTemplate,
    ) -> TemplateResult<Template> {
        let updated = self.catalog.update(id, template).await?;
        self.after_reload(updated.reload_error);
        if self.selected_template().map(|t| t.id.as_str()) == Some(id) {
            self.select_template(id)?;
        }
        Ok(updated.value)
    }

    /// Deletes a template on the service and reloads the catalog
    pub async fn delete_template(&mut self, id: &str) -> TemplateResult<()> {
        let deleted = self.catalog.delete(id).await?;
        self.after_reload(deleted.reload_error);
        Ok(())
    }

    /// Selects a catalog template and seeds its values with defaults
    pub fn select_template(&mut self, id: &str) -> TemplateResult<Preview> {
        let template = self
            .catalog
            .find(id)
            .cloned()
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?;

        self.selection = Some(Selection::new(template, &self.estimator));
        self.transition(SessionPhase::Selected);
        Ok(self.preview())
    }

    /// Sets one variable value and re-renders
    ///
    /// Returns `None` when nothing is selected.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) -> Option<Preview> {
        if !self.phase.can_transition_to(SessionPhase::Editing) {
            debug!(variable = name, phase = %self.phase, "Ignoring edit without a selected template");
            return None;
        }

        let selection = self.selection.as_mut()?;
        selection.values.insert(name.to_string(), value.into());
        selection.refresh(&self.estimator);

        self.transition(SessionPhase::Editing);
        Some(self.preview())
    }

    /// Current session snapshot
    pub fn preview(&self) -> Preview {
        match &self.selection {
            Some(selection) => Preview {
                phase: self.phase,
                template_id: Some(selection.template.id.clone()),
                values: selection.values.clone(),
                rendered: Some(selection.rendered.clone()),
                estimate: Some(selection.estimate),
                missing_required: missing_required(&selection.template.variables, &selection.values),
            },
            None => Preview {
                phase: self.phase,
                template_id: None,
                values: VariableValues::new(),
                rendered: None,
                estimate: None,
                missing_required: Vec::new(),
            },
        }
    }

    /// Records use of the selected template
    ///
    /// Appends to the local history, then reports the use to the template
    /// service in the background without waiting for it. Returns `None` when
    /// no template is selected or the selected one has left the catalog.
    pub async fn use_template(&mut self) -> TemplateResult<Option<UsageRecord>> {
        if !self.phase.can_transition_to(SessionPhase::Used) {
            debug!(phase = %self.phase, "Ignoring use without a selected template");
            return Ok(None);
        }
        self.drop_stale_selection();
        let Some(selection) = self.selection.as_ref() else {
            return Ok(None);
        };

        let record = UsageRecord::new(
            selection.template.id.clone(),
            selection.values.clone(),
            selection.rendered.clone(),
            selection.estimate,
        );
        self.usage_log.append(record.clone()).await?;

        self.transition(SessionPhase::Used);
        let _detached = self
            .recorder
            .record(record.template_id.clone(), record.variables.clone());
        info!(
            template_id = %record.template_id,
            tokens = record.estimated_tokens,
            "Template used"
        );

        self.transition(SessionPhase::Selected);
        Ok(Some(record))
    }

    /// Local usage history, newest first
    pub async fn history(&self) -> TemplateResult<Vec<UsageRecord>> {
        self.usage_log.load_all().await
    }

    pub async fn clear_history(&self) -> TemplateResult<()> {
        self.usage_log.clear().await
    }

    /// Returns and forgets all pending notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        if self.notices.len() > MAX_PENDING_NOTICES {
            let excess = self.notices.len() - MAX_PENDING_NOTICES;
            self.notices.drain(..excess);
        }
    }

    // Every catalog reload ends here, whether it followed a refresh or a mutation
    fn after_reload(&mut self, error: Option<TemplateError>) {
        if let Some(e) = error {
            self.push_notice(Notice::new(format!("Failed to load templates: {}", e)));
        }
        self.drop_stale_selection();
    }

    fn drop_stale_selection(&mut self) {
        let stale = match &self.selection {
            Some(selection) => self.catalog.find(&selection.template.id).is_none(),
            None => false,
        };

        if stale {
            if let Some(selection) = self.selection.take() {
                warn!(template_id = %selection.template.id, "Selected template left the catalog");
            }
            self.transition(SessionPhase::Idle);
        }
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase.can_transition_to(next) {
            debug!(from = %self.phase, to = %next, "Session phase changed");
            self.phase = next;
        } else {
            warn!(from = %self.phase, to = %next, "Rejected session phase change");
        }
    }
}
