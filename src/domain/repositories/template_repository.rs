use async_trait::async_trait;

use crate::domain::errors::TemplateResult;
use crate::domain::template::{NewTemplate, Template, VariableValues};

/// Repository trait for the remote template service
///
/// Defines the contract for listing templates and reporting usage.
/// Implementations own the transport (REST, RPC, in-memory).
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// List every template visible to the user
    async fn list(&self) -> TemplateResult<Vec<Template>>;

    /// Find a template by its ID
    async fn get(&self, id: &str) -> TemplateResult<Option<Template>>;

    /// Tell the service a template was used, for its analytics
    async fn record_use(&self, id: &str, variables: &VariableValues) -> TemplateResult<()>;

    /// Create a template and return it as stored
    async fn create(&self, template: &NewTemplate) -> TemplateResult<Template>;

    /// Replace an existing template's editable fields
    async fn update(&self, id: &str, template: &NewTemplate) -> TemplateResult<Template>;

    /// Delete a template by ID
    async fn delete(&self, id: &str) -> TemplateResult<()>;
}
