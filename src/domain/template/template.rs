use super::value_objects::{TemplateCategory, VariableDefinition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form template metadata maintained by the template service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Usage statistics owned by the template service
///
/// The count only ever grows on the server; the client never adjusts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUsage {
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

/// Prompt template as cached from the template service
///
/// Read-mostly: mutations go through the repository and the whole catalog is
/// reloaded afterwards.
///
/// # Example
/// ```
/// use costkatana_templates::domain::template::{Template, TemplateCategory, VariableDefinition};
///
/// let template = Template::new("t-1", "Greeting", "Hello {{name}}", TemplateCategory::General)
///     .with_variable(VariableDefinition::new("name").with_default("Guest"));
///
/// assert_eq!(template.variables.len(), 1);
/// assert!(template.variable("name").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
    #[serde(default)]
    pub usage: TemplateUsage,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// Creates a template with no variables, tags or usage
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        category: TemplateCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            content: content.into(),
            category,
            variables: Vec::new(),
            metadata: TemplateMetadata::default(),
            usage: TemplateUsage::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the first variable definition with the given name
    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|var| var.name == name)
    }

    /// Case-insensitive substring match against name, description and tags
    ///
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .metadata
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Payload for creating or updating a template on the template service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub category: TemplateCategory,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

impl NewTemplate {
    /// Returns an error if the payload cannot describe a usable template
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Template name cannot be empty".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("Template content cannot be empty".to_string());
        }
        Ok(())
    }

    /// Materializes the payload as a template with the given id
    pub fn into_template(self, id: impl Into<String>) -> Template {
        Template {
            id: id.into(),
            name: self.name,
            description: self.description,
            content: self.content,
            category: self.category,
            variables: self.variables,
            metadata: self.metadata,
            usage: TemplateUsage::default(),
            created_at: Utc::now(),
        }
    }
}
