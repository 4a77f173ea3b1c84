// Client-side template catalog
//
// Holds the last full listing from the template service. Search, category
// filtering and sorting all run locally over that listing.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::repositories::TemplateRepository;
use crate::domain::template::{NewTemplate, Template};

/// Category filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "all";

/// Ordering applied to catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Lexicographic by name
    Name,
    /// Newest first
    Created,
    /// Most used first
    Usage,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "created" => Ok(SortKey::Created),
            "usage" => Ok(SortKey::Usage),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Created => write!(f, "created"),
            SortKey::Usage => write!(f, "usage"),
        }
    }
}

/// Sorts templates in place; ties keep their relative order
pub fn sort_templates(templates: &mut [&Template], by: SortKey) {
    match by {
        SortKey::Name => templates.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Created => templates.sort_by_key(|t| Reverse(t.created_at)),
        SortKey::Usage => templates.sort_by_key(|t| Reverse(t.usage.count)),
    }
}

/// Result of a remote mutation together with the catalog reload after it
#[derive(Debug)]
pub struct Reloaded<T> {
    pub value: T,
    /// Set when the mutation succeeded but the reload did not
    pub reload_error: Option<TemplateError>,
}

/// Cached listing of templates from the template service
pub struct TemplateCatalog {
    repository: Arc<dyn TemplateRepository>,
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self {
            repository,
            templates: Vec::new(),
        }
    }

    /// Reloads the whole catalog from the template service
    ///
    /// On failure the catalog is emptied and the error returned so the caller
    /// can notify the user; the catalog stays usable either way.
    pub async fn fetch_all(&mut self) -> TemplateResult<&[Template]> {
        match self.repository.list().await {
            Ok(templates) => {
                info!(count = templates.len(), "Template catalog loaded");
                self.templates = templates;
                Ok(&self.templates)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load template catalog");
                self.templates.clear();
                Err(e)
            }
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn find(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Templates matching the search text and category, in catalog order
    ///
    /// `None` or `"all"` disables the category filter; any other value must
    /// equal the template's category exactly.
    pub fn filter(&self, query: &str, category: Option<&str>) -> Vec<&Template> {
        let category = category.filter(|c| *c != ALL_CATEGORIES);

        self.templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category.as_str() == c))
            .filter(|t| t.matches_query(query))
            .collect()
    }

    /// All templates in the given order
    pub fn sort(&self, by: SortKey) -> Vec<&Template> {
        let mut templates: Vec<&Template> = self.templates.iter().collect();
        sort_templates(&mut templates, by);
        templates
    }

    /// Filters, then sorts when a key is given
    pub fn query(&self, query: &str, category: Option<&str>, sort: Option<SortKey>) -> Vec<&Template> {
        let mut templates = self.filter(query, category);
        if let Some(by) = sort {
            sort_templates(&mut templates, by);
        }
        templates
    }

    /// Creates a template remotely, then reloads the catalog
    pub async fn create(&mut self, template: &NewTemplate) -> TemplateResult<Reloaded<Template>> {
        let created = self.repository.create(template).await?;
        debug!(template_id = %created.id, "Template created");
        Ok(self.reload_after_mutation(created).await)
    }

    /// Updates a template remotely, then reloads the catalog
    pub async fn update(
        &mut self,
        id: &str,
        template: &NewTemplate,
    ) -> TemplateResult<Reloaded<Template>> {
        let updated = self.repository.update(id, template).await?;
        debug!(template_id = %id, "Template updated");
        Ok(self.reload_after_mutation(updated).await)
    }

    /// Deletes a template remotely, then reloads the catalog
    pub async fn delete(&mut self, id: &str) -> TemplateResult<Reloaded<()>> {
        self.repository.delete(id).await?;
        debug!(template_id = %id, "Template deleted");
        Ok(self.reload_after_mutation(()).await)
    }

    // The mutation already succeeded remotely; a failed reload only empties the cache
    async fn reload_after_mutation<T>(&mut self, value: T) -> Reloaded<T> {
        let reload_error = self.fetch_all().await.err();
        Reloaded { value, reload_error }
    }
}
