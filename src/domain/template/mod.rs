// Template domain module
// Contains the template model, placeholder rendering and cost estimation

#![allow(clippy::module_inception)]

pub mod estimator;
pub mod renderer;
pub mod template;
pub mod value_objects;

// Re-export main types for convenience
pub use estimator::{estimate, Estimate, Estimator, DEFAULT_COST_PER_TOKEN};
pub use renderer::{missing_required, placeholders, render, VariableValues};
pub use template::{NewTemplate, Template, TemplateMetadata, TemplateUsage};
pub use value_objects::{TemplateCategory, VariableDefinition, VariableType};
