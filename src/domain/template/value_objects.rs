use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a template is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    #[default]
    General,
    Coding,
    Writing,
    Analysis,
    Creative,
    Business,
    Custom,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 7] = [
        TemplateCategory::General,
        TemplateCategory::Coding,
        TemplateCategory::Writing,
        TemplateCategory::Analysis,
        TemplateCategory::Creative,
        TemplateCategory::Business,
        TemplateCategory::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::General => "general",
            TemplateCategory::Coding => "coding",
            TemplateCategory::Writing => "writing",
            TemplateCategory::Analysis => "analysis",
            TemplateCategory::Creative => "creative",
            TemplateCategory::Business => "business",
            TemplateCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Unknown template category: {}", s))
    }
}

/// Input widget used for a variable
///
/// Only the editor cares about this; rendering treats every value as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Text,
    Textarea,
    Number,
    Select,
    Multiselect,
    Boolean,
}

/// Metadata describing one `{{name}}` placeholder
///
/// # Invariants
/// - `name` is matched literally against placeholder tokens
/// - `required` is advisory and never blocks rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl VariableDefinition {
    /// Creates a plain text variable with no default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default_value: None,
            required: false,
            var_type: VariableType::Text,
            options: Vec::new(),
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value substituted when the user typed nothing
    ///
    /// Falls back to the default, then to the literal `[name]`.
    pub fn fallback(&self) -> String {
        match &self.default_value {
            Some(default) => default.clone(),
            None => format!("[{}]", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in TemplateCategory::ALL {
            assert_eq!(category.as_str().parse::<TemplateCategory>(), Ok(category));
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("all".parse::<TemplateCategory>().is_err());
        assert!("Coding".parse::<TemplateCategory>().is_err());
    }

    #[test]
    fn category_display() {
        assert_eq!(TemplateCategory::Business.to_string(), "business");
    }

    #[test]
    fn fallback_prefers_default_value() {
        let var = VariableDefinition::new("balance").with_default("0");
        assert_eq!(var.fallback(), "0");
    }

    #[test]
    fn fallback_without_default_is_bracketed_name() {
        let var = VariableDefinition::new("name");
        assert_eq!(var.fallback(), "[name]");
    }

    #[test]
    fn variable_definition_deserializes_camel_case() {
        let var: VariableDefinition = serde_json::from_str(
            r#"{"name":"tone","defaultValue":"friendly","required":true,"type":"select","options":["friendly","formal"]}"#,
        )
        .unwrap();

        assert_eq!(var.name, "tone");
        assert_eq!(var.default_value.as_deref(), Some("friendly"));
        assert!(var.required);
        assert_eq!(var.var_type, VariableType::Select);
        assert_eq!(var.options.len(), 2);
    }

    #[test]
    fn variable_definition_defaults_missing_fields() {
        let var: VariableDefinition = serde_json::from_str(r#"{"name":"topic"}"#).unwrap();

        assert_eq!(var.var_type, VariableType::Text);
        assert!(!var.required);
        assert!(var.default_value.is_none());
    }
}
