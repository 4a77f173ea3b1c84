// Placeholder substitution for prompt templates
//
// A name is any text without `}}`. Rendering matches only the declared names
// in a single left-to-right pass, so a substituted value is never rescanned
// and overlapping names such as `name` and `full_name` cannot corrupt each
// other.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::value_objects::VariableDefinition;

/// Matches `{{name}}`, ending at the first `}}`
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("placeholder pattern is valid"));

/// Current value of each variable, keyed by variable name
pub type VariableValues = HashMap<String, String>;

/// Renders template content with the given variable values
///
/// For each declared variable the substituted text is the user's value if it
/// is non-empty, else the variable's default, else the literal `[name]`.
/// Placeholders naming undeclared variables are left untouched. When a name is
/// declared twice the first definition wins.
///
/// # Example
/// ```
/// use costkatana_templates::domain::template::{render, VariableDefinition, VariableValues};
///
/// let variables = vec![
///     VariableDefinition::new("name").with_default("Guest"),
///     VariableDefinition::new("balance").with_default("0"),
/// ];
/// let mut values = VariableValues::new();
/// values.insert("name".to_string(), "Alice".to_string());
///
/// let rendered = render("Hello {{name}}, your balance is {{balance}}", &variables, &values);
/// assert_eq!(rendered, "Hello Alice, your balance is 0");
/// ```
pub fn render(content: &str, variables: &[VariableDefinition], values: &VariableValues) -> String {
    let mut substitutions: HashMap<&str, String> = HashMap::with_capacity(variables.len());
    let mut names: Vec<&str> = Vec::with_capacity(variables.len());
    for var in variables.iter().filter(|var| !var.name.contains("}}")) {
        substitutions.entry(var.name.as_str()).or_insert_with(|| {
            names.push(var.name.as_str());
            match values.get(&var.name) {
                Some(value) if !value.is_empty() => value.clone(),
                _ => var.fallback(),
            }
        });
    }
    if names.is_empty() {
        return content.to_string();
    }

    let alternatives: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();
    let pattern = match Regex::new(&format!(r"\{{\{{({})\}}\}}", alternatives.join("|"))) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(error = %e, "Could not build placeholder pattern, leaving content unrendered");
            return content.to_string();
        }
    };

    pattern
        .replace_all(content, |caps: &Captures| {
            match substitutions.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Names of all placeholders in `content`, deduplicated, in order of first appearance
///
/// Each name runs from `{{` to the first following `}}`, so `{{{x}}}` yields `{x`.
pub fn placeholders(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Required variables that have neither a non-empty value nor a default
///
/// Advisory only. Rendering still succeeds with `[name]` in their place.
pub fn missing_required(variables: &[VariableDefinition], values: &VariableValues) -> Vec<String> {
    variables
        .iter()
        .filter(|var| var.required && var.default_value.is_none())
        .filter(|var| values.get(&var.name).map_or(true, |value| value.is_empty()))
        .map(|var| var.name.clone())
        .collect()
}
