//! Formula definitions and parameter contracts.
//!
//! A [`FormulaDefinition`] is the contract for one available transform:
//! its canonical name, category, human-readable syntax template and an
//! ordered list of [`FormulaParameter`]s with required/optional markers.

use serde::{Deserialize, Serialize};

/// What a formula parameter accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// A column name from the current dataset.
    Column,
    /// Any literal value.
    Value,
    Number,
    String,
    Boolean,
}

/// One parameter of a formula's contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormulaParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FormulaParameter {
    /// A required parameter.
    pub fn required(
        name: impl Into<String>,
        kind: ParameterKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default_value: None,
        }
    }

    /// An optional parameter.
    pub fn optional(
        name: impl Into<String>,
        kind: ParameterKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            default_value: None,
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// The contract for one available formula.
///
/// Syntax strings follow the convention `NAME [param1 -> param2 -> ...]`.
/// The canonical lookup key is the uppercased name; aliases resolve to a
/// shallow copy registered under their own key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDefinition {
    pub name: String,
    pub category: String,
    pub description: String,
    pub syntax: String,
    pub parameters: Vec<FormulaParameter>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl FormulaDefinition {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
            syntax: String::new(),
            parameters: Vec::new(),
            examples: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    pub fn with_parameter(mut self, parameter: FormulaParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Uppercase lookup key.
    pub fn canonical_key(&self) -> String {
        self.name.to_uppercase()
    }

    /// Number of required parameters (lower validation bound).
    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }

    /// Total declared parameters (upper validation bound).
    pub fn max_count(&self) -> usize {
        self.parameters.len()
    }

    /// Shallow copy with `name` overridden to `alias`, so alias lookup
    /// and primary lookup are indistinguishable to callers.
    pub fn alias_entry(&self, alias: &str) -> Self {
        let mut copy = self.clone();
        copy.name = alias.to_string();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_bounds() {
        let def = FormulaDefinition::new("TEST", "Text", "test formula")
            .with_parameter(FormulaParameter::required(
                "column",
                ParameterKind::Column,
                "input column",
            ))
            .with_parameter(FormulaParameter::optional(
                "mode",
                ParameterKind::String,
                "optional mode",
            ));
        assert_eq!(def.required_count(), 1);
        assert_eq!(def.max_count(), 2);
    }

    #[test]
    fn test_alias_entry_keeps_contract() {
        let def = FormulaDefinition::new("TEXT_LENGTH", "Text", "length of text")
            .with_alias("LEN")
            .with_parameter(FormulaParameter::required(
                "column",
                ParameterKind::Column,
                "input column",
            ));
        let alias = def.alias_entry("LEN");
        assert_eq!(alias.name, "LEN");
        assert_eq!(alias.canonical_key(), "LEN");
        assert_eq!(alias.parameters, def.parameters);
        assert_eq!(alias.description, def.description);
    }
}
