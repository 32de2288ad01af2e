//! Formula registry: lookup, grouping, search, validation and parsing.
//!
//! The registry is an explicit instance constructed once at startup and
//! passed by reference into the pipeline, replacing the hidden global
//! formula map of earlier designs. Fixture registries for tests are just
//! `FormulaRegistry::new()` plus a couple of `register` calls.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use crate::error::FormulaError;
use crate::formula::definition::FormulaDefinition;

/// `NAME [p1 -> p2 -> ...]` — name, then a bracketed parameter list.
static FORMULA_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\[(.*)\]\s*$").expect("valid regex"));

/// Result of parsing a formula string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    pub name: String,
    pub parameters: Vec<String>,
}

/// Outcome of a parameter-contract check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FormulaError>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn failed(errors: Vec<FormulaError>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }

    /// Human-readable error messages, for API responses and logs.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Catalog of formula definitions keyed by canonical uppercase name.
///
/// Alias entries are shallow copies with `name` overridden, so alias
/// lookup and primary lookup are indistinguishable to callers.
#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    entries: HashMap<String, FormulaDefinition>,
    /// Canonical keys of primary registrations, in registration order.
    order: Vec<String>,
}

impl FormulaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition under its canonical uppercase name and,
    /// separately, under each alias.
    pub fn register(&mut self, definition: FormulaDefinition) {
        let key = definition.canonical_key();
        for alias in &definition.aliases {
            self.entries
                .insert(alias.to_uppercase(), definition.alias_entry(alias));
        }
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, definition);
    }

    /// Case-insensitive exact lookup; no fuzzy matching.
    pub fn lookup(&self, name: &str) -> Option<&FormulaDefinition> {
        self.entries.get(&name.trim().to_uppercase())
    }

    /// Primary definitions in registration order (aliases excluded).
    pub fn definitions(&self) -> impl Iterator<Item = &FormulaDefinition> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    /// Group primary definitions by category, preserving registration
    /// order within each category.
    pub fn by_category(&self) -> BTreeMap<String, Vec<FormulaDefinition>> {
        let mut grouped: BTreeMap<String, Vec<FormulaDefinition>> = BTreeMap::new();
        for definition in self.definitions() {
            grouped
                .entry(definition.category.clone())
                .or_default()
                .push(definition.clone());
        }
        grouped
    }

    /// Case-insensitive substring search over name, description, category
    /// and aliases. A definition matches if any field matches.
    pub fn search(&self, query: &str) -> Vec<&FormulaDefinition> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.definitions()
            .filter(|def| {
                def.name.to_lowercase().contains(&needle)
                    || def.description.to_lowercase().contains(&needle)
                    || def.category.to_lowercase().contains(&needle)
                    || def
                        .aliases
                        .iter()
                        .any(|alias| alias.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Check a parameter list against a formula's contract.
    ///
    /// The lower and upper bound checks are independent, so a report can
    /// carry both errors for malformed input, though in practice the two
    /// conditions are mutually exclusive for a single call.
    pub fn validate(&self, name: &str, parameters: &[String]) -> ValidationReport {
        let definition = match self.lookup(name) {
            Some(def) => def,
            None => {
                return ValidationReport::failed(vec![FormulaError::UnknownFormula(
                    name.trim().to_string(),
                )])
            }
        };

        let mut errors = Vec::new();
        let required = definition.required_count();
        let maximum = definition.max_count();
        if parameters.len() < required {
            errors.push(FormulaError::TooFewParameters {
                name: definition.name.clone(),
                required,
                given: parameters.len(),
            });
        }
        if parameters.len() > maximum {
            errors.push(FormulaError::TooManyParameters {
                name: definition.name.clone(),
                maximum,
                given: parameters.len(),
            });
        }

        if errors.is_empty() {
            ValidationReport::ok()
        } else {
            ValidationReport::failed(errors)
        }
    }

    /// Parse `NAME [p1 -> p2 -> ...]` into name and parameters.
    ///
    /// Parameters are split on `->`, trimmed, and empty tokens dropped.
    /// Returns `None` (not an error) on any structural mismatch.
    pub fn parse(formula: &str) -> Option<ParsedFormula> {
        let captures = FORMULA_SYNTAX.captures(formula)?;
        let name = captures[1].to_string();
        let inner = &captures[2];
        let parameters = inner
            .split("->")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        Some(ParsedFormula { name, parameters })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
