//! Format registry for tree output
//!
//! Each output format implements the `Formatter` trait and is registered by name
//! with `FormatRegistry`. The CLI resolves `--format` through the registry.

use crate::manifest::ast::Ast;
use crate::manifest::config::PupfmtConfig;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for tree formatters
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g. "puppet", "json")
    fn name(&self) -> &str;

    fn serialize(&self, ast: &Ast) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

/// Registry of formatters, keyed by name
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any previous one with the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn serialize(&self, ast: &Ast, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(ast)
    }

    /// All format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Built-in formats, with the canonical renderer using `config`
    pub fn with_config(config: &PupfmtConfig) -> Self {
        let mut registry = Self::new();
        registry.register(super::PuppetFormatter::new(config.formatting.clone()));
        registry.register(super::JsonFormatter);
        registry.register(super::TreevizFormatter);
        registry
    }

    pub fn with_defaults() -> Self {
        Self::with_config(&PupfmtConfig::default())
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
