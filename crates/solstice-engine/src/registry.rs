//! Rule registry.
//!
//! Populated once at startup, immutable afterwards. Enumeration order is
//! lexicographic by rule id so every downstream iteration is reproducible.

use crate::error::RegistryError;
use crate::rule::Rule;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
pub struct RuleRegistry {
    rules: BTreeMap<&'static str, Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Fails on duplicate ids, on ids whose category prefix
    /// disagrees with the metadata category, and on reserved categories.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let meta = rule.metadata();
        let id = meta.id;

        let Some((prefix, short)) = id.split_once('/') else {
            return Err(RegistryError::MalformedId(id.to_string()));
        };
        if short.is_empty() {
            return Err(RegistryError::MalformedId(id.to_string()));
        }
        if meta.category.is_reserved() {
            return Err(RegistryError::ReservedCategory(id.to_string()));
        }
        if prefix != meta.category.prefix() {
            return Err(RegistryError::CategoryMismatch {
                id: id.to_string(),
                category: meta.category.prefix().to_string(),
            });
        }
        if self.rules.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }

        self.rules.insert(id, rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// Rules in lexicographic id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    /// Ids of all rules in the given category, lexicographic.
    pub fn ids_in(&self, category: crate::Category) -> Vec<&'static str> {
        self.rules
            .values()
            .filter(|r| r.metadata().category == category)
            .map(|r| r.metadata().id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
