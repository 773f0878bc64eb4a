//! Alias tables: per-category synonym lists keyed by canonical token.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Canonical token → synonyms, for one category.
pub type AliasMap = BTreeMap<String, Vec<String>>;

/// Synonym configuration for all four levels.
///
/// This is the raw, editable form. Overlap checks need the normalizer's
/// folding rules, so they happen when the table is compiled into an index
/// by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasTable {
    #[serde(default, alias = "floors", skip_serializing_if = "BTreeMap::is_empty")]
    pub floor: AliasMap,

    #[serde(default, alias = "rooms", skip_serializing_if = "BTreeMap::is_empty")]
    pub room: AliasMap,

    #[serde(default, alias = "device_types", skip_serializing_if = "BTreeMap::is_empty")]
    pub device_type: AliasMap,

    #[serde(default, alias = "device_names", skip_serializing_if = "BTreeMap::is_empty")]
    pub device_name: AliasMap,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON alias document.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, category: Category) -> &AliasMap {
        match category {
            Category::Floor => &self.floor,
            Category::Room => &self.room,
            Category::DeviceType => &self.device_type,
            Category::DeviceName => &self.device_name,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut AliasMap {
        match category {
            Category::Floor => &mut self.floor,
            Category::Room => &mut self.room,
            Category::DeviceType => &mut self.device_type,
            Category::DeviceName => &mut self.device_name,
        }
    }

    /// Add synonyms under a canonical token, creating the entry if needed.
    pub fn insert<I, S>(&mut self, category: Category, canonical: impl Into<String>, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.get_mut(category).entry(canonical.into()).or_default();
        for synonym in synonyms {
            let synonym = synonym.into();
            if !entry.contains(&synonym) {
                entry.push(synonym);
            }
        }
    }

    /// Builder-style variant of [`AliasTable::insert`].
    pub fn with<I, S>(mut self, category: Category, canonical: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(category, canonical, synonyms);
        self
    }

    /// Fold another table into this one; synonyms are appended per canonical.
    pub fn merge(&mut self, mut other: AliasTable) {
        for category in Category::ALL {
            for (canonical, synonyms) in std::mem::take(other.get_mut(category)) {
                self.insert(category, canonical, synonyms);
            }
        }
    }

    /// Total synonym count across categories.
    pub fn synonym_count(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|c| self.get(c).values().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.into_iter().all(|c| self.get(c).is_empty())
    }
}
