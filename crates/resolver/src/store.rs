//! Versioned, copy-on-write configuration store.
//!
//! Readers take an [`Arc<ConfigSnapshot>`] once per batch and keep it for
//! the whole batch. Writers build and validate a complete new snapshot
//! before swapping it in, so a reader never observes a half-applied edit
//! and a rejected edit leaves the live snapshot untouched.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use hubmatch_core::{AliasTable, Category, SelectionPolicy, ThresholdConfig};
use tracing::{info, warn};

use crate::normalizer::{Normalizer, fold};

/// An immutable, validated configuration state.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub published_at: DateTime<Utc>,
    pub aliases: AliasTable,
    pub thresholds: ThresholdConfig,
    pub policy: SelectionPolicy,
    normalizer: Normalizer,
    generic_names: HashSet<String>,
}

impl ConfigSnapshot {
    /// Validate and compile a configuration.
    pub fn build(
        aliases: AliasTable,
        thresholds: ThresholdConfig,
        policy: SelectionPolicy,
        version: u64,
    ) -> hubmatch_core::Result<Self> {
        thresholds.validate()?;
        policy.validate()?;
        let normalizer = Normalizer::new(&aliases)?;
        let generic_names = policy
            .generic_names
            .iter()
            .map(|name| fold(name))
            .filter(|name| !name.is_empty())
            .collect();

        Ok(Self {
            version,
            published_at: Utc::now(),
            aliases,
            thresholds,
            policy,
            normalizer,
            generic_names,
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Whether a device name only names a category of device.
    pub fn is_generic_name(&self, name: &str) -> bool {
        self.generic_names.contains(&fold(name))
    }
}

/// Holds the live [`ConfigSnapshot`] and publishes new versions.
pub struct AliasConfigStore {
    current: RwLock<Arc<ConfigSnapshot>>,
}

impl AliasConfigStore {
    /// Create a store at version 1. Fails if the configuration is invalid.
    pub fn new(
        aliases: AliasTable,
        thresholds: ThresholdConfig,
        policy: SelectionPolicy,
    ) -> hubmatch_core::Result<Self> {
        let snapshot = ConfigSnapshot::build(aliases, thresholds, policy, 1)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Replace the whole alias table.
    pub fn replace_aliases(&self, aliases: AliasTable) -> hubmatch_core::Result<u64> {
        self.publish("replace_aliases", |current| {
            (aliases, current.thresholds, current.policy.clone())
        })
    }

    pub fn replace_thresholds(&self, thresholds: ThresholdConfig) -> hubmatch_core::Result<u64> {
        self.publish("replace_thresholds", |current| {
            (current.aliases.clone(), thresholds, current.policy.clone())
        })
    }

    pub fn replace_policy(&self, policy: SelectionPolicy) -> hubmatch_core::Result<u64> {
        self.publish("replace_policy", |current| {
            (current.aliases.clone(), current.thresholds, policy)
        })
    }

    /// Add one synonym under a canonical token, creating it if needed.
    pub fn add_synonym(
        &self,
        category: Category,
        canonical: &str,
        synonym: &str,
    ) -> hubmatch_core::Result<u64> {
        self.publish("add_synonym", |current| {
            let mut aliases = current.aliases.clone();
            aliases.insert(category, canonical, [synonym]);
            (aliases, current.thresholds, current.policy.clone())
        })
    }

    fn publish<F>(&self, operation: &str, edit: F) -> hubmatch_core::Result<u64>
    where
        F: FnOnce(&ConfigSnapshot) -> (AliasTable, ThresholdConfig, SelectionPolicy),
    {
        // Held across the rebuild so concurrent edits apply one after another.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let (aliases, thresholds, policy) = edit(&**current);
        let version = current.version + 1;

        match ConfigSnapshot::build(aliases, thresholds, policy, version) {
            Ok(snapshot) => {
                *current = Arc::new(snapshot);
                info!(operation, version, "Configuration published");
                Ok(version)
            }
            Err(e) => {
                warn!(operation, version = current.version, error = %e, "Configuration edit rejected");
                Err(e)
            }
        }
    }
}

impl Default for AliasConfigStore {
    /// Empty alias table with default thresholds and policy.
    fn default() -> Self {
        let policy = SelectionPolicy::default();
        let generic_names = policy
            .generic_names
            .iter()
            .map(|name| fold(name))
            .filter(|name| !name.is_empty())
            .collect();
        Self::from_snapshot(ConfigSnapshot {
            version: 1,
            published_at: Utc::now(),
            aliases: AliasTable::default(),
            thresholds: ThresholdConfig::default(),
            policy,
            normalizer: Normalizer::empty(),
            generic_names,
        })
    }
}
