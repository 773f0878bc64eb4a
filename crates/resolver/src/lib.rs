//! Entity resolution engine.
//!
//! Maps loosely worded device references ("the lights in the lounge",
//! "客厅 灯") onto concrete registry entities, level by level, with fuzzy
//! tolerance and hard per-level gating.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐
//! │  Intent      │───▶│  Resolution    │───▶│  Batch       │
//! │  requests    │    │  Orchestrator  │    │  report/plan │
//! └──────────────┘    └────────────────┘    └──────────────┘
//!                            │
//!                   ┌────────┴─────────┐
//!                   │  Hierarchical    │  floor → room → type → name
//!                   │  Resolver        │  every level gated
//!                   └────────┬─────────┘
//!                   ┌────────┴─────────┐
//!                   │  LevelMatcher    │  Normalizer + SimilarityScorer
//!                   └──────────────────┘
//! ```
//!
//! The alias table, thresholds and selection policy live in an
//! [`AliasConfigStore`]. Each batch resolves against one immutable
//! [`ConfigSnapshot`]; edits publish a new version for the next batch.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hubmatch_core::{Category, Entity, IntentRequest, Outcome};
//! use hubmatch_resolver::{AliasConfigStore, ResolutionOrchestrator};
//!
//! let registry = vec![
//!     Entity::new("light.kitchen").with_room("Kitchen").with_type("light"),
//! ];
//! let orchestrator = ResolutionOrchestrator::new(Arc::new(AliasConfigStore::default()));
//! let results = orchestrator.resolve_all(
//!     &[IntentRequest::new().with(Category::Room, "kitchen").with(Category::DeviceType, "light")],
//!     &registry,
//! );
//! assert_eq!(results[0].outcome, Outcome::MultiMatch);
//! ```

mod hierarchy;
mod level;
mod normalizer;
mod orchestrator;
mod similarity;
mod store;

pub use hierarchy::{Evaluation, HierarchicalResolver, rank};
pub use level::LevelMatcher;
pub use normalizer::{Normalized, Normalizer, fold};
pub use orchestrator::{BatchReport, ResolutionOrchestrator, resolve_with};
pub use similarity::{JaroWinkler, SimilarityScorer};
pub use store::{AliasConfigStore, ConfigSnapshot};
