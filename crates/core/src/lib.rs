//! # HubMatch Core
//!
//! Domain types and error definitions for the HubMatch entity resolution
//! engine. This crate carries **no matching logic**: it defines the data
//! model that the resolver, configuration and CLI crates agree on.
//!
//! ## Data flow
//!
//! - [`Entity`] snapshots and [`IntentRequest`] batches come in from
//!   external collaborators (registry cache, language understanding).
//! - [`AliasTable`], [`ThresholdConfig`] and [`SelectionPolicy`] are the
//!   administrator-tuned configuration.
//! - [`ResolutionResult`]s with [`MatchCandidate`] diagnostics go out, and
//!   [`plan_commands`] turns them into [`DeviceCommand`]s for the executor.

pub mod alias;
pub mod category;
pub mod entity;
pub mod error;
pub mod request;
pub mod resolution;
pub mod threshold;

// Re-export key types at crate root for ergonomics
pub use alias::{AliasMap, AliasTable};
pub use category::Category;
pub use entity::{Entity, validate_registry};
pub use error::{AliasError, Error, RegistryError, RequestError, Result, ThresholdError};
pub use request::IntentRequest;
pub use resolution::{
    DeviceCommand, LevelScore, MatchCandidate, Outcome, ResolutionResult, plan_commands,
};
pub use threshold::{SelectionPolicy, ThresholdConfig};
