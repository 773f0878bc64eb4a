//! `hubmatch resolve`: One-shot batch resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hubmatch_config::{AppConfig, load_alias_table};
use hubmatch_resolver::{AliasConfigStore, BatchReport, ResolutionOrchestrator};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::payload::Payload;

/// The report printed for one payload.
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    #[serde(flatten)]
    pub report: BatchReport,
}

pub async fn run(
    input: Option<PathBuf>,
    aliases: Option<PathBuf>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match &input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let payload = Payload::parse(&raw)?;
    let orchestrator = build_orchestrator(aliases.as_deref())?;
    let output = process(&orchestrator, payload)?;

    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

/// Build the engine from the loaded configuration.
///
/// `aliases` replaces the configured alias source when given.
pub fn build_orchestrator(
    aliases: Option<&Path>,
) -> Result<ResolutionOrchestrator, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let table = match aliases {
        Some(path) => load_alias_table(path)?,
        None => config.alias_table()?,
    };
    let synonyms = table.synonym_count();
    let store = AliasConfigStore::new(table, config.resolver.thresholds, config.resolver.policy)?;
    info!(synonyms, "Resolver ready");
    Ok(ResolutionOrchestrator::new(Arc::new(store)))
}

/// Resolve one payload.
///
/// Aliases carried by the payload are merged over the configured table and
/// its thresholds replace the configured ones, for this payload only.
pub fn process(
    orchestrator: &ResolutionOrchestrator,
    payload: Payload,
) -> hubmatch_core::Result<ResolveOutput> {
    let has_overrides = payload.has_overrides();
    let Payload {
        requests,
        entities,
        aliases,
        thresholds,
        intent,
        user_input,
    } = payload;

    let report = if has_overrides {
        let base = orchestrator.store().snapshot();
        let mut table = base.aliases.clone();
        if let Some(extra) = aliases {
            table.merge(extra);
        }
        let store = AliasConfigStore::new(
            table,
            thresholds.unwrap_or(base.thresholds),
            base.policy.clone(),
        )?;
        debug!("Resolving with payload overrides");
        orchestrator
            .with_store(Arc::new(store))
            .resolve_batch(&requests, &entities)
    } else {
        orchestrator.resolve_batch(&requests, &entities)
    };

    Ok(ResolveOutput {
        intent,
        user_input,
        report,
    })
}
