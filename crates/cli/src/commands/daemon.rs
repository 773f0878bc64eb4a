//! `hubmatch daemon`: Line-delimited resolution over stdin/stdout.
//!
//! One JSON payload per input line, one JSON line per payload. A line that
//! cannot be processed yields `{"error": "..."}` and the loop carries on.

use std::path::PathBuf;

use hubmatch_resolver::ResolutionOrchestrator;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use super::resolve::{build_orchestrator, process};
use crate::payload::Payload;

pub async fn run(aliases: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = build_orchestrator(aliases.as_deref())?;
    info!(
        config_version = orchestrator.store().version(),
        "Daemon ready, reading payloads from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = respond(&orchestrator, line);
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        handled += 1;
    }

    info!(handled, "stdin closed, daemon exiting");
    Ok(())
}

/// Answer one input line.
fn respond(orchestrator: &ResolutionOrchestrator, line: &str) -> String {
    let answer = Payload::parse(line)
        .map_err(|e| e.to_string())
        .and_then(|payload| process(orchestrator, payload).map_err(|e| e.to_string()))
        .and_then(|output| serde_json::to_string(&output).map_err(|e| e.to_string()));

    match answer {
        Ok(json) => json,
        Err(message) => {
            warn!(error = %message, "Payload rejected");
            serde_json::json!({ "error": message }).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hubmatch_resolver::AliasConfigStore;
    use serde_json::Value;

    use super::*;

    fn orchestrator() -> ResolutionOrchestrator {
        ResolutionOrchestrator::new(Arc::new(AliasConfigStore::default()))
    }

    #[test]
    fn malformed_line_yields_error_object() {
        let reply: Value = serde_json::from_str(&respond(&orchestrator(), "{not json")).unwrap();
        assert!(reply["error"].as_str().unwrap().contains("invalid JSON"));
    }

    #[test]
    fn missing_field_yields_error_object() {
        let reply: Value =
            serde_json::from_str(&respond(&orchestrator(), r#"{"devices": []}"#)).unwrap();
        assert_eq!(reply["error"], "missing 'entities' field");
    }

    #[test]
    fn valid_line_yields_report() {
        let line = r#"{"devices": [{"device_name": "Desk Lamp"}],
            "entities": [{"entity_id": "light.desk", "friendly_name": "Desk Lamp"}]}"#
            .replace('\n', " ");
        let reply: Value = serde_json::from_str(&respond(&orchestrator(), &line)).unwrap();
        assert_eq!(reply["results"][0]["outcome"], "matched");
        assert_eq!(reply["commands"][0]["entity_id"], "light.desk");
    }
}
