//! Match diagnostics and per-request outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::request::IntentRequest;

/// The score of one attribute level for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelScore {
    /// Similarity in `[0, 1]`.
    pub score: f64,
    /// Both sides canonicalized to the same token.
    pub exact_hit: bool,
    /// The entity text that produced this score.
    pub entity_token: String,
    /// Literal alias text that the request matched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
}

impl LevelScore {
    pub fn exact(entity_token: impl Into<String>, matched_alias: Option<String>) -> Self {
        Self {
            score: 1.0,
            exact_hit: true,
            entity_token: entity_token.into(),
            matched_alias,
        }
    }

    pub fn fuzzy(score: f64, entity_token: impl Into<String>) -> Self {
        Self {
            score,
            exact_hit: false,
            entity_token: entity_token.into(),
            matched_alias: None,
        }
    }
}

/// One entity scored against one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub entity_id: String,
    pub label: String,
    /// Scores for the levels the request specified; omitted levels are absent.
    pub levels: BTreeMap<Category, LevelScore>,
    /// Arithmetic mean of the evaluated level scores.
    pub confidence: f64,
    /// Cleared every gated level.
    pub accepted: bool,
    /// Levels whose score fell below the threshold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_at: Vec<Category>,
}

impl MatchCandidate {
    pub fn exact_hits(&self) -> usize {
        self.levels.values().filter(|l| l.exact_hit).count()
    }

    pub fn level(&self, category: Category) -> Option<&LevelScore> {
        self.levels.get(&category)
    }
}

/// Why a request resolved the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A named device resolved to exactly one entity.
    Matched,
    /// The request under-specified the device; every accepted entity is selected.
    MultiMatch,
    /// The registry holds no entity of the requested device type at all.
    NoEntitiesOfType,
    /// Entities were scored but none cleared every gated level.
    NoCandidateAboveThreshold,
    /// The request carried nothing to match on.
    InvalidRequest,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::MultiMatch => "multi_match",
            Outcome::NoEntitiesOfType => "no_entities_of_type",
            Outcome::NoCandidateAboveThreshold => "no_candidate_above_threshold",
            Outcome::InvalidRequest => "invalid_request",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched | Outcome::MultiMatch)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome for one request of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Position of the request in the batch.
    pub index: usize,
    pub request: IntentRequest,
    pub outcome: Outcome,
    /// Selected entities, best first. Empty unless the outcome is a match.
    pub entity_ids: Vec<String>,
    #[serde(default)]
    pub disambiguation_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Scored candidates (accepted first, then near misses), possibly truncated.
    pub candidates: Vec<MatchCandidate>,
}

impl ResolutionResult {
    pub fn rejected(index: usize, request: IntentRequest, outcome: Outcome, message: String) -> Self {
        Self {
            index,
            request,
            outcome,
            entity_ids: Vec::new(),
            disambiguation_required: false,
            message: Some(message),
            candidates: Vec::new(),
        }
    }

    /// Control records for every selected entity.
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.entity_ids
            .iter()
            .map(|entity_id| DeviceCommand {
                entity_id: entity_id.clone(),
                service: self.request.service.clone(),
                service_data: self.request.service_data.clone(),
                extra: self.request.extra.clone(),
            })
            .collect()
    }
}

/// One control call for the external batch executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_data: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Flatten a batch of results into the command plan, in request order.
pub fn plan_commands(results: &[ResolutionResult]) -> Vec<DeviceCommand> {
    results.iter().flat_map(ResolutionResult::commands).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(ids: &[&str], service: &str) -> ResolutionResult {
        ResolutionResult {
            index: 0,
            request: IntentRequest::new()
                .with(Category::DeviceType, "light")
                .with_service(service),
            outcome: Outcome::MultiMatch,
            entity_ids: ids.iter().map(|s| s.to_string()).collect(),
            disambiguation_required: false,
            message: None,
            candidates: Vec::new(),
        }
    }

    #[test]
    fn outcome_serializes_as_reason_code() {
        let json = serde_json::to_string(&Outcome::NoCandidateAboveThreshold).unwrap();
        assert_eq!(json, "\"no_candidate_above_threshold\"");
        assert_eq!(Outcome::NoEntitiesOfType.to_string(), "no_entities_of_type");
        assert!(!Outcome::InvalidRequest.is_match());
    }

    #[test]
    fn plan_flattens_in_order() {
        let results = vec![
            result(&["light.a", "light.b"], "light.turn_on"),
            result(&["switch.c"], "switch.turn_off"),
        ];
        let plan = plan_commands(&results);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].entity_id, "light.a");
        assert_eq!(plan[2].service.as_deref(), Some("switch.turn_off"));
    }

    #[test]
    fn candidate_levels_serialize_by_name() {
        let mut levels = BTreeMap::new();
        levels.insert(Category::Room, LevelScore::exact("Kitchen", Some("cuisine".into())));
        let candidate = MatchCandidate {
            entity_id: "light.k".into(),
            label: "Kitchen".into(),
            levels,
            confidence: 1.0,
            accepted: true,
            rejected_at: Vec::new(),
        };
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["levels"]["room"]["matched_alias"], "cuisine");
        assert_eq!(json["levels"]["room"]["exact_hit"], true);
        assert_eq!(candidate.exact_hits(), 1);
    }
}
