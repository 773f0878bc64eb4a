//! Batch resolution: request validation, target selection and diagnostics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hubmatch_core::{
    Category, DeviceCommand, Entity, IntentRequest, MatchCandidate, Outcome, ResolutionResult,
    plan_commands, validate_registry,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hierarchy::{Evaluation, HierarchicalResolver};
use crate::normalizer::fold;
use crate::similarity::{JaroWinkler, SimilarityScorer};
use crate::store::{AliasConfigStore, ConfigSnapshot};

/// A resolved batch with its command plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    /// Configuration version every request of the batch was resolved against.
    pub config_version: u64,
    pub resolved_at: DateTime<Utc>,
    pub results: Vec<ResolutionResult>,
    /// Control calls for every selected entity, in request order.
    pub commands: Vec<DeviceCommand>,
}

impl BatchReport {
    pub fn matched(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_match()).count()
    }
}

/// Resolves batches of requests against a registry snapshot.
///
/// Each batch reads the configuration once; edits published while the
/// batch runs apply to the next batch. Requests are independent and are
/// resolved in parallel, with results returned in request order.
pub struct ResolutionOrchestrator {
    store: Arc<AliasConfigStore>,
    scorer: Arc<dyn SimilarityScorer>,
}

impl ResolutionOrchestrator {
    pub fn new(store: Arc<AliasConfigStore>) -> Self {
        Self::with_scorer(store, Arc::new(JaroWinkler))
    }

    pub fn with_scorer(store: Arc<AliasConfigStore>, scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self { store, scorer }
    }

    pub fn store(&self) -> &Arc<AliasConfigStore> {
        &self.store
    }

    /// Same scorer, different configuration.
    pub fn with_store(&self, store: Arc<AliasConfigStore>) -> Self {
        Self {
            store,
            scorer: Arc::clone(&self.scorer),
        }
    }

    /// One result per request, in request order.
    pub fn resolve_all(
        &self,
        requests: &[IntentRequest],
        registry: &[Entity],
    ) -> Vec<ResolutionResult> {
        let snapshot = self.store.snapshot();
        resolve_with(&snapshot, self.scorer.as_ref(), requests, registry)
    }

    /// Resolve a batch and plan its device commands.
    pub fn resolve_batch(&self, requests: &[IntentRequest], registry: &[Entity]) -> BatchReport {
        let snapshot = self.store.snapshot();
        let results = resolve_with(&snapshot, self.scorer.as_ref(), requests, registry);
        let commands = plan_commands(&results);

        let report = BatchReport {
            batch_id: Uuid::new_v4(),
            config_version: snapshot.version,
            resolved_at: Utc::now(),
            results,
            commands,
        };
        info!(
            batch_id = %report.batch_id,
            requests = requests.len(),
            matched = report.matched(),
            commands = report.commands.len(),
            "Batch resolved"
        );
        report
    }
}

/// Resolve a batch against one fixed configuration snapshot.
pub fn resolve_with(
    snapshot: &ConfigSnapshot,
    scorer: &dyn SimilarityScorer,
    requests: &[IntentRequest],
    registry: &[Entity],
) -> Vec<ResolutionResult> {
    debug!(
        requests = requests.len(),
        entities = registry.len(),
        config_version = snapshot.version,
        scorer = scorer.name(),
        "Resolving batch"
    );
    if let Err(e) = validate_registry(registry) {
        warn!(error = %e, "Registry snapshot is inconsistent");
    }
    requests
        .par_iter()
        .enumerate()
        .map(|(index, request)| resolve_one(snapshot, scorer, index, request, registry))
        .collect()
}

fn resolve_one(
    snapshot: &ConfigSnapshot,
    scorer: &dyn SimilarityScorer,
    index: usize,
    request: &IntentRequest,
    registry: &[Entity],
) -> ResolutionResult {
    let effective = effective_request(snapshot, request);
    if let Err(e) = effective.validate() {
        warn!(index, error = %e, "Request rejected");
        return ResolutionResult::rejected(
            index,
            request.clone(),
            Outcome::InvalidRequest,
            e.to_string(),
        );
    }

    let resolver =
        HierarchicalResolver::new(snapshot.normalizer(), scorer, &snapshot.thresholds);

    if let Some(device_type) = effective.field(Category::DeviceType)
        && resolver.type_pool_size(device_type, registry) == 0
    {
        debug!(index, device_type, "No entities of requested type");
        return ResolutionResult::rejected(
            index,
            request.clone(),
            Outcome::NoEntitiesOfType,
            format!("no entity of type '{device_type}' in the registry"),
        );
    }

    let evaluation = resolver.evaluate(&effective, registry);
    let names_one_device = effective.field(Category::DeviceName).is_some();
    let selection = select(snapshot, &evaluation, names_one_device);
    debug!(
        index,
        outcome = %selection.outcome,
        accepted = evaluation.accepted.len(),
        scored = evaluation.scored(),
        "Request resolved"
    );

    ResolutionResult {
        index,
        request: request.clone(),
        outcome: selection.outcome,
        entity_ids: selection.entity_ids,
        disambiguation_required: selection.disambiguation_required,
        message: selection.message,
        candidates: diagnostics(evaluation, snapshot.policy.diagnostics_limit),
    }
}

/// The request as it is actually matched.
///
/// Levels that fold to nothing are dropped. A missing device type falls
/// back to the service domain, after which the service itself is not
/// needed for matching. A generic device name ("lights") cannot pin one
/// device, so it is dropped and stands in for a missing device type.
fn effective_request(snapshot: &ConfigSnapshot, request: &IntentRequest) -> IntentRequest {
    let mut effective = request.clone();
    effective.service = None;
    for category in Category::ALL {
        let value = request
            .fields(category)
            .find(|raw| !fold(raw).is_empty())
            .map(str::to_string);
        effective.set(category, value);
    }

    if effective.field(Category::DeviceType).is_none()
        && let Some(domain) = request.service_domain()
        && !fold(domain).is_empty()
    {
        effective.set(Category::DeviceType, Some(domain.to_string()));
    }

    if let Some(name) = effective.field(Category::DeviceName)
        && snapshot.is_generic_name(name)
    {
        let name = name.to_string();
        effective.set(Category::DeviceName, None);
        if effective.field(Category::DeviceType).is_none() {
            effective.set(Category::DeviceType, Some(name));
        }
    }

    effective
}

struct Selection {
    outcome: Outcome,
    entity_ids: Vec<String>,
    disambiguation_required: bool,
    message: Option<String>,
}

impl Selection {
    fn none(message: String) -> Self {
        Self {
            outcome: Outcome::NoCandidateAboveThreshold,
            entity_ids: Vec::new(),
            disambiguation_required: false,
            message: Some(message),
        }
    }
}

fn select(snapshot: &ConfigSnapshot, evaluation: &Evaluation, names_one_device: bool) -> Selection {
    let accepted = &evaluation.accepted;
    let Some(top) = accepted.first() else {
        return Selection::none(format!(
            "{} entities scored, none cleared every requested level",
            evaluation.scored()
        ));
    };

    if !names_one_device {
        return Selection {
            outcome: Outcome::MultiMatch,
            entity_ids: accepted.iter().map(|c| c.entity_id.clone()).collect(),
            disambiguation_required: false,
            message: None,
        };
    }

    let policy = &snapshot.policy;
    if top.confidence < policy.min_confidence {
        return Selection::none(format!(
            "best candidate '{}' scored {:.3}, below minimum confidence {:.2}",
            top.entity_id, top.confidence, policy.min_confidence
        ));
    }

    let disambiguation_required = accepted
        .get(1)
        .is_some_and(|runner_up| top.confidence - runner_up.confidence < policy.disambiguation_gap);

    Selection {
        outcome: Outcome::Matched,
        entity_ids: vec![top.entity_id.clone()],
        disambiguation_required,
        message: disambiguation_required.then(|| {
            format!(
                "'{}' and '{}' scored within {:.2} of each other",
                top.entity_id, accepted[1].entity_id, policy.disambiguation_gap
            )
        }),
    }
}

/// Accepted candidates first, then near misses, capped at `limit` (0 keeps all).
fn diagnostics(evaluation: Evaluation, limit: usize) -> Vec<MatchCandidate> {
    let Evaluation { accepted, rejected } = evaluation;
    let all = accepted.into_iter().chain(rejected);
    if limit == 0 {
        all.collect()
    } else {
        all.take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use hubmatch_core::{AliasTable, SelectionPolicy, ThresholdConfig};

    use super::*;

    fn registry() -> Vec<Entity> {
        vec![
            Entity::new("light.living_main")
                .with_floor("1")
                .with_room("Living Room")
                .with_type("light")
                .with_name("Main Light"),
            Entity::new("light.living_strip")
                .with_floor("1")
                .with_room("Living Room")
                .with_type("light")
                .with_name("LED Strip"),
            Entity::new("switch.kitchen_fan")
                .with_floor("1")
                .with_room("Kitchen")
                .with_type("switch")
                .with_name("Fan"),
        ]
    }

    fn orchestrator() -> ResolutionOrchestrator {
        let aliases = AliasTable::new()
            .with(Category::Room, "living_room", ["客厅", "lounge"])
            .with(Category::DeviceType, "light", ["lights", "lamp", "灯"]);
        let store =
            AliasConfigStore::new(aliases, ThresholdConfig::default(), SelectionPolicy::default())
                .unwrap();
        ResolutionOrchestrator::new(Arc::new(store))
    }

    #[test]
    fn named_device_resolves_to_one() {
        let results = orchestrator().resolve_all(
            &[IntentRequest::new()
                .with(Category::Room, "lounge")
                .with(Category::DeviceName, "main light")],
            &registry(),
        );
        assert_eq!(results[0].outcome, Outcome::Matched);
        assert_eq!(results[0].entity_ids, vec!["light.living_main"]);
        assert!(!results[0].disambiguation_required);
    }

    #[test]
    fn generic_name_becomes_device_type() {
        let results = orchestrator().resolve_all(
            &[IntentRequest::new()
                .with(Category::Room, "客厅")
                .with(Category::DeviceName, "Lights")],
            &registry(),
        );
        assert_eq!(results[0].outcome, Outcome::MultiMatch);
        assert_eq!(results[0].entity_ids.len(), 2);
    }

    #[test]
    fn service_domain_stands_in_for_type() {
        let results = orchestrator().resolve_all(
            &[IntentRequest::new()
                .with(Category::Room, "kitchen")
                .with_service("switch.turn_off")],
            &registry(),
        );
        assert_eq!(results[0].outcome, Outcome::MultiMatch);
        assert_eq!(results[0].entity_ids, vec!["switch.kitchen_fan"]);
        assert_eq!(results[0].commands()[0].service.as_deref(), Some("switch.turn_off"));
    }

    #[test]
    fn empty_request_is_invalid() {
        let results = orchestrator().resolve_all(&[IntentRequest::new()], &registry());
        assert_eq!(results[0].outcome, Outcome::InvalidRequest);
        assert!(results[0].message.is_some());
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn unusable_service_domain_is_invalid() {
        let results = orchestrator()
            .resolve_all(&[IntentRequest::new().with_service("??.turn_on")], &registry());
        assert_eq!(results[0].outcome, Outcome::InvalidRequest);
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn english_room_rendering_constrains_request() {
        let request = IntentRequest {
            room_name_en: Some("Kitchen".into()),
            device_type: Some("switch".into()),
            service: Some("switch.turn_off".into()),
            ..IntentRequest::default()
        };
        let mut entities = registry();
        entities.push(
            Entity::new("switch.living_socket")
                .with_floor("1")
                .with_room("Living Room")
                .with_type("switch")
                .with_name("Socket"),
        );

        let results = orchestrator().resolve_all(&[request], &entities);
        assert_eq!(results[0].outcome, Outcome::MultiMatch);
        assert_eq!(results[0].entity_ids, vec!["switch.kitchen_fan"]);
        assert!(results[0].candidates[0].level(Category::Room).unwrap().exact_hit);
    }

    #[test]
    fn entity_english_room_label_is_matched() {
        let entities = vec![
            Entity::new("light.study_desk")
                .with_room("书房")
                .with_room_en("Study")
                .with_type("light")
                .with_name("Desk"),
        ];
        let results = orchestrator().resolve_all(
            &[IntentRequest::new().with(Category::Room, "Study")],
            &entities,
        );
        assert_eq!(results[0].outcome, Outcome::MultiMatch);
        assert_eq!(results[0].entity_ids, vec!["light.study_desk"]);
        let room = results[0].candidates[0].level(Category::Room).unwrap();
        assert_eq!(room.entity_token, "Study");
    }

    #[test]
    fn missing_type_reports_no_entities_of_type() {
        let results = orchestrator().resolve_all(
            &[IntentRequest::new()
                .with(Category::Room, "living room")
                .with(Category::DeviceType, "thermostat")],
            &registry(),
        );
        assert_eq!(results[0].outcome, Outcome::NoEntitiesOfType);
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn results_keep_request_order() {
        let requests: Vec<IntentRequest> = (0..32)
            .map(|i| {
                if i % 2 == 0 {
                    IntentRequest::new().with(Category::DeviceName, "LED strip")
                } else {
                    IntentRequest::new().with(Category::DeviceType, "light")
                }
            })
            .collect();
        let results = orchestrator().resolve_all(&requests, &registry());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.index, i);
            let expected = if i % 2 == 0 {
                Outcome::Matched
            } else {
                Outcome::MultiMatch
            };
            assert_eq!(result.outcome, expected);
        }
    }

    #[test]
    fn close_runner_up_flags_disambiguation() {
        let mut entities = registry();
        entities.push(
            Entity::new("light.living_main_2")
                .with_floor("1")
                .with_room("Living Room")
                .with_type("light")
                .with_name("Main Light"),
        );
        let results = orchestrator().resolve_all(
            &[IntentRequest::new().with(Category::DeviceName, "main light")],
            &entities,
        );
        assert_eq!(results[0].outcome, Outcome::Matched);
        assert_eq!(results[0].entity_ids, vec!["light.living_main"]);
        assert!(results[0].disambiguation_required);
    }

    #[test]
    fn diagnostics_are_capped() {
        let store = AliasConfigStore::default();
        store
            .replace_policy(SelectionPolicy {
                diagnostics_limit: 1,
                ..SelectionPolicy::default()
            })
            .unwrap();
        let orchestrator = ResolutionOrchestrator::new(Arc::new(store));
        let results = orchestrator.resolve_all(
            &[IntentRequest::new().with(Category::DeviceName, "main light")],
            &registry(),
        );
        assert_eq!(results[0].candidates.len(), 1);
        assert_eq!(results[0].candidates[0].entity_id, "light.living_main");
    }

    #[test]
    fn batch_report_carries_plan_and_version() {
        let orchestrator = orchestrator();
        orchestrator
            .store()
            .add_synonym(Category::DeviceName, "fan", "ventilator")
            .unwrap();
        let report = orchestrator.resolve_batch(
            &[
                IntentRequest::new()
                    .with(Category::DeviceName, "ventilator")
                    .with_service("switch.turn_on"),
                IntentRequest::new().with(Category::DeviceType, "thermostat"),
            ],
            &registry(),
        );
        assert_eq!(report.config_version, 2);
        assert_eq!(report.matched(), 1);
        assert_eq!(report.commands.len(), 1);
        assert_eq!(report.commands[0].entity_id, "switch.kitchen_fan");
    }
}
