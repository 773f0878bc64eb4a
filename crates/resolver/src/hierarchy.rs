//! Hierarchical gating over the four attribute levels.
//!
//! Every entity is scored on each level the request specifies. An entity is
//! accepted only if it clears the threshold of **every** specified level:
//! a perfect device name never rescues a wrong room. Omitted levels are
//! neutral and do not take part in the confidence average.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use hubmatch_core::{Category, Entity, IntentRequest, MatchCandidate, ThresholdConfig};

use crate::level::LevelMatcher;
use crate::normalizer::{Normalized, Normalizer};
use crate::similarity::SimilarityScorer;

/// Accepted and rejected candidates for one request, each ranked.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub accepted: Vec<MatchCandidate>,
    pub rejected: Vec<MatchCandidate>,
}

impl Evaluation {
    pub fn scored(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

pub struct HierarchicalResolver<'a> {
    matcher: LevelMatcher<'a>,
    thresholds: &'a ThresholdConfig,
}

impl<'a> HierarchicalResolver<'a> {
    pub fn new(
        normalizer: &'a Normalizer,
        scorer: &'a dyn SimilarityScorer,
        thresholds: &'a ThresholdConfig,
    ) -> Self {
        Self {
            matcher: LevelMatcher::new(normalizer, scorer),
            thresholds,
        }
    }

    /// Accepted candidates, best first.
    pub fn resolve(&self, request: &IntentRequest, registry: &[Entity]) -> Vec<MatchCandidate> {
        self.evaluate(request, registry).accepted
    }

    /// Score the whole registry, keeping rejected candidates for diagnostics.
    ///
    /// A request with no evaluable level matches nothing.
    pub fn evaluate(&self, request: &IntentRequest, registry: &[Entity]) -> Evaluation {
        let criteria = self.criteria(request);
        if criteria.is_empty() {
            return Evaluation::default();
        }

        let (mut accepted, mut rejected): (Vec<_>, Vec<_>) = registry
            .iter()
            .map(|entity| self.score_entity(&criteria, entity))
            .partition(|candidate| candidate.accepted);

        rank(&mut accepted);
        rank(&mut rejected);
        Evaluation { accepted, rejected }
    }

    /// Number of entities that clear the device-type gate on its own.
    pub fn type_pool_size(&self, device_type: &str, registry: &[Entity]) -> usize {
        let requested = self
            .matcher
            .normalizer()
            .normalize(Category::DeviceType, device_type);
        if requested.is_empty() {
            return registry.len();
        }
        let threshold = self.thresholds.get(Category::DeviceType);
        registry
            .iter()
            .filter(|entity| {
                self.matcher
                    .match_entity(Category::DeviceType, &requested, entity)
                    .score
                    >= threshold
            })
            .count()
    }

    fn criteria(&self, request: &IntentRequest) -> Vec<(Category, Normalized)> {
        request
            .specified()
            .into_iter()
            .filter_map(|category| {
                let raw = request.field(category)?;
                let normalized = self.matcher.normalizer().normalize(category, raw);
                (!normalized.is_empty()).then_some((category, normalized))
            })
            .collect()
    }

    fn score_entity(&self, criteria: &[(Category, Normalized)], entity: &Entity) -> MatchCandidate {
        let mut levels = BTreeMap::new();
        let mut rejected_at = Vec::new();
        let mut total = 0.0;

        for (category, requested) in criteria {
            let level = self.matcher.match_entity(*category, requested, entity);
            if level.score < self.thresholds.get(*category) {
                rejected_at.push(*category);
            }
            total += level.score;
            levels.insert(*category, level);
        }

        MatchCandidate {
            entity_id: entity.entity_id.clone(),
            label: entity.label().to_string(),
            confidence: total / criteria.len() as f64,
            accepted: rejected_at.is_empty(),
            rejected_at,
            levels,
        }
    }
}

/// Confidence descending, then more exact hits, then entity id ascending.
pub fn rank(candidates: &mut [MatchCandidate]) {
    candidates.sort_by(compare);
}

fn compare(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.exact_hits().cmp(&a.exact_hits()))
        .then_with(|| a.entity_id.cmp(&b.entity_id))
}
