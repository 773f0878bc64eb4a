//! Scoring a single attribute level.

use hubmatch_core::{Category, Entity, LevelScore};

use crate::normalizer::{Normalized, Normalizer};
use crate::similarity::SimilarityScorer;

/// Compares one requested token against entity text for one level.
///
/// Both sides go through the same normalizer. Tokens that canonicalize to
/// the same value are an exact hit scoring `1.0`; anything else is scored
/// by the similarity function on the canonical forms.
pub struct LevelMatcher<'a> {
    normalizer: &'a Normalizer,
    scorer: &'a dyn SimilarityScorer,
}

impl<'a> LevelMatcher<'a> {
    pub fn new(normalizer: &'a Normalizer, scorer: &'a dyn SimilarityScorer) -> Self {
        Self { normalizer, scorer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        self.normalizer
    }

    /// Score `requested` against a single entity token.
    ///
    /// Returns `None` when the request side is blank after folding: the
    /// level is not evaluated.
    pub fn match_level(
        &self,
        category: Category,
        requested: &str,
        entity_token: &str,
    ) -> Option<LevelScore> {
        let requested = self.normalizer.normalize(category, requested);
        if requested.is_empty() {
            return None;
        }
        Some(self.score_token(category, &requested, entity_token))
    }

    /// Best score of an already-normalized request over every text the
    /// entity offers for the level.
    ///
    /// An entity with no text for the level scores `0.0`.
    pub fn match_entity(
        &self,
        category: Category,
        requested: &Normalized,
        entity: &Entity,
    ) -> LevelScore {
        entity
            .tokens(category)
            .into_iter()
            .map(|token| self.score_token(category, requested, token))
            .max_by(|a, b| {
                a.score
                    .total_cmp(&b.score)
                    .then_with(|| a.exact_hit.cmp(&b.exact_hit))
            })
            .unwrap_or_else(|| LevelScore::fuzzy(0.0, ""))
    }

    fn score_token(&self, category: Category, requested: &Normalized, entity_token: &str) -> LevelScore {
        let candidate = self.normalizer.normalize(category, entity_token);
        if candidate.token == requested.token {
            return LevelScore::exact(entity_token, requested.matched_alias.clone());
        }
        LevelScore::fuzzy(
            self.scorer.score(&requested.token, &candidate.token),
            entity_token,
        )
    }
}
