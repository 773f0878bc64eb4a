//! Pluggable string similarity.

use rapidfuzz::distance::jaro_winkler;

/// A symmetric similarity function over folded tokens, returning `[0, 1]`.
///
/// Implementations must give `score(a, b) == score(b, a)` and `1.0` for
/// equal non-empty inputs.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;

    /// Short identifier used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Jaro-Winkler with the standard prefix weight (0.1, up to 4 characters).
///
/// Weighs shared prefixes heavily, which suits short device and room labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl SimilarityScorer for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        // Fixed argument order keeps the result bit-identical both ways.
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        jaro_winkler::similarity(first.chars(), second.chars()).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "jaro_winkler"
    }
}
