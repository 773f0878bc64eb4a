//! Token folding and alias lookup.
//!
//! Folding is the single source of truth for "same text": trim, Unicode
//! compatibility decomposition, diacritic stripping, case folding, and
//! removal of every non-alphanumeric character. `"Living-Room"`,
//! `"living room"` and `"LIVING_ROOM"` all fold to `livingroom`; `"Küche"`
//! folds to `kuche`. CJK text survives folding untouched.

use std::collections::HashMap;

use hubmatch_core::{AliasError, AliasTable, Category};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold raw text into its comparison form.
pub fn fold(raw: &str) -> String {
    raw.trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Result of normalizing one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Canonical token on an alias hit, the folded input otherwise.
    pub token: String,
    pub alias_hit: bool,
    /// The configured alias text that matched.
    pub matched_alias: Option<String>,
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

#[derive(Debug, Clone)]
struct AliasEntry {
    /// Folded canonical token.
    canonical: String,
    /// Canonical token as configured, for error messages.
    canonical_label: String,
    /// Alias text as configured.
    literal: String,
}

/// An alias table compiled into per-category reverse indices.
///
/// Building the index is where overlapping synonyms are caught: two
/// canonical tokens in one category may never claim the same folded text.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    index: HashMap<Category, HashMap<String, AliasEntry>>,
}

impl Normalizer {
    /// A normalizer without aliases; it only folds.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(table: &AliasTable) -> Result<Self, AliasError> {
        let mut index = HashMap::new();
        for category in Category::ALL {
            index.insert(category, build_category(category, table)?);
        }
        Ok(Self { index })
    }

    /// Fold `raw` and resolve it through the alias table of `category`.
    pub fn normalize(&self, category: Category, raw: &str) -> Normalized {
        let folded = fold(raw);
        if folded.is_empty() {
            return Normalized {
                token: folded,
                alias_hit: false,
                matched_alias: None,
            };
        }

        match self.index.get(&category).and_then(|m| m.get(&folded)) {
            Some(entry) => Normalized {
                token: entry.canonical.clone(),
                alias_hit: true,
                matched_alias: Some(entry.literal.clone()),
            },
            None => Normalized {
                token: folded,
                alias_hit: false,
                matched_alias: None,
            },
        }
    }

    /// Number of folded keys indexed for a category.
    pub fn len(&self, category: Category) -> usize {
        self.index.get(&category).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.index.values().all(HashMap::is_empty)
    }
}

fn build_category(
    category: Category,
    table: &AliasTable,
) -> Result<HashMap<String, AliasEntry>, AliasError> {
    let aliases = table.get(category);
    let mut canonicals: HashMap<String, &str> = HashMap::with_capacity(aliases.len());
    let mut index: HashMap<String, AliasEntry> = HashMap::new();

    for (label, synonyms) in aliases {
        let canonical = fold(label);
        if canonical.is_empty() {
            return Err(AliasError::EmptyCanonical { category });
        }
        if let Some(first) = canonicals.insert(canonical.clone(), label.as_str()) {
            return Err(AliasError::DuplicateCanonical {
                category,
                first: first.to_string(),
                second: label.clone(),
            });
        }

        claim(&mut index, category, &canonical, label, label)?;
        for synonym in synonyms {
            claim(&mut index, category, &canonical, label, synonym)?;
        }
    }

    Ok(index)
}

fn claim(
    index: &mut HashMap<String, AliasEntry>,
    category: Category,
    canonical: &str,
    canonical_label: &str,
    literal: &str,
) -> Result<(), AliasError> {
    let key = fold(literal);
    if key.is_empty() {
        return Ok(());
    }

    match index.get(&key) {
        Some(existing) if existing.canonical != canonical => Err(AliasError::AmbiguousExactAlias {
            category,
            synonym: literal.to_string(),
            first: existing.canonical_label.clone(),
            second: canonical_label.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            index.insert(
                key,
                AliasEntry {
                    canonical: canonical.to_string(),
                    canonical_label: canonical_label.to_string(),
                    literal: literal.to_string(),
                },
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms() -> AliasTable {
        AliasTable::new()
            .with(Category::Room, "living_room", ["客厅", "keting", "Living Room", "lounge"])
            .with(Category::Room, "bedroom", ["卧室", "woshi", "bed room"])
            .with(Category::Floor, "1", ["一楼", "first floor", "ground"])
    }

    #[test]
    fn fold_strips_case_diacritics_and_punctuation() {
        assert_eq!(fold("  Living-Room "), "livingroom");
        assert_eq!(fold("LIVING_ROOM"), "livingroom");
        assert_eq!(fold("Küche"), "kuche");
        assert_eq!(fold("Salle à manger"), "salleamanger");
        assert_eq!(fold("客厅 灯"), "客厅灯");
        assert_eq!(fold("!!!"), "");
    }

    #[test]
    fn alias_hit_returns_canonical() {
        let normalizer = Normalizer::new(&rooms()).unwrap();
        let n = normalizer.normalize(Category::Room, "客厅");
        assert_eq!(n.token, "livingroom");
        assert!(n.alias_hit);
        assert_eq!(n.matched_alias.as_deref(), Some("客厅"));

        let floor = normalizer.normalize(Category::Floor, "First Floor");
        assert_eq!(floor.token, "1");
        assert!(floor.alias_hit);
    }

    #[test]
    fn canonical_token_is_its_own_alias() {
        let normalizer = Normalizer::new(&rooms()).unwrap();
        let n = normalizer.normalize(Category::Room, "Bedroom");
        assert_eq!(n.token, "bedroom");
        assert!(n.alias_hit);
    }

    #[test]
    fn miss_returns_folded_input() {
        let normalizer = Normalizer::new(&rooms()).unwrap();
        let n = normalizer.normalize(Category::Room, "Guest Room");
        assert_eq!(n.token, "guestroom");
        assert!(!n.alias_hit);
        assert!(n.matched_alias.is_none());
    }

    #[test]
    fn aliases_are_scoped_by_category() {
        let normalizer = Normalizer::new(&rooms()).unwrap();
        let n = normalizer.normalize(Category::DeviceName, "lounge");
        assert!(!n.alias_hit);
    }

    #[test]
    fn overlapping_synonyms_fail_fast() {
        let table = AliasTable::new()
            .with(Category::Room, "bedroom", ["master"])
            .with(Category::Room, "master_bedroom", ["Master"]);
        let err = Normalizer::new(&table).unwrap_err();
        assert_eq!(err.code(), "ambiguous_exact_alias");
    }

    #[test]
    fn synonym_equal_to_other_canonical_fails() {
        let table = AliasTable::new()
            .with(Category::Room, "study", ["office"])
            .with(Category::Room, "office", Vec::<String>::new());
        assert!(matches!(
            Normalizer::new(&table),
            Err(AliasError::AmbiguousExactAlias { .. })
        ));
    }

    #[test]
    fn colliding_canonicals_fail() {
        let table = AliasTable::new()
            .with(Category::Room, "living_room", Vec::<String>::new())
            .with(Category::Room, "Living Room", Vec::<String>::new());
        assert!(matches!(
            Normalizer::new(&table),
            Err(AliasError::DuplicateCanonical { .. })
        ));
    }

    #[test]
    fn empty_canonical_fails() {
        let table = AliasTable::new().with(Category::Floor, " - ", ["ground"]);
        assert_eq!(
            Normalizer::new(&table).unwrap_err(),
            AliasError::EmptyCanonical {
                category: Category::Floor
            }
        );
    }

    #[test]
    fn same_canonical_may_repeat_folded_synonyms() {
        let table = AliasTable::new().with(
            Category::Floor,
            "1",
            ["first_floor", "firstfloor", "First Floor"],
        );
        let normalizer = Normalizer::new(&table).unwrap();
        assert_eq!(normalizer.len(Category::Floor), 2);
    }
}
