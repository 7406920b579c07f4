/// Conditional selection: which middle pools a subject may draw from.

use rustc_hash::FxHashSet;

use crate::core::phrases::{MiddlePool, PhraseBook};
use crate::schema::subject::Subject;

pub const TAG_CREATURE: &str = "type:creature";
pub const TAG_PLANESWALKER: &str = "type:planeswalker";
pub const TAG_LOW_TOUGHNESS: &str = "toughness:low";
pub const TAG_ETB_TRIGGER: &str = "trigger:etb";

/// Highest toughness that still counts as a tutorable silver bullet.
pub const LOW_TOUGHNESS_MAX: f64 = 2.0;

/// Rules-text phrase marking an enter-the-battlefield trigger.
pub const ETB_PHRASE: &str = "enters the battlefield";

/// Structural tags derived from a subject, matched against pool
/// preconditions.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub tags: FxHashSet<String>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive tags from the subject's type line, toughness and rules text.
    ///
    /// Matching is case-sensitive. Absent oracle text and non-numeric
    /// toughness (`*`, `1+*`) simply leave the tag unset.
    pub fn from_subject(subject: &Subject) -> Self {
        let mut ctx = Self::new();

        if subject.type_line.contains("Creature") {
            ctx.tags.insert(TAG_CREATURE.to_string());
        }
        if subject.type_line.contains("Planeswalker") {
            ctx.tags.insert(TAG_PLANESWALKER.to_string());
        }
        if subject
            .numeric_toughness()
            .is_some_and(|t| t <= LOW_TOUGHNESS_MAX)
        {
            ctx.tags.insert(TAG_LOW_TOUGHNESS.to_string());
        }
        if subject
            .oracle_text
            .as_deref()
            .is_some_and(|text| text.contains(ETB_PHRASE))
        {
            ctx.tags.insert(TAG_ETB_TRIGGER.to_string());
        }

        ctx
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns true if the pool's preconditions hold for these tags.
    pub fn admits(&self, pool: &MiddlePool) -> bool {
        pool.requires.iter().all(|t| self.tags.contains(t))
            && !pool.excludes.iter().any(|t| self.tags.contains(t))
    }

    /// Eligible middle pools, in book order.
    ///
    /// Pools without templates are skipped. A validated book always has an
    /// unconditional pool, so the result is non-empty for one.
    pub fn eligible_pools<'b>(&self, book: &'b PhraseBook) -> Vec<&'b MiddlePool> {
        book.middles
            .iter()
            .filter(|pool| !pool.templates.is_empty() && self.admits(pool))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_book() -> PhraseBook {
        PhraseBook::load_from_ron(std::path::Path::new("tests/fixtures/test_phrases.ron")).unwrap()
    }

    fn pool_names<'b>(pools: &[&'b MiddlePool]) -> Vec<&'b str> {
        pools.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn vanilla_subject_gets_generic_only() {
        let subject = Subject::new("Plains", 0.0, "Basic Land — Plains");
        let ctx = SelectionContext::from_subject(&subject);
        assert!(ctx.tags.is_empty());
        assert_eq!(pool_names(&ctx.eligible_pools(&fixture_book())), vec!["generic"]);
    }

    #[test]
    fn small_creature_unlocks_recruiter() {
        let mut subject = Subject::new("Test Cleric", 1.0, "Creature — Cleric");
        subject.power = Some("1".to_string());
        subject.toughness = Some("2".to_string());
        let ctx = SelectionContext::from_subject(&subject);
        assert!(ctx.has_tag(TAG_CREATURE));
        assert!(ctx.has_tag(TAG_LOW_TOUGHNESS));
        assert_eq!(
            pool_names(&ctx.eligible_pools(&fixture_book())),
            vec!["generic", "recruiter"]
        );
    }

    #[test]
    fn big_creature_is_not_a_recruiter_target() {
        let mut subject = Subject::new("Serra Angel", 5.0, "Creature — Angel");
        subject.toughness = Some("4".to_string());
        let ctx = SelectionContext::from_subject(&subject);
        assert!(!ctx.has_tag(TAG_LOW_TOUGHNESS));
        assert_eq!(pool_names(&ctx.eligible_pools(&fixture_book())), vec!["generic"]);
    }

    #[test]
    fn low_toughness_non_creature_is_not_a_recruiter_target() {
        let mut subject = Subject::new("Gideon's Lawkeeper", 1.0, "Artifact");
        subject.toughness = Some("1".to_string());
        let ctx = SelectionContext::from_subject(&subject);
        assert_eq!(pool_names(&ctx.eligible_pools(&fixture_book())), vec!["generic"]);
    }

    #[test]
    fn star_toughness_does_not_error() {
        let mut subject = Subject::new("Lord of Extinction", 5.0, "Creature — Elemental");
        subject.toughness = Some("*".to_string());
        let ctx = SelectionContext::from_subject(&subject);
        assert!(ctx.has_tag(TAG_CREATURE));
        assert!(!ctx.has_tag(TAG_LOW_TOUGHNESS));
    }

    #[test]
    fn etb_phrase_is_case_sensitive() {
        let mut subject = Subject::new("Skyclave Apparition", 3.0, "Creature — Kor Spirit");
        subject.oracle_text = Some("When Skyclave Apparition enters the battlefield, exile ...".to_string());
        assert!(SelectionContext::from_subject(&subject).has_tag(TAG_ETB_TRIGGER));

        subject.oracle_text = Some("Enters The Battlefield tapped.".to_string());
        assert!(!SelectionContext::from_subject(&subject).has_tag(TAG_ETB_TRIGGER));

        subject.oracle_text = None;
        assert!(!SelectionContext::from_subject(&subject).has_tag(TAG_ETB_TRIGGER));
    }

    #[test]
    fn planeswalker_pool_and_excludes() {
        let mut subject = Subject::new("Gideon, Ally of Zendikar", 4.0, "Legendary Planeswalker — Gideon");
        subject.loyalty = Some("4".to_string());
        let ctx = SelectionContext::from_subject(&subject);
        assert_eq!(
            pool_names(&ctx.eligible_pools(&fixture_book())),
            vec!["generic", "planeswalker"]
        );

        // The fixture's walker pool excludes creatures
        let creature_walker = Subject::new("Dual", 4.0, "Legendary Creature Planeswalker");
        let ctx = SelectionContext::from_subject(&creature_walker);
        assert!(!pool_names(&ctx.eligible_pools(&fixture_book())).contains(&"planeswalker"));
    }

    #[test]
    fn eligible_pools_never_empty_for_validated_book() {
        let book = PhraseBook::standard().unwrap();
        let subject = Subject::new("Anything", 2.0, "Sorcery");
        let ctx = SelectionContext::from_subject(&subject);
        assert!(!ctx.eligible_pools(&book).is_empty());
    }
}
