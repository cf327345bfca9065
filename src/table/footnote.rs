// src/table/footnote.rs
//! Footnote recovery.
//!
//! Footnote blocks arrive flattened: several lettered notes may share a line and a
//! single note may wrap over several. The block is joined into one run, boundaries
//! are restored as `[a]`, `[b]`, ... markers and the run is cut at those markers.
//! Every phrase of every note is then classified against an ordered rule list.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::species::{Field, FieldValue, SpeciesClassifier};

static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([a-z])\]").expect("Failed to compile MARKER_RE"));
static STRIP_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[a-z]+\]").expect("Failed to compile STRIP_MARKER_RE"));
static PHRASE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s|,|;").expect("Failed to compile PHRASE_SPLIT_RE"));

/// A phrase belongs to `field` when the classifier accepts it for `field` and for
/// none of the `unless` fields.
struct PhraseRule {
    field: Field,
    unless: &'static [Field],
}

// Order matters: the first rule that accepts a phrase claims it. Metal carbonyls
// such as Co2(CO)8 must land in metal, so reagent defers to metal.
const PHRASE_RULES: [PhraseRule; 11] = [
    PhraseRule { field: Field::Time, unless: &[] },
    PhraseRule { field: Field::Metal, unless: &[] },
    PhraseRule { field: Field::Temperature, unless: &[] },
    PhraseRule { field: Field::Ligand, unless: &[] },
    PhraseRule { field: Field::Solvent, unless: &[] },
    PhraseRule { field: Field::Reagent, unless: &[Field::Metal] },
    PhraseRule { field: Field::Gas, unless: &[] },
    PhraseRule { field: Field::Acid, unless: &[] },
    PhraseRule { field: Field::Base, unless: &[] },
    PhraseRule { field: Field::Oxidant, unless: &[] },
    PhraseRule { field: Field::Additive, unless: &[] },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No rule accepted the phrase.
    Unrecognized,
    /// A description of the reaction itself ("reaction was run in ...").
    ReactionDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredPhrase {
    pub letter: char,
    pub phrase: String,
    pub reason: IgnoreReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseOutcome {
    Matched(Field, FieldValue),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub letter: char,
    /// Note text with its marker removed.
    pub text: String,
    pub fields: BTreeMap<Field, Vec<FieldValue>>,
}

impl Footnote {
    pub fn is_base_condition(&self) -> bool {
        self.text.to_lowercase().contains("condition")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteSet {
    pub footnotes: Vec<Footnote>,
    /// Position in `footnotes` of the general-conditions note.
    pub base: Option<usize>,
    pub ignored: Vec<IgnoredPhrase>,
}

impl FootnoteSet {
    pub fn base_footnote(&self) -> Option<&Footnote> {
        self.base.and_then(|i| self.footnotes.get(i))
    }

    pub fn by_letter(&self, letter: char) -> Option<&Footnote> {
        self.footnotes.iter().find(|note| note.letter == letter)
    }
}

/// Restores `[x]` markers in text that lost its brackets. Text that already holds
/// a bracketed marker is returned as is. A bare letter only counts as a marker when
/// it continues the sequence `a`, `b`, `c`, ... so articles like "a" in
/// "in a sealed tube" after note `[a]` are left alone.
pub fn normalize_boundaries(text: &str) -> String {
    if MARKER_RE.is_match(text) {
        return text.to_string();
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut expected = 'a';
    let mut out = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let is_next_letter = token.len() == 1 && token.starts_with(expected) && i + 1 < tokens.len();
        if is_next_letter {
            out.push(format!("[{}]", expected));
            expected = char::from_u32(expected as u32 + 1).unwrap_or('z');
        } else {
            out.push(token.to_string());
        }
    }
    out.join(" ")
}

/// Cuts normalized text at the first occurrence of each `[x]` marker. Text before the
/// first marker is dropped. Segments keep their leading marker.
pub fn split_segments(text: &str) -> Vec<(char, String)> {
    let mut seen = HashSet::new();
    let mut starts: Vec<(char, usize)> = Vec::new();
    for caps in MARKER_RE.captures_iter(text) {
        let letter = caps[1].chars().next().unwrap_or('a');
        if seen.insert(letter) {
            if let Some(m) = caps.get(0) {
                starts.push((letter, m.start()));
            }
        }
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, (letter, start))| {
            let end = starts.get(i + 1).map(|(_, s)| *s).unwrap_or(text.len());
            (*letter, text[*start..end].to_string())
        })
        .collect()
}

/// Classifies one phrase. The first accepting rule wins.
pub fn classify_phrase(phrase: &str, classifier: &dyn SpeciesClassifier) -> PhraseOutcome {
    for rule in PHRASE_RULES.iter() {
        if !classifier.is_member(rule.field, phrase) {
            continue;
        }
        if rule.unless.iter().any(|other| classifier.is_member(*other, phrase)) {
            continue;
        }

        let value = if rule.field.is_species() {
            FieldValue::Species(classifier.parse(rule.field, phrase))
        } else {
            FieldValue::Scalar(phrase.trim().to_string())
        };
        return PhraseOutcome::Matched(rule.field, value);
    }

    if phrase.to_lowercase().contains("reaction") {
        PhraseOutcome::Ignored(IgnoreReason::ReactionDescription)
    } else {
        PhraseOutcome::Ignored(IgnoreReason::Unrecognized)
    }
}

/// Parses a table's footnote block into per-letter conditions.
pub fn parse_footnotes(lines: &[String], classifier: &dyn SpeciesClassifier) -> FootnoteSet {
    let joined = lines.iter().map(|l| l.trim()).collect::<Vec<_>>().join(" ");
    let normalized = normalize_boundaries(&joined);

    let mut set = FootnoteSet::default();
    for (position, (letter, segment)) in split_segments(&normalized).into_iter().enumerate() {
        let text = STRIP_MARKER_RE.replace_all(&segment, "").trim().to_string();
        let mut fields: BTreeMap<Field, Vec<FieldValue>> = BTreeMap::new();

        for phrase in PHRASE_SPLIT_RE
            .split(&text)
            .map(|p| p.trim().trim_end_matches('.').trim_end())
            .filter(|p| !p.is_empty())
        {
            match classify_phrase(phrase, classifier) {
                PhraseOutcome::Matched(field, value) => {
                    tracing::trace!("[{}] `{}` -> {}", letter, phrase, field);
                    fields.entry(field).or_default().push(value);
                }
                PhraseOutcome::Ignored(reason) => {
                    tracing::trace!("[{}] `{}` ignored ({:?})", letter, phrase, reason);
                    set.ignored.push(IgnoredPhrase {
                        letter,
                        phrase: phrase.to_string(),
                        reason,
                    });
                }
            }
        }

        let note = Footnote { letter, text, fields };
        if note.is_base_condition() {
            // A later "conditions" note replaces an earlier one.
            set.base = Some(position);
        }
        set.footnotes.push(note);
    }

    if let Some(base) = set.base_footnote() {
        tracing::debug!("Base condition is footnote [{}]: {}", base.letter, base.text);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{RuleClassifier, Species};

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bracketed_text_splits_per_distinct_letter() {
        let text = "[a] Reaction conditions: 12 h. [b] Isolated yield. [c] GC yield; see [a]";
        let segments = split_segments(&normalize_boundaries(text));
        let letters: Vec<char> = segments.iter().map(|(l, _)| *l).collect();
        assert_eq!(letters, vec!['a', 'b', 'c']);
        assert!(segments[2].1.ends_with("see [a]"), "repeated marker stays inside its note");
        assert_eq!(normalize_boundaries(text), text, "bracketed input is left untouched");
    }

    #[test]
    fn test_bare_letters_become_markers() {
        let text = "a Reaction conditions: 1a (0.2 mmol), in a sealed tube b Isolated yield c GC yield";
        let normalized = normalize_boundaries(text);
        assert_eq!(
            normalized,
            "[a] Reaction conditions: 1a (0.2 mmol), in a sealed tube [b] Isolated yield [c] GC yield"
        );
        assert_eq!(split_segments(&normalized).len(), 3);
    }

    #[test]
    fn test_base_condition_footnote() {
        let classifier = RuleClassifier::new();
        let set = parse_footnotes(
            &lines(&["[a] Conditions: Pd(OAc)2 (5 mol%), 80 °C,", "12 h. [b] Isolated yield."]),
            &classifier,
        );
        assert_eq!(set.footnotes.len(), 2);
        assert_eq!(set.base, Some(0));

        let base = set.base_footnote().unwrap();
        assert_eq!(
            base.fields[&Field::Metal],
            vec![FieldValue::Species(Species::new("Pd(OAc)2", Some("5 mol%".to_string())))]
        );
        assert_eq!(base.fields[&Field::Temperature], vec![FieldValue::Scalar("80 °C".to_string())]);
        assert_eq!(base.fields[&Field::Time], vec![FieldValue::Scalar("12 h".to_string())]);
        assert!(set.footnotes[1].fields.is_empty());
        assert!(set
            .ignored
            .iter()
            .any(|p| p.letter == 'b' && p.reason == IgnoreReason::Unrecognized));
    }

    #[test]
    fn test_metal_precedes_reagent() {
        let classifier = RuleClassifier::new();
        match classify_phrase("Co2(CO)8 (0.5 equiv)", &classifier) {
            PhraseOutcome::Matched(field, _) => assert_eq!(field, Field::Metal),
            other => panic!("expected a metal match, got {:?}", other),
        }
        match classify_phrase("Mo(CO)6 (1 equiv)", &classifier) {
            PhraseOutcome::Matched(field, _) => assert_eq!(field, Field::Reagent),
            other => panic!("expected a reagent match, got {:?}", other),
        }
    }

    #[test]
    fn test_reaction_phrases_are_discarded() {
        let classifier = RuleClassifier::new();
        assert_eq!(
            classify_phrase("reaction run twice", &classifier),
            PhraseOutcome::Ignored(IgnoreReason::ReactionDescription)
        );
        assert_eq!(
            classify_phrase("determined by GC", &classifier),
            PhraseOutcome::Ignored(IgnoreReason::Unrecognized)
        );
    }

    #[test]
    fn test_tert_butyl_phosphine_lands_in_ligand() {
        let classifier = RuleClassifier::new();
        assert_eq!(
            classify_phrase("PtBu3 (10 mol%)", &classifier),
            PhraseOutcome::Matched(
                Field::Ligand,
                FieldValue::Species(Species::new("PtBu3", Some("10 mol%".to_string())))
            )
        );
    }
}
