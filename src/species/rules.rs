// src/species/rules.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Field, Species, SpeciesClassifier};

// --- Quantity Shapes ---
// `Pd(OAc)2 (5 mol%)`, `AgOAc(1.5)`: the last parenthesized group holds a number.
static TRAILING_QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.*?)\s*\((?P<qty>[^()]*\d[^()]*)\)$")
        .expect("Failed to compile TRAILING_QUANTITY_RE")
});

// `5 mol% Pd(OAc)2`, `1 atm CO`
static LEADING_QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<qty>\d+(?:\.\d+)?\s*(?:mol\s*%|mmol|mL|µL|mg|MPa|M|atm|bar|psi|equiv\.?|eq\.?|%))\s+(?P<name>\S.*)$",
    )
    .expect("Failed to compile LEADING_QUANTITY_RE")
});

// --- Default Rule Table ---
// One entry per field. A phrase belongs to the field when the pattern matches and
// none of the exclusion substrings occur in it.
static DEFAULT_RULES: Lazy<Vec<SpeciesRule>> = Lazy::new(|| {
    [
        (
            Field::Time,
            r"\d+(?:\.\d+)?\s*(?:h|hr|hrs|hours?|min)\b",
            &[][..],
        ),
        (
            Field::Temperature,
            r"-?\d+(?:\.\d+)?\s*°\s*C|\d+\s*℃|\brt\b|\br\.t\b|(?i:room temperature)",
            &[][..],
        ),
        (
            Field::Metal,
            // `Pt` followed by `Bu` is the tri-tert-butylphosphine shorthand, not platinum.
            r"(?:Pd|Rh|Ru|Ni|Cu|Fe|Ir|Ag|Au|Mn|Co|Zn)(?:[^a-z]|$)|Pt(?:[^a-zB]|Br|$)",
            &["Reaction", "reaction", "Ligand", "ligand"][..],
        ),
        (
            Field::Ligand,
            r"\b(?:[Ll]igand|L\d*)\b|PPh3|PCy3|PtBu3|P\(|\bdpp[fpeb]\b|(?i:xantphos|xphos|sphos|ruphos|binap|dpephos|bipy|\bbpy\b|\bphen\b)",
            &["Reaction", "reaction"][..],
        ),
        (
            Field::Solvent,
            r"\b(?:MeOH|EtOH|iPrOH|DMF|DMSO|DMAc|DMA|THF|MeCN|CH3CN|DCE|DCM|NMP|PhCl|PhMe|H2O)\b|(?i:toluene|dioxane|benzene|xylene|anisole|acetonitrile|\bsolvent\b)",
            &["1a", "H2O2"][..],
        ),
        (
            Field::Reagent,
            r"Mo\(CO\)6|W\(CO\)6|Co2\(CO\)8|Fe\(CO\)5|HCO2Ph|HCOOPh|TFBen|CHCl3|(?i:paraformaldehyde|formate|\breagent\b)",
            &[][..],
        ),
        (
            Field::Gas,
            r"\b(?:CO|CO2|O2|H2|N2|Ar|syngas)\b|(?i:\bair\b)",
            &["CO3", "(CO)"][..],
        ),
        (
            Field::Acid,
            r"(?i:\bacid\b)|HCO2H|HCOOH|TFA|AcOH|PivOH|TsOH|TfOH|MsOH|HCl|HBr|H2SO4|H3PO4",
            &[][..],
        ),
        (
            Field::Base,
            r"(?i:\bbase\b|pyridine|lutidine)|Et3N|NEt3|DIPEA|DBU|DABCO|Cs2CO3|K2CO3|Na2CO3|Li2CO3|NaHCO3|KHCO3|K3PO4|K2HPO4|KOAc|NaOAc|CsOAc|KOtBu|NaOtBu|LiOtBu|KOH|NaOH|LiOH|CsF|\bKF\b",
            &[][..],
        ),
        (
            Field::Oxidant,
            r"(?i:\boxidant\b|oxone)|\bBQ\b|TBHP|DTBP|PhI\(OAc\)2|K2S2O8|Na2S2O8|DDQ|H2O2|mCPBA|Selectfluor",
            &["1a", "Reaction"][..],
        ),
        (
            Field::Additive,
            r"(?i:\badditive\b)|TBAB|TBAI|TBAC|LiCl|LiBr|\bKI\b|\bNaI\b|NaBr|KBr|\bMS\b|\d\s*Å",
            &["1a", "Reaction"][..],
        ),
    ]
    .iter()
    .map(|(field, pattern, excludes)| {
        SpeciesRule::new(*field, pattern, excludes).expect("Failed to compile DEFAULT_RULES")
    })
    .collect()
});

// --- Data Structures ---

/// Membership rule for one field: a pattern plus substrings that veto a match.
#[derive(Debug, Clone)]
pub struct SpeciesRule {
    pub field: Field,
    pattern: Regex,
    excludes: Vec<String>,
}

impl SpeciesRule {
    pub fn new(field: Field, pattern: &str, excludes: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            field,
            pattern: Regex::new(pattern)?,
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text) && !self.excludes.iter().any(|ex| text.contains(ex.as_str()))
    }
}

/// Rule-table classifier. Fields without a rule never match.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<SpeciesRule>,
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Replaces the rule for `rule.field`, or adds it when the field had none.
    pub fn override_rule(mut self, rule: SpeciesRule) -> Self {
        self.rules.retain(|existing| existing.field != rule.field);
        self.rules.push(rule);
        self
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeciesClassifier for RuleClassifier {
    fn is_member(&self, field: Field, text: &str) -> bool {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .any(|rule| rule.matches(text))
    }

    fn parse(&self, _field: Field, text: &str) -> Species {
        split_quantity(text)
    }
}

/// Splits a phrase into (formula, quantity) using the shapes above. Text that fits
/// none of them becomes a bare formula.
pub fn split_quantity(text: &str) -> Species {
    let text = text.trim();

    if let Some(caps) = TRAILING_QUANTITY_RE.captures(text) {
        let name = caps["name"].trim();
        if !name.is_empty() {
            return Species::new(name, Some(caps["qty"].trim().to_string()));
        }
    }

    if let Some(caps) = LEADING_QUANTITY_RE.captures(text) {
        return Species::new(caps["name"].trim(), Some(caps["qty"].trim().to_string()));
    }

    Species::new(text, None)
}
