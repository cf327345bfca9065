// src/species/mod.rs
//! Field vocabulary shared by every stage, plus the species-recognition seam.
//!
//! The extraction core only talks to [`SpeciesClassifier`]; [`RuleClassifier`]
//! is the rule-table implementation the binary uses by default.

pub mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use rules::{RuleClassifier, SpeciesRule};

/// Placeholder written in tables for "not used". Once a field holds it, footnotes
/// can no longer change the field.
pub const DASH: &str = "–";

/// The twelve reaction-condition categories, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Metal,
    Ligand,
    Gas,
    Solvent,
    Reagent,
    Time,
    Temperature,
    Yield,
    Acid,
    Base,
    Additive,
    Oxidant,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Metal,
        Field::Ligand,
        Field::Gas,
        Field::Solvent,
        Field::Reagent,
        Field::Time,
        Field::Temperature,
        Field::Yield,
        Field::Acid,
        Field::Base,
        Field::Additive,
        Field::Oxidant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Metal => "metal",
            Field::Ligand => "ligand",
            Field::Gas => "gas",
            Field::Solvent => "solvent",
            Field::Reagent => "reagent",
            Field::Time => "time",
            Field::Temperature => "temperature",
            Field::Yield => "yield",
            Field::Acid => "acid",
            Field::Base => "base",
            Field::Additive => "additive",
            Field::Oxidant => "oxidant",
        }
    }

    /// Species fields carry a (formula, quantity) pair; the rest are plain text.
    pub fn is_species(self) -> bool {
        !matches!(self, Field::Time | Field::Temperature | Field::Yield)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field `{}`", s))
    }
}

/// A chemical entity split into its canonical name and the amount it was used in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub formula: String,
    pub quantity: Option<String>,
}

impl Species {
    pub fn new(formula: impl Into<String>, quantity: Option<String>) -> Self {
        Self {
            formula: formula.into(),
            quantity,
        }
    }

    pub fn dash() -> Self {
        Self::new(DASH, None)
    }

    pub fn is_dash(&self) -> bool {
        self.formula == DASH
    }

    /// True when the formula is only the field's own name, e.g. `ligand (10 mol%)`.
    pub fn is_placeholder_for(&self, field: Field) -> bool {
        self.formula.eq_ignore_ascii_case(field.as_str())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quantity {
            Some(quantity) => write!(f, "{} ({})", self.formula, quantity),
            None => f.write_str(&self.formula),
        }
    }
}

/// One resolved value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Species(Species),
}

impl FieldValue {
    pub fn is_dash(&self) -> bool {
        match self {
            FieldValue::Scalar(text) => text == DASH,
            FieldValue::Species(species) => species.is_dash(),
        }
    }

    pub fn as_species(&self) -> Option<&Species> {
        match self {
            FieldValue::Species(species) => Some(species),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Formula for species values, the text itself for scalars.
    pub fn formula(&self) -> &str {
        match self {
            FieldValue::Scalar(text) => text,
            FieldValue::Species(species) => &species.formula,
        }
    }

    pub fn quantity(&self) -> Option<&str> {
        self.as_species().and_then(|species| species.quantity.as_deref())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(text) => f.write_str(text),
            FieldValue::Species(species) => species.fmt(f),
        }
    }
}

/// Decides whether a text fragment denotes a field's entity and splits it into
/// (formula, quantity). Implementations must be pure functions of their input.
pub trait SpeciesClassifier: Send + Sync {
    fn is_member(&self, field: Field, text: &str) -> bool;

    fn parse(&self, field: Field, text: &str) -> Species;
}
