use thiserror::Error;

use crate::formula::FormulaError;
use crate::sanitize::SanitizeError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InchiError {
    #[error("not an InChI string: expected 'InChI=1S/' or 'InChI=1/'")]
    MissingPrefix,
    #[error("malformed {layer} layer: {detail}")]
    MalformedLayer { layer: String, detail: String },
    #[error("atom number {atom} out of range for a component of {count} atoms")]
    AtomOutOfRange { atom: usize, count: usize },
    #[error("formula layer: {0}")]
    Formula(#[from] FormulaError),
    #[error("hydrogen layer places {found} hydrogens, formula has {expected}")]
    HydrogenMismatch { expected: u32, found: u32 },
    #[error("no bond order assignment satisfies the atom valences")]
    BondOrdersUnassignable,
    #[error("cannot place net charge {charge} on any atom")]
    ChargeUnplaceable { charge: i32 },
    #[error("bond order search gave up after {budget} steps")]
    SearchBudgetExhausted { budget: usize },
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}

pub(crate) fn malformed(layer: &str, detail: impl Into<String>) -> InchiError {
    InchiError::MalformedLayer {
        layer: layer.to_string(),
        detail: detail.into(),
    }
}
