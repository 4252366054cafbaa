use thiserror::Error;

use crate::graph::{BondType, GraphError};
use crate::inchi::InchiError;
use crate::sanitize::SanitizeError;
use crate::smiles::SmilesError;

/// Why a molecule string could not be read, by input format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Inchi(#[from] InchiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("failed to parse '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: ParseError,
    },
    #[error("sanitization failed: {0}")]
    Sanitize(#[from] SanitizeError),
    #[error("bond type {bond_type} between atoms {} and {} is not in the bond vocabulary", .atoms.0, .atoms.1)]
    UnknownBondType {
        bond_type: BondType,
        atoms: (usize, usize),
    },
    #[error("unconnected atoms {atoms:?} in {smiles}")]
    UnconnectedAtoms { smiles: String, atoms: Vec<usize> },
    #[error("atom {atom} has atomic number 0")]
    InvalidAtomicNumber { atom: usize },
    #[error("bond type {bond_type} between atoms {} and {} cannot be rebuilt", .atoms.0, .atoms.1)]
    UnsupportedBondType {
        bond_type: BondType,
        atoms: (usize, usize),
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}
