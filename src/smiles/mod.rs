mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use tracing::trace;

use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond};
use crate::mol::Mol;
use crate::sanitize::sanitize;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles};

pub fn parse_smiles(s: &str) -> Result<Mol<Atom, SmilesBond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    let mol = builder::build_mol(&tree);
    trace!(
        smiles = trimmed,
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "parsed SMILES"
    );
    Ok(mol)
}

/// Parse and sanitize a SMILES string.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mol = parse_smiles(s)?;
    Ok(sanitize(mol)?)
}
