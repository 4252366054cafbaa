//! Sanitization turns a freshly parsed molecule into a checked one.
//!
//! The passes run in a fixed order: kekulize the aromatic input, check
//! every atom's valence, perceive aromaticity on the Kekulé form, and
//! finally drop chirality tags from atoms that cannot be stereocenters.

use thiserror::Error;
use tracing::trace;

use crate::aromaticity::{AromaticityModel, set_aromaticity};
use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond};
use crate::chirality::cleanup_chirality;
use crate::kekulize::{KekulizeError, kekulize};
use crate::mol::Mol;
use crate::valence::{ValenceError, check_valence};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error("{}", join_valence_errors(.0))]
    Valence(Vec<ValenceError>),
}

fn join_valence_errors(errors: &[ValenceError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValenceError>> for SanitizeError {
    fn from(errors: Vec<ValenceError>) -> Self {
        Self::Valence(errors)
    }
}

/// Kekulize, validate and perceive a parsed molecule.
pub fn sanitize(mol: Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, SanitizeError> {
    let mut mol = kekulize(mol)?;
    check_valence(&mol)?;
    recompute(&mut mol);
    Ok(mol)
}

/// Re-run the perception passes on a molecule that already has concrete
/// bond orders, validating valences first.
pub fn sanitize_kekule(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    check_valence(mol)?;
    recompute(mol);
    Ok(())
}

fn recompute(mol: &mut Mol<Atom, Bond>) {
    set_aromaticity(mol, AromaticityModel::Sssr);
    cleanup_chirality(mol);
    trace!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "sanitized molecule"
    );
}
