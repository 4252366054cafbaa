//! String-to-record pipeline.
//!
//! ```text
//! SMILES / InChI ─▶ Mol ─▶ MolGraph ─▶ MolDict
//!                    ▲        │
//!                    └────────┴─▶ canonical SMILES
//! ```

use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::error::{ConversionError, ParseError};
use crate::graph::{MolGraph, graph_to_mol, mol_to_graph};
use crate::hydrogen::add_hs;
use crate::inchi::{from_inchi, is_inchi};
use crate::mol::Mol;
use crate::mpnn::{MolDict, graph_to_dict};
use crate::smiles::{from_smiles, to_canonical_smiles};

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Turn hydrogen counts into explicit hydrogen atoms before building
    /// the graph.
    pub add_hydrogens: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            add_hydrogens: true,
        }
    }
}

/// Read a molecule from InChI (when the string starts with `InChI=`) or
/// SMILES.
pub fn parse_molecule_string(s: &str) -> Result<Mol<Atom, Bond>, ConversionError> {
    let parsed = if is_inchi(s) {
        from_inchi(s).map_err(ParseError::from)
    } else {
        from_smiles(s).map_err(ParseError::from)
    };
    parsed.map_err(|source| ConversionError::Parse {
        input: s.to_string(),
        source,
    })
}

pub fn string_to_graph(s: &str) -> Result<MolGraph, ConversionError> {
    string_to_graph_with(s, &ParseOptions::default())
}

pub fn string_to_graph_with(s: &str, opts: &ParseOptions) -> Result<MolGraph, ConversionError> {
    let mut mol = parse_molecule_string(s)?;
    if opts.add_hydrogens {
        mol = add_hs(&mol);
    }
    debug!(
        input = s,
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "parsed molecule string"
    );
    Ok(mol_to_graph(&mol))
}

/// Canonical SMILES of the molecule a graph describes. Hydrogens that are
/// graph nodes are written as `[H]` atoms.
pub fn graph_to_smiles(graph: &MolGraph) -> Result<String, ConversionError> {
    let mol = graph_to_mol(graph)?;
    Ok(to_canonical_smiles(&mol))
}

pub fn string_to_dict(s: &str) -> Result<MolDict, ConversionError> {
    graph_to_dict(&string_to_graph(s)?)
}

/// Flatten a molecule as it is, without adding hydrogens.
pub fn mol_to_dict(mol: &Mol<Atom, Bond>) -> Result<MolDict, ConversionError> {
    graph_to_dict(&mol_to_graph(mol))
}
