//! InChI reader.
//!
//! Only the main layers are interpreted: formula, connections, hydrogens,
//! charge and protonation. Stereo layers are skipped and reading stops at
//! the isotopic or fixed-H layers, so the result is the constitution of
//! the structure without stereochemistry.

mod error;
mod layers;
mod solver;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::sanitize::sanitize_kekule;
pub use error::InchiError;

/// Standard and non-standard InChI prefixes.
const PREFIXES: [&str; 2] = ["InChI=1S/", "InChI=1/"];

#[derive(Debug, Clone)]
pub struct InchiOptions {
    /// Upper bound on placement and bond-order steps before giving up.
    pub search_budget: usize,
}

impl Default for InchiOptions {
    fn default() -> Self {
        Self {
            search_budget: 1_000_000,
        }
    }
}

pub fn is_inchi(s: &str) -> bool {
    s.trim_start().starts_with("InChI=")
}

pub fn from_inchi(s: &str) -> Result<Mol<Atom, Bond>, InchiError> {
    from_inchi_with(s, &InchiOptions::default())
}

/// Parse an InChI string and rebuild a sanitized molecule with Kekulé
/// bond orders.
pub fn from_inchi_with(s: &str, opts: &InchiOptions) -> Result<Mol<Atom, Bond>, InchiError> {
    let s = s.trim();
    let body = PREFIXES
        .iter()
        .find_map(|prefix| s.strip_prefix(prefix))
        .ok_or(InchiError::MissingPrefix)?;

    let layers = layers::parse_layers(body)?;
    let problem = solver::Problem::new(&layers)?;
    let solution = solver::solve(&problem, opts.search_budget)?;
    debug!(
        atoms = solution.elements.len(),
        bonds = solution.bonds.len(),
        steps = solution.steps,
        "reconstructed InChI structure"
    );

    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = solution
        .elements
        .iter()
        .enumerate()
        .map(|(i, elem)| {
            mol.add_atom(Atom {
                atomic_num: elem.atomic_num(),
                formal_charge: solution.charges[i],
                hydrogen_count: solution.hydrogens[i],
                ..Atom::default()
            })
        })
        .collect();
    for &(a, b, order) in &solution.bonds {
        let order = BondOrder::from_value(order).ok_or(InchiError::BondOrdersUnassignable)?;
        mol.add_bond(nodes[a], nodes[b], Bond::new(order));
    }

    sanitize_kekule(&mut mol)?;
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles, to_canonical_smiles};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn same_as_smiles(inchi: &str, smiles: &str) {
        let from_inchi = from_inchi(inchi).unwrap();
        let expected = from_smiles(smiles).unwrap();
        assert_eq!(
            to_canonical_smiles(&from_inchi),
            to_canonical_smiles(&expected),
            "{inchi}"
        );
    }

    #[test]
    fn methane() {
        let mol = from_inchi("InChI=1S/CH4/h1H4").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.atom(n(0)).atomic_num, 6);
        assert_eq!(mol.atom(n(0)).hydrogen_count, 4);
    }

    #[test]
    fn matches_smiles_reading() {
        same_as_smiles("InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3", "CCO");
        same_as_smiles("InChI=1S/C2H4O2/c1-2(3)4/h1H3,(H,3,4)", "CC(=O)O");
        same_as_smiles("InChI=1S/C2H6OS/c1-4(2)3/h1-2H3", "CS(C)=O");
        same_as_smiles("InChI=1S/C2H2/c1-2/h1-2H", "C#C");
        same_as_smiles("InChI=1S/H2/h1H", "[HH]");
    }

    #[test]
    fn benzene_is_aromatic() {
        let mol = from_inchi("InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H").unwrap();
        assert!(mol.atoms().all(|i| mol.atom(i).is_aromatic));
        assert!(mol.bonds().all(|e| mol.bond(e).is_aromatic));
        same_as_smiles("InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H", "c1ccccc1");
    }

    #[test]
    fn nitrogen_heteroaromatics() {
        same_as_smiles("InChI=1S/C5H5N/c1-2-4-6-5-3-1/h1-5H", "c1ccncc1");
        same_as_smiles("InChI=1S/C3H4N2/c1-2-5-3-4-1/h1-3H,(H,4,5)", "c1c[nH]cn1");
        same_as_smiles(
            "InChI=1S/C5H5N5/c6-4-3-5(9-1-7-3)10-2-8-4/h1-2H,(H3,6,7,8,9,10)",
            "Nc1ncnc2nc[nH]c12",
        );
        same_as_smiles(
            "InChI=1S/C8H10N4O2/c1-10-4-9-6-5(10)7(13)12(3)8(14)11(6)2/h4H,1-3H3",
            "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
        );
    }

    #[test]
    fn nitrogen_oxides_are_charge_separated() {
        same_as_smiles("InChI=1S/C6H5NO2/c8-7(9)6-4-2-1-3-5-6/h1-5H", "[O-][N+](=O)c1ccccc1");
        same_as_smiles("InChI=1S/HNO3/c2-1(3)4/h(H,2,3,4)", "O[N+](=O)[O-]");
        same_as_smiles("InChI=1S/C5H5NO/c7-6-4-2-1-3-5-6/h1-5H", "[O-][n+]1ccccc1");
    }

    #[test]
    fn charges_and_protons() {
        same_as_smiles("InChI=1S/H3N/h1H3/p+1", "[NH4+]");
        same_as_smiles("InChI=1S/C2H4O2/c1-2(3)4/h1H3,(H,3,4)/p-1", "CC(=O)[O-]");
        same_as_smiles("InChI=1S/C4H12N/c1-5(2,3)4/h1-4H3/q+1", "C[N+](C)(C)C");
        same_as_smiles("InChI=1S/ClH.Na/h1H;/q;+1/p-1", "[Cl-].[Na+]");
        same_as_smiles("InChI=1S/Ca/q+2", "[Ca+2]");
    }

    #[test]
    fn stereo_layers_ignored() {
        same_as_smiles(
            "InChI=1S/C3H7NO2/c1-2(4)3(5)6/h2H,4H2,1H3,(H,5,6)/t2-/m0/s1",
            "CC(N)C(=O)O",
        );
    }

    #[test]
    fn non_standard_prefix() {
        assert_eq!(from_inchi("InChI=1/CH4/h1H4").unwrap().atom_count(), 1);
    }

    #[test]
    fn errors() {
        assert_eq!(from_inchi("CCO").unwrap_err(), InchiError::MissingPrefix);
        assert!(matches!(
            from_inchi("InChI=1S/C2H6/c1-3/h1-2H3"),
            Err(InchiError::AtomOutOfRange { atom: 3, count: 2 })
        ));
        assert!(matches!(
            from_inchi("InChI=1S/CH4/h1H3"),
            Err(InchiError::HydrogenMismatch { .. })
        ));
        assert!(matches!(
            from_inchi("InChI=1S/Xx/h1H"),
            Err(InchiError::Formula(_))
        ));
        assert!(matches!(
            from_inchi("InChI=1S/CH4/c1-x"),
            Err(InchiError::MalformedLayer { .. })
        ));
        let opts = InchiOptions { search_budget: 1 };
        assert!(matches!(
            from_inchi_with("InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H", &opts),
            Err(InchiError::SearchBudgetExhausted { budget: 1 })
        ));
    }

    #[test]
    fn detects_inchi_prefix() {
        assert!(is_inchi("InChI=1S/CH4/h1H4"));
        assert!(!is_inchi("C"));
    }
}
