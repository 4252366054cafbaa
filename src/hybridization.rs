//! Orbital hybridization and bond conjugation.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::BondOrder;
use crate::element::{Element, outer_shell_electrons};
use crate::mol::Mol;
use crate::radical::num_radical_electrons;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hybridization {
    S,
    SP,
    SP2,
    #[default]
    SP3,
    SP3D,
    SP3D2,
    Other,
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hybridization::S => "S",
            Hybridization::SP => "SP",
            Hybridization::SP2 => "SP2",
            Hybridization::SP3 => "SP3",
            Hybridization::SP3D => "SP3D",
            Hybridization::SP3D2 => "SP3D2",
            Hybridization::Other => "OTHER",
        };
        f.write_str(s)
    }
}

fn total_degree<A: HasHydrogenCount, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8 {
    mol.neighbors(idx).count() as u8 + mol.atom(idx).hydrogen_count()
}

fn first_default_valence(atomic_num: u8) -> Option<u8> {
    Element::from_atomic_num(atomic_num)
        .and_then(|e| e.default_valences().first().copied())
        .filter(|&v| v > 1)
}

/// Electrons an atom can lend to a pi system, or `None` when it has none
/// to offer (saturated degree or no valence model).
fn donatable_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> Option<i16>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let default = first_default_valence(atom.atomic_num())? as i16;
    let degree = total_degree(mol, idx) as i16;
    if degree > 3 {
        return None;
    }
    let n_outer = outer_shell_electrons(atom.atomic_num()) as i16;
    let lone = (n_outer - default - atom.formal_charge() as i16).max(0);
    Some(default - degree + lone - num_radical_electrons(mol, idx) as i16)
}

fn can_conjugate<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let atomic_num = atom.atomic_num();
    let Some(default) = first_default_valence(atomic_num) else {
        return false;
    };
    if atom.formal_charge() == 0 && total_valence(mol, idx) > default {
        return false;
    }

    // heavier pnictogens and chalcogens only join through a terminal position
    let n_outer = outer_shell_electrons(atomic_num);
    let row_ok = atomic_num <= 10
        || (n_outer != 5 && n_outer != 6)
        || (n_outer == 6 && total_degree(mol, idx) < 2);

    row_ok && donatable_electrons(mol, idx).is_some_and(|e| e > 0)
}

/// Flag each bond (by edge index) that belongs to a conjugated system.
///
/// Aromatic bonds are always conjugated. Otherwise a multiple bond and a
/// second bond sharing an sp/sp2-capable atom are conjugated together when
/// all three atoms can take part.
pub fn assign_conjugation<A, B>(mol: &Mol<A, B>) -> Vec<bool>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder + HasAromaticity,
{
    let mut conjugated: Vec<bool> = mol.bonds().map(|e| mol.bond(e).is_aromatic()).collect();

    for center in mol.atoms() {
        if !(2..=3).contains(&total_degree(mol, center)) || !can_conjugate(mol, center) {
            continue;
        }

        let bonds: Vec<(EdgeIndex, NodeIndex)> = mol
            .bonds_of(center)
            .filter_map(|e| {
                let (a, b) = mol.bond_endpoints(e)?;
                Some((e, if a == center { b } else { a }))
            })
            .collect();

        for &(multiple, partner) in &bonds {
            if mol.bond(multiple).bond_order() == BondOrder::Single || !can_conjugate(mol, partner) {
                continue;
            }
            for &(other, far) in &bonds {
                if other == multiple || total_degree(mol, far) > 3 {
                    continue;
                }
                if can_conjugate(mol, far) {
                    conjugated[multiple.index()] = true;
                    conjugated[other.index()] = true;
                }
            }
        }
    }

    conjugated
}

fn orbital_count<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> i16
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let degree = total_degree(mol, idx) as i16;
    let atomic_num = atom.atomic_num();
    if atomic_num <= 1 || atomic_num >= 89 {
        return degree;
    }

    let n_outer = outer_shell_electrons(atomic_num) as i16;
    let valence = total_valence(mol, idx) as i16;
    let charge = atom.formal_charge() as i16;
    let free = n_outer - (valence + charge);

    if valence + n_outer - charge < 8 {
        let radicals = num_radical_electrons(mol, idx) as i16;
        degree + (free - radicals) / 2 + radicals
    } else {
        degree + free / 2
    }
}

/// Hybridization of one atom given whether any of its bonds is conjugated.
///
/// A four-orbital atom with at most three neighbors drops to sp2 when it
/// is conjugated (amide nitrogen, phenol oxygen).
pub fn atom_hybridization<A, B>(mol: &Mol<A, B>, idx: NodeIndex, conjugated: bool) -> Hybridization
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    if mol.atom(idx).atomic_num() == 0 {
        return Hybridization::Other;
    }
    match orbital_count(mol, idx) {
        i16::MIN..=1 => Hybridization::S,
        2 => Hybridization::SP,
        3 => Hybridization::SP2,
        4 if total_degree(mol, idx) <= 3 && conjugated => Hybridization::SP2,
        4 => Hybridization::SP3,
        5 => Hybridization::SP3D,
        6 => Hybridization::SP3D2,
        _ => Hybridization::Other,
    }
}

/// Hybridization of every atom, indexed by node index.
pub fn assign_hybridization<A, B>(mol: &Mol<A, B>) -> Vec<Hybridization>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder + HasAromaticity,
{
    let conjugation = assign_conjugation(mol);
    mol.atoms()
        .map(|idx| {
            let conjugated = mol.bonds_of(idx).any(|e| conjugation[e.index()]);
            atom_hybridization(mol, idx, conjugated)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;
    use Hybridization::*;

    fn hyb(smiles: &str) -> Vec<Hybridization> {
        assign_hybridization(&from_smiles(smiles).unwrap())
    }

    fn conj(smiles: &str) -> Vec<bool> {
        assign_conjugation(&from_smiles(smiles).unwrap())
    }

    #[test]
    fn whole_molecule() {
        for (smiles, expected) in [
            ("C", vec![SP3]),
            ("CC", vec![SP3, SP3]),
            ("CCO", vec![SP3, SP3, SP3]),
            ("C=C", vec![SP2, SP2]),
            ("C#C", vec![SP, SP]),
            ("CC=O", vec![SP3, SP2, SP2]),
            ("CC(=O)O", vec![SP3, SP2, SP2, SP2]),
            ("CC(N)=O", vec![SP3, SP2, SP2, SP2]),
            ("O", vec![SP3]),
            ("N", vec![SP3]),
            ("S", vec![SP3]),
            ("P", vec![SP3]),
            ("B", vec![SP2]),
            ("[NH4+]", vec![SP3]),
            ("[O-]", vec![SP3]),
            ("[Cl-].[Na+]", vec![SP3, S]),
            ("[2H]C([2H])([2H])[2H]", vec![S, SP3, S, S, S]),
            ("[CH3]", vec![SP3]),
            ("[NH2]", vec![SP3]),
            ("[OH]", vec![SP3]),
        ] {
            assert_eq!(hyb(smiles), expected, "{smiles}");
        }
    }

    #[test]
    fn aromatic_rings_are_sp2() {
        for smiles in ["c1ccccc1", "c1ccncc1", "c1cc[nH]c1", "c1ccoc1", "c1ccsc1"] {
            assert!(hyb(smiles).iter().all(|&h| h == SP2), "{smiles}");
        }
    }

    #[test]
    fn single_atom() {
        for (smiles, idx, expected) in [
            ("Oc1ccccc1", 0, SP2),
            ("Nc1ccccc1", 0, SP2),
            ("Sc1ccccc1", 0, SP3),
            ("N#Cc1ccccc1", 0, SP),
            ("N#Cc1ccccc1", 1, SP),
            ("CS(C)(=O)=O", 1, SP3),
            ("O=P(O)(O)O", 1, SP3),
            ("O=[N+]([O-])c1ccccc1", 0, SP2),
            ("O=[N+]([O-])c1ccccc1", 1, SP2),
            ("O=[N+]([O-])c1ccccc1", 2, SP2),
        ] {
            assert_eq!(hyb(smiles)[idx], expected, "{smiles} atom {idx}");
        }
    }

    #[test]
    fn display_names() {
        let names: Vec<String> = [S, SP, SP2, SP3, SP3D, SP3D2, Other]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["S", "SP", "SP2", "SP3", "SP3D", "SP3D2", "OTHER"]);
    }

    #[test]
    fn conjugated_bonds() {
        for (smiles, expected) in [
            ("CC", vec![false]),
            ("C=C", vec![false]),
            ("CC=C", vec![false, false]),
            ("C=CC=C", vec![true; 3]),
            ("C=CC=O", vec![true; 3]),
            ("CC(=O)O", vec![false, true, true]),
            ("CC(N)=O", vec![false, true, true]),
            ("C1CCCCC1", vec![false; 6]),
        ] {
            assert_eq!(conj(smiles), expected, "{smiles}");
        }
    }

    #[test]
    fn heteroatom_donor_joins_ring() {
        for smiles in ["Nc1ccccc1", "Oc1ccccc1"] {
            assert!(conj(smiles).iter().all(|&c| c), "{smiles}");
        }
    }
}
