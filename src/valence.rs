use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::element::{Element, outer_shell_electrons};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "atom {} ({}): valence {actual_valence} not in {allowed_valences:?}",
    .atom_idx.index(),
    symbol_of(.atomic_num)
)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

fn symbol_of(atomic_num: &u8) -> &'static str {
    Element::from_atomic_num(*atomic_num).map_or("?", Element::symbol)
}

/// Sum of bond orders plus attached hydrogens.
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    mol.bonds_of(atom)
        .map(|e| bond_valence(mol.bond(e).bond_order()))
        .fold(mol.atom(atom).hydrogen_count(), u8::saturating_add)
}

fn bond_valence(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
    }
}

/// Valences an atom of the given element may have at the given charge, in
/// ascending order.
///
/// Neutral atoms use [`Element::default_valences`]. Charged main-group atoms
/// are treated as their isoelectronic neighbor: an atom with `e` valence
/// electrons after removing the charge bonds `e` times when `e <= 4` and
/// `8 - e` times otherwise, with expanded octets (steps of two) allowed from
/// the third period on. Elements without a valence model return an empty
/// list and are never checked.
pub fn allowed_valences(atomic_num: u8, formal_charge: i8) -> Vec<u8> {
    let Some(elem) = Element::from_atomic_num(atomic_num) else {
        return Vec::new();
    };
    let defaults = elem.default_valences();
    if defaults.is_empty() {
        return Vec::new();
    }
    if formal_charge == 0 {
        return defaults.to_vec();
    }

    let effective = outer_shell_electrons(atomic_num) as i16 - formal_charge as i16;
    if elem == Element::H {
        return match effective {
            0 | 2 => vec![0],
            1 => vec![1],
            _ => Vec::new(),
        };
    }
    if !(0..=8).contains(&effective) {
        return Vec::new();
    }
    let effective = effective as u8;
    if effective <= 4 {
        return vec![effective];
    }
    let base = 8 - effective;
    if elem.period() <= 2 {
        return vec![base];
    }
    (base..=effective).step_by(2).collect()
}

/// Check every atom against [`allowed_valences`].
///
/// An atom fails when its total valence (bond orders plus hydrogens) exceeds
/// the largest allowed valence. Valences below the maximum are accepted, so
/// radicals and carbenes pass.
pub fn check_valence<A, B>(mol: &Mol<A, B>) -> Result<(), Vec<ValenceError>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            let allowed = allowed_valences(atom.atomic_num(), atom.formal_charge());
            let max = *allowed.last()?;
            let v = total_valence(mol, idx);
            if v <= max {
                return None;
            }
            Some(ValenceError {
                atom_idx: idx,
                atomic_num: atom.atomic_num(),
                actual_valence: v,
                allowed_valences: allowed,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::smiles::from_smiles;

    fn lone_atom(atomic_num: u8, formal_charge: i8, hydrogen_count: u8) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        mol.add_atom(Atom {
            atomic_num,
            formal_charge,
            hydrogen_count,
            ..Atom::default()
        });
        mol
    }

    #[test]
    fn parsed_molecules_pass() {
        for smiles in [
            "C",
            "CC",
            "c1ccccc1",
            "O",
            "N",
            "[NH4+]",
            "[CH3]",
            "[Fe]",
            "S(F)(F)(F)(F)(F)F",
            "OP(=O)(O)O",
        ] {
            let mol = from_smiles(smiles).unwrap();
            assert!(check_valence(&mol).is_ok(), "{smiles}");
        }
    }

    #[test]
    fn overfull_atoms_reported() {
        let errs = check_valence(&lone_atom(6, 0, 5)).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].atom_idx, NodeIndex::new(0));
        assert_eq!(errs[0].actual_valence, 5);
        assert_eq!(errs[0].allowed_valences, vec![4]);

        let errs = check_valence(&lone_atom(7, 1, 5)).unwrap_err();
        assert_eq!(errs[0].allowed_valences, vec![4]);
        assert_eq!(errs[0].to_string(), "atom 0 (N): valence 5 not in [4]");
    }

    #[test]
    fn neutral_nitrogen_is_trivalent() {
        assert!(from_smiles("C[N+](=O)[O-]").is_ok());
        assert!(from_smiles("CP(=O)(O)O").is_ok());
        let err = from_smiles("CN(=O)=O").unwrap_err();
        assert_eq!(err.to_string(), "atom 1 (N): valence 5 not in [3]");
    }

    #[test]
    fn charge_shifts_valence() {
        for (atomic_num, charge, expected) in [
            (7, 1, vec![4]),
            (7, -1, vec![2]),
            (8, -1, vec![1]),
            (8, 1, vec![3]),
            (5, -1, vec![4]),
            (6, 1, vec![3]),
            (16, 1, vec![3, 5]),
            (1, 1, vec![0]),
            (26, 2, vec![]),
        ] {
            assert_eq!(
                allowed_valences(atomic_num, charge),
                expected,
                "Z={atomic_num} charge {charge}"
            );
        }
    }

    #[test]
    fn double_bonds_count_twice() {
        let mol = from_smiles("C=C").unwrap();
        assert!(mol.atoms().all(|idx| total_valence(&mol, idx) == 4));
        let mol = from_smiles("C#N").unwrap();
        assert_eq!(total_valence(&mol, NodeIndex::new(1)), 3);
    }
}
