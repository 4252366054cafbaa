//! Unpaired electron counting. The count compares the electrons an atom
//! brings with those tied up in bonds, hydrogens and lone pairs.

use petgraph::graph::NodeIndex;

use crate::element::{Element, outer_shell_electrons};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

/// Unpaired electrons on `idx`: 1 for `[CH3]`, 2 for `[CH2]`, 0 for atoms
/// in an ordinary bonding state.
pub fn num_radical_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let atomic_num = atom.atomic_num();
    let Some(elem) = Element::from_atomic_num(atomic_num) else {
        return 0;
    };
    let charge = atom.formal_charge() as i16;
    let n_outer = outer_shell_electrons(atomic_num) as i16;

    let defaults = elem.default_valences();
    if defaults.is_empty() {
        // no valence model: only a bare, isolated atom can be judged
        let n_valence = n_outer - charge;
        if mol.neighbors(idx).next().is_some() || n_valence < 0 {
            return 0;
        }
        return (n_valence % 2) as u8;
    }

    let valence = total_valence(mol, idx) as i16;
    let shell: i16 = if atomic_num <= 2 { 2 } else { 8 };

    let mut radicals = shell - n_outer - valence + charge;
    if radicals < 0 {
        // hypervalent: measure against the next allowed valence state
        radicals = if defaults.len() > 1 {
            defaults
                .iter()
                .map(|&v| v as i16 - valence + charge)
                .find(|&r| r >= 0)
                .unwrap_or(0)
        } else {
            0
        };
    }

    let from_outer = n_outer - valence - charge;
    if (0..radicals).contains(&from_outer) {
        radicals = from_outer;
    }

    radicals.max(0) as u8
}
