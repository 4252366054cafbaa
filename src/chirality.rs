use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::atom::{Atom, Chirality};
use crate::mol::{Mol, permutation_parity};
use crate::traits::{HasBondOrder, HasHydrogenCount};

/// Stand-in for an atom's implicit hydrogen in neighbor orderings.
pub fn implicit_h() -> NodeIndex {
    NodeIndex::end()
}

/// The neighbor order an atom's [`Chirality`] refers to: the implicit
/// hydrogen first when the atom has one, then graph neighbors as
/// [`Mol::neighbors`] yields them.
pub fn reference_order<A: HasHydrogenCount, B>(mol: &Mol<A, B>, center: NodeIndex) -> Vec<NodeIndex> {
    let mut order = Vec::with_capacity(4);
    if mol.atom(center).hydrogen_count() > 0 {
        order.push(implicit_h());
    }
    order.extend(mol.neighbors(center));
    order
}

/// Re-express a chirality tag given relative to `from` as one relative to
/// `to`. Both orders must hold the same neighbors; an odd permutation flips
/// the handedness.
pub fn relabel(tag: Chirality, from: &[NodeIndex], to: &[NodeIndex]) -> Chirality {
    if tag == Chirality::None || from.len() != to.len() {
        return tag;
    }
    if permutation_parity(from, to) {
        tag
    } else {
        tag.inverted()
    }
}

/// Drop chirality tags from atoms that cannot be stereocenters: fewer
/// than three substituents, more than one hydrogen, three substituents on
/// an atom without a stereogenic lone pair, or all substituents alike.
pub fn cleanup_chirality<B>(mol: &mut Mol<Atom, B>)
where
    B: HasBondOrder,
{
    let flagged: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).chirality != Chirality::None)
        .filter(|&idx| !can_be_stereocenter(mol, idx))
        .collect();
    for idx in flagged {
        mol.atom_mut(idx).chirality = Chirality::None;
    }
}

fn can_be_stereocenter<B: HasBondOrder>(mol: &Mol<Atom, B>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let substituents = mol.neighbors(idx).count() + usize::from(atom.hydrogen_count);
    let shape_ok = match substituents {
        4.. => true,
        3 => matches!(atom.atomic_num, 7 | 15 | 16 | 33 | 34 | 52),
        _ => false,
    };
    shape_ok && atom.hydrogen_count <= 1 && !substituents_alike(mol, idx)
}

/// Whether every substituent is the same element over the same bond order.
fn substituents_alike<B: HasBondOrder>(mol: &Mol<Atom, B>, idx: NodeIndex) -> bool {
    let hydrogens = (0..mol.atom(idx).hydrogen_count).map(|_| (1, 1));
    let mut keys = mol
        .graph()
        .edges(idx)
        .map(|e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (mol.atom(other).atomic_num, e.weight().bond_order().value())
        })
        .chain(hydrogens);
    match keys.next() {
        Some(first) => keys.all(|k| k == first),
        None => true,
    }
}
