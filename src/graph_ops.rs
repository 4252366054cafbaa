//! Whole-molecule graph operations: fragment splitting and atom renumbering.

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;

use crate::atom::Atom;
use crate::chirality::{implicit_h, reference_order, relabel};
use crate::mol::Mol;

/// Atoms grouped by connected fragment. Each fragment is sorted by index
/// and fragments are ordered by their lowest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let mut sets = UnionFind::<usize>::new(mol.atom_count());
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            sets.union(a.index(), b.index());
        }
    }

    // atoms are visited in ascending order, so each fragment is created at
    // its lowest atom and filled in sorted order
    let mut slot_of_root: Vec<Option<usize>> = vec![None; mol.atom_count()];
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for atom in mol.atoms() {
        let root = sets.find(atom.index());
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(atom);
    }
    components
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenumberError {
    #[error("new order has {got} entries for {expected} atoms")]
    LengthMismatch { expected: usize, got: usize },
    #[error("new order is not a permutation of the atom indices")]
    InvalidPermutation,
}

/// Rebuild `mol` with atom `new_order[i]` moved to index `i`.
///
/// Chirality tags are re-expressed against each atom's new neighbor order,
/// so the spatial arrangement is unchanged.
pub fn renumber_atoms<B: Clone>(
    mol: &Mol<Atom, B>,
    new_order: &[usize],
) -> Result<Mol<Atom, B>, RenumberError> {
    let n = mol.atom_count();
    if new_order.len() != n {
        return Err(RenumberError::LengthMismatch {
            expected: n,
            got: new_order.len(),
        });
    }
    let mut old_to_new: Vec<Option<NodeIndex>> = vec![None; n];
    for (new_idx, &old_idx) in new_order.iter().enumerate() {
        let Some(slot) = old_to_new.get_mut(old_idx).filter(|s| s.is_none()) else {
            return Err(RenumberError::InvalidPermutation);
        };
        *slot = Some(NodeIndex::new(new_idx));
    }
    // the implicit hydrogen marker maps to itself
    let map = |node: NodeIndex| {
        if node == implicit_h() {
            return node;
        }
        old_to_new.get(node.index()).copied().flatten().unwrap_or(node)
    };

    let mut renumbered = Mol::new();
    for &old_idx in new_order {
        renumbered.add_atom(mol.atom(NodeIndex::new(old_idx)).clone());
    }
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            renumbered.add_bond(map(a), map(b), mol.bond(edge).clone());
        }
    }

    for old in mol.atoms() {
        let tag = mol.atom(old).chirality;
        let carried: Vec<NodeIndex> = reference_order(mol, old).into_iter().map(map).collect();
        let fresh = reference_order(&renumbered, map(old));
        renumbered.atom_mut(map(old)).chirality = relabel(tag, &carried, &fresh);
    }

    Ok(renumbered)
}
