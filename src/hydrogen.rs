//! Conversion between implicit hydrogen counts and explicit hydrogen atoms.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::chirality::{implicit_h, reference_order, relabel};
use crate::mol::Mol;

/// Replace every atom's hydrogen count with explicit hydrogen atoms.
///
/// Original atoms keep their indices. The new hydrogens are appended after
/// them, grouped by parent in atom order. Chirality is re-expressed against
/// the new neighbor order.
pub fn add_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut result = Mol::new();
    for idx in mol.atoms() {
        result.add_atom(Atom {
            hydrogen_count: 0,
            ..*mol.atom(idx)
        });
    }
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            result.add_bond(a, b, mol.bond(edge).clone());
        }
    }

    let mut first_h: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
    for parent in mol.atoms() {
        for _ in 0..mol.atom(parent).hydrogen_count {
            let h = result.add_atom(Atom {
                atomic_num: 1,
                ..Atom::default()
            });
            result.add_bond(parent, h, Bond::default());
            first_h[parent.index()].get_or_insert(h);
        }
    }

    for center in mol.atoms() {
        let tag = mol.atom(center).chirality;
        let old: Vec<NodeIndex> = reference_order(mol, center)
            .into_iter()
            .map(|n| match first_h[center.index()] {
                Some(h) if n == implicit_h() => h,
                _ => n,
            })
            .collect();
        let new = reference_order(&result, center);
        result.atom_mut(center).chirality = relabel(tag, &old, &new);
    }

    result
}

#[derive(Debug, Clone, Default)]
pub struct RemoveHsOptions {
    /// Also fold isotopic hydrogens (`[2H]`, `[3H]`) into counts.
    pub remove_isotopes: bool,
}

pub fn remove_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    remove_hs_with(mol, &RemoveHsOptions::default())
}

/// Fold explicit hydrogens back into their parent's hydrogen count.
///
/// A hydrogen is removed when it is neutral, bonded to exactly one heavy
/// atom by a single bond and carries no isotope label (unless
/// [`RemoveHsOptions::remove_isotopes`] is set).
pub fn remove_hs_with(mol: &Mol<Atom, Bond>, opts: &RemoveHsOptions) -> Mol<Atom, Bond> {
    let parents: Vec<Option<NodeIndex>> = mol
        .atoms()
        .map(|idx| foldable_into(mol, idx, opts))
        .collect();
    let removed = |idx: NodeIndex| parents[idx.index()].is_some();
    let mut extra_h = vec![0u8; mol.atom_count()];
    for parent in parents.iter().flatten() {
        extra_h[parent.index()] += 1;
    }

    let mut result = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
    for idx in mol.atoms().filter(|&idx| !removed(idx)) {
        let atom = mol.atom(idx);
        index_map[idx.index()] = Some(result.add_atom(Atom {
            hydrogen_count: atom.hydrogen_count + extra_h[idx.index()],
            ..*atom
        }));
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(a), Some(b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(a, b, mol.bond(edge).clone());
        }
    }

    for center in mol.atoms() {
        let Some(new_center) = index_map[center.index()] else {
            continue;
        };
        let old: Vec<NodeIndex> = reference_order(mol, center)
            .into_iter()
            .map(|n| {
                if n == implicit_h() || removed(n) {
                    implicit_h()
                } else {
                    index_map[n.index()].unwrap_or(n)
                }
            })
            .collect();
        // a stereocenter holds at most one hydrogen, implicit or explicit
        if old.iter().filter(|&&n| n == implicit_h()).count() > 1 {
            continue;
        }
        let new = reference_order(&result, new_center);
        let tag = mol.atom(center).chirality;
        result.atom_mut(new_center).chirality = relabel(tag, &old, &new);
    }

    result
}

/// The heavy atom hydrogen `idx` folds into, if it may be removed.
fn foldable_into(mol: &Mol<Atom, Bond>, idx: NodeIndex, opts: &RemoveHsOptions) -> Option<NodeIndex> {
    let atom = mol.atom(idx);
    let plain = atom.atomic_num == 1
        && atom.formal_charge == 0
        && atom.hydrogen_count == 0
        && (atom.isotope == 0 || opts.remove_isotopes);
    if !plain {
        return None;
    }
    let mut bonds = mol.bonds_of(idx);
    let (Some(edge), None) = (bonds.next(), bonds.next()) else {
        return None;
    };
    let (a, b) = mol.bond_endpoints(edge)?;
    let parent = if a == idx { b } else { a };
    let single = mol.bond(edge).order == BondOrder::Single;
    (single && mol.atom(parent).atomic_num != 1).then_some(parent)
}
