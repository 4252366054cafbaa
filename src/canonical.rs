//! Canonical atom ranking.
//!
//! Atoms start from a hashed invariant, are refined Morgan-style by their
//! neighbors' ranks, and remaining ties are broken by trying each tied atom
//! and keeping the trial with the smallest invariant trace. The result
//! depends only on the molecule, never on its input atom numbering.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;

use crate::atom::Chirality;
use crate::bond::BondOrder;
use crate::chirality::{implicit_h, reference_order};
use crate::mol::{Mol, permutation_parity};
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasChirality, HasFormalCharge, HasHydrogenCount,
    HasIsotope,
};

/// 64-bit FNV-1a. Ranks must not depend on the process, so the seeded
/// std hasher is not an option.
struct StableHasher {
    state: u64,
}

impl StableHasher {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
}

impl Hasher for StableHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        self.state = bytes
            .iter()
            .fold(self.state, |h, &b| (h ^ u64::from(b)).wrapping_mul(Self::PRIME));
    }
}

fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = StableHasher {
        state: StableHasher::OFFSET,
    };
    value.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    singles: u8,
    doubles: u8,
    triples: u8,
    aromatic_bonds: u8,
}

fn atom_invariant<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> AtomInvariant
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder + HasAromaticity,
{
    let atom = mol.atom(idx);
    let mut inv = AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: 0,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        is_aromatic: atom.is_aromatic(),
        isotope: atom.isotope(),
        singles: 0,
        doubles: 0,
        triples: 0,
        aromatic_bonds: 0,
    };
    for edge in mol.bonds_of(idx) {
        inv.degree += 1;
        let bond = mol.bond(edge);
        if bond.is_aromatic() {
            inv.aromatic_bonds += 1;
            continue;
        }
        match bond.bond_order() {
            BondOrder::Single => inv.singles += 1,
            BondOrder::Double => inv.doubles += 1,
            BondOrder::Triple => inv.triples += 1,
        }
    }
    inv
}

/// Rank of each atom given its value: the position of the first atom with
/// the same value once all are sorted, so equal values share a rank.
fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0; values.len()];
    let mut group_start = 0;
    for (pos, &atom) in order.iter().enumerate() {
        if pos > 0 && values[atom] != values[order[pos - 1]] {
            group_start = pos;
        }
        ranks[atom] = group_start;
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    ranks.iter().collect::<HashSet<_>>().len()
}

fn morgan_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let mut prev_distinct = count_distinct(ranks);

    loop {
        let values: Vec<u64> = mol
            .atoms()
            .map(|node| {
                let mut neighbor_ranks: Vec<usize> =
                    mol.neighbors(node).map(|nb| ranks[nb.index()]).collect();
                neighbor_ranks.sort_unstable();
                stable_hash(&(ranks[node.index()], neighbor_ranks))
            })
            .collect();
        let new_ranks = ranks_from_values(&values);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = new_ranks;
        prev_distinct = distinct;
    }
}

/// Hash of a stereocenter's handedness as seen through the current ranks.
/// Returns `None` for atoms without a tag. Tied neighbor ranks make the
/// handedness meaningless, so only the tie itself is hashed.
fn stereo_hash<A, B>(mol: &Mol<A, B>, center: NodeIndex, ranks: &[usize]) -> Option<u64>
where
    A: HasChirality + HasHydrogenCount,
{
    let tag = mol.atom(center).chirality();
    if tag == Chirality::None {
        return None;
    }
    let n = ranks.len();
    let order = reference_order(mol, center);
    let rank_of = |node: NodeIndex| if node == implicit_h() { n } else { ranks[node.index()] };

    let mut sorted = order.clone();
    sorted.sort_by_key(|&node| rank_of(node));
    let has_ties = sorted.windows(2).any(|w| rank_of(w[0]) == rank_of(w[1]));

    let center_rank = ranks[center.index()];
    if has_ties {
        let tied: Vec<usize> = sorted.iter().map(|&node| rank_of(node)).collect();
        return Some(stable_hash(&(center_rank, tied, 3u8)));
    }
    let even = permutation_parity(&order, &sorted);
    let handed = match (tag, even) {
        (Chirality::Cw, true) | (Chirality::Ccw, false) => 1u8,
        _ => 2,
    };
    Some(stable_hash(&(center_rank, handed)))
}

fn chirality_refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>)
where
    A: HasChirality + HasHydrogenCount,
{
    let mut any_stereo = false;
    let values: Vec<u64> = mol
        .atoms()
        .map(|node| match stereo_hash(mol, node, ranks) {
            Some(h) => {
                any_stereo = true;
                h
            }
            None => stable_hash(&ranks[node.index()]),
        })
        .collect();
    if any_stereo {
        *ranks = ranks_from_values(&values);
    }
}

fn refine<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>)
where
    A: HasChirality + HasHydrogenCount,
{
    morgan_refine(mol, ranks);
    loop {
        let prev = count_distinct(ranks);
        chirality_refine(mol, ranks);
        morgan_refine(mol, ranks);
        if count_distinct(ranks) <= prev {
            break;
        }
    }
}

/// Canonical rank of every atom, a permutation of `0..atom_count`.
pub fn canonical_ordering<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum
        + HasHydrogenCount
        + HasFormalCharge
        + HasAromaticity
        + HasIsotope
        + HasChirality,
    B: HasBondOrder + HasAromaticity,
{
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let invariants: Vec<AtomInvariant> = mol.atoms().map(|i| atom_invariant(mol, i)).collect();
    let initial: Vec<u64> = invariants.iter().map(stable_hash).collect();
    let mut ranks = ranks_from_values(&initial);
    refine(mol, &mut ranks);

    if count_distinct(&ranks) < n {
        break_ties(mol, &mut ranks, &invariants);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| ranks[i]);
    let mut final_ranks = vec![0usize; n];
    for (rank, &atom_idx) in indices.iter().enumerate() {
        final_ranks[atom_idx] = rank;
    }
    final_ranks
}

fn break_ties<A, B>(mol: &Mol<A, B>, ranks: &mut Vec<usize>, invariants: &[AtomInvariant])
where
    A: HasChirality + HasHydrogenCount,
{
    let n = ranks.len();

    while count_distinct(ranks) < n {
        let Some(tied_rank) = best_tied_rank(mol, ranks) else {
            return;
        };
        let tied_atoms: Vec<usize> = (0..n).filter(|&i| ranks[i] == tied_rank).collect();
        let max_rank = ranks.iter().copied().max().unwrap_or(0);

        // promote each candidate in turn; the smallest invariant trace wins
        let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
        for &candidate in &tied_atoms {
            let mut trial = ranks.clone();
            trial[candidate] = max_rank + 1;
            refine(mol, &mut trial);

            let mut by_rank: Vec<usize> = (0..n).collect();
            by_rank.sort_by_key(|&i| trial[i]);
            let trace: Vec<u64> = by_rank
                .iter()
                .map(|&i| {
                    let node = NodeIndex::new(i);
                    let mut nb_ranks: Vec<usize> =
                        mol.neighbors(node).map(|nb| trial[nb.index()]).collect();
                    nb_ranks.sort_unstable();
                    stable_hash(&(&invariants[i], nb_ranks, stereo_hash(mol, node, &trial)))
                })
                .collect();
            if best.as_ref().is_none_or(|(best_trace, _)| trace < *best_trace) {
                best = Some((trace, trial));
            }
        }

        match best {
            Some((_, trial)) => *ranks = trial,
            None => return,
        }
    }
}

/// The smallest tied rank, preferring ranks that hold no stereocenter.
fn best_tied_rank<A, B>(mol: &Mol<A, B>, ranks: &[usize]) -> Option<usize>
where
    A: HasChirality,
{
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &r in ranks {
        *counts.entry(r).or_default() += 1;
    }
    let stereo_ranks: Vec<usize> = mol
        .atoms()
        .filter(|&i| mol.atom(i).chirality() != Chirality::None)
        .map(|i| ranks[i.index()])
        .collect();

    let tied = counts.into_iter().filter(|&(_, c)| c > 1).map(|(r, _)| r);
    let (plain, stereo): (Vec<usize>, Vec<usize>) = tied.partition(|r| !stereo_ranks.contains(r));
    plain.into_iter().min().or_else(|| stereo.into_iter().min())
}
