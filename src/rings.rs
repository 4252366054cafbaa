//! Smallest set of smallest rings.
//!
//! Candidate cycles come from Horton's construction: for every atom `w` and
//! bond `u-v`, join the shortest paths `w..u` and `w..v` when they only meet
//! at `w`. Sorted by size, candidates are kept while they stay linearly
//! independent over GF(2) in bond space, until the cyclomatic number is
//! reached.

use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

#[derive(Debug, Clone)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let wanted = Self::expected_ring_count(mol);
        if wanted == 0 {
            return Self { rings: Vec::new() };
        }

        let trees: Vec<PathTree> = mol.atoms().map(|root| PathTree::new(mol, root)).collect();
        let mut candidates = horton_cycles(mol, &trees);
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        let mut space = CycleSpace { rows: Vec::new() };
        let mut rings = Vec::with_capacity(wanted);
        for cycle in candidates {
            if rings.len() == wanted {
                break;
            }
            if space.insert(bond_set(mol, &cycle)) {
                rings.push(cycle);
            }
        }
        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self { rings }
    }

    /// Rings as closed walks, each starting at its lowest atom.
    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings
            .iter()
            .any(|ring| ring_steps(ring).any(|(x, y)| (x, y) == (a, b) || (x, y) == (b, a)))
    }

    /// Cyclomatic number: bonds minus atoms plus connected pieces.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let pieces = connected_components(mol.graph());
        (mol.bond_count() + pieces).saturating_sub(mol.atom_count())
    }
}

fn ring_steps(ring: &[NodeIndex]) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b))
}

/// Breadth-first shortest-path tree from one root.
struct PathTree {
    parent: Vec<Option<NodeIndex>>,
    depth: Vec<Option<usize>>,
}

impl PathTree {
    fn new<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut parent = vec![None; n];
        let mut depth = vec![None; n];
        depth[root.index()] = Some(0);
        let mut queue = VecDeque::from([(root, 0)]);
        while let Some((cur, d)) = queue.pop_front() {
            for next in mol.neighbors(cur) {
                if depth[next.index()].is_none() {
                    depth[next.index()] = Some(d + 1);
                    parent[next.index()] = Some(cur);
                    queue.push_back((next, d + 1));
                }
            }
        }
        Self { parent, depth }
    }

    /// Path from the root to `to`, both ends included.
    fn path_to(&self, to: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![to];
        let mut cur = to;
        while let Some(p) = self.parent[cur.index()] {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }
}

fn horton_cycles<A, B>(mol: &Mol<A, B>, trees: &[PathTree]) -> Vec<Vec<NodeIndex>> {
    let mut cycles = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for tree in trees {
            let (Some(du), Some(dv)) = (tree.depth[u.index()], tree.depth[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let to_u = tree.path_to(u);
            let to_v = tree.path_to(v);
            if to_u[1..].iter().any(|x| to_v[1..].contains(x)) {
                continue;
            }
            let mut cycle = to_u;
            cycle.extend(to_v[1..].iter().rev());
            cycles.push(canonical_rotation(cycle));
        }
    }
    cycles
}

/// Rotate a cycle to start at its lowest atom and walk toward the lower of
/// that atom's two ring neighbors.
fn canonical_rotation(mut cycle: Vec<NodeIndex>) -> Vec<NodeIndex> {
    if let Some(start) = cycle.iter().enumerate().min_by_key(|&(_, v)| v).map(|(i, _)| i) {
        cycle.rotate_left(start);
    }
    let len = cycle.len();
    if len > 2 && cycle[1] > cycle[len - 1] {
        cycle[1..].reverse();
    }
    cycle
}

fn bond_set<A, B>(mol: &Mol<A, B>, cycle: &[NodeIndex]) -> Vec<u64> {
    let mut bits = vec![0u64; mol.bond_count().div_ceil(64)];
    for (a, b) in ring_steps(cycle) {
        if let Some(edge) = mol.bond_between(a, b) {
            bits[edge.index() / 64] |= 1u64 << (edge.index() % 64);
        }
    }
    bits
}

/// Row-reduced basis of the cycles accepted so far, each row paired with
/// its pivot bit.
struct CycleSpace {
    rows: Vec<(usize, Vec<u64>)>,
}

impl CycleSpace {
    /// Add `bits` unless it is a sum of rows already present.
    fn insert(&mut self, mut bits: Vec<u64>) -> bool {
        for (pivot, row) in &self.rows {
            if bits[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
                for (w, r) in bits.iter_mut().zip(row) {
                    *w ^= r;
                }
            }
        }
        let pivot = bits
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize);
        match pivot {
            Some(pivot) => {
                self.rows.push((pivot, bits));
                true
            }
            None => false,
        }
    }
}
