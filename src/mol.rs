//! Molecule container shared by every stage of the pipeline.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Undirected molecular graph with atoms as node weights and bonds as edge
/// weights. Node and edge indices stay dense: atoms and bonds are only ever
/// appended, so a molecule with `n` atoms uses indices `0..n`.
#[derive(Clone)]
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Index-for-index equality: same atoms in the same order, same bonds
/// between the same endpoints.
impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        let atoms_match = self
            .graph
            .node_weights()
            .eq(other.graph.node_weights());
        let bonds_match = self.bond_count() == other.bond_count()
            && self.bonds().all(|e| {
                self.bond_endpoints(e) == other.bond_endpoints(e) && self.bond(e) == other.bond(e)
            });
        atoms_match && bonds_match
    }
}

impl<A, B> fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mol")
            .field("atoms", &self.atom_count())
            .field("bonds", &self.bond_count())
            .finish()
    }
}

/// Whether `to` is an even permutation of `from`. Sequences that are not
/// permutations of each other count as even.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    if from.len() != to.len() {
        return true;
    }
    let positions: Vec<usize> = from
        .iter()
        .filter_map(|f| to.iter().position(|t| t == f))
        .collect();
    let inversions = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| positions[i + 1..].iter().filter(|&&q| q < p).count())
        .sum::<usize>();
    inversions.is_multiple_of(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_counts_swaps() {
        assert!(permutation_parity(&[1, 2, 3], &[1, 2, 3]));
        assert!(!permutation_parity(&[1, 2, 3], &[2, 1, 3]));
        assert!(permutation_parity(&[1, 2, 3], &[2, 3, 1]));
        assert!(!permutation_parity(&[1, 2, 3], &[3, 2, 1]));
        assert!(permutation_parity(&[1, 2, 3, 4], &[4, 3, 2, 1]));
    }

    #[test]
    fn equality_is_index_for_index() {
        let mut a: Mol<u8, u8> = Mol::new();
        let x = a.add_atom(6);
        let y = a.add_atom(8);
        a.add_bond(x, y, 2);

        let mut b = a.clone();
        assert_eq!(a, b);
        let edge = b.bond_between(x, y).unwrap();
        *b.bond_mut(edge) = 1;
        assert_ne!(a, b);

        let mut swapped: Mol<u8, u8> = Mol::new();
        let y = swapped.add_atom(8);
        let x = swapped.add_atom(6);
        swapped.add_bond(x, y, 2);
        assert_ne!(a, swapped);
    }
}
