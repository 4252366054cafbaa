//! Attributed molecular graph and the converters between it and [`Mol`].
//!
//! Nodes are numbered `0..n` in atom order and carry an [`AtomAttributes`]
//! record, edges carry a [`BondAttributes`] record. The graph is the
//! exchange format of the pipeline: it is built from a sanitized molecule
//! and can be turned back into one.

use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;
use tracing::trace;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
use crate::chirality::{implicit_h, reference_order, relabel};
use crate::error::ConversionError;
use crate::hybridization::{Hybridization, assign_hybridization};
use crate::mol::Mol;
use crate::sanitize::sanitize;
use crate::traits::HasHydrogenCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondType {
    Single,
    Double,
    Triple,
    Aromatic,
    Dative,
    Zero,
}

impl From<&Bond> for BondType {
    fn from(bond: &Bond) -> Self {
        if bond.is_aromatic {
            return BondType::Aromatic;
        }
        match bond.order {
            BondOrder::Single => BondType::Single,
            BondOrder::Double => BondType::Double,
            BondOrder::Triple => BondType::Triple,
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BondType::Single => "SINGLE",
            BondType::Double => "DOUBLE",
            BondType::Triple => "TRIPLE",
            BondType::Aromatic => "AROMATIC",
            BondType::Dative => "DATIVE",
            BondType::Zero => "ZERO",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomAttributes {
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Relative to the implicit hydrogen (if any) followed by the
    /// neighbors in ascending node order.
    pub chiral_tag: Chirality,
    pub hybridization: Hybridization,
    /// Hydrogens carried as a count rather than as nodes.
    pub num_explicit_hs: u8,
    pub is_aromatic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondAttributes {
    pub bond_type: BondType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {node} does not exist in a graph of {count} nodes")]
    UnknownNode { node: usize, count: usize },
    #[error("self-loop on node {node}")]
    SelfLoop { node: usize },
    #[error("nodes {a} and {b} are already connected")]
    DuplicateEdge { a: usize, b: usize },
}

#[derive(Debug, Clone, Default)]
pub struct MolGraph {
    graph: UnGraph<AtomAttributes, BondAttributes>,
}

impl MolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, attrs: AtomAttributes) -> usize {
        self.graph.add_node(attrs).index()
    }

    pub fn add_edge(&mut self, a: usize, b: usize, attrs: BondAttributes) -> Result<(), GraphError> {
        let count = self.node_count();
        for node in [a, b] {
            if node >= count {
                return Err(GraphError::UnknownNode { node, count });
            }
        }
        if a == b {
            return Err(GraphError::SelfLoop { node: a });
        }
        let (na, nb) = (NodeIndex::new(a), NodeIndex::new(b));
        if self.graph.find_edge(na, nb).is_some() {
            return Err(GraphError::DuplicateEdge { a, b });
        }
        self.graph.add_edge(na, nb, attrs);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: usize) -> Option<&AtomAttributes> {
        self.graph.node_weight(NodeIndex::new(idx))
    }

    pub fn edge(&self, a: usize, b: usize) -> Option<&BondAttributes> {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &AtomAttributes)> + '_ {
        self.graph
            .node_indices()
            .map(|n| (n.index(), &self.graph[n]))
    }

    /// Edges in insertion order as `(a, b, attributes)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &BondAttributes)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// Neighbors of `node` in ascending order.
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(node))
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }
}

impl PartialEq for MolGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges().eq(other.edges())
    }
}

/// The implicit hydrogen first when present, then neighbors by index.
fn ascending_order<A: HasHydrogenCount, B>(mol: &Mol<A, B>, center: NodeIndex) -> Vec<NodeIndex> {
    let mut neighbors: Vec<NodeIndex> = mol.neighbors(center).collect();
    neighbors.sort_unstable();
    let mut order = Vec::with_capacity(neighbors.len() + 1);
    if mol.atom(center).hydrogen_count() > 0 {
        order.push(implicit_h());
    }
    order.extend(neighbors);
    order
}

/// Copy per-atom and per-bond attributes of a sanitized molecule.
pub fn mol_to_graph(mol: &Mol<Atom, Bond>) -> MolGraph {
    let hybridization = assign_hybridization(mol);
    let mut graph = MolGraph::new();
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let chiral_tag = relabel(
            atom.chirality,
            &reference_order(mol, idx),
            &ascending_order(mol, idx),
        );
        graph.add_node(AtomAttributes {
            atomic_num: atom.atomic_num,
            formal_charge: atom.formal_charge,
            chiral_tag,
            hybridization: hybridization[idx.index()],
            num_explicit_hs: atom.hydrogen_count,
            is_aromatic: atom.is_aromatic,
        });
    }
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            let attrs = BondAttributes {
                bond_type: BondType::from(mol.bond(edge)),
            };
            graph.graph.add_edge(a, b, attrs);
        }
    }
    graph
}

/// Rebuild a molecule node by node and edge by edge, then sanitize it.
///
/// Aromatic edges are kekulized again during sanitization. Dative and
/// zero-order bonds have no counterpart in the bond model and are
/// rejected.
pub fn graph_to_mol(graph: &MolGraph) -> Result<Mol<Atom, Bond>, ConversionError> {
    let mut mol: Mol<Atom, SmilesBond> = Mol::new();
    for (_, attrs) in graph.nodes() {
        mol.add_atom(Atom {
            atomic_num: attrs.atomic_num,
            formal_charge: attrs.formal_charge,
            hydrogen_count: attrs.num_explicit_hs,
            is_aromatic: attrs.is_aromatic,
            ..Atom::default()
        });
    }
    for (a, b, attrs) in graph.edges() {
        let order = match attrs.bond_type {
            BondType::Single => SmilesBondOrder::Single,
            BondType::Double => SmilesBondOrder::Double,
            BondType::Triple => SmilesBondOrder::Triple,
            BondType::Aromatic => SmilesBondOrder::Aromatic,
            other @ (BondType::Dative | BondType::Zero) => {
                return Err(ConversionError::UnsupportedBondType {
                    bond_type: other,
                    atoms: (a, b),
                });
            }
        };
        mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), SmilesBond { order });
    }
    for (i, attrs) in graph.nodes() {
        let center = NodeIndex::new(i);
        let tag = relabel(
            attrs.chiral_tag,
            &ascending_order(&mol, center),
            &reference_order(&mol, center),
        );
        mol.atom_mut(center).chirality = tag;
    }

    let mol = sanitize(mol)?;
    trace!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "rebuilt molecule from graph"
    );
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrogen::add_hs;
    use crate::smiles::{from_smiles, to_canonical_smiles};

    fn graph(smiles: &str) -> MolGraph {
        mol_to_graph(&from_smiles(smiles).unwrap())
    }

    fn carbon() -> AtomAttributes {
        AtomAttributes {
            atomic_num: 6,
            formal_charge: 0,
            chiral_tag: Chirality::None,
            hybridization: Hybridization::SP3,
            num_explicit_hs: 0,
            is_aromatic: false,
        }
    }

    #[test]
    fn ethanol_attributes() {
        let g = graph("CCO");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        let oxygen = g.node(2).unwrap();
        assert_eq!(oxygen.atomic_num, 8);
        assert_eq!(oxygen.num_explicit_hs, 1);
        assert_eq!(oxygen.hybridization, Hybridization::SP3);
        assert_eq!(g.edge(1, 2).unwrap().bond_type, BondType::Single);
        assert_eq!(g.neighbors(1), vec![0, 2]);
    }

    #[test]
    fn aromatic_bonds_typed_aromatic() {
        let g = graph("c1ccccc1C=O");
        let aromatic = g
            .edges()
            .filter(|(_, _, b)| b.bond_type == BondType::Aromatic)
            .count();
        assert_eq!(aromatic, 6);
        assert_eq!(g.edge(6, 7).unwrap().bond_type, BondType::Double);
        assert!(g.nodes().take(6).all(|(_, a)| a.is_aromatic));
        assert!(g.nodes().take(6).all(|(_, a)| a.hybridization == Hybridization::SP2));
    }

    #[test]
    fn chiral_tag_uses_ascending_neighbors() {
        // written order is already ascending, so the tag reads as written
        assert_eq!(graph("[C@@H](F)(Cl)Br").node(0).unwrap().chiral_tag, Chirality::Cw);
        assert_eq!(graph("[C@H](F)(Cl)Br").node(0).unwrap().chiral_tag, Chirality::Ccw);
    }

    #[test]
    fn round_trip_keeps_molecule() {
        for smiles in ["CC(=O)O", "C#N", "C[N+](C)(C)C", "N[C@@H](C)C(=O)O"] {
            let mol = from_smiles(smiles).unwrap();
            let back = graph_to_mol(&mol_to_graph(&mol)).unwrap();
            assert_eq!(back, mol, "{smiles}");
        }
    }

    #[test]
    fn round_trip_with_explicit_hydrogens() {
        for smiles in ["c1ccccc1O", "F[C@H](Cl)Br", "C1CC[C@H](O)CC1C"] {
            let mol = add_hs(&from_smiles(smiles).unwrap());
            let back = graph_to_mol(&mol_to_graph(&mol)).unwrap();
            assert_eq!(to_canonical_smiles(&back), to_canonical_smiles(&mol), "{smiles}");
        }
    }

    #[test]
    fn graph_round_trip() {
        let g = mol_to_graph(&add_hs(&from_smiles("c1ccncc1").unwrap()));
        assert_eq!(mol_to_graph(&graph_to_mol(&g).unwrap()), g);
    }

    #[test]
    fn dative_bond_rejected() {
        let mut g = MolGraph::new();
        let a = g.add_node(carbon());
        let b = g.add_node(carbon());
        g.add_edge(a, b, BondAttributes { bond_type: BondType::Dative })
            .unwrap();
        assert!(matches!(
            graph_to_mol(&g),
            Err(ConversionError::UnsupportedBondType {
                bond_type: BondType::Dative,
                atoms: (0, 1)
            })
        ));
    }

    #[test]
    fn invalid_edges_rejected() {
        let mut g = MolGraph::new();
        let a = g.add_node(carbon());
        let b = g.add_node(carbon());
        let single = BondAttributes { bond_type: BondType::Single };
        assert_eq!(
            g.add_edge(a, 5, single),
            Err(GraphError::UnknownNode { node: 5, count: 2 })
        );
        assert_eq!(g.add_edge(a, a, single), Err(GraphError::SelfLoop { node: 0 }));
        g.add_edge(a, b, single).unwrap();
        assert_eq!(g.add_edge(b, a, single), Err(GraphError::DuplicateEdge { a: 1, b: 0 }));
    }

    #[test]
    fn hand_built_graph_gets_sanitized() {
        let mut g = MolGraph::new();
        let c = g.add_node(AtomAttributes {
            num_explicit_hs: 3,
            ..carbon()
        });
        let o = g.add_node(AtomAttributes {
            atomic_num: 8,
            num_explicit_hs: 1,
            ..carbon()
        });
        g.add_edge(c, o, BondAttributes { bond_type: BondType::Single })
            .unwrap();
        let mol = graph_to_mol(&g).unwrap();
        assert_eq!(to_canonical_smiles(&mol), to_canonical_smiles(&from_smiles("CO").unwrap()));
    }

    #[test]
    fn overvalent_graph_fails_sanitization() {
        let mut g = MolGraph::new();
        let c = g.add_node(AtomAttributes {
            num_explicit_hs: 4,
            ..carbon()
        });
        let o = g.add_node(AtomAttributes {
            atomic_num: 8,
            ..carbon()
        });
        g.add_edge(c, o, BondAttributes { bond_type: BondType::Double })
            .unwrap();
        assert!(matches!(graph_to_mol(&g), Err(ConversionError::Sanitize(_))));
    }

    #[test]
    fn empty_graph() {
        let mol = graph_to_mol(&MolGraph::new()).unwrap();
        assert_eq!(mol.atom_count(), 0);
        assert_eq!(mol_to_graph(&mol).node_count(), 0);
    }

    #[test]
    fn bond_type_names() {
        assert_eq!(BondType::Aromatic.to_string(), "AROMATIC");
        assert_eq!(BondType::Single.to_string(), "SINGLE");
    }
}
