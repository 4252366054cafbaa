//! Flattening a [`MolGraph`] into the record a message-passing network
//! consumes.

use tracing::warn;

use crate::convert::graph_to_smiles;
use crate::error::ConversionError;
use crate::graph::{BondType, MolGraph};

/// Flat, index-based view of one molecule.
///
/// `bond[i]` labels the directed edge `connectivity[i]`. Every undirected
/// bond appears once per direction, and `connectivity` is sorted by source
/// then target so messages for one atom are contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MolDict {
    pub n_atom: usize,
    pub n_bond: usize,
    /// Atomic number minus one, per atom.
    pub atom: Vec<u8>,
    /// Index into the bond vocabulary, per directed edge.
    pub bond: Vec<usize>,
    pub connectivity: Vec<[usize; 2]>,
}

#[derive(Debug, Clone)]
pub struct DictOptions {
    /// Bond types in label order. Edges of any other type are an error.
    pub bond_vocabulary: Vec<BondType>,
    /// Reject graphs where some atom has no bond.
    pub require_connected: bool,
}

impl Default for DictOptions {
    fn default() -> Self {
        Self {
            bond_vocabulary: vec![
                BondType::Aromatic,
                BondType::Double,
                BondType::Single,
                BondType::Triple,
            ],
            require_connected: true,
        }
    }
}

pub fn graph_to_dict(graph: &MolGraph) -> Result<MolDict, ConversionError> {
    graph_to_dict_with(graph, &DictOptions::default())
}

pub fn graph_to_dict_with(graph: &MolGraph, opts: &DictOptions) -> Result<MolDict, ConversionError> {
    let atom = graph
        .nodes()
        .map(|(i, attrs)| {
            attrs
                .atomic_num
                .checked_sub(1)
                .ok_or(ConversionError::InvalidAtomicNumber { atom: i })
        })
        .collect::<Result<Vec<u8>, _>>()?;
    let n_atom = atom.len();

    let mut directed: Vec<([usize; 2], usize)> = Vec::with_capacity(2 * graph.edge_count());
    for (a, b, attrs) in graph.edges() {
        let label = opts
            .bond_vocabulary
            .iter()
            .position(|&t| t == attrs.bond_type)
            .ok_or(ConversionError::UnknownBondType {
                bond_type: attrs.bond_type,
                atoms: (a, b),
            })?;
        directed.push(([a, b], label));
        directed.push(([b, a], label));
    }
    // pairs are unique, so the label never decides the order
    directed.sort_unstable();
    let (connectivity, bond): (Vec<[usize; 2]>, Vec<usize>) = directed.into_iter().unzip();

    if opts.require_connected {
        let mut bonded = vec![false; n_atom];
        for &[source, _] in &connectivity {
            bonded[source] = true;
        }
        let missing: Vec<usize> = (0..n_atom).filter(|&i| !bonded[i]).collect();
        if !missing.is_empty() {
            let smiles = graph_to_smiles(graph).unwrap_or_else(|_| format!("<{n_atom} atoms>"));
            warn!(smiles = %smiles, atoms = ?missing, "unconnected atoms");
            return Err(ConversionError::UnconnectedAtoms {
                smiles,
                atoms: missing,
            });
        }
    }

    Ok(MolDict {
        n_atom,
        n_bond: bond.len(),
        atom,
        bond,
        connectivity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Chirality;
    use crate::graph::{AtomAttributes, BondAttributes, mol_to_graph};
    use crate::hybridization::Hybridization;
    use crate::smiles::from_smiles;

    fn graph(smiles: &str) -> MolGraph {
        mol_to_graph(&from_smiles(smiles).unwrap())
    }

    fn node(atomic_num: u8) -> AtomAttributes {
        AtomAttributes {
            atomic_num,
            formal_charge: 0,
            chiral_tag: Chirality::None,
            hybridization: Hybridization::SP3,
            num_explicit_hs: 0,
            is_aromatic: false,
        }
    }

    #[test]
    fn vinyl_alcohol_labels_follow_sort() {
        let dict = graph_to_dict(&graph("C=CO")).unwrap();
        assert_eq!(dict.n_atom, 3);
        assert_eq!(dict.n_bond, 4);
        assert_eq!(dict.atom, vec![5, 5, 7]);
        assert_eq!(dict.connectivity, vec![[0, 1], [1, 0], [1, 2], [2, 1]]);
        assert_eq!(dict.bond, vec![1, 1, 2, 2]);
    }

    #[test]
    fn labels_move_with_their_edges() {
        // edge 0 is 2-3 and edge 1 is 0-2, so sorting reorders the labels
        let mut g = MolGraph::new();
        for anum in [6, 6, 6, 7] {
            g.add_node(node(anum));
        }
        g.add_edge(2, 3, BondAttributes { bond_type: BondType::Triple }).unwrap();
        g.add_edge(0, 2, BondAttributes { bond_type: BondType::Single }).unwrap();
        g.add_edge(1, 0, BondAttributes { bond_type: BondType::Double }).unwrap();
        let dict = graph_to_dict(&g).unwrap();
        assert_eq!(
            dict.connectivity,
            vec![[0, 1], [0, 2], [1, 0], [2, 0], [2, 3], [3, 2]]
        );
        assert_eq!(dict.bond, vec![1, 2, 1, 2, 3, 3]);
    }

    #[test]
    fn aromatic_label_is_zero() {
        let dict = graph_to_dict(&graph("c1ccccc1")).unwrap();
        assert_eq!(dict.n_bond, 12);
        assert!(dict.bond.iter().all(|&b| b == 0));
    }

    #[test]
    fn connectivity_sorted() {
        let dict = graph_to_dict(&graph("CC(C)(O)c1ccncc1")).unwrap();
        assert!(dict.connectivity.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dict.n_bond, dict.connectivity.len());
        assert_eq!(dict.bond.len(), dict.connectivity.len());
    }

    #[test]
    fn isolated_atom_rejected() {
        let err = graph_to_dict(&graph("C")).unwrap_err();
        match err {
            ConversionError::UnconnectedAtoms { smiles, atoms } => {
                assert_eq!(smiles, "C");
                assert_eq!(atoms, vec![0]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_fragment_rejected() {
        assert!(matches!(
            graph_to_dict(&graph("CC.[Na+]")),
            Err(ConversionError::UnconnectedAtoms { ref atoms, .. }) if atoms == &vec![2]
        ));
    }

    #[test]
    fn unconnected_atoms_allowed_when_disabled() {
        let opts = DictOptions {
            require_connected: false,
            ..DictOptions::default()
        };
        let dict = graph_to_dict_with(&graph("C"), &opts).unwrap();
        assert_eq!(dict.n_atom, 1);
        assert_eq!(dict.n_bond, 0);
        assert!(dict.connectivity.is_empty());
    }

    #[test]
    fn unknown_bond_type() {
        let mut g = MolGraph::new();
        g.add_node(node(6));
        g.add_node(node(6));
        g.add_edge(0, 1, BondAttributes { bond_type: BondType::Zero }).unwrap();
        assert!(matches!(
            graph_to_dict(&g),
            Err(ConversionError::UnknownBondType {
                bond_type: BondType::Zero,
                atoms: (0, 1)
            })
        ));
    }

    #[test]
    fn custom_vocabulary() {
        let opts = DictOptions {
            bond_vocabulary: vec![BondType::Single, BondType::Double],
            ..DictOptions::default()
        };
        let dict = graph_to_dict_with(&graph("C=CC"), &opts).unwrap();
        assert_eq!(dict.bond, vec![1, 1, 0, 0]);
    }

    #[test]
    fn dummy_atom_rejected() {
        let mut g = MolGraph::new();
        g.add_node(node(0));
        assert_eq!(
            graph_to_dict(&g),
            Err(ConversionError::InvalidAtomicNumber { atom: 0 })
        );
    }

    #[test]
    fn empty_graph_gives_empty_dict() {
        assert_eq!(graph_to_dict(&MolGraph::new()).unwrap(), MolDict::default());
    }
}
