//! Replacing aromatic SMILES bonds with alternating single and double bonds.
//!
//! Every aromatic atom that is one bond short of its valence must receive
//! exactly one double bond. That is a perfect matching problem on the
//! aromatic subgraph, solved here one aromatic system at a time with
//! breadth-first augmenting paths.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;
use tracing::trace;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// These atoms needed a double bond and none could be placed.
    #[error("cannot kekulize aromatic system: unmatched atoms {:?}", indices(.0))]
    Unkekulizable(Vec<NodeIndex>),
}

fn indices(atoms: &[NodeIndex]) -> Vec<usize> {
    atoms.iter().map(|n| n.index()).collect()
}

/// Aromatic bonds of one molecule and the double bonds placed so far.
struct PiMatching {
    adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>>,
    needs_pi: Vec<bool>,
    partner: Vec<Option<(NodeIndex, EdgeIndex)>>,
}

impl PiMatching {
    fn new(mol: &Mol<Atom, SmilesBond>) -> Self {
        let n = mol.atom_count();
        let mut adjacency = vec![Vec::new(); n];
        for edge in mol.bonds() {
            if mol.bond(edge).order != SmilesBondOrder::Aromatic {
                continue;
            }
            if let Some((a, b)) = mol.bond_endpoints(edge) {
                adjacency[a.index()].push((b, edge));
                adjacency[b.index()].push((a, edge));
            }
        }
        let needs_pi = mol
            .atoms()
            .map(|node| !adjacency[node.index()].is_empty() && needs_double_bond(mol, node))
            .collect();
        Self {
            adjacency,
            needs_pi,
            partner: vec![None; n],
        }
    }

    /// Connected pieces of the aromatic subgraph, each listed in the order
    /// a depth-first walk from its lowest atom reaches them.
    fn systems(&self) -> Vec<Vec<NodeIndex>> {
        let mut seen = vec![false; self.adjacency.len()];
        let mut systems = Vec::new();
        for start in 0..self.adjacency.len() {
            if seen[start] || self.adjacency[start].is_empty() {
                continue;
            }
            let mut system = Vec::new();
            let mut stack = vec![NodeIndex::new(start)];
            while let Some(v) = stack.pop() {
                if std::mem::replace(&mut seen[v.index()], true) {
                    continue;
                }
                system.push(v);
                stack.extend(
                    self.adjacency[v.index()]
                        .iter()
                        .map(|&(w, _)| w)
                        .filter(|w| !seen[w.index()]),
                );
            }
            systems.push(system);
        }
        systems
    }

    /// Grow the matching along an alternating path from the free atom
    /// `start`. Returns whether a path to another free atom was found.
    fn augment(&mut self, start: NodeIndex) -> bool {
        let n = self.adjacency.len();
        let mut came_from: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;

        while let Some(u) = queue.pop_front() {
            let matched_to_u = self.partner[u.index()].map(|(_, e)| e);
            for i in 0..self.adjacency[u.index()].len() {
                let (v, edge) = self.adjacency[u.index()][i];
                if !self.needs_pi[v.index()] || visited[v.index()] || Some(edge) == matched_to_u {
                    continue;
                }
                visited[v.index()] = true;
                came_from[v.index()] = Some((u, edge));

                match self.partner[v.index()] {
                    None => {
                        self.flip(&came_from, start, v);
                        return true;
                    }
                    Some((w, matched)) if !visited[w.index()] => {
                        visited[w.index()] = true;
                        came_from[w.index()] = Some((v, matched));
                        queue.push_back(w);
                    }
                    Some(_) => {}
                }
            }
        }
        false
    }

    /// Swap matched and unmatched edges along the path ending at `end`.
    fn flip(&mut self, came_from: &[Option<(NodeIndex, EdgeIndex)>], start: NodeIndex, end: NodeIndex) {
        let mut cur = end;
        let mut take = true;
        while cur != start {
            let Some((prev, edge)) = came_from[cur.index()] else {
                break;
            };
            if take {
                self.partner[cur.index()] = Some((prev, edge));
                self.partner[prev.index()] = Some((cur, edge));
            }
            take = !take;
            cur = prev;
        }
    }

    fn is_double(&self, edge: EdgeIndex) -> bool {
        self.partner.iter().flatten().any(|&(_, e)| e == edge)
    }
}

/// Convert a molecule with aromatic bonds into one with explicit Kekulé
/// bonds.
///
/// Atoms, hydrogen counts and chirality tags are copied unchanged, as is the
/// bond order of every bond, so neighbor order around each atom survives.
/// The returned bonds all carry `is_aromatic: false`; perception runs
/// afterwards in [`sanitize`](crate::sanitize::sanitize).
pub fn kekulize(mol: Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, KekulizeError> {
    let mut matching = PiMatching::new(&mol);

    for system in matching.systems() {
        let candidates: Vec<NodeIndex> = system
            .into_iter()
            .filter(|v| matching.needs_pi[v.index()])
            .collect();
        for &start in &candidates {
            if matching.partner[start.index()].is_none() {
                matching.augment(start);
            }
        }
        let unmatched: Vec<NodeIndex> = candidates
            .into_iter()
            .filter(|v| matching.partner[v.index()].is_none())
            .collect();
        if !unmatched.is_empty() {
            trace!(atoms = ?unmatched, "aromatic atoms left without a double bond");
            return Err(KekulizeError::Unkekulizable(unmatched));
        }
    }

    let mut result = Mol::new();
    for node in mol.atoms() {
        result.add_atom(mol.atom(node).clone());
    }
    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        let order = match mol.bond(edge).order {
            SmilesBondOrder::Aromatic if matching.is_double(edge) => BondOrder::Double,
            SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit | SmilesBondOrder::Single => {
                BondOrder::Single
            }
            SmilesBondOrder::Double => BondOrder::Double,
            SmilesBondOrder::Triple => BondOrder::Triple,
        };
        result.add_bond(a, b, Bond::new(order));
    }
    Ok(result)
}

/// Whether an aromatic atom is exactly one bond order short of the nearest
/// valence it can reach. Bare charged atoms two short (`[c-]`, `[n+]`) also
/// take a double bond.
fn needs_double_bond(mol: &Mol<Atom, SmilesBond>, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    let Some(element) = Element::from_atomic_num(atom.atomic_num) else {
        return false;
    };
    let used: u8 = mol
        .bonds_of(node)
        .map(|e| match mol.bond(e).order {
            SmilesBondOrder::Double => 2,
            SmilesBondOrder::Triple => 3,
            SmilesBondOrder::Single | SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit => 1,
        })
        .sum::<u8>()
        + atom.hydrogen_count;

    let charge = atom.formal_charge as i16;
    let target = element
        .default_valences()
        .iter()
        .map(|&v| v as i16 + charge)
        .filter(|&v| v > 0)
        .find(|&v| v >= used as i16);
    match target.map(|t| t - used as i16) {
        Some(1) => true,
        Some(2) => atom.hydrogen_count == 0 && atom.formal_charge != 0,
        _ => false,
    }
}
