//! SMILES writer.
//!
//! Fragments are written depth first. Ring closures get the lowest free
//! digit when they open, so digits are reused once their ring is closed.
//! Aromatic atoms are written lowercase and bonds between two aromatic
//! atoms are left implicit only when the bond itself is aromatic.

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ordering;
use crate::chirality::{implicit_h, reference_order, relabel};
use crate::element::Element;
use crate::graph_ops::connected_components;
use crate::mol::Mol;

/// Write a SMILES string, starting each fragment at its lowest atom index.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, None))
        .collect::<Vec<_>>()
        .join(".")
}

/// Write a canonical SMILES string. Two molecules that differ only in atom
/// numbering produce the same string.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks = canonical_ordering(mol);
    let mut components = connected_components(mol);
    components.sort_by_key(|c| c.iter().map(|n| ranks[n.index()]).min());
    components
        .iter()
        .map(|component| write_fragment(mol, component, Some(&ranks)))
        .collect::<Vec<_>>()
        .join(".")
}

/// One ring bond as seen from one of its ends.
#[derive(Clone, Copy)]
struct RingBond {
    edge: EdgeIndex,
    other: NodeIndex,
}

struct Traversal {
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    /// Ring bonds each atom writes a digit for, in writing order.
    rings: Vec<Vec<RingBond>>,
}

impl Traversal {
    fn build(mol: &Mol<Atom, Bond>, start: NodeIndex, ranks: Option<&[usize]>) -> Self {
        let n = mol.atom_count();
        let mut t = Traversal {
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            rings: vec![Vec::new(); n],
        };

        let neighbor_lists: Vec<Vec<NodeIndex>> = mol
            .atoms()
            .map(|node| {
                let mut neighbors: Vec<NodeIndex> = mol.neighbors(node).collect();
                match ranks {
                    Some(r) => neighbors.sort_by_key(|nb| r[nb.index()]),
                    None => neighbors.sort(),
                }
                neighbors
            })
            .collect();

        let mut visited = vec![false; n];
        let mut ring_edges: Vec<EdgeIndex> = Vec::new();
        let mut closes: Vec<Vec<RingBond>> = vec![Vec::new(); n];
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        visited[start.index()] = true;

        while let Some(&mut (node, ref mut next)) = stack.last_mut() {
            let Some(&neighbor) = neighbor_lists[node.index()].get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;

            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                t.parent[neighbor.index()] = Some(node);
                t.children[node.index()].push(neighbor);
                stack.push((neighbor, 0));
                continue;
            }
            if t.parent[node.index()] == Some(neighbor) {
                continue;
            }
            let Some(edge) = mol.bond_between(node, neighbor) else {
                continue;
            };
            if ring_edges.contains(&edge) {
                continue;
            }
            // `neighbor` is an ancestor still on the stack: it opens the ring
            ring_edges.push(edge);
            t.rings[neighbor.index()].push(RingBond { edge, other: node });
            closes[node.index()].push(RingBond { edge, other: neighbor });
        }

        for (opens, closing) in t.rings.iter_mut().zip(closes) {
            opens.extend(closing);
        }
        t
    }

    /// Neighbors in the order a reader meets them: parent, ring digits,
    /// then branches, with the implicit hydrogen right after the parent
    /// (or first when there is no parent).
    fn written_order(&self, mol: &Mol<Atom, Bond>, node: NodeIndex) -> Vec<NodeIndex> {
        let i = node.index();
        let mut order: Vec<NodeIndex> = self.parent[i].into_iter().collect();
        if mol.atom(node).hydrogen_count > 0 {
            order.push(implicit_h());
        }
        order.extend(self.rings[i].iter().map(|rb| rb.other));
        order.extend(self.children[i].iter().copied());
        order
    }
}

fn write_fragment(mol: &Mol<Atom, Bond>, component: &[NodeIndex], ranks: Option<&[usize]>) -> String {
    let start = match ranks {
        Some(r) => component.iter().copied().min_by_key(|node| r[node.index()]),
        None => component.first().copied(),
    };
    let Some(start) = start else {
        return String::new();
    };

    let traversal = Traversal::build(mol, start, ranks);
    let mut writer = FragmentWriter {
        mol,
        traversal: &traversal,
        digits: HashMap::new(),
        out: String::new(),
    };
    writer.write_node(start);
    writer.out
}

struct FragmentWriter<'a> {
    mol: &'a Mol<Atom, Bond>,
    traversal: &'a Traversal,
    digits: HashMap<EdgeIndex, usize>,
    out: String,
}

impl FragmentWriter<'_> {
    fn write_node(&mut self, node: NodeIndex) {
        let mol = self.mol;
        let traversal = self.traversal;

        let tag = relabel(
            mol.atom(node).chirality,
            &reference_order(mol, node),
            &traversal.written_order(mol, node),
        );
        write_atom_symbol(mol, node, tag, &mut self.out);

        for rb in &traversal.rings[node.index()] {
            let digit = match self.digits.remove(&rb.edge) {
                Some(digit) => digit,
                None => {
                    let digit = (1..).find(|d| !self.digits.values().any(|v| v == d)).unwrap_or(1);
                    self.digits.insert(rb.edge, digit);
                    digit
                }
            };
            write_bond(mol, rb.edge, node, rb.other, &mut self.out);
            write_ring_digit(digit, &mut self.out);
        }

        let kids = &traversal.children[node.index()];
        for (i, &child) in kids.iter().enumerate() {
            let is_branch = i + 1 < kids.len();
            if is_branch {
                self.out.push('(');
            }
            if let Some(edge) = mol.bond_between(node, child) {
                write_bond(mol, edge, node, child, &mut self.out);
            }
            self.write_node(child);
            if is_branch {
                self.out.push(')');
            }
        }
    }
}

fn write_bond(mol: &Mol<Atom, Bond>, edge: EdgeIndex, from: NodeIndex, to: NodeIndex, out: &mut String) {
    let bond = mol.bond(edge);
    if bond.is_aromatic {
        return;
    }
    let both_aromatic = mol.atom(from).is_aromatic && mol.atom(to).is_aromatic;
    match bond.order {
        BondOrder::Single if both_aromatic => out.push('-'),
        BondOrder::Single => {}
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    if digit >= 10 {
        out.push('%');
    }
    out.push_str(&digit.to_string());
}

fn write_atom_symbol(mol: &Mol<Atom, Bond>, node: NodeIndex, chirality: Chirality, out: &mut String) {
    let atom = mol.atom(node);
    let elem = Element::from_atomic_num(atom.atomic_num);
    match elem {
        Some(e) if chirality == Chirality::None && can_write_bare(mol, node, e) => {
            push_symbol(e, atom.is_aromatic, out);
        }
        _ => write_bracket_atom(atom, elem, chirality, out),
    }
}

fn push_symbol(elem: Element, aromatic: bool, out: &mut String) {
    if aromatic {
        out.push_str(&elem.symbol().to_ascii_lowercase());
    } else {
        out.push_str(elem.symbol());
    }
}

fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex, elem: Element) -> bool {
    let atom = mol.atom(node);
    if !elem.is_organic_subset() || atom.isotope != 0 || atom.formal_charge != 0 {
        return false;
    }
    if atom.is_aromatic && !matches!(atom.atomic_num, 5 | 6 | 7 | 8 | 15 | 16) {
        return false;
    }
    atom.hydrogen_count == implicit_h_for_bare_atom(mol, node, elem)
}

/// The hydrogen count a reader infers for this atom written without
/// brackets.
fn implicit_h_for_bare_atom(mol: &Mol<Atom, Bond>, node: NodeIndex, elem: Element) -> u8 {
    let used: u8 = mol
        .bonds_of(node)
        .map(|e| {
            let bond = mol.bond(e);
            if bond.is_aromatic { 1 } else { bond.order.value() }
        })
        .fold(0, u8::saturating_add);
    let Some(target) = elem.default_valences().iter().copied().find(|&v| v >= used) else {
        return 0;
    };
    let h = target - used;
    if mol.atom(node).is_aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}

fn write_bracket_atom(atom: &Atom, elem: Option<Element>, chirality: Chirality, out: &mut String) {
    out.push('[');

    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }

    match elem {
        Some(e) => push_symbol(e, atom.is_aromatic, out),
        None => out.push('*'),
    }

    match chirality {
        Chirality::Ccw => out.push('@'),
        Chirality::Cw => out.push_str("@@"),
        Chirality::None => {}
    }

    if atom.hydrogen_count > 0 {
        out.push('H');
        if atom.hydrogen_count > 1 {
            out.push_str(&atom.hydrogen_count.to_string());
        }
    }

    if atom.formal_charge != 0 {
        out.push(if atom.formal_charge > 0 { '+' } else { '-' });
        if atom.formal_charge.abs() > 1 {
            out.push_str(&atom.formal_charge.abs().to_string());
        }
    }

    out.push(']');
}
