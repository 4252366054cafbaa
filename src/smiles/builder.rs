use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{SmilesBond, SmilesBondOrder};
use crate::chirality::{implicit_h, reference_order, relabel};
use crate::mol::Mol;
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::{BondToken, ChiralityToken};

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, SmilesBond> {
    let mut mol = Mol::new();
    let node_indices: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|parse_atom| {
            mol.add_atom(Atom {
                atomic_num: parse_atom.element.atomic_num(),
                formal_charge: parse_atom.charge,
                isotope: parse_atom.isotope,
                chirality: Chirality::None,
                hydrogen_count: 0,
                is_aromatic: parse_atom.is_aromatic,
            })
        })
        .collect();

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if j < i || mol.bond_between(node_indices[i], node_indices[j]).is_some() {
                continue;
            }
            let order = resolve_bond_order(
                neighbor.bond,
                parse_atom.is_aromatic,
                tree.atoms[j].is_aromatic,
            );
            mol.add_bond(node_indices[i], node_indices[j], SmilesBond { order });
        }
    }

    resolve_hydrogen_counts(&mut mol, tree, &node_indices);
    resolve_chirality(&mut mol, tree, &node_indices);

    mol
}

fn resolve_bond_order(
    bond_tok: Option<BondToken>,
    from_aromatic: bool,
    to_aromatic: bool,
) -> SmilesBondOrder {
    match bond_tok {
        Some(BondToken::Single) | Some(BondToken::Up) | Some(BondToken::Down) => {
            SmilesBondOrder::Single
        }
        Some(BondToken::Double) => SmilesBondOrder::Double,
        Some(BondToken::Triple) => SmilesBondOrder::Triple,
        Some(BondToken::Aromatic) => SmilesBondOrder::Aromatic,
        None if from_aromatic && to_aromatic => SmilesBondOrder::Aromatic,
        None => SmilesBondOrder::Implicit,
    }
}

/// Translate `@`/`@@` from the written neighbor order into the atom's
/// reference order. In the written order an implicit hydrogen follows the
/// preceding atom, or comes first when there is none.
fn resolve_chirality(mol: &mut Mol<Atom, SmilesBond>, tree: &ParseTree, indices: &[NodeIndex]) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let tag = match parse_atom.chirality {
            ChiralityToken::None => continue,
            ChiralityToken::CounterClockwise => Chirality::Ccw,
            ChiralityToken::Clockwise => Chirality::Cw,
        };

        let mut written: Vec<NodeIndex> = parse_atom
            .neighbors
            .iter()
            .map(|n| indices[n.atom_idx])
            .collect();
        if mol.atom(indices[i]).hydrogen_count > 0 {
            let has_preceding = parse_atom.neighbors.first().is_some_and(|n| n.atom_idx < i);
            written.insert(usize::from(has_preceding), implicit_h());
        }

        let reference = reference_order(mol, indices[i]);
        mol.atom_mut(indices[i]).chirality = relabel(tag, &written, &reference);
    }
}

fn resolve_hydrogen_counts(
    mol: &mut Mol<Atom, SmilesBond>,
    tree: &ParseTree,
    indices: &[NodeIndex],
) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let h_count = if parse_atom.is_bracket {
            parse_atom.hcount.unwrap_or(0)
        } else {
            compute_implicit_h(mol, indices[i], parse_atom)
        };
        mol.atom_mut(indices[i]).hydrogen_count = h_count;
    }
}

/// Organic-subset atoms fill up to the smallest default valence that fits
/// their bonds. Aromatic atoms give one bond's worth to the ring.
fn compute_implicit_h(mol: &Mol<Atom, SmilesBond>, node: NodeIndex, parse_atom: &ParseAtom) -> u8 {
    let used = bond_order_sum(mol, node);
    let Some(target) = parse_atom
        .element
        .default_valences()
        .iter()
        .copied()
        .find(|&v| v >= used)
    else {
        return 0;
    };

    let h = target - used;
    if parse_atom.is_aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}

fn bond_order_sum(mol: &Mol<Atom, SmilesBond>, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|e| match mol.bond(e).order {
            SmilesBondOrder::Double => 2u8,
            SmilesBondOrder::Triple => 3,
            SmilesBondOrder::Single | SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit => 1,
        })
        .fold(0u8, |acc, o| acc.saturating_add(o))
}
