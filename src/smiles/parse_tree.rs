//! Token stream to atoms with ordered neighbor lists.

use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, ChiralityToken, Token};

/// Highest ring-closure number (`%99`) plus one.
const RING_SLOTS: usize = 100;

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub is_bracket: bool,
    /// Neighbors in the order they are written, which is the order SMILES
    /// chirality refers to. A ring-closure neighbor sits where its digit was.
    pub neighbors: Vec<Neighbor>,
}

impl From<&AtomToken> for ParseAtom {
    fn from(tok: &AtomToken) -> Self {
        Self {
            element: tok.element,
            is_aromatic: tok.is_aromatic,
            isotope: tok.isotope,
            chirality: tok.chirality,
            hcount: tok.hcount,
            charge: tok.charge,
            is_bracket: tok.is_bracket,
            neighbors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

/// A ring digit seen once: which atom opened it, which neighbor slot
/// waits for the partner, and the bond written at the opening.
struct OpenRing {
    atom: usize,
    slot: usize,
    bond: Option<BondToken>,
}

struct TreeBuilder {
    atoms: Vec<ParseAtom>,
    branch_stack: Vec<usize>,
    current: Option<usize>,
    pending_bond: Option<BondToken>,
    rings: Vec<Option<OpenRing>>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            atoms: Vec::new(),
            branch_stack: Vec::new(),
            current: None,
            pending_bond: None,
            rings: (0..RING_SLOTS).map(|_| None).collect(),
        }
    }

    fn push_atom(&mut self, tok: &AtomToken) {
        let idx = self.atoms.len();
        self.atoms.push(ParseAtom::from(tok));
        let bond = self.pending_bond.take();
        if let Some(prev) = self.current {
            self.atoms[prev].neighbors.push(Neighbor { bond, atom_idx: idx });
            self.atoms[idx].neighbors.push(Neighbor { bond, atom_idx: prev });
        }
        self.current = Some(idx);
    }

    fn ring_closure(
        &mut self,
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    ) -> Result<(), SmilesError> {
        let invalid = SmilesError::InvalidRingBond { digit, pos };
        let cur = self.current.ok_or_else(|| invalid.clone())?;
        let bond = bond.or(self.pending_bond.take());
        let slot = self
            .rings
            .get_mut(usize::from(digit))
            .ok_or_else(|| invalid.clone())?;

        let Some(open) = slot.take() else {
            let neighbors = &mut self.atoms[cur].neighbors;
            neighbors.push(Neighbor {
                bond: None,
                atom_idx: usize::MAX,
            });
            *slot = Some(OpenRing {
                atom: cur,
                slot: neighbors.len() - 1,
                bond,
            });
            return Ok(());
        };

        if open.atom == cur {
            return Err(invalid);
        }
        let bond = match (bond, open.bond) {
            (Some(here), Some(there)) if here != there => {
                return Err(SmilesError::RingBondConflict { digit });
            }
            (here, there) => here.or(there),
        };
        self.atoms[open.atom].neighbors[open.slot] = Neighbor { bond, atom_idx: cur };
        self.atoms[cur].neighbors.push(Neighbor {
            bond,
            atom_idx: open.atom,
        });
        Ok(())
    }

    fn open_branch(&mut self, pos: usize) -> Result<(), SmilesError> {
        let cur = self.current.ok_or(SmilesError::UnmatchedParen { pos })?;
        self.branch_stack.push(cur);
        Ok(())
    }

    fn close_branch(&mut self, pos: usize) -> Result<(), SmilesError> {
        let back = self
            .branch_stack
            .pop()
            .ok_or(SmilesError::UnmatchedParen { pos })?;
        self.current = Some(back);
        self.pending_bond = None;
        Ok(())
    }

    fn finish(self) -> Result<ParseTree, SmilesError> {
        if !self.branch_stack.is_empty() {
            return Err(SmilesError::UnmatchedParen { pos: 0 });
        }
        if let Some(digit) = self.rings.iter().position(Option::is_some) {
            return Err(SmilesError::UnclosedRing {
                digit: digit as u16,
            });
        }
        Ok(ParseTree { atoms: self.atoms })
    }
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        match token {
            Token::Atom(atom) => builder.push_atom(atom),
            Token::Bond(bond) => builder.pending_bond = Some(*bond),
            Token::RingClosure { bond, digit, pos } => builder.ring_closure(*bond, *digit, *pos)?,
            Token::OpenParen(pos) => builder.open_branch(*pos)?,
            Token::CloseParen(pos) => builder.close_branch(*pos)?,
            Token::Dot(_) => {
                builder.current = None;
                builder.pending_bond = None;
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::tokenizer::tokenize;

    fn tree(s: &str) -> Result<ParseTree, SmilesError> {
        build_parse_tree(&tokenize(s).unwrap())
    }

    fn neighbor_ids(s: &str, i: usize) -> Vec<usize> {
        tree(s).unwrap().atoms[i]
            .neighbors
            .iter()
            .map(|n| n.atom_idx)
            .collect()
    }

    #[test]
    fn written_neighbor_order() {
        for (smiles, atom, expected) in [
            ("CC", 0, vec![1]),
            ("CC(C)C", 1, vec![0, 2, 3]),
            ("C1CCCCC1", 0, vec![5, 1]),
            ("C1CCCCC1", 5, vec![4, 0]),
            // ring digit comes before the branch on atom 1
            ("FC1(Cl)CC1", 1, vec![0, 4, 2, 3]),
            ("FC1(Cl)CC1", 4, vec![3, 1]),
            ("[Na+].[Cl-]", 0, vec![]),
            ("C(C)(C)C", 0, vec![1, 2, 3]),
        ] {
            assert_eq!(neighbor_ids(smiles, atom), expected, "{smiles} atom {atom}");
        }
    }

    #[test]
    fn ring_bond_from_either_end() {
        for smiles in ["C=1CCC1", "C1CCC=1"] {
            let t = tree(smiles).unwrap();
            assert_eq!(t.atoms[0].neighbors[0].bond, Some(BondToken::Double), "{smiles}");
            assert_eq!(t.atoms[3].neighbors[1].bond, Some(BondToken::Double), "{smiles}");
        }
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(tree("C=1CCC#1"), Err(SmilesError::RingBondConflict { digit: 1 })));
        assert!(matches!(tree("C11"), Err(SmilesError::InvalidRingBond { digit: 1, .. })));
        assert!(matches!(tree("C1CC"), Err(SmilesError::UnclosedRing { digit: 1 })));
        assert!(matches!(tree("C(C"), Err(SmilesError::UnmatchedParen { .. })));
        assert!(matches!(tree("C)C"), Err(SmilesError::UnmatchedParen { pos: 1 })));
        assert!(matches!(tree("(C)C"), Err(SmilesError::UnmatchedParen { pos: 0 })));
    }
}
