//! Aromaticity perception on Kekulé structures.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AromaticityModel {
    /// Hückel's 4n+2 rule applied to each ring of the SSSR on its own.
    #[default]
    Sssr,
}

/// Elements that can sit in an aromatic ring: B, C, N, O, P, S, As, Se, Te.
const RING_ELEMENTS: [u8; 9] = [5, 6, 7, 8, 15, 16, 33, 34, 52];

/// Perceive aromaticity and store it on atoms and bonds. Bonds are aromatic
/// when both ends are consecutive members of an aromatic ring; every other
/// flag is cleared.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>, model: AromaticityModel) {
    let rings = match model {
        AromaticityModel::Sssr => aromatic_rings(mol),
    };

    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for idx in atoms {
        mol.atom_mut(idx).is_aromatic = false;
    }
    let bonds: Vec<_> = mol.bonds().collect();
    for idx in bonds {
        mol.bond_mut(idx).is_aromatic = false;
    }

    for ring in &rings {
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            mol.atom_mut(a).is_aromatic = true;
            if let Some(edge) = mol.bond_between(a, b) {
                mol.bond_mut(edge).is_aromatic = true;
            }
        }
    }
}

fn aromatic_rings<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let info = RingInfo::sssr(mol);
    info.rings()
        .iter()
        .filter(|ring| is_aromatic_ring(mol, &info, ring))
        .cloned()
        .collect()
}

fn is_aromatic_ring<A, B>(mol: &Mol<A, B>, info: &RingInfo, ring: &[NodeIndex]) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    if ring.len() < 3
        || ring
            .iter()
            .any(|&v| !RING_ELEMENTS.contains(&mol.atom(v).atomic_num()))
    {
        return false;
    }

    let mut electrons: u8 = 0;
    for (i, &v) in ring.iter().enumerate() {
        let member = RingMember::new(mol, info, ring, i);
        if member.in_ring_orders.contains(&BondOrder::Triple) {
            return false;
        }
        match member.pi_electrons(mol, v) {
            Some(e) => electrons = electrons.saturating_add(e),
            None => return false,
        }
    }
    huckel(electrons)
}

/// What one ring atom's bonds look like from inside the ring.
struct RingMember<'a> {
    info: &'a RingInfo,
    in_ring_orders: [BondOrder; 2],
    any_double: bool,
    degree: u8,
}

impl<'a> RingMember<'a> {
    fn new<A, B>(mol: &Mol<A, B>, info: &'a RingInfo, ring: &[NodeIndex], pos: usize) -> Self
    where
        A: HasHydrogenCount,
        B: HasBondOrder,
    {
        let v = ring[pos];
        let len = ring.len();
        let order_to = |w: NodeIndex| {
            mol.bond_between(v, w)
                .map_or(BondOrder::Single, |e| mol.bond(e).bond_order())
        };
        Self {
            info,
            in_ring_orders: [order_to(ring[(pos + len - 1) % len]), order_to(ring[(pos + 1) % len])],
            any_double: mol
                .bonds_of(v)
                .any(|e| mol.bond(e).bond_order() == BondOrder::Double),
            degree: mol.neighbors(v).count() as u8 + mol.atom(v).hydrogen_count(),
        }
    }

    fn double_in_ring(&self) -> bool {
        self.in_ring_orders.contains(&BondOrder::Double)
    }

    /// A carbon double bonded to an N, O or S outside every ring gives its
    /// electron to that bond instead. A double bond into a fused ring still
    /// counts as one electron, whichever Kekulé form was assigned.
    fn exocyclic_polar_double<A, B>(&self, mol: &Mol<A, B>, v: NodeIndex) -> bool
    where
        A: HasAtomicNum,
        B: HasBondOrder,
    {
        mol.neighbors(v)
            .filter(|&w| !self.info.is_ring_atom(w))
            .any(|w| {
                matches!(mol.atom(w).atomic_num(), 7 | 8 | 16)
                    && mol
                        .bond_between(v, w)
                        .is_some_and(|e| mol.bond(e).bond_order() == BondOrder::Double)
            })
    }

    /// Electrons this atom puts into the ring's pi system, or `None` when
    /// it breaks conjugation.
    fn pi_electrons<A, B>(&self, mol: &Mol<A, B>, v: NodeIndex) -> Option<u8>
    where
        A: HasAtomicNum + HasFormalCharge,
        B: HasBondOrder,
    {
        let atom = mol.atom(v);
        match (atom.atomic_num(), atom.formal_charge()) {
            (6, 0) if self.double_in_ring() => Some(1),
            (6, 0) if self.exocyclic_polar_double(mol, v) => Some(0),
            (6, 0) => self.any_double.then_some(1),
            (6, -1) => Some(2),
            (6, 1) => Some(u8::from(self.any_double)),
            (7, 0) | (15 | 33, _) if self.any_double => Some(1),
            (7, 0) | (15 | 33, _) => (self.degree <= 3).then_some(2),
            (7, 1) => self.double_in_ring().then_some(1),
            (8 | 16 | 34 | 52, _) if self.double_in_ring() => Some(1),
            (8 | 16 | 34 | 52, _) => Some(2),
            (5, _) => Some(u8::from(self.any_double)),
            _ => None,
        }
    }
}

fn huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2).is_multiple_of(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn aromatic_flags(smiles: &str) -> Vec<bool> {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().map(|v| mol.atom(v).is_aromatic).collect()
    }

    #[test]
    fn fully_aromatic() {
        for smiles in [
            "c1ccccc1",
            "c1ccncc1",
            "[nH]1cccc1",
            "o1cccc1",
            "s1cccc1",
            "c1ccc2ccccc2c1",
            "[CH-]1C=CC=C1",
            "C1=CC=CC=C1",
            "c1ccc2[nH]ccc2c1",
        ] {
            assert!(aromatic_flags(smiles).iter().all(|&a| a), "{smiles}");
        }
    }

    #[test]
    fn not_aromatic() {
        for smiles in [
            "C1CCCCC1",
            "C1=CCC=C1",
            "C1=CC=CC=CC=C1",
            "O=C1C=CC(=O)C=C1",
            "C1=CC=CC#C1",
        ] {
            assert!(aromatic_flags(smiles).iter().all(|&a| !a), "{smiles}");
        }
    }

    #[test]
    fn substituents_excluded() {
        let flags = aromatic_flags("Oc1ccccc1");
        assert!(!flags[0]);
        assert!(flags[1..].iter().all(|&a| a));

        let flags = aromatic_flags("O=c1cccc[nH]1");
        assert!(!flags[0]);
        assert!(flags[1..].iter().all(|&a| a));
    }

    #[test]
    fn fused_ring_double_bonds_count() {
        // 7H-adenine written with C4=N3 shared between the two rings
        let flags = aromatic_flags("NC1=C2[NH]C=NC2=NC=N1");
        assert!(!flags[0]);
        assert!(flags[1..].iter().all(|&a| a));
    }

    #[test]
    fn bond_flags() {
        let mol = from_smiles("c1ccccc1-c1ccccc1").unwrap();
        let linker = mol.bond_between(NodeIndex::new(5), NodeIndex::new(6)).unwrap();
        assert!(!mol.bond(linker).is_aromatic);
        assert_eq!(mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count(), 12);

        let mol = from_smiles("Cc1ccccc1").unwrap();
        assert_eq!(mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count(), 6);
    }

    #[test]
    fn perceives_hand_built_kekule_ring() {
        let mut mol = Mol::new();
        let atoms: Vec<_> = (0..6)
            .map(|_| {
                mol.add_atom(Atom {
                    atomic_num: 6,
                    hydrogen_count: 1,
                    ..Atom::default()
                })
            })
            .collect();
        for i in 0..6 {
            let order = if i % 2 == 0 { BondOrder::Double } else { BondOrder::Single };
            mol.add_bond(atoms[i], atoms[(i + 1) % 6], Bond::new(order));
        }
        assert!(mol.atoms().all(|v| !mol.atom(v).is_aromatic));

        set_aromaticity(&mut mol, AromaticityModel::default());
        assert!(mol.atoms().all(|v| mol.atom(v).is_aromatic));
        assert!(mol.bonds().all(|e| mol.bond(e).is_aromatic));
    }

    #[test]
    fn stale_flags_cleared() {
        let mut mol = from_smiles("C1CCCCC1").unwrap();
        let first = NodeIndex::new(0);
        mol.atom_mut(first).is_aromatic = true;
        set_aromaticity(&mut mol, AromaticityModel::Sssr);
        assert!(!mol.atom(first).is_aromatic);
    }

    #[test]
    fn huckel_counts() {
        let passing: Vec<u8> = (0..20).filter(|&e| huckel(e)).collect();
        assert_eq!(passing, vec![2, 6, 10, 14, 18]);
    }
}
