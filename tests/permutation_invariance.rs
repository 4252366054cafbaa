use molconv::{from_smiles, graph_to_smiles, mol_to_graph, renumber_atoms, to_canonical_smiles};

const MOLECULES: &[&str] = &[
    "C",
    "CC",
    "C=C",
    "C#C",
    "C=O",
    "O",
    "[H][H]",
    "CCO",
    "CCN",
    "CCCl",
    "CC(C)C",
    "CC(C)(C)C",
    "CC(=O)O",
    "CC(=O)N",
    "C1CC1",
    "C1CCCCC1",
    "c1ccccc1",
    "c1ccncc1",
    "c1ccoc1",
    "c1ccc2ccccc2c1",
    "[NH4+]",
    "[Na+].[Cl-]",
    "[C@@H](F)(Cl)Br",
    "[C@](F)(Cl)(Br)I",
    "N[C@@H](C)C(=O)O",
    "OC[C@H]1OC(O)[C@H](O)[C@@H](O)[C@@H]1O",
    "[C@@H]1(O)C[C@H](O)C[C@@H](O)C1",
    "[C@@H]1(CC1)[C@H]2CC2",
    "c1ccc2c(c1)[nH]cc2",
    "O=C1CC[C@H](N1)C(=O)O",
    "FC(F)(F)c1ccc(Cl)cc1",
    "C.C",
    "[2H]C([2H])([2H])[2H]",
    "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",
    "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
    "[O-][N+](=O)c1ccccc1",
];

/// Orders to try for a molecule of `n` atoms: every permutation for small
/// molecules, a fixed pseudo-random sample otherwise.
fn atom_orders(n: usize) -> Vec<Vec<usize>> {
    const EXHAUSTIVE_UP_TO: usize = 7;
    const SAMPLES: usize = 50;

    let mut order: Vec<usize> = (0..n).collect();
    if n <= EXHAUSTIVE_UP_TO {
        let mut orders = vec![order.clone()];
        while next_permutation(&mut order) {
            orders.push(order.clone());
        }
        return orders;
    }
    let mut rng = SplitMix64(0x5EED_0F_A70A5);
    (0..SAMPLES)
        .map(|_| {
            for i in (1..n).rev() {
                let j = (rng.next() % (i as u64 + 1)) as usize;
                order.swap(i, j);
            }
            order.clone()
        })
        .collect()
}

/// Advance to the next permutation in lexicographic order; false once the
/// last one has been reached.
fn next_permutation(order: &mut [usize]) -> bool {
    let Some(pivot) = order.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(swap_with) = order.iter().rposition(|&x| x > order[pivot]) else {
        return false;
    };
    order.swap(pivot, swap_with);
    order[pivot + 1..].reverse();
    true
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[test]
fn canonical_smiles_ignores_atom_order() {
    for &smiles in MOLECULES {
        let mol = from_smiles(smiles).unwrap_or_else(|e| panic!("'{smiles}': {e}"));
        let expected = to_canonical_smiles(&mol);
        for perm in atom_orders(mol.atom_count()) {
            let shuffled = renumber_atoms(&mol, &perm).unwrap();
            assert_eq!(to_canonical_smiles(&shuffled), expected, "'{smiles}' order {perm:?}");
        }
    }
}

#[test]
fn graph_smiles_ignores_atom_order() {
    for &smiles in MOLECULES {
        let mol = from_smiles(smiles).unwrap();
        let expected = graph_to_smiles(&mol_to_graph(&mol)).unwrap();
        for perm in atom_orders(mol.atom_count()).into_iter().take(20) {
            let shuffled = renumber_atoms(&mol, &perm).unwrap();
            let got = graph_to_smiles(&mol_to_graph(&shuffled)).unwrap();
            assert_eq!(got, expected, "'{smiles}' order {perm:?}");
        }
    }
}

#[test]
fn canonical_round_trip_is_stable() {
    for &smiles in MOLECULES {
        let first = to_canonical_smiles(&from_smiles(smiles).unwrap());
        let second = to_canonical_smiles(&from_smiles(&first).unwrap());
        assert_eq!(first, second, "round trip of '{smiles}'");
    }
}
