use molconv::{Hybridization, string_to_graph};

const APPROVED: &[(&str, &[&str])] = &[
    ("C", &["SP3"]),
    ("CC", &["SP3", "SP3"]),
    ("C=C", &["SP2", "SP2"]),
    ("C#C", &["SP", "SP"]),
    ("CC#N", &["SP3", "SP", "SP"]),
    ("CC=O", &["SP3", "SP2", "SP2"]),
    ("CCO", &["SP3", "SP3", "SP3"]),
    ("O", &["SP3"]),
    ("N", &["SP3"]),
    ("[NH4+]", &["SP3"]),
    ("c1ccccc1", &["SP2", "SP2", "SP2", "SP2", "SP2", "SP2"]),
    ("c1ccncc1", &["SP2", "SP2", "SP2", "SP2", "SP2", "SP2"]),
    ("c1cc[nH]c1", &["SP2", "SP2", "SP2", "SP2", "SP2"]),
];

#[test]
fn approval_hybridization() {
    let mut pass = 0;
    let mut failures = Vec::new();

    for &(smiles, heavy) in APPROVED {
        let graph = string_to_graph(smiles).unwrap();
        let got: Vec<String> = graph
            .nodes()
            .map(|(_, a)| a.hybridization.to_string())
            .collect();
        let mut expected: Vec<String> = heavy.iter().map(|s| s.to_string()).collect();
        // hydrogens follow the heavy atoms and are all s orbitals
        expected.resize(graph.node_count(), Hybridization::S.to_string());

        if got == expected {
            pass += 1;
        } else {
            failures.push(format!("{smiles}: expected {expected:?}, got {got:?}"));
        }
    }

    for f in &failures {
        eprintln!("FAIL: {f}");
    }
    eprintln!("{pass} passed, {} failed out of {} total", failures.len(), APPROVED.len());
    assert!(failures.is_empty(), "{} molecules failed hybridization approval", failures.len());
}

#[test]
fn hydrogens_are_s() {
    let graph = string_to_graph("CC(=O)O").unwrap();
    for (_, attrs) in graph.nodes().filter(|(_, a)| a.atomic_num == 1) {
        assert_eq!(attrs.hybridization, Hybridization::S);
    }
}
