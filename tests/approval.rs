use molconv::{ConversionError, MolDict, string_to_dict};
use serde::Deserialize;

#[derive(Deserialize)]
struct DictEntry {
    input: String,
    n_atom: usize,
    n_bond: usize,
    atom: Vec<u8>,
    bond: Vec<usize>,
    connectivity: Vec<[usize; 2]>,
}

impl DictEntry {
    fn expected(&self) -> MolDict {
        MolDict {
            n_atom: self.n_atom,
            n_bond: self.n_bond,
            atom: self.atom.clone(),
            bond: self.bond.clone(),
            connectivity: self.connectivity.clone(),
        }
    }
}

#[test]
fn approval_mpnn_dicts() {
    let data: Vec<DictEntry> =
        serde_json::from_str(include_str!("approval_data/mpnn_dicts.json")).unwrap();

    let mut failures = Vec::new();
    for entry in &data {
        let expected = entry.expected();
        assert_eq!(expected.bond.len(), expected.n_bond, "bad fixture {}", entry.input);
        match string_to_dict(&entry.input) {
            Ok(got) if got == expected => {}
            Ok(got) => failures.push(format!(
                "{}: expected {:?}, got {:?}",
                entry.input, expected, got
            )),
            Err(e) => failures.push(format!("{}: {e}", entry.input)),
        }
    }

    if !failures.is_empty() {
        panic!(
            "{} dict failures:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}

#[test]
fn approval_rejections() {
    let rejected: &[(&str, fn(&ConversionError) -> bool)] = &[
        ("C1CC", |e| matches!(e, ConversionError::Parse { .. })),
        ("InChI=1S/CH4/h1H3", |e| matches!(e, ConversionError::Parse { .. })),
        ("not a molecule", |e| matches!(e, ConversionError::Parse { .. })),
        ("[Na+].[Cl-]", |e| matches!(e, ConversionError::UnconnectedAtoms { .. })),
        ("[He]", |e| matches!(e, ConversionError::UnconnectedAtoms { .. })),
        ("CC.[Cl-]", |e| matches!(e, ConversionError::UnconnectedAtoms { .. })),
    ];

    let mut failures = Vec::new();
    for &(input, check) in rejected {
        match string_to_dict(input) {
            Ok(dict) => failures.push(format!("{input}: accepted as {dict:?}")),
            Err(e) if check(&e) => {}
            Err(e) => failures.push(format!("{input}: wrong error {e:?}")),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
