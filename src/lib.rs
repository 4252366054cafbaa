//! Molecule strings to message-passing network inputs.
//!
//! A SMILES or InChI string is parsed into a sanitized [`Mol`], turned
//! into an attributed [`MolGraph`] and flattened into a [`MolDict`]:
//!
//! ```
//! let dict = molconv::string_to_dict("CC").unwrap();
//! assert_eq!(dict.n_atom, 8);
//! assert_eq!(dict.n_bond, 14);
//! assert_eq!(dict.connectivity[0], [0, 1]);
//! ```

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod chirality;
pub mod convert;
pub mod element;
pub mod error;
pub mod formula;
pub mod graph;
pub mod graph_ops;
pub mod hybridization;
pub mod hydrogen;
pub mod inchi;
pub mod kekulize;
pub mod mol;
pub mod mpnn;
pub mod radical;
pub mod rings;
pub mod sanitize;
pub mod smiles;
pub mod traits;
pub mod valence;

pub use aromaticity::{AromaticityModel, set_aromaticity};
pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
pub use canonical::canonical_ordering;
pub use chirality::cleanup_chirality;
pub use convert::{
    ParseOptions, graph_to_smiles, mol_to_dict, parse_molecule_string, string_to_dict,
    string_to_graph, string_to_graph_with,
};
pub use element::Element;
pub use error::{ConversionError, ParseError};
pub use formula::mol_formula;
pub use graph::{
    AtomAttributes, BondAttributes, BondType, GraphError, MolGraph, graph_to_mol, mol_to_graph,
};
pub use graph_ops::{connected_components, renumber_atoms};
pub use hybridization::{Hybridization, assign_conjugation, assign_hybridization};
pub use hydrogen::{RemoveHsOptions, add_hs, remove_hs, remove_hs_with};
pub use inchi::{InchiError, InchiOptions, from_inchi, from_inchi_with};
pub use kekulize::{KekulizeError, kekulize};
pub use mol::Mol;
pub use mpnn::{DictOptions, MolDict, graph_to_dict, graph_to_dict_with};
pub use radical::num_radical_electrons;
pub use rings::RingInfo;
pub use sanitize::{SanitizeError, sanitize};
pub use smiles::{SmilesError, from_smiles, parse_smiles, to_canonical_smiles, to_smiles};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasChirality, HasFormalCharge, HasHydrogenCount,
    HasIsotope,
};
pub use valence::{ValenceError, allowed_valences, check_valence};
