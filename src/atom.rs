/// Tetrahedral chirality tag carried by an atom.
///
/// The tag is relative to the atom's reference neighbor order: the implicit
/// hydrogen first (when the atom has one), followed by its graph neighbors in
/// the order [`Mol::neighbors`](crate::Mol::neighbors) yields them. Looking
/// from the first reference neighbor, the remaining ones run
/// counterclockwise for [`Chirality::Ccw`] (`@`) and clockwise for
/// [`Chirality::Cw`] (`@@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// Unspecified or not a stereocenter.
    #[default]
    None,
    /// Clockwise (@@) arrangement.
    Cw,
    /// Counterclockwise (@) arrangement.
    Ccw,
}

impl Chirality {
    /// The opposite handedness. `None` stays `None`.
    pub fn inverted(self) -> Self {
        match self {
            Chirality::None => Chirality::None,
            Chirality::Cw => Chirality::Ccw,
            Chirality::Ccw => Chirality::Cw,
        }
    }
}

/// A heavy or hydrogen atom as the rest of the crate sees it. Properties
/// that depend on neighbors, such as hybridization, are computed on demand
/// (see [`assign_hybridization`](crate::assign_hybridization)).
///
/// ```
/// use molconv::{Atom, Chirality};
///
/// let methyl = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(methyl.chirality, Chirality::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Mass number, `0` for natural abundance.
    pub isotope: u16,
    /// Tetrahedral chirality, see [`Chirality`] for the reference order.
    pub chirality: Chirality,
    /// Hydrogens attached to this atom that are not graph nodes.
    pub hydrogen_count: u8,
    /// Set by aromaticity perception. Bond orders stay Kekulé either way.
    pub is_aromatic: bool,
}

crate::traits::field_accessors!(Atom {
    HasAtomicNum::atomic_num -> u8 = atomic_num,
    HasFormalCharge::formal_charge -> i8 = formal_charge,
    HasIsotope::isotope -> u16 = isotope,
    HasChirality::chirality -> Chirality = chirality,
    HasHydrogenCount::hydrogen_count -> u8 = hydrogen_count,
    HasAromaticity::is_aromatic -> bool = is_aromatic,
});
