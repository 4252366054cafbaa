//! Read-only views of atom and bond data. Algorithms that only need a few
//! properties take these as bounds so they run on any node or edge type.

use crate::atom::Chirality;
use crate::bond::BondOrder;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasIsotope {
    fn isotope(&self) -> u16;
}

pub trait HasChirality {
    fn chirality(&self) -> Chirality;
}

pub trait HasHydrogenCount {
    fn hydrogen_count(&self) -> u8;
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}

/// Implement accessor traits for a struct whose fields already hold the
/// values: `field_accessors!(Atom { HasIsotope::isotope -> u16 = isotope })`.
macro_rules! field_accessors {
    ($ty:ty { $($tr:ident :: $method:ident -> $ret:ty = $field:ident),+ $(,)? }) => {
        $(
            impl $crate::traits::$tr for $ty {
                fn $method(&self) -> $ret {
                    self.$field
                }
            }
        )+
    };
}

pub(crate) use field_accessors;
