use crate::sanitize::SanitizeError;

/// Why a SMILES string could not be turned into a molecule. Positions count
/// characters from the start of the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    EmptyInput,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    #[error("bracket atom opened at position {pos} is never closed")]
    UnclosedBracket { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("isotope overflow at position {pos}")]
    InvalidIsotope { pos: usize },
    #[error("atom class overflow at position {pos}")]
    InvalidAtomClass { pos: usize },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Both ends of a ring closure carry a bond symbol and they disagree.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    #[error("ring {digit} is never closed")]
    UnclosedRing { digit: u16 },
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}
