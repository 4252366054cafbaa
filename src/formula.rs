//! Molecular formulas.
//!
//! [`mol_formula`] produces a Hill system string. [`parse_formula`] reads
//! one neutral formula component such as `C2H6O` back into element counts.

use std::collections::BTreeMap;
use std::fmt::Write;

use thiserror::Error;

use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount};

/// Hill system formula: carbon, then hydrogen, then the rest
/// alphabetically; without carbon everything is alphabetical. A net charge
/// is appended as `+`, `2+`, `-`, `2-` and so on.
pub fn mol_formula<A: HasAtomicNum + HasHydrogenCount + HasFormalCharge, B>(
    mol: &Mol<A, B>,
) -> String {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut charge: i32 = 0;
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        if let Some(elem) = Element::from_atomic_num(atom.atomic_num()) {
            *counts.entry(elem.symbol()).or_default() += 1;
        }
        if atom.hydrogen_count() > 0 {
            *counts.entry("H").or_default() += u32::from(atom.hydrogen_count());
        }
        charge += i32::from(atom.formal_charge());
    }

    let has_carbon = counts.contains_key("C");
    let mut terms: Vec<(&str, u32)> = counts.into_iter().collect();
    if has_carbon {
        terms.sort_by_key(|&(sym, _)| (hill_rank(sym), sym));
    }

    let mut out = String::new();
    for (sym, count) in terms {
        out.push_str(sym);
        if count > 1 {
            let _ = write!(out, "{count}");
        }
    }
    if charge.unsigned_abs() > 1 {
        let _ = write!(out, "{}", charge.unsigned_abs());
    }
    match charge.signum() {
        1 => out.push('+'),
        -1 => out.push('-'),
        _ => {}
    }
    out
}

fn hill_rank(symbol: &str) -> u8 {
    match symbol {
        "C" => 0,
        "H" => 1,
        _ => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,
    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
}

/// Element counts of one formula component, in the order they are written.
///
/// Repeated symbols are merged into their first occurrence.
pub fn parse_formula(s: &str) -> Result<Vec<(Element, u32)>, FormulaError> {
    if s.is_empty() {
        return Err(FormulaError::Empty);
    }
    let chars: Vec<char> = s.chars().collect();
    let mut counts: Vec<(Element, u32)> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        if !ch.is_ascii_uppercase() {
            return Err(FormulaError::UnexpectedChar { ch, pos });
        }
        let start = pos;
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_lowercase() {
            pos += 1;
        }
        let symbol: String = chars[start..pos].iter().collect();
        let elem = Element::from_symbol(&symbol).ok_or(FormulaError::UnknownElement(symbol))?;

        let digits_start = pos;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
        let count = if digits_start == pos {
            1
        } else {
            chars[digits_start..pos]
                .iter()
                .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d.to_digit(10).unwrap_or(0)))
        };

        match counts.iter_mut().find(|(e, _)| *e == elem) {
            Some((_, total)) => *total += count,
            None => counts.push((elem, count)),
        }
    }

    Ok(counts)
}
