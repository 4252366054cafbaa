//! Layer-by-layer reading of an InChI body (everything after the prefix).
//!
//! Atoms are numbered per component in formula order with hydrogens left
//! out, so `C2H6O` numbers the carbons 1 and 2 and the oxygen 3. A
//! component made only of hydrogen gets a single hydrogen atom.

use tracing::debug;

use crate::element::Element;
use crate::formula::parse_formula;
use crate::inchi::error::{InchiError, malformed};

/// Hydrogens (and optionally negative charges) shared by a set of atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileGroup {
    pub hydrogens: u8,
    pub negative: u8,
    pub atoms: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    pub atoms: Vec<Element>,
    /// Hydrogen count written in the formula layer.
    pub formula_h: u32,
    /// Zero-based atom pairs from the connection layer.
    pub bonds: Vec<(usize, usize)>,
    /// Fixed hydrogens per atom.
    pub hydrogens: Vec<u8>,
    pub mobile: Vec<MobileGroup>,
    pub charge: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layers {
    pub components: Vec<Component>,
    /// Protons to add (positive) or remove (negative), from `/p`.
    pub protons: i32,
}

pub fn parse_layers(body: &str) -> Result<Layers, InchiError> {
    let mut segments = body.split('/');
    let formula = segments.next().unwrap_or_default();
    let mut components = parse_formula_layer(formula)?;
    let mut protons = 0;

    for segment in segments {
        let mut chars = segment.chars();
        let Some(tag) = chars.next() else {
            return Err(malformed("/", "empty layer"));
        };
        let content = chars.as_str();
        match tag {
            'c' => {
                let entries = per_component(content, "/c", components.len())?;
                for (component, entry) in components.iter_mut().zip(entries) {
                    component.bonds = parse_connections(entry, component.atoms.len())?;
                }
            }
            'h' => {
                let entries = per_component(content, "/h", components.len())?;
                for (component, entry) in components.iter_mut().zip(entries) {
                    let (fixed, mobile) = parse_hydrogens(entry, component.atoms.len())?;
                    component.hydrogens = fixed;
                    component.mobile = mobile;
                }
            }
            'q' => {
                let entries = per_component(content, "/q", components.len())?;
                for (component, entry) in components.iter_mut().zip(entries) {
                    component.charge = parse_signed(entry, "/q")?;
                }
            }
            'p' => protons = parse_signed(content, "/p")?,
            'b' | 't' | 'm' | 's' => debug!(layer = %tag, "skipping stereo layer"),
            'i' | 'f' | 'r' => {
                debug!(layer = %tag, "ignoring isotopic and fixed-H layers");
                break;
            }
            other => return Err(malformed("/", format!("unknown layer '{other}'"))),
        }
    }

    Ok(Layers {
        components,
        protons,
    })
}

fn parse_formula_layer(formula: &str) -> Result<Vec<Component>, InchiError> {
    if formula.is_empty() {
        return Err(malformed("formula", "missing"));
    }
    let mut components = Vec::new();
    for part in formula.split('.') {
        let digits = part.bytes().take_while(u8::is_ascii_digit).count();
        let (multiplier, rest) = part.split_at(digits);
        let multiplier = match multiplier {
            "" => 1,
            m => m
                .parse::<usize>()
                .map_err(|_| malformed("formula", format!("bad multiplier '{m}'")))?,
        };
        let counts = parse_formula(rest)?;
        let formula_h = counts
            .iter()
            .filter(|(e, _)| *e == Element::H)
            .map(|(_, n)| n)
            .sum();
        let mut atoms: Vec<Element> = counts
            .iter()
            .filter(|(e, _)| *e != Element::H)
            .flat_map(|&(e, n)| std::iter::repeat_n(e, n as usize))
            .collect();
        if atoms.is_empty() {
            atoms.push(Element::H);
        }
        let component = Component {
            hydrogens: vec![0; atoms.len()],
            atoms,
            formula_h,
            ..Component::default()
        };
        components.extend(std::iter::repeat_n(component, multiplier));
    }
    Ok(components)
}

/// Split a layer into one entry per component, expanding `n*` repeats.
/// Missing trailing entries are empty.
fn per_component<'a>(content: &'a str, layer: &str, count: usize) -> Result<Vec<&'a str>, InchiError> {
    let mut entries = Vec::with_capacity(count);
    for part in content.split(';') {
        match part.split_once('*') {
            Some((n, rest)) => {
                let n: usize = n
                    .parse()
                    .map_err(|_| malformed(layer, format!("bad multiplier '{n}'")))?;
                entries.extend(std::iter::repeat_n(rest, n));
            }
            None => entries.push(part),
        }
    }
    if entries.len() > count {
        return Err(malformed(
            layer,
            format!("{} entries for {count} components", entries.len()),
        ));
    }
    entries.resize(count, "");
    Ok(entries)
}

fn parse_signed(text: &str, layer: &str) -> Result<i32, InchiError> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| malformed(layer, format!("bad charge '{text}'")))
}

/// Read a 1-based atom number and return it zero-based.
fn read_atom(bytes: &[u8], pos: &mut usize, count: usize, layer: &str) -> Result<usize, InchiError> {
    let start = *pos;
    while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if start == *pos {
        return Err(match bytes.get(start) {
            Some(&b) => malformed(layer, format!("unexpected '{}'", b as char)),
            None => malformed(layer, "expected an atom number"),
        });
    }
    let atom = std::str::from_utf8(&bytes[start..*pos])
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    if atom == 0 || atom > count {
        return Err(InchiError::AtomOutOfRange { atom, count });
    }
    Ok(atom - 1)
}

fn read_count(bytes: &[u8], pos: &mut usize, layer: &str) -> Result<Option<u8>, InchiError> {
    let start = *pos;
    while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if start == *pos {
        return Ok(None);
    }
    std::str::from_utf8(&bytes[start..*pos])
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .map(Some)
        .ok_or_else(|| malformed(layer, "hydrogen count too large"))
}

fn expect(bytes: &[u8], pos: &mut usize, want: u8, layer: &str) -> Result<(), InchiError> {
    match bytes.get(*pos) {
        Some(&b) if b == want => {
            *pos += 1;
            Ok(())
        }
        Some(&b) => Err(malformed(
            layer,
            format!("expected '{}', found '{}'", want as char, b as char),
        )),
        None => Err(malformed(layer, format!("expected '{}'", want as char))),
    }
}

/// Connection table of one component: `1-2-3` chains, `2(3,4)5` branches
/// and ring closures by naming an earlier atom again.
fn parse_connections(text: &str, count: usize) -> Result<Vec<(usize, usize)>, InchiError> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut bonds: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut branches: Vec<Option<usize>> = Vec::new();

    while pos < bytes.len() {
        match bytes[pos] {
            b'0'..=b'9' => {
                let atom = read_atom(bytes, &mut pos, count, "/c")?;
                if let Some(prev) = current {
                    if prev == atom {
                        return Err(malformed("/c", format!("atom {} bonded to itself", atom + 1)));
                    }
                    let key = (prev.min(atom), prev.max(atom));
                    if !bonds.contains(&key) {
                        bonds.push(key);
                    }
                }
                current = Some(atom);
                continue;
            }
            b'-' => {}
            b'(' => branches.push(current),
            b',' => {
                current = *branches
                    .last()
                    .ok_or_else(|| malformed("/c", "',' outside a branch"))?;
            }
            b')' => {
                current = branches
                    .pop()
                    .ok_or_else(|| malformed("/c", "unmatched ')'"))?;
            }
            other => return Err(malformed("/c", format!("unexpected '{}'", other as char))),
        }
        pos += 1;
    }

    if !branches.is_empty() {
        return Err(malformed("/c", "unclosed '('"));
    }
    Ok(bonds)
}

/// Hydrogen layer of one component: `1,3H2`, `2-4H` and mobile groups
/// such as `(H2,1,3)`.
fn parse_hydrogens(text: &str, count: usize) -> Result<(Vec<u8>, Vec<MobileGroup>), InchiError> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut fixed = vec![0u8; count];
    let mut mobile = Vec::new();

    while pos < bytes.len() {
        if bytes[pos] == b'(' {
            mobile.push(parse_mobile_group(bytes, &mut pos, count)?);
        } else {
            let atoms = parse_atom_list(bytes, &mut pos, count)?;
            expect(bytes, &mut pos, b'H', "/h")?;
            let n = read_count(bytes, &mut pos, "/h")?.unwrap_or(1);
            for atom in atoms {
                fixed[atom] = fixed[atom].saturating_add(n);
            }
        }
        if bytes.get(pos) == Some(&b',') {
            pos += 1;
        }
    }

    Ok((fixed, mobile))
}

fn parse_atom_list(bytes: &[u8], pos: &mut usize, count: usize) -> Result<Vec<usize>, InchiError> {
    let mut atoms = Vec::new();
    loop {
        let first = read_atom(bytes, pos, count, "/h")?;
        if bytes.get(*pos) == Some(&b'-') {
            *pos += 1;
            let last = read_atom(bytes, pos, count, "/h")?;
            if last < first {
                return Err(malformed("/h", format!("descending range {}-{}", first + 1, last + 1)));
            }
            atoms.extend(first..=last);
        } else {
            atoms.push(first);
        }
        let more = bytes.get(*pos) == Some(&b',')
            && bytes.get(*pos + 1).is_some_and(u8::is_ascii_digit);
        if !more {
            return Ok(atoms);
        }
        *pos += 1;
    }
}

fn parse_mobile_group(bytes: &[u8], pos: &mut usize, count: usize) -> Result<MobileGroup, InchiError> {
    expect(bytes, pos, b'(', "/h")?;
    expect(bytes, pos, b'H', "/h")?;
    let hydrogens = read_count(bytes, pos, "/h")?.unwrap_or(1);
    let mut negative = 0u8;
    while bytes.get(*pos) == Some(&b'-') {
        negative = negative.saturating_add(1);
        *pos += 1;
    }
    let mut atoms = Vec::new();
    while bytes.get(*pos) == Some(&b',') {
        *pos += 1;
        atoms.push(read_atom(bytes, pos, count, "/h")?);
    }
    expect(bytes, pos, b')', "/h")?;
    if atoms.is_empty() {
        return Err(malformed("/h", "mobile group without atoms"));
    }
    Ok(MobileGroup {
        hydrogens,
        negative,
        atoms,
    })
}
