use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub is_bracket: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiralityToken {
    None,
    CounterClockwise,
    Clockwise,
}

/// `Up`/`Down` are the directional `/` and `\` bonds. Double-bond geometry
/// is not modeled, so the builder treats them as single bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

struct Cursor<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digit(&mut self) -> Option<u8> {
        let d = self.peek()?.to_digit(10)?;
        self.pos += 1;
        Some(d as u8)
    }

    /// Reads a run of decimal digits. `None` when there are none; `Some(Err)`
    /// when the value does not fit `max`.
    fn number(&mut self, max: u32) -> Option<Result<u32, ()>> {
        let mut val = self.digit()? as u32;
        let mut overflow = false;
        while let Some(d) = self.digit() {
            val = val * 10 + d as u32;
            if val > max {
                overflow = true;
                val = max;
            }
        }
        Some(if overflow { Err(()) } else { Ok(val) })
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut cur = Cursor {
        chars: &chars,
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(ch) = cur.peek() {
        let start = cur.pos;
        if let Some((element, aromatic, len)) = organic_atom(&cur) {
            tokens.push(Token::Atom(bare_atom(element, aromatic)));
            cur.pos += len;
            continue;
        }
        match ch {
            ' ' | '\t' | '\r' | '\n' => cur.pos += 1,
            '[' => tokens.push(Token::Atom(parse_bracket_atom(&mut cur)?)),
            '-' if looks_like_bond(&tokens) => {
                tokens.push(Token::Bond(BondToken::Single));
                cur.pos += 1;
            }
            '=' | '#' | ':' | '/' | '\\' => {
                let bond = match ch {
                    '=' => BondToken::Double,
                    '#' => BondToken::Triple,
                    ':' => BondToken::Aromatic,
                    '/' => BondToken::Up,
                    _ => BondToken::Down,
                };
                tokens.push(Token::Bond(bond));
                cur.pos += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(start));
                cur.pos += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(start));
                cur.pos += 1;
            }
            '.' => {
                tokens.push(Token::Dot(start));
                cur.pos += 1;
            }
            '%' => {
                cur.pos += 1;
                let (Some(d1), Some(d2)) = (cur.digit(), cur.digit()) else {
                    return Err(SmilesError::UnexpectedChar { pos: start, ch });
                };
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: d1 as u16 * 10 + d2 as u16,
                    pos: start,
                });
            }
            '0'..='9' => {
                let d = cur.digit().unwrap_or(0);
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: d as u16,
                    pos: start,
                });
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: start, ch }),
        }
    }

    Ok(tokens)
}

/// Organic-subset atom written without brackets: `B C N O P S F Cl Br I`
/// and the aromatic `b c n o p s`.
fn organic_atom(cur: &Cursor<'_>) -> Option<(Element, bool, usize)> {
    let next = cur.peek_at(1);
    let hit = match cur.peek()? {
        'B' if next == Some('r') => (Element::Br, false, 2),
        'C' if next == Some('l') => (Element::Cl, false, 2),
        'B' => (Element::B, false, 1),
        'C' => (Element::C, false, 1),
        'N' => (Element::N, false, 1),
        'O' => (Element::O, false, 1),
        'P' => (Element::P, false, 1),
        'S' => (Element::S, false, 1),
        'F' => (Element::F, false, 1),
        'I' => (Element::I, false, 1),
        'b' => (Element::B, true, 1),
        'c' => (Element::C, true, 1),
        'n' => (Element::N, true, 1),
        'o' => (Element::O, true, 1),
        'p' => (Element::P, true, 1),
        's' => (Element::S, true, 1),
        _ => return None,
    };
    Some(hit)
}

fn bare_atom(element: Element, aromatic: bool) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        chirality: ChiralityToken::None,
        hcount: None,
        charge: 0,
        is_bracket: false,
    }
}

fn looks_like_bond(tokens: &[Token]) -> bool {
    matches!(
        tokens.last(),
        Some(Token::Atom(_)) | Some(Token::RingClosure { .. }) | Some(Token::CloseParen(_)) | None
    )
}

fn take_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    match tokens.last() {
        Some(Token::Bond(b)) => {
            let b = *b;
            tokens.pop();
            Some(b)
        }
        _ => None,
    }
}

fn parse_bracket_atom(cur: &mut Cursor<'_>) -> Result<AtomToken, SmilesError> {
    let start = cur.pos;
    cur.pos += 1;

    let isotope = match cur.number(u16::MAX as u32) {
        None => 0,
        Some(Ok(v)) => v as u16,
        Some(Err(())) => return Err(SmilesError::InvalidIsotope { pos: start }),
    };
    let (element, is_aromatic) = parse_bracket_element(cur, start)?;

    let chirality = if cur.eat('@') {
        if cur.eat('@') {
            ChiralityToken::Clockwise
        } else {
            ChiralityToken::CounterClockwise
        }
    } else {
        ChiralityToken::None
    };

    let hcount = if cur.eat('H') {
        cur.digit().unwrap_or(1)
    } else {
        0
    };

    let charge = parse_charge(cur, start)?;

    // atom classes are validated but not kept
    if cur.eat(':') && !matches!(cur.number(u16::MAX as u32), Some(Ok(_))) {
        return Err(SmilesError::InvalidAtomClass { pos: start });
    }

    if !cur.eat(']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    Ok(AtomToken {
        element,
        is_aromatic,
        isotope,
        chirality,
        hcount: Some(hcount),
        charge,
        is_bracket: true,
    })
}

fn parse_bracket_element(
    cur: &mut Cursor<'_>,
    bracket_start: usize,
) -> Result<(Element, bool), SmilesError> {
    let Some(first) = cur.peek() else {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    };
    let second = cur.peek_at(1);

    let aromatic = match (first, second) {
        ('s', Some('e')) => Some((Element::Se, 2)),
        ('t', Some('e')) => Some((Element::Te, 2)),
        ('a', Some('s')) => Some((Element::As, 2)),
        ('b', _) => Some((Element::B, 1)),
        ('c', _) => Some((Element::C, 1)),
        ('n', _) => Some((Element::N, 1)),
        ('o', _) => Some((Element::O, 1)),
        ('p', _) => Some((Element::P, 1)),
        ('s', _) => Some((Element::S, 1)),
        _ => None,
    };
    if let Some((element, len)) = aromatic {
        cur.pos += len;
        return Ok((element, true));
    }

    if first.is_ascii_uppercase() {
        if let Some(lower) = second.filter(|c| c.is_ascii_lowercase()) {
            let sym: String = [first, lower].iter().collect();
            if let Some(e) = Element::from_symbol(&sym) {
                cur.pos += 2;
                return Ok((e, false));
            }
        }
        if let Some(e) = Element::from_symbol(first.encode_utf8(&mut [0; 4])) {
            cur.pos += 1;
            return Ok((e, false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: cur.pos,
        text: first.to_string(),
    })
}

fn parse_charge(cur: &mut Cursor<'_>, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match cur.peek() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = if sign > 0 { '+' } else { '-' };
    cur.pos += 1;

    let invalid = SmilesError::InvalidCharge { pos: bracket_start };
    if cur.peek() == Some(symbol) {
        let mut count: i8 = 1;
        while cur.eat(symbol) {
            count = count.checked_add(1).ok_or(invalid.clone())?;
        }
        return Ok(sign * count);
    }
    match cur.number(i8::MAX as u32) {
        None => Ok(sign),
        Some(Ok(v)) => Ok(sign * v as i8),
        Some(Err(())) => Err(invalid),
    }
}
