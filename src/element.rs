//! Periodic table entries needed for valence and formula work.

macro_rules! periodic_table {
    ($($sym:ident = $num:literal / $outer:literal),+ $(,)?) => {
        /// A chemical element, 1 (H) through 118 (Og).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Element {
            $($sym = $num),+
        }

        const ELEMENTS: [Element; 118] = [$(Element::$sym),+];

        impl Element {
            pub fn symbol(self) -> &'static str {
                match self {
                    $(Element::$sym => stringify!($sym)),+
                }
            }

            /// Electrons in the outermost shell, counting d electrons for
            /// transition metals.
            pub fn outer_electrons(self) -> u8 {
                match self {
                    $(Element::$sym => $outer),+
                }
            }
        }
    };
}

periodic_table! {
    H = 1 / 1, He = 2 / 2,
    Li = 3 / 1, Be = 4 / 2, B = 5 / 3, C = 6 / 4, N = 7 / 5, O = 8 / 6,
    F = 9 / 7, Ne = 10 / 8,
    Na = 11 / 1, Mg = 12 / 2, Al = 13 / 3, Si = 14 / 4, P = 15 / 5, S = 16 / 6,
    Cl = 17 / 7, Ar = 18 / 8,
    K = 19 / 1, Ca = 20 / 2, Sc = 21 / 3, Ti = 22 / 4, V = 23 / 5, Cr = 24 / 6,
    Mn = 25 / 7, Fe = 26 / 8, Co = 27 / 9, Ni = 28 / 10, Cu = 29 / 11, Zn = 30 / 12,
    Ga = 31 / 3, Ge = 32 / 4, As = 33 / 5, Se = 34 / 6, Br = 35 / 7, Kr = 36 / 8,
    Rb = 37 / 1, Sr = 38 / 2, Y = 39 / 3, Zr = 40 / 4, Nb = 41 / 5, Mo = 42 / 6,
    Tc = 43 / 7, Ru = 44 / 8, Rh = 45 / 9, Pd = 46 / 10, Ag = 47 / 11, Cd = 48 / 12,
    In = 49 / 3, Sn = 50 / 4, Sb = 51 / 5, Te = 52 / 6, I = 53 / 7, Xe = 54 / 8,
    Cs = 55 / 1, Ba = 56 / 2, La = 57 / 3, Ce = 58 / 4, Pr = 59 / 3, Nd = 60 / 4,
    Pm = 61 / 5, Sm = 62 / 6, Eu = 63 / 7, Gd = 64 / 8, Tb = 65 / 9, Dy = 66 / 10,
    Ho = 67 / 11, Er = 68 / 12, Tm = 69 / 13, Yb = 70 / 14, Lu = 71 / 3, Hf = 72 / 4,
    Ta = 73 / 5, W = 74 / 6, Re = 75 / 7, Os = 76 / 8, Ir = 77 / 9, Pt = 78 / 10,
    Au = 79 / 11, Hg = 80 / 12, Tl = 81 / 3, Pb = 82 / 4, Bi = 83 / 5, Po = 84 / 6,
    At = 85 / 7, Rn = 86 / 8,
    Fr = 87 / 1, Ra = 88 / 2, Ac = 89 / 3, Th = 90 / 4, Pa = 91 / 3, U = 92 / 4,
    Np = 93 / 5, Pu = 94 / 6, Am = 95 / 7, Cm = 96 / 8, Bk = 97 / 9, Cf = 98 / 10,
    Es = 99 / 11, Fm = 100 / 12, Md = 101 / 13, No = 102 / 14, Lr = 103 / 3, Rf = 104 / 4,
    Db = 105 / 5, Sg = 106 / 6, Bh = 107 / 7, Hs = 108 / 8, Mt = 109 / 9, Ds = 110 / 10,
    Rg = 111 / 11, Cn = 112 / 12, Nh = 113 / 3, Fl = 114 / 4, Mc = 115 / 5, Lv = 116 / 6,
    Ts = 117 / 7, Og = 118 / 8,
}

/// Outer-shell electron count by atomic number; 0 for anything that is not
/// an element.
pub fn outer_shell_electrons(atomic_num: u8) -> u8 {
    Element::from_atomic_num(atomic_num).map_or(0, Element::outer_electrons)
}

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ELEMENTS.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        ELEMENTS.iter().copied().find(|e| e.symbol() == s)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    /// Row of the periodic table, 1 for H and He.
    pub fn period(self) -> u8 {
        const LAST_IN_PERIOD: [u8; 6] = [2, 10, 18, 36, 54, 86];
        1 + LAST_IN_PERIOD.iter().filter(|&&last| self as u8 > last).count() as u8
    }

    /// Valences an uncharged atom may take when written without brackets in
    /// SMILES, lowest first. Empty for elements outside that model.
    pub fn default_valences(self) -> &'static [u8] {
        use Element::*;
        match self {
            H | F | Cl | Br | At => &[1],
            B => &[3],
            C | Si | Ge => &[4],
            N => &[3],
            P | As => &[3, 5],
            O => &[2],
            S | Se | Te => &[2, 4, 6],
            I => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Elements SMILES may write without brackets.
    pub fn is_organic_subset(self) -> bool {
        use Element::*;
        matches!(self, B | C | N | O | P | S | F | Cl | Br | I)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_agree() {
        for n in 1u8..=118 {
            let e = Element::from_atomic_num(n).unwrap();
            assert_eq!(e.atomic_num(), n);
            assert_eq!(Element::from_symbol(e.symbol()), Some(e));
        }
        assert_eq!(Element::from_atomic_num(0), None);
        assert_eq!(Element::from_atomic_num(119), None);
        assert_eq!(Element::from_atomic_num(118), Some(Element::Og));
    }

    #[test]
    fn symbols_are_case_sensitive() {
        assert_eq!(Element::from_symbol("Cl"), Some(Element::Cl));
        assert_eq!(Element::from_symbol("cl"), None);
        assert_eq!(Element::from_symbol("CL"), None);
        assert_eq!(Element::from_symbol("Xx"), None);
    }

    #[test]
    fn periods() {
        let got: Vec<u8> = [Element::H, Element::He, Element::Li, Element::Ne, Element::P, Element::Br, Element::I, Element::Rn, Element::Og]
            .iter()
            .map(|e| e.period())
            .collect();
        assert_eq!(got, vec![1, 1, 2, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn valences() {
        assert_eq!(Element::N.default_valences(), &[3]);
        assert_eq!(Element::P.default_valences(), &[3, 5]);
        assert_eq!(Element::S.default_valences(), &[2, 4, 6]);
        assert_eq!(Element::I.default_valences(), &[1, 3, 5, 7]);
        assert!(Element::Fe.default_valences().is_empty());
    }

    #[test]
    fn outer_electrons() {
        assert_eq!(outer_shell_electrons(1), 1);
        assert_eq!(outer_shell_electrons(6), 4);
        assert_eq!(outer_shell_electrons(8), 6);
        assert_eq!(outer_shell_electrons(17), 7);
        assert_eq!(outer_shell_electrons(26), 8);
        assert_eq!(outer_shell_electrons(0), 0);
        assert_eq!(outer_shell_electrons(200), 0);
    }

    #[test]
    fn organic_subset() {
        assert!(Element::C.is_organic_subset());
        assert!(Element::Br.is_organic_subset());
        assert!(!Element::Fe.is_organic_subset());
        assert!(!Element::H.is_organic_subset());
    }
}
