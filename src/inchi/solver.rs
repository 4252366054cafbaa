//! Reconstruction of hydrogen positions, charges and bond orders.
//!
//! InChI keeps connectivity but not bond orders, and it may leave mobile
//! hydrogens, component charges and the proton balance unattached. The
//! search first places each of those units on a candidate atom, then
//! assigns an order of 1 to 3 to every connection so that each atom lands
//! on an acceptable valence for its element and charge.
//!
//! Assignments are tried in passes, strictest first: every atom at its
//! lowest valence, then with N-oxide and nitro nitrogens written as
//! `[N+]`/`[O-]` pairs, then any allowed valence, and finally atoms left
//! below their valence (radicals).

use tracing::debug;

use crate::element::Element;
use crate::inchi::error::InchiError;
use crate::inchi::layers::Layers;
use crate::valence::allowed_valences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    AddHydrogen,
    AddCharge(i8),
    RemoveProton,
    AddProton,
}

/// One unit to attach to one of `candidates`. Consecutive slots of the same
/// group pick candidates in non-decreasing order, strictly increasing when
/// `distinct` is set.
#[derive(Debug, Clone)]
struct Slot {
    candidates: Vec<usize>,
    effect: Effect,
    group: usize,
    distinct: bool,
}

#[derive(Debug, Clone)]
pub struct Problem {
    elements: Vec<Element>,
    hydrogens: Vec<u8>,
    bonds: Vec<(usize, usize)>,
    slots: Vec<Slot>,
    net_charge: i32,
    /// `(nitrogen, oxygen)` bonds where the nitrogen has three neighbors and
    /// the oxygen only this one, ordered by nitrogen then oxygen.
    oxide_pairs: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub elements: Vec<Element>,
    pub hydrogens: Vec<u8>,
    pub charges: Vec<i8>,
    /// `(a, b, order)` in connection-layer order.
    pub bonds: Vec<(usize, usize, u8)>,
    pub steps: usize,
}

impl Problem {
    /// Merge the components into one atom list and check every
    /// component's hydrogen count against its formula.
    pub fn new(layers: &Layers) -> Result<Self, InchiError> {
        let mut elements = Vec::new();
        let mut hydrogens = Vec::new();
        let mut bonds = Vec::new();
        let mut slots = Vec::new();
        let mut mobile_atoms = Vec::new();
        let mut net_charge = layers.protons;
        let mut group = 0;

        for component in &layers.components {
            let offset = elements.len();
            let found = component.atoms.iter().filter(|&&e| e == Element::H).count() as u32
                + component.hydrogens.iter().map(|&h| h as u32).sum::<u32>()
                + component.mobile.iter().map(|g| g.hydrogens as u32).sum::<u32>();
            if found != component.formula_h {
                return Err(InchiError::HydrogenMismatch {
                    expected: component.formula_h,
                    found,
                });
            }

            elements.extend_from_slice(&component.atoms);
            hydrogens.extend_from_slice(&component.hydrogens);
            bonds.extend(component.bonds.iter().map(|&(a, b)| (a + offset, b + offset)));

            for mobile in &component.mobile {
                let atoms: Vec<usize> = mobile.atoms.iter().map(|a| a + offset).collect();
                // one atom may take several, as in the NH2 of adenine
                push_slots(&mut slots, &atoms, Effect::AddHydrogen, mobile.hydrogens as u32, group, false);
                group += 1;
                push_slots(&mut slots, &atoms, Effect::AddCharge(-1), mobile.negative as u32, group, false);
                group += 1;
                net_charge -= mobile.negative as i32;
                mobile_atoms.extend(atoms);
            }

            if component.charge != 0 {
                let candidates = by_preference(offset..elements.len(), &elements, &[]);
                let effect = Effect::AddCharge(component.charge.signum() as i8);
                push_slots(&mut slots, &candidates, effect, component.charge.unsigned_abs(), group, false);
                group += 1;
                net_charge += component.charge;
            }
        }

        if layers.protons != 0 {
            let candidates = by_preference(0..elements.len(), &elements, &mobile_atoms);
            let count = layers.protons.unsigned_abs();
            let effect = if layers.protons < 0 {
                Effect::RemoveProton
            } else {
                Effect::AddProton
            };
            let distinct = candidates.len() >= count as usize;
            push_slots(&mut slots, &candidates, effect, count, group, distinct);
        }

        let oxide_pairs = oxide_pairs(&elements, &bonds);
        Ok(Self {
            elements,
            hydrogens,
            bonds,
            slots,
            net_charge,
            oxide_pairs,
        })
    }

    fn places_charge(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.effect != Effect::AddHydrogen)
    }
}

fn push_slots(
    slots: &mut Vec<Slot>,
    candidates: &[usize],
    effect: Effect,
    count: u32,
    group: usize,
    distinct: bool,
) {
    for _ in 0..count {
        slots.push(Slot {
            candidates: candidates.to_vec(),
            effect,
            group,
            distinct,
        });
    }
}

fn oxide_pairs(elements: &[Element], bonds: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut degree = vec![0usize; elements.len()];
    for &(a, b) in bonds {
        degree[a] += 1;
        degree[b] += 1;
    }
    let mut pairs: Vec<(usize, usize)> = bonds
        .iter()
        .flat_map(|&(a, b)| [(a, b), (b, a)])
        .filter(|&(n, o)| {
            elements[n] == Element::N && degree[n] == 3 && elements[o] == Element::O && degree[o] == 1
        })
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Atoms in `range`, with `preferred` atoms first, then heteroatoms, then
/// carbon, then hydrogen.
fn by_preference(range: std::ops::Range<usize>, elements: &[Element], preferred: &[usize]) -> Vec<usize> {
    let mut atoms: Vec<usize> = range.collect();
    atoms.sort_by_key(|&i| {
        let rank = match elements[i] {
            Element::H => 3,
            Element::C => 2,
            _ => 1,
        };
        (!preferred.contains(&i), rank)
    });
    atoms
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Valence {
    /// Only the lowest allowed valence, so neutral S stays divalent.
    Lowest,
    Any,
    /// Anything up to the highest allowed valence.
    Unsaturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pass {
    valence: Valence,
    separate_charges: bool,
}

const PASSES: [Pass; 5] = [
    Pass { valence: Valence::Lowest, separate_charges: false },
    Pass { valence: Valence::Lowest, separate_charges: true },
    Pass { valence: Valence::Any, separate_charges: true },
    Pass { valence: Valence::Any, separate_charges: false },
    Pass { valence: Valence::Unsaturated, separate_charges: false },
];

impl Pass {
    fn orders(self) -> [u8; 3] {
        match self.valence {
            Valence::Unsaturated => [3, 2, 1],
            Valence::Lowest | Valence::Any => [1, 2, 3],
        }
    }
}

pub fn solve(problem: &Problem, budget: usize) -> Result<Solution, InchiError> {
    let mut steps = 0;
    for pass in PASSES {
        if pass.separate_charges && problem.oxide_pairs.is_empty() {
            continue;
        }
        let mut search = Search::new(problem, pass, budget, steps);
        if search.place(0)? {
            return Ok(search.into_solution());
        }
        steps = search.steps;
        debug!(?pass, steps, "no bond order assignment in pass");
    }
    if problem.places_charge() {
        Err(InchiError::ChargeUnplaceable {
            charge: problem.net_charge,
        })
    } else {
        Err(InchiError::BondOrdersUnassignable)
    }
}

struct Search<'a> {
    problem: &'a Problem,
    pass: Pass,
    budget: usize,
    steps: usize,
    hydrogens: Vec<u8>,
    charges: Vec<i8>,
    chosen: Vec<usize>,
    /// Bond indices in the order they are assigned: by higher endpoint, so
    /// low-numbered atoms are closed early.
    schedule: Vec<usize>,
    orders: Vec<u8>,
    degree: Vec<u16>,
    sum: Vec<u16>,
    remaining: Vec<u16>,
    allowed: Vec<Vec<u8>>,
}

impl<'a> Search<'a> {
    fn new(problem: &'a Problem, pass: Pass, budget: usize, steps: usize) -> Self {
        let n = problem.elements.len();
        let mut degree = vec![0u16; n];
        for &(a, b) in &problem.bonds {
            degree[a] += 1;
            degree[b] += 1;
        }
        let mut schedule: Vec<usize> = (0..problem.bonds.len()).collect();
        schedule.sort_by_key(|&i| {
            let (a, b) = problem.bonds[i];
            (a.max(b), a.min(b))
        });
        Self {
            problem,
            pass,
            budget,
            steps,
            hydrogens: problem.hydrogens.clone(),
            charges: vec![0; n],
            chosen: vec![0; problem.slots.len()],
            schedule,
            orders: vec![1; problem.bonds.len()],
            degree,
            sum: vec![0; n],
            remaining: vec![0; n],
            allowed: vec![Vec::new(); n],
        }
    }

    fn tick(&mut self) -> Result<(), InchiError> {
        self.steps += 1;
        if self.steps > self.budget {
            return Err(InchiError::SearchBudgetExhausted {
                budget: self.budget,
            });
        }
        Ok(())
    }

    fn place(&mut self, k: usize) -> Result<bool, InchiError> {
        let problem = self.problem;
        let Some(slot) = problem.slots.get(k) else {
            return self.assign_bonds();
        };
        let start = match k.checked_sub(1) {
            Some(prev) if problem.slots[prev].group == slot.group => {
                self.chosen[prev] + usize::from(slot.distinct)
            }
            _ => 0,
        };
        for pos in start..slot.candidates.len() {
            self.tick()?;
            let atom = slot.candidates[pos];
            if !self.apply(atom, slot.effect) {
                continue;
            }
            self.chosen[k] = pos;
            if self.place(k + 1)? {
                return Ok(true);
            }
            self.undo(atom, slot.effect);
        }
        Ok(false)
    }

    fn apply(&mut self, atom: usize, effect: Effect) -> bool {
        let h = self.hydrogens[atom];
        let q = self.charges[atom];
        let next = match effect {
            Effect::AddHydrogen => h.checked_add(1).map(|h| (h, q)),
            Effect::AddCharge(c) => q.checked_add(c).map(|q| (h, q)),
            Effect::RemoveProton => h.checked_sub(1).zip(q.checked_sub(1)),
            Effect::AddProton => h.checked_add(1).zip(q.checked_add(1)),
        };
        match next {
            Some((h, q)) => {
                self.hydrogens[atom] = h;
                self.charges[atom] = q;
                true
            }
            None => false,
        }
    }

    fn undo(&mut self, atom: usize, effect: Effect) {
        match effect {
            Effect::AddHydrogen => self.hydrogens[atom] -= 1,
            Effect::AddCharge(c) => self.charges[atom] -= c,
            Effect::RemoveProton => {
                self.hydrogens[atom] += 1;
                self.charges[atom] += 1;
            }
            Effect::AddProton => {
                self.hydrogens[atom] -= 1;
                self.charges[atom] -= 1;
            }
        }
    }

    fn assign_bonds(&mut self) -> Result<bool, InchiError> {
        let problem = self.problem;
        let separated = if self.pass.separate_charges {
            self.separate_charges()
        } else {
            Vec::new()
        };
        for (i, elem) in problem.elements.iter().enumerate() {
            self.allowed[i] = allowed_valences(elem.atomic_num(), self.charges[i]);
            if self.pass.valence == Valence::Lowest {
                self.allowed[i].truncate(1);
            }
            self.sum[i] = 0;
            self.remaining[i] = self.degree[i];
        }
        let found = (0..problem.elements.len()).all(|i| self.feasible(i)) && self.extend_bonds(0)?;
        if !found {
            for (n, o) in separated {
                self.charges[n] -= 1;
                self.charges[o] += 1;
            }
        }
        Ok(found)
    }

    /// Give each neutral nitrogen of an oxide pair a positive charge and
    /// its first bare neutral oxygen a negative one.
    fn separate_charges(&mut self) -> Vec<(usize, usize)> {
        let mut separated: Vec<(usize, usize)> = Vec::new();
        for &(n, o) in &self.problem.oxide_pairs {
            let free = |i: usize| self.charges[i] == 0 && self.hydrogens[i] == 0;
            if separated.last().is_some_and(|&(m, _)| m == n) || !free(n) || !free(o) {
                continue;
            }
            separated.push((n, o));
        }
        for &(n, o) in &separated {
            self.charges[n] += 1;
            self.charges[o] -= 1;
        }
        separated
    }

    fn extend_bonds(&mut self, k: usize) -> Result<bool, InchiError> {
        let Some(&bond) = self.schedule.get(k) else {
            return Ok(true);
        };
        let (a, b) = self.problem.bonds[bond];
        for order in self.pass.orders() {
            self.tick()?;
            self.sum[a] += order as u16;
            self.sum[b] += order as u16;
            self.remaining[a] -= 1;
            self.remaining[b] -= 1;
            if self.feasible(a) && self.feasible(b) {
                self.orders[bond] = order;
                if self.extend_bonds(k + 1)? {
                    return Ok(true);
                }
            }
            self.sum[a] -= order as u16;
            self.sum[b] -= order as u16;
            self.remaining[a] += 1;
            self.remaining[b] += 1;
        }
        Ok(false)
    }

    /// Whether atom `i` can still reach an acceptable valence with its
    /// unassigned bonds at order 1 to 3. Elements without a valence model
    /// accept anything.
    fn feasible(&self, i: usize) -> bool {
        let allowed = &self.allowed[i];
        let Some(&max) = allowed.last() else {
            return true;
        };
        let low = self.sum[i] + self.remaining[i] + self.hydrogens[i] as u16;
        match self.pass.valence {
            Valence::Unsaturated => low <= max as u16,
            Valence::Lowest | Valence::Any => {
                let high = low + 2 * self.remaining[i];
                allowed.iter().any(|&v| (low..=high).contains(&(v as u16)))
            }
        }
    }

    fn into_solution(self) -> Solution {
        let bonds = self
            .problem
            .bonds
            .iter()
            .zip(&self.orders)
            .map(|(&(a, b), &order)| (a, b, order))
            .collect();
        Solution {
            elements: self.problem.elements.clone(),
            hydrogens: self.hydrogens,
            charges: self.charges,
            bonds,
            steps: self.steps,
        }
    }
}
