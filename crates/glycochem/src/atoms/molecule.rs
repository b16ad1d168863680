use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

use rust_decimal::Decimal;

use crate::{
    AtomicDatabase, Charge, Charged, Element, MassKind, Massive, Molecule, Particle, Result,
    errors::GlycochemError,
    parsers::molecule::molecule,
};

use nom_miette::final_parser;

/// Common adduct ions
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Adduct {
    Proton,
    Lithium,
    Sodium,
    Potassium,
}

impl Adduct {
    #[must_use]
    pub const fn formula(self) -> &'static str {
        match self {
            Self::Proton => "H+",
            Self::Lithium => "Li+",
            Self::Sodium => "Na+",
            Self::Potassium => "K+",
        }
    }
}

impl<'a> Molecule<'a> {
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(molecule(db));
        parser(formula.as_ref()).map_err(|e| Box::new(GlycochemError::from(e)))
    }

    #[must_use]
    pub fn empty(db: &'a AtomicDatabase) -> Self {
        Self {
            atoms: BTreeMap::new(),
            charge: Charge::default(),
            electron: Particle::electron(db),
        }
    }

    pub fn water(db: &'a AtomicDatabase) -> Result<Self> {
        Self::new(db, "H2O")
    }

    pub fn hydrogen_molecule(db: &'a AtomicDatabase) -> Result<Self> {
        Self::new(db, "H2")
    }

    pub fn hydrogen(db: &'a AtomicDatabase) -> Result<Self> {
        Self::new(db, "H")
    }

    pub fn adduct(db: &'a AtomicDatabase, adduct: Adduct) -> Result<Self> {
        Self::new(db, adduct.formula())
    }

    pub fn add_element(&mut self, element: Element<'a>, count: i64) {
        let entry = self.atoms.entry(element).or_default();
        *entry += count;
        if *entry == 0 {
            self.atoms.remove(&element);
        }
    }

    pub fn remove_element(&mut self, element: Element<'a>, count: i64) {
        self.add_element(element, -count);
    }

    /// Adds `times` copies of `other`, including its charge
    pub fn add(&mut self, other: &Self, times: i64) {
        for (&element, &count) in &other.atoms {
            self.add_element(element, count * times);
        }
        self.charge = Charge(self.charge.0 + other.charge.0 * times);
    }

    pub fn remove(&mut self, other: &Self, times: i64) {
        self.add(other, -times);
    }

    pub(crate) fn adjust_charge(&mut self, delta: i64) {
        self.charge = Charge(self.charge.0 + delta);
    }

    #[must_use]
    pub fn count(&self, element: &Element<'a>) -> i64 {
        self.atoms.get(element).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.charge == Charge::default()
    }

    /// The mass-to-charge ratio, or just the mass for uncharged molecules
    #[must_use]
    pub fn mz(&self, kind: MassKind) -> Decimal {
        let mass = self.mass(kind);
        let charge = Decimal::from(self.charge).abs();
        if charge.is_zero() { mass } else { mass / charge }
    }

    fn electron_offset(&self, electron_mass: Decimal) -> Decimal {
        Decimal::from(self.charge) * electron_mass
    }
}

impl Display for Molecule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (element, &count) in &self.atoms {
            write!(f, "{}", element.symbol())?;
            if count != 1 {
                write!(f, "{count}")?;
            }
            if let Some(mass_number) = element.mass_number() {
                write!(f, "^{mass_number}")?;
            }
        }
        let sign = if self.charge.0 > 0 { "+" } else { "-" };
        write!(f, "{}", sign.repeat(self.charge.0.unsigned_abs() as usize))
    }
}

impl PartialEq for Molecule<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.atoms == other.atoms && self.charge == other.charge
    }
}

impl Eq for Molecule<'_> {}

impl Hash for Molecule<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.atoms.hash(state);
        self.charge.hash(state);
    }
}

// NOTE: Every unit of positive charge is a missing electron, and every unit of negative charge an extra one
impl Massive for Molecule<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        let atoms: Decimal = self
            .atoms
            .iter()
            .map(|(e, &n)| e.monoisotopic_mass() * Decimal::from(n))
            .sum();
        atoms - self.electron_offset(self.electron.monoisotopic_mass())
    }

    fn average_mass(&self) -> Decimal {
        let atoms: Decimal = self
            .atoms
            .iter()
            .map(|(e, &n)| e.average_mass() * Decimal::from(n))
            .sum();
        atoms - self.electron_offset(self.electron.average_mass())
    }
}

impl Charged for Molecule<'_> {
    fn charge(&self) -> Charge {
        self.charge
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::{Mz, testing_tools::assert_miette_contains};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    #[test]
    fn parse_simple_formulas() {
        let water = Molecule::new(&DB, "H2O").unwrap();
        assert_eq!(water.to_string(), "H2O");
        assert_eq!(water.monoisotopic_mass(), dec!(18.01056468403));
        let hex = Molecule::new(&DB, "C6H12O6").unwrap();
        assert_eq!(hex.monoisotopic_mass(), dec!(180.06338810418));
        let hexnac = Molecule::new(&DB, "C8H15NO6").unwrap();
        assert_eq!(hexnac.monoisotopic_mass(), dec!(221.08993720530));
        // Element order is canonical, not the order written
        let acetyl = Molecule::new(&DB, "OC2H3").unwrap();
        assert_eq!(acetyl.to_string(), "C2H3O");
    }

    #[test]
    fn repeated_elements_accumulate() {
        let ethane = Molecule::new(&DB, "CH3CH3").unwrap();
        assert_eq!(ethane.to_string(), "C2H6");
        assert_eq!(ethane, Molecule::new(&DB, "C2H6").unwrap());
    }

    #[test]
    fn empty_and_negated_formulas() {
        let nothing = Molecule::new(&DB, "0").unwrap();
        assert!(nothing.is_empty());
        assert_eq!(nothing.to_string(), "");
        assert_eq!(nothing.monoisotopic_mass(), dec!(0));

        let minus_water = Molecule::new(&DB, "-H2O").unwrap();
        assert_eq!(minus_water.to_string(), "H-2O-1");
        assert_eq!(minus_water.monoisotopic_mass(), dec!(-18.01056468403));
    }

    #[test]
    fn isotopes_and_deuterium() {
        let heavy_methyl = Molecule::new(&DB, "C^13H3").unwrap();
        assert_eq!(heavy_methyl.to_string(), "C^13H3");
        assert_eq!(heavy_methyl.monoisotopic_mass(), dec!(16.02682993176));
        let labelled = Molecule::new(&DB, "C2^13H4").unwrap();
        assert_eq!(labelled.to_string(), "C2^13H4");
        let cd3 = Molecule::new(&DB, "CD3").unwrap();
        assert_eq!(cd3.monoisotopic_mass(), dec!(18.04230533436));
    }

    #[test]
    fn charges() {
        let sodium = Molecule::adduct(&DB, Adduct::Sodium).unwrap();
        assert_eq!(sodium.to_string(), "Na+");
        assert_eq!(sodium.charge(), Charge(1));
        assert_eq!(
            sodium.monoisotopic_mass(),
            dec!(22.9897692820) - dec!(0.000548579909065)
        );
        let proton = Molecule::adduct(&DB, Adduct::Proton).unwrap();
        assert_eq!(proton.monoisotopic_mass(), dec!(1.007276452320935));

        let chloride = Molecule::new(&DB, "Cl-").unwrap();
        assert_eq!(chloride.charge(), Charge(-1));
        assert_eq!(
            chloride.monoisotopic_mass(),
            dec!(34.968852682) + dec!(0.000548579909065)
        );

        let doubly = Molecule::new(&DB, "C6H14O6++").unwrap();
        assert_eq!(doubly.to_string(), "C6H14O6++");
        assert_eq!(doubly.mz(MassKind::Monoisotopic), doubly.monoisotopic_mass() / dec!(2));
        assert_eq!(doubly.monoisotopic_mz(), Some(doubly.monoisotopic_mass() / dec!(2)));
    }

    #[test]
    fn uncharged_mz() {
        let water = Molecule::water(&DB).unwrap();
        assert_eq!(water.mz(MassKind::Monoisotopic), water.monoisotopic_mass());
        assert_eq!(water.monoisotopic_mz(), None);
        assert_eq!(water.average_mz(), None);
    }

    #[test]
    fn molecule_arithmetic() {
        let mut hex = Molecule::new(&DB, "C6H12O6").unwrap();
        let water = Molecule::water(&DB).unwrap();
        hex.remove(&water, 1);
        assert_eq!(hex.to_string(), "C6H10O5");
        hex.add(&Molecule::adduct(&DB, Adduct::Sodium).unwrap(), 2);
        assert_eq!(hex.to_string(), "C6H10Na2O5++");

        let oxygen = Element::new(&DB, "O").unwrap();
        let mut molecule = Molecule::hydrogen_molecule(&DB).unwrap();
        molecule.add_element(oxygen, 2);
        assert_eq!(molecule.count(&oxygen), 2);
        molecule.remove_element(oxygen, 2);
        assert_eq!(molecule.count(&oxygen), 0);
        assert_eq!(molecule, Molecule::new(&DB, "H2").unwrap());
    }

    #[test]
    fn average_masses() {
        let water = Molecule::water(&DB).unwrap();
        assert_eq!(water.average_mass(), dec!(18.01528643242983260));
    }

    #[test]
    fn invalid_formulas() {
        assert_miette_contains!(Molecule::new(&DB, "H2O?"), "could not interpret the full input");
        assert_miette_contains!(
            Molecule::new(&DB, "Xy2"),
            "the element \"Xy\" could not be found"
        );
        assert_miette_contains!(Molecule::new(&DB, "C^15"), "the isotope \"C-15\"");
        assert_miette_contains!(Molecule::new(&DB, "H02"), "counts cannot start with 0");
        assert!(Molecule::new(&DB, "").is_err());
        assert!(Molecule::new(&DB, "h2o").is_err());
    }
}
