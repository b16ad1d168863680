use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

use rust_decimal::Decimal;

use crate::{Element, Isotope, MassNumber, Massive};

use super::{
    atomic_database::{AtomicDatabase, ElementDescription},
    errors::AtomicLookupError,
};

impl<'a> Element<'a> {
    pub fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, None)
    }

    pub fn new_isotope(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: MassNumber,
    ) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, Some(mass_number))
    }

    fn lookup(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: Option<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (symbol, ElementDescription { name, isotopes }) = db
            .elements
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::element(symbol))?;

        let element = Self {
            symbol,
            name,
            mass_number,
            isotopes,
        };

        Self::validate_isotopes(element)
    }

    fn validate_isotopes(
        element @ Self {
            symbol,
            name,
            mass_number,
            isotopes,
        }: Self,
    ) -> Result<Self, AtomicLookupError> {
        if let Some(mass_number) = mass_number {
            if !isotopes.contains_key(&mass_number) {
                return Err(AtomicLookupError::isotope(
                    symbol,
                    mass_number,
                    name,
                    isotopes,
                ));
            }
        } else if !isotopes.values().any(|i| i.abundance.is_some()) {
            return Err(AtomicLookupError::abundance(name, symbol, isotopes));
        }

        Ok(element)
    }

    #[must_use]
    pub const fn symbol(&self) -> &'a str {
        self.symbol
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub const fn mass_number(&self) -> Option<MassNumber> {
        self.mass_number
    }

    fn isotope_mass(&self) -> Option<Decimal> {
        self.mass_number
            .and_then(|a| self.isotopes.get(&a))
            .map(|i| i.relative_mass)
    }

    fn isotope_abundances(&self) -> impl Iterator<Item = &Isotope> {
        self.isotopes.values().filter(|i| i.abundance.is_some())
    }
}

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol;
        if let Some(mass_number) = self.mass_number {
            write!(f, "{symbol}^{mass_number}")
        } else {
            write!(f, "{symbol}")
        }
    }
}

// NOTE: Elements borrow their isotope tables, so identity is just the symbol and the (optionally) pinned isotope
impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.mass_number == other.mass_number
    }
}

impl Eq for Element<'_> {}

impl Ord for Element<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.symbol, self.mass_number).cmp(&(other.symbol, other.mass_number))
    }
}

impl PartialOrd for Element<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Element<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
        self.mass_number.hash(state);
    }
}

impl Massive for Element<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        // SAFETY: The call to `.unwrap()` is safe here since `.validate_isotopes()` guarantees that
        // `.isotope_abundances()` yields at least one isotope when no isotope is pinned
        self.isotope_mass().unwrap_or_else(|| {
            self.isotope_abundances()
                .max_by_key(|i| i.abundance)
                .unwrap()
                .relative_mass
        })
    }

    fn average_mass(&self) -> Decimal {
        // SAFETY: The call to `.unwrap()` is safe here since `.isotope_abundances()` is guaranteed to yield
        // only isotopes containing natural abundance data
        self.isotope_mass().unwrap_or_else(|| {
            self.isotope_abundances()
                .map(|i| i.relative_mass * i.abundance.unwrap())
                .sum()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::testing_tools::assert_miette_contains;

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);

    fn mass_number(a: u32) -> MassNumber {
        MassNumber(NonZeroU32::new(a).unwrap())
    }

    #[test]
    fn new_element() {
        // Sucessfully lookup elements that exist
        let c = Element::new(&DB, "C").unwrap();
        assert_eq!(c.symbol(), "C");
        assert_eq!(c.name(), "Carbon");
        assert_eq!(c.mass_number(), None);
        assert_eq!(c.isotopes.len(), 3);
        // Fail to lookup elements that don't exist
        assert_miette_contains!(
            Element::new(&DB, "R"),
            "the element \"R\" could not be found in the supplied atomic database"
        );
    }

    #[test]
    fn new_isotope() {
        // Sucessfully lookup isotopes that exist
        let c13 = Element::new_isotope(&DB, "C", mass_number(13)).unwrap();
        assert_eq!(c13.symbol(), "C");
        assert_eq!(c13.name(), "Carbon");
        assert_eq!(c13.mass_number(), Some(mass_number(13)));
        // Fail to lookup isotopes for elements that don't exist
        assert_miette_contains!(
            Element::new_isotope(&DB, "R", mass_number(42)),
            "the element \"R\""
        );
        // Fail to lookup isotopes that don't exist
        assert_miette_contains!(
            Element::new_isotope(&DB, "C", mass_number(15)),
            "the isotope \"C-15\"",
            "[12, 13, 14]"
        );
    }

    #[test]
    fn element_display() {
        let c = Element::new(&DB, "C").unwrap();
        assert_eq!(c.to_string(), "C");
        let c13 = Element::new_isotope(&DB, "C", mass_number(13)).unwrap();
        assert_eq!(c13.to_string(), "C^13");
        let tc99 = Element::new_isotope(&DB, "Tc", mass_number(99)).unwrap();
        assert_eq!(tc99.to_string(), "Tc^99");
    }

    #[test]
    fn element_ordering() {
        let c = Element::new(&DB, "C").unwrap();
        let c13 = Element::new_isotope(&DB, "C", mass_number(13)).unwrap();
        let cl = Element::new(&DB, "Cl").unwrap();
        let h = Element::new(&DB, "H").unwrap();
        let mut elements = vec![h, cl, c13, c];
        elements.sort();
        assert_eq!(elements, vec![c, c13, cl, h]);
    }

    #[test]
    fn element_monoisotopic_mass() {
        // Successfully calculate the monoisotopic mass of elements with natural abundances
        let c = Element::new(&DB, "C").unwrap().monoisotopic_mass();
        assert_eq!(c, dec!(12));
        let o = Element::new(&DB, "O").unwrap().monoisotopic_mass();
        assert_eq!(o, dec!(15.99491461957));
        let li = Element::new(&DB, "Li").unwrap().monoisotopic_mass();
        assert_eq!(li, dec!(7.0160034366));
        // Fail to construct elements without natural abundances
        assert_miette_contains!(
            Element::new(&DB, "Tc"),
            "no natural abundance data could be found for Technetium (Tc)",
            "Tc^97"
        );
    }

    #[test]
    fn element_average_mass() {
        let c = Element::new(&DB, "C").unwrap().average_mass();
        assert_eq!(c, dec!(12.010735896735249));
        let cl = Element::new(&DB, "Cl").unwrap().average_mass();
        assert_eq!(cl, dec!(35.452937582608));
    }

    #[test]
    fn isotope_masses() {
        // Get masses for an element with natural abundances
        let c13 = Element::new_isotope(&DB, "C", mass_number(13)).unwrap();
        assert_eq!(c13.monoisotopic_mass(), dec!(13.00335483507));
        assert_eq!(c13.average_mass(), dec!(13.00335483507));
        // Get masses for an element without natural abundances
        let tc99 = Element::new_isotope(&DB, "Tc", mass_number(99)).unwrap();
        assert_eq!(tc99.monoisotopic_mass(), dec!(98.9062508));
        assert_eq!(tc99.average_mass(), dec!(98.9062508));
    }
}
