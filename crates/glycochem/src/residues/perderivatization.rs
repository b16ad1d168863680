use rust_decimal::Decimal;

use super::{DerivatizationKind, Perderivatization};
use crate::{Massive, Molecule};

impl<'a> Perderivatization<'a> {
    pub(crate) const fn new(
        name: String,
        description: String,
        formula: Molecule<'a>,
        kind: DerivatizationKind,
    ) -> Self {
        Self {
            name,
            description,
            formula,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The group that replaces a hydrogen at every derivatized site
    #[must_use]
    pub const fn formula(&self) -> &Molecule<'a> {
        &self.formula
    }

    #[must_use]
    pub const fn kind(&self) -> DerivatizationKind {
        self.kind
    }
}

impl Massive for Perderivatization<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.formula.monoisotopic_mass()
    }

    fn average_mass(&self) -> Decimal {
        self.formula.average_mass()
    }
}
