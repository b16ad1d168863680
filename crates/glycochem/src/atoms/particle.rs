use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

use crate::{Charge, Charged, Massive, Particle};

use super::{
    atomic_database::{AtomicDatabase, ParticleDescription},
    errors::AtomicLookupError,
};

impl<'a> Particle<'a> {
    pub fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (symbol, ParticleDescription { name, mass, charge }) = db
            .particles
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::particle(symbol))?;
        Ok(Self {
            symbol,
            name,
            mass,
            charge,
        })
    }

    pub(crate) fn electron(db: &'a AtomicDatabase) -> Self {
        // SAFETY: Validation of the `AtomicDatabase` ensures that an electron is always present
        Self::new(db, "e").unwrap()
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

impl Display for Particle<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol;
        write!(f, "{symbol}")
    }
}

impl Massive for Particle<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        *self.mass
    }

    fn average_mass(&self) -> Decimal {
        *self.mass
    }
}

impl Charged for Particle<'_> {
    fn charge(&self) -> Charge {
        *self.charge
    }
}
