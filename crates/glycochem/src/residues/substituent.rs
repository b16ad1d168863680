// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// External Crate Imports
use rust_decimal::{Decimal, RoundingStrategy};

// Local Crate Imports
use super::{
    CustomSubstituent, DerivatizationKind, ResidueInfo, ResidueType, Substituent,
    massive_residue_impls,
};

const CUSTOM_MASS_PLACES: u32 = 4;

impl<'a> Substituent<'a> {
    pub(crate) const fn new(
        info: ResidueInfo<'a>,
        dropped_with_methylation: bool,
        dropped_with_acetylation: bool,
        reducing_end: bool,
    ) -> Self {
        Self {
            info,
            dropped_with_methylation,
            dropped_with_acetylation,
            reducing_end,
        }
    }

    #[must_use]
    pub const fn is_dropped_with(&self, kind: DerivatizationKind) -> bool {
        match kind {
            DerivatizationKind::Methylation => self.dropped_with_methylation,
            DerivatizationKind::Acetylation => self.dropped_with_acetylation,
        }
    }

    #[must_use]
    pub const fn is_reducing_end(&self) -> bool {
        self.reducing_end
    }
}

impl<'a> ResidueType<'a> for Substituent<'a> {
    fn info(&self) -> &ResidueInfo<'a> {
        &self.info
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl CustomSubstituent<'_> {
    /// Masses are kept exactly, and only rounded (half-up, to four decimal places) when written out
    pub fn new(name: impl Into<String>, mass: Decimal, reducing_end: bool) -> Self {
        let mut info = ResidueInfo::new(name);
        info.monoisotopic_mass = mass;
        info.average_mass = mass;
        Self { info, reducing_end }
    }

    #[must_use]
    pub const fn is_reducing_end(&self) -> bool {
        self.reducing_end
    }
}

impl<'a> ResidueType<'a> for CustomSubstituent<'a> {
    fn info(&self) -> &ResidueInfo<'a> {
        &self.info
    }
}

impl Display for CustomSubstituent<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let places = CUSTOM_MASS_PLACES as usize;
        let mass = self
            .info
            .monoisotopic_mass
            .round_dp_with_strategy(CUSTOM_MASS_PLACES, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}={mass:.places$}", self.name())
    }
}

massive_residue_impls!(Substituent<'_>, CustomSubstituent<'_>);
