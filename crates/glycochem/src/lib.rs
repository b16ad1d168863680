//! Chemically validated glycan compositions, residue types, and their fragments

pub mod atoms;
pub mod composition;
pub mod errors;
pub mod fragments;
pub mod generation;
mod kdl;
pub mod parsers;
pub mod residues;
#[cfg(test)]
mod testing_tools;

use std::{collections::BTreeMap, num::NonZeroU32};

// External Crate Imports
use ahash::HashMap;
use derive_more::{Display, From, Into};
use rust_decimal::Decimal;
use serde::Serialize;

pub use atoms::{Adduct, atomic_database::AtomicDatabase};
pub use composition::{Composition, FragmentExtension, MassKind, MassOptions};
pub use errors::{GlycochemError, Result};
pub use fragments::{
    CleavageKind, CrossRingFragment, FragmentType, GlycosidicFragment,
    fragment_dictionary::FragmentDictionary,
};
pub use residues::{
    Anomer, CoreModification, CoreModificationKind, CustomSubstituent, DerivatizationKind,
    Monosaccharide, Perderivatization, Residue, ResidueInfo, ResidueType, Substituent,
    SubstituentSite, residue_database::ResidueDatabase,
};

// NOTE: For the types in this crate, 'a lifetimes indicate references to the AtomicDatabase, whilst 'r lifetimes
// indicate references to the ResidueDatabase

// Atoms ===============================================================================================================

#[derive(Copy, Clone, Debug)]
pub struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    mass_number: Option<MassNumber>,
    isotopes: &'a HashMap<MassNumber, Isotope>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Particle<'a> {
    symbol: &'a str,
    name: &'a str,
    mass: &'a Decimal,
    charge: &'a Charge,
}

/// A sorted multiset of (optionally isotopically pinned) elements, plus a net charge
#[derive(Clone, Debug)]
pub struct Molecule<'a> {
    atoms: BTreeMap<Element<'a>, i64>,
    charge: Charge,
    electron: Particle<'a>,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize)]
pub struct MassNumber(NonZeroU32);

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct Isotope {
    relative_mass: Decimal,
    abundance: Option<Decimal>,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Serialize,
)]
pub struct Charge(i64);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct Count(NonZeroU32);

// Traits ==============================================================================================================

pub trait Massive {
    fn monoisotopic_mass(&self) -> Decimal;
    fn average_mass(&self) -> Decimal;

    fn mass(&self, kind: MassKind) -> Decimal {
        match kind {
            MassKind::Monoisotopic => self.monoisotopic_mass(),
            MassKind::Average => self.average_mass(),
        }
    }
}

pub trait Charged {
    fn charge(&self) -> Charge;
}

pub trait Mz: Massive + Charged {
    fn monoisotopic_mz(&self) -> Option<Decimal> {
        let charge = Decimal::from(self.charge()).abs();
        (!charge.is_zero()).then(|| self.monoisotopic_mass() / charge)
    }

    fn average_mz(&self) -> Option<Decimal> {
        let charge = Decimal::from(self.charge()).abs();
        (!charge.is_zero()).then(|| self.average_mass() / charge)
    }
}

// Blanket impls

macro_rules! massive_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Massive> Massive for $ref_type {
                fn monoisotopic_mass(&self) -> Decimal {
                    (**self).monoisotopic_mass()
                }

                fn average_mass(&self) -> Decimal {
                    (**self).average_mass()
                }
            }
        )+
    };
}

massive_ref_impls!(&T, &mut T, Box<T>);

macro_rules! charged_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Charged> Charged for $ref_type {
                fn charge(&self) -> Charge {
                    (**self).charge()
                }
            }
        )+
    };
}

charged_ref_impls!(&T, &mut T, Box<T>);

impl<T: Massive + Charged> Mz for T {}

impl From<Charge> for Decimal {
    fn from(value: Charge) -> Self {
        Self::from(value.0)
    }
}
