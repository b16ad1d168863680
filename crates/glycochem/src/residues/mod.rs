//! Residue types: the monosaccharides, substituents, and reducing ends that make up a composition

pub mod errors;
mod monosaccharide;
mod perderivatization;
pub mod residue_database;
mod substituent;

// Standard Library Imports
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

// External Crate Imports
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{Massive, Molecule};

pub(crate) use monosaccharide::MonosaccharideSkeleton;

// Residue Records =====================================================================================================

/// The fields shared by every kind of residue
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResidueInfo<'a> {
    pub(crate) name: String,
    pub(crate) synonyms: Vec<String>,
    pub(crate) description: String,
    pub(crate) formula: Option<Molecule<'a>>,
    pub(crate) monoisotopic_mass: Decimal,
    pub(crate) average_mass: Decimal,
    pub(crate) methylations: i32,
    pub(crate) acetylations: i32,
    pub(crate) linkages: i32,
    pub(crate) acid: bool,
}

impl<'a> ResidueInfo<'a> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synonyms: Vec::new(),
            description: String::new(),
            formula: None,
            monoisotopic_mass: Decimal::ZERO,
            average_mass: Decimal::ZERO,
            methylations: 1,
            acetylations: 1,
            linkages: 1,
            acid: false,
        }
    }

    pub(crate) fn with_formula(mut self, formula: Molecule<'a>) -> Self {
        self.monoisotopic_mass = formula.monoisotopic_mass();
        self.average_mass = formula.average_mass();
        self.formula = Some(formula);
        self
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Monosaccharide<'a> {
    info: ResidueInfo<'a>,
    carbons: u32,
    anomer: Anomer,
    anomeric_carbon: u32,
    ring_size: u32,
    modifications: Vec<CoreModification>,
    substituents: Vec<SubstituentSite<'a>>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Substituent<'a> {
    info: ResidueInfo<'a>,
    dropped_with_methylation: bool,
    dropped_with_acetylation: bool,
    reducing_end: bool,
}

/// An ad-hoc residue known only by its name and mass, like `Cer=547.5328`
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CustomSubstituent<'a> {
    info: ResidueInfo<'a>,
    reducing_end: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Perderivatization<'a> {
    name: String,
    description: String,
    formula: Molecule<'a>,
    kind: DerivatizationKind,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Anomer {
    Alpha,
    Beta,
    OpenChain,
    Unknown,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CoreModificationKind {
    Deoxy,
    Acid,
    Hydroxy,
    DoubleBond,
    Lacton,
    Anhydro,
}

/// A modification of the carbon backbone; positions below 1 are unknown
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CoreModification {
    pub kind: CoreModificationKind,
    pub position: i32,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SubstituentSite<'a> {
    pub substituent: Substituent<'a>,
    pub position: i32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DerivatizationKind {
    Methylation,
    Acetylation,
}

// ---------------------------------------------------------------------------------------------------------------------

/// Any residue that can be counted in a composition
#[derive(Clone, Debug)]
pub enum Residue<'a, 'r> {
    Monosaccharide(&'r Monosaccharide<'a>),
    Substituent(&'r Substituent<'a>),
    Custom(Arc<CustomSubstituent<'a>>),
}

// Residue Trait =======================================================================================================

pub trait ResidueType<'a>: Massive {
    fn info(&self) -> &ResidueInfo<'a>;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn synonyms(&self) -> &[String] {
        &self.info().synonyms
    }

    fn description(&self) -> &str {
        &self.info().description
    }

    fn formula(&self) -> Option<&Molecule<'a>> {
        self.info().formula.as_ref()
    }

    fn methylations(&self) -> i32 {
        self.info().methylations
    }

    fn acetylations(&self) -> i32 {
        self.info().acetylations
    }

    fn max_linkages(&self) -> i32 {
        self.info().linkages
    }

    fn is_acid(&self) -> bool {
        self.info().acid
    }

    /// The number of positions open to the given kind of perderivatization
    fn derivatization_sites(&self, kind: DerivatizationKind) -> i32 {
        match kind {
            DerivatizationKind::Methylation => self.methylations(),
            DerivatizationKind::Acetylation => self.acetylations(),
        }
    }
}

macro_rules! massive_residue_impls {
    ($($residue:ty),+ $(,)?) => {
        $(
            impl $crate::Massive for $residue {
                fn monoisotopic_mass(&self) -> rust_decimal::Decimal {
                    $crate::ResidueType::info(self).monoisotopic_mass
                }

                fn average_mass(&self) -> rust_decimal::Decimal {
                    $crate::ResidueType::info(self).average_mass
                }
            }
        )+
    };
}

pub(crate) use massive_residue_impls;

massive_residue_impls!(Residue<'_, '_>);

// Residues ============================================================================================================

impl<'a, 'r> Residue<'a, 'r> {
    #[must_use]
    pub const fn as_monosaccharide(&self) -> Option<&'r Monosaccharide<'a>> {
        if let Self::Monosaccharide(m) = self {
            Some(*m)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_monosaccharide(&self) -> bool {
        matches!(self, Self::Monosaccharide(_))
    }

    #[must_use]
    pub fn is_reducing_end(&self) -> bool {
        match self {
            Self::Monosaccharide(_) => false,
            Self::Substituent(s) => s.is_reducing_end(),
            Self::Custom(c) => c.is_reducing_end(),
        }
    }

    /// Substituents like O-acetyl groups are displaced by some perderivatizations
    #[must_use]
    pub fn is_dropped_with(&self, kind: DerivatizationKind) -> bool {
        match self {
            Self::Substituent(s) => s.is_dropped_with(kind),
            Self::Monosaccharide(_) | Self::Custom(_) => false,
        }
    }

    fn custom_mass(&self) -> Option<Decimal> {
        if let Self::Custom(c) = self {
            Some(c.monoisotopic_mass())
        } else {
            None
        }
    }

    fn identity(&self) -> (&str, Option<Decimal>) {
        (self.name(), self.custom_mass())
    }
}

impl<'a> ResidueType<'a> for Residue<'a, '_> {
    fn info(&self) -> &ResidueInfo<'a> {
        match self {
            Self::Monosaccharide(m) => m.info(),
            Self::Substituent(s) => s.info(),
            Self::Custom(c) => c.info(),
        }
    }
}

impl Display for Residue<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(c) => write!(f, "{c}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

// NOTE: Names are unique within a `ResidueDatabase`, so only custom residues need their mass to tell them apart
impl PartialEq for Residue<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Residue<'_, '_> {}

impl Ord for Residue<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl PartialOrd for Residue<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Residue<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<'a, 'r> From<&'r Monosaccharide<'a>> for Residue<'a, 'r> {
    fn from(value: &'r Monosaccharide<'a>) -> Self {
        Self::Monosaccharide(value)
    }
}

impl<'a, 'r> From<&'r Substituent<'a>> for Residue<'a, 'r> {
    fn from(value: &'r Substituent<'a>) -> Self {
        Self::Substituent(value)
    }
}

impl<'a> From<CustomSubstituent<'a>> for Residue<'a, '_> {
    fn from(value: CustomSubstituent<'a>) -> Self {
        Self::Custom(Arc::new(value))
    }
}

// Small Enumerations ==================================================================================================

impl Anomer {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Alpha => 'a',
            Self::Beta => 'b',
            Self::OpenChain => 'o',
            Self::Unknown => '?',
        }
    }
}

impl FromStr for Anomer {
    type Err = InvalidKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Self::Alpha),
            "b" => Ok(Self::Beta),
            "o" => Ok(Self::OpenChain),
            "x" | "?" => Ok(Self::Unknown),
            _ => Err(InvalidKeywordError::Anomer(s.to_owned())),
        }
    }
}

impl CoreModificationKind {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Deoxy => "d",
            Self::Acid => "a",
            Self::Hydroxy => "h",
            Self::DoubleBond => "u",
            Self::Lacton => "lac",
            Self::Anhydro => "an",
        }
    }

    /// The change in oxygen and hydrogen atoms relative to an unmodified carbon
    #[must_use]
    pub const fn offsets(self) -> (i64, i64) {
        match self {
            Self::Deoxy => (-1, 0),
            Self::Acid => (1, -2),
            Self::Hydroxy => (1, 0),
            Self::DoubleBond | Self::Lacton | Self::Anhydro => (-1, -2),
        }
    }

    /// Whether the modified carbon can no longer form a linkage
    pub(crate) const fn occupies_position(self) -> bool {
        matches!(self, Self::Deoxy | Self::Acid | Self::DoubleBond)
    }
}

impl FromStr for CoreModificationKind {
    type Err = InvalidKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Self::Deoxy),
            "a" => Ok(Self::Acid),
            "h" => Ok(Self::Hydroxy),
            "u" => Ok(Self::DoubleBond),
            "lac" => Ok(Self::Lacton),
            "an" => Ok(Self::Anhydro),
            _ => Err(InvalidKeywordError::CoreModification(s.to_owned())),
        }
    }
}

impl CoreModification {
    #[must_use]
    pub const fn new(kind: CoreModificationKind, position: i32) -> Self {
        Self { kind, position }
    }
}

impl Display for CoreModification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position, self.kind.symbol())
    }
}

impl FromStr for DerivatizationKind {
    type Err = InvalidKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "methylation" => Ok(Self::Methylation),
            "acetylation" => Ok(Self::Acetylation),
            _ => Err(InvalidKeywordError::Derivatization(s.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum InvalidKeywordError {
    #[diagnostic(help("anomers are one of \"a\", \"b\", \"o\" (open chain), or \"x\" (unknown)"))]
    #[error("{0:?} is not a valid anomer")]
    Anomer(String),

    #[diagnostic(help("core modifications are one of \"d\", \"a\", \"h\", \"u\", \"lac\", or \"an\""))]
    #[error("{0:?} is not a valid core modification")]
    CoreModification(String),

    #[diagnostic(help("perderivatizations are either \"methylation\" or \"acetylation\""))]
    #[error("{0:?} is not a valid kind of derivatization")]
    Derivatization(String),
}

// Module Tests ========================================================================================================
