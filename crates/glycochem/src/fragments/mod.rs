//! Glycosidic and cross-ring fragment types, and the cleavages that produce them

mod cross_ring;
pub mod fragment_dictionary;

// Standard Library Imports
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

// Local Crate Imports
use crate::{
    AtomicDatabase, Monosaccharide, Molecule, ResidueInfo, ResidueType, Result,
    residues::massive_residue_impls,
};

pub(crate) use cross_ring::can_cleave;

// Public API ==========================================================================================================

/// The six ways a glycan can be cleaved, in Domon-Costello notation
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CleavageKind {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

/// A cleavage between two residues, which leaves no trace of the monosaccharide it cut from
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GlycosidicFragment<'a> {
    info: ResidueInfo<'a>,
    kind: CleavageKind,
}

/// The part of a monosaccharide left behind when two bonds of its ring are broken
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CrossRingFragment<'a> {
    monosaccharide: Monosaccharide<'a>,
    parent: String,
    kind: CleavageKind,
    start: u32,
    end: u32,
}

#[derive(Copy, Clone, Debug)]
pub enum FragmentType<'a, 'r> {
    Glycosidic(&'r GlycosidicFragment<'a>),
    CrossRing(&'r CrossRingFragment<'a>),
}

// Cleavage Kinds ======================================================================================================

impl CleavageKind {
    pub const ALL: [Self; 6] = [Self::A, Self::B, Self::C, Self::X, Self::Y, Self::Z];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }

    #[must_use]
    pub const fn is_cross_ring(self) -> bool {
        matches!(self, Self::A | Self::X)
    }

    /// Whether the fragment keeps the reducing end of the cleaved residue
    #[must_use]
    pub const fn is_root_side(self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }

    /// Whether the glycosidic oxygen stays with this fragment
    #[must_use]
    pub const fn retains_oxygen(self) -> bool {
        matches!(self, Self::C | Self::Y)
    }
}

impl Display for CleavageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol().to_ascii_uppercase())
    }
}

// Glycosidic Fragments ================================================================================================

impl<'a> GlycosidicFragment<'a> {
    pub(crate) fn new(db: &'a AtomicDatabase, kind: CleavageKind) -> Result<Self> {
        let formula = if kind.retains_oxygen() {
            Molecule::water(db)?
        } else {
            Molecule::hydrogen_molecule(db)?
        };
        let mut info = ResidueInfo::new(format!("Sugar#{}", kind.symbol())).with_formula(formula);
        info.description = format!("{kind} cleavage of a monosaccharide");
        Ok(Self { info, kind })
    }

    #[must_use]
    pub const fn kind(&self) -> CleavageKind {
        self.kind
    }
}

impl<'a> ResidueType<'a> for GlycosidicFragment<'a> {
    fn info(&self) -> &ResidueInfo<'a> {
        &self.info
    }
}

// Cross-Ring Fragments ================================================================================================

impl<'a> CrossRingFragment<'a> {
    #[must_use]
    pub const fn kind(&self) -> CleavageKind {
        self.kind
    }

    /// The name of the monosaccharide this fragment was cleaved from
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// The first ring bond broken, counted from the ring oxygen
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// The truncated monosaccharide that makes up this fragment
    #[must_use]
    pub const fn monosaccharide(&self) -> &Monosaccharide<'a> {
        &self.monosaccharide
    }
}

impl<'a> ResidueType<'a> for CrossRingFragment<'a> {
    fn info(&self) -> &ResidueInfo<'a> {
        self.monosaccharide.info()
    }
}

massive_residue_impls!(
    GlycosidicFragment<'_>,
    CrossRingFragment<'_>,
    FragmentType<'_, '_>
);

// Fragment Types ======================================================================================================

impl FragmentType<'_, '_> {
    #[must_use]
    pub const fn kind(&self) -> CleavageKind {
        match self {
            Self::Glycosidic(g) => g.kind,
            Self::CrossRing(c) => c.kind,
        }
    }

    #[must_use]
    pub const fn is_cross_ring(&self) -> bool {
        self.kind().is_cross_ring()
    }

    #[must_use]
    pub const fn is_root_side(&self) -> bool {
        self.kind().is_root_side()
    }

    /// A short label like `Y` or `A_0_2_{Hex}`, as used when naming fragment ions
    #[must_use]
    pub fn label(&self) -> String {
        let symbol = self.kind();
        match self {
            Self::Glycosidic(_) => symbol.to_string(),
            Self::CrossRing(c) => format!("{symbol}_{}_{}_{{{}}}", c.start, c.end, c.parent),
        }
    }
}

impl<'a> ResidueType<'a> for FragmentType<'a, '_> {
    fn info(&self) -> &ResidueInfo<'a> {
        match self {
            Self::Glycosidic(g) => g.info(),
            Self::CrossRing(c) => c.info(),
        }
    }
}

impl Display for FragmentType<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl PartialEq for FragmentType<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for FragmentType<'_, '_> {}

impl Ord for FragmentType<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl PartialOrd for FragmentType<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for FragmentType<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

// Module Tests ========================================================================================================
