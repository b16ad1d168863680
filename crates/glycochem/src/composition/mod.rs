//! Glycan compositions: counted residues, an optional reducing end, and (for fragments) cleaved residues

mod fragment;
mod mass;

// Standard Library Imports
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

// External Crate Imports
use itertools::Itertools;
use nom_miette::final_parser;

// Local Crate Imports
use crate::{
    FragmentType, GlycochemError, Perderivatization, Residue, ResidueDatabase, ResidueType, Result,
    parsers::composition::{composition, fragment_composition},
};

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum MassKind {
    #[default]
    Monoisotopic,
    Average,
}

/// How the mass of a composition is calculated
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct MassOptions<'a, 'r> {
    pub kind: MassKind,
    pub perderivatization: Option<&'r Perderivatization<'a>>,
}

/// A multiset of residues, optionally capped by a reducing end
///
/// Compositions carrying a [`FragmentExtension`] are fragments: some of their monosaccharides have been cleaved
/// into leaf fragments, and the reducing end may have been replaced by a root fragment.
#[derive(Clone, Debug)]
pub struct Composition<'a, 'r> {
    db: &'r ResidueDatabase<'a>,
    residues: BTreeMap<Residue<'a, 'r>, u32>,
    reducing_end: Option<Residue<'a, 'r>>,
    mass_options: MassOptions<'a, 'r>,
    fragments: Option<FragmentExtension<'a, 'r>>,
}

/// The cleaved residues of a fragment composition
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FragmentExtension<'a, 'r> {
    leaves: BTreeMap<FragmentType<'a, 'r>, u32>,
    root: Option<FragmentType<'a, 'r>>,
}

impl<'a, 'r> Composition<'a, 'r> {
    /// Parses composition text, like `Hex:3,HexNAc:2--redEnd`, or fragment text containing `#`
    pub fn new(db: &'r ResidueDatabase<'a>, text: impl AsRef<str>) -> Result<Self> {
        let text = text.as_ref();
        let parsed = if text.contains('#') {
            final_parser(fragment_composition(db))(text)
        } else {
            final_parser(composition(db))(text)
        };
        parsed.map_err(|e| Box::new(GlycochemError::from(e)))
    }

    #[must_use]
    pub fn empty(db: &'r ResidueDatabase<'a>) -> Self {
        Self {
            db,
            residues: BTreeMap::new(),
            reducing_end: None,
            mass_options: MassOptions::default(),
            fragments: None,
        }
    }

    #[must_use]
    pub fn empty_fragment(db: &'r ResidueDatabase<'a>) -> Self {
        let mut composition = Self::empty(db);
        composition.fragments = Some(FragmentExtension::default());
        composition
    }

    /// A copy of this composition that can hold fragments
    #[must_use]
    pub fn to_fragment(&self) -> Self {
        let mut fragment = self.clone();
        fragment.fragments.get_or_insert_with(FragmentExtension::default);
        fragment
    }

    #[must_use]
    pub const fn db(&self) -> &'r ResidueDatabase<'a> {
        self.db
    }

    /// Offsets the count of a residue, failing without change if the count would become negative
    pub fn add_residues(&mut self, residue: Residue<'a, 'r>, delta: i64) -> bool {
        offset_count(&mut self.residues, residue, delta)
    }

    pub fn add_residue(&mut self, residue: Residue<'a, 'r>) -> bool {
        self.add_residues(residue, 1)
    }

    /// Only residues able to cap the reducing end are accepted; setting one clears any root fragment
    pub fn set_reducing_end(&mut self, reducing_end: Option<Residue<'a, 'r>>) -> bool {
        if reducing_end.as_ref().is_some_and(|r| !r.is_reducing_end()) {
            return false;
        }
        if reducing_end.is_some() {
            if let Some(fragments) = &mut self.fragments {
                fragments.root = None;
            }
        }
        self.reducing_end = reducing_end;
        true
    }

    #[must_use]
    pub const fn reducing_end(&self) -> Option<&Residue<'a, 'r>> {
        self.reducing_end.as_ref()
    }

    pub fn set_mass_options(&mut self, mass_options: MassOptions<'a, 'r>) {
        self.mass_options = mass_options;
    }

    #[must_use]
    pub const fn mass_options(&self) -> MassOptions<'a, 'r> {
        self.mass_options
    }

    pub fn residues(&self) -> impl Iterator<Item = (&Residue<'a, 'r>, u32)> {
        self.residues.iter().map(|(r, &n)| (r, n))
    }

    #[must_use]
    pub fn count(&self, residue: &Residue) -> u32 {
        self.residues.get(residue).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn residue_count(&self) -> u32 {
        self.residues.values().sum()
    }

    #[must_use]
    pub fn monosaccharide_count(&self) -> u32 {
        self.residues
            .iter()
            .filter(|(r, _)| r.is_monosaccharide())
            .map(|(_, &n)| n)
            .sum()
    }

    /// Every non-monosaccharide residue, custom residues included
    #[must_use]
    pub fn substituent_count(&self) -> u32 {
        self.residue_count() - self.monosaccharide_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty() && self.reducing_end.is_none()
    }

    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        self.fragments.is_some()
    }

    #[must_use]
    pub const fn fragments(&self) -> Option<&FragmentExtension<'a, 'r>> {
        self.fragments.as_ref()
    }

    /// The number of free linkage positions left once every residue is bonded into a single tree
    #[must_use]
    pub fn max_linkages(&self) -> i32 {
        let mut units = 0;
        let mut linkages = 0;
        for (residue, &n) in &self.residues {
            units += signed(n);
            linkages += signed(n) * residue.max_linkages();
        }
        if let Some(reducing_end) = &self.reducing_end {
            units += 1;
            linkages += reducing_end.max_linkages();
        }
        if units > 1 {
            linkages -= units - 1;
        }

        match &self.fragments {
            Some(fragments) => fragments.max_linkages(linkages),
            None => linkages,
        }
    }

    /// Whether the residues could be connected into a single tree
    #[must_use]
    pub fn is_valid_structure(&self) -> bool {
        if self.monosaccharide_count() == 0 {
            let Some(fragments) = &self.fragments else {
                return false;
            };
            if !fragments.can_stand_alone(self.reducing_end.as_ref()) {
                return false;
            }
        }
        self.max_linkages() >= 0
    }

    // NOTE: Monosaccharides come before substituents, and custom residues count as substituents
    fn core_string(&self) -> String {
        let (monosaccharides, substituents): (Vec<_>, Vec<_>) =
            self.residues.iter().partition(|(r, _)| r.is_monosaccharide());
        let mut core = monosaccharides
            .into_iter()
            .chain(substituents)
            .map(|(residue, n)| format!("{residue}:{n}"))
            .join(",");

        if let Some(reducing_end) = &self.reducing_end {
            if !core.is_empty() {
                core.push_str("--");
            }
            core.push_str(&reducing_end.to_string());
        }
        core
    }
}

impl Display for Composition<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let core = self.core_string();
        let Some(fragments) = &self.fragments else {
            return write!(f, "{core}");
        };

        let leaves = fragments.leaves.iter().map(|(t, n)| format!("{t}:{n}")).join(",");
        write!(f, "{leaves}")?;
        if !leaves.is_empty() && !core.is_empty() {
            write!(f, "--")?;
        }
        write!(f, "{core}")?;
        if let Some(root) = &fragments.root {
            write!(f, "--{root}")?;
        }
        Ok(())
    }
}

// NOTE: Structural equality is the equality of canonical strings, mass options are not compared
impl PartialEq for Composition<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Composition<'_, '_> {}

impl Hash for Composition<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

// Private Helpers =====================================================================================================

pub(crate) fn offset_count<K: Ord>(counts: &mut BTreeMap<K, u32>, key: K, delta: i64) -> bool {
    let current = i64::from(counts.get(&key).copied().unwrap_or_default());
    let Some(updated) = current.checked_add(delta).and_then(|n| u32::try_from(n).ok()) else {
        return false;
    };

    if updated == 0 {
        counts.remove(&key);
    } else {
        counts.insert(key, updated);
    }
    true
}

pub(crate) fn signed(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// Module Tests ========================================================================================================
