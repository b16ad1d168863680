// Standard Library Imports
use std::collections::BTreeSet;

// Local Crate Imports
use super::{
    Anomer, CoreModification, CoreModificationKind, Monosaccharide, ResidueInfo, ResidueType,
    SubstituentSite, massive_residue_impls,
};
use crate::{AtomicDatabase, DerivatizationKind, Molecule, Result};

// Public API ==========================================================================================================

impl<'a> Monosaccharide<'a> {
    #[must_use]
    pub const fn carbons(&self) -> u32 {
        self.carbons
    }

    #[must_use]
    pub const fn anomer(&self) -> Anomer {
        self.anomer
    }

    #[must_use]
    pub const fn anomeric_carbon(&self) -> u32 {
        self.anomeric_carbon
    }

    #[must_use]
    pub const fn ring_size(&self) -> u32 {
        self.ring_size
    }

    /// The carbon whose oxygen closes the ring
    #[must_use]
    pub const fn ring_closure(&self) -> u32 {
        (self.anomeric_carbon + self.ring_size).saturating_sub(2)
    }

    #[must_use]
    pub fn modifications(&self) -> &[CoreModification] {
        &self.modifications
    }

    #[must_use]
    pub fn substituents(&self) -> &[SubstituentSite<'a>] {
        &self.substituents
    }

    pub(crate) fn has_modification(&self, kind: CoreModificationKind) -> bool {
        self.modifications.iter().any(|m| m.kind == kind)
    }

    /// Unknown positions (those below 1) match any query
    pub(crate) fn has_modification_at(&self, kind: CoreModificationKind, position: i32) -> bool {
        self.modifications
            .iter()
            .any(|m| m.kind == kind && (m.position <= 0 || m.position == position))
    }

    pub(crate) fn to_skeleton(&self) -> MonosaccharideSkeleton<'a> {
        MonosaccharideSkeleton {
            name: self.info.name.clone(),
            synonyms: self.info.synonyms.clone(),
            description: self.info.description.clone(),
            carbons: self.carbons,
            anomer: self.anomer,
            anomeric_carbon: self.anomeric_carbon,
            ring_size: self.ring_size,
            modifications: self.modifications.clone(),
            substituents: self.substituents.clone(),
        }
    }
}

impl<'a> ResidueType<'a> for Monosaccharide<'a> {
    fn info(&self) -> &ResidueInfo<'a> {
        &self.info
    }
}

massive_residue_impls!(Monosaccharide<'_>);

// Derivation From a Carbon Skeleton ===================================================================================

/// Everything needed to derive the formula and capacities of a monosaccharide
#[derive(Clone, Debug)]
pub(crate) struct MonosaccharideSkeleton<'a> {
    pub(crate) name: String,
    pub(crate) synonyms: Vec<String>,
    pub(crate) description: String,
    pub(crate) carbons: u32,
    pub(crate) anomer: Anomer,
    pub(crate) anomeric_carbon: u32,
    pub(crate) ring_size: u32,
    pub(crate) modifications: Vec<CoreModification>,
    pub(crate) substituents: Vec<SubstituentSite<'a>>,
}

impl<'a> MonosaccharideSkeleton<'a> {
    pub(crate) fn derive(self, db: &'a AtomicDatabase) -> Result<Monosaccharide<'a>> {
        let mut info = ResidueInfo::new(&self.name);
        info.synonyms.clone_from(&self.synonyms);
        info.description.clone_from(&self.description);
        info.acid = self.is_acid();

        let (linkages, methylations, acetylations) = self.capacities();
        info.linkages = linkages;
        info.methylations = methylations;
        info.acetylations = acetylations;

        if self.carbons > 0 {
            info = info.with_formula(self.formula(db)?);
        }

        Ok(Monosaccharide {
            info,
            carbons: self.carbons,
            anomer: self.anomer,
            anomeric_carbon: self.anomeric_carbon,
            ring_size: self.ring_size,
            modifications: self.modifications,
            substituents: self.substituents,
        })
    }

    fn is_acid(&self) -> bool {
        self.modifications
            .iter()
            .any(|m| m.kind == CoreModificationKind::Acid)
            || self.substituents.iter().any(|s| s.substituent.is_acid())
    }

    fn available_positions(&self) -> usize {
        let mut occupied: BTreeSet<_> = self
            .modifications
            .iter()
            .filter(|m| m.position > 0 && m.kind.occupies_position())
            .map(|m| i64::from(m.position))
            .collect();

        let anomeric_carbon = i64::from(self.anomeric_carbon);
        if self.anomer == Anomer::OpenChain {
            occupied.insert(anomeric_carbon);
        } else if self.ring_size > 0 {
            occupied.insert(anomeric_carbon + i64::from(self.ring_size) - 2);
        }

        (1..=i64::from(self.carbons))
            .filter(|c| !occupied.contains(c))
            .count()
    }

    // NOTE: Returns the linkage, methylation, and acetylation capacities
    fn capacities(&self) -> (i32, i32, i32) {
        let mut positions = i32::try_from(self.available_positions()).unwrap_or(i32::MAX);
        for modification in &self.modifications {
            positions -= match modification.kind {
                CoreModificationKind::Anhydro => 2,
                CoreModificationKind::Lacton => 1,
                _ => 0,
            };
        }

        let acids = self
            .modifications
            .iter()
            .filter(|m| m.kind == CoreModificationKind::Acid)
            .count();
        let acids = i32::try_from(acids).unwrap_or(i32::MAX);
        let (mut methylations, mut acetylations) = (positions + acids, positions + acids);

        // Two capacity units are consumed by the bond holding each substituent
        for SubstituentSite { substituent, .. } in &self.substituents {
            positions += substituent.max_linkages() - 2;
            if !substituent.is_dropped_with(DerivatizationKind::Methylation) {
                methylations += substituent.methylations() - 2;
            }
            if !substituent.is_dropped_with(DerivatizationKind::Acetylation) {
                acetylations += substituent.acetylations() - 2;
            }
        }

        (positions, methylations, acetylations)
    }

    fn formula(&self, db: &'a AtomicDatabase) -> Result<Molecule<'a>> {
        let hydrate = Molecule::new(db, "CH2O")?;
        let oxygen = Molecule::new(db, "O")?;
        let hydrogen = Molecule::hydrogen(db)?;
        let water = Molecule::water(db)?;

        let mut formula = Molecule::empty(db);
        formula.add(&hydrate, self.carbons.into());
        for modification in &self.modifications {
            let (o, h) = modification.kind.offsets();
            formula.add(&oxygen, o);
            formula.add(&hydrogen, h);
        }
        for site in &self.substituents {
            if let Some(substituent) = site.substituent.formula() {
                formula.add(substituent, 1);
            }
            formula.remove(&water, 1);
        }

        Ok(formula)
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::{Massive, ResidueDatabase};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);
    static RESIDUES: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&DB));

    fn formula_of(name: &str) -> String {
        let mono = RESIDUES.monosaccharide(name).unwrap();
        mono.formula().unwrap().to_string()
    }

    fn capacities_of(name: &str) -> (i32, i32, i32) {
        let mono = RESIDUES.monosaccharide(name).unwrap();
        (mono.max_linkages(), mono.methylations(), mono.acetylations())
    }

    #[test]
    fn derived_formulas() {
        assert_eq!(formula_of("Hex"), "C6H12O6");
        assert_eq!(formula_of("HexNAc"), "C8H15NO6");
        assert_eq!(formula_of("HexN"), "C6H13NO5");
        assert_eq!(formula_of("HexA"), "C6H10O7");
        assert_eq!(formula_of("dHex"), "C6H12O5");
        assert_eq!(formula_of("Pent"), "C5H10O5");
        assert_eq!(formula_of("NeuAc"), "C11H19NO9");
        assert_eq!(formula_of("Neu5Ac"), "C11H19NO9");
        assert_eq!(formula_of("NeuGc"), "C11H19NO10");
        assert_eq!(formula_of("Kdn"), "C9H16O9");
        assert_eq!(formula_of("KDO"), "C8H14O8");
    }

    #[test]
    fn derived_masses() {
        let hex = RESIDUES.monosaccharide("Hex").unwrap();
        assert_eq!(hex.monoisotopic_mass(), dec!(180.06338810418));
        let hexnac = RESIDUES.monosaccharide("HexNAc").unwrap();
        assert_eq!(hexnac.monoisotopic_mass(), dec!(221.08993720530));
    }

    #[test]
    fn derived_capacities() {
        // Five free hydroxyls, with C5 closing the ring
        assert_eq!(capacities_of("Hex"), (5, 5, 5));
        // The N-acetyl group takes a linkage position, but its NH can still be methylated
        assert_eq!(capacities_of("HexNAc"), (4, 5, 5));
        // Acids gain a methyl ester site, but lose a linkage position
        assert_eq!(capacities_of("HexA"), (4, 5, 5));
        assert_eq!(capacities_of("dHex"), (4, 4, 4));
        assert_eq!(capacities_of("NeuAc"), (5, 7, 7));
    }

    #[test]
    fn acids() {
        assert!(RESIDUES.monosaccharide("HexA").unwrap().is_acid());
        assert!(RESIDUES.monosaccharide("NeuAc").unwrap().is_acid());
        assert!(!RESIDUES.monosaccharide("HexNAc").unwrap().is_acid());
    }

    #[test]
    fn ring_geometry() {
        let hex = RESIDUES.monosaccharide("Hex").unwrap();
        assert_eq!(hex.carbons(), 6);
        assert_eq!(hex.anomer(), Anomer::Unknown);
        assert_eq!(hex.anomeric_carbon(), 1);
        assert_eq!(hex.ring_size(), 6);
        assert_eq!(hex.ring_closure(), 5);
        let neuac = RESIDUES.monosaccharide("NeuAc").unwrap();
        assert_eq!(neuac.ring_closure(), 6);
        assert_eq!(neuac.substituents()[0].position, 5);
        assert!(neuac.has_modification_at(CoreModificationKind::Deoxy, 3));
        assert!(!neuac.has_modification_at(CoreModificationKind::Deoxy, 4));
    }

    #[test]
    fn open_chain_and_anhydro() {
        let mut skeleton = RESIDUES.monosaccharide("Hex").unwrap().to_skeleton();
        skeleton.anomer = Anomer::OpenChain;
        let open = skeleton.clone().derive(&DB).unwrap();
        // The anomeric carbon is occupied instead of the ring-closing carbon
        assert_eq!(open.max_linkages(), 5);

        skeleton
            .modifications
            .push(CoreModification::new(CoreModificationKind::Anhydro, 3));
        let anhydro = skeleton.derive(&DB).unwrap();
        assert_eq!(anhydro.max_linkages(), 3);
        assert_eq!(anhydro.formula().unwrap().to_string(), "C6H10O5");
    }

    #[test]
    fn unknown_positions_are_free() {
        let mut skeleton = RESIDUES.monosaccharide("Hex").unwrap().to_skeleton();
        skeleton
            .modifications
            .push(CoreModification::new(CoreModificationKind::Deoxy, -1));
        let deoxy = skeleton.derive(&DB).unwrap();
        assert_eq!(deoxy.max_linkages(), 5);
        assert_eq!(deoxy.formula().unwrap().to_string(), "C6H12O5");
        assert!(deoxy.has_modification_at(CoreModificationKind::Deoxy, 4));
    }
}
