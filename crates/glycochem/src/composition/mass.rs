// External Crate Imports
use rust_decimal::Decimal;

// Local Crate Imports
use super::{Composition, FragmentExtension, MassKind};
use crate::{Massive, Perderivatization, ResidueType};

// Composition Masses ==================================================================================================

impl Composition<'_, '_> {
    /// The neutral mass of this composition, calculated according to its [`MassOptions`](super::MassOptions)
    #[must_use]
    pub fn mass(&self) -> Decimal {
        let kind = self.mass_options.kind;
        let perderivatization = self.mass_options.perderivatization;

        let core = self.core_mass(kind, perderivatization);
        match &self.fragments {
            Some(fragments) => core + fragments.mass(self, kind, perderivatization),
            None => core,
        }
    }

    fn core_mass(&self, kind: MassKind, perderivatization: Option<&Perderivatization>) -> Decimal {
        let water = self.db.water().mass(kind);
        let hydrogen = self.db.hydrogen().mass(kind);

        // Substituents displaced by the perderivatization are left out entirely
        let counted: Vec<_> = self
            .residues
            .iter()
            .filter(|(r, _)| perderivatization.is_none_or(|p| !r.is_dropped_with(p.kind())))
            .map(|(r, &n)| (r, Decimal::from(n)))
            .collect();

        let mut mass: Decimal = counted.iter().map(|(r, n)| n * r.mass(kind)).sum();
        let mut units: Decimal = counted.iter().map(|(_, n)| n).sum();
        if let Some(reducing_end) = &self.reducing_end {
            mass += reducing_end.mass(kind) + Decimal::TWO * hydrogen;
            units += Decimal::ONE;
        }
        if units > Decimal::ONE {
            mass -= (units - Decimal::ONE) * water;
        }

        if let Some(perderivatization) = perderivatization {
            let derivatization = perderivatization.kind();
            let mut sites: Decimal = counted
                .iter()
                .map(|(r, n)| n * Decimal::from(r.derivatization_sites(derivatization)))
                .sum();
            if let Some(reducing_end) = &self.reducing_end {
                sites += Decimal::from(reducing_end.derivatization_sites(derivatization));
            }
            if units > Decimal::ONE {
                sites -= (units - Decimal::ONE) * Decimal::TWO;
            }
            mass += sites * (perderivatization.mass(kind) - hydrogen);
        }
        mass
    }
}

impl FragmentExtension<'_, '_> {
    // NOTE: Each fragment site is charged the perderivatization mass less a whole water, not a hydrogen as in
    // `Composition::core_mass`; this difference is relied upon by existing fragment mass tables
    fn mass(
        &self,
        composition: &Composition,
        kind: MassKind,
        perderivatization: Option<&Perderivatization>,
    ) -> Decimal {
        let water = composition.db.water().mass(kind);

        let fragments: Vec<_> = self
            .leaves
            .iter()
            .map(|(f, &n)| (f, Decimal::from(n)))
            .chain(self.root.iter().map(|f| (f, Decimal::ONE)))
            .collect();

        let mut mass: Decimal = fragments.iter().map(|(f, n)| n * f.mass(kind)).sum();
        let mut units: Decimal = fragments.iter().map(|(_, n)| n).sum();
        if !composition.residues.is_empty() || composition.reducing_end.is_some() {
            units += Decimal::ONE;
        }
        if units > Decimal::ONE {
            mass -= (units - Decimal::ONE) * water;
        }

        if let Some(perderivatization) = perderivatization {
            let derivatization = perderivatization.kind();
            let mut sites: Decimal = fragments
                .iter()
                .map(|(f, n)| n * Decimal::from(f.derivatization_sites(derivatization)))
                .sum();
            if units > Decimal::ONE {
                sites -= (units - Decimal::ONE) * Decimal::TWO;
            }
            mass += sites * (perderivatization.mass(kind) - water);
        }
        mass
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::{AtomicDatabase, MassOptions, ResidueDatabase};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);
    static RESIDUES: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&DB));

    fn parse(text: &str) -> Composition<'static, 'static> {
        Composition::new(&RESIDUES, text).unwrap()
    }

    fn mass_of(text: &str) -> Decimal {
        parse(text).mass().round_dp(4)
    }

    fn residue_mass(name: &str) -> Decimal {
        RESIDUES.residue(name).unwrap().monoisotopic_mass()
    }

    fn water() -> Decimal {
        RESIDUES.water().monoisotopic_mass()
    }

    const ACETYL_LABILE_KDL: &str = indoc! {r#"
        substituents {
          Me "O-Methyl" {
            formula "CH4O"
            lost-on-acetylation
          }
        }
        reducing-ends {}
        monosaccharides {
          Hex "Hexose" {
            carbons 6
            anomeric-carbon 1
            ring-size 6
          }
        }
        perderivatizations {
          perMe "Permethylation" {
            formula "CH3"
            derivatization "methylation"
          }
          perAc "Peracetylation" {
            formula "C2H3O"
            derivatization "acetylation"
          }
        }
    "#};

    fn average(text: &str, perderivatization: Option<&str>) -> Decimal {
        let mut composition = parse(text);
        composition.set_mass_options(MassOptions {
            kind: MassKind::Average,
            perderivatization: perderivatization.map(|p| RESIDUES.perderivatization(p).unwrap()),
        });
        composition.mass()
    }

    #[test]
    fn glycosidic_bonds_lose_water() {
        // Residue masses written directly, as they appear in most glycan mass tables
        let composition = parse("Hex=162.0528:3,HexNAc=203.0794:2");
        let expected = dec!(3) * dec!(162.0528) + dec!(2) * dec!(203.0794) - dec!(4) * water();
        assert_eq!(composition.mass(), expected);
        assert!((composition.mass() - dec!(820.2748)).abs() < dec!(0.001));

        // Monosaccharides in the residue database are free sugars
        let composition = parse("Hex:3,HexNAc:2");
        let expected =
            dec!(3) * residue_mass("Hex") + dec!(2) * residue_mass("HexNAc") - dec!(4) * water();
        assert_eq!(composition.mass(), expected);
        assert_eq!(composition.mass().round_dp(2), dec!(910.33));
    }

    #[test]
    fn single_residues() {
        assert_eq!(mass_of("Hex:1"), dec!(180.0634));
        assert_eq!(mass_of("HexNAc:1"), dec!(221.0899));
        assert_eq!(Composition::empty(&RESIDUES).mass(), Decimal::ZERO);
    }

    #[test]
    fn custom_masses_are_exact() {
        let composition = parse("Hex:1,Tag=100.00004:1");
        assert_eq!(composition.to_string(), "Hex:1,Tag=100.0000:1");
        assert_eq!(composition.mass(), residue_mass("Hex") + dec!(100.00004) - water());
        assert_ne!(composition.mass(), parse("Hex:1,Tag=100:1").mass());
    }

    #[test]
    fn reducing_ends_gain_hydrogen() {
        let reduced = parse("Hex:1--redEnd").mass();
        let hydrogen = RESIDUES.hydrogen().monoisotopic_mass();
        let expected = residue_mass("Hex") + residue_mass("redEnd") + dec!(2) * hydrogen - water();
        assert_eq!(reduced, expected);
        // A reduced hexose is an alditol, C6H14O6
        assert_eq!(reduced.round_dp(4), dec!(182.0790));
    }

    #[test]
    fn average_masses() {
        let mut composition = parse("Hex:1");
        composition.set_mass_options(MassOptions {
            kind: MassKind::Average,
            perderivatization: None,
        });
        assert_eq!(composition.mass().round_dp(2), dec!(180.16));
    }

    #[test]
    fn permethylation() {
        let perme = RESIDUES.perderivatization("perMe").unwrap();
        let permethylated = |text| {
            let mut composition = parse(text);
            composition.set_mass_options(MassOptions {
                kind: MassKind::Monoisotopic,
                perderivatization: Some(perme),
            });
            composition.mass()
        };
        let methyl_shift = perme.monoisotopic_mass() - RESIDUES.hydrogen().monoisotopic_mass();

        // Five hydroxyls on a free hexose
        assert_eq!(permethylated("Hex:1"), parse("Hex:1").mass() + dec!(5) * methyl_shift);
        // Each glycosidic bond consumes two sites
        assert_eq!(permethylated("Hex:2"), parse("Hex:2").mass() + dec!(8) * methyl_shift);
        // O-acetyl groups are displaced by permethylation
        assert_eq!(permethylated("Hex:2,Ac:1"), permethylated("Hex:2"));
    }

    #[test]
    fn peracetylation_drops_labile_substituents() {
        let db = ResidueDatabase::new(&DB, "acetyl_labile.kdl", ACETYL_LABILE_KDL).unwrap();
        let derivatized = |text: &str, name: &str| {
            let mut composition = Composition::new(&db, text).unwrap();
            composition.set_mass_options(MassOptions {
                kind: MassKind::Monoisotopic,
                perderivatization: Some(db.perderivatization(name).unwrap()),
            });
            composition.mass()
        };
        let plain = |text: &str| Composition::new(&db, text).unwrap().mass();

        // Dropped substituents contribute neither mass nor sites, nor a glycosidic bond
        assert_eq!(derivatized("Hex:1,Me:1", "perAc"), derivatized("Hex:1", "perAc"));
        assert_ne!(derivatized("Hex:1", "perAc"), plain("Hex:1"));

        // But survive permethylation, bringing a site of their own
        let perme = db.perderivatization("perMe").unwrap();
        let methyl_shift = perme.monoisotopic_mass() - db.hydrogen().monoisotopic_mass();
        let methyl = db.residue("Me").unwrap().monoisotopic_mass();
        let hexose = db.residue("Hex").unwrap().monoisotopic_mass();
        let water = db.water().monoisotopic_mass();
        assert_eq!(
            derivatized("Hex:1,Me:1", "perMe"),
            hexose + methyl - water + dec!(4) * methyl_shift
        );
        assert_eq!(plain("Hex:1,Me:1"), hexose + methyl - water);
    }

    #[test]
    fn fragment_masses() {
        let hydrogen_molecule = dec!(2) * RESIDUES.hydrogen().monoisotopic_mass();

        // Sugar#y is a whole water, which its bond to the Hex takes straight back
        assert_eq!(parse("Sugar#y:1--Hex:1").mass(), residue_mass("Hex"));
        assert_eq!(
            parse("Hex:1--Sugar#b").mass(),
            residue_mass("Hex") + hydrogen_molecule - water()
        );
        assert_eq!(
            parse("Sugar#y:2--Hex:1").mass(),
            residue_mass("Hex") + dec!(2) * water() - dec!(2) * water()
        );
    }

    #[test]
    fn permethylated_fragments() {
        let perme = RESIDUES.perderivatization("perMe").unwrap();
        let mut fragment = parse("Sugar#y:1--Hex:1");
        fragment.set_mass_options(MassOptions {
            kind: MassKind::Monoisotopic,
            perderivatization: Some(perme),
        });
        let hydrogen = RESIDUES.hydrogen().monoisotopic_mass();
        let core_shift = dec!(5) * (perme.monoisotopic_mass() - hydrogen);
        // One site on the y fragment, less the two closed by its bond to the Hex
        let fragment_shift = dec!(-1) * (perme.monoisotopic_mass() - water());
        assert_eq!(fragment.mass(), residue_mass("Hex") + core_shift + fragment_shift);
    }

    #[test]
    fn average_fragment_masses() {
        let hexose = RESIDUES.residue("Hex").unwrap().average_mass();
        let water = RESIDUES.water().average_mass();
        let hydrogen = RESIDUES.hydrogen().average_mass();

        assert_eq!(average("Sugar#y:1--Hex:1", None), hexose);
        assert_eq!(average("Sugar#y:1--Hex:1", None), average("Hex:1", None));
        assert_eq!(
            average("Hex:1--Sugar#b", None),
            hexose + dec!(2) * hydrogen - water
        );

        let perme = RESIDUES.perderivatization("perMe").unwrap().average_mass();
        let core_shift = dec!(5) * (perme - hydrogen);
        let fragment_shift = dec!(-1) * (perme - water);
        assert_eq!(
            average("Sugar#y:1--Hex:1", Some("perMe")),
            hexose + core_shift + fragment_shift
        );
    }
}
