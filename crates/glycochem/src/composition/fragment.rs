// External Crate Imports
use itertools::Itertools;

// Local Crate Imports
use super::{Composition, FragmentExtension, offset_count, signed};
use crate::{FragmentType, Residue, ResidueType};

// Fragment Compositions ===============================================================================================

impl<'a, 'r> Composition<'a, 'r> {
    /// Places root-side fragment types at the root, and everything else among the leaves
    pub fn add_fragment(&mut self, fragment: FragmentType<'a, 'r>) -> bool {
        if fragment.is_root_side() {
            self.set_root_fragment(Some(fragment))
        } else {
            self.add_leaf_fragments(fragment, 1)
        }
    }

    /// Only root-side fragment types are accepted; setting one clears any reducing end
    pub fn set_root_fragment(&mut self, root: Option<FragmentType<'a, 'r>>) -> bool {
        if root.as_ref().is_some_and(|r| !r.is_root_side()) {
            return false;
        }
        if root.is_some() {
            self.reducing_end = None;
        }
        self.fragments.get_or_insert_with(FragmentExtension::default).root = root;
        true
    }

    /// Offsets the count of a leaf fragment, failing without change if the fragment type is root-side or the count
    /// would become negative
    pub fn add_leaf_fragments(&mut self, fragment: FragmentType<'a, 'r>, delta: i64) -> bool {
        if fragment.is_root_side() {
            return false;
        }
        let fragments = self.fragments.get_or_insert_with(FragmentExtension::default);
        offset_count(&mut fragments.leaves, fragment, delta)
    }

    pub fn leaf_fragments(&self) -> impl Iterator<Item = (&FragmentType<'a, 'r>, u32)> {
        self.fragments
            .iter()
            .flat_map(|f| f.leaves.iter().map(|(t, &n)| (t, n)))
    }

    #[must_use]
    pub fn root_fragment(&self) -> Option<&FragmentType<'a, 'r>> {
        self.fragments.as_ref().and_then(|f| f.root.as_ref())
    }

    /// Leaf fragments plus any root fragment
    #[must_use]
    pub fn fragment_count(&self) -> u32 {
        self.counted_fragments(|_| true)
    }

    #[must_use]
    pub fn cross_ring_fragment_count(&self) -> u32 {
        self.counted_fragments(|f| f.is_cross_ring())
    }

    #[must_use]
    pub fn non_cross_ring_fragment_count(&self) -> u32 {
        self.counted_fragments(|f| !f.is_cross_ring())
    }

    /// A label for the fragment ion, like `A_0_2_{Hex}YY`, listing every cleavage that produced it in fragment type
    /// order
    #[must_use]
    pub fn fragment_label(&self) -> String {
        self.leaf_fragments()
            .chain(self.root_fragment().map(|f| (f, 1)))
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(fragment, n)| fragment.label().repeat(n as usize))
            .collect()
    }

    fn counted_fragments(&self, filter: impl Fn(&FragmentType<'a, 'r>) -> bool) -> u32 {
        let leaves: u32 = self
            .leaf_fragments()
            .filter(|&(f, _)| filter(f))
            .map(|(_, n)| n)
            .sum();
        let root = self.root_fragment().filter(|&f| filter(f)).map_or(0, |_| 1);
        leaves + root
    }
}

// Fragment Extensions =================================================================================================

impl<'a, 'r> FragmentExtension<'a, 'r> {
    pub fn leaves(&self) -> impl Iterator<Item = (&FragmentType<'a, 'r>, u32)> {
        self.leaves.iter().map(|(t, &n)| (t, n))
    }

    #[must_use]
    pub const fn root(&self) -> Option<&FragmentType<'a, 'r>> {
        self.root.as_ref()
    }

    // NOTE: Every fragment is another unit to bond, and each of those bonds closes two positions
    pub(super) fn max_linkages(&self, core_linkages: i32) -> i32 {
        let mut units = i32::from(core_linkages > 0);
        let mut linkages = core_linkages;
        for (fragment, &n) in &self.leaves {
            units += signed(n);
            linkages += signed(n) * fragment.max_linkages();
        }
        if let Some(root) = &self.root {
            units += 1;
            linkages += root.max_linkages();
        }
        if units > 1 {
            linkages -= (units - 1) * 2;
        }
        linkages
    }

    /// Without any monosaccharides, the leaves must hang from a root, and the root must have room for them
    pub(super) fn can_stand_alone(&self, reducing_end: Option<&Residue>) -> bool {
        if (reducing_end.is_none() && self.root.is_none()) || self.leaves.is_empty() {
            return false;
        }

        let root_linkages = reducing_end.map_or(0, |r| r.max_linkages())
            + self.root.as_ref().map_or(0, |r| r.max_linkages());
        let leaf_units: i32 = self.leaves.values().copied().map(signed).sum();
        let leaf_linkages: i32 = self
            .leaves
            .iter()
            .map(|(f, &n)| signed(n) * f.max_linkages())
            .sum::<i32>()
            - (leaf_units - 1) * 2;
        if leaf_linkages < 1 && 2 - leaf_linkages > root_linkages {
            return false;
        }

        self.leaves.keys().any(FragmentType::is_cross_ring)
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use crate::{AtomicDatabase, ResidueDatabase};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);
    static RESIDUES: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&DB));

    fn fragment(name: &str) -> FragmentType<'static, 'static> {
        RESIDUES.fragment(name).unwrap()
    }

    fn parse(text: &str) -> Composition<'static, 'static> {
        Composition::new(&RESIDUES, text).unwrap()
    }

    #[test]
    fn add_fragment() {
        let mut composition = parse("Hex:2,HexNAc:1--redEnd").to_fragment();
        assert!(composition.add_residues(RESIDUES.residue("Hex").unwrap(), -1));
        assert!(composition.add_fragment(fragment("Sugar#y")));
        assert_eq!(composition.to_string(), "Sugar#y:1--Hex:1,HexNAc:1--redEnd");

        assert!(composition.add_fragment(fragment("Hex#x_0_2")));
        assert!(composition.add_fragment(fragment("Sugar#y")));
        assert_eq!(composition.to_string(), "Hex#x_0_2:1,Sugar#y:2--Hex:1,HexNAc:1--redEnd");
        assert_eq!(composition.fragment_count(), 3);
        assert_eq!(composition.cross_ring_fragment_count(), 1);
        assert_eq!(composition.non_cross_ring_fragment_count(), 2);

        assert!(composition.add_fragment(fragment("Hex#a_2_4")));
        assert_eq!(
            composition.to_string(),
            "Hex#x_0_2:1,Sugar#y:2--Hex:1,HexNAc:1--Hex#a_2_4"
        );
        assert!(composition.reducing_end().is_none());
        assert_eq!(composition.fragment_count(), 4);
        assert_eq!(composition.cross_ring_fragment_count(), 2);
    }

    #[test]
    fn leaf_fragments() {
        let mut composition = Composition::empty_fragment(&RESIDUES);
        assert!(!composition.add_leaf_fragments(fragment("Sugar#b"), 1));
        assert!(!composition.add_leaf_fragments(fragment("Hex#a_0_2"), 1));
        assert!(composition.add_leaf_fragments(fragment("Sugar#z"), 2));
        assert!(!composition.add_leaf_fragments(fragment("Sugar#z"), -3));
        assert_eq!(composition.to_string(), "Sugar#z:2");
        assert!(composition.add_leaf_fragments(fragment("Sugar#z"), -2));
        assert_eq!(composition.to_string(), "");
        assert_eq!(composition.leaf_fragments().count(), 0);
    }

    #[test]
    fn root_and_reducing_end_exclusion() {
        let mut composition = parse("Hex:2--Sugar#b");
        assert_eq!(composition.root_fragment().unwrap().to_string(), "Sugar#b");

        assert!(composition.set_reducing_end(Some(RESIDUES.residue("redEnd").unwrap())));
        assert!(composition.root_fragment().is_none());
        assert_eq!(composition.to_string(), "Hex:2--redEnd");

        assert!(composition.set_root_fragment(Some(fragment("Sugar#c"))));
        assert!(composition.reducing_end().is_none());
        assert_eq!(composition.to_string(), "Hex:2--Sugar#c");

        assert!(!composition.set_root_fragment(Some(fragment("Sugar#y"))));
        assert_eq!(composition.to_string(), "Hex:2--Sugar#c");

        assert!(composition.set_root_fragment(None));
        assert_eq!(composition.to_string(), "Hex:2");
    }

    #[test]
    fn fragment_labels() {
        assert_eq!(parse("Hex:1--Sugar#b").fragment_label(), "B");
        assert_eq!(
            parse("Sugar#y:2,Hex#x_0_2:1--Hex:1--Hex#a_2_4").fragment_label(),
            "A_2_4_{Hex}X_0_2_{Hex}YY"
        );
        assert_eq!(parse("Sugar#z:1--Hex:2--Sugar#c").fragment_label(), "CZ");
        assert_eq!(parse("Hex:1").to_fragment().fragment_label(), "");
    }

    #[test]
    fn fragment_linkages() {
        // Hex (5 positions) with a y cleavage (1 position): 6 positions less 2 for their bond
        assert_eq!(parse("Sugar#y:1--Hex:1").max_linkages(), 4);
        // The core contributes no unit at all when it has no free positions
        assert_eq!(parse("Sugar#y:2").max_linkages(), 0);
    }

    #[test]
    fn fragments_without_monosaccharides() {
        let valid = |text| parse(text).is_valid_structure();
        assert!(valid("Hex#x_0_2:1--redEnd"));
        assert!(valid("Hex#x_0_2:1--Sugar#b"));
        assert!(!valid("Sugar#y:1--redEnd"));
        assert!(!valid("Hex#x_0_2:1"));
        assert!(!valid("--Sugar#b"));
        assert!(valid("Sugar#y:1--Hex:1--Sugar#b"));
    }
}
