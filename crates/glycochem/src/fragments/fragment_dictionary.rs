// External Crate Imports
use ahash::{HashMap, HashMapExt};

// Local Crate Imports
use super::{CleavageKind, CrossRingFragment, FragmentType, GlycosidicFragment, can_cleave};
use crate::{
    AtomicDatabase, GlycochemError, Monosaccharide, ResidueType, Result, kdl::names_of,
    residues::errors::ResidueLookupError,
};

// Public API ==========================================================================================================

/// Every fragment type that can be cleaved from the monosaccharides of a `ResidueDatabase`
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FragmentDictionary<'a> {
    glycosidic: Vec<GlycosidicFragment<'a>>,
    cross_ring: HashMap<String, Vec<CrossRingFragment<'a>>>,
    index: HashMap<String, FragmentKey>,
}

impl<'a> FragmentDictionary<'a> {
    pub(crate) fn new(db: &'a AtomicDatabase, monosaccharides: &[Monosaccharide<'a>]) -> Result<Self> {
        let glycosidic = CleavageKind::ALL
            .into_iter()
            .filter(|k| !k.is_cross_ring())
            .map(|k| GlycosidicFragment::new(db, k))
            .collect::<Result<Vec<_>>>()?;

        let mut cross_ring = HashMap::with_capacity(monosaccharides.len());
        for monosaccharide in monosaccharides {
            cross_ring.insert(
                monosaccharide.name().to_owned(),
                Self::derive_cross_ring(db, monosaccharide)?,
            );
        }

        let mut index = HashMap::new();
        for (i, fragment) in glycosidic.iter().enumerate() {
            index.insert(fragment.name().to_lowercase(), FragmentKey::Glycosidic(i));
        }
        for (parent, fragments) in &cross_ring {
            for (i, fragment) in fragments.iter().enumerate() {
                for name in names_of(fragment.name(), fragment.synonyms()) {
                    index.insert(name.to_lowercase(), FragmentKey::CrossRing(parent.clone(), i));
                }
            }
        }

        Ok(Self {
            glycosidic,
            cross_ring,
            index,
        })
    }

    /// Looks up a fragment type by name or synonym, ignoring case
    pub fn fragment(&self, name: &str) -> Result<FragmentType<'a, '_>, ResidueLookupError> {
        self.index
            .get(&name.to_lowercase())
            .map(|key| match key {
                FragmentKey::Glycosidic(i) => FragmentType::Glycosidic(&self.glycosidic[*i]),
                FragmentKey::CrossRing(parent, i) => {
                    FragmentType::CrossRing(&self.cross_ring[parent][*i])
                }
            })
            .ok_or_else(|| ResidueLookupError::Fragment(name.to_owned()))
    }

    /// The singleton fragment type of a glycosidic cleavage
    #[must_use]
    pub fn glycosidic(&self, kind: CleavageKind) -> Option<FragmentType<'a, '_>> {
        self.glycosidic
            .iter()
            .find(|g| g.kind() == kind)
            .map(FragmentType::Glycosidic)
    }

    /// Every fragment type of a monosaccharide, ordered by cleavage kind
    ///
    /// Cross-ring kinds that the monosaccharide can't undergo are skipped.
    pub fn fragments_of(&self, monosaccharide: &Monosaccharide) -> Result<Vec<FragmentType<'a, '_>>> {
        let cross_ring = self.cross_ring_of(monosaccharide)?;
        Ok(CleavageKind::ALL
            .into_iter()
            .flat_map(|kind| self.of_kind(cross_ring, kind))
            .collect())
    }

    /// Fails if the monosaccharide has no fragment types of the given kind
    pub fn fragments_of_kind(
        &self,
        monosaccharide: &Monosaccharide,
        kind: CleavageKind,
    ) -> Result<Vec<FragmentType<'a, '_>>> {
        let fragments = self.of_kind(self.cross_ring_of(monosaccharide)?, kind);
        if fragments.is_empty() {
            return Err(GlycochemError::no_fragments_of_kind(monosaccharide.name(), kind).into());
        }
        Ok(fragments)
    }

    /// The total number of distinct fragment types
    #[must_use]
    pub fn len(&self) -> usize {
        self.glycosidic.len() + self.cross_ring.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Private Helpers =====================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
enum FragmentKey {
    Glycosidic(usize),
    CrossRing(String, usize),
}

impl<'a> FragmentDictionary<'a> {
    fn cross_ring_of(&self, monosaccharide: &Monosaccharide) -> Result<&[CrossRingFragment<'a>]> {
        let name = monosaccharide.name();
        self.cross_ring
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GlycochemError::unknown_monosaccharide(name).into())
    }

    fn of_kind<'d>(
        &'d self,
        cross_ring: &'d [CrossRingFragment<'a>],
        kind: CleavageKind,
    ) -> Vec<FragmentType<'a, 'd>> {
        if kind.is_cross_ring() {
            cross_ring
                .iter()
                .filter(|c| c.kind() == kind)
                .map(FragmentType::CrossRing)
                .collect()
        } else {
            self.glycosidic(kind).into_iter().collect()
        }
    }

    // NOTE: The full ring window (0, ring size - 1) is skipped, since it doesn't break the monosaccharide apart
    fn derive_cross_ring(
        db: &'a AtomicDatabase,
        monosaccharide: &Monosaccharide<'a>,
    ) -> Result<Vec<CrossRingFragment<'a>>> {
        let last_bond = monosaccharide.ring_size().saturating_sub(1);
        let windows: Vec<_> = (0..=last_bond.saturating_sub(2))
            .flat_map(|start| (start + 2..=last_bond).map(move |end| (start, end)))
            .filter(|&window| window != (0, last_bond))
            .filter(|&(start, end)| can_cleave(monosaccharide, start, end))
            .collect();

        let mut fragments = Vec::with_capacity(windows.len() * 2);
        for kind in CleavageKind::ALL.into_iter().filter(|k| k.is_cross_ring()) {
            for &(start, end) in &windows {
                fragments.push(CrossRingFragment::new(db, monosaccharide, kind, start, end)?);
            }
        }
        Ok(fragments)
    }
}

// Module Tests ========================================================================================================
