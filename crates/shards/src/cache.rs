// External Crate Imports
use ahash::HashMap;
use glycochem::FragmentType;

// Public API ==========================================================================================================

/// A (canonical string, option key) pair
pub(crate) type CacheKey = (String, String);

/// The memoized work of a [`Fragmenter`](crate::Fragmenter)
///
/// Every entry is keyed by the options it was computed with, so changing options never returns stale fragments.
#[derive(Clone, Debug, Default)]
pub struct FragmentCache<'a, 'r> {
    /// Every fragment of a composition and of its substructures
    pub(crate) complete: HashMap<CacheKey, Vec<String>>,
    /// The fragments produced by cleaving a single composition, ignoring its substructures
    pub(crate) direct: HashMap<CacheKey, Vec<String>>,
    /// The substructures covered by an entry in `complete`
    pub(crate) substructures: HashMap<CacheKey, Vec<String>>,
    /// The enabled fragment types of each monosaccharide
    pub(crate) fragment_types: HashMap<CacheKey, Vec<FragmentType<'a, 'r>>>,
}

impl FragmentCache<'_, '_> {
    pub fn clear(&mut self) {
        self.complete.clear();
        self.direct.clear();
        self.substructures.clear();
        self.fragment_types.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.complete.is_empty()
            && self.direct.is_empty()
            && self.substructures.is_empty()
            && self.fragment_types.is_empty()
    }

    /// The number of compositions whose complete set of fragments is known
    #[must_use]
    pub fn len(&self) -> usize {
        self.complete.len()
    }
}
