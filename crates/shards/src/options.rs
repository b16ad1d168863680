// Standard Library Imports
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

// External Crate Imports
use glycochem::{CleavageKind, Composition};

// Public API ==========================================================================================================

/// Which cleavages are allowed, and how many of each sort a single fragment may carry
///
/// Budgets of `None` are unbounded. By default, no cleavages are enabled at all.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FragmentOptions {
    kinds: BTreeSet<CleavageKind>,
    max_cleavages: Option<u32>,
    max_cross_ring_cleavages: Option<u32>,
}

impl FragmentOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind of cleavage, with unbounded budgets
    #[must_use]
    pub fn all() -> Self {
        Self::new().with_all_kinds(true)
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CleavageKind, enabled: bool) -> Self {
        if enabled {
            self.kinds.insert(kind);
        } else {
            self.kinds.remove(&kind);
        }
        self
    }

    #[must_use]
    pub fn with_all_kinds(self, enabled: bool) -> Self {
        CleavageKind::ALL
            .into_iter()
            .fold(self, |options, kind| options.with_kind(kind, enabled))
    }

    /// Limits the glycosidic (B, C, Y, and Z) cleavages of each fragment
    #[must_use]
    pub const fn with_max_cleavages(mut self, max_cleavages: Option<u32>) -> Self {
        self.max_cleavages = max_cleavages;
        self
    }

    /// Limits the cross-ring (A and X) cleavages of each fragment
    #[must_use]
    pub const fn with_max_cross_ring_cleavages(mut self, max_cross_ring_cleavages: Option<u32>) -> Self {
        self.max_cross_ring_cleavages = max_cross_ring_cleavages;
        self
    }

    #[must_use]
    pub fn is_enabled(&self, kind: CleavageKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// The enabled kinds of cleavage, in A, B, C, X, Y, Z order
    pub fn kinds(&self) -> impl Iterator<Item = CleavageKind> {
        self.kinds.iter().copied()
    }

    #[must_use]
    pub const fn max_cleavages(&self) -> Option<u32> {
        self.max_cleavages
    }

    #[must_use]
    pub const fn max_cross_ring_cleavages(&self) -> Option<u32> {
        self.max_cross_ring_cleavages
    }

    /// A short key, like `BY2?`, that identifies these options in a cache
    ///
    /// The enabled kinds are listed first, followed by the cleavage budget and then the cross-ring budget, each written
    /// as `?` when unbounded.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub(crate) fn within_budget(&self, fragment: &Composition) -> bool {
        let within = |budget: Option<u32>, count| budget.is_none_or(|max| count <= max);
        within(self.max_cross_ring_cleavages, fragment.cross_ring_fragment_count())
            && within(self.max_cleavages, fragment.non_cross_ring_fragment_count())
    }
}

impl Display for FragmentOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{kind}")?;
        }
        for budget in [self.max_cleavages, self.max_cross_ring_cleavages] {
            match budget {
                Some(max) => write!(f, "{max}")?,
                None => write!(f, "?")?,
            }
        }
        Ok(())
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_keys() {
        assert_eq!(FragmentOptions::new().key(), "??");
        assert_eq!(FragmentOptions::all().key(), "ABCXYZ??");

        let options = FragmentOptions::new()
            .with_kind(CleavageKind::Y, true)
            .with_kind(CleavageKind::B, true)
            .with_max_cleavages(Some(2));
        assert_eq!(options.key(), "BY2?");

        let options = FragmentOptions::all()
            .with_kind(CleavageKind::C, false)
            .with_max_cleavages(Some(1))
            .with_max_cross_ring_cleavages(Some(0));
        assert_eq!(options.key(), "ABXYZ10");
    }

    #[test]
    fn enabled_kinds() {
        let options = FragmentOptions::all().with_kind(CleavageKind::A, false);
        assert!(!options.is_enabled(CleavageKind::A));
        assert!(options.is_enabled(CleavageKind::X));
        assert_eq!(
            options.kinds().collect::<Vec<_>>(),
            [CleavageKind::B, CleavageKind::C, CleavageKind::X, CleavageKind::Y, CleavageKind::Z]
        );
        assert_eq!(FragmentOptions::all().with_all_kinds(false), FragmentOptions::new());
    }
}
