//! Every fragment of a glycan composition reachable by a bounded number of glycosidic and cross-ring cleavages

mod cache;
mod options;

// External Crate Imports
use ahash::{HashSet, HashSetExt};
use glycochem::{
    Composition, FragmentType, Monosaccharide, Residue, ResidueDatabase, ResidueType, Result,
    generation,
};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

pub use cache::FragmentCache;
pub use options::FragmentOptions;

// Public API ==========================================================================================================

/// Enumerates and memoizes the fragments of compositions
///
/// Each `Fragmenter` owns its cache, so separate instances never share work, but also never contend for it.
#[derive(Clone, Debug)]
pub struct Fragmenter<'a, 'r> {
    db: &'r ResidueDatabase<'a>,
    options: FragmentOptions,
    cache: FragmentCache<'a, 'r>,
}

impl<'a, 'r> Fragmenter<'a, 'r> {
    #[must_use]
    pub fn new(db: &'r ResidueDatabase<'a>, options: FragmentOptions) -> Self {
        Self {
            db,
            options,
            cache: FragmentCache::default(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &FragmentOptions {
        &self.options
    }

    // NOTE: Cached entries are keyed by their options, so they can be kept
    pub fn set_options(&mut self, options: FragmentOptions) {
        self.options = options;
    }

    #[must_use]
    pub const fn cache(&self) -> &FragmentCache<'a, 'r> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The canonical strings of every fragment of `composition` and of its substructures, without duplicates
    ///
    /// Fragments are returned in no particular order.
    #[instrument(skip_all, fields(composition = %composition, options = %self.options))]
    pub fn fragments(&mut self, composition: &Composition<'a, 'r>) -> Result<Vec<String>> {
        let key = self.options.key();
        let cache_key = (composition.to_string(), key.clone());
        if let Some(fragments) = self.cache.complete.get(&cache_key) {
            debug!(fragments = fragments.len(), "found cached fragments");
            return Ok(fragments.clone());
        }

        let mut structures = generation::substructures(composition);
        let substructure_names = structures.iter().map(ToString::to_string).collect_vec();
        // Substructures of an already fragmented substructure are covered by its cached fragments
        let subsumed: HashSet<String> = substructure_names
            .iter()
            .filter_map(|name| self.cache.substructures.get(&(name.clone(), key.clone())))
            .flatten()
            .cloned()
            .collect();
        self.cache
            .substructures
            .insert(cache_key.clone(), substructure_names);

        structures.push(composition.clone());
        generation::sort_by_mass(&mut structures, true);

        let mut seen = HashSet::new();
        let mut fragments = Vec::new();
        for structure in &structures {
            let structure_key = (structure.to_string(), key.clone());
            if subsumed.contains(&structure_key.0) {
                trace!(substructure = %structure_key.0, "skipping subsumed substructure");
                continue;
            }

            let cached = self
                .cache
                .complete
                .get(&structure_key)
                .or_else(|| self.cache.direct.get(&structure_key))
                .cloned();
            let structure_fragments = if let Some(cached) = cached {
                cached
            } else {
                let cleaved = self.cleave(structure)?;
                trace!(substructure = %structure_key.0, fragments = cleaved.len(), "cleaved substructure");
                self.cache.direct.insert(structure_key, cleaved.clone());
                cleaved
            };
            fragments.extend(structure_fragments.into_iter().filter(|f| seen.insert(f.clone())));
        }

        debug!(
            substructures = structures.len(),
            subsumed = subsumed.len(),
            fragments = fragments.len(),
            "enumerated fragments"
        );
        self.cache.complete.insert(cache_key, fragments.clone());
        Ok(fragments)
    }

    /// Like [`Fragmenter::fragments()`], but parsed back into compositions sharing the mass options of `composition`
    pub fn fragment_compositions(
        &mut self,
        composition: &Composition<'a, 'r>,
    ) -> Result<Vec<Composition<'a, 'r>>> {
        self.fragments(composition)?
            .into_iter()
            .map(|fragment| {
                let mut fragment = Composition::new(self.db, fragment)?;
                fragment.set_mass_options(composition.mass_options());
                Ok(fragment)
            })
            .collect()
    }
}

// Private Helpers =====================================================================================================

impl<'a, 'r> Fragmenter<'a, 'r> {
    // NOTE: Each monosaccharide type is cleaved, one unit at a time, from every fragment found so far (including those
    // of earlier monosaccharide types), and every intermediate fragment is kept
    fn cleave(&mut self, composition: &Composition<'a, 'r>) -> Result<Vec<String>> {
        if composition.monosaccharide_count() == 1 && composition.reducing_end().is_none() {
            return Ok(Vec::new());
        }

        let monosaccharides = composition
            .residues()
            .filter_map(|(r, n)| r.as_monosaccharide().map(|m| (m, n)))
            .collect_vec();

        let origin = composition.to_fragment();
        let mut seen = HashSet::new();
        seen.insert(origin.to_string());
        let mut found = vec![origin];

        for (monosaccharide, count) in monosaccharides {
            let fragment_types = self.fragment_types(monosaccharide)?;
            let residue = Residue::from(monosaccharide);

            let mut current = found.clone();
            for _ in 0..count {
                let mut next_seen = HashSet::new();
                let mut next = Vec::new();
                for target in &current {
                    for &fragment_type in &fragment_types {
                        if fragment_type.is_root_side() && target.root_fragment().is_some() {
                            continue;
                        }

                        let mut candidate = target.clone();
                        if !candidate.add_residues(residue.clone(), -1)
                            || !candidate.add_fragment(fragment_type)
                            || !candidate.is_valid_structure()
                            || !self.options.within_budget(&candidate)
                        {
                            continue;
                        }
                        if next_seen.insert(candidate.to_string()) {
                            next.push(candidate);
                        }
                    }
                }

                for candidate in &next {
                    if seen.insert(candidate.to_string()) {
                        found.push(candidate.clone());
                    }
                }
                current = next;
            }
        }

        Ok(found.iter().skip(1).map(ToString::to_string).collect())
    }

    fn fragment_types(&mut self, monosaccharide: &Monosaccharide) -> Result<Vec<FragmentType<'a, 'r>>> {
        let cache_key = (monosaccharide.name().to_owned(), self.options.key());
        if let Some(fragment_types) = self.cache.fragment_types.get(&cache_key) {
            return Ok(fragment_types.clone());
        }

        // NOTE: Cross-ring kinds that a monosaccharide can't undergo are skipped rather than treated as errors
        let fragment_types: Vec<_> = self
            .db
            .fragments()
            .fragments_of(monosaccharide)?
            .into_iter()
            .filter(|f| self.options.is_enabled(f.kind()))
            .collect();
        self.cache
            .fragment_types
            .insert(cache_key, fragment_types.clone());
        Ok(fragment_types)
    }
}

// Module Tests ========================================================================================================
