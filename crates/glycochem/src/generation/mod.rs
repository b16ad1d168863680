//! Smaller structures contained in a composition, and every composition that fits between two bounds

mod bounded;

// Standard Library Imports
use std::cmp::Reverse;

// External Crate Imports
use ahash::{HashSet, HashSetExt};
use rust_decimal::Decimal;
use tracing::debug;

// Local Crate Imports
use crate::Composition;

pub use bounded::BoundedGenerator;

// Public API ==========================================================================================================

/// Every valid structure reachable by removing residues from `composition`, one at a time
///
/// Each structure is returned once, in the order it was first reached, however many removal orders lead to it. The
/// reducing end is never removed, and invalid compositions have no substructures.
#[must_use]
pub fn substructures<'a, 'r>(composition: &Composition<'a, 'r>) -> Vec<Composition<'a, 'r>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    if composition.is_valid_structure() {
        collect_substructures(composition, &mut seen, &mut found);
    }
    found
}

/// Like [`substructures`], but also includes the composition without its reducing end, and its substructures
#[must_use]
pub fn substructures_with_reducing_end<'a, 'r>(
    composition: &Composition<'a, 'r>,
) -> Vec<Composition<'a, 'r>> {
    let mut found = substructures(composition);
    if composition.reducing_end().is_none() {
        return found;
    }

    let mut unreduced = composition.clone();
    unreduced.set_reducing_end(None);
    if unreduced.is_valid_structure() {
        let mut seen: HashSet<_> = found.iter().map(ToString::to_string).collect();
        if seen.insert(unreduced.to_string()) {
            found.push(unreduced.clone());
            collect_substructures(&unreduced, &mut seen, &mut found);
        }
    }
    found
}

/// Every composition containing `min` and contained in `max` whose mass doesn't exceed `ceiling`
///
/// The results share the mass options of `min`, and residues of `min` that `max` lacks are ignored. Compositions are
/// found as the substructures of `max - min`, so, if `min` holds more of some residue than `max`, then nothing is
/// returned. An empty `min` is never returned itself.
#[must_use]
pub fn compositions<'a, 'r>(
    min: &Composition<'a, 'r>,
    max: &Composition<'a, 'r>,
    ceiling: Decimal,
) -> Vec<Composition<'a, 'r>> {
    let mut floor = Composition::empty(max.db());
    floor.set_mass_options(min.mass_options());
    for (residue, n) in min.residues().filter(|(r, _)| max.count(r) > 0) {
        floor.add_residues(residue.clone(), n.into());
    }
    if max.is_empty() || (!floor.is_empty() && floor.mass() > ceiling) {
        return Vec::new();
    }

    let mut difference = max.clone();
    difference.set_mass_options(min.mass_options());
    for (residue, n) in floor.residues() {
        if !difference.add_residues(residue.clone(), -i64::from(n)) {
            return Vec::new();
        }
    }

    let mut seen = HashSet::new();
    let candidates = substructures(&difference)
        .into_iter()
        .chain([difference])
        .map(|mut candidate| {
            for (residue, n) in floor.residues() {
                candidate.add_residues(residue.clone(), n.into());
            }
            candidate
        })
        .chain((!floor.is_empty()).then(|| floor.clone()));

    let found: Vec<_> = candidates
        .filter(|c| !c.is_empty() && c.mass() <= ceiling && seen.insert(c.to_string()))
        .collect();
    debug!(found = found.len(), %min, %max, %ceiling, "generated bounded compositions");
    found
}

/// Sorts by mass, breaking ties by canonical string so that the order is total
pub fn sort_by_mass(compositions: &mut [Composition], ascending: bool) {
    if ascending {
        compositions.sort_by_cached_key(|c| (c.mass(), c.to_string()));
    } else {
        compositions.sort_by_cached_key(|c| (Reverse(c.mass()), c.to_string()));
    }
}

// Private Helpers =====================================================================================================

fn collect_substructures<'a, 'r>(
    composition: &Composition<'a, 'r>,
    seen: &mut HashSet<String>,
    found: &mut Vec<Composition<'a, 'r>>,
) {
    let residues: Vec<_> = composition.residues().map(|(r, _)| r.clone()).collect();
    for residue in residues {
        let mut smaller = composition.clone();
        // NOTE: Every listed residue has a count of at least one, so removing one can't fail
        smaller.add_residues(residue, -1);
        if smaller.is_valid_structure() && seen.insert(smaller.to_string()) {
            found.push(smaller.clone());
            collect_substructures(&smaller, seen, found);
        }
    }
}

// Module Tests ========================================================================================================
