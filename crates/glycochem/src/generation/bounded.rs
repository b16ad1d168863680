// External Crate Imports
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{Composition, Residue};

// Public API ==========================================================================================================

/// Lazily walks every combination of residue counts between two compositions, skipping the empty combination and any
/// composition heavier than the mass ceiling
///
/// Candidates are ordered like the digits of a number, with the first residue of `max` counting up fastest. The
/// generator is forward-only: [`BoundedGenerator::peek()`] looks ahead without consuming anything, and
/// [`BoundedGenerator::advance()`] (or [`Iterator::next()`]) moves past the current candidate.
#[derive(Clone, Debug)]
pub struct BoundedGenerator<'a, 'r> {
    template: Composition<'a, 'r>,
    ranges: Vec<CountRange<'a, 'r>>,
    cursor: Option<Vec<u32>>,
    ceiling: Decimal,
    peeked: Option<Composition<'a, 'r>>,
}

impl<'a, 'r> BoundedGenerator<'a, 'r> {
    /// Counts range over every residue in `max`, from its count in `min` to its count in `max`, and every candidate
    /// uses the mass options of `min`
    #[must_use]
    pub fn new(min: &Composition<'a, 'r>, max: &Composition<'a, 'r>, ceiling: Decimal) -> Self {
        let mut template = Composition::empty(max.db());
        template.set_mass_options(min.mass_options());

        let ranges: Vec<_> = max
            .residues()
            .map(|(residue, hi)| CountRange {
                residue: residue.clone(),
                lo: min.count(residue),
                hi,
            })
            .collect();
        let cursor = ranges
            .iter()
            .all(|r| r.lo <= r.hi)
            .then(|| ranges.iter().map(|r| r.lo).collect());

        Self {
            template,
            ranges,
            cursor,
            ceiling,
            peeked: None,
        }
    }

    /// The next candidate, without moving past it
    pub fn peek(&mut self) -> Option<&Composition<'a, 'r>> {
        if self.peeked.is_none() {
            self.peeked = self.search();
        }
        self.peeked.as_ref()
    }

    /// Returns the next candidate and moves past it
    pub fn advance(&mut self) -> Option<Composition<'a, 'r>> {
        self.peek();
        self.peeked.take()
    }

    // NOTE: Leaves the cursor on the combination after the one returned
    fn search(&mut self) -> Option<Composition<'a, 'r>> {
        while let Some(counts) = self.cursor.clone() {
            self.step();
            if counts.iter().all(|&n| n == 0) {
                continue;
            }

            let mut candidate = self.template.clone();
            for (range, &n) in self.ranges.iter().zip(&counts) {
                candidate.add_residues(range.residue.clone(), n.into());
            }
            if candidate.mass() <= self.ceiling {
                return Some(candidate);
            }
        }
        None
    }

    fn step(&mut self) {
        let Some(counts) = &mut self.cursor else {
            return;
        };
        for (n, range) in counts.iter_mut().zip(&self.ranges) {
            if *n < range.hi {
                *n += 1;
                return;
            }
            *n = range.lo;
        }
        self.cursor = None;
    }
}

impl<'a, 'r> Iterator for BoundedGenerator<'a, 'r> {
    type Item = Composition<'a, 'r>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

// Private Types =======================================================================================================

#[derive(Clone, Debug)]
struct CountRange<'a, 'r> {
    residue: Residue<'a, 'r>,
    lo: u32,
    hi: u32,
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;

    use crate::{AtomicDatabase, MassKind, MassOptions, ResidueDatabase};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);
    static RESIDUES: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&DB));

    fn parse(text: &str) -> Composition<'static, 'static> {
        Composition::new(&RESIDUES, text).unwrap()
    }

    fn strings(generator: BoundedGenerator) -> Vec<String> {
        generator.map(|c| c.to_string()).collect()
    }

    #[test]
    fn first_residue_counts_fastest() {
        let generator = BoundedGenerator::new(
            &Composition::empty(&RESIDUES),
            &parse("Hex:2,HexNAc:1"),
            dec!(10_000),
        );
        assert_eq!(
            strings(generator),
            ["Hex:1", "Hex:2", "HexNAc:1", "Hex:1,HexNAc:1", "Hex:2,HexNAc:1"]
        );
    }

    #[test]
    fn minimum_counts() {
        let generator =
            BoundedGenerator::new(&parse("Hex:1,NeuAc:1"), &parse("Hex:2,HexNAc:1"), dec!(10_000));
        assert_eq!(
            strings(generator),
            ["Hex:1", "Hex:2", "Hex:1,HexNAc:1", "Hex:2,HexNAc:1"]
        );
        let generator = BoundedGenerator::new(&parse("Hex:3"), &parse("Hex:2"), dec!(10_000));
        assert_eq!(strings(generator), Vec::<String>::new());
    }

    #[test]
    fn heavy_candidates_are_skipped() {
        let generator = BoundedGenerator::new(
            &Composition::empty(&RESIDUES),
            &parse("Hex:2,HexNAc:1"),
            dec!(400),
        );
        assert_eq!(
            strings(generator),
            ["Hex:1", "Hex:2", "HexNAc:1", "Hex:1,HexNAc:1"]
        );
    }

    #[test]
    fn peeking_does_not_consume() {
        let mut generator =
            BoundedGenerator::new(&Composition::empty(&RESIDUES), &parse("Hex:2"), dec!(10_000));
        assert_eq!(generator.peek().unwrap().to_string(), "Hex:1");
        assert_eq!(generator.peek().unwrap().to_string(), "Hex:1");
        assert_eq!(generator.advance().unwrap().to_string(), "Hex:1");
        assert_eq!(generator.peek().unwrap().to_string(), "Hex:2");
        assert_eq!(generator.next().unwrap().to_string(), "Hex:2");
        assert!(generator.peek().is_none());
        assert!(generator.advance().is_none());
    }

    #[test]
    fn candidates_share_mass_options() {
        let mut min = Composition::empty(&RESIDUES);
        let perme = RESIDUES.perderivatization("perMe").unwrap();
        min.set_mass_options(MassOptions {
            kind: MassKind::Average,
            perderivatization: Some(perme),
        });
        let mut generator = BoundedGenerator::new(&min, &parse("Hex:1--redEnd"), dec!(10_000));
        let candidate = generator.advance().unwrap();
        assert_eq!(candidate.mass_options(), min.mass_options());
        // Reducing ends aren't carried over from `max`
        assert_eq!(candidate.to_string(), "Hex:1");
        assert!(generator.advance().is_none());
    }
}
