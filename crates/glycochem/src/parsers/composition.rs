// External Crate Imports
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, eof, map, opt, peek, recognize, verify},
    multi::separated_list1,
    sequence::{pair, preceded, separated_pair, terminated},
};
use nom_miette::{map_res, wrap_err};
use rust_decimal::Decimal;

// Local Crate Imports
use super::{
    errors::{GlycochemErrorKind, ParseResult},
    primitives::{count, custom_mass, fragment_name, residue_name, segment_separator},
};
use crate::{Composition, Count, CustomSubstituent, FragmentType, Residue, ResidueDatabase};

// Public API ==========================================================================================================

/// Composition = Lone Reducing End | Core , [ "--" , Reducing End ] ;
pub fn composition<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Composition<'a, 'r>> {
    let lone = map(lone_reducing_end(db), |reducing_end| Segments {
        root: Some(Root::ReducingEnd(reducing_end)),
        ..Segments::default()
    });
    let with_core = map(
        pair(core(db), opt(preceded(segment_separator, reducing_end(db)))),
        |(core, reducing_end)| Segments {
            core,
            root: reducing_end.map(Root::ReducingEnd),
            ..Segments::default()
        },
    );
    let parser = map(alt((lone, with_core)), move |segments| {
        segments.assemble(Composition::empty(db))
    });
    wrap_err(parser, GlycochemErrorKind::ExpectedComposition)
}

/// Fragment Composition
///   = Leaves , [ "--" , ( Root Fragment | Lone Reducing End | Core , [ "--" , Root ] ) ]
///   | [ Core ] , "--" , Root
///   ;
pub fn fragment_composition<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Composition<'a, 'r>> {
    let after_leaves = alt((
        map(root_fragment(db), |f| (Vec::new(), Some(Root::Fragment(f)))),
        map(lone_reducing_end(db), |r| {
            (Vec::new(), Some(Root::ReducingEnd(r)))
        }),
        pair(core(db), opt(preceded(segment_separator, root(db)))),
    ));
    let with_leaves = map(
        pair(leaves(db), opt(preceded(segment_separator, after_leaves))),
        |(leaves, rest)| {
            let (core, root) = rest.unwrap_or_default();
            Segments { leaves, core, root }
        },
    );
    let without_leaves = map(
        separated_pair(opt(core(db)), segment_separator, root(db)),
        |(core, root)| Segments {
            core: core.unwrap_or_default(),
            root: Some(root),
            ..Segments::default()
        },
    );
    let parser = map(alt((with_leaves, without_leaves)), move |segments| {
        segments.assemble(Composition::empty_fragment(db))
    });
    wrap_err(parser, GlycochemErrorKind::ExpectedFragmentComposition)
}

// Parsed Segments =====================================================================================================

#[derive(Debug)]
enum Root<'a, 'r> {
    Fragment(FragmentType<'a, 'r>),
    ReducingEnd(Residue<'a, 'r>),
}

#[derive(Debug)]
struct Segments<'a, 'r> {
    leaves: Vec<(FragmentType<'a, 'r>, Count)>,
    core: Vec<(Residue<'a, 'r>, Count)>,
    root: Option<Root<'a, 'r>>,
}

// NOTE: Can't be derived, since that would require `Residue` and `FragmentType` to implement `Default`
impl Default for Segments<'_, '_> {
    fn default() -> Self {
        Self {
            leaves: Vec::new(),
            core: Vec::new(),
            root: None,
        }
    }
}

impl<'a, 'r> Segments<'a, 'r> {
    // NOTE: Leaf and root fragments are checked by their parsers, and counts are never zero, so none of these
    // additions can fail
    fn assemble(self, mut composition: Composition<'a, 'r>) -> Composition<'a, 'r> {
        for (residue, count) in self.core {
            composition.add_residues(residue, count.into());
        }
        for (fragment, count) in self.leaves {
            composition.add_leaf_fragments(fragment, count.into());
        }
        match self.root {
            Some(Root::Fragment(fragment)) => {
                composition.add_fragment(fragment);
            }
            Some(Root::ReducingEnd(reducing_end)) => {
                composition.set_reducing_end(Some(reducing_end));
            }
            None => (),
        }
        composition
    }
}

// Private Sub-Parsers =================================================================================================

/// Core = Residue Token , { "," , Residue Token } ;
fn core<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Vec<(Residue<'a, 'r>, Count)>> {
    separated_list1(char(','), residue_token(db))
}

/// Leaves = Leaf Token , { "," , Leaf Token } ;
fn leaves<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Vec<(FragmentType<'a, 'r>, Count)>> {
    separated_list1(char(','), leaf_token(db))
}

/// Root = Root Fragment | Reducing End ;
fn root<'a, 'r, 's>(db: &'r ResidueDatabase<'a>) -> impl FnMut(&'s str) -> ParseResult<'s, Root<'a, 'r>> {
    alt((
        map(root_fragment(db), Root::Fragment),
        map(reducing_end(db), Root::ReducingEnd),
    ))
}

// ---------------------------------------------------------------------------------------------------------------------

/// Residue Token = ( Custom Residue | Residue Name ) , [ ":" , Count ] ;
fn residue_token<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, (Residue<'a, 'r>, Count)> {
    let custom = map(custom_residue, |(name, mass)| {
        Residue::from(CustomSubstituent::new(name, mass, false))
    });
    let named = map_res(residue_name, move |name| db.residue(name));
    let parser = pair(alt((custom, named)), optional_count);
    wrap_err(parser, GlycochemErrorKind::ExpectedResidueToken)
}

/// Leaf Token = Fragment Name , [ ":" , Count ] ;
fn leaf_token<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, (FragmentType<'a, 'r>, Count)> {
    let leaf = map_res(fragment_name, move |name| placed_fragment(db, name, false));
    pair(leaf, optional_count)
}

/// Root Fragment = Fragment Name ;
fn root_fragment<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, FragmentType<'a, 'r>> {
    map_res(fragment_name, move |name| placed_fragment(db, name, true))
}

/// Reducing End = Custom Residue | Residue Name ;
fn reducing_end<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Residue<'a, 'r>> {
    let custom = map(custom_residue, |(name, mass)| {
        Residue::from(CustomSubstituent::new(name, mass, true))
    });
    let named = map_res(residue_name, move |name| {
        db.reducing_end(name).map(Residue::from)
    });
    wrap_err(alt((custom, named)), GlycochemErrorKind::ExpectedReducingEnd)
}

/// Lone Reducing End = Reducing End , EOF ;
///
/// Canonical residue tokens always carry a count, so a single uncounted token is only read as a reducing end when it
/// is custom or actually names one
fn lone_reducing_end<'a, 'r, 's>(
    db: &'r ResidueDatabase<'a>,
) -> impl FnMut(&'s str) -> ParseResult<'s, Residue<'a, 'r>> {
    let known = verify(residue_name, move |name: &str| db.reducing_end(name).is_ok());
    let lone = terminated(alt((recognize(custom_residue), known)), eof);
    preceded(peek(lone), reducing_end(db))
}

// ---------------------------------------------------------------------------------------------------------------------

/// Custom Residue = Residue Name , "=" , Custom Mass ;
fn custom_residue(i: &str) -> ParseResult<(&str, Decimal)> {
    separated_pair(residue_name, char('='), cut(custom_mass))(i)
}

/// Optional Count = [ ":" , Count ] ;
fn optional_count(i: &str) -> ParseResult<Count> {
    map(opt(preceded(char(':'), cut(count))), Option::unwrap_or_default)(i)
}

fn placed_fragment<'a, 'r>(
    db: &'r ResidueDatabase<'a>,
    name: &str,
    at_root: bool,
) -> Result<FragmentType<'a, 'r>, GlycochemErrorKind> {
    let fragment = db
        .fragment(name)
        .map_err(|e| GlycochemErrorKind::ResidueLookupError(Box::new(e)))?;
    if fragment.is_root_side() == at_root {
        Ok(fragment)
    } else {
        Err(GlycochemErrorKind::MisplacedFragment(name.to_owned()))
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use nom_miette::final_parser;
    use once_cell::sync::Lazy;

    use crate::{AtomicDatabase, testing_tools::assert_miette_contains};

    use super::*;

    static DB: Lazy<AtomicDatabase> = Lazy::new(AtomicDatabase::default);
    static RESIDUES: Lazy<ResidueDatabase> = Lazy::new(|| ResidueDatabase::with_defaults(&DB));

    fn parse(text: &str) -> String {
        final_parser(composition(&RESIDUES))(text)
            .unwrap()
            .to_string()
    }

    fn parse_fragment(text: &str) -> String {
        final_parser(fragment_composition(&RESIDUES))(text)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_optional_count() {
        assert_eq!(optional_count(":3"), Ok(("", Count::new(3).unwrap())));
        assert_eq!(optional_count(",Hex"), Ok((",Hex", Count::default())));
        assert_eq!(optional_count("--redEnd"), Ok(("--redEnd", Count::default())));
        assert!(optional_count(":0").is_err());
        assert!(optional_count(":x").is_err());
    }

    #[test]
    fn test_custom_residue() {
        assert_eq!(
            custom_residue("Cer=547.5328"),
            Ok(("", ("Cer", Decimal::new(5_475_328, 4))))
        );
        assert_eq!(
            custom_residue("Tag=100:2"),
            Ok((":2", ("Tag", Decimal::from(100))))
        );
        assert!(custom_residue("Cer").is_err());
        assert!(custom_residue("Cer=").is_err());
    }

    #[test]
    fn test_composition() {
        assert_eq!(parse("Hex:3,HexNAc:2"), "Hex:3,HexNAc:2");
        // Counts default to 1, and tokens are reordered and merged
        assert_eq!(parse("HexNAc,Hex:2,Hex"), "Hex:3,HexNAc:1");
        // Monosaccharides are written before substituents
        assert_eq!(parse("S:1,HexA:1,HexNAc:1"), "HexA:1,HexNAc:1,S:1");
        // Lookups ignore case and accept synonyms
        assert_eq!(parse("hex:1,neu5ac:2--REDEND"), "Hex:1,NeuAc:2--redEnd");
        assert_eq!(parse("Hex:2,Cer=1.5:1--2AB"), "Hex:2,Cer=1.5000:1--2AB");
        assert_eq!(parse("Hex:1--Cer=547.53285"), "Hex:1--Cer=547.5329");
        // A single uncounted reducing end
        assert_eq!(parse("redEnd"), "redEnd");
        assert_eq!(parse("Cer=547.5328"), "Cer=547.5328");
        assert_eq!(parse("NAc"), "NAc:1");
    }

    #[test]
    fn test_fragment_composition() {
        assert_eq!(
            parse_fragment("Sugar#y:1--Hex:2,HexNAc:2--redEnd"),
            "Sugar#y:1--Hex:2,HexNAc:2--redEnd"
        );
        assert_eq!(parse_fragment("Hex:1,HexNAc:1--Sugar#b"), "Hex:1,HexNAc:1--Sugar#b");
        assert_eq!(
            parse_fragment("Hex#x_0_2,Sugar#y:2--Hex:1--Hex#a_2_4"),
            "Hex#x_0_2:1,Sugar#y:2--Hex:1--Hex#a_2_4"
        );
        // Segments after the leaves can be a lone root
        assert_eq!(parse_fragment("Sugar#y:2--Sugar#c"), "Sugar#y:2--Sugar#c");
        assert_eq!(parse_fragment("Hex#x_0_2:1--redEnd"), "Hex#x_0_2:1--redEnd");
        assert_eq!(parse_fragment("Sugar#z:1--Hex:1"), "Sugar#z:1--Hex:1");
        assert_eq!(parse_fragment("Sugar#z"), "Sugar#z:1");
        assert_eq!(parse_fragment("--Sugar#b"), "--Sugar#b");
    }

    #[test]
    fn test_invalid_compositions() {
        let composition = |text| final_parser(composition(&RESIDUES))(text);
        assert_miette_contains!(composition(""), "expected a composition");
        assert_miette_contains!(
            composition("Hex:2,Fuc:1"),
            "the residue \"Fuc\" could not be found",
            "residue not found"
        );
        assert_miette_contains!(
            composition("Hex:1--Hex"),
            "the reducing end \"Hex\" could not be found"
        );
        assert_miette_contains!(composition("Hex:0"), "counts cannot start with 0");
        assert_miette_contains!(composition("Hex:1--redEnd--redEnd"), "could not interpret the full input");
        assert_miette_contains!(composition("Hex:1--Cer=x"), "expected a decimal mass after '='");
    }

    #[test]
    fn test_invalid_fragment_compositions() {
        let fragment = |text| final_parser(fragment_composition(&RESIDUES))(text);
        assert_miette_contains!(
            fragment("Sugar#b:1--Hex:2"),
            "the fragment type \"Sugar#b\" cannot be placed here",
            "misplaced fragment"
        );
        assert_miette_contains!(
            fragment("Hex:2--Sugar#y"),
            "the fragment type \"Sugar#y\" cannot be placed here"
        );
        assert_miette_contains!(
            fragment("Hex#x_0_5:1--Hex:1"),
            "the fragment type \"Hex#x_0_5\" could not be found",
            "fragment type not found"
        );
        assert_miette_contains!(fragment("Hex:1"), "expected a fragment composition");
    }
}
