// External Crate Imports
use nom::{
    branch::alt,
    character::complete::{char, one_of},
    combinator::{cut, map, opt, recognize},
    multi::{many0, many1},
    sequence::{pair, preceded, tuple},
};
use nom_miette::{map_res, wrap_err};

// Local Crate Imports
use super::{
    errors::{GlycochemErrorKind, ParseResult},
    primitives::{count, lowercase, uppercase},
};
use crate::{AtomicDatabase, Count, Element, MassNumber, Molecule};

// Public API ==========================================================================================================

/// Molecule
///   = "0"
///   | [ "-" ] , { Atomic Offset }- , { Charge }
///   ;
pub fn molecule<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Molecule<'a>> {
    let empty = map(char('0'), move |_| Molecule::empty(db));

    let formula = map(
        tuple((opt(char('-')), many1(atomic_offset(db)), many0(charge))),
        move |(negation, offsets, charges)| {
            let sign = if negation.is_some() { -1 } else { 1 };
            let mut molecule = Molecule::empty(db);
            for (element, count) in offsets {
                molecule.add_element(element, sign * i64::from(count));
            }
            molecule.adjust_charge(charges.into_iter().sum());
            molecule
        },
    );

    wrap_err(alt((empty, formula)), GlycochemErrorKind::ExpectedMolecule)
}

// Private Sub-Parsers =================================================================================================

/// Atomic Offset = Element Symbol , [ Count ] , [ "^" , Mass Number ] ;
fn atomic_offset<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, (Element<'a>, Count)> {
    let parser = map_res(atomic_offset_expr, move |(symbol, count, mass_number)| {
        let element = if let Some(mass_number) = mass_number {
            Element::new_isotope(db, symbol, mass_number)
        } else {
            Element::new(db, symbol)
        };
        element.map(|e| (e, count))
    });
    wrap_err(parser, GlycochemErrorKind::ExpectedAtomicOffset)
}

// ---------------------------------------------------------------------------------------------------------------------

/// Atomic Offset = Element Symbol , [ Count ] , [ "^" , Mass Number ] ;
fn atomic_offset_expr(i: &str) -> ParseResult<(&str, Count, Option<MassNumber>)> {
    let optional_count = map(opt(count), Option::unwrap_or_default);
    let mass_number = map(
        wrap_err(count, GlycochemErrorKind::ExpectedMassNumber),
        |c| MassNumber(c.0),
    );
    let optional_isotope = opt(preceded(char('^'), cut(mass_number)));
    tuple((element_symbol, optional_count, optional_isotope))(i)
}

/// Element Symbol = uppercase , [ lowercase ] ;
fn element_symbol(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(uppercase, opt(lowercase)));
    wrap_err(parser, GlycochemErrorKind::ExpectedElementSymbol)(i)
}

/// Charge = "+" | "-" ;
fn charge(i: &str) -> ParseResult<i64> {
    map(one_of("+-"), |c| if c == '+' { 1 } else { -1 })(i)
}

// Module Tests ========================================================================================================
