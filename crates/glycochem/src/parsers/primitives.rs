use std::str::FromStr;

use nom::{
    bytes::complete::{take_while1, tag},
    character::complete::{char, digit1, satisfy, u32},
    combinator::{cut, map, map_opt, not, opt, recognize},
    sequence::{pair, preceded, tuple},
};
use nom_miette::{expect, into};
use rust_decimal::Decimal;

use crate::Count;

use super::errors::{GlycochemErrorKind, ParseResult, UserErrorKind};

/// uppercase
///   = "A" | "B" | "C" | "D" | "E" | "F" | "G"
///   | "H" | "I" | "J" | "K" | "L" | "M" | "N"
///   | "O" | "P" | "Q" | "R" | "S" | "T" | "U"
///   | "V" | "W" | "X" | "Y" | "Z"
///   ;
pub fn uppercase<K: UserErrorKind>(i: &str) -> ParseResult<char, K> {
    let parser = satisfy(|c| c.is_ascii_uppercase());
    into(expect(parser, GlycochemErrorKind::ExpectedUppercase))(i)
}

/// lowercase
///   = "a" | "b" | "c" | "d" | "e" | "f" | "g"
///   | "h" | "i" | "j" | "k" | "l" | "m" | "n"
///   | "o" | "p" | "q" | "r" | "s" | "t" | "u"
///   | "v" | "w" | "x" | "y" | "z"
///   ;
pub fn lowercase<K: UserErrorKind>(i: &str) -> ParseResult<char, K> {
    let parser = satisfy(|c| c.is_ascii_lowercase());
    into(expect(parser, GlycochemErrorKind::ExpectedLowercase))(i)
}

/// Count = digit - "0" , { digit } ;
pub fn count<K: UserErrorKind>(i: &str) -> ParseResult<Count, K> {
    let not_zero = expect(
        cut(not(char('0'))),
        GlycochemErrorKind::ExpectedNoLeadingZero,
    );
    let digits = expect(u32, GlycochemErrorKind::ExpectedDigit);
    // SAFETY: The `not_zero` parser has already ruled out a leading 0
    into(map(preceded(not_zero, digits), |c| Count::new(c).unwrap()))(i)
}

/// Residue Name = { letter | digit | "_" | "(" | ")" | "[" | "]" | "'" }- ;
pub fn residue_name<K: UserErrorKind>(i: &str) -> ParseResult<&str, K> {
    let parser = take_while1(is_name_char);
    into(expect(parser, GlycochemErrorKind::ExpectedResidueName))(i)
}

/// Fragment Name = Residue Name , "#" , { Residue Name Character }- ;
pub fn fragment_name<K: UserErrorKind>(i: &str) -> ParseResult<&str, K> {
    let parser = recognize(tuple((
        take_while1(is_name_char),
        char('#'),
        take_while1(is_name_char),
    )));
    into(expect(parser, GlycochemErrorKind::ExpectedFragmentName))(i)
}

/// Custom Mass = [ "-" ] , digit , { digit } , [ "." , digit , { digit } ] ;
pub fn custom_mass<K: UserErrorKind>(i: &str) -> ParseResult<Decimal, K> {
    let number = recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1)))));
    let parser = map_opt(number, |n| Decimal::from_str(n).ok());
    into(expect(parser, GlycochemErrorKind::ExpectedCustomMass))(i)
}

/// Segment Separator = "--" ;
pub fn segment_separator<K: UserErrorKind>(i: &str) -> ParseResult<&str, K> {
    into(expect(tag("--"), GlycochemErrorKind::ExpectedSegmentSeparator))(i)
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_()[]'".contains(c)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_uppercase() {
        let uppercase = uppercase::<GlycochemErrorKind>;
        // Ensure the complete uppercase ASCII alphabet is present
        for c in 'A'..='Z' {
            assert_eq!(uppercase(&c.to_string()), Ok(("", c)));
        }
        // Ensure the complete lowercase ASCII alphabet is absent
        for c in 'a'..='z' {
            assert!(uppercase(&c.to_string()).is_err());
        }
        // Ensure only one character is parsed
        assert_eq!(uppercase("Hg"), Ok(("g", 'H')));
        assert_eq!(uppercase("HG"), Ok(("G", 'H')));
    }

    #[test]
    fn test_lowercase() {
        let lowercase = lowercase::<GlycochemErrorKind>;
        for c in 'a'..='z' {
            assert_eq!(lowercase(&c.to_string()), Ok(("", c)));
        }
        for c in 'A'..='Z' {
            assert!(lowercase(&c.to_string()).is_err());
        }
        assert_eq!(lowercase("hg"), Ok(("g", 'h')));
        assert_eq!(lowercase("hG"), Ok(("G", 'h')));
    }

    #[test]
    fn test_count() {
        let count = count::<GlycochemErrorKind>;
        // Valid Counts
        assert_eq!(count("1"), Ok(("", Count::new(1).unwrap())));
        assert_eq!(count("10"), Ok(("", Count::new(10).unwrap())));
        assert_eq!(count("422"), Ok(("", Count::new(422).unwrap())));
        // Invalid Counts
        assert!(count("0").is_err());
        assert!(count("01").is_err());
        assert!(count("H").is_err());
        assert!(count(":2").is_err());
        // Multiple Counts
        assert_eq!(count("2,Hex"), Ok((",Hex", Count::new(2).unwrap())));
        assert_eq!(count("42--redEnd"), Ok(("--redEnd", Count::new(42).unwrap())));
    }

    #[test]
    fn test_residue_name() {
        let residue_name = residue_name::<GlycochemErrorKind>;
        // Valid Names
        assert_eq!(residue_name("Hex"), Ok(("", "Hex")));
        assert_eq!(residue_name("2AB"), Ok(("", "2AB")));
        assert_eq!(residue_name("Neu5Ac"), Ok(("", "Neu5Ac")));
        assert_eq!(residue_name("perMe(C^13)"), Ok(("^13)", "perMe(C")));
        // Invalid Names
        assert!(residue_name("").is_err());
        assert!(residue_name(":3").is_err());
        assert!(residue_name("#b").is_err());
        // Stops at separators
        assert_eq!(residue_name("HexNAc:2"), Ok((":2", "HexNAc")));
        assert_eq!(residue_name("Hex,dHex"), Ok((",dHex", "Hex")));
        assert_eq!(residue_name("Cer=547.5"), Ok(("=547.5", "Cer")));
        assert_eq!(residue_name("Hex#a_0_2"), Ok(("#a_0_2", "Hex")));
    }

    #[test]
    fn test_fragment_name() {
        let fragment_name = fragment_name::<GlycochemErrorKind>;
        // Valid Names
        assert_eq!(fragment_name("Sugar#b"), Ok(("", "Sugar#b")));
        assert_eq!(fragment_name("Hex#x_0_2:3"), Ok((":3", "Hex#x_0_2")));
        // Invalid Names
        assert!(fragment_name("Hex").is_err());
        assert!(fragment_name("Hex#").is_err());
        assert!(fragment_name("#y").is_err());
    }

    #[test]
    fn test_custom_mass() {
        let custom_mass = custom_mass::<GlycochemErrorKind>;
        // Valid Masses
        assert_eq!(custom_mass("547.5328"), Ok(("", dec!(547.5328))));
        assert_eq!(custom_mass("42"), Ok(("", dec!(42))));
        assert_eq!(custom_mass("-1.5"), Ok(("", dec!(-1.5))));
        // Invalid Masses
        assert!(custom_mass("").is_err());
        assert!(custom_mass(".5").is_err());
        assert!(custom_mass("abc").is_err());
        // Trailing Input
        assert_eq!(custom_mass("12.5.3"), Ok((".3", dec!(12.5))));
        assert_eq!(custom_mass("3.--x"), Ok((".--x", dec!(3))));
    }
}
