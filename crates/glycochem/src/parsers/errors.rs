use miette::Diagnostic;
use nom::{IResult, error::ErrorKind};
use nom_miette::{FromExternalError, LabeledError, LabeledErrorKind, LabeledParseError};
use thiserror::Error;

use crate::{atoms::errors::AtomicLookupError, residues::errors::ResidueLookupError};

pub type CompositionError = LabeledError<GlycochemErrorKind>;
pub type ParseResult<'a, O, K = GlycochemErrorKind> = IResult<&'a str, O, LabeledParseError<'a, K>>;

pub trait UserErrorKind: From<GlycochemErrorKind> + From<ErrorKind> {}
impl<T: From<GlycochemErrorKind> + From<ErrorKind>> UserErrorKind for T {}

// NOTE: Public so that other parsers using `molecule` or `composition` as building blocks can inspect errors
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum GlycochemErrorKind {
    #[error(
        "expected a chemical formula (like C6H12O6, C^13H3, or -H2O) optionally followed by charges (like + or --)"
    )]
    ExpectedMolecule,

    #[error("expected an element (like Na) optionally followed by a count and an isotope (like C2^13)")]
    ExpectedAtomicOffset,

    #[diagnostic(help(
        "a 0 value doesn't make sense here, if you've mistakenly included a leading zero, like \
        NH02, try just NH2 instead"
    ))]
    #[error("counts cannot start with 0")]
    ExpectedNoLeadingZero,

    #[error("expected an ASCII digit 1-9")]
    ExpectedDigit,

    #[error("expected an element symbol")]
    ExpectedElementSymbol,

    #[error("expected an isotopic mass number after '^'")]
    ExpectedMassNumber,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[error("expected a composition, like Hex:3,HexNAc:2--redEnd")]
    ExpectedComposition,

    #[error(
        "expected a fragment composition, like Hex#x_0_2:1--Hex:2--redEnd or Hex:1,HexNAc:1--Sugar#b"
    )]
    ExpectedFragmentComposition,

    #[error("expected a residue name optionally followed by ':' and a count, like HexNAc:2")]
    ExpectedResidueToken,

    #[error("expected a residue name")]
    ExpectedResidueName,

    #[error("expected a fragment type name containing '#', like Sugar#y or Hex#x_0_2")]
    ExpectedFragmentName,

    #[error("expected a reducing end, like redEnd or Cer=547.5328")]
    ExpectedReducingEnd,

    #[diagnostic(help("custom residues are written as a name, '=', and a decimal mass, like Cer=547.5328"))]
    #[error("expected a decimal mass after '='")]
    ExpectedCustomMass,

    #[diagnostic(help("segments of a composition are separated by '--'"))]
    #[error("expected '--'")]
    ExpectedSegmentSeparator,

    #[diagnostic(help(
        "root-side fragments (A, B, and C cleavages) can only be placed after the final '--', \
        whilst other fragments are leaves and must come first"
    ))]
    #[error("the fragment type {0:?} cannot be placed here")]
    MisplacedFragment(String),

    #[diagnostic(transparent)]
    #[error(transparent)]
    AtomicLookupError(Box<AtomicLookupError>),

    #[diagnostic(transparent)]
    #[error(transparent)]
    ResidueLookupError(Box<ResidueLookupError>),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help("check the unparsed region for errors, or remove it from the rest of the input"))]
    #[error("could not interpret the full input")]
    Incomplete,
}

impl LabeledErrorKind for GlycochemErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            // NOTE: Stuck with this nested match until either `box_patterns` or `deref_patterns` are stabilized
            Self::AtomicLookupError(e) => match **e {
                AtomicLookupError::Element(..) => "element not found",
                AtomicLookupError::Isotope(..) => "isotope not found",
                AtomicLookupError::Particle(..) => "particle not found",
                AtomicLookupError::Abundance(..) => "no natural abundance",
            },
            Self::ResidueLookupError(e) => e.label(),
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedMassNumber => "expected a mass number",
            Self::ExpectedNoLeadingZero => "expected non-zero",
            Self::ExpectedResidueName => "expected a residue",
            Self::ExpectedFragmentName => "expected a fragment",
            Self::ExpectedReducingEnd => "expected a reducing end",
            Self::ExpectedCustomMass => "expected a mass",
            Self::ExpectedSegmentSeparator => "expected '--'",
            Self::MisplacedFragment(_) => "misplaced fragment",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
            _ => return None,
        })
    }
}

impl<'a> FromExternalError<'a, AtomicLookupError> for GlycochemErrorKind {
    const FATAL: bool = true;

    fn from_external_error(input: &'a str, e: AtomicLookupError) -> LabeledParseError<'a, Self> {
        LabeledParseError::new(input, Self::AtomicLookupError(Box::new(e)))
    }
}

impl<'a> FromExternalError<'a, ResidueLookupError> for GlycochemErrorKind {
    const FATAL: bool = true;

    fn from_external_error(input: &'a str, e: ResidueLookupError) -> LabeledParseError<'a, Self> {
        LabeledParseError::new(input, Self::ResidueLookupError(Box::new(e)))
    }
}

impl<'a> FromExternalError<'a, Self> for GlycochemErrorKind {
    const FATAL: bool = true;

    fn from_external_error(input: &'a str, e: Self) -> LabeledParseError<'a, Self> {
        LabeledParseError::new(input, e)
    }
}

impl From<ErrorKind> for GlycochemErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}
