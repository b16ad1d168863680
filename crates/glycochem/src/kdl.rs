// Standard Library Imports
use std::{iter, ops::Deref};

// External Crate Imports
use knuffel::{
    DecodeScalar,
    ast::{self, Integer, Literal, Radix, TypeName},
    decode::{Context, Kind},
    errors::{DecodeError, ExpectedType},
    span::{Span, Spanned},
    traits::ErrorSpan,
};
use miette::{Diagnostic, LabeledSpan, NamedSource};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{errors::GlycochemError, residues::InvalidKeywordError};

// Validation of Decoded KDL ===========================================================================================

pub(crate) type KdlResult<T> = Result<T, KdlErrorKind>;

pub(crate) trait ValidateInto<'c, T> {
    type Context: 'c;

    fn validate(self, ctx: Self::Context) -> KdlResult<T>;
}

#[derive(Debug, Error)]
#[error("failed to validate {kind_of_file}")]
pub(crate) struct KdlError {
    kind_of_file: &'static str,
    kdl: NamedSource<String>,
    #[source]
    kind: KdlErrorKind,
}

impl Diagnostic for KdlError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.kdl)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.kind.labels().into_iter().map(|(s, l)| {
            LabeledSpan::new_with_span(Some(l.to_owned()), s)
        })))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&self.kind)
    }
}

#[derive(Debug, Clone, Error, Diagnostic)]
pub(crate) enum KdlErrorKind {
    #[error("isotope mass numbers must be greater than zero")]
    #[diagnostic(help("double-check for typos, mass numbers count the protons and neutrons of an isotope"))]
    ZeroMassNumber(Span),

    #[error("the element {2:?} has already been defined")]
    #[diagnostic(help("consider consolidating duplicate elements"))]
    DuplicateElement(Span, Span, String),

    #[error("the isotope {2}-{3} has already been defined")]
    #[diagnostic(help("consider consolidating duplicate isotopes"))]
    DuplicateIsotope(Span, Span, String, u32),

    #[error("the particle {2:?} has already been defined")]
    #[diagnostic(help("consider consolidating duplicate particles"))]
    DuplicateParticle(Span, Span, String),

    #[error("no electron particle was defined")]
    #[diagnostic(help("charge arithmetic requires a particle with the symbol \"e\""))]
    MissingElectron(Span),

    #[error("the name {2:?} has already been used by another residue")]
    #[diagnostic(help("residue names and synonyms are case-insensitive, so they must be unique ignoring case"))]
    DuplicateResidueName(Span, Span, String),

    #[error("the perderivatization {2:?} has already been defined")]
    #[diagnostic(help("perderivatization names are case-insensitive, so they must be unique ignoring case"))]
    DuplicatePerderivatization(Span, Span, String),

    #[error("the name {1:?} can't be written in a composition")]
    #[diagnostic(help("names must be non-empty and may only contain ASCII letters, digits, and the characters _()[]'"))]
    InvalidName(Span, String),

    #[error("residue database file contained an unrecognised keyword")]
    Keyword(
        Span,
        #[source]
        #[diagnostic_source]
        InvalidKeywordError,
    ),

    #[error("residue database file contained an invalid chemical formula")]
    Formula(
        Span,
        #[source]
        #[diagnostic_source]
        Box<GlycochemError>,
    ),

    #[error("the substituent {1:?} is undefined")]
    #[diagnostic(help("double-check for typos, or add {1:?} to the substituents section"))]
    UndefinedSubstituent(Span, String),

    #[error("position {1} lies beyond the {2} carbons of this monosaccharide")]
    #[diagnostic(help("positions are counted from 1, negative positions mark an unknown location"))]
    PositionOutOfRange(Span, i32, u32),

    #[error("a ring of size {1} closing at carbon {2} does not fit in a chain of {3} carbons")]
    #[diagnostic(help("the ring-closing carbon is the anomeric position plus the ring size minus 2"))]
    RingOutOfRange(Span, u32, u32, u32),
}

impl KdlErrorKind {
    fn labels(&self) -> Vec<(Span, &'static str)> {
        match self {
            Self::ZeroMassNumber(s) => vec![(*s, "zero mass number")],
            Self::DuplicateElement(s1, s2, _)
            | Self::DuplicateIsotope(s1, s2, _, _)
            | Self::DuplicateParticle(s1, s2, _)
            | Self::DuplicateResidueName(s1, s2, _)
            | Self::DuplicatePerderivatization(s1, s2, _) => {
                vec![(*s1, "first defined here"), (*s2, "then again here")]
            }
            Self::MissingElectron(s) => vec![(*s, "no electron in this section")],
            Self::InvalidName(s, _) => vec![(*s, "invalid name")],
            Self::Keyword(s, _) => vec![(*s, "unrecognised keyword")],
            Self::Formula(s, _) => vec![(*s, "invalid chemical formula")],
            Self::UndefinedSubstituent(s, _) => vec![(*s, "undefined substituent")],
            Self::PositionOutOfRange(s, _, _) => vec![(*s, "position out of range")],
            Self::RingOutOfRange(s, _, _, _) => vec![(*s, "ring out of range")],
        }
    }

    pub(crate) fn finalize(
        self,
        kind_of_file: &'static str,
        file_name: impl AsRef<str>,
        kdl: impl AsRef<str>,
    ) -> KdlError {
        let kdl = NamedSource::new(file_name, kdl.as_ref().to_owned());
        KdlError {
            kind_of_file,
            kdl,
            kind: self,
        }
    }
}

// Names are reported on the node that introduced them
pub(crate) fn check_unique<'n>(
    seen: &mut ahash::HashMap<String, Span>,
    span: Span,
    names: impl IntoIterator<Item = &'n str>,
) -> KdlResult<()> {
    for name in names {
        if let Some(first_span) = seen.insert(name.to_lowercase(), span) {
            return Err(KdlErrorKind::DuplicateResidueName(
                first_span,
                span,
                name.to_owned(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn names_of<'n>(name: &'n str, synonyms: &'n [String]) -> impl Iterator<Item = &'n str> {
    iter::once(name).chain(synonyms.iter().map(String::as_str))
}

// Lossless Parsing of KDL Numbers to Decimal ==========================================================================

#[derive(Debug, Default)]
pub(crate) struct DecimalKdl(pub(crate) Decimal);

impl<S: ErrorSpan> DecodeScalar<S> for DecimalKdl {
    fn type_check(type_name: &Option<Spanned<TypeName, S>>, ctx: &mut Context<S>) {
        if let Some(t) = type_name {
            ctx.emit_error(DecodeError::TypeName {
                span: t.span().clone(),
                found: Some(t.deref().clone()),
                expected: ExpectedType::no_type(),
                rust_type: "Decimal",
            });
        }
    }

    fn raw_decode(
        value: &Spanned<Literal, S>,
        ctx: &mut Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match &**value {
            Literal::Decimal(ast::Decimal(s)) | Literal::Int(Integer(Radix::Dec, s)) => {
                let res = if s.contains(['e', 'E']) {
                    Decimal::from_scientific(s)
                } else {
                    Decimal::from_str_exact(s)
                };
                match res {
                    Ok(d) => Ok(Self(d)),
                    Err(e) => {
                        ctx.emit_error(DecodeError::conversion(value, Box::new(e)));
                        Ok(Self::default())
                    }
                }
            }
            unsupported => {
                ctx.emit_error(DecodeError::unsupported(
                    value,
                    format!(
                        "expected a decimal number, found {}",
                        Kind::from(unsupported)
                    ),
                ));
                Ok(Self::default())
            }
        }
    }
}

// Module Tests ========================================================================================================
