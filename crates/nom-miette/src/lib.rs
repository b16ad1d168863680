//! Glue for turning `nom` parse failures into labelled `miette` diagnostics

use std::fmt;

use ahash::HashMap;
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::{all_consuming, complete, consumed},
    error::ParseError,
};
use thiserror::Error;

// Public API ==========================================================================================================

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{error}")]
pub struct LabeledError<E: LabeledErrorKind> {
    full_input: String,
    labels: Vec<LabeledSpan>,
    error: ErrorTree<E>,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ErrorTree<E: LabeledErrorKind> {
    #[error("{kind}")]
    Node {
        kind: E,
        #[source]
        source: Option<Box<LabeledError<E>>>,
    },
    #[error("attempted {} parse branches unsuccessfully", .0.len())]
    Branch(Vec<LabeledError<E>>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LabeledParseError<'a, E> {
    input: &'a str,
    length: usize,
    kind: E,
    alternatives: Vec<LabeledParseError<'a, E>>,
    source: Option<Box<LabeledParseError<'a, E>>>,
}

pub trait LabeledErrorKind: Diagnostic + Clone + Eq + From<nom::error::ErrorKind> {
    fn label(&self) -> Option<&'static str> {
        None
    }
}

/// Implemented by error kinds that can absorb the errors of fallible functions called mid-parse (see [`map_res`])
pub trait FromExternalError<'a, E>: Sized {
    const FATAL: bool = false;

    fn from_external_error(input: &'a str, error: E) -> LabeledParseError<'a, Self>;
}

impl<E: LabeledErrorKind> LabeledError<E> {
    #[must_use]
    pub const fn kind(&self) -> Option<&E> {
        if let ErrorTree::Node { kind, .. } = &self.error {
            Some(kind)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn error(&self) -> &ErrorTree<E> {
        &self.error
    }
}

impl<'a, E: LabeledErrorKind> LabeledParseError<'a, E> {
    pub fn new(input: &'a str, kind: E) -> Self {
        Self::new_with_source(input, kind, None)
    }

    pub fn new_with_source(input: &'a str, kind: E, source: Option<Self>) -> Self {
        Self {
            input,
            length: 0,
            kind,
            alternatives: Vec::new(),
            source: source.map(Box::new),
        }
    }

    pub const fn kind(&self) -> &E {
        &self.kind
    }

    fn convert<K: LabeledErrorKind + From<E>>(self) -> LabeledParseError<'a, K> {
        LabeledParseError {
            input: self.input,
            length: self.length,
            kind: self.kind.into(),
            alternatives: self
                .alternatives
                .into_iter()
                .map(LabeledParseError::convert)
                .collect(),
            source: self.source.map(|s| Box::new(s.convert())),
        }
    }
}

pub fn final_parser<'a, O, P, E>(parser: P) -> impl FnMut(&'a str) -> Result<O, LabeledError<E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    let mut parser = all_consuming(complete(parser));
    move |input| {
        parser.parse(input).finish().map(|(_, c)| c).map_err(|e| {
            let mut error = e.into_final_error(input);
            error.bubble_labels();
            error
        })
    }
}

pub fn map_res<'a, O1, O2, E1, E2, F, G>(
    parser: F,
    mut f: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, O2, LabeledParseError<'a, E1>>
where
    E1: LabeledErrorKind + FromExternalError<'a, E2>,
    F: Copy + Parser<&'a str, O1, LabeledParseError<'a, E1>>,
    G: Copy + FnMut(O1) -> Result<O2, E2>,
{
    move |input| {
        let i = input;
        let (input, (consumed, o1)) = consumed(parser)(input)?;
        match f(o1) {
            Ok(o2) => Ok((input, o2)),
            Err(e) => {
                let e = LabeledParseError {
                    length: consumed.len(),
                    ..E1::from_external_error(i, e)
                };
                Err(if E1::FATAL {
                    Err::Failure(e)
                } else {
                    Err::Error(e)
                })
            }
        }
    }
}

pub fn wrap_err<'a, O, P, E>(
    mut parser: P,
    kind: E,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, LabeledParseError<'a, E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|e| LabeledParseError::new_with_source(i, kind.clone(), Some(e))))
    }
}

pub fn expect<'a, O, E, P>(
    mut parser: P,
    kind: E,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, LabeledParseError<'a, E>>
where
    E: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, E>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|_| LabeledParseError::new(i, kind.clone())))
    }
}

/// Lifts a parser using one error kind into one using a more general error kind
pub fn into<'a, O, E1, E2, P>(
    mut parser: P,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, LabeledParseError<'a, E2>>
where
    E1: LabeledErrorKind,
    E2: LabeledErrorKind + From<E1>,
    P: Parser<&'a str, O, LabeledParseError<'a, E1>>,
{
    move |i| parser.parse(i).map_err(|e| e.map(LabeledParseError::convert))
}

// Diagnostic Rendering ================================================================================================

impl<E: LabeledErrorKind> Diagnostic for LabeledError<E> {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.full_input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if let ErrorTree::Node { kind, .. } = &self.error {
            kind.help()
        } else {
            None
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if let ErrorTree::Branch(related) = &self.error {
            Some(Box::new(related.iter().map(|e| e as &dyn Diagnostic)))
        } else {
            None
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        if let ErrorTree::Node { source, .. } = &self.error {
            source.as_ref().map(|e| &**e as &dyn Diagnostic)
        } else {
            None
        }
    }
}

impl<E: LabeledErrorKind> LabeledError<E> {
    // NOTE: Labels live on the innermost errors, so they are pulled up to the first error that miette will render
    fn bubble_labels(&mut self) {
        if self.labels.is_empty() {
            match &mut self.error {
                ErrorTree::Node {
                    source: Some(child),
                    ..
                } => {
                    child.bubble_labels();
                    self.labels = child.labels.drain(..).collect();
                }
                ErrorTree::Branch(alternatives) => {
                    let new_labels = alternatives.iter_mut().flat_map(|child| {
                        child.bubble_labels();
                        child.labels.drain(..)
                    });
                    self.labels = Self::merge_labels(new_labels);
                }
                ErrorTree::Node { .. } => (),
            }
        }
    }

    fn merge_labels(labels: impl Iterator<Item = LabeledSpan>) -> Vec<LabeledSpan> {
        let mut span_order = Vec::new();
        let mut span_map: HashMap<SourceSpan, Vec<String>> = HashMap::default();
        for labeled_span in labels {
            let span = *labeled_span.inner();
            let Some(label) = labeled_span.label() else {
                continue;
            };
            span_map
                .entry(span)
                .or_insert_with(|| {
                    span_order.push(span);
                    Vec::new()
                })
                .push(label.to_owned());
        }
        span_order
            .into_iter()
            .map(|span| {
                let label = span_map[&span].join(" or ");
                LabeledSpan::new_with_span(Some(label), span)
            })
            .collect()
    }
}

impl<E: LabeledErrorKind> LabeledParseError<'_, E> {
    fn into_final_error(self, full_input: &str) -> LabeledError<E> {
        let source = self
            .source
            .clone()
            .map(|e| Box::new(e.into_final_error(full_input)));
        let alternatives: Vec<_> = self
            .alternatives
            .iter()
            .cloned()
            .map(|e| e.into_final_error(full_input))
            .collect();
        // NOTE: The additional space is added so that Diagnostic labels can point to the end of an input
        let input = format!("{full_input} ");
        if alternatives.is_empty() {
            let span = self.span_from_input(full_input);
            let labels = self
                .kind
                .label()
                .map(|l| LabeledSpan::new_with_span(Some(l.to_owned()), span))
                .into_iter()
                .collect();
            LabeledError {
                full_input: input,
                labels,
                error: ErrorTree::Node {
                    kind: self.kind,
                    source,
                },
            }
        } else {
            let mut first_branch = self;
            first_branch.alternatives.clear();
            LabeledError {
                full_input: input,
                labels: Vec::new(),
                error: ErrorTree::Branch(
                    [vec![first_branch.into_final_error(full_input)], alternatives].concat(),
                ),
            }
        }
    }

    fn span_from_input(&self, full_input: &str) -> SourceSpan {
        let base_addr = full_input.as_ptr() as usize;
        let substr_addr = self.input.as_ptr() as usize;
        let start = substr_addr.saturating_sub(base_addr).min(full_input.len());
        let end = start + self.length;
        SourceSpan::from(start..end)
    }
}

impl<'a, E: LabeledErrorKind> ParseError<&'a str> for LabeledParseError<'a, E> {
    fn from_error_kind(input: &'a str, kind: nom::error::ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &str, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        Self {
            alternatives: [self.alternatives, vec![other]].concat(),
            ..self
        }
    }
}

// Module Tests ========================================================================================================
