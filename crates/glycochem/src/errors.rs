use miette::Diagnostic;
use thiserror::Error;

use crate::{CleavageKind, parsers::errors::CompositionError, residues::errors::ResidueLookupError};

pub type Result<T, E = Box<GlycochemError>> = std::result::Result<T, E>;

// FIXME: Maybe just rename this to be `Error`?
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum GlycochemError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format {
        #[from]
        error: CompositionError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup {
        #[from]
        error: ResidueLookupError,
    },

    #[diagnostic(help("only monosaccharides defined in the residue database have derived fragment types"))]
    #[error("the monosaccharide {name:?} has no entry in the fragment dictionary")]
    UnknownMonosaccharide { name: String },

    #[diagnostic(help(
        "open-chain monosaccharides, and those with a second ring, can't be cleaved across their ring"
    ))]
    #[error("the monosaccharide {name:?} has no {kind} fragment types")]
    NoFragmentsOfKind { name: String, kind: CleavageKind },
}

impl GlycochemError {
    pub(crate) fn unknown_monosaccharide(name: &str) -> Self {
        let name = name.to_owned();

        Self::UnknownMonosaccharide { name }
    }

    pub(crate) fn no_fragments_of_kind(name: &str, kind: CleavageKind) -> Self {
        let name = name.to_owned();

        Self::NoFragmentsOfKind { name, kind }
    }
}

impl From<ResidueLookupError> for Box<GlycochemError> {
    fn from(value: ResidueLookupError) -> Self {
        Box::new(value.into())
    }
}
