use miette::Diagnostic;
use thiserror::Error;

// NOTE: Public so that parsers built on top of the composition parser can inspect lookup failures
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum ResidueLookupError {
    #[diagnostic(help("double-check for typos, or add a new monosaccharide or substituent to the residue database"))]
    #[error("the residue {0:?} could not be found in the supplied residue database")]
    Residue(String),

    #[diagnostic(help("double-check for typos, or give a custom reducing end and its mass, like Cer=547.5328"))]
    #[error("the reducing end {0:?} could not be found in the supplied residue database")]
    ReducingEnd(String),

    #[diagnostic(help(
        "fragment types are written Sugar#b, Sugar#c, Sugar#y, Sugar#z, or as a monosaccharide followed by a \
        cross-ring window, like Hex#a_0_2"
    ))]
    #[error("the fragment type {0:?} could not be found in the fragment dictionary")]
    Fragment(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the perderivatizations section"))]
    #[error("the perderivatization {0:?} could not be found in the supplied residue database")]
    Perderivatization(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the monosaccharides section"))]
    #[error("the monosaccharide {0:?} could not be found in the supplied residue database")]
    Monosaccharide(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the substituents section"))]
    #[error("the substituent {0:?} could not be found in the supplied residue database")]
    Substituent(String),
}

impl ResidueLookupError {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Residue(_) => "residue not found",
            Self::ReducingEnd(_) => "reducing end not found",
            Self::Fragment(_) => "fragment type not found",
            Self::Perderivatization(_) => "perderivatization not found",
            Self::Monosaccharide(_) => "monosaccharide not found",
            Self::Substituent(_) => "substituent not found",
        }
    }
}
