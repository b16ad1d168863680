use ahash::HashMap;
use miette::Diagnostic;
use thiserror::Error;

use crate::{Isotope, MassNumber};

// NOTE: Public so that parsers built on top of the molecule parser can inspect lookup failures
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AtomicLookupError {
    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the element {0:?} could not be found in the supplied atomic database")]
    Element(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error(
        "the isotope \"{0}-{1}\" could not be found in the supplied atomic database, though the following {2} \
        isotopes were found: {3}"
    )]
    Isotope(String, MassNumber, String, String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the particle {0:?} could not be found in the supplied atomic database")]
    Particle(String),

    #[diagnostic(help(
        "consider explicitly selecting the isotope to be used in mass calculations, like {1}^{2}"
    ))]
    #[error("no natural abundance data could be found for {0} ({1}), though the following isotopes were found: {3}")]
    Abundance(String, String, MassNumber, String),
}

impl AtomicLookupError {
    pub(crate) fn element(symbol: &str) -> Self {
        Self::Element(symbol.to_owned())
    }

    pub(crate) fn isotope(
        symbol: &str,
        mass_number: MassNumber,
        name: &str,
        isotopes: &HashMap<MassNumber, Isotope>,
    ) -> Self {
        Self::Isotope(
            symbol.to_owned(),
            mass_number,
            name.to_owned(),
            Self::display_vec(isotopes.keys()),
        )
    }

    pub(crate) fn particle(symbol: &str) -> Self {
        Self::Particle(symbol.to_owned())
    }

    pub(crate) fn abundance(
        name: &str,
        symbol: &str,
        isotopes: &HashMap<MassNumber, Isotope>,
    ) -> Self {
        // SAFETY: Validation of the `AtomicDatabase` ensures there is always at least one isotope per element
        let lightest = *isotopes.keys().min().unwrap();
        Self::Abundance(
            name.to_owned(),
            symbol.to_owned(),
            lightest,
            Self::display_vec(isotopes.keys()),
        )
    }

    fn display_vec<I: Ord + ToString>(items: impl IntoIterator<Item = I>) -> String {
        let mut items: Vec<_> = items.into_iter().collect();
        items.sort_unstable();
        let items: Vec<_> = items.iter().map(ToString::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}
