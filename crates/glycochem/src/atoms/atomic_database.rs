// Standard Library Imports
use std::{num::NonZeroU32, str::FromStr};

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use knuffel::{Decode, span::Span};
use miette::{Diagnostic, Result};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

// Local Crate Imports
use crate::{
    Charge, Isotope, MassNumber,
    kdl::{DecimalKdl, KdlErrorKind, KdlResult, ValidateInto},
};

// Public API ==========================================================================================================

const DEFAULT_KDL: &str = include_str!("../../data/atomic_database.kdl");

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    pub(super) elements: HashMap<String, ElementDescription>,
    pub(super) particles: HashMap<String, ParticleDescription>,
}

impl AtomicDatabase {
    pub fn new(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let (file_name, kdl_text) = (file_name.as_ref(), kdl_text.as_ref());
        let parsed_db: AtomicDatabaseKdl = knuffel::parse(file_name, kdl_text)?;
        let db: Self = parsed_db
            .validate(())
            .map_err(|e| e.finalize("atomic database", file_name, kdl_text))?;
        debug!(
            elements = db.elements.len(),
            particles = db.particles.len(),
            "loaded atomic database from {file_name}"
        );
        Ok(db)
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        // SAFETY: The bundled database is validated by the tests in this module
        Self::new("atomic_database.kdl", DEFAULT_KDL).unwrap()
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(super) struct ElementDescription {
    pub(super) name: String,
    pub(super) isotopes: HashMap<MassNumber, Isotope>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(super) struct ParticleDescription {
    pub(super) name: String,
    pub(super) mass: Decimal,
    pub(super) charge: Charge,
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct AtomicDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    elements: Vec<ElementKdl>,
    #[knuffel(child)]
    particles: ParticlesKdl,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ElementKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    symbol: ElementSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(children(name = "isotope", non_empty))]
    isotopes: Vec<IsotopeKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ParticlesKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(children)]
    particles: Vec<ParticleKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ParticleKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    symbol: ParticleSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(child, unwrap(argument))]
    mass: DecimalKdl,
    #[knuffel(child, unwrap(argument))]
    charge: i64,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct IsotopeKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    mass_number: u32,
    #[knuffel(argument)]
    relative_mass: DecimalKdl,
    #[knuffel(argument)]
    abundance: Option<DecimalKdl>,
}

// Element and Particle Symbol Validation ==============================================================================

#[derive(Debug)]
struct ElementSymbol(String);

impl FromStr for ElementSymbol {
    type Err = InvalidAtomicSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_owned();
        let chrs: Vec<_> = s.chars().collect();
        match chrs[..] {
            [f] if f.is_ascii_uppercase() => Ok(Self(s)),
            [f, l] if f.is_ascii_uppercase() && l.is_ascii_lowercase() => Ok(Self(s)),
            _ => Err(InvalidAtomicSymbolError::Element(s)),
        }
    }
}

#[derive(Debug)]
struct ParticleSymbol(String);

impl FromStr for ParticleSymbol {
    type Err = InvalidAtomicSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chrs = s.chars();
        match (chrs.next(), chrs.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Ok(Self(s.to_owned())),
            _ => Err(InvalidAtomicSymbolError::Particle(s.to_owned())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Diagnostic, Error)]
enum InvalidAtomicSymbolError {
    #[error(
        "expected a single uppercase ASCII letter optionally followed by a lowercase ASCII letter, got {0:?}"
    )]
    Element(String),
    #[error("expected a single lowercase ASCII letter, got {0:?}")]
    Particle(String),
}

// Conversion From Parsed KDL to Internal Representation ===============================================================

impl ValidateInto<'_, AtomicDatabase> for AtomicDatabaseKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> KdlResult<AtomicDatabase> {
        let mut elements = HashMap::with_capacity(self.elements.len());
        let mut element_spans = HashMap::with_capacity(self.elements.len());
        for element in self.elements {
            let symbol = element.symbol.0.clone();
            if let Some(first_span) = element_spans.insert(symbol.clone(), element.span) {
                return Err(KdlErrorKind::DuplicateElement(
                    first_span,
                    element.span,
                    symbol,
                ));
            }
            elements.insert(symbol, element.validate(())?);
        }

        let particles = self.particles.validate(())?;

        Ok(AtomicDatabase {
            elements,
            particles,
        })
    }
}

impl ValidateInto<'_, ElementDescription> for ElementKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> KdlResult<ElementDescription> {
        let mut isotopes = HashMap::with_capacity(self.isotopes.len());
        let mut isotope_spans = HashMap::with_capacity(self.isotopes.len());
        for isotope in self.isotopes {
            let span = isotope.span;
            let (mass_number, isotope) = isotope.validate(())?;
            if let Some(first_span) = isotope_spans.insert(mass_number, span) {
                return Err(KdlErrorKind::DuplicateIsotope(
                    first_span,
                    span,
                    self.symbol.0,
                    mass_number.0.get(),
                ));
            }
            isotopes.insert(mass_number, isotope);
        }

        Ok(ElementDescription {
            name: self.name,
            isotopes,
        })
    }
}

impl ValidateInto<'_, (MassNumber, Isotope)> for IsotopeKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> KdlResult<(MassNumber, Isotope)> {
        let mass_number = NonZeroU32::new(self.mass_number)
            .map(MassNumber)
            .ok_or(KdlErrorKind::ZeroMassNumber(self.span))?;
        let isotope = Isotope {
            relative_mass: self.relative_mass.0,
            abundance: self.abundance.map(|a| a.0),
        };
        Ok((mass_number, isotope))
    }
}

impl ValidateInto<'_, HashMap<String, ParticleDescription>> for ParticlesKdl {
    type Context = ();

    fn validate(self, _ctx: Self::Context) -> KdlResult<HashMap<String, ParticleDescription>> {
        let mut particles = HashMap::with_capacity(self.particles.len());
        let mut particle_spans = HashMap::with_capacity(self.particles.len());
        for ParticleKdl {
            span,
            symbol,
            name,
            mass,
            charge,
        } in self.particles
        {
            let symbol = symbol.0;
            if let Some(first_span) = particle_spans.insert(symbol.clone(), span) {
                return Err(KdlErrorKind::DuplicateParticle(first_span, span, symbol));
            }
            let description = ParticleDescription {
                name,
                mass: mass.0,
                charge: Charge(charge),
            };
            particles.insert(symbol, description);
        }

        if particles.contains_key("e") {
            Ok(particles)
        } else {
            Err(KdlErrorKind::MissingElectron(self.span))
        }
    }
}

// Module Tests ========================================================================================================
