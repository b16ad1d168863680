// Standard Library Imports
use std::str::FromStr;

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use knuffel::{
    Decode,
    span::{Span, Spanned},
};
use miette::Result;
use tracing::debug;

// Local Crate Imports
use super::{
    Anomer, CoreModification, CoreModificationKind, DerivatizationKind, Monosaccharide,
    MonosaccharideSkeleton, Perderivatization, Residue, ResidueInfo, ResidueType, Substituent,
    SubstituentSite, errors::ResidueLookupError,
};
use crate::{
    AtomicDatabase, FragmentDictionary, FragmentType, Molecule,
    kdl::{KdlErrorKind, KdlResult, ValidateInto, check_unique, names_of},
    parsers::primitives::is_name_char,
};

// Public API ==========================================================================================================

const DEFAULT_KDL: &str = include_str!("../../data/residue_database.kdl");

/// The monosaccharides, substituents, reducing ends, perderivatizations, and fragment types that compositions are
/// built from
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResidueDatabase<'a> {
    atomic_db: &'a AtomicDatabase,
    monosaccharides: Vec<Monosaccharide<'a>>,
    substituents: Vec<Substituent<'a>>,
    reducing_ends: Vec<Substituent<'a>>,
    perderivatizations: Vec<Perderivatization<'a>>,
    index: HashMap<String, ResidueKey>,
    fragments: FragmentDictionary<'a>,
    water: Molecule<'a>,
    hydrogen: Molecule<'a>,
}

impl<'a> ResidueDatabase<'a> {
    pub fn new(
        atomic_db: &'a AtomicDatabase,
        file_name: impl AsRef<str>,
        kdl_text: impl AsRef<str>,
    ) -> Result<Self> {
        let (file_name, kdl_text) = (file_name.as_ref(), kdl_text.as_ref());
        let parsed_db: ResidueDatabaseKdl = knuffel::parse(file_name, kdl_text)?;
        let db: Self = parsed_db
            .validate(atomic_db)
            .map_err(|e| e.finalize("residue database", file_name, kdl_text))?;
        debug!(
            monosaccharides = db.monosaccharides.len(),
            substituents = db.substituents.len(),
            reducing_ends = db.reducing_ends.len(),
            perderivatizations = db.perderivatizations.len(),
            fragment_types = db.fragments.len(),
            "loaded residue database from {file_name}"
        );
        Ok(db)
    }

    /// The residue database bundled with this crate
    #[must_use]
    pub fn with_defaults(atomic_db: &'a AtomicDatabase) -> Self {
        // SAFETY: The bundled database is validated by the tests in this module
        Self::new(atomic_db, "residue_database.kdl", DEFAULT_KDL).unwrap()
    }

    #[must_use]
    pub const fn atomic_db(&self) -> &'a AtomicDatabase {
        self.atomic_db
    }

    pub fn monosaccharide(&self, name: &str) -> Result<&Monosaccharide<'a>, ResidueLookupError> {
        match self.index.get(&name.to_lowercase()) {
            Some(&ResidueKey::Monosaccharide(i)) => Ok(&self.monosaccharides[i]),
            _ => Err(ResidueLookupError::Monosaccharide(name.to_owned())),
        }
    }

    pub fn substituent(&self, name: &str) -> Result<&Substituent<'a>, ResidueLookupError> {
        match self.index.get(&name.to_lowercase()) {
            Some(&ResidueKey::Substituent(i)) => Ok(&self.substituents[i]),
            _ => Err(ResidueLookupError::Substituent(name.to_owned())),
        }
    }

    pub fn reducing_end(&self, name: &str) -> Result<&Substituent<'a>, ResidueLookupError> {
        match self.index.get(&name.to_lowercase()) {
            Some(&ResidueKey::ReducingEnd(i)) => Ok(&self.reducing_ends[i]),
            _ => Err(ResidueLookupError::ReducingEnd(name.to_owned())),
        }
    }

    /// Looks up any monosaccharide, substituent, or reducing end by name or synonym, ignoring case
    pub fn residue(&self, name: &str) -> Result<Residue<'a, '_>, ResidueLookupError> {
        match self.index.get(&name.to_lowercase()) {
            Some(&ResidueKey::Monosaccharide(i)) => Ok(Residue::Monosaccharide(&self.monosaccharides[i])),
            Some(&ResidueKey::Substituent(i)) => Ok(Residue::Substituent(&self.substituents[i])),
            Some(&ResidueKey::ReducingEnd(i)) => Ok(Residue::Substituent(&self.reducing_ends[i])),
            None => Err(ResidueLookupError::Residue(name.to_owned())),
        }
    }

    pub fn perderivatization(&self, name: &str) -> Result<&Perderivatization<'a>, ResidueLookupError> {
        self.perderivatizations
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ResidueLookupError::Perderivatization(name.to_owned()))
    }

    pub fn fragment(&self, name: &str) -> Result<FragmentType<'a, '_>, ResidueLookupError> {
        self.fragments.fragment(name)
    }

    #[must_use]
    pub const fn fragments(&self) -> &FragmentDictionary<'a> {
        &self.fragments
    }

    /// The water lost by every glycosidic bond
    pub(crate) const fn water(&self) -> &Molecule<'a> {
        &self.water
    }

    pub(crate) const fn hydrogen(&self) -> &Molecule<'a> {
        &self.hydrogen
    }

    pub fn monosaccharides(&self) -> impl Iterator<Item = &Monosaccharide<'a>> {
        self.monosaccharides.iter()
    }

    pub fn substituents(&self) -> impl Iterator<Item = &Substituent<'a>> {
        self.substituents.iter()
    }

    pub fn reducing_ends(&self) -> impl Iterator<Item = &Substituent<'a>> {
        self.reducing_ends.iter()
    }

    pub fn perderivatizations(&self) -> impl Iterator<Item = &Perderivatization<'a>> {
        self.perderivatizations.iter()
    }
}

// Private Types =======================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ResidueKey {
    Monosaccharide(usize),
    Substituent(usize),
    ReducingEnd(usize),
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ResidueDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    substituents: Vec<SubstituentKdl>,
    #[knuffel(child, unwrap(children))]
    reducing_ends: Vec<SubstituentKdl>,
    #[knuffel(child)]
    monosaccharides: MonosaccharidesKdl,
    #[knuffel(child, unwrap(children))]
    perderivatizations: Vec<PerderivatizationKdl>,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct SubstituentKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    name: String,
    #[knuffel(argument)]
    description: String,
    #[knuffel(child, unwrap(arguments))]
    synonyms: Option<Vec<String>>,
    #[knuffel(child, unwrap(argument))]
    formula: FormulaKdl,
    #[knuffel(child, unwrap(argument))]
    methylations: Option<i32>,
    #[knuffel(child, unwrap(argument))]
    acetylations: Option<i32>,
    #[knuffel(child, unwrap(argument))]
    linkages: Option<i32>,
    #[knuffel(child)]
    acid: bool,
    #[knuffel(child)]
    lost_on_methylation: bool,
    #[knuffel(child)]
    lost_on_acetylation: bool,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct MonosaccharidesKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(children)]
    monosaccharides: Vec<MonosaccharideKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct MonosaccharideKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    name: String,
    #[knuffel(argument)]
    description: String,
    #[knuffel(child, unwrap(arguments))]
    synonyms: Option<Vec<String>>,
    #[knuffel(child, unwrap(argument))]
    carbons: u32,
    #[knuffel(child, unwrap(argument))]
    anomeric_carbon: u32,
    #[knuffel(child, unwrap(argument))]
    ring_size: u32,
    #[knuffel(child, unwrap(argument))]
    anomer: Option<KeywordKdl>,
    #[knuffel(children(name = "modification"))]
    modifications: Vec<ModificationKdl>,
    #[knuffel(children(name = "substituent"))]
    substituents: Vec<SiteKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ModificationKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    kind: KeywordKdl,
    #[knuffel(property(name = "at"))]
    position: Option<i32>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct SiteKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    substituent: String,
    #[knuffel(property(name = "at"))]
    position: Option<i32>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct PerderivatizationKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    name: String,
    #[knuffel(argument)]
    description: String,
    #[knuffel(child, unwrap(argument))]
    formula: FormulaKdl,
    #[knuffel(child, unwrap(argument))]
    derivatization: KeywordKdl,
}

type FormulaKdl = Spanned<String, Span>;
type KeywordKdl = Spanned<String, Span>;

// Conversion From Parsed KDL to Internal Representation ===============================================================

impl<'a> ValidateInto<'a, ResidueDatabase<'a>> for ResidueDatabaseKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> KdlResult<ResidueDatabase<'a>> {
        // Every residue name has to be unambiguous when read back from a composition
        let mut seen = HashMap::new();
        let substituent_names = self
            .substituents
            .iter()
            .chain(&self.reducing_ends)
            .map(|s| (s.span, &s.name, &s.synonyms));
        let monosaccharide_names = self
            .monosaccharides
            .monosaccharides
            .iter()
            .map(|m| (m.span, &m.name, &m.synonyms));
        for (span, name, synonyms) in substituent_names.chain(monosaccharide_names) {
            let synonyms = synonyms.as_deref().unwrap_or_default();
            for name in names_of(name, synonyms) {
                if name.is_empty() || !name.chars().all(is_name_char) {
                    return Err(KdlErrorKind::InvalidName(span, name.to_owned()));
                }
            }
            check_unique(&mut seen, span, names_of(name, synonyms))?;
        }

        let substituents = self
            .substituents
            .into_iter()
            .map(|s| s.validate((ctx, false)))
            .collect::<KdlResult<Vec<_>>>()?;
        let reducing_ends = self
            .reducing_ends
            .into_iter()
            .map(|s| s.validate((ctx, true)))
            .collect::<KdlResult<Vec<_>>>()?;

        let section_span = self.monosaccharides.span;
        let monosaccharides = self
            .monosaccharides
            .monosaccharides
            .into_iter()
            .map(|m| m.validate((ctx, &substituents)))
            .collect::<KdlResult<Vec<_>>>()?;
        let fragments = FragmentDictionary::new(ctx, &monosaccharides)
            .map_err(|e| KdlErrorKind::Formula(section_span, e))?;
        let water = Molecule::water(ctx).map_err(|e| KdlErrorKind::Formula(section_span, e))?;
        let hydrogen = Molecule::hydrogen(ctx).map_err(|e| KdlErrorKind::Formula(section_span, e))?;

        let mut perderivatizations: Vec<Perderivatization> = Vec::new();
        let mut perderivatization_spans = HashMap::new();
        for perderivatization in self.perderivatizations {
            let span = perderivatization.span;
            let name = perderivatization.name.to_lowercase();
            if let Some(first_span) = perderivatization_spans.insert(name, span) {
                return Err(KdlErrorKind::DuplicatePerderivatization(
                    first_span,
                    span,
                    perderivatization.name,
                ));
            }
            perderivatizations.push(perderivatization.validate(ctx)?);
        }

        let mut index = HashMap::with_capacity(seen.len());
        let keyed = monosaccharides
            .iter()
            .enumerate()
            .map(|(i, m)| (m.info(), ResidueKey::Monosaccharide(i)))
            .chain(substituents.iter().enumerate().map(|(i, s)| (s.info(), ResidueKey::Substituent(i))))
            .chain(reducing_ends.iter().enumerate().map(|(i, s)| (s.info(), ResidueKey::ReducingEnd(i))));
        for (info, key) in keyed {
            for name in names_of(&info.name, &info.synonyms) {
                index.insert(name.to_lowercase(), key);
            }
        }

        Ok(ResidueDatabase {
            atomic_db: ctx,
            monosaccharides,
            substituents,
            reducing_ends,
            perderivatizations,
            index,
            fragments,
            water,
            hydrogen,
        })
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl<'a> ValidateInto<'a, Substituent<'a>> for SubstituentKdl {
    type Context = (&'a AtomicDatabase, bool);

    fn validate(self, (db, reducing_end): Self::Context) -> KdlResult<Substituent<'a>> {
        let mut info = ResidueInfo::new(self.name).with_formula(self.formula.validate(db)?);
        info.synonyms = self.synonyms.unwrap_or_default();
        info.description = self.description;
        info.methylations = self.methylations.unwrap_or(1);
        info.acetylations = self.acetylations.unwrap_or(1);
        info.linkages = self.linkages.unwrap_or(1);
        info.acid = self.acid;

        Ok(Substituent::new(
            info,
            self.lost_on_methylation,
            self.lost_on_acetylation,
            reducing_end,
        ))
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl<'a: 's, 's> ValidateInto<'s, Monosaccharide<'a>> for MonosaccharideKdl {
    type Context = (&'a AtomicDatabase, &'s [Substituent<'a>]);

    fn validate(self, (db, substituents): Self::Context) -> KdlResult<Monosaccharide<'a>> {
        let Self {
            span,
            carbons,
            anomeric_carbon,
            ring_size,
            ..
        } = self;

        let anomer = match self.anomer {
            Some(anomer) => parse_keyword(&anomer)?,
            None if ring_size > 2 => Anomer::Unknown,
            None => Anomer::OpenChain,
        };

        let ring_closure = anomeric_carbon + ring_size.saturating_sub(2);
        if anomeric_carbon > carbons || (anomer != Anomer::OpenChain && ring_closure > carbons) {
            return Err(KdlErrorKind::RingOutOfRange(
                span,
                ring_size,
                ring_closure,
                carbons,
            ));
        }

        let check_position = |span, position: Option<i32>| {
            let position = position.unwrap_or(-1);
            if i64::from(position) > i64::from(carbons) {
                Err(KdlErrorKind::PositionOutOfRange(span, position, carbons))
            } else {
                Ok(position)
            }
        };

        let modifications = self
            .modifications
            .into_iter()
            .map(|m| {
                let kind: CoreModificationKind = parse_keyword(&m.kind)?;
                Ok(CoreModification::new(kind, check_position(m.span, m.position)?))
            })
            .collect::<KdlResult<Vec<_>>>()?;

        let substituents = self
            .substituents
            .into_iter()
            .map(|s| {
                let substituent = substituents
                    .iter()
                    .find(|known| {
                        names_of(known.name(), known.synonyms())
                            .any(|n| n.eq_ignore_ascii_case(&s.substituent))
                    })
                    .ok_or_else(|| KdlErrorKind::UndefinedSubstituent(s.span, s.substituent.clone()))?
                    .clone();
                let position = check_position(s.span, s.position)?;
                Ok(SubstituentSite {
                    substituent,
                    position,
                })
            })
            .collect::<KdlResult<Vec<_>>>()?;

        MonosaccharideSkeleton {
            name: self.name,
            synonyms: self.synonyms.unwrap_or_default(),
            description: self.description,
            carbons,
            anomer,
            anomeric_carbon,
            ring_size,
            modifications,
            substituents,
        }
        .derive(db)
        .map_err(|e| KdlErrorKind::Formula(span, e))
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl<'a> ValidateInto<'a, Perderivatization<'a>> for PerderivatizationKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> KdlResult<Perderivatization<'a>> {
        let kind: DerivatizationKind = parse_keyword(&self.derivatization)?;
        Ok(Perderivatization::new(
            self.name,
            self.description,
            self.formula.validate(ctx)?,
            kind,
        ))
    }
}

impl<'a> ValidateInto<'a, Molecule<'a>> for FormulaKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> KdlResult<Molecule<'a>> {
        Molecule::new(ctx, &*self).map_err(|e| KdlErrorKind::Formula(*self.span(), e))
    }
}

fn parse_keyword<T: FromStr<Err = super::InvalidKeywordError>>(keyword: &KeywordKdl) -> KdlResult<T> {
    keyword
        .parse()
        .map_err(|e| KdlErrorKind::Keyword(*keyword.span(), e))
}

// Module Tests ========================================================================================================
