// Standard Library Imports
use std::{error::Error as StdError, num::NonZeroU32, ops::Deref, str::FromStr};

// External Crate Imports
use ahash::HashMap;
use knuffel::{
    Decode, DecodeScalar,
    ast::{self, Integer, Literal, Radix, TypeName},
    decode::{Context, Kind},
    errors::{DecodeError, ExpectedType},
    span::Spanned,
    traits::ErrorSpan,
};
use miette::{Diagnostic, Result};
use rust_decimal::Decimal;
use thiserror::Error;

// Local Crate Imports
use crate::{Charge, Isotope, MassNumber};

// Public API ==========================================================================================================

pub const DEFAULT_KDL: &str = include_str!("../../data/atomic_database.kdl");

/// Element isotopes and charged particles, with their exact masses
///
/// Every [`ChemicalComposition`](crate::ChemicalComposition) borrows from one of these, so it's normally built once
/// and kept for the life of the program.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    pub(crate) elements: HashMap<String, ElementDescription>,
    pub(crate) particles: HashMap<String, ParticleDescription>,
}

impl AtomicDatabase {
    /// # Errors
    ///
    /// Returns a diagnostic pointing into `kdl_text` if it isn't valid KDL, if a symbol is malformed, if an element
    /// has no isotopes, or if any number can't be represented exactly
    pub fn new(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> Result<Self> {
        let parsed: AtomicDatabaseKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        Ok(parsed.into())
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        // SAFETY: The embedded database is checked by the tests below, so this should never panic
        Self::new("atomic_database.kdl", DEFAULT_KDL).unwrap()
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ElementDescription {
    pub(crate) name: String,
    pub(crate) isotopes: HashMap<MassNumber, Isotope>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ParticleDescription {
    pub(crate) name: String,
    pub(crate) mass: Decimal,
    pub(crate) charge: Charge,
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct AtomicDatabaseKdl {
    #[knuffel(child, unwrap(children))]
    elements: Vec<ElementKdl>,
    #[knuffel(child, unwrap(children))]
    particles: Vec<ParticleKdl>,
}

#[derive(Debug, Decode)]
struct ElementKdl {
    #[knuffel(node_name)]
    symbol: ElementSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(children(name = "isotope", non_empty))]
    isotopes: Vec<IsotopeKdl>,
}

#[derive(Debug, Decode)]
struct IsotopeKdl {
    #[knuffel(argument)]
    mass_number: MassNumberKdl,
    #[knuffel(argument)]
    relative_mass: DecimalKdl,
    #[knuffel(argument)]
    abundance: Option<DecimalKdl>,
}

#[derive(Debug, Decode)]
struct ParticleKdl {
    #[knuffel(node_name)]
    symbol: ParticleSymbol,
    #[knuffel(argument)]
    name: String,
    #[knuffel(child, unwrap(argument))]
    mass: DecimalKdl,
    #[knuffel(child, unwrap(argument))]
    charge: i64,
}

impl From<AtomicDatabaseKdl> for AtomicDatabase {
    fn from(AtomicDatabaseKdl { elements, particles }: AtomicDatabaseKdl) -> Self {
        let elements = elements
            .into_iter()
            .map(|ElementKdl { symbol, name, isotopes }| {
                let isotopes = isotopes
                    .into_iter()
                    .map(|isotope| {
                        let relative_mass = isotope.relative_mass.0;
                        let abundance = isotope.abundance.map(|a| a.0);
                        (isotope.mass_number.0, Isotope { relative_mass, abundance })
                    })
                    .collect();
                (symbol.0, ElementDescription { name, isotopes })
            })
            .collect();

        let particles = particles
            .into_iter()
            .map(|ParticleKdl { symbol, name, mass, charge }| {
                let charge = Charge(charge);
                (symbol.0, ParticleDescription { name, mass: mass.0, charge })
            })
            .collect();

        Self { elements, particles }
    }
}

// Symbol Validation ===================================================================================================

#[derive(Debug)]
struct ElementSymbol(String);

impl FromStr for ElementSymbol {
    type Err = InvalidSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.next().is_none_or(|c| c.is_ascii_lowercase())
            && chars.next().is_none();
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidSymbolError::Element(s.to_owned()))
        }
    }
}

#[derive(Debug)]
struct ParticleSymbol(String);

impl FromStr for ParticleSymbol {
    type Err = InvalidSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.next().is_none() {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidSymbolError::Particle(s.to_owned()))
        }
    }
}

#[derive(Debug, Diagnostic, Error)]
enum InvalidSymbolError {
    #[error("element symbols are an uppercase ASCII letter, optionally followed by a lowercase one, but got {0:?}")]
    Element(String),
    #[error("particle symbols are a single lowercase ASCII letter, but got {0:?}")]
    Particle(String),
}

// Exact Decoding of KDL Numbers =======================================================================================

#[derive(Debug, Default)]
struct DecimalKdl(Decimal);

impl<S: ErrorSpan> DecodeScalar<S> for DecimalKdl {
    fn type_check(type_name: &Option<Spanned<TypeName, S>>, ctx: &mut Context<S>) {
        reject_type_annotation(type_name, ctx, "Decimal");
    }

    fn raw_decode(value: &Spanned<Literal, S>, ctx: &mut Context<S>) -> Result<Self, DecodeError<S>> {
        let digits = match &**value {
            Literal::Decimal(ast::Decimal(s)) | Literal::Int(Integer(Radix::Dec, s)) => Some(&**s),
            _ => None,
        };
        Ok(decode_digits(value, ctx, digits, "a decimal number", |s| {
            let decimal = if s.contains(['e', 'E']) {
                Decimal::from_scientific(s)
            } else {
                Decimal::from_str_exact(s)
            };
            decimal.map(Self)
        }))
    }
}

#[derive(Debug)]
struct MassNumberKdl(MassNumber);

// NOTE: Only used as a placeholder after an error has been emitted, which stops the database from ever being built
impl Default for MassNumberKdl {
    fn default() -> Self {
        Self(MassNumber(NonZeroU32::MIN))
    }
}

impl<S: ErrorSpan> DecodeScalar<S> for MassNumberKdl {
    fn type_check(type_name: &Option<Spanned<TypeName, S>>, ctx: &mut Context<S>) {
        reject_type_annotation(type_name, ctx, "MassNumber");
    }

    fn raw_decode(value: &Spanned<Literal, S>, ctx: &mut Context<S>) -> Result<Self, DecodeError<S>> {
        let digits = match &**value {
            Literal::Int(Integer(Radix::Dec, s)) => Some(&**s),
            _ => None,
        };
        Ok(decode_digits(value, ctx, digits, "a positive, decimal integer", |s| {
            s.parse().map(|n| Self(MassNumber(n)))
        }))
    }
}

fn decode_digits<T: Default, E: StdError + Send + Sync + 'static, S: ErrorSpan>(
    value: &Spanned<Literal, S>,
    ctx: &mut Context<S>,
    digits: Option<&str>,
    expected: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> T {
    let Some(digits) = digits else {
        let found = Kind::from(&**value);
        ctx.emit_error(DecodeError::unsupported(value, format!("expected {expected}, found {found}")));
        return T::default();
    };
    parse(digits).unwrap_or_else(|e| {
        ctx.emit_error(DecodeError::conversion(value, Box::new(e)));
        T::default()
    })
}

fn reject_type_annotation<S: ErrorSpan>(
    type_name: &Option<Spanned<TypeName, S>>,
    ctx: &mut Context<S>,
    rust_type: &'static str,
) {
    if let Some(t) = type_name {
        ctx.emit_error(DecodeError::TypeName {
            span: t.span().clone(),
            found: Some(t.deref().clone()),
            expected: ExpectedType::no_type(),
            rust_type,
        });
    }
}
