use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::MassNumber;

/// Raised when a formula mentions an element, isotope, or particle that the [`AtomicDatabase`](crate::AtomicDatabase)
/// can't provide a mass for
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum AtomicLookupError {
    #[diagnostic(help("check the symbol for typos, or add the element to the atomic database"))]
    #[error("the element {symbol:?} isn't in the atomic database")]
    UnknownElement { symbol: String },

    #[diagnostic(help("the known isotopes of {symbol} are {known}"))]
    #[error("the isotope [{mass_number}{symbol}] isn't in the atomic database")]
    UnknownIsotope {
        symbol: String,
        mass_number: MassNumber,
        known: String,
    },

    #[diagnostic(help("check the symbol for typos, or add the particle to the atomic database"))]
    #[error("the particle {symbol:?} isn't in the atomic database")]
    UnknownParticle { symbol: String },

    #[diagnostic(help("name an isotope explicitly instead, like [{lightest}{symbol}] (known isotopes: {known})"))]
    #[error("{symbol} has no naturally occurring isotopes, so it has no default mass")]
    NoNaturalAbundance {
        symbol: String,
        lightest: MassNumber,
        known: String,
    },
}

impl AtomicLookupError {
    pub(crate) fn unknown_element(symbol: &str) -> Self {
        Self::UnknownElement {
            symbol: symbol.to_owned(),
        }
    }

    pub(crate) fn unknown_isotope(
        symbol: &str,
        mass_number: MassNumber,
        known: impl IntoIterator<Item = MassNumber>,
    ) -> Self {
        Self::UnknownIsotope {
            symbol: symbol.to_owned(),
            mass_number,
            known: list_mass_numbers(known),
        }
    }

    pub(crate) fn unknown_particle(symbol: &str) -> Self {
        Self::UnknownParticle {
            symbol: symbol.to_owned(),
        }
    }

    pub(crate) fn no_natural_abundance(
        symbol: &str,
        lightest: MassNumber,
        known: impl IntoIterator<Item = MassNumber>,
    ) -> Self {
        Self::NoNaturalAbundance {
            symbol: symbol.to_owned(),
            lightest,
            known: list_mass_numbers(known),
        }
    }
}

fn list_mass_numbers(mass_numbers: impl IntoIterator<Item = MassNumber>) -> String {
    format!("[{}]", mass_numbers.into_iter().sorted_unstable().join(", "))
}
