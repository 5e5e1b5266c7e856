//! Elemental compositions, exact masses, and a registry mapping residue and modification labels to their formulas

pub mod atoms;
pub mod errors;
pub mod parsers;
pub mod registry;

use std::num::NonZeroU32;

// External Crate Imports
use ahash::HashMap;
use derive_more::{Add, Display, From, Into, Neg, Sub, Sum};
use rust_decimal::Decimal;

pub use atoms::atomic_database::AtomicDatabase;
pub use errors::{PolychemError, Result};
pub use registry::{CompositionRegistry, ModificationSource, UnimodDatabase};

// Compositions and Their Building Blocks ==============================================================================
// NOTE: Every 'a lifetime here borrows from an `AtomicDatabase`

/// An elemental composition: a signed count for every element (or isotope) it contains, plus any charged particles
/// that have been added or removed
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ChemicalComposition<'a> {
    // NOTE: Both of these are kept sorted (in Hill order for elements) and never contain a zero count
    chemical_formula: Vec<(Element<'a>, i64)>,
    particle_offset: Vec<(Particle<'a>, i64)>,
}

/// An element with its natural isotopic distribution, or a single isotope of it when `mass_number` is set
#[derive(Copy, Clone, Debug)]
pub struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    mass_number: Option<MassNumber>,
    isotopes: &'a HashMap<MassNumber, Isotope>,
}

#[derive(Copy, Clone, Debug)]
pub struct Particle<'a> {
    symbol: &'a str,
    name: &'a str,
    mass: &'a Decimal,
    charge: &'a Charge,
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct Isotope {
    relative_mass: Decimal,
    abundance: Option<Decimal>,
}

// Small Quantities ====================================================================================================

/// How many of an atom or particle a formula mentions (never zero)
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Count(NonZeroU32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub struct MassNumber(NonZeroU32);

/// Whether particles are being added to (`+`) or removed from (`-`) a formula
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum OffsetKind {
    #[display("+")]
    Add,
    #[display("-")]
    Remove,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Add, Sub, Neg, Sum,
)]
pub struct Charge(i64);

// Exact Masses ========================================================================================================

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Add, Sub, Sum,
)]
pub struct MonoisotopicMass(Decimal);

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into, Add, Sub, Sum,
)]
pub struct AverageMass(Decimal);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into)]
pub struct MonoisotopicMz(Decimal);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, From, Into)]
pub struct AverageMz(Decimal);

// Mass and Charge Traits ==============================================================================================

pub trait Massive {
    fn monoisotopic_mass(&self) -> MonoisotopicMass;
    fn average_mass(&self) -> AverageMass;
}

pub trait Charged {
    fn charge(&self) -> Charge;
}

/// Mass-to-charge ratios for anything with both a mass and a charge, using the magnitude of the charge
///
/// Neutral things have no m/z, so these return `None` when the charge is zero.
pub trait Mz: Massive + Charged {
    fn monoisotopic_mz(&self) -> Option<MonoisotopicMz> {
        nonzero_charge(self).map(|z| self.monoisotopic_mass() / z)
    }

    fn average_mz(&self) -> Option<AverageMz> {
        nonzero_charge(self).map(|z| self.average_mass() / z)
    }
}

impl<T: Massive + Charged> Mz for T {}

fn nonzero_charge(charged: &(impl Charged + ?Sized)) -> Option<Charge> {
    let z = charged.charge().abs();
    (!z.is_zero()).then_some(z)
}

impl<T: Massive + ?Sized> Massive for &T {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        T::monoisotopic_mass(self)
    }

    fn average_mass(&self) -> AverageMass {
        T::average_mass(self)
    }
}

impl<T: Charged + ?Sized> Charged for &T {
    fn charge(&self) -> Charge {
        T::charge(self)
    }
}
