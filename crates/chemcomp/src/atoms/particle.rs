use std::fmt::{self, Display, Formatter};

use crate::{AverageMass, Charge, Charged, Massive, MonoisotopicMass, Particle};

use super::{
    atomic_database::{AtomicDatabase, ParticleDescription},
    errors::AtomicLookupError,
};

impl<'a> Particle<'a> {
    pub(crate) fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        db.particles
            .get_key_value(symbol)
            .map(|(symbol, ParticleDescription { name, mass, charge })| Self {
                symbol,
                name,
                mass,
                charge,
            })
            .ok_or_else(|| AtomicLookupError::unknown_particle(symbol))
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    const fn symbol(&self) -> &'a str {
        self.symbol
    }
}

keyed_ord_impls!(Particle, symbol);

impl Display for Particle<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

// NOTE: Particles have no isotopes, so both of their masses are the same
impl Massive for Particle<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        MonoisotopicMass(*self.mass)
    }

    fn average_mass(&self) -> AverageMass {
        AverageMass(*self.mass)
    }
}

impl Charged for Particle<'_> {
    fn charge(&self) -> Charge {
        *self.charge
    }
}
