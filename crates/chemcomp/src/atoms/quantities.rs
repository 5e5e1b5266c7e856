use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    ops::{Div, Mul},
};

use rust_decimal::Decimal;

use crate::{AverageMass, AverageMz, Charge, Count, MassNumber, MonoisotopicMass, MonoisotopicMz, OffsetKind};

// Counts and Mass Numbers =============================================================================================

impl Count {
    pub(crate) fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }
}

impl Default for Count {
    fn default() -> Self {
        Self(NonZeroU32::MIN)
    }
}

impl From<Count> for i64 {
    fn from(value: Count) -> Self {
        value.0.get().into()
    }
}

// NOTE: A count of one is implicit in formulae, so it's never written out
impl Display for Count {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            1 => Ok(()),
            n => write!(f, "{n}"),
        }
    }
}

impl MassNumber {
    pub(crate) fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }
}

impl From<Count> for MassNumber {
    fn from(value: Count) -> Self {
        Self(value.0)
    }
}

// Offsets and Charges =================================================================================================

impl OffsetKind {
    /// Gives `count` the sign of this offset
    pub(crate) const fn apply(self, count: i64) -> i64 {
        match self {
            Self::Add => count,
            Self::Remove => -count,
        }
    }
}

impl Charge {
    pub(crate) const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub(crate) const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Mul<i64> for Charge {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl PartialEq<i64> for Charge {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

// Masses ==============================================================================================================

macro_rules! mass_ops {
    ($($mass:ident / Charge => $mz:ident),+ $(,)?) => {
        $(
            impl Mul<i64> for $mass {
                type Output = Self;

                fn mul(self, rhs: i64) -> Self::Output {
                    Self(self.0 * Decimal::from(rhs))
                }
            }

            impl Div<Charge> for $mass {
                type Output = $mz;

                fn div(self, rhs: Charge) -> Self::Output {
                    $mz(self.0 / Decimal::from(rhs.0))
                }
            }
        )+
    };
}

mass_ops!(MonoisotopicMass / Charge => MonoisotopicMz, AverageMass / Charge => AverageMz);
