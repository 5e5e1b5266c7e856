// Standard Library Imports
use std::str::FromStr;

// External Crate Imports
use chemcomp::{AtomicDatabase, ChemicalComposition};
use derive_more::Display;

// Local Crate Imports
use crate::Error;

/// Precursor and fragment ion types, named as they are in pyteomics and most search engines
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
pub enum IonType {
    /// The intact (precursor) peptide
    #[default]
    #[display("M")]
    M,
    #[display("M-H2O")]
    MH2O,
    #[display("M-NH3")]
    MNH3,
    #[display("a")]
    A,
    #[display("a-H2O")]
    AH2O,
    #[display("a-NH3")]
    ANH3,
    #[display("b")]
    B,
    #[display("b-H2O")]
    BH2O,
    #[display("b-NH3")]
    BNH3,
    #[display("c")]
    C,
    #[display("c-H2O")]
    CH2O,
    #[display("c-NH3")]
    CNH3,
    #[display("x")]
    X,
    #[display("x-H2O")]
    XH2O,
    #[display("x-NH3")]
    XNH3,
    #[display("y")]
    Y,
    #[display("y-H2O")]
    YH2O,
    #[display("y-NH3")]
    YNH3,
    #[display("z")]
    Z,
    #[display("z-H2O")]
    ZH2O,
    #[display("z-NH3")]
    ZNH3,
}

impl IonType {
    pub const ALL: [Self; 21] = [
        Self::M,
        Self::MH2O,
        Self::MNH3,
        Self::A,
        Self::AH2O,
        Self::ANH3,
        Self::B,
        Self::BH2O,
        Self::BNH3,
        Self::C,
        Self::CH2O,
        Self::CNH3,
        Self::X,
        Self::XH2O,
        Self::XNH3,
        Self::Y,
        Self::YH2O,
        Self::YNH3,
        Self::Z,
        Self::ZH2O,
        Self::ZNH3,
    ];

    /// The atoms this ion loses and gains (in that order) relative to the intact, neutral peptide
    const fn lost_and_gained(self) -> (&'static str, &'static str) {
        match self {
            Self::M | Self::Y => ("", ""),
            Self::MH2O | Self::B | Self::YH2O => ("H2O", ""),
            Self::MNH3 | Self::YNH3 => ("H3N", ""),
            Self::A => ("CH2O2", ""),
            Self::AH2O => ("CH4O3", ""),
            Self::ANH3 => ("CH5NO2", ""),
            Self::BH2O => ("H4O2", ""),
            Self::BNH3 => ("H5NO", ""),
            Self::C => ("O", "HN"),
            Self::CH2O => ("HO2", "N"),
            Self::CNH3 => ("H2O", ""),
            Self::X => ("H2", "CO"),
            Self::XH2O => ("H4", "C"),
            Self::XNH3 => ("H5N", "CO"),
            Self::Z => ("H3N", ""),
            Self::ZH2O => ("H5NO", ""),
            Self::ZNH3 => ("H6N2", ""),
        }
    }

    /// The compositional offset of this ion type, to be added to the composition of the intact peptide
    ///
    /// # Errors
    ///
    /// Only fails if `atomic_db` is missing any of C, H, N, or O
    pub fn offset<'a>(self, atomic_db: &'a AtomicDatabase) -> chemcomp::Result<ChemicalComposition<'a>> {
        let composition = |formula: &str| {
            if formula.is_empty() {
                Ok(ChemicalComposition::default())
            } else {
                ChemicalComposition::new(atomic_db, formula)
            }
        };
        let (lost, gained) = self.lost_and_gained();
        Ok(composition(gained)? - composition(lost)?)
    }
}

impl FromStr for IonType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ion_type| ion_type.to_string() == s)
            .ok_or_else(|| Error::UnknownIonType { name: s.to_owned() })
    }
}
