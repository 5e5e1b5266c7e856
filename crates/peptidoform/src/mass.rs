// External Crate Imports
use chemcomp::{AtomicDatabase, Charge, ChemicalComposition, CompositionRegistry, Massive};
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{Error, IonType, Peptidoform, Result};

/// Sums the compositions of every label in a modX `peptidoform`, including its (possibly implicit) termini
///
/// # Errors
///
/// Fails if `peptidoform` can't be parsed, or if any of its labels are missing from `registry`
pub fn peptidoform_composition<'a>(
    peptidoform: &str,
    registry: &CompositionRegistry<'a>,
) -> Result<ChemicalComposition<'a>> {
    let peptidoform = Peptidoform::new(peptidoform)?;
    let composition: chemcomp::Result<ChemicalComposition<'a>> =
        peptidoform.labels().map(|label| registry.get(label)).sum();
    Ok(composition?)
}

/// The monoisotopic m/z of `peptidoform` as an ion of `ion_type`, carrying `charge` extra (or missing) protons
///
/// With a `charge` of 0, this is just the neutral monoisotopic mass.
///
/// # Errors
///
/// Fails if `peptidoform` can't be parsed, if any of its labels are missing from `registry`, or if `charge` doesn't
/// fit in a `u32`
pub fn calculate_mass(
    peptidoform: &str,
    registry: &CompositionRegistry,
    charge: i64,
    ion_type: IonType,
) -> Result<Decimal> {
    let z = u32::try_from(charge.unsigned_abs()).map_err(|_| Error::ChargeOutOfRange { charge })?;
    let atomic_db = registry.atomic_db();
    let composition = peptidoform_composition(peptidoform, registry)?
        + ion_type.offset(atomic_db)?
        + protons(atomic_db, charge.is_negative(), z)?;

    let mass = composition.monoisotopic_mass();
    let mass: Decimal = if z == 0 {
        mass.into()
    } else {
        (mass / Charge::from(i64::from(z))).into()
    };
    Ok(mass)
}

fn protons(atomic_db: &AtomicDatabase, removed: bool, z: u32) -> chemcomp::Result<ChemicalComposition<'_>> {
    if z == 0 {
        return Ok(ChemicalComposition::default());
    }

    let protons = ChemicalComposition::new(atomic_db, format!("{z}p"))?;
    Ok(if removed { -protons } else { protons })
}
