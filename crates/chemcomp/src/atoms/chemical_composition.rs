use std::{
    fmt::{self, Display, Formatter},
    iter::Sum,
    ops::{Add, Neg, Sub},
};

use itertools::Itertools;

use crate::{
    AverageMass, Charge, Charged, ChemicalComposition, Element, Massive, MonoisotopicMass, Particle, PolychemError,
    Result,
    parsers::{
        chemical_composition,
        errors::{CompositionErrorKind, final_parser},
    },
};

use super::atomic_database::AtomicDatabase;

impl<'a> ChemicalComposition<'a> {
    /// Parses a chemical formula like `C6H12N2O`, `[13C]2H4`, `H2O+2p`, or `2p`
    ///
    /// # Errors
    ///
    /// Returns a labelled diagnostic if the formula is malformed or references elements, isotopes, or particles
    /// missing from `db`
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(chemical_composition::<CompositionErrorKind>(db));
        parser(formula.as_ref()).map_err(|e| Box::new(PolychemError::from(e)))
    }

    pub(crate) fn from_offsets(
        chemical_formula: Vec<(Element<'a>, i64)>,
        particle_offset: Vec<(Particle<'a>, i64)>,
    ) -> Self {
        Self {
            chemical_formula: merge_counts(chemical_formula),
            particle_offset: merge_counts(particle_offset),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chemical_formula.is_empty() && self.particle_offset.is_empty()
    }

    /// Signed element counts in Hill order
    pub fn elements(&self) -> impl Iterator<Item = (Element<'a>, i64)> + '_ {
        self.chemical_formula.iter().copied()
    }

    /// Signed particle counts, ordered by symbol
    pub fn particles(&self) -> impl Iterator<Item = (Particle<'a>, i64)> + '_ {
        self.particle_offset.iter().copied()
    }

    fn write_atoms(
        f: &mut Formatter<'_>,
        atoms: impl Iterator<Item = (Element<'a>, i64)>,
    ) -> fmt::Result {
        for (element, count) in atoms {
            write!(f, "{element}")?;
            if count.abs() > 1 {
                write!(f, "{}", count.abs())?;
            }
        }
        Ok(())
    }
}

// NOTE: Sorts, sums duplicate entries, then drops anything that cancelled out to zero
fn merge_counts<T: Ord>(mut offsets: Vec<(T, i64)>) -> Vec<(T, i64)> {
    offsets.sort_by(|(a, _), (b, _)| a.cmp(b));
    offsets
        .into_iter()
        .coalesce(|(a, x), (b, y)| {
            if a == b {
                Ok((a, x + y))
            } else {
                Err(((a, x), (b, y)))
            }
        })
        .filter(|&(_, count)| count != 0)
        .collect()
}

// Arithmetic ==========================================================================================================

impl<'a> Add for ChemicalComposition<'a> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.chemical_formula.extend(rhs.chemical_formula);
        self.particle_offset.extend(rhs.particle_offset);
        Self::from_offsets(self.chemical_formula, self.particle_offset)
    }
}

impl<'a> Add<&ChemicalComposition<'a>> for ChemicalComposition<'a> {
    type Output = Self;

    fn add(self, rhs: &ChemicalComposition<'a>) -> Self::Output {
        self + rhs.clone()
    }
}

impl Neg for ChemicalComposition<'_> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            chemical_formula: self.chemical_formula.into_iter().map(|(e, c)| (e, -c)).collect(),
            particle_offset: self.particle_offset.into_iter().map(|(p, c)| (p, -c)).collect(),
        }
    }
}

impl<'a> Sub for ChemicalComposition<'a> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl<'a> Sum for ChemicalComposition<'a> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a, 'c> Sum<&'c ChemicalComposition<'a>> for ChemicalComposition<'a> {
    fn sum<I: Iterator<Item = &'c ChemicalComposition<'a>>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

// Display and Mass / Charge Trait Implementations =====================================================================

// NOTE: Removed atoms are written after a " - ", so Amidated (gain HN, lose O) reads "HN - O", while a pure loss of
// water reads "-H2O"
impl Display for ChemicalComposition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (gained, lost): (Vec<_>, Vec<_>) = self.elements().partition(|&(_, count)| count > 0);
        Self::write_atoms(f, gained.iter().copied())?;
        if !lost.is_empty() {
            if !gained.is_empty() {
                write!(f, " ")?;
            }
            write!(f, "-")?;
            if !gained.is_empty() {
                write!(f, " ")?;
            }
            Self::write_atoms(f, lost.iter().copied())?;
        }

        for (particle, count) in self.particles() {
            let sign = if count > 0 { '+' } else { '-' };
            write!(f, "{sign}")?;
            if count.abs() > 1 {
                write!(f, "{}", count.abs())?;
            }
            write!(f, "{particle}")?;
        }
        Ok(())
    }
}

impl Massive for ChemicalComposition<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        let atoms = self.elements().map(|(e, count)| e.monoisotopic_mass() * count);
        let particles = self.particles().map(|(p, count)| p.monoisotopic_mass() * count);
        atoms.chain(particles).sum()
    }

    fn average_mass(&self) -> AverageMass {
        let atoms = self.elements().map(|(e, count)| e.average_mass() * count);
        let particles = self.particles().map(|(p, count)| p.average_mass() * count);
        atoms.chain(particles).sum()
    }
}

impl Charged for ChemicalComposition<'_> {
    fn charge(&self) -> Charge {
        self.particles().map(|(p, count)| p.charge() * count).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use insta::assert_snapshot;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{MonoisotopicMz, Mz};

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn composition(formula: &str) -> ChemicalComposition<'static> {
        ChemicalComposition::new(&DB, formula).unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_snapshot!(composition("H2O"), @"H2O");
        assert_snapshot!(composition("NC2OH5OC"), @"C3H5NO2");
        assert_snapshot!(composition("[2H]2O"), @"[2H]2O");
        assert_snapshot!(composition("C6H12N2O+2p"), @"C6H12N2O+2p");
        assert_snapshot!(composition("p"), @"+p");
    }

    #[test]
    fn parse_errors() {
        let error = ChemicalComposition::new(&DB, "H2O+").unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected a particle (like p or e), optionally preceded by a number"
        );
        let error = ChemicalComposition::new(&DB, "Zz").unwrap_err();
        assert_eq!(
            error.to_string(),
            "the element \"Zz\" isn't in the atomic database"
        );
    }

    #[test]
    fn monoisotopic_masses() {
        assert_eq!(
            composition("H2O").monoisotopic_mass(),
            MonoisotopicMass(dec!(18.01056468403))
        );
        assert_eq!(
            composition("C6H12N2O").monoisotopic_mass(),
            MonoisotopicMass(dec!(128.09496301519))
        );
        assert_eq!(
            composition("C2H2O").monoisotopic_mass(),
            MonoisotopicMass(dec!(42.01056468403))
        );
        assert_eq!(
            composition("p").monoisotopic_mass(),
            MonoisotopicMass(dec!(1.007276466621))
        );
    }

    #[test]
    fn average_masses() {
        let water = composition("H2O").average_mass();
        let expected = Element::new(&DB, "H").unwrap().average_mass() * 2
            + Element::new(&DB, "O").unwrap().average_mass();
        assert_eq!(water, expected);
    }

    #[test]
    fn charges_and_mz() {
        let neutral = composition("H2O");
        assert_eq!(neutral.charge(), 0);
        assert_eq!(neutral.monoisotopic_mz(), None);

        let doubly_protonated = composition("H2O+2p");
        assert_eq!(doubly_protonated.charge(), 2);
        assert_eq!(
            doubly_protonated.monoisotopic_mz(),
            Some(MonoisotopicMz(dec!(10.012558808636)))
        );

        let anion = composition("H2O-e");
        assert_eq!(anion.charge(), 1);
        let cation = composition("H2O+e");
        assert_eq!(cation.charge(), -1);
    }

    #[test]
    fn addition() {
        let lysine = composition("C6H12N2O");
        let acetyl = composition("C2H2O");
        let acetyl_lysine = lysine.clone() + acetyl.clone();
        assert_snapshot!(acetyl_lysine, @"C8H14N2O2");
        assert_eq!(
            acetyl_lysine.monoisotopic_mass(),
            lysine.monoisotopic_mass() + acetyl.monoisotopic_mass()
        );
        // Missing elements are treated as zero, and new ones are kept in Hill order
        let phospho = composition("HO3P");
        assert_snapshot!(lysine + &phospho, @"C6H13N2O4P");
    }

    #[test]
    fn subtraction_and_negation() {
        let water = composition("H2O");
        let nothing = water.clone() - water.clone();
        assert!(nothing.is_empty());
        assert_eq!(nothing, ChemicalComposition::default());
        assert_eq!(nothing.monoisotopic_mass(), MonoisotopicMass::default());
        assert_snapshot!(nothing, @"");

        let amidation = composition("HN") - composition("O");
        assert_snapshot!(amidation, @"HN - O");
        let dehydration = -water;
        assert_snapshot!(dehydration, @"-H2O");
        assert_eq!(
            dehydration.monoisotopic_mass(),
            MonoisotopicMass(dec!(-18.01056468403))
        );
        assert_eq!(-dehydration.clone(), composition("H2O"));
    }

    #[test]
    fn summation() {
        let residues = [composition("C3H5NO2"), composition("C6H12N2O"), composition("H2O")];
        let total: ChemicalComposition = residues.iter().sum();
        assert_snapshot!(total, @"C9H19N3O4");
        let total: ChemicalComposition = residues.into_iter().sum();
        assert_eq!(
            total.monoisotopic_mass(),
            MonoisotopicMass(dec!(233.13755610394))
        );
    }

    #[test]
    fn accessors() {
        let water = composition("H2O+p");
        let elements: Vec<_> = water.elements().map(|(e, c)| (e.symbol(), c)).collect();
        assert_eq!(elements, [("H", 2), ("O", 1)]);
        let particles: Vec<_> = water.particles().map(|(p, c)| (p.name(), c)).collect();
        assert_eq!(particles, [("Proton", 1)]);
    }
}
