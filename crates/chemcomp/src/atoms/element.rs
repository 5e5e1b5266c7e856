use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

use crate::{AverageMass, Element, Isotope, MassNumber, Massive, MonoisotopicMass};

use super::{
    atomic_database::{AtomicDatabase, ElementDescription},
    errors::AtomicLookupError,
};

impl<'a> Element<'a> {
    /// Looks up an element with its natural isotopic distribution
    pub(crate) fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        let element = Self::lookup(db, symbol.as_ref(), None)?;
        if element.natural_isotopes().next().is_none() {
            // SAFETY: The atomic database refuses to load elements without any isotopes
            let lightest = *element.isotopes.keys().min().unwrap();
            return Err(AtomicLookupError::no_natural_abundance(
                element.symbol,
                lightest,
                element.isotopes.keys().copied(),
            ));
        }
        Ok(element)
    }

    /// Looks up a single, explicitly selected isotope of an element
    pub(crate) fn new_isotope(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: MassNumber,
    ) -> Result<Self, AtomicLookupError> {
        let element = Self::lookup(db, symbol.as_ref(), Some(mass_number))?;
        if !element.isotopes.contains_key(&mass_number) {
            return Err(AtomicLookupError::unknown_isotope(
                element.symbol,
                mass_number,
                element.isotopes.keys().copied(),
            ));
        }
        Ok(element)
    }

    #[must_use]
    pub const fn symbol(&self) -> &'a str {
        self.symbol
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    fn lookup(
        db: &'a AtomicDatabase,
        symbol: &str,
        mass_number: Option<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        let (symbol, ElementDescription { name, isotopes }) = db
            .elements
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::unknown_element(symbol))?;
        Ok(Self {
            symbol,
            name,
            mass_number,
            isotopes,
        })
    }

    fn selected_isotope(&self) -> Option<&'a Isotope> {
        self.isotopes.get(&self.mass_number?)
    }

    fn natural_isotopes(&self) -> impl Iterator<Item = (&'a Isotope, Decimal)> {
        self.isotopes
            .values()
            .filter_map(|isotope| Some((isotope, isotope.abundance?)))
    }

    // NOTE: Hill order puts carbon first and hydrogen second, then sorts everything else alphabetically. Isotopes are
    // placed right after their natural element.
    fn hill_key(&self) -> (u8, &'a str, Option<MassNumber>) {
        let rank = match self.symbol {
            "C" => 0,
            "H" => 1,
            _ => 2,
        };
        (rank, self.symbol, self.mass_number)
    }
}

keyed_ord_impls!(Element, hill_key);

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.mass_number {
            Some(mass_number) => write!(f, "[{mass_number}{}]", self.symbol),
            None => f.write_str(self.symbol),
        }
    }
}

impl Massive for Element<'_> {
    fn monoisotopic_mass(&self) -> MonoisotopicMass {
        let isotope = self.selected_isotope().or_else(|| {
            self.natural_isotopes()
                .max_by_key(|&(_, abundance)| abundance)
                .map(|(isotope, _)| isotope)
        });
        // NOTE: Construction guarantees there is either a selected isotope or at least one natural one
        MonoisotopicMass(isotope.map_or(Decimal::ZERO, |i| i.relative_mass))
    }

    fn average_mass(&self) -> AverageMass {
        let mass = self.selected_isotope().map_or_else(
            || {
                self.natural_isotopes()
                    .map(|(isotope, abundance)| isotope.relative_mass * abundance)
                    .sum()
            },
            |isotope| isotope.relative_mass,
        );
        AverageMass(mass)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use rust_decimal_macros::dec;

    use super::*;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn element(symbol: &str) -> Element<'static> {
        Element::new(&DB, symbol).unwrap()
    }

    fn isotope(symbol: &str, n: u32) -> Element<'static> {
        Element::new_isotope(&DB, symbol, MassNumber::new(n).unwrap()).unwrap()
    }

    #[test]
    fn lookup_elements() {
        let nitrogen = element("N");
        assert_eq!((nitrogen.symbol(), nitrogen.name()), ("N", "Nitrogen"));
        assert_eq!(nitrogen.mass_number, None);
        assert_eq!(nitrogen.isotopes.len(), 2);

        assert_eq!(
            Element::new(&DB, "X"),
            Err(AtomicLookupError::UnknownElement {
                symbol: "X".to_owned()
            })
        );
    }

    #[test]
    fn lookup_isotopes() {
        let n15 = isotope("N", 15);
        assert_eq!(n15.name(), "Nitrogen");
        assert_eq!(n15.mass_number, MassNumber::new(15));

        let missing_element = Element::new_isotope(&DB, "X", MassNumber::new(15).unwrap());
        assert!(matches!(missing_element, Err(AtomicLookupError::UnknownElement { .. })));

        let error = Element::new_isotope(&DB, "N", MassNumber::new(16).unwrap()).unwrap_err();
        assert_eq!(error.to_string(), "the isotope [16N] isn't in the atomic database");
        assert_eq!(
            error,
            AtomicLookupError::UnknownIsotope {
                symbol: "N".to_owned(),
                mass_number: MassNumber::new(16).unwrap(),
                known: "[14, 15]".to_owned()
            }
        );
    }

    #[test]
    fn synthetic_elements() {
        let error = Element::new(&DB, "Tc").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Tc has no naturally occurring isotopes, so it has no default mass"
        );
        assert!(matches!(
            error,
            AtomicLookupError::NoNaturalAbundance { ref known, .. } if known == "[97, 98, 99]"
        ));

        let tc99 = isotope("Tc", 99);
        assert_eq!(tc99.monoisotopic_mass(), MonoisotopicMass(dec!(98.9062508)));
        assert_eq!(tc99.average_mass(), AverageMass(dec!(98.9062508)));
    }

    #[test]
    fn hill_order_and_display() {
        let mut elements = vec![
            element("S"),
            isotope("H", 2),
            element("O"),
            element("H"),
            element("N"),
            isotope("C", 13),
            element("C"),
        ];
        elements.sort();
        let formula: Vec<_> = elements.iter().map(ToString::to_string).collect();
        assert_eq!(formula, ["C", "[13C]", "H", "[2H]", "N", "O", "S"]);
        assert_ne!(element("C"), isotope("C", 13));
    }

    #[test]
    fn peptide_element_masses() {
        let monoisotopic = |symbol| element(symbol).monoisotopic_mass();
        assert_eq!(monoisotopic("C"), MonoisotopicMass(dec!(12)));
        assert_eq!(monoisotopic("H"), MonoisotopicMass(dec!(1.00782503223)));
        assert_eq!(monoisotopic("N"), MonoisotopicMass(dec!(14.00307400443)));
        assert_eq!(monoisotopic("O"), MonoisotopicMass(dec!(15.99491461957)));

        assert_eq!(
            element("H").average_mass(),
            AverageMass(dec!(1.00782503223) * dec!(0.999885) + dec!(2.01410177812) * dec!(0.000115))
        );
        assert_eq!(isotope("C", 13).average_mass(), AverageMass(dec!(13.00335483507)));
    }
}
