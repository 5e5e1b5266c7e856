// External Crate Imports
use chemcomp::CompositionRegistry;
use rust_decimal::Decimal;
use tracing::debug;

// Local Crate Imports
use crate::{Error, IonType, Result, VariableMods, calculate_mass, isoforms};

/// One line of the peptidoform table
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResultRow {
    pub sequence: String,
    pub peptidoform: String,
    pub z: i64,
    pub mz: Decimal,
}

/// Enumerates the peptidoforms of many sequences at several charge states, pairing each with its m/z
#[derive(Clone, Debug)]
pub struct PeptidoformTable<'r, 'a> {
    registry: &'r CompositionRegistry<'a>,
    variable_mods: VariableMods,
    charges: Vec<i64>,
    ion_type: IonType,
    show_unmodified_termini: bool,
}

impl<'r, 'a> PeptidoformTable<'r, 'a> {
    /// Defaults to neutral (`z = 0`) precursor masses, with unmodified termini written out as `H-` and `-OH`
    ///
    /// # Errors
    ///
    /// Fails if `variable_mods` refers to anything that isn't in `registry` (see [`VariableMods::validate`])
    pub fn new(registry: &'r CompositionRegistry<'a>, variable_mods: VariableMods) -> Result<Self> {
        variable_mods.validate(registry)?;
        Ok(Self {
            registry,
            variable_mods,
            charges: vec![0],
            ion_type: IonType::default(),
            show_unmodified_termini: true,
        })
    }

    #[must_use]
    pub fn charges(mut self, charges: impl IntoIterator<Item = i64>) -> Self {
        self.charges = charges.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn ion_type(mut self, ion_type: IonType) -> Self {
        self.ion_type = ion_type;
        self
    }

    #[must_use]
    pub const fn show_unmodified_termini(mut self, show_unmodified_termini: bool) -> Self {
        self.show_unmodified_termini = show_unmodified_termini;
        self
    }

    #[must_use]
    pub const fn variable_mods(&self) -> &VariableMods {
        &self.variable_mods
    }

    /// Lazily yields a row for every sequence, peptidoform, and charge (in that order of precedence)
    ///
    /// # Errors
    ///
    /// Every sequence is checked before any rows are produced, failing with [`Error::UnknownResidue`] if any contain
    /// something other than registered amino acids. Each row can still fail individually if its mass can't be
    /// calculated.
    pub fn rows(
        &self,
        sequences: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<impl Iterator<Item = Result<ResultRow>> + '_> {
        let sequences = sequences
            .into_iter()
            .map(|sequence| -> Result<String> {
                let sequence = sequence.as_ref();
                self.validate_sequence(sequence)?;
                Ok(sequence.to_owned())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(sequences.into_iter().flat_map(move |sequence| {
            let peptidoforms = isoforms(&sequence, &self.variable_mods, self.show_unmodified_termini);
            match peptidoforms.remaining() {
                Some(count) => debug!(%sequence, peptidoforms = count, "enumerating peptidoforms"),
                None => debug!(%sequence, peptidoforms = "overflow", "enumerating peptidoforms"),
            }

            peptidoforms.flat_map(move |peptidoform| {
                let sequence = sequence.clone();
                self.charges.iter().map(move |&z| -> Result<ResultRow> {
                    let mz = calculate_mass(&peptidoform, self.registry, z, self.ion_type)?;
                    Ok(ResultRow {
                        sequence: sequence.clone(),
                        peptidoform: peptidoform.clone(),
                        z,
                        mz,
                    })
                })
            })
        }))
    }

    fn validate_sequence(&self, sequence: &str) -> Result<()> {
        match sequence
            .chars()
            .enumerate()
            .find(|&(_, code)| !self.registry.is_residue(code))
        {
            Some((position, code)) => Err(Error::UnknownResidue {
                sequence: sequence.to_owned(),
                code,
                position,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use chemcomp::{AtomicDatabase, UnimodDatabase};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::Eligibility;

    const H3_SEQUENCES: [&str; 4] = ["KSAPATGGVKKPHR", "KSAPSTGGVKKPHR", "KSAPSIGGVKKPHR", "KSVPSTGGVKKPHR"];

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);
    static REGISTRY: LazyLock<CompositionRegistry> = LazyLock::new(|| {
        let unimod = UnimodDatabase::new(&DB);
        let mut registry = CompositionRegistry::new(&DB);
        registry.resolve_from_external("ac", "Acetyl", &unimod).unwrap();
        registry.resolve_from_external("pr", "Propionyl", &unimod).unwrap();
        registry
    });

    fn histone_mods() -> VariableMods {
        VariableMods::from_entries([
            ("ac", Eligibility::residues("K")),
            ("pr", Eligibility::residues("SKT")),
        ])
        .unwrap()
    }

    #[test]
    fn histone_h3_rows() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods()).unwrap();
        let rows: Vec<_> = table.rows(["KSAPATGGVKKPHR"]).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 108);
        assert!(rows.iter().all(|r| r.sequence == "KSAPATGGVKKPHR" && r.z == 0));
        assert_eq!(rows[0].peptidoform, "H-KSAPATGGVKKPHR-OH");
        assert_eq!(rows[1].peptidoform, "H-KSAPATGGVKacKPHR-OH");
        assert_eq!(rows.last().unwrap().peptidoform, "H-prKprSAPAprTGGVprKprKPHR-OH");

        let all_rows = table.rows(H3_SEQUENCES).unwrap().count();
        assert_eq!(all_rows, 108 + 216 + 108 + 216);
    }

    #[test]
    fn charge_states() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods())
            .unwrap()
            .charges([1, 2]);
        let rows: Vec<_> = table.rows(["SK"]).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 6 * 2);
        assert_eq!(
            rows[..2],
            [
                ResultRow {
                    sequence: "SK".to_owned(),
                    peptidoform: "H-SK-OH".to_owned(),
                    z: 1,
                    mz: dec!(234.144832570561),
                },
                ResultRow {
                    sequence: "SK".to_owned(),
                    peptidoform: "H-SK-OH".to_owned(),
                    z: 2,
                    mz: dec!(117.576054518591),
                },
            ]
        );
        assert_eq!(rows[2].peptidoform, "H-SacK-OH");
    }

    #[test]
    fn hidden_termini_and_ion_types() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods())
            .unwrap()
            .show_unmodified_termini(false)
            .ion_type(IonType::B);
        let row = table.rows(["SK"]).unwrap().next().unwrap().unwrap();
        assert_eq!(row.peptidoform, "SK");
        assert_eq!(row.mz, dec!(215.12699141991));
    }

    #[test]
    fn long_sequences_stay_lazy() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods()).unwrap();
        let lysines = "K".repeat(30);
        let rows: Vec<_> = table.rows([&lysines]).unwrap().take(3).collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].peptidoform, format!("H-{lysines}-OH"));
        assert_eq!(rows[2].peptidoform, format!("H-{}prK-OH", "K".repeat(29)));
    }

    #[test]
    fn c_terminal_histidine() {
        let unimod = UnimodDatabase::new(&DB);
        let mut registry = REGISTRY.clone();
        registry.resolve_from_external("am", "Amidated", &unimod).unwrap();
        let mut mods = VariableMods::new();
        mods.insert("am", Eligibility::CTerminal(true)).unwrap();
        mods.register_terminals(&mut registry).unwrap();

        let table = PeptidoformTable::new(&registry, mods)
            .unwrap()
            .show_unmodified_termini(false);
        let rows: Vec<_> = table.rows(["H"]).unwrap().collect::<Result<_>>().unwrap();
        let peptidoforms: Vec<_> = rows.iter().map(|r| r.peptidoform.as_str()).collect();
        assert_eq!(peptidoforms, ["H", "H-am"]);
        // Amidation swaps an O for an NH
        assert!(rows[1].mz < rows[0].mz);
    }

    #[test]
    fn empty_inputs() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods()).unwrap();
        assert_eq!(table.rows([""]).unwrap().count(), 0);
        assert_eq!(table.rows(Vec::<String>::new()).unwrap().count(), 0);

        let no_charges = table.clone().charges([]);
        assert_eq!(no_charges.rows(H3_SEQUENCES).unwrap().count(), 0);
        assert_eq!(table.variable_mods(), &histone_mods());
    }

    #[test]
    fn invalid_sequences() {
        let table = PeptidoformTable::new(&REGISTRY, histone_mods()).unwrap();
        let error = table.rows(["KSAP", "KSaP"]).err().unwrap();
        assert_eq!(
            error,
            Error::UnknownResidue {
                sequence: "KSaP".to_owned(),
                code: 'a',
                position: 2
            }
        );
        assert!(table.rows(["KJ"]).is_err());
    }

    #[test]
    fn invalid_modifications() {
        let mut unregistered = histone_mods();
        unregistered.insert("pr", Eligibility::NTerminal(true)).unwrap();
        let error = PeptidoformTable::new(&REGISTRY, unregistered).unwrap_err();
        assert_eq!(
            error.to_string(),
            "the label \"pr-\" could not be found in the composition registry"
        );

        let bad_code = VariableMods::from_entries([("ac", Eligibility::residues("B"))]).unwrap();
        assert!(matches!(
            PeptidoformTable::new(&REGISTRY, bad_code),
            Err(Error::InvalidResidueCode { code: 'B', .. })
        ));
    }
}
