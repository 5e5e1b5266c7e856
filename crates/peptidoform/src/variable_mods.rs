// External Crate Imports
use chemcomp::{CompositionRegistry, registry::labels::validate_modification_label};
use derive_more::Display;
use itertools::Itertools;
use tracing::debug;

// Local Crate Imports
use crate::{Error, Result};

/// Where a variable modification is allowed to land
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Eligibility {
    /// When `true`, the modification can replace the N-terminal hydrogen (rendered as `label-`)
    NTerminal(bool),
    /// When `true`, the modification can replace the C-terminal hydroxyl (rendered as `-label`)
    CTerminal(bool),
    /// The modification can be attached to any of these residues (rendered as `labelK`)
    Residues(Vec<char>),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Site {
    #[display("N-terminal")]
    NTerminal,
    #[display("C-terminal")]
    CTerminal,
    #[display("residue")]
    Residue,
}

impl Eligibility {
    /// Collects residue codes from a string like `"SKT"`, dropping any repeats
    pub fn residues(codes: impl AsRef<str>) -> Self {
        Self::Residues(codes.as_ref().chars().unique().collect())
    }

    #[must_use]
    pub const fn site(&self) -> Site {
        match self {
            Self::NTerminal(_) => Site::NTerminal,
            Self::CTerminal(_) => Site::CTerminal,
            Self::Residues(_) => Site::Residue,
        }
    }
}

/// An ordered table of variable modifications and the sites each may occupy
///
/// The same label may appear once per [`Site`], so `pr` can be both an N-terminal and a residue modification. Table
/// order decides the order in which modified states are enumerated.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct VariableMods {
    entries: Vec<(String, Eligibility)>,
}

impl VariableMods {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Fails if any label is malformed, or if a label is given twice for the same [`Site`]
    pub fn from_entries<L: Into<String>>(entries: impl IntoIterator<Item = (L, Eligibility)>) -> Result<Self> {
        let mut variable_mods = Self::new();
        for (label, eligibility) in entries {
            variable_mods.insert(label, eligibility)?;
        }
        Ok(variable_mods)
    }

    /// # Errors
    ///
    /// Fails if `label` is malformed, or if it has already been given for the same [`Site`]
    pub fn insert(&mut self, label: impl Into<String>, eligibility: Eligibility) -> Result<&mut Self> {
        let label = label.into();
        validate_modification_label(&label)?;

        let site = eligibility.site();
        if self.entries.iter().any(|(l, e)| *l == label && e.site() == site) {
            return Err(Error::DuplicateModification { label, site });
        }

        self.entries.push((label, eligibility));
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Eligibility)> {
        self.entries.iter().map(|(l, e)| (l.as_str(), e))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels of every modification that can be attached to `residue`, in table order
    pub fn residue_mods(&self, residue: char) -> impl Iterator<Item = &str> {
        self.iter().filter_map(move |(label, eligibility)| {
            matches!(eligibility, Eligibility::Residues(codes) if codes.contains(&residue)).then_some(label)
        })
    }

    pub fn n_terminal_mods(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(label, eligibility)| (*eligibility == Eligibility::NTerminal(true)).then_some(label))
    }

    pub fn c_terminal_mods(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(label, eligibility)| (*eligibility == Eligibility::CTerminal(true)).then_some(label))
    }

    /// Derives the `label-` and `-label` terminal groups for every enabled terminal modification
    ///
    /// # Errors
    ///
    /// Fails if any terminal modification hasn't been registered yet
    pub fn register_terminals(&self, registry: &mut CompositionRegistry) -> Result<()> {
        for label in self.n_terminal_mods() {
            registry.register_n_terminal(label)?;
        }
        for label in self.c_terminal_mods() {
            registry.register_c_terminal(label)?;
        }
        Ok(())
    }

    /// Checks that every label (including derived terminal groups) resolves in `registry` and that every residue
    /// code is a registered amino acid
    ///
    /// # Errors
    ///
    /// Returns the first missing label or invalid residue code
    pub fn validate(&self, registry: &CompositionRegistry) -> Result<()> {
        for (label, eligibility) in self.iter() {
            match eligibility {
                Eligibility::Residues(codes) => {
                    if let Some(&code) = codes.iter().find(|&&c| !registry.is_residue(c)) {
                        return Err(Error::InvalidResidueCode {
                            label: label.to_owned(),
                            code,
                        });
                    }
                    registry.get(label)?;
                }
                Eligibility::NTerminal(true) => {
                    registry.get(&format!("{label}-"))?;
                }
                Eligibility::CTerminal(true) => {
                    registry.get(&format!("-{label}"))?;
                }
                Eligibility::NTerminal(false) | Eligibility::CTerminal(false) => (),
            }
        }
        debug!(modifications = self.len(), "validated variable modifications");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use chemcomp::{AtomicDatabase, ChemicalComposition, PolychemError, UnimodDatabase};

    use super::*;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn histone_mods() -> VariableMods {
        VariableMods::from_entries([
            ("pr", Eligibility::NTerminal(true)),
            ("ac", Eligibility::residues("K")),
            ("me2", Eligibility::residues("K")),
            ("pr", Eligibility::residues("SKT")),
        ])
        .unwrap()
    }

    #[test]
    fn residue_lookup() {
        let mods = histone_mods();
        assert_eq!(mods.len(), 4);
        assert!(!mods.is_empty());
        assert_eq!(mods.residue_mods('K').collect_vec(), ["ac", "me2", "pr"]);
        assert_eq!(mods.residue_mods('S').collect_vec(), ["pr"]);
        assert_eq!(mods.residue_mods('G').count(), 0);
        assert_eq!(mods.n_terminal_mods().collect_vec(), ["pr"]);
        assert_eq!(mods.c_terminal_mods().count(), 0);
    }

    #[test]
    fn disabled_and_empty_entries() {
        let mods = VariableMods::from_entries([
            ("pr", Eligibility::NTerminal(false)),
            ("am", Eligibility::CTerminal(false)),
            ("ac", Eligibility::residues("")),
        ])
        .unwrap();
        assert_eq!(mods.n_terminal_mods().count(), 0);
        assert_eq!(mods.c_terminal_mods().count(), 0);
        assert_eq!(mods.residue_mods('K').count(), 0);
    }

    #[test]
    fn repeated_residue_codes() {
        assert_eq!(Eligibility::residues("KSKK"), Eligibility::Residues(vec!['K', 'S']));
    }

    #[test]
    fn duplicate_labels() {
        let mut mods = histone_mods();
        let error = mods.insert("ac", Eligibility::residues("S")).unwrap_err();
        assert_eq!(
            error,
            Error::DuplicateModification {
                label: "ac".to_owned(),
                site: Site::Residue
            }
        );
        assert_eq!(
            error.to_string(),
            "the residue modification \"ac\" has already been defined"
        );

        let error = mods.insert("pr", Eligibility::NTerminal(false)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "the N-terminal modification \"pr\" has already been defined"
        );

        // The same label at a different site is fine
        mods.insert("ac", Eligibility::NTerminal(true)).unwrap();
        assert_eq!(mods.len(), 5);
    }

    #[test]
    fn invalid_labels() {
        let error = VariableMods::new().insert("Ac", Eligibility::residues("K")).unwrap_err();
        assert!(matches!(
            error,
            Error::PolychemError(e) if matches!(*e, PolychemError::InvalidModificationLabel { .. })
        ));
        assert!(VariableMods::new().insert("pr-", Eligibility::NTerminal(true)).is_err());
        assert!(VariableMods::new().insert("", Eligibility::residues("K")).is_err());
    }

    #[test]
    fn validate_against_registry() {
        let unimod = UnimodDatabase::new(&DB);
        let mut registry = CompositionRegistry::new(&DB);
        let mods = histone_mods();

        // Nothing registered yet
        let error = mods.validate(&registry).unwrap_err();
        assert_eq!(
            error.to_string(),
            "the label \"pr-\" could not be found in the composition registry"
        );

        for (label, title) in [("ac", "Acetyl"), ("me2", "Dimethyl"), ("pr", "Propionyl")] {
            registry.resolve_from_external(label, title, &unimod).unwrap();
        }
        mods.register_terminals(&mut registry).unwrap();
        assert!(registry.contains("pr-"));
        assert!(!registry.contains("-pr"));
        mods.validate(&registry).unwrap();

        let mut bad_residue = mods.clone();
        bad_residue.insert("ac", Eligibility::CTerminal(false)).unwrap();
        bad_residue.insert("hb", Eligibility::residues("Kk")).unwrap();
        assert_eq!(
            bad_residue.validate(&registry).unwrap_err(),
            Error::InvalidResidueCode {
                label: "hb".to_owned(),
                code: 'k'
            }
        );

        let mut unregistered = mods;
        unregistered.insert("cr", Eligibility::residues("K")).unwrap();
        assert_eq!(
            unregistered.validate(&registry).unwrap_err().to_string(),
            "the label \"cr\" could not be found in the composition registry"
        );
    }

    #[test]
    fn c_terminal_groups() {
        let mut registry = CompositionRegistry::new(&DB);
        let mods = VariableMods::from_entries([("am", Eligibility::CTerminal(true))]).unwrap();
        assert!(mods.register_terminals(&mut registry).is_err());

        // Amidation swaps the C-terminal hydroxyl for an amine
        let amidation = ChemicalComposition::new(&DB, "HN").unwrap() - ChemicalComposition::new(&DB, "O").unwrap();
        registry.set("am", amidation);
        mods.register_terminals(&mut registry).unwrap();
        assert_eq!(registry.get("-am").unwrap().to_string(), "H2N");
        mods.validate(&registry).unwrap();
    }
}
