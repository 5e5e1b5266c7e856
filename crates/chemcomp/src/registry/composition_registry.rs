// External Crate Imports
use ahash::HashMap;
use knuffel::{Decode, span::Span};
use tracing::debug;

// Local Crate Imports
use super::{
    ModificationSource,
    labels::{validate_modification_label, validate_residue_label, validate_terminal_label},
    validation::{ChemResult, ChemicalCompositionKdl, ChemistryErrorKind, ValidateInto, collect_unique},
};
use crate::{AtomicDatabase, ChemicalComposition, PolychemError, Result};

// Public API ==========================================================================================================

pub const DEFAULT_KDL: &str = include_str!("../../data/residues.kdl");

pub const N_TERMINAL_HYDROGEN: &str = "H-";
pub const C_TERMINAL_HYDROXYL: &str = "-OH";

/// Maps residue codes, modification labels, and terminal groups to their elemental compositions
///
/// Built once (standard residues, then modifications, then any derived terminal groups) and then shared by reference
/// for enumeration and mass calculation
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CompositionRegistry<'a> {
    atomic_db: &'a AtomicDatabase,
    compositions: HashMap<String, ChemicalComposition<'a>>,
    names: HashMap<String, String>,
}

impl<'a> CompositionRegistry<'a> {
    /// Loads the standard residue table: the 20 standard amino acids, pyrrolysine (`O`), selenocysteine (`U`), and the
    /// default termini (`H-` and `-OH`)
    #[must_use]
    pub fn new(atomic_db: &'a AtomicDatabase) -> Self {
        // SAFETY: The embedded residue table is checked by the tests below, so this should never panic
        Self::from_kdl(atomic_db, "residues.kdl", DEFAULT_KDL).unwrap()
    }

    /// Builds a registry from a custom residue table
    ///
    /// # Errors
    ///
    /// Returns a diagnostic pointing into `kdl_text` if it isn't valid KDL, if any label is malformed or defined
    /// twice, or if any composition fails to parse
    pub fn from_kdl(
        atomic_db: &'a AtomicDatabase,
        file_name: impl AsRef<str>,
        kdl_text: impl AsRef<str>,
    ) -> miette::Result<Self> {
        let parsed: ResidueTableKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        let entries = parsed
            .validate(atomic_db)
            .map_err(|e| e.finalize("residue table", file_name, kdl_text))?;

        let mut compositions = HashMap::default();
        let mut names = HashMap::default();
        for (label, (name, composition)) in entries {
            names.insert(label.clone(), name);
            compositions.insert(label, composition);
        }

        Ok(Self {
            atomic_db,
            compositions,
            names,
        })
    }

    #[must_use]
    pub const fn atomic_db(&self) -> &'a AtomicDatabase {
        self.atomic_db
    }

    /// # Errors
    ///
    /// Returns [`PolychemError::CompositionLookup`] if nothing has been registered under `label`
    pub fn get(&self, label: &str) -> Result<&ChemicalComposition<'a>> {
        self.compositions
            .get(label)
            .ok_or_else(|| Box::new(PolychemError::composition_lookup(label)))
    }

    /// Registers `composition` under `label`, returning any composition it replaced
    pub fn set(
        &mut self,
        label: impl Into<String>,
        composition: ChemicalComposition<'a>,
    ) -> Option<ChemicalComposition<'a>> {
        let label = label.into();
        debug!(%label, %composition, "registering composition");
        self.compositions.insert(label, composition)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.compositions.contains_key(label)
    }

    /// Whether `code` is a registered residue (not just any registered label)
    #[must_use]
    pub fn is_residue(&self, code: char) -> bool {
        code.is_ascii_uppercase() && self.compositions.contains_key(code.encode_utf8(&mut [0; 4]) as &str)
    }

    /// The full name of a residue or terminal group from the residue table, like "Lysine" for `K`
    #[must_use]
    pub fn name(&self, label: &str) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.compositions.keys().map(String::as_str)
    }

    /// Looks `title` up in an external modification database and registers the result under `label`
    ///
    /// # Errors
    ///
    /// Fails if `label` isn't a valid modification label, or if `source` can't find `title`. Either way, the registry
    /// is left untouched
    pub fn resolve_from_external(
        &mut self,
        label: &str,
        title: &str,
        source: &impl ModificationSource<'a>,
    ) -> Result<()> {
        validate_modification_label(label)?;
        let composition = source.composition_by_title(title)?;
        debug!(%label, %title, "resolved external modification");
        self.set(label, composition);
        Ok(())
    }

    /// Derives the N-terminal group `{label}-` by adding the composition of `label` to the N-terminal hydrogen
    ///
    /// # Errors
    ///
    /// Returns [`PolychemError::CompositionLookup`] if either `label` or `H-` is unregistered
    pub fn register_n_terminal(&mut self, label: &str) -> Result<()> {
        self.register_terminal(label, N_TERMINAL_HYDROGEN, format!("{label}-"))
    }

    /// Derives the C-terminal group `-{label}` by adding the composition of `label` to the C-terminal hydroxyl
    ///
    /// # Errors
    ///
    /// Returns [`PolychemError::CompositionLookup`] if either `label` or `-OH` is unregistered
    pub fn register_c_terminal(&mut self, label: &str) -> Result<()> {
        self.register_terminal(label, C_TERMINAL_HYDROXYL, format!("-{label}"))
    }

    fn register_terminal(&mut self, label: &str, terminus: &str, terminal_label: String) -> Result<()> {
        let composition = self.get(terminus)?.clone() + self.get(label)?;
        self.set(terminal_label, composition);
        Ok(())
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ResidueTableKdl {
    #[knuffel(child, unwrap(children))]
    residues: Vec<GroupKdl>,
    #[knuffel(child, unwrap(children))]
    termini: Vec<GroupKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct GroupKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(node_name)]
    label: String,
    #[knuffel(argument)]
    name: String,
    #[knuffel(child, unwrap(argument))]
    composition: ChemicalCompositionKdl,
}

// Residue Table Validation ============================================================================================

type RegistryEntries<'a> = HashMap<String, (String, ChemicalComposition<'a>)>;

impl<'a> ValidateInto<'a, RegistryEntries<'a>> for ResidueTableKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> ChemResult<RegistryEntries<'a>> {
        let residue_label: LabelValidator = validate_residue_label;
        let terminal_label: LabelValidator = validate_terminal_label;
        let residues = self.residues.into_iter().map(|r| r.validate((ctx, residue_label)));
        let termini = self.termini.into_iter().map(|t| t.validate((ctx, terminal_label)));
        collect_unique(residues.chain(termini))
    }
}

type GroupEntry<'a> = (String, Span, (String, ChemicalComposition<'a>));
type LabelValidator = fn(&str) -> Result<()>;

impl<'a> ValidateInto<'a, GroupEntry<'a>> for GroupKdl {
    type Context = (&'a AtomicDatabase, LabelValidator);

    fn validate(self, (atomic_db, validate_label): Self::Context) -> ChemResult<GroupEntry<'a>> {
        validate_label(&self.label).map_err(|e| ChemistryErrorKind::InvalidLabel(self.span, *e))?;
        let composition = self.composition.validate(atomic_db)?;
        Ok((self.label, self.span, (self.name, composition)))
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{Massive, MonoisotopicMass};

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn composition(formula: &str) -> ChemicalComposition<'static> {
        ChemicalComposition::new(&DB, formula).unwrap()
    }

    #[test]
    fn standard_residue_table() {
        let registry = CompositionRegistry::new(&DB);
        assert_eq!(registry.labels().count(), 24);
        for code in "ACDEFGHIKLMNOPQRSTUVWY".chars() {
            assert!(registry.is_residue(code), "{code}");
        }
        for code in ['B', 'J', 'X', 'Z', 'k'] {
            assert!(!registry.is_residue(code), "{code}");
        }
        assert!(registry.contains("H-"));
        assert!(registry.contains("-OH"));
        assert_eq!(registry.name("K"), Some("Lysine"));
        assert_eq!(registry.name("-OH"), Some("C-Terminal Hydroxyl"));
        assert_eq!(registry.name("ac"), None);

        let lysine = registry.get("K").unwrap();
        assert_eq!(
            lysine.monoisotopic_mass(),
            MonoisotopicMass(dec!(128.09496301519))
        );
        let serine = registry.get("S").unwrap();
        assert_eq!(
            serine.monoisotopic_mass(),
            MonoisotopicMass(dec!(87.03202840472))
        );
        // Termini add up to water
        let water = registry.get("H-").unwrap().clone() + registry.get("-OH").unwrap();
        assert_eq!(water, composition("H2O"));
    }

    #[test]
    fn unknown_labels() {
        let registry = CompositionRegistry::new(&DB);
        let error = registry.get("ac").unwrap_err();
        assert_eq!(*error, PolychemError::composition_lookup("ac"));
        assert_eq!(
            error.to_string(),
            "the label \"ac\" could not be found in the composition registry"
        );
    }

    #[test]
    fn set_and_overwrite() {
        let mut registry = CompositionRegistry::new(&DB);
        assert!(!registry.contains("ac"));
        assert_eq!(registry.set("ac", composition("C2H2O")), None);
        assert!(registry.contains("ac"));
        assert!(!registry.is_residue('a'));
        let replaced = registry.set("ac", composition("CH2"));
        assert_eq!(replaced, Some(composition("C2H2O")));
        assert_eq!(registry.get("ac").unwrap(), &composition("CH2"));
    }

    #[test]
    fn terminal_groups() {
        let mut registry = CompositionRegistry::new(&DB);
        registry.set("pr", composition("C3H4O"));
        registry.register_n_terminal("pr").unwrap();
        assert_eq!(registry.get("pr-").unwrap(), &composition("C3H5O"));
        registry.register_c_terminal("pr").unwrap();
        assert_eq!(registry.get("-pr").unwrap(), &composition("C3H5O2"));

        let error = registry.register_n_terminal("ac").unwrap_err();
        assert_eq!(*error, PolychemError::composition_lookup("ac"));
        assert!(!registry.contains("ac-"));
    }

    #[test]
    fn resolve_from_closures() {
        let mut registry = CompositionRegistry::new(&DB);
        let source = |title: &str| match title {
            "Acetyl" => ChemicalComposition::new(&DB, "C2H2O"),
            _ => Err(Box::new(PolychemError::modification_title_lookup(title))),
        };

        registry.resolve_from_external("ac", "Acetyl", &source).unwrap();
        assert_eq!(registry.get("ac").unwrap(), &composition("C2H2O"));

        let before = registry.clone();
        let error = registry.resolve_from_external("xx", "Unknown", &source).unwrap_err();
        assert_eq!(*error, PolychemError::modification_title_lookup("Unknown"));
        let error = registry.resolve_from_external("Ac", "Acetyl", &source).unwrap_err();
        assert_eq!(*error, PolychemError::invalid_modification_label("Ac"));
        assert_eq!(registry, before);
    }

    #[test]
    fn custom_residue_tables() {
        let kdl = indoc! {r#"
            residues {
              G "Glycine" { composition "C2H3NO"; }
              X "Heavy Glycine" { composition "[13C]2H3NO"; }
            }
            termini {
              "H-" "N-Terminal Hydrogen" { composition "H"; }
              "-NH2" "C-Terminal Amide" { composition "NH2"; }
            }
        "#};
        let registry = CompositionRegistry::from_kdl(&DB, "test", kdl).unwrap();
        assert_eq!(registry.labels().count(), 4);
        assert!(registry.is_residue('X'));
        assert_eq!(registry.get("-NH2").unwrap(), &composition("H2N"));
    }

    #[test]
    fn invalid_residue_tables() {
        let parse = |kdl| CompositionRegistry::from_kdl(&DB, "test", kdl);
        // Malformed residue labels
        let kdl = indoc! {r#"
            residues {
              Gly "Glycine" { composition "C2H3NO"; }
            }
            termini {}
        "#};
        assert!(parse(kdl).is_err());
        // Malformed terminal labels
        let kdl = indoc! {r#"
            residues {}
            termini {
              "OH" "C-Terminal Hydroxyl" { composition "OH"; }
            }
        "#};
        assert!(parse(kdl).is_err());
        // Duplicate labels
        let kdl = indoc! {r#"
            residues {
              G "Glycine" { composition "C2H3NO"; }
              G "Glycine" { composition "C2H3NO"; }
            }
            termini {}
        "#};
        let error = parse(kdl).unwrap_err();
        assert_eq!(error.to_string(), "failed to validate residue table file");
        // Invalid compositions
        let kdl = indoc! {r#"
            residues {
              G "Glycine" { composition "C2H3Nq"; }
            }
            termini {}
        "#};
        assert!(parse(kdl).is_err());
    }
}
