// External Crate Imports
use chemcomp::{CompositionRegistry, ModificationSource};
use knuffel::{Decode, span::Span};
use peptidoform::{Eligibility, Error, IonType, VariableMods};
use tracing::debug;

// Public API ==========================================================================================================

pub const DEFAULT_KDL: &str = include_str!("../data/histone_h3.kdl");

/// Everything needed to build one peptidoform table
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Config {
    pub sequences: Vec<String>,
    pub charges: Vec<i64>,
    pub ion_type: IonType,
    pub show_unmodified_termini: bool,
    pub modifications: Vec<Modification>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Modification {
    pub label: String,
    pub title: String,
    pub n_terminal: bool,
    pub c_terminal: bool,
    pub residues: String,
}

impl Config {
    /// # Errors
    ///
    /// Returns a diagnostic pointing into `kdl_text` if it isn't a valid configuration file, or if its ion type is
    /// unknown
    pub fn from_kdl(file_name: impl AsRef<str>, kdl_text: impl AsRef<str>) -> miette::Result<Self> {
        let parsed: ConfigKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        let ion_type = parsed.ion_type.as_deref().map_or(Ok(IonType::default()), str::parse)?;
        let modifications = parsed
            .modifications
            .unwrap_or_default()
            .into_iter()
            .map(|m| Modification {
                label: m.label,
                title: m.title,
                n_terminal: m.n_terminal,
                c_terminal: m.c_terminal,
                residues: m.residues.unwrap_or_default().concat(),
            })
            .collect();

        Ok(Self {
            sequences: parsed.sequences,
            charges: parsed.charges.unwrap_or_else(|| vec![0]),
            ion_type,
            show_unmodified_termini: parsed.show_unmodified_termini.unwrap_or(true),
            modifications,
        })
    }

    /// Looks up every modification in `source`, registering it (and any terminal groups derived from it) in
    /// `registry`, then returns the table of sites each modification may occupy
    ///
    /// # Errors
    ///
    /// Fails if a label is malformed, repeated for the same site, or bound to two different titles. Also fails if a
    /// title can't be found in `source`. The registry is left untouched for the modification that failed.
    pub fn register_modifications<'a>(
        &self,
        registry: &mut CompositionRegistry<'a>,
        source: &impl ModificationSource<'a>,
    ) -> peptidoform::Result<VariableMods> {
        let mut variable_mods = VariableMods::new();
        for (index, modification) in self.modifications.iter().enumerate() {
            let Modification {
                label,
                title,
                n_terminal,
                c_terminal,
                residues,
            } = modification;
            // NOTE: Unimod titles are case-insensitive, so `Acetyl` and `acetyl` name the same formula
            if let Some(previous) = self.modifications[..index]
                .iter()
                .find(|m| m.label == *label && !m.title.eq_ignore_ascii_case(title))
            {
                return Err(Error::ConflictingLabel {
                    label: label.clone(),
                    previous: previous.title.clone(),
                    title: title.clone(),
                });
            }

            registry.resolve_from_external(label, title, source)?;
            if *n_terminal {
                variable_mods.insert(label, Eligibility::NTerminal(true))?;
            }
            if *c_terminal {
                variable_mods.insert(label, Eligibility::CTerminal(true))?;
            }
            if !residues.is_empty() {
                variable_mods.insert(label, Eligibility::residues(residues))?;
            }
        }
        variable_mods.register_terminals(registry)?;
        debug!(modifications = self.modifications.len(), "registered modifications");
        Ok(variable_mods)
    }
}

impl Default for Config {
    fn default() -> Self {
        // SAFETY: The embedded configuration is checked by the tests below, so this should never panic
        Self::from_kdl("histone_h3.kdl", DEFAULT_KDL).unwrap()
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ConfigKdl {
    #[knuffel(child, unwrap(arguments))]
    sequences: Vec<String>,
    #[knuffel(child, unwrap(arguments))]
    charges: Option<Vec<i64>>,
    #[knuffel(child, unwrap(argument))]
    ion_type: Option<String>,
    #[knuffel(child, unwrap(argument))]
    show_unmodified_termini: Option<bool>,
    #[knuffel(child, unwrap(children))]
    modifications: Option<Vec<ModificationKdl>>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ModificationKdl {
    #[knuffel(node_name)]
    label: String,
    #[knuffel(argument)]
    title: String,
    #[knuffel(child)]
    n_terminal: bool,
    #[knuffel(child)]
    c_terminal: bool,
    #[knuffel(child, unwrap(arguments))]
    residues: Option<Vec<String>>,
}
