// External Crate Imports
use ahash::HashMap;
use knuffel::{Decode, span::Span};

// Local Crate Imports
use super::{
    ModificationSource,
    validation::{ChemResult, ChemicalCompositionKdl, ValidateInto, collect_unique},
};
use crate::{AtomicDatabase, ChemicalComposition, PolychemError, Result};

// Public API ==========================================================================================================

pub const DEFAULT_KDL: &str = include_str!("../../data/unimod.kdl");

/// An offline excerpt of Unimod, with modifications looked up by their (case-insensitive) title
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnimodDatabase<'a> {
    modifications: HashMap<String, UnimodEntry<'a>>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnimodEntry<'a> {
    pub title: String,
    pub id: u32,
    pub full_name: String,
    pub gained: ChemicalComposition<'a>,
    pub lost: ChemicalComposition<'a>,
}

impl<'a> UnimodDatabase<'a> {
    #[must_use]
    pub fn new(atomic_db: &'a AtomicDatabase) -> Self {
        // SAFETY: The embedded excerpt is checked by the tests below, so this should never panic
        Self::from_kdl(atomic_db, "unimod.kdl", DEFAULT_KDL).unwrap()
    }

    /// # Errors
    ///
    /// Returns a diagnostic pointing into `kdl_text` if it isn't valid KDL, if a title is repeated (ignoring case), or
    /// if any composition fails to parse
    pub fn from_kdl(
        atomic_db: &'a AtomicDatabase,
        file_name: impl AsRef<str>,
        kdl_text: impl AsRef<str>,
    ) -> miette::Result<Self> {
        let parsed: UnimodKdl = knuffel::parse(file_name.as_ref(), kdl_text.as_ref())?;
        let modifications = parsed
            .validate(atomic_db)
            .map_err(|e| e.finalize("Unimod database", file_name, kdl_text))?;
        Ok(Self { modifications })
    }

    #[must_use]
    pub fn get(&self, title: &str) -> Option<&UnimodEntry<'a>> {
        self.modifications.get(&title.to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }
}

impl<'a> UnimodEntry<'a> {
    /// The net change in composition: everything gained minus everything lost
    #[must_use]
    pub fn delta(&self) -> ChemicalComposition<'a> {
        self.gained.clone() - self.lost.clone()
    }
}

impl<'a> ModificationSource<'a> for UnimodDatabase<'a> {
    fn composition_by_title(&self, title: &str) -> Result<ChemicalComposition<'a>> {
        self.get(title)
            .map(UnimodEntry::delta)
            .ok_or_else(|| Box::new(PolychemError::modification_title_lookup(title)))
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct UnimodKdl {
    #[knuffel(child, unwrap(children))]
    modifications: Vec<ModificationKdl>,
}

#[derive(Debug, Decode)]
#[knuffel(span_type=Span)]
struct ModificationKdl {
    #[knuffel(span)]
    span: Span,
    #[knuffel(argument)]
    title: String,
    #[knuffel(property(name = "id"))]
    id: u32,
    #[knuffel(property(name = "full-name"))]
    full_name: String,
    #[knuffel(child, unwrap(argument))]
    gained: Option<ChemicalCompositionKdl>,
    #[knuffel(child, unwrap(argument))]
    lost: Option<ChemicalCompositionKdl>,
}

// Unimod Validation ===================================================================================================

type Modifications<'a> = HashMap<String, UnimodEntry<'a>>;

impl<'a> ValidateInto<'a, Modifications<'a>> for UnimodKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> ChemResult<Modifications<'a>> {
        collect_unique(self.modifications.into_iter().map(|m| m.validate(ctx)))
    }
}

type ModificationEntry<'a> = (String, Span, UnimodEntry<'a>);

impl<'a> ValidateInto<'a, ModificationEntry<'a>> for ModificationKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> ChemResult<ModificationEntry<'a>> {
        let entry = UnimodEntry {
            gained: self.gained.validate(ctx)?,
            lost: self.lost.validate(ctx)?,
            id: self.id,
            full_name: self.full_name,
            title: self.title,
        };
        Ok((entry.title.to_lowercase(), self.span, entry))
    }
}

// Module Tests ========================================================================================================
