// Standard Library Imports
use std::collections::hash_map::Entry;

// External Crate Imports
use ahash::HashMap;
use knuffel::span::{Span, Spanned};
use miette::{Diagnostic, LabeledSpan, NamedSource};
use thiserror::Error;

// Local Crate Imports
use crate::{AtomicDatabase, ChemicalComposition, errors::PolychemError};

// Contextual Validation Trait =========================================================================================

pub(super) type ChemResult<T> = Result<T, ChemistryErrorKind>;

pub(super) trait ValidateInto<'c, T> {
    type Context: 'c;

    fn validate(self, ctx: Self::Context) -> ChemResult<T>;
}

pub(super) type ChemicalCompositionKdl = Spanned<String, Span>;

impl<'a> ValidateInto<'a, ChemicalComposition<'a>> for ChemicalCompositionKdl {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> ChemResult<ChemicalComposition<'a>> {
        ChemicalComposition::new(ctx, &*self).map_err(|e| ChemistryErrorKind::Composition(*self.span(), *e))
    }
}

impl<'a> ValidateInto<'a, ChemicalComposition<'a>> for Option<ChemicalCompositionKdl> {
    type Context = &'a AtomicDatabase;

    fn validate(self, ctx: Self::Context) -> ChemResult<ChemicalComposition<'a>> {
        self.map_or_else(|| Ok(ChemicalComposition::default()), |c| c.validate(ctx))
    }
}

/// Collects `(key, span, value)` triples into a map, rejecting any key that appears twice
pub(super) fn collect_unique<V>(
    entries: impl IntoIterator<Item = ChemResult<(String, Span, V)>>,
) -> ChemResult<HashMap<String, V>> {
    let mut seen: HashMap<String, (Span, V)> = HashMap::default();
    for entry in entries {
        let (key, span, value) = entry?;
        match seen.entry(key) {
            Entry::Occupied(e) => {
                let (key, (first_defined_at, _)) = e.remove_entry();
                return Err(ChemistryErrorKind::DuplicateLabel(first_defined_at, span, key));
            }
            Entry::Vacant(e) => {
                e.insert((span, value));
            }
        }
    }
    Ok(seen.into_iter().map(|(k, (_, v))| (k, v)).collect())
}

// Validation Error Types and Trait Implementations ====================================================================

#[derive(Debug, Error)]
#[error("failed to validate {kind_of_file} file")]
pub(super) struct ChemistryError {
    kind_of_file: &'static str,
    kdl: NamedSource<String>,
    #[source]
    kind: ChemistryErrorKind,
}

// NOTE: This is manually implemented because the list of labels is dynamic and needs to be extracted from `self.kind`
impl Diagnostic for ChemistryError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.kdl)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(
            self.kind
                .labels()
                .into_iter()
                .map(|(s, l)| LabeledSpan::new_with_span(Some(l.to_owned()), *s)),
        ))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&self.kind)
    }
}

#[derive(Clone, Debug, Diagnostic, Error)]
pub(super) enum ChemistryErrorKind {
    #[error("the label {2:?} has already been defined")]
    #[diagnostic(help("double-check for typos, or remove the duplicate entry"))]
    DuplicateLabel(Span, Span, String),

    #[error("found an invalid label")]
    InvalidLabel(
        Span,
        #[source]
        #[diagnostic_source]
        PolychemError,
    ),

    #[error("found an invalid chemical composition")]
    Composition(
        Span,
        #[source]
        #[diagnostic_source]
        PolychemError,
    ),
}

impl ChemistryErrorKind {
    fn labels(&self) -> Vec<(&Span, &'static str)> {
        match self {
            Self::DuplicateLabel(s1, s2, _) => vec![(s1, "first defined here"), (s2, "then again here")],
            Self::InvalidLabel(s, _) => vec![(s, "invalid label")],
            Self::Composition(s, _) => vec![(s, "invalid chemical composition")],
        }
    }

    pub(super) fn finalize(
        self,
        kind_of_file: &'static str,
        file_name: impl AsRef<str>,
        kdl: impl AsRef<str>,
    ) -> ChemistryError {
        let kdl = NamedSource::new(file_name, kdl.as_ref().to_owned());
        ChemistryError {
            kind_of_file,
            kdl,
            kind: self,
        }
    }
}
