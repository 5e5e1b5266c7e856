use miette::Diagnostic;
use thiserror::Error;

use crate::parsers::errors::{CompositionErrorKind, LabeledError};

pub type Result<T, E = Box<PolychemError>> = std::result::Result<T, E>;

pub type CompositionError = LabeledError<CompositionErrorKind>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum PolychemError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Composition {
        #[from]
        error: CompositionError,
    },

    #[diagnostic(help("register a composition for this label, or double-check it for typos"))]
    #[error("the label {label:?} could not be found in the composition registry")]
    CompositionLookup { label: String },

    #[diagnostic(help("double-check the title for typos, or add the modification to the Unimod database"))]
    #[error("no modification titled {title:?} could be found in the Unimod database")]
    ModificationTitleLookup { title: String },

    #[error(
        "the residue label {label:?} is invalid, residues must be labelled by a single uppercase ASCII letter"
    )]
    InvalidResidueLabel { label: String },

    #[error(
        "the terminal label {label:?} is invalid, terminal groups must begin or end with a '-' (like \"H-\" or \"-OH\")"
    )]
    InvalidTerminalLabel { label: String },

    #[error(
        "the modification label {label:?} is invalid, modification labels must be a lowercase ASCII letter \
        followed by any number of lowercase ASCII letters or digits"
    )]
    InvalidModificationLabel { label: String },
}

impl PolychemError {
    pub(crate) fn composition_lookup(label: &str) -> Self {
        let label = label.to_owned();

        Self::CompositionLookup { label }
    }

    pub(crate) fn modification_title_lookup(title: &str) -> Self {
        let title = title.to_owned();

        Self::ModificationTitleLookup { title }
    }

    pub(crate) fn invalid_residue_label(label: &str) -> Self {
        let label = label.to_owned();

        Self::InvalidResidueLabel { label }
    }

    pub(crate) fn invalid_terminal_label(label: &str) -> Self {
        let label = label.to_owned();

        Self::InvalidTerminalLabel { label }
    }

    pub(crate) fn invalid_modification_label(label: &str) -> Self {
        let label = label.to_owned();

        Self::InvalidModificationLabel { label }
    }
}
