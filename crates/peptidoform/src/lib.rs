//! Enumerates the variable-modification states of peptide sequences and calculates the m/z of each one

mod enumerator;
mod ion_type;
mod mass;
mod parser;
mod table;
mod variable_mods;

use chemcomp::{PolychemError, parsers::errors::LabeledError};
use miette::Diagnostic;
use thiserror::Error;

pub use enumerator::{Isoforms, isoforms};
pub use ion_type::IonType;
pub use mass::{calculate_mass, peptidoform_composition};
pub use parser::{ModifiedResidue, Peptidoform, PeptidoformErrorKind};
pub use table::{PeptidoformTable, ResultRow};
pub use variable_mods::{Eligibility, Site, VariableMods};

#[derive(Clone, Eq, PartialEq, Debug, Error, Diagnostic)]
pub enum Error {
    #[diagnostic(transparent)]
    #[error(transparent)]
    ParseError(#[from] LabeledError<PeptidoformErrorKind>),

    #[diagnostic(transparent)]
    #[error(transparent)]
    PolychemError(#[from] Box<PolychemError>),

    #[diagnostic(help("residue modifications can only target one-letter amino acid codes, like \"K\""))]
    #[error("the modification {label:?} targets {code:?}, which isn't a registered amino acid")]
    InvalidResidueCode { label: String, code: char },

    #[diagnostic(help("merge the two entries, or remove one of them"))]
    #[error("the {site} modification {label:?} has already been defined")]
    DuplicateModification { label: String, site: Site },

    #[diagnostic(help("give each modification its own label, or list all of its sites under a single entry"))]
    #[error("the label {label:?} already refers to {previous:?}, so it can't also be used for {title:?}")]
    ConflictingLabel {
        label: String,
        previous: String,
        title: String,
    },

    #[diagnostic(help("charges can be at most 4294967295 in either direction"))]
    #[error("a charge of {charge} is too large to calculate an m/z for")]
    ChargeOutOfRange { charge: i64 },

    #[diagnostic(help("sequences can only contain registered one-letter amino acid codes"))]
    #[error("the sequence {sequence:?} contains {code:?} at index {position}, which isn't a registered amino acid")]
    UnknownResidue {
        sequence: String,
        code: char,
        position: usize,
    },

    #[diagnostic(help("try one of M, M-H2O, M-NH3, or any of the a, b, c, x, y, or z ions (optionally with -H2O or -NH3)"))]
    #[error("{name:?} is not a known ion type")]
    UnknownIonType { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
