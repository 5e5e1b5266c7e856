// Standard Library Imports
use std::{
    fmt::{self, Display, Formatter},
    iter,
};

// External Crate Imports
use chemcomp::{
    parsers::{
        errors::{self, CompositionErrorKind, LabeledErrorKind, expect, final_parser, wrap_err},
        primitives::{lowercase, uppercase},
    },
    registry::{C_TERMINAL_HYDROXYL, N_TERMINAL_HYDROGEN},
};
use miette::Diagnostic;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::char,
    combinator::{cut, map, opt, peek, recognize},
    error::ErrorKind,
    multi::many1,
    sequence::{pair, preceded, terminated, tuple},
};
use thiserror::Error;

// Local Crate Imports
use crate::Result;

/// A peptidoform in modX notation, broken down into the registry labels that make it up
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Peptidoform<'s> {
    /// Like `H-` or `pr-`
    pub n_terminus: &'s str,
    pub residues: Vec<ModifiedResidue<'s>>,
    /// Like `-OH` or `-am`
    pub c_terminus: &'s str,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ModifiedResidue<'s> {
    pub modification: Option<&'s str>,
    pub code: &'s str,
}

impl<'s> Peptidoform<'s> {
    /// Parses a modX string like `pr-KSAPATGGVacKKPHR-OH`, filling in `H-` and `-OH` for any missing termini
    ///
    /// # Errors
    ///
    /// Returns a labelled parse error if `modx` isn't a valid peptidoform
    pub fn new(modx: &'s str) -> Result<Self> {
        Ok(final_parser(peptidoform)(modx)?)
    }

    /// Every label that needs looking up to build this peptidoform, from the N-terminus to the C-terminus
    pub fn labels(&self) -> impl Iterator<Item = &'s str> + '_ {
        let residues = self
            .residues
            .iter()
            .flat_map(|r| r.modification.into_iter().chain(iter::once(r.code)));
        iter::once(self.n_terminus)
            .chain(residues)
            .chain(iter::once(self.c_terminus))
    }

    /// The bare amino acid sequence, with all modifications and termini stripped
    #[must_use]
    pub fn sequence(&self) -> String {
        self.residues.iter().map(|r| r.code).collect()
    }
}

impl Display for Peptidoform<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.n_terminus)?;
        for residue in &self.residues {
            write!(f, "{}{}", residue.modification.unwrap_or_default(), residue.code)?;
        }
        write!(f, "{}", self.c_terminus)
    }
}

/// Peptidoform = [ N-Terminus ] , { Residue }- , [ C-Terminus ] ;
fn peptidoform(i: &str) -> ParseResult<Peptidoform> {
    // NOTE: An N-terminus only counts if a residue follows it, so `H-am` is a histidine with a C-terminal `-am`
    let capped_n_terminus = terminated(n_terminus, peek(pair(opt(label), uppercase)));
    let parser = tuple((opt(capped_n_terminus), many1(residue), opt(c_terminus)));
    map(parser, |(n_terminus, residues, c_terminus)| Peptidoform {
        n_terminus: n_terminus.unwrap_or(N_TERMINAL_HYDROGEN),
        residues,
        c_terminus: c_terminus.unwrap_or(C_TERMINAL_HYDROXYL),
    })(i)
}

/// N-Terminus = ( "H" | Label ) , "-" ;
fn n_terminus(i: &str) -> ParseResult<&str> {
    recognize(terminated(alt((tag("H"), label)), char('-')))(i)
}

/// Residue = [ Label ] , uppercase ;
fn residue(i: &str) -> ParseResult<ModifiedResidue> {
    let code = || recognize(uppercase);
    let modified = pair(
        map(label, Some),
        cut(expect(code(), PeptidoformErrorKind::ExpectedModifiedResidue)),
    );
    let unmodified = map(code(), |code| (None, code));
    let parser = map(alt((modified, unmodified)), |(modification, code)| {
        ModifiedResidue { modification, code }
    });
    wrap_err(parser, PeptidoformErrorKind::ExpectedResidue)(i)
}

/// C-Terminus = "-" , ( "OH" | Label ) ;
fn c_terminus(i: &str) -> ParseResult<&str> {
    let group = wrap_err(alt((tag("OH"), label)), PeptidoformErrorKind::ExpectedCTerminus);
    recognize(preceded(char('-'), cut(group)))(i)
}

/// Label = lowercase , { lowercase | digit } ;
fn label(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(
        lowercase,
        take_while(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()),
    ));
    wrap_err(parser, PeptidoformErrorKind::ExpectedModificationLabel)(i)
}

type ParseResult<'a, O> = errors::ParseResult<'a, O, PeptidoformErrorKind>;

#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum PeptidoformErrorKind {
    #[error(
        "expected a modification label: a lowercase ASCII letter followed by any number of lowercase ASCII letters \
        or digits"
    )]
    ExpectedModificationLabel,

    #[error("expected a one-letter amino acid code, optionally preceded by a modification label (like K or acK)")]
    ExpectedResidue,

    #[diagnostic(help("modification labels must be followed by the amino acid they modify, like acK"))]
    #[error("expected a one-letter amino acid code after the modification label")]
    ExpectedModifiedResidue,

    #[error("expected a C-terminal group (like -OH or -am) after the '-'")]
    ExpectedCTerminus,

    #[diagnostic(transparent)]
    #[error(transparent)]
    CompositionError(#[from] CompositionErrorKind),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help("check the unparsed region for errors, or remove it from the rest of the peptidoform"))]
    #[error("could not interpret the full input as a valid peptidoform")]
    Incomplete,
}

impl LabeledErrorKind for PeptidoformErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::ExpectedResidue | Self::ExpectedModifiedResidue => "expected an amino acid",
            Self::ExpectedModificationLabel => "expected a label",
            Self::ExpectedCTerminus => "expected OH or a label",
            Self::CompositionError(e) => return e.label(),
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
        })
    }
}

impl From<ErrorKind> for PeptidoformErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}
