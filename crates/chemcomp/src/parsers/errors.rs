use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::all_consuming,
    error::{ErrorKind, ParseError},
};
use thiserror::Error;

use crate::atoms::errors::AtomicLookupError;

pub type ParseResult<'a, O, K = CompositionErrorKind> = IResult<&'a str, O, LabeledParseError<'a, K>>;

/// Error kinds that can be attached to a span of the input and rendered with a short label
pub trait LabeledErrorKind: Diagnostic + Clone + Eq + From<ErrorKind> {
    fn label(&self) -> Option<&'static str> {
        None
    }
}

/// Any error kind that the chemical composition parsers can report into
pub trait UserErrorKind: LabeledErrorKind + From<CompositionErrorKind> {}
impl<T: LabeledErrorKind + From<CompositionErrorKind>> UserErrorKind for T {}

// NOTE: Public so that parsers using `chemical_composition` as a building block can inspect errors
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum CompositionErrorKind {
    #[error(
        "expected a chemical formula (optionally followed by a '+' or '-' and a particle offset), \
        or a standalone particle offset"
    )]
    ExpectedChemicalComposition,

    #[error("expected an element (like Au) or an isotope (like [15N]) optionally followed by a number")]
    ExpectedAtomicOffset,

    #[error("expected a particle (like p or e), optionally preceded by a number")]
    ExpectedParticleOffset,

    #[diagnostic(help(
        "a 0 value doesn't make sense here, if you've mistakenly included a leading zero, like \
        NH02, try just NH2 instead"
    ))]
    #[error("counts cannot start with 0")]
    ExpectedNoLeadingZero,

    #[error("expected an ASCII digit 1-9")]
    ExpectedDigit,

    #[error("expected an element symbol")]
    ExpectedElementSymbol,

    #[error("expected '[' to open isotope brackets")]
    ExpectedIsotopeStart,

    #[error("expected an isotopic mass number")]
    ExpectedMassNumber,

    #[diagnostic(help("you've probably forgotten to close an earlier '[' bracket"))]
    #[error("expected ']' to close isotope brackets")]
    ExpectedIsotopeEnd,

    #[error("expected a particle symbol")]
    ExpectedParticleSymbol,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[diagnostic(transparent)]
    #[error(transparent)]
    LookupError(Box<AtomicLookupError>),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help("check the unparsed region for errors, or remove it from the rest of the composition"))]
    #[error("could not interpret the full input as a valid chemical composition")]
    Incomplete,
}

impl LabeledErrorKind for CompositionErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::LookupError(e) => match **e {
                AtomicLookupError::UnknownElement { .. } => "unknown element",
                AtomicLookupError::UnknownIsotope { .. } => "unknown isotope",
                AtomicLookupError::UnknownParticle { .. } => "unknown particle",
                AtomicLookupError::NoNaturalAbundance { .. } => "no natural abundance",
            },
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedIsotopeStart => "expected '['",
            Self::ExpectedIsotopeEnd => "expected ']'",
            Self::ExpectedMassNumber => "expected a mass number",
            Self::ExpectedNoLeadingZero => "expected non-zero",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
            _ => return None,
        })
    }
}

impl From<AtomicLookupError> for CompositionErrorKind {
    fn from(value: AtomicLookupError) -> Self {
        Self::LookupError(Box::new(value))
    }
}

impl From<ErrorKind> for CompositionErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}

// In-Flight Parse Errors ==============================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LabeledParseError<'a, K> {
    input: &'a str,
    length: usize,
    kind: K,
}

impl<'a, K> LabeledParseError<'a, K> {
    pub const fn new(input: &'a str, kind: K) -> Self {
        Self {
            input,
            length: 0,
            kind,
        }
    }

    pub const fn kind(&self) -> &K {
        &self.kind
    }

    fn span_from_input(&self, full_input: &str) -> SourceSpan {
        // NOTE: `self.input` is always a suffix of `full_input`, so their lengths locate the error
        let start = full_input.len() - self.input.len();
        SourceSpan::from(start..start + self.length)
    }
}

impl<'a, K: From<ErrorKind>> ParseError<&'a str> for LabeledParseError<'a, K> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    // NOTE: Report whichever branch managed to get furthest through the input
    fn or(self, other: Self) -> Self {
        if self.input.len() < other.input.len() {
            self
        } else {
            other
        }
    }
}

// Final, Reportable Errors ============================================================================================

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("{kind}")]
pub struct LabeledError<K: LabeledErrorKind> {
    full_input: String,
    span: SourceSpan,
    kind: K,
}

impl<K: LabeledErrorKind> LabeledError<K> {
    pub const fn kind(&self) -> &K {
        &self.kind
    }
}

impl<K: LabeledErrorKind> Diagnostic for LabeledError<K> {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.full_input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = self.kind.label()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label.to_owned()),
            self.span,
        ))))
    }
}

// Combinators =========================================================================================================

/// Runs `parser` over the whole input, converting any failure into a [`LabeledError`] that points into that input
pub fn final_parser<'a, O, K, P>(parser: P) -> impl FnMut(&'a str) -> Result<O, LabeledError<K>>
where
    K: LabeledErrorKind,
    P: Parser<&'a str, O, LabeledParseError<'a, K>>,
{
    let mut parser = all_consuming(parser);
    move |input| {
        parser.parse(input).finish().map(|(_, o)| o).map_err(|e| {
            let span = e.span_from_input(input);
            LabeledError {
                // NOTE: The trailing space lets labels point just past the end of the input
                full_input: format!("{input} "),
                span,
                kind: e.kind,
            }
        })
    }
}

/// Replaces the kind of any error returned by `parser` with `kind`, leaving its position untouched
pub fn expect<'a, O, K, P>(mut parser: P, kind: K) -> impl FnMut(&'a str) -> ParseResult<'a, O, K>
where
    K: Clone,
    P: Parser<&'a str, O, LabeledParseError<'a, K>>,
{
    move |input| {
        parser.parse(input).map_err(|e| {
            e.map(|e| LabeledParseError {
                kind: kind.clone(),
                ..e
            })
        })
    }
}

/// Replaces the kind of any error raised before `parser` made progress, so that errors from deeper in the input
/// keep their more specific kind
pub fn wrap_err<'a, O, K, P>(mut parser: P, kind: K) -> impl FnMut(&'a str) -> ParseResult<'a, O, K>
where
    K: Clone,
    P: Parser<&'a str, O, LabeledParseError<'a, K>>,
{
    move |input| {
        parser.parse(input).map_err(|e| {
            e.map(|e| {
                if e.input.len() == input.len() && e.length == 0 {
                    LabeledParseError::new(input, kind.clone())
                } else {
                    e
                }
            })
        })
    }
}

/// Like [`nom::combinator::map_res`], but the error returned by `f` is fatal and labels everything `parser` consumed
pub fn map_res<'a, O1, O2, K, E, P, F>(mut parser: P, mut f: F) -> impl FnMut(&'a str) -> ParseResult<'a, O2, K>
where
    K: From<E>,
    P: Parser<&'a str, O1, LabeledParseError<'a, K>>,
    F: FnMut(O1) -> Result<O2, E>,
{
    move |input| {
        let (rest, o1) = parser.parse(input)?;
        let length = input.len() - rest.len();
        f(o1).map(|o2| (rest, o2)).map_err(|e| {
            Err::Failure(LabeledParseError {
                input,
                length,
                kind: e.into(),
            })
        })
    }
}

/// Converts the error kind of a parser into any kind that can be built from it
pub fn into<'a, O, K1, K2, P>(mut parser: P) -> impl FnMut(&'a str) -> ParseResult<'a, O, K2>
where
    K2: From<K1>,
    P: Parser<&'a str, O, LabeledParseError<'a, K1>>,
{
    move |input| {
        parser.parse(input).map_err(|e| {
            e.map(
                |LabeledParseError {
                     input,
                     length,
                     kind,
                 }| LabeledParseError {
                    input,
                    length,
                    kind: kind.into(),
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use nom::{bytes::complete::tag, character::complete::char, sequence::pair};

    use super::*;

    fn abc(i: &str) -> ParseResult<&str> {
        tag("abc")(i)
    }

    #[test]
    fn furthest_branch_wins() {
        let near = LabeledParseError::new("xyz", CompositionErrorKind::ExpectedDigit);
        let far = LabeledParseError::new("z", CompositionErrorKind::ExpectedUppercase);
        assert_eq!(near.clone().or(far.clone()), far);
        assert_eq!(far.clone().or(near), far);
    }

    #[test]
    fn expect_replaces_kinds() {
        let mut parser = expect(abc, CompositionErrorKind::ExpectedLowercase);
        assert_eq!(parser("abcd"), Ok(("d", "abc")));
        let Err(Err::Error(e)) = parser("xyz") else {
            panic!("expected a recoverable error");
        };
        assert_eq!(e.kind(), &CompositionErrorKind::ExpectedLowercase);
    }

    #[test]
    fn wrap_err_keeps_deeper_errors() {
        let mut parser = wrap_err(
            pair(abc, expect(char('!'), CompositionErrorKind::ExpectedDigit)),
            CompositionErrorKind::ExpectedAtomicOffset,
        );
        let Err(Err::Error(e)) = parser("xyz") else {
            panic!("expected a recoverable error");
        };
        assert_eq!(e.kind(), &CompositionErrorKind::ExpectedAtomicOffset);
        let Err(Err::Error(e)) = parser("abc?") else {
            panic!("expected a recoverable error");
        };
        assert_eq!(e.kind(), &CompositionErrorKind::ExpectedDigit);
    }

    #[test]
    fn map_res_failures_are_fatal() {
        let mut parser = map_res(abc, |_| Err::<(), _>(CompositionErrorKind::ExpectedDigit));
        assert!(matches!(parser("abc"), Err(Err::Failure(_))));
    }

    #[test]
    fn final_parser_spans() {
        let mut parser = final_parser(abc);
        assert_eq!(parser("abc"), Ok("abc"));

        let error = parser("abcd").unwrap_err();
        assert_eq!(error.kind(), &CompositionErrorKind::Incomplete);
        assert_eq!(error.span, SourceSpan::from(3..3));
        let labels: Vec<_> = error.labels().unwrap().collect();
        assert_eq!(labels[0].label(), Some("input was valid up until this point"));

        let mut parser = final_parser(map_res(abc, |_| Err::<(), _>(CompositionErrorKind::ExpectedDigit)));
        let error = parser("abc").unwrap_err();
        assert_eq!(error.span, SourceSpan::from(0..3));
    }
}
