use nom::{
    branch::alt,
    character::complete::{char, satisfy, u32},
    combinator::{cut, map_opt, not, value},
    sequence::preceded,
};

use crate::{Count, OffsetKind};

use super::errors::{CompositionErrorKind, ParseResult, UserErrorKind, expect, into};

/// uppercase = ? any character from "A" to "Z" ? ;
pub fn uppercase<K: UserErrorKind>(i: &str) -> ParseResult<char, K> {
    into(expect(
        satisfy(|c| c.is_ascii_uppercase()),
        CompositionErrorKind::ExpectedUppercase,
    ))(i)
}

/// lowercase = ? any character from "a" to "z" ? ;
pub fn lowercase<K: UserErrorKind>(i: &str) -> ParseResult<char, K> {
    into(expect(
        satisfy(|c| c.is_ascii_lowercase()),
        CompositionErrorKind::ExpectedLowercase,
    ))(i)
}

/// Count = digit - "0" , { digit } ;
pub fn count<K: UserErrorKind>(i: &str) -> ParseResult<Count, K> {
    // NOTE: A leading zero can't be the start of anything else, so it's reported straight away
    let no_leading_zero = expect(cut(not(char('0'))), CompositionErrorKind::ExpectedNoLeadingZero);
    let digits = expect(u32, CompositionErrorKind::ExpectedDigit);
    into(map_opt(preceded(no_leading_zero, digits), Count::new))(i)
}

/// Offset Kind = "+" | "-" ;
pub fn offset_kind<K: UserErrorKind>(i: &str) -> ParseResult<OffsetKind, K> {
    alt((
        value(OffsetKind::Add, char('+')),
        value(OffsetKind::Remove, char('-')),
    ))(i)
}
