// External Crate Imports
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, tuple},
};

// Local Crate Imports
use super::{
    errors::{CompositionErrorKind, ParseResult, UserErrorKind, expect, into, map_res, wrap_err},
    primitives::{count, lowercase, offset_kind, uppercase},
};
use crate::{AtomicDatabase, ChemicalComposition, Count, Element, MassNumber, Particle};

// Public API ==========================================================================================================

/// Chemical Composition
///   = { Atom Count }- , [ Offset Kind , Particle Count ]
///   | Particle Count
///   ;
pub fn chemical_composition<'a, 's, K: UserErrorKind>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, ChemicalComposition<'a>, K> {
    let charged_formula = map(
        pair(
            many1(atom_count(db)),
            opt(pair(offset_kind, cut(particle_count(db)))),
        ),
        |(atoms, offset)| {
            let formula = atoms.into_iter().map(|(element, n)| (element, n.into())).collect();
            let particles = offset
                .map(|(kind, (n, particle))| (particle, kind.apply(n.into())))
                .into_iter()
                .collect();
            ChemicalComposition::from_offsets(formula, particles)
        },
    );
    let bare_particles = map(particle_count(db), |(n, particle)| {
        ChemicalComposition::from_offsets(Vec::new(), vec![(particle, n.into())])
    });

    into(wrap_err(
        alt((charged_formula, bare_particles)),
        CompositionErrorKind::ExpectedChemicalComposition,
    ))
}

// Counted Atoms and Particles =========================================================================================

/// Atom Count = ( Element | Isotope ) , [ Count ] ;
fn atom_count<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, (Element<'a>, Count)> {
    wrap_err(
        pair(alt((element(db), isotope(db))), implicit_count),
        CompositionErrorKind::ExpectedAtomicOffset,
    )
}

/// Particle Count = [ Count ] , Particle ;
fn particle_count<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, (Count, Particle<'a>)> {
    wrap_err(
        pair(implicit_count, particle(db)),
        CompositionErrorKind::ExpectedParticleOffset,
    )
}

fn implicit_count(i: &str) -> ParseResult<Count> {
    map(opt(count), Option::unwrap_or_default)(i)
}

// Database Lookups ====================================================================================================

fn element<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(element_symbol, |symbol| Element::new(db, symbol))
}

fn isotope<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(bracketed_isotope, |(mass_number, symbol)| {
        Element::new_isotope(db, symbol, mass_number)
    })
}

fn particle<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Particle<'a>> {
    map_res(particle_symbol, |symbol| Particle::new(db, symbol))
}

// Symbols =============================================================================================================

/// Element = uppercase , [ lowercase ] ;
fn element_symbol(i: &str) -> ParseResult<&str> {
    wrap_err(
        recognize(pair(uppercase, opt(lowercase))),
        CompositionErrorKind::ExpectedElementSymbol,
    )(i)
}

// NOTE: These are not meant to be links, it's just EBNF
#[allow(clippy::doc_link_with_quotes)]
/// Isotope = "[" , Count , Element , "]" ;
fn bracketed_isotope(i: &str) -> ParseResult<(MassNumber, &str)> {
    let mass_number = map(
        wrap_err(count, CompositionErrorKind::ExpectedMassNumber),
        MassNumber::from,
    );
    delimited(
        expect(char('['), CompositionErrorKind::ExpectedIsotopeStart),
        cut(tuple((mass_number, element_symbol))),
        expect(cut(char(']')), CompositionErrorKind::ExpectedIsotopeEnd),
    )(i)
}

/// Particle = lowercase ;
fn particle_symbol(i: &str) -> ParseResult<&str> {
    wrap_err(recognize(lowercase), CompositionErrorKind::ExpectedParticleSymbol)(i)
}
