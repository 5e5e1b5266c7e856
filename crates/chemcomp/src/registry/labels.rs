use crate::{PolychemError, Result};

/// Residues are labelled by a single uppercase ASCII letter, like `K`
#[must_use]
pub fn is_residue_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}

/// Modifications are labelled by a lowercase ASCII letter followed by any number of lowercase ASCII letters or digits,
/// like `ac` or `me2`
#[must_use]
pub fn is_modification_label(label: &str) -> bool {
    let mut chars = label.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Terminal groups carry a single `-` marking the side that bonds to the chain: `H-` and `pr-` cap the N-terminus,
/// `-OH` caps the C-terminus
#[must_use]
pub fn is_terminal_label(label: &str) -> bool {
    let core = label
        .strip_suffix('-')
        .or_else(|| label.strip_prefix('-'));
    core.is_some_and(|core| !core.is_empty() && !core.contains('-'))
}

pub(crate) fn validate_residue_label(label: &str) -> Result<()> {
    is_residue_label(label)
        .then_some(())
        .ok_or_else(|| Box::new(PolychemError::invalid_residue_label(label)))
}

pub(crate) fn validate_terminal_label(label: &str) -> Result<()> {
    is_terminal_label(label)
        .then_some(())
        .ok_or_else(|| Box::new(PolychemError::invalid_terminal_label(label)))
}

/// # Errors
///
/// Returns [`PolychemError::InvalidModificationLabel`] unless `label` passes [`is_modification_label`]
pub fn validate_modification_label(label: &str) -> Result<()> {
    is_modification_label(label)
        .then_some(())
        .ok_or_else(|| Box::new(PolychemError::invalid_modification_label(label)))
}
