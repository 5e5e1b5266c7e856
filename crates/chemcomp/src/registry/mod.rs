mod composition_registry;
pub mod labels;
mod unimod;
mod validation;

use crate::{ChemicalComposition, Result};

// Re-exports
pub use composition_registry::{C_TERMINAL_HYDROXYL, CompositionRegistry, N_TERMINAL_HYDROGEN};
pub use unimod::{UnimodDatabase, UnimodEntry};

/// Anything that can turn a modification title (like "Acetyl") into the composition that modification adds
pub trait ModificationSource<'a> {
    /// # Errors
    ///
    /// Should return [`PolychemError::ModificationTitleLookup`](crate::PolychemError::ModificationTitleLookup) when
    /// `title` is unknown
    fn composition_by_title(&self, title: &str) -> Result<ChemicalComposition<'a>>;
}

impl<'a, F> ModificationSource<'a> for F
where
    F: Fn(&str) -> Result<ChemicalComposition<'a>>,
{
    fn composition_by_title(&self, title: &str) -> Result<ChemicalComposition<'a>> {
        self(title)
    }
}
