pub(crate) mod chemical_composition;
pub mod errors;
pub mod primitives;

// Re-exports
pub use chemical_composition::chemical_composition;
