// Implements `Eq`, `Ord`, and `Hash` for an atomic building block in terms of one sort key
macro_rules! keyed_ord_impls {
    ($type:ident, $key:ident) => {
        impl PartialEq for $type<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.$key() == other.$key()
            }
        }

        impl Eq for $type<'_> {}

        impl PartialOrd for $type<'_> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $type<'_> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.$key().cmp(&other.$key())
            }
        }

        impl std::hash::Hash for $type<'_> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.$key().hash(state);
            }
        }
    };
}

pub mod atomic_database;
pub mod chemical_composition;
mod element;
pub mod errors;
mod particle;
mod quantities;
