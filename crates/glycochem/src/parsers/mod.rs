pub(crate) mod composition;
pub mod errors;
pub(crate) mod molecule;
pub mod primitives;
