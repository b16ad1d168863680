pub mod atomic_database;
mod count;
mod element;
pub mod errors;
mod molecule;
mod particle;

pub use molecule::Adduct;
