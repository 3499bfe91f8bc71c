pub mod elements;
pub mod identifiers;
