//! Registries of loaded inputs, keyed by the name they were loaded under.

pub mod manager;
