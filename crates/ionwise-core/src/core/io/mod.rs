//! Output of structure models in the PDB text format.
//!
//! Records are rendered straight from the [`Hierarchy`](crate::core::models::hierarchy::Hierarchy),
//! so every alternate location is written, not just one conformer.
//! Writing the text to disk is left to the caller.

pub mod pdb;
