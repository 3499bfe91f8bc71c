//! # Core Module
//!
//! Data structures and algorithms shared by every workflow of the library.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - The model/chain/residue-group/atom-group/atom
//!   hierarchy, conformers and occupancy groups
//! - **Ion Scoring** ([`ions`]) - Bond-valence parameters, charge guessing and valence vectors
//! - **File Output** ([`io`]) - PDB record rendering
//! - **Chemical Knowledge** ([`utils`]) - Element tables and residue-name classes

pub mod io;
pub mod ions;
pub mod models;
pub mod utils;
