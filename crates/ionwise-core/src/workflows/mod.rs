//! # Workflows Module
//!
//! High-level entry points that combine the parameter table, the structure
//! hierarchy and the valence scorer into complete procedures.
//!
//! - **Ion Workflow** ([`ions`]) - Scores every candidate metal ion of a structure
//!   against the bond-valence and coordination constraints of its element.

pub mod ions;
