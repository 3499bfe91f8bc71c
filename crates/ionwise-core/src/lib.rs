//! # Ionwise Core Library
//!
//! Bond-valence scoring of metal ions and alternate-conformation analysis for
//! macromolecular structure models.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless structure models (`Hierarchy`), the ion
//!   parameter table, valence scoring and PDB output.
//!
//! - **[`data`]: Loaded Inputs.** A registry of named models with a default
//!   selection, shared by the workflows of one session.
//!
//! - **[`workflows`]: The Public API.** Complete procedures such as scoring every
//!   candidate ion of a structure, configured through [`config`].

pub mod config;
pub mod core;
pub mod data;
pub mod workflows;
