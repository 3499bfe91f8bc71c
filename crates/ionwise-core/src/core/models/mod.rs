//! # Core Models Module
//!
//! In-memory representation of a macromolecular structure model as the
//! crystallographic hierarchy model → chain → residue-group → atom-group → atom.
//!
//! ## Overview
//!
//! Residue-groups collect everything modeled at one sequence position; their
//! atom-groups separate alternate locations (altlocs) and, under
//! microheterogeneity, different residue names. On top of the stored tree the
//! module provides:
//!
//! - **Traversal** - lazy, restartable iterators at every level plus
//!   "exactly one" accessors ([`hierarchy`])
//! - **Conformers** - one coherent residue sequence per altloc ([`conformer`])
//! - **Occupancy groups** - tags of atoms whose occupancies are coupled ([`occupancy`])
//!
//! ## Usage
//!
//! ```ignore
//! use ionwise::core::models::{atom::Atom, hierarchy::Hierarchy};
//!
//! let mut hierarchy = Hierarchy::new();
//! let model_id = hierarchy.add_model("1");
//! let chain_id = hierarchy.add_chain(model_id, "A").unwrap();
//! let rg_id = hierarchy.add_residue_group(chain_id, 1, "").unwrap();
//! let ag_id = hierarchy.add_atom_group(rg_id, "", "ZN").unwrap();
//! hierarchy.add_atom(ag_id, Atom::new("ZN", "ZN", Point3::origin()).with_charge(2));
//!
//! let conformers = hierarchy.chain_conformers(chain_id);
//! ```

pub mod atom;
pub mod chain;
pub mod conformer;
pub mod hierarchy;
pub mod ids;
pub mod occupancy;
pub mod residue;
