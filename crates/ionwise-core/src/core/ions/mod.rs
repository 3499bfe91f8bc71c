//! # Ions Module
//!
//! Bond-valence scoring of metal ion sites.
//!
//! ## Overview
//!
//! The bond valence between an ion and a donor at distance `d` is
//! `exp((r0 - d) / b)`, with `r0` and `b` tabulated per (ion, charge, donor,
//! charge). Summed over the coordinating atoms, the valences should approach
//! the ion's oxidation state, and for a well-formed site their vector sum
//! should be close to zero.
//!
//! ## Key Components
//!
//! - [`params`] - The parameter table: bond-valence rows and per-metal coordination constraints
//! - [`charges`] - Default oxidation states and charge fallbacks
//! - [`species`] - The [`ChargedSpecies`](species::ChargedSpecies) trait and hypothesized identities
//! - [`valence`] - Per-contact valences, valence vectors and their assessment
//!
//! ## Usage
//!
//! ```ignore
//! use ionwise::core::ions::{params::IonParameters, valence::{ValenceScorer, ValenceSummary}};
//!
//! let params = IonParameters::bundled()?;
//! let scorer = ValenceScorer::new(&params);
//! let vectors = scorer.calculate_valences(&zinc, &contacts);
//! let summary = ValenceSummary::from_vectors(&vectors);
//! let assessment = params.get_metal_parameters("ZN").map(|p| p.assess(&summary));
//! ```

pub mod charges;
pub mod params;
pub mod species;
pub mod valence;
