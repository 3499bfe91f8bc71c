use super::species::ChargedSpecies;
use crate::core::utils::elements::{atomic_number, normalize_element};
use phf::{Map, phf_map};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChargeError {
    #[error("Unknown charge state for element: {0}")]
    UnknownElementCharge(String),
    #[error("Unknown element: {0}")]
    UnknownElement(String),
}

/// Most common oxidation state per symbol. Some keys are PDB residue names
/// that encode a specific oxidation state (e.g. "FE2", "3CO", "CU1").
static DEFAULT_CHARGES: Map<&'static str, i32> = phf_map! {
    "H" => -1,
    "LI" => 1,
    "C" => 4,
    "N" => -3,
    "O" => -2,
    "F" => -1,
    "NA" => 1,
    "MG" => 2,
    "AL" => 3,
    "SI" => 4,
    "P" => -3,
    "S" => -2,
    "CL" => -1,
    "K" => 1,
    "CA" => 2,
    "V" => 3,
    "CR" => 3,
    "MN" => 2,
    "MN3" => 3,
    "FE2" => 2,
    "FE" => 3,
    "CO" => 2,
    "3CO" => 3,
    "NI" => 2,
    "3NI" => 3,
    "CU1" => 1,
    "CU" => 2,
    "CU3" => 3,
    "ZN" => 2,
    "ZN2" => 2,
    "ARS" => 0,
    "SE" => 2, // PDB lists selenium with charge 0 (H2Se)
    "BR" => -1,
    "RB" => 1,
    "SR" => 2,
    "Y1" => 2,
    "YT3" => 3,
    "MO" => 0,
    "4MO" => 4,
    "6MO" => 6,
    "RU" => 3,
    "PD" => 2,
    "AG" => 1,
    "CD" => 2,
    "IN" => 3,
    "I" => -1,
    "CS" => 1,
    "BA" => 2,
    "W" => 6,
    "RE" => 0,
    "OS" => 3,
    "OS4" => 4,
    "IR3" => 3,
    "IR" => 4,
    "PT" => 2,
    "PT4" => 4,
    "AU" => 1,
    "AU3" => 3,
    "HG" => 2,
    "TL" => 1,
    "PB" => 2,
    "BS3" => 3,
    "AX" => 0, // Dummy atom
};

/// Looks up the default charge of an exact (already normalized) symbol.
///
/// # Errors
///
/// Returns [`ChargeError::UnknownElementCharge`] if the symbol has no entry.
pub fn default_charge(element: &str) -> Result<i32, ChargeError> {
    DEFAULT_CHARGES
        .get(element)
        .copied()
        .ok_or_else(|| ChargeError::UnknownElementCharge(element.to_string()))
}

/// Default charge of a bare symbol, or 0 when the symbol is unknown.
pub fn get_charge_for_symbol(symbol: &str) -> i32 {
    default_charge(symbol).unwrap_or(0)
}

/// The species' explicit charge, or its element's default charge when the
/// explicit charge is zero (0 again if the element is unknown).
pub fn get_charge(species: &impl ChargedSpecies) -> i32 {
    match species.charge_as_int() {
        0 => get_charge_for_symbol(&get_element(species)),
        charge => charge,
    }
}

/// The species' element with whitespace stripped and letters capitalized.
pub fn get_element(species: &impl ChargedSpecies) -> String {
    normalize_element(species.element())
}

fn effective_electrons(species: &impl ChargedSpecies) -> Result<i32, ChargeError> {
    let element = get_element(species);
    let z = atomic_number(&element).ok_or_else(|| ChargeError::UnknownElement(element.clone()))?;
    let charge = match species.charge_as_int() {
        0 => default_charge(&element)?,
        charge => charge,
    };
    Ok(i32::from(z) - charge)
}

/// Compares two species by electron count (atomic number minus charge).
///
/// Returns `Less` when `a` is lighter, `Equal` when the two are
/// isoelectronic and `Greater` when `a` is heavier. Species with a zero
/// charge are evaluated at their default charge.
///
/// # Errors
///
/// Returns [`ChargeError::UnknownElement`] if either element has no atomic
/// number, or [`ChargeError::UnknownElementCharge`] if a default charge is
/// needed but unknown.
pub fn compare_atom_weight(
    a: &impl ChargedSpecies,
    b: &impl ChargedSpecies,
) -> Result<Ordering, ChargeError> {
    Ok(effective_electrons(a)?.cmp(&effective_electrons(b)?))
}
