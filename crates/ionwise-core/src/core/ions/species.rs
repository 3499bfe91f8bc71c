use super::charges::{ChargeError, default_charge, get_charge_for_symbol};
use crate::core::models::atom::Atom;
use crate::core::utils::elements::normalize_element;
use std::fmt;

/// Anything that carries an element symbol and an integer charge: model
/// atoms, synthetic donor guesses, metal parameter records, contacts.
pub trait ChargedSpecies {
    fn element(&self) -> &str;
    fn charge_as_int(&self) -> i32;
}

impl ChargedSpecies for Atom {
    fn element(&self) -> &str {
        &self.element
    }

    fn charge_as_int(&self) -> i32 {
        self.charge
    }
}

/// Scattering-type label such as "ZN2+", " K1+" or "CL1-".
pub fn scattering_type(element: &str, charge: i32) -> String {
    let sign = match charge.signum() {
        1 => "+",
        -1 => "-",
        _ => "",
    };
    format!("{:>2}{}{}", element.trim(), charge.abs(), sign)
}

/// A hypothesized identity (element + charge) for an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomGuess {
    pub element: String,
    pub charge: i32,
}

impl AtomGuess {
    /// Creates a guess, substituting the element's default charge when
    /// `charge` is absent or zero.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UnknownElementCharge`] if a default charge is
    /// needed and the element has none.
    pub fn new(element: &str, charge: Option<i32>) -> Result<Self, ChargeError> {
        let element = normalize_element(element);
        let charge = match charge {
            Some(c) if c != 0 => c,
            _ => default_charge(&element)?,
        };
        Ok(Self { element, charge })
    }

    /// Like [`AtomGuess::new`], but an unknown default charge becomes 0.
    pub fn lenient(element: &str, charge: i32) -> Self {
        let element = normalize_element(element);
        let charge = match charge {
            0 => get_charge_for_symbol(&element),
            c => c,
        };
        Self { element, charge }
    }

    /// A copy of this guess with a different charge.
    pub fn with_charge(&self, charge: i32) -> Self {
        Self {
            element: self.element.clone(),
            charge,
        }
    }

    pub fn scattering_type(&self) -> String {
        scattering_type(&self.element, self.charge)
    }
}

impl ChargedSpecies for AtomGuess {
    fn element(&self) -> &str {
        &self.element
    }

    fn charge_as_int(&self) -> i32 {
        self.charge
    }
}

impl fmt::Display for AtomGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.element, self.charge)
    }
}
