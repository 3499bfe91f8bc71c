use super::charges::default_charge;
use super::params::{IonParameters, MetalParameters};
use super::species::{AtomGuess, ChargedSpecies};
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::utils::elements::normalize_element;
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

/// Donor elements whose missing bond-valence parameters are expected and
/// not worth reporting.
pub const DEFAULT_SILENT_DONORS: [&str; 3] = ["H", "C", "AX"];

/// A neighboring atom as seen from an ion.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub element: String,
    pub charge: i32,
    /// Displacement from the ion to the neighbor, in Angstroms.
    pub vector: Vector3<f64>,
    pub occupancy: f64,
    /// The hierarchy atom this contact was built from, if any.
    pub atom_id: Option<AtomId>,
}

impl Contact {
    pub fn new(element: &str, charge: i32, vector: Vector3<f64>, occupancy: f64) -> Self {
        Self {
            element: element.to_string(),
            charge,
            vector,
            occupancy,
            atom_id: None,
        }
    }

    /// Builds a contact for `atom` seen from an ion at `center`.
    pub fn from_atom(atom_id: AtomId, atom: &Atom, center: &Point3<f64>) -> Self {
        Self {
            element: atom.element.clone(),
            charge: atom.charge,
            vector: atom.position - center,
            occupancy: atom.occupancy,
            atom_id: Some(atom_id),
        }
    }

    pub fn distance(&self) -> f64 {
        self.vector.norm()
    }
}

impl ChargedSpecies for Contact {
    fn element(&self) -> &str {
        &self.element
    }

    fn charge_as_int(&self) -> i32 {
        self.charge
    }
}

/// Computes bond-valence contributions of donors around an ion.
#[derive(Debug, Clone)]
pub struct ValenceScorer<'a> {
    params: &'a IonParameters,
    silent_donors: Vec<String>,
}

impl<'a> ValenceScorer<'a> {
    pub fn new(params: &'a IonParameters) -> Self {
        Self {
            params,
            silent_donors: DEFAULT_SILENT_DONORS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the set of donor elements that are skipped without a
    /// diagnostic when they contribute nothing.
    pub fn with_silent_donors<I, S>(mut self, donors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.silent_donors = donors
            .into_iter()
            .map(|d| normalize_element(d.as_ref()))
            .collect();
        self
    }

    pub fn params(&self) -> &'a IonParameters {
        self.params
    }

    fn is_silent(&self, element: &str) -> bool {
        self.silent_donors.iter().any(|silent| silent == element)
    }

    /// Bond valence `exp((r0 - distance) / b)` of a single ion-donor pair.
    ///
    /// Returns 0 when the donor element is not in the table at all, or when
    /// neither the donor's own charge nor its default charge has parameters.
    /// The donor is not modified by the default-charge retry.
    pub fn calculate_valence(
        &self,
        ion: &impl ChargedSpecies,
        donor: &impl ChargedSpecies,
        distance: f64,
    ) -> f64 {
        if !self.params.is_supported_donor(donor.element()) {
            return 0.0;
        }

        let found = self.params.get_valence_params(ion, donor).or_else(|| {
            let element = normalize_element(donor.element());
            let charge = default_charge(&element).ok()?;
            self.params
                .get_valence_params(ion, &AtomGuess { element, charge })
        });

        match found {
            Some((r0, b)) => ((r0 - distance) / b).exp(),
            None => {
                debug!(
                    "No bond-valence parameters for {}{:+} with {}{:+}",
                    normalize_element(ion.element()),
                    ion.charge_as_int(),
                    normalize_element(donor.element()),
                    donor.charge_as_int()
                );
                0.0
            }
        }
    }

    /// Valence vectors of every contributing contact, in input order.
    ///
    /// Each vector points from the ion toward the contact and has the
    /// occupancy-weighted bond valence as its length. Contacts contributing
    /// nothing and contacts at zero distance are dropped.
    pub fn calculate_valences(
        &self,
        ion: &impl ChargedSpecies,
        contacts: &[Contact],
    ) -> Vec<Vector3<f64>> {
        let mut vectors = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let donor = AtomGuess::lenient(&contact.element, contact.charge);
            let distance = contact.distance();
            let valence = self.calculate_valence(ion, &donor, distance) * contact.occupancy;

            if valence == 0.0 {
                if !self.is_silent(&donor.element) && !self.params.is_supported_donor(&donor.element) {
                    debug!(
                        "Unknown interaction: {}{:+} with {}",
                        normalize_element(ion.element()),
                        ion.charge_as_int(),
                        donor
                    );
                }
                continue;
            }
            if distance == 0.0 {
                warn!(
                    "Skipping contact {} at zero distance from {}",
                    donor,
                    normalize_element(ion.element())
                );
                continue;
            }
            vectors.push(contact.vector / distance * valence);
        }
        vectors
    }
}

/// Aggregate of the valence vectors around one ion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValenceSummary {
    /// Bond valence sum: the total length of all vectors.
    pub bvs: f64,
    /// Length of the vector sum; near zero for a symmetric environment.
    pub vecsum: f64,
    pub contributions: usize,
}

impl ValenceSummary {
    pub fn from_vectors(vectors: &[Vector3<f64>]) -> Self {
        let bvs = vectors.iter().map(|v| v.norm()).sum();
        let vecsum = vectors
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v)
            .norm();
        Self {
            bvs,
            vecsum,
            contributions: vectors.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValenceAssessment {
    pub bvs_within_bounds: bool,
    pub vecsum_within_cutoff: bool,
    /// `bvs - cvbs_expected`, when an expected value is known.
    pub bvs_deviation: Option<f64>,
}

impl ValenceAssessment {
    pub fn is_acceptable(&self) -> bool {
        self.bvs_within_bounds && self.vecsum_within_cutoff
    }
}

impl MetalParameters {
    /// Checks a valence summary against this metal's constraints. Missing
    /// bounds never fail.
    pub fn assess(&self, summary: &ValenceSummary) -> ValenceAssessment {
        let above_lower = self.cvbs_lower.is_none_or(|lower| summary.bvs >= lower);
        let below_upper = self.cvbs_upper.is_none_or(|upper| summary.bvs <= upper);
        ValenceAssessment {
            bvs_within_bounds: above_lower && below_upper,
            vecsum_within_cutoff: self
                .vec_sum_cutoff
                .is_none_or(|cutoff| summary.vecsum <= cutoff),
            bvs_deviation: self.cvbs_expected.map(|expected| summary.bvs - expected),
        }
    }
}
