use crate::config::ScoringConfig;
use crate::core::ions::params::{IonParameters, ParamLoadError};
use crate::core::ions::species::AtomGuess;
use crate::core::ions::valence::{Contact, ValenceAssessment, ValenceScorer, ValenceSummary};
use crate::core::models::hierarchy::Hierarchy;
use crate::core::models::ids::AtomId;
use nalgebra::Vector3;
use tracing::{debug, info, instrument};

/// The valence picture of one candidate ion.
#[derive(Debug, Clone, PartialEq)]
pub struct IonReport {
    pub atom_id: AtomId,
    /// Element and charge the ion was scored as.
    pub ion: AtomGuess,
    /// Every other atom of the same model within the contact cutoff.
    pub contacts: Vec<Contact>,
    pub vectors: Vec<Vector3<f64>>,
    pub summary: ValenceSummary,
    pub assessment: ValenceAssessment,
}

/// Scores a single atom as an ion. Returns `None` if the atom does not exist
/// or its element has no metal parameters.
pub fn analyze_ion(
    hierarchy: &Hierarchy,
    scorer: &ValenceScorer<'_>,
    atom_id: AtomId,
    contact_cutoff: f64,
) -> Option<IonReport> {
    let atom = hierarchy.atom(atom_id)?;
    let metal = scorer.params().get_metal_parameters(&atom.element)?;
    let model_id = hierarchy.parent_model_id(atom_id)?;

    let charge = if atom.charge != 0 { atom.charge } else { metal.charge };
    let ion = AtomGuess::lenient(&atom.element, charge);

    let contacts: Vec<Contact> = hierarchy
        .model_atoms(model_id)
        .filter(|&other_id| other_id != atom_id)
        .filter_map(|other_id| {
            let other = hierarchy.atom(other_id)?;
            let contact = Contact::from_atom(other_id, other, &atom.position);
            (contact.distance() <= contact_cutoff).then_some(contact)
        })
        .collect();

    let vectors = scorer.calculate_valences(&ion, &contacts);
    let summary = ValenceSummary::from_vectors(&vectors);
    let assessment = metal.assess(&summary);
    debug!(
        "{} {}: {} contacts, bvs {:.3}, vecsum {:.3}",
        ion,
        atom.name,
        contacts.len(),
        summary.bvs,
        summary.vecsum
    );

    Some(IonReport {
        atom_id,
        ion,
        contacts,
        vectors,
        summary,
        assessment,
    })
}

/// Scores every atom whose element has metal parameters, in traversal order.
#[instrument(skip_all, name = "ion_workflow")]
pub fn analyze_ions(
    hierarchy: &Hierarchy,
    params: &IonParameters,
    config: &ScoringConfig,
) -> Vec<IonReport> {
    let scorer = ValenceScorer::new(params).with_silent_donors(&config.silent_donor_elements);
    let reports: Vec<IonReport> = hierarchy
        .atoms()
        .filter_map(|atom_id| analyze_ion(hierarchy, &scorer, atom_id, config.contact_cutoff))
        .collect();

    let acceptable = reports
        .iter()
        .filter(|report| report.assessment.is_acceptable())
        .count();
    info!(
        candidates = reports.len(),
        acceptable,
        "Ion scoring complete."
    );
    reports
}

/// Loads the parameter table named by `config` and scores every ion.
pub fn run(hierarchy: &Hierarchy, config: &ScoringConfig) -> Result<Vec<IonReport>, ParamLoadError> {
    info!("Loading ion parameters.");
    let params = config.load_parameters()?;
    Ok(analyze_ions(hierarchy, &params, config))
}
