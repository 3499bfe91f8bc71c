use super::ids::AtomGroupId;
use nalgebra::Point3;

/// Sentinel `tmp` value marking an atom as not yet tagged.
pub const UNTAGGED: i64 = -1;

/// Represents a single atom of a structure model.
///
/// Alternate-location codes and residue names are carried by the owning
/// atom-group; residue sequence numbers and insertion codes by the
/// residue-group above it.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "OD1", "ZN").
    pub name: String,
    /// The element symbol as read from the source, possibly padded or lowercase.
    pub element: String,
    /// The formal charge; zero when unknown.
    pub charge: i32,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The fraction of unit cells in which this atom is present, in [0, 1].
    pub occupancy: f64,
    /// The isotropic displacement parameter in square Angstroms.
    pub b_iso: f64,
    /// Whether the atom is written as a HETATM record.
    pub hetero: bool,
    /// Scratch tag used to correlate atoms across grouping passes.
    /// Negative values mean "not tagged".
    pub tmp: i64,
    /// The ID of the parent atom-group this atom belongs to.
    pub atom_group_id: AtomGroupId,
}

impl Atom {
    /// Creates a new fully-occupied, untagged `Atom` with zero charge.
    ///
    /// The parent atom-group ID is assigned when the atom is inserted into a
    /// [`Hierarchy`](super::hierarchy::Hierarchy).
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            charge: 0,
            position,
            occupancy: 1.0,
            b_iso: 0.0,
            hetero: false,
            tmp: UNTAGGED,
            atom_group_id: AtomGroupId::default(),
        }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_tmp(mut self, tmp: i64) -> Self {
        self.tmp = tmp;
        self
    }

    pub fn is_partially_occupied(&self) -> bool {
        self.occupancy > 0.0 && self.occupancy < 1.0
    }

    /// Formats the charge the way PDB records do ("2+", "1-", or blank).
    pub fn charge_label(&self) -> String {
        match self.charge {
            0 => String::new(),
            c if c > 0 => format!("{}+", c),
            c => format!("{}-", -c),
        }
    }
}
