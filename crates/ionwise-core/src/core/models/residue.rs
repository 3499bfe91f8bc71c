use super::ids::{AtomGroupId, AtomId, ChainId, ResidueGroupId};

/// All atom-groups sharing one sequence position (resseq + icode) of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueGroup {
    pub resseq: isize,                        // Residue sequence number
    pub icode: String,                        // Insertion code, "" when absent
    pub link_to_previous: bool,               // Whether covalently linked to the preceding group
    pub chain_id: ChainId,                    // ID of the parent chain
    pub(crate) atom_groups: Vec<AtomGroupId>, // Ordered list of atom-group IDs
}

impl ResidueGroup {
    pub(crate) fn new(resseq: isize, icode: &str, chain_id: ChainId) -> Self {
        Self {
            resseq,
            icode: icode.to_string(),
            link_to_previous: true,
            chain_id,
            atom_groups: Vec::new(),
        }
    }

    pub fn atom_groups(&self) -> &[AtomGroupId] {
        &self.atom_groups
    }

    /// Sequence number and insertion code in the five-column PDB layout.
    pub fn resid(&self) -> String {
        format!("{:>4}{}", self.resseq, self.icode)
    }
}

/// Atoms of one residue name and one alternate location at a sequence position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomGroup {
    pub altloc: String,                     // Alternate-location code, "" for the shared group
    pub resname: String,                    // Residue name (e.g., "HIS", "HOH", "ZN")
    pub residue_group_id: ResidueGroupId,   // ID of the parent residue-group
    pub(crate) atoms: Vec<AtomId>,          // Ordered list of atom IDs
}

impl AtomGroup {
    pub(crate) fn new(altloc: &str, resname: &str, residue_group_id: ResidueGroupId) -> Self {
        Self {
            altloc: altloc.trim().to_string(),
            resname: resname.to_string(),
            residue_group_id,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn has_altloc(&self) -> bool {
        !self.altloc.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    fn dummy_residue_group_id(n: u64) -> ResidueGroupId {
        ResidueGroupId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_group_is_linked_and_empty() {
        let rg = ResidueGroup::new(12, "", dummy_chain_id(1));
        assert_eq!(rg.resseq, 12);
        assert!(rg.link_to_previous);
        assert!(rg.atom_groups().is_empty());
    }

    #[test]
    fn resid_pads_sequence_number_and_appends_icode() {
        let rg = ResidueGroup::new(7, "A", dummy_chain_id(1));
        assert_eq!(rg.resid(), "   7A");
        let rg = ResidueGroup::new(-12, "", dummy_chain_id(1));
        assert_eq!(rg.resid(), " -12");
    }

    #[test]
    fn atom_group_trims_altloc() {
        let ag = AtomGroup::new(" ", "SER", dummy_residue_group_id(2));
        assert_eq!(ag.altloc, "");
        assert!(!ag.has_altloc());
        let ag = AtomGroup::new("B", "SER", dummy_residue_group_id(2));
        assert!(ag.has_altloc());
    }
}
