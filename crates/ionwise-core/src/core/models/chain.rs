use super::ids::{ChainId, ModelId, ResidueGroupId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,                  // Model identifier as written after MODEL
    pub(crate) chains: Vec<ChainId>, // Ordered list of chain IDs belonging to this model
}

impl Model {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            chains: Vec::new(),
        }
    }

    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,                                 // Chain identifier (e.g., "A", "AB")
    pub model_id: ModelId,                          // ID of the parent model
    pub(crate) residue_groups: Vec<ResidueGroupId>, // Ordered list of residue-group IDs
}

impl Chain {
    pub(crate) fn new(id: &str, model_id: ModelId) -> Self {
        Self {
            id: id.to_string(),
            model_id,
            residue_groups: Vec::new(),
        }
    }

    pub fn residue_groups(&self) -> &[ResidueGroupId] {
        &self.residue_groups
    }
}
