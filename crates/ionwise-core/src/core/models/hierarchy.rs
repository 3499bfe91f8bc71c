use super::atom::{Atom, UNTAGGED};
use super::chain::{Chain, Model};
use super::ids::{AtomGroupId, AtomId, ChainId, ModelId, ResidueGroupId};
use super::residue::{AtomGroup, ResidueGroup};
use crate::core::utils::elements::is_hydrogen_element;
use slotmap::SlotMap;
use std::fmt;
use thiserror::Error;

/// One level of the structure hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyLevel {
    Model,
    Chain,
    ResidueGroup,
    AtomGroup,
    Atom,
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HierarchyLevel::Model => "model",
                HierarchyLevel::Chain => "chain",
                HierarchyLevel::ResidueGroup => "residue group",
                HierarchyLevel::AtomGroup => "atom group",
                HierarchyLevel::Atom => "atom",
            }
        )
    }
}

/// Raised by the `only_*` accessors when a container does not hold exactly one child.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Expected exactly one {level}, found {found}")]
pub struct CardinalityError {
    pub level: HierarchyLevel,
    pub found: usize,
}

fn exactly_one<K: Copy>(ids: &[K], level: HierarchyLevel) -> Result<K, CardinalityError> {
    match ids {
        [only] => Ok(*only),
        _ => Err(CardinalityError {
            level,
            found: ids.len(),
        }),
    }
}

/// The model → chain → residue-group → atom-group → atom tree of a structure.
///
/// Every level lives in its own slot map and refers to its parent by ID; the
/// ordered child-ID lists define traversal order. All traversal methods
/// return fresh, lazy iterators, so iterating twice visits the same items in
/// the same order.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    models: SlotMap<ModelId, Model>,
    chains: SlotMap<ChainId, Chain>,
    residue_groups: SlotMap<ResidueGroupId, ResidueGroup>,
    atom_groups: SlotMap<AtomGroupId, AtomGroup>,
    atoms: SlotMap<AtomId, Atom>,
    /// Models in insertion order.
    model_order: Vec<ModelId>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn residue_group(&self, id: ResidueGroupId) -> Option<&ResidueGroup> {
        self.residue_groups.get(id)
    }

    pub fn residue_group_mut(&mut self, id: ResidueGroupId) -> Option<&mut ResidueGroup> {
        self.residue_groups.get_mut(id)
    }

    pub fn atom_group(&self, id: AtomGroupId) -> Option<&AtomGroup> {
        self.atom_groups.get(id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn models_size(&self) -> usize {
        self.model_order.len()
    }

    pub fn atoms_size(&self) -> usize {
        self.atoms.len()
    }

    /// Appends a new model.
    pub fn add_model(&mut self, id: &str) -> ModelId {
        let model_id = self.models.insert(Model::new(id));
        self.model_order.push(model_id);
        model_id
    }

    /// Appends a chain to a model.
    ///
    /// # Return
    ///
    /// Returns `None` if the model does not exist.
    pub fn add_chain(&mut self, model_id: ModelId, id: &str) -> Option<ChainId> {
        if !self.models.contains_key(model_id) {
            return None;
        }
        let chain_id = self.chains.insert(Chain::new(id, model_id));
        self.models[model_id].chains.push(chain_id);
        Some(chain_id)
    }

    /// Appends a residue-group to a chain. New groups are linked to their
    /// predecessor; clear `link_to_previous` through
    /// [`residue_group_mut`](Self::residue_group_mut) to model a chain break.
    ///
    /// # Return
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue_group(
        &mut self,
        chain_id: ChainId,
        resseq: isize,
        icode: &str,
    ) -> Option<ResidueGroupId> {
        if !self.chains.contains_key(chain_id) {
            return None;
        }
        let rg_id = self
            .residue_groups
            .insert(ResidueGroup::new(resseq, icode, chain_id));
        self.chains[chain_id].residue_groups.push(rg_id);
        Some(rg_id)
    }

    /// Appends an atom-group to a residue-group.
    ///
    /// # Return
    ///
    /// Returns `None` if the residue-group does not exist.
    pub fn add_atom_group(
        &mut self,
        residue_group_id: ResidueGroupId,
        altloc: &str,
        resname: &str,
    ) -> Option<AtomGroupId> {
        if !self.residue_groups.contains_key(residue_group_id) {
            return None;
        }
        let ag_id = self
            .atom_groups
            .insert(AtomGroup::new(altloc, resname, residue_group_id));
        self.residue_groups[residue_group_id].atom_groups.push(ag_id);
        Some(ag_id)
    }

    /// Inserts an atom into an atom-group, overwriting its parent ID.
    ///
    /// # Return
    ///
    /// Returns `None` if the atom-group does not exist.
    pub fn add_atom(&mut self, atom_group_id: AtomGroupId, mut atom: Atom) -> Option<AtomId> {
        if !self.atom_groups.contains_key(atom_group_id) {
            return None;
        }
        atom.atom_group_id = atom_group_id;
        let atom_id = self.atoms.insert(atom);
        self.atom_groups[atom_group_id].atoms.push(atom_id);
        Some(atom_id)
    }

    // --- Traversal from the root ---

    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.model_order.iter().copied()
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.models().flat_map(move |m| self.model_chains(m))
    }

    pub fn residue_groups(&self) -> impl Iterator<Item = ResidueGroupId> + '_ {
        self.chains().flat_map(move |c| self.chain_residue_groups(c))
    }

    pub fn atom_groups(&self) -> impl Iterator<Item = AtomGroupId> + '_ {
        self.residue_groups()
            .flat_map(move |rg| self.residue_group_atom_groups(rg))
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atom_groups().flat_map(move |ag| self.atom_group_atoms(ag))
    }

    // --- Traversal below a model ---

    pub fn model_chains(&self, model_id: ModelId) -> impl Iterator<Item = ChainId> + '_ {
        self.models
            .get(model_id)
            .into_iter()
            .flat_map(|m| m.chains.iter().copied())
    }

    pub fn model_residue_groups(
        &self,
        model_id: ModelId,
    ) -> impl Iterator<Item = ResidueGroupId> + '_ {
        self.model_chains(model_id)
            .flat_map(move |c| self.chain_residue_groups(c))
    }

    pub fn model_atom_groups(&self, model_id: ModelId) -> impl Iterator<Item = AtomGroupId> + '_ {
        self.model_residue_groups(model_id)
            .flat_map(move |rg| self.residue_group_atom_groups(rg))
    }

    pub fn model_atoms(&self, model_id: ModelId) -> impl Iterator<Item = AtomId> + '_ {
        self.model_atom_groups(model_id)
            .flat_map(move |ag| self.atom_group_atoms(ag))
    }

    // --- Traversal below a chain ---

    pub fn chain_residue_groups(
        &self,
        chain_id: ChainId,
    ) -> impl Iterator<Item = ResidueGroupId> + '_ {
        self.chains
            .get(chain_id)
            .into_iter()
            .flat_map(|c| c.residue_groups.iter().copied())
    }

    pub fn chain_atom_groups(&self, chain_id: ChainId) -> impl Iterator<Item = AtomGroupId> + '_ {
        self.chain_residue_groups(chain_id)
            .flat_map(move |rg| self.residue_group_atom_groups(rg))
    }

    pub fn chain_atoms(&self, chain_id: ChainId) -> impl Iterator<Item = AtomId> + '_ {
        self.chain_atom_groups(chain_id)
            .flat_map(move |ag| self.atom_group_atoms(ag))
    }

    // --- Traversal below a residue-group / atom-group ---

    pub fn residue_group_atom_groups(
        &self,
        residue_group_id: ResidueGroupId,
    ) -> impl Iterator<Item = AtomGroupId> + '_ {
        self.residue_groups
            .get(residue_group_id)
            .into_iter()
            .flat_map(|rg| rg.atom_groups.iter().copied())
    }

    pub fn residue_group_atoms(
        &self,
        residue_group_id: ResidueGroupId,
    ) -> impl Iterator<Item = AtomId> + '_ {
        self.residue_group_atom_groups(residue_group_id)
            .flat_map(move |ag| self.atom_group_atoms(ag))
    }

    pub fn atom_group_atoms(&self, atom_group_id: AtomGroupId) -> impl Iterator<Item = AtomId> + '_ {
        self.atom_groups
            .get(atom_group_id)
            .into_iter()
            .flat_map(|ag| ag.atoms.iter().copied())
    }

    // --- Upward lookups ---

    /// Returns the atom-group an atom belongs to.
    pub fn parent_atom_group(&self, atom_id: AtomId) -> Option<&AtomGroup> {
        self.atoms
            .get(atom_id)
            .and_then(|a| self.atom_groups.get(a.atom_group_id))
    }

    /// Returns the model an atom belongs to.
    pub fn parent_model_id(&self, atom_id: AtomId) -> Option<ModelId> {
        let ag = self.parent_atom_group(atom_id)?;
        let rg = self.residue_groups.get(ag.residue_group_id)?;
        self.chains.get(rg.chain_id).map(|c| c.model_id)
    }

    // --- Exactly-one accessors ---

    pub fn only_model(&self) -> Result<ModelId, CardinalityError> {
        exactly_one(&self.model_order, HierarchyLevel::Model)
    }

    pub fn only_chain(&self) -> Result<ChainId, CardinalityError> {
        self.model_only_chain(self.only_model()?)
    }

    pub fn only_residue_group(&self) -> Result<ResidueGroupId, CardinalityError> {
        self.chain_only_residue_group(self.only_chain()?)
    }

    pub fn only_atom_group(&self) -> Result<AtomGroupId, CardinalityError> {
        self.residue_group_only_atom_group(self.only_residue_group()?)
    }

    pub fn only_atom(&self) -> Result<AtomId, CardinalityError> {
        self.atom_group_only_atom(self.only_atom_group()?)
    }

    pub fn model_only_chain(&self, model_id: ModelId) -> Result<ChainId, CardinalityError> {
        let chains = self.models.get(model_id).map_or(&[][..], |m| m.chains());
        exactly_one(chains, HierarchyLevel::Chain)
    }

    pub fn chain_only_residue_group(
        &self,
        chain_id: ChainId,
    ) -> Result<ResidueGroupId, CardinalityError> {
        let rgs = self
            .chains
            .get(chain_id)
            .map_or(&[][..], |c| c.residue_groups());
        exactly_one(rgs, HierarchyLevel::ResidueGroup)
    }

    pub fn residue_group_only_atom_group(
        &self,
        residue_group_id: ResidueGroupId,
    ) -> Result<AtomGroupId, CardinalityError> {
        let ags = self
            .residue_groups
            .get(residue_group_id)
            .map_or(&[][..], |rg| rg.atom_groups());
        exactly_one(ags, HierarchyLevel::AtomGroup)
    }

    pub fn atom_group_only_atom(&self, atom_group_id: AtomGroupId) -> Result<AtomId, CardinalityError> {
        let atoms = self
            .atom_groups
            .get(atom_group_id)
            .map_or(&[][..], |ag| ag.atoms());
        exactly_one(atoms, HierarchyLevel::Atom)
    }

    // --- Tags ---

    /// Sets `tmp` of every atom to `value`.
    pub fn reset_atom_tmp(&mut self, value: i64) {
        for (_, atom) in self.atoms.iter_mut() {
            atom.tmp = value;
        }
    }

    /// Tags every atom with its sequence index in traversal order, except
    /// hydrogens and deuteriums, which are marked untagged so that occupancy
    /// grouping ignores them.
    pub fn reset_tmp_for_occupancy_groups_simple(&mut self) {
        let order: Vec<AtomId> = self.atoms().collect();
        for (i_seq, atom_id) in order.into_iter().enumerate() {
            let atom = &mut self.atoms[atom_id];
            atom.tmp = if is_hydrogen_element(&atom.element) {
                UNTAGGED
            } else {
                i_seq as i64
            };
        }
    }
}
