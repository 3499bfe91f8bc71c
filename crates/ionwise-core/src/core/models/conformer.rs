use super::hierarchy::Hierarchy;
use super::ids::{AtomGroupId, AtomId, ChainId};
use indexmap::IndexMap;

/// One residue of a conformer: the atoms of a single residue name at one
/// sequence position, as seen by one alternate location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformerResidue {
    pub resname: String,
    pub resseq: isize,
    pub icode: String,
    pub link_to_previous: bool,
    /// `false` when this residue name is (also) provided by an altloc-tagged
    /// atom-group at this position.
    pub is_pure_primary: bool,
    atoms: Vec<AtomId>,
}

impl ConformerResidue {
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn atoms_size(&self) -> usize {
        self.atoms.len()
    }
}

/// A single coherent path through a chain for one alternate location.
///
/// Conformers are views: they hold atom IDs of the hierarchy, so atoms
/// without an altloc appear (by ID) in every conformer of their chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conformer {
    pub altloc: String,
    residues: Vec<ConformerResidue>,
}

impl Conformer {
    pub fn residues(&self) -> &[ConformerResidue] {
        &self.residues
    }

    pub fn residues_size(&self) -> usize {
        self.residues.len()
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.residues.iter().flat_map(|r| r.atoms.iter().copied())
    }
}

impl Hierarchy {
    /// Splits a chain into one conformer per altloc, in order of first
    /// appearance. A chain without any altloc yields a single conformer with
    /// altloc `""`. Missing chains yield no conformers.
    pub fn chain_conformers(&self, chain_id: ChainId) -> Vec<Conformer> {
        if self.chain(chain_id).is_none() {
            return Vec::new();
        }

        let mut altloc_indices: IndexMap<&str, usize> = IndexMap::new();
        for ag_id in self.chain_atom_groups(chain_id) {
            let Some(ag) = self.atom_group(ag_id) else {
                continue;
            };
            if ag.has_altloc() && !altloc_indices.contains_key(ag.altloc.as_str()) {
                let index = altloc_indices.len();
                altloc_indices.insert(ag.altloc.as_str(), index);
            }
        }

        let mut result: Vec<Conformer> = if altloc_indices.is_empty() {
            vec![Conformer {
                altloc: String::new(),
                residues: Vec::new(),
            }]
        } else {
            altloc_indices
                .keys()
                .map(|altloc| Conformer {
                    altloc: altloc.to_string(),
                    residues: Vec::new(),
                })
                .collect()
        };

        for rg_id in self.chain_residue_groups(chain_id) {
            let Some(rg) = self.residue_group(rg_id) else {
                continue;
            };

            let mut altloc_ags: Vec<Vec<AtomGroupId>> = vec![Vec::new(); result.len()];
            for &ag_id in rg.atom_groups() {
                let Some(ag) = self.atom_group(ag_id) else {
                    continue;
                };
                match altloc_indices.get(ag.altloc.as_str()) {
                    Some(&index) if ag.has_altloc() => altloc_ags[index].push(ag_id),
                    _ => altloc_ags.iter_mut().for_each(|ags| ags.push(ag_id)),
                }
            }

            for (conformer, ags) in result.iter_mut().zip(altloc_ags) {
                // resname -> (atoms, provided by an altloc-tagged group)
                let mut by_resname: IndexMap<&str, (Vec<AtomId>, bool)> = IndexMap::new();
                for ag_id in ags {
                    let Some(ag) = self.atom_group(ag_id) else {
                        continue;
                    };
                    let entry = by_resname
                        .entry(ag.resname.as_str())
                        .or_insert_with(|| (Vec::new(), false));
                    entry.0.extend_from_slice(ag.atoms());
                    entry.1 |= ag.has_altloc();
                }
                for (resname, (atoms, with_altloc)) in by_resname {
                    conformer.residues.push(ConformerResidue {
                        resname: resname.to_string(),
                        resseq: rg.resseq,
                        icode: rg.icode.clone(),
                        link_to_previous: rg.link_to_previous,
                        is_pure_primary: !with_altloc,
                        atoms,
                    });
                }
            }
        }

        result
    }

    /// Conformers of every chain, in traversal order.
    pub fn conformers(&self) -> Vec<(ChainId, Vec<Conformer>)> {
        self.chains()
            .map(|chain_id| (chain_id, self.chain_conformers(chain_id)))
            .collect()
    }
}
