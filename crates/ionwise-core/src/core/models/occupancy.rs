use super::hierarchy::Hierarchy;
use super::ids::{ChainId, ResidueGroupId};
use crate::core::utils::identifiers::ResidueNameClass;
use indexmap::IndexMap;
use std::ops::Range;
use tracing::warn;

/// Tags of atoms whose occupancies are coupled: each inner list (sorted
/// ascending) is one alternative, and the alternatives are mutually exclusive.
pub type OccupancyGroup = Vec<Vec<i64>>;

impl Hierarchy {
    /// Finds maximal runs of consecutive residue-groups that consist purely
    /// of altloc-tagged atom-groups.
    ///
    /// A residue-group qualifies when it has at least one atom-group, none of
    /// its atom-groups has a blank altloc, and, if `residue_class` is given,
    /// every atom-group's residue name belongs to that class. A run is broken
    /// by any non-qualifying group and by a group that is not linked to its
    /// predecessor.
    pub fn find_pure_altloc_ranges(
        &self,
        chain_id: ChainId,
        residue_class: Option<ResidueNameClass>,
    ) -> Vec<Range<usize>> {
        let residue_groups: Vec<ResidueGroupId> = self.chain_residue_groups(chain_id).collect();
        let mut ranges = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i_rg, &rg_id) in residue_groups.iter().enumerate() {
            let pure = self.is_pure_altloc(rg_id, residue_class);
            let linked = self
                .residue_group(rg_id)
                .is_some_and(|rg| rg.link_to_previous);

            match (run_start, pure) {
                (Some(start), true) if !linked => {
                    ranges.push(start..i_rg);
                    run_start = Some(i_rg);
                }
                (Some(_), true) => {}
                (Some(start), false) => {
                    ranges.push(start..i_rg);
                    run_start = None;
                }
                (None, true) => run_start = Some(i_rg),
                (None, false) => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(start..residue_groups.len());
        }
        ranges
    }

    fn is_pure_altloc(&self, rg_id: ResidueGroupId, residue_class: Option<ResidueNameClass>) -> bool {
        let ags: Vec<_> = self
            .residue_group_atom_groups(rg_id)
            .filter_map(|ag_id| self.atom_group(ag_id))
            .collect();
        !ags.is_empty()
            && ags.iter().all(|ag| {
                ag.has_altloc() && residue_class.is_none_or(|class| class.contains(&ag.resname))
            })
    }

    /// Groups the tagged atoms of one chain by coupled occupancy.
    ///
    /// Pure-altloc ranges (see [`find_pure_altloc_ranges`](Self::find_pure_altloc_ranges))
    /// are processed as a unit and every other residue-group on its own. Per
    /// unit, all atoms sharing an altloc form one alternative of a single
    /// group, and every partially occupied atom without an altloc forms a
    /// singleton group. Atoms with a negative `tmp` are ignored. The result
    /// is stably sorted by its first tag.
    pub fn chain_occupancy_groups_simple(
        &self,
        chain_id: ChainId,
        residue_class: Option<ResidueNameClass>,
    ) -> Vec<OccupancyGroup> {
        let residue_groups: Vec<ResidueGroupId> = self.chain_residue_groups(chain_id).collect();
        let mut done = vec![false; residue_groups.len()];
        let mut result = Vec::new();

        for range in self.find_pure_altloc_ranges(chain_id, residue_class) {
            range.clone().for_each(|i| done[i] = true);
            self.collect_occupancy_groups(&residue_groups[range], &mut result);
        }
        for (i_rg, is_done) in done.iter().enumerate() {
            if !is_done {
                self.collect_occupancy_groups(&residue_groups[i_rg..i_rg + 1], &mut result);
            }
        }

        result.sort_by_key(|group| group.first().and_then(|tags| tags.first()).copied());
        result
    }

    fn collect_occupancy_groups(
        &self,
        residue_groups: &[ResidueGroupId],
        result: &mut Vec<OccupancyGroup>,
    ) {
        let mut isolated_var_occ = Vec::new();
        let mut by_altloc: IndexMap<&str, Vec<i64>> = IndexMap::new();

        for &rg_id in residue_groups {
            for ag_id in self.residue_group_atom_groups(rg_id) {
                let Some(ag) = self.atom_group(ag_id) else {
                    continue;
                };
                let tagged = ag
                    .atoms()
                    .iter()
                    .filter_map(|&atom_id| self.atom(atom_id))
                    .filter(|atom| atom.tmp >= 0);
                if ag.has_altloc() {
                    let tags: Vec<i64> = tagged.map(|atom| atom.tmp).collect();
                    if !tags.is_empty() {
                        by_altloc.entry(ag.altloc.as_str()).or_default().extend(tags);
                    }
                } else {
                    isolated_var_occ.extend(
                        tagged
                            .filter(|atom| atom.is_partially_occupied())
                            .map(|atom| atom.tmp),
                    );
                }
            }
        }

        if by_altloc.len() == 1 {
            if let Some(altloc) = by_altloc.keys().next() {
                warn!(
                    "Altloc '{}' has no alternative within its residue range; emitting a one-member group",
                    altloc
                );
            }
        }
        if !by_altloc.is_empty() {
            let group: OccupancyGroup = by_altloc
                .into_values()
                .map(|mut tags| {
                    tags.sort_unstable();
                    tags
                })
                .collect();
            result.push(group);
        }
        result.extend(isolated_var_occ.into_iter().map(|tag| vec![vec![tag]]));
    }

    /// Re-tags every atom (see
    /// [`reset_tmp_for_occupancy_groups_simple`](Self::reset_tmp_for_occupancy_groups_simple))
    /// and concatenates the occupancy groups of all chains.
    pub fn occupancy_groups_simple(
        &mut self,
        residue_class: Option<ResidueNameClass>,
    ) -> Vec<OccupancyGroup> {
        self.reset_tmp_for_occupancy_groups_simple();
        let chains: Vec<ChainId> = self.chains().collect();
        chains
            .into_iter()
            .flat_map(|chain_id| self.chain_occupancy_groups_simple(chain_id, residue_class))
            .collect()
    }
}
