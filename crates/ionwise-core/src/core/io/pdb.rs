use crate::core::models::atom::Atom;
use crate::core::models::hierarchy::Hierarchy;
use crate::core::models::residue::{AtomGroup, ResidueGroup};
use crate::core::utils::elements::normalize_element;

/// Pads atom names the PDB way: names shorter than four characters of
/// single-letter elements start in column 14.
fn format_atom_name(atom: &Atom) -> String {
    let name = atom.name.trim();
    if name.len() < 4 && atom.element.trim().len() == 1 {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}

fn format_atom_record(
    serial: usize,
    atom: &Atom,
    atom_group: &AtomGroup,
    residue_group: &ResidueGroup,
    chain_id: &str,
) -> String {
    let record_type = if atom.hetero { "HETATM" } else { "ATOM" };
    format!(
        "{:<6}{:>5} {:<4}{:1}{:>3}{:>2}{:>4}{:1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{:>2}",
        record_type,
        serial % 100_000,
        format_atom_name(atom),
        atom_group.altloc,
        atom_group.resname,
        chain_id,
        residue_group.resseq,
        residue_group.icode,
        atom.position.x,
        atom.position.y,
        atom.position.z,
        atom.occupancy,
        atom.b_iso,
        normalize_element(&atom.element),
        atom.charge_label()
    )
}

/// Renders the hierarchy as PDB records, one string per line.
///
/// Atoms are written in hierarchy order, independent of conformers, with
/// serial numbers counting from 1. Every chain is closed by `TER`; models
/// are wrapped in `MODEL`/`ENDMDL` only when there is more than one.
pub fn as_pdb_records(hierarchy: &Hierarchy, append_end: bool) -> Vec<String> {
    let multi_model = hierarchy.models_size() > 1;
    let mut records = Vec::new();
    let mut serial = 0;

    for (i_model, model_id) in hierarchy.models().enumerate() {
        let Some(model) = hierarchy.model(model_id) else {
            continue;
        };
        if multi_model {
            let label = if model.id.trim().is_empty() {
                (i_model + 1).to_string()
            } else {
                model.id.trim().to_string()
            };
            records.push(format!("MODEL     {:>4}", label));
        }

        for &chain_id in model.chains() {
            let Some(chain) = hierarchy.chain(chain_id) else {
                continue;
            };
            for &rg_id in chain.residue_groups() {
                let Some(rg) = hierarchy.residue_group(rg_id) else {
                    continue;
                };
                for &ag_id in rg.atom_groups() {
                    let Some(ag) = hierarchy.atom_group(ag_id) else {
                        continue;
                    };
                    for atom in ag.atoms().iter().filter_map(|&id| hierarchy.atom(id)) {
                        serial += 1;
                        records.push(format_atom_record(serial, atom, ag, rg, &chain.id));
                    }
                }
            }
            records.push("TER".to_string());
        }

        if multi_model {
            records.push("ENDMDL".to_string());
        }
    }

    if append_end {
        records.push("END".to_string());
    }
    records
}

/// [`as_pdb_records`] joined with newlines, including a trailing newline.
pub fn as_pdb_string(hierarchy: &Hierarchy, append_end: bool) -> String {
    let mut out = String::new();
    for record in as_pdb_records(hierarchy, append_end) {
        out.push_str(&record);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn zinc_site() -> Hierarchy {
        let mut h = Hierarchy::new();
        let m = h.add_model("");
        let chain = h.add_chain(m, "A").unwrap();
        let rg = h.add_residue_group(chain, 42, "").unwrap();
        let ag = h.add_atom_group(rg, "", "HIS").unwrap();
        h.add_atom(ag, Atom::new("NE2", "N", Point3::new(1.0, 2.0, 3.0)));
        let rg = h.add_residue_group(chain, 301, "").unwrap();
        let ag = h.add_atom_group(rg, "", "ZN").unwrap();
        let mut zn = Atom::new("ZN", "ZN", Point3::new(-1.5, 0.25, 10.0)).with_charge(2);
        zn.hetero = true;
        zn.b_iso = 15.5;
        h.add_atom(ag, zn);
        h
    }

    #[test]
    fn single_model_has_no_model_records() {
        let records = as_pdb_records(&zinc_site(), false);
        assert_eq!(records.len(), 3);
        assert!(records[0].starts_with("ATOM      1  NE2 HIS A  42"));
        assert!(records[1].starts_with("HETATM    2 ZN    ZN A 301"));
        assert_eq!(records[2], "TER");
    }

    #[test]
    fn atom_record_uses_fixed_columns() {
        let records = as_pdb_records(&zinc_site(), false);
        let line = &records[1];
        assert_eq!(line.len(), 80);
        assert_eq!(&line[30..38], "  -1.500");
        assert_eq!(&line[38..46], "   0.250");
        assert_eq!(&line[46..54], "  10.000");
        assert_eq!(&line[54..60], "  1.00");
        assert_eq!(&line[60..66], " 15.50");
        assert_eq!(&line[76..78], "ZN");
        assert_eq!(&line[78..80], "2+");
    }

    #[test]
    fn altloc_is_written_in_column_seventeen() {
        let mut h = Hierarchy::new();
        let m = h.add_model("");
        let chain = h.add_chain(m, "B").unwrap();
        let rg = h.add_residue_group(chain, 7, "A").unwrap();
        let ag = h.add_atom_group(rg, "B", "SER").unwrap();
        h.add_atom(ag, Atom::new("OG", "O", Point3::origin()).with_occupancy(0.4));

        let records = as_pdb_records(&h, false);
        assert_eq!(&records[0][16..17], "B");
        assert_eq!(&records[0][17..20], "SER");
        assert_eq!(&records[0][21..22], "B");
        assert_eq!(&records[0][22..27], "   7A");
        assert_eq!(&records[0][54..60], "  0.40");
    }

    #[test]
    fn multiple_models_are_wrapped() {
        let mut h = Hierarchy::new();
        for _ in 0..2 {
            let m = h.add_model("");
            let chain = h.add_chain(m, "A").unwrap();
            let rg = h.add_residue_group(chain, 1, "").unwrap();
            let ag = h.add_atom_group(rg, "", "HOH").unwrap();
            h.add_atom(ag, Atom::new("O", "O", Point3::origin()));
        }

        let records = as_pdb_records(&h, true);
        assert_eq!(records[0], "MODEL        1");
        assert!(records[1].starts_with("ATOM      1  O   HOH"));
        assert_eq!(records[2], "TER");
        assert_eq!(records[3], "ENDMDL");
        assert_eq!(records[4], "MODEL        2");
        assert!(records[5].starts_with("ATOM      2"));
        assert_eq!(records.last().map(String::as_str), Some("END"));
    }

    #[test]
    fn as_pdb_string_ends_with_newline() {
        let text = as_pdb_string(&zinc_site(), true);
        assert!(text.ends_with("END\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn empty_hierarchy_yields_only_end() {
        assert!(as_pdb_records(&Hierarchy::new(), false).is_empty());
        assert_eq!(as_pdb_records(&Hierarchy::new(), true), vec!["END".to_string()]);
    }
}
