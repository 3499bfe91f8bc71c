use phf::{Set, phf_set};
use std::fmt;
use std::str::FromStr;

static COMMON_AMINO_ACIDS: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "MSE", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "UNK",
};

static COMMON_RNA_DNA: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "T", "I", "DA", "DC", "DG", "DT", "DU", "DI",
    "ADE", "CYT", "GUA", "URI", "THY",
};

static COMMON_WATER: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "D2O", "SOL", "TIP", "TIP3", "OH2",
};

static COMMON_SMALL_MOLECULES: Set<&'static str> = phf_set! {
    "SO4", "PO4", "GOL", "EDO", "ACT", "PEG", "PGE", "MPD", "DMS", "FMT",
    "TRS", "EPE", "MES", "CIT", "IMD", "BME", "NAG", "MAN", "BMA", "FUC",
    "HEM", "NAD", "FAD", "ATP", "ADP", "ANP", "GDP", "GTP", "SAH", "SAM",
};

static COMMON_ELEMENTS: Set<&'static str> = phf_set! {
    "ZN", "MG", "CA", "NA", "K", "CL", "MN", "FE", "FE2", "CO", "NI", "CU",
    "CU1", "CD", "HG", "SR", "BA", "CS", "RB", "LI", "BR", "IOD", "F", "AG",
    "AU", "PT", "PB", "YB", "GD", "SM", "TB", "LU", "3CO", "3NI", "MN3",
};

/// Coarse classification of residue names, used to restrict alternate
/// conformation grouping to residues of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueNameClass {
    CommonAminoAcid,
    CommonRnaDna,
    CommonWater,
    CommonSmallMolecule,
    CommonElement,
    Other,
}

impl ResidueNameClass {
    pub fn classify(resname: &str) -> Self {
        let name = resname.trim().to_ascii_uppercase();
        let name = name.as_str();
        if COMMON_AMINO_ACIDS.contains(name) {
            ResidueNameClass::CommonAminoAcid
        } else if COMMON_RNA_DNA.contains(name) {
            ResidueNameClass::CommonRnaDna
        } else if COMMON_WATER.contains(name) {
            ResidueNameClass::CommonWater
        } else if COMMON_SMALL_MOLECULES.contains(name) {
            ResidueNameClass::CommonSmallMolecule
        } else if COMMON_ELEMENTS.contains(name) {
            ResidueNameClass::CommonElement
        } else {
            ResidueNameClass::Other
        }
    }

    pub fn contains(&self, resname: &str) -> bool {
        Self::classify(resname) == *self
    }
}

impl FromStr for ResidueNameClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common_amino_acid" => Ok(ResidueNameClass::CommonAminoAcid),
            "common_rna_dna" => Ok(ResidueNameClass::CommonRnaDna),
            "common_water" => Ok(ResidueNameClass::CommonWater),
            "common_small_molecule" => Ok(ResidueNameClass::CommonSmallMolecule),
            "common_element" => Ok(ResidueNameClass::CommonElement),
            "other" => Ok(ResidueNameClass::Other),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ResidueNameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ResidueNameClass::CommonAminoAcid => "common_amino_acid",
                ResidueNameClass::CommonRnaDna => "common_rna_dna",
                ResidueNameClass::CommonWater => "common_water",
                ResidueNameClass::CommonSmallMolecule => "common_small_molecule",
                ResidueNameClass::CommonElement => "common_element",
                ResidueNameClass::Other => "other",
            }
        )
    }
}

pub fn is_water_residue(resname: &str) -> bool {
    ResidueNameClass::classify(resname) == ResidueNameClass::CommonWater
}
