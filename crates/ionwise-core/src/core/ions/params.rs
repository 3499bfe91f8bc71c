use super::species::{ChargedSpecies, scattering_type};
use crate::core::utils::elements::normalize_element;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

// Brown, I. D., & Altermatt, D. (1985).
// Bond-valence parameters obtained from a systematic analysis
// of the Inorganic Crystal Structure Database.
// Acta Crystallographica Section B Structural Science,
// 41(4), 244-247. doi:10.1107/S0108768185002063

/// The universal bond-valence softness parameter `b`, in Angstroms.
pub const DEFAULT_BOND_SOFTNESS: f64 = 0.37;

const BUNDLED_PARAMETERS: &str = include_str!("../../../data/ion_parameters.toml");
const BUNDLED_LABEL: &str = "<bundled ion_parameters.toml>";

fn default_softness() -> f64 {
    DEFAULT_BOND_SOFTNESS
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField<T> {
    Value(T),
    Text(String),
}

/// Deserializes a value that may be replaced by the "." placeholder.
fn sentinel<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match RawField::<T>::deserialize(deserializer)? {
        RawField::Value(value) => Ok(Some(value)),
        RawField::Text(text) if text.trim() == "." => Ok(None),
        RawField::Text(text) => Err(de::Error::custom(format!(
            "expected a value or '.', found '{}'",
            text
        ))),
    }
}

fn sentinel_list(field: &str) -> Option<Vec<String>> {
    if field.trim() == "." {
        return None;
    }
    Some(
        field
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// One row of the bond-valence table: `r0` (`value`) and `b` for an
/// (ion, donor) pair at specific charges.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ValenceRow {
    pub atom_symbol: String,
    pub atom_charge: i32,
    pub donor_symbol: String,
    pub donor_charge: i32,
    pub value: f64,
    #[serde(default = "default_softness")]
    pub b: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct ElementRow {
    element: String,
    #[serde(deserialize_with = "sentinel")]
    charge: Option<i32>,
    #[serde(deserialize_with = "sentinel")]
    vec_sum_cutoff: Option<f64>,
    #[serde(deserialize_with = "sentinel")]
    coord_num_lower: Option<u32>,
    #[serde(deserialize_with = "sentinel")]
    coord_num_upper: Option<u32>,
    #[serde(deserialize_with = "sentinel")]
    min_coordinating_non_waters: Option<u32>,
    #[serde(deserialize_with = "sentinel")]
    cvbs_lower: Option<f64>,
    #[serde(deserialize_with = "sentinel")]
    cvbs_upper: Option<f64>,
    #[serde(deserialize_with = "sentinel")]
    cvbs_expected: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct LigandRow {
    element: String,
    allowed_coordinating_atoms: String,
    allowed_coordinating_residues: String,
    allowed_geometries: String,
    allowed_backbone_atoms: String,
}

#[derive(Debug, Deserialize)]
struct ParameterFile {
    #[serde(default)]
    lib_valence: Vec<ValenceRow>,
    #[serde(default)]
    lib_elems: Vec<ElementRow>,
    #[serde(default)]
    lib_ligands: Vec<LigandRow>,
}

/// Coordination and valence constraints for one metal element.
///
/// Optional fields are unconstrained when `None` (written as "." in the
/// parameter source).
#[derive(Debug, Clone, PartialEq)]
pub struct MetalParameters {
    pub element: String,
    pub charge: i32,
    pub vec_sum_cutoff: Option<f64>,
    pub coord_num_lower: Option<u32>,
    pub coord_num_upper: Option<u32>,
    pub min_coordinating_non_waters: Option<u32>,
    pub cvbs_lower: Option<f64>,
    pub cvbs_upper: Option<f64>,
    pub cvbs_expected: Option<f64>,
    pub allowed_coordinating_atoms: Option<Vec<String>>,
    pub allowed_coordinating_residues: Option<Vec<String>>,
    pub allowed_geometries: Option<Vec<String>>,
    pub allowed_backbone_atoms: Option<Vec<String>>,
}

impl MetalParameters {
    pub fn scattering_type(&self) -> String {
        scattering_type(&self.element, self.charge)
    }
}

impl ChargedSpecies for MetalParameters {
    fn element(&self) -> &str {
        &self.element
    }

    fn charge_as_int(&self) -> i32 {
        self.charge
    }
}

impl fmt::Display for MetalParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.element.to_ascii_uppercase(), self.charge)
    }
}

#[derive(Debug, Clone)]
struct MetalEntry {
    element: ElementRow,
    charge: i32,
    ligands: Option<LigandRow>,
    assembled: OnceLock<MetalParameters>,
}

impl MetalEntry {
    fn assemble(&self) -> MetalParameters {
        let lists = |select: fn(&LigandRow) -> &str| {
            self.ligands
                .as_ref()
                .and_then(|row| sentinel_list(select(row)))
        };
        MetalParameters {
            element: self.element.element.clone(),
            charge: self.charge,
            vec_sum_cutoff: self.element.vec_sum_cutoff,
            coord_num_lower: self.element.coord_num_lower,
            coord_num_upper: self.element.coord_num_upper,
            min_coordinating_non_waters: self.element.min_coordinating_non_waters,
            cvbs_lower: self.element.cvbs_lower,
            cvbs_upper: self.element.cvbs_upper,
            cvbs_expected: self.element.cvbs_expected,
            allowed_coordinating_atoms: lists(|r| r.allowed_coordinating_atoms.as_str()),
            allowed_coordinating_residues: lists(|r| r.allowed_coordinating_residues.as_str()),
            allowed_geometries: lists(|r| r.allowed_geometries.as_str()),
            allowed_backbone_atoms: lists(|r| r.allowed_backbone_atoms.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("Parameter file not found: '{path}'")]
    MissingFile { path: String },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Ligand constraints given for '{0}', which has no element entry")]
    LigandWithoutElement(String),
    #[error("Duplicate element entry for '{0}'")]
    DuplicateElement(String),
    #[error("Element '{0}' has no expected charge")]
    InvalidCharge(String),
}

/// Bond-valence constants and per-metal coordination constraints.
///
/// The table never changes after construction. Metal parameter records are
/// assembled on first request and cached, so [`get_metal_parameters`]
/// returns the same reference for every call with the same element.
///
/// [`get_metal_parameters`]: IonParameters::get_metal_parameters
#[derive(Debug, Clone)]
pub struct IonParameters {
    valence: Vec<ValenceRow>,
    ion_symbols: HashSet<String>,
    donor_symbols: HashSet<String>,
    metals: Vec<MetalEntry>,
    metal_index: HashMap<String, usize>,
}

impl IonParameters {
    /// Parses the parameter table shipped with this crate.
    pub fn bundled() -> Result<Self, ParamLoadError> {
        Self::parse(BUNDLED_PARAMETERS, BUNDLED_LABEL)
    }

    /// Loads a TOML parameter file.
    ///
    /// # Errors
    ///
    /// Returns `ParamLoadError::MissingFile` if `path` is not a file,
    /// `ParamLoadError::Io` if it cannot be read, `ParamLoadError::Toml` if
    /// it is malformed, and a consistency error if its tables disagree.
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = read_source(path)?;
        Self::parse(&content, &path.to_string_lossy())
    }

    /// Loads element and ligand tables from a TOML file and the bond-valence
    /// rows from a CSV file with the `lib_valence` column names. Valence rows
    /// in the TOML file are ignored.
    pub fn load_with_valence_csv(toml_path: &Path, csv_path: &Path) -> Result<Self, ParamLoadError> {
        Self::load(toml_path)?.with_valence_csv(csv_path)
    }

    /// Replaces the bond-valence rows with those of a CSV file, keeping the
    /// element and ligand tables.
    pub fn with_valence_csv(self, csv_path: &Path) -> Result<Self, ParamLoadError> {
        let rows = load_valence_csv(csv_path)?;
        debug!(
            "Loaded {} bond-valence rows from '{}'",
            rows.len(),
            csv_path.display()
        );
        Ok(self.with_valence_rows(rows))
    }

    fn with_valence_rows(mut self, rows: Vec<ValenceRow>) -> Self {
        self.valence = rows
            .into_iter()
            .map(|row| ValenceRow {
                atom_symbol: normalize_element(&row.atom_symbol),
                donor_symbol: normalize_element(&row.donor_symbol),
                ..row
            })
            .collect();
        self.ion_symbols = self.valence.iter().map(|r| r.atom_symbol.clone()).collect();
        self.donor_symbols = self.valence.iter().map(|r| r.donor_symbol.clone()).collect();
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ParamLoadError> {
        Self::parse(content, "<memory>")
    }

    fn parse(content: &str, label: &str) -> Result<Self, ParamLoadError> {
        let file = parse_file(content, label)?;
        Self::from_parts(file.lib_valence, file.lib_elems, file.lib_ligands)
    }

    fn from_parts(
        valence: Vec<ValenceRow>,
        elements: Vec<ElementRow>,
        ligands: Vec<LigandRow>,
    ) -> Result<Self, ParamLoadError> {
        let mut ligand_rows: HashMap<String, LigandRow> = HashMap::new();
        for row in ligands {
            ligand_rows.insert(normalize_element(&row.element), row);
        }

        let mut metals = Vec::with_capacity(elements.len());
        let mut metal_index = HashMap::new();
        for mut row in elements {
            let symbol = normalize_element(&row.element);
            if metal_index.contains_key(&symbol) {
                return Err(ParamLoadError::DuplicateElement(symbol));
            }
            let charge = row
                .charge
                .ok_or_else(|| ParamLoadError::InvalidCharge(symbol.clone()))?;
            row.element = symbol.clone();
            metal_index.insert(symbol.clone(), metals.len());
            metals.push(MetalEntry {
                element: row,
                charge,
                ligands: ligand_rows.remove(&symbol),
                assembled: OnceLock::new(),
            });
        }
        if let Some(orphan) = ligand_rows.into_keys().min() {
            return Err(ParamLoadError::LigandWithoutElement(orphan));
        }

        debug!(
            "Loaded {} bond-valence rows and {} metal entries",
            valence.len(),
            metals.len()
        );
        let table = Self {
            valence: Vec::new(),
            ion_symbols: HashSet::new(),
            donor_symbols: HashSet::new(),
            metals,
            metal_index,
        };
        Ok(table.with_valence_rows(valence))
    }

    /// Whether `symbol` appears as an ion in the bond-valence table.
    pub fn is_supported_element(&self, symbol: &str) -> bool {
        self.ion_symbols.contains(&normalize_element(symbol))
    }

    /// Whether `symbol` appears as a donor in the bond-valence table.
    pub fn is_supported_donor(&self, symbol: &str) -> bool {
        self.donor_symbols.contains(&normalize_element(symbol))
    }

    /// Returns `(r0, b)` for the exact (element, charge) pair of ion and donor.
    pub fn get_valence_params(
        &self,
        ion: &impl ChargedSpecies,
        donor: &impl ChargedSpecies,
    ) -> Option<(f64, f64)> {
        let ion_element = normalize_element(ion.element());
        let donor_element = normalize_element(donor.element());
        let (ion_charge, donor_charge) = (ion.charge_as_int(), donor.charge_as_int());
        self.valence
            .iter()
            .find(|row| {
                row.atom_symbol == ion_element
                    && row.atom_charge == ion_charge
                    && row.donor_symbol == donor_element
                    && row.donor_charge == donor_charge
            })
            .map(|row| (row.value, row.b))
    }

    /// Returns the coordination constraints for a metal, case-insensitively.
    pub fn get_metal_parameters(&self, element: &str) -> Option<&MetalParameters> {
        let index = *self.metal_index.get(&normalize_element(element))?;
        let entry = &self.metals[index];
        Some(entry.assembled.get_or_init(|| {
            debug!("Assembling metal parameters for {}", entry.element.element);
            entry.assemble()
        }))
    }

    /// Elements with metal parameters, in table order.
    pub fn metal_elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.metals.iter().map(|m| m.element.element.as_str())
    }

    pub fn valence_rows(&self) -> &[ValenceRow] {
        &self.valence
    }
}

fn read_source(path: &Path) -> Result<String, ParamLoadError> {
    if !path.is_file() {
        return Err(ParamLoadError::MissingFile {
            path: path.to_string_lossy().to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn parse_file(content: &str, label: &str) -> Result<ParameterFile, ParamLoadError> {
    toml::from_str(content).map_err(|e| ParamLoadError::Toml {
        path: label.to_string(),
        source: e,
    })
}

fn load_valence_csv(path: &Path) -> Result<Vec<ValenceRow>, ParamLoadError> {
    if !path.is_file() {
        return Err(ParamLoadError::MissingFile {
            path: path.to_string_lossy().to_string(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<ValenceRow>() {
        let row = result.map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ions::species::AtomGuess;
    use std::fs;
    use tempfile::tempdir;

    const SMALL_TABLE: &str = r#"
        [[lib_valence]]
        atom_symbol = "ZN"
        atom_charge = 2
        donor_symbol = "O"
        donor_charge = -2
        value = 1.704

        [[lib_valence]]
        atom_symbol = "ZN"
        atom_charge = 2
        donor_symbol = "N"
        donor_charge = -3
        value = 1.77
        b = 0.40

        [[lib_elems]]
        element = "ZN"
        charge = 2
        vec_sum_cutoff = 0.75
        coord_num_lower = 4
        coord_num_upper = 6
        min_coordinating_non_waters = 1
        cvbs_lower = 1.7
        cvbs_upper = 2.3
        cvbs_expected = 2.0

        [[lib_elems]]
        element = "Na"
        charge = 1
        vec_sum_cutoff = "."
        coord_num_lower = 4
        coord_num_upper = 8
        min_coordinating_non_waters = "."
        cvbs_lower = 0.6
        cvbs_upper = 1.5
        cvbs_expected = 1.0

        [[lib_ligands]]
        element = "ZN"
        allowed_coordinating_atoms = "O,N,S"
        allowed_coordinating_residues = "."
        allowed_geometries = "tetrahedral, square_pyramidal,octahedral"
        allowed_backbone_atoms = "O"
    "#;

    fn guess(element: &str, charge: i32) -> AtomGuess {
        AtomGuess {
            element: element.to_string(),
            charge,
        }
    }

    #[test]
    fn from_toml_str_parses_all_tables() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        assert_eq!(params.valence_rows().len(), 2);
        assert_eq!(params.metal_elements().collect::<Vec<_>>(), vec!["ZN", "NA"]);
    }

    #[test]
    fn supported_symbols_come_from_valence_table() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        assert!(params.is_supported_element("ZN"));
        assert!(params.is_supported_element(" zn"));
        assert!(!params.is_supported_element("NA"));
        assert!(params.is_supported_donor("O"));
        assert!(params.is_supported_donor("N"));
        assert!(!params.is_supported_donor("S"));
    }

    #[test]
    fn get_valence_params_requires_exact_charges() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        assert_eq!(
            params.get_valence_params(&guess("ZN", 2), &guess("O", -2)),
            Some((1.704, DEFAULT_BOND_SOFTNESS))
        );
        assert_eq!(
            params.get_valence_params(&guess("ZN", 2), &guess("N", -3)),
            Some((1.77, 0.40))
        );
        assert_eq!(params.get_valence_params(&guess("ZN", 1), &guess("O", -2)), None);
        assert_eq!(params.get_valence_params(&guess("ZN", 2), &guess("O", 0)), None);
        assert_eq!(params.get_valence_params(&guess("CA", 2), &guess("O", -2)), None);
    }

    #[test]
    fn get_metal_parameters_handles_sentinels_and_lists() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        let zn = params.get_metal_parameters("zn").unwrap();
        assert_eq!(zn.charge, 2);
        assert_eq!(zn.vec_sum_cutoff, Some(0.75));
        assert_eq!(zn.coord_num_upper, Some(6));
        assert_eq!(
            zn.allowed_coordinating_atoms,
            Some(vec!["O".to_string(), "N".to_string(), "S".to_string()])
        );
        assert_eq!(zn.allowed_coordinating_residues, None);
        assert_eq!(
            zn.allowed_geometries.as_deref(),
            Some(&["tetrahedral".to_string(), "square_pyramidal".to_string(), "octahedral".to_string()][..])
        );

        let na = params.get_metal_parameters("NA").unwrap();
        assert_eq!(na.vec_sum_cutoff, None);
        assert_eq!(na.min_coordinating_non_waters, None);
        assert_eq!(na.allowed_coordinating_atoms, None);
    }

    #[test]
    fn get_metal_parameters_returns_identical_reference() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        let first = params.get_metal_parameters("ZN").unwrap();
        let second = params.get_metal_parameters("Zn").unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn get_metal_parameters_returns_none_for_unknown_element() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        assert!(params.get_metal_parameters("HG").is_none());
    }

    #[test]
    fn metal_parameters_display_and_scattering_type() {
        let params = IonParameters::from_toml_str(SMALL_TABLE).unwrap();
        let zn = params.get_metal_parameters("ZN").unwrap();
        assert_eq!(zn.to_string(), "ZN+2");
        assert_eq!(zn.scattering_type(), "ZN2+");
        assert_eq!(params.get_metal_parameters("NA").unwrap().scattering_type(), "NA1+");
    }

    #[test]
    fn invalid_sentinel_text_is_rejected() {
        let content = SMALL_TABLE.replace("vec_sum_cutoff = \".\"", "vec_sum_cutoff = \"none\"");
        let result = IonParameters::from_toml_str(&content);
        assert!(matches!(result, Err(ParamLoadError::Toml { .. })));
    }

    #[test]
    fn missing_charge_is_rejected() {
        let content = SMALL_TABLE.replace("charge = 1\n", "charge = \".\"\n");
        let result = IonParameters::from_toml_str(&content);
        assert!(matches!(result, Err(ParamLoadError::InvalidCharge(e)) if e == "NA"));
    }

    #[test]
    fn orphan_ligand_rows_are_rejected() {
        let content = format!(
            "{}\n{}",
            SMALL_TABLE,
            r#"
            [[lib_ligands]]
            element = "CU"
            allowed_coordinating_atoms = "."
            allowed_coordinating_residues = "."
            allowed_geometries = "."
            allowed_backbone_atoms = "."
            "#
        );
        let result = IonParameters::from_toml_str(&content);
        assert!(matches!(result, Err(ParamLoadError::LigandWithoutElement(e)) if e == "CU"));
    }

    #[test]
    fn duplicate_elements_are_rejected() {
        let content = SMALL_TABLE.replace("element = \"Na\"", "element = \"zn\"");
        let result = IonParameters::from_toml_str(&content);
        assert!(matches!(result, Err(ParamLoadError::DuplicateElement(e)) if e == "ZN"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ions.toml");
        fs::write(&path, SMALL_TABLE).unwrap();
        let params = IonParameters::load(&path).unwrap();
        assert!(params.get_metal_parameters("ZN").is_some());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = IonParameters::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ParamLoadError::MissingFile { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not toml").unwrap();
        assert!(matches!(
            IonParameters::load(&path),
            Err(ParamLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_with_valence_csv_replaces_valence_rows() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("ions.toml");
        let csv_path = dir.path().join("valence.csv");
        fs::write(&toml_path, SMALL_TABLE).unwrap();
        fs::write(
            &csv_path,
            "atom_symbol,atom_charge,donor_symbol,donor_charge,value\nNA,1,O,-2,1.803\n",
        )
        .unwrap();

        let params = IonParameters::load_with_valence_csv(&toml_path, &csv_path).unwrap();
        assert_eq!(params.valence_rows().len(), 1);
        assert!(params.is_supported_element("NA"));
        assert!(!params.is_supported_element("ZN"));
        assert_eq!(
            params.get_valence_params(&guess("NA", 1), &guess("O", -2)),
            Some((1.803, DEFAULT_BOND_SOFTNESS))
        );
    }

    #[test]
    fn load_with_valence_csv_fails_for_malformed_csv() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("ions.toml");
        let csv_path = dir.path().join("valence.csv");
        fs::write(&toml_path, SMALL_TABLE).unwrap();
        fs::write(&csv_path, "atom_symbol,atom_charge\nNA,one\n").unwrap();

        let result = IonParameters::load_with_valence_csv(&toml_path, &csv_path);
        assert!(matches!(result, Err(ParamLoadError::Csv { .. })));
    }

    #[test]
    fn bundled_table_loads_and_covers_common_metals() {
        let params = IonParameters::bundled().unwrap();
        for element in ["MG", "CA", "ZN", "NA", "K"] {
            assert!(params.get_metal_parameters(element).is_some(), "{element}");
            assert!(params.is_supported_element(element), "{element}");
        }
        assert!(params.is_supported_donor("O"));
    }
}
