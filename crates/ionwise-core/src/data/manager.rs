use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataManagerError {
    #[error("No model named '{0}' has been loaded")]
    UnknownModel(String),
    #[error("No default model is set")]
    NoDefaultModel,
    #[error("Expected {expected} model(s){}, found {found}", count_qualifier(.exact))]
    ModelCount {
        expected: usize,
        found: usize,
        exact: bool,
    },
}

fn count_qualifier(exact: &bool) -> &'static str {
    if *exact { " exactly" } else { " or more" }
}

/// Named models in load order, one of which is the default.
#[derive(Debug, Clone)]
pub struct ModelDataManager<M> {
    models: IndexMap<String, M>,
    default_name: Option<String>,
}

impl<M> Default for ModelDataManager<M> {
    fn default() -> Self {
        Self {
            models: IndexMap::new(),
            default_name: None,
        }
    }
}

impl<M> ModelDataManager<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `model` under `name`, replacing any model of the same name in
    /// place. The first model added becomes the default.
    pub fn add_model(&mut self, name: &str, model: M) {
        if self.models.insert(name.to_string(), model).is_some() {
            debug!("Replaced model '{}'", name);
        }
        if self.default_name.is_none() {
            self.default_name = Some(name.to_string());
        }
    }

    pub fn set_default_model(&mut self, name: &str) -> Result<(), DataManagerError> {
        if !self.models.contains_key(name) {
            return Err(DataManagerError::UnknownModel(name.to_string()));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// Returns the named model, or the default model for `None`.
    pub fn get_model(&self, name: Option<&str>) -> Result<&M, DataManagerError> {
        let name = match name {
            Some(name) => name,
            None => self
                .default_name
                .as_deref()
                .ok_or(DataManagerError::NoDefaultModel)?,
        };
        self.models
            .get(name)
            .ok_or_else(|| DataManagerError::UnknownModel(name.to_string()))
    }

    pub fn get_model_mut(&mut self, name: Option<&str>) -> Result<&mut M, DataManagerError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self
                .default_name
                .clone()
                .ok_or(DataManagerError::NoDefaultModel)?,
        };
        self.models
            .get_mut(&name)
            .ok_or(DataManagerError::UnknownModel(name))
    }

    pub fn get_model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn get_default_model_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Removes and returns a model. When it was the default, the earliest
    /// remaining model becomes the default.
    pub fn remove_model(&mut self, name: &str) -> Result<M, DataManagerError> {
        let model = self
            .models
            .shift_remove(name)
            .ok_or_else(|| DataManagerError::UnknownModel(name.to_string()))?;
        if self.default_name.as_deref() == Some(name) {
            self.default_name = self.models.keys().next().cloned();
        }
        Ok(model)
    }

    /// Whether at least `expected_n` models are loaded, or exactly
    /// `expected_n` when `exact_count` is set.
    pub fn has_models(&self, expected_n: usize, exact_count: bool) -> bool {
        if exact_count {
            self.models.len() == expected_n
        } else {
            self.models.len() >= expected_n
        }
    }

    /// Like [`has_models`](Self::has_models), but reports a mismatch as an error.
    pub fn require_models(&self, expected_n: usize, exact_count: bool) -> Result<(), DataManagerError> {
        if self.has_models(expected_n, exact_count) {
            Ok(())
        } else {
            Err(DataManagerError::ModelCount {
                expected: expected_n,
                found: self.models.len(),
                exact: exact_count,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models with their names, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> + '_ {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ModelDataManager<u32> {
        let mut dm = ModelDataManager::new();
        dm.add_model("a.pdb", 1);
        dm.add_model("b.pdb", 2);
        dm.add_model("c.pdb", 3);
        dm
    }

    #[test]
    fn first_model_becomes_default() {
        let dm = manager();
        assert_eq!(dm.get_default_model_name(), Some("a.pdb"));
        assert_eq!(dm.get_model(None), Ok(&1));
        assert_eq!(dm.get_model_names(), vec!["a.pdb", "b.pdb", "c.pdb"]);
    }

    #[test]
    fn get_model_fails_for_unknown_name() {
        let dm = manager();
        assert_eq!(
            dm.get_model(Some("x.pdb")),
            Err(DataManagerError::UnknownModel("x.pdb".to_string()))
        );
    }

    #[test]
    fn get_model_fails_without_default() {
        let dm: ModelDataManager<u32> = ModelDataManager::new();
        assert_eq!(dm.get_model(None), Err(DataManagerError::NoDefaultModel));
        assert!(dm.is_empty());
    }

    #[test]
    fn set_default_model_requires_known_name() {
        let mut dm = manager();
        dm.set_default_model("b.pdb").unwrap();
        assert_eq!(dm.get_model(None), Ok(&2));
        assert!(dm.set_default_model("x.pdb").is_err());
        assert_eq!(dm.get_default_model_name(), Some("b.pdb"));
    }

    #[test]
    fn adding_existing_name_replaces_in_place() {
        let mut dm = manager();
        dm.add_model("b.pdb", 20);
        assert_eq!(dm.len(), 3);
        assert_eq!(dm.get_model_names(), vec!["a.pdb", "b.pdb", "c.pdb"]);
        assert_eq!(dm.get_model(Some("b.pdb")), Ok(&20));
    }

    #[test]
    fn get_model_mut_edits_default_model() {
        let mut dm = manager();
        *dm.get_model_mut(None).unwrap() += 10;
        assert_eq!(dm.get_model(Some("a.pdb")), Ok(&11));
    }

    #[test]
    fn removing_default_promotes_first_remaining_model() {
        let mut dm = manager();
        dm.set_default_model("b.pdb").unwrap();
        assert_eq!(dm.remove_model("b.pdb"), Ok(2));
        assert_eq!(dm.get_default_model_name(), Some("a.pdb"));
        assert_eq!(dm.get_model_names(), vec!["a.pdb", "c.pdb"]);

        dm.remove_model("a.pdb").unwrap();
        dm.remove_model("c.pdb").unwrap();
        assert_eq!(dm.get_default_model_name(), None);
        assert!(dm.remove_model("c.pdb").is_err());
    }

    #[test]
    fn removing_other_model_keeps_default() {
        let mut dm = manager();
        dm.remove_model("c.pdb").unwrap();
        assert_eq!(dm.get_default_model_name(), Some("a.pdb"));
    }

    #[test]
    fn has_models_checks_minimum_or_exact_count() {
        let dm = manager();
        assert!(dm.has_models(1, false));
        assert!(dm.has_models(3, false));
        assert!(!dm.has_models(4, false));
        assert!(dm.has_models(3, true));
        assert!(!dm.has_models(2, true));
    }

    #[test]
    fn require_models_reports_count_mismatch() {
        let dm = manager();
        assert!(dm.require_models(2, false).is_ok());
        let err = dm.require_models(1, true).unwrap_err();
        assert_eq!(
            err,
            DataManagerError::ModelCount {
                expected: 1,
                found: 3,
                exact: true
            }
        );
        assert_eq!(err.to_string(), "Expected 1 model(s) exactly, found 3");
    }
}
