use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BdtModel, ModelError};

/// Prefix of every output column.
pub const OUTPUT_PREFIX: &str = "topTag";

/// Ordered variable and spectator names a model must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub variables: &'static [&'static str],
    pub spectators: &'static [&'static str],
}

impl FeatureSchema {
    /// Fail unless `model` declares exactly these names in this order.
    pub fn check(&self, name: &str, model: &BdtModel) -> Result<(), ModelError> {
        if !names_match(self.variables, &model.variables) {
            return Err(ModelError::SchemaMismatch {
                name: name.to_string(),
                expected: to_owned(self.variables),
                found: model.variables.clone(),
            });
        }
        if !names_match(self.spectators, &model.spectators) {
            return Err(ModelError::SpectatorMismatch {
                name: name.to_string(),
                expected: to_owned(self.spectators),
                found: model.spectators.clone(),
            });
        }
        Ok(())
    }
}

fn names_match(expected: &[&str], found: &[String]) -> bool {
    expected.len() == found.len() && expected.iter().zip(found).all(|(a, b)| *a == b)
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Configured model: name plus path relative to the deployment root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub path: PathBuf,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            path: PathBuf::from("data/top_ecfbdt_v8_BDT.weights.json"),
        }
    }
}

/// Loaded, schema-checked model and its output column.
#[derive(Debug, Clone)]
pub struct NamedModel {
    pub name: String,
    pub label: String,
    pub model: Arc<BdtModel>,
}

/// Immutable set of classifiers, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<NamedModel>,
}

impl ModelRegistry {
    /// Load every model in `specs` from `root` and check it against `schema`.
    pub fn load(root: &Path, specs: &[ModelSpec], schema: &FeatureSchema) -> Result<Self, ModelError> {
        let mut models = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = root.join(&spec.path);
            let model = BdtModel::load_json(&path)?;
            tracing::info!(
                model = %spec.name,
                path = %path.display(),
                trees = model.trees.len(),
                "loaded classifier"
            );
            models.push((spec.name.clone(), model));
        }
        Self::from_models(models, schema)
    }

    /// Build a registry from models already in memory. Every model is
    /// validated before it is accepted.
    pub fn from_models(
        models: impl IntoIterator<Item = (String, BdtModel)>,
        schema: &FeatureSchema,
    ) -> Result<Self, ModelError> {
        let mut out: Vec<NamedModel> = Vec::new();
        for (name, model) in models {
            if out.iter().any(|existing| existing.name == name) {
                return Err(ModelError::DuplicateName { name });
            }
            model
                .validate()
                .map_err(|reason| ModelError::Rejected {
                    name: name.clone(),
                    reason,
                })?;
            schema.check(&name, &model)?;
            out.push(NamedModel {
                label: format!("{OUTPUT_PREFIX}{name}"),
                name,
                model: Arc::new(model),
            });
        }
        Ok(Self { models: out })
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|named| named.label.as_str())
    }
}
