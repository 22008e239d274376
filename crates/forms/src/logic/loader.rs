//! Form definition loading
//!
//! Reads YAML form definitions, checks their integrity and resolves the
//! declared validator against the registry. Loading is a pure read; a
//! malformed definition fails with a parse error propagated to the caller.

use std::path::Path;
use std::sync::Arc;

use shared::error::CommonError;
use tracing::debug;

use crate::logic::validate::{ArgumentValidator, PassthroughValidator, ValidatorRegistry};
use crate::types::{FormDefinition, PIPELINE_CHOICE_FIELD};

/// A definition paired with its resolved validator.
pub struct LoadedForm {
    pub definition: FormDefinition,
    pub validator: Arc<dyn ArgumentValidator>,
}

impl std::fmt::Debug for LoadedForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedForm")
            .field("definition", &self.definition)
            .field("validator", &self.validator.name())
            .finish()
    }
}

impl FormDefinition {
    pub fn from_str(yaml: &str) -> Result<Self, CommonError> {
        let definition: FormDefinition =
            serde_yaml::from_str(yaml).map_err(|e| CommonError::InvalidRequest {
                msg: format!("malformed form definition: {e}"),
                source: Some(e.into()),
            })?;
        definition.check()?;
        Ok(definition)
    }

    pub fn from_path(path: &Path) -> Result<Self, CommonError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_str(&yaml).map_err(|e| CommonError::InvalidRequest {
            msg: format!("{}: {}", path.display(), e.detail()),
            source: Some(e.into()),
        })
    }

    /// Integrity checks beyond YAML shape: field names must be unique, and
    /// the synthetic pipeline chooser name is reserved when the form
    /// declares a pipeline choice list.
    fn check(&self) -> Result<(), CommonError> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.blocks {
            if !seen.insert(field.name.as_str()) {
                return Err(CommonError::InvalidRequest {
                    msg: format!(
                        "form '{}': duplicate field name '{}'",
                        self.name, field.name
                    ),
                    source: None,
                });
            }
        }
        if self.pipeline_choices().is_some() && seen.contains(PIPELINE_CHOICE_FIELD) {
            return Err(CommonError::InvalidRequest {
                msg: format!(
                    "form '{}': field name '{PIPELINE_CHOICE_FIELD}' is reserved for the pipeline chooser",
                    self.name
                ),
                source: None,
            });
        }
        Ok(())
    }
}

/// Load one definition and resolve its validator.
pub fn load_form(path: &Path, registry: &ValidatorRegistry) -> Result<LoadedForm, CommonError> {
    let definition = FormDefinition::from_path(path)?;
    let validator = match &definition.validate_args_func {
        Some(name) => registry.get(name).ok_or_else(|| CommonError::NotFound {
            msg: format!(
                "form '{}': unknown validator '{name}'",
                definition.name
            ),
            lookup_id: name.clone(),
            source: None,
        })?,
        None => Arc::new(PassthroughValidator),
    };
    debug!(form = %definition.name, path = %path.display(), "Loaded form definition");
    Ok(LoadedForm {
        definition,
        validator,
    })
}

/// Load every `*.yaml`/`*.yml` definition in a directory, in file-name
/// order. Manual forms are included; command registration filters them.
pub fn load_forms_dir(
    dir: &Path,
    registry: &ValidatorRegistry,
) -> Result<Vec<LoadedForm>, CommonError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| load_form(path, registry))
        .collect()
}
