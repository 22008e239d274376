//! Routing table
//!
//! Maps slash commands and view callback ids to their forms. Built once by
//! an explicit startup routine and immutable afterwards; nothing is
//! registered as a side effect of loading.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use forms::{ArgumentValidator, FormDefinition, LoadedForm, ValidatorRegistry, load_forms_dir};
use shared::error::CommonError;
use tracing::info;

/// A form paired with its resolved validator.
pub struct FormRoute {
    pub definition: FormDefinition,
    pub validator: Arc<dyn ArgumentValidator>,
}

pub struct RoutingTable {
    by_command: HashMap<String, Arc<FormRoute>>,
    by_callback: HashMap<String, Arc<FormRoute>>,
}

impl RoutingTable {
    /// Load every definition in `forms_dir` and build the finalized table.
    pub fn build(forms_dir: &Path, registry: &ValidatorRegistry) -> Result<Self, CommonError> {
        let table = Self::from_forms(load_forms_dir(forms_dir, registry)?)?;
        info!(
            commands = table.by_command.len(),
            dir = %forms_dir.display(),
            "Built routing table"
        );
        Ok(table)
    }

    /// Build a table from already-loaded forms. `manual: true` definitions
    /// are excluded; duplicate commands or callback ids are startup errors.
    pub fn from_forms(forms: Vec<LoadedForm>) -> Result<Self, CommonError> {
        let mut by_command = HashMap::new();
        let mut by_callback = HashMap::new();

        for form in forms {
            if form.definition.manual {
                continue;
            }
            let command = form.definition.slash_command.clone();
            let callback = form.definition.callback_id();
            let route = Arc::new(FormRoute {
                definition: form.definition,
                validator: form.validator,
            });

            if by_command.insert(command.clone(), route.clone()).is_some() {
                return Err(duplicate("slash command", &command));
            }
            if by_callback.insert(callback.clone(), route).is_some() {
                return Err(duplicate("callback id", &callback));
            }
        }

        Ok(Self {
            by_command,
            by_callback,
        })
    }

    pub fn form_for_command(&self, command: &str) -> Option<Arc<FormRoute>> {
        self.by_command.get(command).cloned()
    }

    pub fn form_for_callback(&self, callback_id: &str) -> Option<Arc<FormRoute>> {
        self.by_callback.get(callback_id).cloned()
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.by_command.keys().map(String::as_str)
    }
}

fn duplicate(what: &str, value: &str) -> CommonError {
    CommonError::InvalidRequest {
        msg: format!("duplicate {what} '{value}' across form definitions"),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;
        use forms::PassthroughValidator;

        fn loaded(yaml: &str) -> LoadedForm {
            LoadedForm {
                definition: serde_yaml::from_str(yaml).unwrap(),
                validator: Arc::new(PassthroughValidator),
            }
        }

        const TRAIN: &str = "name: train\ntitle: T\nslash_command: /train\nkfp:\n  pipeline_name: p\n";

        #[test]
        fn test_routes_by_command_and_callback() {
            let table = RoutingTable::from_forms(vec![loaded(TRAIN)]).unwrap();
            assert!(table.form_for_command("/train").is_some());
            assert!(table.form_for_callback("train_callback").is_some());
            assert!(table.form_for_command("/predict").is_none());
        }

        #[test]
        fn test_manual_forms_are_not_registered() {
            let manual =
                "name: adhoc\ntitle: A\nslash_command: /adhoc\nmanual: true\nkfp:\n  pipeline_name: p\n";
            let table = RoutingTable::from_forms(vec![loaded(manual)]).unwrap();
            assert!(table.form_for_command("/adhoc").is_none());
            assert!(table.form_for_callback("adhoc_callback").is_none());
        }

        #[test]
        fn test_duplicate_command_is_a_startup_error() {
            let other = "name: train2\ntitle: T\nslash_command: /train\nkfp:\n  pipeline_name: p\n";
            let err = RoutingTable::from_forms(vec![loaded(TRAIN), loaded(other)]).unwrap_err();
            assert!(err.detail().contains("duplicate slash command"));
        }
    }
}
