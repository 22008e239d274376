//! Argument validation
//!
//! A validator turns raw submitted values into the argument mapping handed
//! to the pipeline submitter, or a mapping of field-level errors shown
//! inline in the modal. The two outcomes are mutually exclusive: a non-empty
//! error map means nothing is forwarded and the form stays open.
//!
//! Validators are looked up from a registry that is built explicitly at
//! startup; form definitions referencing an unregistered validator fail to
//! load.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::types::{ArgumentMap, ErrorMap, SubmissionValues};

pub trait ArgumentValidator: Send + Sync {
    /// Name a form definition refers to via `validate_args_func`.
    fn name(&self) -> &str;

    /// Coercion failures must surface as field errors, never panics.
    fn validate(&self, values: &SubmissionValues) -> (ArgumentMap, ErrorMap);
}

/// Registry of argument validators, resolved against at form-load time.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn ArgumentValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the validators shipped with pipeform.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TrainArgsValidator));
        registry.register(Arc::new(PredictArgsValidator));
        registry
    }

    pub fn register(&mut self, validator: Arc<dyn ArgumentValidator>) {
        self.validators
            .insert(validator.name().to_string(), validator);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ArgumentValidator>> {
        self.validators.get(name).cloned()
    }
}

/// Default behavior when a form names no validator: every raw value is
/// forwarded unchanged.
pub struct PassthroughValidator;

impl ArgumentValidator for PassthroughValidator {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn validate(&self, values: &SubmissionValues) -> (ArgumentMap, ErrorMap) {
        let mut args = ArgumentMap::new();
        for (name, value) in values.iter() {
            args.insert(name.to_string(), Value::String(value.to_string()));
        }
        (args, ErrorMap::new())
    }
}

/// Validator for the training form: `dataset-id` must be one of the three
/// registered datasets and is coerced to an integer.
pub struct TrainArgsValidator;

const DATASET_ID_FIELD: &str = "dataset-id";
const DATASET_ID_ERROR: &str = "The value must be 1,2, or 3";

impl ArgumentValidator for TrainArgsValidator {
    fn name(&self) -> &str {
        "validate_train_args"
    }

    fn validate(&self, values: &SubmissionValues) -> (ArgumentMap, ErrorMap) {
        let mut args = ArgumentMap::new();
        let mut errors = ErrorMap::new();

        for (name, value) in values.iter() {
            if name == DATASET_ID_FIELD {
                match value.trim().parse::<i64>() {
                    Ok(id) if (1..=3).contains(&id) => {
                        args.insert(name.to_string(), Value::from(id));
                    }
                    _ => {
                        errors.insert(name.to_string(), DATASET_ID_ERROR.to_string());
                    }
                }
            } else {
                args.insert(name.to_string(), Value::String(value.to_string()));
            }
        }

        if values.get(DATASET_ID_FIELD).is_none() {
            errors.insert(DATASET_ID_FIELD.to_string(), DATASET_ID_ERROR.to_string());
        }

        (args, errors)
    }
}

/// Validator for the prediction form: accepts everything, forwards nothing.
pub struct PredictArgsValidator;

impl ArgumentValidator for PredictArgsValidator {
    fn name(&self) -> &str {
        "validate_predict_args"
    }

    fn validate(&self, _values: &SubmissionValues) -> (ArgumentMap, ErrorMap) {
        (ArgumentMap::new(), ErrorMap::new())
    }
}
