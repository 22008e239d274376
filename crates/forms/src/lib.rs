//! Declarative Slack modal forms for pipeline submission.
//!
//! A form is described in YAML: a title, a slash command, a pipeline binding
//! and an ordered list of fields. This crate turns a definition into the
//! Block Kit modal Slack renders (`logic::render`), reconstructs the typed
//! field values from a submitted modal (`logic::parse`) and applies the
//! form's argument validator (`logic::validate`).
//!
//! A submission either fully validates (an `ArgumentMap` is forwarded to the
//! pipeline submitter) or fully fails (a non-empty `ErrorMap` is shown inline
//! and nothing is forwarded).

pub mod logic;
mod types;

pub use logic::loader::{LoadedForm, load_form, load_forms_dir};
pub use logic::validate::{
    ArgumentValidator, PassthroughValidator, PredictArgsValidator, TrainArgsValidator,
    ValidatorRegistry,
};
pub use types::{
    ArgumentMap, ErrorMap, FieldSpec, FormDefinition, KfpSection, PIPELINE_CHOICE_FIELD,
    PipelineName, Scalar, SubmissionValues, action_id,
};
