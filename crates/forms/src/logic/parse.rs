//! Submission parsing
//!
//! Reconstructs the raw field values from a submitted modal's state using
//! the form definition the modal was rendered from. Every declared field
//! must be present in the state: absence means the definition and the open
//! modal disagree, which is a configuration error surfaced at the submission
//! boundary, never a user-facing field error.

use shared::error::CommonError;
use slack::ViewState;

use crate::types::{FormDefinition, PIPELINE_CHOICE_FIELD, SubmissionValues, action_id};

/// Parse a submitted modal state into raw field values.
///
/// Yields one entry per declared field, in declared order, preceded by a
/// synthetic `kfp_pipeline_name` entry when the form declares a pipeline
/// choice list. Optional text inputs left empty parse as the empty string.
pub fn parse_submission(
    state: &ViewState,
    form: &FormDefinition,
) -> Result<SubmissionValues, CommonError> {
    let mut values = SubmissionValues::new();

    if form.pipeline_choices().is_some() {
        values.insert(
            PIPELINE_CHOICE_FIELD,
            selected_value(state, &form.name, PIPELINE_CHOICE_FIELD)?,
        );
    }

    for field in &form.blocks {
        let value = if field.is_select() {
            selected_value(state, &form.name, &field.name)?
        } else {
            text_value(state, &form.name, &field.name)?
        };
        values.insert(field.name.clone(), value);
    }

    Ok(values)
}

fn selected_value(state: &ViewState, form: &str, name: &str) -> Result<String, CommonError> {
    let block = state
        .block_value(name, &action_id(name))
        .ok_or_else(|| missing(form, name))?;
    block
        .selected_option
        .as_ref()
        .map(|option| option.value.clone())
        .ok_or_else(|| missing(form, name))
}

fn text_value(state: &ViewState, form: &str, name: &str) -> Result<String, CommonError> {
    let block = state
        .block_value(name, &action_id(name))
        .ok_or_else(|| missing(form, name))?;
    // null for an optional input left empty
    Ok(block.value.clone().unwrap_or_default())
}

fn missing(form: &str, name: &str) -> CommonError {
    CommonError::InvalidResponse {
        msg: format!("form '{form}': no submitted value for field '{name}'"),
        source: None,
    }
}
