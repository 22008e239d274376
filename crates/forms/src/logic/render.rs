//! Modal rendering
//!
//! Turns a form definition into the Block Kit modal view Slack displays.
//! Rendering is deterministic: the same definition always yields the same
//! view, with one input block per declared field in declared order.

use serde_json::{Value, json};

use crate::types::{FieldSpec, FormDefinition, PIPELINE_CHOICE_FIELD, action_id};

/// Text shown after a submission is acknowledged. Slack enforces a 3 second
/// response deadline, while a pipeline submission can take longer; the
/// completion message arrives as a separate chat message.
pub const WORKING_TEXT: &str =
    "Sometimes this takes more than 3 seconds, so you might get a timeout error because of a \
     limitation in slack. You should however receive a message from the slackbot within 20 \
     seconds. If you do not, then something has gone wrong.";

/// Build the modal view for a form.
///
/// When the form declares a list of pipeline names, a synthetic chooser
/// select named `kfp_pipeline_name` is prepended to the declared fields.
pub fn build_modal_view(form: &FormDefinition) -> Value {
    let mut blocks = Vec::new();

    if let Some(choices) = form.pipeline_choices() {
        let choice_strings: Vec<String> = choices.iter().map(ToString::to_string).collect();
        blocks.push(build_static_select(
            PIPELINE_CHOICE_FIELD,
            "Kfp pipeline name",
            &choice_strings,
        ));
    }

    for field in &form.blocks {
        if field.is_select() {
            blocks.push(build_static_select(
                &field.name,
                &field.label(),
                &field.choice_strings(),
            ));
        } else {
            blocks.push(build_text_input(field));
        }
    }

    json!({
        "type": "modal",
        "callback_id": form.callback_id(),
        "title": plain_text(&form.title),
        "submit": plain_text("Submit"),
        "close": plain_text("Cancel"),
        "blocks": blocks,
    })
}

/// The interstitial modal shown while a submission runs in the background.
pub fn working_view(text: Option<&str>) -> Value {
    json!({
        "type": "modal",
        "callback_id": "view_1",
        "title": {"type": "plain_text", "text": "Working on it"},
        "blocks": [{
            "type": "section",
            "text": plain_text(text.unwrap_or(WORKING_TEXT)),
        }],
    })
}

fn build_static_select(name: &str, label: &str, choices: &[String]) -> Value {
    let options: Vec<Value> = choices
        .iter()
        .map(|choice| {
            json!({
                "text": plain_text(choice),
                "value": choice,
            })
        })
        .collect();

    json!({
        "type": "input",
        "block_id": name,
        "element": {
            "type": "static_select",
            "placeholder": plain_text("Select an item"),
            "options": options,
            "action_id": action_id(name),
        },
        "label": plain_text(label),
    })
}

fn build_text_input(field: &FieldSpec) -> Value {
    let mut element = json!({
        "type": "plain_text_input",
        "action_id": action_id(&field.name),
    });
    if let Some(hint) = &field.hint {
        element["placeholder"] = plain_text(hint);
    }
    if let Some(value) = &field.value {
        element["initial_value"] = Value::String(value.to_string());
    }

    let mut block = json!({
        "type": "input",
        "block_id": field.name,
        "element": element,
        "label": plain_text(&field.label()),
    });
    if let Some(optional) = field.optional {
        block["optional"] = Value::Bool(optional);
    }
    block
}

fn plain_text(text: impl AsRef<str>) -> Value {
    json!({"type": "plain_text", "text": text.as_ref(), "emoji": true})
}
