//! Form definition types
//!
//! The YAML shape of a form definition, plus the per-submission value
//! containers passed between parser, validator and submitter.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Synthetic field name used for the pipeline chooser that is prepended when
/// a form declares a list of pipeline names instead of a single one.
pub const PIPELINE_CHOICE_FIELD: &str = "kfp_pipeline_name";

/// Action id of the input element belonging to a field.
pub fn action_id(name: &str) -> String {
    format!("{name}-action")
}

/// One form definition, loaded from YAML. Immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub name: String,
    pub title: String,
    pub slash_command: String,
    /// Manual forms are not registered as slash commands.
    #[serde(default)]
    pub manual: bool,
    /// Channel the submission outcome is posted to; the submitter's DM when
    /// absent.
    #[serde(default)]
    pub channel: Option<String>,
    /// Name of a registered argument validator; passthrough when absent.
    #[serde(default)]
    pub validate_args_func: Option<String>,
    pub kfp: KfpSection,
    #[serde(default)]
    pub blocks: Vec<FieldSpec>,
}

impl FormDefinition {
    /// Callback id Slack hands back on modal submission.
    pub fn callback_id(&self) -> String {
        format!("{}_callback", self.name)
    }

    /// The pipeline chooser choices, when the form declares a list.
    pub fn pipeline_choices(&self) -> Option<&[Scalar]> {
        match &self.kfp.pipeline_name {
            PipelineName::Choices(choices) => Some(choices),
            PipelineName::Fixed(_) => None,
        }
    }

    pub fn experiment_name(&self) -> &str {
        self.kfp.experiment_name.as_deref().unwrap_or("Default")
    }
}

/// Pipeline binding of a form.
#[derive(Debug, Clone, Deserialize)]
pub struct KfpSection {
    pub pipeline_name: PipelineName,
    #[serde(default)]
    pub experiment_name: Option<String>,
}

/// A literal pipeline name, or a list the user picks from in the modal.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PipelineName {
    Fixed(String),
    Choices(Vec<Scalar>),
}

/// One field of a form. Presence of `choices` makes it a single-choice
/// select; otherwise it renders as a free-text input.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<Scalar>>,
    /// Placeholder text for free-text inputs.
    #[serde(default)]
    pub hint: Option<String>,
    /// Pre-filled value for free-text inputs.
    #[serde(default)]
    pub value: Option<Scalar>,
    #[serde(default)]
    pub optional: Option<bool>,
}

impl FieldSpec {
    pub fn is_select(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Human label: display name (or name), `_` replaced by spaces, first
    /// character uppercased and the rest lowercased.
    pub fn label(&self) -> String {
        let display = self.display_name.as_deref().unwrap_or(&self.name);
        capitalize(display).replace('_', " ")
    }

    pub fn choice_strings(&self) -> Vec<String> {
        self.choices
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Scalar::to_string)
            .collect()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// A YAML scalar: choices and default values may be written as strings,
/// numbers or booleans and are stringified for Slack.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Raw submitted values, one entry per declared field, in declared order.
/// Built fresh per submission and discarded after processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionValues {
    entries: Vec<(String, String)>,
}

impl SubmissionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SubmissionValues {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// Validated arguments forwarded to the pipeline submitter as run
/// parameters. Validators may coerce values, so entries are JSON values.
pub type ArgumentMap = serde_json::Map<String, serde_json::Value>;

/// Field-level validation errors, keyed by field name. Non-empty means the
/// submission is rejected and nothing is forwarded.
pub type ErrorMap = BTreeMap<String, String>;
