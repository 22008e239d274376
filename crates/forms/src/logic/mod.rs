//! Logic module for forms
//!
//! Contains:
//! - loader: YAML definition loading and integrity checks
//! - render: definition -> Block Kit modal view
//! - parse: submitted modal state -> SubmissionValues
//! - validate: argument validator trait, registry and built-ins

pub mod loader;
pub mod parse;
pub mod render;
pub mod validate;
