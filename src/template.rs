//! Functionality for managing template fields used by the transforms.
use std::{borrow::Cow, convert::TryFrom, fmt, hash::Hash, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::event::LogEvent;

static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(?P<key>[^\}]+)\}\}").unwrap());

/// Errors raised whilst parsing a Template field.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum TemplateParseError {
    #[snafu(display("Invalid field reference in template {:?}", path))]
    InvalidPathSyntax { path: String },
}

/// Errors raised whilst rendering a Template.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum TemplateRenderingError {
    #[snafu(display("Missing fields on event: {:?}", missing_keys))]
    MissingKeys { missing_keys: Vec<String> },
}

/// A templated field.
///
/// Components can be configured so that part of their behaviour is decided per
/// event. A template is either a fixed string such as `message`, or a string
/// referring to other fields of the event such as `{{ kind }}_list`, where
/// `{{ kind }}` is replaced by the value of the event's `kind` field when the
/// template is rendered.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    src: String,

    #[serde(skip)]
    parts: Vec<Part>,

    #[serde(skip)]
    is_static: bool,

    #[serde(skip)]
    reserve_size: usize,
}

impl TryFrom<&str> for Template {
    type Error = TemplateParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Template::try_from(Cow::Borrowed(src))
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Template::try_from(Cow::Owned(src))
    }
}

impl TryFrom<Cow<'_, str>> for Template {
    type Error = TemplateParseError;

    fn try_from(src: Cow<'_, str>) -> Result<Self, Self::Error> {
        parse_template(&src).map(|parts| {
            let is_static =
                parts.is_empty() || (parts.len() == 1 && matches!(parts[0], Part::Literal(..)));

            // A starting capacity for the rendered string. References are
            // assumed to contribute at least one byte each.
            let reserve_size = parts
                .iter()
                .map(|part| match part {
                    Part::Literal(lit) => lit.len(),
                    Part::Reference(_) => 1,
                })
                .sum();

            Template {
                parts,
                src: src.into_owned(),
                is_static,
                reserve_size,
            }
        })
    }
}

impl From<Template> for String {
    fn from(template: Template) -> String {
        template.src
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.src.fmt(f)
    }
}

impl Template {
    /// Renders the given template with data from the event.
    pub fn render_string(&self, event: &LogEvent) -> Result<String, TemplateRenderingError> {
        if self.is_static {
            Ok(self.src.clone())
        } else {
            self.render_event(event)
        }
    }

    fn render_event(&self, event: &LogEvent) -> Result<String, TemplateRenderingError> {
        let mut missing_keys = Vec::new();
        let mut out = String::with_capacity(self.reserve_size);
        for part in &self.parts {
            match part {
                Part::Literal(lit) => out.push_str(lit),
                Part::Reference(key) => match event.get(key) {
                    Some(value) if !value.is_null() => out.push_str(&value.to_string_lossy()),
                    _ => missing_keys.push(key.to_owned()),
                },
            }
        }
        if missing_keys.is_empty() {
            Ok(out)
        } else {
            Err(TemplateRenderingError::MissingKeys { missing_keys })
        }
    }

    /// Returns a reference to the template string.
    pub fn get_ref(&self) -> &str {
        &self.src
    }
}

/// One part of the template string after parsing.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Part {
    /// A literal piece of text to be copied verbatim into the output.
    Literal(String),
    /// A reference to the source event, to be copied from the relevant field.
    Reference(String),
}

// Pre-parse the template string into a series of parts to be filled in at render time.
fn parse_template(src: &str) -> Result<Vec<Part>, TemplateParseError> {
    let mut last_end = 0;
    let mut parts = Vec::new();
    for cap in RE.captures_iter(src) {
        let all = cap.get(0).expect("Capture 0 is always defined");
        if all.start() > last_end {
            parts.push(Part::Literal(src[last_end..all.start()].to_string()));
        }

        let path = cap[1].trim().to_owned();
        if path.is_empty() || path.contains('{') {
            return Err(TemplateParseError::InvalidPathSyntax { path });
        }

        parts.push(Part::Reference(path));
        last_end = all.end();
    }
    if src.len() > last_end {
        parts.push(Part::Literal(src[last_end..].to_string()));
    }

    Ok(parts)
}

/// Renders `template` against `event`, falling back to the template's source
/// text when the event lacks a referenced field.
///
/// The failure is reported through [`crate::internal_events::TemplateRenderingError`]
/// and the caller carries on with the unrendered name, which in practice names
/// a field that does not exist.
pub fn render_or_source(template: &Template, event: &LogEvent) -> String {
    template.render_string(event).unwrap_or_else(|error| {
        emit!(crate::internal_events::TemplateRenderingError {
            error,
            field: Some(template.get_ref()),
        });
        template.get_ref().to_owned()
    })
}
