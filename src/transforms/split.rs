use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::{
    config::{GenerateConfig, TransformConfig},
    event::{LogEvent, ObjectMap, Value},
    internal_events::{SplitEventsSent, SplitFieldTypeError},
    template::{render_or_source, Template},
    transforms::{FunctionTransform, OutputBuffer, Transform},
};

const DEFAULT_FIELD: &str = "message";
const DEFAULT_TERMINATOR: &str = "\n";

/// Tag appended to events whose field could not be split.
pub const PARSE_FAILURE_TAG: &str = "_splitparsefailure";

/// Configuration for the `split` transform.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
    /// The field whose value is split into separate events.
    ///
    /// May be a template such as `{{ kind }}`, which is rendered against the
    /// incoming event before it is split.
    #[serde(default = "default_field")]
    pub field: Template,

    /// The delimiter used to split a string value.
    #[serde(default = "default_terminator")]
    pub terminator: String,

    /// The field each split element is written to. Defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Template>,

    /// Merge object elements into the destination instead of replacing it.
    ///
    /// Without a distinct `target` the keys are merged into the root of the
    /// event; otherwise into the object already stored at `target`.
    #[serde(default)]
    pub merge_hash: bool,

    /// Remove `field` from the produced events.
    #[serde(default)]
    pub delete_field: bool,

    /// Tags added to an event whose field is neither a string nor an array.
    #[serde(default = "default_tag_on_failure")]
    pub tag_on_failure: Vec<String>,
}

fn default_field() -> Template {
    Template::try_from(DEFAULT_FIELD).expect("default field is a valid template")
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR.to_owned()
}

fn default_tag_on_failure() -> Vec<String> {
    vec![PARSE_FAILURE_TAG.to_owned()]
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            field: default_field(),
            terminator: default_terminator(),
            target: None,
            merge_hash: false,
            delete_field: false,
            tag_on_failure: default_tag_on_failure(),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("`terminator` must not be empty"))]
    EmptyTerminator,
    #[snafu(display("`tag_on_failure` must not contain empty tags"))]
    EmptyFailureTag,
}

impl SplitConfig {
    pub fn build_transform(&self) -> Result<Split, BuildError> {
        if self.terminator.is_empty() {
            return Err(BuildError::EmptyTerminator);
        }
        if self.tag_on_failure.iter().any(String::is_empty) {
            return Err(BuildError::EmptyFailureTag);
        }

        Ok(Split {
            field: self.field.clone(),
            target: self.target.clone(),
            terminator: self.terminator.clone(),
            merge_hash: self.merge_hash,
            delete_field: self.delete_field,
            tag_on_failure: self.tag_on_failure.clone(),
        })
    }
}

impl GenerateConfig for SplitConfig {
    fn generate_config() -> toml::Value {
        toml::Value::try_from(Self {
            field: Template::try_from("items").unwrap(),
            target: Some(Template::try_from("item").unwrap()),
            ..Self::default()
        })
        .unwrap()
    }
}

#[typetag::serde(name = "split")]
impl TransformConfig for SplitConfig {
    fn build(&self) -> crate::Result<Transform> {
        Ok(Transform::function(self.build_transform()?))
    }
}

/// Splits one event into one event per element of a string or array field.
#[derive(Clone, Debug)]
pub struct Split {
    field: Template,
    target: Option<Template>,
    terminator: String,
    merge_hash: bool,
    delete_field: bool,
    tag_on_failure: Vec<String>,
}

/// The field names an event is split on, rendered once from the unmodified
/// input event.
struct Fields {
    source: String,
    target: String,
}

impl Split {
    /// Splits `event`, returning the events that replace it in order.
    pub fn split_event(&self, event: LogEvent) -> Vec<LogEvent> {
        let mut output = OutputBuffer::default();
        self.split_into(&mut output, event);
        output.into_events().collect()
    }

    fn split_into(&self, output: &mut OutputBuffer, event: LogEvent) {
        let before = output.len();
        self.push_split(output, event);
        emit!(SplitEventsSent {
            count: output.len() - before,
        });
    }

    fn push_split(&self, output: &mut OutputBuffer, mut event: LogEvent) {
        let fields = self.resolve_fields(&event);

        let mut elements = match self.elements(event.get(&fields.source)) {
            Ok(elements) => elements,
            Err(field_type) => {
                emit!(SplitFieldTypeError {
                    field: &fields.source,
                    field_type,
                });
                for tag in &self.tag_on_failure {
                    event.add_tag(tag.as_str());
                }
                output.push(event);
                return;
            }
        };

        if elements.len() <= 1 {
            // Nothing to fan out: a single element is written in place and an
            // empty list leaves the event as it came in.
            if let Some(element) = elements.pop() {
                self.write_element(&mut event, &fields, element);
            }
            output.push(event);
            return;
        }

        for element in elements {
            let mut split = event.clone();
            self.write_element(&mut split, &fields, element);
            output.push(split);
        }
    }

    fn resolve_fields(&self, event: &LogEvent) -> Fields {
        let source = render_or_source(&self.field, event);
        let target = match &self.target {
            Some(target) => render_or_source(target, event),
            None => source.clone(),
        };
        Fields { source, target }
    }

    /// Returns the elements to split out of `value`, or the name of its type
    /// when it cannot be split.
    fn elements(&self, value: Option<&Value>) -> Result<Vec<Value>, &'static str> {
        match value {
            Some(Value::String(s)) => Ok(s
                .split(self.terminator.as_str())
                .map(Value::from)
                .collect()),
            Some(Value::Array(values)) => Ok(values
                .iter()
                .filter(|value| !is_blank(value))
                .cloned()
                .collect()),
            Some(
                value @ (Value::Integer(_)
                | Value::Float(_)
                | Value::Boolean(_)
                | Value::Object(_)
                | Value::Null),
            ) => Err(value.kind_str()),
            None => Err("absent"),
        }
    }

    fn write_element(&self, event: &mut LogEvent, fields: &Fields, element: Value) {
        let overwrote_source = match element {
            Value::Object(object) if self.merge_hash => {
                if fields.target == fields.source {
                    let overwrote_source = object.contains_key(&fields.source);
                    for (key, value) in object {
                        event.insert(key, value);
                    }
                    overwrote_source
                } else {
                    merge_into(event, &fields.target, object);
                    false
                }
            }
            element => {
                event.insert(fields.target.as_str(), element);
                fields.target == fields.source
            }
        };

        if self.delete_field && !overwrote_source {
            event.remove(&fields.source);
        }
    }
}

/// Array entries skipped before counting: nulls and empty strings.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Integer(_)
        | Value::Float(_)
        | Value::Boolean(_)
        | Value::Array(_)
        | Value::Object(_) => false,
    }
}

/// Merges `object` into the object stored at `key`. Keys from `object` win;
/// a missing or non-object destination is replaced by `object` itself.
fn merge_into(event: &mut LogEvent, key: &str, object: ObjectMap) {
    match event.get_mut(key) {
        Some(Value::Object(existing)) => existing.extend(object),
        _ => {
            event.insert(key, Value::Object(object));
        }
    }
}

impl FunctionTransform for Split {
    fn transform(&mut self, output: &mut OutputBuffer, event: LogEvent) {
        self.split_into(output, event);
    }
}
