pub use log_event::LogEvent;
pub use value::Value;

mod log_event;
mod value;

/// Field names of an event.
pub type KeyString = String;

/// The ordered field map backing an event and every nested object.
pub type ObjectMap = indexmap::IndexMap<KeyString, Value>;

/// Name of the field holding an event's status tags.
pub const TAGS_KEY: &str = "tags";
