use std::fmt;

use crate::event::LogEvent;

/// A built transform, ready to be driven by a pipeline.
pub enum Transform {
    Function(Box<dyn FunctionTransform>),
}

impl Transform {
    /// Create a new function transform.
    ///
    /// These functions are "stateless" and can be run in parallel, without
    /// regard for coordination.
    pub fn function(v: impl FunctionTransform + 'static) -> Self {
        Transform::Function(Box::new(v))
    }

    /// Runs a single event through the transform, appending whatever it
    /// produces to `output`.
    pub fn transform(&mut self, output: &mut OutputBuffer, event: LogEvent) {
        match self {
            Transform::Function(function) => function.transform(output, event),
        }
    }
}

/// Transforms that are simple, and don't require attention to coordination.
/// You can run them as simple functions over events in any order.
///
/// The event is moved in: a transform either hands it on, replaces it with
/// new events, or drops it. It is never re-emitted behind the transform's
/// back.
pub trait FunctionTransform: Send + dyn_clone::DynClone + Sync {
    fn transform(&mut self, output: &mut OutputBuffer, event: LogEvent);
}

dyn_clone::clone_trait_object!(FunctionTransform);

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Function(_) => f.write_str("Transform::Function(..)"),
        }
    }
}

/// Ordered collection of the events a transform produced for one input.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputBuffer(Vec<LogEvent>);

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, event: LogEvent) {
        self.0.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&LogEvent> {
        self.0.first()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LogEvent> + '_ {
        self.0.drain(..)
    }

    pub fn into_events(self) -> impl Iterator<Item = LogEvent> {
        self.0.into_iter()
    }
}

impl From<Vec<LogEvent>> for OutputBuffer {
    fn from(events: Vec<LogEvent>) -> Self {
        Self(events)
    }
}
