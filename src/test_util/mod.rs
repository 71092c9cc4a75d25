#![allow(missing_docs)]
use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex},
};

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde::de::DeserializeOwned;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, prelude::*, Layer};

use crate::config::GenerateConfig;

/// Checks that a component's generated example config deserializes back into
/// the component's config type.
pub fn test_generate_config<T>()
where
    T: GenerateConfig + DeserializeOwned,
{
    let cfg = toml::to_string(&T::generate_config()).unwrap();

    toml::from_str::<T>(&cfg)
        .unwrap_or_else(|e| panic!("Invalid config generated from string:\n\n{cfg}\n'{e}'"));
}

/// Runs `f` with a local metrics recorder and returns its result together with
/// the sum of every counter named `name` it incremented.
pub fn counter_total<T>(name: &str, f: impl FnOnce() -> T) -> (T, u64) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let result = metrics::with_local_recorder(&recorder, f);

    let total = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, ..)| key.key().name() == name)
        .map(|(.., value)| match value {
            DebugValue::Counter(count) => count,
            DebugValue::Gauge(_) | DebugValue::Histogram(_) => 0,
        })
        .sum();

    (result, total)
}

pub fn component_errors_total<T>(f: impl FnOnce() -> T) -> (T, u64) {
    counter_total("component_errors_total", f)
}

pub fn component_sent_events_total<T>(f: impl FnOnce() -> T) -> (T, u64) {
    counter_total("component_sent_events_total", f)
}

/// A log line recorded by [`capture_logs`], with every field rendered to text.
#[derive(Clone, Debug)]
pub struct CapturedLog {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedLog {
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<CapturedLog>>>);

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldRecorder::default();
        event.record(&mut fields);
        self.0.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            fields: fields.0,
        });
    }
}

#[derive(Default)]
struct FieldRecorder(BTreeMap<String, String>);

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

/// Runs `f` with a thread-local subscriber and returns its result together
/// with every log line emitted while it ran.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedLog>) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);

    let logs = std::mem::take(&mut *capture.0.lock().unwrap());
    (result, logs)
}
