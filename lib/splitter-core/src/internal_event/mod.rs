//! Internal events are the structured diagnostics a component raises about
//! its own operation. Each one owns both its log line and its counters so the
//! call site only has to say what happened.

pub trait InternalEvent: Sized {
    fn emit(self);
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

/// Values for the `error_type` label of `component_errors_total`.
pub mod error_type {
    /// The configured field could not be processed in its current shape.
    pub const CONVERSION_FAILED: &str = "conversion_failed";
    /// The input could not be parsed into an event.
    pub const PARSER_FAILED: &str = "parser_failed";
    /// A template referenced data missing from the event.
    pub const TEMPLATE_FAILED: &str = "template_failed";
    /// Writing output failed.
    pub const WRITER_FAILED: &str = "writer_failed";
}

/// Values for the `stage` label of `component_errors_total`.
pub mod error_stage {
    pub const RECEIVING: &str = "receiving";
    pub const PROCESSING: &str = "processing";
    pub const SENDING: &str = "sending";
}
