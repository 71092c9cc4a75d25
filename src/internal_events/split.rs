use metrics::counter;
use splitter_core::internal_event::InternalEvent;
use splitter_core::internal_event::{error_stage, error_type};

#[derive(Debug)]
pub struct SplitFieldTypeError<'a> {
    pub field: &'a str,
    pub field_type: &'static str,
}

impl InternalEvent for SplitFieldTypeError<'_> {
    fn emit(self) {
        warn!(
            message = "Only String and Array types are splittable.",
            field = %self.field,
            field_type = self.field_type,
            error_code = "split_field_type",
            error_type = error_type::CONVERSION_FAILED,
            stage = error_stage::PROCESSING,
        );
        counter!(
            "component_errors_total",
            "error_code" => "split_field_type",
            "error_type" => error_type::CONVERSION_FAILED,
            "stage" => error_stage::PROCESSING,
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct SplitEventsSent {
    pub count: usize,
}

impl InternalEvent for SplitEventsSent {
    fn emit(self) {
        debug!(message = "Split events sent.", count = self.count);
        counter!("component_sent_events_total").increment(self.count as u64);
    }
}
