use metrics::counter;
use splitter_core::internal_event::InternalEvent;
use splitter_core::internal_event::{error_stage, error_type};

#[derive(Debug)]
pub struct JsonEventDecodeError<E> {
    pub line: usize,
    pub error: E,
}

impl<E: std::fmt::Display> InternalEvent for JsonEventDecodeError<E> {
    fn emit(self) {
        error!(
            message = "Failed decoding input line as a JSON object.",
            line = self.line,
            error = %self.error,
            error_code = "decoder_deserialize",
            error_type = error_type::PARSER_FAILED,
            stage = error_stage::RECEIVING,
        );
        counter!(
            "component_errors_total",
            "error_code" => "decoder_deserialize",
            "error_type" => error_type::PARSER_FAILED,
            "stage" => error_stage::RECEIVING,
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct EventWriteError<'a> {
    pub error: &'a std::io::Error,
}

impl InternalEvent for EventWriteError<'_> {
    fn emit(self) {
        error!(
            message = "Failed writing event.",
            error = %self.error,
            error_code = "stdout_write",
            error_type = error_type::WRITER_FAILED,
            stage = error_stage::SENDING,
        );
        counter!(
            "component_errors_total",
            "error_code" => "stdout_write",
            "error_type" => error_type::WRITER_FAILED,
            "stage" => error_stage::SENDING,
        )
        .increment(1);
    }
}
