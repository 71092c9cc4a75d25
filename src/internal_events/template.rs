use metrics::counter;
use splitter_core::internal_event::InternalEvent;
use splitter_core::internal_event::{error_stage, error_type};

use crate::template;

#[derive(Debug)]
pub struct TemplateRenderingError<'a> {
    pub field: Option<&'a str>,
    pub error: template::TemplateRenderingError,
}

impl InternalEvent for TemplateRenderingError<'_> {
    fn emit(self) {
        let mut msg = "Failed to render template".to_owned();
        if let Some(field) = self.field {
            msg.push_str(&format!(" for {field:?}"));
        }
        msg.push('.');

        warn!(
            message = %msg,
            error = %self.error,
            error_type = error_type::TEMPLATE_FAILED,
            stage = error_stage::PROCESSING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::TEMPLATE_FAILED,
            "stage" => error_stage::PROCESSING,
        )
        .increment(1);
    }
}
