use metrics::counter;
use splitter_core::internal_event::InternalEvent;

#[derive(Debug)]
pub struct SplitterStarted<'a> {
    pub transforms: &'a [String],
}

impl InternalEvent for SplitterStarted<'_> {
    fn emit(self) {
        info!(
            target: "splitter",
            message = "Splitter has started.",
            version = %crate::get_version(),
            transforms = ?self.transforms,
        );
        counter!("started_total").increment(1);
    }
}

#[derive(Debug)]
pub struct SplitterStopped {
    pub events_in: u64,
    pub events_out: u64,
    pub decode_errors: u64,
}

impl InternalEvent for SplitterStopped {
    fn emit(self) {
        info!(
            target: "splitter",
            message = "Splitter has stopped.",
            events_in = self.events_in,
            events_out = self.events_out,
            decode_errors = self.decode_errors,
        );
        counter!("stopped_total").increment(1);
    }
}
