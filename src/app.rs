#![allow(missing_docs)]
use std::io::{self, BufRead, Write};

use exitcode::ExitCode;
use snafu::{ResultExt, Snafu};

use crate::{
    cli::{handle_config_errors, LogFormat, Opts},
    config,
    event::LogEvent,
    internal_events::{EventWriteError, JsonEventDecodeError, SplitterStarted, SplitterStopped},
    trace,
    transforms::{OutputBuffer, Transform},
};

#[derive(Debug, Snafu)]
enum DecodeError {
    #[snafu(display("invalid UTF-8: {source}"))]
    InvalidUtf8 { source: std::str::Utf8Error },
    #[snafu(display("invalid JSON: {source}"))]
    InvalidJson { source: serde_json::Error },
    #[snafu(display("expected a JSON object, found {found}"))]
    NotAnObject { found: &'static str },
}

fn decode_line(line: &[u8]) -> Result<LogEvent, DecodeError> {
    let line = std::str::from_utf8(line).context(InvalidUtf8Snafu)?;
    let value: serde_json::Value = serde_json::from_str(line).context(InvalidJsonSnafu)?;
    LogEvent::try_from(value).map_err(|value| DecodeError::NotAnObject {
        found: json_kind(&value),
    })
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Counters reported when a run finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub events_in: u64,
    pub events_out: u64,
    pub decode_errors: u64,
}

/// The configured transforms, applied in declaration order.
#[derive(Debug)]
pub struct Pipeline {
    transforms: Vec<(String, Transform)>,
}

impl Pipeline {
    pub const fn new(transforms: Vec<(String, Transform)>) -> Self {
        Self { transforms }
    }

    pub fn names(&self) -> Vec<String> {
        self.transforms.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Runs one event through every transform, feeding each transform's
    /// output to the next.
    pub fn process(&mut self, event: LogEvent) -> OutputBuffer {
        let mut events = OutputBuffer::from(vec![event]);
        for (_, transform) in &mut self.transforms {
            let mut next = OutputBuffer::with_capacity(events.len());
            for event in events.drain() {
                transform.transform(&mut next, event);
            }
            events = next;
        }
        events
    }

    /// Reads newline-delimited JSON objects from `input` and writes every
    /// resulting event as one JSON line to `output`.
    ///
    /// Lines that do not decode to an object, including lines that are not
    /// UTF-8, are reported and skipped. Read and write failures end the run.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<RunStats> {
        let mut stats = RunStats::default();
        for (index, line) in input.split(b'\n').enumerate() {
            let bytes = line?;
            let line = bytes.strip_suffix(b"\r").unwrap_or(&bytes);
            if line.trim_ascii().is_empty() {
                continue;
            }

            let event = match decode_line(line) {
                Ok(event) => event,
                Err(error) => {
                    emit!(JsonEventDecodeError {
                        line: index + 1,
                        error,
                    });
                    stats.decode_errors += 1;
                    continue;
                }
            };
            stats.events_in += 1;

            for event in self.process(event).into_events() {
                write_event(&mut output, &event).inspect_err(|error| {
                    emit!(EventWriteError { error });
                })?;
                stats.events_out += 1;
            }
        }
        output.flush()?;
        Ok(stats)
    }
}

fn write_event<W: Write>(output: &mut W, event: &LogEvent) -> io::Result<()> {
    serde_json::to_writer(&mut *output, event)?;
    output.write_all(b"\n")
}

pub struct Application {
    pub opts: Opts,
    pub pipeline: Pipeline,
}

impl Application {
    /// Parses the command line, then streams stdin to stdout.
    pub fn run() -> ExitCode {
        match Self::prepare() {
            Ok(mut app) => app.start(io::stdin().lock(), io::stdout().lock()),
            Err(code) => code,
        }
    }

    pub fn prepare() -> Result<Self, ExitCode> {
        let opts = Opts::get_matches().map_err(|error| {
            // Printing to stdout/err can itself fail; ignore it.
            _ = error.print();
            exitcode::USAGE
        })?;

        Self::prepare_from_opts(opts)
    }

    pub fn prepare_from_opts(opts: Opts) -> Result<Self, ExitCode> {
        init_logging(opts.color.use_color(), opts.log_format, opts.log_level());

        let config = config::load_from_path(&opts.config_path).map_err(handle_config_errors)?;
        let transforms = config.build().map_err(handle_config_errors)?;

        Ok(Self {
            opts,
            pipeline: Pipeline::new(transforms),
        })
    }

    pub fn start<R: BufRead, W: Write>(&mut self, input: R, output: W) -> ExitCode {
        emit!(SplitterStarted {
            transforms: &self.pipeline.names(),
        });

        match self.pipeline.run(input, output) {
            Ok(stats) => {
                emit!(SplitterStopped {
                    events_in: stats.events_in,
                    events_out: stats.events_out,
                    decode_errors: stats.decode_errors,
                });
                exitcode::OK
            }
            Err(error) => {
                error!(message = "Stopped processing events.", %error);
                exitcode::IOERR
            }
        }
    }
}

fn get_log_levels(default: &str) -> String {
    std::env::var("SPLITTER_LOG").unwrap_or_else(|_| default.into())
}

pub fn init_logging(color: bool, format: LogFormat, log_level: &str) {
    let level = get_log_levels(log_level);
    let json = match format {
        LogFormat::Text => false,
        LogFormat::Json => true,
    };

    trace::init(color, json, &level);
    info!(message = "Log level is enabled.", level = ?level);
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::{
        cli::Color,
        config::{load_from_str, Format},
        test_util::capture_logs,
    };

    fn pipeline(config: &str) -> Pipeline {
        Pipeline::new(
            load_from_str(config, Format::Toml)
                .unwrap()
                .build()
                .unwrap(),
        )
    }

    fn run(pipeline: &mut Pipeline, input: &str) -> (String, RunStats) {
        let mut output = Vec::new();
        let stats = pipeline.run(input.as_bytes(), &mut output).unwrap();
        (String::from_utf8(output).unwrap(), stats)
    }

    #[test]
    fn streams_split_events() {
        let mut pipeline = pipeline(indoc! {r#"
            [transforms.lines]
            type = "split"
        "#});

        let (output, stats) = run(
            &mut pipeline,
            "{\"message\":\"a\\nb\",\"host\":\"h\"}\n\n{\"message\":\"c\"}\n",
        );
        assert_eq!(
            output,
            indoc! {r#"
                {"message":"a","host":"h"}
                {"message":"b","host":"h"}
                {"message":"c"}
            "#}
        );
        assert_eq!(
            stats,
            RunStats {
                events_in: 2,
                events_out: 3,
                decode_errors: 0,
            }
        );
    }

    #[test]
    fn transforms_chain_in_order() {
        let mut pipeline = pipeline(indoc! {r#"
            [transforms.batches]
            type = "split"
            field = "batches"
            target = "batch"
            delete_field = true

            [transforms.items]
            type = "split"
            field = "batch"
            terminator = ","
        "#});

        let (output, stats) = run(&mut pipeline, r#"{"batches":["a,b","c"]}"#);
        assert_eq!(
            output,
            indoc! {r#"
                {"batch":"a"}
                {"batch":"b"}
                {"batch":"c"}
            "#}
        );
        assert_eq!(stats.events_out, 3);
    }

    #[test]
    fn skips_lines_that_are_not_objects() {
        let mut pipeline = pipeline(indoc! {r#"
            [transforms.lines]
            type = "split"
        "#});

        let (output, stats) = run(&mut pipeline, "not json\n[1,2]\n{\"message\":\"x\"}\n");
        assert_eq!(output, "{\"message\":\"x\"}\n");
        assert_eq!(stats.decode_errors, 2);
        assert_eq!(stats.events_in, 1);
    }

    #[test]
    fn skips_lines_that_are_not_utf8() {
        let mut pipeline = pipeline(indoc! {r#"
            [transforms.lines]
            type = "split"
        "#});

        let mut input = b"{\"message\":\"a\"}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"message\":\"b\\nc\"}\r\n");

        let mut output = Vec::new();
        let stats = pipeline.run(input.as_slice(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            indoc! {r#"
                {"message":"a"}
                {"message":"b"}
                {"message":"c"}
            "#}
        );
        assert_eq!(
            stats,
            RunStats {
                events_in: 2,
                events_out: 3,
                decode_errors: 1,
            }
        );
    }

    #[test]
    fn stop_summary_reports_skipped_lines() {
        let mut app = Application {
            opts: Opts {
                config_path: "split.toml".into(),
                verbose: 0,
                quiet: 0,
                log_format: LogFormat::Text,
                color: Color::Never,
            },
            pipeline: pipeline(indoc! {r#"
                [transforms.lines]
                type = "split"
            "#}),
        };

        let (code, logs) = capture_logs(|| {
            app.start("{\"message\":\"a\\nb\"}\nnope\n".as_bytes(), Vec::new())
        });
        assert_eq!(code, exitcode::OK);

        let stopped = logs
            .iter()
            .find(|log| log.message() == Some("Splitter has stopped."))
            .unwrap();
        assert_eq!(stopped.field("events_in"), Some("1"));
        assert_eq!(stopped.field("events_out"), Some("2"));
        assert_eq!(stopped.field("decode_errors"), Some("1"));
    }

    #[test]
    fn read_errors_end_the_run() {
        struct Broken;

        impl io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut pipeline = pipeline(indoc! {r#"
            [transforms.lines]
            type = "split"
        "#});
        let error = pipeline
            .run(io::BufReader::new(Broken), Vec::new())
            .unwrap_err();
        assert_eq!(error.to_string(), "disk on fire");
    }

    #[test]
    fn not_an_object_names_the_kind() {
        let error = decode_line(b"[1]").unwrap_err();
        assert_eq!(error.to_string(), "expected a JSON object, found array");
    }
}
