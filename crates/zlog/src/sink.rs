//! Routed sinks: a destination, its writer, and the predicate gating it

use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::{self, time::ChronoLocal, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use zlog_core::{constants, resolve_log_path, ConsoleTarget, LevelPredicate, LogFormat, LoggerConfig};
use zlog_rotate::{RotatingWriter, RotationConfig};

/// Boxed layer produced from a sink
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Where a sink's records end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(String),
    Console(ConsoleTarget),
}

/// Read-only description of a sink kept by the logger after construction
#[derive(Debug, Clone)]
pub struct SinkInfo {
    pub destination: Destination,
    pub predicate: LevelPredicate,
}

impl SinkInfo {
    pub fn file_path(&self) -> Option<&str> {
        match &self.destination {
            Destination::File(path) => Some(path),
            Destination::Console(_) => None,
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self.destination, Destination::Console(_))
    }
}

/// A destination paired with the predicate deciding which records reach it
pub struct Sink {
    info: SinkInfo,
    writer: BoxMakeWriter,
    file: Option<Arc<RotatingWriter>>,
    format: LogFormat,
    ansi: bool,
}

impl Sink {
    pub fn info(&self) -> &SinkInfo {
        &self.info
    }

    pub fn predicate(&self) -> &LevelPredicate {
        &self.info.predicate
    }

    /// Backing rotating writer, absent for the console sink
    pub fn file_writer(&self) -> Option<&Arc<RotatingWriter>> {
        self.file.as_ref()
    }

    /// Turn the sink into a formatting layer filtered by its predicate
    pub fn into_layer<S>(self) -> (SinkInfo, BoxedLayer<S>)
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let predicate = self.info.predicate.clone();
        let layer = fmt_layer::<S>(self.writer, self.format, self.ansi)
            .with_filter(filter_fn(move |meta| predicate.accepts(*meta.level())))
            .boxed();
        (self.info, layer)
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("info", &self.info)
            .field("format", &self.format)
            .finish()
    }
}

fn fmt_layer<S>(writer: BoxMakeWriter, format: LogFormat, ansi: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer::<S>()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoLocal::new(constants::TEXT_TIME_FORMAT.to_string()));

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Builds the sinks a logger fans out to
pub struct SinkBuilder;

impl SinkBuilder {
    /// Build a rotating file sink for `stream_name` under the configured base path.
    ///
    /// The file is not opened here; an unwritable location shows up on the
    /// first record written to it.
    pub fn build(config: &LoggerConfig, stream_name: &str, predicate: LevelPredicate) -> Sink {
        let file_path = resolve_log_path(&config.base_path, stream_name);
        let rotation = RotationConfig::new(config.max_size_bytes(), config.max_backups)
            .with_max_age_days(config.max_age_days)
            .with_compress(config.compress);
        let writer = Arc::new(RotatingWriter::new(&file_path, rotation));

        Sink {
            info: SinkInfo {
                destination: Destination::File(file_path),
                predicate,
            },
            writer: BoxMakeWriter::new(Arc::clone(&writer)),
            file: Some(writer),
            format: config.format,
            ansi: false,
        }
    }

    /// The console sink, fixed at exactly `INFO`
    pub fn console(target: ConsoleTarget, ansi: bool) -> Sink {
        let writer = match target {
            ConsoleTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
            ConsoleTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        };
        Self::console_with_writer(target, ansi, writer)
    }

    /// The console sink writing somewhere other than the process streams
    pub fn console_with_writer(target: ConsoleTarget, ansi: bool, writer: BoxMakeWriter) -> Sink {
        Sink {
            info: SinkInfo {
                destination: Destination::Console(target),
                predicate: LevelPredicate::INFO,
            },
            writer,
            file: None,
            format: LogFormat::Text,
            ansi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_build_file_sink() {
        let config = LoggerConfig::new("./log//", 256, 10, 7, true);
        let sink = SinkBuilder::build(&config, "access.v2", LevelPredicate::ERROR);

        assert_eq!(sink.info().file_path(), Some("log/access_v2.log"));
        assert!(!sink.info().is_console());
        assert!(sink.predicate().accepts(Level::ERROR));

        let writer = sink.file_writer().unwrap();
        assert_eq!(writer.path().to_str(), Some("log/access_v2.log"));
        assert_eq!(writer.config().max_size_bytes, 256 * 1024 * 1024);
        assert_eq!(writer.config().max_backups, 10);
        assert_eq!(writer.config().max_age, std::time::Duration::from_secs(7 * 86_400));
        assert!(writer.config().compress);
        // nothing is opened until the first record
        assert_eq!(writer.current_size(), 0);
    }

    #[test]
    fn test_console_sink() {
        let sink = SinkBuilder::console(ConsoleTarget::Stderr, false);

        assert_eq!(sink.info().destination, Destination::Console(ConsoleTarget::Stderr));
        assert!(sink.info().file_path().is_none());
        assert!(sink.file_writer().is_none());
        assert!(sink.predicate().accepts(Level::INFO));
        assert!(!sink.predicate().accepts(Level::WARN));
    }
}
