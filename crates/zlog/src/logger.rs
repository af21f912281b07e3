//! Lazily built fan-out logger

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, Dispatch, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use zlog_core::{Error, LevelMap, LoggerConfig, Result};

use crate::sink::{BoxedLayer, Sink, SinkBuilder, SinkInfo};

/// Composite logger handle: every record goes to each sink whose predicate accepts it
#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    sinks: Vec<SinkInfo>,
}

impl Logger {
    fn from_sinks(sinks: Vec<Sink>) -> Self {
        let (sinks, layers): (Vec<SinkInfo>, Vec<BoxedLayer<Registry>>) =
            sinks.into_iter().map(Sink::into_layer::<Registry>).unzip();
        let subscriber = Registry::default().with(layers);

        Self {
            dispatch: Dispatch::new(subscriber),
            sinks,
        }
    }

    /// Sinks in fan-out order; the console sink is always last
    pub fn sinks(&self) -> &[SinkInfo] {
        &self.sinks
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the thread's default, so plain `tracing`
    /// macros inside it are routed through these sinks
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process-wide default subscriber
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|_| Error::AlreadyInstalled)
    }

    /// Emit one record at `level`, tagged with the caller's location
    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        let caller = Location::caller();
        self.in_scope(|| {
            if level == Level::ERROR {
                tracing::error!(caller = %caller, "{}", message);
            } else if level == Level::WARN {
                tracing::warn!(caller = %caller, "{}", message);
            } else if level == Level::INFO {
                tracing::info!(caller = %caller, "{}", message);
            } else if level == Level::DEBUG {
                tracing::debug!(caller = %caller, "{}", message);
            } else {
                tracing::trace!(caller = %caller, "{}", message);
            }
        });
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Owns the logger configuration and builds the shared [`Logger`] exactly once
pub struct LoggerCore {
    config: LoggerConfig,
    handle: OnceCell<Arc<Logger>>,
    /// Held only while building; carries the console writer override until then
    init_lock: Mutex<Option<BoxMakeWriter>>,
}

impl LoggerCore {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
            init_lock: Mutex::new(None),
        }
    }

    /// Like [`LoggerCore::new`], with the console sink writing to `writer`
    /// instead of the configured process stream
    pub fn with_console_writer(config: LoggerConfig, writer: BoxMakeWriter) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
            init_lock: Mutex::new(Some(writer)),
        }
    }

    /// Load a config file (TOML, YAML, or JSON) and wrap it in a core
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Ok(Self::new(LoggerConfig::load(path)?))
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// The logger, if it has been built
    pub fn get(&self) -> Option<Arc<Logger>> {
        self.handle.get().cloned()
    }

    /// Build the logger from `level_map` on first call; later calls return
    /// the same logger and ignore their argument.
    ///
    /// Entries with a blank stream name are skipped, as are entries resolving
    /// to a file an earlier entry already writes. A console sink accepting
    /// exactly `INFO` is always appended, so the logger never has zero sinks.
    pub fn initialize(&self, level_map: &LevelMap) -> Arc<Logger> {
        if let Some(handle) = self.handle.get() {
            return Arc::clone(handle);
        }

        let mut console_writer = self.init_lock.lock();
        if let Some(handle) = self.handle.get() {
            return Arc::clone(handle);
        }

        let logger = Arc::new(self.build(level_map, console_writer.take()));
        // Empty cell under the lock, so this always stores
        let _ = self.handle.set(Arc::clone(&logger));
        logger
    }

    /// Build from the streams declared in the config itself
    pub fn initialize_from_config(&self) -> Arc<Logger> {
        self.initialize(&self.config.streams)
    }

    fn build(&self, level_map: &LevelMap, console_writer: Option<BoxMakeWriter>) -> Logger {
        let mut paths = HashSet::new();
        let mut sinks = Vec::with_capacity(level_map.len() + 1);
        for (name, predicate) in level_map {
            if name.trim().is_empty() {
                continue;
            }
            let sink = SinkBuilder::build(&self.config, name, predicate.clone());
            // Names like "a.b" and "a_b" land on one file; the first one wins
            let Some(path) = sink.info().file_path() else {
                continue;
            };
            if !paths.insert(path.to_string()) {
                debug!("Skipping stream {:?}: {} is already a sink", name, path);
                continue;
            }
            sinks.push(sink);
        }

        let console = match console_writer {
            Some(writer) => {
                SinkBuilder::console_with_writer(self.config.console, self.config.ansi, writer)
            }
            None => SinkBuilder::console(self.config.console, self.config.ansi),
        };
        sinks.push(console);

        debug!(
            "Building logger with {} sinks under {}",
            sinks.len(),
            self.config.base_path
        );
        Logger::from_sinks(sinks)
    }
}

impl std::fmt::Debug for LoggerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerCore")
            .field("config", &self.config)
            .field("initialized", &self.handle.get().is_some())
            .finish()
    }
}
