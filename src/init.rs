use crate::destination::{parse_destination, Destination};
use crate::env::{
    detect_host_name, env_opt, parse_flag, LOG_APP_NAME_ENV, LOG_DEBUG_ENV, LOG_DESTINATION_ENV,
    LOG_FLUSH_INTERVAL_MS_ENV, LOG_QUEUE_CAPACITY_ENV,
};
use crate::error::{ConfigError, InitError};
use crate::layer::JsonLineLayer;
use crate::logger::Logger;
use crate::styles::LevelStyles;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Конфигурация логгера.
///
/// Управляет статическими полями каждой строки, направлением вывода,
/// минимальным уровнем и размером очереди между вызывающими потоками и
/// фоновым писателем.
///
/// **Поля**
/// - `app_name`: значение поля `app`; при `None` поле не выводится.
/// - `host_name`: значение поля `host`; при `None` поле не выводится.
/// - `destination`: консоль (уровни раскрашиваются) или файл (чистый JSON).
/// - `debug_enabled`: если `false`, события уровня DEBUG отбрасываются.
/// - `queue_capacity`: максимальное число строк в очереди; при полной
///   очереди вызывающий поток блокируется, строки не теряются.
/// - `flush_interval`: максимальный интервал между flush’ами sink’а.
/// - `styles`: таблица цветов уровней для консольного вывода.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub app_name: Option<String>,
    pub host_name: Option<String>,
    pub destination: Destination,
    pub debug_enabled: bool,
    pub queue_capacity: usize,
    pub flush_interval: Duration,
    pub styles: LevelStyles,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_name: None,
            host_name: None,
            destination: Destination::Stdout,
            debug_enabled: false,
            queue_capacity: 1000,
            flush_interval: Duration::from_secs(1),
            styles: LevelStyles::default(),
        }
    }
}

impl LoggerConfig {
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Build a config from the variables listed in [`crate::env`], using
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = LoggerConfig {
            app_name: env_opt(LOG_APP_NAME_ENV),
            host_name: detect_host_name(),
            ..LoggerConfig::default()
        };

        if let Some(dsn) = env_opt(LOG_DESTINATION_ENV) {
            config.destination = parse_destination(&dsn)?;
        }

        if let Some(value) = env_opt(LOG_DEBUG_ENV) {
            config.debug_enabled = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: LOG_DEBUG_ENV,
                value,
            })?;
        }

        if let Some(value) = env_opt(LOG_QUEUE_CAPACITY_ENV) {
            config.queue_capacity = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: LOG_QUEUE_CAPACITY_ENV,
                value,
            })?;
        }

        if let Some(value) = env_opt(LOG_FLUSH_INTERVAL_MS_ENV) {
            let millis: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: LOG_FLUSH_INTERVAL_MS_ENV,
                value,
            })?;
            config.flush_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Install `logger` as the sink of the global `tracing` subscriber.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`JsonLineLayer`] as the
/// global default subscriber, so every `tracing` event in the process is
/// formatted and written by `logger`.
pub fn init_tracing(logger: Logger) -> Result<(), InitError> {
    let subscriber = Registry::default().with(JsonLineLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Build a [`Logger`] from `config` and install it globally.
///
/// The returned handle can be used directly and should be shut down
/// before the process exits so queued lines are written.
pub fn init_tracing_with_config(config: LoggerConfig) -> Result<Logger, InitError> {
    let logger = Logger::new(config)?;
    init_tracing(logger.clone())?;
    Ok(logger)
}
