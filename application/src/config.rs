//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the `CONF.`-prefixed environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        Self::load(
            ConfigBuilder::<DefaultState>::default()
                .add_source(
                    config::File::with_name(path.as_ref()).required(false),
                )
                .add_source(
                    config::Environment::with_prefix("CONF").separator("."),
                ),
        )
    }

    /// Builds a [`Config`] out of the sources of the provided `builder`.
    fn load(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// `*` allows any origin.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Bearer token granting access to the administrative API.
    ///
    /// Administrative API is disabled if [`None`].
    #[serde(deserialize_with = "deserialize_secret")]
    pub admin_token: Option<SecretString>,

    /// Number of attempts to generate an unused booking code.
    #[default(5)]
    pub booking_code_attempts: u8,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl From<&Service> for service::Config {
    fn from(value: &Service) -> Self {
        let Service {
            admin_token: _,
            booking_code_attempts,
            tasks: Tasks {
                complete_past_reservations,
            },
        } = value;
        Self {
            booking_code_attempts: *booking_code_attempts,
            complete_past_reservations:
                service::task::complete_past_reservations::Config {
                    interval: complete_past_reservations.interval,
                },
        }
    }
}

/// Deserializes an optional [`SecretString`], treating an empty one as absent.
fn deserialize_secret<'de, D>(d: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `CompletePastReservations` task configuration.
    pub complete_past_reservations: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use config::{builder::DefaultState, ConfigBuilder, FileFormat};
    use secrecy::ExposeSecret as _;

    use super::{Config, LogLevel};

    fn load(toml: &str) -> Config {
        Config::load(
            ConfigBuilder::<DefaultState>::default()
                .add_source(config::File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn defaults_when_empty() {
        let cfg = load("");

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.cors.origins, ["*"]);
        assert!(cfg.service.admin_token.is_none());
        assert_eq!(cfg.service.booking_code_attempts, 5);
        assert_eq!(
            cfg.service.tasks.complete_past_reservations.interval,
            Duration::from_secs(3600),
        );
        assert_eq!(cfg.log.level, LogLevel::Info);
    }

    #[test]
    fn reads_service_section() {
        let cfg = load(
            r#"
            [service]
            admin_token = "s3cr3t"
            booking_code_attempts = 9

            [service.tasks.complete_past_reservations]
            interval = "15m"

            [log]
            level = "DEBUG"
            "#,
        );

        assert_eq!(
            cfg.service.admin_token.as_ref().map(|t| t.expose_secret()),
            Some("s3cr3t"),
        );
        assert_eq!(cfg.service.booking_code_attempts, 9);
        assert_eq!(
            cfg.service.tasks.complete_past_reservations.interval,
            Duration::from_secs(15 * 60),
        );
        assert_eq!(cfg.log.level, LogLevel::Debug);

        let svc = service::Config::from(&cfg.service);
        assert_eq!(svc.booking_code_attempts, 9);
    }

    #[test]
    fn empty_admin_token_disables_admin() {
        let cfg = load(
            r#"
            [service]
            admin_token = ""
            "#,
        );

        assert!(cfg.service.admin_token.is_none());
    }
}
