//! [`Config`]-related definitions.

use std::time;

use common::Money;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::domain::Tariff;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
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
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or the configured
    /// [`Tariff`] contains an amount that cannot be billed.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Checks the values of this [`Config`] that its types cannot express.
    fn validated(self) -> Result<Self, ConfigError> {
        if let Some(name) = self.service.tariff.unbillable_amount() {
            return Err(ConfigError::Message(format!(
                "`service.tariff.{name}` must be between 0 and {} with at most \
                 {} fractional digits",
                Money::from_minor(Tariff::MAX_AMOUNT_MINOR),
                Tariff::MAX_FRACTIONAL_DIGITS,
            )));
        }
        Ok(self)
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
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// [`Tariff`] the bills are generated with.
    pub tariff: Tariff,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            tariff,
            tasks: Tasks {
                sweep_overdue_bills,
            },
        } = value;
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            tariff,
            sweep_overdue_bills: service::task::sweep_overdue_bills::Config {
                enabled: sweep_overdue_bills.enabled,
                interval: sweep_overdue_bills.interval,
            },
        }
    }
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `SweepOverdueBills` task configuration.
    pub sweep_overdue_bills: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Indicator whether the task runs at all.
    pub enabled: bool,

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
#[derive(Clone, Copy, Debug, Default, Deserialize)]
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

    use common::Money;
    use service::domain::Tariff;

    use super::Config;

    #[test]
    fn defaults_without_file() {
        let config = Config::new("does-not-exist.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(!config.service.tasks.sweep_overdue_bills.enabled);
        assert_eq!(
            config.service.tasks.sweep_overdue_bills.interval,
            Duration::from_secs(3600),
        );
        assert_eq!(config.service.tariff.late_fee, Money::from_minor(10_000));
    }

    fn with_tariff(tariff: Tariff) -> Config {
        let mut config = Config::default();
        config.service.tariff = tariff;
        config
    }

    #[test]
    fn accepts_largest_storable_tariff() {
        let config = with_tariff(Tariff {
            maintenance: "99999999.99".parse().unwrap(),
            water: "0.5".parse().unwrap(),
            ..Tariff::default()
        });

        assert!(config.validated().is_ok());
    }

    #[test]
    fn rejects_too_large_tariff_amount() {
        let config = with_tariff(Tariff {
            sinking_fund: "100000000".parse().unwrap(),
            ..Tariff::default()
        });

        let err = config.validated().unwrap_err().to_string();
        assert!(err.contains("`service.tariff.sinking_fund`"), "{err}");
    }

    #[test]
    fn rejects_too_precise_tariff_amount() {
        let config = with_tariff(Tariff {
            electricity: "300.005".parse().unwrap(),
            ..Tariff::default()
        });

        let err = config.validated().unwrap_err().to_string();
        assert!(err.contains("`service.tariff.electricity`"), "{err}");
    }

    #[test]
    fn rejects_negative_tariff_amount() {
        let config = with_tariff(Tariff {
            garbage: Money::from_minor(-500),
            ..Tariff::default()
        });

        assert!(config.validated().is_err());
    }
}
