use crate::{driver::DEFAULT_PROGRESS_INTERVAL, Error, Precision};

/// Identity reported when `RACER_ID` is not set
pub const DEFAULT_RACER_ID: &str = "00000000-0000-0000-0000-000000000008";

/// Port listened on when `RACER_PORT` is not set
pub const DEFAULT_PORT: u16 = 1323;

/// Server configuration.
///
/// ```
/// use brc_racer::{Config, Precision};
///
/// let config = Config::builder()
///     .port(8080)
///     .racer_id("my-racer")
///     .precision(Precision::Single)
///     .build();
///
/// assert_eq!(8080, config.port);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// TCP port to listen on
    pub port: u16,

    /// Identity echoed in every response
    pub racer_id: String,

    /// Float width aggregations compute in
    pub precision: Precision,

    /// Records between two progress log lines, `0` = off
    pub progress_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Builder::new().build()
    }
}

impl Config {
    /// Returns a configuration builder.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unusable value.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unusable value.
    pub fn from_lookup<L: Fn(&str) -> Option<String>>(lookup: L) -> crate::Result<Self> {
        let mut builder = Builder::new();

        if let Some(value) = lookup("RACER_PORT") {
            let port = value.trim().parse().map_err(|_| Error::InvalidConfig {
                key: "RACER_PORT",
                value: value.clone(),
            })?;
            builder = builder.port(port);
        }

        if let Some(value) = lookup("RACER_ID") {
            builder = builder.racer_id(value);
        }

        if let Some(value) = lookup("RACER_PRECISION") {
            let precision = value.parse().map_err(|()| Error::InvalidConfig {
                key: "RACER_PRECISION",
                value: value.clone(),
            })?;
            builder = builder.precision(precision);
        }

        if let Some(value) = lookup("RACER_PROGRESS_INTERVAL") {
            let n = value.trim().parse().map_err(|_| Error::InvalidConfig {
                key: "RACER_PROGRESS_INTERVAL",
                value: value.clone(),
            })?;
            builder = builder.progress_interval(n);
        }

        Ok(builder.build())
    }
}

/// Builder for [`Config`].
pub struct Builder {
    port: u16,
    racer_id: String,
    precision: Precision,
    progress_interval: u64,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            racer_id: DEFAULT_RACER_ID.to_owned(),
            precision: Precision::Double,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Sets the TCP port.
    ///
    /// Default = 1323
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the identity echoed in responses.
    #[must_use]
    pub fn racer_id<S: Into<String>>(mut self, racer_id: S) -> Self {
        self.racer_id = racer_id.into();
        self
    }

    /// Sets the aggregation precision.
    ///
    /// Default = 64-bit
    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the number of records between progress log lines.
    ///
    /// Default = 1,000,000
    #[must_use]
    pub fn progress_interval(mut self, n: u64) -> Self {
        self.progress_interval = n;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            port: self.port,
            racer_id: self.racer_id,
            precision: self.precision,
            progress_interval: self.progress_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_log::test;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();

        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() -> crate::Result<()> {
        let config = Config::from_lookup(lookup(&[]))?;

        assert_eq!(1323, config.port);
        assert_eq!("00000000-0000-0000-0000-000000000008", config.racer_id);
        assert_eq!(Precision::Double, config.precision);
        assert_eq!(1_000_000, config.progress_interval);
        assert_eq!(Config::default(), config);
        Ok(())
    }

    #[test]
    fn from_variables() -> crate::Result<()> {
        let config = Config::from_lookup(lookup(&[
            ("RACER_PORT", "8080"),
            ("RACER_ID", "racer-42"),
            ("RACER_PRECISION", "32"),
            ("RACER_PROGRESS_INTERVAL", "0"),
        ]))?;

        assert_eq!(
            Config::builder()
                .port(8080)
                .racer_id("racer-42")
                .precision(Precision::Single)
                .progress_interval(0)
                .build(),
            config
        );
        Ok(())
    }

    #[test]
    fn invalid_port() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("RACER_PORT", "70000")])),
            Err(Error::InvalidConfig {
                key: "RACER_PORT",
                ..
            })
        ));
    }

    #[test]
    fn invalid_precision() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("RACER_PRECISION", "128")])),
            Err(Error::InvalidConfig {
                key: "RACER_PRECISION",
                ..
            })
        ));
    }

    #[test]
    fn invalid_progress_interval() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("RACER_PROGRESS_INTERVAL", "-1")])),
            Err(Error::InvalidConfig {
                key: "RACER_PROGRESS_INTERVAL",
                ..
            })
        ));
    }
}
