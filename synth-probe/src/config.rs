use std::env;
use std::fmt;

use postgres::config::SslMode;

pub const DEFAULT_HOST: &str = "localhost";
pub const PORT: u16 = 5432;
pub const APPLICATION_NAME: &str = "synth-probe";

pub const HOST_VAR: &str = "POSTGRES_HOST";
pub const DB_VAR: &str = "POSTGRES_DB";
pub const USER_VAR: &str = "POSTGRES_USER";
pub const PASSWORD_VAR: &str = "POSTGRES_PASSWORD";

/// Connection parameters of the database the probe writes to.
///
/// Anything left as `None` falls back to the driver's own default.
#[derive(Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Reported to the server, shows up in `pg_stat_activity`
    pub application_name: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            host: DEFAULT_HOST.to_string(),
            port: PORT,
            dbname: None,
            user: None,
            password: None,
            application_name: APPLICATION_NAME.to_string(),
        }
    }
}

impl ProbeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    #[must_use]
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        ProbeConfig {
            host: get(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: PORT,
            dbname: get(DB_VAR),
            user: get(USER_VAR),
            password: get(PASSWORD_VAR),
            application_name: APPLICATION_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn to_pg_config(&self) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .application_name(&self.application_name)
            .host(&self.host)
            .port(self.port)
            .ssl_mode(SslMode::Disable);
        if let Some(dbname) = &self.dbname {
            config.dbname(dbname);
        }
        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("application_name", &self.application_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ProbeConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.application_name, "synth-probe");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_DB", "shop"),
            ("POSTGRES_USER", "probe"),
            ("POSTGRES_PASSWORD", "hunter2"),
        ]));
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, PORT);
        assert_eq!(config.dbname.as_deref(), Some("shop"));
        assert_eq!(config.user.as_deref(), Some("probe"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config =
            ProbeConfig::from_lookup(lookup_from(&[("POSTGRES_HOST", ""), ("POSTGRES_DB", "")]));
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(config.dbname.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ProbeConfig {
            password: Some("hunter2".to_string()),
            ..ProbeConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_pg_config() {
        let config = ProbeConfig {
            host: "db.internal".to_string(),
            dbname: Some("shop".to_string()),
            user: Some("probe".to_string()),
            password: Some("hunter2".to_string()),
            ..ProbeConfig::default()
        };
        let pg = config.to_pg_config();
        assert_eq!(pg.get_ports(), &[5432]);
        assert_eq!(pg.get_dbname(), Some("shop"));
        assert_eq!(pg.get_user(), Some("probe"));
        assert_eq!(pg.get_password(), Some(&b"hunter2"[..]));
        assert_eq!(pg.get_application_name(), Some(APPLICATION_NAME));

        let renamed = ProbeConfig {
            application_name: "synth-probe-canary".to_string(),
            ..config
        };
        assert_eq!(
            renamed.to_pg_config().get_application_name(),
            Some("synth-probe-canary")
        );
    }
}
