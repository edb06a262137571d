use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Postgres { database_url: String },
    /// Process-local state, lost on restart.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvanceSettings {
    /// How often the background step runs; `None` disables it.
    pub interval: Option<Duration>,
    /// How long an order may stay pending/confirmed before it moves to cooking.
    pub grace: chrono::Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: Storage,
    pub auto_advance: AutoAdvanceSettings,
}

impl Settings {
    /// Read settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => Storage::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some("memory") => Storage::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let interval_secs = parse_or(&lookup, "AUTO_ADVANCE_INTERVAL_SECS", 10u64)?;
        let grace_secs = parse_or(&lookup, "AUTO_ADVANCE_GRACE_SECS", 0u32)?;

        Ok(Settings {
            host,
            port,
            storage,
            auto_advance: AutoAdvanceSettings {
                interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
                grace: chrono::Duration::seconds(i64::from(grace_secs)),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/foh")]).unwrap();

        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 8080);
        assert_eq!(
            s.storage,
            Storage::Postgres {
                database_url: "postgres://localhost/foh".to_string()
            }
        );
        assert_eq!(s.auto_advance.interval, Some(Duration::from_secs(10)));
        assert_eq!(s.auto_advance.grace, chrono::Duration::zero());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        assert_eq!(settings(&[]), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let s = settings(&[("STORAGE_BACKEND", "memory"), ("PORT", "9000")]).unwrap();
        assert_eq!(s.storage, Storage::Memory);
        assert_eq!(s.port, 9000);
    }

    #[test]
    fn zero_interval_disables_auto_advance() {
        let s = settings(&[
            ("STORAGE_BACKEND", "memory"),
            ("AUTO_ADVANCE_INTERVAL_SECS", "0"),
            ("AUTO_ADVANCE_GRACE_SECS", "90"),
        ])
        .unwrap();
        assert_eq!(s.auto_advance.interval, None);
        assert_eq!(s.auto_advance.grace, chrono::Duration::seconds(90));
    }

    #[test]
    fn bad_values_are_reported_by_name() {
        assert_eq!(
            settings(&[("STORAGE_BACKEND", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            })
        );
        assert!(matches!(
            settings(&[("STORAGE_BACKEND", "sqlite")]),
            Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                ..
            })
        ));
    }
}
