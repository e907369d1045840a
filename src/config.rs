use std::env;

use crate::error::ConfigError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Server settings, read from the environment (and `.env` if present).
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub seed_people: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(
            env::var("BIND_ADDR").ok(),
            env::var("PORT").ok(),
            env::var("SEED_PEOPLE").ok(),
        )
    }

    fn from_vars(
        bind_addr: Option<String>,
        port: Option<String>,
        seed_people: Option<String>,
    ) -> Result<Self, ConfigError> {
        let port = match port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let seed_people = seed_people
            .map(|names| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_addr: bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            seed_people,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_vars(None, None, None).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.seed_people.is_empty());
    }

    #[test]
    fn seed_people_are_split_on_commas() {
        let config =
            AppConfig::from_vars(None, Some("3000".into()), Some("Alice, Bob,,".into())).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.seed_people, vec!["Alice", "Bob"]);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = AppConfig::from_vars(None, Some("eighty".into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(ref raw) if raw == "eighty"));
    }
}
