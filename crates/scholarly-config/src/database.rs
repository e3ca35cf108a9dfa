use std::env;

use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid("DATABASE_MAX_CONNECTIONS", "expected a positive integer"))?,
            Err(_) => 10,
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}
