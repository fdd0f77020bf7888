//! Mapping service configuration.

use std::env;

use common::{DatabaseConfig, ServiceConfig};

/// Mapping service configuration.
#[derive(Debug, Clone)]
pub struct MappingServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
}

fn env_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl MappingServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service: ServiceConfig {
                service_name: defaults.service.service_name,
                log_level: env::var("MAPPING_SERVICE_LOG_LEVEL")
                    .unwrap_or(defaults.service.log_level),
            },
            database: DatabaseConfig {
                url: env::var("MAPPING_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: env_u32("MAPPING_SERVICE_DB_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: env_u32("MAPPING_SERVICE_DB_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
            },
        }
    }
}

impl Default for MappingServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                service_name: "mapping-service".to_string(),
                log_level: "info".to_string(),
            },
            database: DatabaseConfig::default(),
        }
    }
}
