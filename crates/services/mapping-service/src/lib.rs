//! Mapping Service Library
//!
//! Coordinates candidates, HRs and admins through the mapping and
//! assignment workflow. The engine lives in [`service`] and runs over any
//! implementation of the store traits in [`repository`].

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use tracing::info;

use crate::config::MappingServiceConfig;
use crate::infra::Database;
use crate::service::{AuditReport, ServiceContainer, Services, WorkflowStats};

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = MappingServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

async fn services_from_env() -> Result<Services, Box<dyn std::error::Error>> {
    let config = MappingServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;
    db.ping().await?;
    Ok(Services::from_connection(db.get_connection()))
}

/// Scan the database for workflow invariant violations.
pub async fn run_audit() -> Result<AuditReport, Box<dyn std::error::Error>> {
    let services = services_from_env().await?;
    Ok(services.audit().audit().await?)
}

/// Collect workflow counters from the database.
pub async fn run_stats() -> Result<WorkflowStats, Box<dyn std::error::Error>> {
    let services = services_from_env().await?;
    Ok(services.audit().stats().await?)
}
