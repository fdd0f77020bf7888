//! Application services layer - the mapping and assignment workflow.
//!
//! Services depend on the store traits only, so the same engine runs over
//! Postgres or the in-memory store.

mod assignment;
mod audit;
mod cascade;
pub mod container;
mod messaging;
mod profile;
pub mod saga;
mod workflow;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use assignment::{AssignmentManager, AssignmentService};
pub use audit::{AuditReport, AuditService, Auditor, Violation, WorkflowStats};
pub use cascade::{CascadeHandler, CascadeService, DeletionReport};
pub use messaging::{MessagingService, Messenger};
pub use profile::{ProfileManager, ProfileService};
pub use workflow::{MappingWorkflow, UnmapReport, WorkflowEngine};

#[cfg(any(test, feature = "test-utils"))]
pub use cascade::MockCascadeService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
