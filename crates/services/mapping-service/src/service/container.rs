//! Service container - wires the workflow components to one set of stores.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AssignmentManager, AssignmentService, AuditService, Auditor, CascadeHandler, CascadeService,
    MappingWorkflow, MessagingService, Messenger, ProfileManager, ProfileService, WorkflowEngine,
};
use crate::repository::{
    IdentityStore, MappingRequestStore, MemoryStore, MessageRepository, MessageStore, RequestStore,
    UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn workflow(&self) -> Arc<dyn MappingWorkflow>;

    fn assignments(&self) -> Arc<dyn AssignmentService>;

    fn cascade(&self) -> Arc<dyn CascadeService>;

    fn profiles(&self) -> Arc<dyn ProfileService>;

    fn messaging(&self) -> Arc<dyn MessagingService>;

    fn audit(&self) -> Arc<dyn AuditService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    workflow: Arc<dyn MappingWorkflow>,
    assignments: Arc<dyn AssignmentService>,
    cascade: Arc<dyn CascadeService>,
    profiles: Arc<dyn ProfileService>,
    messaging: Arc<dyn MessagingService>,
    audit: Arc<dyn AuditService>,
}

impl Services {
    /// Build every service over the given store handles
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        requests: Arc<dyn MappingRequestStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        let cascade: Arc<dyn CascadeService> =
            Arc::new(CascadeHandler::new(identity.clone(), requests.clone()));

        Self {
            workflow: Arc::new(WorkflowEngine::new(
                identity.clone(),
                requests.clone(),
                cascade.clone(),
            )),
            assignments: Arc::new(AssignmentManager::new(identity.clone())),
            profiles: Arc::new(ProfileManager::new(identity.clone())),
            messaging: Arc::new(Messenger::new(identity.clone(), messages)),
            audit: Arc::new(Auditor::new(identity, requests)),
            cascade,
        }
    }

    /// Create service container from database connection
    pub fn from_connection(db: DatabaseConnection) -> Self {
        let identity = Arc::new(UserStore::new(db.clone()));
        let requests = Arc::new(RequestStore::new(db.clone()));
        let messages = Arc::new(MessageRepository::new(db));
        Self::new(identity, requests, messages)
    }

    /// Create service container over a shared in-memory store
    pub fn in_memory(store: MemoryStore) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }
}

impl ServiceContainer for Services {
    fn workflow(&self) -> Arc<dyn MappingWorkflow> {
        self.workflow.clone()
    }

    fn assignments(&self) -> Arc<dyn AssignmentService> {
        self.assignments.clone()
    }

    fn cascade(&self) -> Arc<dyn CascadeService> {
        self.cascade.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileService> {
        self.profiles.clone()
    }

    fn messaging(&self) -> Arc<dyn MessagingService> {
        self.messaging.clone()
    }

    fn audit(&self) -> Arc<dyn AuditService> {
        self.audit.clone()
    }
}
