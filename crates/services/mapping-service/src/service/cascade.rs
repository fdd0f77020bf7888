//! Cascade handler - releases candidates when their HR goes away.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{DomainError, HrState, HrStatus, Role};

use crate::repository::{IdentityStore, MappingRequestStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What a user deletion touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub user_id: Uuid,
    pub role: Role,
    /// HR status the user was moved out of before removal
    pub demoted_from: Option<HrStatus>,
    pub cancelled_requests: u64,
    pub released_candidates: u64,
}

/// Cascade service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CascadeService: Send + Sync {
    /// Release every candidate assigned to the HR. Safe to repeat.
    async fn release_candidates(&self, hr_id: Uuid) -> AppResult<u64>;

    /// Run before an HR record is removed
    async fn on_hr_deleted(&self, hr_id: Uuid) -> AppResult<u64>;

    /// Remove a user on behalf of an admin
    async fn delete_user(&self, acting_admin_id: Uuid, target_id: Uuid)
        -> AppResult<DeletionReport>;
}

/// Concrete implementation of CascadeService.
pub struct CascadeHandler {
    identity: Arc<dyn IdentityStore>,
    requests: Arc<dyn MappingRequestStore>,
}

impl CascadeHandler {
    pub fn new(identity: Arc<dyn IdentityStore>, requests: Arc<dyn MappingRequestStore>) -> Self {
        Self { identity, requests }
    }
}

#[async_trait]
impl CascadeService for CascadeHandler {
    async fn release_candidates(&self, hr_id: Uuid) -> AppResult<u64> {
        let released = self.identity.release_candidates(hr_id).await?;
        if released > 0 {
            info!(hr_id = %hr_id, released, "Released candidates assigned to HR");
        }
        Ok(released)
    }

    async fn on_hr_deleted(&self, hr_id: Uuid) -> AppResult<u64> {
        self.release_candidates(hr_id).await
    }

    async fn delete_user(
        &self,
        acting_admin_id: Uuid,
        target_id: Uuid,
    ) -> AppResult<DeletionReport> {
        let acting = self
            .identity
            .find_by_id(acting_admin_id)
            .await?
            .ok_or_not_found("user")?;
        if !acting.is_admin() {
            return Err(DomainError::WrongRole("only admins may delete users".to_string()).into());
        }
        if acting_admin_id == target_id {
            return Err(AppError::validation("admins cannot delete themselves"));
        }

        let target = self
            .identity
            .find_by_id(target_id)
            .await?
            .ok_or_not_found("user")?;
        if target.is_admin() {
            return Err(AppError::validation("admin accounts cannot be deleted"));
        }

        let mut report = DeletionReport {
            user_id: target_id,
            role: target.role(),
            demoted_from: None,
            cancelled_requests: 0,
            released_candidates: 0,
        };

        if let Some(state) = target.hr_state() {
            // Leave the workflow first so no accept or assignment can bind to
            // the HR while its dependents are cleaned up.
            if state.is_mapped() || state.is_pending() {
                if !self
                    .identity
                    .try_transition_hr(target_id, &[state], HrState::ProfileComplete)
                    .await?
                {
                    return Err(AppError::conflict(format!(
                        "HR {} changed state during deletion",
                        target_id
                    )));
                }
                report.demoted_from = Some(state.status());
            }

            report.cancelled_requests = self.requests.cancel_pending_for_hr(target_id).await?;
            report.released_candidates = self.on_hr_deleted(target_id).await?;
        }

        if !self.identity.delete(target_id).await? {
            return Err(AppError::not_found("user"));
        }

        info!(
            user_id = %target_id,
            role = %report.role,
            deleted_by = %acting_admin_id,
            cancelled_requests = report.cancelled_requests,
            released_candidates = report.released_candidates,
            "User deleted"
        );
        Ok(report)
    }
}
