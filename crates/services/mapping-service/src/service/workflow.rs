//! Workflow engine - HR <-> Admin applications, requests and their outcomes.
//!
//! Every decision re-reads current state from the stores. Every write to an
//! HR's workflow state is a conditional transition, and multi-record writes
//! run as a [`Saga`] so a lost race leaves nothing half applied.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    DomainError, ErrorKind, HrState, MappingRequest, RequestStatus, RequestType, Role, User,
};

use super::cascade::CascadeService;
use super::saga::Saga;
use crate::repository::{IdentityStore, MappingRequestStore};

/// Outcome of a voluntary unmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmapReport {
    pub hr_id: Uuid,
    /// Admin the HR was mapped to
    pub admin_id: Uuid,
    /// Candidates returned to `pending_assignment`
    pub released_candidates: u64,
}

/// Mapping workflow trait for dependency injection.
#[async_trait]
pub trait MappingWorkflow: Send + Sync {
    /// HR applies to an Admin
    async fn create_application(&self, hr_id: Uuid, admin_id: Uuid) -> AppResult<MappingRequest>;

    /// Admin asks an HR to join
    async fn create_request(&self, admin_id: Uuid, hr_id: Uuid) -> AppResult<MappingRequest>;

    /// Accept a pending request addressed to the acting user
    async fn accept(&self, request_id: Uuid, acting_user_id: Uuid) -> AppResult<MappingRequest>;

    /// Reject a pending request addressed to the acting user
    async fn reject(&self, request_id: Uuid, acting_user_id: Uuid) -> AppResult<MappingRequest>;

    /// Unbind a mapped HR from its Admin
    async fn unmap(&self, hr_id: Uuid) -> AppResult<UnmapReport>;

    /// Pending applications addressed to the Admin, oldest first
    async fn pending_applications_for_admin(&self, admin_id: Uuid)
        -> AppResult<Vec<MappingRequest>>;

    /// Pending requests addressed to the HR, oldest first
    async fn pending_requests_for_hr(&self, hr_id: Uuid) -> AppResult<Vec<MappingRequest>>;

    /// Admins the HR may apply to
    async fn available_admins(&self, hr_id: Uuid) -> AppResult<Vec<User>>;
}

/// Concrete implementation of MappingWorkflow over the two stores.
pub struct WorkflowEngine {
    identity: Arc<dyn IdentityStore>,
    requests: Arc<dyn MappingRequestStore>,
    cascade: Arc<dyn CascadeService>,
}

impl WorkflowEngine {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        requests: Arc<dyn MappingRequestStore>,
        cascade: Arc<dyn CascadeService>,
    ) -> Self {
        Self {
            identity,
            requests,
            cascade,
        }
    }

    /// Load the HR opening an interaction and check it is free to do so.
    async fn load_available_hr(&self, hr_id: Uuid, missing: DomainError) -> AppResult<User> {
        let hr = self
            .identity
            .find_by_id(hr_id)
            .await?
            .ok_or_else(|| missing.clone())?;
        let state = hr.hr_state().ok_or(missing)?;

        match state {
            HrState::ProfileComplete => Ok(hr),
            HrState::ApplicationPending | HrState::AdminRequestPending => {
                Err(DomainError::AlreadyPending.into())
            }
            HrState::Mapped { .. } => Err(DomainError::AlreadyMapped.into()),
            HrState::PendingProfile => Err(DomainError::NotEligible(format!(
                "HR {} has not completed their profile",
                hr_id
            ))
            .into()),
        }
    }

    async fn ensure_no_pending(&self, hr_id: Uuid) -> AppResult<()> {
        match self.requests.find_pending_for_hr(hr_id).await? {
            Some(existing) => {
                debug!(hr_id = %hr_id, request_id = %existing.id, "HR already has a pending interaction");
                Err(DomainError::AlreadyPending.into())
            }
            None => Ok(()),
        }
    }

    /// Insert the pending request, then move the HR out of
    /// `profile_complete`. A lost race deletes the inserted row.
    async fn open_interaction(&self, request: MappingRequest) -> AppResult<MappingRequest> {
        let identity = self.identity.as_ref();
        let requests = self.requests.as_ref();
        let request_id = request.id;
        let hr_id = request.hr_id();
        let pending = request.pending_hr_state();

        let mut saga = Saga::new("open_interaction");
        saga.step("insert_request", requests.insert(&request), move || {
            Box::pin(async move { requests.delete(request_id).await.map(|_| ()) })
        })
        .await?;

        saga.finish("mark_hr_pending", async move {
            if identity
                .try_transition_hr(hr_id, &[HrState::ProfileComplete], pending)
                .await?
            {
                Ok(())
            } else {
                Err(AppError::conflict(format!(
                    "HR {} changed state before {} could be opened",
                    hr_id, request_id
                )))
            }
        })
        .await?;

        info!(
            request_id = %request_id,
            request_type = %request.request_type,
            hr_id = %hr_id,
            admin_id = %request.admin_id(),
            "Mapping interaction opened"
        );
        Ok(request)
    }

    /// Find a pending request addressed to the acting user and check the
    /// user may respond to it.
    async fn actionable_request(
        &self,
        request_id: Uuid,
        acting_user_id: Uuid,
    ) -> AppResult<MappingRequest> {
        let acting = self
            .identity
            .find_by_id(acting_user_id)
            .await?
            .ok_or_not_found("user")?;

        let request = self
            .requests
            .find_pending_for_target(request_id, acting_user_id)
            .await?
            .ok_or_not_found("mapping request")?;

        let responder = request.request_type.responder_role();
        if acting.role() != responder {
            warn!(
                request_id = %request_id,
                acting_user_id = %acting_user_id,
                "Wrong role attempted to respond to mapping request"
            );
            return Err(DomainError::WrongRole(format!(
                "only {} users may respond to a {}",
                responder, request.request_type
            ))
            .into());
        }

        Ok(request)
    }

    /// Return a pending HR to `profile_complete` once no pending
    /// interaction involves it any more.
    async fn settle_if_idle(&self, hr_id: Uuid) -> AppResult<()> {
        if let Some(other) = self.requests.find_pending_for_hr(hr_id).await? {
            debug!(hr_id = %hr_id, request_id = %other.id, "HR keeps status for remaining interaction");
        } else if self
            .identity
            .try_transition_hr(hr_id, &HrState::PENDING, HrState::ProfileComplete)
            .await?
        {
            info!(hr_id = %hr_id, "HR returned to profile_complete");
        } else {
            debug!(hr_id = %hr_id, "HR not in a pending status, left unchanged");
        }
        Ok(())
    }

    async fn require_role(&self, user_id: Uuid, role: Role) -> AppResult<User> {
        let user = self
            .identity
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("user")?;
        if user.role() != role {
            return Err(DomainError::WrongRole(format!("user {} is not {}", user_id, role)).into());
        }
        Ok(user)
    }
}

#[async_trait]
impl MappingWorkflow for WorkflowEngine {
    async fn create_application(&self, hr_id: Uuid, admin_id: Uuid) -> AppResult<MappingRequest> {
        self.load_available_hr(
            hr_id,
            DomainError::NotEligible(format!("user {} is not an HR", hr_id)),
        )
        .await
        .map_err(|err| match err.as_domain() {
            // Applications report a mapped HR as ineligible
            Some(DomainError::AlreadyMapped) => {
                DomainError::NotEligible(format!("HR {} is already mapped", hr_id)).into()
            }
            _ => err,
        })?;

        let admin = self.identity.find_by_id(admin_id).await?;
        if !admin.is_some_and(|admin| admin.is_admin()) {
            return Err(DomainError::TargetNotFound(format!("admin {}", admin_id)).into());
        }

        self.ensure_no_pending(hr_id).await?;
        self.open_interaction(MappingRequest::application(hr_id, admin_id))
            .await
    }

    async fn create_request(&self, admin_id: Uuid, hr_id: Uuid) -> AppResult<MappingRequest> {
        let admin = self
            .identity
            .find_by_id(admin_id)
            .await?
            .ok_or_not_found("user")?;
        if !admin.is_admin() {
            return Err(DomainError::NotEligible(format!("user {} is not an admin", admin_id)).into());
        }

        self.load_available_hr(hr_id, DomainError::TargetNotFound(format!("HR {}", hr_id)))
            .await?;

        self.ensure_no_pending(hr_id).await?;
        self.open_interaction(MappingRequest::request(admin_id, hr_id))
            .await
    }

    async fn accept(&self, request_id: Uuid, acting_user_id: Uuid) -> AppResult<MappingRequest> {
        let request = self.actionable_request(request_id, acting_user_id).await?;
        let hr_id = request.hr_id();
        let admin_id = request.admin_id();

        let prior = self
            .identity
            .find_by_id(hr_id)
            .await?
            .and_then(|hr| hr.hr_state())
            .ok_or_else(|| {
                error!(
                    request_id = %request_id,
                    hr_id = %hr_id,
                    "Pending mapping request references a missing HR"
                );
                AppError::integrity(format!(
                    "pending request {} references missing HR {}",
                    request_id, hr_id
                ))
            })?;
        if !prior.is_pending() {
            return Err(AppError::conflict(format!(
                "HR {} is {} and no longer waiting on {}",
                hr_id,
                prior.status(),
                request_id
            )));
        }

        let identity = self.identity.as_ref();
        let requests = self.requests.as_ref();
        let mapped = HrState::Mapped {
            admin_manager_id: admin_id,
        };

        let mut saga = Saga::new("accept");
        saga.step(
            "map_hr",
            async move {
                if identity
                    .try_transition_hr(hr_id, &HrState::PENDING, mapped)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AppError::conflict(format!(
                        "HR {} left its pending state before {} was accepted",
                        hr_id, request_id
                    )))
                }
            },
            move || {
                Box::pin(async move {
                    if identity.try_transition_hr(hr_id, &[mapped], prior).await? {
                        Ok(())
                    } else {
                        Err(AppError::integrity(format!(
                            "HR {} no longer mapped to {} during revert",
                            hr_id, admin_id
                        )))
                    }
                })
            },
        )
        .await?;

        let finalized = saga
            .finish("accept_request", async move {
                if requests
                    .try_transition(request_id, RequestStatus::Pending, RequestStatus::Accepted)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AppError::conflict(format!(
                        "mapping request {} was actioned concurrently",
                        request_id
                    )))
                }
            })
            .await;
        if let Err(err) = finalized {
            // The revert restored a pending status. If the request was
            // rejected meanwhile, that status has nothing left behind it.
            if err.kind() == Some(ErrorKind::Conflict) {
                if let Err(settle_err) = self.settle_if_idle(hr_id).await {
                    warn!(hr_id = %hr_id, error = %settle_err, "Could not settle HR after lost accept");
                }
            }
            return Err(err);
        }

        info!(request_id = %request_id, hr_id = %hr_id, admin_id = %admin_id, "HR mapped to admin");

        match self.requests.close_pending_for_hr(hr_id, request_id).await {
            Ok(report) if report.total() > 0 => {
                info!(
                    hr_id = %hr_id,
                    cancelled = report.cancelled,
                    rejected = report.rejected,
                    "Closed competing mapping interactions"
                );
            }
            Ok(_) => {}
            Err(err) => {
                warn!(hr_id = %hr_id, error = %err, "Cleanup of competing interactions failed");
            }
        }

        let mut accepted = request;
        accepted.status = RequestStatus::Accepted;
        accepted.updated_at = Utc::now();
        Ok(accepted)
    }

    async fn reject(&self, request_id: Uuid, acting_user_id: Uuid) -> AppResult<MappingRequest> {
        let request = self.actionable_request(request_id, acting_user_id).await?;
        let hr_id = request.hr_id();

        if !self
            .requests
            .try_transition(request_id, RequestStatus::Pending, RequestStatus::Rejected)
            .await?
        {
            // Actioned between lookup and write
            return Err(AppError::not_found("mapping request"));
        }
        info!(request_id = %request_id, hr_id = %hr_id, "Mapping request rejected");

        self.settle_if_idle(hr_id).await?;

        let mut rejected = request;
        rejected.status = RequestStatus::Rejected;
        rejected.updated_at = Utc::now();
        Ok(rejected)
    }

    async fn unmap(&self, hr_id: Uuid) -> AppResult<UnmapReport> {
        let hr = self
            .identity
            .find_by_id(hr_id)
            .await?
            .ok_or_not_found("HR user")?;
        let state = hr
            .hr_state()
            .ok_or_else(|| DomainError::WrongRole("only HR users can unmap".to_string()))?;
        let HrState::Mapped { admin_manager_id } = state else {
            return Err(DomainError::NotMapped.into());
        };

        let identity = self.identity.as_ref();
        let cascade = self.cascade.as_ref();

        let mut saga = Saga::new("unmap");
        saga.step(
            "demote_hr",
            async move {
                if identity
                    .try_transition_hr(hr_id, &[state], HrState::ProfileComplete)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AppError::conflict(format!("HR {} changed state during unmap", hr_id)))
                }
            },
            move || {
                Box::pin(async move {
                    if identity
                        .try_transition_hr(hr_id, &[HrState::ProfileComplete], state)
                        .await?
                    {
                        Ok(())
                    } else {
                        Err(AppError::integrity(format!(
                            "HR {} could not be re-mapped to {}",
                            hr_id, admin_manager_id
                        )))
                    }
                })
            },
        )
        .await?;

        let released_candidates = saga
            .finish("release_candidates", cascade.release_candidates(hr_id))
            .await?;
        info!(
            hr_id = %hr_id,
            admin_id = %admin_manager_id,
            released_candidates,
            "HR unmapped"
        );

        Ok(UnmapReport {
            hr_id,
            admin_id: admin_manager_id,
            released_candidates,
        })
    }

    async fn pending_applications_for_admin(
        &self,
        admin_id: Uuid,
    ) -> AppResult<Vec<MappingRequest>> {
        self.require_role(admin_id, Role::Admin).await?;
        self.requests
            .list_pending_for_target(admin_id, RequestType::Application)
            .await
    }

    async fn pending_requests_for_hr(&self, hr_id: Uuid) -> AppResult<Vec<MappingRequest>> {
        self.require_role(hr_id, Role::Hr).await?;
        self.requests
            .list_pending_for_target(hr_id, RequestType::Request)
            .await
    }

    async fn available_admins(&self, hr_id: Uuid) -> AppResult<Vec<User>> {
        let hr = self.require_role(hr_id, Role::Hr).await?;
        if hr.hr_state() != Some(HrState::ProfileComplete) {
            return Err(DomainError::NotEligible(format!(
                "HR {} can only browse admins while profile_complete",
                hr_id
            ))
            .into());
        }
        self.identity.list_by_role(Role::Admin).await
    }
}
