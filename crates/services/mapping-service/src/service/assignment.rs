//! Assignment gate - binds candidates to mapped HRs and decides who may
//! schedule their interviews.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    can_schedule_interview, CandidateState, DomainError, RoleProfile, ScheduleDecision, User,
};

use super::saga::Saga;
use crate::repository::IdentityStore;

/// Assignment service trait for dependency injection.
#[async_trait]
pub trait AssignmentService: Send + Sync {
    /// Bind a candidate awaiting assignment to a mapped HR
    async fn assign_candidate(&self, candidate_id: Uuid, hr_id: Uuid) -> AppResult<User>;

    /// Decide whether `requester_id` may schedule the candidate's interview
    async fn can_schedule_interview(
        &self,
        candidate_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<ScheduleDecision>;
}

/// Concrete implementation of AssignmentService.
pub struct AssignmentManager {
    identity: Arc<dyn IdentityStore>,
}

impl AssignmentManager {
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }

    async fn require_mapped_hr(&self, hr_id: Uuid) -> AppResult<()> {
        let state = self
            .identity
            .find_by_id(hr_id)
            .await?
            .and_then(|user| user.hr_state());

        match state {
            Some(state) if state.is_mapped() => Ok(()),
            Some(state) => Err(DomainError::NotEligibleHr(format!(
                "HR {} is {}, not mapped",
                hr_id,
                state.status()
            ))
            .into()),
            None => Err(DomainError::NotEligibleHr(format!("no HR with id {}", hr_id)).into()),
        }
    }
}

#[async_trait]
impl AssignmentService for AssignmentManager {
    async fn assign_candidate(&self, candidate_id: Uuid, hr_id: Uuid) -> AppResult<User> {
        let mut candidate = self
            .identity
            .find_by_id(candidate_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotEligibleCandidate(format!("no candidate with id {}", candidate_id))
            })?;
        match candidate.candidate_state() {
            Some(CandidateState::PendingAssignment) => {}
            Some(state) => {
                return Err(DomainError::NotEligibleCandidate(format!(
                    "candidate {} is {}",
                    candidate_id,
                    state.status()
                ))
                .into())
            }
            None => {
                return Err(DomainError::NotEligibleCandidate(format!(
                    "user {} is not a candidate",
                    candidate_id
                ))
                .into())
            }
        }

        self.require_mapped_hr(hr_id).await?;

        let identity = self.identity.as_ref();
        let assigned = CandidateState::Assigned {
            assigned_hr_id: hr_id,
        };

        let mut saga = Saga::new("assign_candidate");
        saga.step(
            "assign",
            async move {
                if identity
                    .try_transition_candidate(candidate_id, CandidateState::PendingAssignment, assigned)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AppError::conflict(format!(
                        "candidate {} was assigned or changed concurrently",
                        candidate_id
                    )))
                }
            },
            move || {
                Box::pin(async move {
                    // A cascade may already have released the candidate
                    if !identity
                        .try_transition_candidate(
                            candidate_id,
                            assigned,
                            CandidateState::PendingAssignment,
                        )
                        .await?
                    {
                        debug!(candidate_id = %candidate_id, "Candidate already released");
                    }
                    Ok(())
                })
            },
        )
        .await?;

        // The HR may have been unmapped or deleted between the check and
        // the assignment.
        saga.finish("confirm_hr_mapped", self.require_mapped_hr(hr_id))
            .await?;

        info!(candidate_id = %candidate_id, hr_id = %hr_id, "Candidate assigned to HR");

        if let RoleProfile::Candidate(profile) = &mut candidate.profile {
            profile.state = assigned;
        }
        candidate.updated_at = Utc::now();
        Ok(candidate)
    }

    async fn can_schedule_interview(
        &self,
        candidate_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<ScheduleDecision> {
        let candidate = self
            .identity
            .find_by_id(candidate_id)
            .await?
            .ok_or_not_found("candidate")?;
        let state = candidate.candidate_state().ok_or_else(|| {
            DomainError::NotEligibleCandidate(format!("user {} is not a candidate", candidate_id))
        })?;

        let requester = self
            .identity
            .find_by_id(requester_id)
            .await?
            .ok_or_not_found("user")?;

        let decision = can_schedule_interview(&state, &requester);
        if let Some(denial) = decision.denial {
            debug!(
                candidate_id = %candidate_id,
                requester_id = %requester_id,
                reason = %denial,
                "Interview scheduling denied"
            );
        }
        Ok(decision)
    }
}
