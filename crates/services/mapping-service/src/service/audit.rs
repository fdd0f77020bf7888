//! Read-only invariant audit and workflow statistics.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use common::AppResult;
use domain::{CandidateState, HrState, HrStatus, MappingRequest, User};

use crate::repository::{IdentityStore, MappingRequestStore};

/// One broken workflow invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// HR is party to more than one pending interaction
    MultiplePending { hr_id: Uuid, request_ids: Vec<Uuid> },
    /// HR holds a pending status with no pending interaction behind it
    PendingWithoutInteraction { hr_id: Uuid, status: HrStatus },
    /// Candidate assigned to an HR that no longer exists
    OwnerMissing { candidate_id: Uuid, hr_id: Uuid },
    /// Candidate assigned to an HR that is not mapped
    OwnerNotMapped { candidate_id: Uuid, hr_id: Uuid },
    /// Pending request whose requester or target no longer exists
    DanglingRequest { request_id: Uuid, missing_user_id: Uuid },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MultiplePending { hr_id, request_ids } => write!(
                f,
                "HR {} has {} pending interactions",
                hr_id,
                request_ids.len()
            ),
            Violation::PendingWithoutInteraction { hr_id, status } => {
                write!(f, "HR {} is {} without a pending interaction", hr_id, status)
            }
            Violation::OwnerMissing {
                candidate_id,
                hr_id,
            } => write!(f, "candidate {} assigned to missing HR {}", candidate_id, hr_id),
            Violation::OwnerNotMapped {
                candidate_id,
                hr_id,
            } => write!(f, "candidate {} assigned to unmapped HR {}", candidate_id, hr_id),
            Violation::DanglingRequest {
                request_id,
                missing_user_id,
            } => write!(
                f,
                "pending request {} references missing user {}",
                request_id, missing_user_id
            ),
        }
    }
}

/// Result of an audit scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub users_scanned: usize,
    pub pending_requests_scanned: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Workflow counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub total_users: usize,
    pub mapped_hrs: usize,
    pub assigned_candidates: usize,
    pub pending_requests: usize,
}

/// Audit service trait for dependency injection.
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Scan both stores for invariant violations. Never repairs anything.
    async fn audit(&self) -> AppResult<AuditReport>;

    async fn stats(&self) -> AppResult<WorkflowStats>;
}

/// Concrete implementation of AuditService.
pub struct Auditor {
    identity: Arc<dyn IdentityStore>,
    requests: Arc<dyn MappingRequestStore>,
}

impl Auditor {
    pub fn new(identity: Arc<dyn IdentityStore>, requests: Arc<dyn MappingRequestStore>) -> Self {
        Self { identity, requests }
    }
}

fn find_violations(users: &[User], pending: &[MappingRequest]) -> Vec<Violation> {
    let by_id: HashMap<Uuid, &User> = users.iter().map(|user| (user.id, user)).collect();
    let mut violations = Vec::new();

    let mut per_hr: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for request in pending {
        per_hr.entry(request.hr_id()).or_default().push(request.id);
        for party in [request.requester_id, request.target_id] {
            if !by_id.contains_key(&party) {
                violations.push(Violation::DanglingRequest {
                    request_id: request.id,
                    missing_user_id: party,
                });
            }
        }
    }

    let mut crowded: Vec<(Uuid, Vec<Uuid>)> = per_hr
        .iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(hr_id, ids)| (*hr_id, ids.clone()))
        .collect();
    crowded.sort();
    violations.extend(
        crowded
            .into_iter()
            .map(|(hr_id, request_ids)| Violation::MultiplePending { hr_id, request_ids }),
    );

    let with_interaction: HashSet<Uuid> = per_hr.keys().copied().collect();
    for user in users {
        if let Some(state) = user.hr_state() {
            if state.is_pending() && !with_interaction.contains(&user.id) {
                violations.push(Violation::PendingWithoutInteraction {
                    hr_id: user.id,
                    status: state.status(),
                });
            }
        }

        if let Some(CandidateState::Assigned { assigned_hr_id }) = user.candidate_state() {
            match by_id.get(&assigned_hr_id).and_then(|hr| hr.hr_state()) {
                Some(HrState::Mapped { .. }) => {}
                Some(_) => violations.push(Violation::OwnerNotMapped {
                    candidate_id: user.id,
                    hr_id: assigned_hr_id,
                }),
                None => violations.push(Violation::OwnerMissing {
                    candidate_id: user.id,
                    hr_id: assigned_hr_id,
                }),
            }
        }
    }

    violations
}

#[async_trait]
impl AuditService for Auditor {
    async fn audit(&self) -> AppResult<AuditReport> {
        let (users, pending) =
            tokio::try_join!(self.identity.list(), self.requests.list_pending())?;

        let violations = find_violations(&users, &pending);
        for violation in &violations {
            warn!(%violation, "Workflow invariant violated");
        }
        info!(
            users = users.len(),
            pending_requests = pending.len(),
            violations = violations.len(),
            "Audit finished"
        );

        Ok(AuditReport {
            users_scanned: users.len(),
            pending_requests_scanned: pending.len(),
            violations,
        })
    }

    async fn stats(&self) -> AppResult<WorkflowStats> {
        let (users, pending) =
            tokio::try_join!(self.identity.list(), self.requests.list_pending())?;

        Ok(WorkflowStats {
            total_users: users.len(),
            mapped_hrs: users
                .iter()
                .filter(|user| user.hr_state().is_some_and(|state| state.is_mapped()))
                .count(),
            assigned_candidates: users
                .iter()
                .filter(|user| {
                    user.candidate_state()
                        .is_some_and(|state| state.assigned_hr_id().is_some())
                })
                .count(),
            pending_requests: pending.len(),
        })
    }
}
