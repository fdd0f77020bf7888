//! Interview scheduling eligibility.
//!
//! Pure predicate over a candidate and the user asking to schedule. No I/O:
//! callers load both records first.

use serde::Serialize;

use crate::user::{CandidateState, RoleProfile, User};

/// Why a scheduling attempt is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleDenial {
    /// Candidate has no assigned HR yet
    NotAssigned,
    /// Requesting HR is not mapped to an admin
    HrNotMapped,
    /// Requesting HR is not the candidate's assigned HR
    HrNotOwner,
    /// Requester's role can never schedule interviews
    RoleNotPermitted,
}

impl ScheduleDenial {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleDenial::NotAssigned => "not_assigned",
            ScheduleDenial::HrNotMapped => "hr_not_mapped",
            ScheduleDenial::HrNotOwner => "hr_not_owner",
            ScheduleDenial::RoleNotPermitted => "role_not_permitted",
        }
    }
}

impl std::fmt::Display for ScheduleDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`can_schedule_interview`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleDecision {
    pub allowed: bool,
    pub denial: Option<ScheduleDenial>,
}

impl ScheduleDecision {
    fn allow() -> Self {
        Self { allowed: true, denial: None }
    }

    fn deny(reason: ScheduleDenial) -> Self {
        Self { allowed: false, denial: Some(reason) }
    }
}

/// Decide whether `requester` may schedule an interview for a candidate in
/// `candidate` state.
///
/// Allowed iff the candidate is assigned and the requester is an admin, or a
/// mapped HR that owns the assignment.
pub fn can_schedule_interview(candidate: &CandidateState, requester: &User) -> ScheduleDecision {
    let owner = match candidate {
        CandidateState::Assigned { assigned_hr_id } => *assigned_hr_id,
        _ => return ScheduleDecision::deny(ScheduleDenial::NotAssigned),
    };

    match &requester.profile {
        RoleProfile::Admin => ScheduleDecision::allow(),
        RoleProfile::Hr(hr) if !hr.state.is_mapped() => {
            ScheduleDecision::deny(ScheduleDenial::HrNotMapped)
        }
        RoleProfile::Hr(_) if requester.id != owner => {
            ScheduleDecision::deny(ScheduleDenial::HrNotOwner)
        }
        RoleProfile::Hr(_) => ScheduleDecision::allow(),
        RoleProfile::Candidate(_) => ScheduleDecision::deny(ScheduleDenial::RoleNotPermitted),
    }
}
