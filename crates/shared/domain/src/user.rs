//! User domain entity and related types.
//!
//! A user is an identity core plus exactly one role payload. The workflow
//! state of each role lives in an enum whose variants carry their own
//! references (`Assigned { hr_id }`, `Mapped { admin_id }`), so a candidate
//! that is assigned without an HR, or an HR that has a manager without being
//! mapped, cannot be constructed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::*;
use crate::error::{DomainError, DomainResult};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Hr,
    Admin,
}

impl Role {
    /// Persisted label
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => ROLE_CANDIDATE,
            Role::Hr => ROLE_HR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Parse a persisted label
    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            ROLE_CANDIDATE => Ok(Role::Candidate),
            ROLE_HR => Ok(Role::Hr),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(DomainError::integrity(format!("unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Candidate workflow state
// =============================================================================

/// Candidate mapping status, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    PendingResume,
    PendingAssignment,
    Assigned,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::PendingResume => MAPPING_PENDING_RESUME,
            CandidateStatus::PendingAssignment => MAPPING_PENDING_ASSIGNMENT,
            CandidateStatus::Assigned => MAPPING_ASSIGNED,
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            MAPPING_PENDING_RESUME => Ok(CandidateStatus::PendingResume),
            MAPPING_PENDING_ASSIGNMENT => Ok(CandidateStatus::PendingAssignment),
            MAPPING_ASSIGNED => Ok(CandidateStatus::Assigned),
            other => Err(DomainError::integrity(format!(
                "unknown mapping_status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate position in the mapping workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mapping_status", rename_all = "snake_case")]
pub enum CandidateState {
    PendingResume,
    PendingAssignment,
    Assigned { assigned_hr_id: Uuid },
}

impl CandidateState {
    pub fn status(&self) -> CandidateStatus {
        match self {
            CandidateState::PendingResume => CandidateStatus::PendingResume,
            CandidateState::PendingAssignment => CandidateStatus::PendingAssignment,
            CandidateState::Assigned { .. } => CandidateStatus::Assigned,
        }
    }

    /// HR the candidate is bound to, if any
    pub fn assigned_hr_id(&self) -> Option<Uuid> {
        match self {
            CandidateState::Assigned { assigned_hr_id } => Some(*assigned_hr_id),
            _ => None,
        }
    }

    /// Rebuild from persisted columns, rejecting combinations that break
    /// `assigned_hr_id.is_some() == (status == assigned)`.
    pub fn from_parts(status: &str, assigned_hr_id: Option<Uuid>) -> DomainResult<Self> {
        match (CandidateStatus::parse(status)?, assigned_hr_id) {
            (CandidateStatus::PendingResume, None) => Ok(CandidateState::PendingResume),
            (CandidateStatus::PendingAssignment, None) => Ok(CandidateState::PendingAssignment),
            (CandidateStatus::Assigned, Some(hr_id)) => Ok(CandidateState::Assigned {
                assigned_hr_id: hr_id,
            }),
            (CandidateStatus::Assigned, None) => Err(DomainError::integrity(
                "candidate is assigned but has no assigned_hr_id",
            )),
            (status, Some(hr_id)) => Err(DomainError::integrity(format!(
                "candidate in status '{}' references HR {}",
                status, hr_id
            ))),
        }
    }
}

// =============================================================================
// HR workflow state
// =============================================================================

/// HR status, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrStatus {
    PendingProfile,
    ProfileComplete,
    ApplicationPending,
    AdminRequestPending,
    Mapped,
}

impl HrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HrStatus::PendingProfile => HR_PENDING_PROFILE,
            HrStatus::ProfileComplete => HR_PROFILE_COMPLETE,
            HrStatus::ApplicationPending => HR_APPLICATION_PENDING,
            HrStatus::AdminRequestPending => HR_ADMIN_REQUEST_PENDING,
            HrStatus::Mapped => HR_MAPPED,
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            HR_PENDING_PROFILE => Ok(HrStatus::PendingProfile),
            HR_PROFILE_COMPLETE => Ok(HrStatus::ProfileComplete),
            HR_APPLICATION_PENDING => Ok(HrStatus::ApplicationPending),
            HR_ADMIN_REQUEST_PENDING => Ok(HrStatus::AdminRequestPending),
            HR_MAPPED => Ok(HrStatus::Mapped),
            other => Err(DomainError::integrity(format!("unknown hr_status '{}'", other))),
        }
    }
}

impl std::fmt::Display for HrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HR position in the mapping workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hr_status", rename_all = "snake_case")]
pub enum HrState {
    PendingProfile,
    ProfileComplete,
    ApplicationPending,
    AdminRequestPending,
    Mapped { admin_manager_id: Uuid },
}

impl HrState {
    /// The two states that belong to an open interaction.
    pub const PENDING: [HrState; 2] = [HrState::ApplicationPending, HrState::AdminRequestPending];

    pub fn status(&self) -> HrStatus {
        match self {
            HrState::PendingProfile => HrStatus::PendingProfile,
            HrState::ProfileComplete => HrStatus::ProfileComplete,
            HrState::ApplicationPending => HrStatus::ApplicationPending,
            HrState::AdminRequestPending => HrStatus::AdminRequestPending,
            HrState::Mapped { .. } => HrStatus::Mapped,
        }
    }

    /// Admin manager, if mapped
    pub fn admin_manager_id(&self) -> Option<Uuid> {
        match self {
            HrState::Mapped { admin_manager_id } => Some(*admin_manager_id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            HrState::ApplicationPending | HrState::AdminRequestPending
        )
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, HrState::Mapped { .. })
    }

    /// Rebuild from persisted columns, rejecting combinations that break
    /// `admin_manager_id.is_some() == (status == mapped)`.
    pub fn from_parts(status: &str, admin_manager_id: Option<Uuid>) -> DomainResult<Self> {
        match (HrStatus::parse(status)?, admin_manager_id) {
            (HrStatus::PendingProfile, None) => Ok(HrState::PendingProfile),
            (HrStatus::ProfileComplete, None) => Ok(HrState::ProfileComplete),
            (HrStatus::ApplicationPending, None) => Ok(HrState::ApplicationPending),
            (HrStatus::AdminRequestPending, None) => Ok(HrState::AdminRequestPending),
            (HrStatus::Mapped, Some(admin_id)) => Ok(HrState::Mapped {
                admin_manager_id: admin_id,
            }),
            (HrStatus::Mapped, None) => Err(DomainError::integrity(
                "HR is mapped but has no admin_manager_id",
            )),
            (status, Some(admin_id)) => Err(DomainError::integrity(format!(
                "HR in status '{}' references admin {}",
                status, admin_id
            ))),
        }
    }
}

// =============================================================================
// Role payloads
// =============================================================================

/// Candidate-only fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(flatten)]
    pub state: CandidateState,
    /// Reference to the stored resume (storage itself is external)
    pub resume_path: Option<String>,
}

/// HR-only fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrProfile {
    #[serde(flatten)]
    pub state: HrState,
    pub years_of_experience: Option<u32>,
    pub resume_path: Option<String>,
}

impl HrProfile {
    /// Resume and experience are both on record.
    pub fn has_profile_prerequisites(&self) -> bool {
        self.resume_path.is_some() && self.years_of_experience.is_some()
    }
}

/// Role-specific payload selected by the role tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Candidate(CandidateProfile),
    Hr(HrProfile),
    Admin,
}

impl RoleProfile {
    /// Payload a freshly registered user of `role` starts with
    pub fn initial(role: Role) -> Self {
        match role {
            Role::Candidate => RoleProfile::Candidate(CandidateProfile {
                state: CandidateState::PendingResume,
                resume_path: None,
            }),
            Role::Hr => RoleProfile::Hr(HrProfile {
                state: HrState::PendingProfile,
                years_of_experience: None,
                resume_path: None,
            }),
            Role::Admin => RoleProfile::Admin,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Candidate(_) => Role::Candidate,
            RoleProfile::Hr(_) => Role::Hr,
            RoleProfile::Admin => Role::Admin,
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user in the initial state of its role
    pub fn new(id: Uuid, username: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            profile: RoleProfile::initial(role),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        matches!(self.profile, RoleProfile::Admin)
    }

    pub fn as_candidate(&self) -> Option<&CandidateProfile> {
        match &self.profile {
            RoleProfile::Candidate(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn as_hr(&self) -> Option<&HrProfile> {
        match &self.profile {
            RoleProfile::Hr(profile) => Some(profile),
            _ => None,
        }
    }

    /// HR workflow state, if this user is an HR
    pub fn hr_state(&self) -> Option<HrState> {
        self.as_hr().map(|hr| hr.state)
    }

    /// Candidate workflow state, if this user is a candidate
    pub fn candidate_state(&self) -> Option<CandidateState> {
        self.as_candidate().map(|c| c.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_states_follow_role() {
        let candidate = User::new(Uuid::new_v4(), "cand".into(), "c@x.io".into(), Role::Candidate);
        assert_eq!(candidate.candidate_state(), Some(CandidateState::PendingResume));

        let hr = User::new(Uuid::new_v4(), "hrhr".into(), "h@x.io".into(), Role::Hr);
        assert_eq!(hr.hr_state(), Some(HrState::PendingProfile));

        let admin = User::new(Uuid::new_v4(), "root".into(), "a@x.io".into(), Role::Admin);
        assert!(admin.is_admin());
        assert!(admin.as_hr().is_none());
    }

    #[test]
    fn test_candidate_state_rejects_assigned_without_hr() {
        let err = CandidateState::from_parts(MAPPING_ASSIGNED, None).unwrap_err();
        assert!(matches!(err, DomainError::DataIntegrity(_)));

        let err = CandidateState::from_parts(MAPPING_PENDING_ASSIGNMENT, Some(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, DomainError::DataIntegrity(_)));

        let hr = Uuid::new_v4();
        assert_eq!(
            CandidateState::from_parts(MAPPING_ASSIGNED, Some(hr)).unwrap(),
            CandidateState::Assigned { assigned_hr_id: hr }
        );
    }

    #[test]
    fn test_hr_state_rejects_manager_outside_mapped() {
        assert!(HrState::from_parts(HR_MAPPED, None).is_err());
        assert!(HrState::from_parts(HR_PROFILE_COMPLETE, Some(Uuid::new_v4())).is_err());
        assert!(HrState::from_parts("retired", None).is_err());

        let admin = Uuid::new_v4();
        let state = HrState::from_parts(HR_MAPPED, Some(admin)).unwrap();
        assert_eq!(state.admin_manager_id(), Some(admin));
        assert_eq!(state.status(), HrStatus::Mapped);
    }

    #[test]
    fn test_serialized_shape_matches_record_fields() {
        let admin = Uuid::new_v4();
        let mut hr = User::new(Uuid::new_v4(), "hrhr".into(), "h@x.io".into(), Role::Hr);
        hr.profile = RoleProfile::Hr(HrProfile {
            state: HrState::Mapped { admin_manager_id: admin },
            years_of_experience: Some(4),
            resume_path: None,
        });

        let json = serde_json::to_value(&hr).unwrap();
        assert_eq!(json["role"], "hr");
        assert_eq!(json["hr_status"], "mapped");
        assert_eq!(json["admin_manager_id"], admin.to_string());
    }
}
