//! HR <-> Admin mapping interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::*;
use crate::error::{DomainError, DomainResult};
use crate::user::{HrState, Role};

/// Direction of a mapping interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// HR applies to an Admin
    Application,
    /// Admin asks an HR
    Request,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Application => REQUEST_TYPE_APPLICATION,
            RequestType::Request => REQUEST_TYPE_REQUEST,
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            REQUEST_TYPE_APPLICATION => Ok(RequestType::Application),
            REQUEST_TYPE_REQUEST => Ok(RequestType::Request),
            other => Err(DomainError::integrity(format!("unknown request_type '{}'", other))),
        }
    }

    /// Role allowed to accept or reject this kind of interaction
    pub fn responder_role(&self) -> Role {
        match self {
            RequestType::Application => Role::Admin,
            RequestType::Request => Role::Hr,
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a mapping interaction. Only `Pending` is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => REQUEST_PENDING,
            RequestStatus::Accepted => REQUEST_ACCEPTED,
            RequestStatus::Rejected => REQUEST_REJECTED,
            RequestStatus::Cancelled => REQUEST_CANCELLED,
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            REQUEST_PENDING => Ok(RequestStatus::Pending),
            REQUEST_ACCEPTED => Ok(RequestStatus::Accepted),
            REQUEST_REJECTED => Ok(RequestStatus::Rejected),
            REQUEST_CANCELLED => Ok(RequestStatus::Cancelled),
            other => Err(DomainError::integrity(format!("unknown request status '{}'", other))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HR <-> Admin interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub id: Uuid,
    pub request_type: RequestType,
    pub requester_id: Uuid,
    pub requester_role: Role,
    pub target_id: Uuid,
    pub target_role: Role,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingRequest {
    /// New pending application from an HR to an Admin
    pub fn application(hr_id: Uuid, admin_id: Uuid) -> Self {
        Self::pending(RequestType::Application, hr_id, Role::Hr, admin_id, Role::Admin)
    }

    /// New pending request from an Admin to an HR
    pub fn request(admin_id: Uuid, hr_id: Uuid) -> Self {
        Self::pending(RequestType::Request, admin_id, Role::Admin, hr_id, Role::Hr)
    }

    fn pending(
        request_type: RequestType,
        requester_id: Uuid,
        requester_role: Role,
        target_id: Uuid,
        target_role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request_type,
            requester_id,
            requester_role,
            target_id,
            target_role,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The HR party of the interaction
    pub fn hr_id(&self) -> Uuid {
        match self.request_type {
            RequestType::Application => self.requester_id,
            RequestType::Request => self.target_id,
        }
    }

    /// The Admin party of the interaction
    pub fn admin_id(&self) -> Uuid {
        match self.request_type {
            RequestType::Application => self.target_id,
            RequestType::Request => self.requester_id,
        }
    }

    /// HR state an open interaction of this type puts the HR in
    pub fn pending_hr_state(&self) -> HrState {
        match self.request_type {
            RequestType::Application => HrState::ApplicationPending,
            RequestType::Request => HrState::AdminRequestPending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parties_resolve_by_direction() {
        let hr = Uuid::new_v4();
        let admin = Uuid::new_v4();

        let app = MappingRequest::application(hr, admin);
        assert_eq!(app.hr_id(), hr);
        assert_eq!(app.admin_id(), admin);
        assert_eq!(app.requester_role, Role::Hr);
        assert_eq!(app.request_type.responder_role(), Role::Admin);

        let req = MappingRequest::request(admin, hr);
        assert_eq!(req.hr_id(), hr);
        assert_eq!(req.admin_id(), admin);
        assert_eq!(req.target_role, Role::Hr);
        assert_eq!(req.request_type.responder_role(), Role::Hr);
    }

    #[test]
    fn test_only_pending_is_open() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(RequestStatus::parse("archived").is_err());
    }
}
