//! Domain-level constants.
//!
//! Persisted labels for roles and workflow statuses. Stores write these
//! strings verbatim, so changing one is a data migration.

// =============================================================================
// User Roles
// =============================================================================

/// Candidate role: interviewed by an assigned HR
pub const ROLE_CANDIDATE: &str = "candidate";

/// HR role: works under an Admin manager, interviews assigned candidates
pub const ROLE_HR: &str = "hr";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_CANDIDATE, ROLE_HR, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Candidate mapping statuses
// =============================================================================

pub const MAPPING_PENDING_RESUME: &str = "pending_resume";
pub const MAPPING_PENDING_ASSIGNMENT: &str = "pending_assignment";
pub const MAPPING_ASSIGNED: &str = "assigned";

// =============================================================================
// HR statuses
// =============================================================================

pub const HR_PENDING_PROFILE: &str = "pending_profile";
pub const HR_PROFILE_COMPLETE: &str = "profile_complete";
pub const HR_APPLICATION_PENDING: &str = "application_pending";
pub const HR_ADMIN_REQUEST_PENDING: &str = "admin_request_pending";
pub const HR_MAPPED: &str = "mapped";

// =============================================================================
// Mapping requests
// =============================================================================

/// HR -> Admin
pub const REQUEST_TYPE_APPLICATION: &str = "application";

/// Admin -> HR
pub const REQUEST_TYPE_REQUEST: &str = "request";

pub const REQUEST_PENDING: &str = "pending";
pub const REQUEST_ACCEPTED: &str = "accepted";
pub const REQUEST_REJECTED: &str = "rejected";
pub const REQUEST_CANCELLED: &str = "cancelled";
