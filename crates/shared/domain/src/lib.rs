//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! role-tagged users, mapping requests, inbox messages, validated inputs and
//! the interview scheduling gate.

pub mod constants;
pub mod error;
pub mod gate;
pub mod input;
pub mod mapping_request;
pub mod message;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use gate::{can_schedule_interview, ScheduleDecision, ScheduleDenial};
pub use input::{
    check, HrProfileUpdate, InboxPage, InvitationDraft, Registration, DEFAULT_INBOX_LIMIT,
};
pub use mapping_request::{MappingRequest, RequestStatus, RequestType};
pub use message::Message;
pub use user::{
    CandidateProfile, CandidateState, CandidateStatus, HrProfile, HrState, HrStatus, Role,
    RoleProfile, User,
};
