//! Candidate messaging - invitations from mapped HRs and the candidate inbox.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{
    check, CandidateState, DomainError, InboxPage, InvitationDraft, Message, Role, User,
};

use crate::repository::{IdentityStore, MessageStore};

/// Messaging service trait for dependency injection.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Send an invitation from a mapped HR to a candidate awaiting assignment
    async fn send_invitation(
        &self,
        hr_id: Uuid,
        candidate_id: Uuid,
        draft: InvitationDraft,
    ) -> AppResult<Message>;

    /// One page of the candidate's inbox, newest first
    async fn inbox(&self, candidate_id: Uuid, page: InboxPage) -> AppResult<Vec<Message>>;

    /// Mark the candidate's own messages as read; returns how many changed
    async fn mark_read(&self, candidate_id: Uuid, message_ids: Vec<Uuid>) -> AppResult<u64>;
}

/// Concrete implementation of MessagingService.
pub struct Messenger {
    identity: Arc<dyn IdentityStore>,
    messages: Arc<dyn MessageStore>,
}

impl Messenger {
    pub fn new(identity: Arc<dyn IdentityStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { identity, messages }
    }

    async fn require_candidate(&self, candidate_id: Uuid) -> AppResult<User> {
        let user = self
            .identity
            .find_by_id(candidate_id)
            .await?
            .ok_or_not_found("user")?;
        if user.role() != Role::Candidate {
            return Err(
                DomainError::WrongRole(format!("user {} is not a candidate", candidate_id)).into(),
            );
        }
        Ok(user)
    }
}

#[async_trait]
impl MessagingService for Messenger {
    async fn send_invitation(
        &self,
        hr_id: Uuid,
        candidate_id: Uuid,
        draft: InvitationDraft,
    ) -> AppResult<Message> {
        check(&draft)?;

        let sender = self.identity.find_by_id(hr_id).await?.ok_or_not_found("user")?;
        match sender.hr_state() {
            Some(state) if state.is_mapped() => {}
            Some(_) => return Err(DomainError::NotMapped.into()),
            None => {
                return Err(DomainError::WrongRole(format!("user {} is not an HR", hr_id)).into())
            }
        }

        let candidate = self
            .identity
            .find_by_id(candidate_id)
            .await?
            .filter(|user| user.role() == Role::Candidate)
            .ok_or_else(|| {
                DomainError::TargetNotFound(format!("no candidate with id {}", candidate_id))
            })?;
        match candidate.candidate_state() {
            Some(CandidateState::PendingAssignment) => {}
            Some(state) => {
                return Err(DomainError::NotEligibleCandidate(format!(
                    "candidate {} cannot be invited while {}",
                    candidate_id,
                    state.status()
                ))
                .into())
            }
            None => {
                return Err(DomainError::TargetNotFound(format!(
                    "no candidate with id {}",
                    candidate_id
                ))
                .into())
            }
        }

        let message = Message::invitation(&sender, candidate_id, draft);
        self.messages.deliver(&message).await?;

        info!(
            message_id = %message.id,
            hr_id = %hr_id,
            candidate_id = %candidate_id,
            "Invitation sent to candidate"
        );
        Ok(message)
    }

    async fn inbox(&self, candidate_id: Uuid, page: InboxPage) -> AppResult<Vec<Message>> {
        check(&page)?;
        self.require_candidate(candidate_id).await?;

        self.messages
            .list_inbox(candidate_id, page.limit, page.offset)
            .await
    }

    async fn mark_read(&self, candidate_id: Uuid, message_ids: Vec<Uuid>) -> AppResult<u64> {
        self.require_candidate(candidate_id).await?;
        if message_ids.is_empty() {
            return Ok(0);
        }

        let marked = self.messages.mark_read(candidate_id, &message_ids).await?;
        debug!(
            candidate_id = %candidate_id,
            requested = message_ids.len(),
            marked,
            "Messages marked read"
        );
        Ok(marked)
    }
}
