//! Messages delivered to a candidate inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::InvitationDraft;
use crate::user::User;

/// Inbox message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub subject: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Invitation from `sender` to a candidate, unread
    pub fn invitation(sender: &User, recipient_id: Uuid, draft: InvitationDraft) -> Self {
        let subject = draft
            .subject
            .filter(|subject| !subject.trim().is_empty())
            .unwrap_or_else(|| format!("Invitation from {}", sender.username));

        Self {
            id: Uuid::new_v4(),
            sender_id: sender.id,
            recipient_id,
            subject,
            content: draft.content,
            sent_at: Utc::now(),
            read_at: None,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;

    #[test]
    fn test_invitation_subject_defaults_to_sender() {
        let hr = User::new(Uuid::new_v4(), "recruiter".into(), "r@x.io".into(), Role::Hr);
        let draft = InvitationDraft {
            subject: Some("  ".into()),
            content: "Next round?".into(),
        };

        let message = Message::invitation(&hr, Uuid::new_v4(), draft);

        assert_eq!(message.subject, "Invitation from recruiter");
        assert_eq!(message.sender_id, hr.id);
        assert!(!message.is_read());
    }
}
