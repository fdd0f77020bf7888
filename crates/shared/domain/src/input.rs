//! Validated inputs for user-facing operations.
//!
//! Field rules are declared with `validator` derives; [`check`] runs them
//! and folds every field error into one [`DomainError::Validation`].

use validator::{Validate, ValidationErrors};

use crate::error::{DomainError, DomainResult};
use crate::user::Role;

/// Default page size for a candidate inbox
pub const DEFAULT_INBOX_LIMIT: u64 = 20;

/// New user registration
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
}

/// HR profile fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct HrProfileUpdate {
    #[validate(range(min = 0, max = 80, message = "Years of experience must be between 0 and 80"))]
    pub years_of_experience: Option<i32>,
    #[validate(length(min = 1, max = 512, message = "Resume path must be 1 to 512 characters"))]
    pub resume_path: Option<String>,
}

/// Invitation text a mapped HR sends to a candidate
#[derive(Debug, Clone, Validate)]
pub struct InvitationDraft {
    /// Defaults to "Invitation from <username>" when absent
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "Message content is required"))]
    pub content: String,
}

/// One page of a candidate inbox, newest message first
#[derive(Debug, Clone, Copy, Validate)]
pub struct InboxPage {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u64,
    pub offset: u64,
}

impl Default for InboxPage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_INBOX_LIMIT,
            offset: 0,
        }
    }
}

/// Run the derived rules of `input`.
pub fn check<T: Validate>(input: &T) -> DomainResult<()> {
    input
        .validate()
        .map_err(|errors| DomainError::validation(format_validation_errors(&errors)))
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str) -> Registration {
        Registration {
            username: "recruiter".into(),
            email: email.into(),
            role: Role::Hr,
        }
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        assert!(check(&registration("hr@company.io")).is_ok());
        for email in [
            "no-at-sign",
            "@company.io",
            "a b@x.io",
            "a@@x.io",
            "a@x..io",
            "<script>@x.io",
            "a@x.io\n",
        ] {
            let err = check(&registration(email)).unwrap_err();
            assert_eq!(err, DomainError::validation("Invalid email format"), "{:?}", email);
        }
    }

    #[test]
    fn test_username_length_bounds() {
        let mut input = registration("hr@company.io");
        input.username = "ab".into();
        assert!(check(&input).is_err());

        input.username = "a".repeat(51);
        assert!(check(&input).is_err());
    }

    #[test]
    fn test_profile_update_bounds() {
        assert!(check(&HrProfileUpdate::default()).is_ok());

        let negative = HrProfileUpdate {
            years_of_experience: Some(-1),
            resume_path: None,
        };
        assert!(check(&negative).is_err());

        let huge = HrProfileUpdate {
            years_of_experience: Some(i32::MAX),
            resume_path: None,
        };
        assert!(check(&huge).is_err());

        let empty_path = HrProfileUpdate {
            years_of_experience: Some(3),
            resume_path: Some(String::new()),
        };
        assert!(check(&empty_path).is_err());
    }

    #[test]
    fn test_errors_are_joined_per_field() {
        let input = Registration {
            username: "x".into(),
            email: "nope".into(),
            role: Role::Candidate,
        };
        let err = check(&input).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation(
                "Invalid email format, Username must be between 3 and 50 characters"
            )
        );
    }

    #[test]
    fn test_inbox_page_limit() {
        assert!(check(&InboxPage::default()).is_ok());
        assert!(check(&InboxPage { limit: 0, offset: 0 }).is_err());
        assert!(check(&InboxPage { limit: 101, offset: 0 }).is_err());
    }
}
