//! Profile manager - registration and the profile steps that feed the
//! mapping workflow.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    check, CandidateState, DomainError, HrProfileUpdate, HrState, Registration, Role, User,
};

use crate::repository::{IdentityStore, ProfileFields};

/// Profile service trait for dependency injection.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Register a user in the initial state of its role
    async fn register_user(&self, username: String, email: String, role: Role) -> AppResult<User>;

    /// Record HR experience and resume; completes the profile once both exist
    async fn update_hr_profile(
        &self,
        hr_id: Uuid,
        years_of_experience: Option<i32>,
        resume_path: Option<String>,
    ) -> AppResult<User>;

    /// Record a candidate's resume and queue it for assignment
    async fn record_candidate_resume(&self, candidate_id: Uuid, resume_path: String)
        -> AppResult<User>;
}

/// Concrete implementation of ProfileService.
pub struct ProfileManager {
    identity: Arc<dyn IdentityStore>,
}

impl ProfileManager {
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }
}

fn validate_resume_path(path: &str) -> AppResult<()> {
    if path.trim().is_empty() {
        return Err(AppError::validation("resume path must not be empty"));
    }
    Ok(())
}

#[async_trait]
impl ProfileService for ProfileManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.identity.find_by_id(id).await?.ok_or_not_found("user")
    }

    async fn register_user(&self, username: String, email: String, role: Role) -> AppResult<User> {
        let registration = Registration {
            username: username.trim().to_string(),
            email,
            role,
        };
        check(&registration)?;
        let email = registration.email.to_lowercase();

        // Check if email already exists
        if self.identity.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(format!("email {} is already registered", email)));
        }

        let user = User::new(Uuid::new_v4(), registration.username, email, role);
        self.identity.create(&user).await?;

        info!(user_id = %user.id, role = %role, "User registered");
        Ok(user)
    }

    async fn update_hr_profile(
        &self,
        hr_id: Uuid,
        years_of_experience: Option<i32>,
        resume_path: Option<String>,
    ) -> AppResult<User> {
        let user = self.get_user(hr_id).await?;
        if user.role() != Role::Hr {
            return Err(DomainError::WrongRole(format!("user {} is not an HR", hr_id)).into());
        }

        let update = HrProfileUpdate {
            years_of_experience,
            resume_path,
        };
        check(&update)?;
        if let Some(path) = &update.resume_path {
            validate_resume_path(path)?;
        }

        let years_of_experience = update
            .years_of_experience
            .map(|years| {
                u32::try_from(years)
                    .map_err(|_| AppError::validation("years of experience cannot be negative"))
            })
            .transpose()?;
        let fields = ProfileFields {
            years_of_experience,
            resume_path: update.resume_path,
        };
        if !self.identity.update_profile_fields(hr_id, fields).await? {
            return Err(AppError::not_found("user"));
        }

        let updated = self.get_user(hr_id).await?;
        let ready = updated
            .as_hr()
            .is_some_and(|hr| hr.state == HrState::PendingProfile && hr.has_profile_prerequisites());
        if !ready {
            return Ok(updated);
        }

        if self
            .identity
            .try_transition_hr(hr_id, &[HrState::PendingProfile], HrState::ProfileComplete)
            .await?
        {
            info!(hr_id = %hr_id, "HR profile complete");
        } else {
            debug!(hr_id = %hr_id, "HR profile completed concurrently");
        }
        self.get_user(hr_id).await
    }

    async fn record_candidate_resume(
        &self,
        candidate_id: Uuid,
        resume_path: String,
    ) -> AppResult<User> {
        let user = self.get_user(candidate_id).await?;
        let Some(state) = user.candidate_state() else {
            return Err(
                DomainError::WrongRole(format!("user {} is not a candidate", candidate_id)).into(),
            );
        };
        validate_resume_path(&resume_path)?;

        let fields = ProfileFields {
            years_of_experience: None,
            resume_path: Some(resume_path),
        };
        if !self.identity.update_profile_fields(candidate_id, fields).await? {
            return Err(AppError::not_found("user"));
        }

        if state == CandidateState::PendingResume
            && self
                .identity
                .try_transition_candidate(
                    candidate_id,
                    CandidateState::PendingResume,
                    CandidateState::PendingAssignment,
                )
                .await?
        {
            info!(candidate_id = %candidate_id, "Candidate awaiting assignment");
        }
        self.get_user(candidate_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockIdentityStore;

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let existing = User::new(Uuid::new_v4(), "taken".into(), "hr@x.io".into(), Role::Hr);
        let mut identity = MockIdentityStore::new();
        identity
            .expect_find_by_email()
            .withf(|email| email == "hr@x.io")
            .returning(move |_| Ok(Some(existing.clone())));
        identity.expect_create().never();

        let manager = ProfileManager::new(Arc::new(identity));
        let err = manager
            .register_user("another".into(), "HR@x.io".into(), Role::Hr)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_negative_experience_is_rejected() {
        let hr = User::new(Uuid::new_v4(), "hrhr".into(), "hr@x.io".into(), Role::Hr);
        let hr_id = hr.id;
        let mut identity = MockIdentityStore::new();
        identity
            .expect_find_by_id()
            .returning(move |_| Ok(Some(hr.clone())));
        identity.expect_update_profile_fields().never();

        let manager = ProfileManager::new(Arc::new(identity));
        let err = manager
            .update_hr_profile(hr_id, Some(-2), None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_implausible_experience_is_rejected() {
        let hr = User::new(Uuid::new_v4(), "hrhr".into(), "hr@x.io".into(), Role::Hr);
        let hr_id = hr.id;
        let mut identity = MockIdentityStore::new();
        identity
            .expect_find_by_id()
            .returning(move |_| Ok(Some(hr.clone())));
        identity.expect_update_profile_fields().never();

        let manager = ProfileManager::new(Arc::new(identity));
        for years in [81, 1000, i32::MAX] {
            let err = manager
                .update_hr_profile(hr_id, Some(years), None)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email_before_lookup() {
        let mut identity = MockIdentityStore::new();
        identity.expect_find_by_email().never();
        identity.expect_create().never();

        let manager = ProfileManager::new(Arc::new(identity));
        for email in ["a b@x.io", "a@@x.io", "a@x..io", "<script>@x.io", "a@x.io\n"] {
            let err = manager
                .register_user("recruiter".into(), email.into(), Role::Hr)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "{:?}", email);
        }
    }
}
