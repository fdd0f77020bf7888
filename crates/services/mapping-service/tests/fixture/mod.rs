//! Shared fixtures for the workflow integration tests.

#![allow(dead_code)]

use uuid::Uuid;

use domain::{CandidateState, HrState, MappingRequest, Role, RoleProfile, User};
use mapping_service_lib::repository::{IdentityStore, MappingRequestStore, MemoryStore};
use mapping_service_lib::service::Services;

/// In-memory stores plus a service container wired to them
pub struct Fixture {
    pub store: MemoryStore,
    pub services: Services,
}

impl Fixture {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let services = Services::in_memory(store.clone());
        Self { store, services }
    }

    async fn seed(&self, role: Role, name: &str, profile: Option<RoleProfile>) -> User {
        let id = Uuid::new_v4();
        let mut user = User::new(id, name.to_string(), format!("{}@example.com", id), role);
        if let Some(profile) = profile {
            user.profile = profile;
        }
        self.store.create(&user).await.unwrap();
        user
    }

    pub async fn admin(&self) -> User {
        self.seed(Role::Admin, "admin", None).await
    }

    /// HR in `state`, with a complete profile
    pub async fn hr(&self, state: HrState) -> User {
        let profile = RoleProfile::Hr(domain::HrProfile {
            state,
            years_of_experience: Some(5),
            resume_path: Some("resumes/hr.pdf".to_string()),
        });
        self.seed(Role::Hr, "recruiter", Some(profile)).await
    }

    pub async fn candidate(&self, state: CandidateState) -> User {
        let profile = RoleProfile::Candidate(domain::CandidateProfile {
            state,
            resume_path: Some("resumes/candidate.pdf".to_string()),
        });
        self.seed(Role::Candidate, "candidate", Some(profile)).await
    }

    /// Store a request as if written earlier, bypassing the engine
    pub async fn seed_request(&self, request: &MappingRequest) {
        self.store.insert(request).await.unwrap();
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        IdentityStore::find_by_id(&self.store, id).await.unwrap()
    }

    pub async fn hr_state(&self, id: Uuid) -> HrState {
        self.user(id).await.unwrap().hr_state().unwrap()
    }

    pub async fn candidate_state(&self, id: Uuid) -> CandidateState {
        self.user(id).await.unwrap().candidate_state().unwrap()
    }

    pub async fn request(&self, id: Uuid) -> MappingRequest {
        MappingRequestStore::find_by_id(&self.store, id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Pending interactions touching the HR, either direction
    pub async fn pending_for_hr(&self, hr_id: Uuid) -> Vec<MappingRequest> {
        self.store
            .list_pending()
            .await
            .unwrap()
            .into_iter()
            .filter(|request| request.hr_id() == hr_id)
            .collect()
    }
}
