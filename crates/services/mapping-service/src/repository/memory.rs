//! In-process store backing every store trait.
//!
//! Used by the integration tests and for local runs without Postgres.
//! Every operation yields to the runtime before touching state, so tasks
//! driven by `tokio::join!` interleave between reads and conditional
//! writes the same way concurrent database clients do.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CleanupReport, IdentityStore, MappingRequestStore, MessageStore, ProfileFields};
use common::{AppError, AppResult};
use domain::{
    CandidateState, HrState, MappingRequest, Message, RequestStatus, RequestType, Role,
    RoleProfile, User,
};

struct Slot<T> {
    seq: u64,
    value: T,
}

struct Table<T> {
    next_seq: u64,
    rows: HashMap<Uuid, Slot<T>>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            next_seq: 0,
            rows: HashMap::new(),
        }
    }

    fn insert(&mut self, id: Uuid, value: T) {
        self.next_seq += 1;
        self.rows.insert(
            id,
            Slot {
                seq: self.next_seq,
                value,
            },
        );
    }

    fn get(&self, id: &Uuid) -> Option<&T> {
        self.rows.get(id).map(|slot| &slot.value)
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.rows.get_mut(id).map(|slot| &mut slot.value)
    }

    /// Rows in insertion order
    fn ordered(&self) -> Vec<&T> {
        let mut slots: Vec<&Slot<T>> = self.rows.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.value).collect()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut().map(|slot| &mut slot.value)
    }
}

/// Shared in-memory users, mapping requests and messages. Clones share state.
#[derive(Clone)]
pub struct MemoryStore {
    users: Arc<Mutex<Table<User>>>,
    requests: Arc<Mutex<Table<MappingRequest>>>,
    messages: Arc<Mutex<Table<Message>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Table::new())),
            requests: Arc::new(Mutex::new(Table::new())),
            messages: Arc::new(Mutex::new(Table::new())),
        }
    }

    fn users(&self) -> AppResult<MutexGuard<'_, Table<User>>> {
        self.users
            .lock()
            .map_err(|_| AppError::unavailable("memory user table poisoned"))
    }

    fn requests(&self) -> AppResult<MutexGuard<'_, Table<MappingRequest>>> {
        self.requests
            .lock()
            .map_err(|_| AppError::unavailable("memory request table poisoned"))
    }

    fn messages(&self) -> AppResult<MutexGuard<'_, Table<Message>>> {
        self.messages
            .lock()
            .map_err(|_| AppError::unavailable("memory message table poisoned"))
    }
}

fn involves_hr(request: &MappingRequest, hr_id: Uuid) -> bool {
    match request.request_type {
        RequestType::Application => request.requester_id == hr_id,
        RequestType::Request => request.target_id == hr_id,
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        tokio::task::yield_now().await;
        Ok(self.users()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        tokio::task::yield_now().await;
        Ok(self
            .users()?
            .ordered()
            .into_iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        tokio::task::yield_now().await;
        Ok(self
            .users()?
            .ordered()
            .into_iter()
            .filter(|user| user.role() == role)
            .cloned()
            .collect())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        tokio::task::yield_now().await;
        Ok(self.users()?.ordered().into_iter().cloned().collect())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        tokio::task::yield_now().await;
        let mut users = self.users()?;
        if users.get(&user.id).is_some() {
            return Err(AppError::conflict(format!("user {} already exists", user.id)));
        }
        if users.ordered().iter().any(|existing| existing.email == user.email) {
            return Err(AppError::conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_profile_fields(&self, id: Uuid, fields: ProfileFields) -> AppResult<bool> {
        tokio::task::yield_now().await;
        let mut users = self.users()?;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };

        match &mut user.profile {
            RoleProfile::Hr(hr) => {
                if let Some(years) = fields.years_of_experience {
                    hr.years_of_experience = Some(years);
                }
                if let Some(path) = fields.resume_path {
                    hr.resume_path = Some(path);
                }
            }
            RoleProfile::Candidate(candidate) => {
                if let Some(path) = fields.resume_path {
                    candidate.resume_path = Some(path);
                }
            }
            RoleProfile::Admin => {}
        }
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn try_transition_hr(&self, id: Uuid, from: &[HrState], to: HrState) -> AppResult<bool> {
        tokio::task::yield_now().await;
        let mut users = self.users()?;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        let RoleProfile::Hr(hr) = &mut user.profile else {
            return Ok(false);
        };
        if !from.contains(&hr.state) {
            return Ok(false);
        }

        hr.state = to;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn try_transition_candidate(
        &self,
        id: Uuid,
        from: CandidateState,
        to: CandidateState,
    ) -> AppResult<bool> {
        tokio::task::yield_now().await;
        let mut users = self.users()?;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        let RoleProfile::Candidate(candidate) = &mut user.profile else {
            return Ok(false);
        };
        if candidate.state != from {
            return Ok(false);
        }

        candidate.state = to;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn release_candidates(&self, hr_id: Uuid) -> AppResult<u64> {
        tokio::task::yield_now().await;
        let mut users = self.users()?;
        let now = Utc::now();
        let mut released = 0;

        for user in users.values_mut() {
            if let RoleProfile::Candidate(candidate) = &mut user.profile {
                if candidate.state.assigned_hr_id() == Some(hr_id) {
                    candidate.state = CandidateState::PendingAssignment;
                    user.updated_at = now;
                    released += 1;
                }
            }
        }

        Ok(released)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        tokio::task::yield_now().await;
        Ok(self.users()?.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl MappingRequestStore for MemoryStore {
    async fn insert(&self, request: &MappingRequest) -> AppResult<()> {
        tokio::task::yield_now().await;
        let mut requests = self.requests()?;
        if requests.get(&request.id).is_some() {
            return Err(AppError::conflict(format!(
                "mapping request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MappingRequest>> {
        tokio::task::yield_now().await;
        Ok(self.requests()?.get(&id).cloned())
    }

    async fn find_pending_for_target(
        &self,
        id: Uuid,
        target_id: Uuid,
    ) -> AppResult<Option<MappingRequest>> {
        tokio::task::yield_now().await;
        Ok(self
            .requests()?
            .get(&id)
            .filter(|request| request.target_id == target_id && request.is_pending())
            .cloned())
    }

    async fn find_pending_for_hr(&self, hr_id: Uuid) -> AppResult<Option<MappingRequest>> {
        tokio::task::yield_now().await;
        Ok(self
            .requests()?
            .ordered()
            .into_iter()
            .find(|request| request.is_pending() && involves_hr(request, hr_id))
            .cloned())
    }

    async fn list_pending_for_target(
        &self,
        target_id: Uuid,
        request_type: RequestType,
    ) -> AppResult<Vec<MappingRequest>> {
        tokio::task::yield_now().await;
        Ok(self
            .requests()?
            .ordered()
            .into_iter()
            .filter(|request| {
                request.is_pending()
                    && request.target_id == target_id
                    && request.request_type == request_type
            })
            .cloned()
            .collect())
    }

    async fn list_pending(&self) -> AppResult<Vec<MappingRequest>> {
        tokio::task::yield_now().await;
        Ok(self
            .requests()?
            .ordered()
            .into_iter()
            .filter(|request| request.is_pending())
            .cloned()
            .collect())
    }

    async fn try_transition(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<bool> {
        tokio::task::yield_now().await;
        let mut requests = self.requests()?;
        match requests.get_mut(&id) {
            Some(request) if request.status == from => {
                request.status = to;
                request.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn close_pending_for_hr(&self, hr_id: Uuid, keep: Uuid) -> AppResult<CleanupReport> {
        tokio::task::yield_now().await;
        let mut requests = self.requests()?;
        let now = Utc::now();
        let mut report = CleanupReport::default();

        for request in requests.values_mut() {
            if request.id == keep || !request.is_pending() || !involves_hr(request, hr_id) {
                continue;
            }
            match request.request_type {
                RequestType::Application => {
                    request.status = RequestStatus::Cancelled;
                    report.cancelled += 1;
                }
                RequestType::Request => {
                    request.status = RequestStatus::Rejected;
                    report.rejected += 1;
                }
            }
            request.updated_at = now;
        }

        Ok(report)
    }

    async fn cancel_pending_for_hr(&self, hr_id: Uuid) -> AppResult<u64> {
        tokio::task::yield_now().await;
        let mut requests = self.requests()?;
        let now = Utc::now();
        let mut cancelled = 0;

        for request in requests.values_mut() {
            if request.is_pending() && involves_hr(request, hr_id) {
                request.status = RequestStatus::Cancelled;
                request.updated_at = now;
                cancelled += 1;
            }
        }

        Ok(cancelled)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        tokio::task::yield_now().await;
        Ok(self.requests()?.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn deliver(&self, message: &Message) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.messages()?.insert(message.id, message.clone());
        Ok(())
    }

    async fn list_inbox(
        &self,
        recipient_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Message>> {
        tokio::task::yield_now().await;
        let messages = self.messages()?;
        // Newest first; insertion order breaks timestamp ties
        let mut inbox: Vec<&Message> = messages
            .ordered()
            .into_iter()
            .rev()
            .filter(|message| message.recipient_id == recipient_id)
            .collect();
        inbox.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));

        Ok(inbox
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, recipient_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        tokio::task::yield_now().await;
        let mut messages = self.messages()?;
        let now = Utc::now();
        let mut marked = 0;
        for id in ids {
            if let Some(message) = messages.get_mut(id) {
                if message.recipient_id == recipient_id && message.read_at.is_none() {
                    message.read_at = Some(now);
                    marked += 1;
                }
            }
        }

        Ok(marked)
    }
}
