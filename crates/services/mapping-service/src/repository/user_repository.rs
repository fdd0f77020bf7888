//! Identity store: user records and their guarded workflow transitions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{CandidateState, HrState, Role, User, MAPPING_ASSIGNED, MAPPING_PENDING_ASSIGNMENT};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Profile fields outside the workflow state. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub years_of_experience: Option<u32>,
    pub resume_path: Option<String>,
}

/// Identity store trait for dependency injection.
///
/// Workflow state (`hr_status`/`admin_manager_id`, `mapping_status`/
/// `assigned_hr_id`) only changes through the `try_transition_*` methods,
/// which apply the new state iff the record currently holds one of the
/// expected states and report whether a record matched.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users holding `role`, oldest first
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>>;

    /// List all users
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Insert a new user record
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Overwrite non-workflow profile fields
    async fn update_profile_fields(&self, id: Uuid, fields: ProfileFields) -> AppResult<bool>;

    /// Move an HR from any state in `from` to `to`
    async fn try_transition_hr(&self, id: Uuid, from: &[HrState], to: HrState) -> AppResult<bool>;

    /// Move a candidate from `from` to `to`
    async fn try_transition_candidate(
        &self,
        id: Uuid,
        from: CandidateState,
        to: CandidateState,
    ) -> AppResult<bool>;

    /// Return every candidate assigned to `hr_id` to `pending_assignment`.
    /// Reports how many were released.
    async fn release_candidates(&self, hr_id: Uuid) -> AppResult<u64>;

    /// Permanently delete user from the store
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// SeaORM implementation of IdentityStore
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Convert a row, logging rows that contradict the workflow invariants.
fn to_domain(model: user::Model) -> AppResult<User> {
    let id = model.id;
    User::try_from(model).map_err(|err| {
        tracing::error!("User {} failed integrity check: {}", id, err);
        AppError::from(err)
    })
}

fn hr_state_condition(state: &HrState) -> Condition {
    let manager = match state.admin_manager_id() {
        Some(admin_id) => user::Column::AdminManagerId.eq(admin_id),
        None => user::Column::AdminManagerId.is_null(),
    };
    Condition::all()
        .add(user::Column::HrStatus.eq(state.status().as_str()))
        .add(manager)
}

fn candidate_state_condition(state: &CandidateState) -> Condition {
    let owner = match state.assigned_hr_id() {
        Some(hr_id) => user::Column::AssignedHrId.eq(hr_id),
        None => user::Column::AssignedHrId.is_null(),
    };
    Condition::all()
        .add(user::Column::MappingStatus.eq(state.status().as_str()))
        .add(owner)
}

#[async_trait]
impl IdentityStore for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let active_model = ActiveModel::try_from(user)?;

        UserEntity::insert(active_model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::conflict(format!("email {} is already registered", user.email))
                }
                _ => AppError::from(err),
            })?;

        Ok(())
    }

    async fn update_profile_fields(&self, id: Uuid, fields: ProfileFields) -> AppResult<bool> {
        let mut update = UserEntity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(years) = fields.years_of_experience {
            let years = i32::try_from(years)
                .map_err(|_| AppError::validation("years of experience out of range"))?;
            update = update.col_expr(user::Column::YearsOfExperience, Expr::value(years));
        }
        if let Some(path) = fields.resume_path {
            update = update.col_expr(user::Column::ResumePath, Expr::value(path));
        }

        let result = update
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn try_transition_hr(&self, id: Uuid, from: &[HrState], to: HrState) -> AppResult<bool> {
        let guard = from
            .iter()
            .fold(Condition::any(), |cond, state| cond.add(hr_state_condition(state)));

        let result = UserEntity::update_many()
            .col_expr(user::Column::HrStatus, Expr::value(to.status().as_str()))
            .col_expr(user::Column::AdminManagerId, Expr::value(to.admin_manager_id()))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Role.eq(Role::Hr.as_str()))
            .filter(guard)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn try_transition_candidate(
        &self,
        id: Uuid,
        from: CandidateState,
        to: CandidateState,
    ) -> AppResult<bool> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::MappingStatus, Expr::value(to.status().as_str()))
            .col_expr(user::Column::AssignedHrId, Expr::value(to.assigned_hr_id()))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Role.eq(Role::Candidate.as_str()))
            .filter(candidate_state_condition(&from))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn release_candidates(&self, hr_id: Uuid) -> AppResult<u64> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::MappingStatus, Expr::value(MAPPING_PENDING_ASSIGNMENT))
            .col_expr(user::Column::AssignedHrId, Expr::value(Option::<Uuid>::None))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Role.eq(Role::Candidate.as_str()))
            .filter(user::Column::MappingStatus.eq(MAPPING_ASSIGNED))
            .filter(user::Column::AssignedHrId.eq(hr_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
