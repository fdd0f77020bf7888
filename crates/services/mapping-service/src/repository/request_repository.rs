//! Mapping request store: HR <-> Admin interactions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::mapping_request::{self, ActiveModel, Entity as RequestEntity};
use common::{AppError, AppResult};
use domain::{
    MappingRequest, RequestStatus, RequestType, REQUEST_CANCELLED, REQUEST_PENDING,
    REQUEST_REJECTED, REQUEST_TYPE_APPLICATION, REQUEST_TYPE_REQUEST,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of closing an HR's competing interactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Applications the HR had sent
    pub cancelled: u64,
    /// Requests the HR had received
    pub rejected: u64,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.cancelled + self.rejected
    }
}

/// Mapping request store trait for dependency injection.
///
/// A request leaves `pending` only through `try_transition` or the bulk
/// close operations, all of which skip rows that are no longer pending.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MappingRequestStore: Send + Sync {
    /// Insert a new request record
    async fn insert(&self, request: &MappingRequest) -> AppResult<()>;

    /// Find request by ID regardless of status
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MappingRequest>>;

    /// Find a pending request addressed to `target_id`
    async fn find_pending_for_target(
        &self,
        id: Uuid,
        target_id: Uuid,
    ) -> AppResult<Option<MappingRequest>>;

    /// Find any pending interaction involving the HR, in either direction
    async fn find_pending_for_hr(&self, hr_id: Uuid) -> AppResult<Option<MappingRequest>>;

    /// List pending requests of `request_type` addressed to `target_id`, oldest first
    async fn list_pending_for_target(
        &self,
        target_id: Uuid,
        request_type: RequestType,
    ) -> AppResult<Vec<MappingRequest>>;

    /// List every pending request, oldest first
    async fn list_pending(&self) -> AppResult<Vec<MappingRequest>>;

    /// Move a request from `from` to `to`
    async fn try_transition(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<bool>;

    /// Close the HR's other pending interactions after a mapping.
    /// Applications it sent are cancelled, requests it received are rejected.
    async fn close_pending_for_hr(&self, hr_id: Uuid, keep: Uuid) -> AppResult<CleanupReport>;

    /// Cancel every pending interaction involving the HR
    async fn cancel_pending_for_hr(&self, hr_id: Uuid) -> AppResult<u64>;

    /// Remove a request record
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// SeaORM implementation of MappingRequestStore
pub struct RequestStore {
    db: DatabaseConnection,
}

impl RequestStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn close_where(&self, condition: Condition, to: &str) -> AppResult<u64> {
        let result = RequestEntity::update_many()
            .col_expr(mapping_request::Column::Status, Expr::value(to))
            .col_expr(mapping_request::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(mapping_request::Column::Status.eq(REQUEST_PENDING))
            .filter(condition)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}

fn to_domain(model: mapping_request::Model) -> AppResult<MappingRequest> {
    let id = model.id;
    MappingRequest::try_from(model).map_err(|err| {
        tracing::error!("Mapping request {} failed integrity check: {}", id, err);
        AppError::from(err)
    })
}

fn sent_by_hr(hr_id: Uuid) -> Condition {
    Condition::all()
        .add(mapping_request::Column::RequestType.eq(REQUEST_TYPE_APPLICATION))
        .add(mapping_request::Column::RequesterId.eq(hr_id))
}

fn received_by_hr(hr_id: Uuid) -> Condition {
    Condition::all()
        .add(mapping_request::Column::RequestType.eq(REQUEST_TYPE_REQUEST))
        .add(mapping_request::Column::TargetId.eq(hr_id))
}

fn involves_hr(hr_id: Uuid) -> Condition {
    Condition::any()
        .add(sent_by_hr(hr_id))
        .add(received_by_hr(hr_id))
}

#[async_trait]
impl MappingRequestStore for RequestStore {
    async fn insert(&self, request: &MappingRequest) -> AppResult<()> {
        let active_model = ActiveModel::from(request);

        RequestEntity::insert(active_model)
            .exec_without_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MappingRequest>> {
        let result = RequestEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn find_pending_for_target(
        &self,
        id: Uuid,
        target_id: Uuid,
    ) -> AppResult<Option<MappingRequest>> {
        let result = RequestEntity::find_by_id(id)
            .filter(mapping_request::Column::TargetId.eq(target_id))
            .filter(mapping_request::Column::Status.eq(REQUEST_PENDING))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn find_pending_for_hr(&self, hr_id: Uuid) -> AppResult<Option<MappingRequest>> {
        let result = RequestEntity::find()
            .filter(mapping_request::Column::Status.eq(REQUEST_PENDING))
            .filter(involves_hr(hr_id))
            .order_by_asc(mapping_request::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(to_domain).transpose()
    }

    async fn list_pending_for_target(
        &self,
        target_id: Uuid,
        request_type: RequestType,
    ) -> AppResult<Vec<MappingRequest>> {
        let models = RequestEntity::find()
            .filter(mapping_request::Column::TargetId.eq(target_id))
            .filter(mapping_request::Column::RequestType.eq(request_type.as_str()))
            .filter(mapping_request::Column::Status.eq(REQUEST_PENDING))
            .order_by_asc(mapping_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn list_pending(&self) -> AppResult<Vec<MappingRequest>> {
        let models = RequestEntity::find()
            .filter(mapping_request::Column::Status.eq(REQUEST_PENDING))
            .order_by_asc(mapping_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(to_domain).collect()
    }

    async fn try_transition(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<bool> {
        let result = RequestEntity::update_many()
            .col_expr(mapping_request::Column::Status, Expr::value(to.as_str()))
            .col_expr(mapping_request::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(mapping_request::Column::Id.eq(id))
            .filter(mapping_request::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn close_pending_for_hr(&self, hr_id: Uuid, keep: Uuid) -> AppResult<CleanupReport> {
        let cancelled = self
            .close_where(
                sent_by_hr(hr_id).add(mapping_request::Column::Id.ne(keep)),
                REQUEST_CANCELLED,
            )
            .await?;
        let rejected = self
            .close_where(
                received_by_hr(hr_id).add(mapping_request::Column::Id.ne(keep)),
                REQUEST_REJECTED,
            )
            .await?;

        Ok(CleanupReport {
            cancelled,
            rejected,
        })
    }

    async fn cancel_pending_for_hr(&self, hr_id: Uuid) -> AppResult<u64> {
        self.close_where(involves_hr(hr_id), REQUEST_CANCELLED).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = RequestEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
