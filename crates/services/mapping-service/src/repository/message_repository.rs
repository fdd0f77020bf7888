//! Message store: candidate inboxes.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::message::{self, ActiveModel, Entity as MessageEntity};
use common::{AppError, AppResult};
use domain::Message;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message store trait for dependency injection
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a new message
    async fn deliver(&self, message: &Message) -> AppResult<()>;

    /// Page through a recipient's messages, newest first
    async fn list_inbox(&self, recipient_id: Uuid, limit: u64, offset: u64)
        -> AppResult<Vec<Message>>;

    /// Stamp unread messages owned by `recipient_id` as read.
    /// Returns the number of messages that changed.
    async fn mark_read(&self, recipient_id: Uuid, ids: &[Uuid]) -> AppResult<u64>;
}

/// SeaORM implementation of MessageStore
pub struct MessageRepository {
    db: DatabaseConnection,
}

impl MessageRepository {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn deliver(&self, message: &Message) -> AppResult<()> {
        MessageEntity::insert(ActiveModel::from(message))
            .exec_without_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn list_inbox(
        &self,
        recipient_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::RecipientId.eq(recipient_id))
            .order_by_desc(message::Column::SentAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Message::from).collect())
    }

    async fn mark_read(&self, recipient_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let result = MessageEntity::update_many()
            .col_expr(message::Column::ReadAt, Expr::value(Utc::now()))
            .filter(message::Column::Id.is_in(ids.iter().copied()))
            .filter(message::Column::RecipientId.eq(recipient_id))
            .filter(message::Column::ReadAt.is_null())
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
