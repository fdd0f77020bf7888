//! Inbox message database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::Message;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub sent_at: DateTimeUtc,
    /// NULL while unread
    pub read_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Message {
    fn from(model: Model) -> Self {
        Message {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            subject: model.subject,
            content: model.content,
            sent_at: model.sent_at,
            read_at: model.read_at,
        }
    }
}

impl From<&Message> for ActiveModel {
    fn from(message: &Message) -> Self {
        ActiveModel {
            id: Set(message.id),
            sender_id: Set(message.sender_id),
            recipient_id: Set(message.recipient_id),
            subject: Set(message.subject.clone()),
            content: Set(message.content.clone()),
            sent_at: Set(message.sent_at),
            read_at: Set(message.read_at),
        }
    }
}
