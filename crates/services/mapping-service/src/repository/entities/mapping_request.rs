//! Mapping request database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{DomainError, MappingRequest, RequestStatus, RequestType, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mapping_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_type: String,
    pub requester_id: Uuid,
    pub requester_role: String,
    pub target_id: Uuid,
    pub target_role: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MappingRequest {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(MappingRequest {
            id: model.id,
            request_type: RequestType::parse(&model.request_type)?,
            requester_id: model.requester_id,
            requester_role: Role::parse(&model.requester_role)?,
            target_id: model.target_id,
            target_role: Role::parse(&model.target_role)?,
            status: RequestStatus::parse(&model.status)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&MappingRequest> for ActiveModel {
    fn from(request: &MappingRequest) -> Self {
        ActiveModel {
            id: Set(request.id),
            request_type: Set(request.request_type.as_str().to_string()),
            requester_id: Set(request.requester_id),
            requester_role: Set(request.requester_role.as_str().to_string()),
            target_id: Set(request.target_id),
            target_role: Set(request.target_role.as_str().to_string()),
            status: Set(request.status.as_str().to_string()),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
    }
}
