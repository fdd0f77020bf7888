//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod mapping_request;
pub mod message;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use mapping_request::{
    ActiveModel as MappingRequestActiveModel, Entity as MappingRequestEntity,
    Model as MappingRequestModel,
};
#[allow(unused_imports)]
pub use message::{ActiveModel as MessageActiveModel, Entity as MessageEntity, Model as MessageModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
