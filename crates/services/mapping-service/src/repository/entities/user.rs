//! User database entity for SeaORM.
//!
//! One row shape for all roles; role-specific columns are NULL for the
//! other roles. Rows are converted into the tagged domain `User` on read,
//! and a row whose columns contradict each other is a data integrity error.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{
    CandidateProfile, CandidateState, DomainError, HrProfile, HrState, Role, RoleProfile, User,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String,
    /// Candidate only
    pub mapping_status: Option<String>,
    /// Candidate only; set iff mapping_status = 'assigned'
    pub assigned_hr_id: Option<Uuid>,
    /// HR only
    pub hr_status: Option<String>,
    /// HR only; set iff hr_status = 'mapped'
    pub admin_manager_id: Option<Uuid>,
    pub years_of_experience: Option<i32>,
    pub resume_path: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let missing = |column: &str| {
            DomainError::integrity(format!("user {} has no {}", model.id, column))
        };

        let profile = match Role::parse(&model.role)? {
            Role::Candidate => {
                let status = model
                    .mapping_status
                    .as_deref()
                    .ok_or_else(|| missing("mapping_status"))?;
                RoleProfile::Candidate(CandidateProfile {
                    state: CandidateState::from_parts(status, model.assigned_hr_id)?,
                    resume_path: model.resume_path.clone(),
                })
            }
            Role::Hr => {
                let status = model
                    .hr_status
                    .as_deref()
                    .ok_or_else(|| missing("hr_status"))?;
                let years_of_experience = model
                    .years_of_experience
                    .map(u32::try_from)
                    .transpose()
                    .map_err(|_| {
                        DomainError::integrity(format!(
                            "user {} has negative years_of_experience",
                            model.id
                        ))
                    })?;
                RoleProfile::Hr(HrProfile {
                    state: HrState::from_parts(status, model.admin_manager_id)?,
                    years_of_experience,
                    resume_path: model.resume_path.clone(),
                })
            }
            Role::Admin => RoleProfile::Admin,
        };

        Ok(User {
            id: model.id,
            username: model.username,
            email: model.email,
            profile,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Build an insertable row from a domain entity
impl TryFrom<&User> for ActiveModel {
    type Error = DomainError;

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        let (mapping_status, assigned_hr_id) = match user.candidate_state() {
            Some(state) => (Some(state.status().as_str().to_string()), state.assigned_hr_id()),
            None => (None, None),
        };
        let (hr_status, admin_manager_id) = match user.hr_state() {
            Some(state) => (Some(state.status().as_str().to_string()), state.admin_manager_id()),
            None => (None, None),
        };
        let (years_of_experience, resume_path) = match &user.profile {
            RoleProfile::Candidate(c) => (None, c.resume_path.clone()),
            RoleProfile::Hr(hr) => (
                hr.years_of_experience
                    .map(i32::try_from)
                    .transpose()
                    .map_err(|_| DomainError::validation("years of experience out of range"))?,
                hr.resume_path.clone(),
            ),
            RoleProfile::Admin => (None, None),
        };

        Ok(ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role().as_str().to_string()),
            mapping_status: Set(mapping_status),
            assigned_hr_id: Set(assigned_hr_id),
            hr_status: Set(hr_status),
            admin_manager_id: Set(admin_manager_id),
            years_of_experience: Set(years_of_experience),
            resume_path: Set(resume_path),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        })
    }
}
