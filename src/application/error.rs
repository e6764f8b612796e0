use crate::adapter::gateway::error::RepositoryError;
use crate::entity::error::ScheduleError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),
}

impl ApplicationError {
    pub fn schedule_not_found(owner: Uuid) -> Self {
        ApplicationError::NotFound {
            entity: "schedule of user",
            id: owner,
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        ApplicationError::NotFound { entity: "user", id }
    }
}
