use sea_orm::DbErr;
use thiserror::Error;

pub type CrmResult<T> = Result<T, CrmError>;

/// Infrastructure failures. Validation problems are never reported here;
/// they live on the record as [`crate::ValidationErrors`].
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("opportunity has not been saved yet")]
    NotPersisted,
}
