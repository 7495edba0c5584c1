use loyalty_engine::{accrual::AccrualClientError, pipeline::PipelineError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not prepare the database. {0}")]
    DatabaseError(#[from] StorageError),
    #[error("Could not create the accrual client. {0}")]
    AccrualClientError(#[from] AccrualClientError),
    #[error("The accrual pipeline stopped unexpectedly. {0}")]
    PipelineError(#[from] PipelineError),
}
