use keyplan_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a planning run.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Topic planning failed: {0}")]
    Planner(#[from] ClientError),

    #[error("Failed to export {}: {message}", path.display())]
    Export { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PlanError>;
