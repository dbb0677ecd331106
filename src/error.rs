//! Error taxonomy for instance loading and solving.
//!
//! `BudgetExhausted` has no `Err` variant: exhausting the time or iteration
//! budget is a normal termination, not a failure (see `gvns.rs`).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("instance file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse instance: {0}")]
    ParseError(String),

    #[error("instance infeasible: {0}")]
    InstanceInfeasible(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
