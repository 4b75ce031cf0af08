//! Unified error types surfaced by the runtime API.
//!
//! Most combat failures are reported in-band (an ERROR result, a `false`
//! return). These variants cover lookups that callers asked for explicitly,
//! scheduler coordination and configuration loading.
use thiserror::Error;

use combat_core::{CombatId, Participant};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no encounter registered with id {0}")]
    CombatNotFound(CombatId),

    #[error("{0} is not in combat")]
    NotInCombat(Participant),

    #[error("combat tick task join failed")]
    SchedulerJoin(#[source] tokio::task::JoinError),

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse runtime configuration")]
    Config(#[from] serde_json::Error),
}
