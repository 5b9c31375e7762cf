//! Tipos de erro para mswarm-pso

use mswarm_core::CoreError;
use thiserror::Error;

/// Resultado customizado para operações de swarm
pub type SwarmResult<T> = Result<T, SwarmError>;

/// Erros que podem ocorrer em operações de swarm
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwarmError {
    #[error("Swarm must contain at least one particle")]
    EmptySwarm,

    #[error("Too many migrants: swarm holds {capacity}, received {received}")]
    TooManyMigrants { capacity: usize, received: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}
