//! Tipos de erro para mswarm-core

use thiserror::Error;

/// Resultado customizado para operações do core
pub type CoreResult<T> = Result<T, CoreError>;

/// Erros de vetores, mundos e funções de custo
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid bounds on axis {axis}: [{lower}, {upper}] is not a finite, ordered range")]
    InvalidBounds { axis: usize, lower: f64, upper: f64 },

    #[error("World must have at least one dimension")]
    EmptyWorld,

    #[error("Unknown cost function: {0}")]
    UnknownFunction(String),
}
