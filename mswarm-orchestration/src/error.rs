//! Erros de orquestração

use mswarm_core::CoreError;
use mswarm_pso::SwarmError;
use thiserror::Error;

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrchestrationError {
    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Função de custo e mundo discordam na dimensão
    #[error("Dimension mismatch: world has {world} axes, '{function}' expects {expected}")]
    DimensionMismatch {
        world: usize,
        function: String,
        expected: usize,
    },

    /// Erro de vetores/mundo
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Erro de swarm
    #[error("Swarm error: {0}")]
    Swarm(#[from] SwarmError),

    /// Violação do protocolo de troca (bug de topologia ou capacidade)
    #[error("Protocol violation on worker {worker}, phase {phase}: {reason}")]
    ProtocolViolation {
        worker: usize,
        phase: usize,
        reason: String,
    },

    /// Worker interrompido porque outro worker falhou
    #[error("Worker {worker} aborted after a fatal error elsewhere")]
    Aborted { worker: usize },

    /// Worker entrou em pânico
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    /// Coordenador recebeu menos conclusões que o esperado
    #[error("Expected {expected} completed swarms, received {received}")]
    MissingCompletion { expected: usize, received: usize },

    /// Falha ao criar thread
    #[error("Failed to spawn thread: {0}")]
    Spawn(String),

    /// Pipe de renderização falhou
    #[error("Render pipe failed: {0}")]
    RenderPipe(String),

    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for OrchestrationError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        OrchestrationError::LockPoisoned(err.to_string())
    }
}

impl OrchestrationError {
    /// `true` para o erro secundário de workers interrompidos
    pub fn is_abort(&self) -> bool {
        matches!(self, OrchestrationError::Aborted { .. })
    }
}
