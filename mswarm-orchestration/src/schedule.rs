//! Agenda de blocos e topologia de anel
//!
//! As iterações de cada worker são divididas em `switch_count + 1` blocos e
//! cada bloco termina com uma troca, inclusive o último. Após o bloco `p` (a
//! fase `p`), o worker `i` envia para `(i + p + 1) mod n` e recebe de
//! `(i - (p + 1)) mod n`. Para cada fase isso é uma permutação, então
//! todo worker recebe exatamente um lote por fase.

use serde::{Deserialize, Serialize};

/// Tamanho de cada bloco; o resto da divisão vai para o último bloco
pub fn block_sizes(iteration_count: usize, switch_count: usize) -> Vec<usize> {
    let blocks = switch_count + 1;
    let base = iteration_count / blocks;
    let mut sizes = vec![base; blocks];
    if let Some(last) = sizes.last_mut() {
        *last += iteration_count % blocks;
    }
    sizes
}

/// Destino do worker `worker` na fase `phase`
pub fn ring_destination(worker: usize, phase: usize, swarm_count: usize) -> usize {
    (worker + phase + 1) % swarm_count
}

/// Origem esperada para o worker `worker` na fase `phase`
pub fn ring_source(worker: usize, phase: usize, swarm_count: usize) -> usize {
    let shift = (phase + 1) % swarm_count;
    (worker + swarm_count - shift) % swarm_count
}

/// Plano de uma fase para um worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub phase: usize,
    /// Iterações deste bloco
    pub iterations: usize,
    /// Para quem enviar ao fim do bloco
    pub destination: usize,
    /// De quem receber ao fim do bloco
    pub source: usize,
}

/// Agenda completa, igual para todos os workers exceto pelo anel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    blocks: Vec<usize>,
    swarm_count: usize,
}

impl Schedule {
    pub fn new(iteration_count: usize, switch_count: usize, swarm_count: usize) -> Self {
        Self {
            blocks: block_sizes(iteration_count, switch_count),
            swarm_count,
        }
    }

    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }

    pub fn phase_count(&self) -> usize {
        self.blocks.len()
    }

    /// Rodadas de troca por worker (uma por bloco)
    pub fn exchange_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn total_iterations(&self) -> usize {
        self.blocks.iter().sum()
    }

    /// Plano de todas as fases de um worker
    pub fn plan(&self, worker: usize) -> Vec<PhasePlan> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(phase, &iterations)| PhasePlan {
                phase,
                iterations,
                destination: ring_destination(worker, phase, self.swarm_count),
                source: ring_source(worker, phase, self.swarm_count),
            })
            .collect()
    }
}
