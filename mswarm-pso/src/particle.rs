//! Partícula do swarm

use mswarm_core::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identidade estável de uma partícula: swarm e slot onde nasceu.
///
/// Viaja junto com o conteúdo durante a migração, então permite rastrear quem
/// saiu de onde em cada rodada de troca.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId {
    /// Swarm de origem
    pub swarm: usize,
    /// Slot de origem
    pub slot: usize,
}

impl ParticleId {
    pub fn new(swarm: usize, slot: usize) -> Self {
        Self { swarm, slot }
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.swarm, self.slot)
    }
}

/// Uma solução candidata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    id: ParticleId,
    position: Position,
    velocity: Position,
    /// Melhor posição já visitada
    best: Position,
    /// Custo de `best`
    best_cost: f64,
}

impl Particle {
    /// Cria partícula cujo melhor pessoal é a própria posição inicial
    pub fn new(id: ParticleId, position: Position, velocity: Position, cost: f64) -> Self {
        Self {
            id,
            best: position.clone(),
            position,
            velocity,
            best_cost: cost,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Posição atual
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Velocidade atual
    pub fn velocity(&self) -> &Position {
        &self.velocity
    }

    /// Melhor posição pessoal
    pub fn best(&self) -> &Position {
        &self.best
    }

    /// Custo do melhor pessoal
    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    /// Aceita um movimento já validado contra o mundo
    pub(crate) fn commit_move(&mut self, position: Position, velocity: Position) {
        self.position = position;
        self.velocity = velocity;
    }

    /// Atualiza o melhor pessoal se `fitness` for estritamente menor.
    /// Retorna `true` quando houve melhora.
    pub(crate) fn observe(&mut self, fitness: f64) -> bool {
        if fitness < self.best_cost {
            self.best = self.position.clone();
            self.best_cost = fitness;
            true
        } else {
            false
        }
    }
}
