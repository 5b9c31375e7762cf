//! Swarm: partículas, melhor global e função de custo

use crate::error::{SwarmError, SwarmResult};
use crate::particle::{Particle, ParticleId};
use mswarm_core::{CostFunction, Position, World};
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Conjunto de partículas com melhor posição compartilhada.
///
/// Invariante: `global_best` é o melhor pessoal de menor custo que este swarm
/// já observou. A ordem das partículas é a de inserção, exceto logo após
/// [`Swarm::sort_for_migration`].
#[derive(Clone)]
pub struct Swarm {
    pub(crate) particles: Vec<Particle>,
    pub(crate) global_best: Position,
    pub(crate) global_best_cost: f64,
    pub(crate) cost: Arc<dyn CostFunction>,
}

impl Swarm {
    /// Cria swarm com `count` partículas sorteadas no mundo.
    ///
    /// Posição e velocidade vêm do mesmo amostrador de posições (a velocidade
    /// não é reescalada). Empates no melhor global ficam com o primeiro.
    pub fn create<W, R>(
        swarm_id: usize,
        count: usize,
        world: &W,
        cost: Arc<dyn CostFunction>,
        rng: &mut R,
    ) -> SwarmResult<Self>
    where
        W: World,
        R: Rng + ?Sized,
    {
        if count == 0 {
            return Err(SwarmError::EmptySwarm);
        }

        let mut particles: Vec<Particle> = Vec::with_capacity(count);
        let mut best_slot = 0;

        for slot in 0..count {
            let position = world.random_position(rng);
            let velocity = world.random_position(rng);
            let fitness = cost.cost(&position);
            let id = ParticleId::new(swarm_id, slot);
            let particle = Particle::new(id, position, velocity, fitness);

            if slot == 0 || particle.best_cost() < particles[best_slot].best_cost() {
                best_slot = slot;
            }
            particles.push(particle);
        }

        let global_best = particles[best_slot].best().clone();
        let global_best_cost = particles[best_slot].best_cost();

        Ok(Self {
            particles,
            global_best,
            global_best_cost,
            cost,
        })
    }

    /// Monta swarm a partir de partículas existentes
    pub fn from_particles(
        particles: Vec<Particle>,
        cost: Arc<dyn CostFunction>,
    ) -> SwarmResult<Self> {
        let best = particles
            .iter()
            .reduce(|best, p| if p.best_cost() < best.best_cost() { p } else { best })
            .ok_or(SwarmError::EmptySwarm)?;

        let global_best = best.best().clone();
        let global_best_cost = best.best_cost();

        Ok(Self {
            particles,
            global_best,
            global_best_cost,
            cost,
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Melhor posição global deste swarm
    pub fn global_best(&self) -> &Position {
        &self.global_best
    }

    /// Custo do melhor global
    pub fn best_cost(&self) -> f64 {
        self.global_best_cost
    }

    pub fn cost_function(&self) -> &Arc<dyn CostFunction> {
        &self.cost
    }

    /// Avalia a função de custo do swarm
    pub fn cost_of(&self, position: &Position) -> f64 {
        self.cost.cost(position)
    }

    /// Ordena por custo do melhor pessoal, crescente (estável)
    pub fn sort_for_migration(&mut self) {
        self.particles.sort_by(|a, b| a.best_cost().total_cmp(&b.best_cost()));
    }

    /// Cópias dos slots `0..k`, os emigrantes da rodada
    pub fn emigrants(&self, k: usize) -> Vec<Particle> {
        self.particles[..k.min(self.particles.len())].to_vec()
    }

    /// Sobrescreve os slots `0..migrants.len()` com as partículas recebidas.
    ///
    /// Um imigrante com melhor pessoal abaixo do melhor global passa a ser o
    /// melhor global, preservando a invariante do swarm.
    pub fn receive_migrants(&mut self, migrants: Vec<Particle>) -> SwarmResult<()> {
        if migrants.len() > self.particles.len() {
            return Err(SwarmError::TooManyMigrants {
                capacity: self.particles.len(),
                received: migrants.len(),
            });
        }

        for (slot, migrant) in migrants.into_iter().enumerate() {
            if migrant.best_cost() < self.global_best_cost {
                self.global_best = migrant.best().clone();
                self.global_best_cost = migrant.best_cost();
            }
            self.particles[slot] = migrant;
        }

        Ok(())
    }

    /// Cópia profunda para consumo somente-leitura
    pub fn snapshot(&self) -> Swarm {
        self.clone()
    }
}

impl fmt::Debug for Swarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swarm")
            .field("particles", &self.particles.len())
            .field("global_best", &self.global_best)
            .field("global_best_cost", &self.global_best_cost)
            .field("cost", &self.cost.name())
            .finish()
    }
}
