//! Passo de atualização PSO
//!
//! Uma iteração percorre as partículas em ordem de slot:
//!
//! ```text
//! v' = w·v + c1·r1·(pbest − x) + c2·r2·(gbest − x)
//! x' = x + v'
//! ```
//!
//! Se `x'` sai do mundo o movimento é rejeitado: posição e velocidade ficam
//! como estavam nesta iteração (sem clamp, sem reflexão).

use crate::error::SwarmResult;
use crate::swarm::Swarm;
use mswarm_core::World;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pesos da fórmula de velocidade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coefficients {
    /// Peso da velocidade anterior (1.0 = fórmula clássica sem inércia)
    pub inertia: f64,
    /// Peso cognitivo (c1)
    pub cognitive: f64,
    /// Peso social (c2)
    pub social: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            inertia: 1.0,
            cognitive: 2.0,
            social: 2.0,
        }
    }
}

impl Coefficients {
    pub fn new(cognitive: f64, social: f64) -> Self {
        Self {
            cognitive,
            social,
            ..Self::default()
        }
    }

    pub fn with_inertia(mut self, inertia: f64) -> Self {
        self.inertia = inertia;
        self
    }
}

impl Swarm {
    /// Executa uma iteração PSO sobre todas as partículas.
    ///
    /// `r1` e `r2` são sorteados em `[0, 1)` por partícula, nessa ordem. Cada
    /// partícula lê o melhor global como ele está no início da sua própria
    /// atualização.
    pub fn iterate<W, R>(
        &mut self,
        world: &W,
        coefficients: &Coefficients,
        rng: &mut R,
    ) -> SwarmResult<()>
    where
        W: World,
        R: Rng + ?Sized,
    {
        let Swarm {
            particles,
            global_best,
            global_best_cost,
            cost,
        } = self;

        for particle in particles.iter_mut() {
            let r1: f64 = rng.gen_range(0.0..1.0);
            let r2: f64 = rng.gen_range(0.0..1.0);

            let cognitive = particle
                .best()
                .subtract(particle.position())?
                .scale(coefficients.cognitive * r1);
            let social = global_best
                .subtract(particle.position())?
                .scale(coefficients.social * r2);

            let velocity = particle
                .velocity()
                .scale(coefficients.inertia)
                .add(&cognitive)?
                .add(&social)?;
            let candidate = particle.position().add(&velocity)?;

            if world.contains(&candidate) {
                particle.commit_move(candidate, velocity);
            }

            let fitness = cost.cost(particle.position());
            if particle.observe(fitness) && particle.best_cost() < *global_best_cost {
                *global_best = particle.best().clone();
                *global_best_cost = particle.best_cost();
            }
        }

        Ok(())
    }

    /// Executa `count` iterações seguidas
    pub fn run_block<W, R>(
        &mut self,
        count: usize,
        world: &W,
        coefficients: &Coefficients,
        rng: &mut R,
    ) -> SwarmResult<()>
    where
        W: World,
        R: Rng + ?Sized,
    {
        for _ in 0..count {
            self.iterate(world, coefficients, rng)?;
        }
        Ok(())
    }
}
