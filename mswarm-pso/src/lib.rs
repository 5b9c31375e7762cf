//! # 🐝 mswarm-pso - Particle Swarm
//!
//! Modelo de dados do swarm (partícula, swarm) e o passo de atualização PSO
//! aplicado a um único swarm. A coordenação entre swarms fica em
//! `mswarm-orchestration`.
//!
//! ## Computational Complexity
//!
//! **Iteração - O(P × D):**
//! - P = partículas no swarm
//! - D = dimensão do mundo
//! - Uma avaliação da função de custo por partícula
//!
//! **Ordenação para migração - O(P log P)**
//!
//! ## Exemplo
//!
//! ```
//! use mswarm_core::prelude::*;
//! use mswarm_pso::{Coefficients, Swarm};
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let world = BoxWorld::symmetric(5.0, 2).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(9);
//! let mut swarm = Swarm::create(0, 10, &world, Arc::new(Benchmark::DeJong), &mut rng).unwrap();
//!
//! let before = swarm.best_cost();
//! swarm.run_block(20, &world, &Coefficients::default(), &mut rng).unwrap();
//! assert!(swarm.best_cost() <= before);
//! ```

pub mod error;
pub mod particle;
pub mod swarm;
pub mod update;

pub use error::{SwarmError, SwarmResult};
pub use particle::{Particle, ParticleId};
pub use swarm::Swarm;
pub use update::Coefficients;
