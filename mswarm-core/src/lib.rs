//! # 🌐 MSWARM-Core
//!
//! Tipos de valor compartilhados pelo otimizador multi-swarm.
//!
//! ## Módulos
//!
//! - [`position`]: `Position` - ponto ou velocidade de dimensão fixa
//! - [`world`]: `World` e `BoxWorld` - limites e amostragem do espaço de busca
//! - [`cost`]: `CostFunction`, `CostFn` e os benchmarks embutidos
//! - [`error`]: `CoreError`
//!
//! ## Quick Start
//!
//! ```
//! use mswarm_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let world = BoxWorld::new([-5.0, -5.0], [5.0, 5.0]).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//!
//! let p = world.random_position(&mut rng);
//! assert!(world.contains(&p));
//! assert!(Benchmark::DeJong.cost(&p) <= 50.0);
//! ```

pub mod cost;
pub mod error;
pub mod position;
pub mod prelude;
pub mod world;

pub use cost::{Benchmark, CostFn, CostFunction};
pub use error::{CoreError, CoreResult};
pub use position::Position;
pub use world::{BoxWorld, World};
