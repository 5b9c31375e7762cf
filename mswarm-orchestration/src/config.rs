//! Configuração de uma execução
//!
//! [`RunConfig`] é a superfície de dados simples (JSON, CLI). [`RunParameters`]
//! é a versão validada e imutável consumida pelo coordenador, com a função de
//! custo e o mundo já construídos.

use crate::error::{OrchestrationError, OrchestrationResult};
use mswarm_core::{Benchmark, BoxWorld, CostFunction, World};
use mswarm_pso::Coefficients;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuração serializável de uma execução
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Número de swarms (um worker por swarm)
    pub swarm_count: usize,
    /// Partículas em cada swarm
    pub particles_per_swarm: usize,
    /// Iterações totais por swarm
    pub iteration_count: usize,
    /// Rodadas de troca intermediárias
    pub switch_count: usize,
    /// Partículas enviadas por rodada
    pub switch_best_particle_count: usize,
    /// Pesos da fórmula de velocidade
    pub coefficients: Coefficients,
    /// Canto inferior do mundo
    pub lower: Vec<f64>,
    /// Canto superior do mundo
    pub upper: Vec<f64>,
    /// Função de benchmark
    pub function: Benchmark,
    /// Semente mestre (`None` = sorteada no início)
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            swarm_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            particles_per_swarm: 20,
            iteration_count: 100,
            switch_count: 10,
            switch_best_particle_count: 5,
            coefficients: Coefficients::default(),
            lower: vec![-500.0, -500.0],
            upper: vec![500.0, 500.0],
            function: Benchmark::Schwefel,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Lê configuração de JSON
    pub fn from_json(json: &str) -> OrchestrationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OrchestrationError::InvalidConfiguration(format!("malformed JSON: {e}")))
    }

    /// Valida contagens e coeficientes (limites são validados pelo `BoxWorld`)
    pub fn validate(&self) -> OrchestrationResult<()> {
        validate_counts(Counts {
            swarms: self.swarm_count,
            particles: self.particles_per_swarm,
            iterations: self.iteration_count,
            switches: self.switch_count,
            switch_best: self.switch_best_particle_count,
        })?;
        validate_coefficients(&self.coefficients)
    }
}

fn invalid(msg: impl Into<String>) -> OrchestrationError {
    OrchestrationError::InvalidConfiguration(msg.into())
}

struct Counts {
    swarms: usize,
    particles: usize,
    iterations: usize,
    switches: usize,
    switch_best: usize,
}

fn validate_counts(c: Counts) -> OrchestrationResult<()> {
    if c.swarms == 0 {
        return Err(invalid("swarm_count must be > 0"));
    }
    if c.particles == 0 {
        return Err(invalid("particles_per_swarm must be > 0"));
    }
    if c.iterations == 0 {
        return Err(invalid("iteration_count must be > 0"));
    }
    if c.switch_best == 0 {
        return Err(invalid("switch_best_particle_count must be > 0"));
    }
    if c.switch_best > c.particles {
        return Err(invalid(format!(
            "switch_best_particle_count ({}) exceeds particles_per_swarm ({})",
            c.switch_best, c.particles
        )));
    }
    // todo bloco tem ao menos uma iteração
    if c.switches >= c.iterations {
        return Err(invalid(format!(
            "switch_count ({}) must be below iteration_count ({})",
            c.switches, c.iterations
        )));
    }
    if exchange_capacity(c.swarms, c.switches, c.switch_best).is_none() {
        return Err(invalid(format!(
            "mailbox capacity overflows for {} swarms, {} switches of {} particles",
            c.swarms, c.switches, c.switch_best
        )));
    }
    Ok(())
}

/// `max(n * S, (S + 1) * k)`, `None` em overflow
fn exchange_capacity(swarms: usize, switches: usize, switch_best: usize) -> Option<usize> {
    let ring = swarms.checked_mul(switches)?;
    let received = switches.checked_add(1)?.checked_mul(switch_best)?;
    Some(ring.max(received))
}

fn validate_coefficients(c: &Coefficients) -> OrchestrationResult<()> {
    let named = [
        ("inertia", c.inertia),
        ("cognitive", c.cognitive),
        ("social", c.social),
    ];
    for (name, value) in named {
        if !value.is_finite() {
            return Err(invalid(format!("coefficient {name} must be finite, got {value}")));
        }
    }
    Ok(())
}

/// Deriva a semente de um worker a partir da semente mestre (SplitMix64)
pub fn derive_worker_seed(master: u64, worker: usize) -> u64 {
    let step = (worker as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = master.wrapping_add(step);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Parâmetros validados e imutáveis de uma execução
#[derive(Clone)]
pub struct RunParameters {
    pub swarm_count: usize,
    pub particles_per_swarm: usize,
    pub iteration_count: usize,
    pub switch_count: usize,
    pub switch_best_particle_count: usize,
    pub coefficients: Coefficients,
    pub world: BoxWorld,
    pub cost: Arc<dyn CostFunction>,
    pub seed: u64,
}

impl RunParameters {
    /// Constrói a partir da configuração usando o benchmark selecionado
    pub fn from_config(config: &RunConfig) -> OrchestrationResult<Self> {
        Self::with_cost(config, Arc::new(config.function))
    }

    /// Constrói com uma função de custo arbitrária
    pub fn with_cost(config: &RunConfig, cost: Arc<dyn CostFunction>) -> OrchestrationResult<Self> {
        config.validate()?;
        let world = BoxWorld::new(config.lower.clone(), config.upper.clone())?;

        let params = Self {
            swarm_count: config.swarm_count,
            particles_per_swarm: config.particles_per_swarm,
            iteration_count: config.iteration_count,
            switch_count: config.switch_count,
            switch_best_particle_count: config.switch_best_particle_count,
            coefficients: config.coefficients,
            world,
            cost,
            seed: config.seed.unwrap_or_else(rand::random),
        };
        params.validate()?;
        Ok(params)
    }

    /// Revalida tudo, inclusive a concordância de dimensão
    pub fn validate(&self) -> OrchestrationResult<()> {
        validate_counts(Counts {
            swarms: self.swarm_count,
            particles: self.particles_per_swarm,
            iterations: self.iteration_count,
            switches: self.switch_count,
            switch_best: self.switch_best_particle_count,
        })?;
        validate_coefficients(&self.coefficients)?;

        if let Some(expected) = self.cost.dimension() {
            if expected != self.world.dimension_size() {
                return Err(OrchestrationError::DimensionMismatch {
                    world: self.world.dimension_size(),
                    function: self.cost.name().to_string(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Número de blocos de iteração (uma troca após cada um)
    pub fn phase_count(&self) -> usize {
        self.switch_count.saturating_add(1)
    }

    /// Capacidade, em partículas, da caixa de entrada de cada worker.
    ///
    /// Nunca menor que `swarm_count * switch_count`; sobe até caber todos os
    /// imigrantes de uma execução, então um envio nunca bloqueia.
    pub fn mailbox_capacity(&self) -> usize {
        exchange_capacity(self.swarm_count, self.switch_count, self.switch_best_particle_count)
            .unwrap_or(usize::MAX)
    }

    /// Capacidade do canal de snapshots de cada worker
    pub fn render_capacity(&self) -> usize {
        self.phase_count()
    }

    /// Semente do RNG local de um worker
    pub fn worker_seed(&self, worker: usize) -> u64 {
        derive_worker_seed(self.seed, worker)
    }
}

impl fmt::Debug for RunParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunParameters")
            .field("swarm_count", &self.swarm_count)
            .field("particles_per_swarm", &self.particles_per_swarm)
            .field("iteration_count", &self.iteration_count)
            .field("switch_count", &self.switch_count)
            .field("switch_best_particle_count", &self.switch_best_particle_count)
            .field("coefficients", &self.coefficients)
            .field("world", &self.world)
            .field("cost", &self.cost.name())
            .field("seed", &self.seed)
            .finish()
    }
}
