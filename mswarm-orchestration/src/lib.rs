//! # 🎭 mswarm-orchestration - Coordenação Multi-Swarm
//!
//! Um worker (thread do SO) por swarm. Os workers alternam blocos de iterações
//! PSO com rodadas de troca num anel que gira a cada fase; ao final o
//! coordenador reduz todos os swarms ao melhor global.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MultiSwarm                            │
//! │  ┌──────────┐   ┌──────────┐          ┌──────────┐           │
//! │  │ worker 0 │──▶│ worker 1 │── … ───▶│ worker n │──┐ (anel)  │
//! │  └────┬─────┘   └────┬─────┘          └────┬─────┘  │        │
//! │       │ snapshots    │                     │        │        │
//! │       ▼              ▼                     ▼        │        │
//! │  ┌───────────────────────────────────────────────┐  │        │
//! │  │ RenderPipe → SnapshotSink (thread própria)    │  │        │
//! │  └───────────────────────────────────────────────┘  │        │
//! │  completion channel ◀── swarm final de cada worker ─┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use mswarm_orchestration::{MultiSwarm, RunConfig, RunParameters};
//! use mswarm_core::Benchmark;
//!
//! let config = RunConfig {
//!     swarm_count: 2,
//!     particles_per_swarm: 6,
//!     iteration_count: 20,
//!     switch_count: 3,
//!     switch_best_particle_count: 2,
//!     lower: vec![-5.0, -5.0],
//!     upper: vec![5.0, 5.0],
//!     function: Benchmark::DeJong,
//!     seed: Some(1),
//!     ..RunConfig::default()
//! };
//! let params = RunParameters::from_config(&config).unwrap();
//! let outcome = MultiSwarm::new(params).unwrap().run_discarding().unwrap();
//! assert_eq!(outcome.reports.len(), 2);
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod mailbox;
pub mod render_pipe;
pub mod schedule;
pub mod worker;

pub use config::{RunConfig, RunParameters, derive_worker_seed};
pub use coordinator::{MultiSwarm, RunOutcome, multi_swarm};
pub use error::{OrchestrationError, OrchestrationResult};
pub use mailbox::{AbortSignal, Inbox, Mailbox, MailboxSet, Migrant};
pub use render_pipe::{
    DiscardSink, RenderContext, RenderHandle, RenderPipe, RenderStats, SinkError, SinkResult,
    Snapshot, SnapshotSink,
};
pub use schedule::{PhasePlan, Schedule, block_sizes, ring_destination, ring_source};
pub use worker::{Completion, ExchangeRecord, Worker, WorkerReport, WorkerState, create_swarm};
