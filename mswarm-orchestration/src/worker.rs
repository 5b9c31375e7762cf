//! Worker: dono de um swarm durante toda a execução
//!
//! Ciclo de vida:
//!
//! ```text
//! Initializing → Running(0) → Exchanging(0) → Running(1) → … → Exchanging(S) → Done
//! ```
//!
//! Cada bloco termina com um snapshot para o render pipe e uma rodada de troca
//! no anel. O RNG é local ao worker e semeado a partir da semente mestre.

use crate::config::RunParameters;
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::mailbox::{AbortSignal, Inbox, MailboxSet};
use crate::render_pipe::Snapshot;
use crate::schedule::{PhasePlan, Schedule};
use crossbeam_channel::{Sender, TrySendError};
use mswarm_pso::{ParticleId, Swarm};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;

/// Estado do worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Initializing,
    /// Executando o bloco da fase
    Running(usize),
    /// Trocando partículas ao fim da fase
    Exchanging(usize),
    Done,
    Failed,
}

/// O que uma rodada de troca moveu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub phase: usize,
    pub destination: usize,
    pub source: usize,
    /// Identidades enviadas, em ordem de envio
    pub sent: Vec<ParticleId>,
    /// Identidades recebidas, em ordem de chegada
    pub received: Vec<ParticleId>,
}

/// Relatório de um worker concluído
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: usize,
    /// Semente do RNG local
    pub seed: u64,
    /// Iterações executadas
    pub iterations: usize,
    /// Tamanho de cada bloco executado
    pub blocks: Vec<usize>,
    pub exchanges: Vec<ExchangeRecord>,
    /// Snapshots aceitos pelo render pipe
    pub snapshots_emitted: usize,
    /// Custo do melhor global final
    pub best_cost: f64,
    /// Custo do melhor global ao fim de cada bloco (antes da troca)
    pub history: Vec<f64>,
}

impl WorkerReport {
    fn new(worker: usize, seed: u64) -> Self {
        Self {
            worker,
            seed,
            iterations: 0,
            blocks: Vec::new(),
            exchanges: Vec::new(),
            snapshots_emitted: 0,
            best_cost: f64::INFINITY,
            history: Vec::new(),
        }
    }
}

/// Mensagem de conclusão: o swarm final (movido) e o relatório
#[derive(Debug)]
pub struct Completion {
    pub worker: usize,
    pub swarm: Swarm,
    pub report: WorkerReport,
}

/// Swarm inicial de um worker: `particles_per_swarm` partículas sorteadas no
/// mundo da execução, com identidades `(worker, slot)`
pub fn create_swarm<R: Rng + ?Sized>(
    worker: usize,
    params: &RunParameters,
    rng: &mut R,
) -> OrchestrationResult<Swarm> {
    let swarm = Swarm::create(
        worker,
        params.particles_per_swarm,
        &params.world,
        Arc::clone(&params.cost),
        rng,
    )?;
    Ok(swarm)
}

/// Dispara o sinal de abort se a thread do worker entrar em pânico
pub(crate) struct AbortOnPanic<'a>(pub(crate) &'a AbortSignal);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.trigger();
        }
    }
}

/// Worker de um swarm
pub struct Worker<'a> {
    id: usize,
    params: &'a RunParameters,
    schedule: &'a Schedule,
    mailboxes: &'a MailboxSet,
    inbox: Inbox,
    snapshots: Sender<Snapshot>,
    state: WorkerState,
}

impl<'a> Worker<'a> {
    pub fn new(
        id: usize,
        params: &'a RunParameters,
        schedule: &'a Schedule,
        mailboxes: &'a MailboxSet,
        inbox: Inbox,
        snapshots: Sender<Snapshot>,
    ) -> Self {
        Self {
            id,
            params,
            schedule,
            mailboxes,
            inbox,
            snapshots,
            state: WorkerState::Initializing,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Executa todas as fases e devolve o swarm final.
    ///
    /// Consome o worker: o canal de snapshots fecha quando ele termina, com
    /// sucesso ou não.
    pub fn run(mut self) -> OrchestrationResult<Completion> {
        let result = self.run_phases();
        if result.is_err() {
            self.transition(WorkerState::Failed);
        }
        result
    }

    fn run_phases(&mut self) -> OrchestrationResult<Completion> {
        let params = self.params;
        let seed = params.worker_seed(self.id);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut swarm = create_swarm(self.id, params, &mut rng)?;
        let mut report = WorkerReport::new(self.id, seed);

        tracing::debug!(
            worker = self.id,
            seed,
            initial_best = swarm.best_cost(),
            "worker initialized"
        );

        for plan in self.schedule.plan(self.id) {
            if self.mailboxes.abort_signal().is_triggered() {
                return Err(OrchestrationError::Aborted { worker: self.id });
            }

            self.transition(WorkerState::Running(plan.phase));
            swarm.run_block(plan.iterations, &params.world, &params.coefficients, &mut rng)?;
            report.iterations += plan.iterations;
            report.blocks.push(plan.iterations);
            report.history.push(swarm.best_cost());

            if self.emit_snapshot(&swarm, plan.phase) {
                report.snapshots_emitted += 1;
            }

            self.transition(WorkerState::Exchanging(plan.phase));
            let record = self.exchange(&mut swarm, &plan)?;
            report.exchanges.push(record);
        }

        self.transition(WorkerState::Done);
        report.best_cost = swarm.best_cost();
        tracing::debug!(
            worker = self.id,
            iterations = report.iterations,
            best_cost = report.best_cost,
            "worker done"
        );

        Ok(Completion {
            worker: self.id,
            swarm,
            report,
        })
    }

    /// Envia o snapshot sem bloquear; o canal comporta a execução inteira
    fn emit_snapshot(&self, swarm: &Swarm, phase: usize) -> bool {
        let snapshot = Snapshot {
            worker: self.id,
            phase,
            swarm: swarm.snapshot(),
        };
        match self.snapshots.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(worker = self.id, phase, "render channel full, snapshot dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!(worker = self.id, phase, "render pipe gone, snapshot dropped");
                false
            }
        }
    }

    /// Rodada de troca: ordena, envia os `k` melhores ao destino e recebe `k`
    /// da origem nos mesmos slots
    fn exchange(
        &mut self,
        swarm: &mut Swarm,
        plan: &PhasePlan,
    ) -> OrchestrationResult<ExchangeRecord> {
        let k = self.params.switch_best_particle_count;

        swarm.sort_for_migration();
        let emigrants = swarm.emigrants(k);
        let sent: Vec<ParticleId> = emigrants.iter().map(|p| p.id()).collect();

        self.mailboxes.send_batch(self.id, plan.destination, plan.phase, emigrants)?;
        let migrants = self.inbox.collect(plan.phase, plan.source, k)?;
        let received: Vec<ParticleId> = migrants.iter().map(|p| p.id()).collect();

        swarm.receive_migrants(migrants)?;

        tracing::trace!(
            worker = self.id,
            phase = plan.phase,
            destination = plan.destination,
            source = plan.source,
            best_cost = swarm.best_cost(),
            "exchange complete"
        );

        Ok(ExchangeRecord {
            phase: plan.phase,
            destination: plan.destination,
            source: plan.source,
            sent,
            received,
        })
    }

    fn transition(&mut self, next: WorkerState) {
        tracing::trace!(worker = self.id, from = ?self.state, to = ?next, "worker state");
        self.state = next;
    }
}
