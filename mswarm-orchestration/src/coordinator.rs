//! Coordenador multi-swarm
//!
//! Cria um worker por swarm, coleta exatamente `swarm_count` conclusões na
//! ordem de chegada, reduz ao menor custo (estritamente `<`) e só retorna depois
//! do sinal de conclusão do render pipe.

use crate::config::RunParameters;
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::mailbox::MailboxSet;
use crate::render_pipe::{RenderPipe, RenderStats};
use crate::schedule::Schedule;
use crate::worker::{AbortOnPanic, Completion, Worker, WorkerReport};
use crossbeam_channel::bounded;
use mswarm_core::Position;
use mswarm_pso::Swarm;
use std::thread;
use std::time::Instant;

/// Resultado de uma execução
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Melhor posição global entre todos os swarms
    pub best_position: Position,
    /// Custo de `best_position`
    pub best_cost: f64,
    /// Worker cujo swarm venceu a redução
    pub best_worker: usize,
    /// Relatórios ordenados por worker
    pub reports: Vec<WorkerReport>,
    /// Ordem em que as conclusões chegaram
    pub completion_order: Vec<usize>,
    /// Estatísticas do render pipe (`None` se ele falhou)
    pub render: Option<RenderStats>,
}

/// Orquestrador de uma execução multi-swarm
#[derive(Debug, Clone)]
pub struct MultiSwarm {
    params: RunParameters,
}

impl MultiSwarm {
    /// Cria coordenador (valida parâmetros antes de qualquer thread)
    pub fn new(params: RunParameters) -> OrchestrationResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Executa com renderização desativada
    pub fn run_discarding(&self) -> OrchestrationResult<RunOutcome> {
        self.run(RenderPipe::discard(&self.params)?)
    }

    /// Executa a otimização alimentando `pipe`
    pub fn run(&self, pipe: RenderPipe) -> OrchestrationResult<RunOutcome> {
        let params = &self.params;
        let n = params.swarm_count;
        let (snapshot_senders, render) = pipe.into_parts();

        if snapshot_senders.len() != n {
            let built_for = snapshot_senders.len();
            drop(snapshot_senders);
            if let Err(e) = render.wait() {
                tracing::warn!("render pipe: {}", e);
            }
            return Err(OrchestrationError::InvalidConfiguration(format!(
                "render pipe built for {built_for} workers, run has {n}"
            )));
        }

        let schedule = Schedule::new(params.iteration_count, params.switch_count, n);
        let (mailboxes, inboxes) = MailboxSet::new(n, params.mailbox_capacity());
        let (done_tx, done_rx) = bounded::<(usize, OrchestrationResult<Completion>)>(n);

        tracing::info!(
            swarms = n,
            particles = params.particles_per_swarm,
            iterations = params.iteration_count,
            exchanges = schedule.exchange_count(),
            switch_best = params.switch_best_particle_count,
            cost = params.cost.name(),
            seed = params.seed,
            "multi-swarm run"
        );
        let started = Instant::now();

        let (messages, panicked, spawn_error) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(n);
            let mut spawn_error = None;

            for (id, (inbox, snapshots)) in inboxes.into_iter().zip(snapshot_senders).enumerate() {
                let worker = Worker::new(id, params, &schedule, &mailboxes, inbox, snapshots);
                let done = done_tx.clone();
                let mailboxes = &mailboxes;

                let spawned = thread::Builder::new()
                    .name(format!("mswarm-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        let _guard = AbortOnPanic(mailboxes.abort_signal());
                        let result = worker.run();
                        if let Err(e) = &result {
                            if !e.is_abort() {
                                tracing::error!("worker {} failed: {}", id, e);
                                mailboxes.abort();
                            }
                        }
                        let _ = done.send((id, result));
                    });

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        mailboxes.abort();
                        spawn_error = Some(OrchestrationError::Spawn(e.to_string()));
                        break;
                    }
                }
            }
            drop(done_tx);

            // Exatamente n mensagens, ou menos se um worker morreu sem enviar
            let mut messages = Vec::with_capacity(n);
            for _ in 0..n {
                match done_rx.recv() {
                    Ok(message) => messages.push(message),
                    Err(_) => break,
                }
            }

            let panicked: Vec<usize> = handles
                .into_iter()
                .filter_map(|(id, handle)| handle.join().is_err().then_some(id))
                .collect();

            (messages, panicked, spawn_error)
        });

        let received = messages.len();
        let mut fatal = spawn_error;
        if let Some(&id) = panicked.first() {
            tracing::error!("worker {} panicked", id);
            if fatal.is_none() {
                fatal = Some(OrchestrationError::WorkerPanicked(id));
            }
        }

        let mut best: Option<(usize, Swarm)> = None;
        let mut reports = Vec::with_capacity(n);
        let mut completion_order = Vec::with_capacity(n);

        for (id, result) in messages {
            completion_order.push(id);
            match result {
                Ok(completion) => {
                    let better = best
                        .as_ref()
                        .is_none_or(|(_, swarm)| completion.swarm.best_cost() < swarm.best_cost());
                    if better {
                        best = Some((completion.worker, completion.swarm));
                    }
                    reports.push(completion.report);
                }
                Err(e) => {
                    // O erro original vence os abortos que ele provocou
                    let replace = fatal.as_ref().is_none_or(|f| f.is_abort() && !e.is_abort());
                    if replace {
                        fatal = Some(e);
                    }
                }
            }
        }

        if fatal.is_none() && received < n {
            fatal = Some(OrchestrationError::MissingCompletion { expected: n, received });
        }

        let render = match render.wait() {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("render pipe: {}", e);
                None
            }
        };

        if let Some(e) = fatal {
            return Err(e);
        }

        let (best_worker, swarm) = best.ok_or(OrchestrationError::MissingCompletion {
            expected: n,
            received: 0,
        })?;
        reports.sort_by_key(|r| r.worker);

        tracing::info!(
            "multi-swarm run finished in {:?}: best cost {} from worker {}",
            started.elapsed(),
            swarm.best_cost(),
            best_worker
        );

        Ok(RunOutcome {
            best_cost: swarm.best_cost(),
            best_position: swarm.global_best().clone(),
            best_worker,
            reports,
            completion_order,
            render,
        })
    }
}

/// Executa uma otimização completa e devolve só a melhor posição
pub fn multi_swarm(params: RunParameters, pipe: RenderPipe) -> OrchestrationResult<Position> {
    let outcome = MultiSwarm::new(params)?.run(pipe)?;
    Ok(outcome.best_position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use mswarm_core::{Benchmark, CostFunction, World};

    fn config() -> RunConfig {
        RunConfig {
            swarm_count: 3,
            particles_per_swarm: 5,
            iteration_count: 12,
            switch_count: 2,
            switch_best_particle_count: 2,
            lower: vec![-5.0, -5.0],
            upper: vec![5.0, 5.0],
            function: Benchmark::DeJong,
            seed: Some(5),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_run_reduces_to_minimum() {
        let params = RunParameters::from_config(&config()).unwrap();
        let outcome = MultiSwarm::new(params.clone()).unwrap().run_discarding().unwrap();

        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(outcome.completion_order.len(), 3);
        let min = outcome
            .reports
            .iter()
            .map(|r| r.best_cost)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(outcome.best_cost, min);
        assert_eq!(outcome.reports[outcome.best_worker].best_cost, min);
        assert!(params.world.contains(&outcome.best_position));
        assert_eq!(params.cost.cost(&outcome.best_position), outcome.best_cost);
    }

    #[test]
    fn test_pipe_for_wrong_worker_count() {
        let params = RunParameters::from_config(&config()).unwrap();
        let other = RunParameters::from_config(&RunConfig { swarm_count: 2, ..config() }).unwrap();
        let pipe = RenderPipe::discard(&other).unwrap();

        let err = MultiSwarm::new(params).unwrap().run(pipe).unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_free_function() {
        let params = RunParameters::from_config(&config()).unwrap();
        let pipe = RenderPipe::discard(&params).unwrap();
        let world = params.world.clone();
        let best = multi_swarm(params, pipe).unwrap();
        assert!(world.contains(&best));
    }
}
