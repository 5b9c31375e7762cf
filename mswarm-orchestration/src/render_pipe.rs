//! # Render pipe
//!
//! Consumer side of the per-worker snapshot channels. A single thread drains
//! `switch_count + 1` frames, each holding one snapshot per worker, hands them
//! to a [`SnapshotSink`] and signals completion once. Sink failures are logged
//! and counted, never propagated into the optimization.

use crate::config::RunParameters;
use crate::error::{OrchestrationError, OrchestrationResult};
use crossbeam_channel::{Receiver, Sender, bounded};
use mswarm_core::{BoxWorld, CostFunction};
use mswarm_pso::Swarm;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Read-only copy of one worker's swarm after a block
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub worker: usize,
    pub phase: usize,
    pub swarm: Swarm,
}

/// What a sink needs to know about the run before the first frame
#[derive(Clone)]
pub struct RenderContext {
    pub world: BoxWorld,
    pub cost: Arc<dyn CostFunction>,
    pub swarm_count: usize,
    /// Frames that will be delivered (`switch_count + 1`)
    pub frames: usize,
}

impl RenderContext {
    pub fn from_params(params: &RunParameters) -> Self {
        Self {
            world: params.world.clone(),
            cost: Arc::clone(&params.cost),
            swarm_count: params.swarm_count,
            frames: params.phase_count(),
        }
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("world", &self.world)
            .field("cost", &self.cost.name())
            .field("swarm_count", &self.swarm_count)
            .field("frames", &self.frames)
            .finish()
    }
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;
pub type SinkResult = Result<(), SinkError>;

/// Destination for drained snapshots
pub trait SnapshotSink: Send {
    fn begin(&mut self, _context: &RenderContext) -> SinkResult {
        Ok(())
    }

    /// One frame: the snapshots of every worker for the same phase, ordered
    /// by worker id
    fn frame(&mut self, index: usize, snapshots: &[Snapshot]) -> SinkResult;

    /// Flush artifacts
    fn finish(&mut self) -> SinkResult {
        Ok(())
    }
}

/// Drains and drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl SnapshotSink for DiscardSink {
    fn frame(&mut self, _index: usize, _snapshots: &[Snapshot]) -> SinkResult {
        Ok(())
    }
}

/// Render thread statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Complete frames delivered to the sink
    pub frames: usize,
    /// Snapshots drained
    pub snapshots: usize,
    /// Sink calls that failed
    pub errors: usize,
}

/// Waits for the render thread's completion signal
#[derive(Debug)]
pub struct RenderHandle {
    done: Receiver<RenderStats>,
    thread: JoinHandle<()>,
}

impl RenderHandle {
    /// Block until the pipe has drained and flushed
    pub fn wait(self) -> OrchestrationResult<RenderStats> {
        let stats = self.done.recv();
        if self.thread.join().is_err() {
            return Err(OrchestrationError::RenderPipe("render thread panicked".to_string()));
        }
        stats.map_err(|_| OrchestrationError::RenderPipe("completion signal lost".to_string()))
    }
}

/// Running render pipe: per-worker snapshot senders plus its completion handle
#[derive(Debug)]
pub struct RenderPipe {
    senders: Vec<Sender<Snapshot>>,
    handle: RenderHandle,
}

impl RenderPipe {
    /// Start the render thread feeding `sink`
    pub fn spawn(params: &RunParameters, sink: Box<dyn SnapshotSink>) -> OrchestrationResult<Self> {
        let context = RenderContext::from_params(params);
        let capacity = params.render_capacity();

        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..params.swarm_count).map(|_| bounded(capacity)).unzip();
        let (done_tx, done_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("mswarm-render".to_string())
            .spawn(move || {
                let stats = drain(context, receivers, sink);
                // The coordinator may already be gone after a failed run
                let _ = done_tx.send(stats);
            })
            .map_err(|e| OrchestrationError::Spawn(e.to_string()))?;

        Ok(Self {
            senders,
            handle: RenderHandle { done: done_rx, thread },
        })
    }

    /// Pipe with rendering disabled
    pub fn discard(params: &RunParameters) -> OrchestrationResult<Self> {
        Self::spawn(params, Box::new(DiscardSink))
    }

    pub fn into_parts(self) -> (Vec<Sender<Snapshot>>, RenderHandle) {
        (self.senders, self.handle)
    }
}

fn drain(
    context: RenderContext,
    receivers: Vec<Receiver<Snapshot>>,
    mut sink: Box<dyn SnapshotSink>,
) -> RenderStats {
    let mut stats = RenderStats::default();

    if let Err(e) = sink.begin(&context) {
        tracing::warn!(error = %e, "render sink failed to start");
        stats.errors += 1;
    }

    'frames: for index in 0..context.frames {
        let mut frame = Vec::with_capacity(receivers.len());
        for (worker, rx) in receivers.iter().enumerate() {
            match rx.recv() {
                Ok(snapshot) => frame.push(snapshot),
                Err(_) => {
                    tracing::debug!(worker, frame = index, "snapshot channel closed early");
                    stats.snapshots += frame.len();
                    break 'frames;
                }
            }
        }
        stats.snapshots += frame.len();

        if let Err(e) = sink.frame(index, &frame) {
            tracing::warn!(frame = index, error = %e, "render sink failed to write frame");
            stats.errors += 1;
        }
        stats.frames += 1;
    }

    if let Err(e) = sink.finish() {
        tracing::warn!(error = %e, "render sink failed to finish");
        stats.errors += 1;
    }

    tracing::debug!(
        frames = stats.frames,
        snapshots = stats.snapshots,
        errors = stats.errors,
        "render pipe drained"
    );
    stats
}
