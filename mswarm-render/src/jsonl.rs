//! # Stream JSONL de snapshots
//!
//! Uma linha por registro: cabeçalho da execução, um `frame` por fase e um
//! `summary` final com o melhor global visto nos frames.

use crate::error::{RenderError, RenderResult};
use mswarm_core::{CostFunction, Position, World};
use mswarm_orchestration::{RenderContext, SinkResult, Snapshot, SnapshotSink};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// ═══════════════════════════════════════════════════════════════════════════
// ESTRUTURAS JSONL
// ═══════════════════════════════════════════════════════════════════════════

/// Tipo de registro JSONL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderRecord {
    /// Metadados da execução
    Run {
        function: String,
        swarm_count: usize,
        frames: usize,
        dimension: usize,
    },

    /// Estado de todos os swarms ao fim de uma fase
    Frame {
        index: usize,
        best_worker: usize,
        best_cost: f64,
        swarms: Vec<SwarmFrame>,
    },

    /// Fechamento
    Summary {
        frames: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        best_worker: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        best_cost: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        best_position: Option<Position>,
    },
}

/// Um swarm dentro de um frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmFrame {
    pub worker: usize,
    pub phase: usize,
    pub best_cost: f64,
    pub global_best: Position,
    pub positions: Vec<Position>,
}

impl SwarmFrame {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            worker: snapshot.worker,
            phase: snapshot.phase,
            best_cost: snapshot.swarm.best_cost(),
            global_best: snapshot.swarm.global_best().clone(),
            positions: snapshot
                .swarm
                .particles()
                .iter()
                .map(|p| p.position().clone())
                .collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SINK
// ═══════════════════════════════════════════════════════════════════════════

/// Escreve snapshots como JSONL
pub struct JsonlSink<W: Write> {
    out: BufWriter<W>,
    frames: usize,
    best: Option<(usize, f64, Position)>,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: BufWriter::new(writer),
            frames: 0,
            best: None,
        }
    }

    /// Escreve um registro seguido de `\n`
    pub fn write_record(&mut self, record: &RenderRecord) -> RenderResult<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Frames escritos até agora
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Finaliza escrita e retorna writer interno
    pub fn into_inner(self) -> RenderResult<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }

    fn write_frame(&mut self, index: usize, snapshots: &[Snapshot]) -> RenderResult<()> {
        let swarms: Vec<SwarmFrame> = snapshots.iter().map(SwarmFrame::from_snapshot).collect();

        let leader = snapshots
            .iter()
            .reduce(|best, s| if s.swarm.best_cost() < best.swarm.best_cost() { s } else { best });
        let Some(leader) = leader else {
            return Ok(());
        };

        let leader_cost = leader.swarm.best_cost();
        let improves = self.best.as_ref().is_none_or(|(_, cost, _)| leader_cost < *cost);
        if improves {
            self.best = Some((leader.worker, leader_cost, leader.swarm.global_best().clone()));
        }

        self.write_record(&RenderRecord::Frame {
            index,
            best_worker: leader.worker,
            best_cost: leader.swarm.best_cost(),
            swarms,
        })?;
        self.frames += 1;
        Ok(())
    }

    fn write_summary(&mut self) -> RenderResult<()> {
        let (best_worker, best_cost, best_position) = match self.best.clone() {
            Some((worker, cost, position)) => (Some(worker), Some(cost), Some(position)),
            None => (None, None, None),
        };
        self.write_record(&RenderRecord::Summary {
            frames: self.frames,
            best_worker,
            best_cost,
            best_position,
        })?;
        self.out.flush()?;
        Ok(())
    }
}

impl JsonlSink<File> {
    /// Cria arquivo para escrita
    pub fn create<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Send> SnapshotSink for JsonlSink<W> {
    fn begin(&mut self, context: &RenderContext) -> SinkResult {
        self.write_record(&RenderRecord::Run {
            function: context.cost.name().to_string(),
            swarm_count: context.swarm_count,
            frames: context.frames,
            dimension: context.world.dimension_size(),
        })?;
        Ok(())
    }

    fn frame(&mut self, index: usize, snapshots: &[Snapshot]) -> SinkResult {
        self.write_frame(index, snapshots)?;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult {
        self.write_summary()?;
        tracing::debug!("jsonl sink wrote {} frames", self.frames);
        Ok(())
    }
}

/// Lê de volta um stream JSONL
pub fn read_records(input: &str) -> RenderResult<Vec<RenderRecord>> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(RenderError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mswarm_core::{Benchmark, BoxWorld};
    use mswarm_pso::{Particle, ParticleId, Swarm};
    use std::sync::Arc;

    fn snapshot(worker: usize, xs: &[f64]) -> Snapshot {
        let particles = xs
            .iter()
            .enumerate()
            .map(|(slot, &x)| {
                let p = Position::from([x, 0.0]);
                let cost = Benchmark::DeJong.cost(&p);
                Particle::new(ParticleId::new(worker, slot), p, Position::zeros(2), cost)
            })
            .collect();
        let swarm = Swarm::from_particles(particles, Arc::new(Benchmark::DeJong)).unwrap();
        Snapshot { worker, phase: 0, swarm }
    }

    fn context() -> RenderContext {
        RenderContext {
            world: BoxWorld::symmetric(5.0, 2).unwrap(),
            cost: Arc::new(Benchmark::DeJong),
            swarm_count: 2,
            frames: 1,
        }
    }

    #[test]
    fn test_stream_layout() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.begin(&context()).unwrap();
        sink.frame(0, &[snapshot(0, &[3.0, 2.0]), snapshot(1, &[1.0, 4.0])]).unwrap();
        sink.finish().unwrap();

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let records = read_records(&text).unwrap();
        assert_eq!(records.len(), 3);

        assert!(matches!(
            &records[0],
            RenderRecord::Run { function, swarm_count: 2, .. } if function == "dejong"
        ));
        match &records[1] {
            RenderRecord::Frame { index, best_worker, best_cost, swarms } => {
                assert_eq!(*index, 0);
                assert_eq!(*best_worker, 1);
                assert_eq!(*best_cost, 1.0);
                assert_eq!(swarms.len(), 2);
                assert_eq!(swarms[0].positions.len(), 2);
            }
            other => panic!("unexpected record {other:?}"),
        }
        assert_eq!(
            records[2],
            RenderRecord::Summary {
                frames: 1,
                best_worker: Some(1),
                best_cost: Some(1.0),
                best_position: Some(Position::from([1.0, 0.0])),
            }
        );
    }

    #[test]
    fn test_type_tag() {
        let line = serde_json::to_string(&RenderRecord::Summary {
            frames: 0,
            best_worker: None,
            best_cost: None,
            best_position: None,
        })
        .unwrap();
        assert_eq!(line, r#"{"type":"summary","frames":0}"#);
    }
}
