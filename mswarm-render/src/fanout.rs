//! Vários sinks alimentados pelo mesmo render pipe

use mswarm_orchestration::{RenderContext, SinkResult, Snapshot, SnapshotSink};

/// Repassa cada chamada a todos os sinks; um sink com erro não impede os
/// demais e o primeiro erro é devolvido
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn SnapshotSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each(&mut self, mut call: impl FnMut(&mut dyn SnapshotSink) -> SinkResult) -> SinkResult {
        let mut first = None;
        for sink in &mut self.sinks {
            if let Err(e) = call(sink.as_mut()) {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl SnapshotSink for FanoutSink {
    fn begin(&mut self, context: &RenderContext) -> SinkResult {
        self.each(|sink| sink.begin(context))
    }

    fn frame(&mut self, index: usize, snapshots: &[Snapshot]) -> SinkResult {
        self.each(|sink| sink.frame(index, snapshots))
    }

    fn finish(&mut self) -> SinkResult {
        self.each(|sink| sink.finish())
    }
}
