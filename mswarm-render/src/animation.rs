//! Animação GIF da execução
//!
//! Mesmo quadro do heat map, um por frame, acumulado num único GIF em loop.
//! A paleta global tem os 12 níveis de calor seguidos das cores dos swarms,
//! então cada pixel vira um índice sem quantização.

use crate::error::{RenderError, RenderResult};
use crate::heatmap::{Canvas, CostGrid, HEAT_LEVELS, Rgb, SWARM_COLORS, heat_color};
use gif::{Encoder, Frame, Repeat};
use mswarm_core::World;
use mswarm_orchestration::{RenderContext, SinkResult, Snapshot, SnapshotSink};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Atraso entre quadros, em centésimos de segundo
pub const DEFAULT_DELAY: u16 = 50;

/// Paleta global: níveis de calor, depois as cores dos swarms
pub fn palette() -> Vec<Rgb> {
    (0..HEAT_LEVELS)
        .map(|i| heat_color((i as f64 + 0.5) / HEAT_LEVELS as f64))
        .chain(SWARM_COLORS)
        .collect()
}

/// Converte um canvas em índices da paleta (cor desconhecida → 0)
pub fn index_canvas(canvas: &Canvas, palette: &[Rgb]) -> Vec<u8> {
    canvas
        .pixels()
        .iter()
        .map(|rgb| palette.iter().position(|c| c == rgb).unwrap_or(0) as u8)
        .collect()
}

/// Escreve todos os frames num GIF animado
pub struct GifSink {
    path: PathBuf,
    width: u16,
    height: u16,
    delay: u16,
    palette: Vec<Rgb>,
    grid: Option<CostGrid>,
    encoder: Option<Encoder<BufWriter<File>>>,
    frames: usize,
}

impl GifSink {
    /// 300×300 pixels, meio segundo por quadro
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 300,
            height: 300,
            delay: DEFAULT_DELAY,
            palette: palette(),
            grid: None,
            encoder: None,
            frames: 0,
        }
    }

    /// O formato limita cada lado a `u16`
    pub fn with_size(mut self, width: usize, height: usize) -> RenderResult<Self> {
        match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => {
                self.width = w;
                self.height = h;
                Ok(self)
            }
            _ => Err(RenderError::InvalidSize { width, height }),
        }
    }

    pub fn with_delay(mut self, delay: u16) -> Self {
        self.delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Quadros gravados até agora
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn open(&mut self, context: &RenderContext) -> RenderResult<()> {
        let grid = CostGrid::sample(
            &context.world,
            context.cost.as_ref(),
            self.width as usize,
            self.height as usize,
        )?;
        let global: Vec<u8> = self.palette.iter().flatten().copied().collect();
        let out = BufWriter::new(File::create(&self.path)?);
        let mut encoder = Encoder::new(out, self.width, self.height, &global)?;
        encoder.set_repeat(Repeat::Infinite)?;

        self.grid = Some(grid);
        self.encoder = Some(encoder);
        Ok(())
    }

    fn write_frame(&mut self, snapshots: &[Snapshot]) -> RenderResult<()> {
        let (Some(grid), Some(encoder)) = (&self.grid, &mut self.encoder) else {
            return Ok(());
        };
        let canvas = grid.render(snapshots);
        let frame = Frame {
            width: self.width,
            height: self.height,
            delay: self.delay,
            buffer: Cow::Owned(index_canvas(&canvas, &self.palette)),
            ..Frame::default()
        };
        encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    fn close(&mut self) -> RenderResult<()> {
        if let Some(encoder) = self.encoder.take() {
            let mut out = encoder.into_inner()?;
            out.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for GifSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GifSink")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("delay", &self.delay)
            .field("frames", &self.frames)
            .finish()
    }
}

impl SnapshotSink for GifSink {
    fn begin(&mut self, context: &RenderContext) -> SinkResult {
        let dimension = context.world.dimension_size();
        if dimension != 2 {
            tracing::warn!(dimension, "animation needs a 2-D world; skipped");
            return Ok(());
        }
        self.open(context)?;
        Ok(())
    }

    fn frame(&mut self, _index: usize, snapshots: &[Snapshot]) -> SinkResult {
        self.write_frame(snapshots)?;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult {
        self.close()?;
        tracing::debug!("animation wrote {} frames to {}", self.frames, self.path.display());
        Ok(())
    }
}
