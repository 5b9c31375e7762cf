//! Quadros de heat map em PPM
//!
//! Para mundos 2-D, cada frame vira uma imagem `P3`: o custo amostrado no
//! centro de cada pixel, numa paleta de calor de 12 níveis, com as partículas
//! de cada swarm sobrepostas numa cor própria. Outras dimensões são puladas.

use crate::error::{RenderError, RenderResult};
use mswarm_core::{BoxWorld, CostFunction, Position, World};
use mswarm_orchestration::{RenderContext, SinkResult, Snapshot, SnapshotSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub type Rgb = [u8; 3];

/// Níveis da paleta de calor
pub const HEAT_LEVELS: usize = 12;

/// Cores dos swarms, em ordem de worker (cicla)
pub const SWARM_COLORS: [Rgb; 8] = [
    [0, 0, 255],     // blue
    [0, 128, 0],     // green
    [0, 0, 0],       // black
    [128, 0, 128],   // purple
    [0, 255, 255],   // cyan
    [255, 0, 255],   // magenta
    [255, 255, 255], // white
    [128, 128, 128], // gray
];

pub fn swarm_color(worker: usize) -> Rgb {
    SWARM_COLORS[worker % SWARM_COLORS.len()]
}

/// Cor da paleta para `t` em `[0, 1]`: preto → vermelho → amarelo → branco
pub fn heat_color(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    let level = ((t * HEAT_LEVELS as f64) as usize).min(HEAT_LEVELS - 1);
    let q = (level as f64 + 0.5) / HEAT_LEVELS as f64;

    let channel = |offset: f64| ((3.0 * q - offset).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(0.0), channel(1.0), channel(2.0)]
}

// ═══════════════════════════════════════════════════════════════════════════
// CANVAS
// ═══════════════════════════════════════════════════════════════════════════

/// Imagem RGB em memória
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixels em ordem de linha, do topo
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Quadrado `(2r+1)²` centrado em `(x, y)`, recortado nas bordas
    pub fn dot(&mut self, x: usize, y: usize, radius: usize, color: Rgb) {
        for dy in 0..=2 * radius {
            for dx in 0..=2 * radius {
                let (px, py) = ((x + dx).checked_sub(radius), (y + dy).checked_sub(radius));
                if let (Some(px), Some(py)) = (px, py) {
                    self.set(px, py, color);
                }
            }
        }
    }

    /// Escreve em PPM texto (`P3`), um pixel por linha
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> RenderResult<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;
        for [r, g, b] in &self.pixels {
            writeln!(out, "{r} {g} {b}")?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HEAT MAP
// ═══════════════════════════════════════════════════════════════════════════

/// Custo pré-amostrado do mundo, uma vez por execução
#[derive(Debug, Clone)]
pub struct CostGrid {
    background: Canvas,
    lower: [f64; 2],
    upper: [f64; 2],
}

impl CostGrid {
    /// Amostra `cost` no centro de cada pixel de um mundo 2-D
    pub fn sample(
        world: &BoxWorld,
        cost: &dyn CostFunction,
        width: usize,
        height: usize,
    ) -> RenderResult<Self> {
        let mut background = Canvas::new(width, height)?;
        let lower = [world.lower()[0], world.lower()[1]];
        let upper = [world.upper()[0], world.upper()[1]];

        let mut values = Vec::with_capacity(width * height);
        for py in 0..height {
            // linha 0 é o topo da imagem (y máximo)
            let y = upper[1] - (py as f64 + 0.5) / height as f64 * (upper[1] - lower[1]);
            for px in 0..width {
                let x = lower[0] + (px as f64 + 0.5) / width as f64 * (upper[0] - lower[0]);
                values.push(cost.cost(&Position::from([x, y])));
            }
        }

        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = max - min;

        for (i, value) in values.into_iter().enumerate() {
            let t = if span > 0.0 { (value - min) / span } else { 0.0 };
            background.set(i % width, i / width, heat_color(t));
        }

        Ok(Self {
            background,
            lower,
            upper,
        })
    }

    /// Pixel que contém `position`, `None` fora do mundo
    pub fn to_pixel(&self, position: &Position) -> Option<(usize, usize)> {
        if position.len() != 2 {
            return None;
        }
        let fx = (position[0] - self.lower[0]) / (self.upper[0] - self.lower[0]);
        let fy = (self.upper[1] - position[1]) / (self.upper[1] - self.lower[1]);
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let w = self.background.width();
        let h = self.background.height();
        Some((((fx * w as f64) as usize).min(w - 1), ((fy * h as f64) as usize).min(h - 1)))
    }

    /// Heat map com as partículas dos snapshots sobrepostas
    pub fn render(&self, snapshots: &[Snapshot]) -> Canvas {
        let mut canvas = self.background.clone();
        for snapshot in snapshots {
            let color = swarm_color(snapshot.worker);
            for particle in snapshot.swarm.particles() {
                if let Some((x, y)) = self.to_pixel(particle.position()) {
                    canvas.dot(x, y, 1, color);
                }
            }
        }
        canvas
    }
}

/// Escreve um `frame-NNNN.ppm` por frame num diretório
#[derive(Debug)]
pub struct HeatmapSink {
    dir: PathBuf,
    width: usize,
    height: usize,
    grid: Option<CostGrid>,
    written: Vec<PathBuf>,
}

impl HeatmapSink {
    /// 300×300 pixels por quadro
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            width: 300,
            height: 300,
            grid: None,
            written: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Arquivos escritos até agora
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame-{index:04}.ppm"))
    }

    fn write_frame(&mut self, index: usize, snapshots: &[Snapshot]) -> RenderResult<()> {
        let Some(grid) = &self.grid else {
            return Ok(());
        };
        let canvas = grid.render(snapshots);
        let path = self.frame_path(index);
        let mut out = BufWriter::new(File::create(&path)?);
        canvas.write_ppm(&mut out)?;
        out.flush()?;
        self.written.push(path);
        Ok(())
    }
}

impl SnapshotSink for HeatmapSink {
    fn begin(&mut self, context: &RenderContext) -> SinkResult {
        let dimension = context.world.dimension_size();
        if dimension != 2 {
            tracing::warn!(dimension, "heat map needs a 2-D world; frames skipped");
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(RenderError::from)?;
        self.grid = Some(CostGrid::sample(
            &context.world,
            context.cost.as_ref(),
            self.width,
            self.height,
        )?);
        Ok(())
    }

    fn frame(&mut self, index: usize, snapshots: &[Snapshot]) -> SinkResult {
        self.write_frame(index, snapshots)?;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult {
        tracing::debug!(
            "heat map sink wrote {} frames to {}",
            self.written.len(),
            self.dir.display()
        );
        Ok(())
    }
}
