//! # 🎨 mswarm-render - Sinks de renderização
//!
//! Consumidores do render pipe de `mswarm-orchestration`:
//!
//! - [`JsonlSink`]: um registro JSON por linha (execução, frames, resumo)
//! - [`HeatmapSink`]: um PPM por frame, heat map do custo com as partículas
//!   de cada swarm sobrepostas (apenas mundos 2-D)
//! - [`GifSink`]: os mesmos quadros num único GIF animado em loop
//! - [`FanoutSink`]: alimenta vários sinks ao mesmo tempo
//!
//! Erros de escrita viram [`RenderError`]; o render pipe registra e segue.

pub mod animation;
pub mod error;
pub mod fanout;
pub mod heatmap;
pub mod jsonl;

pub use animation::GifSink;
pub use error::{RenderError, RenderResult};
pub use fanout::FanoutSink;
pub use heatmap::{Canvas, CostGrid, HeatmapSink, heat_color, swarm_color};
pub use jsonl::{JsonlSink, RenderRecord, SwarmFrame, read_records};
