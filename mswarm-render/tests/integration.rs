//! Testes de integração para mswarm-render

use mswarm_core::Benchmark;
use mswarm_orchestration::{MultiSwarm, RenderPipe, RenderStats, RunConfig, RunParameters};
use mswarm_render::*;
use std::fs;
use tempfile::TempDir;

fn params(lower: Vec<f64>, upper: Vec<f64>) -> RunParameters {
    let config = RunConfig {
        swarm_count: 3,
        particles_per_swarm: 6,
        iteration_count: 20,
        switch_count: 3,
        switch_best_particle_count: 2,
        lower,
        upper,
        function: Benchmark::DeJong,
        seed: Some(31),
        ..RunConfig::default()
    };
    RunParameters::from_config(&config).unwrap()
}

#[test]
fn test_jsonl_stream_of_a_full_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.jsonl");
    let params = params(vec![-5.0, -5.0], vec![5.0, 5.0]);

    let pipe = RenderPipe::spawn(&params, Box::new(JsonlSink::create(&path).unwrap())).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();
    assert_eq!(outcome.render, Some(RenderStats { frames: 4, snapshots: 12, errors: 0 }));

    let records = read_records(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 6);
    assert!(matches!(
        records[0],
        RenderRecord::Run { swarm_count: 3, frames: 4, dimension: 2, .. }
    ));

    let mut previous = f64::INFINITY;
    for (i, record) in records[1..5].iter().enumerate() {
        match record {
            RenderRecord::Frame { index, best_cost, swarms, .. } => {
                assert_eq!(*index, i);
                assert_eq!(swarms.len(), 3);
                assert!(swarms.iter().all(|s| s.phase == i && s.positions.len() == 6));
                // os frames são tirados antes da troca; o melhor entre swarms nunca piora
                assert!(*best_cost <= previous);
                previous = *best_cost;
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }

    match &records[5] {
        RenderRecord::Summary { frames, best_cost, .. } => {
            assert_eq!(*frames, 4);
            assert_eq!(*best_cost, Some(previous));
        }
        other => panic!("expected summary, got {other:?}"),
    }
}

#[test]
fn test_heatmap_frames_of_a_full_run() {
    let dir = TempDir::new().unwrap();
    let params = params(vec![-5.0, -5.0], vec![5.0, 5.0]);
    let sink = HeatmapSink::new(dir.path().join("frames")).with_size(32, 24).unwrap();

    let pipe = RenderPipe::spawn(&params, Box::new(sink)).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();
    assert_eq!(outcome.render.unwrap().errors, 0);

    for index in 0..4 {
        let path = dir.path().join("frames").join(format!("frame-{index:04}.ppm"));
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("32 24"));
        assert_eq!(lines.next(), Some("255"));
        assert_eq!(lines.count(), 32 * 24);
    }
}

#[test]
fn test_heatmap_skips_non_2d_worlds() {
    let dir = TempDir::new().unwrap();
    let params = params(vec![-1.0; 3], vec![1.0; 3]);
    let frames = dir.path().join("frames");

    let pipe = RenderPipe::spawn(&params, Box::new(HeatmapSink::new(&frames))).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();

    let stats = outcome.render.unwrap();
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.errors, 0);
    assert!(!frames.exists());
}

#[test]
fn test_unwritable_output_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    // um arquivo no lugar do diretório de saída
    let blocked = dir.path().join("not-a-dir");
    fs::write(&blocked, b"x").unwrap();
    let params = params(vec![-5.0, -5.0], vec![5.0, 5.0]);

    let pipe = RenderPipe::spawn(&params, Box::new(HeatmapSink::new(&blocked))).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();
    assert_eq!(outcome.reports.len(), 3);
    assert_eq!(outcome.render.unwrap().errors, 1);
}

#[test]
fn test_fanout_feeds_both_sinks() {
    let dir = TempDir::new().unwrap();
    let jsonl = dir.path().join("run.jsonl");
    let params = params(vec![-5.0, -5.0], vec![5.0, 5.0]);

    let sink = FanoutSink::new()
        .with(Box::new(JsonlSink::create(&jsonl).unwrap()))
        .with(Box::new(HeatmapSink::new(dir.path().join("frames")).with_size(8, 8).unwrap()));
    let pipe = RenderPipe::spawn(&params, Box::new(sink)).unwrap();
    MultiSwarm::new(params).unwrap().run(pipe).unwrap();

    assert_eq!(read_records(&fs::read_to_string(&jsonl).unwrap()).unwrap().len(), 6);
    assert!(dir.path().join("frames").join("frame-0003.ppm").exists());
}

#[test]
fn test_gif_animation_of_a_full_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.gif");
    let params = params(vec![-5.0, -5.0], vec![5.0, 5.0]);
    let sink = GifSink::new(&path).with_size(40, 30).unwrap();

    let pipe = RenderPipe::spawn(&params, Box::new(sink)).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();
    assert_eq!(outcome.render.unwrap().errors, 0);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    // tela lógica em little-endian
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 40);
    assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 30);
    // animação em loop, arquivo fechado com o trailer
    assert!(bytes.windows(11).any(|w| w == b"NETSCAPE2.0"));
    assert_eq!(bytes.last(), Some(&0x3B));
}

#[test]
fn test_gif_skips_non_2d_worlds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.gif");
    let params = params(vec![-1.0; 3], vec![1.0; 3]);

    let pipe = RenderPipe::spawn(&params, Box::new(GifSink::new(&path))).unwrap();
    let outcome = MultiSwarm::new(params).unwrap().run(pipe).unwrap();

    assert_eq!(outcome.render.unwrap().errors, 0);
    assert!(!path.exists());
}
