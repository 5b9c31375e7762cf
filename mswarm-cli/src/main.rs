//! MSWARM - Multi-Swarm Particle Swarm Optimizer
//! Command-line interface for running multi-swarm optimizations

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use mswarm_core::{Benchmark, CostFunction};
use mswarm_orchestration::{MultiSwarm, RenderPipe, RunConfig, RunOutcome, RunParameters};
use mswarm_render::{FanoutSink, GifSink, HeatmapSink, JsonlSink};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mswarm")]
#[command(author = "MSWARM Contributors")]
#[command(version)]
#[command(about = "MSWARM - multi-swarm particle swarm optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an optimization and print the best position found
    Run(RunArgs),

    /// List the built-in benchmark functions
    Functions,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// JSON run configuration; flags below override its fields
    #[arg(short, long, value_name = "FILE", env = "MSWARM_CONFIG")]
    config: Option<PathBuf>,

    /// Number of swarms (one worker thread each)
    #[arg(short = 'n', long, env = "MSWARM_SWARMS")]
    swarms: Option<usize>,

    /// Particles per swarm
    #[arg(short, long, env = "MSWARM_PARTICLES")]
    particles: Option<usize>,

    /// Total PSO iterations per swarm
    #[arg(short, long, env = "MSWARM_ITERATIONS")]
    iterations: Option<usize>,

    /// Number of exchange points between blocks
    #[arg(short, long, env = "MSWARM_SWITCHES")]
    switches: Option<usize>,

    /// Particles sent to the neighbour at each exchange
    #[arg(short = 'k', long, env = "MSWARM_SWITCH_BEST")]
    switch_best: Option<usize>,

    /// Cognitive coefficient
    #[arg(long, env = "MSWARM_C1")]
    c1: Option<f64>,

    /// Social coefficient
    #[arg(long, env = "MSWARM_C2")]
    c2: Option<f64>,

    /// Inertia weight (1.0 keeps the classic update)
    #[arg(short = 'w', long, env = "MSWARM_INERTIA")]
    inertia: Option<f64>,

    /// Benchmark function (see `mswarm functions`)
    #[arg(short, long, value_name = "NAME", env = "MSWARM_FUNCTION")]
    function: Option<Benchmark>,

    /// Lower corner of the world, e.g. -5,-5
    #[arg(
        long,
        value_name = "A,B",
        value_delimiter = ',',
        allow_hyphen_values = true,
        env = "MSWARM_LOWER"
    )]
    lower: Option<Vec<f64>>,

    /// Upper corner of the world, e.g. 5,5
    #[arg(
        long,
        value_name = "A,B",
        value_delimiter = ',',
        allow_hyphen_values = true,
        env = "MSWARM_UPPER"
    )]
    upper: Option<Vec<f64>>,

    /// Master seed; omitted means a random run
    #[arg(long, env = "MSWARM_SEED")]
    seed: Option<u64>,

    /// Write a JSONL stream of every frame to FILE
    #[arg(long, value_name = "FILE", env = "MSWARM_JSONL")]
    jsonl: Option<PathBuf>,

    /// Write PPM heat-map frames into DIR (2-D worlds only)
    #[arg(long, value_name = "DIR", env = "MSWARM_FRAMES")]
    frames: Option<PathBuf>,

    /// Write the frames as one looping animated GIF (2-D worlds only)
    #[arg(long, value_name = "FILE", env = "MSWARM_GIF")]
    gif: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl RunArgs {
    /// Configuração base (arquivo ou padrão) com os flags aplicados por cima
    fn to_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("cannot read config {}", path.display()))?;
                RunConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => RunConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut RunConfig) {
        if let Some(n) = self.swarms {
            config.swarm_count = n;
        }
        if let Some(n) = self.particles {
            config.particles_per_swarm = n;
        }
        if let Some(n) = self.iterations {
            config.iteration_count = n;
        }
        if let Some(n) = self.switches {
            config.switch_count = n;
        }
        if let Some(k) = self.switch_best {
            config.switch_best_particle_count = k;
        }
        if let Some(c1) = self.c1 {
            config.coefficients.cognitive = c1;
        }
        if let Some(c2) = self.c2 {
            config.coefficients.social = c2;
        }
        if let Some(w) = self.inertia {
            config.coefficients.inertia = w;
        }
        if let Some(function) = self.function {
            config.function = function;
        }
        if let Some(lower) = &self.lower {
            config.lower = lower.clone();
        }
        if let Some(upper) = &self.upper {
            config.upper = upper.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }

    fn render_pipe(&self, params: &RunParameters) -> Result<RenderPipe> {
        let mut sinks = FanoutSink::new();
        if let Some(path) = &self.jsonl {
            let sink = JsonlSink::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            sinks.push(Box::new(sink));
        }
        if let Some(dir) = &self.frames {
            sinks.push(Box::new(HeatmapSink::new(dir)));
        }
        if let Some(path) = &self.gif {
            sinks.push(Box::new(GifSink::new(path)));
        }

        let pipe = if sinks.is_empty() {
            RenderPipe::discard(params)?
        } else {
            RenderPipe::spawn(params, Box::new(sinks))?
        };
        Ok(pipe)
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            if let Err(e) = run_command(&args) {
                eprintln!("{} {:#}", "error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        Commands::Functions => functions_command(),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("mswarm=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "mswarm=info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_command(args: &RunArgs) -> Result<()> {
    let config = args.to_config()?;
    tracing::debug!(?config, "resolved run configuration");
    let params = RunParameters::from_config(&config)?;
    let coordinator = MultiSwarm::new(params)?;

    let pipe = args.render_pipe(coordinator.params())?;
    let outcome = coordinator.run(pipe)?;

    print_outcome(coordinator.params(), &outcome);
    Ok(())
}

fn print_outcome(params: &RunParameters, outcome: &RunOutcome) {
    println!(
        "{} {} swarms × {} particles, {} iterations, {} exchanges of {} (seed {})",
        "    Finished".green().bold(),
        params.swarm_count,
        params.particles_per_swarm,
        params.iteration_count,
        params.phase_count(),
        params.switch_best_particle_count,
        params.seed,
    );
    println!();
    println!("{} {}", "Function:".bold(), params.cost.name().cyan());
    println!("{} ({})", "Best position:".bold(), outcome.best_position);
    println!("{} {:.5}", "Best cost:".bold(), outcome.best_cost);
    println!("{} {}", "Found by worker:".bold(), outcome.best_worker);
    println!();

    println!("{}", "Workers:".bold());
    for report in &outcome.reports {
        let marker = if report.worker == outcome.best_worker { "*" } else { " " };
        println!(
            "  {} worker {:>3}  best cost {:.5}",
            marker.yellow(),
            report.worker,
            report.best_cost
        );
    }

    if let Some(render) = &outcome.render
        && render.errors > 0
    {
        println!();
        println!(
            "{} {} render errors over {} frames",
            "warning:".yellow().bold(),
            render.errors,
            render.frames
        );
    }
}

fn functions_command() {
    println!("{}", "Benchmark functions:".bold());
    for function in Benchmark::ALL {
        println!("  {:<10} {}", function.to_string().cyan(), function.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_run(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Run(args) => args,
            Commands::Functions => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse_run(&[
            "mswarm", "run", "--swarms", "3", "--particles", "8", "--iterations", "40",
            "--switches", "4", "--switch-best", "2", "--c1", "1.5", "--inertia", "0.7",
            "--function", "dejong", "--lower", "-5,-5", "--upper", "5,5", "--seed", "9",
            "--gif", "out.gif",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.swarm_count, 3);
        assert_eq!(config.particles_per_swarm, 8);
        assert_eq!(config.iteration_count, 40);
        assert_eq!(config.switch_count, 4);
        assert_eq!(config.switch_best_particle_count, 2);
        assert_eq!(config.coefficients.cognitive, 1.5);
        assert_eq!(config.coefficients.social, RunConfig::default().coefficients.social);
        assert_eq!(config.coefficients.inertia, 0.7);
        assert_eq!(config.function, Benchmark::DeJong);
        assert_eq!(config.lower, vec![-5.0, -5.0]);
        assert_eq!(config.upper, vec![5.0, 5.0]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(args.gif, Some(PathBuf::from("out.gif")));
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        let json = r#"{"swarm_count": 2, "iteration_count": 30, "function": "ackley"}"#;
        fs::write(&path, json).unwrap();

        let mut args = RunArgs {
            config: Some(path.clone()),
            ..RunArgs::default()
        };
        args.iterations = Some(12);
        let config = args.to_config().unwrap();

        assert_eq!(config.swarm_count, 2);
        assert_eq!(config.iteration_count, 12);
        assert_eq!(config.function, Benchmark::Ackley);
        assert_eq!(config.particles_per_swarm, RunConfig::default().particles_per_swarm);
    }

    #[test]
    fn test_unknown_function_rejected() {
        assert!(Cli::try_parse_from(["mswarm", "run", "--function", "rastrigin"]).is_err());
    }

    #[test]
    fn test_invalid_configuration_is_an_error() {
        let args = RunArgs {
            swarms: Some(2),
            particles: Some(3),
            switch_best: Some(4),
            ..RunArgs::default()
        };
        assert!(run_command(&args).is_err());
    }

    #[test]
    fn test_small_run_succeeds() {
        let args = RunArgs {
            swarms: Some(2),
            particles: Some(5),
            iterations: Some(10),
            switches: Some(1),
            switch_best: Some(1),
            function: Some(Benchmark::DeJong),
            lower: Some(vec![-1.0, -1.0]),
            upper: Some(vec![1.0, 1.0]),
            seed: Some(3),
            ..RunArgs::default()
        };
        assert!(run_command(&args).is_ok());
    }

    #[test]
    fn test_run_writes_animation() {
        let dir = tempfile::TempDir::new().unwrap();
        let gif = dir.path().join("out.gif");
        let args = RunArgs {
            swarms: Some(2),
            particles: Some(4),
            iterations: Some(6),
            switches: Some(2),
            switch_best: Some(1),
            function: Some(Benchmark::DeJong),
            lower: Some(vec![-1.0, -1.0]),
            upper: Some(vec![1.0, 1.0]),
            seed: Some(5),
            gif: Some(gif.clone()),
            ..RunArgs::default()
        };
        run_command(&args).unwrap();
        assert!(fs::read(&gif).unwrap().starts_with(b"GIF89a"));
    }
}
