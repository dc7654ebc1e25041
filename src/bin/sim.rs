use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use collabsim::sim::{ModelConfig, Simulation, SimulationError, parse_variations};
use collabsim::stats::{BatchStats, RunSummary};
use collabsim::types::Motivation;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MotivationArg {
    #[value(name = "self")]
    SelfInterested,
    Community,
    Both,
}

impl MotivationArg {
    fn motivations(self) -> Vec<Motivation> {
        match self {
            MotivationArg::SelfInterested => vec![Motivation::SelfInterested],
            MotivationArg::Community => vec![Motivation::Community],
            MotivationArg::Both => vec![Motivation::SelfInterested, Motivation::Community],
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "collab-sim")]
#[command(about = "Team formation simulator - run negotiation variations over a community of players")]
struct Args {
    /// JSON file with model parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of players (even)
    #[arg(long)]
    players: Option<usize>,

    /// Number of resource letters (even, at most 26)
    #[arg(long)]
    resources: Option<usize>,

    /// Objectives dealt to each player
    #[arg(long)]
    objectives: Option<usize>,

    /// How many times more common high-frequency resources are
    #[arg(long)]
    resource_ratio: Option<usize>,

    /// How many times more common prevalent objective categories are
    #[arg(long)]
    objective_ratio: Option<usize>,

    /// Value of a high-value (subscript 1) objective
    #[arg(long)]
    value_high: Option<u32>,

    /// Value of a low-value (subscript 2) objective
    #[arg(long)]
    value_low: Option<u32>,

    /// Rounds without any action before a run counts as converged
    #[arg(long)]
    stale_rounds: Option<usize>,

    /// Hard stop for runs that never converge
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Deal resources and objectives in alphabetical order
    #[arg(long)]
    no_shuffle: bool,

    /// Comma-separated variation numbers (0-5)
    #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,4,5")]
    variations: Vec<u8>,

    /// Runs per variation and motivation
    #[arg(short = 'n', long, default_value_t = 10)]
    runs: usize,

    /// Which motivation to simulate
    #[arg(long, value_enum, default_value_t = MotivationArg::Both)]
    motivation: MotivationArg,

    /// Random seed; each variation reseeds, then runs self-interested before community
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Write one JSON object per run to stdout
    #[arg(long)]
    json: bool,

    /// Silence the summary table
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn base_config(&self) -> Result<ModelConfig, SimulationError> {
        let mut config = match &self.config {
            Some(path) => ModelConfig::from_json_file(path)?,
            None => ModelConfig::default(),
        };
        let overrides = [
            (self.players, &mut config.num_players),
            (self.resources, &mut config.num_resources),
            (self.objectives, &mut config.objectives_per_player),
            (self.resource_ratio, &mut config.resource_ratio),
            (self.objective_ratio, &mut config.objective_ratio),
            (self.stale_rounds, &mut config.stale_rounds),
            (self.max_rounds, &mut config.max_rounds),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }
        if let Some(value) = self.value_high {
            config.value_high = value;
        }
        if let Some(value) = self.value_low {
            config.value_low = value;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_shuffle {
            config.shuffle = false;
        }
        Ok(config)
    }
}

/// Every requested motivation for one variation, run back to back on a single
/// seeded stream.
#[derive(Debug, Clone)]
struct Job {
    config: ModelConfig,
    motivations: Vec<Motivation>,
    runs: usize,
}

struct JobOutput {
    summaries: Vec<RunSummary>,
    stats: BatchStats,
    duration: Duration,
}

type JobResult = Result<JobOutput, SimulationError>;

impl Job {
    fn execute(&self) -> JobResult {
        let start = Instant::now();
        let mut simulation = Simulation::new(self.config.clone())?;
        let summaries = simulation.run_motivations(self.runs, &self.motivations)?;
        let mut stats = BatchStats::new();
        for summary in &summaries {
            stats.record(summary);
        }
        Ok(JobOutput {
            summaries,
            stats,
            duration: start.elapsed(),
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("collabsim=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let base = match args.base_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let variations = match parse_variations(&args.variations) {
        Ok(variations) => variations,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let jobs: Vec<Job> = variations
        .iter()
        .map(|variation| Job {
            config: base.clone().with_variation(*variation),
            motivations: args.motivation.motivations(),
            runs: args.runs,
        })
        .collect();

    for job in &jobs {
        if let Err(err) = job.config.validate() {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }

    let results = if args.workers > 1 {
        run_parallel_jobs(&jobs, args.workers)
    } else {
        jobs.iter().map(Job::execute).collect()
    };

    let mut stats = BatchStats::new();
    let mut total_duration = Duration::ZERO;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (job, result) in jobs.iter().zip(results) {
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                eprintln!(
                    "Error: variation {} failed: {}",
                    job.config.variation.number(),
                    err
                );
                std::process::exit(1);
            }
        };
        total_duration += output.duration;
        info!(
            variation = %job.config.variation,
            runs = output.summaries.len(),
            duration = ?output.duration,
            "variation finished"
        );

        if args.json {
            for summary in &output.summaries {
                let written = serde_json::to_string(summary)
                    .map_err(std::io::Error::from)
                    .and_then(|line| writeln!(out, "{}", line));
                if let Err(err) = written {
                    eprintln!("Error: failed to write run summary: {}", err);
                    std::process::exit(1);
                }
            }
        }
        stats.merge(output.stats);
    }

    if !args.quiet && !args.json {
        print_summary(&stats, &base, total_duration);
    }
}

fn run_parallel_jobs(jobs: &[Job], workers: usize) -> Vec<JobResult> {
    let mut handles = Vec::new();
    for worker_id in 0..workers {
        // Round-robin keeps each worker's share roughly even.
        let assigned: Vec<(usize, Job)> = jobs
            .iter()
            .cloned()
            .enumerate()
            .filter(|(idx, _)| idx % workers == worker_id)
            .collect();
        if assigned.is_empty() {
            continue;
        }
        handles.push(thread::spawn(move || {
            assigned
                .into_iter()
                .map(|(idx, job)| (idx, job.execute()))
                .collect::<Vec<_>>()
        }));
    }

    let mut indexed: Vec<(usize, JobResult)> = Vec::with_capacity(jobs.len());
    for handle in handles {
        match handle.join() {
            Ok(done) => indexed.extend(done),
            Err(_) => {
                eprintln!("Error: worker thread panicked");
                std::process::exit(1);
            }
        }
    }
    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, result)| result).collect()
}

fn print_summary(stats: &BatchStats, config: &ModelConfig, duration: Duration) {
    println!("\n{}", "=".repeat(100));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(100));

    println!(
        "\nPlayers: {}, Resources: {}, Objectives/player: {}, Ratios: {}/{}, Values: {}/{}, Seed: {}",
        config.num_players,
        config.num_resources,
        config.objectives_per_player,
        config.resource_ratio,
        config.objective_ratio,
        config.value_high,
        config.value_low,
        config.seed,
    );

    println!(
        "\n{:<4} {:<16} {:<6} {:<10} {:<10} {:<10} {:<10} {:<8} {:<8} {:<8} {:<6}",
        "Var", "Motivation", "Runs", "Before", "After", "Rounds", "Actions", "Teams", "Dropped", "Traded", "Conv"
    );
    println!("{}", "-".repeat(100));

    for ((variation, motivation), group) in &stats.groups {
        println!(
            "{:<4} {:<16} {:<6} {:<10.1} {:<10.1} {:<10.1} {:<10.1} {:<8.2} {:<8.2} {:<8.2} {}/{}",
            variation.number(),
            motivation.to_string(),
            group.runs,
            group.avg_before(),
            group.avg_after(),
            group.avg_rounds(),
            group.avg_actions(),
            group.avg_teams(),
            group.avg_dropped(),
            group.avg_traded(),
            group.converged,
            group.runs,
        );
    }

    println!("\nTotal Duration: {:.2?}", duration);
}
