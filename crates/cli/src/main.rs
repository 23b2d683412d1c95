use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sat_locality::{generate, GenerationSummary, GeneratorError, GeneratorParams};
use std::fs::File;
use std::io::{self, BufWriter, ErrorKind};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod sweep;

#[derive(Parser)]
#[command(name = "sl")]
#[command(about = "Random SAT instances with spatial locality", version)]
struct Cmd {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    action: Action,
}

/// Instance shape shared by `gen` and `sweep`.
#[derive(Args, Clone, Debug)]
struct InstanceArgs {
    /// Number of variables
    #[arg(short = 'n', long, default_value_t = 100_000)]
    variables: usize,
    /// Number of clauses
    #[arg(short = 'm', long, default_value_t = 100_000)]
    clauses: usize,
    /// Number of variables per clause
    #[arg(short = 'k', long, default_value_t = 5)]
    arity: usize,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Give up after this many rejected clause centers in a row
    #[arg(long)]
    max_attempts: Option<u64>,
}

impl InstanceArgs {
    fn params(&self, width: f64) -> GeneratorParams {
        GeneratorParams {
            variables: self.variables,
            clauses: self.clauses,
            arity: self.arity,
            width,
            seed: self.seed,
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Write one DIMACS CNF instance to a file or stdout
    Gen {
        #[command(flatten)]
        instance: InstanceArgs,
        /// Legal distance of a variable from the clause center (fraction of the circle)
        #[arg(short = 'w', long, default_value_t = 0.25)]
        width: f64,
        /// Output file name (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Also write a provenance sidecar next to the output file
        #[arg(long, requires = "output")]
        provenance: bool,
    },
    /// Sweep the width, run a solver on every instance and tabulate runtimes
    Sweep {
        #[command(flatten)]
        instance: InstanceArgs,
        /// Minimum width
        #[arg(short = 'a', long, default_value_t = 0.0)]
        min_w: f64,
        /// Maximum width
        #[arg(short = 'b', long, default_value_t = 0.5)]
        max_w: f64,
        /// Number of steps between min and max width
        #[arg(short = 's', long, default_value_t = 10)]
        steps: usize,
        /// Trials per step
        #[arg(short = 't', long, default_value_t = 3)]
        trials: usize,
        /// Directory to write experiment files and results in
        #[arg(short = 'd', long, default_value = "experiment")]
        experiment_dir: PathBuf,
        /// Solver command; reads the instance on stdin
        #[arg(last = true)]
        solver: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.quiet { Level::WARN } else { Level::DEBUG };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    match cmd.action {
        Action::Gen {
            instance,
            width,
            output,
            provenance,
        } => gen(instance.params(width), output, provenance),
        Action::Sweep {
            instance,
            min_w,
            max_w,
            steps,
            trials,
            experiment_dir,
            solver,
        } => {
            let solver = if solver.is_empty() {
                sweep::DEFAULT_SOLVER.iter().map(|s| s.to_string()).collect()
            } else {
                solver
            };
            let cfg = sweep::SweepCfg {
                min_width: min_w,
                max_width: max_w,
                steps,
                trials,
                dir: experiment_dir,
                instance: instance.params(max_w),
                solver,
            };
            for row in sweep::run(&cfg)? {
                tracing::info!(width = row.width, trials = row.trials, mean_seconds = ?row.mean_seconds, "width");
            }
            Ok(())
        }
    }
}

fn gen(params: GeneratorParams, output: Option<PathBuf>, with_provenance: bool) -> Result<()> {
    // Reject bad parameters before creating or writing anything.
    params.validate()?;
    tracing::info!(
        n = params.variables,
        m = params.clauses,
        k = params.arity,
        w = params.width,
        seed = ?params.seed,
        "gen"
    );
    let started = Instant::now();
    match output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            let summary = generate(&params, BufWriter::new(file))?;
            if with_provenance {
                let sidecar = provenance::write_sidecar(&path, &params, &summary)?;
                tracing::debug!(path = %sidecar.display(), "wrote provenance");
            }
            log_done(&summary, started);
        }
        None => {
            let stdout = io::stdout();
            match generate(&params, BufWriter::new(stdout.lock())) {
                Ok(summary) => log_done(&summary, started),
                // A closed downstream pipe (e.g. `| head`) ends the run quietly.
                Err(GeneratorError::Io(e)) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("stdout closed");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

fn log_done(summary: &GenerationSummary, started: Instant) {
    tracing::info!(
        clauses = summary.clauses,
        attempts = summary.attempts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
}
