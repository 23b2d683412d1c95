//! Width sweep: generate instances across a range of `w`, time an external
//! solver on each and tabulate mean runtime per width.
//!
//! Layout under the experiment directory
//! - `trial-<w>-<t>.cnf` and its `.provenance.json` sidecar
//! - `result-<w>-<t>.txt`: the solver's stdout
//! - `results.csv`: `width, trials, mean_seconds`

use crate::provenance;
use anyhow::{Context, Result};
use polars::prelude::*;
use sat_locality::{generate, GeneratorParams};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Solver used when no command is given on the command line.
pub const DEFAULT_SOLVER: [&str; 5] = ["docker", "run", "--rm", "-i", "msoos/cryptominisat:v2"];

/// Marker of the solver's runtime line, e.g. `c Total time: 1.23`.
const TOTAL_TIME_MARKER: &str = "c Total time";

#[derive(Clone, Debug)]
pub struct SweepCfg {
    pub min_width: f64,
    pub max_width: f64,
    pub steps: usize,
    pub trials: usize,
    pub dir: PathBuf,
    /// Template for every instance; `width` is set per step and `seed`, when
    /// present, is mixed with the instance number.
    pub instance: GeneratorParams,
    /// Program and arguments; the instance is fed on stdin.
    pub solver: Vec<String>,
}

/// Mean solver runtime for one width.
#[derive(Clone, Debug, PartialEq)]
pub struct WidthResult {
    pub width: f64,
    /// Trials whose output contained a runtime line.
    pub trials: u32,
    pub mean_seconds: Option<f64>,
}

/// `steps + 1` evenly spaced widths from `min` to `max`, skipping zero.
pub fn widths(min: f64, max: f64, steps: usize) -> Vec<f64> {
    let points: Vec<f64> = if steps == 0 {
        vec![min]
    } else {
        let step = (max - min) / steps as f64;
        (0..=steps)
            .map(|i| if i == steps { max } else { min + step * i as f64 })
            .collect()
    };
    points.into_iter().filter(|&w| w != 0.0).collect()
}

/// Seed of instance `index` derived from the sweep seed (SplitMix64 finalizer).
pub fn instance_seed(base: u64, index: u64) -> u64 {
    let mut x = base ^ index.wrapping_add(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// Runtime in seconds from the first `c Total time ...: <seconds>` line.
pub fn parse_total_time(output: &str) -> Option<f64> {
    let line = output.lines().find(|l| l.contains(TOTAL_TIME_MARKER))?;
    let (_, value) = line.split_once(':')?;
    value.split_whitespace().next()?.parse().ok()
}

pub fn run(cfg: &SweepCfg) -> Result<Vec<WidthResult>> {
    if cfg.trials == 0 {
        anyhow::bail!("need at least one trial per width");
    }
    if cfg.solver.is_empty() {
        anyhow::bail!("solver command is empty");
    }
    let ws = widths(cfg.min_width, cfg.max_width, cfg.steps);
    for &w in &ws {
        GeneratorParams {
            width: w,
            ..cfg.instance.clone()
        }
        .validate()
        .with_context(|| format!("width {w}"))?;
    }
    if let Some(parent) = cfg.dir.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::create_dir(&cfg.dir)
        .with_context(|| format!("creating experiment dir {}", cfg.dir.display()))?;

    let total = ws.len() * cfg.trials;
    tracing::info!(widths = ws.len(), trials = cfg.trials, "generating instances and solving");

    let mut results = Vec::with_capacity(ws.len());
    let mut instance_number: u64 = 0;
    for &w in &ws {
        let mut times = Vec::with_capacity(cfg.trials);
        for trial in 0..cfg.trials {
            instance_number += 1;
            tracing::debug!("instance {instance_number} of {total}");
            let params = GeneratorParams {
                width: w,
                seed: cfg.instance.seed.map(|s| instance_seed(s, instance_number)),
                ..cfg.instance.clone()
            };
            let instance = cfg.dir.join(format!("trial-{w}-{trial}.cnf"));
            let result = cfg.dir.join(format!("result-{w}-{trial}.txt"));
            write_instance(&params, &instance)?;
            run_solver(&cfg.solver, &instance, &result)?;
            let output = fs::read_to_string(&result)
                .with_context(|| format!("reading {}", result.display()))?;
            match parse_total_time(&output) {
                Some(t) => times.push(t),
                None => tracing::warn!(result = %result.display(), "no runtime line in solver output"),
            }
        }
        results.push(WidthResult {
            width: w,
            trials: times.len() as u32,
            mean_seconds: mean(&times),
        });
    }

    tracing::info!("analyzing outputs");
    let csv = cfg.dir.join("results.csv");
    write_results_csv(&csv, &results)?;
    tracing::info!(path = %csv.display(), "wrote results");
    Ok(results)
}

fn write_instance(params: &GeneratorParams, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let summary = generate(params, BufWriter::new(file))
        .with_context(|| format!("generating {}", path.display()))?;
    provenance::write_sidecar(path, params, &summary)?;
    Ok(())
}

fn run_solver(solver: &[String], instance: &Path, result: &Path) -> Result<()> {
    let input = File::open(instance).with_context(|| format!("opening {}", instance.display()))?;
    let output = File::create(result).with_context(|| format!("creating {}", result.display()))?;
    // SAT solvers signal SAT/UNSAT through exit codes 10/20, so status is only logged.
    let status = Command::new(&solver[0])
        .args(&solver[1..])
        .stdin(Stdio::from(input))
        .stdout(Stdio::from(output))
        .status()
        .with_context(|| format!("running solver {}", solver[0]))?;
    tracing::debug!(code = ?status.code(), "solver exited");
    Ok(())
}

fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

pub fn write_results_csv(path: &Path, rows: &[WidthResult]) -> Result<()> {
    let mut df = df!(
        "width" => rows.iter().map(|r| r.width).collect::<Vec<_>>(),
        "trials" => rows.iter().map(|r| r.trials).collect::<Vec<_>>(),
        "mean_seconds" => rows.iter().map(|r| r.mean_seconds).collect::<Vec<_>>(),
    )?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
