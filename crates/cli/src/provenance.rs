use anyhow::{Context, Result};
use sat_locality::dimacs::GENERATOR_NAME;
use sat_locality::{GenerationSummary, GeneratorParams};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct InstanceRecord {
    generator: &'static str,
    variables: usize,
    clauses: usize,
    arity: usize,
    width: f64,
    seed: Option<u64>,
    max_attempts: Option<u64>,
}

#[derive(Serialize)]
struct SummaryRecord {
    clauses_written: usize,
    attempts: u64,
}

#[derive(Serialize)]
struct Sidecar {
    code_rev: String,
    version: &'static str,
    callsite: Callsite,
    params: InstanceRecord,
    summary: SummaryRecord,
    outputs: Vec<String>,
}

/// Write `<instance stem>.provenance.json` next to `instance`: git revision,
/// callsite, generator params and what the run produced.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(
    instance: P,
    params: &GeneratorParams,
    summary: &GenerationSummary,
) -> Result<PathBuf> {
    let instance = instance.as_ref();
    let path = sidecar_path(instance);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = Sidecar {
        code_rev: current_git_rev(),
        version: sat_locality::VERSION,
        callsite: Callsite {
            file: callsite.file(),
            line: callsite.line(),
        },
        params: InstanceRecord {
            generator: GENERATOR_NAME,
            variables: params.variables,
            clauses: params.clauses,
            arity: params.arity,
            width: params.width,
            seed: params.seed,
            max_attempts: params.max_attempts,
        },
        summary: SummaryRecord {
            clauses_written: summary.clauses,
            attempts: summary.attempts,
        },
        outputs: vec![instance.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(instance: &Path) -> PathBuf {
    let mut name = instance
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("instance"));
    name.push(".provenance.json");
    instance.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
