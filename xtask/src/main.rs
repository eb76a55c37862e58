use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "oz-core workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the allocator suite under each global allocator and compare
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Run the test suite with and without leak tracking
    Test {
        /// Also run every test in release mode, where assertions are off
        #[arg(long, default_value_t = false)]
        release: bool,
    },
}

const ALLOCATORS: &[&str] = &["alloc-system", "alloc-oz"];

/// Feature sets the test suite must pass under.
const FEATURE_SETS: &[&str] = &["", "trace-leaks"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Test { release } => run_tests(release)?,
    }

    Ok(())
}

fn run_tests(release: bool) -> Result<()> {
    let profiles: &[bool] = if release { &[false, true] } else { &[false] };

    for features in FEATURE_SETS {
        for &optimized in profiles {
            let label = if features.is_empty() { "default" } else { features };
            println!(
                "\n>>> Testing with features: {label} ({})",
                if optimized { "release" } else { "debug" }
            );

            let mut cmd = Command::new("cargo");
            cmd.args(["test", "-p", "oz-core"]);
            if !features.is_empty() {
                cmd.args(["--features", features]);
            }
            if optimized {
                cmd.arg("--release");
            }

            let status = cmd
                .status()
                .with_context(|| format!("failed to run tests for {label}"))?;
            if !status.success() {
                bail!("tests failed with features: {label}");
            }
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running comparative benchmarks...");

    println!("Compiling benchmarks...");
    let status = Command::new("cargo")
        .args(["build", "--bench", "suite", "--release"])
        .status()?;
    if !status.success() {
        bail!("Failed to compile benchmarks");
    }

    for alloc in ALLOCATORS {
        println!("\n>>> Benchmarking with feature: {alloc}");
        let start = Instant::now();

        let baseline_name = alloc.trim_start_matches("alloc-");

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .env("RUSTFLAGS", "-C opt-level=3 -C codegen-units=1");

        cmd.args(["bench", "--bench", "suite", "--no-default-features"])
            .args(["--features", alloc]);

        // Criterion arguments go after --
        cmd.arg("--");
        cmd.arg("--save-baseline").arg(baseline_name);

        if quick {
            cmd.args(["--measurement-time", "0.1", "--noplot", "--sample-size", "10"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench for {alloc}"))?;

        if status.success() {
            println!("Finished {alloc} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {alloc}");
        }
    }

    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

#[derive(Deserialize)]
struct BenchmarkInfo {
    throughput: Option<Throughput>,
}

#[derive(Deserialize)]
enum Throughput {
    Elements(f64),
    Bytes(f64),
}

/// Operations per second, keyed by workload then baseline.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let mut results = Results::new();

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    collect_results(criterion_dir, &mut results);

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Global Allocator Benchmark Report")?;
    writeln!(file)?;
    writeln!(file, "| Workload | system (Ops/s) | oz (Ops/s) | oz vs system |")?;
    writeln!(file, "|---|---|---|---|")?;

    for (workload, by_baseline) in &results {
        let system = by_baseline.get("system").copied();
        let oz = by_baseline.get("oz").copied();
        let relative = match (system, oz) {
            (Some(s), Some(o)) if s > 0.0 => format!("**{:.2}x**", o / s),
            _ => "-".to_string(),
        };
        writeln!(
            file,
            "| {workload} | {} | {} | {relative} |",
            format_ops(system),
            format_ops(oz)
        )?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: Option<f64>) -> String {
    match ops {
        Some(ops) if ops > 1_000_000.0 => format!("{:.2}M", ops / 1_000_000.0),
        Some(ops) if ops > 1_000.0 => format!("{:.2}K", ops / 1_000.0),
        Some(ops) => format!("{ops:.0}"),
        None => "N/A".to_string(),
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(str::to_owned)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

// Layout: target/criterion/<group>/<workload>/<baseline>/estimates.json
fn collect_results(dir: &Path, results: &mut Results) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results);
            continue;
        }
        if file_name(&path).as_deref() != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let (Some(baseline), Some(workload)) = (file_name(baseline_dir), file_name(workload_dir))
        else {
            continue;
        };
        if baseline == "report" || workload == "report" {
            continue;
        }

        let Some(estimates) = read_json::<Estimates>(&path) else { continue };
        let time_ns = estimates.mean.point_estimate;
        if time_ns <= 0.0 {
            continue;
        }

        let elements = read_json::<BenchmarkInfo>(&baseline_dir.join("benchmark.json"))
            .and_then(|info| info.throughput)
            .map_or(1.0, |t| match t {
                Throughput::Elements(n) | Throughput::Bytes(n) => n,
            });

        results
            .entry(workload)
            .or_default()
            .insert(baseline, elements * 1e9 / time_ns);
    }
}
