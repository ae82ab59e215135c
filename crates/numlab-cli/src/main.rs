// ─────────────────────────────────────────────────────────────────────
// NumLab — CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ndarray::Array1;
use serde::Serialize;
use tracing::info;

use numlab_lbm::channel::{save_velocity, ChannelFlow};
use numlab_math::convergence::ConvergenceStudy;
use numlab_math::finite_diff::Scheme;
use numlab_math::linalg::run_dense_inversion;
use numlab_math::sparse::run_sparse_solve;
use numlab_types::config::{LabConfig, TestFunction};

#[derive(Parser)]
#[command(
    name = "numlab",
    version,
    about = "Numerical-methods lab: finite differences, direct solvers, lattice Boltzmann"
)]
struct Cli {
    /// JSON configuration file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finite-difference convergence study (central, forward, backward)
    Convergence {
        /// Evaluation point
        #[arg(long, allow_hyphen_values = true)]
        x0: Option<f64>,

        /// Base-10 exponent of the smallest step
        #[arg(long, allow_hyphen_values = true)]
        min_exponent: Option<f64>,

        /// Base-10 exponent of the largest step
        #[arg(long, allow_hyphen_values = true)]
        max_exponent: Option<f64>,

        /// Number of steps
        #[arg(long)]
        count: Option<usize>,

        /// Test function
        #[arg(short, long)]
        function: Option<CliFunction>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Invert a random dense matrix and check M·M⁻¹ = I
    Invert {
        /// Matrix size
        #[arg(short = 'n', long)]
        size: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Directly solve a random sparse diagonally dominant system
    SparseSolve {
        /// System size
        #[arg(short = 'n', long)]
        size: Option<usize>,

        /// Fraction of nonzero off-diagonal entries
        #[arg(short, long)]
        density: Option<f64>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Lattice Boltzmann flow past a cylinder in a channel
    Channel {
        /// Number of time steps
        #[arg(short, long)]
        steps: Option<usize>,

        /// Interval between progress reports and velocity snapshots
        #[arg(short, long)]
        report_every: Option<usize>,

        /// Velocity-norm snapshot file, rewritten at every report and at the end
        #[arg(short, long, default_value = "vel.dat")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliFunction {
    Sin,
    Cos,
    Exp,
    Square,
}

impl From<CliFunction> for TestFunction {
    fn from(val: CliFunction) -> Self {
        match val {
            CliFunction::Sin => TestFunction::Sine,
            CliFunction::Cos => TestFunction::Cosine,
            CliFunction::Exp => TestFunction::Exp,
            CliFunction::Square => TestFunction::Square,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&cli.command, &mut config);

    match &cli.command {
        Commands::Convergence { json, .. } => cmd_convergence(&config, *json),
        Commands::Invert { .. } => cmd_invert(&config),
        Commands::SparseSolve { .. } => cmd_sparse_solve(&config),
        Commands::Channel { output, .. } => cmd_channel(&config, output),
    }
}

fn load_config(path: Option<&Path>) -> Result<LabConfig> {
    match path {
        Some(p) => LabConfig::from_file(p)
            .with_context(|| format!("failed to load config from {}", p.display())),
        None => Ok(LabConfig::default()),
    }
}

/// Flags given on the command line replace the matching config values.
fn apply_overrides(command: &Commands, config: &mut LabConfig) {
    match *command {
        Commands::Convergence {
            x0,
            min_exponent,
            max_exponent,
            count,
            function,
            ..
        } => {
            let c = &mut config.convergence;
            override_with(&mut c.x0, x0);
            override_with(&mut c.min_exponent, min_exponent);
            override_with(&mut c.max_exponent, max_exponent);
            override_with(&mut c.count, count);
            override_with(&mut c.function, function.map(Into::into));
        }
        Commands::Invert { size, seed } => {
            override_with(&mut config.dense.size, size);
            override_with(&mut config.dense.seed, seed);
        }
        Commands::SparseSolve {
            size,
            density,
            seed,
        } => {
            override_with(&mut config.sparse.size, size);
            override_with(&mut config.sparse.density, density);
            override_with(&mut config.sparse.seed, seed);
        }
        Commands::Channel {
            steps,
            report_every,
            ..
        } => {
            override_with(&mut config.channel.steps, steps);
            override_with(&mut config.channel.report_every, report_every);
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[derive(Serialize)]
struct ConvergenceOutput<'a> {
    function: &'static str,
    study: &'a ConvergenceStudy,
    observed_order: Vec<(Scheme, Option<f64>)>,
    optimal_step: Vec<(Scheme, Option<(f64, f64)>)>,
    reference_h1: Array1<f64>,
    reference_h2: Array1<f64>,
}

fn cmd_convergence(config: &LabConfig, json: bool) -> Result<()> {
    let cfg = &config.convergence;
    let study = ConvergenceStudy::from_config(cfg).context("invalid convergence configuration")?;

    if json {
        let out = ConvergenceOutput {
            function: cfg.function.name(),
            study: &study,
            observed_order: Scheme::ALL
                .iter()
                .map(|&s| (s, study.observed_order(s)))
                .collect(),
            optimal_step: Scheme::ALL
                .iter()
                .map(|&s| (s, study.optimal_step(s)))
                .collect(),
            reference_h1: study.reference_curve(1),
            reference_h2: study.reference_curve(2),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "f = {}, x0 = {}, f'(x0) = {:.12}",
        cfg.function.name(),
        study.x0,
        study.analytical
    );
    println!();
    println!(
        "{:>12}  {:>12}  {:>12}  {:>12}",
        "h", "central", "forward", "backward"
    );
    for (i, h) in study.steps.steps().iter().enumerate() {
        println!(
            "{:>12.3e}  {:>12.3e}  {:>12.3e}  {:>12.3e}",
            h, study.central.error[i], study.forward.error[i], study.backward.error[i]
        );
    }
    println!();
    for scheme in Scheme::ALL {
        let order = study
            .observed_order(scheme)
            .map_or_else(|| "n/a".to_string(), |p| format!("{p:.3}"));
        let optimum = study
            .optimal_step(scheme)
            .map_or_else(|| "n/a".to_string(), |(h, e)| format!("h = {h:.1e}, err = {e:.2e}"));
        println!(
            "{:<9} nominal order {}  observed {:>6}  optimum {}",
            scheme.label(),
            scheme.nominal_order(),
            order,
            optimum
        );
    }
    Ok(())
}

fn cmd_invert(config: &LabConfig) -> Result<()> {
    let report = run_dense_inversion(&config.dense).context("dense inversion failed")?;
    println!("n = {}", report.size);
    println!("allclose(M·M⁻¹, I) = {}", report.allclose);
    println!("max |M·M⁻¹ − I|   = {:.3e}", report.max_deviation);
    println!("inversion time    = {:.1} ms", report.elapsed_ms);
    if !report.allclose {
        bail!(
            "M·M⁻¹ deviates from the identity by {:.3e}",
            report.max_deviation
        );
    }
    Ok(())
}

fn cmd_sparse_solve(config: &LabConfig) -> Result<()> {
    let report = run_sparse_solve(&config.sparse).context("sparse solve failed")?;
    println!("n = {}, nnz = {}", report.size, report.nnz);
    println!(
        "path              = {}",
        if report.tridiagonal {
            "tridiagonal (Thomas)"
        } else {
            "sparse elimination"
        }
    );
    println!("‖Ax − b‖          = {:.3e}", report.residual_norm);
    println!("‖Ax − b‖ / ‖b‖    = {:.3e}", report.relative_residual);
    println!("solve time        = {:.1} ms", report.elapsed_ms);
    Ok(())
}

fn cmd_channel(config: &LabConfig, output: &Path) -> Result<()> {
    let cfg = &config.channel;
    let mut flow = ChannelFlow::new(cfg).context("invalid channel configuration")?;
    println!(
        "lx = {}, ly = {}, omega = {:.6}",
        cfg.lx,
        cfg.ly,
        cfg.omega()
    );

    flow.run(cfg.steps, cfg.report_every, |t, lattice| {
        println!("t = {t}");
        save_velocity(lattice, output)
    })
    .with_context(|| format!("channel run failed, snapshot file {}", output.display()))?;

    flow.save_snapshot(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(steps = flow.time(), output = %output.display(), "channel run complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("numlab-{name}-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    fn merged(args: &[&str]) -> LabConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut config = load_config(cli.config.as_deref()).unwrap();
        apply_overrides(&cli.command, &mut config);
        config
    }

    #[test]
    fn test_flag_wins_over_file_value() {
        let path = write_config("invert", r#"{ "dense": { "size": 64, "seed": 7 } }"#);
        let p = path.to_str().unwrap();
        let cfg = merged(&["numlab", "--config", p, "invert", "--size", "32"]);
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.dense.size, 32);
        assert_eq!(cfg.dense.seed, 7);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let path = write_config(
            "sparse",
            r#"{ "sparse": { "size": 300, "density": 0.01, "seed": 11 } }"#,
        );
        let p = path.to_str().unwrap();
        let cfg = merged(&["numlab", "sparse-solve", "--config", p]);
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.sparse.size, 300);
        assert!((cfg.sparse.density - 0.01).abs() < 1e-15);
        assert_eq!(cfg.sparse.seed, 11);
    }

    #[test]
    fn test_convergence_overrides_accept_negative_values() {
        let path = write_config(
            "convergence",
            r#"{ "convergence": { "x0": 0.5, "count": 5, "function": "cos" } }"#,
        );
        let p = path.to_str().unwrap();
        let cfg = merged(&[
            "numlab",
            "--config",
            p,
            "convergence",
            "--x0",
            "-1.5",
            "--min-exponent",
            "-8",
            "-f",
            "exp",
        ]);
        std::fs::remove_file(&path).ok();
        let c = &cfg.convergence;
        assert!((c.x0 + 1.5).abs() < 1e-15);
        assert!((c.min_exponent + 8.0).abs() < 1e-15);
        assert_eq!(c.function, TestFunction::Exp);
        assert_eq!(c.count, 5);
        assert!((c.max_exponent - LabConfig::default().convergence.max_exponent).abs() < 1e-15);
    }

    #[test]
    fn test_channel_overrides_leave_geometry() {
        let path = write_config("channel", r#"{ "channel": { "lx": 80, "ly": 30, "steps": 5 } }"#);
        let p = path.to_str().unwrap();
        let cfg = merged(&["numlab", "--config", p, "channel", "-s", "40", "-r", "10"]);
        std::fs::remove_file(&path).ok();
        assert_eq!((cfg.channel.lx, cfg.channel.ly), (80, 30));
        assert_eq!(cfg.channel.steps, 40);
        assert_eq!(cfg.channel.report_every, 10);
    }

    #[test]
    fn test_no_config_uses_defaults() {
        let cfg = merged(&["numlab", "invert", "--seed", "3"]);
        assert_eq!(cfg.dense.size, LabConfig::default().dense.size);
        assert_eq!(cfg.dense.seed, 3);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/numlab.json"))).is_err());
    }
}
