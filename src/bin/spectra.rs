//! # spectra
//!
//! Command-line front end for the spectral processing core.
//!
//! ```bash
//! # Summarise the curves in a file
//! spectra info sample.spc
//!
//! # Baseline-correct and smooth every curve, print JSON
//! spectra process sample.spc --step baseline --step smooth:9
//!
//! # Detect peaks
//! spectra peaks sample.spc --prominence 0.05 --max-peaks 10
//!
//! # Screen points for an 800x600 plot
//! spectra decimate sample.spc --width 800 --height 600
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use rusty_spectra::data::model::{Curve, Peak, SequentialIds};
use rusty_spectra::processing::{algebra, apply_steps, peaks, ProcessingStep};
use rusty_spectra::view::{render_window, visible_range, LinearPixelMap};
use rusty_spectra::{Config, DecimatedPoint, DecoderRegistry};

/// Spectral curve inspection and processing
#[derive(Parser)]
#[command(name = "spectra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the curves in a file
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Apply processing steps and print the resulting curves as JSON
    Process {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Step to apply, repeatable (baseline, minmax, area, snv, smooth[:N], derivative, second-derivative)
        #[arg(short, long = "step", value_name = "STEP")]
        steps: Vec<ProcessingStep>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect peaks in every curve
    Peaks {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Minimum prominence as a fraction of the y-range
        #[arg(long)]
        prominence: Option<f64>,

        /// Minimum index distance between peaks
        #[arg(long)]
        min_distance: Option<usize>,

        #[arg(long)]
        max_peaks: Option<usize>,
    },

    /// Compute screen points for the first curve of a file
    Decimate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, default_value = "800")]
        width: f64,

        #[arg(long, default_value = "600")]
        height: f64,

        /// Lower x bound of the view (defaults to the data minimum)
        #[arg(long, allow_hyphen_values = true)]
        from: Option<f64>,

        /// Upper x bound of the view (defaults to the data maximum)
        #[arg(long, allow_hyphen_values = true)]
        to: Option<f64>,

        /// Override the configured target point count
        #[arg(long)]
        target: Option<usize>,
    },

    /// Correlate and subtract the first curves of two files
    Compare {
        #[arg(value_name = "A")]
        a: PathBuf,

        #[arg(value_name = "B")]
        b: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut session = Session::new(config);

    match cli.command {
        Commands::Info { file, json } => session.run_info(&file, json),
        Commands::Process {
            file,
            steps,
            output,
        } => session.run_process(&file, steps, output),
        Commands::Peaks {
            file,
            prominence,
            min_distance,
            max_peaks,
        } => session.run_peaks(&file, prominence, min_distance, max_peaks),
        Commands::Decimate {
            file,
            width,
            height,
            from,
            to,
            target,
        } => session.run_decimate(&file, width, height, (from, to), target),
        Commands::Compare { a, b } => session.run_compare(&a, &b),
    }
}

/// Decoders and id counter shared by one invocation.
struct Session {
    config: Config,
    registry: DecoderRegistry,
    ids: SequentialIds,
}

impl Session {
    fn new(config: Config) -> Self {
        let registry = DecoderRegistry::new(config.loader.text_decoding);
        Self {
            config,
            registry,
            ids: SequentialIds::new(),
        }
    }

    fn load(&mut self, path: &Path) -> Result<Vec<Curve>> {
        self.registry.load_file(path, &mut self.ids)
    }

    fn load_first(&mut self, path: &Path) -> Result<Curve> {
        match self.load(path)?.into_iter().next() {
            Some(curve) => Ok(curve),
            None => bail!("{} contains no curves", path.display()),
        }
    }

    fn run_info(&mut self, file: &Path, json: bool) -> Result<()> {
        let curves = self.load(file)?;
        let summaries: Vec<CurveSummary> = curves.iter().map(CurveSummary::from).collect();
        if json {
            return print_json(&summaries, None);
        }

        println!("{} curve(s) in {}", summaries.len(), file.display());
        for s in &summaries {
            println!(
                "  {:<10} {:<32} {:>7} pts  x {:>10.3} .. {:<10.3} {} / {}  [{}]",
                s.id,
                s.label,
                s.points,
                s.x_range.0,
                s.x_range.1,
                s.x_unit.as_deref().unwrap_or("-"),
                s.y_unit.as_deref().unwrap_or("-"),
                s.kind.as_deref().unwrap_or("unknown"),
            );
        }
        Ok(())
    }

    fn run_process(
        &mut self,
        file: &Path,
        steps: Vec<ProcessingStep>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let steps = if steps.is_empty() {
            self.config.processing.steps.clone()
        } else {
            steps
        };
        if steps.is_empty() {
            bail!("no processing steps given (use --step or [processing] steps)");
        }

        let curves = self.load(file)?;
        let processed: Vec<Curve> = curves
            .iter()
            .map(|curve| apply_steps(curve, &steps, &mut self.ids))
            .collect();
        info!("Processed {} curve(s) with {} step(s)", processed.len(), steps.len());
        print_json(&processed, output.as_deref())
    }

    fn run_peaks(
        &mut self,
        file: &Path,
        prominence: Option<f64>,
        min_distance: Option<usize>,
        max_peaks: Option<usize>,
    ) -> Result<()> {
        let mut params = self.config.peaks.clone();
        if let Some(p) = prominence {
            params.prominence = p;
        }
        if let Some(d) = min_distance {
            params.min_distance = d;
        }
        if max_peaks.is_some() {
            params.max_peaks = max_peaks;
        }

        let curves = self.load(file)?;
        let found: Vec<Peak> = curves
            .iter()
            .flat_map(|curve| peaks::detect_curve(curve, &params))
            .collect();
        info!("Found {} peak(s) in {} curve(s)", found.len(), curves.len());
        print_json(&found, None)
    }

    fn run_decimate(
        &mut self,
        file: &Path,
        width: f64,
        height: f64,
        (from, to): (Option<f64>, Option<f64>),
        target: Option<usize>,
    ) -> Result<()> {
        let curve = self.load_first(file)?;
        let (x, y) = curve.samples();
        let (x_min, x_max) = bounds(x).context("curve has no finite x values")?;
        let (lo, hi) = (from.unwrap_or(x_min), to.unwrap_or(x_max));
        let window = visible_range(x, lo, hi);
        let (y_min, y_max) = bounds(&y[window.0..window.1]).unwrap_or((0.0, 1.0));

        let mut settings = self.config.render;
        if let Some(t) = target {
            settings.target_points = t;
        }
        let points: Vec<DecimatedPoint> = render_window(
            &curve,
            window,
            &LinearPixelMap::horizontal(lo, hi, width),
            &LinearPixelMap::vertical(y_min, y_max, height),
            &settings,
        );
        info!(
            "{} of {} visible samples kept",
            points.len(),
            window.1 - window.0
        );
        print_json(&points, None)
    }

    fn run_compare(&mut self, a: &Path, b: &Path) -> Result<()> {
        let a = self.load_first(a)?;
        let b = self.load_first(b)?;
        let residual = algebra::residual(&a, &b, &mut self.ids);
        let report = Comparison {
            a: a.label.clone(),
            b: b.label.clone(),
            points: residual.len(),
            correlation: algebra::correlation(&a, &b),
            max_residual: residual.y.iter().copied().fold(0.0, f64::max),
        };
        print_json(&report, None)
    }
}

#[derive(Serialize)]
struct CurveSummary {
    id: String,
    label: String,
    points: usize,
    x_range: (f64, f64),
    x_unit: Option<String>,
    y_unit: Option<String>,
    kind: Option<String>,
    /// Metadata entries with a numeric reading.
    numeric_meta: BTreeMap<String, f64>,
}

impl From<&Curve> for CurveSummary {
    fn from(curve: &Curve) -> Self {
        let (x, _) = curve.samples();
        Self {
            id: curve.id.to_string(),
            label: curve.label.clone(),
            points: curve.len(),
            x_range: (
                x.first().copied().unwrap_or(f64::NAN),
                x.last().copied().unwrap_or(f64::NAN),
            ),
            x_unit: curve.x_unit.clone(),
            y_unit: curve.y_unit.clone(),
            kind: curve.kind.map(|k| k.to_string()),
            numeric_meta: curve
                .meta
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value.as_f64()?)))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Comparison {
    a: String,
    b: String,
    points: usize,
    correlation: f64,
    max_residual: f64,
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn print_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_spectra::data::model::CurveId;

    #[test]
    fn summary_keeps_numeric_metadata() {
        let curve = Curve::new(CurveId(3), "s", vec![4000.0, 3998.0], vec![0.1, 0.2])
            .with_meta("exponent", 128_i64)
            .with_meta("concentration", "1.5")
            .with_meta("version", "0x4B");
        let summary = CurveSummary::from(&curve);
        assert_eq!(summary.id, "curve-3");
        assert_eq!(summary.x_range, (4000.0, 3998.0));
        assert_eq!(summary.numeric_meta.get("exponent"), Some(&128.0));
        assert_eq!(summary.numeric_meta.get("concentration"), Some(&1.5));
        assert!(!summary.numeric_meta.contains_key("version"));
    }

    #[test]
    fn bounds_skip_non_finite_values() {
        assert_eq!(bounds(&[3.0, f64::NAN, -1.0, 2.0]), Some((-1.0, 3.0)));
        assert_eq!(bounds(&[f64::NAN]), None);
    }
}
