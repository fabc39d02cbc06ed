use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{baseline, derivative, normalize, smoothing};
use crate::data::model::{Curve, IdSource};
use crate::error::StepParseError;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 7;

/// One single-curve transform.
///
/// Parsed from and printed as `baseline`, `minmax`, `area`, `snv`,
/// `smooth:<window>`, `derivative` and `second-derivative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProcessingStep {
    Baseline,
    MinMax,
    Area,
    Snv,
    Smooth { window: usize },
    Derivative,
    SecondDerivative,
}

impl ProcessingStep {
    /// New intensities for the given samples.
    pub fn apply_values(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        match *self {
            ProcessingStep::Baseline => baseline::baseline_correct(y),
            ProcessingStep::MinMax => normalize::min_max(y),
            ProcessingStep::Area => normalize::area(x, y),
            ProcessingStep::Snv => normalize::snv(y),
            ProcessingStep::Smooth { window } => smoothing::savitzky_golay(y, window),
            ProcessingStep::Derivative => derivative::first_derivative(x, y),
            ProcessingStep::SecondDerivative => derivative::second_derivative(x, y),
        }
    }

    /// The step as a new curve sharing the source x-axis.
    pub fn apply(&self, curve: &Curve, ids: &mut dyn IdSource) -> Curve {
        apply_steps(curve, std::slice::from_ref(self), ids)
    }
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStep::Baseline => f.write_str("baseline"),
            ProcessingStep::MinMax => f.write_str("minmax"),
            ProcessingStep::Area => f.write_str("area"),
            ProcessingStep::Snv => f.write_str("snv"),
            ProcessingStep::Smooth { window } => write!(f, "smooth:{window}"),
            ProcessingStep::Derivative => f.write_str("derivative"),
            ProcessingStep::SecondDerivative => f.write_str("second-derivative"),
        }
    }
}

impl FromStr for ProcessingStep {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s.as_str(), None),
        };
        let step = match name {
            "baseline" | "rubber-band" => ProcessingStep::Baseline,
            "minmax" | "min-max" => ProcessingStep::MinMax,
            "area" => ProcessingStep::Area,
            "snv" => ProcessingStep::Snv,
            "smooth" | "sg" | "savitzky-golay" => {
                let window = match arg {
                    Some(w) => w
                        .parse()
                        .map_err(|_| StepParseError::InvalidWindow(w.to_string()))?,
                    None => DEFAULT_SMOOTHING_WINDOW,
                };
                return Ok(ProcessingStep::Smooth { window });
            }
            "derivative" | "d1" => ProcessingStep::Derivative,
            "second-derivative" | "d2" => ProcessingStep::SecondDerivative,
            _ => return Err(StepParseError::Unknown(s.clone())),
        };
        match arg {
            Some(_) => Err(StepParseError::Unknown(s.clone())),
            None => Ok(step),
        }
    }
}

impl TryFrom<String> for ProcessingStep {
    type Error = StepParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProcessingStep> for String {
    fn from(step: ProcessingStep) -> Self {
        step.to_string()
    }
}

/// Run `steps` in order and return one derived curve.
///
/// The label lists the steps, e.g. `"sample (baseline, smooth:9)"`. With no
/// steps the result is a copy of `curve` under a fresh id.
pub fn apply_steps(curve: &Curve, steps: &[ProcessingStep], ids: &mut dyn IdSource) -> Curve {
    let (x, y) = curve.samples();
    let mut values = y.to_vec();
    for step in steps {
        debug!("applying {step} to {} ({} samples)", curve.id, values.len());
        values = step.apply_values(x, &values);
    }
    let operation = if steps.is_empty() {
        "copy".to_string()
    } else {
        steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    curve.derive(ids.next_id(), &operation, values)
}
