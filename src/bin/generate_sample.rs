//! Writes synthetic IR spectra for trying out the viewer and the CLI.
//!
//! - `sample_data.spc`: one multi-curve SPC file, shared implied x-grid
//! - `sample_data.parquet`: the same curves one per row (with the
//!   `parquet` feature)

use anyhow::{Context, Result};

use rusty_spectra::data::spc::SpcBuilder;

const FIRST_WAVENUMBER: f64 = 4000.0;
const LAST_WAVENUMBER: f64 = 400.0;
const POINTS: usize = 1801;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavenumbers: &[f64],
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            // Sloped background so baseline correction has something to do.
            let background = 0.05 + 0.00002 * (wn - LAST_WAVENUMBER);
            signal + background + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Sample {
    name: &'static str,
    concentration: f64,
    spectrum: Vec<f64>,
}

impl Sample {
    fn label(&self) -> String {
        format!("{} @ {}", self.name, self.concentration)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut rng = SimpleRng::new(42);

    let step = (LAST_WAVENUMBER - FIRST_WAVENUMBER) / (POINTS - 1) as f64;
    let wavenumbers: Vec<f64> = (0..POINTS)
        .map(|i| FIRST_WAVENUMBER + i as f64 * step)
        .collect();

    let sample_peaks: [(&str, [(f64, f64, f64); 4]); 3] = [
        ("Sample_A", [(3400.0, 80.0, 0.8), (2900.0, 40.0, 0.5), (1650.0, 20.0, 0.6), (1050.0, 15.0, 0.4)]),
        ("Sample_B", [(3200.0, 60.0, 0.6), (2800.0, 50.0, 0.7), (1720.0, 18.0, 0.9), (1250.0, 25.0, 0.3)]),
        ("Sample_C", [(3600.0, 70.0, 0.9), (3000.0, 45.0, 0.4), (1600.0, 22.0, 0.5), (800.0, 12.0, 0.7)]),
    ];
    let concentrations = [0.5, 1.0, 2.0];

    let mut samples = Vec::new();
    for (name, peaks) in &sample_peaks {
        for &concentration in &concentrations {
            let scaled: Vec<(f64, f64, f64)> = peaks
                .iter()
                .map(|&(mu, sigma, amp)| (mu, sigma, amp * concentration))
                .collect();
            samples.push(Sample {
                name: *name,
                concentration,
                spectrum: generate_spectrum(&wavenumbers, &scaled, 0.004 * concentration, &mut rng),
            });
        }
    }

    // x type 1 = wavenumber, y type 2 = absorbance
    let spc = samples
        .iter()
        .fold(
            SpcBuilder::new(FIRST_WAVENUMBER, LAST_WAVENUMBER)
                .axis_types(1, 2)
                .memo("Synthetic IR series"),
            |builder, s| builder.curve(s.spectrum.clone()),
        )
        .build();
    for (i, s) in samples.iter().enumerate() {
        log::info!("sub-curve #{}: {}", i + 1, s.label());
    }
    let spc_path = "sample_data.spc";
    std::fs::write(spc_path, &spc).with_context(|| format!("Failed to write {spc_path}"))?;
    println!(
        "Wrote {} spectra ({} wavenumbers each) to {spc_path}",
        samples.len(),
        wavenumbers.len()
    );

    #[cfg(feature = "parquet")]
    parquet_output::write(&wavenumbers, &samples)?;

    Ok(())
}

#[cfg(feature = "parquet")]
mod parquet_output {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use arrow::array::{Float64Array, Float64Builder, Int64Array, ListBuilder, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::Sample;

    fn list_column(rows: impl Iterator<Item = Vec<f64>>) -> arrow::array::ListArray {
        let mut builder = ListBuilder::new(Float64Builder::new());
        for row in rows {
            builder.values().append_slice(&row);
            builder.append(true);
        }
        builder.finish()
    }

    pub fn write(wavenumbers: &[f64], samples: &[Sample]) -> Result<()> {
        let x_array = list_column(samples.iter().map(|_| wavenumbers.to_vec()));
        let y_array = list_column(samples.iter().map(|s| s.spectrum.clone()));
        let labels: Vec<String> = samples.iter().map(Sample::label).collect();
        let label_array = StringArray::from(labels.iter().map(String::as_str).collect::<Vec<_>>());
        let sample_array = StringArray::from(samples.iter().map(|s| s.name).collect::<Vec<_>>());
        let conc_array = Float64Array::from(samples.iter().map(|s| s.concentration).collect::<Vec<_>>());
        let id_array = Int64Array::from((0..samples.len() as i64).collect::<Vec<_>>());

        let item = Arc::new(Field::new("item", DataType::Float64, true));
        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::List(item.clone()), false),
            Field::new("y", DataType::List(item), false),
            Field::new("label", DataType::Utf8, false),
            Field::new("sample", DataType::Utf8, false),
            Field::new("concentration", DataType::Float64, false),
            Field::new("measurement_id", DataType::Int64, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(x_array),
                Arc::new(y_array),
                Arc::new(label_array),
                Arc::new(sample_array),
                Arc::new(conc_array),
                Arc::new(id_array),
            ],
        )
        .context("Failed to create RecordBatch")?;

        let output_path = "sample_data.parquet";
        let file = std::fs::File::create(output_path).context("Failed to create output file")?;
        let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
        writer.write(&batch).context("Failed to write batch")?;
        writer.close().context("Failed to close writer")?;

        println!("Wrote {} spectra to {output_path}", samples.len());
        Ok(())
    }
}
