use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Curve, IdSource, MetaValue};
use super::spc;
use crate::color;

// ---------------------------------------------------------------------------
// Decoder strategy
// ---------------------------------------------------------------------------

/// A file format that produces canonical [`Curve`] values.
pub trait CurveDecoder {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Lower-case file extensions this decoder handles.
    fn extensions(&self) -> &'static [&'static str];

    fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>>;
}

/// Which implementation handles delimited text tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoding {
    /// Multi-column tables through the `csv` crate.
    #[default]
    Full,
    /// Two-column line splitting only.
    Minimal,
}

/// The set of decoders available to a session, chosen once at startup.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn CurveDecoder>>,
}

impl DecoderRegistry {
    pub fn new(text: TextDecoding) -> Self {
        let mut decoders: Vec<Box<dyn CurveDecoder>> = Vec::new();
        decoders.push(Box::new(SpcDecoder));
        decoders.push(Box::new(JsonDecoder));
        match text {
            TextDecoding::Full => {
                decoders.push(Box::new(CsvDecoder));
                decoders.push(Box::new(PlainXyDecoder::default()));
            }
            TextDecoding::Minimal => {
                decoders.push(Box::new(PlainXyDecoder {
                    extensions: &["csv", "tsv", "txt", "xy", "dpt"],
                }));
            }
        }
        #[cfg(feature = "parquet")]
        decoders.push(Box::new(parquet_decoder::ParquetDecoder));
        DecoderRegistry { decoders }
    }

    pub fn with_defaults() -> Self {
        Self::new(TextDecoding::default())
    }

    pub fn for_extension(&self, ext: &str) -> Option<&dyn CurveDecoder> {
        let ext = ext.to_ascii_lowercase();
        self.decoders
            .iter()
            .find(|d| d.extensions().contains(&ext.as_str()))
            .map(|d| d.as_ref())
    }

    /// Every extension some decoder accepts, for file dialogs.
    pub fn extensions(&self) -> Vec<&'static str> {
        self.decoders
            .iter()
            .flat_map(|d| d.extensions().iter().copied())
            .collect()
    }

    /// Load every curve from a file, dispatching by extension.
    ///
    /// Curves without a label are named after the file; every curve gets a
    /// distinct palette colour.
    pub fn load_file(&self, path: &Path, ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let Some(decoder) = self.for_extension(&ext) else {
            bail!("Unsupported file extension: .{ext}");
        };

        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        debug!("decoding {} ({} bytes) as {}", path.display(), bytes.len(), decoder.name());
        let mut curves = decoder
            .decode(&bytes, ids)
            .with_context(|| format!("decoding {} as {}", path.display(), decoder.name()))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("spectrum")
            .to_string();
        for curve in &mut curves {
            if curve.label.is_empty() {
                curve.label = stem.clone();
            }
            curve
                .meta
                .entry("file".to_string())
                .or_insert_with(|| MetaValue::Text(path.display().to_string()));
        }
        color::assign_colors(&mut curves);

        info!("Loaded {} curve(s) from {}", curves.len(), path.display());
        Ok(curves)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---------------------------------------------------------------------------
// SPC
// ---------------------------------------------------------------------------

pub struct SpcDecoder;

impl CurveDecoder for SpcDecoder {
    fn name(&self) -> &'static str {
        "SPC"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["spc"]
    }

    fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
        Ok(spc::decode(bytes, ids)?)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted layouts: a single curve object or an array of them.
///
/// ```json
/// [
///   {
///     "x": [4000.0, 3999.0, ...],
///     "y": [0.12,   0.14,  ...],
///     "label": "Sample A",
///     "xUnit": "cm-1",
///     "concentration": 1.5
///   },
///   ...
/// ]
/// ```
pub struct JsonDecoder;

impl CurveDecoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
        let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
        let records: Vec<&JsonValue> = match &root {
            JsonValue::Array(items) => items.iter().collect(),
            JsonValue::Object(_) => vec![&root],
            _ => bail!("Expected a JSON object or array of objects"),
        };

        let mut curves = Vec::with_capacity(records.len());
        for (i, rec) in records.into_iter().enumerate() {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;

            let x = json_array_to_f64(obj.get("x"), i, "x")?;
            let y = json_array_to_f64(obj.get("y"), i, "y")?;

            let mut curve = Curve::new(ids.next_id(), String::new(), x, y);
            for (key, val) in obj {
                match key.as_str() {
                    "x" | "y" => {}
                    "label" | "name" => curve.label = json_text(val),
                    "xUnit" | "x_unit" => curve.x_unit = Some(json_text(val)),
                    "yUnit" | "y_unit" => curve.y_unit = Some(json_text(val)),
                    _ => {
                        curve.meta.insert(key.clone(), json_to_meta(val));
                    }
                }
            }
            curves.push(curve.with_meta("format", "JSON"));
        }
        if curves.is_empty() {
            bail!("JSON file contains no curves");
        }
        Ok(curves)
    }
}

fn json_array_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("Row {row}: missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("Row {row}, {col}[{j}]: not a number"))
        })
        .collect()
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_to_meta(val: &JsonValue) -> MetaValue {
    match val {
        JsonValue::String(s) => MetaValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetaValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetaValue::Float(f)
            } else {
                MetaValue::Text(n.to_string())
            }
        }
        other => MetaValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column table: the first column is x, every further column is one curve.
///
/// The delimiter (`,`, `;` or tab) is sniffed from the first line and a
/// header row is recognised by a non-numeric cell. All curves of one file
/// share the same x allocation; missing cells read as NaN.
pub struct CsvDecoder;

impl CurveDecoder for CsvDecoder {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv", "tsv"]
    }

    fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(bytes))
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let mut headers: Option<Vec<String>> = None;
        let mut x = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (row_no, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("CSV row {row_no}"))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let Some(xi) = record.get(0).and_then(|c| c.parse::<f64>().ok()) else {
                if x.is_empty() && headers.is_none() {
                    headers = Some(record.iter().map(str::to_string).collect());
                }
                continue;
            };

            let width = record.len().saturating_sub(1);
            while columns.len() < width {
                columns.push(vec![f64::NAN; x.len()]);
            }
            for (col, values) in columns.iter_mut().enumerate() {
                let value = record
                    .get(col + 1)
                    .and_then(|c| c.parse::<f64>().ok())
                    .unwrap_or(f64::NAN);
                values.push(value);
            }
            x.push(xi);
        }

        if columns.is_empty() {
            bail!("CSV has no numeric data columns");
        }

        let x: Arc<[f64]> = x.into();
        let curves = columns
            .into_iter()
            .enumerate()
            .map(|(col, y)| {
                let label = headers
                    .as_ref()
                    .and_then(|h| h.get(col + 1))
                    .cloned()
                    .unwrap_or_default();
                let x_unit = headers.as_ref().and_then(|h| h.first()).cloned();
                Curve::new(ids.next_id(), label, Arc::clone(&x), y)
                    .with_units(x_unit, None)
                    .with_meta("format", "CSV")
                    .with_meta("column", (col + 1) as i64)
            })
            .collect();
        Ok(curves)
    }
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or(&[]);
    [b'\t', b';', b',']
        .into_iter()
        .max_by_key(|d| first_line.iter().filter(|&&b| b == *d).count())
        .filter(|d| first_line.contains(d))
        .unwrap_or(b',')
}

// ---------------------------------------------------------------------------
// Minimal two-column text loader
// ---------------------------------------------------------------------------

/// Line-splitting fallback: the first two numbers on each line are one
/// (x, y) sample; everything else is ignored.
pub struct PlainXyDecoder {
    extensions: &'static [&'static str],
}

impl Default for PlainXyDecoder {
    fn default() -> Self {
        PlainXyDecoder {
            extensions: &["txt", "xy", "dpt"],
        }
    }
}

impl CurveDecoder for PlainXyDecoder {
    fn name(&self) -> &'static str {
        "plain XY"
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
        let text = String::from_utf8_lossy(bytes);
        let mut x = Vec::new();
        let mut y = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut numbers = line
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|tok| !tok.is_empty())
                .map(|tok| tok.parse::<f64>());
            if let (Some(Ok(xi)), Some(Ok(yi))) = (numbers.next(), numbers.next()) {
                x.push(xi);
                y.push(yi);
            }
        }
        if x.is_empty() {
            bail!("no numeric x/y pairs found");
        }
        Ok(vec![Curve::new(ids.next_id(), String::new(), x, y).with_meta("format", "XY")])
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

#[cfg(feature = "parquet")]
mod parquet_decoder {
    use std::sync::Arc;

    use anyhow::{bail, Context, Result};
    use arrow::array::{
        Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
        LargeListArray, ListArray,
    };
    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::CurveDecoder;
    use crate::data::model::{Curve, IdSource, MetaValue};

    /// Parquet file with one curve per row.
    ///
    /// Expected schema:
    /// - `x`: List<Float64|Float32> or LargeList – wavenumber arrays
    /// - `y`: List<Float64|Float32> or LargeList – intensity arrays
    /// - `label` (optional string) – curve label
    /// - Any other scalar columns become metadata
    ///
    /// Works with files written by both **Pandas** (`df.to_parquet()`) and
    /// **Polars** (`df.write_parquet()`).
    pub struct ParquetDecoder;

    impl CurveDecoder for ParquetDecoder {
        fn name(&self) -> &'static str {
            "Parquet"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["parquet", "pq"]
        }

        fn decode(&self, bytes: &[u8], ids: &mut dyn IdSource) -> Result<Vec<Curve>> {
            let data = bytes::Bytes::copy_from_slice(bytes);
            let reader = ParquetRecordBatchReaderBuilder::try_new(data)
                .context("reading parquet metadata")?
                .build()
                .context("building parquet reader")?;

            let mut curves = Vec::new();
            for batch_result in reader {
                let batch = batch_result.context("reading parquet record batch")?;
                let schema = batch.schema();

                let x_idx = schema
                    .index_of("x")
                    .map_err(|_| anyhow::anyhow!("Parquet file missing 'x' column"))?;
                let y_idx = schema
                    .index_of("y")
                    .map_err(|_| anyhow::anyhow!("Parquet file missing 'y' column"))?;
                let x_col = batch.column(x_idx);
                let y_col = batch.column(y_idx);

                let meta_cols: Vec<(usize, String)> = schema
                    .fields()
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != x_idx && *i != y_idx)
                    .map(|(i, f)| (i, f.name().clone()))
                    .collect();

                for row in 0..batch.num_rows() {
                    let x = extract_f64_list(x_col, row)
                        .with_context(|| format!("Row {row}: failed to read 'x'"))?;
                    let y = extract_f64_list(y_col, row)
                        .with_context(|| format!("Row {row}: failed to read 'y'"))?;

                    let mut curve = Curve::new(ids.next_id(), String::new(), x, y);
                    for (col_idx, col_name) in &meta_cols {
                        let Some(value) = extract_meta_value(batch.column(*col_idx), row) else {
                            continue;
                        };
                        if col_name == "label" {
                            curve.label = value.to_string();
                        } else {
                            curve.meta.insert(col_name.clone(), value);
                        }
                    }
                    curves.push(curve.with_meta("format", "Parquet"));
                }
            }
            Ok(curves)
        }
    }

    /// Extract a `Vec<f64>` from a List or LargeList column at the given row.
    fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
        if col.is_null(row) {
            bail!("null value in list column");
        }

        let values_array = match col.data_type() {
            DataType::List(_) => {
                let list_arr = col
                    .as_any()
                    .downcast_ref::<ListArray>()
                    .context("expected ListArray")?;
                list_arr.value(row)
            }
            DataType::LargeList(_) => {
                let list_arr = col
                    .as_any()
                    .downcast_ref::<LargeListArray>()
                    .context("expected LargeListArray")?;
                list_arr.value(row)
            }
            other => bail!("Expected List or LargeList column, got {other:?}"),
        };

        if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
            Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
            Ok(f32_arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
        } else {
            bail!(
                "List inner type is {:?}, expected Float64 or Float32",
                values_array.data_type()
            )
        }
    }

    /// A scalar cell as metadata; nulls and nested types are skipped.
    fn extract_meta_value(col: &Arc<dyn Array>, row: usize) -> Option<MetaValue> {
        if col.is_null(row) {
            return None;
        }
        let value = match col.data_type() {
            DataType::Utf8 => MetaValue::Text(col.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => MetaValue::Text(col.as_string::<i64>().value(row).to_string()),
            DataType::Int32 => {
                MetaValue::Integer(i64::from(col.as_any().downcast_ref::<Int32Array>()?.value(row)))
            }
            DataType::Int64 => MetaValue::Integer(col.as_any().downcast_ref::<Int64Array>()?.value(row)),
            DataType::Float32 => {
                MetaValue::Float(f64::from(col.as_any().downcast_ref::<Float32Array>()?.value(row)))
            }
            DataType::Float64 => MetaValue::Float(col.as_any().downcast_ref::<Float64Array>()?.value(row)),
            DataType::Boolean => {
                MetaValue::Text(col.as_any().downcast_ref::<BooleanArray>()?.value(row).to_string())
            }
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SequentialIds;

    #[test]
    fn csv_columns_share_x() {
        let text = b"wavenumber,sample A,sample B\n400,1.0,2.0\n500,1.5,2.5\n600,1.2,\n";
        let curves = CsvDecoder.decode(text, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label, "sample A");
        assert_eq!(curves[1].label, "sample B");
        assert_eq!(curves[0].x_unit.as_deref(), Some("wavenumber"));
        assert_eq!(&*curves[0].x, &[400.0, 500.0, 600.0]);
        assert!(Arc::ptr_eq(&curves[0].x, &curves[1].x));
        assert!(curves[1].y[2].is_nan());
    }

    #[test]
    fn csv_sniffs_semicolons() {
        let text = b"1;10\n2;20\n";
        let curves = CsvDecoder.decode(text, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(&*curves[0].y, &[10.0, 20.0]);
        assert_eq!(curves[0].label, "");
    }

    #[test]
    fn plain_xy_skips_noise() {
        let text = b"# exported\nTitle line\n1.0 2.0\n2.0\t3.0 extra\n3.0,4.0\n";
        let curves = PlainXyDecoder::default()
            .decode(text, &mut SequentialIds::new())
            .unwrap();
        assert_eq!(&*curves[0].x, &[1.0, 2.0, 3.0]);
        assert_eq!(&*curves[0].y, &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn json_reads_label_units_and_meta() {
        let text = br#"[{"x": [1, 2], "y": [3, 4], "label": "A", "xUnit": "nm", "conc": 1.5, "batch": 7}]"#;
        let curves = JsonDecoder.decode(text, &mut SequentialIds::new()).unwrap();
        let c = &curves[0];
        assert_eq!(c.label, "A");
        assert_eq!(c.x_unit.as_deref(), Some("nm"));
        assert_eq!(c.meta["conc"], MetaValue::Float(1.5));
        assert_eq!(c.meta["batch"], MetaValue::Integer(7));
    }

    #[test]
    fn json_rejects_non_numeric_samples() {
        let text = br#"{"x": [1, "two"], "y": [3, 4]}"#;
        assert!(JsonDecoder.decode(text, &mut SequentialIds::new()).is_err());
    }

    #[test]
    fn registry_selects_text_strategy() {
        let full = DecoderRegistry::new(TextDecoding::Full);
        let minimal = DecoderRegistry::new(TextDecoding::Minimal);
        assert_eq!(full.for_extension("CSV").map(|d| d.name()), Some("CSV"));
        assert_eq!(minimal.for_extension("csv").map(|d| d.name()), Some("plain XY"));
        assert_eq!(full.for_extension("spc").map(|d| d.name()), Some("SPC"));
        assert!(full.for_extension("xlsx").is_none());
    }

    #[test]
    fn load_file_names_and_colours_curves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("film.spc");
        let buf = spc::SpcBuilder::new(400.0, 4000.0)
            .curve(vec![1.0, 2.0, 3.0])
            .curve(vec![4.0, 5.0, 6.0])
            .build();
        std::fs::write(&path, buf).unwrap();

        let registry = DecoderRegistry::with_defaults();
        let curves = registry.load_file(&path, &mut SequentialIds::new()).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label, "SPC spectrum #1");
        assert!(curves.iter().all(|c| c.style.color.is_some()));
        assert_ne!(curves[0].style.color, curves[1].style.color);
    }

    #[test]
    fn load_file_surfaces_format_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.spc");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let err = DecoderRegistry::with_defaults()
            .load_file(&path, &mut SequentialIds::new())
            .unwrap_err();
        let format = err.downcast_ref::<crate::error::FormatError>();
        assert!(matches!(format, Some(crate::error::FormatError::TooSmall { .. })));
    }
}
