//! CSV ingest and normalization.
//!
//! This module turns a photometry CSV into a clean `LightCurve` that is safe
//! to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden reordering or imputation)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::LightCurve;
use crate::error::AppError;

/// Optional-column aliases, checked in order.
const XC_ALIASES: [&str; 3] = ["xc", "centroid_x", "x"];
const YC_ALIASES: [&str; 3] = ["yc", "centroid_y", "y"];
const BG_ALIASES: [&str; 3] = ["bg", "background", "sky"];

/// Summary stats about the cadences actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub time_min: f64,
    pub time_max: f64,
    pub flux_min: f64,
    pub flux_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: light curve + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub lc: LightCurve,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate a photometry CSV.
///
/// Required columns: `time` (days), `flux`, `flux_err` (> 0). Optional:
/// centroid x/y and a background proxy (see the alias lists above).
pub fn load_light_curve(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    load_from_reader(file)
}

/// Reader-based entry point so ingest is testable without touching disk.
pub fn load_from_reader<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["time", "flux", "flux_err"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(
                2,
                format!("Missing required column: `{required}`"),
            ));
        }
    }

    let xc_idx = resolve_alias(&header_map, &XC_ALIASES);
    let yc_idx = resolve_alias(&header_map, &YC_ALIASES);
    let bg_idx = resolve_alias(&header_map, &BG_ALIASES);

    let mut time = Vec::new();
    let mut flux = Vec::new();
    let mut flux_err = Vec::new();
    let mut xc = xc_idx.map(|_| Vec::new());
    let mut yc = yc_idx.map(|_| Vec::new());
    let mut bg = bg_idx.map(|_| Vec::new());

    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, xc_idx, yc_idx, bg_idx) {
            Ok(row) => {
                // All-or-nothing per row keeps every column aligned.
                time.push(row.time);
                flux.push(row.flux);
                flux_err.push(row.flux_err);
                if let (Some(col), Some(v)) = (xc.as_mut(), row.xc) {
                    col.push(v);
                }
                if let (Some(col), Some(v)) = (yc.as_mut(), row.yc) {
                    col.push(v);
                }
                if let (Some(col), Some(v)) = (bg.as_mut(), row.bg) {
                    col.push(v);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = time.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    let stats = compute_stats(&time, &flux);
    let lc = LightCurve {
        time,
        flux,
        flux_err,
        centroid_x: xc,
        centroid_y: yc,
        background: bg,
    };

    Ok(IngestedData {
        lc,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

struct ParsedRow {
    time: f64,
    flux: f64,
    flux_err: f64,
    xc: Option<f64>,
    yc: Option<f64>,
    bg: Option<f64>,
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    xc_idx: Option<usize>,
    yc_idx: Option<usize>,
    bg_idx: Option<usize>,
) -> Result<ParsedRow, String> {
    let time = parse_required_f64(record, header_map, "time")?;
    let flux = parse_required_f64(record, header_map, "flux")?;
    let flux_err = parse_required_f64(record, header_map, "flux_err")?;

    if flux_err <= 0.0 {
        return Err(format!("Invalid `flux_err` {flux_err} (must be > 0)."));
    }

    // When an optional column exists in the header, every row must provide it;
    // a hole would silently misalign that column against the time axis.
    let xc = xc_idx.map(|i| parse_cell(record, i, "centroid x")).transpose()?;
    let yc = yc_idx.map(|i| parse_cell(record, i, "centroid y")).transpose()?;
    let bg = bg_idx.map(|i| parse_cell(record, i, "background")).transpose()?;

    Ok(ParsedRow {
        time,
        flux,
        flux_err,
        xc,
        yc,
        bg,
    })
}

fn parse_required_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    parse_cell(record, *idx, name)
}

fn parse_cell(record: &StringRecord, idx: usize, what: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{what}` value."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{what}` value '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{what}` value."))
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Some tools emit UTF-8 CSVs with a BOM prefix on the first header; strip
    // it so schema validation doesn't report a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_alias(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a)).copied()
}

fn compute_stats(time: &[f64], flux: &[f64]) -> DatasetStats {
    let mut time_min = f64::INFINITY;
    let mut time_max = f64::NEG_INFINITY;
    let mut flux_min = f64::INFINITY;
    let mut flux_max = f64::NEG_INFINITY;

    for (&t, &f) in time.iter().zip(flux) {
        time_min = time_min.min(t);
        time_max = time_max.max(t);
        flux_min = flux_min.min(f);
        flux_max = flux_max.max(f);
    }

    DatasetStats {
        n_points: time.len(),
        time_min,
        time_max,
        flux_min,
        flux_max,
    }
}
