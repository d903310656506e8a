//! CSV loaders for the command-line front end.
//!
//! Three inputs, each with a header row (column names are case-insensitive and
//! accept a few common aliases):
//!
//! - wells: `well_id, api, county, state, latitude, longitude, name, operator`
//! - production: `well_id, report_date, gas, gas_total, oil, oil_total, water, days`
//! - signals: `well_id, access_score, precise_location, has_completion_doc, has_permit_doc`
//!
//! Empty cells, `nan`, `null` and `-` read as missing. A non-numeric value is
//! reported as [`DataError::InvalidField`]; for a production volume column the
//! pipeline then excludes the whole well, elsewhere the cell is left empty.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::features::DataError;
use crate::types::{AccessSignals, RawProductionRow, WellIdentity};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("{0} is empty (no header row)")]
    EmptyFile(String),

    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn { source_name: String, column: &'static str },
}

/// Parsed items plus the cells that could not be read.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub rejected: Vec<DataError>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self { items: Vec::new(), rejected: Vec::new() }
    }
}

// ============================================================================
// CSV Helpers
// ============================================================================

/// Split a CSV line respecting quoted fields (commas inside quotes, `""` escapes).
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("null") || cell == "-"
}

/// Header name -> column index, with aliases.
struct ColumnMap {
    source_name: String,
    index: BTreeMap<String, usize>,
}

impl ColumnMap {
    fn from_header(header: &str, source_name: &str) -> Self {
        let index = csv_split(header)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();
        Self {
            source_name: source_name.to_string(),
            index,
        }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.index.get(*a).copied())
    }

    fn require(&self, column: &'static str, aliases: &[&str]) -> Result<usize, IngestError> {
        self.find(aliases).ok_or_else(|| IngestError::MissingColumn {
            source_name: self.source_name.clone(),
            column,
        })
    }
}

/// One data row with access helpers that report bad cells.
struct Row<'a> {
    fields: Vec<String>,
    well_id: String,
    rejected: &'a mut Vec<DataError>,
}

impl Row<'_> {
    fn text(&self, idx: Option<usize>) -> Option<String> {
        idx.and_then(|i| self.fields.get(i))
            .filter(|s| !is_missing(s))
            .cloned()
    }

    fn number(&mut self, idx: Option<usize>, field: &str) -> Option<f64> {
        let raw = self.text(idx)?;
        match raw.replace(',', "").parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                self.rejected.push(DataError::InvalidField {
                    well_id: self.well_id.clone(),
                    field: field.to_string(),
                    value: raw,
                });
                None
            }
        }
    }

    fn flag(&mut self, idx: Option<usize>, field: &str) -> Option<bool> {
        let raw = self.text(idx)?;
        match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "t" => Some(true),
            "0" | "false" | "no" | "n" | "f" => Some(false),
            _ => {
                self.rejected.push(DataError::InvalidField {
                    well_id: self.well_id.clone(),
                    field: field.to_string(),
                    value: raw,
                });
                None
            }
        }
    }
}

/// Header, then every non-blank data line. Unreadable lines are skipped with a warning.
fn read_lines<R: BufRead>(reader: R, source_name: &str) -> Result<(ColumnMap, Vec<Vec<String>>), IngestError> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .and_then(Result::ok)
        .ok_or_else(|| IngestError::EmptyFile(source_name.to_string()))?;
    let columns = ColumnMap::from_header(&header, source_name);

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        match line {
            Ok(l) if l.trim().is_empty() => {}
            Ok(l) => rows.push(csv_split(&l)),
            Err(e) => warn!(source = source_name, line = i + 2, error = %e, "Error reading line"),
        }
    }
    Ok((columns, rows))
}

fn open(path: &Path) -> Result<BufReader<File>, IngestError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| IngestError::Io(path.to_path_buf(), e))
}

// ============================================================================
// Loaders
// ============================================================================

pub fn parse_wells<R: BufRead>(reader: R, source_name: &str) -> Result<Loaded<WellIdentity>, IngestError> {
    let (cols, lines) = read_lines(reader, source_name)?;
    let well_idx = cols.require("well_id", &["well_id", "wellid", "id"])?;
    let county_idx = cols.require("county", &["county", "county_name"])?;
    let api_idx = cols.find(&["api", "api_number", "api14", "api10"]);
    let state_idx = cols.find(&["state", "state_code"]);
    let lat_idx = cols.find(&["latitude", "lat", "surface_latitude"]);
    let lon_idx = cols.find(&["longitude", "lon", "lng", "surface_longitude"]);
    let name_idx = cols.find(&["name", "well_name", "lease_name"]);
    let operator_idx = cols.find(&["operator", "operator_name"]);

    let mut loaded = Loaded::default();
    for fields in lines {
        let Some(well_id) = fields.get(well_idx).filter(|s| !is_missing(s)).cloned() else {
            continue;
        };
        let mut row = Row {
            fields,
            well_id: well_id.clone(),
            rejected: &mut loaded.rejected,
        };
        let api = row.text(api_idx).unwrap_or_default();
        let county = row.text(Some(county_idx)).unwrap_or_default();
        let state = row.text(state_idx).unwrap_or_default();
        let mut well = WellIdentity::from_raw_api(well_id, &api, county, state);
        well.latitude = row.number(lat_idx, "latitude");
        well.longitude = row.number(lon_idx, "longitude");
        well.name = row.text(name_idx);
        well.operator = row.text(operator_idx);
        loaded.items.push(well);
    }
    Ok(loaded)
}

pub fn parse_production<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Loaded<RawProductionRow>, IngestError> {
    let (cols, lines) = read_lines(reader, source_name)?;
    let well_idx = cols.require("well_id", &["well_id", "wellid", "id"])?;
    let date_idx = cols.require("report_date", &["report_date", "date", "month", "production_date"])?;
    let gas_idx = cols.find(&["gas", "gas_mcf", "gas_volume"]);
    let gas_total_idx = cols.find(&["gas_total", "total_gas", "gas_reported_total"]);
    let oil_idx = cols.find(&["oil", "oil_bbl", "oil_volume"]);
    let oil_total_idx = cols.find(&["oil_total", "total_oil", "oil_reported_total"]);
    let water_idx = cols.find(&["water", "water_bbl", "water_volume"]);
    let days_idx = cols.find(&["days", "days_produced", "producing_days"]);

    let mut loaded = Loaded::default();
    for fields in lines {
        let Some(well_id) = fields.get(well_idx).filter(|s| !is_missing(s)).cloned() else {
            continue;
        };
        let mut row = Row {
            fields,
            well_id: well_id.clone(),
            rejected: &mut loaded.rejected,
        };
        let parsed = RawProductionRow {
            report_date: row.text(Some(date_idx)).unwrap_or_default(),
            gas: row.number(gas_idx, "gas"),
            gas_total: row.number(gas_total_idx, "gas_total"),
            oil: row.number(oil_idx, "oil"),
            oil_total: row.number(oil_total_idx, "oil_total"),
            water: row.number(water_idx, "water"),
            days: row.number(days_idx, "days"),
            well_id,
        };
        loaded.items.push(parsed);
    }
    Ok(loaded)
}

pub fn parse_signals<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Loaded<(String, AccessSignals)>, IngestError> {
    let (cols, lines) = read_lines(reader, source_name)?;
    let well_idx = cols.require("well_id", &["well_id", "wellid", "id"])?;
    let access_idx = cols.find(&["access_score", "access"]);
    let precise_idx = cols.find(&["precise_location", "dq_loc"]);
    let completion_idx = cols.find(&["has_completion_doc", "completion_doc"]);
    let permit_idx = cols.find(&["has_permit_doc", "permit_doc"]);

    let mut loaded = Loaded::default();
    for fields in lines {
        let Some(well_id) = fields.get(well_idx).filter(|s| !is_missing(s)).cloned() else {
            continue;
        };
        let mut row = Row {
            fields,
            well_id: well_id.clone(),
            rejected: &mut loaded.rejected,
        };
        let signals = AccessSignals {
            access_score: row.number(access_idx, "access_score"),
            precise_location: row.flag(precise_idx, "precise_location"),
            has_completion_doc: row.flag(completion_idx, "has_completion_doc").unwrap_or(false),
            has_permit_doc: row.flag(permit_idx, "has_permit_doc").unwrap_or(false),
        };
        loaded.items.push((well_id, signals));
    }
    Ok(loaded)
}

pub fn load_wells(path: &Path) -> Result<Loaded<WellIdentity>, IngestError> {
    let loaded = parse_wells(open(path)?, &path.display().to_string())?;
    info!(file = %path.display(), wells = loaded.items.len(), rejected = loaded.rejected.len(), "Well universe loaded");
    Ok(loaded)
}

pub fn load_production(path: &Path) -> Result<Loaded<RawProductionRow>, IngestError> {
    let loaded = parse_production(open(path)?, &path.display().to_string())?;
    info!(file = %path.display(), rows = loaded.items.len(), rejected = loaded.rejected.len(), "Production rows loaded");
    Ok(loaded)
}

/// Signals keyed by well id; a later row for the same well replaces an earlier one.
pub fn load_signals(path: &Path) -> Result<(BTreeMap<String, AccessSignals>, Vec<DataError>), IngestError> {
    let loaded = parse_signals(open(path)?, &path.display().to_string())?;
    info!(file = %path.display(), wells = loaded.items.len(), "Access signals loaded");
    Ok((loaded.items.into_iter().collect(), loaded.rejected))
}
