//! CSV parser for the Mother Jones (MJ) and Gun Violence Archive (GVA) datasets.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::states::normalize_state;

/// Mother Jones mass shootings CSV (GitHub gist mirror).
pub const MJ_CSV_URL: &str = "https://gist.githubusercontent.com/rlvaugh/beed70510dcff259aeb120f0abf63533/raw/mass_shootings.csv";

/// Gun Violence Archive mass shootings CSV (Data Hub mirror).
pub const GVA_CSV_URL: &str = "https://datahub.io/JohnDoe/mass-shootings/r/mass-shootings.csv";

/// Which of the two incident datasets a CSV belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dataset {
    MotherJones,
    Gva,
}

impl Dataset {
    pub fn label(self) -> &'static str {
        match self {
            Dataset::MotherJones => "MJ",
            Dataset::Gva => "GVA",
        }
    }

    pub fn date_column(self) -> &'static str {
        match self {
            Dataset::MotherJones => "Date",
            Dataset::Gva => "Incident Date",
        }
    }

    pub fn state_column(self) -> &'static str {
        "State"
    }

    pub fn school_column(self) -> &'static str {
        "School"
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Dataset::MotherJones => MJ_CSV_URL,
            Dataset::Gva => GVA_CSV_URL,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One incident row after normalization. Each row counts as one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    pub date: NaiveDate,
    pub state: String,
    pub school: bool,
}

impl Incident {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

// Two-digit year formats come before their four-digit twins: chrono's `%Y`
// happily reads "22" as year 22.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Coerces an incident date written in any of the formats the datasets use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Reads a school-shooting flag. Blank and unrecognized values are `false`.
pub fn parse_flag(raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => true,
        other => other
            .parse::<f64>()
            .is_ok_and(|n| n.is_finite() && n != 0.0),
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

/// Parses a dataset CSV into normalized incidents.
///
/// Rows with a blank date or state are skipped. A missing `School` column
/// marks every row as a non-school incident.
///
/// # Errors
///
/// Returns an error if the date or state column is missing, if a record is
/// malformed, or if a non-blank date cannot be parsed.
pub fn parse_incidents(bytes: &[u8], dataset: Dataset) -> Result<Vec<Incident>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = rdr
        .headers()
        .with_context(|| format!("{dataset} CSV has no readable header row"))?
        .clone();

    let date_idx = column_index(&headers, dataset.date_column()).ok_or_else(|| {
        anyhow!(
            "{dataset} CSV is missing the '{}' column",
            dataset.date_column()
        )
    })?;
    let state_idx = column_index(&headers, dataset.state_column()).ok_or_else(|| {
        anyhow!(
            "{dataset} CSV is missing the '{}' column",
            dataset.state_column()
        )
    })?;
    let school_idx = column_index(&headers, dataset.school_column());
    if school_idx.is_none() {
        debug!(%dataset, "No School column, treating every incident as non-school");
    }

    let today = Utc::now().date_naive();
    let mut incidents = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result.with_context(|| format!("{dataset} CSV has a malformed record"))?;
        let line = record.position().map_or(0, |p| p.line());

        let raw_date = record.get(date_idx).unwrap_or_default();
        let raw_state = record.get(state_idx).unwrap_or_default();

        let Some(state) = normalize_state(raw_state) else {
            warn!(%dataset, line, "Skipping row with blank state");
            skipped += 1;
            continue;
        };
        if raw_date.is_empty() {
            warn!(%dataset, line, "Skipping row with blank date");
            skipped += 1;
            continue;
        }

        let date = parse_date(raw_date).ok_or_else(|| {
            anyhow!("{dataset} CSV line {line}: cannot parse date '{raw_date}'")
        })?;
        // %y puts 00-68 in the 2000s, so a 1966 "8/1/66" lands in 2066
        if date > today {
            warn!(%dataset, line, %date, "Incident date is in the future, check two-digit years");
        }
        let school = school_idx
            .and_then(|idx| record.get(idx))
            .is_some_and(parse_flag);

        incidents.push(Incident {
            date,
            state,
            school,
        });
    }

    info!(%dataset, rows = incidents.len(), skipped, "Parsed incident CSV");
    Ok(incidents)
}
