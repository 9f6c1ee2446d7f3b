//! End-to-end transformation from two dataset CSVs to a [`Report`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::parser::{Dataset, Incident, parse_incidents};
use crate::stats::{CombinedRow, Summary, TrendPoint, aggregate, combine, national_trend};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<CombinedRow>,
    pub trend: Vec<TrendPoint>,
    pub summary: Summary,
}

impl Report {
    pub fn from_incidents(mj: &[Incident], gva: &[Incident]) -> Self {
        let rows = combine(&aggregate(mj), &aggregate(gva));
        let trend = national_trend(&rows);
        let summary = Summary::from_rows(&rows);

        Report {
            generated_at: Utc::now(),
            rows,
            trend,
            summary,
        }
    }
}

/// Parses both datasets and builds the combined report.
///
/// # Errors
///
/// Returns the first parse error from either CSV.
pub fn build_report(mj_csv: &[u8], gva_csv: &[u8]) -> Result<Report> {
    let mj = parse_incidents(mj_csv, Dataset::MotherJones)?;
    let gva = parse_incidents(gva_csv, Dataset::Gva)?;

    let report = Report::from_incidents(&mj, &gva);
    let s = &report.summary;
    info!(
        rows = report.rows.len(),
        mj_incidents = s.mj_incidents,
        gva_incidents = s.gva_incidents,
        states = s.states,
        school_rows = s.school_rows,
        "Report built"
    );

    Ok(report)
}
