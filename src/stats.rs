use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::parser::Incident;

/// Marker shown for a (year, state) pair with at least one school incident.
pub const SCHOOL_MARKER: &str = "★";

pub type GroupKey = (i32, String);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub incidents: u64,
    pub school_incidents: u64,
}

/// Groups incidents by (year, state), counting rows and school rows.
pub fn aggregate(incidents: &[Incident]) -> BTreeMap<GroupKey, GroupCounts> {
    let mut groups: BTreeMap<GroupKey, GroupCounts> = BTreeMap::new();

    for incident in incidents {
        let counts = groups
            .entry((incident.year(), incident.state.clone()))
            .or_default();

        counts.incidents += 1;
        if incident.school {
            counts.school_incidents += 1;
        }
    }

    groups
}

/// One line of the state-by-year table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedRow {
    pub year: i32,
    pub state: String,
    pub mj_count: u64,
    pub gva_count: u64,
    pub school_incidents_mj: u64,
    pub school_incidents_gva: u64,
}

impl CombinedRow {
    fn empty(year: i32, state: &str) -> Self {
        CombinedRow {
            year,
            state: state.to_string(),
            mj_count: 0,
            gva_count: 0,
            school_incidents_mj: 0,
            school_incidents_gva: 0,
        }
    }

    pub fn has_school_incident(&self) -> bool {
        self.school_incidents_mj > 0 || self.school_incidents_gva > 0
    }

    pub fn school_marker(&self) -> &'static str {
        if self.has_school_incident() {
            SCHOOL_MARKER
        } else {
            ""
        }
    }
}

/// Outer-joins the MJ and GVA groups on (year, state).
///
/// A key present on one side only gets zero counts for the other side.
/// Rows come back sorted by year, then state.
pub fn combine(
    mj: &BTreeMap<GroupKey, GroupCounts>,
    gva: &BTreeMap<GroupKey, GroupCounts>,
) -> Vec<CombinedRow> {
    let mut rows: BTreeMap<GroupKey, CombinedRow> = BTreeMap::new();

    for ((year, state), counts) in mj {
        let row = rows
            .entry((*year, state.clone()))
            .or_insert_with(|| CombinedRow::empty(*year, state));
        row.mj_count = counts.incidents;
        row.school_incidents_mj = counts.school_incidents;
    }

    for ((year, state), counts) in gva {
        let row = rows
            .entry((*year, state.clone()))
            .or_insert_with(|| CombinedRow::empty(*year, state));
        row.gva_count = counts.incidents;
        row.school_incidents_gva = counts.school_incidents;
    }

    rows.into_values().collect()
}

/// National incident totals for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub mj_total: u64,
    pub gva_total: u64,
}

/// Sums the combined table per year, sorted by year.
pub fn national_trend(rows: &[CombinedRow]) -> Vec<TrendPoint> {
    let mut years: BTreeMap<i32, TrendPoint> = BTreeMap::new();

    for row in rows {
        let point = years.entry(row.year).or_insert(TrendPoint {
            year: row.year,
            mj_total: 0,
            gva_total: 0,
        });
        point.mj_total += row.mj_count;
        point.gva_total += row.gva_count;
    }

    years.into_values().collect()
}

/// Headline numbers for a combined table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub mj_incidents: u64,
    pub gva_incidents: u64,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub states: usize,
    pub school_rows: usize,
}

impl Summary {
    pub fn from_rows(rows: &[CombinedRow]) -> Self {
        let states: BTreeSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();

        Summary {
            mj_incidents: rows.iter().map(|r| r.mj_count).sum(),
            gva_incidents: rows.iter().map(|r| r.gva_count).sum(),
            first_year: rows.iter().map(|r| r.year).min(),
            last_year: rows.iter().map(|r| r.year).max(),
            states: states.len(),
            school_rows: rows.iter().filter(|r| r.has_school_incident()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn incident(year: i32, state: &str, school: bool) -> Incident {
        Incident {
            date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            state: state.to_string(),
            school,
        }
    }

    fn counts(incidents: u64, school_incidents: u64) -> GroupCounts {
        GroupCounts {
            incidents,
            school_incidents,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_sums_per_year_and_state() {
        let groups = aggregate(&[
            incident(2019, "Texas", false),
            incident(2019, "Texas", true),
            incident(2019, "Texas", false),
            incident(2019, "Ohio", false),
            incident(2020, "Texas", true),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&(2019, "Texas".to_string())], counts(3, 1));
        assert_eq!(groups[&(2019, "Ohio".to_string())], counts(1, 0));
        assert_eq!(groups[&(2020, "Texas".to_string())], counts(1, 1));
    }

    #[test]
    fn test_combine_outer_join_fills_zero() {
        let mj = BTreeMap::from([
            ((2018, "Florida".to_string()), counts(1, 1)),
            ((2018, "Texas".to_string()), counts(2, 0)),
        ]);
        let gva = BTreeMap::from([
            ((2018, "Texas".to_string()), counts(3, 0)),
            ((2017, "Nevada".to_string()), counts(1, 0)),
        ]);

        let rows = combine(&mj, &gva);

        let keys: Vec<_> = rows.iter().map(|r| (r.year, r.state.as_str())).collect();
        assert_eq!(keys, vec![(2017, "Nevada"), (2018, "Florida"), (2018, "Texas")]);

        assert_eq!((rows[0].mj_count, rows[0].gva_count), (0, 1));
        assert_eq!((rows[1].mj_count, rows[1].gva_count), (1, 0));
        assert_eq!((rows[2].mj_count, rows[2].gva_count), (2, 3));
    }

    #[test]
    fn test_school_marker_requires_positive_sum_on_either_side() {
        let mut row = CombinedRow::empty(2020, "Ohio");
        row.mj_count = 4;
        row.gva_count = 4;
        assert_eq!(row.school_marker(), "");

        row.school_incidents_gva = 1;
        assert_eq!(row.school_marker(), SCHOOL_MARKER);

        row.school_incidents_gva = 0;
        row.school_incidents_mj = 2;
        assert_eq!(row.school_marker(), SCHOOL_MARKER);
    }

    #[test]
    fn test_national_trend_sums_columns_per_year() {
        let mj = aggregate(&[
            incident(2018, "Texas", false),
            incident(2018, "Ohio", false),
            incident(2019, "Ohio", false),
        ]);
        let gva = aggregate(&[
            incident(2018, "Texas", false),
            incident(2020, "Maine", false),
        ]);

        let trend = national_trend(&combine(&mj, &gva));

        assert_eq!(
            trend,
            vec![
                TrendPoint { year: 2018, mj_total: 2, gva_total: 1 },
                TrendPoint { year: 2019, mj_total: 1, gva_total: 0 },
                TrendPoint { year: 2020, mj_total: 0, gva_total: 1 },
            ]
        );
    }

    #[test]
    fn test_summary() {
        let mj = aggregate(&[incident(2018, "Texas", true), incident(2019, "Ohio", false)]);
        let gva = aggregate(&[incident(2019, "Texas", false), incident(2021, "Ohio", false)]);

        let summary = Summary::from_rows(&combine(&mj, &gva));

        assert_eq!(summary.mj_incidents, 2);
        assert_eq!(summary.gva_incidents, 2);
        assert_eq!(summary.first_year, Some(2018));
        assert_eq!(summary.last_year, Some(2021));
        assert_eq!(summary.states, 2);
        assert_eq!(summary.school_rows, 1);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(Summary::from_rows(&[]), Summary::default());
    }
}
