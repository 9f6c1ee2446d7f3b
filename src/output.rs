//! HTML rendering and persistence for the combined report.
//!
//! Pages are rendered with Tera from templates compiled into the binary.
//! Every template name ends in `.html`, so Tera escapes interpolated values;
//! pre-rendered fragments (the table and the chart) are marked `safe`.

use anyhow::{Context as _, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::chart::Figure;
use crate::pipeline::Report;
use crate::stats::{CombinedRow, SCHOOL_MARKER};

pub const REPORT_TITLE: &str = "Hybrid Mass Shooting Report (MJ + GVA)";

/// Element id of the trend chart on every page that shows one.
const TREND_CHART_ID: &str = "national-trend";

/// Table row as displayed: the five report columns under their column names.
#[derive(Debug, Serialize)]
pub struct TableRow<'a> {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "State")]
    pub state: &'a str,
    #[serde(rename = "MJ_Count")]
    pub mj_count: u64,
    #[serde(rename = "GVA_Count")]
    pub gva_count: u64,
    #[serde(rename = "School")]
    pub school: &'static str,
}

impl<'a> From<&'a CombinedRow> for TableRow<'a> {
    fn from(row: &'a CombinedRow) -> Self {
        TableRow {
            year: row.year,
            state: &row.state,
            mj_count: row.mj_count,
            gva_count: row.gva_count,
            school: row.school_marker(),
        }
    }
}

pub struct HtmlRenderer {
    template_engine: Tera,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        let mut template_engine = Tera::default();
        template_engine.add_raw_templates(vec![
            ("table.html", TABLE_TEMPLATE),
            ("report.html", REPORT_TEMPLATE),
            ("upload.html", UPLOAD_TEMPLATE),
        ])?;

        Ok(Self { template_engine })
    }

    /// Renders the state-by-year table with columns Year, State, MJ_Count,
    /// GVA_Count and School.
    pub fn render_table(&self, rows: &[CombinedRow]) -> Result<String> {
        let rows: Vec<TableRow> = rows.iter().map(TableRow::from).collect();

        let mut context = Context::new();
        context.insert("rows", &rows);

        Ok(self.template_engine.render("table.html", &context)?)
    }

    /// Renders the standalone report document.
    pub fn render_report(&self, report: &Report) -> Result<String> {
        let context = self.report_context(report)?;
        Ok(self.template_engine.render("report.html", &context)?)
    }

    /// Renders the upload page, with the results of `report` below the form
    /// when one is given and `notice` above it.
    pub fn render_upload_page(
        &self,
        notice: Option<&str>,
        report: Option<&Report>,
    ) -> Result<String> {
        let mut context = match report {
            Some(report) => self.report_context(report)?,
            None => Context::new(),
        };
        context.insert("title", REPORT_TITLE);
        context.insert("has_report", &report.is_some());
        context.insert("notice", &notice);

        Ok(self.template_engine.render("upload.html", &context)?)
    }

    fn report_context(&self, report: &Report) -> Result<Context> {
        let mut context = Context::new();
        context.insert("title", REPORT_TITLE);
        context.insert("marker", SCHOOL_MARKER);
        context.insert(
            "generated_at",
            &report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
        context.insert("summary", &report.summary);
        context.insert("table_html", &self.render_table(&report.rows)?);
        context.insert(
            "chart_html",
            &Figure::national_trend(&report.trend).to_html(TREND_CHART_ID)?,
        );
        Ok(context)
    }
}

/// Writes the rendered report to `path`, creating parent directories.
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "Report written");
    Ok(())
}

/// Writes the combined table as CSV, replacing any existing file.
pub fn write_table_csv(path: &Path, rows: &[CombinedRow]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing table CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer.serialize(TableRow::from(row))?;
    }
    writer.flush()?;

    Ok(())
}

const TABLE_TEMPLATE: &str = r#"<table border="1" class="dataframe mass-shooting-table">
  <thead>
    <tr style="text-align: center;">
      <th>Year</th>
      <th>State</th>
      <th>MJ_Count</th>
      <th>GVA_Count</th>
      <th>School</th>
    </tr>
  </thead>
  <tbody>
{%- for row in rows %}
    <tr>
      <td>{{ row.Year }}</td>
      <td>{{ row.State }}</td>
      <td>{{ row.MJ_Count }}</td>
      <td>{{ row.GVA_Count }}</td>
      <td{% if row.School %} class="school"{% endif %}>{{ row.School }}</td>
    </tr>
{%- endfor %}
  </tbody>
</table>"#;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{{ title }}</title>
<style>
body { font-family: Arial, sans-serif; margin: 20px; }
h1 { color: #003366; }
.summary { color: #444; }
.mass-shooting-table th { background-color: #f2f2f2; padding: 5px; }
.mass-shooting-table td { padding: 5px; text-align: center; }
.school { color: red; font-weight: bold; }
</style>
</head>
<body>
<h1>U.S. Mass Shootings: Hybrid MJ + GVA</h1>
<p>School shootings are marked with <span class="school">{{ marker }}</span>.</p>
<p class="summary">
  {{ summary.mj_incidents }} MJ incidents and {{ summary.gva_incidents }} GVA incidents
  across {{ summary.states }} states
  {%- if summary.first_year %}, {{ summary.first_year }} to {{ summary.last_year }}{% endif %}.
  Generated {{ generated_at }}.
</p>

<h2>State x Year Mass Shootings Table</h2>
{{ table_html | safe }}

<h2>National Trend Chart</h2>
{{ chart_html | safe }}

<h2>U.S. Map Placeholder</h2>
<img src="https://via.placeholder.com/800x400?text=State+Mass+Shooting+Map+Placeholder" alt="State Mass Shooting Map">
<p>Replace with dynamic map once full data processed.</p>

</body>
</html>
"#;

const UPLOAD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
<style>
body { font-family: Arial, sans-serif; margin: 20px; }
h1 { color: #003366; }
form { margin-bottom: 24px; }
label { display: block; margin: 8px 0; }
.notice { background: #fff4e5; border: 1px solid #f0a020; padding: 8px 12px; margin-bottom: 16px; }
.summary { color: #444; }
.mass-shooting-table th { background-color: #f2f2f2; padding: 5px; }
.mass-shooting-table td { padding: 5px; text-align: center; }
.school { color: red; font-weight: bold; }
</style>
</head>
<body>
<h1>{{ title }}</h1>
{%- if notice %}
<div class="notice">{{ notice }}</div>
{%- endif %}
<form action="/report" method="post" enctype="multipart/form-data">
  <label>Mother Jones CSV (Date, State, School)
    <input type="file" name="mj" accept=".csv,text/csv">
  </label>
  <label>Gun Violence Archive CSV (Incident Date, State, School)
    <input type="file" name="gva" accept=".csv,text/csv">
  </label>
  <button type="submit">Build report</button>
</form>
{%- if has_report %}
<p>School shootings are marked with <span class="school">{{ marker }}</span>.</p>
<p class="summary">
  {{ summary.mj_incidents }} MJ incidents and {{ summary.gva_incidents }} GVA incidents
  across {{ summary.states }} states.
</p>
<h2>State x Year Mass Shootings Table</h2>
{{ table_html | safe }}
<h2>National Trend Chart</h2>
{{ chart_html | safe }}
{%- endif %}
</body>
</html>
"#;
