//! Line chart of the national trend, rendered as a Plotly figure.
//!
//! The figure is built from plain serializable structs and embedded as JSON
//! in an HTML fragment that pulls Plotly from its CDN.

use anyhow::Result;
use serde::Serialize;

use crate::stats::TrendPoint;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub const TREND_TITLE: &str = "National Mass Shooting Trend (MJ vs GVA)";

#[derive(Debug, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<i32>,
    pub y: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Serialize)]
pub struct Legend {
    pub title: Title,
}

impl Title {
    fn new(text: &str) -> Self {
        Title {
            text: text.to_string(),
        }
    }
}

impl Trace {
    fn line(name: &str, x: Vec<i32>, y: Vec<u64>) -> Self {
        Trace {
            kind: "scatter",
            mode: "lines",
            name: name.to_string(),
            x,
            y,
        }
    }
}

impl Figure {
    /// Two lines, `MJ_Total` and `GVA_Total`, over the trend's years.
    pub fn national_trend(points: &[TrendPoint]) -> Self {
        let years: Vec<i32> = points.iter().map(|p| p.year).collect();

        Figure {
            data: vec![
                Trace::line(
                    "MJ_Total",
                    years.clone(),
                    points.iter().map(|p| p.mj_total).collect(),
                ),
                Trace::line(
                    "GVA_Total",
                    years,
                    points.iter().map(|p| p.gva_total).collect(),
                ),
            ],
            layout: Layout {
                title: Title::new(TREND_TITLE),
                xaxis: Axis {
                    title: Title::new("Year"),
                },
                yaxis: Axis {
                    title: Title::new("Mass Shootings"),
                },
                legend: Legend {
                    title: Title::new("Dataset"),
                },
            },
        }
    }

    /// Renders a `<div>` with id `element_id` and the script that draws into it.
    pub fn to_html(&self, element_id: &str) -> Result<String> {
        // "</" inside a script block would end it early
        let json = serde_json::to_string(self)?.replace("</", "<\\/");

        Ok(format!(
            r#"<div id="{element_id}" class="plotly-graph-div" style="height:450px; width:100%;"></div>
<script src="{PLOTLY_CDN}" charset="utf-8"></script>
<script type="text/javascript">
  (function () {{
    var figure = {json};
    Plotly.newPlot("{element_id}", figure.data, figure.layout, {{"responsive": true}});
  }})();
</script>"#
        ))
    }
}
