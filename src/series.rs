//! Chart.js-shaped payloads for the rate-series endpoints. Labels are
//! always emitted in ascending date order regardless of storage order.

use serde::Serialize;

use crate::store::RateSample;

pub const SERIES_LABEL: &str = "USD/IRR";
const BORDER_COLOR: &str = "#4a90e2";

#[derive(Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    #[serde(rename = "borderColor")]
    pub border_color: &'static str,
    pub fill: bool,
    pub tension: f64,
}

pub fn chart_data(mut samples: Vec<RateSample>) -> ChartData {
    samples.sort_by_key(|s| s.date);
    let labels = samples.iter().map(|s| s.date.to_string()).collect();
    let data = samples.iter().map(|s| s.rate).collect();
    ChartData {
        labels,
        datasets: vec![Dataset {
            label: SERIES_LABEL,
            data,
            border_color: BORDER_COLOR,
            fill: false,
            tension: 0.1,
        }],
    }
}
