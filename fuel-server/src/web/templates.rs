//! Askama templates for the web frontend.

use askama::Template;

use super::dto::{FuelOption, StationMarker};

/// Map page with the filter controls.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub brand: String,
    pub fuels: Vec<FuelOption>,
    pub provinces: Vec<String>,
}

/// Station list fragment (HTML responses of the station list).
#[derive(Template)]
#[template(path = "station_list.html")]
pub struct StationListTemplate {
    pub matched: usize,
    pub markers: Vec<StationMarker>,
    pub notice: Option<String>,
}
