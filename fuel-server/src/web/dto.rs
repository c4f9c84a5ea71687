//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FuelKind, StationRecord, UnknownFuel};
use crate::filter::FilterCriteria;
use crate::store::{DataSource, StationSnapshot};

/// Default map centre (Puerta del Sol, Madrid).
pub const DEFAULT_CENTER: (f64, f64) = (40.416775, -3.703790);

/// Default zoom, showing the whole peninsula.
pub const DEFAULT_ZOOM: u8 = 5;

/// Shown on the map when the filters leave nothing to draw.
pub const NO_RESULTS_NOTICE: &str = "No stations found with the selected filters.";

/// Shown instead of a schedule the feed left empty.
pub const HOURS_UNAVAILABLE: &str = "Horario no disponible";

/// Query parameters for the station list. Empty values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    /// Fuel slug or feed key
    pub fuel: Option<String>,

    /// Checkbox value: "on", "true" or "1"
    pub open_now: Option<String>,

    /// Free-text search over label and address
    pub q: Option<String>,

    /// Exact province
    pub province: Option<String>,
}

impl StationQuery {
    /// Convert to filter criteria.
    pub fn criteria(&self) -> Result<FilterCriteria, UnknownFuel> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        let fuel = present(&self.fuel)
            .map(|f| f.parse::<FuelKind>())
            .transpose()?;

        let open_now = self
            .open_now
            .as_deref()
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1"));

        Ok(FilterCriteria {
            fuel,
            open_now,
            search: present(&self.q),
            province: present(&self.province),
        })
    }
}

/// One price line in a marker popup.
#[derive(Debug, Clone, Serialize)]
pub struct PriceView {
    pub fuel: FuelKind,
    pub label: &'static str,
    /// Dot-decimal euros per litre
    pub price: String,
}

/// A station drawn on the map.
#[derive(Debug, Clone, Serialize)]
pub struct StationMarker {
    pub id: Option<String>,
    pub label: String,
    pub address: String,
    pub province: String,
    pub lat: f64,
    pub lon: f64,
    /// Open at the time of the request
    pub open: bool,
    pub prices: Vec<PriceView>,
    pub hours: String,
    /// Link opening directions to the station
    pub directions_url: String,
}

impl StationMarker {
    /// Build a marker, or `None` if the station's coordinates are unusable.
    pub fn from_station(station: &StationRecord, now: u16) -> Option<Self> {
        let coords = station.coordinates()?;

        let prices = FuelKind::ALL
            .into_iter()
            .filter_map(|fuel| {
                station.price(fuel).map(|price| PriceView {
                    fuel,
                    label: fuel.label(),
                    price: price.to_string(),
                })
            })
            .collect();

        let hours = if station.hours.trim().is_empty() {
            HOURS_UNAVAILABLE.to_string()
        } else {
            station.hours.clone()
        };

        Some(Self {
            id: station.id.clone(),
            label: station.label.clone(),
            address: station.address.clone(),
            province: station.province.clone(),
            lat: coords.lat,
            lon: coords.lon,
            open: station.is_open_at(now),
            prices,
            hours,
            directions_url: format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                coords.lat, coords.lon
            ),
        })
    }

    /// Status line for the popup.
    pub fn status_label(&self) -> &'static str {
        if self.open { "Open now" } else { "Closed now" }
    }

    /// The schedule split into display lines.
    pub fn hours_lines(&self) -> Vec<&str> {
        self.hours.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }
}

/// How the client should position the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    /// Fit the box containing every marker.
    FitBounds {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
    /// Centre on a point at a zoom level.
    Center { lat: f64, lon: f64, zoom: u8 },
}

impl Viewport {
    /// The box around `markers`, or the default view when there are none.
    pub fn for_markers(markers: &[StationMarker]) -> Self {
        let mut iter = markers.iter();
        let Some(first) = iter.next() else {
            return Viewport::Center {
                lat: DEFAULT_CENTER.0,
                lon: DEFAULT_CENTER.1,
                zoom: DEFAULT_ZOOM,
            };
        };

        let init = (first.lat, first.lon, first.lat, first.lon);
        let (south, west, north, east) = iter.fold(init, |(s, w, n, e), m| {
            (s.min(m.lat), w.min(m.lon), n.max(m.lat), e.max(m.lon))
        });
        Viewport::FitBounds {
            south,
            west,
            north,
            east,
        }
    }
}

/// Response for the station list.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Stations matching the filters, including those that cannot be drawn
    pub matched: usize,

    /// Stations that can be drawn
    pub markers: Vec<StationMarker>,

    pub viewport: Viewport,

    /// Message to overlay on the map, if any
    pub notice: Option<String>,

    /// Where the data came from
    pub source: DataSource,

    /// When the data was fetched from the feed
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StationsResponse {
    /// Render the filtered stations of `snapshot`.
    ///
    /// A data-loading notice takes precedence over the no-results notice.
    pub fn build(snapshot: &StationSnapshot, matched: &[&StationRecord], now: u16) -> Self {
        let markers: Vec<StationMarker> = matched
            .iter()
            .filter_map(|s| StationMarker::from_station(s, now))
            .collect();

        let notice = snapshot.notice.clone().or_else(|| {
            markers
                .is_empty()
                .then(|| NO_RESULTS_NOTICE.to_string())
        });

        Self {
            matched: matched.len(),
            viewport: Viewport::for_markers(&markers),
            markers,
            notice,
            source: snapshot.source,
            fetched_at: snapshot.fetched_at,
        }
    }
}

/// A fuel select option.
#[derive(Debug, Clone, Serialize)]
pub struct FuelOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl FuelOption {
    /// All fuels, in display order.
    pub fn all() -> Vec<Self> {
        FuelKind::ALL
            .into_iter()
            .map(|k| FuelOption {
                value: k.slug(),
                label: k.label(),
            })
            .collect()
    }
}

/// Response for the fuel list.
#[derive(Debug, Serialize)]
pub struct FuelsResponse {
    pub fuels: Vec<FuelOption>,
}

/// Response for the province list.
#[derive(Debug, Serialize)]
pub struct ProvincesResponse {
    pub provinces: Vec<String>,
}

/// Response for the data status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub source: DataSource,
    pub stations: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub published_at: Option<String>,
    pub notice: Option<String>,
}

impl StatusResponse {
    /// Summarise a snapshot.
    pub fn from_snapshot(snapshot: &StationSnapshot) -> Self {
        Self {
            source: snapshot.source,
            stations: snapshot.len(),
            fetched_at: snapshot.fetched_at,
            published_at: snapshot.published_at.clone(),
            notice: snapshot.notice.clone(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
