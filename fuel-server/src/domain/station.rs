//! Normalized station records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fuel::FuelKind;
use super::hours::OpeningHours;

/// One fuel station, as kept in memory and in the local cache.
///
/// Coordinates and prices are stored as dot-decimal strings exactly as the
/// feed reported them (after comma normalization). Coordinates are only
/// parsed when a marker is rendered, so a station with a broken location can
/// still be matched by every other filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub province: String,
    pub latitude: String,
    pub longitude: String,
    pub hours: String,
    /// Prices keyed by fuel. Fuels the station does not sell are absent.
    #[serde(default)]
    pub prices: BTreeMap<FuelKind, String>,
}

/// A parsed, in-range WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Parse dot-decimal latitude and longitude strings.
    ///
    /// Returns `None` unless both parse to finite, in-range values.
    pub fn parse(lat: &str, lon: &str) -> Option<Self> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

impl StationRecord {
    /// The price for `fuel`, if the station sells it.
    pub fn price(&self, fuel: FuelKind) -> Option<&str> {
        self.prices
            .get(&fuel)
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
    }

    /// Whether the station has a non-empty price for `fuel`.
    pub fn has_price(&self, fuel: FuelKind) -> bool {
        self.price(fuel).is_some()
    }

    /// Parsed position, or `None` when the feed's coordinates are unusable.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::parse(&self.latitude, &self.longitude)
    }

    /// The station's schedule as understood by the opening-hours predicate.
    pub fn opening_hours(&self) -> OpeningHours {
        OpeningHours::parse(&self.hours)
    }

    /// Whether the station is open at `now` (minutes since local midnight).
    pub fn is_open_at(&self, now: u16) -> bool {
        self.opening_hours().is_open_at(now)
    }
}

/// Convert a locale-formatted decimal (`"40,4168"`) to dot-decimal (`"40.4168"`).
pub fn normalize_decimal(raw: &str) -> String {
    raw.trim().replacen(',', ".", 1)
}
