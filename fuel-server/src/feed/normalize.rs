//! Conversion from feed records to [`StationRecord`]s.

use std::collections::BTreeMap;

use crate::domain::{FuelKind, StationRecord, normalize_decimal};

use super::types::RawStation;

/// Default brand kept on the map.
pub const DEFAULT_BRAND: &str = "BP";

/// Case-insensitive substring match on a station's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandFilter {
    needle: String,
}

impl BrandFilter {
    /// Keep stations whose label contains `brand`, ignoring case.
    pub fn new(brand: &str) -> Self {
        Self {
            needle: brand.trim().to_uppercase(),
        }
    }

    /// Whether `label` belongs to the brand.
    pub fn matches(&self, label: &str) -> bool {
        label.to_uppercase().contains(&self.needle)
    }

    /// The brand being matched, upper-cased.
    pub fn brand(&self) -> &str {
        &self.needle
    }
}

impl Default for BrandFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BRAND)
    }
}

/// Keep brand-matching stations and normalize their decimals.
///
/// Stations without a label can never match and are dropped, as are all
/// stations of other brands. Order is preserved.
pub fn normalize(raw: Vec<RawStation>, brand: &BrandFilter) -> Vec<StationRecord> {
    raw.into_iter()
        .filter(|s| s.label.as_deref().is_some_and(|l| brand.matches(l)))
        .map(into_record)
        .collect()
}

fn into_record(raw: RawStation) -> StationRecord {
    let prices: BTreeMap<FuelKind, String> = FuelKind::ALL
        .into_iter()
        .filter_map(|fuel| {
            let price = normalize_decimal(raw.price(fuel)?);
            (!price.is_empty()).then_some((fuel, price))
        })
        .collect();

    let longitude = raw.longitude().map(normalize_decimal).unwrap_or_default();
    let text = |field: Option<String>| field.map(|s| s.trim().to_string()).unwrap_or_default();
    let optional = |field: Option<String>| {
        field
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    StationRecord {
        id: optional(raw.id),
        label: text(raw.label),
        address: text(raw.address),
        municipality: optional(raw.municipality),
        postal_code: optional(raw.postal_code),
        province: text(raw.province),
        latitude: raw.latitude.as_deref().map(normalize_decimal).unwrap_or_default(),
        longitude,
        hours: raw.hours.unwrap_or_default(),
        prices,
    }
}
