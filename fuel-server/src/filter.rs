//! Station filtering for the map view.
//!
//! Filtering only ever reads the in-memory collection; changing a filter
//! never triggers a fetch.

use crate::domain::{FuelKind, StationRecord};

/// The active combination of map filters.
///
/// Every field is optional; the default criteria keep every station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Only stations selling this fuel.
    pub fuel: Option<FuelKind>,
    /// Only stations open at the evaluation time.
    pub open_now: bool,
    /// Case-insensitive substring of the label or address.
    pub search: Option<String>,
    /// Exact province name.
    pub province: Option<String>,
}

impl FilterCriteria {
    /// Whether `station` passes every active filter at `now`
    /// (minutes since local midnight).
    pub fn matches(&self, station: &StationRecord, now: u16) -> bool {
        self.matches_with(station, now, self.search_needle().as_deref())
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_with(&self, station: &StationRecord, now: u16, needle: Option<&str>) -> bool {
        if self.fuel.is_some_and(|fuel| !station.has_price(fuel)) {
            return false;
        }

        if self.open_now && !station.is_open_at(now) {
            return false;
        }

        if self
            .province
            .as_ref()
            .is_some_and(|province| &station.province != province)
        {
            return false;
        }

        if let Some(needle) = needle {
            let label = station.label.to_lowercase();
            let address = station.address.to_lowercase();
            if !label.contains(needle) && !address.contains(needle) {
                return false;
            }
        }

        true
    }
}

/// Keep the stations matching `criteria` at `now`, in input order.
pub fn apply<'a>(
    stations: &'a [StationRecord],
    criteria: &FilterCriteria,
    now: u16,
) -> Vec<&'a StationRecord> {
    let needle = criteria.search_needle();
    stations
        .iter()
        .filter(|s| criteria.matches_with(s, now, needle.as_deref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const NOON: u16 = 12 * 60;

    fn station(label: &str, province: &str, hours: &str, fuels: &[FuelKind]) -> StationRecord {
        StationRecord {
            id: None,
            label: label.to_string(),
            address: format!("Calle de {label}"),
            municipality: None,
            postal_code: None,
            province: province.to_string(),
            latitude: "40.4".to_string(),
            longitude: "-3.7".to_string(),
            hours: hours.to_string(),
            prices: fuels.iter().map(|f| (*f, "1.500".to_string())).collect(),
        }
    }

    #[test]
    fn fuel_and_province_select_single_station() {
        let a = station("BP A", "Madrid", "24H", &[FuelKind::DieselA]);
        let b = station("BP B", "Sevilla", "24H", &[FuelKind::Gasoline95E5]);
        let stations = vec![a.clone(), b];

        let criteria = FilterCriteria {
            fuel: Some(FuelKind::DieselA),
            province: Some("Madrid".to_string()),
            ..Default::default()
        };

        let result = apply(&stations, &criteria, NOON);
        assert_eq!(result, vec![&a]);
    }

    #[test]
    fn default_criteria_keep_everything_in_order() {
        let stations = vec![
            station("BP 3", "Madrid", "", &[]),
            station("BP 1", "Lugo", "", &[]),
            station("BP 2", "Madrid", "", &[]),
        ];
        let result = apply(&stations, &FilterCriteria::default(), NOON);
        let labels: Vec<_> = result.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["BP 3", "BP 1", "BP 2"]);
    }

    #[test]
    fn blank_price_does_not_count() {
        let mut s = station("BP", "Madrid", "24H", &[]);
        s.prices = BTreeMap::from([(FuelKind::Lpg, String::new())]);
        let criteria = FilterCriteria {
            fuel: Some(FuelKind::Lpg),
            ..Default::default()
        };
        assert!(!criteria.matches(&s, NOON));
    }

    #[test]
    fn open_now_uses_schedule() {
        let day = station("BP Day", "Madrid", "L-D: 07:00-22:00", &[]);
        let night = station("BP Night", "Madrid", "22:00-06:00", &[]);
        let unknown = station("BP ?", "Madrid", "consultar", &[]);
        let stations = vec![day, night, unknown];

        let criteria = FilterCriteria {
            open_now: true,
            ..Default::default()
        };

        let at_noon: Vec<_> = apply(&stations, &criteria, NOON)
            .into_iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(at_noon, ["BP Day"]);

        let at_night: Vec<_> = apply(&stations, &criteria, 23 * 60)
            .into_iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(at_night, ["BP Night"]);
    }

    #[test]
    fn search_matches_label_or_address_ignoring_case() {
        let mut s = station("Estación BP Norte", "Madrid", "", &[]);
        s.address = "AVENIDA DE LA ILUSTRACIÓN 4".to_string();

        let search = |text: &str| FilterCriteria {
            search: Some(text.to_string()),
            ..Default::default()
        };

        assert!(search("norte").matches(&s, NOON));
        assert!(search("ilustración").matches(&s, NOON));
        assert!(search("").matches(&s, NOON));
        assert!(!search("sur").matches(&s, NOON));
    }

    #[test]
    fn province_is_exact() {
        let s = station("BP", "MADRID", "", &[]);
        let criteria = FilterCriteria {
            province: Some("Madrid".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&s, NOON));
    }

    #[test]
    fn unparseable_coordinates_still_filterable() {
        let mut s = station("BP", "Madrid", "24H", &[FuelKind::DieselA]);
        s.latitude = "n/a".to_string();
        let criteria = FilterCriteria {
            fuel: Some(FuelKind::DieselA),
            ..Default::default()
        };
        assert_eq!(apply(std::slice::from_ref(&s), &criteria, NOON).len(), 1);
    }
}
