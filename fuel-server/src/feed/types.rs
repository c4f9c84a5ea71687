//! Wire types for the Ministry fuel price feed.
//!
//! The feed uses Spanish field names, locale-formatted decimals and carries
//! every value as a string. Only the fields the map needs are typed; prices
//! are looked up by their feed key from the remaining fields.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::FuelKind;

use super::error::FeedError;

/// Name of the station list in the feed response.
pub const STATION_LIST_FIELD: &str = "ListaEESSPrecio";

/// Longest body excerpt kept on parse errors.
const BODY_EXCERPT_CHARS: usize = 400;

/// One station as published by the feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStation {
    #[serde(rename = "IDEESS", default)]
    pub id: Option<String>,
    #[serde(rename = "Rótulo", default)]
    pub label: Option<String>,
    #[serde(rename = "Dirección", default)]
    pub address: Option<String>,
    #[serde(rename = "Municipio", default)]
    pub municipality: Option<String>,
    #[serde(rename = "C.P.", default)]
    pub postal_code: Option<String>,
    #[serde(rename = "Provincia", default)]
    pub province: Option<String>,
    #[serde(rename = "Latitud", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Longitud (WGS84)", default)]
    pub longitude_wgs84: Option<String>,
    #[serde(rename = "Longitud", default)]
    pub longitude: Option<String>,
    #[serde(rename = "Horario", default)]
    pub hours: Option<String>,
    /// Everything else, including the price fields.
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl RawStation {
    /// Raw price string for `fuel`, as published.
    pub fn price(&self, fuel: FuelKind) -> Option<&str> {
        self.other.get(fuel.feed_key()).and_then(Value::as_str)
    }

    /// Longitude, preferring the WGS84 field.
    pub fn longitude(&self) -> Option<&str> {
        self.longitude_wgs84
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.longitude.as_deref())
    }
}

/// A decoded feed response.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Publication timestamp (`Fecha`), as published.
    pub published_at: Option<String>,
    /// Result marker (`ResultadoConsulta`), `"OK"` on success.
    pub result: Option<String>,
    pub stations: Vec<RawStation>,
}

/// Decode a feed body.
///
/// Entries of the station list that are not station objects are skipped.
pub fn parse_feed(body: &str) -> Result<FeedSnapshot, FeedError> {
    let mut value: Value = serde_json::from_str(body).map_err(|e| FeedError::Parse {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
    })?;

    let list = match value.get_mut(STATION_LIST_FIELD).map(Value::take) {
        Some(Value::Array(list)) => list,
        Some(_) => {
            return Err(FeedError::Schema(format!(
                "{STATION_LIST_FIELD} is not a list"
            )));
        }
        None => {
            return Err(FeedError::Schema(format!("missing {STATION_LIST_FIELD}")));
        }
    };

    let text_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

    let stations = list
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<RawStation>(item).ok())
        .collect();

    Ok(FeedSnapshot {
        published_at: text_field("Fecha"),
        result: text_field("ResultadoConsulta"),
        stations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_feed() {
        let body = r#"{
            "Fecha": "16/10/2026 9:12:40",
            "ListaEESSPrecio": [
                {
                    "IDEESS": "4375",
                    "Rótulo": "BP EL PLANTIO",
                    "Dirección": "AVENIDA ISABEL DE SANTO DOMINGO, 11",
                    "Provincia": "MADRID",
                    "Latitud": "40,466083",
                    "Longitud (WGS84)": "-3,818083",
                    "Horario": "L-D: 24H",
                    "Precio Gasoleo A": "1,459",
                    "Precio Gasolina 95 E5": ""
                },
                null,
                "garbage"
            ],
            "Nota": "Archivo de todos los productos en todas las estaciones de servicio.",
            "ResultadoConsulta": "OK"
        }"#;

        let feed = parse_feed(body).unwrap();
        assert_eq!(feed.published_at.as_deref(), Some("16/10/2026 9:12:40"));
        assert_eq!(feed.result.as_deref(), Some("OK"));
        assert_eq!(feed.stations.len(), 1);

        let s = &feed.stations[0];
        assert_eq!(s.label.as_deref(), Some("BP EL PLANTIO"));
        assert_eq!(s.longitude(), Some("-3,818083"));
        assert_eq!(s.price(FuelKind::DieselA), Some("1,459"));
        assert_eq!(s.price(FuelKind::Gasoline95E5), Some(""));
        assert_eq!(s.price(FuelKind::Cng), None);
    }

    #[test]
    fn plain_longitude_fallback() {
        let feed = parse_feed(r#"{"ListaEESSPrecio": [{"Longitud": "-3,7"}]}"#).unwrap();
        assert_eq!(feed.stations[0].longitude(), Some("-3,7"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_feed("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, FeedError::Parse { body: Some(ref b), .. } if b.starts_with("<html>")));
    }

    #[test]
    fn missing_list_is_schema_error() {
        let err = parse_feed(r#"{"Fecha": "x"}"#).unwrap_err();
        assert!(matches!(err, FeedError::Schema(_)));

        let err = parse_feed(r#"{"ListaEESSPrecio": {}}"#).unwrap_err();
        assert!(matches!(err, FeedError::Schema(_)));

        let err = parse_feed("[]").unwrap_err();
        assert!(matches!(err, FeedError::Schema(_)));
    }
}
