//! Fuel kinds published by the price feed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known fuel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel: {0}")]
pub struct UnknownFuel(pub String);

/// One of the seven fuels the feed reports prices for.
///
/// Declaration order is display order in popups and select lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelKind {
    Gasoline95E5,
    DieselA,
    Gasoline98E5,
    DieselB,
    Lpg,
    Cng,
    DieselPremium,
}

impl FuelKind {
    /// All fuels, in display order.
    pub const ALL: [FuelKind; 7] = [
        FuelKind::Gasoline95E5,
        FuelKind::DieselA,
        FuelKind::Gasoline98E5,
        FuelKind::DieselB,
        FuelKind::Lpg,
        FuelKind::Cng,
        FuelKind::DieselPremium,
    ];

    /// The field name carrying this fuel's price in the feed.
    pub fn feed_key(self) -> &'static str {
        match self {
            FuelKind::Gasoline95E5 => "Precio Gasolina 95 E5",
            FuelKind::DieselA => "Precio Gasoleo A",
            FuelKind::Gasoline98E5 => "Precio Gasolina 98 E5",
            FuelKind::DieselB => "Precio Gasoleo B",
            FuelKind::Lpg => "Precio Gases licuados del petróleo",
            FuelKind::Cng => "Precio Gas Natural Comprimido",
            FuelKind::DieselPremium => "Precio Gasoleo Premium",
        }
    }

    /// Short label shown next to prices.
    pub fn label(self) -> &'static str {
        match self {
            FuelKind::Gasoline95E5 => "G95 E5",
            FuelKind::DieselA => "GA",
            FuelKind::Gasoline98E5 => "G98 E5",
            FuelKind::DieselB => "GB",
            FuelKind::Lpg => "GLP",
            FuelKind::Cng => "GNC",
            FuelKind::DieselPremium => "G. Prem",
        }
    }

    /// URL-safe identifier used in query strings.
    pub fn slug(self) -> &'static str {
        match self {
            FuelKind::Gasoline95E5 => "gasoline95_e5",
            FuelKind::DieselA => "diesel_a",
            FuelKind::Gasoline98E5 => "gasoline98_e5",
            FuelKind::DieselB => "diesel_b",
            FuelKind::Lpg => "lpg",
            FuelKind::Cng => "cng",
            FuelKind::DieselPremium => "diesel_premium",
        }
    }
}

impl fmt::Display for FuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FuelKind {
    type Err = UnknownFuel;

    /// Accepts either the slug (`diesel_a`) or the feed key (`Precio Gasoleo A`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FuelKind::ALL
            .into_iter()
            .find(|k| k.slug().eq_ignore_ascii_case(trimmed) || k.feed_key() == trimmed)
            .ok_or_else(|| UnknownFuel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slug_and_feed_key() {
        assert_eq!("diesel_a".parse::<FuelKind>(), Ok(FuelKind::DieselA));
        assert_eq!("LPG".parse::<FuelKind>(), Ok(FuelKind::Lpg));
        assert_eq!(
            "Precio Gases licuados del petróleo".parse::<FuelKind>(),
            Ok(FuelKind::Lpg)
        );
        assert!("kerosene".parse::<FuelKind>().is_err());
    }

    #[test]
    fn slugs_match_serde_names() {
        for kind in FuelKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.slug()));
        }
    }

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = FuelKind::ALL;
        sorted.sort();
        assert_eq!(sorted, FuelKind::ALL);
    }
}
