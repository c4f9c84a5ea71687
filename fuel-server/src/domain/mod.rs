//! Domain types for the fuel station map.
//!
//! Stations, fuels and opening hours as the rest of the application sees
//! them, independent of the feed's wire format.

mod fuel;
mod hours;
mod station;

pub use fuel::{FuelKind, UnknownFuel};
pub use hours::{OpeningHours, is_open, minutes_of_day};
pub use station::{Coordinates, StationRecord, normalize_decimal};
