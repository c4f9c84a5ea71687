//! Ministry fuel price feed.
//!
//! Fetches the national list of land-based fuel stations, which is
//! republished by the Ministry several times a day, and turns it into
//! normalized [`StationRecord`](crate::domain::StationRecord)s.
//!
//! Key characteristics of the feed:
//! - One large JSON document (tens of megabytes) with no paging
//! - Decimals use a comma separator (`"40,4168"`, `"1,459"`)
//! - Every field is a string, and any field may be missing or empty

mod client;
mod error;
mod normalize;
mod types;

pub use client::{DEFAULT_FEED_URL, FeedClient, FeedClientConfig};
pub use error::FeedError;
pub use normalize::{BrandFilter, DEFAULT_BRAND, normalize};
pub use types::{FeedSnapshot, RawStation, STATION_LIST_FIELD, parse_feed};
