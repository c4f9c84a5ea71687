//! Fuel station map server.
//!
//! Shows the stations of one brand from the Spanish government fuel price
//! feed on a map, with their current prices and opening hours. The feed is
//! cached on disk for 24 hours so the map renders immediately on startup.

pub mod cache;
pub mod config;
pub mod domain;
pub mod feed;
pub mod filter;
pub mod store;
pub mod web;
