//! Marketplace profiles and snapshot providers

pub mod ebay;
pub mod http;

pub use http::HttpSnapshotProvider;
