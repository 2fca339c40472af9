//! Marketplace listing finder
//!
//! Polls search result pages, extracts listing candidates, drops ads and
//! already-seen ids, and sends new listings to Discord or Telegram.

pub mod config;
pub mod discord;
pub mod error;
pub mod listing_finder;
pub mod models;
pub mod scheduler;
pub mod scraper;
pub mod scrapers;
pub mod storage;
pub mod telegram;
pub mod traits;

pub use listing_finder::ListingFinder;
pub use models::ListingCandidate;
pub use scheduler::Scheduler;
