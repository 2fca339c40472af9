//! Traits and site profile types at the seams of the pipeline

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{FetchError, NotifyError};
use crate::models::ListingCandidate;

/// Which extraction variant to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Title, price, image and listing date; price is mandatory.
    #[default]
    Full,
    /// Title and link only; any fragment with an id is accepted.
    Minimal,
}

impl ExtractionMode {
    pub fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Configuration for a marketplace search page profile
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Display name for the marketplace
    pub name: String,
    /// Base URL used to absolutize relative detail links
    pub base_url: String,
    pub mode: ExtractionMode,
    pub selectors: SiteSelectors,
    pub markers: NoiseMarkers,
}

/// CSS selectors and class patterns for the parts of a listing
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Substring an anchor href must contain to count as a detail link
    pub detail_path: String,
    /// Regex matched against single class names of listing containers
    pub container_class: String,
    /// Regex matched against the outer container when climbing past a wrapper
    pub outer_container_class: String,
    /// Class fragments marking an inner media/image wrapper
    pub wrapper_class_markers: Vec<String>,
    /// Title containers, in priority order
    pub title: Vec<String>,
    /// Price containers, in priority order
    pub price: Vec<String>,
    pub image: String,
    /// Image source attributes, in priority order
    pub image_attributes: Vec<String>,
    pub listing_date: String,
}

/// Literal phrases that identify promotional content and title noise
#[derive(Debug, Clone)]
pub struct NoiseMarkers {
    /// Text markers that classify a whole fragment as an ad
    pub ad_text: Vec<String>,
    /// Marker checked against the first image's alt text
    pub ad_image_alt: String,
    /// Phrases removed from resolved titles, in order
    pub title_noise: Vec<String>,
    /// Substrings marking spacer/placeholder images
    pub image_placeholders: Vec<String>,
    /// Title used when every other strategy fails
    pub placeholder_title: String,
}

/// Yields raw markup for a search URL
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Releases the underlying session; called once on shutdown.
    async fn shutdown(&self) {}
}

/// Sends a newly discovered listing to a messaging sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short sink name for log lines
    fn name(&self) -> &'static str;

    async fn notify(&self, candidate: &ListingCandidate) -> Result<(), NotifyError>;
}
