//! eBay search result profile

use crate::traits::{ExtractionMode, NoiseMarkers, ScraperConfig, SiteSelectors};

pub const BASE_URL: &str = "https://www.ebay.com";
pub const SEARCH_URL_PATTERN: &str = "https://www.ebay.com/sch/i.html?_nkw={query}&LH_BIN=1&_sop=10";
pub const AD_MARKER: &str = "Shop on eBay";

/// Build the eBay profile for the given extraction variant.
pub fn profile(mode: ExtractionMode) -> ScraperConfig {
    ScraperConfig {
        name: "eBay".to_string(),
        base_url: BASE_URL.to_string(),
        mode,
        selectors: SiteSelectors {
            detail_path: "/itm/".to_string(),
            container_class: "(s-item|s-card|vim)".to_string(),
            outer_container_class: "(s-item|s-card)".to_string(),
            wrapper_class_markers: strings(&["media-wrapper", "image"]),
            title: strings(&[".s-item__title", ".s-card__title", "h3"]),
            price: strings(&[
                ".s-item__price",
                ".s-card__price",
                ".x-price-primary",
                ".x-price-approx__price",
                ".POSITIVE",
                "span.bold",
            ]),
            image: "img".to_string(),
            image_attributes: strings(&["data-src", "data-img-src", "src"]),
            listing_date: ".s-item__listingDate, .s-item__dynamic .BOLD".to_string(),
        },
        markers: NoiseMarkers {
            ad_text: strings(&[AD_MARKER, "Results matching"]),
            ad_image_alt: AD_MARKER.to_string(),
            title_noise: strings(&[
                "Opens in a new window or tab",
                "New Listing",
                AD_MARKER,
                "Results matching",
            ]),
            image_placeholders: strings(&["spacer", "s_1x2"]),
            placeholder_title: "New Listing".to_string(),
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
