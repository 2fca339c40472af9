//! Promotional and non-listing fragment detection

use scraper::{ElementRef, Selector};

use super::parse_selector;
use super::text::spaced_text;
use crate::error::ExtractError;
use crate::traits::ScraperConfig;

#[derive(Debug, Clone)]
pub struct AdFilter {
    text_markers: Vec<String>,
    /// `None` in minimal mode, where only the text check runs
    image_alt: Option<(Selector, String)>,
}

impl AdFilter {
    pub fn new(config: &ScraperConfig) -> Result<Self, ExtractError> {
        let image_alt = if config.mode.is_full() {
            Some((
                parse_selector("image", &config.selectors.image)?,
                config.markers.ad_image_alt.clone(),
            ))
        } else {
            None
        };

        Ok(Self {
            text_markers: config.markers.ad_text.clone(),
            image_alt,
        })
    }

    pub fn is_ad(&self, fragment: ElementRef<'_>) -> bool {
        let text = spaced_text(fragment);
        if self.text_markers.iter().any(|marker| text.contains(marker.as_str())) {
            return true;
        }

        self.image_alt.as_ref().is_some_and(|(image, marker)| {
            fragment
                .select(image)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .is_some_and(|alt| alt.contains(marker.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::ebay;
    use crate::traits::ExtractionMode;
    use scraper::Html;

    fn is_ad(mode: ExtractionMode, markup: &str) -> bool {
        let filter = AdFilter::new(&ebay::profile(mode)).unwrap();
        let html = Html::parse_fragment(markup);
        let fragment = html.select(&Selector::parse("li").unwrap()).next().unwrap();
        filter.is_ad(fragment)
    }

    #[test]
    fn text_markers_flag_ads_in_both_modes() {
        let markup = r#"<ul><li><a href="/itm/1">Polo</a><span>Shop on eBay</span></li></ul>"#;
        assert!(is_ad(ExtractionMode::Full, markup));
        assert!(is_ad(ExtractionMode::Minimal, markup));

        let results = r#"<ul><li><h3>Results matching fewer words</h3></li></ul>"#;
        assert!(is_ad(ExtractionMode::Full, results));
    }

    #[test]
    fn image_alt_marker_only_checked_in_full_mode() {
        let markup = r#"<ul><li><img alt="Shop on eBay"><a href="/itm/1">Polo</a></li></ul>"#;
        assert!(is_ad(ExtractionMode::Full, markup));
        assert!(!is_ad(ExtractionMode::Minimal, markup));
    }

    #[test]
    fn ordinary_listing_is_not_an_ad() {
        let markup = r#"<ul><li><img alt="Vintage Polo"><a href="/itm/1">Vintage Polo</a>
                        <span class="s-item__price">$25.00</span></li></ul>"#;
        assert!(!is_ad(ExtractionMode::Full, markup));
    }
}
