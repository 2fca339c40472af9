//! Per-fragment field extraction
//!
//! Every field is resolved by walking an ordered list of strategies and
//! taking the first one that yields an accepted value. The lists are plain
//! data built from the site profile, so each strategy can be exercised on
//! its own.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::parse_selector;
use super::text::{spaced_text, stripped_text};
use crate::error::ExtractError;
use crate::traits::ScraperConfig;

/// Title container text must be longer than this to be accepted.
const MIN_TITLE_CHARS: usize = 5;

/// Currency-prefixed amount: `THB`, `$` or `USD`, an optional space, then a
/// run of digits, commas and dots. The whole match is the display price.
pub static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(THB|\$|USD)\s?[\d,.]+(\.\d{2})?").expect("price pattern is a valid regex")
});

/// Fields recovered from one listing fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub price: Option<String>,
    pub image: String,
    pub listing_date: String,
}

#[derive(Debug, Clone)]
pub enum TitleStrategy {
    /// Known title container; accepted when its text is long enough.
    Container(Selector),
    /// `alt` of the first image, unless it carries the ad marker.
    ImageAlt { image: Selector, reject: String },
    /// Text of the detail anchor itself.
    AnchorText,
}

impl TitleStrategy {
    pub fn resolve(&self, fragment: ElementRef<'_>, anchor: ElementRef<'_>) -> Option<String> {
        match self {
            Self::Container(selector) => fragment
                .select(selector)
                .next()
                .map(stripped_text)
                .filter(|text| text.chars().count() > MIN_TITLE_CHARS),
            Self::ImageAlt { image, reject } => fragment
                .select(image)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .filter(|alt| !alt.is_empty() && !alt.contains(reject.as_str()))
                .map(str::to_string),
            Self::AnchorText => Some(stripped_text(anchor)).filter(|text| !text.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PriceStrategy {
    /// Known price container; accepted when its text contains a digit.
    Container(Selector),
    /// [`PRICE_PATTERN`] over the fragment's full text.
    TextPattern,
}

impl PriceStrategy {
    pub fn resolve(&self, fragment: ElementRef<'_>) -> Option<String> {
        match self {
            Self::Container(selector) => fragment
                .select(selector)
                .next()
                .map(stripped_text)
                .filter(|text| text.chars().any(|c| c.is_ascii_digit())),
            Self::TextPattern => PRICE_PATTERN
                .find(&spaced_text(fragment))
                .map(|m| m.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageStrategy {
    pub image: Selector,
    pub attributes: Vec<String>,
    pub placeholders: Vec<String>,
}

impl ImageStrategy {
    /// Source of the first image, or empty for spacer images.
    pub fn resolve(&self, fragment: ElementRef<'_>) -> String {
        let Some(img) = fragment.select(&self.image).next() else {
            return String::new();
        };

        let source = self
            .attributes
            .iter()
            .find_map(|attr| img.value().attr(attr).filter(|v| !v.is_empty()))
            .unwrap_or_default();

        if self.placeholders.iter().any(|p| source.contains(p.as_str())) {
            String::new()
        } else {
            source.to_string()
        }
    }
}

/// Remove every noise phrase from a raw title, then trim.
pub fn strip_title_noise(raw: &str, noise: &[String]) -> String {
    noise
        .iter()
        .fold(raw.to_string(), |title, phrase| title.replace(phrase.as_str(), ""))
        .trim()
        .to_string()
}

#[derive(Debug, Clone)]
pub struct FieldExtractor {
    titles: Vec<TitleStrategy>,
    placeholder_title: String,
    title_noise: Vec<String>,
    /// Empty in minimal mode
    prices: Vec<PriceStrategy>,
    image: Option<ImageStrategy>,
    listing_date: Option<Selector>,
}

impl FieldExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self, ExtractError> {
        let selectors = &config.selectors;
        let full = config.mode.is_full();

        let mut titles = selectors
            .title
            .iter()
            .map(|s| parse_selector("title", s).map(TitleStrategy::Container))
            .collect::<Result<Vec<_>, _>>()?;
        if full {
            titles.push(TitleStrategy::ImageAlt {
                image: parse_selector("image", &selectors.image)?,
                reject: config.markers.ad_image_alt.clone(),
            });
        }
        titles.push(TitleStrategy::AnchorText);

        let (prices, image, listing_date) = if full {
            let mut prices = selectors
                .price
                .iter()
                .map(|s| parse_selector("price", s).map(PriceStrategy::Container))
                .collect::<Result<Vec<_>, _>>()?;
            prices.push(PriceStrategy::TextPattern);

            let image = ImageStrategy {
                image: parse_selector("image", &selectors.image)?,
                attributes: selectors.image_attributes.clone(),
                placeholders: config.markers.image_placeholders.clone(),
            };
            let date = parse_selector("listing date", &selectors.listing_date)?;
            (prices, Some(image), Some(date))
        } else {
            (Vec::new(), None, None)
        };

        Ok(Self {
            titles,
            placeholder_title: config.markers.placeholder_title.clone(),
            title_noise: config.markers.title_noise.clone(),
            prices,
            image,
            listing_date,
        })
    }

    pub fn extract(&self, fragment: ElementRef<'_>, anchor: ElementRef<'_>) -> ExtractedFields {
        ExtractedFields {
            title: self.title(fragment, anchor),
            price: self.price(fragment),
            image: self
                .image
                .as_ref()
                .map(|strategy| strategy.resolve(fragment))
                .unwrap_or_default(),
            listing_date: self.listing_date(fragment),
        }
    }

    /// First strategy that resolves, with noise stripped afterwards. A source
    /// whose whole text is a noise phrase such as `New Listing` still wins, so
    /// the title comes out empty rather than falling through.
    pub fn title(&self, fragment: ElementRef<'_>, anchor: ElementRef<'_>) -> String {
        let raw = self
            .titles
            .iter()
            .find_map(|strategy| strategy.resolve(fragment, anchor))
            .unwrap_or_else(|| self.placeholder_title.clone());
        strip_title_noise(&raw, &self.title_noise)
    }

    pub fn price(&self, fragment: ElementRef<'_>) -> Option<String> {
        self.prices.iter().find_map(|strategy| strategy.resolve(fragment))
    }

    fn listing_date(&self, fragment: ElementRef<'_>) -> String {
        self.listing_date
            .as_ref()
            .and_then(|selector| fragment.select(selector).next())
            .map(stripped_text)
            .unwrap_or_default()
    }
}
