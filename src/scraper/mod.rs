//! Listing extraction from search result snapshots

pub mod fields;
pub mod filter;
pub mod id;
mod text;

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ExtractError;
use crate::models::{FoundAt, ListingCandidate};
use crate::traits::{ExtractionMode, ScraperConfig};
pub use fields::{ExtractedFields, FieldExtractor};
pub use filter::AdFilter;
pub use id::extract_id;

pub(crate) fn parse_selector(name: &'static str, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        name,
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

fn compile_pattern(name: &'static str, pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::Pattern { name, source })
}

/// Everything from the first `?` removed.
pub fn strip_query(href: &str) -> &str {
    href.split('?').next().unwrap_or(href)
}

/// Turns one page snapshot into a bounded list of listing candidates
pub struct ListingExtractor {
    name: String,
    base_url: String,
    mode: ExtractionMode,
    detail_path: String,
    anchor_selector: Selector,
    container_class: Regex,
    outer_container_class: Regex,
    wrapper_class_markers: Vec<String>,
    filter: AdFilter,
    fields: FieldExtractor,
}

impl ListingExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            name: config.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mode: config.mode,
            detail_path: config.selectors.detail_path.clone(),
            anchor_selector: parse_selector("anchor", "a[href]")?,
            container_class: compile_pattern("container class", &config.selectors.container_class)?,
            outer_container_class: compile_pattern(
                "outer container class",
                &config.selectors.outer_container_class,
            )?,
            wrapper_class_markers: config.selectors.wrapper_class_markers.clone(),
            filter: AdFilter::new(config)?,
            fields: FieldExtractor::new(config)?,
        })
    }

    /// Extract up to `max_items` candidates, stamped with the current time.
    pub fn extract_listings(&self, html: &str, max_items: usize) -> Vec<ListingCandidate> {
        self.extract_listings_at(html, max_items, FoundAt::now())
    }

    /// Candidates in document order of their first anchor. Every candidate of
    /// one scan shares the same `found_at`.
    pub fn extract_listings_at(
        &self,
        html: &str,
        max_items: usize,
        found_at: FoundAt,
    ) -> Vec<ListingCandidate> {
        let document = Html::parse_document(html);
        let mut seen_hrefs = HashSet::new();
        let mut seen_ids = HashSet::new();
        let mut listings = Vec::new();

        if max_items == 0 {
            return listings;
        }

        for anchor in document.select(&self.anchor_selector) {
            let Some(raw_href) = anchor.value().attr("href") else {
                continue;
            };
            if !raw_href.contains(self.detail_path.as_str()) {
                continue;
            }

            let href = strip_query(raw_href);
            if !seen_hrefs.insert(href.to_string()) {
                continue;
            }

            let Some(id) = extract_id(href) else {
                debug!("No listing id in {}", href);
                continue;
            };
            if !seen_ids.insert(id.clone()) {
                continue;
            }

            let fragment = self.fragment_for(anchor);
            if self.filter.is_ad(fragment) {
                debug!("Skipping promotional block near {}", href);
                continue;
            }

            let ExtractedFields {
                title,
                price,
                image,
                listing_date,
            } = self.fields.extract(fragment, anchor);

            if self.mode.is_full() && price.is_none() {
                debug!("Skipping {} without a price", id);
                continue;
            }

            listings.push(ListingCandidate {
                id,
                title,
                price,
                link: self.absolutize(href),
                image,
                listing_date,
                found_at,
            });

            if listings.len() >= max_items {
                break;
            }
        }

        debug!("Extracted {} listings from {} snapshot", listings.len(), self.name);
        listings
    }

    /// Nearest listing container around the anchor, or its parent.
    fn fragment_for<'a>(&self, anchor: ElementRef<'a>) -> ElementRef<'a> {
        let container = match find_ancestor(anchor, &self.container_class) {
            Some(inner) if self.mode.is_full() && self.is_wrapper(inner) => {
                Some(find_ancestor(inner, &self.outer_container_class).unwrap_or(inner))
            }
            found => found,
        };

        container
            .or_else(|| anchor.parent().and_then(ElementRef::wrap))
            .unwrap_or(anchor)
    }

    fn is_wrapper(&self, element: ElementRef<'_>) -> bool {
        element.value().classes().any(|class| {
            self.wrapper_class_markers
                .iter()
                .any(|marker| class.contains(marker.as_str()))
        })
    }

    fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else if href.starts_with("//") {
            format!("https:{href}")
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            href.to_string()
        }
    }
}

/// Closest ancestor (excluding `element`) with a class matching `pattern`.
fn find_ancestor<'a>(element: ElementRef<'a>, pattern: &Regex) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().classes().any(|class| pattern.is_match(class)))
}
