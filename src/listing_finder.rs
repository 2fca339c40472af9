use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::ExtractError;
use crate::models::{ListingCandidate, ReferenceZone};
use crate::scraper::ListingExtractor;
use crate::storage::SeenStore;
use crate::traits::Notifier;

/// Outcome of processing one snapshot
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotReport {
    pub extracted: usize,
    /// Candidates not in the seen store before this snapshot
    pub new: usize,
    pub notified: usize,
    pub failed: usize,
}

/// Dedup and dispatch for extracted listings.
///
/// While priming, new ids are recorded without notifying. Priming ends when
/// the caller reports a completed traversal of all targets.
pub struct ListingFinder {
    extractor: ListingExtractor,
    store: SeenStore,
    notifier: Box<dyn Notifier>,
    max_items: usize,
    local_zone: ReferenceZone,
    priming: bool,
}

impl ListingFinder {
    pub fn new(
        config: &AppConfig,
        store: SeenStore,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, ExtractError> {
        let extractor = ListingExtractor::new(&config.scraper_config())?;

        Ok(Self {
            extractor,
            store,
            notifier,
            max_items: config.max_items_per_page,
            local_zone: config.local_zone.clone(),
            priming: true,
        })
    }

    pub fn is_priming(&self) -> bool {
        self.priming
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    pub async fn process_snapshot(&mut self, html: &str) -> SnapshotReport {
        let listings = self.extractor.extract_listings(html, self.max_items);
        self.process_listings(listings).await
    }

    /// Check, record and (unless priming) notify each listing in order.
    pub async fn process_listings(&mut self, listings: Vec<ListingCandidate>) -> SnapshotReport {
        let mut report = SnapshotReport {
            extracted: listings.len(),
            ..SnapshotReport::default()
        };

        for listing in listings {
            if self.store.has(&listing.id) {
                continue;
            }

            // Recorded before sending: a failed send is never retried.
            self.store.record(&listing.id);
            report.new += 1;

            let preview: String = listing.title.chars().take(20).collect();
            if self.priming {
                info!("Memorized: {}... [{}]", preview, listing.id);
                continue;
            }

            info!(
                "{} | {} | {}...",
                listing.found_at.clock_in(&self.local_zone),
                listing.price.as_deref().unwrap_or("-"),
                preview
            );

            match self.notifier.notify(&listing).await {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    warn!(
                        "{} notification failed for {}: {}",
                        self.notifier.name(),
                        listing.id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Mark a full pass over every target URL as done.
    pub fn finish_traversal(&mut self) {
        if self.priming {
            info!("Initial scan completed. Messaging enabled.");
            self.priming = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::storage::DEFAULT_CAPACITY;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn notify(&self, _: &ListingCandidate) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "rate limited".to_string(),
            })
        }
    }

    struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn notify(&self, listing: &ListingCandidate) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(listing.id.clone());
            Ok(())
        }
    }

    fn snapshot(ids: &[&str]) -> String {
        let items: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<li class="s-item"><a href="/itm/{id}"><span class="s-item__title">Vintage Tee {id}</span></a>
                       <span class="s-item__price">$10.00</span></li>"#
                )
            })
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    #[tokio::test]
    async fn failed_send_still_marks_listing_seen() {
        let dir = tempdir().unwrap();
        let store = SeenStore::load(dir.path().join("seen.json"), DEFAULT_CAPACITY);
        let mut finder =
            ListingFinder::new(&AppConfig::default(), store, Box::new(FailingNotifier)).unwrap();
        finder.finish_traversal();

        let first = finder.process_snapshot(&snapshot(&["501"])).await;
        assert_eq!(first.failed, 1);
        assert!(finder.store().has("501"));

        let second = finder.process_snapshot(&snapshot(&["501"])).await;
        assert_eq!(second, SnapshotReport { extracted: 1, ..SnapshotReport::default() });
    }

    #[tokio::test]
    async fn ids_from_a_previous_run_are_not_notified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, r#"["601"]"#).unwrap();

        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut finder = ListingFinder::new(
            &AppConfig::default(),
            SeenStore::load(&path, DEFAULT_CAPACITY),
            Box::new(RecordingNotifier(sent.clone())),
        )
        .unwrap();
        finder.finish_traversal();

        let report = finder.process_snapshot(&snapshot(&["601", "602"])).await;

        assert_eq!(report.new, 1);
        assert_eq!(*sent.lock().unwrap(), ["602"]);
    }

    #[tokio::test]
    async fn priming_records_without_notifying() {
        let dir = tempdir().unwrap();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut finder = ListingFinder::new(
            &AppConfig::default(),
            SeenStore::load(dir.path().join("seen.json"), DEFAULT_CAPACITY),
            Box::new(RecordingNotifier(sent.clone())),
        )
        .unwrap();

        assert!(finder.is_priming());
        let report = finder.process_snapshot(&snapshot(&["701", "702"])).await;

        assert_eq!(report.new, 2);
        assert_eq!(report.notified, 0);
        assert!(sent.lock().unwrap().is_empty());
        assert!(finder.store().has("701") && finder.store().has("702"));
    }
}
