//! Outer poll loop: traverses every target URL, then sleeps a random delay.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tokio::signal;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::listing_finder::{ListingFinder, SnapshotReport};
use crate::traits::SnapshotProvider;

/// Totals for one traversal of all target URLs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub urls: usize,
    pub failed_urls: usize,
    pub new: usize,
    pub notified: usize,
}

impl CycleReport {
    fn add(&mut self, snapshot: SnapshotReport) {
        self.new += snapshot.new;
        self.notified += snapshot.notified;
    }
}

pub struct Scheduler<P: SnapshotProvider> {
    finder: ListingFinder,
    provider: P,
    targets: Vec<String>,
    poll_delay_secs: RangeInclusive<f64>,
    error_pause: Duration,
    /// Stop after this many cycles; `None` runs until interrupted
    max_cycles: Option<usize>,
}

impl<P: SnapshotProvider> Scheduler<P> {
    pub fn new(config: &AppConfig, finder: ListingFinder, provider: P) -> Self {
        Self {
            finder,
            provider,
            targets: config.target_urls(),
            poll_delay_secs: config.poll_delay_secs(),
            error_pause: config.error_pause(),
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn finder(&self) -> &ListingFinder {
        &self.finder
    }

    /// Fetch and process each target in order. A failing URL is logged,
    /// followed by a short pause, and the traversal moves on.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport {
            urls: self.targets.len(),
            ..CycleReport::default()
        };

        for url in &self.targets {
            match self.provider.fetch(url).await {
                Ok(html) => {
                    let snapshot = self.finder.process_snapshot(&html).await;
                    report.add(snapshot);
                }
                Err(e) => {
                    warn!("Loop Error for {}: {}", url, e);
                    report.failed_urls += 1;
                    sleep(self.error_pause).await;
                }
            }
        }

        self.finder.finish_traversal();
        report
    }

    /// Cycle until `max_cycles` is reached, sleeping between traversals.
    pub async fn run(&mut self) {
        let mut cycles = 0;
        loop {
            let report = self.run_cycle().await;
            cycles += 1;
            info!(
                "Cycle {} done: {} new, {} notified, {}/{} urls failed",
                cycles, report.new, report.notified, report.failed_urls, report.urls
            );

            if self.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            let delay = self.next_delay();
            info!("💤 Sleeping {:.1}s...", delay.as_secs_f64());
            sleep(delay).await;
        }
    }

    /// Run until done or interrupted, then release the snapshot provider.
    pub async fn run_until_shutdown(mut self) {
        tokio::select! {
            () = self.run() => {}
            Ok(()) = signal::ctrl_c() => {
                info!("Bot stopped by user.");
            }
        }
        self.provider.shutdown().await;
    }

    fn next_delay(&self) -> Duration {
        let secs = rand::rng().random_range(self.poll_delay_secs.clone());
        Duration::from_secs_f64(secs)
    }
}
