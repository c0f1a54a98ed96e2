//! Scan sessions: ingestion, keyword triage and batched render verification
//! (made by FontLab https://www.fontlab.com/)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::candidate::{dedup_candidates, CandidateSource};
use crate::classify::classify;
use crate::compare::Comparator;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::render::{FontLoader, Surface};
use crate::store::{ResultStore, Verdict};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Running,
    Complete,
    Cancelled,
}

impl ScanState {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Running => "running",
            ScanState::Complete => "complete",
            ScanState::Cancelled => "cancelled",
        }
    }
}

/// Reported after every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
    pub newly_found_supported: usize,
}

impl ScanProgress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f32 * 100.0 / self.total as f32
        }
    }
}

/// Handed to the terminal callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub outcome: ScanState,
    pub processed: usize,
    pub total: usize,
    pub supported: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Cloneable cancel switch, honoured between batches only.
#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    cancelled: Arc<AtomicBool>,
}

impl ScanControl {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Caller-owned state for one detection run.
///
/// The store is shared through an `Arc` so a display layer can take
/// snapshots while the scan is running.
#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    store: Arc<ResultStore>,
    state: ScanState,
    control: ScanControl,
}

impl ScanSession {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            config,
            store: Arc::new(ResultStore::new()),
            state: ScanState::Idle,
            control: ScanControl::default(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<ResultStore> {
        Arc::clone(&self.store)
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn control(&self) -> ScanControl {
        self.control.clone()
    }

    /// Enumerate, deduplicate and classify candidates, seeding the store.
    ///
    /// Returns the number of distinct candidates. An enumeration failure leaves
    /// the store empty and comes back as the error; callers report it.
    pub fn ingest(&mut self, source: &dyn CandidateSource) -> Result<usize, ScanError> {
        if self.state != ScanState::Idle {
            return Err(ScanError::InvalidState {
                state: self.state.as_str(),
            });
        }

        let candidates = match source.enumerate() {
            Ok(found) => dedup_candidates(found),
            Err(reason) => {
                log::debug!("enumeration failed, store left empty");
                return Err(ScanError::Enumeration { reason });
            }
        };

        let mut added = 0;
        for candidate in candidates {
            let verdict = classify(&candidate.identity);
            if self.store.insert(candidate, verdict) {
                added += 1;
            }
        }

        log::info!(
            "ingested {added} candidates, {} resolved by name",
            self.store.count_supported()
        );
        Ok(self.store.len())
    }

    /// Verify every still-unknown candidate with `comparator`.
    ///
    /// `on_batch` runs after each batch; `on_done` runs exactly once when the
    /// scan completes or is cancelled. Between batches the task yields so other
    /// work on the same executor gets a turn.
    pub async fn start_scan<L, S, B, D>(
        &mut self,
        comparator: &mut Comparator<L, S>,
        mut on_batch: B,
        on_done: D,
    ) -> Result<ScanSummary, ScanError>
    where
        L: FontLoader,
        S: Surface,
        B: FnMut(ScanProgress),
        D: FnOnce(ScanSummary),
    {
        if self.state != ScanState::Idle {
            return Err(ScanError::InvalidState {
                state: self.state.as_str(),
            });
        }
        self.state = ScanState::Running;

        let started = Instant::now();
        let pending = self.store.pending();
        let total = pending.len();
        let batch_size = self.config.batch_size;
        let px = comparator.config().glyph_px;
        let mut processed = 0;
        let mut batches = 0;

        log::info!("scanning {total} unresolved candidates in batches of {batch_size}");

        for batch in pending.chunks(batch_size) {
            if self.control.is_cancelled() {
                self.state = ScanState::Cancelled;
                break;
            }

            let readiness = join_all(
                batch
                    .iter()
                    .map(|c| comparator.loader().ensure_ready(&c.identity, px)),
            )
            .await;
            let not_ready = readiness.iter().filter(|r| r.is_err()).count();
            if not_ready > 0 {
                log::debug!("{not_ready} of {} fonts did not become ready", batch.len());
            }

            let mut newly_found_supported = 0;
            for candidate in batch {
                let verdict = comparator.compare(&candidate.identity).await;
                if self.store.set_if_unknown(&candidate.identity, verdict)
                    && verdict == Verdict::Supported
                {
                    newly_found_supported += 1;
                }
            }

            processed += batch.len();
            batches += 1;
            on_batch(ScanProgress {
                processed,
                total,
                newly_found_supported,
            });

            if processed < total {
                self.yield_between_batches().await;
            }
        }

        if self.state == ScanState::Running {
            self.state = ScanState::Complete;
        }

        let summary = ScanSummary {
            outcome: self.state,
            processed,
            total,
            supported: self.store.count_supported(),
            batches,
            elapsed: started.elapsed(),
        };
        log::info!(
            "scan {} after {processed}/{total} candidates, {} supported",
            summary.outcome.as_str(),
            summary.supported
        );
        on_done(summary);
        Ok(summary)
    }

    async fn yield_between_batches(&self) {
        let delay = self.config.yield_delay();
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}
