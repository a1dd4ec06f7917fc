//! Bounded, ordered, concurrent blob retrieval.
//!
//! [`retrieve_batch`] fetches a matched set of blob identities through a
//! caller-supplied fetch function while honoring a [`RetrievalBudget`]:
//!
//! 1. At most `window` fetches are in flight at once (default 32).
//! 2. Identities are admitted in match order. Admission stops once a
//!    nonzero `max_results` is covered by completed plus in-flight fetches,
//!    or once completed bytes have reached `max_total_bytes`.
//! 3. The byte budget is checked at completion boundaries only: fetches
//!    already in flight run to completion and keep their results, so the
//!    budget can be overshot by at most one window's worth of payloads.
//!    Blob sizes are unknown until a fetch completes, which rules out an
//!    exact admission-time check.
//! 4. Results are reassembled into match order regardless of completion
//!    order.
//! 5. A failed fetch is recorded per identity and never aborts the batch.

use std::future::Future;

use futures::stream::{FuturesOrdered, StreamExt};
use tracing::{debug, warn};

use crate::error::VaultError;
use crate::models::BlobId;

/// Concurrency window applied when a budget does not specify one.
pub const DEFAULT_WINDOW: usize = 32;

/// Resource bounds for one retrieval call.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalBudget {
    /// Maximum number of blobs to return; 0 means unbounded.
    pub max_results: usize,
    /// Byte budget over the sum of returned payload sizes; 0 disables the
    /// bound. Enforced at completion boundaries (see module docs).
    pub max_total_bytes: u64,
    /// Maximum concurrently in-flight fetches; 0 selects [`DEFAULT_WINDOW`].
    pub window: usize,
}

impl RetrievalBudget {
    pub fn new(max_results: usize, max_total_bytes: u64, window: usize) -> Self {
        Self {
            max_results,
            max_total_bytes,
            window,
        }
    }

    /// The concurrency window actually applied.
    pub fn effective_window(&self) -> usize {
        if self.window == 0 {
            DEFAULT_WINDOW
        } else {
            self.window
        }
    }
}

/// One successfully fetched blob.
#[derive(Debug, Clone)]
pub struct RetrievedBlob {
    pub id: BlobId,
    pub bytes: Vec<u8>,
}

/// One fetch that failed inside a batch.
#[derive(Debug)]
pub struct FetchFailure {
    pub id: BlobId,
    pub error: VaultError,
}

/// Outcome of one retrieval call: fetched blobs in match order, plus the
/// per-identity failures so callers can report partial success.
#[derive(Debug, Default)]
pub struct RetrievalReport {
    pub blobs: Vec<RetrievedBlob>,
    pub failures: Vec<FetchFailure>,
    /// Sum of the returned payload sizes in bytes.
    pub total_bytes: u64,
}

/// Fetch `identities` under `budget`, preserving input order in the output.
///
/// `fetch` is the external blob-fetch primitive; it is invoked at most
/// `budget.effective_window()` times concurrently. The returned report
/// keeps every completed payload, including those that finished after the
/// byte budget was crossed mid-batch.
pub async fn retrieve_batch<F, Fut>(
    identities: Vec<BlobId>,
    budget: &RetrievalBudget,
    fetch: F,
) -> RetrievalReport
where
    F: Fn(BlobId) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, VaultError>>,
{
    let window = budget.effective_window();
    let mut report = RetrievalReport::default();
    let mut pending = identities.into_iter();
    let mut in_flight = FuturesOrdered::new();
    let mut byte_budget_hit = false;

    debug!(
        window,
        max_results = budget.max_results,
        max_total_bytes = budget.max_total_bytes,
        "starting bounded retrieval"
    );

    loop {
        // Admit identities until the window is full or a bound trips.
        while in_flight.len() < window && !byte_budget_hit {
            if budget.max_results > 0
                && report.blobs.len() + in_flight.len() >= budget.max_results
            {
                break;
            }
            let Some(id) = pending.next() else { break };
            let fut = fetch(id.clone());
            in_flight.push_back(async move { (id, fut.await) });
        }

        // FuturesOrdered yields completions in admission order, which is
        // what reassembles the output into match order.
        let Some((id, outcome)) = in_flight.next().await else {
            break;
        };
        match outcome {
            Ok(bytes) => {
                report.total_bytes += bytes.len() as u64;
                report.blobs.push(RetrievedBlob { id, bytes });
                if budget.max_total_bytes > 0 && report.total_bytes >= budget.max_total_bytes {
                    byte_budget_hit = true;
                }
            }
            Err(error) => {
                warn!(blob = %id, %error, "fetch failed, continuing batch");
                report.failures.push(FetchFailure { id, error });
            }
        }
    }

    debug!(
        fetched = report.blobs.len(),
        failed = report.failures.len(),
        total_bytes = report.total_bytes,
        "retrieval complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn ids(n: usize) -> Vec<BlobId> {
        (0..n).map(|i| BlobId::new("ctx", format!("b{i:03}"))).collect()
    }

    #[test]
    fn test_default_window_applies_when_unspecified() {
        let budget = RetrievalBudget::new(0, 0, 0);
        assert_eq!(budget.effective_window(), DEFAULT_WINDOW);
        assert_eq!(RetrievalBudget::new(0, 0, 8).effective_window(), 8);
    }

    #[tokio::test]
    async fn test_unbounded_budget_fetches_everything_in_order() {
        let input = ids(10);
        let report = retrieve_batch(input.clone(), &RetrievalBudget::new(0, 0, 4), |id| async move {
            Ok(id.name.clone().into_bytes())
        })
        .await;
        assert!(report.failures.is_empty());
        let out: Vec<BlobId> = report.blobs.iter().map(|b| b.id.clone()).collect();
        assert_eq!(out, input);
        assert_eq!(report.total_bytes, 10 * 4);
    }

    #[tokio::test]
    async fn test_order_preserved_under_out_of_order_completion() {
        // Earlier identities finish later; the report must still be in
        // admission order.
        let input = ids(6);
        let report = retrieve_batch(input.clone(), &RetrievalBudget::new(0, 0, 6), |id| async move {
            let rank: u64 = id.name[1..].parse().unwrap();
            tokio::time::sleep(Duration::from_millis(30 - 5 * rank)).await;
            Ok(vec![rank as u8])
        })
        .await;
        let out: Vec<BlobId> = report.blobs.iter().map(|b| b.id.clone()).collect();
        assert_eq!(out, input);
    }

    #[tokio::test]
    async fn test_max_results_bounds_the_count() {
        let report = retrieve_batch(ids(20), &RetrievalBudget::new(3, 0, 4), |id| async move {
            Ok(id.name.into_bytes())
        })
        .await;
        assert_eq!(report.blobs.len(), 3);
        let out: Vec<&str> = report.blobs.iter().map(|b| b.id.name.as_str()).collect();
        assert_eq!(out, vec!["b000", "b001", "b002"]);
    }

    #[tokio::test]
    async fn test_byte_budget_stops_admission_at_completion_boundary() {
        // 10-byte payloads, 25-byte budget, serial window: the third
        // completion crosses the budget, nothing further is admitted.
        let fetched = Arc::new(AtomicUsize::new(0));
        let fetched_in = fetched.clone();
        let report = retrieve_batch(ids(10), &RetrievalBudget::new(0, 25, 1), move |_id| {
            let fetched = fetched_in.clone();
            async move {
                fetched.fetch_add(1, Ordering::SeqCst);
                Ok(vec![0u8; 10])
            }
        })
        .await;
        assert_eq!(report.blobs.len(), 3);
        assert_eq!(report.total_bytes, 30);
        assert_eq!(fetched.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_byte_budget_overshoot_is_at_most_one_window() {
        // Budget covers one payload, but a window of 4 is already in
        // flight when the first completion crosses it: all 4 are kept,
        // and no fifth fetch is admitted.
        let report = retrieve_batch(ids(12), &RetrievalBudget::new(0, 10, 4), |_id| async move {
            Ok(vec![0u8; 10])
        })
        .await;
        assert_eq!(report.blobs.len(), 4);
        assert_eq!(report.total_bytes, 40);
    }

    #[tokio::test]
    async fn test_window_bounds_in_flight_fetches() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (c, p) = (current.clone(), peak.clone());
        let report = retrieve_batch(ids(16), &RetrievalBudget::new(0, 0, 3), move |_id| {
            let (current, peak) = (c.clone(), p.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(vec![1u8])
            }
        })
        .await;
        assert_eq!(report.blobs.len(), 16);
        assert!(
            peak.load(Ordering::SeqCst) <= 3,
            "window exceeded: {} fetches in flight",
            peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_isolated() {
        let input = ids(5);
        let report = retrieve_batch(input, &RetrievalBudget::new(0, 0, 2), |id| async move {
            if id.name == "b002" {
                Err(VaultError::BlobNotFound(id))
            } else {
                Ok(id.name.into_bytes())
            }
        })
        .await;
        assert_eq!(report.blobs.len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id.name, "b002");
        let out: Vec<&str> = report.blobs.iter().map(|b| b.id.name.as_str()).collect();
        assert_eq!(out, vec!["b000", "b001", "b003", "b004"]);
    }

    #[tokio::test]
    async fn test_failures_do_not_consume_the_result_bound() {
        // Three of the first four fetches fail; with max_results = 3 the
        // retriever keeps admitting until three successes are in hand.
        let report = retrieve_batch(ids(8), &RetrievalBudget::new(3, 0, 1), |id| async move {
            let rank: usize = id.name[1..].parse().unwrap();
            if rank < 4 && rank != 1 {
                Err(VaultError::BlobNotFound(id))
            } else {
                Ok(id.name.into_bytes())
            }
        })
        .await;
        assert_eq!(report.blobs.len(), 3);
        let out: Vec<&str> = report.blobs.iter().map(|b| b.id.name.as_str()).collect();
        assert_eq!(out, vec!["b001", "b004", "b005"]);
        assert_eq!(report.failures.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_report() {
        let report = retrieve_batch(Vec::new(), &RetrievalBudget::new(0, 0, 0), |id| async move {
            Ok(id.name.into_bytes())
        })
        .await;
        assert!(report.blobs.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.total_bytes, 0);
    }
}
