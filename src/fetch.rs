//! Per-screen fetch coordination.
//!
//! Filtered list fetches race with user input: a screen that fires a new
//! fetch must abort the still-pending previous one, and a late response
//! must never overwrite newer state. Each screen owns a [`FetchGate`];
//! every fetch goes through a ticket from [`FetchGate::begin`], which
//! cancels the in-flight predecessor and stamps a generation. A result is
//! applied only while its generation is still current. This supersede
//! rule is the only ordering guarantee in the system; there is no retry.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct FetchGate {
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

impl FetchGate {
    pub fn new() -> FetchGate {
        FetchGate::default()
    }

    /// Cancel whatever is in flight and open a ticket for a new fetch.
    pub fn begin(&self) -> FetchTicket<'_> {
        let token = CancellationToken::new();
        let generation = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        FetchTicket {
            gate: self,
            generation,
            token,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Handle for one fetch attempt. Dropping the future passed to [`run`]
/// aborts the underlying request.
///
/// [`run`]: FetchTicket::run
pub struct FetchTicket<'a> {
    gate: &'a FetchGate,
    generation: u64,
    token: CancellationToken,
}

impl FetchTicket<'_> {
    /// Drive the request to completion unless a newer fetch supersedes
    /// it first. Returns `None` when cancelled mid-flight or when the
    /// result arrives stale.
    pub async fn run<T>(&self, request: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            out = request => self.gate.is_current(self.generation).then_some(out),
        }
    }

    pub fn is_current(&self) -> bool {
        self.gate.is_current(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn newer_fetch_supersedes_older() {
        let gate = FetchGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.run(async { 1 }).await, None);
        assert_eq!(second.run(async { 2 }).await, Some(2));
    }

    #[tokio::test]
    async fn in_flight_fetch_is_cancelled_by_a_newer_one() {
        let gate = FetchGate::new();
        let first = gate.begin();

        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            "stale"
        };
        let (stale, fresh) = tokio::join!(first.run(slow), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            gate.begin().run(async { "fresh" }).await
        });

        assert_eq!(stale, None);
        assert_eq!(fresh, Some("fresh"));
    }

    #[tokio::test]
    async fn single_fetch_completes_normally() {
        let gate = FetchGate::new();
        let ticket = gate.begin();
        assert_eq!(ticket.run(async { 7 }).await, Some(7));
        assert!(ticket.is_current());
    }
}
