//! Single-flight token refresh
//!
//! Requests that fail with an expired access token at the same time share one
//! refresh call. The slot holds the in-flight future until its first waiter
//! observes the outcome; later waiters hold their own clone of the shared
//! future and see the same result.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use roombook_core::{Session, TokenPair};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Why a refresh did not produce new credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// Transport status of the refresh response, if one arrived
    pub status: Option<u16>,
    pub message: String,
}

impl RefreshFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub type RefreshOutcome = Result<TokenPair, RefreshFailure>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// What a request that hit an expired token should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Credentials changed since the request was sent; replay right away
    AlreadyRefreshed,
    /// The joined (or started) refresh finished with this outcome
    Completed(RefreshOutcome),
}

#[derive(Default)]
pub struct RefreshFlight {
    slot: Mutex<Option<(u64, SharedRefresh)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RefreshFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshFlight")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl RefreshFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight refresh, or start one with `start`.
    ///
    /// `failed_token` is the access token the failing request carried. If the
    /// session already holds a different token, no refresh is needed. The
    /// check happens under the slot lock so a refresh that completes between
    /// the failure and this call is never repeated.
    pub async fn join<F>(
        &self,
        session: &Session,
        failed_token: Option<&str>,
        start: F,
    ) -> RefreshDecision
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let (id, flight) = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

            if let Some((id, flight)) = slot.as_ref() {
                (*id, flight.clone())
            } else {
                let current = session.access_token().ok().flatten();
                if current.is_some() && current.as_deref() != failed_token {
                    return RefreshDecision::AlreadyRefreshed;
                }

                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let flight = start().shared();
                *slot = Some((id, flight.clone()));
                (id, flight)
            }
        };

        let outcome = flight.await;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            *slot = None;
        }

        RefreshDecision::Completed(outcome)
    }

    pub fn in_flight(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn pair(access: &str) -> TokenPair {
        TokenPair {
            access_token: access.into(),
            refresh_token: format!("{access}-refresh"),
        }
    }

    fn counting_refresh(
        calls: &Arc<AtomicUsize>,
        session: &Session,
        outcome: RefreshOutcome,
    ) -> impl FnOnce() -> BoxFuture<'static, RefreshOutcome> {
        let calls = Arc::clone(calls);
        let session = session.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                if let Ok(tokens) = &outcome {
                    session.store_tokens(tokens).unwrap();
                }
                outcome
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_waiters_share_one_refresh() {
        let session = Session::in_memory();
        session.store_tokens(&pair("old")).unwrap();
        let flight = RefreshFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            flight.join(
                &session,
                Some("old"),
                counting_refresh(&calls, &session, Ok(pair("new")))
            ),
            flight.join(
                &session,
                Some("old"),
                counting_refresh(&calls, &session, Ok(pair("other")))
            ),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, RefreshDecision::Completed(Ok(pair("new"))));
        assert_eq!(b, RefreshDecision::Completed(Ok(pair("new"))));
        assert!(!flight.in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_shared_too() {
        let session = Session::in_memory();
        session.store_tokens(&pair("old")).unwrap();
        let flight = RefreshFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = RefreshFailure::new(Some(400), "refresh token expired");

        let (a, b) = tokio::join!(
            flight.join(
                &session,
                Some("old"),
                counting_refresh(&calls, &session, Err(failure.clone()))
            ),
            flight.join(
                &session,
                Some("old"),
                counting_refresh(&calls, &session, Err(failure.clone()))
            ),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, RefreshDecision::Completed(Err(failure.clone())));
        assert_eq!(b, RefreshDecision::Completed(Err(failure)));
    }

    #[tokio::test]
    async fn stale_token_skips_refresh() {
        let session = Session::in_memory();
        session.store_tokens(&pair("new")).unwrap();
        let flight = RefreshFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let decision = flight
            .join(
                &session,
                Some("old"),
                counting_refresh(&calls, &session, Ok(pair("newer"))),
            )
            .await;

        assert_eq!(decision, RefreshDecision::AlreadyRefreshed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_failures_refresh_again() {
        let session = Session::in_memory();
        session.store_tokens(&pair("t0")).unwrap();
        let flight = RefreshFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        flight
            .join(&session, Some("t0"), counting_refresh(&calls, &session, Ok(pair("t1"))))
            .await;
        flight
            .join(&session, Some("t1"), counting_refresh(&calls, &session, Ok(pair("t2"))))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("t2"));
    }
}
