//! Navigation controller with a cancellable delayed redirect
//!
//! A failed token refresh sends the user back to the login view after a short
//! delay so the error notification can be read first. The pending redirect is
//! owned here and any competing navigation cancels it.

use roombook_core::{Route, Session};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Performs the actual view change
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only logs where it would have gone
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(%route, "navigating");
    }
}

/// Owner of the single pending redirect
pub struct NavigationController {
    navigator: Arc<dyn Navigator>,
    session: Option<Session>,
    pending: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("has_pending", &self.has_pending())
            .finish_non_exhaustive()
    }
}

impl NavigationController {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            session: None,
            pending: Mutex::new(None),
        }
    }

    /// Clear this session's credentials whenever a login redirect fires
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Navigate now, cancelling any pending redirect
    pub fn navigate(&self, route: Route) {
        self.cancel_pending();
        self.navigator.navigate(route);
    }

    /// Navigate to `route` after `delay`, replacing any pending redirect.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_redirect(&self, route: Route, delay: Duration) -> RedirectHandle {
        let token = CancellationToken::new();
        if let Ok(mut pending) = self.pending.lock()
            && let Some(previous) = pending.replace(token.clone())
        {
            previous.cancel();
        }

        let navigator = Arc::clone(&self.navigator);
        let session = if route == Route::Login {
            self.session.clone()
        } else {
            None
        };
        let task_token = token.clone();

        tracing::debug!(%route, delay_ms = delay.as_millis(), "redirect scheduled");
        let task = tokio::spawn(async move {
            let fired = tokio::select! {
                biased;
                () = task_token.cancelled() => false,
                () = tokio::time::sleep(delay) => true,
            };

            if fired {
                if let Some(session) = session
                    && let Err(e) = session.clear()
                {
                    tracing::warn!("Failed to clear credentials before redirect: {e}");
                }
                navigator.navigate(route);
                // Retire the token so the slot no longer reports a pending redirect
                task_token.cancel();
            } else {
                tracing::debug!(%route, "redirect cancelled");
            }
            fired
        });

        RedirectHandle { token, task }
    }

    /// Cancel the pending redirect, if any
    pub fn cancel_pending(&self) {
        if let Ok(mut pending) = self.pending.lock()
            && let Some(token) = pending.take()
        {
            token.cancel();
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.as_ref().is_some_and(|token| !token.is_cancelled()))
            .unwrap_or(false)
    }
}

/// Handle to a scheduled redirect
#[derive(Debug)]
pub struct RedirectHandle {
    token: CancellationToken,
    task: JoinHandle<bool>,
}

impl RedirectHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the redirect to settle; `true` if it navigated
    pub async fn wait(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use roombook_core::TokenPair;

    #[tokio::test(start_paused = true)]
    async fn redirect_fires_after_delay() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Login))
            .times(1)
            .return_const(());

        let controller = NavigationController::new(Arc::new(navigator));
        let handle = controller.schedule_redirect(Route::Login, Duration::from_millis(1500));
        assert!(controller.has_pending());

        assert!(handle.wait().await);
        assert!(!controller.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn redirect_waits_for_full_delay() {
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().times(1).return_const(());

        let controller = NavigationController::new(Arc::new(navigator));
        let _handle = controller.schedule_redirect(Route::Login, Duration::from_millis(1500));

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(controller.has_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert!(!controller.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn competing_navigation_cancels_redirect() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::UserManage))
            .times(1)
            .return_const(());

        let controller = NavigationController::new(Arc::new(navigator));
        let handle = controller.schedule_redirect(Route::Login, Duration::from_millis(1500));
        controller.navigate(Route::UserManage);

        assert!(!handle.wait().await);
        assert!(!controller.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_redirect() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Login))
            .times(1)
            .return_const(());

        let controller = NavigationController::new(Arc::new(navigator));
        let first = controller.schedule_redirect(Route::Login, Duration::from_millis(1500));
        let second = controller.schedule_redirect(Route::Login, Duration::from_millis(1500));

        assert!(!first.wait().await);
        assert!(second.wait().await);
    }

    #[tokio::test(start_paused = true)]
    async fn login_redirect_clears_credentials() {
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().return_const(());

        let session = Session::in_memory();
        session
            .store_tokens(&TokenPair {
                access_token: "a".into(),
                refresh_token: "r".into(),
            })
            .unwrap();

        let controller =
            NavigationController::new(Arc::new(navigator)).with_session(session.clone());
        let handle = controller.schedule_redirect(Route::Login, Duration::from_millis(10));

        assert!(handle.wait().await);
        assert_eq!(session.access_token().unwrap(), None);
        assert_eq!(session.refresh_token().unwrap(), None);
    }
}
