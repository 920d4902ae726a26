//! Polling for a condition on the live tree.
//!
//! The [`Poller`] only observes: each attempt fetches a fresh snapshot from
//! the driver, runs the finder through a [`ConditionChecker`], and sleeps a
//! short interval before retrying. It never scrolls or otherwise mutates the
//! screen. At least one attempt is made even with a zero budget.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::driver::Driver;
use crate::element::UiElement;
use crate::finder::{Finder, FinderRef};
use crate::result::{SeekError, SeekResult};

/// Default sleep between attempts (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// CONDITIONS
// =============================================================================

/// What a poll waits for
pub trait ConditionChecker {
    /// Value produced once the condition holds
    type Output;

    /// Evaluate once against `root`.
    ///
    /// `Ok(None)` means "not yet" and the poller retries; errors abort the
    /// poll immediately.
    fn check(&self, root: &UiElement, finder: &dyn Finder) -> SeekResult<Option<Self::Output>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Holds once the finder resolves; yields the element
#[derive(Debug, Clone, Copy, Default)]
pub struct Exists;

/// Holds once the finder no longer resolves
#[derive(Debug, Clone, Copy, Default)]
pub struct Gone;

/// Shorthand for [`Exists`]
pub const EXISTS: Exists = Exists;

/// Shorthand for [`Gone`]
pub const GONE: Gone = Gone;

impl ConditionChecker for Exists {
    type Output = UiElement;

    fn check(&self, root: &UiElement, finder: &dyn Finder) -> SeekResult<Option<UiElement>> {
        match finder.find(root) {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "exists"
    }
}

impl ConditionChecker for Gone {
    type Output = ();

    fn check(&self, root: &UiElement, finder: &dyn Finder) -> SeekResult<Option<()>> {
        match finder.find(root) {
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(Some(())),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "gone"
    }
}

// =============================================================================
// LISTENERS
// =============================================================================

/// Invoked before every retry (not before the first attempt)
pub trait PollingListener: Send + Sync {
    /// Called with the finder being polled for
    fn on_polling(&self, finder: &dyn Finder);
}

/// Invoked once when a poll runs out of time
pub trait TimeoutListener: Send + Sync {
    /// Called with the finder that was not satisfied
    fn on_timeout(&self, finder: &dyn Finder);
}

/// Identifies a registered listener for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Registry<L> = RwLock<Vec<(ListenerHandle, Arc<L>)>>;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for a [`Poller`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOptions {
    /// Sleep between attempts in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PollOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Polling interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Repeats a condition check against fresh snapshots until it holds or time runs out
#[derive(Default)]
pub struct Poller {
    options: PollOptions,
    next_handle: AtomicU64,
    polling_listeners: Registry<dyn PollingListener>,
    timeout_listeners: Registry<dyn TimeoutListener>,
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("options", &self.options)
            .field("polling_listeners", &self.polling_listener_count())
            .field("timeout_listeners", &self.timeout_listener_count())
            .finish()
    }
}

impl Poller {
    /// Create a poller with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub fn with_options(options: PollOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current options
    #[must_use]
    pub const fn options(&self) -> &PollOptions {
        &self.options
    }

    fn handle(&self) -> ListenerHandle {
        ListenerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a listener run before each retry
    pub fn add_polling_listener(&self, listener: Arc<dyn PollingListener>) -> ListenerHandle {
        let handle = self.handle();
        self.polling_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((handle, listener));
        handle
    }

    /// Register a listener run when a poll times out
    pub fn add_timeout_listener(&self, listener: Arc<dyn TimeoutListener>) -> ListenerHandle {
        let handle = self.handle();
        self.timeout_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((handle, listener));
        handle
    }

    /// Remove a listener of either kind; returns whether it was registered
    pub fn remove_listener(&self, handle: ListenerHandle) -> bool {
        let mut removed = false;
        self.polling_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(h, _)| {
                let keep = *h != handle;
                removed |= !keep;
                keep
            });
        self.timeout_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(h, _)| {
                let keep = *h != handle;
                removed |= !keep;
                keep
            });
        removed
    }

    /// Number of registered polling listeners
    #[must_use]
    pub fn polling_listener_count(&self) -> usize {
        self.polling_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of registered timeout listeners
    #[must_use]
    pub fn timeout_listener_count(&self) -> usize {
        self.timeout_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify_polling(&self, finder: &dyn Finder) {
        let listeners = self
            .polling_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (_, listener) in listeners {
            listener.on_polling(finder);
        }
    }

    fn notify_timeout(&self, finder: &dyn Finder) {
        let listeners = self
            .timeout_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (_, listener) in listeners {
            listener.on_timeout(finder);
        }
    }

    /// Poll until `checker` holds for `finder` or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`SeekError::Timeout`] carrying `finder` when the budget runs out;
    /// tree-provider and other hard errors are returned as soon as they occur.
    pub fn poll_for<D, C>(
        &self,
        driver: &D,
        finder: &FinderRef,
        checker: &C,
        timeout: Duration,
    ) -> SeekResult<C::Output>
    where
        D: Driver + ?Sized,
        C: ConditionChecker,
    {
        self.poll_every(driver, finder, checker, timeout, self.options.poll_interval())
    }

    /// Like [`Poller::poll_for`], sleeping `interval` between attempts
    /// instead of the configured interval. Registered listeners still fire.
    ///
    /// # Errors
    ///
    /// Same as [`Poller::poll_for`].
    pub fn poll_every<D, C>(
        &self,
        driver: &D,
        finder: &FinderRef,
        checker: &C,
        timeout: Duration,
        interval: Duration,
    ) -> SeekResult<C::Output>
    where
        D: Driver + ?Sized,
        C: ConditionChecker,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if attempts > 0 {
                self.notify_polling(finder.as_ref());
            }
            attempts += 1;

            let root = driver.current_root()?;
            if let Some(output) = checker.check(&root, finder.as_ref())? {
                debug!(
                    condition = checker.name(),
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "poll satisfied for {finder}"
                );
                return Ok(output);
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                break;
            }
            trace!(condition = checker.name(), attempts, "poll retrying for {finder}");
            std::thread::sleep(interval.min(timeout - elapsed));
        }

        debug!(
            condition = checker.name(),
            attempts,
            timeout_ms = timeout.as_millis() as u64,
            "poll timed out for {finder}"
        );
        self.notify_timeout(finder.as_ref());
        Err(SeekError::Timeout {
            finder: Arc::clone(finder),
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::UiDriver;
    use crate::element::{NodeSpec, UiTree};
    use crate::finder::By;
    use crate::testing::{FakeScreen, RecordingListener};

    fn driver_with(items: usize, visible: usize, interval_ms: u64) -> UiDriver<Arc<FakeScreen>, Arc<FakeScreen>> {
        let screen = Arc::new(FakeScreen::with_items(items, visible));
        UiDriver::new(screen.clone(), screen)
            .with_poller(Poller::with_options(PollOptions::new().with_poll_interval(interval_ms)))
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_poll_options_default() {
            let opts = PollOptions::default();
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert_eq!(opts.poll_interval(), Duration::from_millis(100));
        }

        #[test]
        fn test_poll_options_builder() {
            let opts = PollOptions::new().with_poll_interval(5);
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
        }
    }

    mod condition_tests {
        use super::*;

        fn root() -> UiElement {
            UiTree::from_spec(NodeSpec::new("Root").with_child(NodeSpec::new("Button").with_text("OK")))
                .root()
        }

        #[test]
        fn test_exists() {
            let found = EXISTS.check(&root(), &By::text("OK")).unwrap();
            assert_eq!(found.unwrap().text(), Some("OK"));
            assert!(EXISTS.check(&root(), &By::text("Cancel")).unwrap().is_none());
        }

        #[test]
        fn test_gone() {
            assert!(GONE.check(&root(), &By::text("OK")).unwrap().is_none());
            assert!(GONE.check(&root(), &By::text("Cancel")).unwrap().is_some());
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_immediate_success_uses_one_snapshot() {
            let driver = driver_with(5, 3, 10);
            let finder = By::text("Item 1").into_ref();
            let found = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::from_millis(500))
                .unwrap();
            assert_eq!(found.text(), Some("Item 1"));
            assert_eq!(driver.provider().snapshot_count(), 1);
        }

        #[test]
        fn test_zero_timeout_still_attempts_once() {
            let driver = driver_with(5, 3, 10);
            let finder = By::text("Item 5").into_ref();
            let err = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::ZERO)
                .unwrap_err();
            match err {
                SeekError::Timeout { finder, timeout_ms } => {
                    assert_eq!(timeout_ms, 0);
                    assert_eq!(finder.to_string(), "text == \"Item 5\"");
                }
                other => panic!("Expected Timeout, got {other:?}"),
            }
            assert_eq!(driver.provider().snapshot_count(), 1);
        }

        #[test]
        fn test_timeout_retries_until_budget() {
            let driver = driver_with(5, 3, 10);
            let finder = By::text("Item 5").into_ref();
            let start = Instant::now();
            let result = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::from_millis(60));
            assert!(result.unwrap_err().is_timeout());
            assert!(start.elapsed() >= Duration::from_millis(60));
            assert!(driver.provider().snapshot_count() >= 2);
        }

        #[test]
        fn test_poll_never_scrolls() {
            let driver = driver_with(5, 3, 5);
            let finder = By::text("Item 5").into_ref();
            let _ = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::from_millis(20));
            assert_eq!(driver.provider().scroll_count(), 0);
        }

        #[test]
        fn test_gone_condition() {
            let driver = driver_with(5, 3, 5);
            let finder = By::text("Item 9").into_ref();
            driver
                .poller()
                .poll_for(&driver, &finder, &GONE, Duration::ZERO)
                .unwrap();
        }

        #[test]
        fn test_provider_error_propagates_without_retry() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            screen.fail_snapshots(true);
            let driver = UiDriver::new(screen.clone(), screen.clone());
            let finder = By::text("Item 1").into_ref();
            let err = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::from_secs(5))
                .unwrap_err();
            assert!(matches!(err, SeekError::Provider { .. }));
        }
    }

    mod listener_tests {
        use super::*;

        #[test]
        fn test_listeners_fire() {
            let driver = driver_with(5, 3, 5);
            let listener = Arc::new(RecordingListener::default());
            driver.poller().add_polling_listener(listener.clone());
            driver.poller().add_timeout_listener(listener.clone());
            let finder = By::text("Item 5").into_ref();
            let _ = driver
                .poller()
                .poll_for(&driver, &finder, &EXISTS, Duration::from_millis(30));
            let polls = listener.polling_calls();
            assert!(polls >= 1);
            assert_eq!(polls, driver.provider().snapshot_count() - 1);
            assert_eq!(listener.timeout_calls(), 1);
        }

        #[test]
        fn test_poll_every_overrides_interval() {
            let driver = driver_with(5, 3, 1);
            let listener = Arc::new(RecordingListener::default());
            driver.poller().add_polling_listener(listener.clone());
            let finder = By::text("Item 5").into_ref();
            let err = driver
                .poller()
                .poll_every(
                    &driver,
                    &finder,
                    &EXISTS,
                    Duration::from_millis(50),
                    Duration::from_secs(10),
                )
                .unwrap_err();
            assert!(err.is_timeout());
            // one sleep clipped to the 50ms budget, then a final attempt
            assert_eq!(listener.polling_calls(), 1);
            assert_eq!(driver.provider().snapshot_count(), 2);
        }

        #[test]
        fn test_remove_listener() {
            let poller = Poller::new();
            let listener = Arc::new(RecordingListener::default());
            let a = poller.add_polling_listener(listener.clone());
            let b = poller.add_timeout_listener(listener);
            assert_ne!(a, b);
            assert!(poller.remove_listener(a));
            assert!(!poller.remove_listener(a));
            assert_eq!(poller.polling_listener_count(), 0);
            assert_eq!(poller.timeout_listener_count(), 1);
        }
    }
}
