//! Scroll-search.
//!
//! [`SentinelScroller`] looks for an item in the content currently shown by a
//! scrollable container; if it is not there, it scrolls one step and looks
//! again, until the item shows up, the [`SentinelStrategy`] reports that no
//! further scrolling is possible, or `max_scrolls` steps have been spent.
//!
//! ```text
//!  poll(item) ──found──► return element
//!      │ timeout
//!      ▼
//!  i < max_scrolls? ──no──► exhausted (warn) ──► not found
//!      │ yes
//!      ▼
//!  strategy.scroll() ──false──► end of content ──► not found
//!      │ true
//!      └────────► next poll
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ScrollerConfig;
use crate::direction::{LogicalDirection, PhysicalDirection};
use crate::driver::Driver;
use crate::element::UiElement;
use crate::finder::{By, Finder, FinderRef};
use crate::poller::EXISTS;
use crate::result::{SeekError, SeekResult};
use crate::sentinel::SentinelStrategy;

/// Locates items inside scrollable containers
pub trait Scroller: fmt::Debug + Send + Sync {
    /// Search for `item` (relative to `container`) scrolling only in `direction`.
    ///
    /// # Errors
    ///
    /// [`SeekError::ElementNotFound`] carrying the absolute item finder when
    /// the search ends without a match; container and provider errors as is.
    fn scroll_to_direction(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<UiElement>;

    /// Search for `item`, trying every direction of the configured axis in order.
    ///
    /// # Errors
    ///
    /// [`SeekError::ElementNotFound`] when every direction fails.
    fn scroll_to(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
    ) -> SeekResult<UiElement>;
}

// =============================================================================
// OBSERVER
// =============================================================================

/// Receives progress events from a scroll search
pub trait ScrollObserver: Send + Sync {
    /// A step moved the content
    fn on_scrolled(&self, _container: &dyn Finder, _direction: PhysicalDirection, _step: u32) {}

    /// The strategy reported that the content cannot move further
    fn on_end_of_content(
        &self,
        _container: &dyn Finder,
        _direction: PhysicalDirection,
        _scrolls: u32,
    ) {
    }

    /// `max_scrolls` steps were spent without reaching the end of content.
    ///
    /// Usually means `max_scrolls` is too small or the strategy's end
    /// detection is wrong. Not raised when `max_scrolls` is zero, since no
    /// step was ever allowed.
    fn on_exhausted(
        &self,
        _container: &dyn Finder,
        _direction: PhysicalDirection,
        _max_scrolls: u32,
        _strategy: &dyn SentinelStrategy,
    ) {
    }
}

/// Writes scroll progress to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScrollObserver for TracingObserver {
    fn on_scrolled(&self, container: &dyn Finder, direction: PhysicalDirection, step: u32) {
        debug!(%direction, step, "scrolled {container}");
    }

    fn on_end_of_content(&self, container: &dyn Finder, direction: PhysicalDirection, scrolls: u32) {
        debug!(%direction, scrolls, "reached end of {container}");
    }

    fn on_exhausted(
        &self,
        container: &dyn Finder,
        direction: PhysicalDirection,
        max_scrolls: u32,
        strategy: &dyn SentinelStrategy,
    ) {
        warn!(
            %direction,
            max_scrolls,
            "scrolled {container} {max_scrolls} times without reaching the end; strategy={strategy:?}"
        );
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// How a single-direction search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The item was found
    Found(UiElement),
    /// The strategy reported no further scrolling possible
    EndOfContent,
    /// `max_scrolls` steps were spent
    Exhausted,
}

/// Metadata of a single-direction search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    /// Direction scrolled
    pub direction: PhysicalDirection,
    /// Scroll steps issued
    pub scrolls: u32,
    /// Poll attempts made
    pub polls: u32,
    /// How the search ended
    pub outcome: SearchOutcome,
}

impl ScrollReport {
    /// The found element, if any
    #[must_use]
    pub const fn element(&self) -> Option<&UiElement> {
        match &self.outcome {
            SearchOutcome::Found(element) => Some(element),
            _ => None,
        }
    }

    /// True if the item was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }
}

// =============================================================================
// SENTINEL SCROLLER
// =============================================================================

/// [`Scroller`] driven by a [`SentinelStrategy`]
pub struct SentinelScroller {
    config: ScrollerConfig,
    strategy: Arc<dyn SentinelStrategy>,
    observer: Arc<dyn ScrollObserver>,
}

impl fmt::Debug for SentinelScroller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelScroller")
            .field("config", &self.config)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl SentinelScroller {
    /// Scroller with default configuration (100 scrolls, 1s per poll, vertical)
    pub fn new(strategy: impl SentinelStrategy + 'static) -> Self {
        Self::build(ScrollerConfig::default(), strategy)
    }

    /// Scroller with explicit configuration.
    ///
    /// Polls between scrolls sleep `config.poll_interval_ms`, overriding the
    /// driver poller's own interval; the driver poller's listeners still fire.
    ///
    /// # Errors
    ///
    /// [`SeekError::Config`] if `config` fails [`ScrollerConfig::validate`].
    pub fn with_config(
        config: ScrollerConfig,
        strategy: impl SentinelStrategy + 'static,
    ) -> SeekResult<Self> {
        config.validate()?;
        Ok(Self::build(config, strategy))
    }

    fn build(config: ScrollerConfig, strategy: impl SentinelStrategy + 'static) -> Self {
        Self {
            config,
            strategy: Arc::new(strategy),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ScrollObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    /// Run one single-direction search and report how it went.
    ///
    /// Only hard errors (container, provider, executor) are returned as
    /// `Err`; a missing item is an `Ok` report with a non-found outcome.
    pub fn search(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<ScrollReport> {
        let absolute = absolute_finder(container, item);
        self.search_absolute(driver, container, &absolute, direction)
    }

    fn search_absolute(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        absolute: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<ScrollReport> {
        let max_scrolls = self.config.max_scrolls;
        let timeout = self.config.per_scroll_timeout();
        let interval = self.config.poll_options().poll_interval();
        let mut scrolls = 0;
        let mut polls = 0;

        for i in 0..=max_scrolls {
            polls += 1;
            let poll = driver
                .poller()
                .poll_every(driver, absolute, &EXISTS, timeout, interval);
            match poll {
                Ok(element) => {
                    debug!(%direction, scrolls, polls, "found {absolute}");
                    return Ok(ScrollReport {
                        direction,
                        scrolls,
                        polls,
                        outcome: SearchOutcome::Found(element),
                    });
                }
                Err(e) if e.is_timeout() => {}
                Err(e) => return Err(e),
            }

            if i < max_scrolls {
                scrolls += 1;
                if !self.strategy.scroll(driver, container, direction)? {
                    self.observer
                        .on_end_of_content(container.as_ref(), direction, scrolls);
                    return Ok(ScrollReport {
                        direction,
                        scrolls,
                        polls,
                        outcome: SearchOutcome::EndOfContent,
                    });
                }
                self.observer.on_scrolled(container.as_ref(), direction, scrolls);
            }
        }

        if max_scrolls > 0 {
            self.observer.on_exhausted(
                container.as_ref(),
                direction,
                max_scrolls,
                self.strategy.as_ref(),
            );
        }
        Ok(ScrollReport {
            direction,
            scrolls,
            polls,
            outcome: SearchOutcome::Exhausted,
        })
    }

    fn find_in(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        absolute: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<UiElement> {
        let report = self.search_absolute(driver, container, absolute, direction)?;
        match report.outcome {
            SearchOutcome::Found(element) => Ok(element),
            SearchOutcome::EndOfContent | SearchOutcome::Exhausted => {
                Err(SeekError::not_found(Arc::clone(absolute)))
            }
        }
    }

    /// Search in the physical direction `logical` maps to on the configured axis.
    ///
    /// # Errors
    ///
    /// Same as [`Scroller::scroll_to_direction`].
    pub fn scroll_to_logical(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
        logical: LogicalDirection,
    ) -> SeekResult<UiElement> {
        let direction = self
            .config
            .converter
            .to_physical(self.config.axis, logical);
        self.scroll_to_direction(driver, container, item, direction)
    }
}

fn absolute_finder(container: &FinderRef, item: &FinderRef) -> FinderRef {
    By::chain(Arc::clone(container), Arc::clone(item)).into_ref()
}

impl Scroller for SentinelScroller {
    fn scroll_to_direction(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<UiElement> {
        let absolute = absolute_finder(container, item);
        self.find_in(driver, container, &absolute, direction)
    }

    fn scroll_to(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        item: &FinderRef,
    ) -> SeekResult<UiElement> {
        // Each direction starts wherever the previous one left the container.
        let absolute = absolute_finder(container, item);
        for &direction in self.config.axis.physical_directions() {
            match self.find_in(driver, container, &absolute, direction) {
                Ok(element) => return Ok(element),
                Err(e) if e.is_not_found() => {
                    debug!(%direction, "not found scrolling {direction}; trying next direction");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SeekError::not_found(absolute))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::direction::Axis;
    use crate::driver::UiDriver;
    use crate::finder::By;
    use crate::sentinel::ChildSentinelStrategy;
    use crate::testing::{FakeScreen, RecordingObserver, ScriptedStrategy};

    type FakeDriver = UiDriver<Arc<FakeScreen>, Arc<FakeScreen>>;

    fn driver_for(screen: &Arc<FakeScreen>) -> FakeDriver {
        UiDriver::new(screen.clone(), screen.clone())
    }

    fn config(max_scrolls: u32) -> ScrollerConfig {
        ScrollerConfig::new()
            .with_max_scrolls(max_scrolls)
            .with_per_scroll_timeout(0)
    }

    fn list() -> FinderRef {
        By::resource_id(FakeScreen::LIST_ID).into_ref()
    }

    fn item(n: usize) -> FinderRef {
        By::text(FakeScreen::item_text(n)).into_ref()
    }

    mod config_tests {
        use super::*;
        use crate::poller::{PollOptions, Poller};
        use crate::testing::RecordingListener;
        use std::time::Duration;

        #[test]
        fn test_defaults() {
            let scroller = SentinelScroller::new(ChildSentinelStrategy::new());
            assert_eq!(scroller.config().max_scrolls, 100);
            assert_eq!(scroller.config().per_scroll_timeout_ms, 1000);
            assert_eq!(scroller.config().axis, Axis::Vertical);
        }

        #[test]
        fn test_invalid_config_rejected() {
            let err = SentinelScroller::with_config(
                ScrollerConfig::new().with_poll_interval(0),
                ChildSentinelStrategy::new(),
            )
            .unwrap_err();
            assert!(matches!(err, SeekError::Config { .. }));
        }

        #[test]
        fn test_configured_poll_interval_wins_over_driver() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            // driver poller retries every 1ms; the scroller asks for 1s
            let driver = driver_for(&screen)
                .with_poller(Poller::with_options(PollOptions::new().with_poll_interval(1)));
            let listener = Arc::new(RecordingListener::default());
            driver.poller().add_polling_listener(listener.clone());
            let scroller = SentinelScroller::with_config(
                ScrollerConfig::new()
                    .with_max_scrolls(0)
                    .with_per_scroll_timeout(250)
                    .with_poll_interval(1000),
                ScriptedStrategy::always(true),
            )
            .unwrap();
            let report = scroller
                .search(&driver, &list(), &item(42), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(report.outcome, SearchOutcome::Exhausted);
            // the 1s interval is clipped to the 250ms budget: one retry only
            assert_eq!(listener.polling_calls(), 1);
            assert_eq!(screen.snapshot_count(), 2);
        }

        #[test]
        fn test_config_from_yaml_drives_scroller() {
            let config = ScrollerConfig::from_yaml_str(
                "max_scrolls: 2\nper_scroll_timeout_ms: 0\npoll_interval_ms: 5\n",
            )
            .unwrap();
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let scroller = SentinelScroller::with_config(config, strategy.clone()).unwrap();
            let started = std::time::Instant::now();
            let report = scroller
                .search(&driver, &list(), &item(42), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(report.polls, 3);
            assert_eq!(strategy.call_count(), 2);
            assert!(started.elapsed() < Duration::from_secs(5));
        }
    }

    mod single_direction_tests {
        use super::*;

        #[test]
        fn test_found_without_scrolling() {
            let screen = Arc::new(FakeScreen::with_items(10, 3));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let scroller = SentinelScroller::with_config(config(5), strategy.clone()).unwrap();
            let found = scroller
                .scroll_to_direction(&driver, &list(), &item(2), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(found.text(), Some("Item 2"));
            assert_eq!(strategy.call_count(), 0);
        }

        #[test]
        fn test_scenario_a_item_after_two_steps() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true).performing_scrolls());
            let scroller = SentinelScroller::with_config(config(5), strategy.clone()).unwrap();
            let found = scroller
                .scroll_to_direction(&driver, &list(), &item(3), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(found.text(), Some("Item 3"));
            assert_eq!(strategy.call_count(), 2);
            assert_eq!(screen.scroll_count(), 2);
        }

        #[test]
        fn test_scenario_a_with_child_sentinel() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(5), ChildSentinelStrategy::new()).unwrap();
            let report = scroller
                .search(&driver, &list(), &item(3), PhysicalDirection::Down)
                .unwrap();
            assert!(report.is_found());
            assert_eq!(report.element().unwrap().text(), Some("Item 3"));
            assert_eq!(report.scrolls, 2);
            assert_eq!(report.polls, 3);
            assert_eq!(screen.scroll_count(), 2);
        }

        #[test]
        fn test_scenario_b_end_of_content_stops_early() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::sequence([true, true, true, false]));
            let observer = Arc::new(RecordingObserver::default());
            let scroller = SentinelScroller::with_config(config(100), strategy.clone()).unwrap()
                .with_observer(observer.clone());
            let err = scroller
                .scroll_to_direction(&driver, &list(), &item(42), PhysicalDirection::Down)
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(strategy.call_count(), 4);
            assert_eq!(observer.end_of_content_count(), 1);
            assert_eq!(observer.exhausted_count(), 0);
        }

        #[test]
        fn test_scenario_c_safety_net_warns() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let observer = Arc::new(RecordingObserver::default());
            let scroller = SentinelScroller::with_config(config(10), strategy.clone()).unwrap()
                .with_observer(observer.clone());
            let err = scroller
                .scroll_to_direction(&driver, &list(), &item(42), PhysicalDirection::Down)
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(strategy.call_count(), 10);
            assert_eq!(observer.exhausted_count(), 1);
            assert_eq!(observer.end_of_content_count(), 0);
            assert_eq!(observer.scrolled_count(), 10);
        }

        #[test]
        fn test_poll_attempts_bounded() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(7), ScriptedStrategy::always(true)).unwrap();
            let report = scroller
                .search(&driver, &list(), &item(42), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(report.outcome, SearchOutcome::Exhausted);
            assert_eq!(report.polls, 8);
            assert_eq!(report.scrolls, 7);
            assert_eq!(screen.snapshot_count(), 8);
        }

        #[test]
        fn test_zero_max_scrolls_polls_once() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let observer = Arc::new(RecordingObserver::default());
            let scroller = SentinelScroller::with_config(config(0), strategy.clone())
                .unwrap()
                .with_observer(observer.clone());
            let report = scroller
                .search(&driver, &list(), &item(2), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(report.polls, 1);
            assert_eq!(report.outcome, SearchOutcome::Exhausted);
            assert_eq!(strategy.call_count(), 0);
            // no step was allowed, so there is nothing to warn about
            assert_eq!(observer.exhausted_count(), 0);
        }

        #[test]
        fn test_not_found_carries_absolute_finder() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(3), ChildSentinelStrategy::new()).unwrap();
            let err = scroller
                .scroll_to_direction(&driver, &list(), &item(9), PhysicalDirection::Down)
                .unwrap_err();
            match err {
                SeekError::ElementNotFound { finder } => assert_eq!(
                    finder.to_string(),
                    format!("resource_id == \"{}\" >> text == \"Item 9\"", FakeScreen::LIST_ID)
                ),
                other => panic!("Expected ElementNotFound, got {other:?}"),
            }
        }

        #[test]
        fn test_item_outside_container_is_ignored() {
            let screen = Arc::new(FakeScreen::with_items(4, 2).with_decoy(FakeScreen::item_text(4)));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(5), ChildSentinelStrategy::new()).unwrap();
            let found = scroller
                .scroll_to_direction(&driver, &list(), &item(4), PhysicalDirection::Down)
                .unwrap();
            assert_eq!(screen.scroll_count(), 2);
            assert_eq!(found.parent().unwrap().resource_id(), Some(FakeScreen::LIST_ID));
        }

        #[test]
        fn test_missing_container_is_distinct_error() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(5), ChildSentinelStrategy::new()).unwrap();
            let missing = By::resource_id("nope").into_ref();
            let err = scroller
                .scroll_to_direction(&driver, &missing, &item(3), PhysicalDirection::Down)
                .unwrap_err();
            assert!(matches!(err, SeekError::ContainerNotFound { .. }));
        }

        #[test]
        fn test_provider_error_propagates() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            screen.fail_snapshots(true);
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let scroller = SentinelScroller::with_config(config(5), strategy.clone()).unwrap();
            let err = scroller.scroll_to(&driver, &list(), &item(3)).unwrap_err();
            assert!(matches!(err, SeekError::Provider { .. }));
            assert_eq!(strategy.call_count(), 0);
        }

        #[test]
        fn test_executor_error_propagates() {
            let screen = Arc::new(FakeScreen::with_items(3, 1));
            screen.fail_scrolls(true);
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(5), ChildSentinelStrategy::new()).unwrap();
            let err = scroller
                .scroll_to_direction(&driver, &list(), &item(3), PhysicalDirection::Down)
                .unwrap_err();
            assert!(matches!(err, SeekError::ScrollFailed { .. }));
            assert_eq!(screen.scroll_count(), 1);
        }

        #[test]
        fn test_logical_direction() {
            let screen = Arc::new(FakeScreen::with_items(6, 2));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(10), ChildSentinelStrategy::new()).unwrap();
            let found = scroller
                .scroll_to_logical(&driver, &list(), &item(6), LogicalDirection::Forward)
                .unwrap();
            assert_eq!(found.text(), Some("Item 6"));
            assert!(screen.scroll_log().iter().all(|d| *d == PhysicalDirection::Down));
        }
    }

    mod tracing_observer_tests {
        use super::*;
        use std::io;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl Captured {
            fn text(&self) -> String {
                String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
            }
        }

        fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
            let out = Captured::default();
            let writer = out.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            let result = tracing::subscriber::with_default(subscriber, f);
            (result, out.text())
        }

        #[test]
        fn test_default_observer_warns_on_exhaustion() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true));
            let scroller = SentinelScroller::with_config(config(10), strategy.clone()).unwrap();
            let (result, logs) = capture(|| {
                scroller.scroll_to_direction(&driver, &list(), &item(42), PhysicalDirection::Down)
            });
            assert!(result.unwrap_err().is_not_found());
            assert_eq!(strategy.call_count(), 10);
            assert_eq!(logs.matches("without reaching the end").count(), 1);
            assert!(logs.contains("WARN"));
        }

        #[test]
        fn test_default_observer_silent_on_end_of_content() {
            let screen = Arc::new(FakeScreen::with_items(3, 3));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(
                config(100),
                ScriptedStrategy::sequence([true, true, true, false]),
            )
            .unwrap();
            let (result, logs) = capture(|| {
                scroller.scroll_to_direction(&driver, &list(), &item(42), PhysicalDirection::Down)
            });
            assert!(result.unwrap_err().is_not_found());
            assert!(!logs.contains("without reaching the end"));
        }
    }

    mod multi_direction_tests {
        use super::*;

        #[test]
        fn test_scenario_d_down_exhausts_before_up() {
            let screen = Arc::new(FakeScreen::with_items(8, 2).starting_at_end());
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(true).performing_scrolls());
            let scroller = SentinelScroller::with_config(config(4), strategy.clone()).unwrap();
            let found = scroller.scroll_to(&driver, &list(), &item(3)).unwrap();
            assert_eq!(found.text(), Some("Item 3"));

            let calls = strategy.calls();
            assert_eq!(&calls[..4], &[PhysicalDirection::Down; 4]);
            assert!(calls[4..].iter().all(|d| *d == PhysicalDirection::Up));
            // offset 6 -> 2 reveals items 3 and 4
            assert_eq!(calls.len(), 8);
        }

        #[test]
        fn test_up_succeeds_after_end_of_content_down() {
            let screen = Arc::new(FakeScreen::with_items(8, 2).starting_at_end());
            let driver = driver_for(&screen);
            let observer = Arc::new(RecordingObserver::default());
            let scroller = SentinelScroller::with_config(config(20), ChildSentinelStrategy::new()).unwrap()
                .with_observer(observer.clone());
            let found = scroller.scroll_to(&driver, &list(), &item(1)).unwrap();
            assert_eq!(found.text(), Some("Item 1"));
            assert_eq!(observer.end_of_content_count(), 1);
            assert_eq!(screen.scroll_log()[0], PhysicalDirection::Down);
        }

        #[test]
        fn test_all_directions_fail() {
            let screen = Arc::new(FakeScreen::with_items(4, 2));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(false));
            let scroller = SentinelScroller::with_config(config(10), strategy.clone()).unwrap();
            let err = scroller.scroll_to(&driver, &list(), &item(99)).unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(
                strategy.calls(),
                vec![PhysicalDirection::Down, PhysicalDirection::Up]
            );
        }

        #[test]
        fn test_horizontal_axis_order() {
            let screen = Arc::new(FakeScreen::with_items(4, 2));
            let driver = driver_for(&screen);
            let strategy = Arc::new(ScriptedStrategy::always(false));
            let scroller = SentinelScroller::with_config(
                config(3).with_axis(Axis::Horizontal),
                strategy.clone(),
            )
            .unwrap();
            let _ = scroller.scroll_to(&driver, &list(), &item(99));
            assert_eq!(
                strategy.calls(),
                vec![PhysicalDirection::Right, PhysicalDirection::Left]
            );
        }

        #[test]
        fn test_container_error_aborts_remaining_directions() {
            let screen = Arc::new(FakeScreen::with_items(4, 2));
            let driver = driver_for(&screen);
            let scroller = SentinelScroller::with_config(config(3), ChildSentinelStrategy::new()).unwrap();
            let missing = By::resource_id("gone").into_ref();
            let err = scroller.scroll_to(&driver, &missing, &item(4)).unwrap_err();
            assert!(matches!(err, SeekError::ContainerNotFound { .. }));
            assert_eq!(screen.scroll_count(), 0);
        }

        #[test]
        fn test_scroller_is_object_safe() {
            let screen = Arc::new(FakeScreen::with_items(5, 2));
            let driver = driver_for(&screen);
            let scroller: Box<dyn Scroller> =
                Box::new(SentinelScroller::with_config(config(10), ChildSentinelStrategy::new()).unwrap());
            assert!(scroller.scroll_to(&driver, &list(), &item(5)).is_ok());
        }
    }
}
