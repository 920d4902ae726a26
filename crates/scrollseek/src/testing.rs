//! Test doubles.
//!
//! [`FakeScreen`] simulates a device showing one scrollable list; it serves
//! both as [`TreeProvider`] and as [`ScrollExecutor`]. The remaining types
//! record what the engine did so tests can assert on it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::direction::PhysicalDirection;
use crate::driver::{Driver, ScrollExecutor, TreeProvider};
use crate::element::{NodeSpec, Rect, UiElement, UiTree};
use crate::finder::{Finder, FinderRef};
use crate::poller::{PollingListener, TimeoutListener};
use crate::result::{SeekError, SeekResult};
use crate::scroller::ScrollObserver;
use crate::sentinel::{resolve_container, SentinelStrategy};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// FAKE SCREEN
// =============================================================================

/// Simulated screen with a vertically scrolling list of `Item N` rows
#[derive(Debug)]
pub struct FakeScreen {
    items: usize,
    visible: usize,
    decoy: Option<String>,
    offset: Mutex<usize>,
    scroll_log: Mutex<Vec<PhysicalDirection>>,
    snapshots: AtomicUsize,
    fail_snapshots: AtomicBool,
    fail_scrolls: AtomicBool,
}

impl FakeScreen {
    /// Resource id of the list container
    pub const LIST_ID: &'static str = "com.example:id/list";

    /// Height of one row in pixels
    pub const ROW_HEIGHT: i32 = 100;

    /// Width of the screen in pixels
    pub const WIDTH: i32 = 1080;

    /// Text of the `n`-th item, counting from 1
    #[must_use]
    pub fn item_text(n: usize) -> String {
        format!("Item {n}")
    }

    /// List of `items` rows, `visible` of which fit on screen at once
    #[must_use]
    pub fn with_items(items: usize, visible: usize) -> Self {
        Self {
            items,
            visible,
            decoy: None,
            offset: Mutex::new(0),
            scroll_log: Mutex::new(Vec::new()),
            snapshots: AtomicUsize::new(0),
            fail_snapshots: AtomicBool::new(false),
            fail_scrolls: AtomicBool::new(false),
        }
    }

    /// Add a text view outside the list, placed before it in document order
    #[must_use]
    pub fn with_decoy(mut self, text: impl Into<String>) -> Self {
        self.decoy = Some(text.into());
        self
    }

    /// Start scrolled to `offset` (clamped to the last page)
    #[must_use]
    pub fn starting_at(self, offset: usize) -> Self {
        *lock(&self.offset) = offset.min(self.max_offset());
        self
    }

    /// Start scrolled to the last page
    #[must_use]
    pub fn starting_at_end(self) -> Self {
        let end = self.max_offset();
        self.starting_at(end)
    }

    /// Make every snapshot request fail (or succeed again)
    pub fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    /// Make every scroll gesture fail (or succeed again)
    pub fn fail_scrolls(&self, fail: bool) {
        self.fail_scrolls.store(fail, Ordering::SeqCst);
    }

    /// Index of the first visible item
    pub fn offset(&self) -> usize {
        *lock(&self.offset)
    }

    /// Snapshots handed out so far
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    /// Scroll gestures received so far, including failed ones
    pub fn scroll_count(&self) -> usize {
        lock(&self.scroll_log).len()
    }

    /// Directions of the gestures received so far
    pub fn scroll_log(&self) -> Vec<PhysicalDirection> {
        lock(&self.scroll_log).clone()
    }

    const fn max_offset(&self) -> usize {
        self.items.saturating_sub(self.visible)
    }

    fn build_spec(&self, offset: usize) -> NodeSpec {
        let end = (offset + self.visible).min(self.items);
        let rows = (offset..end).enumerate().map(|(row, index)| {
            let top = row_top(row);
            NodeSpec::new("android.widget.TextView")
                .with_text(Self::item_text(index + 1))
                .with_bounds(Rect::new(0, top, Self::WIDTH, top + Self::ROW_HEIGHT))
                .clickable(true)
        });
        let list_bottom = row_top(self.visible);
        let list = NodeSpec::new("android.widget.ListView")
            .with_resource_id(Self::LIST_ID)
            .with_bounds(Rect::new(0, 0, Self::WIDTH, list_bottom))
            .scrollable(true)
            .with_children(rows);

        let mut root = NodeSpec::new("android.widget.FrameLayout")
            .with_package("com.example")
            .with_bounds(Rect::new(0, 0, Self::WIDTH, list_bottom + Self::ROW_HEIGHT));
        if let Some(text) = &self.decoy {
            root = root.with_child(
                NodeSpec::new("android.widget.TextView")
                    .with_text(text.clone())
                    .with_bounds(Rect::new(0, list_bottom, Self::WIDTH, list_bottom + Self::ROW_HEIGHT)),
            );
        }
        root.with_child(list)
    }
}

fn row_top(row: usize) -> i32 {
    i32::try_from(row).unwrap_or(i32::MAX / FakeScreen::ROW_HEIGHT) * FakeScreen::ROW_HEIGHT
}

impl TreeProvider for FakeScreen {
    fn current_root(&self) -> SeekResult<UiElement> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        if self.fail_snapshots.load(Ordering::SeqCst) {
            return Err(SeekError::provider("fake screen is offline"));
        }
        Ok(UiTree::from_spec(self.build_spec(self.offset())).root())
    }
}

impl ScrollExecutor for FakeScreen {
    fn scroll(&self, container: &UiElement, direction: PhysicalDirection) -> SeekResult<()> {
        lock(&self.scroll_log).push(direction);
        if self.fail_scrolls.load(Ordering::SeqCst) {
            return Err(SeekError::scroll_failed(format!(
                "gesture {direction} rejected on {container}"
            )));
        }
        let mut offset = lock(&self.offset);
        *offset = match direction {
            PhysicalDirection::Down => (*offset + 1).min(self.max_offset()),
            PhysicalDirection::Up => offset.saturating_sub(1),
            PhysicalDirection::Left | PhysicalDirection::Right => *offset,
        };
        Ok(())
    }
}

// =============================================================================
// LISTENERS AND OBSERVERS
// =============================================================================

/// Counts poller notifications
#[derive(Debug, Default)]
pub struct RecordingListener {
    polling: AtomicUsize,
    timeouts: AtomicUsize,
}

impl RecordingListener {
    /// `on_polling` calls received
    pub fn polling_calls(&self) -> usize {
        self.polling.load(Ordering::SeqCst)
    }

    /// `on_timeout` calls received
    pub fn timeout_calls(&self) -> usize {
        self.timeouts.load(Ordering::SeqCst)
    }
}

impl PollingListener for RecordingListener {
    fn on_polling(&self, _finder: &dyn Finder) {
        self.polling.fetch_add(1, Ordering::SeqCst);
    }
}

impl TimeoutListener for RecordingListener {
    fn on_timeout(&self, _finder: &dyn Finder) {
        self.timeouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts scroll-search events
#[derive(Debug, Default)]
pub struct RecordingObserver {
    scrolled: AtomicUsize,
    end_of_content: AtomicUsize,
    exhausted: AtomicUsize,
}

impl RecordingObserver {
    /// Successful scroll steps seen
    pub fn scrolled_count(&self) -> usize {
        self.scrolled.load(Ordering::SeqCst)
    }

    /// End-of-content events seen
    pub fn end_of_content_count(&self) -> usize {
        self.end_of_content.load(Ordering::SeqCst)
    }

    /// Exhausted-budget events seen
    pub fn exhausted_count(&self) -> usize {
        self.exhausted.load(Ordering::SeqCst)
    }
}

impl ScrollObserver for RecordingObserver {
    fn on_scrolled(&self, _container: &dyn Finder, _direction: PhysicalDirection, _step: u32) {
        self.scrolled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_end_of_content(
        &self,
        _container: &dyn Finder,
        _direction: PhysicalDirection,
        _scrolls: u32,
    ) {
        self.end_of_content.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(
        &self,
        _container: &dyn Finder,
        _direction: PhysicalDirection,
        _max_scrolls: u32,
        _strategy: &dyn SentinelStrategy,
    ) {
        self.exhausted.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// SCRIPTED STRATEGY
// =============================================================================

/// [`SentinelStrategy`] that answers from a script
#[derive(Debug)]
pub struct ScriptedStrategy {
    script: Vec<bool>,
    fallback: bool,
    perform: bool,
    calls: Mutex<Vec<PhysicalDirection>>,
}

impl ScriptedStrategy {
    /// Always answer `answer`
    #[must_use]
    pub const fn always(answer: bool) -> Self {
        Self {
            script: Vec::new(),
            fallback: answer,
            perform: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer from `answers` in order, then `false` forever
    #[must_use]
    pub fn sequence(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: answers.into_iter().collect(),
            ..Self::always(false)
        }
    }

    /// Also resolve the container and issue a real gesture on each call
    #[must_use]
    pub fn performing_scrolls(mut self) -> Self {
        self.perform = true;
        self
    }

    /// Directions of the calls received so far
    pub fn calls(&self) -> Vec<PhysicalDirection> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl SentinelStrategy for ScriptedStrategy {
    fn scroll(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<bool> {
        let call = {
            let mut calls = lock(&self.calls);
            calls.push(direction);
            calls.len() - 1
        };
        if self.perform {
            let element = resolve_container(driver, container)?;
            driver.perform_scroll(&element, direction)?;
        }
        Ok(self.script.get(call).copied().unwrap_or(self.fallback))
    }
}
