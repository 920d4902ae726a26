//! Driver facade over the external collaborators.
//!
//! The engine talks to the device through two narrow traits: a
//! [`TreeProvider`] that hands out fresh snapshots and a [`ScrollExecutor`]
//! that performs one physical scroll gesture. [`Driver`] bundles them with a
//! [`Poller`]; [`UiDriver`] is the stock composition.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::direction::PhysicalDirection;
use crate::element::UiElement;
use crate::finder::{Finder, FinderRef};
use crate::poller::{Poller, EXISTS, GONE};
use crate::result::SeekResult;

/// Source of point-in-time UI-tree snapshots
pub trait TreeProvider: Send + Sync {
    /// Root of a snapshot taken now
    ///
    /// # Errors
    ///
    /// [`crate::SeekError::Provider`] when no snapshot can be produced.
    fn current_root(&self) -> SeekResult<UiElement>;
}

/// Performs platform scroll gestures
pub trait ScrollExecutor: Send + Sync {
    /// Scroll `container` one step in `direction`
    ///
    /// # Errors
    ///
    /// [`crate::SeekError::ScrollFailed`] when the gesture cannot be issued.
    fn scroll(&self, container: &UiElement, direction: PhysicalDirection) -> SeekResult<()>;
}

impl<T: TreeProvider + ?Sized> TreeProvider for Arc<T> {
    fn current_root(&self) -> SeekResult<UiElement> {
        (**self).current_root()
    }
}

impl<T: ScrollExecutor + ?Sized> ScrollExecutor for Arc<T> {
    fn scroll(&self, container: &UiElement, direction: PhysicalDirection) -> SeekResult<()> {
        (**self).scroll(container, direction)
    }
}

/// Handle passed through the engine for querying and scrolling
pub trait Driver: Send + Sync {
    /// Root of a fresh snapshot
    fn current_root(&self) -> SeekResult<UiElement>;

    /// Poller used for waits
    fn poller(&self) -> &Poller;

    /// Issue one scroll gesture on `container`
    fn perform_scroll(&self, container: &UiElement, direction: PhysicalDirection)
        -> SeekResult<()>;

    /// Resolve `finder` once against a fresh snapshot
    fn find(&self, finder: &dyn Finder) -> SeekResult<UiElement> {
        finder.find(&self.current_root()?)
    }

    /// Poll until `finder` resolves
    fn wait_for(&self, finder: &FinderRef, timeout: Duration) -> SeekResult<UiElement> {
        self.poller().poll_for(self, finder, &EXISTS, timeout)
    }

    /// Poll until `finder` stops resolving
    fn wait_until_gone(&self, finder: &FinderRef, timeout: Duration) -> SeekResult<()> {
        self.poller().poll_for(self, finder, &GONE, timeout)
    }
}

/// [`Driver`] built from a provider and an executor
pub struct UiDriver<P, S> {
    provider: P,
    executor: S,
    poller: Poller,
}

impl<P, S> fmt::Debug for UiDriver<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiDriver")
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl<P: TreeProvider, S: ScrollExecutor> UiDriver<P, S> {
    /// Compose a driver with a default poller
    pub fn new(provider: P, executor: S) -> Self {
        Self {
            provider,
            executor,
            poller: Poller::new(),
        }
    }

    /// Replace the poller
    #[must_use]
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    /// The tree provider
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The scroll executor
    pub const fn executor(&self) -> &S {
        &self.executor
    }
}

impl<P: TreeProvider, S: ScrollExecutor> Driver for UiDriver<P, S> {
    fn current_root(&self) -> SeekResult<UiElement> {
        self.provider.current_root()
    }

    fn poller(&self) -> &Poller {
        &self.poller
    }

    fn perform_scroll(
        &self,
        container: &UiElement,
        direction: PhysicalDirection,
    ) -> SeekResult<()> {
        self.executor.scroll(container, direction)
    }
}
