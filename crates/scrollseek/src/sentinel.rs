//! Sentinel-based end-of-content detection.
//!
//! A [`SentinelStrategy`] performs exactly one scroll step and reports
//! whether it had any effect. [`ChildSentinelStrategy`] watches one child of
//! the container (the last child when moving forward, the first when moving
//! backward): if that child looks the same after the step, the content did
//! not move and the end has been reached.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::direction::PhysicalDirection;
use crate::driver::Driver;
use crate::element::{Rect, UiElement};
use crate::finder::FinderRef;
use crate::result::{SeekError, SeekResult};

/// Performs one scroll step and reports whether more scrolling is possible
pub trait SentinelStrategy: fmt::Debug + Send + Sync {
    /// Scroll the container once in `direction`.
    ///
    /// Returns `false` once the end of content in that direction is reached.
    ///
    /// # Errors
    ///
    /// [`SeekError::ContainerNotFound`] if the container cannot be resolved;
    /// this is never reported as `false`.
    fn scroll(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<bool>;
}

impl<T: SentinelStrategy + ?Sized> SentinelStrategy for Arc<T> {
    fn scroll(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<bool> {
        (**self).scroll(driver, container, direction)
    }
}

/// Resolve the container against a fresh snapshot
pub fn resolve_container(driver: &dyn Driver, container: &FinderRef) -> SeekResult<UiElement> {
    let root = driver.current_root()?;
    container.find(&root).map_err(|e| match e {
        SeekError::ElementNotFound { .. } => SeekError::ContainerNotFound {
            finder: Arc::clone(container),
        },
        other => other,
    })
}

/// Picks the sentinel child of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelGetter {
    /// First child
    FirstChild,
    /// Last child
    LastChild,
    /// First child flagged visible
    FirstVisibleChild,
    /// Last child flagged visible
    LastVisibleChild,
}

impl SentinelGetter {
    /// Sentinel of `container`, if it has one
    #[must_use]
    pub fn get(self, container: &UiElement) -> Option<UiElement> {
        match self {
            Self::FirstChild => container.first_child(),
            Self::LastChild => container.last_child(),
            Self::FirstVisibleChild => container.children().find(UiElement::is_visible),
            Self::LastVisibleChild => container.children().filter(UiElement::is_visible).last(),
        }
    }
}

/// What identifies a sentinel across two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SentinelIdentity {
    /// Class name
    pub class_name: Option<String>,
    /// Resource id
    pub resource_id: Option<String>,
    /// Text
    pub text: Option<String>,
    /// Content description
    pub content_description: Option<String>,
    /// Bounds
    pub bounds: Rect,
}

impl SentinelIdentity {
    /// Capture the identity of `element`
    #[must_use]
    pub fn of(element: &UiElement) -> Self {
        Self {
            class_name: element.class_name().map(String::from),
            resource_id: element.resource_id().map(String::from),
            text: element.text().map(String::from),
            content_description: element.content_description().map(String::from),
            bounds: element.bounds(),
        }
    }

    fn same_content(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.resource_id == other.resource_id
            && self.text == other.text
            && self.content_description == other.content_description
    }
}

impl fmt::Display for SentinelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name.as_deref().unwrap_or("?"))?;
        if let Some(text) = &self.text {
            write!(f, " {text:?}")?;
        }
        write!(f, " {}", self.bounds)
    }
}

/// When a sentinel counts as updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCheck {
    /// Class, id, text or description changed
    Content,
    /// Bounds changed
    Bounds,
    /// Either of the above
    #[default]
    Either,
}

impl UpdateCheck {
    /// True if `after` differs from `before` under this check
    #[must_use]
    pub fn is_updated(self, before: &SentinelIdentity, after: &SentinelIdentity) -> bool {
        let content = !before.same_content(after);
        let bounds = before.bounds != after.bounds;
        match self {
            Self::Content => content,
            Self::Bounds => bounds,
            Self::Either => content || bounds,
        }
    }
}

/// Compares a child of the container before and after each step
#[derive(Debug)]
pub struct ChildSentinelStrategy {
    forward: SentinelGetter,
    backward: SentinelGetter,
    check: UpdateCheck,
    last_sentinel: Mutex<Option<SentinelIdentity>>,
}

impl Default for ChildSentinelStrategy {
    fn default() -> Self {
        Self {
            forward: SentinelGetter::LastChild,
            backward: SentinelGetter::FirstChild,
            check: UpdateCheck::default(),
            last_sentinel: Mutex::new(None),
        }
    }
}

impl ChildSentinelStrategy {
    /// Last child when moving down/right, first child when moving up/left
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use different sentinel getters
    #[must_use]
    pub const fn with_getters(mut self, forward: SentinelGetter, backward: SentinelGetter) -> Self {
        self.forward = forward;
        self.backward = backward;
        self
    }

    /// Use a different update check
    #[must_use]
    pub const fn with_check(mut self, check: UpdateCheck) -> Self {
        self.check = check;
        self
    }

    /// Getter used for `direction`
    #[must_use]
    pub const fn getter_for(&self, direction: PhysicalDirection) -> SentinelGetter {
        if direction.is_forward() {
            self.forward
        } else {
            self.backward
        }
    }

    /// Sentinel observed after the most recent step
    #[must_use]
    pub fn last_sentinel(&self) -> Option<SentinelIdentity> {
        self.last_sentinel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, sentinel: Option<SentinelIdentity>) {
        *self
            .last_sentinel
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = sentinel;
    }
}

impl SentinelStrategy for ChildSentinelStrategy {
    fn scroll(
        &self,
        driver: &dyn Driver,
        container: &FinderRef,
        direction: PhysicalDirection,
    ) -> SeekResult<bool> {
        let getter = self.getter_for(direction);
        let scope = resolve_container(driver, container)?;
        let Some(before) = getter.get(&scope).map(|s| SentinelIdentity::of(&s)) else {
            trace!(%direction, "container {container} has no sentinel; nothing to scroll");
            self.remember(None);
            return Ok(false);
        };

        driver.perform_scroll(&scope, direction)?;

        let scope = resolve_container(driver, container)?;
        let after = getter.get(&scope).map(|s| SentinelIdentity::of(&s));
        let updated = after
            .as_ref()
            .is_some_and(|after| self.check.is_updated(&before, after));
        trace!(
            %direction,
            updated,
            "sentinel before={before} after={}",
            after.as_ref().map_or_else(|| "none".to_string(), ToString::to_string)
        );
        self.remember(after);
        Ok(updated)
    }
}
