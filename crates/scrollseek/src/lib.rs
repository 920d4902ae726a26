//! Scrollseek: locate UI elements inside scrollable containers
//!
//! Elements are described by composable [`Matcher`]s, wrapped in
//! [`Finder`]s that resolve against point-in-time snapshots of a UI tree.
//! A [`Poller`] waits for a finder to resolve, and a [`SentinelScroller`]
//! scrolls a container step by step until the wanted item shows up or a
//! [`SentinelStrategy`] reports the end of content.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SentinelScroller                                            │
//! │    │ poll(container >> item)        │ scroll one step        │
//! │    ▼                                ▼                        │
//! │  Poller ──► Finder ──► Matcher    SentinelStrategy           │
//! │    │                                │                        │
//! │    └──────────────► Driver ◄────────┘                        │
//! │                     │      │                                 │
//! │            TreeProvider   ScrollExecutor                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scrollseek::prelude::*;
//! use scrollseek::testing::FakeScreen;
//!
//! let screen = Arc::new(FakeScreen::with_items(20, 5));
//! let driver = UiDriver::new(screen.clone(), screen.clone());
//!
//! let scroller = SentinelScroller::with_config(
//!     ScrollerConfig::new().with_per_scroll_timeout(0),
//!     ChildSentinelStrategy::new(),
//! )?;
//! let list = By::resource_id(FakeScreen::LIST_ID).into_ref();
//! let item = By::text("Item 12").into_ref();
//!
//! let found = scroller.scroll_to(&driver, &list, &item)?;
//! assert_eq!(found.text(), Some("Item 12"));
//! # Ok::<(), scrollseek::SeekError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod direction;
pub mod driver;
pub mod element;
pub mod finder;
pub mod logging;
pub mod matcher;
pub mod poller;
mod result;
pub mod scroller;
pub mod sentinel;

/// Test doubles: a simulated screen and recording hooks
pub mod testing;

pub use config::ScrollerConfig;
pub use direction::{Axis, DirectionConverter, LogicalDirection, PhysicalDirection};
pub use driver::{Driver, ScrollExecutor, TreeProvider, UiDriver};
pub use element::{NodeAttributes, NodeSpec, Rect, UiElement, UiTree};
pub use finder::{By, Finder, FinderRef};
pub use matcher::{
    AttributeMatcher, Attribute, FnMatcher, MatchKind, Matcher, MatcherRef, MatcherSpec, State,
    StateMatcher,
};
pub use poller::{
    ConditionChecker, PollOptions, Poller, PollingListener, TimeoutListener, EXISTS, GONE,
};
pub use result::{SeekError, SeekResult};
pub use scroller::{ScrollObserver, ScrollReport, Scroller, SearchOutcome, SentinelScroller};
pub use sentinel::{ChildSentinelStrategy, SentinelGetter, SentinelStrategy, UpdateCheck};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::direction::*;
    pub use super::driver::*;
    pub use super::element::*;
    pub use super::finder::*;
    pub use super::matcher::{
        all_of, any_of, not, with_ancestor, with_child, with_descendant, with_parent,
        Attribute, AttributeMatcher, FnMatcher, MatchKind, Matcher, MatcherRef, MatcherSpec,
        State, StateMatcher,
    };
    pub use super::poller::*;
    pub use super::result::*;
    pub use super::scroller::*;
    pub use super::sentinel::*;
}
