//! Finders resolve a query against a tree snapshot.
//!
//! [`By`] is a small expression tree: a leaf wraps a [`Matcher`] and is
//! resolved by a pre-order walk of the root's subtree; a chain scopes an
//! inner finder to the element its outer finder resolved to. A failed outer
//! finder fails the whole chain; there is no fallback to the full tree.

use std::fmt;
use std::sync::Arc;

use crate::element::UiElement;
use crate::matcher::{
    all_of, Attribute, AttributeMatcher, Matcher, MatcherRef, State, StateMatcher,
};
use crate::result::{SeekError, SeekResult};

/// Resolves to at most one element under a root
pub trait Finder: fmt::Debug + fmt::Display + Send + Sync {
    /// Resolve against `root`, walking the snapshot afresh every time.
    ///
    /// # Errors
    ///
    /// [`SeekError::ElementNotFound`] when nothing matches.
    fn find(&self, root: &UiElement) -> SeekResult<UiElement>;
}

/// Shared, type-erased finder
pub type FinderRef = Arc<dyn Finder>;

/// Finder expression tree
#[derive(Debug, Clone)]
pub enum By {
    /// First element in pre-order (root included) the matcher accepts
    Matching(MatcherRef),
    /// Resolve `inner` under the result of `outer`
    Chain {
        /// Scope finder
        outer: FinderRef,
        /// Finder applied within the scope
        inner: FinderRef,
    },
}

impl By {
    /// Finder for any matcher
    pub fn matching(matcher: impl Matcher + 'static) -> Self {
        Self::Matching(Arc::new(matcher))
    }

    /// Finder for a shared matcher
    #[must_use]
    pub fn matcher(matcher: MatcherRef) -> Self {
        Self::Matching(matcher)
    }

    /// Exact text
    pub fn text(text: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::equals(Attribute::Text, text))
    }

    /// Text containing `text`
    pub fn text_contains(text: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::contains(Attribute::Text, text))
    }

    /// Text starting with `prefix`
    pub fn text_starts_with(prefix: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::starts_with(Attribute::Text, prefix))
    }

    /// Text matching a whole-value regular expression
    ///
    /// # Errors
    ///
    /// [`SeekError::InvalidMatcher`] if the pattern does not compile.
    pub fn text_regex(pattern: impl Into<String>) -> SeekResult<Self> {
        Ok(Self::matching(AttributeMatcher::regex(
            Attribute::Text,
            pattern,
        )?))
    }

    /// Exact resource id
    pub fn resource_id(id: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::equals(Attribute::ResourceId, id))
    }

    /// Exact content description
    pub fn content_description(description: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::equals(
            Attribute::ContentDescription,
            description,
        ))
    }

    /// Exact class name
    pub fn class_name(class_name: impl Into<String>) -> Self {
        Self::matching(AttributeMatcher::equals(Attribute::ClassName, class_name))
    }

    /// Any element flagged scrollable
    #[must_use]
    pub fn scrollable() -> Self {
        Self::matching(StateMatcher::new(State::Scrollable, true))
    }

    /// Elements accepted by every matcher
    pub fn all_of(matchers: impl IntoIterator<Item = MatcherRef>) -> Self {
        Self::Matching(all_of(matchers))
    }

    /// `inner`, searched only under the element `outer` resolves to
    pub fn chain(outer: impl Into<FinderRef>, inner: impl Into<FinderRef>) -> Self {
        Self::Chain {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    /// Scope `inner` to this finder's result
    #[must_use]
    pub fn then(self, inner: impl Into<FinderRef>) -> Self {
        Self::chain(self, inner)
    }

    /// Erase the type for sharing
    #[must_use]
    pub fn into_ref(self) -> FinderRef {
        Arc::new(self)
    }
}

impl From<By> for FinderRef {
    fn from(by: By) -> Self {
        Arc::new(by)
    }
}

impl Finder for By {
    fn find(&self, root: &UiElement) -> SeekResult<UiElement> {
        match self {
            Self::Matching(matcher) => root
                .subtree()
                .find(|element| matcher.matches(element))
                .ok_or_else(|| SeekError::not_found(Arc::new(self.clone()))),
            Self::Chain { outer, inner } => {
                // Either half failing is reported against the whole chain.
                let scope = outer
                    .find(root)
                    .map_err(|e| rebrand_not_found(e, self))?;
                inner.find(&scope).map_err(|e| rebrand_not_found(e, self))
            }
        }
    }
}

fn rebrand_not_found(error: SeekError, chain: &By) -> SeekError {
    match error {
        SeekError::ElementNotFound { .. } => SeekError::not_found(Arc::new(chain.clone())),
        other => other,
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matching(matcher) => write!(f, "{matcher}"),
            Self::Chain { outer, inner } => write!(f, "{outer} >> {inner}"),
        }
    }
}
