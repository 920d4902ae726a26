//! Element matchers.
//!
//! A [`Matcher`] is a pure predicate over one [`UiElement`]. Matchers never
//! mutate or re-fetch the element, so they can be evaluated any number of
//! times, from any thread, against any snapshot.
//!
//! Leaf matchers test one attribute or state flag; [`all_of`], [`any_of`] and
//! [`not`] compose them, and the relational matchers ([`with_parent`],
//! [`with_descendant`], ...) test neighbours within the same snapshot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::element::UiElement;
use crate::result::{SeekError, SeekResult};

/// Predicate over a single element snapshot
pub trait Matcher: fmt::Debug + fmt::Display + Send + Sync {
    /// Check whether `element` satisfies this matcher
    fn matches(&self, element: &UiElement) -> bool;
}

/// Shared, type-erased matcher
pub type MatcherRef = Arc<dyn Matcher>;

// =============================================================================
// ATTRIBUTE MATCHERS
// =============================================================================

/// String attributes a matcher can inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Visible text
    Text,
    /// Resource identifier
    ResourceId,
    /// Content description
    ContentDescription,
    /// Class name
    ClassName,
    /// Package name
    Package,
}

impl Attribute {
    /// Attribute name used in descriptions
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ResourceId => "resource_id",
            Self::ContentDescription => "content_description",
            Self::ClassName => "class_name",
            Self::Package => "package",
        }
    }

    /// Read this attribute from `element`
    #[must_use]
    pub fn get<'a>(&self, element: &'a UiElement) -> Option<&'a str> {
        match self {
            Self::Text => element.text(),
            Self::ResourceId => element.resource_id(),
            Self::ContentDescription => element.content_description(),
            Self::ClassName => element.class_name(),
            Self::Package => element.package(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an attribute value is compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact equality
    #[default]
    Equals,
    /// Substring
    Contains,
    /// Prefix
    StartsWith,
    /// Suffix
    EndsWith,
    /// Whole-value regular expression
    Regex,
}

impl MatchKind {
    const fn operator(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "=~",
        }
    }
}

#[derive(Debug, Clone)]
enum Comparison {
    Literal(String),
    Pattern(Regex),
}

/// Compares one string attribute against a fixed value
#[derive(Debug, Clone)]
pub struct AttributeMatcher {
    attribute: Attribute,
    kind: MatchKind,
    value: String,
    comparison: Comparison,
}

impl AttributeMatcher {
    /// Build a matcher, validating its arguments up front.
    ///
    /// # Errors
    ///
    /// [`SeekError::InvalidMatcher`] when `value` is `None`, or when `kind`
    /// is [`MatchKind::Regex`] and `value` is not a valid pattern.
    pub fn new(attribute: Attribute, kind: MatchKind, value: Option<String>) -> SeekResult<Self> {
        let value = value.ok_or_else(|| {
            SeekError::invalid_matcher(format!(
                "{attribute} {} requires a value",
                kind.operator()
            ))
        })?;
        let comparison = match kind {
            MatchKind::Regex => {
                let anchored = format!("^(?:{value})$");
                let regex = Regex::new(&anchored).map_err(|e| {
                    SeekError::invalid_matcher(format!("bad pattern for {attribute}: {e}"))
                })?;
                Comparison::Pattern(regex)
            }
            _ => Comparison::Literal(value.clone()),
        };
        Ok(Self {
            attribute,
            kind,
            value,
            comparison,
        })
    }

    /// Exact-match matcher; cannot fail since the value is present
    #[must_use]
    pub fn equals(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::literal(attribute, MatchKind::Equals, value.into())
    }

    /// Substring matcher
    #[must_use]
    pub fn contains(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::literal(attribute, MatchKind::Contains, value.into())
    }

    /// Prefix matcher
    #[must_use]
    pub fn starts_with(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::literal(attribute, MatchKind::StartsWith, value.into())
    }

    /// Suffix matcher
    #[must_use]
    pub fn ends_with(attribute: Attribute, value: impl Into<String>) -> Self {
        Self::literal(attribute, MatchKind::EndsWith, value.into())
    }

    /// Regex matcher; the pattern must match the whole value
    ///
    /// # Errors
    ///
    /// [`SeekError::InvalidMatcher`] if the pattern does not compile.
    pub fn regex(attribute: Attribute, pattern: impl Into<String>) -> SeekResult<Self> {
        Self::new(attribute, MatchKind::Regex, Some(pattern.into()))
    }

    fn literal(attribute: Attribute, kind: MatchKind, value: String) -> Self {
        Self {
            attribute,
            kind,
            comparison: Comparison::Literal(value.clone()),
            value,
        }
    }

    /// Inspected attribute
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Comparison kind
    #[must_use]
    pub const fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Comparison value (or pattern)
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Matcher for AttributeMatcher {
    fn matches(&self, element: &UiElement) -> bool {
        let Some(actual) = self.attribute.get(element) else {
            return false;
        };
        match (&self.comparison, self.kind) {
            (Comparison::Pattern(regex), _) => regex.is_match(actual),
            (Comparison::Literal(v), MatchKind::Contains) => actual.contains(v.as_str()),
            (Comparison::Literal(v), MatchKind::StartsWith) => actual.starts_with(v.as_str()),
            (Comparison::Literal(v), MatchKind::EndsWith) => actual.ends_with(v.as_str()),
            (Comparison::Literal(v), _) => actual == v,
        }
    }
}

impl fmt::Display for AttributeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:?}",
            self.attribute,
            self.kind.operator(),
            self.value
        )
    }
}

// =============================================================================
// STATE MATCHERS
// =============================================================================

/// Boolean flags a matcher can inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Rendered on screen
    Visible,
    /// Accepts input
    Enabled,
    /// Checked
    Checked,
    /// Focused
    Focused,
    /// Selected
    Selected,
    /// Scrollable
    Scrollable,
    /// Clickable
    Clickable,
}

impl State {
    /// Flag name used in descriptions
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Enabled => "enabled",
            Self::Checked => "checked",
            Self::Focused => "focused",
            Self::Selected => "selected",
            Self::Scrollable => "scrollable",
            Self::Clickable => "clickable",
        }
    }

    /// Read this flag from `element`
    #[must_use]
    pub fn get(&self, element: &UiElement) -> bool {
        let attrs = element.attributes();
        match self {
            Self::Visible => attrs.visible,
            Self::Enabled => attrs.enabled,
            Self::Checked => attrs.checked,
            Self::Focused => attrs.focused,
            Self::Selected => attrs.selected,
            Self::Scrollable => attrs.scrollable,
            Self::Clickable => attrs.clickable,
        }
    }
}

/// Compares one boolean flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMatcher {
    state: State,
    expected: bool,
}

impl StateMatcher {
    /// Match elements whose `state` flag equals `expected`
    #[must_use]
    pub const fn new(state: State, expected: bool) -> Self {
        Self { state, expected }
    }
}

impl Matcher for StateMatcher {
    fn matches(&self, element: &UiElement) -> bool {
        self.state.get(element) == self.expected
    }
}

impl fmt::Display for StateMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected {
            write!(f, "{}", self.state.name())
        } else {
            write!(f, "!{}", self.state.name())
        }
    }
}

// =============================================================================
// COMBINATORS
// =============================================================================

/// Matches when every inner matcher matches
#[derive(Debug, Clone)]
pub struct AllOf(Vec<MatcherRef>);

/// Matches when at least one inner matcher matches
#[derive(Debug, Clone)]
pub struct AnyOf(Vec<MatcherRef>);

/// Negates a matcher
#[derive(Debug, Clone)]
pub struct Not(MatcherRef);

impl Matcher for AllOf {
    fn matches(&self, element: &UiElement) -> bool {
        self.0.iter().all(|m| m.matches(element))
    }
}

impl Matcher for AnyOf {
    fn matches(&self, element: &UiElement) -> bool {
        self.0.iter().any(|m| m.matches(element))
    }
}

impl Matcher for Not {
    fn matches(&self, element: &UiElement) -> bool {
        !self.0.matches(element)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[MatcherRef], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, m) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{m}")?;
    }
    f.write_str(")")
}

impl fmt::Display for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0, " && ")
    }
}

impl fmt::Display for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0, " || ")
    }
}

impl fmt::Display for Not {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!({})", self.0)
    }
}

/// Conjunction; an empty list matches everything
pub fn all_of(matchers: impl IntoIterator<Item = MatcherRef>) -> MatcherRef {
    Arc::new(AllOf(matchers.into_iter().collect()))
}

/// Disjunction; an empty list matches nothing
pub fn any_of(matchers: impl IntoIterator<Item = MatcherRef>) -> MatcherRef {
    Arc::new(AnyOf(matchers.into_iter().collect()))
}

/// Negation
pub fn not(matcher: MatcherRef) -> MatcherRef {
    Arc::new(Not(matcher))
}

// =============================================================================
// RELATIONAL MATCHERS
// =============================================================================

/// Which neighbours a [`RelationMatcher`] inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The direct parent
    Parent,
    /// Any ancestor
    Ancestor,
    /// Any direct child
    Child,
    /// Any descendant
    Descendant,
}

/// Matches an element by testing its neighbours in the same snapshot
#[derive(Debug, Clone)]
pub struct RelationMatcher {
    relation: Relation,
    matcher: MatcherRef,
}

impl Matcher for RelationMatcher {
    fn matches(&self, element: &UiElement) -> bool {
        let m = &self.matcher;
        match self.relation {
            Relation::Parent => element.parent().is_some_and(|p| m.matches(&p)),
            Relation::Ancestor => element.ancestors().any(|a| m.matches(&a)),
            Relation::Child => element.children().any(|c| m.matches(&c)),
            Relation::Descendant => element.descendants().any(|d| m.matches(&d)),
        }
    }
}

impl fmt::Display for RelationMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.relation {
            Relation::Parent => "parent",
            Relation::Ancestor => "ancestor",
            Relation::Child => "child",
            Relation::Descendant => "descendant",
        };
        write!(f, "with_{name}({})", self.matcher)
    }
}

fn relation(relation: Relation, matcher: MatcherRef) -> MatcherRef {
    Arc::new(RelationMatcher { relation, matcher })
}

/// Element whose parent matches
pub fn with_parent(matcher: MatcherRef) -> MatcherRef {
    relation(Relation::Parent, matcher)
}

/// Element with a matching ancestor
pub fn with_ancestor(matcher: MatcherRef) -> MatcherRef {
    relation(Relation::Ancestor, matcher)
}

/// Element with a matching direct child
pub fn with_child(matcher: MatcherRef) -> MatcherRef {
    relation(Relation::Child, matcher)
}

/// Element with a matching descendant
pub fn with_descendant(matcher: MatcherRef) -> MatcherRef {
    relation(Relation::Descendant, matcher)
}

// =============================================================================
// CLOSURE MATCHER
// =============================================================================

/// A closure-based matcher with a description
pub struct FnMatcher<F: Fn(&UiElement) -> bool + Send + Sync> {
    func: F,
    description: String,
}

impl<F: Fn(&UiElement) -> bool + Send + Sync> FnMatcher<F> {
    /// Wrap `func`; `description` is used in error messages
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: Fn(&UiElement) -> bool + Send + Sync> fmt::Debug for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(&UiElement) -> bool + Send + Sync> fmt::Display for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<F: Fn(&UiElement) -> bool + Send + Sync> Matcher for FnMatcher<F> {
    fn matches(&self, element: &UiElement) -> bool {
        (self.func)(element)
    }
}

// =============================================================================
// SERIALIZABLE MATCHER DESCRIPTIONS
// =============================================================================

const fn default_expected() -> bool {
    true
}

/// Declarative matcher description, e.g. loaded from a test fixture file.
///
/// ```yaml
/// type: all_of
/// matchers:
///   - { type: attribute, attribute: class_name, value: android.widget.TextView }
///   - { type: attribute, attribute: text, kind: starts_with, value: Item }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherSpec {
    /// String attribute comparison
    Attribute {
        /// Attribute to read
        attribute: Attribute,
        /// Comparison kind
        #[serde(default)]
        kind: MatchKind,
        /// Comparison value; required
        #[serde(default)]
        value: Option<String>,
    },
    /// Boolean flag comparison
    State {
        /// Flag to read
        state: State,
        /// Expected value
        #[serde(default = "default_expected")]
        expected: bool,
    },
    /// Conjunction
    AllOf {
        /// Inner matchers
        matchers: Vec<MatcherSpec>,
    },
    /// Disjunction
    AnyOf {
        /// Inner matchers
        matchers: Vec<MatcherSpec>,
    },
    /// Negation
    Not {
        /// Negated matcher
        matcher: Box<MatcherSpec>,
    },
    /// Relational test
    Related {
        /// Which neighbours to test
        relation: Relation,
        /// Matcher applied to them
        matcher: Box<MatcherSpec>,
    },
}

impl MatcherSpec {
    /// Validate and build the matcher.
    ///
    /// # Errors
    ///
    /// [`SeekError::InvalidMatcher`] for any missing value or bad pattern,
    /// anywhere in the description.
    pub fn build(&self) -> SeekResult<MatcherRef> {
        Ok(match self {
            Self::Attribute {
                attribute,
                kind,
                value,
            } => Arc::new(AttributeMatcher::new(*attribute, *kind, value.clone())?),
            Self::State { state, expected } => Arc::new(StateMatcher::new(*state, *expected)),
            Self::AllOf { matchers } => all_of(Self::build_all(matchers)?),
            Self::AnyOf { matchers } => any_of(Self::build_all(matchers)?),
            Self::Not { matcher } => not(matcher.build()?),
            Self::Related { relation: r, matcher } => relation(*r, matcher.build()?),
        })
    }

    fn build_all(specs: &[MatcherSpec]) -> SeekResult<Vec<MatcherRef>> {
        specs.iter().map(Self::build).collect()
    }
}
