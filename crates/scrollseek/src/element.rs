//! Immutable UI-tree snapshots.
//!
//! A [`UiTree`] is a point-in-time copy of the rendered hierarchy. Nodes are
//! stored in pre-order in a single arena, so the subtree of any node is a
//! contiguous index range and every walk is a plain loop. [`UiElement`] is a
//! cheap handle (`Arc` + index) into one tree; holding it never observes
//! later changes to the screen.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::result::SeekResult;

/// Screen-space rectangle of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width, never negative
    #[must_use]
    pub const fn width(&self) -> i32 {
        if self.right > self.left {
            self.right - self.left
        } else {
            0
        }
    }

    /// Height, never negative
    #[must_use]
    pub const fn height(&self) -> i32 {
        if self.bottom > self.top {
            self.bottom - self.top
        } else {
            0
        }
    }

    /// True when the rectangle covers no area
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Center point as `(x, y)`
    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    /// Shift the rectangle by `(dx, dy)`
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// True when the two rectangles overlap
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}][{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

const fn default_true() -> bool {
    true
}

/// Queryable attributes of a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttributes {
    /// Visible text
    pub text: Option<String>,
    /// Resource identifier (e.g. `com.app:id/title`)
    pub resource_id: Option<String>,
    /// Accessibility content description
    pub content_description: Option<String>,
    /// Widget class name
    pub class_name: Option<String>,
    /// Owning package
    pub package: Option<String>,
    /// Bounds on screen
    pub bounds: Rect,
    /// Rendered and on screen
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Accepts input
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Checked state
    pub checked: bool,
    /// Has input focus
    pub focused: bool,
    /// Selected state
    pub selected: bool,
    /// Can be scrolled
    pub scrollable: bool,
    /// Can be clicked
    pub clickable: bool,
}

impl Default for NodeAttributes {
    fn default() -> Self {
        Self {
            text: None,
            resource_id: None,
            content_description: None,
            class_name: None,
            package: None,
            bounds: Rect::default(),
            visible: true,
            enabled: true,
            checked: false,
            focused: false,
            selected: false,
            scrollable: false,
            clickable: false,
        }
    }
}

/// Nested, serializable description of a tree.
///
/// This is the shape tree providers hand over (or that dumps are stored in);
/// it is flattened into a [`UiTree`] before any query runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Attributes of this node
    #[serde(flatten)]
    pub attributes: NodeAttributes,
    /// Child nodes in drawing order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Create a node with the given class name
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            attributes: NodeAttributes {
                class_name: Some(class_name.into()),
                ..NodeAttributes::default()
            },
            children: Vec::new(),
        }
    }

    /// Set text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.attributes.text = Some(text.into());
        self
    }

    /// Set resource id
    #[must_use]
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.resource_id = Some(id.into());
        self
    }

    /// Set content description
    #[must_use]
    pub fn with_content_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.content_description = Some(description.into());
        self
    }

    /// Set package
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.attributes.package = Some(package.into());
        self
    }

    /// Set bounds
    #[must_use]
    pub const fn with_bounds(mut self, bounds: Rect) -> Self {
        self.attributes.bounds = bounds;
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.attributes.visible = visible;
        self
    }

    /// Set enabled state
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.attributes.enabled = enabled;
        self
    }

    /// Set checked state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.attributes.checked = checked;
        self
    }

    /// Set scrollable flag
    #[must_use]
    pub const fn scrollable(mut self, scrollable: bool) -> Self {
        self.attributes.scrollable = scrollable;
        self
    }

    /// Set clickable flag
    #[must_use]
    pub const fn clickable(mut self, clickable: bool) -> Self {
        self.attributes.clickable = clickable;
        self
    }

    /// Append one child
    #[must_use]
    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug)]
struct Node {
    attributes: NodeAttributes,
    parent: Option<usize>,
    children: Vec<usize>,
    depth: usize,
    subtree_len: usize,
}

/// A point-in-time UI tree
#[derive(Debug)]
pub struct UiTree {
    nodes: Vec<Node>,
}

impl UiTree {
    /// Flatten a nested spec into an arena tree
    #[must_use]
    pub fn from_spec(spec: NodeSpec) -> Arc<Self> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<(NodeSpec, Option<usize>)> = vec![(spec, None)];

        while let Some((spec, parent)) = stack.pop() {
            let index = nodes.len();
            let depth = parent.map_or(0, |p| nodes[p].depth + 1);
            if let Some(p) = parent {
                nodes[p].children.push(index);
            }
            let NodeSpec {
                attributes,
                children,
            } = spec;
            nodes.push(Node {
                attributes,
                parent,
                children: Vec::with_capacity(children.len()),
                depth,
                subtree_len: 1,
            });
            // Reversed so the first child is popped (and numbered) first.
            for child in children.into_iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        // Children always have larger indices than their parent.
        for index in (0..nodes.len()).rev() {
            let len: usize = nodes[index]
                .children
                .iter()
                .map(|&c| nodes[c].subtree_len)
                .sum();
            nodes[index].subtree_len += len;
        }

        Arc::new(Self { nodes })
    }

    /// Parse a JSON dump into a tree
    pub fn from_json(json: &str) -> SeekResult<Arc<Self>> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(spec))
    }

    /// Root element of the tree
    #[must_use]
    pub fn root(self: &Arc<Self>) -> UiElement {
        UiElement {
            tree: Arc::clone(self),
            index: 0,
        }
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Handle to one node of a [`UiTree`]
#[derive(Clone)]
pub struct UiElement {
    tree: Arc<UiTree>,
    index: usize,
}

impl UiElement {
    fn node(&self) -> &Node {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            index,
        }
    }

    /// All attributes of this node
    #[must_use]
    pub fn attributes(&self) -> &NodeAttributes {
        &self.node().attributes
    }

    /// Visible text
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.attributes().text.as_deref()
    }

    /// Resource identifier
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.attributes().resource_id.as_deref()
    }

    /// Content description
    #[must_use]
    pub fn content_description(&self) -> Option<&str> {
        self.attributes().content_description.as_deref()
    }

    /// Class name
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.attributes().class_name.as_deref()
    }

    /// Package name
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.attributes().package.as_deref()
    }

    /// Bounds on screen
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.attributes().bounds
    }

    /// Visibility flag
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.attributes().visible
    }

    /// Position in pre-order within its tree
    #[must_use]
    pub const fn node_index(&self) -> usize {
        self.index
    }

    /// Distance from the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    /// Parent element, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|p| self.at(p))
    }

    /// Number of direct children
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// Child at `position`
    #[must_use]
    pub fn child(&self, position: usize) -> Option<Self> {
        self.node().children.get(position).map(|&c| self.at(c))
    }

    /// First child
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.child(0)
    }

    /// Last child
    #[must_use]
    pub fn last_child(&self) -> Option<Self> {
        self.node().children.last().map(|&c| self.at(c))
    }

    /// Direct children in drawing order
    pub fn children(&self) -> impl Iterator<Item = UiElement> + '_ {
        self.node().children.iter().map(move |&c| self.at(c))
    }

    /// This element followed by all of its descendants, in pre-order
    pub fn subtree(&self) -> impl Iterator<Item = UiElement> + '_ {
        let end = self.index + self.node().subtree_len;
        (self.index..end).map(move |i| self.at(i))
    }

    /// All descendants in pre-order, excluding this element
    pub fn descendants(&self) -> impl Iterator<Item = UiElement> + '_ {
        self.subtree().skip(1)
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = UiElement> + '_ {
        std::iter::successors(self.parent(), UiElement::parent)
    }

    /// True when `other` lies in this element's subtree (or is this element)
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
            && other.index >= self.index
            && other.index < self.index + self.node().subtree_len
    }

    /// Snapshot this element's subtree back into a nested spec
    #[must_use]
    pub fn to_spec(&self) -> NodeSpec {
        let nodes = &self.tree.nodes;
        let start = self.index;
        let end = start + nodes[start].subtree_len;
        let mut built: Vec<Option<NodeSpec>> = (start..end).map(|_| None).collect();

        // Reverse pre-order finishes every child before its parent.
        for index in (start..end).rev() {
            let node = &nodes[index];
            let children = node
                .children
                .iter()
                .filter_map(|&c| built[c - start].take())
                .collect();
            built[index - start] = Some(NodeSpec {
                attributes: node.attributes.clone(),
                children,
            });
        }
        built.swap_remove(0).unwrap_or_default()
    }
}

impl PartialEq for UiElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.index == other.index
    }
}

impl Eq for UiElement {}

impl fmt::Debug for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiElement")
            .field("index", &self.index)
            .field("class_name", &self.class_name())
            .field("resource_id", &self.resource_id())
            .field("text", &self.text())
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name().unwrap_or("?"))?;
        if let Some(id) = self.resource_id() {
            write!(f, "#{id}")?;
        }
        if let Some(text) = self.text() {
            write!(f, " {text:?}")?;
        }
        if let Some(desc) = self.content_description() {
            write!(f, " desc={desc:?}")?;
        }
        write!(f, " {}", self.bounds())
    }
}
