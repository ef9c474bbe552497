//! In-memory document model.
//!
//! Every behavior in this crate reads and mutates a [`Document`]: a tree of
//! [`Element`]s with classes, attributes, text, a display mode and a layout
//! rectangle in document coordinates. It covers just enough
//! of the DOM for the site's handlers to be expressed and tested without a
//! browser.
//!
//! ## Selectors
//!
//! [`Selector`] understands the subset of CSS the site uses:
//!
//! ```text
//! tag  .class  #id  [attr]  [attr=value]  [attr^=prefix]  :nth-child(n)
//! ```
//!
//! compounded (`button.filter-btn[data-filter=all]`), chained with the
//! descendant combinator (`.services .service-card`) and grouped with commas
//! (`[data-ar], [data-en]`).
//!
//! Nodes removed with [`Document::clear_children`] stay in the arena but are
//! detached; lookups only ever see nodes reachable from the root.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax in '{0}'")]
    Unsupported(String),
}

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Layout box in document coordinates (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// CSS `display` values the handlers toggle between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Initial,
    None,
    Flex,
    Grid,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub text: String,
    pub display: Display,
    pub rect: Rect,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            text: String::new(),
            display: Display::Initial,
            rect: Rect::default(),
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn add_class(&mut self, class: &str) -> &mut Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn remove_class(&mut self, class: &str) -> &mut Self {
        self.classes.remove(class);
        self
    }

    /// Replace the whole class list (`el.className = "..."`).
    pub fn set_class_name(&mut self, class_name: &str) -> &mut Self {
        self.classes = class_name.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn remove_attr(&mut self, name: &str) -> &mut Self {
        self.attrs.remove(name);
        self
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) -> &mut Self {
        self.style.insert(property.to_string(), value.into());
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    pub fn set_rect(&mut self, rect: Rect) -> &mut Self {
        self.rect = rect;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed element tree rooted at `<html>`, with a `<body>` child.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("html")],
            root: NodeId(0),
            body: NodeId(0),
        };
        let body = doc.create("body");
        doc.append(doc.root, body);
        doc.body = body;
        doc
    }

    /// The `<html>` element (carries `lang` and `dir`).
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Attach `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create(tag);
        self.append(parent, node);
        node
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    pub fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    /// Detach every child of `node` (`el.innerHTML = ''`).
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].text.clear();
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    /// Whether the node and all its ancestors are displayed.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        self.is_attached(node)
            && self.element(node).display != Display::None
            && self
                .ancestors(node)
                .all(|a| self.element(a).display != Display::None)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[node.0].parent, move |n| self.nodes[n.0].parent)
    }

    /// Attached nodes in document (pre-)order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        out
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.element(*n).id() == Some(id))
    }

    /// All attached elements matching `selector`, in document order.
    ///
    /// An unparsable selector matches nothing.
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        match SelectorList::parse(selector) {
            Ok(list) => self
                .descendants(self.root)
                .into_iter()
                .filter(|n| list.matches(self, *n))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query_within(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector).ok()?;
        self.descendants(scope)
            .into_iter()
            .find(|n| list.matches(self, *n))
    }

    /// Nearest inclusive ancestor matching `selector` (`el.closest(...)`).
    pub fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector).ok()?;
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|n| list.matches(self, *n))
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        SelectorList::parse(selector).is_ok_and(|list| list.matches(self, node))
    }

    /// Position of `node` among its parent's children, 1-based.
    fn child_position(&self, node: NodeId) -> Option<usize> {
        let parent = self.nodes[node.0].parent?;
        self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == node)
            .map(|p| p + 1)
    }
}

// =============================================================================
// Selectors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
    nth_child: Option<usize>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let el = doc.element(node);
        if self.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        if self.id.is_some() && self.id.as_deref() != el.id() {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        let attrs_ok = self.attrs.iter().all(|m| match m {
            AttrMatch::Exists(name) => el.has_attr(name),
            AttrMatch::Equals(name, value) => el.attr(name) == Some(value.as_str()),
            AttrMatch::Prefix(name, prefix) => {
                el.attr(name).is_some_and(|v| v.starts_with(prefix.as_str()))
            }
        });
        if !attrs_ok {
            return false;
        }
        match self.nth_child {
            Some(n) => doc.child_position(node) == Some(n),
            None => true,
        }
    }
}

/// One descendant-combinator chain, e.g. `.services .service-card`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let parts = split_top_level(input, char::is_whitespace)
            .into_iter()
            .map(|p| parse_compound(&p))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { parts })
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let (last, rest) = match self.parts.split_last() {
            Some(split) => split,
            None => return false,
        };
        if !last.matches(doc, node) {
            return false;
        }
        // Descendant-only chains can be matched greedily right to left.
        let mut ancestors = doc.ancestors(node);
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|a| compound.matches(doc, a)))
    }
}

/// Comma-separated group of selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let selectors = split_top_level(input, |c| c == ',')
            .iter()
            .map(|s| Selector::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        if selectors.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self(selectors))
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(doc, node))
    }
}

/// Split outside `[...]` and `(...)`, dropping empty pieces.
fn split_top_level(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && is_sep(c) {
            if !current.trim().is_empty() {
                out.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    let unsupported = || SelectorError::Unsupported(input.to_string());
    let chars: Vec<char> = input.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    if pos < chars.len() && is_ident_char(chars[pos]) {
        compound.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err(unsupported());
                }
                compound.classes.push(class);
            }
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err(unsupported());
                }
                compound.id = Some(id);
            }
            '[' => {
                let end = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .ok_or_else(unsupported)?;
                let body: String = chars[pos + 1..pos + end].iter().collect();
                compound.attrs.push(parse_attr(&body).ok_or_else(unsupported)?);
                pos += end + 1;
            }
            ':' => {
                let rest: String = chars[pos..].iter().collect();
                let inner = rest
                    .strip_prefix(":nth-child(")
                    .and_then(|r| r.split_once(')'))
                    .ok_or_else(unsupported)?;
                let n = inner.0.trim().parse().map_err(|_| unsupported())?;
                compound.nth_child = Some(n);
                pos += ":nth-child(".len() + inner.0.len() + 1;
            }
            _ => return Err(unsupported()),
        }
    }
    Ok(compound)
}

fn parse_attr(body: &str) -> Option<AttrMatch> {
    let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
    if let Some((name, value)) = body.split_once("^=") {
        return Some(AttrMatch::Prefix(name.trim().to_string(), unquote(value)));
    }
    if let Some((name, value)) = body.split_once('=') {
        return Some(AttrMatch::Equals(name.trim().to_string(), unquote(value)));
    }
    let name = body.trim();
    (!name.is_empty() && name.chars().all(is_ident_char)).then(|| AttrMatch::Exists(name.to_string()))
}
