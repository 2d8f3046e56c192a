//! Core scene data model for Framewright documents.
//!
//! A document is a forest: every page owns one root element (its artboard),
//! and elements nest through ordered `children` lists mirrored by a
//! `parent` back-pointer. Presentation properties are opaque to the core;
//! only layout-relevant fields are typed.

use crate::geometry::{Point, Size};
use crate::id::{ElementId, PageId};
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 4 × f32 in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        let nibbles: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        let channels: Vec<u8> = match nibbles.len() {
            3 | 4 => nibbles.iter().map(|n| n * 17).collect(),
            6 | 8 => nibbles.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect(),
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            f32::from(channels[0]) / 255.0,
            f32::from(channels[1]) / 255.0,
            f32::from(channels[2]) / 255.0,
            f32::from(alpha) / 255.0,
        ))
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS `rgba(...)` string for Canvas2D fill/stroke styles.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {:.3})", self.a.clamp(0.0, 1.0))
    }
}

// ─── Presentation ────────────────────────────────────────────────────────

/// A partial style update: `Some` sets a key, `None` removes it.
pub type StylePatch = BTreeMap<String, Option<String>>;

/// Presentation properties (fill, stroke, typography, effects).
///
/// Owned by the inspector panels; the core stores them verbatim and the
/// renderers read a handful of well-known keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles(BTreeMap<String, String>);

impl Styles {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn merge(&mut self, patch: &StylePatch) {
        for (key, value) in patch {
            match value {
                Some(v) => {
                    self.0.insert(key.clone(), v.clone());
                }
                None => {
                    self.0.remove(key);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fill(&self) -> Option<Color> {
        self.get("fill").and_then(Color::from_hex)
    }

    pub fn stroke(&self) -> Option<Color> {
        self.get("stroke").and_then(Color::from_hex)
    }

    pub fn stroke_width(&self) -> f32 {
        self.number("stroke-width").unwrap_or(1.0)
    }

    pub fn radius(&self) -> f32 {
        self.number("radius").unwrap_or(0.0)
    }

    pub fn opacity(&self) -> f32 {
        self.number("opacity").unwrap_or(1.0).clamp(0.0, 1.0)
    }

    fn number(&self, key: &str) -> Option<f32> {
        self.get(key)
            .map(|v| v.trim().trim_end_matches("px"))
            .and_then(|v| v.parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Styles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ─── Layout properties ───────────────────────────────────────────────────

/// How an element arranges its own children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// Children are placed absolutely at their `position`.
    #[default]
    Block,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

/// Main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Cross-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

/// Per-axis sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    #[default]
    Fixed,
    Hug,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutProps {
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub gap: f32,
    pub padding: Padding,
    pub resize_x: ResizeMode,
    pub resize_y: ResizeMode,
    /// Column count when `display` is `Grid`.
    pub grid_columns: u32,
}

impl Default for LayoutProps {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            justify: Justify::Start,
            align: Align::Start,
            gap: 0.0,
            padding: Padding::default(),
            resize_x: ResizeMode::Fixed,
            resize_y: ResizeMode::Fixed,
            grid_columns: 2,
        }
    }
}

impl LayoutProps {
    pub fn flex(direction: FlexDirection, gap: f32, pad: f32) -> Self {
        Self {
            display: Display::Flex,
            flex_direction: direction,
            gap,
            padding: Padding::uniform(pad),
            ..Self::default()
        }
    }

    pub fn grid(columns: u32, gap: f32) -> Self {
        Self {
            display: Display::Grid,
            grid_columns: columns.max(1),
            gap,
            ..Self::default()
        }
    }

    /// Whether children of this element are flow-positioned.
    pub fn is_auto(&self) -> bool {
        self.display != Display::Block
    }
}

// ─── Element types ───────────────────────────────────────────────────────

/// Closed set of element kinds. Containers accept children; leaves don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Page,
    Frame,
    Stack,
    Grid,
    Section,
    Container,
    Row,
    Box,
    Text,
    Heading,
    Paragraph,
    Button,
    Image,
    Input,
    Link,
    Icon,
    Video,
}

impl ElementType {
    pub const ALL: [ElementType; 17] = [
        Self::Page,
        Self::Frame,
        Self::Stack,
        Self::Grid,
        Self::Section,
        Self::Container,
        Self::Row,
        Self::Box,
        Self::Text,
        Self::Heading,
        Self::Paragraph,
        Self::Button,
        Self::Image,
        Self::Input,
        Self::Link,
        Self::Icon,
        Self::Video,
    ];

    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Page
                | Self::Frame
                | Self::Stack
                | Self::Grid
                | Self::Section
                | Self::Container
                | Self::Row
                | Self::Box
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Frame => "frame",
            Self::Stack => "stack",
            Self::Grid => "grid",
            Self::Section => "section",
            Self::Container => "container",
            Self::Row => "row",
            Self::Box => "box",
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Button => "button",
            Self::Image => "image",
            Self::Input => "input",
            Self::Link => "link",
            Self::Icon => "icon",
            Self::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub const fn default_size(self) -> Size {
        match self {
            Self::Page => Size::new(1440.0, 1024.0),
            Self::Frame => Size::new(200.0, 200.0),
            Self::Stack => Size::new(240.0, 160.0),
            Self::Grid => Size::new(300.0, 200.0),
            Self::Section => Size::new(600.0, 300.0),
            Self::Container => Size::new(320.0, 200.0),
            Self::Row => Size::new(240.0, 80.0),
            Self::Box => Size::new(100.0, 100.0),
            Self::Text => Size::new(120.0, 24.0),
            Self::Heading => Size::new(240.0, 40.0),
            Self::Paragraph => Size::new(280.0, 72.0),
            Self::Button => Size::new(120.0, 40.0),
            Self::Image => Size::new(200.0, 150.0),
            Self::Input => Size::new(200.0, 40.0),
            Self::Link => Size::new(80.0, 24.0),
            Self::Icon => Size::new(24.0, 24.0),
            Self::Video => Size::new(320.0, 180.0),
        }
    }

    pub fn default_layout(self) -> LayoutProps {
        match self {
            Self::Stack => LayoutProps::flex(FlexDirection::Column, 8.0, 8.0),
            Self::Row => LayoutProps::flex(FlexDirection::Row, 8.0, 8.0),
            Self::Grid => LayoutProps::grid(2, 8.0),
            Self::Text | Self::Heading | Self::Paragraph | Self::Link => LayoutProps {
                resize_y: ResizeMode::Hug,
                ..LayoutProps::default()
            },
            _ => LayoutProps::default(),
        }
    }

    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Frame => "Frame",
            Self::Stack => "Stack",
            Self::Grid => "Grid",
            Self::Section => "Section",
            Self::Container => "Container",
            Self::Row => "Row",
            Self::Box => "Box",
            Self::Text => "Text",
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::Input => "Input",
            Self::Link => "Link",
            Self::Icon => "Icon",
            Self::Video => "Video",
        }
    }

    pub const fn default_content(self) -> Option<&'static str> {
        match self {
            Self::Text => Some("Text"),
            Self::Heading => Some("Heading"),
            Self::Paragraph => Some("Paragraph"),
            Self::Button => Some("Button"),
            Self::Link => Some("Link"),
            _ => None,
        }
    }

    pub fn default_styles(self) -> Styles {
        match self {
            Self::Page | Self::Frame | Self::Section | Self::Container => {
                Styles::from_iter([("fill", "#FFFFFF")])
            }
            Self::Box => Styles::from_iter([("fill", "#D9D9D9")]),
            Self::Button => Styles::from_iter([("fill", "#2563EB"), ("color", "#FFFFFF")]),
            Self::Image | Self::Video => Styles::from_iter([("fill", "#E5E7EB")]),
            Self::Input => Styles::from_iter([("fill", "#FFFFFF"), ("stroke", "#D1D5DB")]),
            Self::Text | Self::Heading | Self::Paragraph | Self::Link => {
                Styles::from_iter([("color", "#111111")])
            }
            Self::Stack | Self::Grid | Self::Row | Self::Icon => Styles::default(),
        }
    }
}

// ─── Elements & pages ────────────────────────────────────────────────────

/// A node in the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub name: String,
    /// `None` only for page roots.
    pub parent: Option<ElementId>,
    pub children: SmallVec<[ElementId; 4]>,
    /// Relative to the parent; meaningless when the parent is auto-laid-out.
    pub position: Point,
    pub size: Size,
    pub layout: LayoutProps,
    pub styles: Styles,
    pub visible: bool,
    pub locked: bool,
    pub content: Option<String>,
    pub variants: serde_json::Value,
    pub interactions: serde_json::Value,
    pub animations: serde_json::Value,
}

impl Element {
    /// A detached element with the defaults for `kind`.
    pub fn new(id: ElementId, kind: ElementType) -> Self {
        Self {
            id,
            kind,
            name: kind.default_name().to_string(),
            parent: None,
            children: SmallVec::new(),
            position: Point::ZERO,
            size: kind.default_size(),
            layout: kind.default_layout(),
            styles: kind.default_styles(),
            visible: true,
            locked: false,
            content: kind.default_content().map(str::to_string),
            variants: serde_json::Value::Null,
            interactions: serde_json::Value::Null,
            animations: serde_json::Value::Null,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}

/// A positioned artboard on the infinite canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    /// Canvas-space origin of the page's root element.
    pub origin: Point,
    pub root: ElementId,
}

// ─── Document ────────────────────────────────────────────────────────────

/// Pages plus the flat element map.
///
/// The structural methods here are raw: they keep `parent` and `children`
/// in step but do not check cycles, locks, or container capability. Those
/// rules live in the editor's store, which is the only writer in practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
    #[serde(serialize_with = "serialize_sorted")]
    pub elements: HashMap<ElementId, Element>,
}

/// Emit elements ordered by id so equal documents encode to equal bytes.
fn serialize_sorted<S: Serializer>(
    elements: &HashMap<ElementId, Element>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let sorted: BTreeMap<&str, &Element> =
        elements.iter().map(|(id, el)| (id.as_str(), el)).collect();
    sorted.serialize(serializer)
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a page whose root artboard has the given canvas origin and size.
    pub fn add_page(&mut self, name: &str, origin: Point, size: Size) -> PageId {
        let page_id = self.fresh_page_id();
        let root_id = self.fresh_element_id(ElementType::Page);
        let mut root = Element::new(root_id, ElementType::Page);
        root.name = name.to_string();
        root.size = size;
        self.elements.insert(root_id, root);
        self.pages.push(Page {
            id: page_id,
            name: name.to_string(),
            origin,
            root: root_id,
        });
        page_id
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Ordered children, or an empty slice for unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_page_root(&self, id: ElementId) -> bool {
        self.pages.iter().any(|p| p.root == id)
    }

    pub fn index_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Ancestors from the direct parent upward. Stops early on a corrupt
    /// parent chain instead of looping.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parent(id);
        while let Some(p) = current {
            if !seen.insert(p) {
                break;
            }
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Strict ancestry: an element is never its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        ancestor != descendant && self.ancestors(descendant).contains(&ancestor)
    }

    /// The topmost ancestor (or `id` itself when it has no parent).
    pub fn root_of(&self, id: ElementId) -> Option<ElementId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).last().copied().unwrap_or(id))
    }

    pub fn page_of(&self, id: ElementId) -> Option<PageId> {
        let root = self.root_of(id)?;
        self.pages.iter().find(|p| p.root == root).map(|p| p.id)
    }

    /// `id` and all its descendants in pre-order (paint order).
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            for child in self.children(current).iter().rev() {
                if self.contains(*child) {
                    stack.push(*child);
                }
            }
        }
        out
    }

    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        self.subtree(id).into_iter().skip(1).collect()
    }

    /// Generate an element id not yet present in this document.
    pub fn fresh_element_id(&self, kind: ElementType) -> ElementId {
        loop {
            let id = ElementId::with_prefix(kind.as_str());
            if !self.contains(id) {
                return id;
            }
        }
    }

    pub fn fresh_page_id(&self) -> PageId {
        loop {
            let id = PageId::with_prefix("page");
            if self.page(id).is_none() {
                return id;
            }
        }
    }

    /// Unlink `id` from its parent. Returns the old parent and index.
    pub fn detach(&mut self, id: ElementId) -> Option<(ElementId, usize)> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id);
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(el) = self.elements.get_mut(&id) {
            el.parent = None;
        }
        index.map(|i| (parent, i))
    }

    /// Link a detached `id` under `parent` at `index` (clamped; `None` appends).
    pub fn attach(&mut self, id: ElementId, parent: ElementId, index: Option<usize>) {
        let Some(p) = self.elements.get_mut(&parent) else {
            return;
        };
        p.children.retain(|c| *c != id);
        let at = index.unwrap_or(p.children.len()).min(p.children.len());
        p.children.insert(at, id);
        if let Some(el) = self.elements.get_mut(&id) {
            el.parent = Some(parent);
        }
    }

    /// Detach `id` and drop it with every descendant. Returns the removed
    /// elements in pre-order.
    pub fn remove_subtree(&mut self, id: ElementId) -> Vec<Element> {
        let ids = self.subtree(id);
        self.detach(id);
        ids.into_iter()
            .filter_map(|i| self.elements.remove(&i))
            .collect()
    }

    /// Deep-copy the subtree rooted at `id` with fresh ids.
    ///
    /// The first element is the copied root, detached (`parent == None`);
    /// internal parent/children links point at the new ids.
    pub fn clone_subtree(&self, id: ElementId) -> Vec<Element> {
        let fragment: Vec<Element> = self
            .subtree(id)
            .iter()
            .filter_map(|i| self.elements.get(i).cloned())
            .collect();
        self.reissue_ids(&fragment)
    }

    /// Copy a detached fragment (root first, internally linked) with ids
    /// that are unused in this document. Links leaving the fragment are dropped.
    pub fn reissue_ids(&self, fragment: &[Element]) -> Vec<Element> {
        let remap: HashMap<ElementId, ElementId> = fragment
            .iter()
            .map(|el| (el.id, self.fresh_element_id(el.kind)))
            .collect();
        fragment
            .iter()
            .enumerate()
            .map(|(i, el)| {
                let mut copy = el.clone();
                copy.id = remap[&el.id];
                copy.parent = if i == 0 {
                    None
                } else {
                    el.parent.and_then(|p| remap.get(&p).copied())
                };
                copy.children = el
                    .children
                    .iter()
                    .filter_map(|c| remap.get(c).copied())
                    .collect();
                copy
            })
            .collect()
    }

    /// Insert elements produced by `clone_subtree` (root first) under `parent`.
    /// Returns the inserted root id.
    pub fn insert_subtree(
        &mut self,
        elements: Vec<Element>,
        parent: ElementId,
        index: Option<usize>,
    ) -> Option<ElementId> {
        let root = elements.first()?.id;
        for el in elements {
            self.elements.insert(el.id, el);
        }
        self.attach(root, parent, index);
        Some(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_frame() -> (Document, ElementId, ElementId) {
        let mut doc = Document::new();
        let page = doc.add_page("Home", Point::ZERO, Size::new(800.0, 600.0));
        let root = doc.page(page).unwrap().root;
        let frame = ElementId::intern("model_frame");
        doc.elements
            .insert(frame, Element::new(frame, ElementType::Frame));
        doc.attach(frame, root, None);
        (doc, root, frame)
    }

    #[test]
    fn attach_keeps_parent_and_children_in_step() {
        let (doc, root, frame) = doc_with_frame();
        assert_eq!(doc.parent(frame), Some(root));
        assert_eq!(doc.children(root), &[frame]);
        assert!(doc.is_page_root(root));
        assert!(!doc.is_page_root(frame));
    }

    #[test]
    fn detach_returns_old_slot() {
        let (mut doc, root, frame) = doc_with_frame();
        assert_eq!(doc.detach(frame), Some((root, 0)));
        assert!(doc.children(root).is_empty());
        assert_eq!(doc.parent(frame), None);
    }

    #[test]
    fn ancestry_is_strict() {
        let (mut doc, root, frame) = doc_with_frame();
        let leaf = ElementId::intern("model_leaf");
        doc.elements
            .insert(leaf, Element::new(leaf, ElementType::Text));
        doc.attach(leaf, frame, None);

        assert!(doc.is_ancestor_of(root, leaf));
        assert!(doc.is_ancestor_of(frame, leaf));
        assert!(!doc.is_ancestor_of(leaf, frame));
        assert!(!doc.is_ancestor_of(frame, frame));
        assert_eq!(doc.root_of(leaf), Some(root));
        assert_eq!(doc.subtree(root), vec![root, frame, leaf]);
    }

    #[test]
    fn clone_subtree_remaps_every_link() {
        let (mut doc, root, frame) = doc_with_frame();
        let leaf = ElementId::intern("model_clone_leaf");
        doc.elements
            .insert(leaf, Element::new(leaf, ElementType::Button));
        doc.attach(leaf, frame, None);

        let copies = doc.clone_subtree(frame);
        assert_eq!(copies.len(), 2);
        let (copy_root, copy_leaf) = (&copies[0], &copies[1]);
        assert_ne!(copy_root.id, frame);
        assert_eq!(copy_root.parent, None);
        assert_eq!(copy_root.children.as_slice(), &[copy_leaf.id]);
        assert_eq!(copy_leaf.parent, Some(copy_root.id));

        let new_root = doc.insert_subtree(copies, root, Some(0)).unwrap();
        assert_eq!(doc.children(root)[0], new_root);
        assert_eq!(doc.elements.len(), 5);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut doc, root, frame) = doc_with_frame();
        let leaf = ElementId::intern("model_removed_leaf");
        doc.elements
            .insert(leaf, Element::new(leaf, ElementType::Image));
        doc.attach(leaf, frame, None);

        let removed = doc.remove_subtree(frame);
        assert_eq!(removed.len(), 2);
        assert!(!doc.contains(leaf));
        assert!(doc.children(root).is_empty());
    }

    #[test]
    fn color_hex_forms() {
        let c = Color::from_hex("#2563EB").unwrap();
        assert_eq!(c.to_rgba8(), [0x25, 0x63, 0xEB, 0xFF]);
        let short = Color::from_hex("f00").unwrap();
        assert_eq!(short.to_rgba8(), [255, 0, 0, 255]);
        let alpha = Color::from_hex("#00000080").unwrap();
        assert!((alpha.a - 128.0 / 255.0).abs() < 0.001);
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GGG").is_none());
    }

    #[test]
    fn style_patch_sets_and_removes() {
        let mut styles = ElementType::Button.default_styles();
        let patch: StylePatch = [
            ("fill".to_string(), None),
            ("radius".to_string(), Some("8px".to_string())),
        ]
        .into_iter()
        .collect();
        styles.merge(&patch);
        assert_eq!(styles.get("fill"), None);
        assert_eq!(styles.radius(), 8.0);
        assert_eq!(styles.get("color"), Some("#FFFFFF"));
    }

    #[test]
    fn container_capability_is_closed() {
        let containers: Vec<&str> = ElementType::ALL
            .into_iter()
            .filter(|t| t.is_container())
            .map(ElementType::as_str)
            .collect();
        assert_eq!(
            containers,
            vec!["page", "frame", "stack", "grid", "section", "container", "row", "box"]
        );
        assert_eq!(ElementType::parse("heading"), Some(ElementType::Heading));
        assert_eq!(ElementType::parse("ellipse"), None);
    }
}
